use chrono::{DateTime, Duration, Utc};

/// 时间来源
/// 便笺的派生时间（回满时间、刷新时间）都基于调用时的当前时间计算，
/// 通过该 trait 注入，测试时可以固定时间
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// 当前时间加上一段时长，溢出时取最大可表示时间
    fn after(&self, delta: Duration) -> DateTime<Utc> {
        self.now()
            .checked_add_signed(delta)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定时钟
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
