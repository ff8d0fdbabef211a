use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::utils::clock::Clock;
use crate::utils::error::DecodeResult;
use crate::utils::raw::{
    serialize_optional_seconds, serialize_seconds, serialize_token, type_mismatch, Decode,
    RawObject, WireToken,
};

/// 探索派遣状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpeditionStatus {
    Ongoing,
    Finished,
}

impl WireToken for ExpeditionStatus {
    const TOKENS: &'static [&'static str] = &["Ongoing", "Finished"];

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "Ongoing" => Some(Self::Ongoing),
            "Finished" => Some(Self::Finished),
            _ => None,
        }
    }

    fn token(&self) -> &'static str {
        match self {
            Self::Ongoing => "Ongoing",
            Self::Finished => "Finished",
        }
    }
}

impl Serialize for ExpeditionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_token(self, serializer)
    }
}

/// 探索派遣
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expedition {
    pub character_icon: String,
    pub status: ExpeditionStatus,
    #[serde(serialize_with = "serialize_seconds")]
    pub remaining_time: Duration,
}

impl Expedition {
    pub fn finished(&self) -> bool {
        self.remaining_time <= Duration::zero()
    }

    pub fn completion_time(&self, clock: &impl Clock) -> DateTime<Utc> {
        clock.after(self.remaining_time)
    }
}

impl Decode for Expedition {
    fn decode(raw: RawObject) -> DecodeResult<Self> {
        Ok(Self {
            character_icon: raw.string(&["avatar_side_icon", "character_icon"])?,
            status: raw.token(&["status"])?,
            remaining_time: raw.lenient_seconds(&["remained_time", "remaining_time"])?,
        })
    }
}

/// 宽松枚举：未知的状态值保留为 `Other`，不视为解码失败
macro_rules! lenient_status {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $token:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn from_token(token: &str) -> Self {
                match token {
                    $($token => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                }
            }

            pub fn token(&self) -> &str {
                match self {
                    $(Self::$variant => $token,)+
                    Self::Other(other) => other,
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.token())
            }
        }
    };
}

lenient_status! {
    /// 每日委托奖励状态
    TaskRewardStatus {
        Unfinished => "TaskRewardStatusUnfinished",
        Finished => "TaskRewardStatusFinished",
        Collected => "TaskRewardStatusTakenAward",
    }
}

lenient_status! {
    /// 历练点奖励状态
    AttendanceRewardStatus {
        Available => "AttendanceRewardStatusWaitTaken",
        Collected => "AttendanceRewardStatusTakenAward",
        Forbidden => "AttendanceRewardStatusForbid",
        Unavailable => "AttendanceRewardStatusUnfinished",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskReward {
    pub status: TaskRewardStatus,
}

impl Decode for TaskReward {
    fn decode(raw: RawObject) -> DecodeResult<Self> {
        Ok(Self {
            status: TaskRewardStatus::from_token(&raw.string(&["status"])?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceReward {
    pub status: AttendanceRewardStatus,
    pub progress: i64,
}

impl Decode for AttendanceReward {
    fn decode(raw: RawObject) -> DecodeResult<Self> {
        Ok(Self {
            status: AttendanceRewardStatus::from_token(&raw.string(&["status"])?),
            progress: raw.int(&["progress"])?,
        })
    }
}

/// 每日委托
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTasks {
    pub max_tasks: i64,
    pub completed_tasks: i64,
    pub claimed_commission_reward: bool,
    pub task_rewards: Vec<TaskReward>,
    pub attendance_rewards: Vec<AttendanceReward>,
    pub attendance_visible: bool,
    pub stored_attendance: f64,
    #[serde(serialize_with = "serialize_optional_seconds")]
    pub stored_attendance_refresh_countdown: Option<Duration>,
}

impl Decode for DailyTasks {
    fn decode(raw: RawObject) -> DecodeResult<Self> {
        Ok(Self {
            max_tasks: raw.int(&["total_num", "max_tasks"])?,
            completed_tasks: raw.int(&["finished_num", "completed_tasks"])?,
            claimed_commission_reward: raw
                .boolean(&["is_extra_task_reward_received", "claimed_commission_reward"])?,
            task_rewards: raw.list(&["task_rewards"])?,
            attendance_rewards: raw.list(&["attendance_rewards"])?,
            attendance_visible: raw.boolean(&["attendance_visible"])?,
            stored_attendance: raw.lenient_float(&["stored_attendance"])?,
            stored_attendance_refresh_countdown: raw.optional(
                &["attendance_refresh_time", "stored_attendance_refresh_countdown"],
                RawObject::lenient_seconds,
            )?,
        })
    }
}

/// 魔神任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchonQuestStatus {
    Ongoing,
    NotOpen,
}

impl WireToken for ArchonQuestStatus {
    const TOKENS: &'static [&'static str] = &["StatusOngoing", "StatusNotOpen"];

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "StatusOngoing" => Some(Self::Ongoing),
            "StatusNotOpen" => Some(Self::NotOpen),
            _ => None,
        }
    }

    fn token(&self) -> &'static str {
        match self {
            Self::Ongoing => "StatusOngoing",
            Self::NotOpen => "StatusNotOpen",
        }
    }
}

impl Serialize for ArchonQuestStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_token(self, serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchonQuest {
    pub id: i64,
    pub status: ArchonQuestStatus,
    pub chapter_num: String,
    pub chapter_title: String,
}

impl Decode for ArchonQuest {
    fn decode(raw: RawObject) -> DecodeResult<Self> {
        Ok(Self {
            id: raw.int(&["id"])?,
            status: raw.token(&["status"])?,
            chapter_num: raw.string(&["chapter_num"])?,
            chapter_title: raw.string(&["chapter_title"])?,
        })
    }
}

/// 魔神任务进度
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchonQuestProgress {
    pub list: Vec<ArchonQuest>,
    pub mainlines_finished: bool,
    pub archon_quest_unlocked: bool,
    pub interchapters_finished: bool,
}

impl Decode for ArchonQuestProgress {
    fn decode(raw: RawObject) -> DecodeResult<Self> {
        Ok(Self {
            list: raw.list(&["list"])?,
            mainlines_finished: raw.boolean(&["is_finish_all_mainline", "mainlines_finished"])?,
            archon_quest_unlocked: raw
                .boolean(&["is_open_archon_quest", "archon_quest_unlocked"])?,
            interchapters_finished: raw
                .boolean(&["is_finish_all_interchapter", "interchapters_finished"])?,
        })
    }
}

/// 把时长拆成 (天, 时, 分, 秒)，参量质变仪的冷却按这种方式展示
pub fn split_duration(duration: Duration) -> (i64, i64, i64, i64) {
    let total = duration.num_seconds();
    let days = total.div_euclid(86_400);
    let rest = total.rem_euclid(86_400);
    (days, rest / 3600, rest % 3600 / 60, rest % 60)
}

/// 原神实时便笺
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenshinNotes {
    pub current_resin: i64,
    pub max_resin: i64,
    #[serde(serialize_with = "serialize_seconds")]
    pub remaining_resin_recovery_time: Duration,

    pub current_realm_currency: i64,
    pub max_realm_currency: i64,
    #[serde(serialize_with = "serialize_seconds")]
    pub remaining_realm_currency_recovery_time: Duration,

    pub completed_commissions: i64,
    pub max_commissions: i64,
    pub claimed_commission_reward: bool,

    pub remaining_resin_discounts: i64,
    pub max_resin_discounts: i64,

    #[serde(serialize_with = "serialize_optional_seconds")]
    pub remaining_transformer_recovery_time: Option<Duration>,

    pub expeditions: Vec<Expedition>,
    pub max_expeditions: i64,

    pub archon_quest_progress: ArchonQuestProgress,
    pub daily_task: DailyTasks,
}

impl GenshinNotes {
    pub fn resin_recovery_time(&self, clock: &impl Clock) -> DateTime<Utc> {
        clock.after(self.remaining_resin_recovery_time)
    }

    pub fn realm_currency_recovery_time(&self, clock: &impl Clock) -> DateTime<Utc> {
        clock.after(self.remaining_realm_currency_recovery_time)
    }

    /// 未获得参量质变仪时为 `None`
    pub fn transformer_recovery_time(&self, clock: &impl Clock) -> Option<DateTime<Utc>> {
        self.remaining_transformer_recovery_time
            .map(|remaining| clock.after(remaining))
    }

    /// 参量质变仪冷却倒计时的 (天, 时, 分, 秒)
    pub fn transformer_countdown(&self) -> Option<(i64, i64, i64, i64)> {
        self.remaining_transformer_recovery_time.map(split_duration)
    }

    /// 把 `transformer.recovery_time` 的天时分秒折算成秒数，
    /// 已经是展开形式（如重新序列化后的数据）时不处理
    fn flatten_transformer(raw: &mut RawObject) -> DecodeResult<()> {
        const FIELD: &str = "remaining_transformer_recovery_time";
        if raw.contains(FIELD) || raw.contains("transformer_recovery_time") {
            return Ok(());
        }

        let mut seconds = None;
        if raw.contains("transformer") {
            let transformer = raw.object(&["transformer"])?;
            if transformer.boolean(&["obtained"])? {
                let total = transformer
                    .record::<TransformerTime>(&["recovery_time"])?
                    .total_seconds()
                    .filter(|secs| Duration::try_seconds(*secs).is_some())
                    .ok_or_else(|| {
                        type_mismatch(
                            transformer.path_of("recovery_time"),
                            "duration in seconds",
                            &transformer.raw("recovery_time"),
                        )
                    })?;
                seconds = Some(total);
            }
        }

        raw.insert(FIELD, seconds.map_or(Value::Null, Value::from));
        Ok(())
    }
}

/// `transformer.recovery_time` 的原始结构
struct TransformerTime {
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
}

impl TransformerTime {
    /// 溢出时为 `None`
    fn total_seconds(&self) -> Option<i64> {
        self.day
            .checked_mul(86_400)?
            .checked_add(self.hour.checked_mul(3600)?)?
            .checked_add(self.minute.checked_mul(60)?)?
            .checked_add(self.second)
    }
}

impl Decode for TransformerTime {
    fn decode(raw: RawObject) -> DecodeResult<Self> {
        Ok(Self {
            day: raw.int(&["Day"])?,
            hour: raw.int(&["Hour"])?,
            minute: raw.int(&["Minute"])?,
            second: raw.int(&["Second"])?,
        })
    }
}

impl Decode for GenshinNotes {
    fn decode(mut raw: RawObject) -> DecodeResult<Self> {
        Self::flatten_transformer(&mut raw)?;

        Ok(Self {
            current_resin: raw.int(&["current_resin"])?,
            max_resin: raw.int(&["max_resin"])?,
            remaining_resin_recovery_time: raw
                .lenient_seconds(&["resin_recovery_time", "remaining_resin_recovery_time"])?,
            current_realm_currency: raw.int(&["current_home_coin", "current_realm_currency"])?,
            max_realm_currency: raw.int(&["max_home_coin", "max_realm_currency"])?,
            remaining_realm_currency_recovery_time: raw.lenient_seconds(&[
                "home_coin_recovery_time",
                "remaining_realm_currency_recovery_time",
            ])?,
            completed_commissions: raw.int(&["finished_task_num", "completed_commissions"])?,
            max_commissions: raw.int(&["total_task_num", "max_commissions"])?,
            claimed_commission_reward: raw
                .boolean(&["is_extra_task_reward_received", "claimed_commission_reward"])?,
            remaining_resin_discounts: raw
                .int(&["remain_resin_discount_num", "remaining_resin_discounts"])?,
            max_resin_discounts: raw.int(&["resin_discount_num_limit", "max_resin_discounts"])?,
            remaining_transformer_recovery_time: raw.optional(
                &[
                    "remaining_transformer_recovery_time",
                    "transformer_recovery_time",
                ],
                RawObject::lenient_seconds,
            )?,
            expeditions: raw.list(&["expeditions"])?,
            max_expeditions: raw.int(&["max_expedition_num", "max_expeditions"])?,
            archon_quest_progress: raw.record(&["archon_quest_progress"])?,
            daily_task: raw.record(&["daily_task"])?,
        })
    }
}
