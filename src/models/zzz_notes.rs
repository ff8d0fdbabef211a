use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};
use serde_json::json;

use crate::utils::clock::Clock;
use crate::utils::error::DecodeResult;
use crate::utils::raw::{serialize_seconds, serialize_token, Decode, RawObject, WireToken};

/// 录像店经营状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoStoreState {
    /// 有收益可领取
    RevenueAvailable,
    /// 待营业
    WaitingToOpen,
    /// 营业中
    CurrentlyOpen,
}

impl WireToken for VideoStoreState {
    const TOKENS: &'static [&'static str] = &["SaleStateDone", "SaleStateNo", "SaleStateDoing"];

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "SaleStateDone" => Some(Self::RevenueAvailable),
            "SaleStateNo" => Some(Self::WaitingToOpen),
            "SaleStateDoing" => Some(Self::CurrentlyOpen),
            _ => None,
        }
    }

    fn token(&self) -> &'static str {
        match self {
            Self::RevenueAvailable => "SaleStateDone",
            Self::WaitingToOpen => "SaleStateNo",
            Self::CurrentlyOpen => "SaleStateDoing",
        }
    }
}

impl Serialize for VideoStoreState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_token(self, serializer)
    }
}

/// 刮刮卡（每日签到）状态
struct ScratchCard(bool);

impl WireToken for ScratchCard {
    const TOKENS: &'static [&'static str] = &["CardSignDone", "CardSignNotDone"];

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "CardSignDone" => Some(Self(true)),
            "CardSignNotDone" => Some(Self(false)),
            _ => None,
        }
    }

    fn token(&self) -> &'static str {
        if self.0 {
            "CardSignDone"
        } else {
            "CardSignNotDone"
        }
    }
}

fn serialize_scratch_card<S: Serializer>(done: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serialize_token(&ScratchCard(*done), serializer)
}

/// 电量
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryCharge {
    pub current: i64,
    pub max: i64,
    /// 距离回满的时长，接口字段 `restore`
    #[serde(serialize_with = "serialize_seconds")]
    pub seconds_till_full: Duration,
}

impl BatteryCharge {
    pub fn is_full(&self) -> bool {
        self.current == self.max
    }

    /// 电量回满的时间
    pub fn full_at(&self, clock: &impl Clock) -> DateTime<Utc> {
        clock.after(self.seconds_till_full)
    }

    /// 接口把数值放在 `progress` 子对象里，与 `restore` 并列
    fn unnest_progress(raw: &mut RawObject) -> DecodeResult<()> {
        raw.unnest("progress")
    }
}

impl Decode for BatteryCharge {
    fn decode(mut raw: RawObject) -> DecodeResult<Self> {
        Self::unnest_progress(&mut raw)?;
        Ok(Self {
            current: raw.int(&["current"])?,
            max: raw.int(&["max"])?,
            seconds_till_full: raw.seconds(&["restore", "seconds_till_full"])?,
        })
    }
}

/// 活跃度
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Engagement {
    pub current: i64,
    pub max: i64,
}

impl Decode for Engagement {
    fn decode(raw: RawObject) -> DecodeResult<Self> {
        Ok(Self {
            current: raw.int(&["current"])?,
            max: raw.int(&["max"])?,
        })
    }
}

/// 零号空洞悬赏委托进度
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BountyCommission {
    pub completed_count: i64,
    pub total: i64,
    #[serde(serialize_with = "serialize_seconds")]
    pub refresh_duration: Duration,
}

impl BountyCommission {
    pub fn completed(&self) -> bool {
        self.completed_count == self.total
    }

    /// 悬赏委托刷新的时间
    pub fn reset_at(&self, clock: &impl Clock) -> DateTime<Utc> {
        clock.after(self.refresh_duration)
    }
}

impl Decode for BountyCommission {
    fn decode(raw: RawObject) -> DecodeResult<Self> {
        Ok(Self {
            completed_count: raw.int(&["num", "cur_completed", "completed_count"])?,
            total: raw.int(&["total"])?,
            refresh_duration: raw.seconds(&["refresh_time", "refresh_duration"])?,
        })
    }
}

/// 零号空洞调查点数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyPoints {
    pub count: i64,
    pub total: i64,
    /// 含义未确认，原样保留
    pub is_max_level: bool,
}

impl Decode for SurveyPoints {
    fn decode(raw: RawObject) -> DecodeResult<Self> {
        Ok(Self {
            count: raw.int(&["num", "count"])?,
            total: raw.int(&["total"])?,
            is_max_level: raw.boolean(&["is_max_level"])?,
        })
    }
}

/// 零号空洞
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HollowZero {
    pub bounty_commission: Option<BountyCommission>,
    pub investigation_point: Option<SurveyPoints>,
}

impl Decode for HollowZero {
    fn decode(raw: RawObject) -> DecodeResult<Self> {
        Ok(Self {
            bounty_commission: raw.optional(&["bounty_commission"], RawObject::record)?,
            investigation_point: raw.optional(
                &["survey_points", "investigation_point"],
                RawObject::record,
            )?,
        })
    }
}

/// 周常任务（丽都周纪）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyTask {
    pub current_point: i64,
    pub max_point: i64,
    #[serde(serialize_with = "serialize_seconds")]
    pub refresh_duration: Duration,
}

impl WeeklyTask {
    /// 点数可能超过上限，用 `>=` 判断
    pub fn completed(&self) -> bool {
        self.current_point >= self.max_point
    }

    pub fn reset_at(&self, clock: &impl Clock) -> DateTime<Utc> {
        clock.after(self.refresh_duration)
    }
}

impl Decode for WeeklyTask {
    fn decode(raw: RawObject) -> DecodeResult<Self> {
        Ok(Self {
            current_point: raw.int(&["cur_point", "current_point"])?,
            max_point: raw.int(&["max_point"])?,
            refresh_duration: raw.seconds(&["refresh_time", "refresh_duration"])?,
        })
    }
}

/// 绝区零实时便笺
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZzzNotes {
    pub battery_charge: BatteryCharge,
    pub engagement: Engagement,
    #[serde(serialize_with = "serialize_scratch_card")]
    pub scratch_card_completed: bool,
    pub video_store_state: VideoStoreState,
    pub hollow_zero: HollowZero,
    pub weekly_task: Option<WeeklyTask>,
}

impl ZzzNotes {
    /// 顶层缺少 `video_store_state` 时取 `vhs_sale.sale_state`
    fn lift_video_store_state(raw: &mut RawObject) -> DecodeResult<()> {
        if !raw.contains("video_store_state") {
            let state = raw.nested("vhs_sale", "sale_state")?;
            raw.insert("video_store_state", state);
        }
        Ok(())
    }

    /// 顶层缺少 `hollow_zero` 时用同级的悬赏委托和调查点数合成
    fn synthesize_hollow_zero(raw: &mut RawObject) {
        if !raw.contains("hollow_zero") {
            let hollow_zero = json!({
                "bounty_commission": raw.raw("bounty_commission"),
                "survey_points": raw.raw("survey_points"),
            });
            raw.insert("hollow_zero", hollow_zero);
        }
    }
}

impl Decode for ZzzNotes {
    fn decode(mut raw: RawObject) -> DecodeResult<Self> {
        // 顺序不能调换：后面的字段校验依赖合成出来的字段
        Self::lift_video_store_state(&mut raw)?;
        Self::synthesize_hollow_zero(&mut raw);

        Ok(Self {
            battery_charge: raw.record(&["energy", "battery_charge"])?,
            engagement: raw.record(&["vitality", "engagement"])?,
            scratch_card_completed: raw
                .token::<ScratchCard>(&["card_sign", "scratch_card_completed"])?
                .0,
            video_store_state: raw.token(&["video_store_state"])?,
            hollow_zero: raw.record(&["hollow_zero"])?,
            weekly_task: raw.optional(&["weekly_task"], RawObject::record)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::FixedClock;
    use crate::utils::error::DecodeError;
    use crate::utils::raw::decode_value;
    use chrono::TimeZone;
    use serde_json::Value;

    fn sample_payload() -> Value {
        json!({
            "energy": {
                "progress": {"max": 240, "current": 180},
                "restore": 28800,
                "day_type": 1,
                "hour": 8,
                "minute": 0
            },
            "vitality": {"max": 400, "current": 400},
            "vhs_sale": {"sale_state": "SaleStateDoing"},
            "card_sign": "CardSignDone",
            "bounty_commission": {"num": 3, "total": 4, "refresh_time": 345600},
            "survey_points": {"num": 8000, "total": 8000, "is_max_level": true},
            "abyss_refresh": 345600,
            "coffee": null,
            "weekly_task": {"cur_point": 500, "max_point": 1300, "refresh_time": 345600}
        })
    }

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 7, 4, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_decode_full_payload() {
        let notes: ZzzNotes = decode_value(&sample_payload()).unwrap();

        assert_eq!(notes.battery_charge.current, 180);
        assert_eq!(notes.battery_charge.max, 240);
        assert_eq!(notes.battery_charge.seconds_till_full, Duration::seconds(28800));
        assert!(!notes.battery_charge.is_full());
        assert_eq!(notes.engagement, Engagement { current: 400, max: 400 });
        assert!(notes.scratch_card_completed);
        assert_eq!(notes.video_store_state, VideoStoreState::CurrentlyOpen);

        let bounty = notes.hollow_zero.bounty_commission.as_ref().unwrap();
        assert_eq!(bounty.completed_count, 3);
        assert!(!bounty.completed());
        let survey = notes.hollow_zero.investigation_point.as_ref().unwrap();
        assert_eq!(survey.count, 8000);
        assert!(survey.is_max_level);

        let weekly = notes.weekly_task.as_ref().unwrap();
        assert_eq!(weekly.current_point, 500);
        assert!(!weekly.completed());
    }

    #[test]
    fn test_battery_full_and_full_at() {
        let clock = fixed_clock();
        let battery: BatteryCharge =
            decode_value(&json!({"progress": {"max": 240, "current": 240}, "restore": 0})).unwrap();
        assert!(battery.is_full());
        assert_eq!(battery.full_at(&clock), clock.0);

        let battery: BatteryCharge =
            decode_value(&json!({"progress": {"max": 240, "current": 200}, "restore": 14400})).unwrap();
        assert!(!battery.is_full());
        assert_eq!(battery.full_at(&clock), clock.0 + Duration::hours(4));
    }

    #[test]
    fn test_progress_overrides_top_level_keys() {
        let battery: BatteryCharge = decode_value(&json!({
            "current": 1,
            "max": 1,
            "progress": {"current": 10, "max": 240},
            "restore": 60
        }))
        .unwrap();
        assert_eq!(battery.current, 10);
        assert_eq!(battery.max, 240);
    }

    #[test]
    fn test_flattened_battery_is_accepted() {
        let battery: BatteryCharge =
            decode_value(&json!({"current": 5, "max": 240, "seconds_till_full": 100})).unwrap();
        assert_eq!(battery.seconds_till_full, Duration::seconds(100));
    }

    #[test]
    fn test_scratch_card_tokens() {
        let mut payload = sample_payload();
        payload["card_sign"] = json!("CardSignNotDone");
        let notes: ZzzNotes = decode_value(&payload).unwrap();
        assert!(!notes.scratch_card_completed);

        payload["card_sign"] = json!("CardSignMaybe");
        let err = decode_value::<ZzzNotes>(&payload).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownEnumToken {
                field: "card_sign".to_string(),
                token: "CardSignMaybe".to_string(),
                allowed: &["CardSignDone", "CardSignNotDone"],
            }
        );

        payload["card_sign"] = json!(true);
        let err = decode_value::<ZzzNotes>(&payload).unwrap_err();
        assert_eq!(err.field(), "card_sign");
        assert_eq!(err.kind(), "type_mismatch");
    }

    #[test]
    fn test_video_store_state_tokens() {
        for (token, expected) in [
            ("SaleStateDone", VideoStoreState::RevenueAvailable),
            ("SaleStateNo", VideoStoreState::WaitingToOpen),
            ("SaleStateDoing", VideoStoreState::CurrentlyOpen),
        ] {
            let mut payload = sample_payload();
            payload["vhs_sale"]["sale_state"] = json!(token);
            let notes: ZzzNotes = decode_value(&payload).unwrap();
            assert_eq!(notes.video_store_state, expected);
        }

        let mut payload = sample_payload();
        payload["vhs_sale"]["sale_state"] = json!("SaleStateClosed");
        let err = decode_value::<ZzzNotes>(&payload).unwrap_err();
        assert_eq!(err.field(), "video_store_state");
        assert!(err.to_string().contains("SaleStateClosed"));
    }

    #[test]
    fn test_top_level_video_store_state_wins() {
        let mut payload = sample_payload();
        payload["video_store_state"] = json!("SaleStateNo");
        payload.as_object_mut().unwrap().remove("vhs_sale");
        let notes: ZzzNotes = decode_value(&payload).unwrap();
        assert_eq!(notes.video_store_state, VideoStoreState::WaitingToOpen);
    }

    #[test]
    fn test_missing_vhs_sale() {
        let mut payload = sample_payload();
        payload.as_object_mut().unwrap().remove("vhs_sale");
        let err = decode_value::<ZzzNotes>(&payload).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MissingField {
                field: "vhs_sale".to_string()
            }
        );

        payload["vhs_sale"] = json!({});
        let err = decode_value::<ZzzNotes>(&payload).unwrap_err();
        assert_eq!(err.field(), "vhs_sale.sale_state");
    }

    #[test]
    fn test_bounty_commission_completed() {
        let mut payload = sample_payload();
        payload["bounty_commission"] = json!({"num": 3, "total": 3, "refresh_time": 0});
        let notes: ZzzNotes = decode_value(&payload).unwrap();
        let bounty = notes.hollow_zero.bounty_commission.unwrap();
        assert!(bounty.completed());
        assert_eq!(bounty.reset_at(&fixed_clock()), fixed_clock().0);
    }

    #[test]
    fn test_hollow_zero_parts_are_optional() {
        let mut payload = sample_payload();
        let obj = payload.as_object_mut().unwrap();
        obj.remove("bounty_commission");
        obj.insert("survey_points".to_string(), Value::Null);
        let notes: ZzzNotes = decode_value(&payload).unwrap();
        assert_eq!(notes.hollow_zero, HollowZero::default());
    }

    #[test]
    fn test_explicit_hollow_zero_wins_over_siblings() {
        let mut payload = sample_payload();
        payload["hollow_zero"] = json!({
            "bounty_commission": {"num": 1, "total": 4, "refresh_time": 60},
            "survey_points": {"num": 10, "total": 8000, "is_max_level": false}
        });
        let notes: ZzzNotes = decode_value(&payload).unwrap();

        let bounty = notes.hollow_zero.bounty_commission.unwrap();
        assert_eq!(bounty.completed_count, 1);
        assert_eq!(bounty.refresh_duration, Duration::seconds(60));
        let survey = notes.hollow_zero.investigation_point.unwrap();
        assert_eq!(survey.count, 10);
        assert!(!survey.is_max_level);
    }

    #[test]
    fn test_nested_hollow_zero_error_path() {
        let mut payload = sample_payload();
        payload["bounty_commission"] = json!({"num": 1, "refresh_time": 0});
        let err = decode_value::<ZzzNotes>(&payload).unwrap_err();
        assert_eq!(err.field(), "hollow_zero.bounty_commission.total");
    }

    #[test]
    fn test_weekly_task_completed_uses_greater_or_equal() {
        let clock = fixed_clock();
        let task: WeeklyTask =
            decode_value(&json!({"cur_point": 5, "max_point": 5, "refresh_time": 60})).unwrap();
        assert!(task.completed());
        assert_eq!(task.reset_at(&clock), clock.0 + Duration::minutes(1));

        let task: WeeklyTask =
            decode_value(&json!({"cur_point": 6, "max_point": 5, "refresh_time": 60})).unwrap();
        assert!(task.completed());

        let task: WeeklyTask =
            decode_value(&json!({"cur_point": 4, "max_point": 5, "refresh_time": 60})).unwrap();
        assert!(!task.completed());
    }

    #[test]
    fn test_weekly_task_is_optional() {
        let mut payload = sample_payload();
        payload.as_object_mut().unwrap().remove("weekly_task");
        let notes: ZzzNotes = decode_value(&payload).unwrap();
        assert!(notes.weekly_task.is_none());
    }

    #[test]
    fn test_missing_and_mistyped_fields() {
        let mut payload = sample_payload();
        payload.as_object_mut().unwrap().remove("vitality");
        let err = decode_value::<ZzzNotes>(&payload).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MissingField {
                field: "vitality".to_string()
            }
        );

        let mut payload = sample_payload();
        payload["energy"]["progress"]["max"] = json!("240");
        let err = decode_value::<ZzzNotes>(&payload).unwrap_err();
        assert_eq!(err.field(), "energy.max");
        assert_eq!(err.kind(), "type_mismatch");
    }

    #[test]
    fn test_encode_uses_semantic_names() {
        let notes: ZzzNotes = decode_value(&sample_payload()).unwrap();
        let encoded = serde_json::to_value(&notes).unwrap();
        assert_eq!(encoded["battery_charge"]["seconds_till_full"], json!(28800));
        assert_eq!(encoded["scratch_card_completed"], json!("CardSignDone"));
        assert_eq!(encoded["video_store_state"], json!("SaleStateDoing"));
        assert_eq!(
            encoded["hollow_zero"]["bounty_commission"]["completed_count"],
            json!(3)
        );
    }

    #[test]
    fn test_round_trip() {
        let notes: ZzzNotes = decode_value(&sample_payload()).unwrap();
        let encoded = serde_json::to_value(&notes).unwrap();
        let decoded: ZzzNotes = decode_value(&encoded).unwrap();
        assert_eq!(decoded, notes);

        let mut payload = sample_payload();
        let obj = payload.as_object_mut().unwrap();
        obj.remove("weekly_task");
        obj.remove("survey_points");
        obj.insert("card_sign".to_string(), json!("CardSignNotDone"));
        let notes: ZzzNotes = decode_value(&payload).unwrap();
        let decoded: ZzzNotes = decode_value(&serde_json::to_value(&notes).unwrap()).unwrap();
        assert_eq!(decoded, notes);
    }
}
