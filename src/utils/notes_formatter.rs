use chrono::{DateTime, FixedOffset, Utc};

use crate::models::{
    split_duration, DecodedNotes, ExpeditionStatus, GenshinNotes, VideoStoreState, ZzzNotes,
};
use crate::utils::clock::Clock;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn fmt_time(time: DateTime<Utc>, offset: &FixedOffset) -> String {
    time.with_timezone(offset).format(TIME_FORMAT).to_string()
}

fn done_label(done: bool) -> &'static str {
    if done {
        "已完成"
    } else {
        "未完成"
    }
}

fn video_store_label(state: VideoStoreState) -> &'static str {
    match state {
        VideoStoreState::RevenueAvailable => "可领取收益",
        VideoStoreState::WaitingToOpen => "待营业",
        VideoStoreState::CurrentlyOpen => "营业中",
    }
}

/// 绝区零便笺的文字摘要
pub fn format_zzz_notes(notes: &ZzzNotes, clock: &impl Clock, offset: &FixedOffset) -> String {
    let mut lines = Vec::new();

    let battery = &notes.battery_charge;
    if battery.is_full() {
        lines.push(format!("电量: {}/{} (已回满)", battery.current, battery.max));
    } else {
        lines.push(format!(
            "电量: {}/{} (预计 {} 回满)",
            battery.current,
            battery.max,
            fmt_time(battery.full_at(clock), offset)
        ));
    }

    lines.push(format!(
        "活跃度: {}/{}",
        notes.engagement.current, notes.engagement.max
    ));
    lines.push(format!("刮刮卡: {}", done_label(notes.scratch_card_completed)));
    lines.push(format!("录像店: {}", video_store_label(notes.video_store_state)));

    match &notes.hollow_zero.bounty_commission {
        Some(bounty) => lines.push(format!(
            "悬赏委托: {}/{} ({}, {} 刷新)",
            bounty.completed_count,
            bounty.total,
            done_label(bounty.completed()),
            fmt_time(bounty.reset_at(clock), offset)
        )),
        None => lines.push("悬赏委托: 未解锁".to_string()),
    }

    match &notes.hollow_zero.investigation_point {
        Some(survey) => lines.push(format!(
            "调查点数: {}/{}{}",
            survey.count,
            survey.total,
            if survey.is_max_level { " (is_max_level=true)" } else { "" }
        )),
        None => lines.push("调查点数: 未解锁".to_string()),
    }

    if let Some(weekly) = &notes.weekly_task {
        lines.push(format!(
            "丽都周纪: {}/{} ({}, {} 刷新)",
            weekly.current_point,
            weekly.max_point,
            done_label(weekly.completed()),
            fmt_time(weekly.reset_at(clock), offset)
        ));
    }

    lines.join("\n")
}

/// 原神便笺的文字摘要
pub fn format_genshin_notes(notes: &GenshinNotes, clock: &impl Clock, offset: &FixedOffset) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "原粹树脂: {}/{} (预计 {} 回满)",
        notes.current_resin,
        notes.max_resin,
        fmt_time(notes.resin_recovery_time(clock), offset)
    ));
    lines.push(format!(
        "洞天宝钱: {}/{} (预计 {} 达到上限)",
        notes.current_realm_currency,
        notes.max_realm_currency,
        fmt_time(notes.realm_currency_recovery_time(clock), offset)
    ));
    lines.push(format!(
        "每日委托: {}/{} (额外奖励{})",
        notes.completed_commissions,
        notes.max_commissions,
        if notes.claimed_commission_reward { "已领取" } else { "未领取" }
    ));
    lines.push(format!(
        "周本减半: {}/{}",
        notes.remaining_resin_discounts, notes.max_resin_discounts
    ));

    match (notes.transformer_countdown(), notes.transformer_recovery_time(clock)) {
        (Some((days, hours, minutes, seconds)), Some(ready_at)) => lines.push(format!(
            "参量质变仪: {days}天{hours}时{minutes}分{seconds}秒 ({} 可用)",
            fmt_time(ready_at, offset)
        )),
        _ => lines.push("参量质变仪: 未获得".to_string()),
    }

    lines.push(format!(
        "探索派遣: {}/{}",
        notes.expeditions.len(),
        notes.max_expeditions
    ));
    for expedition in &notes.expeditions {
        if expedition.finished() || expedition.status == ExpeditionStatus::Finished {
            lines.push("  - 已完成".to_string());
        } else {
            let (days, hours, minutes, _) = split_duration(expedition.remaining_time);
            lines.push(format!(
                "  - 进行中, 剩余 {}时{}分 ({} 完成)",
                days * 24 + hours,
                minutes,
                fmt_time(expedition.completion_time(clock), offset)
            ));
        }
    }

    lines.join("\n")
}

pub fn format_notes(notes: &DecodedNotes, clock: &impl Clock, offset: &FixedOffset) -> String {
    match notes {
        DecodedNotes::Zzz(notes) => format_zzz_notes(notes, clock, offset),
        DecodedNotes::Genshin(notes) => format_genshin_notes(notes, clock, offset),
    }
}
