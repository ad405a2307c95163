//! Presentation strings for the meter: KRW amounts, Korean durations, and
//! the hint lines. None of this feeds back into the calculation.

use chrono::{DateTime, FixedOffset, Weekday};
use itertools::Itertools;
use time_humanize::{Accuracy, HumanTime, Tense};

use crate::money::CostBreakdown;
use crate::schedule::{ElapsedResult, ScheduleMode, ScheduleSpec};

/// `₩1,234,567` (rounded to whole won).
pub fn format_krw0(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}₩{}", sign, group_thousands(amount.abs().round() as u64))
}

/// `₩1,234,567.89` (two decimal digits, the live display format).
pub fn format_krw2(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    format!("{}₩{}.{:02}", sign, group_thousands(cents / 100), cents % 100)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap())
        .join(",")
}

/// `H시간 M분`, or `M분` under one hour. Negative inputs clamp to zero.
pub fn format_duration_min(minutes: i64) -> String {
    let m = minutes.max(0);
    if m >= 60 {
        format!("{}시간 {}분", m / 60, m % 60)
    } else {
        format!("{m}분")
    }
}

/// Whole hours read better without a trailing `0분`.
fn hours_text(minutes: i64) -> String {
    if minutes >= 60 && minutes % 60 == 0 {
        format!("{}시간", minutes / 60)
    } else {
        format_duration_min(minutes)
    }
}

pub fn percent_text(ratio: f64) -> String {
    format!("{}%", (ratio * 100.0).round() as i64)
}

pub fn weekday_ko(w: Weekday) -> &'static str {
    match w {
        Weekday::Mon => "월",
        Weekday::Tue => "화",
        Weekday::Wed => "수",
        Weekday::Thu => "목",
        Weekday::Fri => "금",
        Weekday::Sat => "토",
        Weekday::Sun => "일",
    }
}

pub fn rate_text(breakdown: &CostBreakdown) -> String {
    format!(
        "현재 속도: 분당 약 {} • 초당 약 {:.2}원",
        format_krw0(breakdown.per_minute),
        breakdown.per_second
    )
}

/// One-line schedule description, e.g. `수업: 수 3시간 / 토 6시간 • 총 144시간`.
pub fn schedule_text(spec: &ScheduleSpec, total_secs: i64) -> String {
    let total = hours_text(total_secs / 60);
    match &spec.mode {
        ScheduleMode::WeeklyPlan { plans } => {
            let days = plans
                .iter()
                .map(|p| format!("{} {}", weekday_ko(p.weekday), hours_text(i64::from(p.minutes))))
                .join(" / ");
            format!("수업: {days} • 총 {total}")
        }
        ScheduleMode::WeekdayCalendar {
            weekdays,
            start_time,
            minutes,
            ..
        } => {
            let days = weekdays.iter().map(|w| weekday_ko(*w)).join("·");
            format!(
                "수업: {days} {} {} • 총 {total}",
                start_time.format("%H:%M"),
                hours_text(i64::from(*minutes))
            )
        }
        ScheduleMode::Linear => format!(
            "수업: {} ~ {} 전체 기간 • 총 {total}",
            spec.start.format("%Y-%m-%d"),
            spec.end.format("%Y-%m-%d")
        ),
    }
}

/// `남은 수업시간 H시간 M분`, minutes rounded like the meter display.
pub fn time_left_text(result: &ElapsedResult) -> String {
    let minutes = (result.remaining_secs() as f64 / 60.0).round() as i64;
    format!("남은 수업시간 {}", format_duration_min(minutes))
}

/// English footer hint, wall-clock time until the semester bound.
pub fn semester_end_hint(now: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> String {
    if now >= end {
        return "semester is over".to_string();
    }
    let secs = (end - now).num_seconds().max(0) as u64;
    let human = HumanTime::from(std::time::Duration::from_secs(secs));
    format!("semester ends {}", human.to_text_en(Accuracy::Rough, Tense::Future))
}
