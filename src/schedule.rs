//! Semester schedule model and the elapsed-class-time evaluator.
//!
//! A [`ScheduleSpec`] describes when class happens between two semester
//! bounds; [`ScheduleSpec::compute_elapsed`] reduces it to total and elapsed
//! schedulable seconds as of a query instant. Evaluation is a pure function
//! of `(spec, instant)` with no hidden state, so it can be re-run on every
//! tick.
//!
//! Boundary rules: a session exactly at its end contributes its full
//! duration, a session exactly at its start contributes nothing yet.

use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Weekday,
};
use serde::{Deserialize, Serialize};

/// One recurring class day in a weekly plan, anchored at local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    #[serde(with = "weekday_str")]
    pub weekday: Weekday,
    pub minutes: u32,
}

/// A concrete class occurrence derived from the spec for one calendar date.
/// Ephemeral; recomputed on demand, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Session {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
    Past,
    InProgress,
    Upcoming,
}

impl Session {
    pub fn duration_secs(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// Status uses the same boundary convention as accrual: a session at its
    /// end instant is already past, one at its start instant is still upcoming.
    pub fn status(&self, now: DateTime<FixedOffset>) -> SessionStatus {
        if now >= self.end {
            SessionStatus::Past
        } else if now > self.start {
            SessionStatus::InProgress
        } else {
            SessionStatus::Upcoming
        }
    }
}

/// Output of one schedule evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElapsedResult {
    pub total_secs: i64,
    pub elapsed_secs: i64,
    /// The session `now` falls strictly inside, if any.
    pub current: Option<Session>,
}

impl ElapsedResult {
    pub fn remaining_secs(&self) -> i64 {
        self.total_secs - self.elapsed_secs
    }
}

/// Immutable schedule configuration: semester bounds plus one scheduling mode.
///
/// Serialized form is a flat JSON object; the `mode` tag selects the variant:
///
/// ```json
/// {
///   "start": "2025-09-02T00:00:00+09:00",
///   "end": "2025-12-20T23:59:59+09:00",
///   "mode": "weekly_plan",
///   "plans": [{ "weekday": "wed", "minutes": 180 }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSpec {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    #[serde(flatten)]
    pub mode: ScheduleMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScheduleMode {
    /// Recurring (weekday, minutes) pairs, sessions anchored at midnight.
    WeeklyPlan { plans: Vec<DayPlan> },
    /// Fixed weekday set with a start time-of-day, duration, and excluded
    /// holiday dates.
    WeekdayCalendar {
        #[serde(with = "weekday_list")]
        weekdays: Vec<Weekday>,
        start_time: NaiveTime,
        minutes: u32,
        #[serde(default)]
        holidays: Vec<NaiveDate>,
    },
    /// The whole semester window counts as one continuous session.
    Linear,
}

impl ScheduleSpec {
    pub fn offset(&self) -> FixedOffset {
        *self.start.offset()
    }

    /// Configuration preconditions. Checked when loading a user-supplied
    /// schedule file; evaluation itself never fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.start >= self.end {
            return Err("semester start must be before semester end".into());
        }
        match &self.mode {
            ScheduleMode::WeeklyPlan { plans } => {
                if plans.is_empty() {
                    return Err("weekly plan needs at least one class day".into());
                }
                if plans.iter().any(|p| p.minutes == 0) {
                    return Err("class duration must be positive".into());
                }
            }
            ScheduleMode::WeekdayCalendar {
                weekdays, minutes, ..
            } => {
                if weekdays.is_empty() {
                    return Err("calendar needs at least one class weekday".into());
                }
                if *minutes == 0 {
                    return Err("class duration must be positive".into());
                }
            }
            ScheduleMode::Linear => {}
        }
        Ok(())
    }

    /// Every concrete session in the semester, sorted by start instant.
    /// For `Linear` the whole window is the single session.
    pub fn sessions(&self) -> Vec<Session> {
        let offset = self.offset();
        let last_date = self.end.date_naive();
        let mut sessions = match &self.mode {
            ScheduleMode::WeeklyPlan { plans } => {
                let mut out = Vec::new();
                for plan in plans {
                    let mut date = first_on_or_after(self.start.date_naive(), plan.weekday);
                    while date <= last_date {
                        let start = at_local(date, NaiveTime::MIN, offset);
                        out.push(Session {
                            start,
                            end: start + Duration::minutes(i64::from(plan.minutes)),
                        });
                        date = date + Days::new(7);
                    }
                }
                out
            }
            ScheduleMode::WeekdayCalendar {
                weekdays,
                start_time,
                minutes,
                holidays,
            } => {
                let mut out = Vec::new();
                let mut date = self.start.date_naive();
                while date <= last_date {
                    if weekdays.contains(&date.weekday()) && !holidays.contains(&date) {
                        let start = at_local(date, *start_time, offset);
                        out.push(Session {
                            start,
                            end: start + Duration::minutes(i64::from(*minutes)),
                        });
                    }
                    date = date + Days::new(1);
                }
                out
            }
            ScheduleMode::Linear => vec![Session {
                start: self.start,
                end: self.end,
            }],
        };
        sessions.sort_by_key(|s| s.start);
        sessions
    }

    /// Total and elapsed schedulable seconds as of `now`.
    ///
    /// The total is produced by the same accrual walk with the bound pinned
    /// to the semester end, so `now >= end` yields `elapsed == total` even
    /// when a session straddles the semester end.
    pub fn compute_elapsed(&self, now: DateTime<FixedOffset>) -> ElapsedResult {
        let sessions = self.sessions();
        let total_secs = accrue(&sessions, self.end);

        let elapsed_secs = if now <= self.start {
            0
        } else {
            accrue(&sessions, now.min(self.end)).min(total_secs)
        };

        let current = sessions
            .iter()
            .find(|s| s.start < now && now < s.end)
            .copied();

        ElapsedResult {
            total_secs,
            elapsed_secs,
            current,
        }
    }
}

/// Seconds of class time accrued at or before `bound`: full duration once the
/// session end has passed, whole elapsed seconds while inside, none before
/// the session start.
fn accrue(sessions: &[Session], bound: DateTime<FixedOffset>) -> i64 {
    sessions
        .iter()
        .map(|s| {
            if bound >= s.end {
                s.duration_secs()
            } else if bound > s.start {
                (bound - s.start).num_seconds()
            } else {
                0
            }
        })
        .sum()
}

fn first_on_or_after(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    let diff =
        (weekday.num_days_from_monday() + 7 - date.weekday().num_days_from_monday()) % 7;
    date + Days::new(u64::from(diff))
}

// A fixed offset has no DST gaps, so every local datetime maps to exactly
// one instant.
fn at_local(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> DateTime<FixedOffset> {
    offset.from_local_datetime(&date.and_time(time)).unwrap()
}

fn kst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
}

/// The built-in schedule: Wednesdays 3h and Saturdays 6h, fall semester 2025,
/// Seoul time.
pub fn preset_weekly() -> ScheduleSpec {
    ScheduleSpec {
        start: kst().with_ymd_and_hms(2025, 9, 2, 0, 0, 0).unwrap(),
        end: kst().with_ymd_and_hms(2025, 12, 20, 23, 59, 59).unwrap(),
        mode: ScheduleMode::WeeklyPlan {
            plans: vec![
                DayPlan {
                    weekday: Weekday::Wed,
                    minutes: 180,
                },
                DayPlan {
                    weekday: Weekday::Sat,
                    minutes: 360,
                },
            ],
        },
    }
}

/// Mon/Wed/Fri mornings with the Chuseok break excluded.
pub fn preset_calendar() -> ScheduleSpec {
    ScheduleSpec {
        start: kst().with_ymd_and_hms(2025, 9, 2, 0, 0, 0).unwrap(),
        end: kst().with_ymd_and_hms(2025, 12, 20, 23, 59, 59).unwrap(),
        mode: ScheduleMode::WeekdayCalendar {
            weekdays: vec![Weekday::Mon, Weekday::Wed, Weekday::Fri],
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            minutes: 120,
            holidays: vec![
                NaiveDate::from_ymd_opt(2025, 9, 15).unwrap(),
                NaiveDate::from_ymd_opt(2025, 9, 16).unwrap(),
            ],
        },
    }
}

/// The whole semester window as one continuous burn.
pub fn preset_linear() -> ScheduleSpec {
    ScheduleSpec {
        start: kst().with_ymd_and_hms(2025, 9, 2, 0, 0, 0).unwrap(),
        end: kst().with_ymd_and_hms(2025, 12, 20, 23, 59, 59).unwrap(),
        mode: ScheduleMode::Linear,
    }
}

pub(crate) fn weekday_name(w: Weekday) -> &'static str {
    match w {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

mod weekday_str {
    use chrono::Weekday;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(w: &Weekday, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(super::weekday_name(*w))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Weekday, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse::<Weekday>()
            .map_err(|_| D::Error::custom(format!("invalid weekday: {raw}")))
    }
}

mod weekday_list {
    use chrono::Weekday;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ws: &[Weekday], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(ws.iter().map(|w| super::weekday_name(*w)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Weekday>, D::Error> {
        let raw = Vec::<String>::deserialize(d)?;
        raw.into_iter()
            .map(|x| {
                x.parse::<Weekday>()
                    .map_err(|_| D::Error::custom(format!("invalid weekday: {x}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
        kst().with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn first_on_or_after_same_day_and_wrap() {
        let tue = NaiveDate::from_ymd_opt(2025, 9, 2).unwrap();
        assert_eq!(
            first_on_or_after(tue, Weekday::Tue),
            NaiveDate::from_ymd_opt(2025, 9, 2).unwrap()
        );
        assert_eq!(
            first_on_or_after(tue, Weekday::Wed),
            NaiveDate::from_ymd_opt(2025, 9, 3).unwrap()
        );
        assert_eq!(
            first_on_or_after(tue, Weekday::Mon),
            NaiveDate::from_ymd_opt(2025, 9, 8).unwrap()
        );
    }

    #[test]
    fn weekly_preset_total_is_sixteen_weeks_of_each_plan() {
        let spec = preset_weekly();
        let sessions = spec.sessions();
        // 16 Wednesdays (Sep 3 .. Dec 17) and 16 Saturdays (Sep 6 .. Dec 20)
        assert_eq!(sessions.len(), 32);
        let result = spec.compute_elapsed(at(2026, 1, 1, 0, 0, 0));
        assert_eq!(result.total_secs, 16 * 180 * 60 + 16 * 360 * 60);
        assert_eq!(result.total_secs, 518_400);
    }

    #[test]
    fn elapsed_is_zero_at_or_before_semester_start() {
        let spec = preset_weekly();
        for now in [at(2025, 9, 2, 0, 0, 0), at(2025, 8, 1, 12, 0, 0)] {
            let result = spec.compute_elapsed(now);
            assert_eq!(result.elapsed_secs, 0);
            assert_eq!(result.current, None);
        }
    }

    #[test]
    fn elapsed_equals_total_at_or_after_semester_end() {
        for spec in [preset_weekly(), preset_calendar(), preset_linear()] {
            for now in [spec.end, at(2026, 3, 1, 0, 0, 0)] {
                let result = spec.compute_elapsed(now);
                assert_eq!(result.elapsed_secs, result.total_secs);
            }
        }
    }

    #[test]
    fn first_wednesday_session_accrues_fully_at_its_end_instant() {
        // Wed 2025-09-03 is midnight-anchored; 180 minutes in, the session is
        // exactly over and must count in full.
        let spec = preset_weekly();
        let result = spec.compute_elapsed(at(2025, 9, 3, 3, 0, 0));
        assert_eq!(result.elapsed_secs, 10_800);
        // At the end instant the session is no longer "in progress".
        assert_eq!(result.current, None);
    }

    #[test]
    fn session_at_its_start_instant_contributes_nothing() {
        let spec = preset_weekly();
        let result = spec.compute_elapsed(at(2025, 9, 3, 0, 0, 0));
        assert_eq!(result.elapsed_secs, 0);
        assert_eq!(result.current, None);
    }

    #[test]
    fn partial_session_accrues_whole_seconds() {
        let spec = preset_weekly();
        let result = spec.compute_elapsed(at(2025, 9, 3, 1, 0, 0));
        assert_eq!(result.elapsed_secs, 3_600);
        let current = result.current.unwrap();
        assert_eq!(current.start, at(2025, 9, 3, 0, 0, 0));
        assert_eq!(current.end, at(2025, 9, 3, 3, 0, 0));
    }

    #[test]
    fn elapsed_is_monotonic_in_now() {
        let spec = preset_weekly();
        let mut prev = 0;
        let mut now = at(2025, 8, 30, 0, 0, 0);
        let last = at(2025, 12, 25, 0, 0, 0);
        while now <= last {
            let elapsed = spec.compute_elapsed(now).elapsed_secs;
            assert!(elapsed >= prev, "elapsed decreased at {now}");
            prev = elapsed;
            now = now + Duration::hours(7);
        }
    }

    #[test]
    fn evaluation_is_idempotent() {
        let spec = preset_calendar();
        let now = at(2025, 10, 8, 9, 45, 0);
        assert_eq!(spec.compute_elapsed(now), spec.compute_elapsed(now));
    }

    #[test]
    fn holidays_are_excluded_from_total_and_elapsed() {
        let spec = preset_calendar();
        let sessions = spec.sessions();
        let holiday = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
        assert!(sessions.iter().all(|s| s.start.date_naive() != holiday));

        // Mondays Sep 8 vs the skipped Sep 15: elapsed after the holiday week
        // only grows by the Wed/Fri sessions.
        let before = spec.compute_elapsed(at(2025, 9, 14, 0, 0, 0));
        let after = spec.compute_elapsed(at(2025, 9, 16, 0, 0, 0));
        assert_eq!(after.elapsed_secs, before.elapsed_secs);
    }

    #[test]
    fn calendar_session_in_progress_is_reported() {
        let spec = preset_calendar();
        let result = spec.compute_elapsed(at(2025, 9, 3, 10, 0, 0));
        let current = result.current.unwrap();
        assert_eq!(current.start, at(2025, 9, 3, 9, 0, 0));
        assert_eq!(current.end, at(2025, 9, 3, 11, 0, 0));
        assert_eq!(current.status(at(2025, 9, 3, 10, 0, 0)), SessionStatus::InProgress);
    }

    #[test]
    fn linear_total_spans_the_whole_window() {
        let spec = preset_linear();
        let result = spec.compute_elapsed(at(2025, 9, 2, 0, 0, 0));
        assert_eq!(result.total_secs, 109 * 86_400 + 86_399);
        assert_eq!(result.elapsed_secs, 0);
    }

    #[test]
    fn linear_midpoint_is_half_elapsed() {
        let spec = preset_linear();
        let total = spec.compute_elapsed(spec.start).total_secs;
        let mid = spec.start + Duration::seconds(total / 2);
        let result = spec.compute_elapsed(mid);
        assert!((result.elapsed_secs - total / 2).abs() <= 1);
    }

    #[test]
    fn session_status_boundaries() {
        let session = Session {
            start: at(2025, 9, 3, 9, 0, 0),
            end: at(2025, 9, 3, 11, 0, 0),
        };
        assert_eq!(session.status(at(2025, 9, 3, 9, 0, 0)), SessionStatus::Upcoming);
        assert_eq!(session.status(at(2025, 9, 3, 9, 0, 1)), SessionStatus::InProgress);
        assert_eq!(session.status(at(2025, 9, 3, 11, 0, 0)), SessionStatus::Past);
        assert_eq!(SessionStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn schedule_file_format_parses() {
        let json = r#"{
            "start": "2025-09-02T00:00:00+09:00",
            "end": "2025-12-20T23:59:59+09:00",
            "mode": "weekly_plan",
            "plans": [
                { "weekday": "wed", "minutes": 180 },
                { "weekday": "sat", "minutes": 360 }
            ]
        }"#;
        let spec: ScheduleSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec, preset_weekly());

        let json = r#"{
            "start": "2025-09-02T00:00:00+09:00",
            "end": "2025-12-20T23:59:59+09:00",
            "mode": "weekday_calendar",
            "weekdays": ["mon", "wed", "fri"],
            "start_time": "09:00:00",
            "minutes": 120,
            "holidays": ["2025-09-15", "2025-09-16"]
        }"#;
        let spec: ScheduleSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec, preset_calendar());
        assert_matches!(spec.mode, ScheduleMode::WeekdayCalendar { .. });
    }

    #[test]
    fn validate_rejects_malformed_specs() {
        let mut spec = preset_weekly();
        assert!(spec.validate().is_ok());

        spec.end = spec.start;
        assert!(spec.validate().is_err());

        let mut spec = preset_weekly();
        spec.mode = ScheduleMode::WeeklyPlan { plans: vec![] };
        assert!(spec.validate().is_err());

        let mut spec = preset_calendar();
        if let ScheduleMode::WeekdayCalendar { minutes, .. } = &mut spec.mode {
            *minutes = 0;
        }
        assert!(spec.validate().is_err());
    }
}
