//! Live meter state: the spec and tuition, plus the last observation.
//!
//! Until the first observation the meter is not ready and the UI shows
//! placeholders; after that every tick replaces the snapshot wholesale, so
//! rendering never mixes values from two instants.

use chrono::{DateTime, FixedOffset, Utc};

use crate::format;
use crate::money::map_to_currency;
use crate::schedule::{ScheduleSpec, Session};

/// Everything the presentation layer needs from one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Normalized fill for the progress gauge.
    pub ratio: f64,
    /// Burn rate in KRW per second, for per-session cost displays.
    pub per_second: f64,
    pub pct_text: String,
    pub used_krw0: String,
    pub used_krw2: String,
    pub remain_krw0: String,
    pub remain_krw2: String,
    pub rate_text: String,
    pub schedule_text: String,
    pub time_left_text: String,
    pub end_hint: String,
    pub current: Option<Session>,
}

/// One pure evaluation of `(spec, tuition, now)` down to display strings.
pub fn build_snapshot(
    spec: &ScheduleSpec,
    tuition_krw: u64,
    now: DateTime<FixedOffset>,
) -> Snapshot {
    let result = spec.compute_elapsed(now);
    let breakdown = map_to_currency(&result, tuition_krw as f64);
    Snapshot {
        ratio: breakdown.ratio,
        per_second: breakdown.per_second,
        pct_text: format::percent_text(breakdown.ratio),
        used_krw0: format::format_krw0(breakdown.used),
        used_krw2: format::format_krw2(breakdown.used),
        remain_krw0: format::format_krw0(breakdown.remaining),
        remain_krw2: format::format_krw2(breakdown.remaining),
        rate_text: format::rate_text(&breakdown),
        schedule_text: format::schedule_text(spec, result.total_secs),
        time_left_text: format::time_left_text(&result),
        end_hint: format::semester_end_hint(now, spec.end),
        current: result.current,
    }
}

#[derive(Debug)]
pub struct Meter {
    pub spec: ScheduleSpec,
    tuition_krw: u64,
    observed_at: Option<DateTime<FixedOffset>>,
    snapshot: Option<Snapshot>,
}

impl Meter {
    pub fn new(spec: ScheduleSpec, tuition_krw: u64) -> Self {
        Self {
            spec,
            tuition_krw,
            observed_at: None,
            snapshot: None,
        }
    }

    /// False until the first measurement; the UI renders placeholders
    /// instead of a value it has not computed yet.
    pub fn is_ready(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn tuition_krw(&self) -> u64 {
        self.tuition_krw
    }

    pub fn observed_at(&self) -> Option<DateTime<FixedOffset>> {
        self.observed_at
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Re-evaluates at `now`. Pure in `(spec, tuition, now)`; observing the
    /// same instant twice produces an identical snapshot.
    pub fn observe(&mut self, now: DateTime<FixedOffset>) {
        self.observed_at = Some(now);
        self.snapshot = Some(build_snapshot(&self.spec, self.tuition_krw, now));
    }

    pub fn on_tick(&mut self) {
        let now = Utc::now().with_timezone(&self.spec.offset());
        self.observe(now);
    }

    /// Changes the tuition and recomputes at the last observed instant, so
    /// the display updates without waiting for the next tick.
    pub fn set_tuition(&mut self, tuition_krw: u64) {
        self.tuition_krw = tuition_krw;
        if let Some(at) = self.observed_at {
            self.observe(at);
        }
    }
}
