//! CSV export of the derived session table.

use std::io::Write;

use chrono::{DateTime, Datelike, FixedOffset};

use crate::format::weekday_ko;
use crate::schedule::ScheduleSpec;

/// Writes every session in the spec as one CSV row: date, weekday, start,
/// end, duration in minutes, cost at the given burn rate, and status as of
/// `now`.
pub fn write_sessions_csv<W: Write>(
    out: W,
    spec: &ScheduleSpec,
    now: DateTime<FixedOffset>,
    per_second: f64,
) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "date", "weekday", "start", "end", "minutes", "cost_krw", "status",
    ])?;

    for session in spec.sessions() {
        let cost = session.duration_secs() as f64 * per_second;
        wtr.write_record([
            session.start.format("%Y-%m-%d").to_string(),
            weekday_ko(session.start.weekday()).to_string(),
            session.start.format("%H:%M").to_string(),
            session.end.format("%H:%M").to_string(),
            (session.duration_secs() / 60).to_string(),
            format!("{cost:.0}"),
            session.status(now).to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
