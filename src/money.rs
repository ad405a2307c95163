//! Maps an elapsed/total ratio onto the tuition amount.

use crate::schedule::ElapsedResult;

/// Monetary view of one schedule evaluation, all amounts in KRW.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    /// Elapsed fraction of the schedule, clamped to [0, 1].
    pub ratio: f64,
    pub used: f64,
    pub remaining: f64,
    pub per_second: f64,
    pub per_minute: f64,
}

/// Linear apportioning of `tuition` across the schedule.
///
/// A non-finite or negative tuition is treated as 0 rather than an error,
/// and the rate denominator is floored at one second so an empty schedule
/// cannot divide by zero.
pub fn map_to_currency(result: &ElapsedResult, tuition: f64) -> CostBreakdown {
    let tuition = if tuition.is_finite() && tuition > 0.0 {
        tuition
    } else {
        0.0
    };

    let ratio = if result.total_secs > 0 {
        (result.elapsed_secs as f64 / result.total_secs as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let used = tuition * ratio;
    let per_second = tuition / result.total_secs.max(1) as f64;

    CostBreakdown {
        ratio,
        used,
        remaining: tuition - used,
        per_second,
        per_minute: per_second * 60.0,
    }
}
