//! Helpers for differencing cumulative counters.

/// Difference between two readings of a monotonic counter.
///
/// A counter that went backwards was restarted (e.g. on renegotiation), so
/// the current reading is the amount accumulated since the restart.
pub(crate) fn counter_delta(current: Option<u64>, previous: Option<u64>) -> Option<f64> {
    match (current, previous) {
        (Some(current), Some(previous)) if current >= previous => Some((current - previous) as f64),
        (Some(current), Some(_)) => Some(current as f64),
        _ => None,
    }
}

/// Difference between two readings of a counter that may legitimately
/// decrease, such as `packetsLost` which goes down when duplicates arrive.
pub(crate) fn signed_delta(current: Option<i64>, previous: Option<i64>) -> Option<f64> {
    Some(current? as f64 - previous? as f64)
}

pub(crate) fn float_delta(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    Some(current? - previous?)
}

/// `lost / total`, or 0 when nothing was expected in the interval.
pub(crate) fn loss_ratio(lost: f64, total: f64) -> f64 {
    if total <= 0.0 {
        0.0
    } else {
        lost / total
    }
}
