//! Collection period parsing.

use std::time::Duration;

/// Parse a collection period such as `500ms`, `2s` or `1m30s`.
///
/// Returns `None` when the period is unparsable or not strictly positive,
/// which callers treat as "periodic collection disabled".
#[must_use]
pub fn parse_period(period: &str) -> Option<Duration> {
    let interval = humantime::parse_duration(period.trim()).ok()?;
    (!interval.is_zero()).then_some(interval)
}
