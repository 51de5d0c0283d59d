//! Schedule evaluation for agent configs.
//!
//! Configs carry standard 5-field Unix cron expressions (minute, hour,
//! day-of-month, month, day-of-week). The `cron` crate wants a 6-field
//! format with seconds, so expressions are normalized before parsing.
//!
//! An expression that fails to parse degrades to an hourly schedule instead
//! of erroring: a mis-scheduled agent is recoverable from the dashboard, a
//! crashed tick is not.

use chrono::{DateTime, Timelike, Utc};
use cron::Schedule;
use std::str::FromStr;
use tracing::warn;

/// Convert a 5-field Unix cron expression to the 6-field format the `cron`
/// crate parses, firing at second 0 of each match. 6+ fields pass through.
fn normalize_cron_expr(cron_expr: &str) -> String {
    let fields: Vec<&str> = cron_expr.split_whitespace().collect();
    if fields.len() == 5 {
        format!("0 {}", cron_expr)
    } else {
        cron_expr.to_string()
    }
}

fn truncate_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

/// Validate a cron expression without evaluating it. Used by the admin API
/// to attach a warning to writes the evaluator will treat as hourly.
pub fn validate_cron(cron_expr: &str) -> Result<(), String> {
    let normalized = normalize_cron_expr(cron_expr);
    Schedule::from_str(&normalized)
        .map(|_| ())
        .map_err(|e| format!("Invalid cron expression '{}': {}", cron_expr, e))
}

/// Decide whether an agent is due at `now`.
///
/// Due means: the current tick's minute matches the expression, and no run
/// for the agent already started within that same minute. The second clause
/// keeps a tick idempotent: two coordinator invocations landing in the same
/// matching minute trigger once.
///
/// Pure: never touches storage.
pub fn is_due(
    cron_expr: &str,
    now: DateTime<Utc>,
    last_run_start: Option<DateTime<Utc>>,
) -> bool {
    let this_minute = truncate_to_minute(now);

    let normalized = normalize_cron_expr(cron_expr);
    let matches = match Schedule::from_str(&normalized) {
        Ok(schedule) => schedule.includes(this_minute),
        Err(e) => {
            warn!(
                "Unparseable schedule '{}' ({}); falling back to hourly",
                cron_expr, e
            );
            this_minute.minute() == 0
        }
    };
    if !matches {
        return false;
    }

    match last_run_start {
        Some(last) => truncate_to_minute(last) != this_minute,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 7, hour, minute, second).unwrap()
    }

    #[test]
    fn normalize_prepends_seconds_to_five_fields() {
        assert_eq!(normalize_cron_expr("* * * * *"), "0 * * * * *");
        assert_eq!(normalize_cron_expr("0 * * * *"), "0 0 * * * *");
        // Already 6 fields: unchanged.
        assert_eq!(normalize_cron_expr("0 0 * * * *"), "0 0 * * * *");
    }

    #[test]
    fn every_minute_is_due_without_prior_run() {
        assert!(is_due("* * * * *", at(10, 3, 17), None));
    }

    #[test]
    fn same_minute_rerun_is_suppressed() {
        let now = at(10, 3, 40);
        let last = at(10, 3, 5);
        assert!(!is_due("* * * * *", now, Some(last)));
        // A run from the previous minute does not suppress.
        assert!(is_due("* * * * *", now, Some(at(10, 2, 59))));
    }

    #[test]
    fn hourly_schedule_matches_only_minute_zero() {
        assert!(is_due("0 * * * *", at(10, 0, 30), None));
        assert!(!is_due("0 * * * *", at(10, 1, 0), None));
    }

    #[test]
    fn step_hours_skip_off_cycle_hours() {
        // Every 6 hours at minute 0; last run an hour ago, current hour not
        // a multiple of six: not due.
        let now = at(7, 0, 0);
        let last = at(6, 0, 0);
        assert!(!is_due("0 */6 * * *", now, Some(last)));
        assert!(is_due("0 */6 * * *", at(12, 0, 0), Some(last)));
        assert!(is_due("0 */6 * * *", at(0, 0, 10), None));
    }

    #[test]
    fn unparseable_expression_degrades_to_hourly() {
        assert!(is_due("every tuesday at dawn", at(10, 0, 0), None));
        assert!(!is_due("every tuesday at dawn", at(10, 5, 0), None));
        // The fallback still honors same-minute suppression.
        assert!(!is_due("every tuesday at dawn", at(10, 0, 45), Some(at(10, 0, 2))));
    }

    #[test]
    fn validate_accepts_standard_and_rejects_garbage() {
        assert!(validate_cron("* * * * *").is_ok());
        assert!(validate_cron("0 */6 * * *").is_ok());
        assert!(validate_cron("0 9 * * *").is_ok());
        assert!(validate_cron("").is_err());
        assert!(validate_cron("not a schedule").is_err());
    }
}
