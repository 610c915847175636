//! SLA urgency evaluation.
//!
//! A pure classification of a task's urgency from its due date and current
//! status. No storage, no clock access: `now` is always an explicit
//! parameter so callers (and tests) control time.
//!
//! Due dates are calendar days. They evaluate at midnight UTC, so a stored
//! day always compares as that day regardless of the evaluating machine's
//! timezone.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Statuses for which SLA tracking is suppressed entirely.
///
/// Matching is exact and case-sensitive; anything else (including unknown
/// strings) falls through to date-based evaluation.
pub const CLOSED_STATUSES: [&str; 5] = ["Done", "Closed", "Cancelled", "Canceled", "Resolved"];

const DAY_MS: i64 = 86_400_000;
const HOUR_MS: i64 = 3_600_000;

/// Urgency classification for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaFlag {
    /// Closed work - SLA tracking suppressed.
    None,
    /// No SLA pressure (no due date, or due more than 24h out).
    Ok,
    /// Due within the next rolling 24 hours (inclusive).
    DueSoon,
    /// Due date has passed or is exactly now.
    Overdue,
}

/// Result of an SLA evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlaResult {
    pub flag: SlaFlag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_left: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_over: Option<i64>,
}

impl SlaResult {
    fn quiet(flag: SlaFlag) -> Self {
        Self {
            flag,
            label: None,
            hours_left: None,
            days_over: None,
        }
    }
}

/// The instant a calendar due date is evaluated against: midnight UTC.
pub fn due_instant(due_date: NaiveDate) -> DateTime<Utc> {
    due_date.and_time(NaiveTime::MIN).and_utc()
}

/// Classify a task's urgency.
///
/// Precedence:
/// 1. no due date -> `Ok` (no SLA pressure)
/// 2. closed status -> `None` (tracking suppressed)
/// 3. otherwise classify by millisecond delta to the due instant:
///    `delta <= 0` -> `Overdue`, `delta <= 24h` -> `DueSoon`, else `Ok`
///
/// Total over its domain: never fails, unknown statuses are not rejected.
pub fn evaluate(due_date: Option<NaiveDate>, status: Option<&str>, now: DateTime<Utc>) -> SlaResult {
    let Some(due_date) = due_date else {
        return SlaResult::quiet(SlaFlag::Ok);
    };

    if status.is_some_and(|s| CLOSED_STATUSES.contains(&s)) {
        return SlaResult::quiet(SlaFlag::None);
    }

    let delta_ms = (due_instant(due_date) - now).num_milliseconds();

    if delta_ms <= 0 {
        let days_over = ceil_div(-delta_ms, DAY_MS);
        return SlaResult {
            flag: SlaFlag::Overdue,
            label: Some(format!("H+{days_over}")),
            hours_left: Some(0),
            days_over: Some(days_over),
        };
    }

    if delta_ms <= DAY_MS {
        return SlaResult {
            flag: SlaFlag::DueSoon,
            label: Some("Almost Expired".to_string()),
            hours_left: Some(ceil_div(delta_ms, HOUR_MS)),
            days_over: Some(0),
        };
    }

    SlaResult::quiet(SlaFlag::Ok)
}

/// True when the task is due within the next 24 hours.
pub fn is_due_soon(due_date: NaiveDate, status: Option<&str>, now: DateTime<Utc>) -> bool {
    evaluate(Some(due_date), status, now).flag == SlaFlag::DueSoon
}

/// True when the task's due date has already passed.
pub fn is_overdue(due_date: NaiveDate, status: Option<&str>, now: DateTime<Utc>) -> bool {
    evaluate(Some(due_date), status, now).flag == SlaFlag::Overdue
}

// Ceiling division for non-negative numerators.
fn ceil_div(n: i64, d: i64) -> i64 {
    (n + d - 1) / d
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().expect("timestamp")
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().expect("date")
    }

    #[test]
    fn missing_due_date_is_ok() {
        let result = evaluate(None, Some("Open"), at("2024-06-01T00:00:00Z"));
        assert_eq!(result.flag, SlaFlag::Ok);
        assert_eq!(result.label, None);
        assert_eq!(result.hours_left, None);
        assert_eq!(result.days_over, None);
    }

    #[test]
    fn closed_statuses_suppress_tracking() {
        for status in CLOSED_STATUSES {
            let result = evaluate(
                Some(day("2020-01-01")),
                Some(status),
                at("2024-06-01T00:00:00Z"),
            );
            assert_eq!(result.flag, SlaFlag::None, "status {status}");
            assert_eq!(result.hours_left, None);
        }
    }

    #[test]
    fn closed_status_match_is_case_sensitive() {
        let result = evaluate(
            Some(day("2020-01-01")),
            Some("done"),
            at("2024-06-01T00:00:00Z"),
        );
        assert_eq!(result.flag, SlaFlag::Overdue);
    }

    #[test]
    fn unknown_status_falls_through_to_dates() {
        let result = evaluate(
            Some(day("2024-06-02")),
            Some("Blocked"),
            at("2024-06-01T00:00:00Z"),
        );
        assert_eq!(result.flag, SlaFlag::DueSoon);
    }

    #[test]
    fn due_tomorrow_midnight_is_due_soon_with_24_hours() {
        let result = evaluate(
            Some(day("2024-06-02")),
            Some("Open"),
            at("2024-06-01T00:00:00Z"),
        );
        assert_eq!(result.flag, SlaFlag::DueSoon);
        assert_eq!(result.hours_left, Some(24));
        assert_eq!(result.days_over, Some(0));
        assert_eq!(result.label.as_deref(), Some("Almost Expired"));
    }

    #[test]
    fn partial_hours_round_up() {
        let result = evaluate(
            Some(day("2024-06-02")),
            Some("Open"),
            at("2024-06-01T23:30:00Z"),
        );
        assert_eq!(result.flag, SlaFlag::DueSoon);
        assert_eq!(result.hours_left, Some(1));
    }

    #[test]
    fn due_exactly_now_is_overdue_zero_days() {
        let result = evaluate(
            Some(day("2024-06-01")),
            Some("Open"),
            at("2024-06-01T00:00:00Z"),
        );
        assert_eq!(result.flag, SlaFlag::Overdue);
        assert_eq!(result.days_over, Some(0));
        assert_eq!(result.hours_left, Some(0));
        assert_eq!(result.label.as_deref(), Some("H+0"));
    }

    #[test]
    fn two_days_past_due_reports_h_plus_2() {
        let result = evaluate(
            Some(day("2024-05-30")),
            Some("In Progress"),
            at("2024-06-01T00:00:00Z"),
        );
        assert_eq!(result.flag, SlaFlag::Overdue);
        assert_eq!(result.days_over, Some(2));
        assert_eq!(result.label.as_deref(), Some("H+2"));
    }

    #[test]
    fn partial_days_over_round_up() {
        let result = evaluate(
            Some(day("2024-05-31")),
            Some("Open"),
            at("2024-06-01T06:00:00Z"),
        );
        assert_eq!(result.flag, SlaFlag::Overdue);
        // 1 day 6 hours overdue rounds up to 2 days
        assert_eq!(result.days_over, Some(2));
    }

    #[test]
    fn more_than_a_day_out_is_ok() {
        let result = evaluate(
            Some(day("2024-06-03")),
            Some("Open"),
            at("2024-06-01T00:00:00Z"),
        );
        assert_eq!(result.flag, SlaFlag::Ok);
        assert_eq!(result.label, None);
    }

    #[test]
    fn predicates_agree_with_evaluate() {
        let now = at("2024-06-01T00:00:00Z");
        assert!(is_due_soon(day("2024-06-02"), Some("Open"), now));
        assert!(!is_due_soon(day("2024-06-05"), Some("Open"), now));
        assert!(is_overdue(day("2024-05-30"), Some("Open"), now));
        assert!(!is_overdue(day("2024-05-30"), Some("Done"), now));
    }
}
