//! SLA evaluator properties and the dashboard badge scenarios.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use potrack::sla::{self, SlaFlag, CLOSED_STATUSES};

fn at(s: &str) -> DateTime<Utc> {
    s.parse().expect("timestamp")
}

fn date(s: &str) -> NaiveDate {
    s.parse().expect("date")
}

#[test]
fn far_future_due_dates_are_ok_for_open_work() {
    let now = at("2024-06-01T00:00:00Z");
    // Every due date more than 24h out stays Ok, regardless of distance
    for days_out in 2..60 {
        let due = date("2024-06-01") + Duration::days(days_out);
        let result = sla::evaluate(Some(due), Some("Open"), now);
        assert_eq!(result.flag, SlaFlag::Ok, "due {due}");
        assert_eq!(result.label, None);
        assert_eq!(result.hours_left, None);
        assert_eq!(result.days_over, None);
    }
}

#[test]
fn closed_statuses_are_none_regardless_of_date() {
    let now = at("2024-06-01T00:00:00Z");
    let dates = ["2020-01-01", "2024-06-01", "2024-06-02", "2030-12-31"];
    for status in CLOSED_STATUSES {
        for due in dates {
            let result = sla::evaluate(Some(date(due)), Some(status), now);
            assert_eq!(result.flag, SlaFlag::None, "status {status} due {due}");
        }
    }
}

#[test]
fn overdue_days_match_ceiling_of_elapsed_time() {
    let now = at("2024-06-10T12:00:00Z");
    for days_past in 0..30 {
        let due = date("2024-06-10") - Duration::days(days_past);
        let result = sla::evaluate(Some(due), Some("Open"), now);
        assert_eq!(result.flag, SlaFlag::Overdue, "due {due}");
        // Midnight due instants plus the 12h offset always round up
        assert_eq!(result.days_over, Some(days_past + 1), "due {due}");
        assert_eq!(result.hours_left, Some(0));
    }
}

#[test]
fn due_exactly_24h_out_is_due_soon_with_24_hours() {
    let result = sla::evaluate(
        Some(date("2024-06-02")),
        Some("Open"),
        at("2024-06-01T00:00:00Z"),
    );
    assert_eq!(result.flag, SlaFlag::DueSoon);
    assert_eq!(result.hours_left, Some(24));
}

#[test]
fn hours_left_shrinks_as_now_advances() {
    let due = date("2024-06-02");
    let mut previous = i64::MAX;
    for hour in 1..24 {
        let now = at("2024-06-01T00:00:00Z") + Duration::hours(hour);
        let result = sla::evaluate(Some(due), Some("Open"), now);
        assert_eq!(result.flag, SlaFlag::DueSoon);
        let hours = result.hours_left.expect("hours_left");
        assert!(hours <= previous, "hour {hour}");
        previous = hours;
    }
}

#[test]
fn evaluation_is_deterministic() {
    let now = at("2024-06-01T07:30:00Z");
    let first = sla::evaluate(Some(date("2024-06-02")), Some("Open"), now);
    let second = sla::evaluate(Some(date("2024-06-02")), Some("Open"), now);
    assert_eq!(first, second);
}

// Dashboard badge scenarios

#[test]
fn scenario_due_tomorrow_open() {
    let result = sla::evaluate(
        Some(date("2024-06-02")),
        Some("Open"),
        at("2024-06-01T00:00:00Z"),
    );
    assert_eq!(result.flag, SlaFlag::DueSoon);
    assert_eq!(result.hours_left, Some(24));
    assert_eq!(result.label.as_deref(), Some("Almost Expired"));
}

#[test]
fn scenario_two_days_late_in_progress() {
    let result = sla::evaluate(
        Some(date("2024-05-30")),
        Some("In Progress"),
        at("2024-06-01T00:00:00Z"),
    );
    assert_eq!(result.flag, SlaFlag::Overdue);
    assert_eq!(result.days_over, Some(2));
    assert_eq!(result.label.as_deref(), Some("H+2"));
}

#[test]
fn scenario_done_task_is_untracked_at_any_time() {
    for now in [
        "2024-05-01T00:00:00Z",
        "2024-06-10T00:00:00Z",
        "2024-07-01T12:00:00Z",
    ] {
        let result = sla::evaluate(Some(date("2024-06-10")), Some("Done"), at(now));
        assert_eq!(result.flag, SlaFlag::None, "now {now}");
    }
}

#[test]
fn no_due_date_means_no_pressure() {
    let result = sla::evaluate(None, Some("Open"), at("2024-06-01T00:00:00Z"));
    assert_eq!(result.flag, SlaFlag::Ok);
    assert_eq!(result.hours_left, None);
    assert_eq!(result.days_over, None);
}
