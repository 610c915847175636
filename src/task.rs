//! Task records and the closed status enumeration.
//!
//! A task is assigned to 1-2 PICs from a fixed roster and carries a
//! calendar due date. Statuses are a closed set; unknown persisted values
//! fail decoding loudly instead of defaulting to `Open`, so data corruption
//! surfaces at the storage boundary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum number of PICs a task may be assigned to.
pub const MAX_ASSIGNEES: usize = 2;

/// Task lifecycle status.
///
/// Persisted in the wire form (`OPEN`, `IN_PROGRESS`, ...); displayed in
/// the human form (`Open`, `In Progress`, ...). The human form is what the
/// SLA evaluator's closed-status set matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TaskStatus {
    Open,
    InProgress,
    Done,
    AlmostExpired,
}

impl TaskStatus {
    /// Persisted encoding.
    pub fn wire(self) -> &'static str {
        match self {
            TaskStatus::Open => "OPEN",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
            TaskStatus::AlmostExpired => "ALMOST_EXPIRED",
        }
    }

    /// Human-readable label, also the evaluator-facing status string.
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Open => "Open",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
            TaskStatus::AlmostExpired => "Almost Expired",
        }
    }

    /// Decode the persisted encoding. Unknown values are an error, never a
    /// silent default.
    pub fn from_wire(value: &str) -> Result<Self> {
        match value {
            "OPEN" => Ok(TaskStatus::Open),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            "ALMOST_EXPIRED" => Ok(TaskStatus::AlmostExpired),
            other => Err(Error::Validation(format!(
                "unknown task status {other:?} (expected OPEN, IN_PROGRESS, DONE, or ALMOST_EXPIRED)"
            ))),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    /// Lenient parse for CLI input: accepts the human label, the wire form,
    /// and dashed/underscored lowercase spellings.
    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = input.trim().to_lowercase().replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "open" => Ok(TaskStatus::Open),
            "inprogress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            "almostexpired" => Ok(TaskStatus::AlmostExpired),
            _ => Err(format!(
                "unknown status {input:?} (expected open, in-progress, done, or almost-expired)"
            )),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        TaskStatus::from_wire(&value).map_err(|err| err.to_string())
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.wire().to_string()
    }
}

/// A PO task record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Storage-assigned, immutable after creation.
    pub id: u64,
    /// Set at creation to the server-side calendar day, immutable.
    pub input_date: NaiveDate,
    pub description: String,
    pub due_date: NaiveDate,
    /// 1-2 PIC identifiers from the roster.
    pub assignees: Vec<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub remarks: String,
    /// Soft-delete marker; deleted tasks are excluded from listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_assigned_to(&self, pic: &str) -> bool {
        self.assignees.iter().any(|name| name == pic)
    }
}

/// Input for task creation. Status and input date are never caller-supplied:
/// the controller forces `Open` and "today".
#[derive(Debug, Clone)]
pub struct NewTask {
    pub description: String,
    pub due_date: NaiveDate,
    pub assignees: Vec<String>,
    pub remarks: String,
}

/// A partial update to an existing task. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub assignees: Option<Vec<String>>,
    pub status: Option<TaskStatus>,
    pub remarks: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.due_date.is_none()
            && self.assignees.is_none()
            && self.status.is_none()
            && self.remarks.is_none()
    }

    /// Apply this patch to a task in place. Authorization has already
    /// happened by the time this runs.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(assignees) = &self.assignees {
            task.assignees = assignees.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(remarks) = &self.remarks {
            task.remarks = remarks.clone();
        }
    }
}

/// Validate an assignee set against the fixed roster: 1-2 distinct members,
/// all known. Applied to every write that touches `assignees`, creation and
/// edits alike.
pub fn validate_assignees(assignees: &[String], roster: &[String]) -> Result<()> {
    if assignees.is_empty() {
        return Err(Error::Validation(
            "at least one PIC must be assigned".to_string(),
        ));
    }
    if assignees.len() > MAX_ASSIGNEES {
        return Err(Error::Validation(format!(
            "at most {MAX_ASSIGNEES} PICs may be assigned (got {})",
            assignees.len()
        )));
    }
    for (idx, name) in assignees.iter().enumerate() {
        if !roster.iter().any(|member| member == name) {
            return Err(Error::Validation(format!("unknown PIC {name:?}")));
        }
        if assignees[..idx].contains(name) {
            return Err(Error::Validation(format!(
                "PIC {name:?} is assigned more than once"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_encoding_round_trips() {
        for status in [
            TaskStatus::Open,
            TaskStatus::InProgress,
            TaskStatus::Done,
            TaskStatus::AlmostExpired,
        ] {
            assert_eq!(TaskStatus::from_wire(status.wire()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_wire_status_fails_loudly() {
        let err = TaskStatus::from_wire("PENDING").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let decoded: std::result::Result<TaskStatus, _> =
            serde_json::from_str("\"PENDING\"");
        assert!(decoded.is_err());
    }

    #[test]
    fn serde_uses_wire_form() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let back: TaskStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TaskStatus::InProgress);
    }

    #[test]
    fn cli_parse_accepts_common_spellings() {
        for input in ["in-progress", "in_progress", "In Progress", "IN_PROGRESS"] {
            assert_eq!(
                input.parse::<TaskStatus>().unwrap(),
                TaskStatus::InProgress,
                "input {input}"
            );
        }
        assert!("pending".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn assignee_validation_enforces_roster_and_count() {
        let roster = vec!["Agung".to_string(), "Latifah".to_string(), "Pepy".to_string()];

        assert!(validate_assignees(&["Agung".to_string()], &roster).is_ok());
        assert!(validate_assignees(
            &["Agung".to_string(), "Pepy".to_string()],
            &roster
        )
        .is_ok());

        assert!(matches!(
            validate_assignees(&[], &roster),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            validate_assignees(
                &[
                    "Agung".to_string(),
                    "Latifah".to_string(),
                    "Pepy".to_string()
                ],
                &roster
            ),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            validate_assignees(&["Nobody".to_string()], &roster),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            validate_assignees(&["Agung".to_string(), "Agung".to_string()], &roster),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn patch_applies_only_set_fields() {
        let mut task = Task {
            id: 1,
            input_date: "2024-06-01".parse().unwrap(),
            description: "Order follow-up".to_string(),
            due_date: "2024-06-10".parse().unwrap(),
            assignees: vec!["Agung".to_string()],
            status: TaskStatus::Open,
            remarks: String::new(),
            deleted_at: None,
        };

        TaskPatch {
            remarks: Some("waiting on vendor".to_string()),
            status: Some(TaskStatus::InProgress),
            ..TaskPatch::default()
        }
        .apply_to(&mut task);

        assert_eq!(task.remarks, "waiting on vendor");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.description, "Order follow-up");
        assert_eq!(task.due_date, "2024-06-10".parse::<NaiveDate>().unwrap());
    }
}
