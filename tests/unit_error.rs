use std::path::PathBuf;

use potrack::error::{exit_codes, Error, JsonError};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::TaskNotFound(7);
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let policy = Error::Forbidden {
        actor: "Agung".to_string(),
        action: "changing the due date",
    };
    assert_eq!(policy.exit_code(), exit_codes::POLICY_BLOCKED);

    let transition = Error::InvalidTransition {
        actor: "Agung".to_string(),
        status: "Almost Expired".to_string(),
    };
    assert_eq!(transition.exit_code(), exit_codes::POLICY_BLOCKED);

    let op = Error::LockFailed(PathBuf::from(".potrack/tasks.json.lock"));
    assert_eq!(op.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn forbidden_message_names_actor_and_action() {
    let err = Error::Forbidden {
        actor: "Latifah".to_string(),
        action: "deleting tasks",
    };
    let msg = err.to_string();
    assert!(msg.contains("Super Admin"));
    assert!(msg.contains("Latifah"));
    assert!(msg.contains("deleting tasks"));
}

#[test]
fn json_error_includes_code() {
    let err = Error::TrackerNotFound(PathBuf::from("/tmp/nowhere"));
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert!(json.error.contains("Tracker not found"));
    assert!(json.error.contains("potrack init"));
}
