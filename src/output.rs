//! CLI output: versioned JSON envelopes and human-readable summaries.
//!
//! Every command emits either a `potrack.v1` JSON envelope (`--json`) or a
//! short human report built from a header, key/value summary, and optional
//! detail/warning/next-step sections.

use serde::Serialize;
use serde_json::json;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "potrack.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Accumulator for the human rendering of a command result.
#[derive(Debug, Clone, Default)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            ..Self::default()
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let mut envelope = json!({
            "schema_version": SCHEMA_VERSION,
            "command": command,
            "status": "success",
            "data": data,
        });
        if let Some(human) = human {
            if !human.warnings.is_empty() {
                envelope["warnings"] = json!(human.warnings);
            }
            if !human.next_steps.is_empty() {
                envelope["next_steps"] = json!(human.next_steps);
            }
        }
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", format_human(human));
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);

    if json {
        let mut envelope = json!({
            "schema_version": SCHEMA_VERSION,
            "command": command,
            "status": "error",
            "error": {
                "message": err.to_string(),
                "code": err.exit_code(),
                "kind": error_kind(err),
            },
        });
        if !next_steps.is_empty() {
            envelope["next_steps"] = json!(next_steps);
        }
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = next_steps.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = vec![output.header.clone()];

    if !output.summary.is_empty() {
        lines.push(String::new());
        lines.push("Summary:".to_string());
        for (key, value) in &output.summary {
            if value.is_empty() {
                lines.push(format!("- {key}"));
            } else {
                lines.push(format!("- {key}: {value}"));
            }
        }
    }

    for (title, items) in [
        ("Details", &output.details),
        ("Warnings", &output.warnings),
        ("Next steps", &output.next_steps),
    ] {
        if items.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{title}:"));
        for item in items {
            lines.push(format!("- {item}"));
        }
    }

    lines.join("\n")
}

/// Best-effort "command subcommand" label from argv, for error envelopes
/// emitted before (or instead of) a successful dispatch.
pub fn infer_command_name_from_args() -> String {
    infer_command_name(std::env::args().skip(1))
}

// Global flags that consume the following argument; their values must not
// be mistaken for the command name (`potrack --dir /tmp task list`).
const VALUE_FLAGS: [&str; 2] = ["--dir", "--actor"];

fn infer_command_name(mut args: impl Iterator<Item = String>) -> String {
    let mut positionals = std::iter::from_fn(move || {
        while let Some(arg) = args.next() {
            if VALUE_FLAGS.contains(&arg.as_str()) {
                args.next();
                continue;
            }
            if arg.starts_with('-') {
                continue;
            }
            return Some(arg);
        }
        None
    });

    let Some(command) = positionals.next() else {
        return "potrack".to_string();
    };

    match command.as_str() {
        "task" | "actor" => match positionals.next() {
            Some(sub) => format!("{command} {sub}"),
            None => command,
        },
        _ => command,
    }
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        2 => "user_error",
        3 => "policy_blocked",
        _ => "operation_failed",
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::TrackerNotFound(_) => vec!["potrack init".to_string()],
        Error::Forbidden { .. } => {
            vec!["ask the Super Admin, or use `--actor` with an admin identity".to_string()]
        }
        Error::InvalidTransition { .. } => {
            vec!["PICs may set open, in-progress, or done".to_string()]
        }
        Error::TaskNotFound(_) => vec!["potrack task list".to_string()],
        Error::InvalidConfig(_) => vec!["fix potrack.toml then retry".to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_report_renders_sections_in_order() {
        let mut output = HumanOutput::new("potrack task add: #1");
        output.push_summary("id", "1");
        output.push_summary("due", "2024-06-10");
        output.push_warning("roster is small");
        output.push_next_step("potrack task list");

        let rendered = format_human(&output);
        let warning_at = rendered.find("Warnings:").unwrap();
        let next_at = rendered.find("Next steps:").unwrap();
        assert!(rendered.starts_with("potrack task add: #1"));
        assert!(rendered.find("Summary:").unwrap() < warning_at);
        assert!(warning_at < next_at);
        assert!(rendered.contains("- due: 2024-06-10"));
    }

    fn infer(args: &[&str]) -> String {
        infer_command_name(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn command_name_skips_global_flags_and_their_values() {
        assert_eq!(infer(&["task", "list"]), "task list");
        assert_eq!(infer(&["--dir", "/tmp", "task", "list"]), "task list");
        assert_eq!(infer(&["--actor", "Agung", "--json", "task", "add"]), "task add");
        assert_eq!(infer(&["--dir=/tmp", "reconcile", "--watch"]), "reconcile");
        assert_eq!(infer(&["--json"]), "potrack");
        assert_eq!(infer(&[]), "potrack");
    }

    #[test]
    fn error_kinds_follow_exit_codes() {
        assert_eq!(error_kind(&Error::TaskNotFound(1)), "user_error");
        assert_eq!(
            error_kind(&Error::Forbidden {
                actor: "Agung".to_string(),
                action: "creating tasks",
            }),
            "policy_blocked"
        );
        assert_eq!(
            error_kind(&Error::OperationFailed("x".to_string())),
            "operation_failed"
        );
    }
}
