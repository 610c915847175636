//! potrack sla command implementation.
//!
//! Evaluates the badge for a due date without touching storage, the same
//! classification listings use.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::sla::{self, SlaFlag};

pub struct Options {
    pub due: NaiveDate,
    pub status: Option<String>,
    pub at: Option<DateTime<Utc>>,
    pub output: OutputOptions,
}

pub fn run(options: Options) -> Result<()> {
    let now = options.at.unwrap_or_else(Utc::now);
    let result = sla::evaluate(Some(options.due), options.status.as_deref(), now);

    let mut human = HumanOutput::new(format!(
        "potrack sla: {} -> {}",
        options.due,
        flag_name(result.flag)
    ));
    human.push_summary("flag", flag_name(result.flag));
    if let Some(label) = &result.label {
        human.push_summary("label", label.clone());
    }
    if let Some(hours) = result.hours_left {
        human.push_summary("hours left", hours.to_string());
    }
    if let Some(days) = result.days_over {
        human.push_summary("days over", days.to_string());
    }

    emit_success(options.output, "sla", &result, Some(&human))?;

    Ok(())
}

fn flag_name(flag: SlaFlag) -> &'static str {
    match flag {
        SlaFlag::None => "none",
        SlaFlag::Ok => "ok",
        SlaFlag::DueSoon => "due_soon",
        SlaFlag::Overdue => "overdue",
    }
}
