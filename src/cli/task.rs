//! potrack task command implementations.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};

use crate::error::{Error, Result};
use crate::lifecycle::TaskFilter;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::sla::{self, SlaResult};
use crate::task::{NewTask, Task, TaskPatch, TaskStatus};

pub struct AddOptions {
    pub dir: Option<PathBuf>,
    pub actor: Option<String>,
    pub description: String,
    pub due: NaiveDate,
    pub pics: Vec<String>,
    pub remarks: String,
    pub output: OutputOptions,
}

pub struct ListOptions {
    pub dir: Option<PathBuf>,
    pub actor: Option<String>,
    pub status: Option<TaskStatus>,
    pub month: Option<u32>,
    pub output: OutputOptions,
}

pub struct ShowOptions {
    pub dir: Option<PathBuf>,
    pub actor: Option<String>,
    pub id: u64,
    pub output: OutputOptions,
}

pub struct EditOptions {
    pub dir: Option<PathBuf>,
    pub actor: Option<String>,
    pub id: u64,
    pub description: Option<String>,
    pub due: Option<NaiveDate>,
    pub pics: Vec<String>,
    pub output: OutputOptions,
}

pub struct StatusOptions {
    pub dir: Option<PathBuf>,
    pub actor: Option<String>,
    pub id: u64,
    pub status: TaskStatus,
    pub output: OutputOptions,
}

pub struct RemarkOptions {
    pub dir: Option<PathBuf>,
    pub actor: Option<String>,
    pub id: u64,
    pub text: String,
    pub output: OutputOptions,
}

pub struct DeleteOptions {
    pub dir: Option<PathBuf>,
    pub actor: Option<String>,
    pub id: u64,
    pub output: OutputOptions,
}

/// A task plus its live SLA badge, the way listings render it.
#[derive(serde::Serialize)]
struct TaskRow {
    #[serde(flatten)]
    task: Task,
    sla: SlaResult,
}

impl TaskRow {
    fn new(task: Task, now: chrono::DateTime<Utc>) -> Self {
        let sla = sla::evaluate(Some(task.due_date), Some(task.status.label()), now);
        Self { task, sla }
    }

    fn human_line(&self) -> String {
        let badge = match &self.sla.label {
            Some(label) => format!(" [{label}]"),
            None => String::new(),
        };
        format!(
            "#{} {} (due {}, {}, pic: {}){}",
            self.task.id,
            self.task.description,
            self.task.due_date,
            self.task.status,
            self.task.assignees.join(", "),
            badge
        )
    }
}

#[derive(serde::Serialize)]
struct DeleteReport {
    id: u64,
    deleted: bool,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let context = super::load_context(options.dir.as_ref(), options.actor.as_deref())?;

    let task = context.service.create_task(
        &context.actor,
        NewTask {
            description: options.description,
            due_date: options.due,
            assignees: options.pics,
            remarks: options.remarks,
        },
        Utc::now(),
    )?;

    let mut human = HumanOutput::new(format!("potrack task add: #{}", task.id));
    human.push_summary("id", task.id.to_string());
    human.push_summary("due", task.due_date.to_string());
    human.push_summary("pic", task.assignees.join(", "));

    emit_success(options.output, "task add", &task, Some(&human))?;

    Ok(())
}

pub fn run_list(options: ListOptions) -> Result<()> {
    if let Some(month) = options.month {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidArgument(format!(
                "month must be 1-12 (got {month})"
            )));
        }
    }

    let context = super::load_context(options.dir.as_ref(), options.actor.as_deref())?;
    let filter = TaskFilter {
        status: options.status,
        month: options.month,
    };

    let now = Utc::now();
    let rows: Vec<TaskRow> = context
        .service
        .list_tasks(&context.actor, &filter)?
        .into_iter()
        .map(|task| TaskRow::new(task, now))
        .collect();

    let mut human = HumanOutput::new(format!(
        "potrack tasks for {}: {}",
        context.actor.name,
        rows.len()
    ));
    for row in &rows {
        human.push_detail(row.human_line());
    }
    if rows.is_empty() {
        human.push_detail("no tasks".to_string());
    }

    emit_success(options.output, "task list", &rows, Some(&human))?;

    Ok(())
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let context = super::load_context(options.dir.as_ref(), options.actor.as_deref())?;
    let task = context.service.get_task(&context.actor, options.id)?;
    let row = TaskRow::new(task, Utc::now());

    let mut human = HumanOutput::new(format!("potrack task #{}", row.task.id));
    human.push_summary("description", row.task.description.clone());
    human.push_summary("input date", row.task.input_date.to_string());
    human.push_summary("due", row.task.due_date.to_string());
    human.push_summary("status", row.task.status.to_string());
    human.push_summary("pic", row.task.assignees.join(", "));
    if !row.task.remarks.is_empty() {
        human.push_summary("remarks", row.task.remarks.clone());
    }
    if let Some(label) = &row.sla.label {
        human.push_summary("sla", label.clone());
    }

    emit_success(options.output, "task show", &row, Some(&human))?;

    Ok(())
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let context = super::load_context(options.dir.as_ref(), options.actor.as_deref())?;

    let patch = TaskPatch {
        description: options.description,
        due_date: options.due,
        assignees: if options.pics.is_empty() {
            None
        } else {
            Some(options.pics)
        },
        ..TaskPatch::default()
    };

    let task = context.service.update_task(&context.actor, options.id, &patch)?;

    let mut human = HumanOutput::new(format!("potrack task edit: #{}", task.id));
    human.push_summary("due", task.due_date.to_string());
    human.push_summary("pic", task.assignees.join(", "));

    emit_success(options.output, "task edit", &task, Some(&human))?;

    Ok(())
}

pub fn run_status(options: StatusOptions) -> Result<()> {
    let context = super::load_context(options.dir.as_ref(), options.actor.as_deref())?;

    let patch = TaskPatch {
        status: Some(options.status),
        ..TaskPatch::default()
    };
    let task = context.service.update_task(&context.actor, options.id, &patch)?;

    let mut human = HumanOutput::new(format!(
        "potrack task status: #{} -> {}",
        task.id, task.status
    ));
    human.push_summary("status", task.status.to_string());

    emit_success(options.output, "task status", &task, Some(&human))?;

    Ok(())
}

pub fn run_remark(options: RemarkOptions) -> Result<()> {
    let context = super::load_context(options.dir.as_ref(), options.actor.as_deref())?;

    let patch = TaskPatch {
        remarks: Some(options.text),
        ..TaskPatch::default()
    };
    let task = context.service.update_task(&context.actor, options.id, &patch)?;

    let mut human = HumanOutput::new(format!("potrack task remark: #{}", task.id));
    human.push_summary("remarks", task.remarks.clone());

    emit_success(options.output, "task remark", &task, Some(&human))?;

    Ok(())
}

pub fn run_delete(options: DeleteOptions) -> Result<()> {
    let context = super::load_context(options.dir.as_ref(), options.actor.as_deref())?;

    let deleted = context
        .service
        .delete_task(&context.actor, options.id, Utc::now())?;

    let report = DeleteReport {
        id: options.id,
        deleted,
    };

    let mut human = HumanOutput::new(format!("potrack task delete: #{}", options.id));
    human.push_detail("soft-deleted; the audit log keeps the record".to_string());

    emit_success(options.output, "task delete", &report, Some(&human))?;

    Ok(())
}
