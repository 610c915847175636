//! Task lifecycle control: role gating, visibility, and reconciliation.
//!
//! Every entry point takes the acting `Actor` explicitly; there is no
//! ambient current-user state. The pure pieces (`authorize_patch`,
//! `filter_visible`, `plan_reconcile`) are exposed on their own so the
//! presentation layer can use them without touching storage, and
//! `TaskService` wires them to the store.
//!
//! Status state machine:
//! - initial: `Open` (forced at creation)
//! - terminal: `Done` (no automatic transition out)
//! - the only automatic transition is non-`Done` -> `AlmostExpired`, applied
//!   by reconciliation when the promotion condition holds; everything else
//!   is actor-initiated and role-gated
//! - reconciliation never moves a task out of `AlmostExpired`

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::actor::{Actor, Role};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::sla::{self, SlaFlag};
use crate::store::TaskStore;
use crate::task::{validate_assignees, NewTask, Task, TaskPatch, TaskStatus};

/// Statuses a PIC may set directly. `AlmostExpired` is reconciliation-only.
pub const PIC_ALLOWED_STATUSES: [TaskStatus; 3] =
    [TaskStatus::Open, TaskStatus::InProgress, TaskStatus::Done];

/// Check a patch against the role-gating matrix.
///
/// | field       | admin | PIC                          |
/// |-------------|-------|------------------------------|
/// | description | yes   | no                           |
/// | due_date    | yes   | no                           |
/// | assignees   | yes   | no                           |
/// | status      | yes   | Open / InProgress / Done only|
/// | remarks     | yes   | yes                          |
///
/// A PIC may only touch tasks they are assigned to.
///
/// Purely role-based; the roster check on a patched assignee set lives in
/// `TaskService::update_task`, which has the config.
pub fn authorize_patch(actor: &Actor, task: &Task, patch: &TaskPatch) -> Result<()> {
    if actor.role == Role::SuperAdmin {
        return Ok(());
    }

    if !task.is_assigned_to(&actor.name) {
        return Err(Error::Forbidden {
            actor: actor.name.clone(),
            action: "editing tasks assigned to others",
        });
    }
    if patch.description.is_some() {
        return Err(Error::Forbidden {
            actor: actor.name.clone(),
            action: "editing the description",
        });
    }
    if patch.due_date.is_some() {
        return Err(Error::Forbidden {
            actor: actor.name.clone(),
            action: "editing the due date",
        });
    }
    if patch.assignees.is_some() {
        return Err(Error::Forbidden {
            actor: actor.name.clone(),
            action: "editing the assignees",
        });
    }
    if let Some(status) = patch.status {
        if !PIC_ALLOWED_STATUSES.contains(&status) {
            return Err(Error::InvalidTransition {
                actor: actor.name.clone(),
                status: status.label().to_string(),
            });
        }
    }

    Ok(())
}

/// Only the admin creates tasks.
pub fn authorize_create(actor: &Actor) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(Error::Forbidden {
            actor: actor.name.clone(),
            action: "creating tasks",
        })
    }
}

/// Only the admin deletes tasks.
pub fn authorize_delete(actor: &Actor) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(Error::Forbidden {
            actor: actor.name.clone(),
            action: "deleting tasks",
        })
    }
}

/// The read-side visibility rule: the admin sees everything, a PIC sees only
/// tasks they are assigned to. Applied before any other filtering.
pub fn filter_visible(tasks: Vec<Task>, actor: &Actor) -> Vec<Task> {
    match actor.role {
        Role::SuperAdmin => tasks,
        Role::Pic => tasks
            .into_iter()
            .filter(|task| task.is_assigned_to(&actor.name))
            .collect(),
    }
}

/// A write-back required by reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Promotion {
    pub id: u64,
    pub new_status: TaskStatus,
}

/// Decide which tasks must be promoted to `AlmostExpired`.
///
/// A task qualifies when it is not `Done` and any of these hold:
/// - the SLA evaluator flags it `DueSoon` (due within the rolling 24h window)
/// - `now` is exactly one calendar day before the due date
/// - the due date is strictly before `now` (overdue)
///
/// Tasks already `AlmostExpired` are skipped, so re-running the plan with
/// nothing changed yields zero write-backs.
pub fn plan_reconcile(tasks: &[Task], now: DateTime<Utc>) -> Vec<Promotion> {
    tasks
        .iter()
        .filter(|task| !task.is_deleted() && should_promote(task, now))
        .map(|task| Promotion {
            id: task.id,
            new_status: TaskStatus::AlmostExpired,
        })
        .collect()
}

fn should_promote(task: &Task, now: DateTime<Utc>) -> bool {
    if task.status == TaskStatus::Done || task.status == TaskStatus::AlmostExpired {
        return false;
    }

    let flag = sla::evaluate(Some(task.due_date), Some(task.status.label()), now).flag;

    flag == SlaFlag::DueSoon
        || is_day_before(task.due_date, now)
        || sla::due_instant(task.due_date) < now
}

// The calendar "day before" check is distinct from the evaluator's rolling
// 24h window: a task due tomorrow qualifies at any time of day today.
fn is_day_before(due_date: NaiveDate, now: DateTime<Utc>) -> bool {
    due_date
        .pred_opt()
        .is_some_and(|day_before| day_before == now.date_naive())
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ReconcileReport {
    /// Promotions the plan called for.
    pub planned: usize,
    /// Write-backs that reached storage.
    pub written: usize,
    /// Write-backs that failed and were skipped.
    pub failed: usize,
}

/// Storage seam for reconciliation write-backs.
pub trait StatusWriter {
    fn write_status(&self, id: u64, status: TaskStatus) -> Result<Task>;
}

impl StatusWriter for TaskStore {
    fn write_status(&self, id: u64, status: TaskStatus) -> Result<Task> {
        self.update_status(id, status)
    }
}

/// Apply planned promotions as independent write-backs. A failure on one
/// task is logged and counted, never aborting the rest of the pass.
pub fn apply_promotions(writer: &impl StatusWriter, promotions: &[Promotion]) -> ReconcileReport {
    let mut report = ReconcileReport {
        planned: promotions.len(),
        ..ReconcileReport::default()
    };

    for promotion in promotions {
        match writer.write_status(promotion.id, promotion.new_status) {
            Ok(_) => report.written += 1,
            Err(err) => {
                tracing::warn!(
                    task_id = promotion.id,
                    error = %err,
                    "skipping failed reconciliation write-back"
                );
                report.failed += 1;
            }
        }
    }

    report
}

/// Month/status narrowing for listings, applied after the visibility rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    /// Due-date month, 1-12.
    pub month: Option<u32>,
}

impl TaskFilter {
    fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(month) = self.month {
            if chrono::Datelike::month(&task.due_date) != month {
                return false;
            }
        }
        true
    }
}

/// Store-backed task operations with role gating applied.
#[derive(Debug, Clone)]
pub struct TaskService {
    store: TaskStore,
    config: Config,
}

impl TaskService {
    pub fn new(store: TaskStore, config: Config) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create a task. Status is forced to `Open` and the input date to the
    /// current calendar day; neither is caller-supplied.
    pub fn create_task(&self, actor: &Actor, new: NewTask, now: DateTime<Utc>) -> Result<Task> {
        authorize_create(actor)?;

        if new.description.trim().is_empty() {
            return Err(Error::Validation("description cannot be empty".to_string()));
        }
        validate_assignees(&new.assignees, &self.config.roster.pics)?;

        self.store.create(&new, now.date_naive(), TaskStatus::Open)
    }

    /// List tasks visible to the actor, optionally narrowed by status/month.
    pub fn list_tasks(&self, actor: &Actor, filter: &TaskFilter) -> Result<Vec<Task>> {
        let visible = filter_visible(self.store.list()?, actor);
        Ok(visible
            .into_iter()
            .filter(|task| filter.matches(task))
            .collect())
    }

    /// Fetch a task the actor is allowed to see.
    pub fn get_task(&self, actor: &Actor, id: u64) -> Result<Task> {
        let task = self.store.get(id)?;
        if actor.role == Role::Pic && !task.is_assigned_to(&actor.name) {
            // Invisible to this actor, so report it as absent.
            return Err(Error::TaskNotFound(id));
        }
        Ok(task)
    }

    /// Apply a role-gated patch to a task. A patched assignee set goes
    /// through the same roster validation as creation; tasks never hold
    /// identifiers outside the fixed roster.
    pub fn update_task(&self, actor: &Actor, id: u64, patch: &TaskPatch) -> Result<Task> {
        if patch.is_empty() {
            return Err(Error::InvalidArgument("nothing to update".to_string()));
        }
        let task = self.store.get(id)?;
        authorize_patch(actor, &task, patch)?;
        if let Some(assignees) = &patch.assignees {
            validate_assignees(assignees, &self.config.roster.pics)?;
        }
        self.store.update_fields(id, patch)
    }

    /// Soft-delete a task (admin only).
    pub fn delete_task(&self, actor: &Actor, id: u64, now: DateTime<Utc>) -> Result<bool> {
        authorize_delete(actor)?;
        self.store.soft_delete(id, &actor.name, now)
    }

    /// One reconciliation pass: plan against a snapshot, then write back each
    /// promotion independently (fail-soft, see `apply_promotions`).
    pub fn reconcile_once(&self, now: DateTime<Utc>) -> Result<ReconcileReport> {
        let tasks = self.store.list()?;
        let promotions = plan_reconcile(&tasks, now);
        Ok(apply_promotions(&self.store, &promotions))
    }
}

/// Fixed-interval reconciliation driver.
///
/// The clock is injected so tests can run passes against virtual time; only
/// the sleep between passes touches real time.
pub struct Ticker<'a> {
    service: &'a TaskService,
    clock: &'a dyn Clock,
    interval: Duration,
}

impl<'a> Ticker<'a> {
    pub fn new(service: &'a TaskService, clock: &'a dyn Clock, interval: Duration) -> Self {
        Self {
            service,
            clock,
            interval,
        }
    }

    /// Run a single pass at the clock's current time.
    pub fn tick(&self) -> Result<ReconcileReport> {
        self.service.reconcile_once(self.clock.now())
    }

    /// Run passes until `max_passes` is exhausted (forever when `None`),
    /// sleeping the configured interval between them.
    pub fn run(&self, max_passes: Option<u64>) -> Result<()> {
        let mut completed: u64 = 0;
        loop {
            let report = self.tick()?;
            tracing::debug!(
                planned = report.planned,
                written = report.written,
                failed = report.failed,
                "reconciliation pass complete"
            );

            completed += 1;
            if max_passes.is_some_and(|max| completed >= max) {
                return Ok(());
            }
            std::thread::sleep(self.interval);
        }
    }
}
