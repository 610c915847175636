//! Command-line interface for potrack
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::actor::{self, Actor};
use crate::config::{self, Config};
use crate::error::Result;
use crate::lifecycle::TaskService;
use crate::store::TaskStore;

mod actor_cmd;
mod init;
mod reconcile;
mod sla;
mod task;

/// potrack - PO task tracking
///
/// Tracks operational PO tasks against their SLAs: role-gated edits for the
/// Super Admin and PICs, urgency badges, and automatic promotion of
/// almost-expired work.
#[derive(Parser, Debug)]
#[command(name = "potrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the tracker directory (defaults to current directory)
    #[arg(long, global = true, env = "POTRACK_DIR")]
    pub dir: Option<PathBuf>,

    /// Actor identity for role-gated operations
    #[arg(long, global = true, env = "POTRACK_ACTOR")]
    pub actor: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a tracker in the target directory
    Init,

    /// Actor identity (set/show)
    #[command(subcommand)]
    Actor(ActorCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Evaluate the SLA badge for a due date without touching storage
    Sla {
        /// Due date (YYYY-MM-DD)
        due: chrono::NaiveDate,

        /// Status string to evaluate with (e.g. "Open", "Done")
        #[arg(long)]
        status: Option<String>,

        /// Evaluate at this instant instead of now (RFC 3339)
        #[arg(long)]
        at: Option<chrono::DateTime<chrono::Utc>>,
    },

    /// Promote almost-expired tasks in storage
    Reconcile {
        /// Keep running at a fixed interval
        #[arg(long)]
        watch: bool,

        /// Seconds between passes (watch mode; defaults to config)
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ActorCommands {
    /// Persist the actor identity for this tracker
    Set {
        /// Roster name (a PIC or the Super Admin)
        name: String,
    },

    /// Show the resolved actor and role
    Show,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task (Super Admin only)
    Add {
        /// Task description
        description: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: chrono::NaiveDate,

        /// Assignee PIC (repeat for a second PIC, max 2)
        #[arg(long = "pic", required = true)]
        pics: Vec<String>,

        /// Initial remarks
        #[arg(long, default_value = "")]
        remarks: String,
    },

    /// List visible tasks with their SLA badges
    List {
        /// Only tasks in this status
        #[arg(long)]
        status: Option<crate::task::TaskStatus>,

        /// Only tasks due in this month (1-12)
        #[arg(long)]
        month: Option<u32>,
    },

    /// Show one task
    Show {
        /// Task id
        id: u64,
    },

    /// Edit description/due date/assignees (Super Admin only)
    Edit {
        /// Task id
        id: u64,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<chrono::NaiveDate>,

        /// Replacement assignee set (repeat, max 2)
        #[arg(long = "pic")]
        pics: Vec<String>,
    },

    /// Set the status of a task
    Status {
        /// Task id
        id: u64,

        /// New status (open, in-progress, done; admin may set almost-expired)
        status: crate::task::TaskStatus,
    },

    /// Set the remarks on a task
    Remark {
        /// Task id
        id: u64,

        /// Remark text
        text: String,
    },

    /// Soft-delete a task (Super Admin only)
    Delete {
        /// Task id
        id: u64,
    },
}

/// Everything a role-gated command needs: the store-backed service and the
/// resolved actor.
pub(crate) struct Context {
    pub service: TaskService,
    pub actor: Actor,
}

pub(crate) fn start_dir(dir: Option<&PathBuf>) -> PathBuf {
    dir.cloned()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

pub(crate) fn load_context(dir: Option<&PathBuf>, cli_actor: Option<&str>) -> Result<Context> {
    let root = config::find_root(&start_dir(dir))?;
    let config = Config::load_from_root(&root)?;
    let actor = actor::resolve_actor(&root, &config, cli_actor)?;
    let service = TaskService::new(TaskStore::new(root), config);
    Ok(Context { service, actor })
}

/// Like `load_context` but without actor resolution, for commands that are
/// not role-gated (reconciliation runs as the system, not as a person).
pub(crate) fn load_service(dir: Option<&PathBuf>) -> Result<TaskService> {
    let root = config::find_root(&start_dir(dir))?;
    let config = Config::load_from_root(&root)?;
    Ok(TaskService::new(TaskStore::new(root), config))
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let output = crate::output::OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Init => init::run(init::Options {
                dir: start_dir(self.dir.as_ref()),
                output,
            }),

            Commands::Actor(command) => match command {
                ActorCommands::Set { name } => actor_cmd::run_set(actor_cmd::SetOptions {
                    dir: self.dir,
                    name,
                    output,
                }),
                ActorCommands::Show => actor_cmd::run_show(actor_cmd::ShowOptions {
                    dir: self.dir,
                    actor: self.actor,
                    output,
                }),
            },

            Commands::Task(command) => match command {
                TaskCommands::Add {
                    description,
                    due,
                    pics,
                    remarks,
                } => task::run_add(task::AddOptions {
                    dir: self.dir,
                    actor: self.actor,
                    description,
                    due,
                    pics,
                    remarks,
                    output,
                }),
                TaskCommands::List { status, month } => task::run_list(task::ListOptions {
                    dir: self.dir,
                    actor: self.actor,
                    status,
                    month,
                    output,
                }),
                TaskCommands::Show { id } => task::run_show(task::ShowOptions {
                    dir: self.dir,
                    actor: self.actor,
                    id,
                    output,
                }),
                TaskCommands::Edit {
                    id,
                    description,
                    due,
                    pics,
                } => task::run_edit(task::EditOptions {
                    dir: self.dir,
                    actor: self.actor,
                    id,
                    description,
                    due,
                    pics,
                    output,
                }),
                TaskCommands::Status { id, status } => task::run_status(task::StatusOptions {
                    dir: self.dir,
                    actor: self.actor,
                    id,
                    status,
                    output,
                }),
                TaskCommands::Remark { id, text } => task::run_remark(task::RemarkOptions {
                    dir: self.dir,
                    actor: self.actor,
                    id,
                    text,
                    output,
                }),
                TaskCommands::Delete { id } => task::run_delete(task::DeleteOptions {
                    dir: self.dir,
                    actor: self.actor,
                    id,
                    output,
                }),
            },

            Commands::Sla { due, status, at } => sla::run(sla::Options {
                due,
                status,
                at,
                output,
            }),

            Commands::Reconcile { watch, interval } => reconcile::run(reconcile::Options {
                dir: self.dir,
                actor: self.actor,
                watch,
                interval,
                output,
            }),
        }
    }
}
