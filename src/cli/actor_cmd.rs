//! potrack actor command implementation
//!
//! Provides actor identity helpers (set/show).

use std::path::PathBuf;

use crate::actor::{self, Actor};
use crate::config::{self, Config};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

/// Options for `potrack actor set`
pub struct SetOptions {
    pub dir: Option<PathBuf>,
    pub name: String,
    pub output: OutputOptions,
}

/// Options for `potrack actor show`
pub struct ShowOptions {
    pub dir: Option<PathBuf>,
    pub actor: Option<String>,
    pub output: OutputOptions,
}

#[derive(serde::Serialize)]
struct ActorSetReport {
    actor: Actor,
    path: PathBuf,
}

#[derive(serde::Serialize)]
struct ActorShowReport {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<crate::actor::Role>,
}

pub fn run_set(options: SetOptions) -> Result<()> {
    let root = config::find_root(&super::start_dir(options.dir.as_ref()))?;
    let config = Config::load_from_root(&root)?;

    // Reject names outside the roster before persisting anything.
    let resolved = Actor::from_roster(&config.roster, &options.name)?;
    actor::persist_actor(&root, &resolved.name)?;

    let actor_path = root.join(crate::store::DATA_DIR).join("actor");
    let report = ActorSetReport {
        actor: resolved.clone(),
        path: actor_path.clone(),
    };

    let mut human = HumanOutput::new(format!("potrack actor set: {}", resolved.name));
    human.push_summary("actor", resolved.name.clone());
    human.push_summary("role", resolved.role.to_string());
    human.push_summary("path", actor_path.display().to_string());
    human.push_next_step("potrack task list");

    emit_success(options.output, "actor set", &report, Some(&human))?;

    Ok(())
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let root = config::find_root(&super::start_dir(options.dir.as_ref()))?;
    let config = Config::load_from_root(&root)?;

    let name = actor::resolve_actor_name(Some(&root), options.actor.as_deref())?;
    let role = Actor::from_roster(&config.roster, &name)
        .ok()
        .map(|actor| actor.role);

    let report = ActorShowReport {
        name: name.clone(),
        role,
    };

    let header = match role {
        Some(role) => format!("potrack actor: {name} ({role})"),
        None => format!("potrack actor: {name} (not in roster)"),
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("actor", name.clone());
    match role {
        Some(role) => human.push_summary("role", role.to_string()),
        None => {
            human.push_warning("actor is not in the roster; task commands will be rejected");
            human.push_next_step("potrack actor set <name>");
        }
    }

    emit_success(options.output, "actor show", &report, Some(&human))?;

    Ok(())
}
