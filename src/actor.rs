//! Actor identity and role resolution.
//!
//! Actor resolution order:
//! 1) CLI --actor (explicit)
//! 2) POTRACK_ACTOR environment variable
//! 3) Persisted value in .potrack/actor
//! 4) Config default (actor.default)
//!
//! The resolved `Actor` (name + role) is passed explicitly into every
//! lifecycle call; the controller never consults ambient state.

use std::path::{Path, PathBuf};

use crate::config::{Config, RosterConfig};
use crate::error::{Error, Result};

const ACTOR_FILENAME: &str = "actor";

/// What an actor is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unrestricted task mutation rights.
    SuperAdmin,
    /// Person-in-charge: may update status and remarks on own tasks only.
    Pic,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::SuperAdmin => f.write_str("super_admin"),
            Role::Pic => f.write_str("pic"),
        }
    }
}

/// A resolved actor identity: roster name plus derived role.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Actor {
    pub name: String,
    pub role: Role,
}

impl Actor {
    /// Look a name up in the roster and derive its role.
    pub fn from_roster(roster: &RosterConfig, name: &str) -> Result<Self> {
        let name = name.trim();
        if roster.is_admin(name) {
            return Ok(Actor {
                name: name.to_string(),
                role: Role::SuperAdmin,
            });
        }
        if roster.is_pic(name) {
            return Ok(Actor {
                name: name.to_string(),
                role: Role::Pic,
            });
        }
        Err(Error::InvalidArgument(format!(
            "{name:?} is not in the roster"
        )))
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}

/// Resolve the current actor name using CLI, environment, persisted value,
/// and config.
pub fn resolve_actor_name(root: Option<&Path>, cli_actor: Option<&str>) -> Result<String> {
    if let Some(actor) = non_empty(cli_actor) {
        return Ok(actor.to_string());
    }

    if let Ok(env_actor) = std::env::var("POTRACK_ACTOR") {
        if let Some(actor) = non_empty(Some(env_actor.as_str())) {
            return Ok(actor.to_string());
        }
    }

    if let Some(root) = root {
        if let Some(actor) = load_persisted_actor(root)? {
            return Ok(actor);
        }

        let config = Config::load_from_root(root)?;
        return Ok(config.actor.default);
    }

    Ok("unknown".to_string())
}

/// Resolve the current actor and check it against the roster.
pub fn resolve_actor(root: &Path, config: &Config, cli_actor: Option<&str>) -> Result<Actor> {
    let name = resolve_actor_name(Some(root), cli_actor)?;
    Actor::from_roster(&config.roster, &name)
}

/// Persist the actor identity in `.potrack/actor`.
pub fn persist_actor(root: &Path, actor: &str) -> Result<()> {
    let actor = non_empty(Some(actor))
        .ok_or_else(|| Error::InvalidArgument("actor name cannot be empty".to_string()))?;

    let data_dir = root.join(crate::store::DATA_DIR);
    std::fs::create_dir_all(&data_dir)?;
    std::fs::write(actor_path(root), format!("{actor}\n"))?;
    Ok(())
}

/// Load the actor identity from `.potrack/actor`, if present.
pub fn load_persisted_actor(root: &Path) -> Result<Option<String>> {
    let path = actor_path(root);
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path)?;
    let actor = raw.trim();
    if actor.is_empty() {
        return Ok(None);
    }

    Ok(Some(actor.to_string()))
}

fn actor_path(root: &Path) -> PathBuf {
    root.join(crate::store::DATA_DIR).join(ACTOR_FILENAME)
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_lookup_assigns_roles() {
        let roster = RosterConfig::default();

        let admin = Actor::from_roster(&roster, "Super Admin").unwrap();
        assert_eq!(admin.role, Role::SuperAdmin);
        assert!(admin.is_admin());

        let pic = Actor::from_roster(&roster, "Latifah").unwrap();
        assert_eq!(pic.role, Role::Pic);
        assert!(!pic.is_admin());

        assert!(matches!(
            Actor::from_roster(&roster, "Stranger"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn cli_actor_wins_over_persisted() {
        let dir = tempfile::tempdir().expect("tempdir");
        persist_actor(dir.path(), "Pandu").expect("persist");

        let name = resolve_actor_name(Some(dir.path()), Some("Vivi")).expect("resolve");
        assert_eq!(name, "Vivi");
    }

    #[test]
    fn persisted_actor_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        persist_actor(dir.path(), "Rama").expect("persist");

        let loaded = load_persisted_actor(dir.path()).expect("load");
        assert_eq!(loaded.as_deref(), Some("Rama"));

        let name = resolve_actor_name(Some(dir.path()), None).expect("resolve");
        assert_eq!(name, "Rama");
    }

    #[test]
    fn empty_actor_name_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            persist_actor(dir.path(), "   "),
            Err(Error::InvalidArgument(_))
        ));
    }
}
