//! Configuration loading and management
//!
//! Handles parsing of `potrack.toml` at the tracker root. The config file
//! doubles as the root marker for directory discovery.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Config file name at the tracker root.
pub const CONFIG_FILE: &str = "potrack.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Roster of people who may appear on tasks
    #[serde(default)]
    pub roster: RosterConfig,

    /// Reconciliation configuration
    #[serde(default)]
    pub reconcile: ReconcileConfig,

    /// Actor configuration
    #[serde(default)]
    pub actor: ActorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roster: RosterConfig::default(),
            reconcile: ReconcileConfig::default(),
            actor: ActorConfig::default(),
        }
    }
}

/// The fixed person roster: one super admin plus the PIC list.
///
/// The roster is deploy-time configuration, not user-editable data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Identifier of the super admin
    #[serde(default = "default_admin")]
    pub admin: String,

    /// PIC identifiers tasks may be assigned to
    #[serde(default = "default_pics")]
    pub pics: Vec<String>,
}

fn default_admin() -> String {
    "Super Admin".to_string()
}

fn default_pics() -> Vec<String> {
    [
        "Agung", "Latifah", "Pepy", "Pandu", "Vivi", "Rama", "Raysha",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            admin: default_admin(),
            pics: default_pics(),
        }
    }
}

impl RosterConfig {
    pub fn is_admin(&self, name: &str) -> bool {
        self.admin == name
    }

    pub fn is_pic(&self, name: &str) -> bool {
        self.pics.iter().any(|pic| pic == name)
    }
}

/// Reconciliation tick configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Interval between reconciliation passes in watch mode
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    30
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

/// Actor-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Default actor name when none specified
    #[serde(default = "default_actor")]
    pub default: String,
}

fn default_actor() -> String {
    "unknown".to_string()
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            default: default_actor(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config from a tracker root. A missing file yields defaults;
    /// a present-but-broken file is an error rather than a silent fallback.
    pub fn load_from_root(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(root.join(CONFIG_FILE), content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.roster.admin.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "roster.admin cannot be empty".to_string(),
            ));
        }
        if self.roster.pics.is_empty() {
            return Err(Error::InvalidConfig(
                "roster.pics cannot be empty".to_string(),
            ));
        }
        for pic in &self.roster.pics {
            if pic.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "roster.pics entries cannot be empty".to_string(),
                ));
            }
        }
        if self.roster.pics.iter().any(|pic| pic == &self.roster.admin) {
            return Err(Error::InvalidConfig(format!(
                "roster.admin {:?} cannot also be a PIC",
                self.roster.admin
            )));
        }
        if self.reconcile.interval_secs == 0 {
            return Err(Error::InvalidConfig(
                "reconcile.interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Walk up from `start` looking for a directory containing `potrack.toml`.
pub fn find_root(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(Error::TrackerNotFound(start.to_path_buf()));
        }
    }
}
