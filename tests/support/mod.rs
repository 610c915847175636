use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use potrack::actor::{Actor, Role};
use potrack::config::{Config, RosterConfig};
use potrack::lifecycle::TaskService;
use potrack::store::TaskStore;
use potrack::task::{NewTask, Task};
use tempfile::TempDir;

/// A tracker rooted in a tempdir with a small fixed roster.
pub struct TestTracker {
    dir: TempDir,
    service: TaskService,
}

impl TestTracker {
    pub fn init() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let config = Config {
            roster: RosterConfig {
                admin: "Super Admin".to_string(),
                pics: vec![
                    "Agung".to_string(),
                    "Latifah".to_string(),
                    "Pepy".to_string(),
                ],
            },
            ..Config::default()
        };
        config.save(dir.path()).expect("write config");

        let store = TaskStore::new(dir.path().to_path_buf());
        store.init().expect("init store");

        let service = TaskService::new(store, config);
        Self { dir, service }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn service(&self) -> &TaskService {
        &self.service
    }

    pub fn store(&self) -> &TaskStore {
        self.service.store()
    }

    pub fn deletions_file(&self) -> PathBuf {
        self.store().deletions_file()
    }

    /// Create a task as the admin, assigned to the given PICs.
    pub fn seed_task(&self, description: &str, due: &str, pics: &[&str], now: &str) -> Task {
        self.service
            .create_task(
                &admin(),
                NewTask {
                    description: description.to_string(),
                    due_date: date(due),
                    assignees: pics.iter().map(|p| p.to_string()).collect(),
                    remarks: String::new(),
                },
                at(now),
            )
            .expect("seed task")
    }
}

pub fn admin() -> Actor {
    Actor {
        name: "Super Admin".to_string(),
        role: Role::SuperAdmin,
    }
}

pub fn pic(name: &str) -> Actor {
    Actor {
        name: name.to_string(),
        role: Role::Pic,
    }
}

pub fn at(s: &str) -> DateTime<Utc> {
    s.parse().expect("timestamp")
}

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("date")
}
