//! potrack init command implementation.

use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store::TaskStore;

pub struct Options {
    pub dir: PathBuf,
    pub output: OutputOptions,
}

#[derive(serde::Serialize)]
struct InitReport {
    root: PathBuf,
    config: PathBuf,
    data_dir: PathBuf,
    created_config: bool,
}

pub fn run(options: Options) -> Result<()> {
    let root = options.dir;
    std::fs::create_dir_all(&root)?;

    let config_path = root.join(CONFIG_FILE);
    let created_config = !config_path.exists();
    if created_config {
        Config::default().save(&root)?;
    }

    let store = TaskStore::new(root.clone());
    store.init()?;

    let report = InitReport {
        root: root.clone(),
        config: config_path.clone(),
        data_dir: store.data_dir(),
        created_config,
    };

    let mut human = HumanOutput::new(format!("potrack init: {}", root.display()));
    human.push_summary("config", config_path.display().to_string());
    human.push_summary("data", store.data_dir().display().to_string());
    if created_config {
        human.push_detail("wrote default config (edit the roster before first use)");
    } else {
        human.push_detail("config already present, left untouched");
    }
    human.push_next_step("potrack actor set <name>");
    human.push_next_step("potrack task add \"...\" --due YYYY-MM-DD --pic <name>");

    emit_success(options.output, "init", &report, Some(&human))?;

    Ok(())
}
