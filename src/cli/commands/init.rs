//! Implementation of the `glitchlab init` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub config_path: PathBuf,
    pub written: bool,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        if self.written {
            format!("wrote default config to {}", self.config_path.display())
        } else {
            format!("{} already exists; rerun with --force to overwrite", self.config_path.display())
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub struct InitArgs {
    pub repo: PathBuf,
    pub force: bool,
}

pub fn execute(args: InitArgs, json_mode: bool) -> Result<i32> {
    let repo_path = std::fs::canonicalize(&args.repo)
        .with_context(|| format!("repo path does not exist: {}", args.repo.display()))?;
    let glitchlab_dir = repo_path.join(".glitchlab");
    let config_path = glitchlab_dir.join("config.yaml");

    if config_path.exists() && !args.force {
        output(&InitOutput { config_path, written: false }, json_mode);
        return Ok(1);
    }

    std::fs::create_dir_all(&glitchlab_dir)
        .with_context(|| format!("failed to create {}", glitchlab_dir.display()))?;
    std::fs::create_dir_all(glitchlab_dir.join("logs"))
        .with_context(|| format!("failed to create {}/logs", glitchlab_dir.display()))?;

    let yaml = serde_yaml::to_string(&Config::default()).context("failed to serialize default config")?;
    std::fs::write(&config_path, yaml)
        .with_context(|| format!("failed to write {}", config_path.display()))?;

    output(&InitOutput { config_path, written: true }, json_mode);
    Ok(0)
}
