//! Exercises the `init` and `history` command handlers against a real
//! temporary directory, the way `main.rs` drives them.

use glitchlab::cli::commands::{history, init};
use glitchlab::domain::models::Config;
use tempfile::TempDir;

#[test]
fn init_writes_a_loadable_default_config() {
    let repo = TempDir::new().unwrap();

    let code = init::execute(init::InitArgs { repo: repo.path().to_path_buf(), force: false }, false).unwrap();
    assert_eq!(code, 0);

    let config_path = repo.path().join(".glitchlab/config.yaml");
    assert!(config_path.exists());

    let written = std::fs::read_to_string(&config_path).unwrap();
    let parsed: Config = serde_yaml::from_str(&written).unwrap();
    assert_eq!(parsed.workspace.base_branch, Config::default().workspace.base_branch);
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let repo = TempDir::new().unwrap();
    init::execute(init::InitArgs { repo: repo.path().to_path_buf(), force: false }, false).unwrap();

    let code = init::execute(init::InitArgs { repo: repo.path().to_path_buf(), force: false }, false).unwrap();
    assert_eq!(code, 1, "second init without --force should report failure");

    let code = init::execute(init::InitArgs { repo: repo.path().to_path_buf(), force: true }, false).unwrap();
    assert_eq!(code, 0, "--force should allow overwrite");
}

#[test]
fn history_reports_empty_before_any_run() {
    let repo = TempDir::new().unwrap();
    let code = history::execute(
        history::HistoryArgs { repo: repo.path().to_path_buf(), limit: 20, failures_only: false, stats: true },
        false,
    )
    .unwrap();
    assert_eq!(code, 0);
}
