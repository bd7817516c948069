//! Hierarchical configuration loading via `figment`: defaults, project YAML,
//! local YAML overrides, then environment variables.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
