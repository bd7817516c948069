//! Terminal output formatting: history tables and run-outcome panels.

pub mod panels;
pub mod table;

pub use panels::render_run_outcome;
pub use table::{format_history_stats, format_history_table};

use serde::Serialize;

/// Implemented by each command's result type so `output()` can print it
/// either as a human-readable summary or as JSON for scripting.
pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}
