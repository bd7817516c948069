//! Read-only enrichment from a project's `.context/` directory.

use crate::domain::ports::ContextProvider;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads `.context/project.json`, `.context/stack.json`, and
/// `.context/decisions/*.md` if present. Never shells out to an external
/// tool — only the on-disk convention is read.
pub struct DirectoryContextProvider {
    context_dir: PathBuf,
}

impl DirectoryContextProvider {
    #[must_use]
    pub fn new(repo_path: &Path) -> Self {
        Self {
            context_dir: repo_path.join(".context"),
        }
    }

    fn decisions(&self) -> Vec<(String, String)> {
        let dir = self.context_dir.join("decisions");
        let Ok(read_dir) = fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut decisions: Vec<_> = read_dir
            .flatten()
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("md"))
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                fs::read_to_string(e.path()).ok().map(|content| (name, content))
            })
            .collect();
        decisions.sort_by(|a, b| a.0.cmp(&b.0));
        decisions
    }
}

impl ContextProvider for DirectoryContextProvider {
    fn available(&self) -> bool {
        self.context_dir.is_dir()
    }

    fn build_prefix(&self) -> String {
        if !self.available() {
            return String::new();
        }
        let mut out = String::from("=== PROJECT CONTEXT ===\n");
        if let Ok(project) = fs::read_to_string(self.context_dir.join("project.json")) {
            out.push_str("Project:\n");
            out.push_str(&project);
            out.push('\n');
        }
        if let Ok(stack) = fs::read_to_string(self.context_dir.join("stack.json")) {
            out.push_str("Stack:\n");
            out.push_str(&stack);
            out.push('\n');
        }
        let decisions = self.decisions();
        if !decisions.is_empty() {
            out.push_str(&format!("{} prior decisions recorded:\n", decisions.len()));
            for (name, _) in &decisions {
                out.push_str(&format!("- {name}\n"));
            }
        }
        out
    }

    fn constraints(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Used when a repository has no `.context/` directory.
pub struct NullContextProvider;

impl ContextProvider for NullContextProvider {
    fn available(&self) -> bool {
        false
    }

    fn build_prefix(&self) -> String {
        String::new()
    }

    fn constraints(&self) -> Vec<String> {
        Vec::new()
    }
}
