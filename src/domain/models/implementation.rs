//! Implementer (and Debugger fix) output: the set of file changes to apply.

use serde::{Deserialize, Serialize};

/// A single search/replace pair applied against a file's current content.
/// The search text must match exactly once; the applicator rejects the
/// block otherwise rather than guessing which occurrence was meant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurgicalBlock {
    pub search: String,
    pub replace: String,
}

/// What a `FileChange` does to its file, in the priority order the
/// applicator tries: surgical blocks, then unified patch, then full content,
/// and skip only if none are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FileChangeBody {
    Create { content: String },
    Delete,
    Modify {
        #[serde(default)]
        surgical: Vec<SurgicalBlock>,
        #[serde(default)]
        patch: Option<String>,
        #[serde(default)]
        content: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    pub file: String,
    pub body: FileChangeBody,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestChange {
    pub file: String,
    pub content: String,
    #[serde(default)]
    pub description: String,
}

/// The Implementer's (or a Debugger fix's) structured output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplementationResult {
    pub changes: Vec<FileChange>,
    #[serde(default)]
    pub tests_added: Vec<TestChange>,
    #[serde(default)]
    pub commit_message: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub parse_error: bool,
}

impl ImplementationResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.tests_added.is_empty()
    }

    /// All files this result touches, for the boundary check.
    #[must_use]
    pub fn all_files(&self) -> Vec<String> {
        let mut files: Vec<String> = self.changes.iter().map(|c| c.file.clone()).collect();
        files.extend(self.tests_added.iter().map(|t| t.file.clone()));
        files.sort();
        files.dedup();
        files
    }
}

/// How a single file change was actually applied, recorded for the run log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMethod {
    Created,
    Deleted,
    Surgical,
    Patch,
    FullContent,
    /// Patch application failed and no content fallback was present.
    Skipped,
}
