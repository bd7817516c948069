use crate::domain::error::PipelineError;
use crate::domain::models::{ApplyMethod, FileChange, TestChange};
use std::path::Path;

/// Writes plan/implementer-produced file changes to a working directory.
pub trait ChangeApplicator: Send + Sync {
    /// Applies each change in order; per-file failures are recorded in the
    /// returned log rather than aborting the whole batch.
    fn apply_changes(
        &self,
        working_dir: &Path,
        changes: &[FileChange],
    ) -> Result<Vec<(String, ApplyMethod)>, PipelineError>;

    /// Tests are always written as full content, never patched.
    fn apply_tests(
        &self,
        working_dir: &Path,
        tests: &[TestChange],
    ) -> Result<Vec<String>, PipelineError>;
}
