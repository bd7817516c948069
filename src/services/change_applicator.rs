//! Applies Implementer/Debugger-produced file changes to a working directory.

use crate::domain::error::PipelineError;
use crate::domain::models::{ApplyMethod, FileChange, FileChangeBody, TestChange};
use crate::domain::ports::ChangeApplicator;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{info, warn};

pub struct FsChangeApplicator;

impl FsChangeApplicator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn apply_one(&self, working_dir: &Path, change: &FileChange) -> Result<ApplyMethod, PipelineError> {
        let target = working_dir.join(&change.file);
        match &change.body {
            FileChangeBody::Create { content } => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)
                        .map_err(|e| PipelineError::Other(format!("mkdir {}: {e}", parent.display())))?;
                }
                fs::write(&target, content)
                    .map_err(|e| PipelineError::Other(format!("write {}: {e}", target.display())))?;
                Ok(ApplyMethod::Created)
            }
            FileChangeBody::Delete => {
                if target.exists() {
                    fs::remove_file(&target)
                        .map_err(|e| PipelineError::Other(format!("remove {}: {e}", target.display())))?;
                }
                Ok(ApplyMethod::Deleted)
            }
            FileChangeBody::Modify { surgical, patch, content } => {
                if !surgical.is_empty() {
                    return self.apply_surgical(&target, surgical);
                }
                if let Some(patch_text) = patch {
                    if self.apply_patch(working_dir, patch_text)? {
                        return Ok(ApplyMethod::Patch);
                    }
                    warn!(file = %change.file, "patch failed, falling back to full content");
                }
                if let Some(content) = content {
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent).ok();
                    }
                    fs::write(&target, content)
                        .map_err(|e| PipelineError::Other(format!("write {}: {e}", target.display())))?;
                    return Ok(ApplyMethod::FullContent);
                }
                warn!(file = %change.file, "modify had no usable surgical/patch/content, skipping");
                Ok(ApplyMethod::Skipped)
            }
        }
    }

    /// Each search block must match at least once; if it matches more than
    /// once, the first occurrence wins rather than rejecting the block — a
    /// search string legitimately repeating in the file is not an error.
    /// A block absent from the file fails the whole surgical application so
    /// a reviewer can see why.
    fn apply_surgical(
        &self,
        target: &Path,
        blocks: &[crate::domain::models::SurgicalBlock],
    ) -> Result<ApplyMethod, PipelineError> {
        let mut content = fs::read_to_string(target)
            .map_err(|e| PipelineError::Other(format!("read {}: {e}", target.display())))?;
        for block in blocks {
            if !content.contains(block.search.as_str()) {
                return Err(PipelineError::Other(format!(
                    "surgical block not found in {}",
                    target.display()
                )));
            }
            content = content.replacen(&block.search, &block.replace, 1);
        }
        fs::write(target, content)
            .map_err(|e| PipelineError::Other(format!("write {}: {e}", target.display())))?;
        Ok(ApplyMethod::Surgical)
    }

    fn apply_patch(&self, working_dir: &Path, patch_text: &str) -> Result<bool, PipelineError> {
        let patch_path = working_dir.join(".glitchlab-patch.tmp");
        fs::write(&patch_path, patch_text)
            .map_err(|e| PipelineError::Other(format!("write patch file: {e}")))?;

        let check = run_git_apply(working_dir, &patch_path, true);
        let applied = if check {
            run_git_apply(working_dir, &patch_path, false)
        } else {
            false
        };

        let _ = fs::remove_file(&patch_path);
        Ok(applied)
    }
}

impl Default for FsChangeApplicator {
    fn default() -> Self {
        Self::new()
    }
}

fn run_git_apply(working_dir: &Path, patch_path: &Path, check_only: bool) -> bool {
    let mut cmd = Command::new("git");
    cmd.arg("apply");
    if check_only {
        cmd.arg("--check");
    }
    cmd.arg(patch_path)
        .current_dir(working_dir)
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    matches!(cmd.output(), Ok(output) if output.status.success())
}

impl ChangeApplicator for FsChangeApplicator {
    fn apply_changes(
        &self,
        working_dir: &Path,
        changes: &[FileChange],
    ) -> Result<Vec<(String, ApplyMethod)>, PipelineError> {
        let mut log = Vec::with_capacity(changes.len());
        for change in changes {
            let method = self.apply_one(working_dir, change)?;
            info!(file = %change.file, method = ?method, "applied change");
            log.push((change.file.clone(), method));
        }
        Ok(log)
    }

    fn apply_tests(&self, working_dir: &Path, tests: &[TestChange]) -> Result<Vec<String>, PipelineError> {
        let mut applied = Vec::with_capacity(tests.len());
        for test in tests {
            let target = working_dir.join(&test.file);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).ok();
            }
            fs::write(&target, &test.content)
                .map_err(|e| PipelineError::Other(format!("write test {}: {e}", target.display())))?;
            applied.push(test.file.clone());
        }
        Ok(applied)
    }
}
