//! Bounded, agent-readable summary of a repository's file tree.

use crate::domain::error::PipelineError;
use crate::domain::ports::RepoIndexer;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const SKIP_DIRS: &[&str] = &[
    ".git",
    ".glitchlab",
    ".context",
    ".venv",
    "venv",
    "node_modules",
    "target",
    "dist",
    "build",
    "__pycache__",
    ".cargo",
    "vendor",
    ".idea",
    ".vscode",
    "out",
];

const CODE_EXTENSIONS: &[&str] = &[
    "rs", "toml", "py", "js", "ts", "tsx", "jsx", "go", "java", "rb", "yaml", "yml", "md",
];

const KEY_FILES: &[&str] = &[
    "Cargo.toml",
    "package.json",
    "pyproject.toml",
    "go.mod",
    "README.md",
];

fn is_test_file(rel_path: &str) -> bool {
    let lower = rel_path.to_lowercase();
    lower.contains("test") || lower.contains("/tests/") || lower.starts_with("tests/")
}

fn is_key_file(rel_path: &str) -> bool {
    let name = Path::new(rel_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    KEY_FILES.contains(&name)
}

fn is_code_file(rel_path: &str) -> bool {
    Path::new(rel_path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CODE_EXTENSIONS.contains(&ext))
}

struct FileEntry {
    path: String,
    is_test: bool,
    is_key: bool,
}

/// The subset of a `Cargo.toml` this indexer reads to detect sub-projects.
#[derive(serde::Deserialize)]
struct CargoManifest {
    workspace: Option<WorkspaceTable>,
}

#[derive(serde::Deserialize)]
struct WorkspaceTable {
    #[serde(default)]
    members: Vec<String>,
}

/// A bounded top-2-level rendering of the directories `entries` live in.
fn directory_tree(entries: &[FileEntry]) -> String {
    let mut dirs: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut root_files: BTreeSet<&str> = BTreeSet::new();

    for entry in entries {
        match entry.path.split_once('/') {
            Some((first, rest)) => {
                let second = rest.split('/').next().unwrap_or(rest);
                dirs.entry(first).or_default().insert(second);
            }
            None => {
                root_files.insert(entry.path.as_str());
            }
        }
    }

    let mut out = String::new();
    for (dir, children) in &dirs {
        out.push_str(&format!("- {dir}/\n"));
        for child in children {
            out.push_str(&format!("  - {child}\n"));
        }
    }
    for file in &root_files {
        out.push_str(&format!("- {file}\n"));
    }
    out
}

/// `git ls-files` first, falling back to a depth-bounded directory walk for
/// repositories that aren't (yet) a git working tree.
pub struct GitAwareIndexer {
    pub max_files: usize,
    pub max_depth: usize,
}

impl GitAwareIndexer {
    #[must_use]
    pub fn new(max_files: usize, max_depth: usize) -> Self {
        Self { max_files, max_depth }
    }

    async fn git_ls_files(&self, repo_path: &Path) -> Option<Vec<String>> {
        let output = tokio::time::timeout(
            Duration::from_secs(15),
            Command::new("git")
                .args(["ls-files"])
                .current_dir(repo_path)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output(),
        )
        .await
        .ok()?
        .ok()?;
        if !output.status.success() {
            return None;
        }
        Some(
            String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(str::to_string)
                .collect(),
        )
    }

    fn walk_files(&self, repo_path: &Path) -> Vec<String> {
        let mut out = Vec::new();
        walk(repo_path, repo_path, 0, self.max_depth, &mut out);
        out
    }

    fn build_entries(&self, repo_path: &Path, raw: Vec<String>) -> Vec<FileEntry> {
        raw.into_iter()
            .filter(|p| {
                let skipped = p
                    .split('/')
                    .any(|segment| SKIP_DIRS.contains(&segment));
                !skipped && (is_code_file(p) || is_key_file(p))
            })
            .map(|p| FileEntry {
                is_test: is_test_file(&p),
                is_key: is_key_file(&p),
                path: p,
            })
            .collect::<Vec<_>>()
            .into_iter()
            .take(10_000)
            .collect()
    }

    /// Workspace members declared in a root manifest, falling back to the
    /// directories of any nested manifest found among `entries`.
    fn detect_subprojects(&self, repo_path: &Path, entries: &[FileEntry]) -> Vec<String> {
        if let Ok(text) = std::fs::read_to_string(repo_path.join("Cargo.toml")) {
            if let Ok(manifest) = toml::from_str::<CargoManifest>(&text) {
                if let Some(workspace) = manifest.workspace {
                    if !workspace.members.is_empty() {
                        return workspace.members;
                    }
                }
            }
        }

        entries
            .iter()
            .filter(|e| e.is_key && e.path.contains('/'))
            .filter_map(|e| Path::new(&e.path).parent())
            .map(|p| p.to_string_lossy().into_owned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn render(&self, repo_path: &Path, entries: &[FileEntry]) -> String {
        let total = entries.len();
        let mut languages: BTreeMap<&str, usize> = BTreeMap::new();
        for entry in entries {
            let ext = Path::new(&entry.path)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)");
            *languages.entry(ext).or_default() += 1;
        }

        let mut out = String::new();
        out.push_str(&format!("# Repository index: {}\n", repo_path.display()));
        out.push_str(&format!("Total files: {total}\n\n"));

        out.push_str("## Languages\n");
        let mut lang_counts: Vec<_> = languages.into_iter().collect();
        lang_counts.sort_by(|a, b| b.1.cmp(&a.1));
        for (ext, count) in lang_counts.into_iter().take(10) {
            out.push_str(&format!("- .{ext}: {count}\n"));
        }

        out.push_str("\n## Sub-projects\n");
        let subprojects = self.detect_subprojects(repo_path, entries);
        if subprojects.is_empty() {
            out.push_str("(none detected)\n");
        } else {
            for member in &subprojects {
                out.push_str(&format!("- {member}\n"));
            }
        }

        out.push_str("\n## Key files\n");
        let key_files: BTreeSet<&str> = entries
            .iter()
            .filter(|e| e.is_key)
            .map(|e| e.path.as_str())
            .collect();
        for f in key_files {
            out.push_str(&format!("- {f}\n"));
        }

        out.push_str("\n## Directory tree (top 2 levels)\n");
        out.push_str(&directory_tree(entries));

        out.push_str("\n## Files\n");
        for entry in entries.iter().take(self.max_files) {
            let mut markers = Vec::new();
            if entry.is_test {
                markers.push("test");
            }
            if entry.is_key {
                markers.push("key");
            }
            if markers.is_empty() {
                out.push_str(&format!("- {}\n", entry.path));
            } else {
                out.push_str(&format!("- {} [{}]\n", entry.path, markers.join(",")));
            }
        }
        if total > self.max_files {
            out.push_str(&format!("... and {} more files\n", total - self.max_files));
        }
        out
    }
}

fn walk(root: &Path, dir: &Path, depth: usize, max_depth: usize, out: &mut Vec<String>) {
    if depth > max_depth {
        return;
    }
    let Ok(read_dir) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in read_dir.flatten() {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if path.is_dir() {
            if SKIP_DIRS.contains(&name.as_ref()) {
                continue;
            }
            walk(root, &path, depth + 1, max_depth, out);
        } else if let Ok(rel) = path.strip_prefix(root) {
            out.push(rel.to_string_lossy().into_owned());
        }
    }
}

#[async_trait]
impl RepoIndexer for GitAwareIndexer {
    async fn index(&self, repo_path: &Path) -> Result<String, PipelineError> {
        let raw = match self.git_ls_files(repo_path).await {
            Some(files) if !files.is_empty() => files,
            _ => self.walk_files(repo_path),
        };
        let entries = self.build_entries(repo_path, raw);
        Ok(self.render(repo_path, &entries))
    }
}
