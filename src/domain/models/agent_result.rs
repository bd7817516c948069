//! Output contracts for the Security, Release, and Archivist stages, and the
//! metadata every agent call attaches regardless of role.

use serde::{Deserialize, Serialize};

/// Usage metadata attached to every router call, regardless of role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentMeta {
    pub agent: String,
    pub model: String,
    pub tokens: u64,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityIssue {
    pub severity: Severity,
    pub file: String,
    #[serde(default)]
    pub line: Option<u32>,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityVerdict {
    Pass,
    Warn,
    Block,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyChanges {
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
    #[serde(default)]
    pub risk_assessment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityResult {
    pub verdict: SecurityVerdict,
    #[serde(default)]
    pub issues: Vec<SecurityIssue>,
    #[serde(default)]
    pub dependency_changes: DependencyChanges,
    #[serde(default)]
    pub boundary_violations: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub parse_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionBump {
    None,
    Patch,
    Minor,
    Major,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseResult {
    pub version_bump: VersionBump,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub changelog_entry: String,
    #[serde(default)]
    pub breaking_changes: Vec<String>,
    #[serde(default)]
    pub migration_notes: String,
    #[serde(default)]
    pub risk_summary: String,
    #[serde(default)]
    pub parse_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocUpdateAction {
    Create,
    Append,
    Update,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocUpdate {
    pub file: String,
    pub action: DocUpdateAction,
    pub content: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdrDraft {
    pub title: String,
    pub status: String,
    pub context: String,
    pub decision: String,
    pub consequences: String,
    #[serde(default)]
    pub alternatives_considered: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivistResult {
    #[serde(default)]
    pub adr: Option<AdrDraft>,
    #[serde(default)]
    pub doc_updates: Vec<DocUpdate>,
    #[serde(default)]
    pub architecture_notes: String,
    #[serde(default)]
    pub should_write_adr: bool,
    #[serde(default)]
    pub parse_error: bool,
}

/// Debugger's proposed fix, one iteration of the test/fix loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugResult {
    pub diagnosis: String,
    pub root_cause: String,
    pub fix: super::implementation::ImplementationResult,
    pub confidence: String,
    pub should_retry: bool,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub parse_error: bool,
}
