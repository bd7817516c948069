//! Planner output: an ordered list of steps describing the intended change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The kind of change a plan step makes to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Modify,
    Create,
    Delete,
}

/// A self-contained unit of work in the plan; files are the boundary
/// enforcer's unit of attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    pub description: String,
    pub action: StepAction,
    /// Must name at least one file; enforced by `Plan::validate`.
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

/// The Planner's structured output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub risk_notes: String,
    #[serde(default)]
    pub estimated_complexity: String,
    /// Files the plan expects to touch, beyond the per-step `files` lists —
    /// used by the boundary check alongside every step's files.
    #[serde(default)]
    pub files_likely_affected: Vec<String>,
    /// Set by the adapter's fallback path when the response could not be
    /// parsed or validated; never set by a well-formed LLM response.
    #[serde(default)]
    pub parse_error: bool,
}

impl Plan {
    /// All files this plan touches, for the boundary check: the union of
    /// `files_likely_affected` and every step's `files`.
    #[must_use]
    pub fn all_files(&self) -> Vec<String> {
        let mut files = self.files_likely_affected.clone();
        for step in &self.steps {
            files.extend(step.files.iter().cloned());
        }
        files.sort();
        files.dedup();
        files
    }

    /// A plan with no steps and an empty file set is never actionable; the
    /// controller treats this as a `plan_failed` terminal status.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Enforces the Planner policy: every step names at least one concrete
    /// file, and the plan as a whole modifies at most two distinct files.
    /// Called by the planner adapter after JSON parsing succeeds; a parsed
    /// but policy-violating plan is routed to the same fallback path as a
    /// malformed one.
    #[must_use]
    pub fn validate(&self) -> bool {
        if self.steps.is_empty() {
            return false;
        }
        let mut files = BTreeSet::new();
        for step in &self.steps {
            if step.files.is_empty() {
                return false;
            }
            files.extend(step.files.iter().cloned());
        }
        files.len() <= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(files: &[&str]) -> PlanStep {
        PlanStep {
            description: "d".into(),
            action: StepAction::Modify,
            files: files.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn all_files_unions_and_dedupes() {
        let plan = Plan {
            steps: vec![step(&["a.rs", "b.rs"]), step(&["b.rs", "c.rs"])],
            risk_level: RiskLevel::Low,
            risk_notes: String::new(),
            estimated_complexity: String::new(),
            files_likely_affected: vec!["a.rs".into()],
            parse_error: false,
        };
        assert_eq!(plan.all_files(), vec!["a.rs", "b.rs", "c.rs"]);
    }

    #[test]
    fn validate_rejects_a_step_with_no_files() {
        let plan = Plan {
            steps: vec![step(&[])],
            risk_level: RiskLevel::Low,
            risk_notes: String::new(),
            estimated_complexity: String::new(),
            files_likely_affected: vec![],
            parse_error: false,
        };
        assert!(!plan.validate());
    }

    #[test]
    fn validate_rejects_more_than_two_distinct_files() {
        let plan = Plan {
            steps: vec![step(&["a.rs"]), step(&["b.rs"]), step(&["c.rs"])],
            risk_level: RiskLevel::Low,
            risk_notes: String::new(),
            estimated_complexity: String::new(),
            files_likely_affected: vec![],
            parse_error: false,
        };
        assert!(!plan.validate());
    }

    #[test]
    fn validate_accepts_two_distinct_files_across_steps() {
        let plan = Plan {
            steps: vec![step(&["a.rs"]), step(&["a.rs", "b.rs"])],
            risk_level: RiskLevel::Low,
            risk_notes: String::new(),
            estimated_complexity: String::new(),
            files_likely_affected: vec![],
            parse_error: false,
        };
        assert!(plan.validate());
    }

    #[test]
    fn empty_steps_is_empty() {
        let plan = Plan {
            steps: vec![],
            risk_level: RiskLevel::Unknown,
            risk_notes: String::new(),
            estimated_complexity: String::new(),
            files_likely_affected: vec![],
            parse_error: true,
        };
        assert!(plan.is_empty());
    }
}
