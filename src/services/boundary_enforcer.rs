//! Protected-path enforcement.

use crate::domain::ports::BoundaryEnforcer;

/// Rejects any file under one of a fixed set of protected path prefixes.
pub struct PathPrefixBoundary {
    protected_paths: Vec<String>,
}

impl PathPrefixBoundary {
    #[must_use]
    pub fn new(protected_paths: Vec<String>) -> Self {
        Self { protected_paths }
    }
}

impl BoundaryEnforcer for PathPrefixBoundary {
    fn check(&self, files: &[String], _allow_core: bool) -> Vec<String> {
        files
            .iter()
            .filter(|f| {
                self.protected_paths
                    .iter()
                    .any(|p| f.starts_with(p.as_str()))
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Plan, PlanStep, RiskLevel, StepAction};

    fn boundary() -> PathPrefixBoundary {
        PathPrefixBoundary::new(vec![".github/workflows".to_string(), "Cargo.lock".to_string()])
    }

    #[test]
    fn flags_only_protected_files() {
        let violations = boundary().check(
            &["src/lib.rs".to_string(), ".github/workflows/ci.yml".to_string()],
            false,
        );
        assert_eq!(violations, vec![".github/workflows/ci.yml".to_string()]);
    }

    #[test]
    fn allow_core_does_not_change_which_files_are_flagged() {
        let with_override = boundary().check(&["Cargo.lock".to_string()], true);
        let without_override = boundary().check(&["Cargo.lock".to_string()], false);
        assert_eq!(with_override, without_override);
    }

    #[test]
    fn check_plan_unions_step_files_and_likely_affected() {
        let plan = Plan {
            steps: vec![PlanStep {
                description: "d".into(),
                action: StepAction::Modify,
                files: vec!["Cargo.lock".to_string()],
            }],
            risk_level: RiskLevel::Low,
            risk_notes: String::new(),
            estimated_complexity: String::new(),
            files_likely_affected: vec!["src/lib.rs".to_string()],
            parse_error: false,
        };
        assert_eq!(boundary().check_plan(&plan, false), vec!["Cargo.lock".to_string()]);
    }

    #[test]
    fn no_protected_paths_means_no_violations() {
        let boundary = PathPrefixBoundary::new(vec![]);
        assert!(boundary.check(&["anything.rs".to_string()], false).is_empty());
    }
}
