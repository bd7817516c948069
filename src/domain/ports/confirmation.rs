/// An operator confirmation gate, checked at the points
/// `InterventionConfig` marks as pausable. `auto_approve` in config bypasses
/// the gate entirely before the controller ever calls this.
pub trait ConfirmationGate: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Approves every gate without asking — used when `auto_approve` is set or
/// in the parallel runner, where no operator is attached to a terminal.
pub struct AutoApprove;

impl ConfirmationGate for AutoApprove {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}
