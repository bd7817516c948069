//! Router budget state: a hard ceiling checked before every call, never a
//! soft pressure level.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BudgetCeiling {
    pub max_tokens: u64,
    pub max_cost: f64,
}

/// Accumulated usage for a single run. The router must check a prospective
/// call's estimated cost against the remaining headroom *before* making the
/// call; there is no refund or retry path if a call is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetState {
    pub tokens_used: u64,
    pub cost_used: f64,
    pub calls_made: u64,
}

impl BudgetState {
    /// Whether a call estimated at `tokens`/`cost` would exceed `ceiling`.
    #[must_use]
    pub fn would_exceed(&self, ceiling: BudgetCeiling, tokens: u64, cost: f64) -> bool {
        self.tokens_used + tokens > ceiling.max_tokens || self.cost_used + cost > ceiling.max_cost
    }

    pub fn record(&mut self, tokens: u64, cost: f64) {
        self.tokens_used += tokens;
        self.cost_used += cost;
        self.calls_made += 1;
    }
}
