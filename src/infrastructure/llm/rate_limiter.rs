use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

type Limiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Paces outgoing LLM calls to a sustained rate, independent of the budget
/// ceiling: this exists so a burst of agent calls within one pipeline run
/// doesn't trip the provider's own rate limit, not to cap spend.
#[derive(Clone)]
pub struct GovernedRateLimiter {
    inner: Arc<Limiter>,
}

impl GovernedRateLimiter {
    #[must_use]
    pub fn per_second(requests_per_second: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::new(1).expect("1 is nonzero")),
        );
        Self { inner: Arc::new(RateLimiter::direct(quota)) }
    }

    pub async fn acquire(&self) {
        self.inner.until_ready().await;
    }
}
