//! Connection pacing.
//!
//! Token-bucket limiting of connection attempts per second, shared by
//! all workers. Distinct from the notification gate: this paces the
//! scan itself so a large credential list does not hammer targets.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectLimiter = GovLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// A shared limiter on connection attempts per second.
pub struct RateLimiter {
    limiter: Arc<DirectLimiter>,
}

impl RateLimiter {
    /// Create a limiter, or `None` when `rate` is 0 (unlimited).
    ///
    /// Burst is pinned to 1 so attempts space out evenly instead of
    /// clustering at window edges.
    pub fn per_second(rate: u32) -> Option<Self> {
        let rate = NonZeroU32::new(rate)?;
        let quota = Quota::per_second(rate).allow_burst(nonzero!(1u32));

        Some(Self {
            limiter: Arc::new(GovLimiter::direct(quota)),
        })
    }

    /// Wait until the next attempt is allowed.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire a slot without waiting.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        Self {
            limiter: Arc::clone(&self.limiter),
        }
    }
}
