//! Per-domain request pacing.
//!
//! Every outbound request waits for its domain's turn first. A turn holds the
//! domain's lock for the configured delay, so two requests to the same domain
//! are always at least `delay` apart, while different domains never wait on
//! each other. Waiters are not queued fairly; only exclusion and spacing are
//! guaranteed.
//!
//! Locks are created on first use and kept for the limiter's lifetime. The
//! map only grows with the number of distinct domains crawled.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::origin::extract_domain;

type DomainLock = Arc<tokio::sync::Mutex<()>>;

pub struct DomainRateLimiter {
    delay: Duration,
    locks: Mutex<HashMap<String, DomainLock>>,
}

impl DomainRateLimiter {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            locks: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of domains that have been given a lock so far.
    #[must_use]
    pub fn tracked_domains(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Waits until `url`'s domain is free, then holds it for the configured delay.
    ///
    /// Call immediately before sending a request to that domain. The domain
    /// lock is released when this returns, or when the returned future is
    /// dropped mid-wait (timeouts, cancellation).
    pub async fn wait_turn(&self, url: &str) {
        let domain = extract_domain(url);
        let lock = self.lock_for(&domain);

        let _turn = lock.lock().await;
        tracing::trace!(domain = %domain, delay = ?self.delay, "domain turn acquired");
        tokio::time::sleep(self.delay).await;
    }

    /// Returns the lock for `domain`, creating it if this is the first request.
    ///
    /// The map mutex is held only for the lookup, never across an await, and
    /// the entry API guarantees a single lock per domain under contention.
    fn lock_for(&self, domain: &str) -> DomainLock {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(domain.to_owned()).or_default())
    }
}
