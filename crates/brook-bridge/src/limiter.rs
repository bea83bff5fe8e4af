//! Per-domain throughput limiting using token buckets.
//!
//! One bucket per direction per remote domain, refilled linearly from the
//! route's [`LimiterConfig`]. Checking and recording are separate steps —
//! the adapter checks during validation and records only after the engine
//! operation succeeds, so a rejected or failed transfer never spends
//! capacity.

use std::sync::Arc;

use brook_core::error::BridgeError;
use brook_core::traits::{Clock, RoutePolicy};
use brook_core::types::{Amount, DomainId, Timestamp};
use dashmap::DashMap;
use tracing::debug;

use crate::config::{ChainRegistry, LimiterConfig};

/// Bucket state for one direction of one route.
#[derive(Debug, Clone, Copy)]
struct Bucket {
    level: Amount,
    last_refill: Timestamp,
}

impl Bucket {
    /// A bucket starts full.
    fn full(config: &LimiterConfig, now: Timestamp) -> Self {
        Self {
            level: config.capacity,
            last_refill: now,
        }
    }

    /// Apply linear refill up to capacity. Saturates deliberately: the
    /// bucket level is a policy quantity, not ledger value.
    fn refill(&mut self, config: &LimiterConfig, now: Timestamp) {
        if now <= self.last_refill {
            return;
        }
        let elapsed = (now - self.last_refill) as Amount;
        let refilled = config.refill_per_sec.saturating_mul(elapsed);
        self.level = self.level.saturating_add(refilled).min(config.capacity);
        self.last_refill = now;
    }
}

/// The shipped [`RoutePolicy`]: token buckets parameterized by each route's
/// chain-configuration record.
pub struct TokenBucketPolicy {
    clock: Arc<dyn Clock>,
    registry: Arc<ChainRegistry>,
    outbound: DashMap<DomainId, Bucket>,
    inbound: DashMap<DomainId, Bucket>,
}

impl TokenBucketPolicy {
    pub fn new(clock: Arc<dyn Clock>, registry: Arc<ChainRegistry>) -> Self {
        Self {
            clock,
            registry,
            outbound: DashMap::new(),
            inbound: DashMap::new(),
        }
    }

    fn check(
        buckets: &DashMap<DomainId, Bucket>,
        config: &LimiterConfig,
        domain: DomainId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), BridgeError> {
        if !config.enabled {
            return Ok(());
        }
        let mut bucket = buckets
            .entry(domain)
            .or_insert_with(|| Bucket::full(config, now));
        bucket.refill(config, now);
        if amount > bucket.level {
            debug!(domain = %domain, amount, level = bucket.level, "limiter: over capacity");
            return Err(BridgeError::RateLimited {
                domain,
                requested: amount,
            });
        }
        Ok(())
    }

    fn record(
        buckets: &DashMap<DomainId, Bucket>,
        config: &LimiterConfig,
        domain: DomainId,
        amount: Amount,
        now: Timestamp,
    ) {
        if !config.enabled {
            return;
        }
        let mut bucket = buckets
            .entry(domain)
            .or_insert_with(|| Bucket::full(config, now));
        bucket.refill(config, now);
        bucket.level = bucket.level.saturating_sub(amount);
    }
}

impl RoutePolicy for TokenBucketPolicy {
    fn check_outbound(&self, domain: DomainId, amount: Amount) -> Result<(), BridgeError> {
        // Route existence is the adapter's concern; an unregistered domain
        // simply has no limiter to consult.
        let Some(config) = self.registry.get(domain) else {
            return Ok(());
        };
        Self::check(&self.outbound, &config.outbound_limiter, domain, amount, self.clock.now())
    }

    fn record_outbound(&self, domain: DomainId, amount: Amount) {
        let Some(config) = self.registry.get(domain) else {
            return;
        };
        Self::record(&self.outbound, &config.outbound_limiter, domain, amount, self.clock.now());
    }

    fn check_inbound(&self, domain: DomainId, amount: Amount) -> Result<(), BridgeError> {
        let Some(config) = self.registry.get(domain) else {
            return Ok(());
        };
        Self::check(&self.inbound, &config.inbound_limiter, domain, amount, self.clock.now())
    }

    fn record_inbound(&self, domain: DomainId, amount: Amount) {
        let Some(config) = self.registry.get(domain) else {
            return;
        };
        Self::record(&self.inbound, &config.inbound_limiter, domain, amount, self.clock.now());
    }
}
