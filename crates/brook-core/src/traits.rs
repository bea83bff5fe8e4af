//! Trait interfaces for the Brook protocol.
//!
//! These traits define the contracts between crates:
//! - [`Clock`] — time source for accrual (brook-ledger consumes)
//! - [`CollateralVault`] — base-asset custody behind the wrapper (host implements)
//! - [`RoutePolicy`] — allow-list / throughput policy the adapter consults
//!   (brook-bridge ships a token-bucket implementation)

use crate::error::{BridgeError, WrapperError};
use crate::types::{AccountId, Amount, DomainId, Timestamp};
use std::sync::atomic::{AtomicU64, Ordering};

/// Time source for accrual arithmetic.
///
/// The ledger never reads ambient time directly; everything flows through
/// this seam so tests can advance time explicitly. The host environment's
/// normal timestamp tolerance is accepted as a bounded precision limit.
pub trait Clock: Send + Sync {
    /// Current time as Unix seconds.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time via `chrono`. The production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp().max(0) as Timestamp
    }
}

/// Manually advanced clock for tests and simulations.
///
/// Shared freely (`Arc<ManualClock>`); `advance` is atomic so a test can
/// hold one handle while the ledger holds another.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Move time forward by `secs`.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Jump to an absolute timestamp.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

/// Base-asset custody behind the collateral wrapper.
///
/// The wrapper exchanges the base asset 1:1 for ledger value; the actual
/// asset movement is the host's concern and lives behind this trait. Both
/// methods either fully move the asset or fail with no partial effect.
pub trait CollateralVault: Send + Sync {
    /// Take `amount` of the base asset from `from` into custody.
    fn pull(&self, from: &AccountId, amount: Amount) -> Result<(), WrapperError>;

    /// Release `amount` of the base asset from custody to `to`.
    fn push(&self, to: &AccountId, amount: Amount) -> Result<(), WrapperError>;
}

/// Allow-list and throughput policy consulted by the bridge adapter.
///
/// Check and record are split: the adapter checks during validation and
/// records only after the engine operation succeeds, so a rejected or
/// failed transfer never spends capacity. (The same split the network
/// layer's per-peer limiter uses, for the same reason.)
pub trait RoutePolicy: Send + Sync {
    /// Would an outbound transfer of `amount` toward `domain` be admitted?
    fn check_outbound(&self, domain: DomainId, amount: Amount) -> Result<(), BridgeError>;

    /// Account for an admitted outbound transfer.
    fn record_outbound(&self, domain: DomainId, amount: Amount);

    /// Would an inbound transfer of `amount` from `domain` be admitted?
    fn check_inbound(&self, domain: DomainId, amount: Amount) -> Result<(), BridgeError>;

    /// Account for an admitted inbound transfer.
    fn record_inbound(&self, domain: DomainId, amount: Amount);
}

/// A policy that admits everything. Useful when throttling is handled
/// entirely outside the adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenPolicy;

impl RoutePolicy for OpenPolicy {
    fn check_outbound(&self, _domain: DomainId, _amount: Amount) -> Result<(), BridgeError> {
        Ok(())
    }

    fn record_outbound(&self, _domain: DomainId, _amount: Amount) {}

    fn check_inbound(&self, _domain: DomainId, _amount: Amount) -> Result<(), BridgeError> {
        Ok(())
    }

    fn record_inbound(&self, _domain: DomainId, _amount: Amount) {}
}
