//! Transport seam and in-process loopback implementation.
//!
//! The real transport is an external collaborator: it delivers opaque
//! payloads between adapter instances with at-least-once semantics,
//! arbitrary delay, and possible non-delivery — but never corruption.
//! [`LoopbackTransport`] models exactly that envelope in-process so tests
//! can exercise the protocol's partial-failure surface: dropped deliveries
//! leave value burned on the source with no destination mint, duplicated
//! deliveries mint twice.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use brook_core::error::BridgeError;
use brook_core::types::{AccountId, Amount, DomainId};
use parking_lot::RwLock;
use tracing::debug;

use crate::adapter::BridgeAdapter;

/// What happened to one logical transfer at the transport layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The destination half ran (at least once).
    Delivered,
    /// The source half completed but the payload never reached a
    /// destination adapter. The burn stands; recovery is out of scope.
    Dropped,
}

/// Carries one logical transfer from a source adapter to a destination.
pub trait Transport: Send + Sync {
    /// Run the source half on `source`'s adapter and, if delivery happens,
    /// the destination half on `dest`'s.
    fn transfer(
        &self,
        source: DomainId,
        origin_sender: &AccountId,
        dest: DomainId,
        receiver: &AccountId,
        amount: Amount,
    ) -> Result<DeliveryOutcome, BridgeError>;
}

/// In-process transport connecting adapters by domain id.
#[derive(Default)]
pub struct LoopbackTransport {
    adapters: RwLock<HashMap<DomainId, Arc<BridgeAdapter>>>,
    drop_next: AtomicBool,
    duplicate_next: AtomicBool,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an adapter; messages to its domain will be delivered to it.
    pub fn connect(&self, adapter: Arc<BridgeAdapter>) {
        self.adapters
            .write()
            .insert(adapter.local_domain(), adapter);
    }

    /// Lose the next payload after the source half completes.
    pub fn drop_next(&self) {
        self.drop_next.store(true, Ordering::SeqCst);
    }

    /// Deliver the next payload twice (at-least-once in action).
    pub fn duplicate_next(&self) {
        self.duplicate_next.store(true, Ordering::SeqCst);
    }
}

impl Transport for LoopbackTransport {
    fn transfer(
        &self,
        source: DomainId,
        origin_sender: &AccountId,
        dest: DomainId,
        receiver: &AccountId,
        amount: Amount,
    ) -> Result<DeliveryOutcome, BridgeError> {
        let adapters = self.adapters.read();
        let src = adapters
            .get(&source)
            .ok_or(BridgeError::RouteNotAllowed { domain: source })?;

        // Pre-transfer custody convention: the transport moves the value
        // under the pool's account before invoking the send half.
        let custody = src.custody();
        src.ledger().write().transfer(origin_sender, &custody, amount)?;

        let outbound = match src.send(origin_sender, dest, amount) {
            Ok(outbound) => outbound,
            Err(err) => {
                // The send half rejected before burning; hand the value back.
                src.ledger().write().transfer(&custody, origin_sender, amount)?;
                return Err(err);
            }
        };

        if self.drop_next.swap(false, Ordering::SeqCst) {
            debug!(source = %source, dest = %dest, amount, "loopback: payload dropped");
            return Ok(DeliveryOutcome::Dropped);
        }
        let Some(dst) = adapters.get(&dest) else {
            debug!(dest = %dest, "loopback: no adapter for destination");
            return Ok(DeliveryOutcome::Dropped);
        };

        let deliveries = if self.duplicate_next.swap(false, Ordering::SeqCst) {
            2
        } else {
            1
        };
        for _ in 0..deliveries {
            dst.receive(source, &src.adapter_account(), &outbound.payload, receiver, amount)?;
        }
        Ok(DeliveryOutcome::Delivered)
    }
}
