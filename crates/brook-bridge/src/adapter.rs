//! The cross-domain transfer adapter.
//!
//! Wraps one ledger instance. The send half burns pool-custodied value and
//! emits the sender's locked rate as an opaque payload; the receive half
//! validates the claimed route and mints with the preserved rate — never
//! the destination's current global rate. The two halves of one logical
//! transfer run on different ledgers at different times with no shared
//! transaction: each half is atomic within its own domain, and a burn whose
//! payload is never delivered stays burned. That gap belongs to the
//! transport's delivery guarantees, not to this module.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use brook_core::constants::PAYLOAD_LEN;
use brook_core::error::{BridgeError, LedgerError};
use brook_core::traits::RoutePolicy;
use brook_core::types::{AccountId, Amount, Capability, DomainId, Rate};
use brook_ledger::Ledger;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ChainConfig, ChainRegistry};
use crate::payload;

/// Send-half progression. `PayloadEmitted` is terminal; an aborted send
/// journals the phase it reached.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutboundPhase {
    Requested,
    Validated,
    Burned,
    PayloadEmitted,
}

/// Receive-half progression. `Minted` is terminal.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum InboundPhase {
    Received,
    Validated,
    Minted,
}

/// One journaled transfer attempt, successful or not.
///
/// The journal exists so a host can audit the burned-but-unminted gap:
/// every send that reached `Burned` or beyond without a matching inbound
/// record on the destination is value in flight (or lost in transport).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum TransferRecord {
    Outbound {
        seq: u64,
        remote_domain: DomainId,
        origin_sender: AccountId,
        amount: Amount,
        rate: Option<Rate>,
        phase: OutboundPhase,
        error: Option<String>,
    },
    Inbound {
        seq: u64,
        source_domain: DomainId,
        receiver: AccountId,
        amount: Amount,
        rate: Option<Rate>,
        phase: InboundPhase,
        error: Option<String>,
    },
}

/// What a completed send hands back to the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outbound {
    /// Token identifier on the destination domain, from the route record.
    pub remote_token: AccountId,
    /// The opaque rate payload to carry.
    pub payload: [u8; PAYLOAD_LEN],
}

/// Derive the pool custody account for a domain.
///
/// Hash-derived so it cannot collide with a caller-chosen identity on the
/// same ledger.
pub fn custody_account(domain: DomainId) -> AccountId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"brook.bridge.custody.v1");
    hasher.update(&domain.0.to_le_bytes());
    AccountId(*hasher.finalize().as_bytes())
}

/// One adapter instance: one ledger, one local domain.
///
/// `adapter_id` is its caller identity on the ledger and must hold the
/// mint-and-burn capability; `admin` gates route registration.
pub struct BridgeAdapter {
    local_domain: DomainId,
    admin: AccountId,
    adapter_id: AccountId,
    custody: AccountId,
    ledger: Arc<RwLock<Ledger>>,
    registry: Arc<ChainRegistry>,
    policy: Arc<dyn RoutePolicy>,
    journal: Mutex<Vec<TransferRecord>>,
    next_seq: AtomicU64,
}

impl BridgeAdapter {
    pub fn new(
        local_domain: DomainId,
        admin: AccountId,
        adapter_id: AccountId,
        ledger: Arc<RwLock<Ledger>>,
        registry: Arc<ChainRegistry>,
        policy: Arc<dyn RoutePolicy>,
    ) -> Self {
        Self {
            local_domain,
            admin,
            adapter_id,
            custody: custody_account(local_domain),
            ledger,
            registry,
            policy,
            journal: Mutex::new(Vec::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn local_domain(&self) -> DomainId {
        self.local_domain
    }

    /// The adapter's caller identity on its ledger.
    pub fn adapter_account(&self) -> AccountId {
        self.adapter_id
    }

    /// The pool custody account value must sit under before a send.
    pub fn custody(&self) -> AccountId {
        self.custody
    }

    /// Handle to the wrapped ledger, for the transport's pre-transfer
    /// custody convention and for host queries.
    pub fn ledger(&self) -> &Arc<RwLock<Ledger>> {
        &self.ledger
    }

    /// Register or overwrite the route record for a remote domain. Admin only.
    pub fn register_remote(
        &self,
        caller: &AccountId,
        config: ChainConfig,
    ) -> Result<(), BridgeError> {
        if *caller != self.admin {
            return Err(BridgeError::Ledger(LedgerError::Unauthorized {
                caller: *caller,
                capability: Capability::Admin,
            }));
        }
        info!(domain = %config.remote_domain, adapter = %config.remote_adapter, "bridge: route registered");
        self.registry.register(config);
        Ok(())
    }

    /// Snapshot of every journaled transfer attempt, in order.
    pub fn journal(&self) -> Vec<TransferRecord> {
        self.journal.lock().clone()
    }

    // -------------------------------------------------------------------------
    // Send half: Requested → Validated → Burned → PayloadEmitted
    // -------------------------------------------------------------------------

    /// Start a cross-domain transfer of `amount` toward `remote_domain`.
    ///
    /// `origin_sender` is the account originating the transfer; the value
    /// itself is already custodied under the pool account by the
    /// transport's pre-transfer convention. The sender's locked rate is
    /// read *before* the burn — the burn operates on custodied principal,
    /// not the sender's account, and the rate captured here is what the
    /// destination will mint with.
    pub fn send(
        &self,
        origin_sender: &AccountId,
        remote_domain: DomainId,
        amount: Amount,
    ) -> Result<Outbound, BridgeError> {
        let mut phase = OutboundPhase::Requested;
        let result = self.send_inner(origin_sender, remote_domain, amount, &mut phase);
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().push(TransferRecord::Outbound {
            seq,
            remote_domain,
            origin_sender: *origin_sender,
            amount,
            rate: result.as_ref().ok().map(|(rate, _)| *rate),
            phase,
            error: result.as_ref().err().map(|e| e.to_string()),
        });
        result.map(|(_, outbound)| outbound)
    }

    fn send_inner(
        &self,
        origin_sender: &AccountId,
        remote_domain: DomainId,
        amount: Amount,
        phase: &mut OutboundPhase,
    ) -> Result<(Rate, Outbound), BridgeError> {
        let config = self
            .registry
            .get(remote_domain)
            .ok_or(BridgeError::RouteNotAllowed { domain: remote_domain })?;
        self.policy.check_outbound(remote_domain, amount)?;
        *phase = OutboundPhase::Validated;

        let rate = {
            let mut ledger = self.ledger.write();
            let rate = ledger.locked_rate_of(origin_sender);
            ledger.burn(&self.adapter_id, &self.custody, amount)?;
            rate
        };
        *phase = OutboundPhase::Burned;
        self.policy.record_outbound(remote_domain, amount);

        let outbound = Outbound {
            remote_token: config.remote_token,
            payload: payload::encode_rate(rate),
        };
        *phase = OutboundPhase::PayloadEmitted;
        info!(domain = %remote_domain, sender = %origin_sender, amount, rate, "bridge: outbound emitted");
        Ok((rate, outbound))
    }

    // -------------------------------------------------------------------------
    // Receive half: Received → Validated → Minted
    // -------------------------------------------------------------------------

    /// Complete a cross-domain transfer relayed by the transport.
    ///
    /// `claimed_adapter` is the transport's word for which adapter sent
    /// this; it must match the registered route for `source_domain`. The
    /// mint uses the payload's preserved rate, regardless of this ledger's
    /// current global rate.
    pub fn receive(
        &self,
        source_domain: DomainId,
        claimed_adapter: &AccountId,
        payload_bytes: &[u8],
        receiver: &AccountId,
        amount: Amount,
    ) -> Result<(), BridgeError> {
        let mut phase = InboundPhase::Received;
        let result =
            self.receive_inner(source_domain, claimed_adapter, payload_bytes, receiver, amount, &mut phase);
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().push(TransferRecord::Inbound {
            seq,
            source_domain,
            receiver: *receiver,
            amount,
            rate: result.as_ref().ok().copied(),
            phase,
            error: result.as_ref().err().map(|e| e.to_string()),
        });
        result.map(|_| ())
    }

    fn receive_inner(
        &self,
        source_domain: DomainId,
        claimed_adapter: &AccountId,
        payload_bytes: &[u8],
        receiver: &AccountId,
        amount: Amount,
        phase: &mut InboundPhase,
    ) -> Result<Rate, BridgeError> {
        let config = self.registry.get(source_domain).ok_or(BridgeError::UnknownRoute {
            domain: source_domain,
            claimed: *claimed_adapter,
        })?;
        if config.remote_adapter != *claimed_adapter {
            debug!(domain = %source_domain, claimed = %claimed_adapter, "bridge: adapter mismatch");
            return Err(BridgeError::UnknownRoute {
                domain: source_domain,
                claimed: *claimed_adapter,
            });
        }
        self.policy.check_inbound(source_domain, amount)?;
        *phase = InboundPhase::Validated;

        let rate = payload::decode_rate(payload_bytes)?;
        self.ledger
            .write()
            .mint(&self.adapter_id, receiver, amount, rate)?;
        *phase = InboundPhase::Minted;
        self.policy.record_inbound(source_domain, amount);
        info!(domain = %source_domain, receiver = %receiver, amount, rate, "bridge: inbound minted");
        Ok(rate)
    }
}
