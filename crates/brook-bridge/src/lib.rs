//! # brook-bridge — Cross-domain transfer adapter.
//!
//! Moves value recorded on one Brook ledger to another ledger on an
//! independently operated domain while preserving the account's locked
//! rate. The two ledgers never communicate directly or share state: the
//! send half burns pool-custodied value and emits the rate as an opaque
//! payload, the receive half validates the route and mints with the
//! preserved rate. Consistency across domains is a protocol property of
//! this adapter, not a shared-storage property.
//!
//! There is no cross-domain atomicity. A completed burn whose payload the
//! transport never delivers stays burned — that gap is owned by the
//! transport's delivery guarantees and is surfaced in the adapter's
//! journal rather than papered over.

pub mod adapter;
pub mod config;
pub mod limiter;
pub mod payload;
pub mod transport;

pub use adapter::{custody_account, BridgeAdapter, InboundPhase, Outbound, OutboundPhase, TransferRecord};
pub use config::{ChainConfig, ChainRegistry, LimiterConfig};
pub use limiter::TokenBucketPolicy;
pub use transport::{DeliveryOutcome, LoopbackTransport, Transport};
