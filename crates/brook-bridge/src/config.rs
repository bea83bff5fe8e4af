//! Per-remote-domain chain configuration.
//!
//! One record per remote domain the local adapter is willing to talk to;
//! registration is idempotent per domain (re-registering overwrites). The
//! privilege check lives on the adapter — the registry itself is a dumb
//! concurrent store.

use brook_core::types::{AccountId, Amount, DomainId};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Token-bucket parameters for one direction of one route.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct LimiterConfig {
    /// Off means the direction is unthrottled.
    pub enabled: bool,
    /// Maximum bucket level, in ledger units.
    pub capacity: Amount,
    /// Units restored per second, up to `capacity`.
    pub refill_per_sec: Amount,
}

impl LimiterConfig {
    /// An unthrottled direction.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            capacity: 0,
            refill_per_sec: 0,
        }
    }

    /// A throttled direction with the given bucket parameters.
    pub fn new(capacity: Amount, refill_per_sec: Amount) -> Self {
        Self {
            enabled: true,
            capacity,
            refill_per_sec,
        }
    }
}

/// Everything the local adapter knows about one remote domain.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct ChainConfig {
    pub remote_domain: DomainId,
    /// The adapter instance on the remote domain. Inbound messages claiming
    /// this domain must come from exactly this adapter.
    pub remote_adapter: AccountId,
    /// The token identifier the payload should be applied to over there.
    pub remote_token: AccountId,
    pub outbound_limiter: LimiterConfig,
    pub inbound_limiter: LimiterConfig,
}

/// Concurrent store of chain-configuration records, keyed by remote domain.
#[derive(Default)]
pub struct ChainRegistry {
    routes: DashMap<DomainId, ChainConfig>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the record for `config.remote_domain`.
    pub fn register(&self, config: ChainConfig) {
        self.routes.insert(config.remote_domain, config);
    }

    /// Look up the record for a remote domain.
    pub fn get(&self, domain: DomainId) -> Option<ChainConfig> {
        self.routes.get(&domain).map(|r| *r)
    }

    /// All registered remote domains, sorted.
    pub fn domains(&self) -> Vec<DomainId> {
        let mut domains: Vec<_> = self.routes.iter().map(|r| *r.key()).collect();
        domains.sort();
        domains
    }

    /// All records, sorted by remote domain. Deterministic, for persistence.
    pub fn snapshot(&self) -> Vec<ChainConfig> {
        let mut records: Vec<_> = self.routes.iter().map(|r| *r.value()).collect();
        records.sort_by_key(|c| c.remote_domain);
        records
    }

    /// Rebuild a registry from snapshot records.
    pub fn restore(records: impl IntoIterator<Item = ChainConfig>) -> Self {
        let registry = Self::new();
        for record in records {
            registry.register(record);
        }
        registry
    }
}
