//! Shared helpers for cross-domain integration tests.

use std::sync::Arc;

use brook_core::traits::ManualClock;
use brook_core::types::{AccountId, Amount, DomainId, Rate};
use brook_bridge::{BridgeAdapter, ChainConfig, ChainRegistry, LimiterConfig, TokenBucketPolicy};
use brook_ledger::Ledger;
use parking_lot::RwLock;

/// Simple account id from a seed byte.
pub fn acct(seed: u8) -> AccountId {
    AccountId([seed; 32])
}

/// One fully wired ledger domain: engine, registry, limiter, adapter —
/// with its own independently advancing clock.
pub struct Domain {
    pub id: DomainId,
    pub admin: AccountId,
    pub adapter_id: AccountId,
    pub clock: Arc<ManualClock>,
    pub ledger: Arc<RwLock<Ledger>>,
    pub adapter: Arc<BridgeAdapter>,
}

impl Domain {
    /// Build a domain. The adapter identity is granted mint-and-burn.
    pub fn new(id: u64, seed: u8) -> Self {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let admin = acct(seed);
        let adapter_id = acct(seed + 1);

        let mut ledger = Ledger::new(admin, clock.clone());
        ledger.grant_issuer(&admin, &adapter_id).unwrap();
        let ledger = Arc::new(RwLock::new(ledger));

        let registry = Arc::new(ChainRegistry::new());
        let policy = Arc::new(TokenBucketPolicy::new(clock.clone(), registry.clone()));
        let adapter = Arc::new(BridgeAdapter::new(
            DomainId(id),
            admin,
            adapter_id,
            ledger.clone(),
            registry,
            policy,
        ));

        Self {
            id: DomainId(id),
            admin,
            adapter_id,
            clock,
            ledger,
            adapter,
        }
    }

    /// Register `remote` as a destination/source with the given limiters.
    pub fn link(
        &self,
        remote: &Domain,
        outbound_limiter: LimiterConfig,
        inbound_limiter: LimiterConfig,
    ) {
        self.adapter
            .register_remote(
                &self.admin,
                ChainConfig {
                    remote_domain: remote.id,
                    remote_adapter: remote.adapter_id,
                    remote_token: acct(0x70),
                    outbound_limiter,
                    inbound_limiter,
                },
            )
            .unwrap();
    }

    /// Issue `amount` at `rate` to `to`, via the adapter's capability.
    pub fn mint(&self, to: &AccountId, amount: Amount, rate: Rate) {
        self.ledger
            .write()
            .mint(&self.adapter_id, to, amount, rate)
            .unwrap();
    }

    pub fn principal_of(&self, id: &AccountId) -> Amount {
        self.ledger.read().principal_of(id)
    }

    pub fn locked_rate_of(&self, id: &AccountId) -> Rate {
        self.ledger.read().locked_rate_of(id)
    }

    pub fn total_principal(&self) -> Amount {
        self.ledger.read().total_principal()
    }
}

/// Two domains linked both ways with unthrottled routes.
pub fn linked_pair() -> (Domain, Domain) {
    let a = Domain::new(1, 0x10);
    let b = Domain::new(2, 0x20);
    a.link(&b, LimiterConfig::disabled(), LimiterConfig::disabled());
    b.link(&a, LimiterConfig::disabled(), LimiterConfig::disabled());
    (a, b)
}
