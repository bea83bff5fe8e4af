//! The ledger accounting engine.
//!
//! Owns per-account `(principal, locked_rate, last_update)` records and the
//! monotonically non-increasing global rate. Every mutating operation
//! crystallizes first: accrued interest is folded into principal and the
//! accrual clock resets, so after any mutation `balance_of` equals the
//! stored principal until the next tick.
//!
//! All arithmetic is integer-only with `U256` intermediates for overflow
//! safety; division truncates toward zero and always follows multiplication.
//!
//! Not thread-safe — callers that share an engine wrap it in a lock
//! (the bridge adapter uses `parking_lot::RwLock`).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use brook_core::constants::{AMOUNT_MAX, INITIAL_GLOBAL_RATE, PRECISION};
use brook_core::error::LedgerError;
use brook_core::traits::Clock;
use brook_core::types::{Account, AccountId, Amount, Capability, Rate, Timestamp};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Effective balance at `now` per the accrual formula:
/// `principal * (PRECISION + locked_rate * elapsed) / PRECISION`, floored.
///
/// Pure; never mutates the record. Multiplication happens before division so
/// rounding loss stays within one unit.
fn effective_at(account: &Account, now: Timestamp) -> Result<Amount, LedgerError> {
    if account.principal == 0 || now <= account.last_update {
        return Ok(account.principal);
    }
    let elapsed = now - account.last_update;

    let interest_factor = U256::from(account.locked_rate)
        .checked_mul(U256::from(elapsed))
        .ok_or(LedgerError::ArithmeticOverflow)?;
    let factor = U256::from(PRECISION)
        .checked_add(interest_factor)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    let scaled = U256::from(account.principal)
        .checked_mul(factor)
        .ok_or(LedgerError::ArithmeticOverflow)?
        / U256::from(PRECISION);

    if scaled > U256::from(Amount::MAX) {
        return Err(LedgerError::ArithmeticOverflow);
    }
    Ok(scaled.as_u128())
}

/// An account after crystallization, staged but not yet committed.
struct Crystallized {
    account: Account,
    /// Interest folded into principal by this crystallization.
    delta: Amount,
}

/// Serializable engine state: the per-account tuples, the global scalar,
/// and the authorization sets. Keyed vectors are sorted so two snapshots of
/// the same state are byte-identical.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct LedgerSnapshot {
    pub accounts: Vec<(AccountId, Account)>,
    pub allowances: Vec<((AccountId, AccountId), Amount)>,
    pub global_rate: Rate,
    pub owner: AccountId,
    pub issuers: Vec<AccountId>,
    pub total_principal: Amount,
}

/// One instance of the interest-bearing ledger.
///
/// Account records spring into existence on first touch with the zero-value
/// default and are never deleted; a burned-to-zero account keeps its last
/// locked rate, which matters only if it is re-funded while still empty.
pub struct Ledger {
    accounts: HashMap<AccountId, Account>,
    allowances: HashMap<(AccountId, AccountId), Amount>,
    global_rate: Rate,
    owner: AccountId,
    issuers: HashSet<AccountId>,
    /// Sum of all account principals. Grows at crystallization (interest
    /// issuance) and mint, shrinks at burn.
    total_principal: Amount,
    clock: Arc<dyn Clock>,
}

impl Ledger {
    /// Create an empty ledger owned by `owner`, booting at
    /// [`INITIAL_GLOBAL_RATE`]. The owner holds the admin capability but
    /// not mint-and-burn; issuers are granted explicitly.
    pub fn new(owner: AccountId, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts: HashMap::new(),
            allowances: HashMap::new(),
            global_rate: INITIAL_GLOBAL_RATE,
            owner,
            issuers: HashSet::new(),
            total_principal: 0,
            clock,
        }
    }

    // -------------------------------------------------------------------------
    // Queries — never mutate, so repeated calls at one instant are idempotent.
    // -------------------------------------------------------------------------

    /// Effective balance at the current instant, including accrued interest.
    pub fn balance_of(&self, id: &AccountId) -> Result<Amount, LedgerError> {
        match self.accounts.get(id) {
            Some(account) => effective_at(account, self.clock.now()),
            None => Ok(0),
        }
    }

    /// Raw crystallized principal, excluding accrued interest.
    pub fn principal_of(&self, id: &AccountId) -> Amount {
        self.accounts.get(id).map_or(0, |a| a.principal)
    }

    /// The account's locked rate; zero if never funded.
    pub fn locked_rate_of(&self, id: &AccountId) -> Rate {
        self.accounts.get(id).map_or(0, |a| a.locked_rate)
    }

    /// Current global rate applied to fresh issuance.
    pub fn global_rate(&self) -> Rate {
        self.global_rate
    }

    /// Sum of all account principals.
    pub fn total_principal(&self) -> Amount {
        self.total_principal
    }

    /// The admin account.
    pub fn owner(&self) -> AccountId {
        self.owner
    }

    /// Whether `id` holds the mint-and-burn capability.
    pub fn is_issuer(&self, id: &AccountId) -> bool {
        self.issuers.contains(id)
    }

    /// Remaining spending allowance granted by `owner` to `spender`.
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    // -------------------------------------------------------------------------
    // Administration
    // -------------------------------------------------------------------------

    /// Grant the mint-and-burn capability. Owner only.
    pub fn grant_issuer(&mut self, caller: &AccountId, who: &AccountId) -> Result<(), LedgerError> {
        self.require_owner(caller)?;
        self.issuers.insert(*who);
        info!(issuer = %who, "ledger: mint-and-burn capability granted");
        Ok(())
    }

    /// Revoke the mint-and-burn capability. Owner only.
    pub fn revoke_issuer(&mut self, caller: &AccountId, who: &AccountId) -> Result<(), LedgerError> {
        self.require_owner(caller)?;
        self.issuers.remove(who);
        info!(issuer = %who, "ledger: mint-and-burn capability revoked");
        Ok(())
    }

    /// Lower the global rate. Owner only; rejects any non-decreasing update
    /// so the rate is non-increasing over the instance's lifetime. Touches
    /// no account — existing locked rates are unaffected.
    pub fn set_global_rate(&mut self, caller: &AccountId, new_rate: Rate) -> Result<(), LedgerError> {
        self.require_owner(caller)?;
        if new_rate >= self.global_rate {
            return Err(LedgerError::RateMustDecrease {
                current: self.global_rate,
                attempted: new_rate,
            });
        }
        info!(from = self.global_rate, to = new_rate, "ledger: global rate lowered");
        self.global_rate = new_rate;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Issuance
    // -------------------------------------------------------------------------

    /// Mint `amount` to `to`, locking `rate` on the account.
    ///
    /// Crystallizes at the old rate up to now, then overwrites the locked
    /// rate unconditionally — this path is reserved for issuers, which are
    /// responsible for passing the correct rate (the current global rate
    /// for fresh issuance, a preserved rate for cross-domain mint).
    /// `amount == 0` is not an error.
    pub fn mint(
        &mut self,
        caller: &AccountId,
        to: &AccountId,
        amount: Amount,
        rate: Rate,
    ) -> Result<(), LedgerError> {
        self.require_issuer(caller)?;
        let now = self.clock.now();
        let mut staged = self.crystallized(to, now)?;
        staged.account.locked_rate = rate;
        staged.account.principal = staged
            .account
            .principal
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let new_total = self
            .total_principal
            .checked_add(staged.delta)
            .and_then(|t| t.checked_add(amount))
            .ok_or(LedgerError::ArithmeticOverflow)?;

        self.accounts.insert(*to, staged.account);
        self.total_principal = new_total;
        debug!(account = %to, amount, rate, "ledger: minted");
        Ok(())
    }

    /// Burn `amount` from `from`; [`AMOUNT_MAX`] burns the full crystallized
    /// balance. Returns the amount actually burned.
    pub fn burn(
        &mut self,
        caller: &AccountId,
        from: &AccountId,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        self.require_issuer(caller)?;
        let now = self.clock.now();
        let mut staged = self.crystallized(from, now)?;
        let burned = if amount == AMOUNT_MAX {
            staged.account.principal
        } else {
            amount
        };
        if burned > staged.account.principal {
            return Err(LedgerError::InsufficientBalance {
                have: staged.account.principal,
                need: burned,
            });
        }
        staged.account.principal -= burned;
        let new_total = self
            .total_principal
            .checked_add(staged.delta)
            .and_then(|t| t.checked_sub(burned))
            .ok_or(LedgerError::ArithmeticOverflow)?;

        self.accounts.insert(*from, staged.account);
        self.total_principal = new_total;
        debug!(account = %from, burned, "ledger: burned");
        Ok(burned)
    }

    // -------------------------------------------------------------------------
    // Transfers
    // -------------------------------------------------------------------------

    /// Move `amount` from `from` to `to`; [`AMOUNT_MAX`] moves the sender's
    /// full crystallized balance. `from` is the authenticated caller — the
    /// host environment is responsible for that binding.
    ///
    /// Both accounts crystallize first. If the recipient's crystallized
    /// principal is exactly zero it inherits the sender's locked rate;
    /// otherwise the recipient's existing rate wins even though the arriving
    /// principal accrued at a different one. Returns the amount moved.
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        self.transfer_inner(from, to, amount, None)
    }

    /// Like [`transfer`](Self::transfer), spending `from`'s allowance to
    /// `spender`, which is decremented by the amount moved on success.
    pub fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        self.transfer_inner(from, to, amount, Some(spender))
    }

    /// Set the spending allowance from `owner` to `spender`. Overwrites.
    pub fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: Amount) {
        self.allowances.insert((*owner, *spender), amount);
        debug!(owner = %owner, spender = %spender, amount, "ledger: allowance set");
    }

    fn transfer_inner(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
        spender: Option<&AccountId>,
    ) -> Result<Amount, LedgerError> {
        let now = self.clock.now();

        // Self-transfer: crystallize once so interest is not double-counted.
        // Net balance effect is nil but last_update still refreshes.
        if from == to {
            let staged = self.crystallized(from, now)?;
            let moved = if amount == AMOUNT_MAX {
                staged.account.principal
            } else {
                amount
            };
            if moved > staged.account.principal {
                return Err(LedgerError::InsufficientBalance {
                    have: staged.account.principal,
                    need: moved,
                });
            }
            let new_total = self
                .total_principal
                .checked_add(staged.delta)
                .ok_or(LedgerError::ArithmeticOverflow)?;
            self.spend_allowance(from, spender, moved)?;
            self.accounts.insert(*from, staged.account);
            self.total_principal = new_total;
            debug!(account = %from, moved, "ledger: self-transfer");
            return Ok(moved);
        }

        let mut sender = self.crystallized(from, now)?;
        let mut recipient = self.crystallized(to, now)?;

        let moved = if amount == AMOUNT_MAX {
            sender.account.principal
        } else {
            amount
        };
        if moved > sender.account.principal {
            return Err(LedgerError::InsufficientBalance {
                have: sender.account.principal,
                need: moved,
            });
        }

        // Rate inheritance: checked against the crystallized principal, after
        // both crystallizations and never against pre-crystallization
        // effective balance.
        if recipient.account.principal == 0 {
            recipient.account.locked_rate = sender.account.locked_rate;
        }

        sender.account.principal -= moved;
        recipient.account.principal = recipient
            .account
            .principal
            .checked_add(moved)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let new_total = self
            .total_principal
            .checked_add(sender.delta)
            .and_then(|t| t.checked_add(recipient.delta))
            .ok_or(LedgerError::ArithmeticOverflow)?;
        self.spend_allowance(from, spender, moved)?;

        self.accounts.insert(*from, sender.account);
        self.accounts.insert(*to, recipient.account);
        self.total_principal = new_total;
        debug!(from = %from, to = %to, moved, "ledger: transferred");
        Ok(moved)
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Capture the full engine state. Deterministic: keyed entries are sorted.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut accounts: Vec<_> = self.accounts.iter().map(|(k, v)| (*k, *v)).collect();
        accounts.sort_by_key(|(k, _)| *k);
        let mut allowances: Vec<_> = self.allowances.iter().map(|(k, v)| (*k, *v)).collect();
        allowances.sort_by_key(|(k, _)| *k);
        let mut issuers: Vec<_> = self.issuers.iter().copied().collect();
        issuers.sort();
        LedgerSnapshot {
            accounts,
            allowances,
            global_rate: self.global_rate,
            owner: self.owner,
            issuers,
            total_principal: self.total_principal,
        }
    }

    /// Rebuild an engine from a snapshot and a clock.
    pub fn restore(snapshot: LedgerSnapshot, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts: snapshot.accounts.into_iter().collect(),
            allowances: snapshot.allowances.into_iter().collect(),
            global_rate: snapshot.global_rate,
            owner: snapshot.owner,
            issuers: snapshot.issuers.into_iter().collect(),
            total_principal: snapshot.total_principal,
            clock,
        }
    }

    /// Snapshot encoded with bincode's standard config.
    pub fn snapshot_bytes(&self) -> Result<Vec<u8>, bincode::error::EncodeError> {
        bincode::encode_to_vec(self.snapshot(), bincode::config::standard())
    }

    /// Rebuild from [`snapshot_bytes`](Self::snapshot_bytes) output.
    pub fn restore_bytes(
        bytes: &[u8],
        clock: Arc<dyn Clock>,
    ) -> Result<Self, bincode::error::DecodeError> {
        let (snapshot, _) =
            bincode::decode_from_slice::<LedgerSnapshot, _>(bytes, bincode::config::standard())?;
        Ok(Self::restore(snapshot, clock))
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Stage the crystallization of one account: fold accrued interest into
    /// principal and reset the accrual clock. Nothing is written back until
    /// the caller commits, so a later failure leaves no partial mutation.
    fn crystallized(&self, id: &AccountId, now: Timestamp) -> Result<Crystallized, LedgerError> {
        let current = self
            .accounts
            .get(id)
            .copied()
            .unwrap_or_else(|| Account::fresh(now));
        let effective = effective_at(&current, now)?;
        Ok(Crystallized {
            account: Account {
                principal: effective,
                locked_rate: current.locked_rate,
                last_update: now,
            },
            delta: effective - current.principal,
        })
    }

    fn spend_allowance(
        &mut self,
        from: &AccountId,
        spender: Option<&AccountId>,
        moved: Amount,
    ) -> Result<(), LedgerError> {
        let Some(spender) = spender else {
            return Ok(());
        };
        let key = (*from, *spender);
        let allowed = self.allowances.get(&key).copied().unwrap_or(0);
        if moved > allowed {
            return Err(LedgerError::InsufficientAllowance {
                allowed,
                requested: moved,
            });
        }
        self.allowances.insert(key, allowed - moved);
        Ok(())
    }

    fn require_owner(&self, caller: &AccountId) -> Result<(), LedgerError> {
        if *caller != self.owner {
            return Err(LedgerError::Unauthorized {
                caller: *caller,
                capability: Capability::Admin,
            });
        }
        Ok(())
    }

    fn require_issuer(&self, caller: &AccountId) -> Result<(), LedgerError> {
        if !self.issuers.contains(caller) {
            return Err(LedgerError::Unauthorized {
                caller: *caller,
                capability: Capability::MintAndBurn,
            });
        }
        Ok(())
    }
}
