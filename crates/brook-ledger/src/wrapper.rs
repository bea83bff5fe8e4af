//! Thin collateral wrapper: base asset in, ledger value out, 1:1.
//!
//! No accrual logic of its own. Deposits mint at the ledger's current
//! global rate; redeems burn (sentinel-aware) and release the base asset
//! through the [`CollateralVault`] seam. A failed release restores the
//! burned principal at the account's original locked rate, so a redeem
//! either completes or leaves the ledger exactly as it was.

use brook_core::error::WrapperError;
use brook_core::traits::CollateralVault;
use brook_core::types::{AccountId, Amount};
use tracing::{info, warn};

use crate::engine::Ledger;

/// The 1:1 deposit/redeem passthrough.
///
/// `wrapper_id` is the wrapper's caller identity on the ledger; it must
/// hold the mint-and-burn capability there.
pub struct CollateralWrapper<V: CollateralVault> {
    vault: V,
    wrapper_id: AccountId,
}

impl<V: CollateralVault> CollateralWrapper<V> {
    pub fn new(wrapper_id: AccountId, vault: V) -> Self {
        Self { vault, wrapper_id }
    }

    /// The wrapper's ledger identity.
    pub fn id(&self) -> AccountId {
        self.wrapper_id
    }

    /// Pull `amount` of the base asset from `depositor` and mint the same
    /// amount of ledger value to them at the current global rate.
    pub fn deposit(
        &self,
        ledger: &mut Ledger,
        depositor: &AccountId,
        amount: Amount,
    ) -> Result<(), WrapperError> {
        self.vault.pull(depositor, amount)?;
        let rate = ledger.global_rate();
        if let Err(err) = ledger.mint(&self.wrapper_id, depositor, amount, rate) {
            // Return the pulled asset; the deposit never happened.
            if self.vault.push(depositor, amount).is_err() {
                warn!(depositor = %depositor, amount, "wrapper: could not return collateral after failed mint");
            }
            return Err(err.into());
        }
        info!(depositor = %depositor, amount, rate, "wrapper: deposit");
        Ok(())
    }

    /// Burn `amount` of ledger value (sentinel-aware) and release the same
    /// amount of the base asset to `withdrawer`. Returns the amount moved.
    ///
    /// If the release fails the burn is undone — principal and locked rate
    /// restored — and [`WrapperError::RedeemTransferFailed`] surfaces.
    pub fn redeem(
        &self,
        ledger: &mut Ledger,
        withdrawer: &AccountId,
        amount: Amount,
    ) -> Result<Amount, WrapperError> {
        let rate = ledger.locked_rate_of(withdrawer);
        let burned = ledger.burn(&self.wrapper_id, withdrawer, amount)?;
        if self.vault.push(withdrawer, burned).is_err() {
            ledger.mint(&self.wrapper_id, withdrawer, burned, rate)?;
            return Err(WrapperError::RedeemTransferFailed {
                to: *withdrawer,
                amount: burned,
            });
        }
        info!(withdrawer = %withdrawer, burned, "wrapper: redeem");
        Ok(burned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brook_core::constants::{AMOUNT_MAX, PRECISION};
    use brook_core::error::LedgerError;
    use brook_core::traits::ManualClock;
    use std::sync::Arc;
    use std::sync::Mutex;

    const UNIT: Amount = PRECISION;

    fn acct(seed: u8) -> AccountId {
        AccountId([seed; 32])
    }

    /// Vault double that records moves and can be told to refuse pushes.
    #[derive(Default)]
    struct RecordingVault {
        fail_push: bool,
        pulls: Mutex<Vec<(AccountId, Amount)>>,
        pushes: Mutex<Vec<(AccountId, Amount)>>,
    }

    impl CollateralVault for RecordingVault {
        fn pull(&self, from: &AccountId, amount: Amount) -> Result<(), WrapperError> {
            self.pulls.lock().unwrap().push((*from, amount));
            Ok(())
        }

        fn push(&self, to: &AccountId, amount: Amount) -> Result<(), WrapperError> {
            if self.fail_push {
                return Err(WrapperError::RedeemTransferFailed { to: *to, amount });
            }
            self.pushes.lock().unwrap().push((*to, amount));
            Ok(())
        }
    }

    fn setup(fail_push: bool) -> (Ledger, CollateralWrapper<RecordingVault>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let owner = acct(0xA0);
        let mut ledger = Ledger::new(owner, clock.clone());
        let wrapper = CollateralWrapper::new(
            acct(0xB0),
            RecordingVault { fail_push, ..Default::default() },
        );
        ledger.grant_issuer(&owner, &wrapper.id()).unwrap();
        (ledger, wrapper, clock)
    }

    #[test]
    fn deposit_mints_at_current_global_rate() {
        let (mut ledger, wrapper, _) = setup(false);
        let rate = ledger.global_rate();
        wrapper.deposit(&mut ledger, &acct(1), UNIT).unwrap();
        assert_eq!(ledger.principal_of(&acct(1)), UNIT);
        assert_eq!(ledger.locked_rate_of(&acct(1)), rate);
        assert_eq!(wrapper.vault.pulls.lock().unwrap().as_slice(), &[(acct(1), UNIT)]);
    }

    #[test]
    fn deposit_after_rate_cut_locks_the_lower_rate() {
        let (mut ledger, wrapper, _) = setup(false);
        wrapper.deposit(&mut ledger, &acct(1), UNIT).unwrap();
        ledger.set_global_rate(&acct(0xA0), 1).unwrap();
        wrapper.deposit(&mut ledger, &acct(2), UNIT).unwrap();

        // Earlier depositor keeps the richer rate it locked.
        assert!(ledger.locked_rate_of(&acct(1)) > ledger.locked_rate_of(&acct(2)));
        assert_eq!(ledger.locked_rate_of(&acct(2)), 1);
    }

    #[test]
    fn redeem_releases_and_burns() {
        let (mut ledger, wrapper, clock) = setup(false);
        wrapper.deposit(&mut ledger, &acct(1), UNIT).unwrap();
        clock.advance(3_600);

        let burned = wrapper.redeem(&mut ledger, &acct(1), AMOUNT_MAX).unwrap();
        // Full crystallized balance, interest included.
        assert!(burned > UNIT);
        assert_eq!(ledger.principal_of(&acct(1)), 0);
        assert_eq!(wrapper.vault.pushes.lock().unwrap().as_slice(), &[(acct(1), burned)]);
    }

    #[test]
    fn failed_release_restores_the_burn() {
        let (mut ledger, wrapper, _) = setup(true);
        wrapper.deposit(&mut ledger, &acct(1), UNIT).unwrap();
        let rate_before = ledger.locked_rate_of(&acct(1));

        let err = wrapper.redeem(&mut ledger, &acct(1), UNIT).unwrap_err();
        assert_eq!(err, WrapperError::RedeemTransferFailed { to: acct(1), amount: UNIT });
        assert_eq!(ledger.principal_of(&acct(1)), UNIT);
        assert_eq!(ledger.locked_rate_of(&acct(1)), rate_before);
    }

    #[test]
    fn redeem_more_than_held_touches_nothing() {
        let (mut ledger, wrapper, _) = setup(false);
        wrapper.deposit(&mut ledger, &acct(1), UNIT).unwrap();

        let err = wrapper.redeem(&mut ledger, &acct(1), 2 * UNIT).unwrap_err();
        assert!(matches!(err, WrapperError::Ledger(LedgerError::InsufficientBalance { .. })));
        assert_eq!(ledger.principal_of(&acct(1)), UNIT);
        assert!(wrapper.vault.pushes.lock().unwrap().is_empty());
    }
}
