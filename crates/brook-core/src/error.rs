//! Error types for the Brook protocol.
use crate::types::{AccountId, Amount, Capability, DomainId, Rate};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance: have {have}, need {need}")] InsufficientBalance { have: Amount, need: Amount },
    #[error("insufficient allowance: allowed {allowed}, requested {requested}")] InsufficientAllowance { allowed: Amount, requested: Amount },
    #[error("global rate must decrease: current {current}, attempted {attempted}")] RateMustDecrease { current: Rate, attempted: Rate },
    #[error("unauthorized: {caller} lacks the {capability} capability")] Unauthorized { caller: AccountId, capability: Capability },
    #[error("arithmetic overflow")] ArithmeticOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("route not allowed: {domain} is not a registered destination")] RouteNotAllowed { domain: DomainId },
    #[error("unknown route: {domain} claimed by adapter {claimed}")] UnknownRoute { domain: DomainId, claimed: AccountId },
    #[error("rate limited: {requested} exceeds remaining capacity for {domain}")] RateLimited { domain: DomainId, requested: Amount },
    #[error("malformed payload: {0}")] MalformedPayload(String),
    #[error(transparent)] Ledger(#[from] LedgerError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WrapperError {
    #[error("deposit transfer failed: {amount} from {from}")] DepositTransferFailed { from: AccountId, amount: Amount },
    #[error("redeem transfer failed: {amount} to {to}")] RedeemTransferFailed { to: AccountId, amount: Amount },
    #[error(transparent)] Ledger(#[from] LedgerError),
}

#[derive(Error, Debug)]
pub enum BrookError {
    #[error(transparent)] Ledger(#[from] LedgerError),
    #[error(transparent)] Bridge(#[from] BridgeError),
    #[error(transparent)] Wrapper(#[from] WrapperError),
}
