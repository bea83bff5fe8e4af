//! # brook-ledger — Interest-bearing ledger accounting engine.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! - **Linear accrual windows**: an account's effective balance grows as
//!   `principal * (PRECISION + locked_rate * elapsed) / PRECISION` between
//!   crystallizations; every mutating operation crystallizes first, so
//!   accrual compounds exactly at mutation boundaries.
//! - **Locked rates**: each account carries the rate fixed at funding time;
//!   transfers into an empty account inherit the sender's rate, funded
//!   recipients keep their own.
//! - **Monotone global rate**: the rate applied to fresh issuance only ever
//!   decreases.

pub mod engine;
pub mod wrapper;

pub use engine::{Ledger, LedgerSnapshot};
pub use wrapper::CollateralWrapper;
