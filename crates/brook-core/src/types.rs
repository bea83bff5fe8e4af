//! Core protocol types: identifiers, account records, capabilities.
//!
//! All monetary values are `u128`; rates are `u128` fixed-point with
//! [`PRECISION`](crate::constants::PRECISION) as denominator; timestamps are
//! `u64` Unix seconds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ledger amount.
pub type Amount = u128;

/// A fixed-point interest rate (per second, `PRECISION` denominator).
pub type Rate = u128;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// A 32-byte account identifier.
///
/// Opaque to the ledger: the host environment decides whether it is a key
/// hash, a contract address padded out, or anything else 32 bytes wide.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// The zero identifier. Never holds value; useful as a placeholder.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create an AccountId from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero identifier.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for AccountId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Identifier of an independently operated ledger domain.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct DomainId(pub u64);

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "domain-{}", self.0)
    }
}

/// Per-account ledger record.
///
/// `principal` is the last-crystallized balance; interest accrued since
/// `last_update` exists only implicitly until the next crystallization.
/// Records spring into existence on first touch with the zero-value default
/// and are never deleted.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct Account {
    /// Last-crystallized balance, excluding accrued-but-unrealized interest.
    pub principal: Amount,
    /// Per-account rate fixed at funding time. Overwritten on privileged
    /// mint; inherited on transfer into an empty account; otherwise frozen.
    pub locked_rate: Rate,
    /// Timestamp of the last crystallization.
    pub last_update: Timestamp,
}

impl Account {
    /// The zero-value default a record starts from when first touched.
    pub fn fresh(now: Timestamp) -> Self {
        Self {
            principal: 0,
            locked_rate: 0,
            last_update: now,
        }
    }
}

/// Capabilities gating privileged ledger operations.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Required for `mint` and `burn` — held by issuers such as the
    /// collateral wrapper and the bridge adapter.
    MintAndBurn,
    /// Required for rate administration, capability grants, and remote-route
    /// registration.
    Admin,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MintAndBurn => write!(f, "mint-and-burn"),
            Self::Admin => write!(f, "admin"),
        }
    }
}
