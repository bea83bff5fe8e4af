//! Protocol constants. All rates are fixed-point with [`PRECISION`] as denominator.

/// Fixed-point scale factor for rates and accrual arithmetic.
///
/// A `locked_rate` of `PRECISION` means the account accrues 100% of its
/// principal per second; realistic rates are many orders of magnitude smaller.
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Seconds in a Julian year, used to express annual rates per second.
pub const SECONDS_PER_YEAR: u64 = 31_557_600;

/// The global rate a fresh ledger instance boots with: 10% per year,
/// expressed per second at [`PRECISION`] scale. The rate administrator can
/// only move it downward from here.
pub const INITIAL_GLOBAL_RATE: u128 = PRECISION / 10 / SECONDS_PER_YEAR as u128;

/// Reserved sentinel accepted by burn and transfer operations.
///
/// When passed as the amount it is substituted with the account's full
/// crystallized balance, so "burn everything" does not race against accrual
/// between a balance query and the burn.
pub const AMOUNT_MAX: u128 = u128::MAX;

/// Byte width of the cross-domain rate payload (a big-endian unsigned
/// integer, upper half zero for `u128` rates).
pub const PAYLOAD_LEN: usize = 32;
