//! Ecosystem Constants
//!
//! This module centralizes system-level constants: pallet IDs used to derive custody
//! accounts and the fundamental economic parameters of the fee cascade and cashback vesting.
//!
//! These constants are the single source of truth and are re-used by pallet defaults and
//! test mocks via the primitives crate.

/// Balance type alias for consistency across ecosystem
pub type Balance = u128;

/// Unix time in seconds. Every time-dependent computation takes it as an explicit argument.
pub type Moment = u64;

/// Pallet identifiers for deriving pallet-owned accounts.
///
/// These IDs are used by Polkadot SDK's `PalletId::into_account_truncating()`
/// to deterministically generate accounts for pallet-specific custody.
pub mod pallet_ids {
  /// Vesting Balances pallet ID (custody of all vesting balances)
  pub const VESTING_BALANCES_PALLET_ID: &[u8; 8] = b"vestbal0";

  /// Fee Distribution pallet ID (staged fees awaiting the maintenance payout)
  pub const FEE_DISTRIBUTION_PALLET_ID: &[u8; 8] = b"feedist0";
}

/// Ecosystem parameters defining the fee cascade and cashback vesting.
///
/// Percentages are cut sequentially: the network cut from the whole fee, the lifetime
/// referrer cut from what remains, the referrer cut from the affiliate remainder.
pub mod params {
  use super::Balance;
  use sp_arithmetic::Permill;

  /// Precision scalar for amounts (10^12 base units per token).
  pub const PRECISION: Balance = 1_000_000_000_000;

  /// Share of every fee burned by the network (20%).
  pub const NETWORK_FEE_PERCENT: Permill = Permill::from_percent(20);

  /// Share of the post-network remainder owed to the lifetime referrer (37.5%).
  ///
  /// Equals 30% of the whole fee when the network cut is 20%.
  pub const LIFETIME_REFERRER_FEE_PERCENT: Permill = Permill::from_parts(375_000);

  /// Fees strictly above this amount are staged as unvested cashback (100 tokens).
  pub const CASHBACK_VESTING_THRESHOLD: Balance = 100 * PRECISION;

  /// Coin-days vesting period applied to cashback balances (365 days).
  pub const CASHBACK_VESTING_PERIOD_SECONDS: u64 = 365 * 24 * 60 * 60;

  /// Interval between maintenance payouts of staged fees (1 day).
  pub const MAINTENANCE_INTERVAL_SECONDS: u64 = 24 * 60 * 60;

  /// Upper bound on referrer links followed when resolving a lifetime referrer.
  pub const MAX_REFERRAL_DEPTH: u32 = 16;
}
