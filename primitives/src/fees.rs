//! Fee split arithmetic
//!
//! Every split point multiplies by a `Permill`, truncates toward zero, and assigns the exact
//! remainder to the other side, so the two children of a split always sum to the parent.

use crate::ecosystem::{Balance, params};
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use sp_arithmetic::{PerThing, Permill};

/// Cut `percent` out of `amount`. Returns `(cut, remainder)`.
pub fn cut_fee(amount: Balance, percent: Permill) -> (Balance, Balance) {
  let cut = percent.mul_floor(amount);
  (cut, amount.saturating_sub(cut))
}

/// Governance-adjustable parameters of the fee cascade and its cashback staging.
#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub struct FeeParameters {
  /// Share of each fee burned by the network
  pub network_percent: Permill,
  /// Share of the post-network remainder paid to the lifetime referrer
  pub lifetime_referrer_percent: Permill,
  /// Fees strictly above this are staged unvested
  pub cashback_vesting_threshold: Balance,
  /// Coin-days vesting period of cashback balances
  pub cashback_vesting_seconds: u64,
  /// Seconds between maintenance payouts
  pub maintenance_interval_seconds: u64,
}

impl Default for FeeParameters {
  fn default() -> Self {
    Self {
      network_percent: params::NETWORK_FEE_PERCENT,
      lifetime_referrer_percent: params::LIFETIME_REFERRER_FEE_PERCENT,
      cashback_vesting_threshold: params::CASHBACK_VESTING_THRESHOLD,
      cashback_vesting_seconds: params::CASHBACK_VESTING_PERIOD_SECONDS,
      maintenance_interval_seconds: params::MAINTENANCE_INTERVAL_SECONDS,
    }
  }
}

impl FeeParameters {
  pub fn validate(&self) -> bool {
    self.cashback_vesting_seconds > 0 && self.maintenance_interval_seconds > 0
  }

  /// Whether a fee of `amount` is staged as unvested cashback.
  pub fn requires_vesting(&self, amount: Balance) -> bool {
    amount > self.cashback_vesting_threshold
  }
}

/// Result of splitting one fee through the cascade.
#[derive(Clone, Copy, Debug, Default, Decode, Encode, Eq, PartialEq, TypeInfo)]
pub struct FeeSplit {
  pub network_cut: Balance,
  pub lifetime_cut: Balance,
  pub referrer_cut: Balance,
  pub registrar_cut: Balance,
}

impl FeeSplit {
  pub fn total(&self) -> Balance {
    self
      .network_cut
      .saturating_add(self.lifetime_cut)
      .saturating_add(self.referrer_cut)
      .saturating_add(self.registrar_cut)
  }
}

/// Split `fee` into network, lifetime referrer, referrer and registrar shares.
///
/// When the payer is itself a lifetime member the whole post-network remainder is its
/// lifetime share and the referrer and registrar receive nothing.
pub fn split_fee(
  fee: Balance,
  params: &FeeParameters,
  referrer_percent: Permill,
  payer_is_lifetime_member: bool,
) -> FeeSplit {
  let (network_cut, remaining) = cut_fee(fee, params.network_percent);
  if payer_is_lifetime_member {
    return FeeSplit {
      network_cut,
      lifetime_cut: remaining,
      ..Default::default()
    };
  }
  let (lifetime_cut, affiliate) = cut_fee(remaining, params.lifetime_referrer_percent);
  let (referrer_cut, registrar_cut) = cut_fee(affiliate, referrer_percent);
  FeeSplit {
    network_cut,
    lifetime_cut,
    referrer_cut,
    registrar_cut,
  }
}
