use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use polkadot_sdk::sp_runtime::Permill;
use primitives::Balance;
use scale_info::TypeInfo;

/// Referral data of one account, owned by the account registry.
#[derive(Clone, Debug, Decode, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen)]
pub struct ReferralInfo<AccountId> {
  /// Account that registered this one
  pub registrar: AccountId,
  /// Account that introduced this one
  pub referrer: AccountId,
  /// Referrer's share of what remains after the network and lifetime cuts
  pub referrer_percent: Permill,
}

/// Read access to referral data and membership status.
pub trait ReferralProvider<AccountId> {
  fn referral_info(who: &AccountId) -> Option<ReferralInfo<AccountId>>;
  fn is_lifetime_member(who: &AccountId) -> bool;
}

/// Fees an account paid since the last maintenance payout.
#[derive(
  Clone,
  Copy,
  Debug,
  Default,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub struct FeeStatistics {
  /// Paid out as unvested cashback
  pub pending_fees: Balance,
  /// Paid out as vested cashback
  pub pending_vested_fees: Balance,
}

impl FeeStatistics {
  pub fn is_empty(&self) -> bool {
    self.pending_fees == 0 && self.pending_vested_fees == 0
  }
}
