use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Identity of the asset an amount is denominated in.
///
/// Every vesting balance and withdraw permission is bound to exactly one asset;
/// operations quoting a different asset are rejected with an asset mismatch.
///
/// - `Native`: The system's native token (managed by pallet-balances).
/// - `Local(u32)`: Locally issued assets (managed by pallet-assets).
/// - `Foreign(u32)`: Assets bridged in from elsewhere (managed by pallet-assets).
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum AssetKind {
  /// Native token managed by pallet-balances
  #[default]
  Native,
  /// Local asset managed by pallet-assets
  Local(u32),
  /// Foreign asset managed by pallet-assets
  Foreign(u32),
}
