//! Adapter traits shared by the value-accounting pallets
//!
//! Asset movement is abstracted behind `AssetOps` so each pallet stays generic over
//! the runtime's native and multi-asset implementations. `CashbackVesting` is the seam
//! between the fee cascade and the vesting balances that receive its payouts.

use polkadot_sdk::sp_runtime::DispatchError;

/// Asset mutations and queries.
///
/// `transfer` and `burn` must either fully succeed or leave balances untouched.
pub trait AssetOps<AccountId, AssetId, Balance> {
  fn transfer(
    from: &AccountId,
    to: &AccountId,
    asset: AssetId,
    amount: Balance,
  ) -> Result<(), DispatchError>;

  fn burn(who: &AccountId, asset: AssetId, amount: Balance) -> Result<(), DispatchError>;

  fn balance(who: &AccountId, asset: AssetId) -> Balance;
}

/// Sink for fee cashback.
///
/// Moves `amount` of `asset` out of `source` into a coin-days vesting balance owned by
/// `owner`. When `require_vesting` is false the deposit is immediately withdrawable.
pub trait CashbackVesting<AccountId, AssetId, Balance> {
  fn deposit_cashback(
    source: &AccountId,
    owner: &AccountId,
    asset: AssetId,
    amount: Balance,
    vesting_seconds: u64,
    require_vesting: bool,
  ) -> Result<(), DispatchError>;
}

/// No-op `AssetOps` for use in configurations where asset ops are not needed.
impl<AccountId, AssetId, Balance: Default> AssetOps<AccountId, AssetId, Balance> for () {
  fn transfer(_: &AccountId, _: &AccountId, _: AssetId, _: Balance) -> Result<(), DispatchError> {
    Ok(())
  }

  fn burn(_: &AccountId, _: AssetId, _: Balance) -> Result<(), DispatchError> {
    Ok(())
  }

  fn balance(_: &AccountId, _: AssetId) -> Balance {
    Balance::default()
  }
}

/// Rejects every cashback deposit.
impl<AccountId, AssetId, Balance> CashbackVesting<AccountId, AssetId, Balance> for () {
  fn deposit_cashback(
    _: &AccountId,
    _: &AccountId,
    _: AssetId,
    _: Balance,
    _: u64,
    _: bool,
  ) -> Result<(), DispatchError> {
    Err(DispatchError::Other("CashbackVesting not configured"))
  }
}
