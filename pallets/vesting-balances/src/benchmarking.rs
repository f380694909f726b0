extern crate alloc;

use crate::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_system::RawOrigin;
use primitives::{AssetKind, VestingPolicyInit, ecosystem::params::PRECISION};

fn unlocked() -> VestingPolicyInit {
  VestingPolicyInit::Instant {
    begin_timestamp: 0,
    vesting_seconds: 0,
  }
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn create() {
    let caller: T::AccountId = whitelisted_caller();
    let owner: T::AccountId = account("owner", 0, 0);
    T::BenchmarkHelper::fund(&caller, AssetKind::Native, 1_000 * PRECISION)
      .expect("Failed to fund caller");

    #[extrinsic_call]
    create(
      RawOrigin::Signed(caller),
      owner.clone(),
      AssetKind::Native,
      100 * PRECISION,
      unlocked(),
    );

    assert_eq!(Pallet::<T>::balances_of(&owner).len(), 1);
  }

  #[benchmark]
  fn deposit() {
    let caller: T::AccountId = whitelisted_caller();
    T::BenchmarkHelper::fund(&caller, AssetKind::Native, 1_000 * PRECISION)
      .expect("Failed to fund caller");
    let id = Pallet::<T>::do_create(
      &caller,
      caller.clone(),
      AssetKind::Native,
      100 * PRECISION,
      unlocked(),
    )
    .expect("Failed to create vesting balance");

    #[extrinsic_call]
    deposit(
      RawOrigin::Signed(caller),
      id,
      AssetKind::Native,
      100 * PRECISION,
    );

    assert_eq!(
      VestingBalances::<T>::get(id).map(|v| v.balance),
      Some(200 * PRECISION)
    );
  }

  #[benchmark]
  fn withdraw() {
    let caller: T::AccountId = whitelisted_caller();
    T::BenchmarkHelper::fund(&caller, AssetKind::Native, 1_000 * PRECISION)
      .expect("Failed to fund caller");
    let id = Pallet::<T>::do_create(
      &caller,
      caller.clone(),
      AssetKind::Native,
      100 * PRECISION,
      unlocked(),
    )
    .expect("Failed to create vesting balance");

    #[extrinsic_call]
    withdraw(
      RawOrigin::Signed(caller),
      id,
      AssetKind::Native,
      50 * PRECISION,
    );
  }

  #[benchmark]
  fn remove() {
    let caller: T::AccountId = whitelisted_caller();
    T::BenchmarkHelper::fund(&caller, AssetKind::Native, 1_000 * PRECISION)
      .expect("Failed to fund caller");
    let id = Pallet::<T>::do_create(
      &caller,
      caller.clone(),
      AssetKind::Native,
      100 * PRECISION,
      unlocked(),
    )
    .expect("Failed to create vesting balance");
    Pallet::<T>::do_withdraw(&caller, id, AssetKind::Native, 100 * PRECISION)
      .expect("Failed to empty vesting balance");

    #[extrinsic_call]
    remove(RawOrigin::Signed(caller), id);

    assert!(VestingBalances::<T>::get(id).is_none());
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
