extern crate alloc;

use crate::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_support::traits::Get;
use polkadot_sdk::frame_system::RawOrigin;
use primitives::{AssetKind, ecosystem::params::PRECISION};

const PERIOD: u64 = 3_600;

fn setup_permission<T: Config>(giver: &T::AccountId, recipient: &T::AccountId) -> PermissionId {
  let id = NextPermissionId::<T>::get();
  Pallet::<T>::create(
    RawOrigin::Signed(giver.clone()).into(),
    recipient.clone(),
    AssetKind::Native,
    10 * PRECISION,
    PERIOD,
    5,
    Pallet::<T>::now(),
  )
  .expect("Failed to create permission");
  id
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn create() {
    let caller: T::AccountId = whitelisted_caller();
    let recipient: T::AccountId = account("recipient", 0, 0);
    T::BenchmarkHelper::set_now(1_000);

    #[extrinsic_call]
    create(
      RawOrigin::Signed(caller),
      recipient,
      AssetKind::Native,
      10 * PRECISION,
      PERIOD,
      5,
      1_000,
    );

    assert!(Permissions::<T>::get(0).is_some());
  }

  #[benchmark]
  fn update() {
    let caller: T::AccountId = whitelisted_caller();
    let recipient: T::AccountId = account("recipient", 0, 0);
    T::BenchmarkHelper::set_now(1_000);
    let id = setup_permission::<T>(&caller, &recipient);

    #[extrinsic_call]
    update(
      RawOrigin::Signed(caller),
      id,
      recipient,
      AssetKind::Native,
      20 * PRECISION,
      PERIOD,
      10,
      1_000,
    );
  }

  #[benchmark]
  fn claim() {
    let caller: T::AccountId = whitelisted_caller();
    let giver: T::AccountId = account("giver", 0, 0);
    T::BenchmarkHelper::set_now(1_000);
    T::BenchmarkHelper::fund(&giver, AssetKind::Native, 1_000 * PRECISION)
      .expect("Failed to fund giver");
    let id = setup_permission::<T>(&giver, &caller);

    #[extrinsic_call]
    claim(
      RawOrigin::Signed(caller),
      id,
      giver,
      AssetKind::Native,
      5 * PRECISION,
    );
  }

  #[benchmark]
  fn delete() {
    let caller: T::AccountId = whitelisted_caller();
    let recipient: T::AccountId = account("recipient", 0, 0);
    T::BenchmarkHelper::set_now(1_000);
    let id = setup_permission::<T>(&caller, &recipient);

    #[extrinsic_call]
    delete(RawOrigin::Signed(caller), id);

    assert!(Permissions::<T>::get(id).is_none());
  }

  #[benchmark]
  fn expire_permissions(n: Linear<1, { T::MaxExpiredPerBlock::get() }>) {
    T::BenchmarkHelper::set_now(1_000);
    let recipient: T::AccountId = account("recipient", 0, 0);
    for i in 0..n {
      let giver: T::AccountId = account("giver", i, 0);
      setup_permission::<T>(&giver, &recipient);
    }
    let after_expiration = 1_000 + 5 * PERIOD;

    #[block]
    {
      Pallet::<T>::expire_due(after_expiration, n);
    }

    assert!(Pallet::<T>::expiring_permissions().is_empty());
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
