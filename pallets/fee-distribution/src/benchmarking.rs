extern crate alloc;

use crate::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_support::traits::Get;
use polkadot_sdk::frame_system::RawOrigin;
use primitives::{FeeParameters, ecosystem::params::PRECISION};

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn set_fee_parameters() {
    let mut new_parameters = FeeParameters::default();
    new_parameters.maintenance_interval_seconds = 3_600;

    #[extrinsic_call]
    set_fee_parameters(RawOrigin::Root, new_parameters);

    assert_eq!(FeeParams::<T>::get(), new_parameters);
  }

  #[benchmark]
  fn force_maintenance() {
    #[extrinsic_call]
    force_maintenance(RawOrigin::Root);

    assert!(PayoutsDue::<T>::get());
  }

  #[benchmark]
  fn pay_fee() {
    let payer: T::AccountId = whitelisted_caller();
    T::BenchmarkHelper::fund(&payer, T::FeeAsset::get(), 1_000 * PRECISION)
      .expect("Failed to fund payer");

    #[block]
    {
      Pallet::<T>::pay_fee(&payer, 10 * PRECISION).expect("Failed to pay fee");
    }

    assert!(PendingFees::<T>::get(&payer).is_some());
  }

  #[benchmark]
  fn payout_accounts(n: Linear<1, { T::MaxPayoutsPerBlock::get() }>) {
    for i in 0..n {
      let payer: T::AccountId = account("payer", i, 0);
      T::BenchmarkHelper::fund(&payer, T::FeeAsset::get(), 1_000 * PRECISION)
        .expect("Failed to fund payer");
      T::BenchmarkHelper::register_referred(&payer);
      Pallet::<T>::pay_fee(&payer, 10 * PRECISION).expect("Failed to pay fee");
      // Both staging buckets are paid out
      Pallet::<T>::pay_fee(&payer, 500 * PRECISION).expect("Failed to pay fee");
    }
    PayoutsDue::<T>::put(true);

    #[block]
    {
      Pallet::<T>::process_payouts(n);
    }

    assert_eq!(PendingFees::<T>::iter().count(), 0);
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
