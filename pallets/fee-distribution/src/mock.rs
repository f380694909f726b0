extern crate alloc;

use crate as pallet_fee_distribution;
use crate::{ReferralInfo, ReferralProvider};
use polkadot_sdk::frame_support::traits::{
  fungible::{Inspect as NativeInspect, Mutate as NativeMutate},
  fungibles::{Inspect as FungiblesInspect, Mutate as FungiblesMutate},
  tokens::{Fortitude, Precision, Preservation},
};
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  traits::{ConstU32, ConstU64, ConstU128, Get},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError, Permill,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::{
  AssetKind, AssetOps, Balance, FeeParameters, Moment,
  ecosystem::{
    pallet_ids,
    params::{MAX_REFERRAL_DEPTH, PRECISION},
  },
};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

/// Lifetime member
pub const ALICE: u64 = 1;
/// Referrer of DAVE, referred by ALICE
pub const BOB: u64 = 2;
/// Registrar of DAVE
pub const CHARLIE: u64 = 3;
/// Ordinary member
pub const DAVE: u64 = 4;
/// Registered account whose referral chain has no lifetime member
pub const EVE: u64 = 5;

pub const INITIAL_BALANCE: Balance = 1_000_000 * PRECISION;
pub const CASHBACK_VESTING_SECONDS: u64 = 1_000;
pub const MAINTENANCE_INTERVAL: u64 = 86_400;
pub const GENESIS_MAINTENANCE_TIME: Moment = 10_000;

// Referral registry
thread_local! {
    pub static REFERRALS: RefCell<BTreeMap<u64, ReferralInfo<u64>>> = const { RefCell::new(BTreeMap::new()) };
    pub static LIFETIME_MEMBERS: RefCell<BTreeSet<u64>> = const { RefCell::new(BTreeSet::new()) };
}

pub fn set_referral(who: u64, registrar: u64, referrer: u64, referrer_percent: Permill) {
  REFERRALS.with(|r| {
    r.borrow_mut().insert(
      who,
      ReferralInfo {
        registrar,
        referrer,
        referrer_percent,
      },
    )
  });
}

pub fn set_lifetime_member(who: u64) {
  LIFETIME_MEMBERS.with(|m| m.borrow_mut().insert(who));
}

pub struct MockReferrals;
impl ReferralProvider<u64> for MockReferrals {
  fn referral_info(who: &u64) -> Option<ReferralInfo<u64>> {
    REFERRALS.with(|r| r.borrow().get(who).cloned())
  }

  fn is_lifetime_member(who: &u64) -> bool {
    LIFETIME_MEMBERS.with(|m| m.borrow().contains(who))
  }
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    Timestamp: polkadot_sdk::pallet_timestamp,
    VestingBalances: pallet_vesting_balances,
    FeeDistribution: pallet_fee_distribution,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = u128;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = frame_system::EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type ReserveData = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = AssetBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct AssetBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl polkadot_sdk::pallet_assets::BenchmarkHelper<u32, ()> for AssetBenchmarkHelper {
  fn create_asset_id_parameter(id: u32) -> u32 {
    id
  }
  fn create_reserve_id_parameter(_id: u32) -> () {
    ()
  }
}

impl polkadot_sdk::pallet_timestamp::Config for Test {
  type Moment = u64;
  type OnTimestampSet = ();
  type MinimumPeriod = ConstU64<1>;
  type WeightInfo = ();
}

/// Routes native amounts to pallet-balances and local/foreign amounts to pallet-assets.
pub struct MockAssetOps;

impl AssetOps<u64, AssetKind, Balance> for MockAssetOps {
  fn transfer(from: &u64, to: &u64, asset: AssetKind, amount: Balance) -> Result<(), DispatchError> {
    match asset {
      AssetKind::Native => {
        <Balances as NativeMutate<u64>>::transfer(from, to, amount, Preservation::Expendable)?;
      }
      AssetKind::Local(id) | AssetKind::Foreign(id) => {
        <Assets as FungiblesMutate<u64>>::transfer(id, from, to, amount, Preservation::Expendable)?;
      }
    }
    Ok(())
  }

  fn burn(who: &u64, asset: AssetKind, amount: Balance) -> Result<(), DispatchError> {
    match asset {
      AssetKind::Native => {
        <Balances as NativeMutate<u64>>::burn_from(
          who,
          amount,
          Preservation::Expendable,
          Precision::Exact,
          Fortitude::Polite,
        )?;
      }
      AssetKind::Local(id) | AssetKind::Foreign(id) => {
        <Assets as FungiblesMutate<u64>>::burn_from(
          id,
          who,
          amount,
          Preservation::Expendable,
          Precision::Exact,
          Fortitude::Polite,
        )?;
      }
    }
    Ok(())
  }

  fn balance(who: &u64, asset: AssetKind) -> Balance {
    match asset {
      AssetKind::Native => <Balances as NativeInspect<u64>>::balance(who),
      AssetKind::Local(id) | AssetKind::Foreign(id) => {
        <Assets as FungiblesInspect<u64>>::balance(id, who)
      }
    }
  }
}

pub struct VestingPalletId;
impl Get<PalletId> for VestingPalletId {
  fn get() -> PalletId {
    PalletId(*pallet_ids::VESTING_BALANCES_PALLET_ID)
  }
}

impl pallet_vesting_balances::Config for Test {
  type Assets = MockAssetOps;
  type TimestampProvider = Timestamp;
  type PalletId = VestingPalletId;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = MockBenchmarkHelper;
}

pub struct FeePalletId;
impl Get<PalletId> for FeePalletId {
  fn get() -> PalletId {
    PalletId(*pallet_ids::FEE_DISTRIBUTION_PALLET_ID)
  }
}

pub struct FeeAssetStub;
impl Get<AssetKind> for FeeAssetStub {
  fn get() -> AssetKind {
    AssetKind::Native
  }
}

pub struct MockFeeParameters;
impl Get<FeeParameters> for MockFeeParameters {
  fn get() -> FeeParameters {
    FeeParameters {
      cashback_vesting_seconds: CASHBACK_VESTING_SECONDS,
      maintenance_interval_seconds: MAINTENANCE_INTERVAL,
      ..FeeParameters::default()
    }
  }
}

impl pallet_fee_distribution::Config for Test {
  type Assets = MockAssetOps;
  type Cashback = VestingBalances;
  type Referrals = MockReferrals;
  type TimestampProvider = Timestamp;
  type PalletId = FeePalletId;
  type FeeAsset = FeeAssetStub;
  type MaxReferralDepth = ConstU32<{ MAX_REFERRAL_DEPTH }>;
  type MaxPayoutsPerBlock = ConstU32<2>;
  type DefaultFeeParameters = MockFeeParameters;
  type AdminOrigin = frame_system::EnsureRoot<u64>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = MockBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct MockBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl pallet_vesting_balances::BenchmarkHelper<u64> for MockBenchmarkHelper {
  fn fund(who: &u64, asset: AssetKind, amount: Balance) -> polkadot_sdk::sp_runtime::DispatchResult {
    match asset {
      AssetKind::Native => {
        <Balances as NativeMutate<u64>>::mint_into(who, amount)?;
      }
      AssetKind::Local(id) | AssetKind::Foreign(id) => {
        <Assets as FungiblesMutate<u64>>::mint_into(id, who, amount)?;
      }
    }
    Ok(())
  }
}

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<u64> for MockBenchmarkHelper {
  fn fund(who: &u64, asset: AssetKind, amount: Balance) -> polkadot_sdk::sp_runtime::DispatchResult {
    <Self as pallet_vesting_balances::BenchmarkHelper<u64>>::fund(who, asset, amount)
  }

  fn register_referred(who: &u64) {
    set_referral(*who, ALICE, ALICE, Permill::from_percent(50));
  }
}

/// Set block time in seconds.
pub fn set_now(seconds: Moment) {
  Timestamp::set_timestamp(seconds * 1000);
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_balances::GenesisConfig::<Test> {
    balances: alloc::vec![
      (ALICE, INITIAL_BALANCE),
      (BOB, INITIAL_BALANCE),
      (CHARLIE, INITIAL_BALANCE),
      (DAVE, INITIAL_BALANCE),
      (EVE, INITIAL_BALANCE),
    ],
    ..Default::default()
  }
  .assimilate_storage(&mut t)
  .unwrap();

  // Custody and fee accounts get a provider reference (ED-free)
  pallet_vesting_balances::GenesisConfig::<Test>::default()
    .assimilate_storage(&mut t)
    .unwrap();
  pallet_fee_distribution::GenesisConfig::<Test> {
    next_maintenance_time: GENESIS_MAINTENANCE_TIME,
    ..Default::default()
  }
  .assimilate_storage(&mut t)
  .unwrap();

  // Reset State
  REFERRALS.with(|r| r.borrow_mut().clear());
  LIFETIME_MEMBERS.with(|m| m.borrow_mut().clear());
  set_lifetime_member(ALICE);
  set_referral(ALICE, ALICE, ALICE, Permill::zero());
  set_referral(BOB, ALICE, ALICE, Permill::from_percent(50));
  set_referral(CHARLIE, ALICE, ALICE, Permill::from_percent(50));
  set_referral(DAVE, CHARLIE, BOB, Permill::from_percent(80));
  set_referral(EVE, EVE, EVE, Permill::from_percent(50));

  let mut ext: polkadot_sdk::sp_io::TestExternalities = t.into();
  ext.execute_with(|| {
    System::set_block_number(1);
    set_now(1_000);
  });
  ext
}
