//! Fee Distribution Pallet
//!
//! Fees are paid into the pallet account and staged per payer. At every maintenance interval the
//! staged fees are pushed through the referral cascade: the network cut is burned and the rest is
//! paid out as cashback to the lifetime referrer, the referrer and the registrar of the payer.
//!
//! Fees above the cashback vesting threshold are paid out as unvested cashback, smaller fees as
//! vested cashback. Payouts run in `on_idle` and are spread over blocks, bounded per block by
//! `MaxPayoutsPerBlock` and the remaining weight.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod types;
pub use types::{FeeStatistics, ReferralInfo, ReferralProvider};

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

const LOG_TARGET: &str = "runtime::fee-distribution";

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
  fn fund(
    who: &AccountId,
    asset: primitives::AssetKind,
    amount: primitives::Balance,
  ) -> frame::deps::sp_runtime::DispatchResult;
  /// Register `who` with a lifetime member as referrer and registrar
  fn register_referred(who: &AccountId);
}

#[frame::pallet]
pub mod pallet {
  use super::{FeeStatistics, LOG_TARGET, ReferralProvider, WeightInfo};
  use alloc::vec::Vec;
  use frame::deps::{
    frame_support::{
      PalletId,
      storage::with_storage_layer,
      traits::{EnsureOrigin, Time},
    },
    sp_runtime::{Permill, traits::AccountIdConversion},
  };
  use frame::prelude::*;
  use primitives::{
    AssetKind, AssetOps, Balance, CashbackVesting, FeeParameters, FeeSplit, Moment, split_fee,
  };

  /// Raw storage key of the last account paid out in the running sweep
  pub type PayoutCursorOf = BoundedVec<u8, ConstU32<256>>;

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Liquid balances of native and pallet-assets tokens
    type Assets: AssetOps<Self::AccountId, AssetKind, Balance>;

    /// Vesting balances receiving cashback
    type Cashback: CashbackVesting<Self::AccountId, AssetKind, Balance>;

    /// Referral data and membership status of accounts
    type Referrals: ReferralProvider<Self::AccountId>;

    /// Timestamp of the current block in milliseconds
    type TimestampProvider: Time<Moment = u64>;

    /// The pallet ID deriving the account holding staged fees
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Asset fees are paid in
    #[pallet::constant]
    type FeeAsset: Get<AssetKind>;

    /// Maximum referrer links followed when resolving a lifetime referrer
    #[pallet::constant]
    type MaxReferralDepth: Get<u32>;

    /// Maximum accounts paid out per block
    #[pallet::constant]
    type MaxPayoutsPerBlock: Get<u32>;

    /// Fee parameters used until governance sets others
    #[pallet::constant]
    type DefaultFeeParameters: Get<FeeParameters>;

    /// Origin that can perform governance operations
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(PhantomData<T>);

  /// Current fee parameters (can be updated by governance)
  #[pallet::storage]
  #[pallet::getter(fn fee_parameters)]
  pub type FeeParams<T: Config> =
    StorageValue<_, FeeParameters, ValueQuery, T::DefaultFeeParameters>;

  /// Fees staged per payer until the next payout
  #[pallet::storage]
  #[pallet::getter(fn pending_fees)]
  pub type PendingFees<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, FeeStatistics, OptionQuery>;

  #[pallet::storage]
  #[pallet::getter(fn lifetime_fees_paid)]
  pub type LifetimeFeesPaid<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, Balance, ValueQuery>;

  /// Storage for tracking total burned network cuts
  #[pallet::storage]
  #[pallet::getter(fn total_burned)]
  pub type TotalBurned<T: Config> = StorageValue<_, Balance, ValueQuery>;

  #[pallet::storage]
  #[pallet::getter(fn next_maintenance_time)]
  pub type NextMaintenanceTime<T: Config> = StorageValue<_, Moment, ValueQuery>;

  /// Whether a payout sweep is in progress
  #[pallet::storage]
  #[pallet::getter(fn payouts_due)]
  pub type PayoutsDue<T: Config> = StorageValue<_, bool, ValueQuery>;

  #[pallet::storage]
  pub type PayoutCursor<T: Config> = StorageValue<_, PayoutCursorOf, OptionQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// A fee was collected and staged
    FeePaid {
      payer: T::AccountId,
      amount: Balance,
      requires_vesting: bool,
    },
    /// A fee went through the cascade
    FeeDistributed {
      payer: T::AccountId,
      fee: Balance,
      network_cut: Balance,
      lifetime_cut: Balance,
      referrer_cut: Balance,
      registrar_cut: Balance,
    },
    /// A maintenance interval elapsed and payouts started
    MaintenanceStarted {
      now: Moment,
      next_maintenance_time: Moment,
    },
    /// All staged fees were visited
    PayoutsCompleted,
    /// Payout failed; the staged fees are kept for the next maintenance
    PayoutDeferred {
      account: T::AccountId,
      error: DispatchError,
    },
    /// Fee parameters updated
    FeeParametersUpdated {
      old_parameters: FeeParameters,
      new_parameters: FeeParameters,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Insufficient balance for operation
    InsufficientBalance,
    /// Account has no referral data
    UnknownAccount,
    /// No lifetime member within the referral depth
    LifetimeReferrerNotFound,
    /// Fee parameters failed validation
    InvalidParameters,
    /// Arithmetic overflow occurred
    ArithmeticOverflow,
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    fn on_idle(_n: BlockNumberFor<T>, remaining_weight: Weight) -> Weight {
      let schedule_weight = T::DbWeight::get().reads_writes(4, 3);
      if !remaining_weight.all_gte(schedule_weight) {
        return Weight::zero();
      }
      Self::maybe_start_maintenance(Self::now());
      let mut consumed = schedule_weight;
      if !PayoutsDue::<T>::get() {
        return consumed;
      }
      let mut limit = 0u32;
      while limit < T::MaxPayoutsPerBlock::get()
        && remaining_weight.all_gte(consumed.saturating_add(T::WeightInfo::payout_accounts(limit + 1)))
      {
        limit += 1;
      }
      if limit > 0 {
        let paid = Self::process_payouts(limit);
        consumed = consumed.saturating_add(T::WeightInfo::payout_accounts(paid));
      }
      consumed
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Update fee parameters (governance only)
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::set_fee_parameters())]
    pub fn set_fee_parameters(origin: OriginFor<T>, new_parameters: FeeParameters) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      ensure!(new_parameters.validate(), Error::<T>::InvalidParameters);
      let old_parameters = FeeParams::<T>::get();
      FeeParams::<T>::put(new_parameters);
      Self::deposit_event(Event::FeeParametersUpdated {
        old_parameters,
        new_parameters,
      });
      Ok(())
    }

    /// Start a payout sweep without waiting for the maintenance interval (governance only)
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::force_maintenance())]
    pub fn force_maintenance(origin: OriginFor<T>) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      PayoutsDue::<T>::put(true);
      PayoutCursor::<T>::kill();
      Self::deposit_event(Event::MaintenanceStarted {
        now: Self::now(),
        next_maintenance_time: NextMaintenanceTime::<T>::get(),
      });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    /// Current block time in seconds
    pub fn now() -> Moment {
      T::TimestampProvider::now() / 1000
    }

    /// Collect `amount` of the fee asset from `payer` and stage it for the next payout.
    pub fn pay_fee(payer: &T::AccountId, amount: Balance) -> DispatchResult {
      if amount == 0 {
        return Ok(());
      }
      let asset = T::FeeAsset::get();
      ensure!(
        T::Assets::balance(payer, asset) >= amount,
        Error::<T>::InsufficientBalance
      );
      let requires_vesting = FeeParams::<T>::get().requires_vesting(amount);
      let mut stats = PendingFees::<T>::get(payer).unwrap_or_default();
      let staged = if requires_vesting {
        &mut stats.pending_fees
      } else {
        &mut stats.pending_vested_fees
      };
      *staged = staged
        .checked_add(amount)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      let lifetime = LifetimeFeesPaid::<T>::get(payer)
        .checked_add(amount)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      T::Assets::transfer(payer, &Self::account_id(), asset, amount)?;
      PendingFees::<T>::insert(payer, stats);
      LifetimeFeesPaid::<T>::insert(payer, lifetime);
      Self::deposit_event(Event::FeePaid {
        payer: payer.clone(),
        amount,
        requires_vesting,
      });
      Ok(())
    }

    /// Push `fee`, already held by the pallet account, through the referral cascade of `payer`.
    ///
    /// Burns the network cut and deposits the remaining shares as cashback. Either every share
    /// is paid or nothing changes.
    pub fn distribute(
      payer: &T::AccountId,
      fee: Balance,
      require_vesting: bool,
    ) -> Result<FeeSplit, DispatchError> {
      with_storage_layer(|| {
        let params = FeeParams::<T>::get();
        let asset = T::FeeAsset::get();
        let pot = Self::account_id();
        let vesting_seconds = params.cashback_vesting_seconds;

        let split = if T::Referrals::is_lifetime_member(payer) {
          let split = split_fee(fee, &params, Permill::zero(), true);
          T::Cashback::deposit_cashback(
            &pot,
            payer,
            asset,
            split.lifetime_cut,
            vesting_seconds,
            require_vesting,
          )?;
          split
        } else {
          let info = T::Referrals::referral_info(payer).ok_or(Error::<T>::UnknownAccount)?;
          let lifetime_referrer = Self::lifetime_referrer_of(payer)?;
          let split = split_fee(fee, &params, info.referrer_percent, false);
          for (owner, amount) in [
            (&lifetime_referrer, split.lifetime_cut),
            (&info.referrer, split.referrer_cut),
            (&info.registrar, split.registrar_cut),
          ] {
            T::Cashback::deposit_cashback(
              &pot,
              owner,
              asset,
              amount,
              vesting_seconds,
              require_vesting,
            )?;
          }
          split
        };

        if split.network_cut > 0 {
          T::Assets::burn(&pot, asset, split.network_cut)?;
          TotalBurned::<T>::mutate(|total| *total = total.saturating_add(split.network_cut));
        }
        Self::deposit_event(Event::FeeDistributed {
          payer: payer.clone(),
          fee,
          network_cut: split.network_cut,
          lifetime_cut: split.lifetime_cut,
          referrer_cut: split.referrer_cut,
          registrar_cut: split.registrar_cut,
        });
        Ok(split)
      })
    }

    /// First lifetime member on the referrer chain starting at `who` (inclusive).
    pub fn lifetime_referrer_of(who: &T::AccountId) -> Result<T::AccountId, DispatchError> {
      let max_depth = T::MaxReferralDepth::get();
      let mut current = who.clone();
      let mut hops = 0u32;
      loop {
        if T::Referrals::is_lifetime_member(&current) {
          return Ok(current);
        }
        if hops >= max_depth {
          break;
        }
        let info = T::Referrals::referral_info(&current).ok_or(Error::<T>::UnknownAccount)?;
        if info.referrer == current {
          break;
        }
        current = info.referrer;
        hops += 1;
      }
      Err(Error::<T>::LifetimeReferrerNotFound.into())
    }

    /// Advance the maintenance schedule if it is due and start a payout sweep.
    pub fn maybe_start_maintenance(now: Moment) {
      let interval = FeeParams::<T>::get().maintenance_interval_seconds.max(1);
      let next = NextMaintenanceTime::<T>::get();
      if next == 0 {
        NextMaintenanceTime::<T>::put(now.saturating_add(interval));
        return;
      }
      if now < next {
        return;
      }
      let skipped = (now - next) / interval;
      let next_maintenance_time =
        next.saturating_add(skipped.saturating_add(1).saturating_mul(interval));
      NextMaintenanceTime::<T>::put(next_maintenance_time);
      PayoutsDue::<T>::put(true);
      PayoutCursor::<T>::kill();
      Self::deposit_event(Event::MaintenanceStarted {
        now,
        next_maintenance_time,
      });
    }

    /// Pay out staged fees of up to `max` accounts, resuming after the stored cursor.
    pub fn process_payouts(max: u32) -> u32 {
      if max == 0 {
        return 0;
      }
      let iter = match PayoutCursor::<T>::get() {
        Some(cursor) => PendingFees::<T>::iter_from(cursor.into_inner()),
        None => PendingFees::<T>::iter(),
      };
      let batch: Vec<(T::AccountId, FeeStatistics)> = iter.take(max as usize).collect();
      let visited = batch.len() as u32;

      for (account, stats) in batch.iter() {
        if let Err(error) = Self::payout(account, *stats) {
          log::warn!(
            target: LOG_TARGET,
            "payout for {:?} deferred: {:?}",
            account,
            error
          );
          Self::deposit_event(Event::PayoutDeferred {
            account: account.clone(),
            error,
          });
        }
      }

      let cursor = batch
        .last()
        .filter(|_| visited >= max)
        .and_then(|(account, _)| {
          PayoutCursorOf::try_from(PendingFees::<T>::hashed_key_for(account)).ok()
        });
      match cursor {
        Some(cursor) => PayoutCursor::<T>::put(cursor),
        None => {
          PayoutCursor::<T>::kill();
          PayoutsDue::<T>::put(false);
          Self::deposit_event(Event::PayoutsCompleted);
        }
      }
      visited
    }

    /// Distribute the staged fees of one account and clear them.
    fn payout(account: &T::AccountId, stats: FeeStatistics) -> DispatchResult {
      with_storage_layer(|| {
        if stats.pending_fees > 0 {
          Self::distribute(account, stats.pending_fees, true)?;
        }
        if stats.pending_vested_fees > 0 {
          Self::distribute(account, stats.pending_vested_fees, false)?;
        }
        PendingFees::<T>::remove(account);
        Ok(())
      })
    }
  }

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    /// First maintenance time; zero schedules it one interval after the first block
    pub next_maintenance_time: Moment,
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      NextMaintenanceTime::<T>::put(self.next_maintenance_time);
      // Pallet account survives zero native balance via provider reference
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
    }
  }
}
