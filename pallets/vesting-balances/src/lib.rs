//! Vesting Balances Pallet
//!
//! Holds value under a vesting policy (instant, linear or coin-days-destroyed) in the pallet's
//! custody account. Owners withdraw whatever the policy has released; anyone may deposit.
//!
//! The pallet is also the sink for fee cashback: `CashbackVesting::deposit_cashback` lazily
//! creates or tops up the owner's coin-days-destroyed cashback balance.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

const LOG_TARGET: &str = "runtime::vesting-balances";

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
  fn fund(
    who: &AccountId,
    asset: primitives::AssetKind,
    amount: primitives::Balance,
  ) -> frame::deps::sp_runtime::DispatchResult;
}

#[frame::pallet]
pub mod pallet {
  use super::{LOG_TARGET, WeightInfo};
  use alloc::vec::Vec;
  use frame::deps::{
    frame_support::{PalletId, traits::Time},
    sp_runtime::traits::AccountIdConversion,
  };
  use frame::prelude::*;
  use primitives::{
    AssetKind, AssetOps, Balance, CashbackVesting, Moment, VestingError, VestingPolicy,
    VestingPolicyInit,
  };

  pub type VestingBalanceId = u64;

  /// Why a vesting balance exists.
  #[derive(
    Clone,
    Copy,
    Debug,
    Decode,
    DecodeWithMemTracking,
    Default,
    Encode,
    Eq,
    PartialEq,
    TypeInfo,
    MaxEncodedLen,
  )]
  pub enum VestingBalanceKind {
    #[default]
    Unspecified,
    /// Receives fee cashback
    Cashback,
  }

  /// Value held for `owner` under `policy`.
  #[derive(Clone, Debug, Decode, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen)]
  pub struct VestingBalance<AccountId> {
    pub owner: AccountId,
    pub asset: AssetKind,
    pub balance: Balance,
    pub policy: VestingPolicy,
    pub kind: VestingBalanceKind,
  }

  impl<AccountId> VestingBalance<AccountId> {
    pub fn available(&self, now: Moment) -> Balance {
      self.policy.available(self.balance, now)
    }

    /// Apply a deposit to balance and policy. Nothing changes on error.
    pub fn deposit(&mut self, amount: Balance, vested: bool, now: Moment) -> Result<(), VestingError> {
      let new_balance = self
        .balance
        .checked_add(amount)
        .ok_or(VestingError::Overflow)?;
      let mut policy = self.policy;
      if vested {
        policy.on_deposit_vested(self.balance, amount, now)?;
      } else {
        policy.on_deposit(self.balance, amount, now)?;
      }
      self.policy = policy;
      self.balance = new_balance;
      Ok(())
    }

    /// Apply a withdrawal to balance and policy. Nothing changes on error.
    pub fn withdraw(&mut self, amount: Balance, now: Moment) -> Result<(), VestingError> {
      let mut policy = self.policy;
      policy.on_withdraw(self.balance, amount, now)?;
      self.balance = self
        .balance
        .checked_sub(amount)
        .ok_or(VestingError::InsufficientVested)?;
      self.policy = policy;
      Ok(())
    }
  }

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Liquid balances of native and pallet-assets tokens
    type Assets: AssetOps<Self::AccountId, AssetKind, Balance>;

    /// Timestamp of the current block in milliseconds
    type TimestampProvider: Time<Moment = u64>;

    /// The pallet ID deriving the custody account
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(PhantomData<T>);

  #[pallet::storage]
  #[pallet::getter(fn next_vesting_balance_id)]
  pub type NextVestingBalanceId<T: Config> = StorageValue<_, VestingBalanceId, ValueQuery>;

  #[pallet::storage]
  #[pallet::getter(fn vesting_balances)]
  pub type VestingBalances<T: Config> =
    StorageMap<_, Twox64Concat, VestingBalanceId, VestingBalance<T::AccountId>, OptionQuery>;

  /// Owner index
  #[pallet::storage]
  pub type BalancesByOwner<T: Config> = StorageDoubleMap<
    _,
    Blake2_128Concat,
    T::AccountId,
    Twox64Concat,
    VestingBalanceId,
    (),
    OptionQuery,
  >;

  /// The balance fee cashback is deposited into, per account
  #[pallet::storage]
  #[pallet::getter(fn cashback_balance)]
  pub type CashbackBalances<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, VestingBalanceId, OptionQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// A vesting balance was created
    Created {
      id: VestingBalanceId,
      owner: T::AccountId,
      asset: AssetKind,
      amount: Balance,
      kind: VestingBalanceKind,
    },
    /// Value was added to a vesting balance
    Deposited {
      id: VestingBalanceId,
      from: T::AccountId,
      amount: Balance,
      vested: bool,
    },
    /// Vested value was withdrawn by the owner
    Withdrawn {
      id: VestingBalanceId,
      owner: T::AccountId,
      amount: Balance,
    },
    /// Fee cashback reached an owner's cashback balance
    CashbackDeposited {
      id: VestingBalanceId,
      owner: T::AccountId,
      amount: Balance,
      vested: bool,
    },
    /// An empty vesting balance was removed
    Removed {
      id: VestingBalanceId,
      owner: T::AccountId,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// No vesting balance with this id
    VestingBalanceNotFound,
    /// Caller does not own the vesting balance
    NotOwner,
    /// Asset differs from the vesting balance's asset
    AssetMismatch,
    /// Amount exceeds what the policy has released
    InsufficientVested,
    /// Zero amount or inconsistent policy parameters
    InvalidParameters,
    /// Insufficient liquid balance for operation
    InsufficientBalance,
    /// Arithmetic overflow occurred
    ArithmeticOverflow,
    /// Only empty balances can be removed
    BalanceNotEmpty,
  }

  impl<T> From<VestingError> for Error<T> {
    fn from(error: VestingError) -> Self {
      match error {
        VestingError::InsufficientVested => Error::<T>::InsufficientVested,
        VestingError::InvalidParameters => Error::<T>::InvalidParameters,
        VestingError::Overflow => Error::<T>::ArithmeticOverflow,
      }
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Lock `amount` of the caller's `asset` in a new vesting balance owned by `owner`.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::create())]
    pub fn create(
      origin: OriginFor<T>,
      owner: T::AccountId,
      asset: AssetKind,
      amount: Balance,
      policy: VestingPolicyInit,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_create(&who, owner, asset, amount, policy).map(|_| ())
    }

    /// Add `amount` of `asset` from the caller to vesting balance `id`.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::deposit())]
    pub fn deposit(
      origin: OriginFor<T>,
      id: VestingBalanceId,
      asset: AssetKind,
      amount: Balance,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(amount > 0, Error::<T>::InvalidParameters);
      Self::do_deposit(&who, id, asset, amount, false)
    }

    /// Withdraw released value from vesting balance `id` to its owner.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::withdraw())]
    pub fn withdraw(
      origin: OriginFor<T>,
      id: VestingBalanceId,
      asset: AssetKind,
      amount: Balance,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_withdraw(&who, id, asset, amount)
    }

    /// Remove an empty vesting balance owned by the caller.
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::remove())]
    pub fn remove(origin: OriginFor<T>, id: VestingBalanceId) -> DispatchResult {
      let who = ensure_signed(origin)?;
      let vesting = VestingBalances::<T>::get(id).ok_or(Error::<T>::VestingBalanceNotFound)?;
      ensure!(vesting.owner == who, Error::<T>::NotOwner);
      ensure!(vesting.balance == 0, Error::<T>::BalanceNotEmpty);
      VestingBalances::<T>::remove(id);
      BalancesByOwner::<T>::remove(&who, id);
      if CashbackBalances::<T>::get(&who) == Some(id) {
        CashbackBalances::<T>::remove(&who);
      }
      Self::deposit_event(Event::Removed { id, owner: who });
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

    /// Create a vesting balance funded by `funder`. Returns the new id.
    pub fn do_create(
      funder: &T::AccountId,
      owner: T::AccountId,
      asset: AssetKind,
      amount: Balance,
      init: VestingPolicyInit,
    ) -> Result<VestingBalanceId, DispatchError> {
      ensure!(amount > 0, Error::<T>::InvalidParameters);
      let policy = init
        .into_policy(amount, Self::now())
        .map_err(Error::<T>::from)?;
      Self::insert_funded(
        funder,
        VestingBalance {
          owner,
          asset,
          balance: amount,
          policy,
          kind: VestingBalanceKind::Unspecified,
        },
      )
    }

    /// Move `amount` from `from` into vesting balance `id`.
    ///
    /// A `vested` deposit counts as released for coin-days-destroyed policies.
    pub fn do_deposit(
      from: &T::AccountId,
      id: VestingBalanceId,
      asset: AssetKind,
      amount: Balance,
      vested: bool,
    ) -> DispatchResult {
      let mut vesting = VestingBalances::<T>::get(id).ok_or(Error::<T>::VestingBalanceNotFound)?;
      ensure!(vesting.asset == asset, Error::<T>::AssetMismatch);
      vesting
        .deposit(amount, vested, Self::now())
        .map_err(Error::<T>::from)?;
      ensure!(
        T::Assets::balance(from, asset) >= amount,
        Error::<T>::InsufficientBalance
      );
      T::Assets::transfer(from, &Self::account_id(), asset, amount)?;
      VestingBalances::<T>::insert(id, vesting);
      Self::deposit_event(Event::Deposited {
        id,
        from: from.clone(),
        amount,
        vested,
      });
      Ok(())
    }

    /// Pay `amount` of released value from vesting balance `id` to `who`, its owner.
    pub fn do_withdraw(
      who: &T::AccountId,
      id: VestingBalanceId,
      asset: AssetKind,
      amount: Balance,
    ) -> DispatchResult {
      let mut vesting = VestingBalances::<T>::get(id).ok_or(Error::<T>::VestingBalanceNotFound)?;
      ensure!(&vesting.owner == who, Error::<T>::NotOwner);
      ensure!(vesting.asset == asset, Error::<T>::AssetMismatch);
      ensure!(amount > 0, Error::<T>::InvalidParameters);
      vesting
        .withdraw(amount, Self::now())
        .map_err(Error::<T>::from)?;
      T::Assets::transfer(&Self::account_id(), who, asset, amount)?;
      VestingBalances::<T>::insert(id, vesting);
      Self::deposit_event(Event::Withdrawn {
        id,
        owner: who.clone(),
        amount,
      });
      Ok(())
    }

    /// Amount of vesting balance `id` withdrawable now.
    pub fn available(id: VestingBalanceId) -> Option<Balance> {
      Self::available_at(id, Self::now())
    }

    /// Amount of vesting balance `id` withdrawable at `now`. Does not mutate state.
    pub fn available_at(id: VestingBalanceId, now: Moment) -> Option<Balance> {
      VestingBalances::<T>::get(id).map(|vesting| vesting.available(now))
    }

    pub fn balances_of(owner: &T::AccountId) -> Vec<VestingBalanceId> {
      BalancesByOwner::<T>::iter_key_prefix(owner).collect()
    }

    /// Transfer the initial balance from `funder` into custody and store the record.
    fn insert_funded(
      funder: &T::AccountId,
      vesting: VestingBalance<T::AccountId>,
    ) -> Result<VestingBalanceId, DispatchError> {
      ensure!(
        T::Assets::balance(funder, vesting.asset) >= vesting.balance,
        Error::<T>::InsufficientBalance
      );
      let id = NextVestingBalanceId::<T>::get();
      let next_id = id.checked_add(1).ok_or(Error::<T>::ArithmeticOverflow)?;
      T::Assets::transfer(funder, &Self::account_id(), vesting.asset, vesting.balance)?;
      NextVestingBalanceId::<T>::put(next_id);
      BalancesByOwner::<T>::insert(&vesting.owner, id, ());
      Self::deposit_event(Event::Created {
        id,
        owner: vesting.owner.clone(),
        asset: vesting.asset,
        amount: vesting.balance,
        kind: vesting.kind,
      });
      VestingBalances::<T>::insert(id, vesting);
      Ok(id)
    }

    /// Existing cashback balance of `owner` that can take `asset` under `vesting_seconds`.
    fn reusable_cashback(
      owner: &T::AccountId,
      asset: AssetKind,
      vesting_seconds: u64,
    ) -> Option<VestingBalanceId> {
      let id = CashbackBalances::<T>::get(owner)?;
      let vesting = VestingBalances::<T>::get(id)?;
      (vesting.asset == asset && vesting.policy.is_coin_days_destroyed_with(vesting_seconds))
        .then_some(id)
    }
  }

  impl<T: Config> CashbackVesting<T::AccountId, AssetKind, Balance> for Pallet<T> {
    fn deposit_cashback(
      source: &T::AccountId,
      owner: &T::AccountId,
      asset: AssetKind,
      amount: Balance,
      vesting_seconds: u64,
      require_vesting: bool,
    ) -> Result<(), DispatchError> {
      if amount == 0 {
        return Ok(());
      }
      let vested = !require_vesting;
      let id = match Self::reusable_cashback(owner, asset, vesting_seconds) {
        Some(id) => {
          Self::do_deposit(source, id, asset, amount, vested)?;
          id
        }
        None => {
          let now = Self::now();
          let mut policy = VestingPolicyInit::CoinDaysDestroyed {
            start_claim: now,
            vesting_seconds,
          }
          .into_policy(0, now)
          .map_err(Error::<T>::from)?;
          if vested {
            policy
              .on_deposit_vested(0, amount, now)
              .map_err(Error::<T>::from)?;
          }
          let id = Self::insert_funded(
            source,
            VestingBalance {
              owner: owner.clone(),
              asset,
              balance: amount,
              policy,
              kind: VestingBalanceKind::Cashback,
            },
          )?;
          log::debug!(
            target: LOG_TARGET,
            "created cashback balance {:?} for {:?}",
            id,
            owner
          );
          CashbackBalances::<T>::insert(owner, id);
          id
        }
      };
      Self::deposit_event(Event::CashbackDeposited {
        id,
        owner: owner.clone(),
        amount,
        vested,
      });
      Ok(())
    }
  }

  /// Genesis configuration: the custody account gets a provider reference
  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    #[serde(skip)]
    pub _marker: core::marker::PhantomData<T>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      frame_system::Pallet::<T>::inc_providers(&Pallet::<T>::account_id());
    }
  }
}
