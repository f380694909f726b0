//! Withdraw Permissions Pallet
//!
//! Lets an account pre-authorize another account to pull up to a fixed amount of one asset per
//! recurring period, for a bounded number of periods. Claims move liquid balance directly from
//! the giver to the recipient.
//!
//! Period rollover is lazy (see [`types`]). Permissions past their expiration are swept in
//! `on_idle`, earliest expiration first, as many per block as the remaining weight allows.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod types;
pub use types::{ClaimError, ExpirationKey, PermissionId, WithdrawPermission, WithdrawalPeriod};


#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod weights;
pub use weights::WeightInfo;

const LOG_TARGET: &str = "runtime::withdraw-permissions";

/// Helper for benchmarking
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId> {
  fn fund(
    who: &AccountId,
    asset: primitives::AssetKind,
    amount: primitives::Balance,
  ) -> frame::deps::sp_runtime::DispatchResult;
  fn set_now(seconds: primitives::Moment);
}

#[frame::pallet]
pub mod pallet {
  use super::{
    ClaimError, ExpirationKey, LOG_TARGET, PermissionId, WeightInfo, WithdrawPermission,
    WithdrawalPeriod,
  };
  use alloc::vec::Vec;
  use frame::deps::frame_support::traits::Time;
  use frame::prelude::*;
  use primitives::{AssetKind, AssetOps, Balance, Moment};

  #[pallet::config]
  pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
    /// Liquid balances of native and pallet-assets tokens
    type Assets: AssetOps<Self::AccountId, AssetKind, Balance>;

    /// Timestamp of the current block in milliseconds
    type TimestampProvider: Time<Moment = u64>;

    /// Maximum number of live permissions one account can give
    #[pallet::constant]
    type MaxPermissionsPerGiver: Get<u32>;

    /// Maximum number of expired permissions removed per block
    #[pallet::constant]
    type MaxExpiredPerBlock: Get<u32>;

    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;

    /// Helper for benchmarking
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(PhantomData<T>);

  #[pallet::storage]
  #[pallet::getter(fn next_permission_id)]
  pub type NextPermissionId<T: Config> = StorageValue<_, PermissionId, ValueQuery>;

  #[pallet::storage]
  #[pallet::getter(fn permissions)]
  pub type Permissions<T: Config> =
    StorageMap<_, Twox64Concat, PermissionId, WithdrawPermission<T::AccountId>, OptionQuery>;

  /// Permissions by the account they withdraw from
  #[pallet::storage]
  pub type PermissionsByGiver<T: Config> = StorageDoubleMap<
    _,
    Blake2_128Concat,
    T::AccountId,
    Twox64Concat,
    PermissionId,
    (),
    OptionQuery,
  >;

  /// Permissions by the account authorized to claim
  #[pallet::storage]
  pub type PermissionsByRecipient<T: Config> = StorageDoubleMap<
    _,
    Blake2_128Concat,
    T::AccountId,
    Twox64Concat,
    PermissionId,
    (),
    OptionQuery,
  >;

  /// Live permission count per giver
  #[pallet::storage]
  #[pallet::getter(fn permission_count)]
  pub type PermissionCount<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, u32, ValueQuery>;

  /// Live permissions keyed by expiration; key order is time order
  #[pallet::storage]
  pub type ExpiringAt<T: Config> = StorageDoubleMap<
    _,
    Identity,
    ExpirationKey,
    Twox64Concat,
    PermissionId,
    (),
    OptionQuery,
  >;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    PermissionCreated {
      id: PermissionId,
      withdraw_from_account: T::AccountId,
      authorized_account: T::AccountId,
      asset: AssetKind,
      withdrawal_limit: Balance,
      withdrawal_period_sec: u64,
      period_start_time: Moment,
      expiration: Moment,
    },
    PermissionUpdated {
      id: PermissionId,
      asset: AssetKind,
      withdrawal_limit: Balance,
      withdrawal_period_sec: u64,
      period_start_time: Moment,
      expiration: Moment,
    },
    /// A claim moved funds from giver to recipient
    Claimed {
      id: PermissionId,
      withdraw_from_account: T::AccountId,
      authorized_account: T::AccountId,
      asset: AssetKind,
      amount: Balance,
      claimed_this_period: Balance,
    },
    PermissionDeleted {
      id: PermissionId,
      by: T::AccountId,
    },
    /// Removed at block close after its last period ended
    PermissionExpired { id: PermissionId },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// No permission was ever issued with this id
    PermissionNotFound,
    /// Caller is not a party allowed to perform this operation
    NotAuthorized,
    /// Asset differs from the permission's asset
    AssetMismatch,
    /// Zero or inconsistent limits, periods or schedule
    InvalidParameters,
    /// The first period has not started
    NotYetStarted,
    /// The permission expired or no longer exists
    PermissionExpired,
    /// The claim exceeds this period's remaining allowance
    LimitExceeded,
    /// Giver's liquid balance cannot cover the claim
    InsufficientBalance,
    /// Arithmetic overflow occurred
    ArithmeticOverflow,
    /// Giver already has the maximum number of live permissions
    TooManyPermissions,
  }

  impl<T> From<ClaimError> for Error<T> {
    fn from(error: ClaimError) -> Self {
      match error {
        ClaimError::NotYetStarted => Error::<T>::NotYetStarted,
        ClaimError::PermissionExpired => Error::<T>::PermissionExpired,
        ClaimError::LimitExceeded => Error::<T>::LimitExceeded,
      }
    }
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    fn on_idle(_n: BlockNumberFor<T>, remaining_weight: Weight) -> Weight {
      let mut limit = 0u32;
      while limit < T::MaxExpiredPerBlock::get()
        && remaining_weight.all_gte(T::WeightInfo::expire_permissions(limit + 1))
      {
        limit += 1;
      }
      if limit == 0 {
        return Weight::zero();
      }
      let expired = Self::expire_due(Self::now(), limit);
      T::WeightInfo::expire_permissions(expired)
    }
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Authorize `authorized_account` to claim from the caller.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::create())]
    pub fn create(
      origin: OriginFor<T>,
      authorized_account: T::AccountId,
      asset: AssetKind,
      withdrawal_limit: Balance,
      withdrawal_period_sec: u64,
      periods_until_expiration: u32,
      period_start_time: Moment,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      ensure!(who != authorized_account, Error::<T>::InvalidParameters);
      let expiration = Self::validate_schedule(
        withdrawal_limit,
        withdrawal_period_sec,
        periods_until_expiration,
        period_start_time,
      )?;
      let count = PermissionCount::<T>::get(&who);
      ensure!(
        count < T::MaxPermissionsPerGiver::get(),
        Error::<T>::TooManyPermissions
      );
      let id = NextPermissionId::<T>::get();
      let next_id = id.checked_add(1).ok_or(Error::<T>::ArithmeticOverflow)?;
      NextPermissionId::<T>::put(next_id);
      PermissionCount::<T>::insert(&who, count + 1);
      ExpiringAt::<T>::insert(Self::expiration_key(expiration), id, ());
      PermissionsByGiver::<T>::insert(&who, id, ());
      PermissionsByRecipient::<T>::insert(&authorized_account, id, ());
      Permissions::<T>::insert(
        id,
        WithdrawPermission {
          withdraw_from_account: who.clone(),
          authorized_account: authorized_account.clone(),
          asset,
          withdrawal_limit,
          withdrawal_period_sec,
          period_start_time,
          periods_until_expiration,
          expiration,
          claimed_this_period: 0,
        },
      );
      Self::deposit_event(Event::PermissionCreated {
        id,
        withdraw_from_account: who,
        authorized_account,
        asset,
        withdrawal_limit,
        withdrawal_period_sec,
        period_start_time,
        expiration,
      });
      Ok(())
    }

    /// Replace the limit and schedule of a permission given by the caller.
    ///
    /// Claims already made in the current period still count when the new schedule starts now.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::update())]
    pub fn update(
      origin: OriginFor<T>,
      id: PermissionId,
      authorized_account: T::AccountId,
      asset: AssetKind,
      withdrawal_limit: Balance,
      withdrawal_period_sec: u64,
      periods_until_expiration: u32,
      period_start_time: Moment,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      let mut permission = Permissions::<T>::get(id).ok_or(Error::<T>::PermissionNotFound)?;
      ensure!(permission.withdraw_from_account == who, Error::<T>::NotAuthorized);
      ensure!(
        permission.authorized_account == authorized_account,
        Error::<T>::InvalidParameters
      );
      let now = Self::now();
      ensure!(!permission.is_expired(now), Error::<T>::PermissionExpired);
      let expiration = Self::validate_schedule(
        withdrawal_limit,
        withdrawal_period_sec,
        periods_until_expiration,
        period_start_time,
      )?;
      let carried = if period_start_time == now && asset == permission.asset {
        permission.current_period(now).claimed_this_period
      } else {
        0
      };
      ExpiringAt::<T>::remove(Self::expiration_key(permission.expiration), id);
      ExpiringAt::<T>::insert(Self::expiration_key(expiration), id, ());
      permission.asset = asset;
      permission.withdrawal_limit = withdrawal_limit;
      permission.withdrawal_period_sec = withdrawal_period_sec;
      permission.periods_until_expiration = periods_until_expiration;
      permission.period_start_time = period_start_time;
      permission.expiration = expiration;
      permission.claimed_this_period = carried;
      Permissions::<T>::insert(id, permission);
      Self::deposit_event(Event::PermissionUpdated {
        id,
        asset,
        withdrawal_limit,
        withdrawal_period_sec,
        period_start_time,
        expiration,
      });
      Ok(())
    }

    /// Pull `amount` from `withdraw_from_account` to the caller under permission `id`.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::claim())]
    pub fn claim(
      origin: OriginFor<T>,
      id: PermissionId,
      withdraw_from_account: T::AccountId,
      asset: AssetKind,
      amount: Balance,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      let mut permission = match Permissions::<T>::get(id) {
        Some(permission) => permission,
        None if id < NextPermissionId::<T>::get() => {
          return Err(Error::<T>::PermissionExpired.into());
        }
        None => return Err(Error::<T>::PermissionNotFound.into()),
      };
      ensure!(permission.authorized_account == who, Error::<T>::NotAuthorized);
      ensure!(
        permission.withdraw_from_account == withdraw_from_account,
        Error::<T>::InvalidParameters
      );
      ensure!(permission.asset == asset, Error::<T>::AssetMismatch);
      ensure!(amount > 0, Error::<T>::InvalidParameters);
      permission
        .try_claim(amount, Self::now())
        .map_err(Error::<T>::from)?;
      ensure!(
        T::Assets::balance(&withdraw_from_account, asset) >= amount,
        Error::<T>::InsufficientBalance
      );
      T::Assets::transfer(&withdraw_from_account, &who, asset, amount)?;
      let claimed_this_period = permission.claimed_this_period;
      Permissions::<T>::insert(id, permission);
      Self::deposit_event(Event::Claimed {
        id,
        withdraw_from_account,
        authorized_account: who,
        asset,
        amount,
        claimed_this_period,
      });
      Ok(())
    }

    /// Remove permission `id`. Either party may delete.
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::delete())]
    pub fn delete(origin: OriginFor<T>, id: PermissionId) -> DispatchResult {
      let who = ensure_signed(origin)?;
      let permission = Permissions::<T>::get(id).ok_or(Error::<T>::PermissionNotFound)?;
      ensure!(
        permission.withdraw_from_account == who || permission.authorized_account == who,
        Error::<T>::NotAuthorized
      );
      Self::remove_permission(id, &permission);
      Self::deposit_event(Event::PermissionDeleted { id, by: who });
      Ok(())
    }
  }

  impl<T: Config> Pallet<T> {
    /// Current block time in seconds
    pub fn now() -> Moment {
      T::TimestampProvider::now() / 1000
    }

    /// Remaining allowance of permission `id` in the period containing `now`.
    pub fn available_this_period(id: PermissionId, now: Moment) -> Option<Balance> {
      Permissions::<T>::get(id).map(|permission| permission.available_this_period(now))
    }

    pub fn current_period(id: PermissionId, now: Moment) -> Option<WithdrawalPeriod> {
      Permissions::<T>::get(id).map(|permission| permission.current_period(now))
    }

    pub fn permissions_from(giver: &T::AccountId) -> Vec<PermissionId> {
      PermissionsByGiver::<T>::iter_key_prefix(giver).collect()
    }

    pub fn permissions_to(recipient: &T::AccountId) -> Vec<PermissionId> {
      PermissionsByRecipient::<T>::iter_key_prefix(recipient).collect()
    }

    /// Check a schedule and return its expiration.
    fn validate_schedule(
      withdrawal_limit: Balance,
      withdrawal_period_sec: u64,
      periods_until_expiration: u32,
      period_start_time: Moment,
    ) -> Result<Moment, DispatchError> {
      ensure!(
        withdrawal_limit > 0 && withdrawal_period_sec > 0 && periods_until_expiration > 0,
        Error::<T>::InvalidParameters
      );
      ensure!(
        period_start_time >= Self::now(),
        Error::<T>::InvalidParameters
      );
      let expiration = WithdrawPermission::<T::AccountId>::expiration_for(
        period_start_time,
        withdrawal_period_sec,
        periods_until_expiration,
      )
      .ok_or(Error::<T>::InvalidParameters)?;
      Ok(expiration)
    }

    fn expiration_key(expiration: Moment) -> ExpirationKey {
      expiration.to_be_bytes()
    }

    /// Live permissions as `(expiration, id)`, earliest expiration first.
    pub fn expiring_permissions() -> Vec<(Moment, PermissionId)> {
      ExpiringAt::<T>::iter_keys()
        .map(|(key, id)| (Moment::from_be_bytes(key), id))
        .collect()
    }

    fn remove_permission(id: PermissionId, permission: &WithdrawPermission<T::AccountId>) {
      ExpiringAt::<T>::remove(Self::expiration_key(permission.expiration), id);
      PermissionCount::<T>::mutate_exists(&permission.withdraw_from_account, |count| {
        *count = count.map(|c| c.saturating_sub(1)).filter(|c| *c > 0);
      });
      Permissions::<T>::remove(id);
      PermissionsByGiver::<T>::remove(&permission.withdraw_from_account, id);
      PermissionsByRecipient::<T>::remove(&permission.authorized_account, id);
    }

    /// Remove up to `limit` permissions with `expiration <= now`, earliest first.
    pub fn expire_due(now: Moment, limit: u32) -> u32 {
      let due: Vec<(ExpirationKey, PermissionId)> = ExpiringAt::<T>::iter_keys()
        .take(limit as usize)
        .take_while(|(key, _)| Moment::from_be_bytes(*key) <= now)
        .collect();
      for (key, id) in due.iter() {
        match Permissions::<T>::get(id) {
          Some(permission) => Self::remove_permission(*id, &permission),
          None => ExpiringAt::<T>::remove(key, id),
        }
        Self::deposit_event(Event::PermissionExpired { id: *id });
      }
      if !due.is_empty() {
        log::debug!(target: LOG_TARGET, "expired {} permissions at {}", due.len(), now);
      }
      due.len() as u32
    }
  }
}
