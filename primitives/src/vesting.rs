//! Vesting policies
//!
//! A policy decides how much of a vesting balance may be withdrawn at a given time.
//! Policies do not own the balance; every operation receives the balance as it was before
//! the mutation together with the current time, and the caller applies the balance change
//! once the policy accepted it.

use crate::ecosystem::{Balance, Moment};
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use sp_arithmetic::{Rounding, helpers_128bit::multiply_by_rational_with_rounding};

/// Failures of policy validation and bookkeeping.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VestingError {
  /// The requested amount exceeds what has vested
  InsufficientVested,
  /// Parameters supplied at creation are inconsistent
  InvalidParameters,
  /// Bookkeeping would overflow
  Overflow,
}

/// Policy parameters supplied when a vesting balance is created.
#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub enum VestingPolicyInit {
  /// Everything becomes available at `begin_timestamp + vesting_seconds`.
  Instant {
    begin_timestamp: Moment,
    vesting_seconds: u64,
  },
  /// The initial balance vests linearly between the cliff and the end of the schedule.
  Linear {
    begin_timestamp: Moment,
    vesting_cliff_seconds: u64,
    vesting_duration_seconds: u64,
  },
  /// Value vests with stake-time held; nothing is claimable before `start_claim`.
  CoinDaysDestroyed {
    start_claim: Moment,
    vesting_seconds: u64,
  },
}

impl VestingPolicyInit {
  pub fn validate(&self) -> Result<(), VestingError> {
    match *self {
      Self::Instant {
        begin_timestamp,
        vesting_seconds,
      } => {
        begin_timestamp
          .checked_add(vesting_seconds)
          .ok_or(VestingError::InvalidParameters)?;
      }
      Self::Linear {
        begin_timestamp,
        vesting_cliff_seconds,
        vesting_duration_seconds,
      } => {
        if vesting_duration_seconds == 0 || vesting_cliff_seconds > vesting_duration_seconds {
          return Err(VestingError::InvalidParameters);
        }
        begin_timestamp
          .checked_add(vesting_duration_seconds)
          .ok_or(VestingError::InvalidParameters)?;
      }
      Self::CoinDaysDestroyed {
        vesting_seconds, ..
      } => {
        if vesting_seconds == 0 {
          return Err(VestingError::InvalidParameters);
        }
      }
    }
    Ok(())
  }

  /// Build the stored policy for a balance created with `initial_balance` at `now`.
  pub fn into_policy(
    self,
    initial_balance: Balance,
    now: Moment,
  ) -> Result<VestingPolicy, VestingError> {
    self.validate()?;
    Ok(match self {
      Self::Instant {
        begin_timestamp,
        vesting_seconds,
      } => VestingPolicy::Instant {
        begin_timestamp,
        vesting_seconds,
      },
      Self::Linear {
        begin_timestamp,
        vesting_cliff_seconds,
        vesting_duration_seconds,
      } => VestingPolicy::Linear {
        begin_timestamp,
        vesting_cliff_seconds,
        vesting_duration_seconds,
        begin_balance: initial_balance,
        withdrawn: 0,
      },
      Self::CoinDaysDestroyed {
        start_claim,
        vesting_seconds,
      } => VestingPolicy::CoinDaysDestroyed {
        start_claim,
        vesting_seconds,
        coin_seconds_earned: 0,
        coin_seconds_earned_last_update: now,
      },
    })
  }
}

/// Stored vesting state of one balance.
#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub enum VestingPolicy {
  Instant {
    begin_timestamp: Moment,
    vesting_seconds: u64,
  },
  Linear {
    begin_timestamp: Moment,
    vesting_cliff_seconds: u64,
    vesting_duration_seconds: u64,
    /// Balance the schedule vests; later deposits unlock when the schedule completes
    begin_balance: Balance,
    /// Total withdrawn so far
    withdrawn: Balance,
  },
  CoinDaysDestroyed {
    start_claim: Moment,
    vesting_seconds: u64,
    coin_seconds_earned: u128,
    coin_seconds_earned_last_update: Moment,
  },
}

/// Coin-seconds after accruing `balance` from `last_update` to `now`, capped at full vesting.
fn accrued_coin_seconds(
  coin_seconds_earned: u128,
  last_update: Moment,
  vesting_seconds: u64,
  balance: Balance,
  now: Moment,
) -> u128 {
  let delta_seconds = now.saturating_sub(last_update) as u128;
  let max_coin_seconds = balance.saturating_mul(vesting_seconds.max(1) as u128);
  coin_seconds_earned
    .saturating_add(balance.saturating_mul(delta_seconds))
    .min(max_coin_seconds)
}

impl VestingPolicy {
  /// Amount of `balance` that may be withdrawn at `now`. Never exceeds `balance`.
  pub fn available(&self, balance: Balance, now: Moment) -> Balance {
    match *self {
      Self::Instant {
        begin_timestamp,
        vesting_seconds,
      } => {
        if now < begin_timestamp.saturating_add(vesting_seconds) {
          0
        } else {
          balance
        }
      }
      Self::Linear {
        begin_timestamp,
        vesting_cliff_seconds,
        vesting_duration_seconds,
        begin_balance,
        withdrawn,
      } => {
        if now < begin_timestamp.saturating_add(vesting_cliff_seconds) {
          return 0;
        }
        let elapsed = now.saturating_sub(begin_timestamp);
        if elapsed >= vesting_duration_seconds {
          return balance;
        }
        let vested = multiply_by_rational_with_rounding(
          begin_balance,
          elapsed as u128,
          vesting_duration_seconds as u128,
          Rounding::Down,
        )
        .unwrap_or(0);
        vested.saturating_sub(withdrawn).min(balance)
      }
      Self::CoinDaysDestroyed {
        start_claim,
        vesting_seconds,
        coin_seconds_earned,
        coin_seconds_earned_last_update,
      } => {
        if now < start_claim {
          return 0;
        }
        let earned = accrued_coin_seconds(
          coin_seconds_earned,
          coin_seconds_earned_last_update,
          vesting_seconds,
          balance,
          now,
        );
        (earned / vesting_seconds.max(1) as u128).min(balance)
      }
    }
  }

  /// Account for `amount` added to a balance that held `balance` before the deposit.
  ///
  /// Coin-seconds are brought up to `now` with the old balance and left unchanged, so the
  /// average stake age dilutes and nothing becomes available because of the deposit itself.
  pub fn on_deposit(
    &mut self,
    balance: Balance,
    _amount: Balance,
    now: Moment,
  ) -> Result<(), VestingError> {
    if let Self::CoinDaysDestroyed {
      vesting_seconds,
      coin_seconds_earned,
      coin_seconds_earned_last_update,
      ..
    } = self
    {
      *coin_seconds_earned = accrued_coin_seconds(
        *coin_seconds_earned,
        *coin_seconds_earned_last_update,
        *vesting_seconds,
        balance,
        now,
      );
      *coin_seconds_earned_last_update = now;
    }
    Ok(())
  }

  /// Like `on_deposit`, but the deposited amount counts as fully vested.
  pub fn on_deposit_vested(
    &mut self,
    balance: Balance,
    amount: Balance,
    now: Moment,
  ) -> Result<(), VestingError> {
    self.on_deposit(balance, amount, now)?;
    if let Self::CoinDaysDestroyed {
      vesting_seconds,
      coin_seconds_earned,
      ..
    } = self
    {
      let credit = amount
        .checked_mul(*vesting_seconds as u128)
        .ok_or(VestingError::Overflow)?;
      *coin_seconds_earned = coin_seconds_earned
        .checked_add(credit)
        .ok_or(VestingError::Overflow)?;
    }
    Ok(())
  }

  /// Account for `amount` leaving a balance that held `balance` before the withdrawal.
  pub fn on_withdraw(
    &mut self,
    balance: Balance,
    amount: Balance,
    now: Moment,
  ) -> Result<(), VestingError> {
    if amount > self.available(balance, now) {
      return Err(VestingError::InsufficientVested);
    }
    match self {
      Self::Instant { .. } => {}
      Self::Linear { withdrawn, .. } => {
        *withdrawn = withdrawn.checked_add(amount).ok_or(VestingError::Overflow)?;
      }
      Self::CoinDaysDestroyed {
        vesting_seconds,
        coin_seconds_earned,
        coin_seconds_earned_last_update,
        ..
      } => {
        let earned = accrued_coin_seconds(
          *coin_seconds_earned,
          *coin_seconds_earned_last_update,
          *vesting_seconds,
          balance,
          now,
        );
        let spent = amount
          .checked_mul(*vesting_seconds as u128)
          .ok_or(VestingError::Overflow)?;
        *coin_seconds_earned = earned.checked_sub(spent).ok_or(VestingError::Overflow)?;
        *coin_seconds_earned_last_update = now;
      }
    }
    Ok(())
  }

  pub fn is_coin_days_destroyed_with(&self, seconds: u64) -> bool {
    matches!(self, Self::CoinDaysDestroyed { vesting_seconds, .. } if *vesting_seconds == seconds)
  }
}
