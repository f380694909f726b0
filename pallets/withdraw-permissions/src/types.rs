//! Withdraw permission state machine
//!
//! Periods are never ticked per block. The stored `period_start_time` may lag the wall clock by
//! any number of periods; the current period is derived from `now` on demand and only written
//! back by a successful claim.

use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use primitives::{AssetKind, Balance, Moment};
use scale_info::TypeInfo;

pub type PermissionId = u64;

/// Big-endian expiration time, so that raw storage key order is time order.
pub type ExpirationKey = [u8; 8];

/// Recurring allowance for `authorized_account` to pull from `withdraw_from_account`.
#[derive(Clone, Debug, Decode, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen)]
pub struct WithdrawPermission<AccountId> {
  pub withdraw_from_account: AccountId,
  pub authorized_account: AccountId,
  pub asset: AssetKind,
  /// Maximum claimable per period
  pub withdrawal_limit: Balance,
  pub withdrawal_period_sec: u64,
  /// Start of the last period a claim was made in, or of the first period
  pub period_start_time: Moment,
  pub periods_until_expiration: u32,
  pub expiration: Moment,
  /// Claimed within the period starting at `period_start_time`
  pub claimed_this_period: Balance,
}

/// The withdrawal period containing a given instant.
#[derive(
  Clone, Copy, Debug, Decode, DecodeWithMemTracking, Encode, Eq, MaxEncodedLen, PartialEq, TypeInfo,
)]
pub struct WithdrawalPeriod {
  pub period_start_time: Moment,
  pub period_end_time: Moment,
  pub available_this_period: Balance,
  pub claimed_this_period: Balance,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClaimError {
  NotYetStarted,
  PermissionExpired,
  LimitExceeded,
}

impl<AccountId> WithdrawPermission<AccountId> {
  /// `period_start_time + periods * period`, or `None` on overflow.
  pub fn expiration_for(
    period_start_time: Moment,
    withdrawal_period_sec: u64,
    periods_until_expiration: u32,
  ) -> Option<Moment> {
    withdrawal_period_sec
      .checked_mul(periods_until_expiration as u64)?
      .checked_add(period_start_time)
  }

  /// Whole periods between the stored period start and `now`.
  pub fn elapsed_periods(&self, now: Moment) -> u64 {
    now
      .saturating_sub(self.period_start_time)
      .checked_div(self.withdrawal_period_sec)
      .unwrap_or(0)
  }

  pub fn is_expired(&self, now: Moment) -> bool {
    now >= self.expiration
  }

  /// Describe the period containing `now` without mutating the permission.
  pub fn current_period(&self, now: Moment) -> WithdrawalPeriod {
    let elapsed = self.elapsed_periods(now);
    let period_start_time = self
      .period_start_time
      .saturating_add(elapsed.saturating_mul(self.withdrawal_period_sec));
    let claimed_this_period = if elapsed > 0 {
      0
    } else {
      self.claimed_this_period
    };
    let available_this_period = if now < self.period_start_time || self.is_expired(now) {
      0
    } else {
      self.withdrawal_limit.saturating_sub(claimed_this_period)
    };
    WithdrawalPeriod {
      period_start_time,
      period_end_time: period_start_time.saturating_add(self.withdrawal_period_sec),
      available_this_period,
      claimed_this_period,
    }
  }

  pub fn available_this_period(&self, now: Moment) -> Balance {
    self.current_period(now).available_this_period
  }

  /// Roll the period forward to `now` and record a claim of `amount`.
  ///
  /// Leaves the permission untouched on error.
  pub fn try_claim(&mut self, amount: Balance, now: Moment) -> Result<(), ClaimError> {
    if now < self.period_start_time {
      return Err(ClaimError::NotYetStarted);
    }
    if self.is_expired(now) {
      return Err(ClaimError::PermissionExpired);
    }
    let period = self.current_period(now);
    let claimed = period
      .claimed_this_period
      .checked_add(amount)
      .filter(|claimed| *claimed <= self.withdrawal_limit)
      .ok_or(ClaimError::LimitExceeded)?;
    self.period_start_time = period.period_start_time;
    self.claimed_this_period = claimed;
    Ok(())
  }
}
