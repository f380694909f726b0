#![cfg_attr(not(feature = "std"), no_std)]

pub mod adapters;
pub mod assets;
pub mod ecosystem;
pub mod fees;
pub mod vesting;

pub use adapters::*;
pub use assets::*;
pub use ecosystem::*;
pub use fees::*;
pub use vesting::*;
