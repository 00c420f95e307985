pub mod admin;
pub mod user;
pub mod permissionless;

pub use admin::*;
pub use user::*;
pub use permissionless::*;

use anchor_lang::prelude::*;

use crate::errors::LedgerError;

/// Current cluster time in whole seconds
pub fn unix_now() -> Result<u64> {
    let clock = Clock::get()?;
    u64::try_from(clock.unix_timestamp).map_err(|_| LedgerError::TimestampRegressed.into())
}
