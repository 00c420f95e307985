pub mod mint;
pub mod redeem;
pub mod borrow;
pub mod repay;
pub mod liquidate;
pub mod flash_borrow;
pub mod flash_repay;

pub use mint::*;
pub use redeem::*;
pub use borrow::*;
pub use repay::*;
pub use liquidate::*;
pub use flash_borrow::*;
pub use flash_repay::*;
