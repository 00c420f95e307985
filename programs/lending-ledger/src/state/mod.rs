pub mod balance_sheet;
pub mod borrow_dynamics;
pub mod flash_loan;
pub mod interest_model;
pub mod limiter;
pub mod market;
pub mod reserve;
pub mod risk_model;
pub mod timelock;

pub use balance_sheet::*;
pub use borrow_dynamics::*;
pub use flash_loan::*;
pub use interest_model::*;
pub use limiter::*;
pub use market::*;
pub use reserve::*;
pub use risk_model::*;
pub use timelock::*;
