pub mod accrue_interest;

pub use accrue_interest::*;
