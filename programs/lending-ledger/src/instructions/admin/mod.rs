pub mod initialize_market;
pub mod register_asset;
pub mod set_asset_flags;
pub mod update_reserve;
pub mod take_revenue;

pub use initialize_market::*;
pub use register_asset::*;
pub use set_asset_flags::*;
pub use update_reserve::*;
pub use take_revenue::*;
