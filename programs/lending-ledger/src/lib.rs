use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

use instructions::*;
use state::{InterestModel, LimiterConfig, RiskModelParams};

declare_id!("3UUp4kNzq4ieBgfnfCSfASgLMagz51YK7fUc5eK9s8ir");

#[program]
pub mod lending_ledger {
    use super::*;

    // ============================================================================
    // ADMIN INSTRUCTIONS
    // ============================================================================

    /// Initialize a new market with an empty asset registry
    pub fn initialize_market(
        ctx: Context<InitializeMarket>,
        params: InitializeMarketParams,
    ) -> Result<()> {
        instructions::admin::initialize_market::handler(ctx, params)
    }

    /// Register an asset and create its reserve, vault and share mint
    pub fn register_asset(
        ctx: Context<RegisterAsset>,
        params: RegisterAssetParams,
    ) -> Result<()> {
        instructions::admin::register_asset::handler(ctx, params)
    }

    /// Enable or disable an asset for base and collateral use
    pub fn set_asset_flags(
        ctx: Context<SetAssetFlags>,
        asset_mint: Pubkey,
        base_active: bool,
        collateral_active: bool,
    ) -> Result<()> {
        instructions::admin::set_asset_flags::handler(ctx, asset_mint, base_active, collateral_active)
    }

    /// Set a reserve's flash loan fee
    pub fn set_flash_loan_fee(ctx: Context<UpdateReserve>, flash_loan_fee: u64) -> Result<()> {
        instructions::admin::update_reserve::set_flash_loan_fee(ctx, flash_loan_fee)
    }

    /// Queue a replacement interest model
    pub fn propose_interest_model(ctx: Context<UpdateReserve>, model: InterestModel) -> Result<()> {
        instructions::admin::update_reserve::propose_interest_model(ctx, model)
    }

    /// Apply the queued interest model
    pub fn apply_interest_model(ctx: Context<UpdateReserve>) -> Result<()> {
        instructions::admin::update_reserve::apply_interest_model(ctx)
    }

    /// Queue a replacement risk model
    pub fn propose_risk_model(ctx: Context<UpdateReserve>, params: RiskModelParams) -> Result<()> {
        instructions::admin::update_reserve::propose_risk_model(ctx, params)
    }

    /// Apply the queued risk model
    pub fn apply_risk_model(ctx: Context<UpdateReserve>) -> Result<()> {
        instructions::admin::update_reserve::apply_risk_model(ctx)
    }

    /// Queue a replacement outflow limiter configuration
    pub fn propose_limiter_config(ctx: Context<UpdateReserve>, config: LimiterConfig) -> Result<()> {
        instructions::admin::update_reserve::propose_limiter_config(ctx, config)
    }

    /// Apply the queued outflow limiter configuration
    pub fn apply_limiter_config(ctx: Context<UpdateReserve>) -> Result<()> {
        instructions::admin::update_reserve::apply_limiter_config(ctx)
    }

    /// Move accrued revenue to the treasury
    pub fn take_revenue(ctx: Context<TakeRevenue>, amount: u64) -> Result<()> {
        instructions::admin::take_revenue::handler(ctx, amount)
    }

    // ============================================================================
    // USER INSTRUCTIONS
    // ============================================================================

    /// Supply underlying for shares
    pub fn mint(ctx: Context<MintShares>, amount: u64) -> Result<()> {
        instructions::user::mint::handler(ctx, amount)
    }

    /// Redeem shares for underlying
    pub fn redeem(ctx: Context<RedeemShares>, shares: u64) -> Result<()> {
        instructions::user::redeem::handler(ctx, shares)
    }

    /// Borrow from a reserve (borrow authority only)
    pub fn borrow(ctx: Context<Borrow>, amount: u64) -> Result<()> {
        instructions::user::borrow::handler(ctx, amount)
    }

    /// Repay debt (borrow authority only)
    pub fn repay(ctx: Context<Repay>, amount: u64) -> Result<()> {
        instructions::user::repay::handler(ctx, amount)
    }

    /// Book a liquidation repayment (borrow authority only)
    pub fn liquidate(
        ctx: Context<Liquidate>,
        repaid_principal: u64,
        repaid_revenue: u64,
    ) -> Result<()> {
        instructions::user::liquidate::handler(ctx, repaid_principal, repaid_revenue)
    }

    /// Take a flash loan, repaid later in the same transaction
    pub fn flash_borrow(ctx: Context<FlashBorrow>, amount: u64) -> Result<()> {
        instructions::user::flash_borrow::handler(ctx, amount)
    }

    /// Repay the outstanding flash loan of a reserve
    pub fn flash_repay(ctx: Context<FlashRepay>, amount: u64) -> Result<()> {
        instructions::user::flash_repay::handler(ctx, amount)
    }

    // ============================================================================
    // PERMISSIONLESS INSTRUCTIONS
    // ============================================================================

    /// Accrue interest on every asset of the market
    pub fn accrue_interest<'info>(
        ctx: Context<'_, '_, 'info, 'info, AccrueInterest<'info>>,
    ) -> Result<()> {
        instructions::permissionless::accrue_interest::handler(ctx)
    }
}
