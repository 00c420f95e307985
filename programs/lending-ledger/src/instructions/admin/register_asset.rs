use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::state::{
    InterestModel,
    LimiterConfig,
    Market,
    Reserve,
    ReserveKeys,
    ReserveParams,
    RiskModelParams,
};
use crate::constants::{
    DEFAULT_FLASH_LOAN_FEE,
    DEFAULT_LIMITER_CYCLE_SECS,
    DEFAULT_LIMITER_SEGMENT_SECS,
    SHARE_MINT_SEED,
    VAULT_SEED,
};
use crate::events::AssetRegistered;
use crate::instructions::unix_now;

/// Accounts for registering a new asset
#[derive(Accounts)]
pub struct RegisterAsset<'info> {
    /// Authority of the market (must sign)
    #[account(mut)]
    pub authority: Signer<'info>,

    /// The market the asset joins
    #[account(
        mut,
        has_one = authority,
        seeds = [Market::SEED_PREFIX, authority.key().as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    /// The reserve account to initialize
    /// PDA: ["reserve", market, asset_mint]
    #[account(
        init,
        payer = authority,
        space = 8 + Reserve::INIT_SPACE,
        seeds = [Reserve::SEED_PREFIX, market.key().as_ref(), asset_mint.key().as_ref()],
        bump
    )]
    pub reserve: Box<Account<'info, Reserve>>,

    /// The asset's token mint
    pub asset_mint: Account<'info, Mint>,

    /// Vault holding the reserve's cash
    /// PDA: ["vault", reserve]
    #[account(
        init,
        payer = authority,
        seeds = [VAULT_SEED, reserve.key().as_ref()],
        bump,
        token::mint = asset_mint,
        token::authority = reserve
    )]
    pub vault: Account<'info, TokenAccount>,

    /// Mint of the reserve's shares, same decimals as the asset
    /// PDA: ["share_mint", reserve]
    #[account(
        init,
        payer = authority,
        seeds = [SHARE_MINT_SEED, reserve.key().as_ref()],
        bump,
        mint::decimals = asset_mint.decimals,
        mint::authority = reserve
    )]
    pub share_mint: Account<'info, Mint>,

    /// Token program
    pub token_program: Program<'info, Token>,

    /// System program
    pub system_program: Program<'info, System>,

    /// Rent sysvar
    pub rent: Sysvar<'info, Rent>,
}

/// Parameters for registering an asset
#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct RegisterAssetParams {
    pub interest_model: InterestModel,

    /// Omit for assets that may not back borrows
    pub risk_model: Option<RiskModelParams>,

    /// Maximum net outflow per cycle (in native units)
    pub outflow_limit: u64,

    /// Optional: limiter cycle length in seconds (defaults to 1 day)
    pub limiter_cycle_duration: Option<u64>,

    /// Optional: limiter segment length in seconds (defaults to 30 minutes)
    pub limiter_segment_duration: Option<u64>,

    /// Optional: flash loan fee (defaults to 0.05%)
    pub flash_loan_fee: Option<u64>,
}

/// Register an asset with the market
///
/// Creates the asset's reserve with a zeroed balance sheet, its vault and
/// its share mint. Collateral use is enabled only when a risk model is given.
///
/// # Arguments
/// * `ctx` - The context containing all accounts
/// * `params` - Model parameters for the new asset
pub fn handler(ctx: Context<RegisterAsset>, params: RegisterAssetParams) -> Result<()> {
    let now = unix_now()?;
    let market = &mut ctx.accounts.market;
    let asset_mint = ctx.accounts.asset_mint.key();

    let keys = ReserveKeys {
        market: market.key(),
        asset_mint,
        vault: ctx.accounts.vault.key(),
        share_mint: ctx.accounts.share_mint.key(),
        token_decimals: ctx.accounts.asset_mint.decimals,
        bump: ctx.bumps.reserve,
    };
    let reserve_params = ReserveParams {
        interest_model: params.interest_model,
        risk_model: params.risk_model,
        limiter: LimiterConfig {
            outflow_limit: params.outflow_limit,
            cycle_duration: params
                .limiter_cycle_duration
                .unwrap_or(DEFAULT_LIMITER_CYCLE_SECS),
            segment_duration: params
                .limiter_segment_duration
                .unwrap_or(DEFAULT_LIMITER_SEGMENT_SECS),
        },
        flash_loan_fee: params.flash_loan_fee.unwrap_or(DEFAULT_FLASH_LOAN_FEE),
    };

    // Build and validate everything before touching the registry
    let reserve = Reserve::new(keys, reserve_params, now)?;
    let collateral_active = reserve.risk_model.is_some();
    market.register_asset(asset_mint, collateral_active)?;
    ctx.accounts.reserve.set_inner(reserve);

    emit!(AssetRegistered {
        market: market.key(),
        reserve: ctx.accounts.reserve.key(),
        asset_mint,
        share_mint: ctx.accounts.share_mint.key(),
        collateral_active,
    });

    msg!("Asset registered: {}", asset_mint);
    msg!("Reserve: {}", ctx.accounts.reserve.key());
    msg!("Collateral active: {}", collateral_active);

    Ok(())
}
