use anchor_lang::prelude::*;

use crate::state::Market;
use crate::constants::{DEFAULT_CHANGE_DELAY_SECS, DEFAULT_CHANGE_VALIDITY_SECS};
use crate::errors::LedgerError;
use crate::events::MarketInitialized;

/// Accounts for initializing a new market
#[derive(Accounts)]
pub struct InitializeMarket<'info> {
    /// Authority who will manage the market
    #[account(mut)]
    pub authority: Signer<'info>,

    /// The market account to initialize
    /// PDA: ["market", authority]
    #[account(
        init,
        payer = authority,
        space = 8 + Market::INIT_SPACE,
        seeds = [Market::SEED_PREFIX, authority.key().as_ref()],
        bump
    )]
    pub market: Account<'info, Market>,

    /// Signer allowed to borrow, repay and liquidate against the market
    /// CHECK: Any account, chosen by authority
    pub borrow_authority: UncheckedAccount<'info>,

    /// Treasury account that will receive protocol revenue
    /// CHECK: Any account, chosen by authority
    pub treasury: UncheckedAccount<'info>,

    /// System program for account creation
    pub system_program: Program<'info, System>,
}

/// Parameters for initializing a market
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Default)]
pub struct InitializeMarketParams {
    /// Delay before parameter changes apply (optional, defaults to 1 day)
    pub change_delay: Option<u64>,
    /// Window in which a ready change can be applied (optional, defaults to 7 days)
    pub change_validity: Option<u64>,
}

/// Initialize a new market
///
/// Creates the asset registry with no assets. One market per authority.
///
/// # Arguments
/// * `ctx` - The context containing all accounts
/// * `params` - Optional timelock configuration
pub fn handler(ctx: Context<InitializeMarket>, params: InitializeMarketParams) -> Result<()> {
    let change_delay = params.change_delay.unwrap_or(DEFAULT_CHANGE_DELAY_SECS);
    let change_validity = params.change_validity.unwrap_or(DEFAULT_CHANGE_VALIDITY_SECS);

    // A change that can never be applied is a misconfiguration
    require!(change_validity > 0, LedgerError::ParameterInvalid);

    let market = &mut ctx.accounts.market;
    market.set_inner(Market {
        version: 1,
        bump: ctx.bumps.market,
        authority: ctx.accounts.authority.key(),
        borrow_authority: ctx.accounts.borrow_authority.key(),
        treasury: ctx.accounts.treasury.key(),
        change_delay,
        change_validity,
        assets: Vec::new(),
        _padding: [0u8; 64],
    });

    emit!(MarketInitialized {
        market: market.key(),
        authority: market.authority,
        borrow_authority: market.borrow_authority,
        treasury: market.treasury,
        change_delay,
        change_validity,
    });

    msg!("Market initialized");
    msg!("Authority: {}", market.authority);
    msg!("Borrow authority: {}", market.borrow_authority);
    msg!("Change delay: {}s, validity: {}s", change_delay, change_validity);

    Ok(())
}
