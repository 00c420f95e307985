use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::state::{Market, Reserve};
use crate::constants::VAULT_SEED;
use crate::errors::LedgerError;
use crate::events::Repaid;
use crate::instructions::unix_now;

/// Accounts for repaying debt
#[derive(Accounts)]
pub struct Repay<'info> {
    /// Borrow authority of the market (must sign)
    pub borrow_authority: Signer<'info>,

    /// Owner of the source token account
    pub payer: Signer<'info>,

    /// The market
    #[account(
        has_one = borrow_authority @ LedgerError::Unauthorized,
        seeds = [Market::SEED_PREFIX, market.authority.as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    /// The reserve being repaid
    #[account(
        mut,
        constraint = reserve.market == market.key() @ LedgerError::InvalidReserve,
        seeds = [Reserve::SEED_PREFIX, market.key().as_ref(), reserve.asset_mint.as_ref()],
        bump = reserve.bump
    )]
    pub reserve: Box<Account<'info, Reserve>>,

    /// Payer's token account (source)
    #[account(
        mut,
        constraint = source.mint == reserve.asset_mint @ LedgerError::InvalidTokenMint,
        constraint = source.owner == payer.key() @ LedgerError::Unauthorized
    )]
    pub source: Account<'info, TokenAccount>,

    /// Reserve's vault (destination)
    #[account(
        mut,
        seeds = [VAULT_SEED, reserve.key().as_ref()],
        bump,
        constraint = vault.key() == reserve.vault @ LedgerError::InvalidVault
    )]
    pub vault: Account<'info, TokenAccount>,

    /// Token program
    pub token_program: Program<'info, Token>,
}

/// Repay debt to the reserve
///
/// Allowed while the asset is disabled. Payment beyond outstanding debt is
/// not refunded; it is booked as revenue.
///
/// # Arguments
/// * `ctx` - The context containing all accounts
/// * `amount` - Amount to pay in (in native units)
pub fn handler(ctx: Context<Repay>, amount: u64) -> Result<()> {
    let now = unix_now()?;
    let reserve = &mut ctx.accounts.reserve;

    reserve.accrue(now)?;
    let applied_to_debt = reserve.repay(amount, now)?;

    // Transfer from payer to vault
    let transfer_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.source.to_account_info(),
            to: ctx.accounts.vault.to_account_info(),
            authority: ctx.accounts.payer.to_account_info(),
        },
    );
    token::transfer(transfer_ctx, amount)?;

    let new_utilization = reserve.utilization();
    emit!(Repaid {
        reserve: reserve.key(),
        payer: ctx.accounts.payer.key(),
        amount,
        applied_to_debt,
        new_utilization,
        new_rate: reserve.borrow_dynamic.current_rate,
        timestamp: now,
    });

    msg!("Repaid {} to reserve {}", amount, reserve.asset_mint);
    if applied_to_debt < amount {
        msg!("Excess {} booked as revenue", amount - applied_to_debt);
    }
    msg!("Remaining debt: {}", reserve.balance_sheet.debt);

    Ok(())
}
