use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::state::{Market, Reserve};
use crate::constants::VAULT_SEED;
use crate::errors::LedgerError;
use crate::events::Borrowed;
use crate::instructions::unix_now;

/// Accounts for borrowing from a reserve
///
/// Solvency of the borrower is the obligation layer's concern; the ledger
/// only accepts borrows signed by the market's borrow authority.
#[derive(Accounts)]
pub struct Borrow<'info> {
    /// Borrow authority of the market (must sign)
    pub borrow_authority: Signer<'info>,

    /// The market
    #[account(
        has_one = borrow_authority @ LedgerError::Unauthorized,
        seeds = [Market::SEED_PREFIX, market.authority.as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    /// The reserve to borrow from
    #[account(
        mut,
        constraint = reserve.market == market.key() @ LedgerError::InvalidReserve,
        seeds = [Reserve::SEED_PREFIX, market.key().as_ref(), reserve.asset_mint.as_ref()],
        bump = reserve.bump
    )]
    pub reserve: Box<Account<'info, Reserve>>,

    /// Reserve's vault (source)
    #[account(
        mut,
        seeds = [VAULT_SEED, reserve.key().as_ref()],
        bump,
        constraint = vault.key() == reserve.vault @ LedgerError::InvalidVault
    )]
    pub vault: Account<'info, TokenAccount>,

    /// Token account receiving the borrowed funds
    #[account(
        mut,
        constraint = destination.mint == reserve.asset_mint @ LedgerError::InvalidTokenMint
    )]
    pub destination: Account<'info, TokenAccount>,

    /// Token program
    pub token_program: Program<'info, Token>,
}

/// Borrow from the reserve
///
/// Accrues interest, checks liquidity, minimum size and the outflow limit,
/// then reprices the reserve at its new utilization.
///
/// # Arguments
/// * `ctx` - The context containing all accounts
/// * `amount` - Amount to borrow (in native units)
pub fn handler(ctx: Context<Borrow>, amount: u64) -> Result<()> {
    let now = unix_now()?;
    let reserve = &mut ctx.accounts.reserve;
    ctx.accounts.market.ensure_base_active(&reserve.asset_mint)?;

    reserve.accrue(now)?;
    reserve.borrow(amount, now)?;

    // Transfer from vault to destination using PDA signer
    let seeds = &[
        Reserve::SEED_PREFIX,
        reserve.market.as_ref(),
        reserve.asset_mint.as_ref(),
        &[reserve.bump],
    ];
    let signer_seeds = &[&seeds[..]];

    let transfer_ctx = CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.vault.to_account_info(),
            to: ctx.accounts.destination.to_account_info(),
            authority: reserve.to_account_info(),
        },
        signer_seeds,
    );
    token::transfer(transfer_ctx, amount)?;

    let new_utilization = reserve.utilization();
    emit!(Borrowed {
        reserve: reserve.key(),
        amount,
        new_utilization,
        new_rate: reserve.borrow_dynamic.current_rate,
        timestamp: now,
    });

    msg!("Borrowed {} from reserve {}", amount, reserve.asset_mint);
    msg!(
        "Utilization: {}/{}, rate: {}",
        new_utilization,
        reserve.interest_model.rate_scale,
        reserve.borrow_dynamic.current_rate
    );

    Ok(())
}
