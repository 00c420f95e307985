use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::state::{Market, Reserve};
use crate::constants::VAULT_SEED;
use crate::errors::LedgerError;
use crate::events::Liquidated;
use crate::instructions::unix_now;

/// Accounts for booking a liquidation repayment
#[derive(Accounts)]
pub struct Liquidate<'info> {
    /// Borrow authority of the market (must sign)
    pub borrow_authority: Signer<'info>,

    /// Owner of the source token account (the liquidator)
    pub payer: Signer<'info>,

    /// The market
    #[account(
        has_one = borrow_authority @ LedgerError::Unauthorized,
        seeds = [Market::SEED_PREFIX, market.authority.as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    /// The reserve whose debt is repaid
    #[account(
        mut,
        constraint = reserve.market == market.key() @ LedgerError::InvalidReserve,
        seeds = [Reserve::SEED_PREFIX, market.key().as_ref(), reserve.asset_mint.as_ref()],
        bump = reserve.bump
    )]
    pub reserve: Box<Account<'info, Reserve>>,

    /// Liquidator's token account (source)
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

/// Book a liquidation repayment computed by the obligation layer
///
/// `repaid_principal` reduces debt; `repaid_revenue` is the protocol's cut
/// of the liquidation penalty. Both are paid into the vault.
///
/// # Arguments
/// * `ctx` - The context containing all accounts
/// * `repaid_principal` - Debt covered by the liquidator
/// * `repaid_revenue` - Penalty share retained as revenue
pub fn handler(ctx: Context<Liquidate>, repaid_principal: u64, repaid_revenue: u64) -> Result<()> {
    let now = unix_now()?;
    let reserve = &mut ctx.accounts.reserve;

    reserve.accrue(now)?;
    reserve.liquidate(repaid_principal, repaid_revenue, now)?;

    // liquidate() already rejected an overflowing sum
    let inflow = repaid_principal
        .checked_add(repaid_revenue)
        .ok_or(LedgerError::MathOverflow)?;

    let transfer_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.source.to_account_info(),
            to: ctx.accounts.vault.to_account_info(),
            authority: ctx.accounts.payer.to_account_info(),
        },
    );
    token::transfer(transfer_ctx, inflow)?;

    emit!(Liquidated {
        reserve: reserve.key(),
        repaid_principal,
        repaid_revenue,
        timestamp: now,
    });

    msg!("Liquidation on reserve {}", reserve.asset_mint);
    msg!("Principal repaid: {}, revenue: {}", repaid_principal, repaid_revenue);

    Ok(())
}
