use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::state::{Market, Reserve};
use crate::errors::LedgerError;
use crate::events::RevenueTaken;
use crate::instructions::unix_now;

/// Accounts for taking accrued protocol revenue
#[derive(Accounts)]
pub struct TakeRevenue<'info> {
    /// Authority of the market (must sign)
    pub authority: Signer<'info>,

    /// The market
    #[account(
        has_one = authority,
        has_one = treasury,
        seeds = [Market::SEED_PREFIX, authority.key().as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    /// The reserve to take revenue from
    #[account(
        mut,
        constraint = reserve.market == market.key() @ LedgerError::InvalidReserve
    )]
    pub reserve: Box<Account<'info, Reserve>>,

    /// Reserve's vault (source of revenue)
    #[account(
        mut,
        constraint = vault.key() == reserve.vault @ LedgerError::InvalidVault
    )]
    pub vault: Account<'info, TokenAccount>,

    /// Treasury token account (destination)
    /// Must be owned by the treasury and match the reserve's asset
    #[account(
        mut,
        constraint = treasury_token_account.mint == reserve.asset_mint @ LedgerError::InvalidTokenMint,
        constraint = treasury_token_account.owner == treasury.key() @ LedgerError::Unauthorized
    )]
    pub treasury_token_account: Account<'info, TokenAccount>,

    /// Treasury account (must match market.treasury)
    /// CHECK: Validated by has_one constraint on market
    pub treasury: UncheckedAccount<'info>,

    /// Token program
    pub token_program: Program<'info, Token>,
}

/// Take accrued revenue out of a reserve
///
/// Interest is accrued first so revenue is current. Takes
/// `min(amount, revenue)`; `amount = 0` takes everything available.
///
/// # Arguments
/// * `ctx` - The context containing all accounts
/// * `amount` - Revenue to take (0 = all)
pub fn handler(ctx: Context<TakeRevenue>, amount: u64) -> Result<()> {
    let now = unix_now()?;
    let reserve = &mut ctx.accounts.reserve;

    reserve.accrue(now)?;

    let requested = if amount == 0 { u64::MAX } else { amount };
    let taken = reserve.take_revenue(requested)?;
    require!(taken > 0, LedgerError::AmountTooSmall);

    // Transfer revenue from vault to treasury using PDA signer
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
            to: ctx.accounts.treasury_token_account.to_account_info(),
            authority: reserve.to_account_info(),
        },
        signer_seeds,
    );
    token::transfer(transfer_ctx, taken)?;

    emit!(RevenueTaken {
        reserve: reserve.key(),
        amount: taken,
        recipient: ctx.accounts.treasury.key(),
        timestamp: now,
    });

    msg!("Took {} revenue from reserve {}", taken, reserve.asset_mint);
    msg!("Remaining revenue: {}", reserve.balance_sheet.revenue);

    Ok(())
}
