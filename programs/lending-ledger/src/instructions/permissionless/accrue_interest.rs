use anchor_lang::prelude::*;

use crate::state::{Market, Reserve};
use crate::errors::LedgerError;
use crate::events::InterestAccrued;
use crate::instructions::unix_now;

/// Accounts for accruing interest across the market
///
/// Every registered reserve is passed, writable, in `remaining_accounts`.
#[derive(Accounts)]
pub struct AccrueInterest<'info> {
    /// The market
    #[account(
        seeds = [Market::SEED_PREFIX, market.authority.as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,
}

/// Accrue interest on every asset of the market
///
/// This permissionless instruction:
/// 1. Grows each asset's borrow index for the time elapsed
/// 2. Books the protocol's share of the interest as revenue
/// 3. Reprices each asset at its post-accrual utilization
///
/// Either every reserve is accrued or none is.
pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, AccrueInterest<'info>>) -> Result<()> {
    let now = unix_now()?;
    let market_key = ctx.accounts.market.key();

    let mut reserves = Vec::with_capacity(ctx.remaining_accounts.len());
    for info in ctx.remaining_accounts.iter() {
        require!(info.is_writable, LedgerError::InvalidReserve);
        let reserve: Account<'info, Reserve> = Account::try_from(info)?;
        reserves.push(reserve);
    }

    {
        let mut refs: Vec<&mut Reserve> = reserves.iter_mut().map(|r| &mut **r).collect();
        ctx.accounts.market.accrue_all(&market_key, &mut refs, now)?;
    }

    for reserve in reserves.iter() {
        emit!(InterestAccrued {
            reserve: reserve.key(),
            borrow_index: reserve.borrow_dynamic.borrow_index,
            current_rate: reserve.borrow_dynamic.current_rate,
            debt: reserve.balance_sheet.debt,
            revenue: reserve.balance_sheet.revenue,
            timestamp: now,
        });

        // Remaining accounts are not written back automatically
        reserve.exit(&crate::ID)?;
    }

    msg!("Accrued interest on {} assets at {}", reserves.len(), now);

    Ok(())
}
