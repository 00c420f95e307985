use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::state::{Market, Reserve};
use crate::constants::{SHARE_MINT_SEED, VAULT_SEED};
use crate::errors::LedgerError;
use crate::events::SharesMinted;
use crate::instructions::unix_now;

/// Accounts for supplying underlying in exchange for shares
#[derive(Accounts)]
pub struct MintShares<'info> {
    /// User supplying the underlying
    pub owner: Signer<'info>,

    /// The market
    #[account(
        seeds = [Market::SEED_PREFIX, market.authority.as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    /// The reserve to supply into
    #[account(
        mut,
        constraint = reserve.market == market.key() @ LedgerError::InvalidReserve,
        seeds = [Reserve::SEED_PREFIX, market.key().as_ref(), reserve.asset_mint.as_ref()],
        bump = reserve.bump
    )]
    pub reserve: Box<Account<'info, Reserve>>,

    /// User's token account (source)
    #[account(
        mut,
        constraint = user_token_account.mint == reserve.asset_mint @ LedgerError::InvalidTokenMint,
        constraint = user_token_account.owner == owner.key() @ LedgerError::Unauthorized
    )]
    pub user_token_account: Account<'info, TokenAccount>,

    /// User's share account (destination)
    #[account(
        mut,
        constraint = user_share_account.mint == reserve.share_mint @ LedgerError::InvalidShareMint
    )]
    pub user_share_account: Account<'info, TokenAccount>,

    /// Reserve's vault
    #[account(
        mut,
        seeds = [VAULT_SEED, reserve.key().as_ref()],
        bump,
        constraint = vault.key() == reserve.vault @ LedgerError::InvalidVault
    )]
    pub vault: Account<'info, TokenAccount>,

    /// Reserve's share mint
    #[account(
        mut,
        seeds = [SHARE_MINT_SEED, reserve.key().as_ref()],
        bump,
        constraint = share_mint.key() == reserve.share_mint @ LedgerError::InvalidShareMint
    )]
    pub share_mint: Account<'info, Mint>,

    /// Token program
    pub token_program: Program<'info, Token>,
}

/// Supply underlying and receive shares
///
/// Interest is accrued before pricing so the new supplier does not capture
/// interest earned before the deposit.
///
/// # Arguments
/// * `ctx` - The context containing all accounts
/// * `amount` - Underlying to supply (in native units)
pub fn handler(ctx: Context<MintShares>, amount: u64) -> Result<()> {
    require!(amount > 0, LedgerError::AmountTooSmall);

    let now = unix_now()?;
    let reserve = &mut ctx.accounts.reserve;
    ctx.accounts.market.ensure_base_active(&reserve.asset_mint)?;

    reserve.accrue(now)?;
    let shares = reserve.mint_shares(amount)?;

    // Transfer underlying from user to vault
    let transfer_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.user_token_account.to_account_info(),
            to: ctx.accounts.vault.to_account_info(),
            authority: ctx.accounts.owner.to_account_info(),
        },
    );
    token::transfer(transfer_ctx, amount)?;

    // Mint shares to the user using PDA signer
    let seeds = &[
        Reserve::SEED_PREFIX,
        reserve.market.as_ref(),
        reserve.asset_mint.as_ref(),
        &[reserve.bump],
    ];
    let signer_seeds = &[&seeds[..]];

    let mint_ctx = CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        MintTo {
            mint: ctx.accounts.share_mint.to_account_info(),
            to: ctx.accounts.user_share_account.to_account_info(),
            authority: reserve.to_account_info(),
        },
        signer_seeds,
    );
    token::mint_to(mint_ctx, shares)?;

    emit!(SharesMinted {
        reserve: reserve.key(),
        owner: ctx.accounts.owner.key(),
        underlying_amount: amount,
        shares,
        timestamp: now,
    });

    msg!("Supplied {} into reserve {} for {} shares", amount, reserve.asset_mint, shares);

    Ok(())
}
