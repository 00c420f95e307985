use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount, Transfer};

use crate::state::{Market, Reserve};
use crate::constants::{SHARE_MINT_SEED, VAULT_SEED};
use crate::errors::LedgerError;
use crate::events::SharesRedeemed;
use crate::instructions::unix_now;

/// Accounts for redeeming shares for underlying
#[derive(Accounts)]
pub struct RedeemShares<'info> {
    /// Holder of the shares
    pub owner: Signer<'info>,

    /// The market
    #[account(
        seeds = [Market::SEED_PREFIX, market.authority.as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    /// The reserve to redeem from
    #[account(
        mut,
        constraint = reserve.market == market.key() @ LedgerError::InvalidReserve,
        seeds = [Reserve::SEED_PREFIX, market.key().as_ref(), reserve.asset_mint.as_ref()],
        bump = reserve.bump
    )]
    pub reserve: Box<Account<'info, Reserve>>,

    /// User's share account (burned from)
    #[account(
        mut,
        constraint = user_share_account.mint == reserve.share_mint @ LedgerError::InvalidShareMint,
        constraint = user_share_account.owner == owner.key() @ LedgerError::Unauthorized
    )]
    pub user_share_account: Account<'info, TokenAccount>,

    /// User's token account (destination)
    #[account(
        mut,
        constraint = user_token_account.mint == reserve.asset_mint @ LedgerError::InvalidTokenMint
    )]
    pub user_token_account: Account<'info, TokenAccount>,

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

/// Burn shares and withdraw the underlying they claim
///
/// Redemption stays open when the asset is disabled for base use. The
/// withdrawn amount counts against the asset's outflow limit.
///
/// # Arguments
/// * `ctx` - The context containing all accounts
/// * `shares` - Shares to burn
pub fn handler(ctx: Context<RedeemShares>, shares: u64) -> Result<()> {
    require!(shares > 0, LedgerError::AmountTooSmall);

    let now = unix_now()?;
    let reserve = &mut ctx.accounts.reserve;

    reserve.accrue(now)?;
    let underlying = reserve.redeem_shares(shares, now)?;

    // Burn the user's shares
    let burn_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        Burn {
            mint: ctx.accounts.share_mint.to_account_info(),
            from: ctx.accounts.user_share_account.to_account_info(),
            authority: ctx.accounts.owner.to_account_info(),
        },
    );
    token::burn(burn_ctx, shares)?;

    // Transfer underlying from vault to user using PDA signer
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
            to: ctx.accounts.user_token_account.to_account_info(),
            authority: reserve.to_account_info(),
        },
        signer_seeds,
    );
    token::transfer(transfer_ctx, underlying)?;

    emit!(SharesRedeemed {
        reserve: reserve.key(),
        owner: ctx.accounts.owner.key(),
        shares,
        underlying_amount: underlying,
        timestamp: now,
    });

    msg!("Redeemed {} shares of reserve {} for {}", shares, reserve.asset_mint, underlying);

    Ok(())
}
