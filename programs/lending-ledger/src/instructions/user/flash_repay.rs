use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::state::{FlashLoanReceipt, Reserve};
use crate::constants::VAULT_SEED;
use crate::errors::LedgerError;
use crate::events::FlashLoanRepaid;

/// Accounts for settling a flash loan
///
/// `reserve` must stay at position 1; `flash_borrow` looks for it there.
#[derive(Accounts)]
pub struct FlashRepay<'info> {
    /// Borrower recorded on the receipt; receives the receipt rent
    #[account(mut)]
    pub borrower: Signer<'info>,

    /// The reserve the loan was taken from
    #[account(
        mut,
        seeds = [Reserve::SEED_PREFIX, reserve.market.as_ref(), reserve.asset_mint.as_ref()],
        bump = reserve.bump
    )]
    pub reserve: Box<Account<'info, Reserve>>,

    /// Receipt recorded by `flash_borrow`, closed here
    #[account(
        mut,
        close = borrower,
        has_one = borrower @ LedgerError::Unauthorized,
        has_one = reserve @ LedgerError::InvalidReserve,
        seeds = [FlashLoanReceipt::SEED_PREFIX, reserve.key().as_ref()],
        bump = flash_loan_receipt.bump
    )]
    pub flash_loan_receipt: Account<'info, FlashLoanReceipt>,

    /// Borrower's token account (source)
    #[account(
        mut,
        constraint = source.mint == reserve.asset_mint @ LedgerError::InvalidTokenMint,
        constraint = source.owner == borrower.key() @ LedgerError::Unauthorized
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

/// Repay an outstanding flash loan
///
/// `amount` must cover principal plus fee; everything above the principal
/// is booked as revenue.
///
/// # Arguments
/// * `ctx` - The context containing all accounts
/// * `amount` - Amount paid back (in native units)
pub fn handler(ctx: Context<FlashRepay>, amount: u64) -> Result<()> {
    let loan = ctx.accounts.flash_loan_receipt.outstanding_loan();
    let loan_amount = loan.loan_amount();

    let reserve = &mut ctx.accounts.reserve;
    reserve.repay_flash_loan(amount, loan)?;

    // Transfer the repayment from borrower to vault
    let transfer_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.source.to_account_info(),
            to: ctx.accounts.vault.to_account_info(),
            authority: ctx.accounts.borrower.to_account_info(),
        },
    );
    token::transfer(transfer_ctx, amount)?;

    emit!(FlashLoanRepaid {
        reserve: reserve.key(),
        borrower: ctx.accounts.borrower.key(),
        amount: loan_amount,
        fee_paid: amount - loan_amount,
    });

    msg!("Flash loan of {} repaid to reserve {}", loan_amount, reserve.asset_mint);
    msg!("Fee paid: {}", amount - loan_amount);

    Ok(())
}
