use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions::{
    load_current_index_checked,
    load_instruction_at_checked,
};
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::state::{FlashLoanReceipt, Market, Reserve};
use crate::constants::VAULT_SEED;
use crate::errors::LedgerError;
use crate::events::FlashLoanTaken;

/// Position of the reserve among `flash_repay`'s accounts
pub const FLASH_REPAY_RESERVE_INDEX: usize = 1;

/// Accounts for taking a flash loan
#[derive(Accounts)]
pub struct FlashBorrow<'info> {
    /// Borrower; pays the receipt rent and gets it back on repay
    #[account(mut)]
    pub borrower: Signer<'info>,

    /// The market
    #[account(
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

    /// Receipt standing for the loan until `flash_repay`
    /// PDA: ["flash_loan", reserve]
    #[account(
        init,
        payer = borrower,
        space = 8 + FlashLoanReceipt::INIT_SPACE,
        seeds = [FlashLoanReceipt::SEED_PREFIX, reserve.key().as_ref()],
        bump
    )]
    pub flash_loan_receipt: Account<'info, FlashLoanReceipt>,

    /// Reserve's vault (source)
    #[account(
        mut,
        seeds = [VAULT_SEED, reserve.key().as_ref()],
        bump,
        constraint = vault.key() == reserve.vault @ LedgerError::InvalidVault
    )]
    pub vault: Account<'info, TokenAccount>,

    /// Token account receiving the loan
    #[account(
        mut,
        constraint = destination.mint == reserve.asset_mint @ LedgerError::InvalidTokenMint
    )]
    pub destination: Account<'info, TokenAccount>,

    /// Instructions sysvar
    /// CHECK: Address checked against the sysvar id
    #[account(address = anchor_lang::solana_program::sysvar::instructions::ID)]
    pub instructions_sysvar: UncheckedAccount<'info>,

    /// Token program
    pub token_program: Program<'info, Token>,

    /// System program
    pub system_program: Program<'info, System>,
}

/// Lend `amount` until the end of the transaction
///
/// The transaction must call this program's `flash_repay` for the same
/// reserve after this instruction, otherwise the loan is refused.
///
/// # Arguments
/// * `ctx` - The context containing all accounts
/// * `amount` - Amount to lend (in native units)
pub fn handler(ctx: Context<FlashBorrow>, amount: u64) -> Result<()> {
    let reserve_key = ctx.accounts.reserve.key();
    ctx.accounts
        .market
        .ensure_base_active(&ctx.accounts.reserve.asset_mint)?;
    ensure_repaid_later(&ctx.accounts.instructions_sysvar.to_account_info(), &reserve_key)?;

    let reserve = &mut ctx.accounts.reserve;
    let loan = reserve.borrow_flash_loan(amount)?;
    let fee = loan.fee();

    ctx.accounts.flash_loan_receipt.set_inner(FlashLoanReceipt::record(
        reserve_key,
        ctx.accounts.borrower.key(),
        ctx.bumps.flash_loan_receipt,
        loan,
    ));

    // Transfer the loan out using PDA signer
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

    emit!(FlashLoanTaken {
        reserve: reserve_key,
        borrower: ctx.accounts.borrower.key(),
        amount,
        fee,
    });

    msg!("Flash loan of {} from reserve {}, fee {}", amount, reserve.asset_mint, fee);

    Ok(())
}

/// Require a top-level call to this program and a later `flash_repay` on
/// the same reserve within the transaction
fn ensure_repaid_later(instructions: &AccountInfo, reserve: &Pubkey) -> Result<()> {
    let current_index = load_current_index_checked(instructions)? as usize;

    // Rejects CPI: the current top-level instruction must be ours
    let current = load_instruction_at_checked(current_index, instructions)?;
    require_keys_eq!(current.program_id, crate::ID, LedgerError::Unauthorized);

    let mut index = current_index + 1;
    while let Ok(ix) = load_instruction_at_checked(index, instructions) {
        if ix.program_id == crate::ID
            && ix.data.starts_with(crate::instruction::FlashRepay::DISCRIMINATOR)
            && ix
                .accounts
                .get(FLASH_REPAY_RESERVE_INDEX)
                .is_some_and(|meta| meta.pubkey == *reserve)
        {
            return Ok(());
        }
        index += 1;
    }

    err!(LedgerError::FlashRepayMissing)
}
