use anchor_lang::prelude::*;

use crate::constants::{FLASH_LOAN_FEE_DENOMINATOR, FLASH_LOAN_SEED};
use crate::errors::LedgerError;

/// An outstanding flash loan
///
/// Not `Clone`, `Copy` or `Default`: a loan is created by
/// `Reserve::borrow_flash_loan` and the only way to get rid of one is
/// `Reserve::repay_flash_loan`, which takes it by value.
#[must_use = "a flash loan must be repaid in the same transaction"]
#[derive(Debug, PartialEq, Eq)]
pub struct FlashLoan {
    asset_mint: Pubkey,
    loan_amount: u64,
    fee: u64,
}

impl FlashLoan {
    pub(crate) fn new(asset_mint: Pubkey, loan_amount: u64, fee: u64) -> Self {
        Self {
            asset_mint,
            loan_amount,
            fee,
        }
    }

    pub fn asset_mint(&self) -> Pubkey {
        self.asset_mint
    }

    pub fn loan_amount(&self) -> u64 {
        self.loan_amount
    }

    pub fn fee(&self) -> u64 {
        self.fee
    }

    /// Minimum amount that settles the loan
    pub fn amount_due(&self) -> Result<u64> {
        self.loan_amount
            .checked_add(self.fee)
            .ok_or_else(|| LedgerError::MathOverflow.into())
    }

    pub(crate) fn into_parts(self) -> (Pubkey, u64, u64) {
        (self.asset_mint, self.loan_amount, self.fee)
    }
}

/// Fee owed on a flash loan, rounded up so the protocol is never undercharged
pub fn calculate_flash_loan_fee(amount: u64, fee_rate: u64) -> Result<u64> {
    let numerator = (amount as u128)
        .checked_mul(fee_rate as u128)
        .ok_or(LedgerError::MathOverflow)?;
    let denominator = FLASH_LOAN_FEE_DENOMINATOR as u128;

    let fee = (numerator + denominator - 1) / denominator;
    u64::try_from(fee).map_err(|_| LedgerError::MathOverflow.into())
}

/// On-chain record of a flash loan between `flash_borrow` and `flash_repay`
/// PDA Seeds: ["flash_loan", reserve]
#[account]
#[derive(InitSpace)]
pub struct FlashLoanReceipt {
    /// Reserve the loan was taken from
    pub reserve: Pubkey,

    /// Asset lent
    pub asset_mint: Pubkey,

    /// Account that receives the receipt rent back
    pub borrower: Pubkey,

    /// Principal lent
    pub loan_amount: u64,

    /// Fee owed on top of the principal
    pub fee: u64,

    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl FlashLoanReceipt {
    pub const SEED_PREFIX: &'static [u8] = FLASH_LOAN_SEED;

    /// Record a loan for the span of the transaction
    pub fn record(reserve: Pubkey, borrower: Pubkey, bump: u8, loan: FlashLoan) -> Self {
        let (asset_mint, loan_amount, fee) = loan.into_parts();
        Self {
            reserve,
            asset_mint,
            borrower,
            loan_amount,
            fee,
            bump,
        }
    }

    /// Turn the receipt back into the loan it stands for
    pub fn outstanding_loan(&self) -> FlashLoan {
        FlashLoan::new(self.asset_mint, self.loan_amount, self.fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_rounds_up() {
        // 1/1000 of 10_000
        assert_eq!(calculate_flash_loan_fee(10_000, 10).unwrap(), 10);
        // 0.1% of 10_001 is 10.001
        assert_eq!(calculate_flash_loan_fee(10_001, 10).unwrap(), 11);
        // Any non-zero fee rate charges at least one unit
        assert_eq!(calculate_flash_loan_fee(1, 1).unwrap(), 1);
        assert_eq!(calculate_flash_loan_fee(1_000_000, 0).unwrap(), 0);
    }

    #[test]
    fn amount_due_adds_fee() {
        let loan = FlashLoan::new(Pubkey::new_unique(), 10_000, 10);
        assert_eq!(loan.amount_due().unwrap(), 10_010);
    }

    #[test]
    fn receipt_round_trips_the_loan() {
        let mint = Pubkey::new_unique();
        let reserve = Pubkey::new_unique();
        let receipt = FlashLoanReceipt::record(reserve, Pubkey::new_unique(), 254, FlashLoan::new(mint, 500, 1));

        assert_eq!(receipt.reserve, reserve);
        assert_eq!(receipt.outstanding_loan(), FlashLoan::new(mint, 500, 1));
    }
}
