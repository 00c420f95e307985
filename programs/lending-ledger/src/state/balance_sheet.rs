use anchor_lang::prelude::*;

use crate::constants::INDEX_ONE;
use crate::errors::LedgerError;

/// Per-asset balance sheet of the market
///
/// `revenue` is the protocol's share of interest. It stays physically in
/// `cash` until taken, so `cash + debt >= revenue` holds at all times and
/// every mutator that lets funds leave re-checks `cash >= revenue`.
/// Principal out on a flash loan sits in `flash_lent` until settled.
///
/// Every mutator validates before it writes: an error leaves the sheet
/// unchanged.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, InitSpace, Default, Debug, PartialEq, Eq)]
pub struct BalanceSheet {
    /// Liquidity held by the market and available to lend
    pub cash: u64,

    /// Principal plus accrued interest owed by borrowers
    pub debt: u64,

    /// Protocol revenue not yet taken
    pub revenue: u64,

    /// Outstanding interest-bearing shares
    pub share_supply: u64,

    /// Principal of the flash loan currently out; still owned by share holders
    pub flash_lent: u64,

    /// Interest below one native unit not yet added to debt, over 10^18
    pub interest_carry: u64,
}

impl BalanceSheet {
    /// Value owned by share holders: `cash + debt - revenue`
    ///
    /// An open flash loan's principal counts as cash, so the share price
    /// does not move while the loan is out.
    pub fn supplied_value(&self) -> Result<u64> {
        let net = self
            .gross_value()
            .checked_sub(self.revenue as u128)
            .ok_or(LedgerError::MathOverflow)?;
        u64::try_from(net).map_err(|_| LedgerError::MathOverflow.into())
    }

    /// Fraction of supplied value currently borrowed, over `scale`
    /// Returns 0 when nothing is borrowed or supplied, and never more than `scale`.
    pub fn utilization(&self, scale: u64) -> u64 {
        let supplied = self.gross_value().saturating_sub(self.revenue as u128);
        if self.debt == 0 || supplied == 0 {
            return 0;
        }

        let utilization = (self.debt as u128) * (scale as u128) / supplied;
        utilization.min(scale as u128) as u64
    }

    fn gross_value(&self) -> u128 {
        (self.cash as u128) + (self.flash_lent as u128) + (self.debt as u128)
    }

    pub fn borrow(&mut self, amount: u64) -> Result<()> {
        require_gte!(self.cash, amount, LedgerError::InsufficientLiquidity);

        let cash = self.cash - amount;
        let debt = self.debt.checked_add(amount).ok_or(LedgerError::MathOverflow)?;
        require_gte!(cash, self.revenue, LedgerError::InsufficientLiquidity);

        self.cash = cash;
        self.debt = debt;
        Ok(())
    }

    /// Apply a repayment; returns the part applied to debt
    ///
    /// The full `amount` is deposited. Anything beyond the outstanding debt
    /// is kept as revenue rather than refunded.
    pub fn repay(&mut self, amount: u64) -> Result<u64> {
        let applied = amount.min(self.debt);
        let excess = amount - applied;

        let cash = self.cash.checked_add(amount).ok_or(LedgerError::MathOverflow)?;
        let revenue = self
            .revenue
            .checked_add(excess)
            .ok_or(LedgerError::MathOverflow)?;

        self.cash = cash;
        self.debt -= applied;
        self.revenue = revenue;
        Ok(applied)
    }

    /// Grow debt by the borrow index growth and book the protocol's share
    ///
    /// `growth_ratio` is scaled by 10^18, `revenue_factor` by `scale`.
    /// The sub-unit part of the interest is carried into the next accrual.
    pub fn accrue_revenue(&mut self, growth_ratio: u128, revenue_factor: u64, scale: u64) -> Result<()> {
        require!(scale > 0, LedgerError::ParameterInvalid);

        let interest = (self.debt as u128)
            .checked_mul(growth_ratio)
            .and_then(|scaled| scaled.checked_add(self.interest_carry as u128))
            .ok_or(LedgerError::MathOverflow)?;
        let debt_increase = interest / INDEX_ONE;
        // Remainder of a division by 10^18 fits in u64
        let interest_carry = (interest % INDEX_ONE) as u64;
        let revenue_increase = debt_increase
            .checked_mul(revenue_factor as u128)
            .ok_or(LedgerError::MathOverflow)?
            / scale as u128;

        let debt = u64::try_from((self.debt as u128) + debt_increase)
            .map_err(|_| LedgerError::MathOverflow)?;
        let revenue = u64::try_from((self.revenue as u128) + revenue_increase)
            .map_err(|_| LedgerError::MathOverflow)?;

        self.debt = debt;
        self.revenue = revenue;
        self.interest_carry = interest_carry;
        Ok(())
    }

    /// Book a liquidation: principal repaid plus the protocol's cut of the penalty
    pub fn liquidate(&mut self, repaid_principal: u64, repaid_revenue: u64) -> Result<()> {
        let inflow = repaid_principal
            .checked_add(repaid_revenue)
            .ok_or(LedgerError::MathOverflow)?;
        let cash = self.cash.checked_add(inflow).ok_or(LedgerError::MathOverflow)?;
        let revenue = self
            .revenue
            .checked_add(repaid_revenue)
            .ok_or(LedgerError::MathOverflow)?;
        let debt = self
            .debt
            .checked_sub(repaid_principal)
            .ok_or(LedgerError::MathOverflow)?;

        self.cash = cash;
        self.revenue = revenue;
        self.debt = debt;
        Ok(())
    }

    /// Deposit underlying and issue shares at the current exchange rate
    ///
    /// The first deposit into an empty pool mints 1:1. Share amounts round
    /// down, in favor of the pool.
    pub fn mint_shares(&mut self, underlying_amount: u64) -> Result<u64> {
        let shares = if self.share_supply == 0 {
            underlying_amount
        } else {
            let supplied = self.supplied_value()?;
            require!(supplied > 0, LedgerError::InsufficientLiquidity);
            let shares = (underlying_amount as u128) * (self.share_supply as u128) / supplied as u128;
            u64::try_from(shares).map_err(|_| LedgerError::MathOverflow)?
        };
        require!(shares > 0, LedgerError::AmountTooSmall);

        let cash = self
            .cash
            .checked_add(underlying_amount)
            .ok_or(LedgerError::MathOverflow)?;
        let share_supply = self
            .share_supply
            .checked_add(shares)
            .ok_or(LedgerError::MathOverflow)?;

        self.cash = cash;
        self.share_supply = share_supply;
        Ok(shares)
    }

    /// Burn shares and release the underlying they claim
    /// Underlying amounts round down, in favor of the pool.
    pub fn redeem_shares(&mut self, shares: u64) -> Result<u64> {
        require!(self.share_supply > 0, LedgerError::AmountTooSmall);
        require_gte!(self.share_supply, shares, LedgerError::InsufficientLiquidity);

        let supplied = self.supplied_value()?;
        let underlying = (shares as u128) * (supplied as u128) / self.share_supply as u128;
        // shares <= supply, so underlying <= supplied
        let underlying = underlying as u64;
        require!(underlying > 0, LedgerError::AmountTooSmall);
        require_gte!(self.cash, underlying, LedgerError::InsufficientLiquidity);

        let cash = self.cash - underlying;
        require_gte!(cash, self.revenue, LedgerError::InsufficientLiquidity);

        self.cash = cash;
        self.share_supply -= shares;
        Ok(underlying)
    }

    /// Take up to `requested` of the accrued revenue out of the market
    pub fn take_revenue(&mut self, requested: u64) -> Result<u64> {
        let actual = requested.min(self.revenue);
        require_gte!(self.cash, actual, LedgerError::InsufficientLiquidity);

        self.revenue -= actual;
        self.cash -= actual;
        Ok(actual)
    }

    /// Lend `amount` out for the duration of a flash loan
    pub fn lend_flash(&mut self, amount: u64) -> Result<()> {
        require_gte!(self.cash, amount, LedgerError::InsufficientLiquidity);
        require_gte!(self.cash - amount, self.revenue, LedgerError::InsufficientLiquidity);
        let flash_lent = self
            .flash_lent
            .checked_add(amount)
            .ok_or(LedgerError::MathOverflow)?;

        self.cash -= amount;
        self.flash_lent = flash_lent;
        Ok(())
    }

    /// Take a flash loan back; everything above the principal is revenue
    pub fn settle_flash(&mut self, returned: u64, loan_amount: u64) -> Result<()> {
        let excess = returned
            .checked_sub(loan_amount)
            .ok_or(LedgerError::InsufficientRepayment)?;
        let flash_lent = self
            .flash_lent
            .checked_sub(loan_amount)
            .ok_or(LedgerError::MathOverflow)?;
        let cash = self.cash.checked_add(returned).ok_or(LedgerError::MathOverflow)?;
        let revenue = self
            .revenue
            .checked_add(excess)
            .ok_or(LedgerError::MathOverflow)?;

        self.cash = cash;
        self.flash_lent = flash_lent;
        self.revenue = revenue;
        Ok(())
    }
}
