use anchor_lang::prelude::*;

use crate::constants::{MAX_FLASH_LOAN_FEE, RESERVE_SEED};
use crate::errors::LedgerError;
use crate::state::{
    calculate_flash_loan_fee,
    take_ready,
    BalanceSheet,
    BorrowDynamic,
    FlashLoan,
    InterestModel,
    Limiter,
    LimiterConfig,
    RiskModel,
    RiskModelParams,
    TimelockedChange,
};

/// Per-asset shard of the market
/// PDA Seeds: ["reserve", market, asset_mint]
///
/// Holds every per-asset table under the asset's key: the balance sheet,
/// the accrual state, the interest and risk models, the outflow limiter and
/// the pending timelocked replacements for each parameter set.
#[account]
#[derive(InitSpace, Debug)]
pub struct Reserve {
    /// Version for future upgrades
    pub version: u8,

    /// Bump seed for PDA derivation
    pub bump: u8,

    /// The market this reserve belongs to
    pub market: Pubkey,

    /// Asset held by this reserve
    pub asset_mint: Pubkey,

    /// Token decimals (cached for the obligation layer)
    pub token_decimals: u8,

    /// Vault holding the reserve's cash (PDA-owned token account)
    pub vault: Pubkey,

    /// Mint of the interest-bearing shares
    pub share_mint: Pubkey,

    pub balance_sheet: BalanceSheet,

    pub borrow_dynamic: BorrowDynamic,

    pub interest_model: InterestModel,

    /// Present only when the asset may back borrows
    pub risk_model: Option<RiskModel>,

    pub limiter: Limiter,

    /// Flash loan fee over FLASH_LOAN_FEE_DENOMINATOR
    pub flash_loan_fee: u64,

    pub pending_interest_model: Option<TimelockedChange<InterestModel>>,

    pub pending_risk_model: Option<TimelockedChange<RiskModel>>,

    pub pending_limiter: Option<TimelockedChange<LimiterConfig>>,

    /// Reserved space for future upgrades (64 bytes)
    pub _padding: [u8; 64],
}

/// Addresses a reserve is bound to at registration
#[derive(Clone, Copy, Debug)]
pub struct ReserveKeys {
    pub market: Pubkey,
    pub asset_mint: Pubkey,
    pub vault: Pubkey,
    pub share_mint: Pubkey,
    pub token_decimals: u8,
    pub bump: u8,
}

/// Parameters a reserve is registered with
#[derive(Clone, Copy, Debug)]
pub struct ReserveParams {
    pub interest_model: InterestModel,
    pub risk_model: Option<RiskModelParams>,
    pub limiter: LimiterConfig,
    pub flash_loan_fee: u64,
}

impl Reserve {
    pub const SEED_PREFIX: &'static [u8] = RESERVE_SEED;

    /// Build a fresh reserve with a zeroed balance sheet
    pub fn new(keys: ReserveKeys, params: ReserveParams, now: u64) -> Result<Self> {
        params.interest_model.validate()?;
        let risk_model = params.risk_model.map(RiskModel::new).transpose()?;
        let limiter = Limiter::new(params.limiter)?;
        validate_flash_loan_fee(params.flash_loan_fee)?;

        Ok(Self {
            version: 1,
            bump: keys.bump,
            market: keys.market,
            asset_mint: keys.asset_mint,
            token_decimals: keys.token_decimals,
            vault: keys.vault,
            share_mint: keys.share_mint,
            balance_sheet: BalanceSheet::default(),
            borrow_dynamic: BorrowDynamic::new(&params.interest_model, now),
            interest_model: params.interest_model,
            risk_model,
            limiter,
            flash_loan_fee: params.flash_loan_fee,
            pending_interest_model: None,
            pending_risk_model: None,
            pending_limiter: None,
            _padding: [0u8; 64],
        })
    }

    /// Current utilization over the interest model's scale
    pub fn utilization(&self) -> u64 {
        self.balance_sheet.utilization(self.interest_model.rate_scale)
    }

    /// Accrue interest up to `now` and book the protocol's share
    /// Returns the index growth ratio (0 when already accrued at `now`).
    pub fn accrue(&mut self, now: u64) -> Result<u128> {
        let mut dynamic = self.borrow_dynamic;
        let mut sheet = self.balance_sheet;

        let growth = dynamic.accrue(&self.interest_model, self.utilization(), now)?;
        if growth > 0 {
            sheet.accrue_revenue(
                growth,
                self.interest_model.revenue_factor,
                self.interest_model.rate_scale,
            )?;
        }

        self.borrow_dynamic = dynamic;
        self.balance_sheet = sheet;
        self.refresh_rate();
        Ok(growth)
    }

    /// Recompute the borrow rate from the current utilization
    pub fn refresh_rate(&mut self) {
        let utilization = self.utilization();
        self.borrow_dynamic.refresh_rate(&self.interest_model, utilization);
    }

    /// Lend `amount` out and record it against the outflow limit
    pub fn borrow(&mut self, amount: u64, now: u64) -> Result<()> {
        require!(amount > 0, LedgerError::AmountTooSmall);
        require_gte!(amount, self.interest_model.min_borrow_amount, LedgerError::AmountTooSmall);

        let mut sheet = self.balance_sheet;
        sheet.borrow(amount)?;
        self.limiter.add_outflow(now, amount)?;

        self.balance_sheet = sheet;
        self.refresh_rate();
        Ok(())
    }

    /// Take a repayment; returns the part applied to debt
    pub fn repay(&mut self, amount: u64, now: u64) -> Result<u64> {
        require!(amount > 0, LedgerError::AmountTooSmall);

        let mut sheet = self.balance_sheet;
        let applied = sheet.repay(amount)?;
        self.limiter.reduce_outflow(now, amount)?;

        self.balance_sheet = sheet;
        self.refresh_rate();
        Ok(applied)
    }

    /// Book a liquidation repaid by the obligation layer
    pub fn liquidate(&mut self, repaid_principal: u64, repaid_revenue: u64, now: u64) -> Result<()> {
        let inflow = repaid_principal
            .checked_add(repaid_revenue)
            .ok_or(LedgerError::MathOverflow)?;
        require!(inflow > 0, LedgerError::AmountTooSmall);

        let mut sheet = self.balance_sheet;
        sheet.liquidate(repaid_principal, repaid_revenue)?;
        self.limiter.reduce_outflow(now, inflow)?;

        self.balance_sheet = sheet;
        self.refresh_rate();
        Ok(())
    }

    /// Deposit underlying; returns the shares to mint
    pub fn mint_shares(&mut self, underlying_amount: u64) -> Result<u64> {
        let shares = self.balance_sheet.mint_shares(underlying_amount)?;
        self.refresh_rate();
        Ok(shares)
    }

    /// Burn shares; returns the underlying to release
    pub fn redeem_shares(&mut self, shares: u64, now: u64) -> Result<u64> {
        let mut sheet = self.balance_sheet;
        let underlying = sheet.redeem_shares(shares)?;
        self.limiter.add_outflow(now, underlying)?;

        self.balance_sheet = sheet;
        self.refresh_rate();
        Ok(underlying)
    }

    /// Take up to `requested` revenue; returns what was taken
    pub fn take_revenue(&mut self, requested: u64) -> Result<u64> {
        let taken = self.balance_sheet.take_revenue(requested)?;
        self.refresh_rate();
        Ok(taken)
    }

    /// Lend `amount` until the end of the transaction
    pub fn borrow_flash_loan(&mut self, amount: u64) -> Result<FlashLoan> {
        require!(amount > 0, LedgerError::AmountTooSmall);

        let fee = calculate_flash_loan_fee(amount, self.flash_loan_fee)?;
        self.balance_sheet.lend_flash(amount)?;
        Ok(FlashLoan::new(self.asset_mint, amount, fee))
    }

    /// Settle a flash loan with `returned` units paid back
    ///
    /// This is the only way to dispose of a `FlashLoan`.
    pub fn repay_flash_loan(&mut self, returned: u64, loan: FlashLoan) -> Result<()> {
        require_keys_eq!(loan.asset_mint(), self.asset_mint, LedgerError::FlashLoanAssetMismatch);
        require_gte!(returned, loan.amount_due()?, LedgerError::InsufficientRepayment);

        let (_, loan_amount, _) = loan.into_parts();
        self.balance_sheet.settle_flash(returned, loan_amount)?;
        self.refresh_rate();
        Ok(())
    }

    pub fn set_flash_loan_fee(&mut self, fee: u64) -> Result<()> {
        validate_flash_loan_fee(fee)?;
        self.flash_loan_fee = fee;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Timelocked parameter replacement
    // ------------------------------------------------------------------------

    pub fn propose_interest_model(
        &mut self,
        model: InterestModel,
        now: u64,
        delay: u64,
        validity_window: u64,
    ) -> Result<()> {
        model.validate()?;
        self.pending_interest_model = Some(TimelockedChange::new(model, now, delay, validity_window));
        Ok(())
    }

    /// Swap in the pending interest model
    ///
    /// Interest up to `now` is accrued under the outgoing model first.
    pub fn apply_interest_model(&mut self, now: u64) -> Result<InterestModel> {
        self.pending_interest_model
            .as_ref()
            .ok_or(LedgerError::NoPendingChange)?
            .ensure_ready(now)?;

        self.accrue(now)?;
        let model = take_ready(&mut self.pending_interest_model, now)?;
        self.interest_model = model;
        self.refresh_rate();
        Ok(model)
    }

    pub fn propose_risk_model(
        &mut self,
        params: RiskModelParams,
        now: u64,
        delay: u64,
        validity_window: u64,
    ) -> Result<()> {
        let model = RiskModel::new(params)?;
        self.pending_risk_model = Some(TimelockedChange::new(model, now, delay, validity_window));
        Ok(())
    }

    pub fn apply_risk_model(&mut self, now: u64) -> Result<RiskModel> {
        let model = take_ready(&mut self.pending_risk_model, now)?;
        self.risk_model = Some(model);
        Ok(model)
    }

    pub fn propose_limiter_config(
        &mut self,
        config: LimiterConfig,
        now: u64,
        delay: u64,
        validity_window: u64,
    ) -> Result<()> {
        config.validate()?;
        self.pending_limiter = Some(TimelockedChange::new(config, now, delay, validity_window));
        Ok(())
    }

    /// Apply the pending limiter config
    /// A change of cycle or segment length forgets all recorded outflow.
    pub fn apply_limiter_config(&mut self, now: u64) -> Result<LimiterConfig> {
        let change = self
            .pending_limiter
            .as_ref()
            .ok_or(LedgerError::NoPendingChange)?;
        change.ensure_ready(now)?;

        let mut limiter = self.limiter.clone();
        limiter.apply_config(change.value)?;

        let config = take_ready(&mut self.pending_limiter, now)?;
        self.limiter = limiter;
        Ok(config)
    }
}

fn validate_flash_loan_fee(fee: u64) -> Result<()> {
    require_gte!(MAX_FLASH_LOAN_FEE, fee, LedgerError::ParameterInvalid);
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::constants::{INDEX_ONE, SECONDS_PER_YEAR};

    pub const SCALE: u64 = 10_000;
    const DAY: u64 = 86_400;

    pub fn interest_model() -> InterestModel {
        InterestModel {
            base_rate: 200,
            rate_at_mid_kink: 1_000,
            mid_kink: 6_000,
            rate_at_high_kink: 3_000,
            high_kink: 9_000,
            max_rate: 15_000,
            revenue_factor: 2_000,
            borrow_weight: SCALE,
            min_borrow_amount: 10,
            rate_scale: SCALE,
        }
    }

    pub fn reserve_with(market: Pubkey, asset_mint: Pubkey, now: u64) -> Reserve {
        let keys = ReserveKeys {
            market,
            asset_mint,
            vault: Pubkey::new_unique(),
            share_mint: Pubkey::new_unique(),
            token_decimals: 6,
            bump: 255,
        };
        let params = ReserveParams {
            interest_model: interest_model(),
            risk_model: Some(RiskModelParams {
                collateral_factor_bps: 7_000,
                liquidation_factor_bps: 8_000,
                liquidation_penalty_bps: 500,
                liquidation_discount_bps: 400,
                max_collateral_amount: u64::MAX,
            }),
            limiter: LimiterConfig {
                outflow_limit: 10_000_000,
                cycle_duration: DAY,
                segment_duration: 1_800,
            },
            flash_loan_fee: 10,
        };
        Reserve::new(keys, params, now).unwrap()
    }

    fn reserve() -> Reserve {
        reserve_with(Pubkey::new_unique(), Pubkey::new_unique(), 0)
    }

    fn assert_covered(reserve: &Reserve) {
        let sheet = &reserve.balance_sheet;
        assert!(sheet.cash as u128 + sheet.debt as u128 >= sheet.revenue as u128);
    }

    #[test]
    fn registration_starts_zeroed() {
        let r = reserve();
        assert_eq!(r.balance_sheet, BalanceSheet::default());
        assert_eq!(r.borrow_dynamic.borrow_index, INDEX_ONE);
        assert_eq!(r.borrow_dynamic.current_rate, 200);
        assert_eq!(r.limiter.segments.len(), 48);
        assert!(r.risk_model.is_some());
    }

    #[test]
    fn registration_rejects_invalid_risk_model() {
        let keys = ReserveKeys {
            market: Pubkey::new_unique(),
            asset_mint: Pubkey::new_unique(),
            vault: Pubkey::new_unique(),
            share_mint: Pubkey::new_unique(),
            token_decimals: 9,
            bump: 254,
        };
        let params = ReserveParams {
            interest_model: interest_model(),
            risk_model: Some(RiskModelParams {
                collateral_factor_bps: 7_000,
                liquidation_factor_bps: 6_900,
                liquidation_penalty_bps: 500,
                liquidation_discount_bps: 400,
                max_collateral_amount: 0,
            }),
            limiter: LimiterConfig {
                outflow_limit: 1,
                cycle_duration: DAY,
                segment_duration: 1_800,
            },
            flash_loan_fee: 0,
        };
        assert_eq!(
            Reserve::new(keys, params, 0).unwrap_err(),
            LedgerError::ParameterInvalid.into()
        );
    }

    #[test]
    fn borrow_updates_rate_and_outflow() {
        let mut r = reserve();
        r.mint_shares(1_000).unwrap();
        r.borrow(700, 100).unwrap();

        assert_eq!(r.utilization(), 7_000);
        // 7000 lies between the kinks: 1000 + (1000 / 3000) * 2000
        assert_eq!(r.borrow_dynamic.current_rate, 1_666);
        assert_eq!(r.limiter.current_outflow(100), 700);
    }

    #[test]
    fn borrow_below_minimum_is_rejected() {
        let mut r = reserve();
        r.mint_shares(1_000).unwrap();
        assert_eq!(r.borrow(9, 0).unwrap_err(), LedgerError::AmountTooSmall.into());
    }

    #[test]
    fn borrow_over_outflow_limit_leaves_state_untouched() {
        let mut r = reserve();
        r.limiter.outflow_limit = 500;
        r.mint_shares(1_000).unwrap();
        let before = r.balance_sheet;

        assert_eq!(r.borrow(600, 0).unwrap_err(), LedgerError::LimitExceeded.into());
        assert_eq!(r.balance_sheet, before);
        assert_eq!(r.limiter.current_outflow(0), 0);
    }

    #[test]
    fn borrow_without_liquidity_leaves_limiter_untouched() {
        let mut r = reserve();
        r.mint_shares(100).unwrap();
        assert_eq!(
            r.borrow(200, 0).unwrap_err(),
            LedgerError::InsufficientLiquidity.into()
        );
        assert_eq!(r.limiter.current_outflow(0), 0);
    }

    #[test]
    fn repay_reduces_outflow() {
        let mut r = reserve();
        r.mint_shares(1_000).unwrap();
        r.borrow(700, 0).unwrap();
        assert_eq!(r.repay(300, 0).unwrap(), 300);
        assert_eq!(r.limiter.current_outflow(0), 400);
        assert_eq!(r.balance_sheet.debt, 400);
    }

    #[test]
    fn redeem_counts_as_outflow() {
        let mut r = reserve();
        r.limiter.outflow_limit = 600;
        let shares = r.mint_shares(1_000).unwrap();
        assert_eq!(r.redeem_shares(500, 0).unwrap(), 500);
        assert_eq!(
            r.redeem_shares(shares - 500, 0).unwrap_err(),
            LedgerError::LimitExceeded.into()
        );
        assert_eq!(r.balance_sheet.share_supply, 500);
    }

    #[test]
    fn accrue_grows_debt_and_revenue() {
        let mut r = reserve();
        r.mint_shares(1_000_000).unwrap();
        r.borrow(600_000, 0).unwrap();

        // 60% utilization sits on the mid kink: 10% a year
        let growth = r.accrue(SECONDS_PER_YEAR).unwrap();
        assert_eq!(growth, INDEX_ONE / 10);
        assert_eq!(r.balance_sheet.debt, 660_000);
        assert_eq!(r.balance_sheet.revenue, 12_000);
        assert_covered(&r);
    }

    #[test]
    fn accrue_twice_at_same_time_changes_nothing() {
        let mut r = reserve();
        r.mint_shares(1_000_000).unwrap();
        r.borrow(600_000, 0).unwrap();
        r.accrue(DAY).unwrap();

        let sheet = r.balance_sheet;
        let dynamic = r.borrow_dynamic;
        assert_eq!(r.accrue(DAY).unwrap(), 0);
        assert_eq!(r.balance_sheet, sheet);
        assert_eq!(r.borrow_dynamic, dynamic);
    }

    #[test]
    fn share_price_rises_with_interest() {
        let mut r = reserve();
        r.mint_shares(1_000_000).unwrap();
        r.borrow(600_000, 0).unwrap();
        r.accrue(SECONDS_PER_YEAR).unwrap();
        r.repay(660_000, SECONDS_PER_YEAR).unwrap();

        // 1M shares now claim 1M + 60k interest - 12k revenue
        let underlying = r.redeem_shares(1_000_000, SECONDS_PER_YEAR).unwrap();
        assert_eq!(underlying, 1_048_000);
        assert_eq!(r.balance_sheet.cash, r.balance_sheet.revenue);
    }

    #[test]
    fn liquidate_books_revenue_and_inflow() {
        let mut r = reserve();
        r.mint_shares(1_000).unwrap();
        r.borrow(800, 0).unwrap();
        r.liquidate(300, 15, 0).unwrap();

        assert_eq!(r.balance_sheet.debt, 500);
        assert_eq!(r.balance_sheet.revenue, 15);
        assert_eq!(r.balance_sheet.cash, 515);
        assert_eq!(r.limiter.current_outflow(0), 485);
    }

    #[test]
    fn take_revenue_reduces_cash_and_revenue() {
        let mut r = reserve();
        r.mint_shares(1_000).unwrap();
        r.borrow(800, 0).unwrap();
        r.liquidate(300, 15, 0).unwrap();

        assert_eq!(r.take_revenue(100).unwrap(), 15);
        assert_eq!((r.balance_sheet.cash, r.balance_sheet.revenue), (500, 0));
    }

    #[test]
    fn flash_loan_scenario() {
        let mut r = reserve();
        r.mint_shares(10_000).unwrap();

        let loan = r.borrow_flash_loan(10_000).unwrap();
        assert_eq!(loan.fee(), 10);
        assert_eq!(r.balance_sheet.cash, 0);

        // Short repayment fails and keeps the books untouched
        let before = r.balance_sheet;
        let err = r.repay_flash_loan(9_999, loan).unwrap_err();
        assert_eq!(err, LedgerError::InsufficientRepayment.into());
        assert_eq!(r.balance_sheet, before);

        // A fresh loan is needed: the failed repay consumed the old one
        let mut r = reserve();
        r.mint_shares(10_000).unwrap();
        let loan = r.borrow_flash_loan(10_000).unwrap();
        r.repay_flash_loan(10_010, loan).unwrap();
        assert_eq!(r.balance_sheet.cash, 10_010);
        assert_eq!(r.balance_sheet.revenue, 10);
    }

    #[test]
    fn flash_loan_cannot_settle_another_asset() {
        let mut a = reserve();
        let mut b = reserve();
        a.mint_shares(1_000).unwrap();
        b.mint_shares(1_000).unwrap();

        let loan = a.borrow_flash_loan(100).unwrap();
        assert_eq!(
            b.repay_flash_loan(1_000, loan).unwrap_err(),
            LedgerError::FlashLoanAssetMismatch.into()
        );
    }

    #[test]
    fn flash_loan_requires_cash() {
        let mut r = reserve();
        r.mint_shares(100).unwrap();
        assert_eq!(
            r.borrow_flash_loan(101).unwrap_err(),
            LedgerError::InsufficientLiquidity.into()
        );
        assert_eq!(
            r.borrow_flash_loan(0).unwrap_err(),
            LedgerError::AmountTooSmall.into()
        );
    }

    #[test]
    fn shares_are_priced_the_same_while_a_flash_loan_is_open() {
        let mut r = reserve();
        r.mint_shares(1_000_000).unwrap();
        let supplied = r.balance_sheet.supplied_value().unwrap();

        let loan = r.borrow_flash_loan(990_000).unwrap();
        assert_eq!(loan.fee(), 990);
        assert_eq!(r.balance_sheet.supplied_value().unwrap(), supplied);

        // Minting against the drained vault still pays the full price
        let shares = r.mint_shares(10_000).unwrap();
        assert_eq!(shares, 10_000);

        r.repay_flash_loan(990_990, loan).unwrap();
        assert_eq!(r.balance_sheet.revenue, 990);
        assert_eq!(r.balance_sheet.supplied_value().unwrap(), supplied + 10_000);

        // The round trip returns what was paid in, nothing more
        assert_eq!(r.redeem_shares(shares, 0).unwrap(), 10_000);
        assert_eq!(r.balance_sheet.supplied_value().unwrap(), supplied);
        assert_covered(&r);
    }

    #[test]
    fn redeem_during_a_flash_loan_pays_the_full_price() {
        let mut r = reserve();
        r.mint_shares(100_000).unwrap();

        let loan = r.borrow_flash_loan(50_000).unwrap();
        assert_eq!(r.redeem_shares(10_000, 0).unwrap(), 10_000);

        r.repay_flash_loan(loan.amount_due().unwrap(), loan).unwrap();
        assert_eq!(r.balance_sheet.flash_lent, 0);
        assert_eq!(r.balance_sheet.share_supply, 90_000);
        assert_eq!(r.balance_sheet.supplied_value().unwrap(), 90_000);
    }

    #[test]
    fn interest_model_swap_waits_for_timelock() {
        let mut r = reserve();
        r.mint_shares(1_000_000).unwrap();
        r.borrow(600_000, 0).unwrap();

        let new_model = InterestModel {
            base_rate: 500,
            ..interest_model()
        };
        r.propose_interest_model(new_model, 0, DAY, DAY).unwrap();

        assert_eq!(
            r.apply_interest_model(DAY - 1).unwrap_err(),
            LedgerError::ChangeNotReady.into()
        );
        assert_eq!(r.interest_model, interest_model());
        assert_eq!(r.borrow_dynamic.last_accrual_time, 0);

        assert_eq!(r.apply_interest_model(DAY).unwrap(), new_model);
        assert_eq!(r.interest_model, new_model);
        assert!(r.pending_interest_model.is_none());
        // Interest for the elapsed day was charged under the old model
        assert_eq!(r.borrow_dynamic.last_accrual_time, DAY);
        assert!(r.balance_sheet.debt > 600_000);
    }

    #[test]
    fn proposals_are_validated_up_front() {
        let mut r = reserve();
        let bad_model = InterestModel {
            mid_kink: 9_500,
            ..interest_model()
        };
        assert!(r.propose_interest_model(bad_model, 0, DAY, DAY).is_err());
        assert!(r.pending_interest_model.is_none());

        let bad_limiter = LimiterConfig {
            outflow_limit: 1,
            cycle_duration: DAY,
            segment_duration: 7,
        };
        assert!(r.propose_limiter_config(bad_limiter, 0, DAY, DAY).is_err());
        assert!(r.pending_limiter.is_none());
    }

    #[test]
    fn risk_model_swap_expires() {
        let mut r = reserve();
        let params = RiskModelParams {
            collateral_factor_bps: 6_000,
            liquidation_factor_bps: 7_500,
            liquidation_penalty_bps: 800,
            liquidation_discount_bps: 500,
            max_collateral_amount: 1_000,
        };
        r.propose_risk_model(params, 0, DAY, DAY).unwrap();
        assert_eq!(
            r.apply_risk_model(3 * DAY).unwrap_err(),
            LedgerError::ChangeExpired.into()
        );
        assert!(r.pending_risk_model.is_some());

        r.propose_risk_model(params, 3 * DAY, DAY, DAY).unwrap();
        let applied = r.apply_risk_model(4 * DAY).unwrap();
        assert_eq!(applied.liquidation_revenue_factor_bps, 300);
        assert_eq!(r.risk_model, Some(applied));
    }

    #[test]
    fn limiter_reconfiguration_forgets_history() {
        let mut r = reserve();
        let config = LimiterConfig {
            outflow_limit: 1_000_000,
            cycle_duration: 2 * DAY,
            segment_duration: 3_600,
        };
        r.propose_limiter_config(config, 0, 0, DAY).unwrap();

        r.mint_shares(2_000_000).unwrap();
        r.borrow(900_000, 0).unwrap();
        assert_eq!(r.limiter.current_outflow(0), 900_000);

        assert_eq!(r.apply_limiter_config(0).unwrap(), config);
        assert_eq!(r.limiter.segments.len(), 48);
        assert_eq!(r.limiter.current_outflow(0), 0);
        r.borrow(1_000_000, 0).unwrap();
    }

    #[test]
    fn flash_loan_fee_is_capped() {
        let mut r = reserve();
        assert!(r.set_flash_loan_fee(MAX_FLASH_LOAN_FEE).is_ok());
        assert_eq!(
            r.set_flash_loan_fee(MAX_FLASH_LOAN_FEE + 1).unwrap_err(),
            LedgerError::ParameterInvalid.into()
        );
    }

    #[test]
    fn revenue_stays_covered_through_a_session() {
        let mut r = reserve();
        let mut now = 0;
        r.mint_shares(500_000).unwrap();
        for step in 0..20u64 {
            now += 3_600;
            r.accrue(now).unwrap();
            if step % 3 == 0 {
                let _ = r.borrow(40_000, now);
            }
            if step % 4 == 1 {
                let _ = r.repay(25_000, now);
            }
            if step % 5 == 2 {
                let _ = r.redeem_shares(10_000, now);
            }
            if step % 7 == 3 {
                let _ = r.take_revenue(50);
            }
            assert_covered(&r);
            assert!(r.balance_sheet.cash >= r.balance_sheet.revenue);
        }
    }
}
