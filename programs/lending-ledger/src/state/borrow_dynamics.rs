use anchor_lang::prelude::*;

use crate::constants::{INDEX_ONE, SECONDS_PER_YEAR};
use crate::errors::LedgerError;
use crate::state::InterestModel;

/// Per-asset borrow index and accrual clock
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, InitSpace, Default, Debug, PartialEq, Eq)]
pub struct BorrowDynamic {
    /// Cumulative borrow index (scaled by 10^18)
    /// Starts at 1e18 and never decreases
    pub borrow_index: u128,

    /// Annualized borrow rate currently in effect
    pub current_rate: u64,

    /// Denominator of `current_rate`
    pub rate_scale: u64,

    /// Unix timestamp of the last accrual
    pub last_accrual_time: u64,
}

impl BorrowDynamic {
    pub fn new(model: &InterestModel, now: u64) -> Self {
        let (current_rate, rate_scale) = model.borrow_rate(0);
        Self {
            borrow_index: INDEX_ONE,
            current_rate,
            rate_scale,
            last_accrual_time: now,
        }
    }

    /// Advance the borrow index to `now`
    ///
    /// Interest is simple within one accrual interval and compounds across
    /// intervals:
    ///   growth    = rate * elapsed / (rate_scale * SECONDS_PER_YEAR)
    ///   new_index = old_index * (1 + growth)
    ///
    /// Returns the index growth ratio (`new_index / old_index - 1`, scaled by
    /// 10^18). A second call with the same `now` changes nothing and
    /// returns 0.
    pub fn accrue(&mut self, model: &InterestModel, utilization: u64, now: u64) -> Result<u128> {
        require_gte!(now, self.last_accrual_time, LedgerError::TimestampRegressed);

        let elapsed = now - self.last_accrual_time;
        if elapsed == 0 {
            return Ok(0);
        }

        let (rate, rate_scale) = model.borrow_rate(utilization);
        let growth = calculate_growth_ratio(rate, rate_scale, elapsed)?;

        let index_increase = self
            .borrow_index
            .checked_mul(growth)
            .ok_or(LedgerError::MathOverflow)?
            / INDEX_ONE;
        let new_index = self
            .borrow_index
            .checked_add(index_increase)
            .ok_or(LedgerError::MathOverflow)?;

        self.borrow_index = new_index;
        self.current_rate = rate;
        self.rate_scale = rate_scale;
        self.last_accrual_time = now;

        Ok(growth)
    }

    /// Record the rate implied by the latest utilization
    pub fn refresh_rate(&mut self, model: &InterestModel, utilization: u64) {
        let (rate, rate_scale) = model.borrow_rate(utilization);
        self.current_rate = rate;
        self.rate_scale = rate_scale;
    }
}

/// Calculate the index growth over `elapsed` seconds (scaled by 10^18)
fn calculate_growth_ratio(rate: u64, rate_scale: u64, elapsed: u64) -> Result<u128> {
    let denominator = (rate_scale as u128)
        .checked_mul(SECONDS_PER_YEAR as u128)
        .ok_or(LedgerError::MathOverflow)?;
    require!(denominator > 0, LedgerError::ParameterInvalid);

    let growth = (rate as u128)
        .checked_mul(elapsed as u128)
        .and_then(|v| v.checked_mul(INDEX_ONE))
        .ok_or(LedgerError::MathOverflow)?
        / denominator;

    Ok(growth)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALE: u64 = 10_000;

    /// Flat 10% annual rate regardless of utilization
    fn flat_model() -> InterestModel {
        InterestModel {
            base_rate: 1_000,
            rate_at_mid_kink: 1_000,
            mid_kink: 5_000,
            rate_at_high_kink: 1_000,
            high_kink: 8_000,
            max_rate: 1_000,
            revenue_factor: 1_000,
            borrow_weight: SCALE,
            min_borrow_amount: 1,
            rate_scale: SCALE,
        }
    }

    #[test]
    fn new_starts_at_index_one() {
        let dynamic = BorrowDynamic::new(&flat_model(), 100);
        assert_eq!(dynamic.borrow_index, INDEX_ONE);
        assert_eq!(dynamic.last_accrual_time, 100);
        assert_eq!(dynamic.current_rate, 1_000);
        assert_eq!(dynamic.rate_scale, SCALE);
    }

    #[test]
    fn accrue_one_year_at_ten_percent() {
        let mut dynamic = BorrowDynamic::new(&flat_model(), 0);
        let growth = dynamic.accrue(&flat_model(), 5_000, SECONDS_PER_YEAR).unwrap();

        assert_eq!(growth, INDEX_ONE / 10);
        assert_eq!(dynamic.borrow_index, INDEX_ONE + INDEX_ONE / 10);
        assert_eq!(dynamic.last_accrual_time, SECONDS_PER_YEAR);
    }

    #[test]
    fn accrual_sequence_compounds_across_intervals() {
        let model = flat_model();
        let mut dynamic = BorrowDynamic::new(&model, 0);
        let half_year = SECONDS_PER_YEAR / 2;

        // Each half year grows the index by exactly 5% of its current value
        let first = dynamic.accrue(&model, 5_000, half_year).unwrap();
        assert_eq!(first, INDEX_ONE / 20);
        assert_eq!(dynamic.borrow_index, 1_050_000_000_000_000_000);

        let second = dynamic.accrue(&model, 5_000, 2 * half_year).unwrap();
        assert_eq!(second, INDEX_ONE / 20);
        assert_eq!(dynamic.borrow_index, 1_102_500_000_000_000_000);

        // Compounding twice beats a single yearly interval
        let mut yearly = BorrowDynamic::new(&model, 0);
        yearly.accrue(&model, 5_000, 2 * half_year).unwrap();
        assert!(dynamic.borrow_index > yearly.borrow_index);
    }

    #[test]
    fn accrue_twice_at_same_time_is_a_no_op() {
        let model = flat_model();
        let mut dynamic = BorrowDynamic::new(&model, 0);
        dynamic.accrue(&model, 5_000, 3_600).unwrap();
        let snapshot = dynamic;

        let growth = dynamic.accrue(&model, 9_000, 3_600).unwrap();
        assert_eq!(growth, 0);
        assert_eq!(dynamic, snapshot);
    }

    #[test]
    fn index_never_decreases() {
        let model = InterestModel {
            base_rate: 0,
            ..flat_model()
        };
        let mut dynamic = BorrowDynamic::new(&model, 0);
        let mut last = dynamic.borrow_index;
        for (step, utilization) in [0u64, 2_000, 10_000, 0, 7_000].iter().enumerate() {
            dynamic.accrue(&model, *utilization, (step as u64 + 1) * 86_400).unwrap();
            assert!(dynamic.borrow_index >= last);
            last = dynamic.borrow_index;
        }
    }

    #[test]
    fn accrue_rejects_time_going_backwards() {
        let model = flat_model();
        let mut dynamic = BorrowDynamic::new(&model, 1_000);
        let err = dynamic.accrue(&model, 0, 999).unwrap_err();
        assert_eq!(err, LedgerError::TimestampRegressed.into());
        assert_eq!(dynamic.last_accrual_time, 1_000);
    }
}
