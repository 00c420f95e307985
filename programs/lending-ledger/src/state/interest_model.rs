use anchor_lang::prelude::*;

use crate::errors::LedgerError;

/// Kinked interest rate model for a borrowable asset
///
/// Every fraction (kinks, rates, revenue factor, borrow weight) is a
/// numerator over `rate_scale`. Rates are annualized.
///
/// A model is never edited in place; it is replaced wholesale through a
/// timelocked change.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, InitSpace, Default, Debug, PartialEq, Eq)]
pub struct InterestModel {
    /// Rate at 0% utilization
    pub base_rate: u64,

    /// Rate reached at `mid_kink` utilization
    pub rate_at_mid_kink: u64,

    /// First kink (utilization)
    pub mid_kink: u64,

    /// Rate reached at `high_kink` utilization
    pub rate_at_high_kink: u64,

    /// Second kink (utilization)
    pub high_kink: u64,

    /// Rate at 100% utilization
    pub max_rate: u64,

    /// Share of newly accrued interest kept as protocol revenue
    pub revenue_factor: u64,

    /// Risk weight applied to debt by the obligation layer (>= 1.0)
    pub borrow_weight: u64,

    /// Smallest amount a single borrow may take
    pub min_borrow_amount: u64,

    /// Fixed-point denominator for every fraction above
    pub rate_scale: u64,
}

impl InterestModel {
    /// Check the creation invariants of the model
    pub fn validate(&self) -> Result<()> {
        require!(self.rate_scale > 0, LedgerError::ParameterInvalid);

        // Kinks are utilizations within [0, 1]
        require!(self.mid_kink <= self.high_kink, LedgerError::ParameterInvalid);
        require!(self.high_kink <= self.rate_scale, LedgerError::ParameterInvalid);

        // Rates never decrease along the curve
        require!(self.base_rate <= self.rate_at_mid_kink, LedgerError::ParameterInvalid);
        require!(self.rate_at_mid_kink <= self.rate_at_high_kink, LedgerError::ParameterInvalid);
        require!(self.rate_at_high_kink <= self.max_rate, LedgerError::ParameterInvalid);

        require!(self.revenue_factor <= self.rate_scale, LedgerError::ParameterInvalid);
        require!(self.borrow_weight >= self.rate_scale, LedgerError::ParameterInvalid);

        Ok(())
    }

    /// Calculate the borrow rate for a utilization
    /// Returns `(rate, rate_scale)`
    ///
    /// Utilization above 100% is treated as 100%. A zero-width segment
    /// yields the rate at its upper end.
    pub fn borrow_rate(&self, utilization: u64) -> (u64, u64) {
        let utilization = utilization.min(self.rate_scale);

        let rate = if utilization <= self.mid_kink {
            interpolate(
                utilization,
                0,
                self.mid_kink,
                self.base_rate,
                self.rate_at_mid_kink,
            )
        } else if utilization <= self.high_kink {
            interpolate(
                utilization,
                self.mid_kink,
                self.high_kink,
                self.rate_at_mid_kink,
                self.rate_at_high_kink,
            )
        } else {
            interpolate(
                utilization,
                self.high_kink,
                self.rate_scale,
                self.rate_at_high_kink,
                self.max_rate,
            )
        };

        (rate, self.rate_scale)
    }
}

/// Linear interpolation of a rate between two utilization points
///
/// `x` must lie in `[x0, x1]` and `y0 <= y1`, which `validate` guarantees.
fn interpolate(x: u64, x0: u64, x1: u64, y0: u64, y1: u64) -> u64 {
    let width = x1.saturating_sub(x0);
    if width == 0 {
        return y1;
    }

    let rise = (x.saturating_sub(x0) as u128) * (y1.saturating_sub(y0) as u128) / width as u128;
    // rise <= y1 - y0, so the sum fits in u64
    y0 + rise as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALE: u64 = 10_000;

    fn model() -> InterestModel {
        InterestModel {
            base_rate: 200,
            rate_at_mid_kink: 1_000,
            mid_kink: 6_000,
            rate_at_high_kink: 3_000,
            high_kink: 9_000,
            max_rate: 15_000,
            revenue_factor: 2_000,
            borrow_weight: SCALE,
            min_borrow_amount: 1_000,
            rate_scale: SCALE,
        }
    }

    #[test]
    fn rate_at_curve_anchors() {
        let m = model();
        assert_eq!(m.borrow_rate(0), (200, SCALE));
        assert_eq!(m.borrow_rate(6_000), (1_000, SCALE));
        assert_eq!(m.borrow_rate(9_000), (3_000, SCALE));
        assert_eq!(m.borrow_rate(SCALE), (15_000, SCALE));
    }

    #[test]
    fn rate_interpolates_each_segment() {
        let m = model();
        // Halfway to the mid kink: 200 + 0.5 * 800
        assert_eq!(m.borrow_rate(3_000).0, 600);
        // Halfway between the kinks: 1000 + 0.5 * 2000
        assert_eq!(m.borrow_rate(7_500).0, 2_000);
        // Halfway above the high kink: 3000 + 0.5 * 12000
        assert_eq!(m.borrow_rate(9_500).0, 9_000);
    }

    #[test]
    fn rate_is_monotonic_in_utilization() {
        let m = model();
        let mut last = 0;
        for u in (0..=SCALE).step_by(125) {
            let (rate, _) = m.borrow_rate(u);
            assert!(rate >= last, "rate dropped at utilization {}", u);
            last = rate;
        }
    }

    #[test]
    fn utilization_above_one_is_clamped() {
        let m = model();
        assert_eq!(m.borrow_rate(SCALE * 3), (m.max_rate, SCALE));
    }

    #[test]
    fn zero_width_segments_do_not_divide_by_zero() {
        let m = InterestModel {
            mid_kink: 0,
            high_kink: SCALE,
            ..model()
        };
        assert!(m.validate().is_ok());
        assert_eq!(m.borrow_rate(0).0, m.rate_at_mid_kink);
        assert_eq!(m.borrow_rate(SCALE).0, m.rate_at_high_kink);
    }

    #[test]
    fn validate_accepts_well_formed_model() {
        assert!(model().validate().is_ok());
    }

    #[test]
    fn validate_rejects_crossed_kinks() {
        let m = InterestModel {
            mid_kink: 9_500,
            ..model()
        };
        assert_eq!(m.validate().unwrap_err(), LedgerError::ParameterInvalid.into());
    }

    #[test]
    fn validate_rejects_decreasing_rates() {
        let cases = [
            InterestModel { base_rate: 1_500, ..model() },
            InterestModel { rate_at_high_kink: 900, ..model() },
            InterestModel { max_rate: 2_000, ..model() },
        ];
        for m in cases {
            assert_eq!(m.validate().unwrap_err(), LedgerError::ParameterInvalid.into());
        }
    }

    #[test]
    fn validate_rejects_out_of_range_fractions() {
        let cases = [
            InterestModel { rate_scale: 0, ..model() },
            InterestModel { high_kink: SCALE + 1, ..model() },
            InterestModel { revenue_factor: SCALE + 1, ..model() },
            InterestModel { borrow_weight: SCALE - 1, ..model() },
        ];
        for m in cases {
            assert_eq!(m.validate().unwrap_err(), LedgerError::ParameterInvalid.into());
        }
    }
}
