use anchor_lang::prelude::*;

use crate::constants::{
    BPS_DENOMINATOR,
    MAX_COLLATERAL_FACTOR_BPS,
    MAX_LIQUIDATION_DISCOUNT_BPS,
    MAX_LIQUIDATION_FACTOR_BPS,
    MAX_LIQUIDATION_PENALTY_BPS,
};
use crate::errors::LedgerError;

/// Risk parameters for an asset used as collateral
///
/// Read-only at runtime. The obligation layer values positions with it;
/// this ledger only guarantees that a stored model is self-consistent.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, InitSpace, Default, Debug, PartialEq, Eq)]
pub struct RiskModel {
    /// Borrow power granted per unit of collateral value (BPS)
    pub collateral_factor_bps: u16,

    /// Debt/collateral ratio at which liquidation starts (BPS)
    pub liquidation_factor_bps: u16,

    /// Total penalty charged to a liquidated position (BPS)
    pub liquidation_penalty_bps: u16,

    /// Part of the penalty paid to the liquidator (BPS)
    pub liquidation_discount_bps: u16,

    /// Part of the penalty kept as protocol revenue (BPS)
    /// Always `liquidation_penalty_bps - liquidation_discount_bps`
    pub liquidation_revenue_factor_bps: u16,

    /// Maximum amount of this asset accepted as collateral market-wide
    pub max_collateral_amount: u64,
}

/// Admin-supplied risk parameters, before derivation and validation
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug)]
pub struct RiskModelParams {
    pub collateral_factor_bps: u16,
    pub liquidation_factor_bps: u16,
    pub liquidation_penalty_bps: u16,
    pub liquidation_discount_bps: u16,
    pub max_collateral_amount: u64,
}

impl RiskModel {
    /// Build a risk model, rejecting any parameter set that could make a
    /// liquidation leave the position worse off
    pub fn new(params: RiskModelParams) -> Result<Self> {
        let cf = params.collateral_factor_bps as u64;
        let lf = params.liquidation_factor_bps as u64;
        let lp = params.liquidation_penalty_bps as u64;
        let ld = params.liquidation_discount_bps as u64;

        require!(cf <= MAX_COLLATERAL_FACTOR_BPS as u64, LedgerError::ParameterInvalid);
        require!(lf <= MAX_LIQUIDATION_FACTOR_BPS as u64, LedgerError::ParameterInvalid);
        require!(lp <= MAX_LIQUIDATION_PENALTY_BPS as u64, LedgerError::ParameterInvalid);
        require!(ld <= MAX_LIQUIDATION_DISCOUNT_BPS as u64, LedgerError::ParameterInvalid);

        require!(lf > cf, LedgerError::ParameterInvalid);
        require!(lp > ld, LedgerError::ParameterInvalid);
        require!(lf - cf > lp + ld, LedgerError::ParameterInvalid);
        require!(BPS_DENOMINATOR - lp > lf, LedgerError::ParameterInvalid);

        Ok(Self {
            collateral_factor_bps: params.collateral_factor_bps,
            liquidation_factor_bps: params.liquidation_factor_bps,
            liquidation_penalty_bps: params.liquidation_penalty_bps,
            liquidation_discount_bps: params.liquidation_discount_bps,
            liquidation_revenue_factor_bps: params.liquidation_penalty_bps
                - params.liquidation_discount_bps,
            max_collateral_amount: params.max_collateral_amount,
        })
    }
}
