use anchor_lang::prelude::*;

use crate::state::{InterestModel, LimiterConfig, Market, Reserve, RiskModelParams};
use crate::errors::LedgerError;
use crate::events::{
    FlashLoanFeeChanged,
    ParameterChangeApplied,
    ParameterChangeProposed,
    ParameterKind,
};
use crate::instructions::unix_now;

/// Accounts for changing the parameters of one reserve
#[derive(Accounts)]
pub struct UpdateReserve<'info> {
    /// Authority of the market (must sign)
    pub authority: Signer<'info>,

    /// The market
    #[account(
        has_one = authority,
        seeds = [Market::SEED_PREFIX, authority.key().as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,

    /// The reserve to update
    #[account(
        mut,
        constraint = reserve.market == market.key() @ LedgerError::InvalidReserve,
        seeds = [Reserve::SEED_PREFIX, market.key().as_ref(), reserve.asset_mint.as_ref()],
        bump = reserve.bump
    )]
    pub reserve: Box<Account<'info, Reserve>>,
}

/// Set the flash loan fee; takes effect immediately
pub fn set_flash_loan_fee(ctx: Context<UpdateReserve>, flash_loan_fee: u64) -> Result<()> {
    let reserve = &mut ctx.accounts.reserve;
    reserve.set_flash_loan_fee(flash_loan_fee)?;

    emit!(FlashLoanFeeChanged {
        reserve: reserve.key(),
        flash_loan_fee,
    });

    msg!("Flash loan fee for {} set to {}", reserve.asset_mint, flash_loan_fee);

    Ok(())
}

// ----------------------------------------------------------------------------
// Timelocked changes
// ----------------------------------------------------------------------------

/// Queue a replacement interest model behind the market's change delay
///
/// A new proposal replaces any pending one.
pub fn propose_interest_model(ctx: Context<UpdateReserve>, model: InterestModel) -> Result<()> {
    let now = unix_now()?;
    let (delay, validity) = change_window(&ctx.accounts.market);
    let reserve = &mut ctx.accounts.reserve;

    reserve.propose_interest_model(model, now, delay, validity)?;
    emit_proposed(reserve, ParameterKind::InterestModel, now, delay, validity)
}

/// Apply the pending interest model once its delay has passed
pub fn apply_interest_model(ctx: Context<UpdateReserve>) -> Result<()> {
    let now = unix_now()?;
    let reserve = &mut ctx.accounts.reserve;

    let model = reserve.apply_interest_model(now)?;
    msg!(
        "Interest model for {} applied, rate now {}/{}",
        reserve.asset_mint,
        reserve.borrow_dynamic.current_rate,
        model.rate_scale
    );
    emit_applied(reserve, ParameterKind::InterestModel, now);
    Ok(())
}

pub fn propose_risk_model(ctx: Context<UpdateReserve>, params: RiskModelParams) -> Result<()> {
    let now = unix_now()?;
    let (delay, validity) = change_window(&ctx.accounts.market);
    let reserve = &mut ctx.accounts.reserve;

    reserve.propose_risk_model(params, now, delay, validity)?;
    emit_proposed(reserve, ParameterKind::RiskModel, now, delay, validity)
}

pub fn apply_risk_model(ctx: Context<UpdateReserve>) -> Result<()> {
    let now = unix_now()?;
    let reserve = &mut ctx.accounts.reserve;

    let model = reserve.apply_risk_model(now)?;
    msg!(
        "Risk model for {} applied: collateral factor {} bps, liquidation factor {} bps",
        reserve.asset_mint,
        model.collateral_factor_bps,
        model.liquidation_factor_bps
    );
    emit_applied(reserve, ParameterKind::RiskModel, now);
    Ok(())
}

pub fn propose_limiter_config(ctx: Context<UpdateReserve>, config: LimiterConfig) -> Result<()> {
    let now = unix_now()?;
    let (delay, validity) = change_window(&ctx.accounts.market);
    let reserve = &mut ctx.accounts.reserve;

    reserve.propose_limiter_config(config, now, delay, validity)?;
    emit_proposed(reserve, ParameterKind::Limiter, now, delay, validity)
}

pub fn apply_limiter_config(ctx: Context<UpdateReserve>) -> Result<()> {
    let now = unix_now()?;
    let reserve = &mut ctx.accounts.reserve;

    let config = reserve.apply_limiter_config(now)?;
    msg!(
        "Limiter for {} applied: {} per {}s in {}s segments",
        reserve.asset_mint,
        config.outflow_limit,
        config.cycle_duration,
        config.segment_duration
    );
    emit_applied(reserve, ParameterKind::Limiter, now);
    Ok(())
}

fn change_window(market: &Market) -> (u64, u64) {
    (market.change_delay, market.change_validity)
}

fn emit_proposed(
    reserve: &Account<'_, Reserve>,
    kind: ParameterKind,
    now: u64,
    delay: u64,
    validity: u64,
) -> Result<()> {
    let unlock_time = now.checked_add(delay).ok_or(LedgerError::MathOverflow)?;
    let expiry_time = unlock_time
        .checked_add(validity)
        .ok_or(LedgerError::MathOverflow)?;

    emit!(ParameterChangeProposed {
        reserve: reserve.key(),
        kind,
        unlock_time,
        expiry_time,
    });

    msg!("{:?} change proposed for {}", kind, reserve.asset_mint);
    msg!("Applicable from {} until {}", unlock_time, expiry_time);

    Ok(())
}

fn emit_applied(reserve: &Account<'_, Reserve>, kind: ParameterKind, now: u64) {
    emit!(ParameterChangeApplied {
        reserve: reserve.key(),
        kind,
        timestamp: now,
    });
}
