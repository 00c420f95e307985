use anchor_lang::prelude::*;

// ============================================================================
// MARKET EVENTS
// ============================================================================

/// Emitted when a new market is initialized
#[event]
pub struct MarketInitialized {
    pub market: Pubkey,
    pub authority: Pubkey,
    pub borrow_authority: Pubkey,
    pub treasury: Pubkey,
    pub change_delay: u64,
    pub change_validity: u64,
}

/// Emitted when an asset is registered
#[event]
pub struct AssetRegistered {
    pub market: Pubkey,
    pub reserve: Pubkey,
    pub asset_mint: Pubkey,
    pub share_mint: Pubkey,
    pub collateral_active: bool,
}

/// Emitted when an asset's access flags change
#[event]
pub struct AssetFlagsChanged {
    pub market: Pubkey,
    pub asset_mint: Pubkey,
    pub base_active: bool,
    pub collateral_active: bool,
}

// ============================================================================
// PARAMETER EVENTS
// ============================================================================

/// Which parameter set a timelocked change targets
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterKind {
    InterestModel,
    RiskModel,
    Limiter,
}

/// Emitted when a parameter change is proposed
#[event]
pub struct ParameterChangeProposed {
    pub reserve: Pubkey,
    pub kind: ParameterKind,
    pub unlock_time: u64,
    pub expiry_time: u64,
}

/// Emitted when a pending parameter change is applied
#[event]
pub struct ParameterChangeApplied {
    pub reserve: Pubkey,
    pub kind: ParameterKind,
    pub timestamp: u64,
}

/// Emitted when the flash loan fee of a reserve changes
#[event]
pub struct FlashLoanFeeChanged {
    pub reserve: Pubkey,
    pub flash_loan_fee: u64,
}

// ============================================================================
// RESERVE EVENTS
// ============================================================================

/// Emitted for each reserve when interest is accrued
#[event]
pub struct InterestAccrued {
    pub reserve: Pubkey,
    pub borrow_index: u128,
    pub current_rate: u64,
    pub debt: u64,
    pub revenue: u64,
    pub timestamp: u64,
}

/// Emitted when underlying is supplied for shares
#[event]
pub struct SharesMinted {
    pub reserve: Pubkey,
    pub owner: Pubkey,
    pub underlying_amount: u64,
    pub shares: u64,
    pub timestamp: u64,
}

/// Emitted when shares are redeemed for underlying
#[event]
pub struct SharesRedeemed {
    pub reserve: Pubkey,
    pub owner: Pubkey,
    pub shares: u64,
    pub underlying_amount: u64,
    pub timestamp: u64,
}

/// Emitted when liquidity is borrowed
#[event]
pub struct Borrowed {
    pub reserve: Pubkey,
    pub amount: u64,
    pub new_utilization: u64,
    pub new_rate: u64,
    pub timestamp: u64,
}

/// Emitted when debt is repaid
#[event]
pub struct Repaid {
    pub reserve: Pubkey,
    pub payer: Pubkey,
    pub amount: u64,
    pub applied_to_debt: u64,
    pub new_utilization: u64,
    pub new_rate: u64,
    pub timestamp: u64,
}

/// Emitted when a liquidation repayment is booked
#[event]
pub struct Liquidated {
    pub reserve: Pubkey,
    pub repaid_principal: u64,
    pub repaid_revenue: u64,
    pub timestamp: u64,
}

/// Emitted when protocol revenue is taken
#[event]
pub struct RevenueTaken {
    pub reserve: Pubkey,
    pub amount: u64,
    pub recipient: Pubkey,
    pub timestamp: u64,
}

// ============================================================================
// FLASH LOAN EVENTS
// ============================================================================

/// Emitted when a flash loan is issued
#[event]
pub struct FlashLoanTaken {
    pub reserve: Pubkey,
    pub borrower: Pubkey,
    pub amount: u64,
    pub fee: u64,
}

/// Emitted when a flash loan is settled
#[event]
pub struct FlashLoanRepaid {
    pub reserve: Pubkey,
    pub borrower: Pubkey,
    pub amount: u64,
    pub fee_paid: u64,
}
