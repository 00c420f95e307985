use anchor_lang::prelude::*;

/// Ledger errors
///
/// Every error rejects the operation before any state is written.
#[error_code]
pub enum LedgerError {
    #[msg("Risk or interest model parameters are invalid")]
    ParameterInvalid,

    #[msg("Insufficient liquidity in reserve")]
    InsufficientLiquidity,

    #[msg("Outflow limit for the current cycle exceeded")]
    LimitExceeded,

    #[msg("Flash loan repayment below principal plus fee")]
    InsufficientRepayment,

    #[msg("Amount too small")]
    AmountTooSmall,

    #[msg("Asset is not registered in this market")]
    AssetNotRegistered,

    #[msg("Asset is already registered in this market")]
    AssetAlreadyRegistered,

    #[msg("Maximum number of assets reached")]
    MaxAssetsReached,

    #[msg("Asset is not active for this operation")]
    AssetInactive,

    #[msg("Timestamp is older than the last accrual")]
    TimestampRegressed,

    #[msg("No pending parameter change")]
    NoPendingChange,

    #[msg("Parameter change is still timelocked")]
    ChangeNotReady,

    #[msg("Parameter change validity window has passed")]
    ChangeExpired,

    #[msg("Accrual requires every registered reserve exactly once")]
    IncompleteReserveSet,

    #[msg("Reserve does not belong to this market")]
    InvalidReserve,

    #[msg("Invalid vault account")]
    InvalidVault,

    #[msg("Invalid share mint")]
    InvalidShareMint,

    #[msg("Token mint mismatch")]
    InvalidTokenMint,

    #[msg("Flash loan belongs to a different asset")]
    FlashLoanAssetMismatch,

    #[msg("Flash borrow must be followed by a flash repay in the same transaction")]
    FlashRepayMissing,

    #[msg("Signer is not authorized for this operation")]
    Unauthorized,

    #[msg("Math overflow")]
    MathOverflow,
}
