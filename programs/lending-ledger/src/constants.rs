/// Lending Ledger Constants

// ============================================================================
// SCALING CONSTANTS
// ============================================================================

/// Basis points denominator (100% = 10000 BPS)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Index scale factor (1e18) for the borrow index and index growth ratios
pub const INDEX_ONE: u128 = 1_000_000_000_000_000_000; // 10^18

/// Seconds per year (interest model rates are annualized)
pub const SECONDS_PER_YEAR: u64 = 31_536_000; // 365 * 24 * 60 * 60

/// Denominator of the flash loan fee (10 = 0.1%)
pub const FLASH_LOAN_FEE_DENOMINATOR: u64 = 10_000;

// ============================================================================
// PDA SEEDS
// ============================================================================

/// Seed prefix for Market PDA
pub const MARKET_SEED: &[u8] = b"market";

/// Seed prefix for Reserve PDA
pub const RESERVE_SEED: &[u8] = b"reserve";

/// Seed prefix for Reserve token vault PDA
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed prefix for the interest-bearing share mint PDA
pub const SHARE_MINT_SEED: &[u8] = b"share_mint";

/// Seed prefix for an outstanding flash loan receipt PDA
pub const FLASH_LOAN_SEED: &[u8] = b"flash_loan";

// ============================================================================
// RISK MODEL CEILINGS
// ============================================================================

/// Maximum collateral factor (95% = 9500 BPS)
pub const MAX_COLLATERAL_FACTOR_BPS: u16 = 9_500;

/// Maximum liquidation factor (95% = 9500 BPS)
pub const MAX_LIQUIDATION_FACTOR_BPS: u16 = 9_500;

/// Maximum liquidation penalty (20% = 2000 BPS)
pub const MAX_LIQUIDATION_PENALTY_BPS: u16 = 2_000;

/// Maximum liquidation discount (15% = 1500 BPS)
pub const MAX_LIQUIDATION_DISCOUNT_BPS: u16 = 1_500;

// ============================================================================
// DEFAULT VALUES
// ============================================================================

/// Default delay before a proposed parameter change can be applied (1 day)
pub const DEFAULT_CHANGE_DELAY_SECS: u64 = 86_400;

/// Default window during which a ready change can be applied (7 days)
pub const DEFAULT_CHANGE_VALIDITY_SECS: u64 = 7 * 86_400;

/// Default outflow limiter cycle (1 day)
pub const DEFAULT_LIMITER_CYCLE_SECS: u64 = 86_400;

/// Default outflow limiter segment (30 minutes, 48 segments per cycle)
pub const DEFAULT_LIMITER_SEGMENT_SECS: u64 = 1_800;

/// Default flash loan fee (0.05% = 5 / 10000)
pub const DEFAULT_FLASH_LOAN_FEE: u64 = 5;

// ============================================================================
// LIMITS
// ============================================================================

/// Maximum number of assets per market
pub const MAX_ASSETS: usize = 32;

/// Maximum number of buckets in an outflow limiter
pub const MAX_LIMITER_SEGMENTS: usize = 96;

/// Maximum flash loan fee (10% = 1000 / 10000)
pub const MAX_FLASH_LOAN_FEE: u64 = 1_000;
