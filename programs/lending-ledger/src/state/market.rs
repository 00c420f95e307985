use anchor_lang::prelude::*;

use crate::constants::{MARKET_SEED, MAX_ASSETS};
use crate::errors::LedgerError;
use crate::state::Reserve;

/// Registry and access flags for every asset of a lending market
/// PDA Seeds: ["market", authority]
#[account]
#[derive(InitSpace, Debug)]
pub struct Market {
    /// Version for future upgrades
    pub version: u8,

    /// Bump seed for PDA derivation
    pub bump: u8,

    /// Authority that can register assets and change parameters
    pub authority: Pubkey,

    /// Capability held by the obligation layer for borrow/repay/liquidate
    pub borrow_authority: Pubkey,

    /// Treasury that receives protocol revenue
    pub treasury: Pubkey,

    /// Delay before a proposed parameter change can be applied (seconds)
    pub change_delay: u64,

    /// Window after the delay during which the change can be applied (seconds)
    pub change_validity: u64,

    /// Registered assets, in registration order
    #[max_len(MAX_ASSETS)]
    pub assets: Vec<AssetEntry>,

    /// Reserved space for future upgrades (64 bytes)
    pub _padding: [u8; 64],
}

/// Per-asset access flags
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, InitSpace, Debug, PartialEq, Eq)]
pub struct AssetEntry {
    pub mint: Pubkey,

    /// Whether the asset can be supplied and borrowed
    pub base_active: bool,

    /// Whether the asset can back new borrows
    pub collateral_active: bool,
}

impl Market {
    pub const SEED_PREFIX: &'static [u8] = MARKET_SEED;

    pub fn asset(&self, mint: &Pubkey) -> Result<&AssetEntry> {
        self.assets
            .iter()
            .find(|entry| entry.mint == *mint)
            .ok_or_else(|| LedgerError::AssetNotRegistered.into())
    }

    pub fn is_registered(&self, mint: &Pubkey) -> bool {
        self.assets.iter().any(|entry| entry.mint == *mint)
    }

    /// Add an asset to the registry
    /// Collateral use starts disabled when the asset has no risk model.
    pub fn register_asset(&mut self, mint: Pubkey, collateral_active: bool) -> Result<()> {
        require!(!self.is_registered(&mint), LedgerError::AssetAlreadyRegistered);
        require!(self.assets.len() < MAX_ASSETS, LedgerError::MaxAssetsReached);

        self.assets.push(AssetEntry {
            mint,
            base_active: true,
            collateral_active,
        });
        Ok(())
    }

    pub fn set_asset_flags(&mut self, mint: &Pubkey, base_active: bool, collateral_active: bool) -> Result<()> {
        let entry = self
            .assets
            .iter_mut()
            .find(|entry| entry.mint == *mint)
            .ok_or(LedgerError::AssetNotRegistered)?;
        entry.base_active = base_active;
        entry.collateral_active = collateral_active;
        Ok(())
    }

    pub fn ensure_base_active(&self, mint: &Pubkey) -> Result<()> {
        require!(self.asset(mint)?.base_active, LedgerError::AssetInactive);
        Ok(())
    }

    pub fn ensure_collateral_active(&self, mint: &Pubkey) -> Result<()> {
        require!(self.asset(mint)?.collateral_active, LedgerError::AssetInactive);
        Ok(())
    }

    /// Accrue interest on every registered reserve, then reprice each one
    ///
    /// `reserves` must hold each registered asset's reserve exactly once.
    /// All checks run before the first reserve is touched.
    pub fn accrue_all(&self, market_key: &Pubkey, reserves: &mut [&mut Reserve], now: u64) -> Result<()> {
        require_eq!(reserves.len(), self.assets.len(), LedgerError::IncompleteReserveSet);

        for (position, reserve) in reserves.iter().enumerate() {
            require_keys_eq!(reserve.market, *market_key, LedgerError::InvalidReserve);
            self.asset(&reserve.asset_mint)?;
            require!(
                reserves[..position]
                    .iter()
                    .all(|other| other.asset_mint != reserve.asset_mint),
                LedgerError::IncompleteReserveSet
            );
            require_gte!(
                now,
                reserve.borrow_dynamic.last_accrual_time,
                LedgerError::TimestampRegressed
            );
        }

        for reserve in reserves.iter_mut() {
            reserve.accrue(now)?;
        }
        Ok(())
    }
}
