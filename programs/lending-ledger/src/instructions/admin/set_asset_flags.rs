use anchor_lang::prelude::*;

use crate::state::Market;
use crate::events::AssetFlagsChanged;

/// Accounts for toggling an asset's access flags
#[derive(Accounts)]
pub struct SetAssetFlags<'info> {
    /// Authority of the market (must sign)
    pub authority: Signer<'info>,

    /// The market
    #[account(
        mut,
        has_one = authority,
        seeds = [Market::SEED_PREFIX, authority.key().as_ref()],
        bump = market.bump
    )]
    pub market: Account<'info, Market>,
}

/// Enable or disable an asset for base use (supply and borrow) and
/// collateral use
///
/// Disabling never touches balances: existing debt keeps accruing and can
/// still be repaid.
pub fn handler(
    ctx: Context<SetAssetFlags>,
    asset_mint: Pubkey,
    base_active: bool,
    collateral_active: bool,
) -> Result<()> {
    let market = &mut ctx.accounts.market;
    market.set_asset_flags(&asset_mint, base_active, collateral_active)?;

    emit!(AssetFlagsChanged {
        market: market.key(),
        asset_mint,
        base_active,
        collateral_active,
    });

    msg!(
        "Asset {} flags: base={}, collateral={}",
        asset_mint,
        base_active,
        collateral_active
    );

    Ok(())
}
