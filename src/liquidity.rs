//! Liquidity arithmetic
//!
//! Rates are fixed-point integers scaled by [`RATE_SCALE`] (10^6) and carry
//! the decimals of both sides, so the same rate value can be applied in the
//! direct or inverted direction. All products are taken in 512 bits and
//! floored exactly once.

use cosmwasm_std::{Uint256, Uint512};
use serde::{Deserialize, Serialize};

use crate::amount::{self, narrow, pow10_wide, BASE_DECIMALS, BIPS_BASE, MAX_AMOUNT, RATE_SCALE};
use crate::error::AmountError;
use crate::pool::ReserveSnapshot;

fn wide(value: Uint256) -> Uint512 {
    Uint512::from(value)
}

fn wide_mul(a: Uint512, b: Uint512) -> Result<Uint512, AmountError> {
    a.checked_mul(b).map_err(|_| AmountError::Overflow)
}

fn wide_div(a: Uint512, b: Uint512) -> Result<Uint512, AmountError> {
    if b.is_zero() {
        return Err(AmountError::DivisionByZero);
    }
    a.checked_div(b).map_err(|_| AmountError::DivisionByZero)
}

/// Fixed-point rate between two amounts.
///
/// Direct: `output * 10^6 * 10^input_decimals / (10^output_decimals * input)`,
/// i.e. output units per whole input unit. Inverted swaps the roles.
pub fn exchange_rate(
    input_value: Uint256,
    input_decimals: u8,
    output_value: Uint256,
    output_decimals: u8,
    invert: bool,
) -> Result<Uint256, AmountError> {
    let (numerator, numerator_decimals, denominator, denominator_decimals) = if invert {
        (input_value, output_decimals, output_value, input_decimals)
    } else {
        (output_value, input_decimals, input_value, output_decimals)
    };

    let top = wide_mul(
        wide_mul(wide(numerator), wide(RATE_SCALE))?,
        pow10_wide(u32::from(numerator_decimals))?,
    )?;
    let bottom = wide_mul(pow10_wide(u32::from(denominator_decimals))?, wide(denominator))?;
    narrow(wide_div(top, bottom)?)
}

/// Spot rate of a pool: tokens per base unit, or base per token when inverted
pub fn market_rate(
    reserves: &ReserveSnapshot,
    token_decimals: u8,
    invert: bool,
) -> Result<Uint256, AmountError> {
    exchange_rate(
        reserves.reserve_base,
        BASE_DECIMALS,
        reserves.reserve_token,
        token_decimals,
        invert,
    )
}

/// Apply a rate to an amount on the `from` side, producing base units on the
/// `to` side: `rate * amount * 10^to_decimals / (10^6 * 10^from_decimals)`.
pub fn derive_dependent(
    amount: Uint256,
    rate: Uint256,
    from_decimals: u8,
    to_decimals: u8,
) -> Result<Uint256, AmountError> {
    let top = wide_mul(
        wide_mul(wide(rate), wide(amount))?,
        pow10_wide(u32::from(to_decimals))?,
    )?;
    let bottom = wide_mul(wide(RATE_SCALE), pow10_wide(u32::from(from_decimals))?)?;
    narrow(wide_div(top, bottom)?)
}

/// Parse the amount the user typed into the authoritative field.
///
/// Zero and the maximum representable value are rejected.
pub fn parse_edited_amount(value: &str, decimals: u8) -> Result<Uint256, AmountError> {
    let parsed = amount::parse_units(value, decimals)?;
    if parsed.is_zero() {
        return Err(AmountError::NonPositive);
    }
    if parsed >= MAX_AMOUNT {
        return Err(AmountError::Overflow);
    }
    Ok(parsed)
}

/// Pool-share tokens minted for a deposit of `base_amount`.
///
/// The first deposit into a new exchange mints exactly the base amount;
/// later deposits mint `total_supply * base_amount / reserve_base`, rounded
/// down.
pub fn liquidity_minted(
    reserves: &ReserveSnapshot,
    total_supply: Option<Uint256>,
    base_amount: Uint256,
) -> Option<Uint256> {
    if reserves.is_new_exchange() {
        return Some(base_amount);
    }
    let total_supply = total_supply?;
    let minted = wide_div(
        wide(total_supply) * wide(base_amount),
        wide(reserves.reserve_base),
    )
    .ok()?;
    narrow(minted).ok()
}

/// Tolerance band around an estimated amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlippageBounds {
    pub minimum: Uint256,
    pub maximum: Uint256,
}

/// `value ± value * bips / 10_000`, clamped to `[0, MAX_AMOUNT]`
pub fn slippage_bounds(value: Uint256, bips: u32) -> SlippageBounds {
    let offset = (wide(value) * wide(Uint256::from(bips)))
        .checked_div(wide(BIPS_BASE))
        .ok()
        .and_then(|o| narrow(o).ok())
        .unwrap_or(MAX_AMOUNT);

    SlippageBounds {
        minimum: value.saturating_sub(offset),
        maximum: value.saturating_add(offset),
    }
}

/// Largest token amount whose slippage maximum still fits in `balance`
pub fn max_output_value(balance: Uint256, bips: u32) -> Uint256 {
    let denominator = wide(BIPS_BASE + Uint256::from(bips));
    (wide(balance) * wide(BIPS_BASE))
        .checked_div(denominator)
        .ok()
        .and_then(|v| narrow(v).ok())
        .unwrap_or(balance)
}

/// Share of a pool owned by `pool_tokens`, scaled by 10^6 (1_000_000 = 100%)
pub fn pool_share(pool_tokens: Uint256, total_supply: Uint256) -> Option<Uint256> {
    if total_supply.is_zero() {
        return None;
    }
    narrow(wide_div(wide(pool_tokens) * wide(RATE_SCALE), wide(total_supply)).ok()?).ok()
}

/// Portion of `reserve` corresponding to a 10^6-scaled share
pub fn share_of(reserve: Uint256, share: Uint256) -> Uint256 {
    (wide(reserve) * wide(share))
        .checked_div(wide(RATE_SCALE))
        .ok()
        .and_then(|v| narrow(v).ok())
        .unwrap_or(MAX_AMOUNT)
}

/// Reserve backing one whole pool-share token, scaled by 10^6
pub fn worth_per_pool_token(reserve: Uint256, total_supply: Uint256) -> Option<Uint256> {
    pool_share(reserve, total_supply)
}

/// The connected account's stake in a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolPosition {
    /// Share of the pool, 10^6-scaled
    pub share: Uint256,
    pub base_amount: Uint256,
    pub token_amount: Uint256,
}

impl PoolPosition {
    pub fn compute(
        reserves: &ReserveSnapshot,
        pool_tokens: Uint256,
        total_supply: Uint256,
    ) -> Option<Self> {
        if reserves.is_new_exchange() {
            return None;
        }
        let share = pool_share(pool_tokens, total_supply)?;
        Some(Self {
            share,
            base_amount: share_of(reserves.reserve_base, share),
            token_amount: share_of(reserves.reserve_token, share),
        })
    }
}
