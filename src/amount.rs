//! Fixed-point amount helpers
//!
//! Amounts travel through the crate as base-unit [`Uint256`] integers, the
//! same width the exchange contracts use. Intermediate products that can
//! exceed 256 bits are widened to [`Uint512`] and narrowed back with an
//! explicit overflow check.

use std::str::FromStr;
use std::sync::OnceLock;

use cosmwasm_std::{Uint256, Uint512};
use regex::Regex;

use crate::error::AmountError;

/// Number of decimals carried by exchange rates
pub const RATE_DECIMALS: u8 = 6;

/// Fixed-point scale applied to exchange rates (10^6)
pub const RATE_SCALE: Uint256 = Uint256::from_u128(1_000_000);

/// Decimals of the base currency (TRX is denominated in sun)
pub const BASE_DECIMALS: u8 = 6;

/// Largest representable amount
pub const MAX_AMOUNT: Uint256 = Uint256::MAX;

/// Basis points denominator
pub const BIPS_BASE: Uint256 = Uint256::from_u128(10_000);

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([0-9]*)(?:\.([0-9]*))?$").expect("amount pattern compiles"))
}

/// 10^exp as a 256-bit integer
pub fn pow10(exp: u32) -> Result<Uint256, AmountError> {
    Uint256::from_u128(10)
        .checked_pow(exp)
        .map_err(|_| AmountError::Overflow)
}

/// 10^exp widened to 512 bits
pub fn pow10_wide(exp: u32) -> Result<Uint512, AmountError> {
    pow10(exp).map(Uint512::from)
}

/// Narrow a 512-bit intermediate back to 256 bits
pub fn narrow(value: Uint512) -> Result<Uint256, AmountError> {
    Uint256::try_from(value).map_err(|_| AmountError::Overflow)
}

/// Parse a decimal string such as `"1.25"` into base units.
///
/// Accepts `12`, `12.5`, `.5` and `12.`. Signs, exponents and separators are
/// rejected, as are fractions longer than `decimals`.
pub fn parse_units(value: &str, decimals: u8) -> Result<Uint256, AmountError> {
    let value = value.trim();
    if value.is_empty() || value == "." {
        return Err(AmountError::Empty);
    }

    let captures = amount_pattern()
        .captures(value)
        .ok_or_else(|| AmountError::InvalidCharacter(value.to_string()))?;
    let whole = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    let fraction = captures.get(2).map(|m| m.as_str()).unwrap_or_default();

    if fraction.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals {
            found: fraction.len(),
            allowed: decimals,
        });
    }

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(fraction);
    for _ in fraction.len()..decimals as usize {
        digits.push('0');
    }

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(Uint256::zero());
    }
    Uint256::from_str(digits).map_err(|_| AmountError::Overflow)
}

/// Render base units as an exact decimal string.
///
/// Always keeps at least one fractional digit when `decimals > 0`, so one
/// whole TRX renders as `1.0`.
pub fn format_units(amount: Uint256, decimals: u8) -> String {
    let raw = amount.to_string();
    if decimals == 0 {
        return raw;
    }

    let decimals = decimals as usize;
    let padded = if raw.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - raw.len()), raw)
    } else {
        raw
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Format an upper bound for display, rounded up to `display_decimals` so
/// the shown value never understates it.
pub fn format_amount_ceil(
    amount: Uint256,
    base_decimals: u8,
    display_decimals: u8,
    use_less_than: bool,
) -> Result<String, AmountError> {
    let step = pow10(u32::from(base_decimals.saturating_sub(display_decimals)))?;
    let rounded = if amount < step || (amount % step).is_zero() {
        amount
    } else {
        (amount / step + Uint256::one())
            .checked_mul(step)
            .map_err(|_| AmountError::Overflow)?
    };
    format_amount(rounded, base_decimals, display_decimals, use_less_than)
}

/// Format an amount for display, truncated to `display_decimals`.
///
/// Values smaller than the smallest displayable unit render as `<0.0001`
/// when `use_less_than` is set, or exactly otherwise.
pub fn format_amount(
    amount: Uint256,
    base_decimals: u8,
    display_decimals: u8,
    use_less_than: bool,
) -> Result<String, AmountError> {
    if display_decimals > base_decimals {
        return Err(AmountError::DisplayPrecision {
            base: base_decimals,
            display: display_decimals,
        });
    }

    if amount.is_zero() {
        return Ok("0".to_string());
    }

    let minimum_display = pow10(u32::from(base_decimals - display_decimals))?;
    if amount < minimum_display {
        return Ok(if use_less_than {
            format!("<{}", format_units(minimum_display, base_decimals))
        } else {
            format_units(amount, base_decimals)
        });
    }

    let formatted = format_units(amount, base_decimals);
    let Some((whole, fraction)) = formatted.split_once('.') else {
        return Ok(formatted);
    };

    let truncated: String = fraction
        .chars()
        .chain(std::iter::repeat('0'))
        .take(display_decimals as usize)
        .collect();
    let truncated = truncated.trim_end_matches('0');
    if truncated.is_empty() {
        Ok(whole.to_string())
    } else {
        Ok(format!("{}.{}", whole, truncated))
    }
}

/// Display precision used for a token panel: at most four decimals
pub fn display_decimals(decimals: u8) -> u8 {
    decimals.min(4)
}
