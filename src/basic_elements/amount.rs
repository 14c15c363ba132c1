use alloy_primitives::{
    U256,
    utils::{ParseUnits, Unit},
};

use crate::error::{Error, Result};

/// Decimals of the fee and ERC-20 tokens handled here (10^18 base units).
pub const TOKEN_DECIMALS: usize = 18;

pub fn u256_to_low_high(value: U256) -> (u128, u128) {
    let limbs = value.as_limbs();
    let low = (limbs[0] as u128) | ((limbs[1] as u128) << 64);
    let high = (limbs[2] as u128) | ((limbs[3] as u128) << 64);
    (low, high)
}

pub fn u256_from_low_high(low: u128, high: u128) -> U256 {
    U256::from_limbs([
        low as u64,
        (low >> 64) as u64,
        high as u64,
        (high >> 64) as u64,
    ])
}

/// Converts a human readable token amount ("0.5", "12", "0.0000000001") into
/// base units, i.e. `round(amount * 10^18)`. Digits past the 18th decimal are
/// rounded half up.
pub fn parse_token_amount(amount: &str) -> Result<U256> {
    let amount = amount.trim();
    let (integer, fraction) = match amount.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (amount, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (integer.is_empty() && fraction.is_empty()) || !all_digits(integer) || !all_digits(fraction)
    {
        return Err(Error::invalid_argument(format!(
            "'{}' is not a non-negative decimal amount",
            amount
        )));
    }

    let round_up = fraction
        .as_bytes()
        .get(TOKEN_DECIMALS)
        .is_some_and(|digit| *digit >= b'5');
    let fraction = &fraction[..fraction.len().min(TOKEN_DECIMALS)];
    let integer = if integer.is_empty() { "0" } else { integer };

    let normalized = if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{}.{}", integer, fraction)
    };
    let scaled: U256 = ParseUnits::parse_units(&normalized, Unit::ETHER)
        .map_err(|e| Error::invalid_argument(format!("amount '{}': {}", amount, e)))?
        .into();

    if round_up {
        scaled
            .checked_add(U256::from(1u8))
            .ok_or_else(|| Error::invalid_argument(format!("amount '{}' overflows u256", amount)))
    } else {
        Ok(scaled)
    }
}

/// Same as `parse_token_amount` for a float amount. Rust prints floats
/// without exponent, so the decimal expansion is exact for what was typed.
pub fn token_amount_from_f64(amount: f64) -> Result<U256> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::invalid_argument(format!(
            "amount {} must be a finite non-negative number",
            amount
        )));
    }

    parse_token_amount(&amount.to_string())
}

/// Formats base units as a decimal token amount, dropping trailing zeros.
pub fn format_token_amount(value: U256) -> String {
    let formatted = ParseUnits::U256(value).format_units(Unit::ETHER);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');

    trimmed.to_string()
}
