//! Fixed-point utilities for share and reward accounting
//! Implements checked arithmetic, mul-div with explicit rounding and decimal shifting
use odra::casper_types::U256;
use crate::errors::VaultError;

/// Decimals of the vault share token
pub const SHARES_DECIMALS: u8 = 6;

/// One whole share; minted to the vault on the first deposit and never redeemable
pub const SHARES_PRECISION: u128 = 1_000_000;

/// Decimals of phantom share amounts used by the reward accumulator
pub const PHANTOM_DECIMALS: u8 = 18;

/// Scale of oracle-derived prices (1e18)
pub const PRICE_DECIMALS: u8 = 18;
pub const PRICE_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Scale of accumulated rewards per phantom share (1e36)
pub const ACC_REWARD_PRECISION: u128 = 1_000_000_000_000_000_000_000_000_000_000_000_000;

/// Largest token decimals a vault accepts
pub const MAX_TOKEN_DECIMALS: u8 = 18;

/// Rounding direction for divisions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

/// Safe math operations for U256
pub struct SafeMath;

impl SafeMath {
    /// Safe addition with overflow check
    pub fn add(a: U256, b: U256) -> Result<U256, VaultError> {
        a.checked_add(b).ok_or(VaultError::Overflow)
    }

    /// Safe subtraction with underflow check
    pub fn sub(a: U256, b: U256) -> Result<U256, VaultError> {
        a.checked_sub(b).ok_or(VaultError::Underflow)
    }

    /// Safe multiplication with overflow check
    pub fn mul(a: U256, b: U256) -> Result<U256, VaultError> {
        a.checked_mul(b).ok_or(VaultError::Overflow)
    }

    /// Returns the minimum of two U256 values
    pub fn min(a: U256, b: U256) -> U256 {
        if a < b { a } else { b }
    }
}

/// `x * y / denominator` with the requested rounding
pub fn mul_div(x: U256, y: U256, denominator: U256, rounding: Rounding) -> Result<U256, VaultError> {
    if denominator.is_zero() {
        return Err(VaultError::DivisionByZero);
    }
    let product = SafeMath::mul(x, y)?;
    let quotient = product / denominator;
    if rounding == Rounding::Up && !(product % denominator).is_zero() {
        return SafeMath::add(quotient, U256::one());
    }
    Ok(quotient)
}

/// 10^exp as U256
pub fn pow10(exp: u8) -> U256 {
    U256::exp10(exp as usize)
}

/// Rescales `amount` from `from` decimals to `to` decimals.
/// Scaling down drops the remainder according to `rounding`.
pub fn shift_precision(amount: U256, from: u8, to: u8, rounding: Rounding) -> Result<U256, VaultError> {
    if from == to {
        Ok(amount)
    } else if to > from {
        SafeMath::mul(amount, pow10(to - from))
    } else {
        mul_div(amount, U256::one(), pow10(from - to), rounding)
    }
}
