//! Conversion between the two vault tokens at the oracle exchange rate
use odra::casper_types::U256;
use crate::errors::VaultError;
use crate::math::{mul_div, pow10, shift_precision, Rounding, PRICE_DECIMALS, PRICE_PRECISION};

/// Exchange rate of one whole X in whole Y, scaled by `PRICE_PRECISION`,
/// together with the raw decimals of both tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OraclePrice {
    price: U256,
    decimals_x: u8,
    decimals_y: u8,
}

impl OraclePrice {
    /// Builds the rate from two feeds that may use different decimals.
    pub fn from_feeds(
        price_x: U256,
        feed_decimals_x: u8,
        price_y: U256,
        feed_decimals_y: u8,
        decimals_x: u8,
        decimals_y: u8,
    ) -> Result<Self, VaultError> {
        let price_x = shift_precision(price_x, feed_decimals_x, PRICE_DECIMALS, Rounding::Down)?;
        let price_y = shift_precision(price_y, feed_decimals_y, PRICE_DECIMALS, Rounding::Down)?;
        if price_x.is_zero() || price_y.is_zero() {
            return Err(VaultError::InvalidPrice);
        }

        let price = mul_div(price_x, U256::from(PRICE_PRECISION), price_y, Rounding::Down)?;
        if price.is_zero() {
            return Err(VaultError::InvalidPrice);
        }
        Ok(Self { price, decimals_x, decimals_y })
    }

    /// Whole X in whole Y, 1e18 scaled
    pub fn price(&self) -> U256 {
        self.price
    }

    pub fn decimals_y(&self) -> u8 {
        self.decimals_y
    }

    /// Raw X amount valued in raw Y units, rounded down
    pub fn x_to_y(&self, amount_x: U256) -> Result<U256, VaultError> {
        let numerator = self.price.checked_mul(pow10(self.decimals_y)).ok_or(VaultError::Overflow)?;
        let denominator = U256::from(PRICE_PRECISION) * pow10(self.decimals_x);
        mul_div(amount_x, numerator, denominator, Rounding::Down)
    }

    /// Raw Y amount valued in raw X units, rounded down
    pub fn y_to_x(&self, amount_y: U256) -> Result<U256, VaultError> {
        let numerator = U256::from(PRICE_PRECISION) * pow10(self.decimals_x);
        let denominator = self.price.checked_mul(pow10(self.decimals_y)).ok_or(VaultError::Overflow)?;
        mul_div(amount_y, numerator, denominator, Rounding::Down)
    }
}
