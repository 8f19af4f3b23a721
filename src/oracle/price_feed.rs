//! Price Feed - admin-maintained USD price for a single asset

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::OracleError;

/// Event emitted when the feed admin publishes a new price
#[odra::event]
pub struct PriceUpdated {
    pub price: U256,
    pub timestamp: u64,
}

/// Price feed contract
#[odra::module]
pub struct PriceFeed {
    /// Latest price, scaled by 10^decimals
    price: Var<U256>,

    /// Decimals of `price`
    decimals: Var<u8>,

    /// Block time of the last update
    last_update: Var<u64>,

    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl PriceFeed {
    /// Initialize the feed
    ///
    /// # Arguments
    /// * `decimals` - Decimals the price is expressed in
    /// * `initial_price` - First published price
    pub fn init(&mut self, decimals: u8, initial_price: U256) {
        let caller = self.env().caller();
        self.admin.set(caller);
        self.decimals.set(decimals);
        self.write_price(initial_price);
    }

    /// Publish a new price (admin only)
    pub fn set_price(&mut self, price: U256) {
        self.only_admin();
        self.write_price(price);
    }

    /// Latest price
    pub fn get_price(&self) -> U256 {
        let price = self.price.get_or_default();
        if price.is_zero() {
            self.env().revert(OracleError::PriceNotSet);
        }
        price
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    pub fn get_last_update(&self) -> u64 {
        self.last_update.get_or_default()
    }

    pub fn get_admin(&self) -> Address {
        self.admin.get_or_revert_with(OracleError::Unauthorized)
    }

    // ========================================
    // Internal Functions
    // ========================================

    fn write_price(&mut self, price: U256) {
        if price.is_zero() {
            self.env().revert(OracleError::InvalidPrice);
        }
        let timestamp = self.env().get_block_time();
        self.price.set(price);
        self.last_update.set(timestamp);

        self.env().emit_event(PriceUpdated { price, timestamp });
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(OracleError::Unauthorized);
        if caller != admin {
            self.env().revert(OracleError::Unauthorized);
        }
    }
}
