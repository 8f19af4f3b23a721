//! Oracle pricing
//!
//! Each vault token has its own `PriceFeed`. The vault reads both feeds and
//! folds them into an `OraclePrice`, which is used only to split the very
//! first deposit into an empty vault.

pub mod adapter;
pub mod price_feed;

pub use adapter::OraclePrice;
pub use price_feed::PriceFeed;
