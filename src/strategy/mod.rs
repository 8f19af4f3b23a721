//! Strategy holding a vault's principal
//!
//! The vault only sees the strategy through `get_balances`, `withdraw_all`,
//! `harvest_rewards` and the reward-token getters. The strategy in turn drives
//! the vault's withdrawal rounds through `process_withdrawals`.

pub mod simple_strategy;

pub use simple_strategy::*;
