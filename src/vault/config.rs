//! Immutable vault configuration and read-side records
use odra::prelude::*;
use odra::casper_types::account::AccountHash;
use odra::casper_types::U256;

/// Deployment parameters fixed for the lifetime of a vault
#[odra::odra_type]
pub struct VaultConfig {
    /// First pool token
    pub token_x: Address,
    /// Second pool token
    pub token_y: Address,
    /// Decimals of `token_x`
    pub decimals_x: u8,
    /// Decimals of `token_y`
    pub decimals_y: u8,
    /// Price feed for `token_x`
    pub oracle_x: Address,
    /// Price feed for `token_y`
    pub oracle_y: Address,
    /// Pool the strategy must be bound to
    pub pool: Address,
    /// Factory with admin rights over the vault
    pub factory: Address,
}

/// Snapshot of a user's position
#[odra::odra_type]
pub struct UserInfo {
    /// Shares held by the user
    pub share_balance: U256,
    /// Shares at reward precision
    pub phantom_amount: U256,
    /// Block time of the last deposit
    pub last_deposit_timestamp: u64,
    /// Shares queued for the user in the current round
    pub queued_shares: U256,
}

/// Pending reward of a single token
#[odra::odra_type]
pub struct PendingReward {
    pub token: Address,
    pub amount: U256,
}

/// The all-zero account, never a valid recipient
pub fn zero_address() -> Address {
    Address::Account(AccountHash::new([0u8; 32]))
}
