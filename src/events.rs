//! Event definitions for the vault contracts
use odra::prelude::*;
use odra::casper_types::U256;

/// Event emitted on share transfers, mints and burns
#[odra::event]
pub struct Transfer {
    /// Sender address
    pub from: Address,
    /// Recipient address
    pub to: Address,
    /// Amount transferred
    pub value: U256,
}

/// Event emitted on share approvals
#[odra::event]
pub struct Approval {
    /// Owner address
    pub owner: Address,
    /// Spender address
    pub spender: Address,
    /// Amount approved
    pub value: U256,
}

/// Event emitted when a user deposits into the vault
#[odra::event]
pub struct Deposited {
    /// Depositor
    pub user: Address,
    /// Token X pulled into the strategy
    pub amount_x: U256,
    /// Token Y pulled into the strategy
    pub amount_y: U256,
    /// Shares minted to the depositor
    pub shares: U256,
}

/// Event emitted when shares are queued for withdrawal
#[odra::event]
pub struct WithdrawalQueued {
    /// Owner of the queued shares
    pub sender: Address,
    /// Address allowed to redeem the round
    pub recipient: Address,
    /// Round the shares were queued in
    pub round: u32,
    /// Shares queued
    pub shares: U256,
}

/// Event emitted when queued shares are returned to their owner
#[odra::event]
pub struct WithdrawalCancelled {
    pub user: Address,
    pub round: u32,
    pub shares: U256,
}

/// Event emitted when a round is executed by the strategy
#[odra::event]
pub struct WithdrawalsExecuted {
    /// Executed round
    pub round: u32,
    /// Shares burned
    pub total_queued_shares: U256,
    /// Token X reserved for the round
    pub amount_x: U256,
    /// Token Y reserved for the round
    pub amount_y: U256,
}

/// Event emitted when a user redeems an executed round
#[odra::event]
pub struct WithdrawalRedeemed {
    pub caller: Address,
    pub recipient: Address,
    pub round: u32,
    pub shares: U256,
    pub amount_x: U256,
    pub amount_y: U256,
}

/// Event emitted on an emergency exit
#[odra::event]
pub struct EmergencyWithdrawn {
    pub user: Address,
    pub shares: U256,
    pub amount_x: U256,
    pub amount_y: U256,
}

/// Event emitted when a reward token starts being tracked
#[odra::event]
pub struct RewardTokenAdded {
    /// Reward token
    pub token: Address,
    /// Balance treated as already accounted for
    pub initial_balance: U256,
}

/// Event emitted when pending rewards are paid to a user
#[odra::event]
pub struct RewardPaid {
    pub user: Address,
    pub token: Address,
    pub amount: U256,
}

/// Event emitted when the strategy changes
#[odra::event]
pub struct StrategySet {
    /// Previous strategy, if any
    pub old_strategy: Option<Address>,
    /// Newly attached strategy
    pub new_strategy: Address,
}

#[odra::event]
pub struct DepositsPaused {
    pub caller: Address,
}

#[odra::event]
pub struct DepositsResumed {
    pub caller: Address,
}

/// Event emitted when an operator flags the vault for shutdown
#[odra::event]
pub struct ShutdownSubmitted {
    pub operator: Address,
}

#[odra::event]
pub struct ShutdownCancelled {
    pub caller: Address,
}

/// Event emitted when the strategy is detached and funds pulled back
#[odra::event]
pub struct EmergencyModeSet {
    /// Strategy that was detached
    pub strategy: Address,
}

/// Event emitted when stray tokens are recovered
#[odra::event]
pub struct Recovered {
    pub token: Address,
    pub recipient: Address,
    pub amount: U256,
}
