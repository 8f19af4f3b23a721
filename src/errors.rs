//! Error definitions for the vault contracts
use odra::prelude::*;

/// Custom errors for the vault contract
#[odra::odra_error]
pub enum VaultError {
    /// Both deposit amounts are zero, or a redemption computed nothing
    ZeroAmount = 1,

    /// Zero shares requested or produced
    ZeroShares = 2,

    /// Recipient is the zero address or a vault-controlled address
    InvalidRecipient = 3,

    /// Shares exceed the caller's balance
    InsufficientShares = 4,

    /// Shares exceed the supply they are measured against
    InvalidShares = 5,

    /// Cancellation exceeds the caller's queued shares
    InsufficientQueuedShares = 6,

    /// Caller is not allowed to perform this action
    Unauthorized = 7,

    /// Caller is not the attached strategy
    OnlyStrategy = 8,

    /// Caller is not an operator
    OnlyOperator = 9,

    /// Deposits are paused
    DepositsPaused = 10,

    /// Vault is flagged for shutdown
    ShutdownPending = 11,

    /// No strategy attached
    NoStrategy = 12,

    /// Strategy is already attached
    SameStrategy = 13,

    /// Strategy bindings do not match this vault
    InvalidStrategy = 14,

    /// Shutdown already submitted
    AlreadyFlaggedForShutdown = 15,

    /// No shutdown to cancel
    NotFlaggedForShutdown = 16,

    /// Deposit to withdraw cooldown has not elapsed
    WithdrawalCooldown = 17,

    /// Round has not been executed yet
    RoundNotExecuted = 18,

    /// Nothing queued in the current round
    NoQueuedWithdrawal = 19,

    /// Only allowed while no strategy is attached
    NotInEmergencyMode = 20,

    /// Neither vault token is the wrapped native token
    NotNativeVault = 21,

    /// Attached value does not cover the native leg
    InvalidNativeAmount = 22,

    /// Minted shares below the caller's minimum
    BelowMinShares = 23,

    /// First deposit does not cover the locked shares
    InsufficientSharesMinted = 24,

    /// Recovery would touch reserved or reward balances
    InvalidRecoverAmount = 25,

    /// Shares outstanding against an empty pool
    EmptyPool = 26,

    /// Oracle price resolves to zero
    InvalidPrice = 27,

    /// Locked - reentrancy guard
    ReentrantCall = 28,

    /// Token transfer returned false
    TransferFailed = 29,

    /// Invalid configuration
    InvalidConfiguration = 30,

    /// Token cannot be tracked as a reward
    InvalidRewardToken = 31,

    /// Overflow error
    Overflow = 32,

    /// Underflow error
    Underflow = 33,

    /// Division by zero
    DivisionByZero = 34,
}

/// Custom errors for the token contracts
#[odra::odra_error]
pub enum TokenError {
    /// Insufficient allowance for transfer
    InsufficientAllowance = 100,

    /// Insufficient balance for operation
    InsufficientBalance = 101,

    /// Attached native value does not match the request
    InsufficientNativeValue = 102,
}

/// Custom errors for the price feed contract
#[odra::odra_error]
pub enum OracleError {
    /// Zero price submitted
    InvalidPrice = 200,

    /// Caller is not the feed admin
    Unauthorized = 201,

    /// Price has never been set
    PriceNotSet = 202,
}

/// Custom errors for the strategy contract
#[odra::odra_error]
pub enum StrategyError {
    /// Caller is not the bound vault
    OnlyVault = 300,

    /// Caller is not the strategy operator
    OnlyOperator = 301,

    /// Strategy has no such reward token
    NoRewardToken = 302,

    /// Token transfer returned false
    TransferFailed = 303,
}
