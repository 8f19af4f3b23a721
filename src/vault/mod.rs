//! Oracle Reward Vault
//!
//! Pools two-token liquidity behind a six-decimal share token. Principal sits
//! in an external strategy, any number of reward tokens stream to shareholders
//! through per-token accumulators, and exits go through withdrawal rounds that
//! the strategy executes.
//!
//! Every state-changing entry point first refreshes the reward accumulators,
//! then settles the affected users, and only then touches share balances.

pub mod config;
pub mod queue;
pub mod rewards;
pub mod shares;


use odra::prelude::*;
use odra::casper_types::{U256, U512};
use odra::ContractRef;
use crate::errors::VaultError;
use crate::events::*;
use crate::factory::VaultFactoryContractRef;
use crate::math::{SafeMath, MAX_TOKEN_DECIMALS, SHARES_DECIMALS, SHARES_PRECISION};
use crate::oracle::price_feed::PriceFeedContractRef;
use crate::oracle::OraclePrice;
use crate::strategy::StrategyContractRef;
use crate::token::{Cep18TokenContractRef, TokenLedger};
use crate::tokens::WrappedNativeContractRef;

pub use config::{zero_address, PendingReward, UserInfo, VaultConfig};
pub use queue::QueuedWithdrawal;
pub use rewards::RewardInfo;
use shares::SharePreview;

/// Oracle reward vault contract
#[odra::module]
pub struct OracleRewardVault {
    /// Share ledger
    share_token: SubModule<TokenLedger>,

    /// Immutable deployment parameters
    config: Var<VaultConfig>,

    /// Attached strategy; `None` means emergency mode
    strategy: Var<Option<Address>>,

    deposits_paused: Var<bool>,
    flagged_for_shutdown: Var<bool>,

    /// Tokens earmarked for executed, unredeemed rounds
    total_reserved_x: Var<U256>,
    total_reserved_y: Var<U256>,

    /// Sum of all user phantom amounts
    phantom_share_supply: Var<U256>,

    /// User -> shares at phantom precision
    phantom_amounts: Mapping<Address, U256>,

    /// (user, reward token) -> reward debt
    reward_debts: Mapping<(Address, Address), U256>,

    /// User -> block time of the last deposit
    last_deposit_timestamps: Mapping<Address, u64>,

    /// Tracked reward tokens by index
    reward_infos: Mapping<u32, RewardInfo>,
    reward_token_count: Var<u32>,
    cached_reward_tokens: Mapping<Address, bool>,

    /// Round -> queue record
    rounds: Mapping<u32, QueuedWithdrawal>,

    /// Round accepting new queue entries
    current_round: Var<u32>,

    /// (round, recipient) -> queued shares
    queued_shares: Mapping<(u32, Address), U256>,

    /// Reentrancy lock
    locked: Var<bool>,
}

#[odra::module]
impl OracleRewardVault {
    /// Initialize the vault
    ///
    /// # Arguments
    /// * `name` - Share token name
    /// * `symbol` - Share token symbol
    /// * `config` - Tokens, oracles, pool and factory of the vault
    pub fn init(&mut self, name: String, symbol: String, config: VaultConfig) {
        if config.token_x == config.token_y
            || config.decimals_x > MAX_TOKEN_DECIMALS
            || config.decimals_y > MAX_TOKEN_DECIMALS
        {
            self.env().revert(VaultError::InvalidConfiguration);
        }
        let token_x = Cep18TokenContractRef::new(self.env(), config.token_x);
        let token_y = Cep18TokenContractRef::new(self.env(), config.token_y);
        if token_x.decimals() != config.decimals_x || token_y.decimals() != config.decimals_y {
            self.env().revert(VaultError::InvalidConfiguration);
        }

        self.share_token.init(name, symbol, SHARES_DECIMALS);
        self.config.set(config);
        self.strategy.set(None);
        self.deposits_paused.set(false);
        self.flagged_for_shutdown.set(false);
        self.total_reserved_x.set(U256::zero());
        self.total_reserved_y.set(U256::zero());
        self.phantom_share_supply.set(U256::zero());
        self.reward_token_count.set(0);
        self.current_round.set(0);
        self.locked.set(false);
    }

    // ========================================
    // Share Token (CEP-18)
    // ========================================

    pub fn name(&self) -> String {
        self.share_token.name()
    }

    pub fn symbol(&self) -> String {
        self.share_token.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.share_token.decimals()
    }

    pub fn total_supply(&self) -> U256 {
        self.share_token.total_supply()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.share_token.balance_of(owner)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.share_token.allowance(owner, spender)
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.share_token.approve(caller, spender, amount);
        true
    }

    /// Transfer shares; both sides are settled against the reward accumulators
    pub fn transfer(&mut self, to: Address, amount: U256) -> bool {
        self.lock();
        let caller = self.env().caller();
        self.transfer_shares(caller, to, amount);
        self.unlock();
        true
    }

    pub fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool {
        self.lock();
        let caller = self.env().caller();
        self.share_token.spend_allowance(from, caller, amount);
        self.transfer_shares(from, to, amount);
        self.unlock();
        true
    }

    // ========================================
    // Deposits
    // ========================================

    /// Deposit tokens X and Y for shares
    ///
    /// # Arguments
    /// * `amount_x` - Maximum token X to pull
    /// * `amount_y` - Maximum token Y to pull
    /// * `min_shares` - Minimum shares to receive
    ///
    /// # Returns
    /// (shares minted, token X pulled, token Y pulled)
    pub fn deposit(&mut self, amount_x: U256, amount_y: U256, min_shares: U256) -> (U256, U256, U256) {
        self.lock();
        let caller = self.env().caller();
        let (shares, effective_x, effective_y) = self.deposit_internal(caller, amount_x, amount_y, min_shares);

        let config = self.vault_config();
        let strategy = self.strategy_or_revert();
        self.safe_transfer_from(config.token_x, caller, strategy, effective_x);
        self.safe_transfer_from(config.token_y, caller, strategy, effective_y);

        self.unlock();
        (shares, effective_x, effective_y)
    }

    /// Deposit with the wrapped-native leg paid in attached CSPR.
    /// Attached value above the native leg's effective amount is refunded.
    #[odra(payable)]
    pub fn deposit_native(&mut self, amount_x: U256, amount_y: U256, min_shares: U256) -> (U256, U256, U256) {
        self.lock();
        let caller = self.env().caller();
        let config = self.vault_config();
        let wnative = self.factory().get_wnative();
        let native_is_x = self.native_side(&config, wnative);

        let attached = U256::from(self.env().attached_value().as_u128());
        let native_amount = if native_is_x { amount_x } else { amount_y };
        if attached < native_amount {
            self.env().revert(VaultError::InvalidNativeAmount);
        }

        let (shares, effective_x, effective_y) = self.deposit_internal(caller, amount_x, amount_y, min_shares);
        let strategy = self.strategy_or_revert();
        let (native_effective, other_token, other_effective) = if native_is_x {
            (effective_x, config.token_y, effective_y)
        } else {
            (effective_y, config.token_x, effective_x)
        };

        if !native_effective.is_zero() {
            WrappedNativeContractRef::new(self.env(), wnative)
                .with_tokens(U512::from(native_effective.as_u128()))
                .deposit();
            self.safe_transfer(wnative, strategy, native_effective);
        }
        self.safe_transfer_from(other_token, caller, strategy, other_effective);

        let excess = attached - native_effective;
        if !excess.is_zero() {
            self.env().transfer_tokens(&caller, &U512::from(excess.as_u128()));
        }

        self.unlock();
        (shares, effective_x, effective_y)
    }

    // ========================================
    // Withdrawal Queue
    // ========================================

    /// Queue `shares` for withdrawal in the current round on behalf of `recipient`
    ///
    /// # Returns
    /// The round the shares were queued in
    pub fn queue_withdrawal(&mut self, shares: U256, recipient: Address) -> u32 {
        self.lock();
        let caller = self.env().caller();
        if shares.is_zero() {
            self.env().revert(VaultError::ZeroShares);
        }
        if recipient == zero_address() || recipient == self.env().self_address() {
            self.env().revert(VaultError::InvalidRecipient);
        }
        let strategy = self.strategy_or_revert();

        let cooldown = self.factory().get_deposit_to_withdraw_cooldown();
        let last_deposit = self.last_deposit_timestamps.get(&caller).unwrap_or_default();
        if self.env().get_block_time() < last_deposit.saturating_add(cooldown) {
            self.env().revert(VaultError::WithdrawalCooldown);
        }
        if shares > self.share_token.balance_of(caller) {
            self.env().revert(VaultError::InsufficientShares);
        }

        self.update_pool();
        self.modify_user(caller, shares, false);
        self.share_token.move_balance(caller, strategy, shares);

        let round_id = self.current_round.get_or_default();
        let mut round = self.round(round_id);
        round.total_queued_shares = SafeMath::add(round.total_queued_shares, shares).unwrap_or_revert(&self.env());
        self.rounds.set(&round_id, round);
        let queued = self.queued_shares_of(round_id, recipient);
        self.queued_shares.set(&(round_id, recipient), queued + shares);

        self.env().emit_event(WithdrawalQueued {
            sender: caller,
            recipient,
            round: round_id,
            shares,
        });
        self.unlock();
        round_id
    }

    /// Take back shares the caller is entitled to in the current round
    pub fn cancel_queued_withdrawal(&mut self, shares: U256) -> u32 {
        self.lock();
        let caller = self.env().caller();
        if shares.is_zero() {
            self.env().revert(VaultError::ZeroShares);
        }

        let round_id = self.current_round.get_or_default();
        let queued = self.queued_shares_of(round_id, caller);
        if queued.is_zero() {
            self.env().revert(VaultError::NoQueuedWithdrawal);
        }
        if shares > queued {
            self.env().revert(VaultError::InsufficientQueuedShares);
        }

        self.update_pool();
        self.modify_user(caller, shares, true);
        let custody = self.custody_address();
        self.share_token.move_balance(custody, caller, shares);

        let mut round = self.round(round_id);
        round.total_queued_shares = round.total_queued_shares - shares;
        self.rounds.set(&round_id, round);
        self.queued_shares.set(&(round_id, caller), queued - shares);

        self.env().emit_event(WithdrawalCancelled {
            user: caller,
            round: round_id,
            shares,
        });
        self.unlock();
        round_id
    }

    /// Close the current round (strategy only). The strategy must have sent
    /// the round's tokens to the vault before calling.
    pub fn execute_queued_withdrawals(&mut self) {
        self.lock();
        let strategy = self.strategy_or_revert();
        if self.env().caller() != strategy {
            self.env().revert(VaultError::OnlyStrategy);
        }

        let round_id = self.current_round.get_or_default();
        let mut round = self.round(round_id);
        if round.total_queued_shares.is_zero() {
            self.unlock();
            return;
        }

        self.share_token.burn(strategy, round.total_queued_shares);
        self.current_round.set(round_id + 1);

        let config = self.vault_config();
        let reserved_x = self.total_reserved_x.get_or_default();
        let reserved_y = self.total_reserved_y.get_or_default();
        let received_x = self
            .token_balance(config.token_x)
            .saturating_sub(reserved_x)
            .saturating_sub(self.reward_reservation(config.token_x));
        let received_y = self
            .token_balance(config.token_y)
            .saturating_sub(reserved_y)
            .saturating_sub(self.reward_reservation(config.token_y));

        self.total_reserved_x.set(reserved_x + received_x);
        self.total_reserved_y.set(reserved_y + received_y);
        round.total_amount_x = received_x;
        round.total_amount_y = received_y;
        let total_queued_shares = round.total_queued_shares;
        self.rounds.set(&round_id, round);

        self.env().emit_event(WithdrawalsExecuted {
            round: round_id,
            total_queued_shares,
            amount_x: received_x,
            amount_y: received_y,
        });
        self.unlock();
    }

    /// Redeem `recipient`'s share of an executed round
    ///
    /// # Returns
    /// (token X paid, token Y paid)
    pub fn redeem_queued_withdrawal(&mut self, round: u32, recipient: Address) -> (U256, U256) {
        self.lock();
        let (amount_x, amount_y) = self.redeem_internal(round, recipient);
        let config = self.vault_config();
        self.safe_transfer(config.token_x, recipient, amount_x);
        self.safe_transfer(config.token_y, recipient, amount_y);
        self.unlock();
        (amount_x, amount_y)
    }

    /// Redeem an executed round, unwrapping the native leg to CSPR
    pub fn redeem_queued_withdrawal_native(&mut self, round: u32, recipient: Address) -> (U256, U256) {
        self.lock();
        let config = self.vault_config();
        let wnative = self.factory().get_wnative();
        let native_is_x = self.native_side(&config, wnative);

        let (amount_x, amount_y) = self.redeem_internal(round, recipient);
        let (native_amount, other_token, other_amount) = if native_is_x {
            (amount_x, config.token_y, amount_y)
        } else {
            (amount_y, config.token_x, amount_x)
        };
        if !native_amount.is_zero() {
            WrappedNativeContractRef::new(self.env(), wnative).withdraw_to(recipient, native_amount);
        }
        self.safe_transfer(other_token, recipient, other_amount);

        self.unlock();
        (amount_x, amount_y)
    }

    /// Exit at the raw vault balance while no strategy is attached
    pub fn emergency_withdraw(&mut self) -> (U256, U256) {
        self.lock();
        if self.strategy.get_or_default().is_some() {
            self.env().revert(VaultError::NotInEmergencyMode);
        }
        let caller = self.env().caller();
        let shares = self.share_token.balance_of(caller);
        if shares.is_zero() {
            self.env().revert(VaultError::ZeroShares);
        }

        self.update_pool();
        let (total_x, total_y) = self.get_balances();
        let (amount_x, amount_y) = shares::preview_amounts(shares, self.share_token.total_supply(), total_x, total_y)
            .unwrap_or_revert(&self.env());

        self.modify_user(caller, shares, false);
        self.share_token.burn(caller, shares);

        let config = self.vault_config();
        self.safe_transfer(config.token_x, caller, amount_x);
        self.safe_transfer(config.token_y, caller, amount_y);

        self.env().emit_event(EmergencyWithdrawn {
            user: caller,
            shares,
            amount_x,
            amount_y,
        });
        self.unlock();
        (amount_x, amount_y)
    }

    // ========================================
    // Rewards
    // ========================================

    /// Refresh every reward accumulator
    pub fn update_acc_rewards_per_share(&mut self) {
        self.lock();
        self.update_pool();
        self.unlock();
    }

    /// Pay out the caller's pending rewards
    pub fn claim_rewards(&mut self) {
        self.lock();
        let caller = self.env().caller();
        self.update_pool();
        self.modify_user(caller, U256::zero(), true);
        self.unlock();
    }

    /// Start tracking a reward token (factory or strategy)
    pub fn notify_reward_token(&mut self, token: Address) {
        self.lock();
        let caller = self.env().caller();
        let strategy = self.strategy_or_revert();
        if caller != self.vault_config().factory && caller != strategy {
            self.env().revert(VaultError::Unauthorized);
        }
        self.add_reward_token(token);
        self.unlock();
    }

    // ========================================
    // Admin
    // ========================================

    /// Attach a strategy, moving all funds out of the current one (factory only)
    pub fn set_strategy(&mut self, new_strategy: Address) {
        self.lock();
        self.only_factory();
        let current = self.strategy.get_or_default();
        if current == Some(new_strategy) {
            self.env().revert(VaultError::SameStrategy);
        }

        let config = self.vault_config();
        let candidate = StrategyContractRef::new(self.env(), new_strategy);
        if candidate.get_vault() != self.env().self_address()
            || candidate.get_token_x() != config.token_x
            || candidate.get_token_y() != config.token_y
            || candidate.get_pool() != config.pool
        {
            self.env().revert(VaultError::InvalidStrategy);
        }

        let custody = self.custody_address();
        if let Some(old_strategy) = current {
            self.update_pool();
            StrategyContractRef::new(self.env(), old_strategy).withdraw_all();
        }
        self.move_custody(custody, new_strategy);
        self.strategy.set(Some(new_strategy));

        let (idle_x, idle_y) = self.idle_balances();
        self.safe_transfer(config.token_x, new_strategy, idle_x);
        self.safe_transfer(config.token_y, new_strategy, idle_y);

        self.env().emit_event(StrategySet {
            old_strategy: current,
            new_strategy,
        });
        self.unlock();
    }

    /// Pull every token back from the strategy and detach it (factory only)
    pub fn set_emergency_mode(&mut self) {
        self.lock();
        self.only_factory();
        let strategy = self.strategy_or_revert();

        self.update_pool();
        StrategyContractRef::new(self.env(), strategy).withdraw_all();
        let vault = self.env().self_address();
        self.move_custody(strategy, vault);
        self.strategy.set(None);

        self.env().emit_event(EmergencyModeSet { strategy });
        self.unlock();
    }

    pub fn pause_deposits(&mut self) {
        self.only_factory();
        self.deposits_paused.set(true);
        self.env().emit_event(DepositsPaused { caller: self.env().caller() });
    }

    pub fn resume_deposits(&mut self) {
        self.only_factory();
        self.deposits_paused.set(false);
        self.env().emit_event(DepositsResumed { caller: self.env().caller() });
    }

    /// Flag the vault for shutdown (operator)
    pub fn submit_shutdown(&mut self) {
        self.only_operator();
        if self.flagged_for_shutdown.get_or_default() {
            self.env().revert(VaultError::AlreadyFlaggedForShutdown);
        }
        self.flagged_for_shutdown.set(true);
        self.env().emit_event(ShutdownSubmitted { operator: self.env().caller() });
    }

    pub fn cancel_shutdown(&mut self) {
        self.only_factory();
        if !self.flagged_for_shutdown.get_or_default() {
            self.env().revert(VaultError::NotFlaggedForShutdown);
        }
        self.flagged_for_shutdown.set(false);
        self.env().emit_event(ShutdownCancelled { caller: self.env().caller() });
    }

    /// Send stray tokens to `recipient` (factory only).
    /// Reserved principal and undistributed rewards can never be recovered.
    pub fn recover_erc20(&mut self, token: Address, recipient: Address, amount: U256) {
        self.lock();
        self.only_factory();
        if recipient == zero_address() {
            self.env().revert(VaultError::InvalidRecipient);
        }
        self.update_pool();

        let vault = self.env().self_address();
        let config = self.vault_config();
        let in_emergency = self.strategy.get_or_default().is_none();
        let (balance, protected) = if token == vault {
            let mut protected = U256::from(SHARES_PRECISION);
            if in_emergency {
                protected = protected + self.round(self.current_round.get_or_default()).total_queued_shares;
            }
            (self.share_token.balance_of(vault), protected)
        } else {
            let balance = self.token_balance(token);
            let principal = (token == config.token_x || token == config.token_y) && in_emergency;
            let mut protected = self.reward_reservation(token);
            if token == config.token_x {
                protected = protected + self.total_reserved_x.get_or_default();
            }
            if token == config.token_y {
                protected = protected + self.total_reserved_y.get_or_default();
            }
            (balance, if principal { balance } else { protected })
        };
        if amount.is_zero() || amount > balance.saturating_sub(protected) {
            self.env().revert(VaultError::InvalidRecoverAmount);
        }

        if token == vault {
            self.modify_user(recipient, amount, true);
            self.share_token.move_balance(vault, recipient, amount);
        } else {
            self.safe_transfer(token, recipient, amount);
        }

        self.env().emit_event(Recovered { token, recipient, amount });
        self.unlock();
    }

    // ========================================
    // View Functions
    // ========================================

    /// Shares a deposit would mint, before the first-deposit lock
    ///
    /// # Returns
    /// (shares, effective X, effective Y)
    pub fn preview_shares(&self, amount_x: U256, amount_y: U256) -> (U256, U256, U256) {
        let preview = self.preview_shares_internal(amount_x, amount_y);
        (preview.shares, preview.effective_x, preview.effective_y)
    }

    /// Token amounts `shares` is worth out of `total_shares`
    pub fn preview_amounts(&self, shares: U256, total_shares: U256) -> (U256, U256) {
        let (total_x, total_y) = self.get_balances();
        shares::preview_amounts(shares, total_shares, total_x, total_y).unwrap_or_revert(&self.env())
    }

    /// Principal backing the shares: the strategy's balances, or the vault's
    /// unreserved balances in emergency mode
    pub fn get_balances(&self) -> (U256, U256) {
        match self.strategy.get_or_default() {
            Some(strategy) => StrategyContractRef::new(self.env(), strategy).get_balances(),
            None => self.idle_balances(),
        }
    }

    /// Oracle price of one whole X in whole Y, 1e18 scaled
    pub fn get_price(&self) -> U256 {
        self.oracle_price().price()
    }

    pub fn get_config(&self) -> VaultConfig {
        self.vault_config()
    }

    pub fn get_strategy(&self) -> Option<Address> {
        self.strategy.get_or_default()
    }

    pub fn is_deposits_paused(&self) -> bool {
        self.deposits_paused.get_or_default()
    }

    pub fn is_flagged_for_shutdown(&self) -> bool {
        self.flagged_for_shutdown.get_or_default()
    }

    pub fn get_current_round(&self) -> u32 {
        self.current_round.get_or_default()
    }

    pub fn get_round(&self, round: u32) -> QueuedWithdrawal {
        self.round(round)
    }

    pub fn get_current_total_queued_withdrawal(&self) -> U256 {
        self.round(self.current_round.get_or_default()).total_queued_shares
    }

    pub fn get_queued_withdrawal(&self, round: u32, user: Address) -> U256 {
        self.queued_shares_of(round, user)
    }

    /// What `user` would receive from `round`; zero until the round executes
    pub fn get_redeemable_amounts(&self, round: u32, user: Address) -> (U256, U256) {
        if round >= self.current_round.get_or_default() {
            return (U256::zero(), U256::zero());
        }
        self.round(round)
            .redeemable(self.queued_shares_of(round, user))
            .unwrap_or_revert(&self.env())
    }

    pub fn get_pending_rewards(&self, user: Address) -> Vec<PendingReward> {
        self.pending_rewards(user)
    }

    pub fn get_user_info(&self, user: Address) -> UserInfo {
        UserInfo {
            share_balance: self.share_token.balance_of(user),
            phantom_amount: self.phantom_amounts.get(&user).unwrap_or_default(),
            last_deposit_timestamp: self.last_deposit_timestamps.get(&user).unwrap_or_default(),
            queued_shares: self.queued_shares_of(self.current_round.get_or_default(), user),
        }
    }

    pub fn get_reward_tokens(&self) -> Vec<RewardInfo> {
        (0..self.reward_token_count.get_or_default())
            .map(|index| self.reward_info(index))
            .collect()
    }

    pub fn get_reward_debt(&self, user: Address, token: Address) -> U256 {
        self.reward_debts.get(&(user, token)).unwrap_or_default()
    }

    /// (reserved X, reserved Y)
    pub fn get_total_reserved(&self) -> (U256, U256) {
        (
            self.total_reserved_x.get_or_default(),
            self.total_reserved_y.get_or_default(),
        )
    }

    pub fn get_phantom_share_supply(&self) -> U256 {
        self.phantom_share_supply.get_or_default()
    }

    // ========================================
    // Internal Functions
    // ========================================

    fn deposit_internal(
        &mut self,
        user: Address,
        amount_x: U256,
        amount_y: U256,
        min_shares: U256,
    ) -> (U256, U256, U256) {
        if self.deposits_paused.get_or_default() {
            self.env().revert(VaultError::DepositsPaused);
        }
        if self.flagged_for_shutdown.get_or_default() {
            self.env().revert(VaultError::ShutdownPending);
        }
        self.strategy_or_revert();
        if amount_x.is_zero() && amount_y.is_zero() {
            self.env().revert(VaultError::ZeroAmount);
        }

        self.update_pool();
        let preview = self.preview_shares_internal(amount_x, amount_y);
        let mut shares = preview.shares;

        if self.share_token.total_supply().is_zero() {
            let locked_shares = U256::from(SHARES_PRECISION);
            if shares <= locked_shares {
                self.env().revert(VaultError::InsufficientSharesMinted);
            }
            let vault = self.env().self_address();
            self.share_token.mint(vault, locked_shares);
            shares = shares - locked_shares;
        }
        if shares.is_zero() {
            self.env().revert(VaultError::ZeroShares);
        }
        if shares < min_shares {
            self.env().revert(VaultError::BelowMinShares);
        }

        self.last_deposit_timestamps.set(&user, self.env().get_block_time());
        self.modify_user(user, shares, true);
        self.share_token.mint(user, shares);

        self.env().emit_event(Deposited {
            user,
            amount_x: preview.effective_x,
            amount_y: preview.effective_y,
            shares,
        });
        (shares, preview.effective_x, preview.effective_y)
    }

    fn redeem_internal(&mut self, round: u32, recipient: Address) -> (U256, U256) {
        let caller = self.env().caller();
        if round >= self.current_round.get_or_default() {
            self.env().revert(VaultError::RoundNotExecuted);
        }
        if caller != recipient && caller != self.vault_config().factory {
            self.env().revert(VaultError::Unauthorized);
        }

        self.update_pool();
        let shares = self.queued_shares_of(round, recipient);
        let (amount_x, amount_y) = self.round(round).redeemable(shares).unwrap_or_revert(&self.env());
        if amount_x.is_zero() && amount_y.is_zero() {
            self.env().revert(VaultError::ZeroAmount);
        }

        self.queued_shares.set(&(round, recipient), U256::zero());
        let reserved_x = SafeMath::sub(self.total_reserved_x.get_or_default(), amount_x).unwrap_or_revert(&self.env());
        let reserved_y = SafeMath::sub(self.total_reserved_y.get_or_default(), amount_y).unwrap_or_revert(&self.env());
        self.total_reserved_x.set(reserved_x);
        self.total_reserved_y.set(reserved_y);

        self.env().emit_event(WithdrawalRedeemed {
            caller,
            recipient,
            round,
            shares,
            amount_x,
            amount_y,
        });
        (amount_x, amount_y)
    }

    fn transfer_shares(&mut self, from: Address, to: Address, amount: U256) {
        if to == zero_address() || to == self.env().self_address() || to == self.custody_address() {
            self.env().revert(VaultError::InvalidRecipient);
        }
        self.update_pool();
        self.modify_user(from, amount, false);
        self.modify_user(to, amount, true);
        self.share_token.move_balance(from, to, amount);

        // The receiver inherits the sender's cooldown
        let sender_deposit = self.last_deposit_timestamps.get(&from).unwrap_or_default();
        let receiver_deposit = self.last_deposit_timestamps.get(&to).unwrap_or_default();
        if sender_deposit > receiver_deposit {
            self.last_deposit_timestamps.set(&to, sender_deposit);
        }
    }

    fn preview_shares_internal(&self, amount_x: U256, amount_y: U256) -> SharePreview {
        let total_shares = self.share_token.total_supply();
        let preview = if total_shares.is_zero() {
            shares::preview_initial_shares(amount_x, amount_y, &self.oracle_price())
        } else {
            let (total_x, total_y) = self.get_balances();
            shares::preview_proportional_shares(amount_x, amount_y, total_x, total_y, total_shares)
        };
        preview.unwrap_or_revert(&self.env())
    }

    fn oracle_price(&self) -> OraclePrice {
        let config = self.vault_config();
        let feed_x = PriceFeedContractRef::new(self.env(), config.oracle_x);
        let feed_y = PriceFeedContractRef::new(self.env(), config.oracle_y);
        OraclePrice::from_feeds(
            feed_x.get_price(),
            feed_x.decimals(),
            feed_y.get_price(),
            feed_y.decimals(),
            config.decimals_x,
            config.decimals_y,
        )
        .unwrap_or_revert(&self.env())
    }

    /// Vault balances that are neither reserved for rounds nor owed as rewards
    fn idle_balances(&self) -> (U256, U256) {
        let config = self.vault_config();
        let idle_x = self
            .token_balance(config.token_x)
            .saturating_sub(self.total_reserved_x.get_or_default())
            .saturating_sub(self.reward_reservation(config.token_x));
        let idle_y = self
            .token_balance(config.token_y)
            .saturating_sub(self.total_reserved_y.get_or_default())
            .saturating_sub(self.reward_reservation(config.token_y));
        (idle_x, idle_y)
    }

    /// True when token X is the wrapped native token
    fn native_side(&self, config: &VaultConfig, wnative: Address) -> bool {
        if config.token_x == wnative {
            true
        } else if config.token_y == wnative {
            false
        } else {
            self.env().revert(VaultError::NotNativeVault)
        }
    }

    fn vault_config(&self) -> VaultConfig {
        self.config.get_or_revert_with(VaultError::InvalidConfiguration)
    }

    fn factory(&self) -> VaultFactoryContractRef {
        VaultFactoryContractRef::new(self.env(), self.vault_config().factory)
    }

    fn strategy_or_revert(&self) -> Address {
        self.strategy
            .get_or_default()
            .unwrap_or_revert_with(&self.env(), VaultError::NoStrategy)
    }

    fn token_balance(&self, token: Address) -> U256 {
        Cep18TokenContractRef::new(self.env(), token).balance_of(self.env().self_address())
    }

    fn safe_transfer(&self, token: Address, to: Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        let mut token = Cep18TokenContractRef::new(self.env(), token);
        if !token.transfer(to, amount) {
            self.env().revert(VaultError::TransferFailed);
        }
    }

    fn safe_transfer_from(&self, token: Address, from: Address, to: Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        let mut token = Cep18TokenContractRef::new(self.env(), token);
        if !token.transfer_from(from, to, amount) {
            self.env().revert(VaultError::TransferFailed);
        }
    }

    fn only_factory(&self) {
        if self.env().caller() != self.vault_config().factory {
            self.env().revert(VaultError::Unauthorized);
        }
    }

    /// Factory, its default operator, or the strategy operator
    fn only_operator(&self) {
        let caller = self.env().caller();
        let factory = self.factory();
        if caller == self.vault_config().factory || caller == factory.get_default_operator() {
            return;
        }
        if let Some(strategy) = self.strategy.get_or_default() {
            if StrategyContractRef::new(self.env(), strategy).get_operator() == caller {
                return;
            }
        }
        self.env().revert(VaultError::OnlyOperator)
    }

    /// Reentrancy lock
    fn lock(&mut self) {
        if self.locked.get_or_default() {
            self.env().revert(VaultError::ReentrantCall);
        }
        self.locked.set(true);
    }

    /// Reentrancy unlock
    fn unlock(&mut self) {
        self.locked.set(false);
    }
}
