//! Simple Strategy - custody of X/Y principal for one vault
//!
//! Rewards earned on the principal arrive at the strategy as plain token
//! transfers and are forwarded to the vault on every harvest. Reward tokens
//! that equal X or Y cannot be told apart from principal here, so those must
//! be paid to the vault directly.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::StrategyError;
use crate::math::{mul_div, Rounding};
use crate::token::Cep18TokenContractRef;
use crate::vault::OracleRewardVaultContractRef;

/// Event emitted when reward tokens are forwarded to the vault
#[odra::event]
pub struct RewardsHarvested {
    pub token: Address,
    pub amount: U256,
}

/// Event emitted when the vault pulls everything out
#[odra::event]
pub struct FundsWithdrawn {
    pub amount_x: U256,
    pub amount_y: U256,
}

/// Event emitted when a withdrawal round is funded and executed
#[odra::event]
pub struct WithdrawalsProcessed {
    pub queued_shares: U256,
    pub amount_x: U256,
    pub amount_y: U256,
}

#[odra::module]
pub struct Strategy {
    /// Vault this strategy serves
    vault: Var<Address>,
    token_x: Var<Address>,
    token_y: Var<Address>,
    /// Pool the principal is deployed to
    pool: Var<Address>,
    /// Account allowed to process withdrawals
    operator: Var<Address>,
    reward_token: Var<Option<Address>>,
    extra_reward_token: Var<Option<Address>>,
}

#[odra::module]
impl Strategy {
    /// Initialize the strategy
    pub fn init(
        &mut self,
        vault: Address,
        token_x: Address,
        token_y: Address,
        pool: Address,
        operator: Address,
        reward_token: Option<Address>,
        extra_reward_token: Option<Address>,
    ) {
        self.vault.set(vault);
        self.token_x.set(token_x);
        self.token_y.set(token_y);
        self.pool.set(pool);
        self.operator.set(operator);
        self.reward_token.set(reward_token);
        self.extra_reward_token.set(extra_reward_token);
    }

    pub fn get_vault(&self) -> Address {
        self.vault.get_or_revert_with(StrategyError::OnlyVault)
    }

    pub fn get_token_x(&self) -> Address {
        self.token_x.get_or_revert_with(StrategyError::OnlyVault)
    }

    pub fn get_token_y(&self) -> Address {
        self.token_y.get_or_revert_with(StrategyError::OnlyVault)
    }

    pub fn get_pool(&self) -> Address {
        self.pool.get_or_revert_with(StrategyError::OnlyVault)
    }

    pub fn get_operator(&self) -> Address {
        self.operator.get_or_revert_with(StrategyError::OnlyOperator)
    }

    /// Principal held: (token X, token Y)
    pub fn get_balances(&self) -> (U256, U256) {
        (
            self.balance_of_token(self.get_token_x()),
            self.balance_of_token(self.get_token_y()),
        )
    }

    pub fn has_rewards(&self) -> bool {
        self.reward_token.get_or_default().is_some()
    }

    pub fn get_reward_token(&self) -> Address {
        self.reward_token
            .get_or_default()
            .unwrap_or_revert_with(&self.env(), StrategyError::NoRewardToken)
    }

    pub fn has_extra_rewards(&self) -> bool {
        self.extra_reward_token.get_or_default().is_some()
    }

    pub fn get_extra_reward_token(&self) -> Address {
        self.extra_reward_token
            .get_or_default()
            .unwrap_or_revert_with(&self.env(), StrategyError::NoRewardToken)
    }

    /// Forward reward balances to the vault (vault only).
    /// Does nothing when there is nothing to forward.
    pub fn harvest_rewards(&mut self) {
        self.only_vault();
        let vault = self.get_vault();
        for token in self.forwardable_reward_tokens() {
            let amount = self.balance_of_token(token);
            if !amount.is_zero() {
                self.send(token, vault, amount);
                self.env().emit_event(RewardsHarvested { token, amount });
            }
        }
    }

    /// Send every token held back to the vault (vault only)
    pub fn withdraw_all(&mut self) {
        self.only_vault();
        let vault = self.get_vault();
        let (amount_x, amount_y) = self.get_balances();
        self.send(self.get_token_x(), vault, amount_x);
        self.send(self.get_token_y(), vault, amount_y);
        for token in self.forwardable_reward_tokens() {
            let amount = self.balance_of_token(token);
            self.send(token, vault, amount);
        }

        self.env().emit_event(FundsWithdrawn { amount_x, amount_y });
    }

    /// Fund and execute the vault's current withdrawal round (operator only)
    ///
    /// # Returns
    /// (token X sent, token Y sent)
    pub fn process_withdrawals(&mut self) -> (U256, U256) {
        self.only_operator();
        let vault_address = self.get_vault();
        let mut vault = OracleRewardVaultContractRef::new(self.env(), vault_address);
        vault.update_acc_rewards_per_share();

        let queued_shares = vault.get_current_total_queued_withdrawal();
        if queued_shares.is_zero() {
            return (U256::zero(), U256::zero());
        }

        let total_supply = vault.total_supply();
        let (balance_x, balance_y) = self.get_balances();
        let amount_x = mul_div(balance_x, queued_shares, total_supply, Rounding::Down)
            .unwrap_or_revert(&self.env());
        let amount_y = mul_div(balance_y, queued_shares, total_supply, Rounding::Down)
            .unwrap_or_revert(&self.env());

        self.send(self.get_token_x(), vault_address, amount_x);
        self.send(self.get_token_y(), vault_address, amount_y);
        vault.execute_queued_withdrawals();

        self.env().emit_event(WithdrawalsProcessed {
            queued_shares,
            amount_x,
            amount_y,
        });
        (amount_x, amount_y)
    }

    /// Hand the operator role over (operator only)
    pub fn set_operator(&mut self, operator: Address) {
        self.only_operator();
        self.operator.set(operator);
    }

    // ========================================
    // Internal Functions
    // ========================================

    /// Reward tokens that are not principal
    fn forwardable_reward_tokens(&self) -> Vec<Address> {
        let token_x = self.get_token_x();
        let token_y = self.get_token_y();
        [self.reward_token.get_or_default(), self.extra_reward_token.get_or_default()]
            .into_iter()
            .flatten()
            .filter(|token| *token != token_x && *token != token_y)
            .collect()
    }

    fn balance_of_token(&self, token: Address) -> U256 {
        Cep18TokenContractRef::new(self.env(), token).balance_of(self.env().self_address())
    }

    fn send(&self, token: Address, to: Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        let mut token = Cep18TokenContractRef::new(self.env(), token);
        if !token.transfer(to, amount) {
            self.env().revert(StrategyError::TransferFailed);
        }
    }

    fn only_vault(&self) {
        if self.env().caller() != self.get_vault() {
            self.env().revert(StrategyError::OnlyVault);
        }
    }

    fn only_operator(&self) {
        if self.env().caller() != self.get_operator() {
            self.env().revert(StrategyError::OnlyOperator);
        }
    }
}
