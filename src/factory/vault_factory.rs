//! Factory contract for oracle reward vaults
//!
//! The Factory is responsible for:
//! - Protocol settings every vault reads (operator, cooldown, wrapped native)
//! - Keeping a registry of vaults
//! - Forwarding owner-only administration to vaults
use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::VaultError;
use crate::vault::OracleRewardVaultContractRef;

/// Event emitted when the default operator changes
#[odra::event]
pub struct DefaultOperatorUpdated {
    pub operator: Address,
}

/// Event emitted when the deposit to withdraw cooldown changes
#[odra::event]
pub struct CooldownUpdated {
    pub cooldown: u64,
}

/// Factory contract owning vault administration
#[odra::module]
pub struct VaultFactory {
    /// Owner address (admin)
    owner: Var<Address>,
    /// Operator allowed to flag vaults for shutdown
    default_operator: Var<Address>,
    /// Minimum time between a user's deposit and their next queued withdrawal
    deposit_to_withdraw_cooldown: Var<u64>,
    /// Wrapped native token
    wnative: Var<Address>,
    /// List of all vaults (stored as index -> address)
    all_vaults: Mapping<u32, Address>,
    /// Total number of vaults
    all_vaults_length: Var<u32>,
}

#[odra::module]
impl VaultFactory {
    /// Initialize the factory; the deployer becomes the owner
    pub fn init(&mut self, default_operator: Address, wnative: Address, deposit_to_withdraw_cooldown: u64) {
        self.owner.set(self.env().caller());
        self.default_operator.set(default_operator);
        self.wnative.set(wnative);
        self.deposit_to_withdraw_cooldown.set(deposit_to_withdraw_cooldown);
        self.all_vaults_length.set(0);
    }

    pub fn get_owner(&self) -> Address {
        self.owner.get_or_revert_with(VaultError::Unauthorized)
    }

    pub fn get_default_operator(&self) -> Address {
        self.default_operator.get_or_revert_with(VaultError::InvalidConfiguration)
    }

    pub fn get_deposit_to_withdraw_cooldown(&self) -> u64 {
        self.deposit_to_withdraw_cooldown.get_or_default()
    }

    pub fn get_wnative(&self) -> Address {
        self.wnative.get_or_revert_with(VaultError::InvalidConfiguration)
    }

    /// Get vault by index
    pub fn all_vaults_at(&self, index: u32) -> Option<Address> {
        self.all_vaults.get(&index)
    }

    pub fn all_vaults_length(&self) -> u32 {
        self.all_vaults_length.get_or_default()
    }

    pub fn set_default_operator(&mut self, operator: Address) {
        self.only_owner();
        self.default_operator.set(operator);
        self.env().emit_event(DefaultOperatorUpdated { operator });
    }

    pub fn set_deposit_to_withdraw_cooldown(&mut self, cooldown: u64) {
        self.only_owner();
        self.deposit_to_withdraw_cooldown.set(cooldown);
        self.env().emit_event(CooldownUpdated { cooldown });
    }

    /// Add a deployed vault to the registry
    pub fn register_vault(&mut self, vault: Address) {
        self.only_owner();
        let index = self.all_vaults_length();
        self.all_vaults.set(&index, vault);
        self.all_vaults_length.set(index + 1);
    }

    // ========================================
    // Vault Administration (owner only)
    // ========================================

    pub fn set_strategy(&mut self, vault: Address, strategy: Address) {
        self.only_owner();
        self.vault(vault).set_strategy(strategy);
    }

    pub fn pause_deposits(&mut self, vault: Address) {
        self.only_owner();
        self.vault(vault).pause_deposits();
    }

    pub fn resume_deposits(&mut self, vault: Address) {
        self.only_owner();
        self.vault(vault).resume_deposits();
    }

    pub fn submit_shutdown(&mut self, vault: Address) {
        self.only_owner();
        self.vault(vault).submit_shutdown();
    }

    pub fn cancel_shutdown(&mut self, vault: Address) {
        self.only_owner();
        self.vault(vault).cancel_shutdown();
    }

    pub fn set_emergency_mode(&mut self, vault: Address) {
        self.only_owner();
        self.vault(vault).set_emergency_mode();
    }

    pub fn recover_erc20(&mut self, vault: Address, token: Address, recipient: Address, amount: U256) {
        self.only_owner();
        self.vault(vault).recover_erc20(token, recipient, amount);
    }

    pub fn notify_reward_token(&mut self, vault: Address, token: Address) {
        self.only_owner();
        self.vault(vault).notify_reward_token(token);
    }

    /// Redeem an executed round on behalf of `recipient`; tokens still go to `recipient`
    pub fn redeem_queued_withdrawal_for(&mut self, vault: Address, round: u32, recipient: Address) -> (U256, U256) {
        self.only_owner();
        self.vault(vault).redeem_queued_withdrawal(round, recipient)
    }

    pub fn redeem_queued_withdrawal_native_for(&mut self, vault: Address, round: u32, recipient: Address) -> (U256, U256) {
        self.only_owner();
        self.vault(vault).redeem_queued_withdrawal_native(round, recipient)
    }

    // ============ Internal Functions ============

    fn vault(&self, vault: Address) -> OracleRewardVaultContractRef {
        OracleRewardVaultContractRef::new(self.env(), vault)
    }

    fn only_owner(&self) {
        if self.env().caller() != self.get_owner() {
            self.env().revert(VaultError::Unauthorized);
        }
    }
}
