//! CEP-18 token implementations used around the vault
//! `TestToken` stands in for the pool tokens and rewards, `WrappedNative` wraps CSPR 1:1
use odra::prelude::*;
use odra::casper_types::{U256, U512};
use crate::errors::TokenError;
use crate::token::TokenLedger;

/// Mintable CEP-18 token with configurable decimals
#[odra::module]
pub struct TestToken {
    ledger: SubModule<TokenLedger>,
}

#[odra::module]
impl TestToken {
    pub fn init(&mut self, name: String, symbol: String, decimals: u8) {
        self.ledger.init(name, symbol, decimals);
    }

    pub fn name(&self) -> String { self.ledger.name() }
    pub fn symbol(&self) -> String { self.ledger.symbol() }
    pub fn decimals(&self) -> u8 { self.ledger.decimals() }
    pub fn total_supply(&self) -> U256 { self.ledger.total_supply() }
    pub fn balance_of(&self, owner: Address) -> U256 { self.ledger.balance_of(owner) }
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 { self.ledger.allowance(owner, spender) }

    pub fn transfer(&mut self, to: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.ledger.move_balance(caller, to, amount);
        true
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.ledger.approve(caller, spender, amount);
        true
    }

    pub fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.ledger.spend_allowance(from, caller, amount);
        self.ledger.move_balance(from, to, amount);
        true
    }

    /// Unrestricted mint, for tests and local networks
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.ledger.mint(to, amount);
    }
}

/// Wrapped CSPR: attached motes are minted 1:1 and burned on unwrap
#[odra::module]
pub struct WrappedNative {
    ledger: SubModule<TokenLedger>,
}

#[odra::module]
impl WrappedNative {
    pub fn init(&mut self) {
        self.ledger.init(String::from("Wrapped CSPR"), String::from("WCSPR"), 9);
    }

    pub fn name(&self) -> String { self.ledger.name() }
    pub fn symbol(&self) -> String { self.ledger.symbol() }
    pub fn decimals(&self) -> u8 { self.ledger.decimals() }
    pub fn total_supply(&self) -> U256 { self.ledger.total_supply() }
    pub fn balance_of(&self, owner: Address) -> U256 { self.ledger.balance_of(owner) }
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 { self.ledger.allowance(owner, spender) }

    pub fn transfer(&mut self, to: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.ledger.move_balance(caller, to, amount);
        true
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.ledger.approve(caller, spender, amount);
        true
    }

    pub fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool {
        let caller = self.env().caller();
        self.ledger.spend_allowance(from, caller, amount);
        self.ledger.move_balance(from, to, amount);
        true
    }

    /// Wrap the attached CSPR for the caller
    #[odra(payable)]
    pub fn deposit(&mut self) {
        let amount = U256::from(self.env().attached_value().as_u128());
        if amount.is_zero() {
            self.env().revert(TokenError::InsufficientNativeValue);
        }
        let caller = self.env().caller();
        self.ledger.mint(caller, amount);
    }

    /// Unwrap to the caller
    pub fn withdraw(&mut self, amount: U256) {
        let caller = self.env().caller();
        self.withdraw_to(caller, amount);
    }

    /// Burn the caller's wrapped balance and pay the CSPR to `recipient`
    pub fn withdraw_to(&mut self, recipient: Address, amount: U256) {
        let caller = self.env().caller();
        self.ledger.burn(caller, amount);
        self.env().transfer_tokens(&recipient, &U512::from(amount.as_u128()));
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use odra::host::{Deployer, HostRef, NoArgs};

    #[test]
    fn test_token_decimals_are_configurable() {
        let env = odra_test::env();
        let token = TestToken::deploy(&env, TestTokenInitArgs {
            name: String::from("USD Coin"),
            symbol: String::from("USDC"),
            decimals: 6,
        });
        assert_eq!(token.decimals(), 6);
        assert_eq!(token.symbol(), "USDC");
    }

    #[test]
    fn test_wrap_and_unwrap() {
        let env = odra_test::env();
        let mut wnative = WrappedNative::deploy(&env, NoArgs);
        let user = env.get_account(1);
        let recipient = env.get_account(2);
        let amount = U256::from(5_000_000_000u64);

        env.set_caller(user);
        wnative.with_tokens(U512::from(5_000_000_000u64)).deposit();
        assert_eq!(wnative.balance_of(user), amount);
        assert_eq!(env.balance_of(&wnative.address().clone()), U512::from(5_000_000_000u64));

        let before = env.balance_of(&recipient);
        wnative.withdraw_to(recipient, U256::from(2_000_000_000u64));
        assert_eq!(wnative.balance_of(user), U256::from(3_000_000_000u64));
        assert_eq!(wnative.total_supply(), U256::from(3_000_000_000u64));
        assert_eq!(env.balance_of(&recipient), before + U512::from(2_000_000_000u64));
    }

    #[test]
    fn test_deposit_without_value_reverts() {
        let env = odra_test::env();
        let mut wnative = WrappedNative::deploy(&env, NoArgs);
        assert_eq!(wnative.try_deposit(), Err(TokenError::InsufficientNativeValue.into()));
    }
}
