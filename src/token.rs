//! CEP-18 balance ledger embedded by every token contract in the crate
//!
//! Contracts own a `SubModule<TokenLedger>` and expose the CEP-18 entry
//! points themselves. The vault relies on this to settle rewards before any
//! share balance moves.
use odra::prelude::*;
use odra::casper_types::U256;
use crate::events::{Transfer, Approval};
use crate::errors::TokenError;

/// Balances, allowances and supply of one token
#[odra::module]
pub struct TokenLedger {
    name: Var<String>,
    symbol: Var<String>,
    decimals: Var<u8>,
    total_supply: Var<U256>,
    /// owner -> balance
    balances: Mapping<Address, U256>,
    /// (owner, spender) -> remaining allowance
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl TokenLedger {
    pub fn init(&mut self, name: String, symbol: String, decimals: u8) {
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
        self.total_supply.set(U256::zero());
    }

    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);
        self.env().emit_event(Approval {
            owner,
            spender,
            value: amount,
        });
    }

    /// Lowers `spender`'s allowance over `owner` by `amount`
    pub fn spend_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        let remaining = self
            .allowance(owner, spender)
            .checked_sub(amount)
            .unwrap_or_revert_with(&self.env(), TokenError::InsufficientAllowance);
        self.approve(owner, spender, remaining);
    }

    pub fn mint(&mut self, to: Address, amount: U256) {
        self.total_supply.set(self.total_supply() + amount);
        self.balances.set(&to, self.balance_of(to) + amount);
        self.env().emit_event(Transfer {
            from: self.env().self_address(),
            to,
            value: amount,
        });
    }

    pub fn burn(&mut self, from: Address, amount: U256) {
        self.debit(from, amount);
        self.total_supply.set(self.total_supply() - amount);
        self.env().emit_event(Transfer {
            from,
            to: self.env().self_address(),
            value: amount,
        });
    }

    /// Moves a balance between holders; supply is unchanged
    pub fn move_balance(&mut self, from: Address, to: Address, amount: U256) {
        self.debit(from, amount);
        self.balances.set(&to, self.balance_of(to) + amount);
        self.env().emit_event(Transfer {
            from,
            to,
            value: amount,
        });
    }

    fn debit(&mut self, owner: Address, amount: U256) {
        let remaining = self
            .balance_of(owner)
            .checked_sub(amount)
            .unwrap_or_revert_with(&self.env(), TokenError::InsufficientBalance);
        self.balances.set(&owner, remaining);
    }
}

/// Cross-contract view of a CEP-18 token
#[odra::external_contract]
pub trait Cep18Token {
    fn balance_of(&self, owner: Address) -> U256;

    fn transfer(&mut self, to: Address, amount: U256) -> bool;

    fn transfer_from(&mut self, from: Address, to: Address, amount: U256) -> bool;

    fn approve(&mut self, spender: Address, amount: U256) -> bool;

    fn allowance(&self, owner: Address, spender: Address) -> U256;

    fn total_supply(&self) -> U256;

    fn decimals(&self) -> u8;
}
