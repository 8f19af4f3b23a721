//! Reward accumulator
//!
//! Every reward token keeps a running `acc_reward_per_share` over the phantom
//! share supply. Inflows are discovered lazily by comparing the vault's token
//! balance, net of withdrawal reservations, with the balance seen at the last
//! reconciliation. Users are settled against the accumulator before their
//! phantom amount changes.
use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::VaultError;
use crate::events::{RewardPaid, RewardTokenAdded};
use crate::math::{mul_div, shift_precision, Rounding, SafeMath, ACC_REWARD_PRECISION, PHANTOM_DECIMALS, SHARES_DECIMALS};
use crate::strategy::StrategyContractRef;
use super::config::PendingReward;
use super::OracleRewardVault;

/// Accumulator state of one reward token
#[odra::odra_type]
pub struct RewardInfo {
    /// Reward token
    pub token: Address,
    /// Balance observed at the last reconciliation, minus payouts since
    pub last_reward_balance: U256,
    /// Rewards per phantom share, scaled by `ACC_REWARD_PRECISION`
    pub acc_reward_per_share: U256,
}

impl RewardInfo {
    pub fn new(token: Address, initial_balance: U256) -> Self {
        Self {
            token,
            last_reward_balance: initial_balance,
            acc_reward_per_share: U256::zero(),
        }
    }

    /// Folds a newly observed balance into the accumulator.
    ///
    /// Only growth is distributed, and only to current holders. A lower
    /// balance, or growth while the phantom supply is zero, just becomes the
    /// new baseline.
    pub fn accrue(&mut self, observed_balance: U256, phantom_supply: U256) -> Result<(), VaultError> {
        if observed_balance == self.last_reward_balance {
            return Ok(());
        }
        if observed_balance > self.last_reward_balance && !phantom_supply.is_zero() {
            let inflow = observed_balance - self.last_reward_balance;
            let per_share = mul_div(inflow, U256::from(ACC_REWARD_PRECISION), phantom_supply, Rounding::Down)?;
            self.acc_reward_per_share = SafeMath::add(self.acc_reward_per_share, per_share)?;
        }
        self.last_reward_balance = observed_balance;
        Ok(())
    }

    /// `phantom_amount * acc_reward_per_share`, descaled
    pub fn reward_debt(&self, phantom_amount: U256) -> Result<U256, VaultError> {
        mul_div(phantom_amount, self.acc_reward_per_share, U256::from(ACC_REWARD_PRECISION), Rounding::Down)
    }

    pub fn pending(&self, phantom_amount: U256, reward_debt: U256) -> Result<U256, VaultError> {
        Ok(self.reward_debt(phantom_amount)?.saturating_sub(reward_debt))
    }
}

/// Shares expressed at phantom precision
pub fn phantom_amount(shares: U256) -> Result<U256, VaultError> {
    shift_precision(shares, SHARES_DECIMALS, PHANTOM_DECIMALS, Rounding::Down)
}

impl OracleRewardVault {
    /// Harvests the strategy and reconciles every tracked reward token.
    /// Without a strategy the cached accumulators stand as they are.
    pub(super) fn update_pool(&mut self) {
        let Some(strategy) = self.strategy.get_or_default() else {
            return;
        };
        let mut strategy = StrategyContractRef::new(self.env(), strategy);
        if strategy.has_rewards() {
            self.add_reward_token(strategy.get_reward_token());
        }
        if strategy.has_extra_rewards() {
            self.add_reward_token(strategy.get_extra_reward_token());
        }
        strategy.harvest_rewards();

        let phantom_supply = self.phantom_share_supply.get_or_default();
        for index in 0..self.reward_token_count.get_or_default() {
            let mut info = self.reward_info(index);
            let observed = self.observed_reward_balance(info.token);
            info.accrue(observed, phantom_supply).unwrap_or_revert(&self.env());
            self.reward_infos.set(&index, info);
        }
    }

    /// Settles `user` against every accumulator, then applies the share delta
    /// to their phantom amount and resets their debts to the new baseline.
    pub(super) fn modify_user(&mut self, user: Address, delta_shares: U256, increase: bool) {
        let phantom = self.phantom_amounts.get(&user).unwrap_or_default();
        let delta = phantom_amount(delta_shares).unwrap_or_revert(&self.env());
        let new_phantom = if increase {
            phantom.checked_add(delta).unwrap_or_revert_with(&self.env(), VaultError::Overflow)
        } else {
            phantom.checked_sub(delta).unwrap_or_revert_with(&self.env(), VaultError::InsufficientShares)
        };

        let mut payouts = Vec::new();
        for index in 0..self.reward_token_count.get_or_default() {
            let mut info = self.reward_info(index);
            let debt_key = (user, info.token);
            let debt = self.reward_debts.get(&debt_key).unwrap_or_default();
            let pending = info.pending(phantom, debt).unwrap_or_revert(&self.env());

            let paid = SafeMath::min(pending, info.last_reward_balance);
            if !paid.is_zero() {
                info.last_reward_balance = info.last_reward_balance - paid;
                payouts.push((info.token, paid));
            }

            let new_debt = info.reward_debt(new_phantom).unwrap_or_revert(&self.env());
            self.reward_debts.set(&debt_key, new_debt);
            self.reward_infos.set(&index, info);
        }

        self.phantom_amounts.set(&user, new_phantom);
        let supply = self.phantom_share_supply.get_or_default();
        let new_supply = if increase {
            supply.checked_add(delta).unwrap_or_revert_with(&self.env(), VaultError::Overflow)
        } else {
            supply.checked_sub(delta).unwrap_or_revert_with(&self.env(), VaultError::Underflow)
        };
        self.phantom_share_supply.set(new_supply);

        for (token, amount) in payouts {
            self.safe_transfer(token, user, amount);
            self.env().emit_event(RewardPaid { user, token, amount });
        }
    }

    /// Starts tracking `token`. Balance already held is treated as accounted for.
    pub(super) fn add_reward_token(&mut self, token: Address) {
        if self.cached_reward_tokens.get(&token).unwrap_or_default() {
            return;
        }
        if token == self.env().self_address() {
            self.env().revert(VaultError::InvalidRewardToken);
        }

        let initial_balance = self.observed_reward_balance(token);
        let index = self.reward_token_count.get_or_default();
        self.reward_infos.set(&index, RewardInfo::new(token, initial_balance));
        self.reward_token_count.set(index + 1);
        self.cached_reward_tokens.set(&token, true);

        self.env().emit_event(RewardTokenAdded { token, initial_balance });
    }

    /// Vault balance of `token` that is not reserved for executed rounds
    pub(super) fn observed_reward_balance(&self, token: Address) -> U256 {
        let config = self.vault_config();
        let mut balance = self.token_balance(token);
        if token == config.token_x {
            balance = balance.saturating_sub(self.total_reserved_x.get_or_default());
        }
        if token == config.token_y {
            balance = balance.saturating_sub(self.total_reserved_y.get_or_default());
        }
        balance
    }

    /// Reconciled but undistributed rewards held in `token`
    pub(super) fn reward_reservation(&self, token: Address) -> U256 {
        for index in 0..self.reward_token_count.get_or_default() {
            let info = self.reward_info(index);
            if info.token == token {
                return info.last_reward_balance;
            }
        }
        U256::zero()
    }

    /// Pending rewards of `user` as of now, without harvesting the strategy
    pub(super) fn pending_rewards(&self, user: Address) -> Vec<PendingReward> {
        let phantom = self.phantom_amounts.get(&user).unwrap_or_default();
        let phantom_supply = self.phantom_share_supply.get_or_default();
        let reconcile = self.strategy.get_or_default().is_some();

        let mut pending = Vec::new();
        for index in 0..self.reward_token_count.get_or_default() {
            let mut info = self.reward_info(index);
            if reconcile {
                let observed = self.observed_reward_balance(info.token);
                info.accrue(observed, phantom_supply).unwrap_or_revert(&self.env());
            }
            let debt = self.reward_debts.get(&(user, info.token)).unwrap_or_default();
            let amount = info.pending(phantom, debt).unwrap_or_revert(&self.env());
            pending.push(PendingReward { token: info.token, amount });
        }
        pending
    }

    pub(super) fn reward_info(&self, index: u32) -> RewardInfo {
        self.reward_infos
            .get(&index)
            .unwrap_or_revert_with(&self.env(), VaultError::InvalidRewardToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odra::casper_types::account::AccountHash;

    fn token() -> Address {
        Address::Account(AccountHash::new([5u8; 32]))
    }

    fn phantom(shares: u64) -> U256 {
        phantom_amount(U256::from(shares)).unwrap()
    }

    #[test]
    fn test_phantom_scaling() {
        assert_eq!(phantom(1), U256::from(1_000_000_000_000u64));
    }

    #[test]
    fn test_accrue_distributes_growth_only() {
        let mut info = RewardInfo::new(token(), U256::zero());
        let supply = phantom(100_000_000);

        info.accrue(U256::from(1_000), supply).unwrap();
        let after_inflow = info.acc_reward_per_share;
        assert!(!after_inflow.is_zero());
        assert_eq!(info.last_reward_balance, U256::from(1_000));

        // A drop rebases without touching the accumulator
        info.accrue(U256::from(400), supply).unwrap();
        assert_eq!(info.acc_reward_per_share, after_inflow);
        assert_eq!(info.last_reward_balance, U256::from(400));
    }

    #[test]
    fn test_accrue_without_holders_only_rebases() {
        let mut info = RewardInfo::new(token(), U256::zero());
        info.accrue(U256::from(1_000), U256::zero()).unwrap();
        assert_eq!(info.acc_reward_per_share, U256::zero());
        assert_eq!(info.last_reward_balance, U256::from(1_000));

        // Later holders only see what arrives after them
        info.accrue(U256::from(1_500), phantom(100_000_000)).unwrap();
        let pending = info.pending(phantom(100_000_000), U256::zero()).unwrap();
        assert_eq!(pending, U256::from(500));
    }

    #[test]
    fn test_pending_is_proportional() {
        let mut info = RewardInfo::new(token(), U256::zero());
        let alice = phantom(99_000_000);
        let bob = phantom(49_500_000);
        let reward = U256::from(148_500u64) * U256::exp10(15);

        info.accrue(reward, alice + bob).unwrap();
        let alice_pending = info.pending(alice, U256::zero()).unwrap();
        let bob_pending = info.pending(bob, U256::zero()).unwrap();
        assert_eq!(alice_pending, U256::from(99u64) * U256::exp10(18));
        assert_eq!(bob_pending, U256::from(495u64) * U256::exp10(17));

        // Settled debt leaves nothing pending
        let debt = info.reward_debt(alice).unwrap();
        assert_eq!(info.pending(alice, debt).unwrap(), U256::zero());
    }
}
