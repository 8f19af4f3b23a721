//! Round-based withdrawal queue
use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::VaultError;
use crate::math::{mul_div, Rounding};
use super::OracleRewardVault;

/// One withdrawal round. Amounts are written once, when the strategy executes it.
#[odra::odra_type]
#[derive(Default)]
pub struct QueuedWithdrawal {
    /// Shares queued by all users in the round
    pub total_queued_shares: U256,
    /// Token X received for the round
    pub total_amount_x: U256,
    /// Token Y received for the round
    pub total_amount_y: U256,
}

impl QueuedWithdrawal {
    /// Pro-rata share of the round's tokens for `user_shares`, rounded down
    pub fn redeemable(&self, user_shares: U256) -> Result<(U256, U256), VaultError> {
        if user_shares > self.total_queued_shares {
            return Err(VaultError::InvalidShares);
        }
        if self.total_queued_shares.is_zero() {
            return Ok((U256::zero(), U256::zero()));
        }

        let amount_x = mul_div(self.total_amount_x, user_shares, self.total_queued_shares, Rounding::Down)?;
        let amount_y = mul_div(self.total_amount_y, user_shares, self.total_queued_shares, Rounding::Down)?;
        Ok((amount_x, amount_y))
    }
}

impl OracleRewardVault {
    pub(super) fn round(&self, round: u32) -> QueuedWithdrawal {
        self.rounds.get(&round).unwrap_or_default()
    }

    pub(super) fn queued_shares_of(&self, round: u32, user: Address) -> U256 {
        self.queued_shares.get(&(round, user)).unwrap_or_default()
    }

    /// Holder of the open round's queued shares: the strategy, or the vault in emergency mode
    pub(super) fn custody_address(&self) -> Address {
        self.strategy
            .get_or_default()
            .unwrap_or_else(|| self.env().self_address())
    }

    /// Moves the open round's queued shares to the next custodian
    pub(super) fn move_custody(&mut self, from: Address, to: Address) {
        let queued = self.round(self.current_round.get_or_default()).total_queued_shares;
        if !queued.is_zero() && from != to {
            self.share_token.move_balance(from, to, queued);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executed(shares: u64, amount_x: u64, amount_y: u64) -> QueuedWithdrawal {
        QueuedWithdrawal {
            total_queued_shares: U256::from(shares),
            total_amount_x: U256::from(amount_x),
            total_amount_y: U256::from(amount_y),
        }
    }

    #[test]
    fn test_redeemable_is_pro_rata() {
        let round = executed(300, 1_000, 90);
        assert_eq!(round.redeemable(U256::from(100)).unwrap(), (U256::from(333), U256::from(30)));
        assert_eq!(round.redeemable(U256::from(200)).unwrap(), (U256::from(666), U256::from(60)));
    }

    #[test]
    fn test_redeemable_never_exceeds_round() {
        let round = executed(7, 100, 100);
        let mut paid_x = U256::zero();
        for shares in [1u64, 2, 4] {
            paid_x = paid_x + round.redeemable(U256::from(shares)).unwrap().0;
        }
        assert!(paid_x <= U256::from(100));
        assert_eq!(round.redeemable(U256::from(8)), Err(VaultError::InvalidShares));
    }

    #[test]
    fn test_redeem_nothing() {
        let round = executed(10, 100, 100);
        assert_eq!(round.redeemable(U256::zero()).unwrap(), (U256::zero(), U256::zero()));
        assert_eq!(QueuedWithdrawal::default().redeemable(U256::zero()).unwrap(), (U256::zero(), U256::zero()));
    }
}
