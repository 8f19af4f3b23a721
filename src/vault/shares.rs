//! Share pricing for deposits and redemptions
use odra::casper_types::U256;
use crate::errors::VaultError;
use crate::math::{mul_div, shift_precision, Rounding, SafeMath, SHARES_DECIMALS};
use crate::oracle::OraclePrice;

/// Outcome of pricing a deposit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SharePreview {
    pub shares: U256,
    pub effective_x: U256,
    pub effective_y: U256,
}

/// Prices a deposit into an empty vault at the oracle rate.
///
/// The lower-valued side is taken whole and the other side is trimmed to the
/// same value. Shares equal the Y leg at share precision.
pub fn preview_initial_shares(
    amount_x: U256,
    amount_y: U256,
    oracle: &OraclePrice,
) -> Result<SharePreview, VaultError> {
    let x_in_y = oracle.x_to_y(amount_x)?;
    let (effective_x, effective_y) = if x_in_y <= amount_y {
        (amount_x, x_in_y)
    } else {
        (oracle.y_to_x(amount_y)?, amount_y)
    };

    let shares = shift_precision(effective_y, oracle.decimals_y(), SHARES_DECIMALS, Rounding::Down)?;
    Ok(SharePreview { shares, effective_x, effective_y })
}

/// Prices a deposit against the current pool composition.
///
/// The side with the smaller proportional contribution is taken whole and the
/// other side is matched to the pool ratio, rounding up in the vault's favour.
pub fn preview_proportional_shares(
    amount_x: U256,
    amount_y: U256,
    total_x: U256,
    total_y: U256,
    total_shares: U256,
) -> Result<SharePreview, VaultError> {
    if total_x.is_zero() && total_y.is_zero() {
        return Err(VaultError::EmptyPool);
    }

    let (effective_x, effective_y) = if total_x.is_zero() {
        (U256::zero(), amount_y)
    } else if total_y.is_zero() {
        (amount_x, U256::zero())
    } else if SafeMath::mul(amount_x, total_y)? <= SafeMath::mul(amount_y, total_x)? {
        (amount_x, mul_div(amount_x, total_y, total_x, Rounding::Up)?)
    } else {
        (mul_div(amount_y, total_x, total_y, Rounding::Up)?, amount_y)
    };

    let shares = mul_div(
        total_shares,
        SafeMath::add(effective_x, effective_y)?,
        SafeMath::add(total_x, total_y)?,
        Rounding::Down,
    )?;
    Ok(SharePreview { shares, effective_x, effective_y })
}

/// Pro-rata token amounts for `shares` out of `total_shares`, rounded down.
pub fn preview_amounts(
    shares: U256,
    total_shares: U256,
    total_x: U256,
    total_y: U256,
) -> Result<(U256, U256), VaultError> {
    if shares > total_shares {
        return Err(VaultError::InvalidShares);
    }
    if total_shares.is_zero() {
        return Ok((U256::zero(), U256::zero()));
    }

    let amount_x = mul_div(total_x, shares, total_shares, Rounding::Down)?;
    let amount_y = mul_div(total_y, shares, total_shares, Rounding::Down)?;
    Ok((amount_x, amount_y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::pow10;

    fn parity_oracle() -> OraclePrice {
        OraclePrice::from_feeds(pow10(8), 8, pow10(8), 8, 18, 6).unwrap()
    }

    fn x(amount: u64) -> U256 {
        U256::from(amount) * pow10(18)
    }

    fn y(amount: u64) -> U256 {
        U256::from(amount) * pow10(6)
    }

    #[test]
    fn test_initial_shares_balanced() {
        let preview = preview_initial_shares(x(100), y(100), &parity_oracle()).unwrap();
        assert_eq!(preview.effective_x, x(100));
        assert_eq!(preview.effective_y, y(100));
        assert_eq!(preview.shares, U256::from(100_000_000u64));
    }

    #[test]
    fn test_initial_shares_trims_richer_side() {
        // Too much X: Y is taken whole and X trimmed to its value
        let preview = preview_initial_shares(x(150), y(100), &parity_oracle()).unwrap();
        assert_eq!(preview.effective_x, x(100));
        assert_eq!(preview.effective_y, y(100));

        // Too much Y: X is taken whole
        let preview = preview_initial_shares(x(40), y(100), &parity_oracle()).unwrap();
        assert_eq!(preview.effective_x, x(40));
        assert_eq!(preview.effective_y, y(40));
        assert_eq!(preview.shares, U256::from(40_000_000u64));
    }

    #[test]
    fn test_proportional_shares_balanced() {
        let preview = preview_proportional_shares(x(50), y(50), x(100), y(100), U256::from(100_000_000u64)).unwrap();
        assert_eq!(preview.shares, U256::from(50_000_000u64));
        assert_eq!(preview.effective_x, x(50));
        assert_eq!(preview.effective_y, y(50));
    }

    #[test]
    fn test_proportional_shares_caps_oversupplied_side() {
        let total_shares = U256::from(100_000_000u64);

        let preview = preview_proportional_shares(x(50), y(80), x(100), y(100), total_shares).unwrap();
        assert_eq!(preview.effective_x, x(50));
        assert_eq!(preview.effective_y, y(50));
        assert_eq!(preview.shares, U256::from(50_000_000u64));

        let preview = preview_proportional_shares(x(90), y(20), x(100), y(100), total_shares).unwrap();
        assert_eq!(preview.effective_x, x(20));
        assert_eq!(preview.effective_y, y(20));
        assert_eq!(preview.shares, U256::from(20_000_000u64));
    }

    #[test]
    fn test_proportional_derived_side_rounds_up() {
        // Pool 3:2, depositing 1 X implies 2/3 Y which rounds up to 1
        let preview = preview_proportional_shares(U256::one(), U256::from(5), U256::from(3), U256::from(2), U256::from(5)).unwrap();
        assert_eq!(preview.effective_x, U256::one());
        assert_eq!(preview.effective_y, U256::one());
        assert_eq!(preview.shares, U256::from(2));
    }

    #[test]
    fn test_one_sided_and_empty_pool() {
        let preview = preview_proportional_shares(x(10), y(10), U256::zero(), y(100), U256::from(100)).unwrap();
        assert_eq!(preview.effective_x, U256::zero());
        assert_eq!(preview.effective_y, y(10));
        assert_eq!(preview.shares, U256::from(10));

        assert_eq!(
            preview_proportional_shares(x(10), y(10), U256::zero(), U256::zero(), U256::from(100)),
            Err(VaultError::EmptyPool)
        );
    }

    #[test]
    fn test_preview_amounts() {
        let (amount_x, amount_y) = preview_amounts(U256::from(1), U256::from(3), U256::from(10), U256::from(20)).unwrap();
        assert_eq!(amount_x, U256::from(3));
        assert_eq!(amount_y, U256::from(6));

        assert_eq!(
            preview_amounts(U256::from(4), U256::from(3), U256::from(10), U256::from(20)),
            Err(VaultError::InvalidShares)
        );
        assert_eq!(
            preview_amounts(U256::zero(), U256::zero(), U256::from(10), U256::from(20)),
            Ok((U256::zero(), U256::zero()))
        );
    }
}
