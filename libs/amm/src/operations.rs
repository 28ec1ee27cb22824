//! Token-to-token swaps against a stable pool
//!
//! Both directions hold the invariant of the pre-trade balances fixed
//! (rounded up) and solve for the other side's balance. One unit is always
//! kept by the pool: exact-in pays one unit less, exact-out charges one unit
//! more. These offsets match the contract and must not be removed.

use crate::balance::get_token_balance_given_invariant_and_all_other_balances;
use crate::error::StableMathError;
use crate::fixed_point::{FixedPoint, Rounding, ONE};
use crate::invariant::calculate_invariant;
use primitive_types::U256;
use tracing::debug;

/// Result of a quote together with the pool balances after the trade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeOutcome {
    /// Amount the trader receives or pays, depending on the operation
    pub amount: U256,
    /// Pool balances once the trade settles
    pub balances: Vec<U256>,
}

/// Output amount for an exact input amount
///
/// The fee is charged on the input before the curve is evaluated, with the
/// fee amount rounded up.
pub fn exact_token_in_for_token_out(
    amplification: U256,
    balances: &[U256],
    token_index_in: usize,
    token_index_out: usize,
    amount_in: U256,
    fee: U256,
) -> Result<TradeOutcome, StableMathError> {
    validate_pair(balances, token_index_in, token_index_out)?;
    validate_fee(fee)?;

    let amount_in_after_fee = subtract_fee(amount_in, fee)?;
    // Rounding the invariant up makes the solved balance out larger
    let invariant = calculate_invariant(amplification, balances, Rounding::Up)?;

    let mut scratch = balances.to_vec();
    scratch[token_index_in] = FixedPoint::add(balances[token_index_in], amount_in_after_fee)?;
    let final_balance_out = get_token_balance_given_invariant_and_all_other_balances(
        amplification,
        &scratch,
        invariant,
        token_index_out,
    )?;

    let amount_out = FixedPoint::sub(
        FixedPoint::sub(balances[token_index_out], final_balance_out)?,
        U256::one(),
    )?;

    debug!(
        "Exact in: {} of token {} -> {} of token {}",
        amount_in, token_index_in, amount_out, token_index_out
    );

    let mut post_trade = balances.to_vec();
    post_trade[token_index_in] = FixedPoint::add(balances[token_index_in], amount_in)?;
    post_trade[token_index_out] = FixedPoint::sub(balances[token_index_out], amount_out)?;

    Ok(TradeOutcome {
        amount: amount_out,
        balances: post_trade,
    })
}

/// Input amount required for an exact output amount
///
/// The curve gives the net input; the fee is then grossed up so that the
/// amount left after the fee equals that requirement.
pub fn token_in_for_exact_token_out(
    amplification: U256,
    balances: &[U256],
    token_index_in: usize,
    token_index_out: usize,
    amount_out: U256,
    fee: U256,
) -> Result<TradeOutcome, StableMathError> {
    validate_pair(balances, token_index_in, token_index_out)?;
    validate_fee(fee)?;

    let invariant = calculate_invariant(amplification, balances, Rounding::Up)?;

    let mut scratch = balances.to_vec();
    scratch[token_index_out] = FixedPoint::sub(balances[token_index_out], amount_out)?;
    let final_balance_in = get_token_balance_given_invariant_and_all_other_balances(
        amplification,
        &scratch,
        invariant,
        token_index_in,
    )?;

    let amount_in_without_fee = FixedPoint::add(
        FixedPoint::sub(final_balance_in, balances[token_index_in])?,
        U256::one(),
    )?;
    let amount_in = add_fee(amount_in_without_fee, fee)?;

    debug!(
        "Exact out: {} of token {} <- {} of token {}",
        amount_out, token_index_out, amount_in, token_index_in
    );

    scratch[token_index_in] = FixedPoint::add(balances[token_index_in], amount_in)?;

    Ok(TradeOutcome {
        amount: amount_in,
        balances: scratch,
    })
}

/// `amount - amount * fee`, fee amount rounded up
pub(crate) fn subtract_fee(amount: U256, fee: U256) -> Result<U256, StableMathError> {
    let fee_amount = FixedPoint::mul_up_fixed(amount, fee)?;
    Ok(FixedPoint::sub(amount, fee_amount)?)
}

/// `amount / (1 - fee)`, rounded up
pub(crate) fn add_fee(amount: U256, fee: U256) -> Result<U256, StableMathError> {
    let remaining = FixedPoint::complement_fixed(fee);
    Ok(FixedPoint::div_up_fixed(amount, remaining)?)
}

pub(crate) fn validate_index(balances: &[U256], index: usize) -> Result<(), StableMathError> {
    if index >= balances.len() {
        return Err(StableMathError::InvalidTokenIndex {
            index,
            token_count: balances.len(),
        });
    }
    Ok(())
}

pub(crate) fn validate_pair(
    balances: &[U256],
    token_index_in: usize,
    token_index_out: usize,
) -> Result<(), StableMathError> {
    validate_index(balances, token_index_in)?;
    validate_index(balances, token_index_out)?;
    if token_index_in == token_index_out {
        return Err(StableMathError::SameTokenIndex {
            index: token_index_in,
        });
    }
    Ok(())
}

pub(crate) fn validate_fee(fee: U256) -> Result<(), StableMathError> {
    if fee >= ONE {
        return Err(StableMathError::InvalidFee { fee });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_point::AMP_PRECISION;

    fn tokens(units: &[u64]) -> Vec<U256> {
        units.iter().map(|u| U256::from(*u) * ONE).collect()
    }

    fn amp(a: u64) -> U256 {
        U256::from(a) * AMP_PRECISION
    }

    fn dec(s: &str) -> U256 {
        U256::from_dec_str(s).unwrap()
    }

    fn three_pool() -> Vec<U256> {
        tokens(&[1_000_000, 1_200_000, 900_000])
    }

    /// 0.04% swap fee
    fn pool_fee() -> U256 {
        U256::from(400_000_000_000_000u64)
    }

    #[test]
    fn test_exact_in_matches_contract() {
        let balances = three_pool();
        let amount_in = U256::from(1000u64) * ONE;

        let outcome =
            exact_token_in_for_token_out(amp(200), &balances, 0, 1, amount_in, pool_fee()).unwrap();

        assert_eq!(outcome.amount, dec("1000470894377598996145"));
        assert_eq!(outcome.balances[0], balances[0] + amount_in);
        assert_eq!(outcome.balances[1], balances[1] - outcome.amount);
        assert_eq!(outcome.balances[2], balances[2]);
    }

    #[test]
    fn test_exact_out_matches_contract() {
        let balances = three_pool();
        let amount_out = U256::from(1000u64) * ONE;

        let outcome =
            token_in_for_exact_token_out(amp(200), &balances, 1, 2, amount_out, pool_fee())
                .unwrap();

        assert_eq!(outcome.amount, dec("1001865635010847087871"));
        assert_eq!(outcome.balances[0], balances[0]);
        assert_eq!(outcome.balances[1], balances[1] + outcome.amount);
        assert_eq!(outcome.balances[2], balances[2] - amount_out);
    }

    #[test]
    fn test_input_slice_is_not_mutated() {
        let balances = three_pool();
        let snapshot = balances.clone();

        let _ = exact_token_in_for_token_out(amp(200), &balances, 0, 1, ONE, pool_fee()).unwrap();
        let _ = token_in_for_exact_token_out(amp(200), &balances, 0, 1, ONE, pool_fee()).unwrap();

        assert_eq!(balances, snapshot);
    }

    #[test]
    fn test_round_trip_two_token_pool() {
        let balances = tokens(&[1000, 1000]);
        let amount_in = U256::from(10u64) * ONE;

        let out = exact_token_in_for_token_out(amp(100), &balances, 0, 1, amount_in, U256::zero())
            .unwrap()
            .amount;
        let back = token_in_for_exact_token_out(amp(100), &balances, 0, 1, out, U256::zero())
            .unwrap()
            .amount;

        assert_eq!(out, dec("9999009901970393107"));
        assert_eq!(back, dec("10000000000000000039"));
        assert_ne!(back, amount_in);
    }

    #[test]
    fn test_fee_monotonicity() {
        let balances = three_pool();
        let amount = U256::from(1000u64) * ONE;
        let fees = [
            U256::zero(),
            U256::from(1_000_000_000_000_000u64),
            U256::from(10_000_000_000_000_000u64),
        ];

        let outs: Vec<U256> = fees
            .iter()
            .map(|fee| {
                exact_token_in_for_token_out(amp(200), &balances, 0, 1, amount, *fee)
                    .unwrap()
                    .amount
            })
            .collect();
        let ins: Vec<U256> = fees
            .iter()
            .map(|fee| {
                token_in_for_exact_token_out(amp(200), &balances, 0, 1, amount, *fee)
                    .unwrap()
                    .amount
            })
            .collect();

        assert_eq!(outs[0], dec("1000871241064995192513"));
        assert_eq!(outs[1], dec("999870374343790959104"));
        assert_eq!(outs[2], dec("990862573445890046327"));
        assert_eq!(ins[0], dec("999129513403685922483"));
        assert_eq!(ins[1], dec("1000129643046732655139"));
        assert_eq!(ins[2], dec("1009221730710793861094"));
    }

    #[test]
    fn test_fee_helpers_round_toward_pool() {
        // 1 wei at 0.04% fee still pays a full unit of fee
        assert_eq!(subtract_fee(U256::one(), pool_fee()).unwrap(), U256::zero());
        assert_eq!(subtract_fee(ONE, U256::zero()).unwrap(), ONE);
        // 1 / (1 - 0.5) = 2
        assert_eq!(
            add_fee(ONE, ONE / U256::from(2u64)).unwrap(),
            ONE * U256::from(2u64)
        );
        assert_eq!(
            add_fee(U256::from(3u64), ONE / U256::from(2u64)).unwrap(),
            U256::from(6u64)
        );
    }

    #[test]
    fn test_rejects_invalid_requests() {
        let balances = three_pool();

        assert_eq!(
            exact_token_in_for_token_out(amp(200), &balances, 0, 3, ONE, pool_fee()),
            Err(StableMathError::InvalidTokenIndex {
                index: 3,
                token_count: 3
            })
        );
        assert_eq!(
            token_in_for_exact_token_out(amp(200), &balances, 1, 1, ONE, pool_fee()),
            Err(StableMathError::SameTokenIndex { index: 1 })
        );
        assert_eq!(
            exact_token_in_for_token_out(amp(200), &balances, 0, 1, ONE, ONE),
            Err(StableMathError::InvalidFee { fee: ONE })
        );
    }

    #[test]
    fn test_exact_out_beyond_balance_underflows() {
        let balances = tokens(&[1000, 1000]);

        let result = token_in_for_exact_token_out(
            amp(100),
            &balances,
            0,
            1,
            U256::from(1001u64) * ONE,
            U256::zero(),
        );

        assert!(matches!(result, Err(StableMathError::Math(_))));
    }
}
