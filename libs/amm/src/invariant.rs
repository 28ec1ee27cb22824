//! StableSwap invariant solver
//!
//! ```text
//!   D = invariant                                        D^(n+1)
//!   A = amplification           A n^n S + D = A D n^n + ---------
//!   S = sum of balances                                  n^n P
//!   P = product of balances
//!   n = number of tokens
//! ```
//!
//! There is no closed form for `D` once `n > 2`, so it is found by Newton
//! iteration. Each step folds the balances into `P_D = n^n P / D^(n-1)` using
//! the previous estimate, then divides once to get the next estimate.

use crate::error::{RootFinderError, StableMathError};
use crate::fixed_point::{FixedPoint, Rounding, AMP_PRECISION};
use crate::solver::{Convergence, RootFinder};
use primitive_types::U256;
use tracing::debug;

/// Calculate the invariant `D` for `balances` under `amplification`
///
/// # Arguments
/// * `amplification` - A scaled by [`AMP_PRECISION`]
/// * `balances` - Pool balances, all at the same 18-decimal scale
/// * `rounding` - Direction of every division in the step; the amplification
///   term of the denominator is rounded the other way
///
/// # Returns
/// Zero for an empty pool without iterating, otherwise the converged `D`
pub fn calculate_invariant(
    amplification: U256,
    balances: &[U256],
    rounding: Rounding,
) -> Result<U256, StableMathError> {
    Ok(solve_invariant(amplification, balances, rounding)?.value)
}

/// Same as [`calculate_invariant`], also reporting the iteration count
///
/// An empty pool reports zero iterations.
pub fn solve_invariant(
    amplification: U256,
    balances: &[U256],
    rounding: Rounding,
) -> Result<Convergence, StableMathError> {
    let sum = balances
        .iter()
        .try_fold(U256::zero(), |acc, balance| FixedPoint::add(acc, *balance))?;

    if sum.is_zero() {
        return Ok(Convergence {
            value: U256::zero(),
            iterations: 0,
        });
    }

    let num_tokens = U256::from(balances.len());
    let amp_times_total = FixedPoint::mul(amplification, num_tokens)?;
    // Contract guarantees A >= 1, so this only underflows for invalid pools
    let amp_minus_precision = FixedPoint::sub(amp_times_total, AMP_PRECISION)?;
    let amp_times_sum = FixedPoint::mul(amp_times_total, sum)?;
    let num_tokens_plus_one = FixedPoint::add(num_tokens, U256::one())?;

    let result = RootFinder::converge("stable invariant", sum, |invariant| {
        let mut p_d = FixedPoint::mul(balances[0], num_tokens)?;
        for balance in &balances[1..] {
            p_d = FixedPoint::div(
                FixedPoint::mul(FixedPoint::mul(p_d, *balance)?, num_tokens)?,
                invariant,
                rounding,
            )?;
        }

        let numerator = FixedPoint::add(
            FixedPoint::mul(FixedPoint::mul(num_tokens, invariant)?, invariant)?,
            FixedPoint::div(
                FixedPoint::mul(amp_times_sum, p_d)?,
                AMP_PRECISION,
                rounding,
            )?,
        )?;
        let denominator = FixedPoint::add(
            FixedPoint::mul(num_tokens_plus_one, invariant)?,
            FixedPoint::div(
                FixedPoint::mul(amp_minus_precision, p_d)?,
                AMP_PRECISION,
                rounding.complement(),
            )?,
        )?;

        FixedPoint::div(numerator, denominator, rounding)
    });

    let convergence = result.map_err(into_stable_error)?;
    debug!(
        "Invariant {} converged in {} iterations ({:?})",
        convergence.value, convergence.iterations, rounding
    );
    Ok(convergence)
}

fn into_stable_error(err: RootFinderError) -> StableMathError {
    match err {
        RootFinderError::DidNotConverge { iterations, .. } => {
            StableMathError::InvariantDidNotConverge { iterations }
        }
        RootFinderError::Math(e) => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MathError;
    use crate::fixed_point::ONE;

    fn tokens(units: &[u64]) -> Vec<U256> {
        units.iter().map(|u| U256::from(*u) * ONE).collect()
    }

    fn amp(a: u64) -> U256 {
        U256::from(a) * AMP_PRECISION
    }

    #[test]
    fn test_empty_pool_has_zero_invariant() {
        for a in [0u64, 1, 100, 5000, 1_000_000] {
            let result =
                solve_invariant(amp(a), &[U256::zero(), U256::zero()], Rounding::Up).unwrap();
            assert_eq!(result.value, U256::zero());
            assert_eq!(result.iterations, 0);
        }
    }

    #[test]
    fn test_balanced_pool_invariant_equals_sum() {
        let result = solve_invariant(amp(100), &tokens(&[1000, 1000]), Rounding::Up).unwrap();

        assert_eq!(result.value, U256::from(2000u64) * ONE);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_three_token_pool_matches_contract() {
        let balances = tokens(&[1_000_000, 1_200_000, 900_000]);

        let up = solve_invariant(amp(200), &balances, Rounding::Up).unwrap();
        let down = solve_invariant(amp(200), &balances, Rounding::Down).unwrap();

        assert_eq!(
            up.value,
            U256::from_dec_str("3099888769460454695322189").unwrap()
        );
        assert_eq!(up.iterations, 4);
        assert_eq!(
            down.value,
            U256::from_dec_str("3099888769460454695322188").unwrap()
        );
        assert_eq!(down.iterations, 4);
    }

    #[test]
    fn test_imbalanced_pool_invariant_below_sum() {
        let balances = tokens(&[100, 10_000]);
        let sum = U256::from(10_100u64) * ONE;

        let invariant = calculate_invariant(amp(50), &balances, Rounding::Down).unwrap();

        assert!(invariant < sum);
        assert!(invariant > U256::from(8_500u64) * ONE);
    }

    #[test]
    fn test_cycling_estimates_do_not_converge() {
        let balances: Vec<U256> = [
            "1625692000000000000000",
            "413247789000000000000000",
            "825416748000000000000000",
            "991136412000000000000000",
        ]
        .iter()
        .map(|s| U256::from_dec_str(s).unwrap())
        .collect();

        let result = calculate_invariant(amp(88), &balances, Rounding::Up);
        assert_eq!(
            result,
            Err(StableMathError::InvariantDidNotConverge { iterations: 255 })
        );

        // Rounding down settles on a value for the same pool
        let down = calculate_invariant(amp(88), &balances, Rounding::Down).unwrap();
        assert_eq!(
            down,
            U256::from_dec_str("1826342297266108581648252").unwrap()
        );
    }

    #[test]
    fn test_exhausted_budget_maps_to_invariant_error() {
        let err = into_stable_error(RootFinderError::DidNotConverge {
            iterations: 255,
            last: U256::one(),
        });

        assert_eq!(
            err,
            StableMathError::InvariantDidNotConverge { iterations: 255 }
        );
    }

    #[test]
    fn test_amplification_below_one_underflows() {
        let result = calculate_invariant(U256::from(100u64), &tokens(&[10, 10]), Rounding::Up);

        assert_eq!(result, Err(StableMathError::Math(MathError::Underflow)));
    }
}
