//! Token balance solver for a fixed invariant
//!
//! Given `D` and every balance but one, finds the missing balance `y` from
//! the recurrence `y = (y^2 + c) / (2y + b - D)`, where `b` and `c` are
//! derived once from the known balances. All divisions in the loop round up,
//! so the solved balance is never below the true one.

use crate::error::{RootFinderError, StableMathError};
use crate::fixed_point::{FixedPoint, AMP_PRECISION};
use crate::solver::{Convergence, RootFinder};
use primitive_types::U256;
use tracing::debug;

/// Balance of `token_index` that keeps the pool at `invariant`
///
/// `balances[token_index]` only matters through rounding: it is folded into
/// the product term and multiplied back out, so it must be non-zero. The
/// result is rounded up.
pub fn get_token_balance_given_invariant_and_all_other_balances(
    amplification: U256,
    balances: &[U256],
    invariant: U256,
    token_index: usize,
) -> Result<U256, StableMathError> {
    let solved = solve_token_balance(amplification, balances, invariant, token_index)?;
    Ok(solved.value)
}

/// Same as [`get_token_balance_given_invariant_and_all_other_balances`],
/// also reporting the iteration count
pub fn solve_token_balance(
    amplification: U256,
    balances: &[U256],
    invariant: U256,
    token_index: usize,
) -> Result<Convergence, StableMathError> {
    if token_index >= balances.len() {
        return Err(StableMathError::InvalidTokenIndex {
            index: token_index,
            token_count: balances.len(),
        });
    }

    let num_tokens = U256::from(balances.len());
    let amp_times_total = FixedPoint::mul(amplification, num_tokens)?;

    let mut sum = balances[0];
    let mut p_d = FixedPoint::mul(balances[0], num_tokens)?;
    for balance in &balances[1..] {
        p_d = FixedPoint::div_down(
            FixedPoint::mul(FixedPoint::mul(p_d, *balance)?, num_tokens)?,
            invariant,
        )?;
        sum = FixedPoint::add(sum, *balance)?;
    }
    // sum includes balances[token_index], so this cannot underflow
    sum = FixedPoint::sub(sum, balances[token_index])?;

    let invariant_squared = FixedPoint::mul(invariant, invariant)?;
    // p_d carries balances[token_index]; multiplying c by it cancels it out
    let c = FixedPoint::mul(
        FixedPoint::mul(
            FixedPoint::div_up(invariant_squared, FixedPoint::mul(amp_times_total, p_d)?)?,
            AMP_PRECISION,
        )?,
        balances[token_index],
    )?;
    let b = FixedPoint::add(
        sum,
        FixedPoint::mul(
            FixedPoint::div_down(invariant, amp_times_total)?,
            AMP_PRECISION,
        )?,
    )?;

    let seed = FixedPoint::div_up(
        FixedPoint::add(invariant_squared, c)?,
        FixedPoint::add(invariant, b)?,
    )?;

    let result = RootFinder::converge("stable balance", seed, |token_balance| {
        let numerator = FixedPoint::add(FixedPoint::mul(token_balance, token_balance)?, c)?;
        let denominator = FixedPoint::sub(
            FixedPoint::add(FixedPoint::mul(token_balance, U256::from(2u64))?, b)?,
            invariant,
        )?;
        FixedPoint::div_up(numerator, denominator)
    });

    let convergence = result.map_err(into_stable_error)?;
    debug!(
        "Balance of token {} solved to {} in {} iterations",
        token_index, convergence.value, convergence.iterations
    );
    Ok(convergence)
}

fn into_stable_error(err: RootFinderError) -> StableMathError {
    match err {
        RootFinderError::DidNotConverge { iterations, .. } => {
            StableMathError::BalanceSolveDidNotConverge { iterations }
        }
        RootFinderError::Math(e) => e.into(),
    }
}
