//! Join and exit math for pool share tokens (BPT)
//!
//! Single-sided joins and exits scale the invariant by the change in share
//! supply and solve for the one balance that moves. Only the part of that
//! movement exceeding the token's current weight is treated as a virtual
//! swap against the rest of the pool, so only that part pays the swap fee.
//!
//! | Operation                          | Fixed           | Solved          |
//! |------------------------------------|-----------------|-----------------|
//! | [`token_in_for_exact_bpt_out`]     | BPT minted      | token deposited |
//! | [`exact_bpt_in_for_token_out`]     | BPT burned      | token withdrawn |
//! | [`exact_tokens_in_for_bpt_out`]    | tokens deposited| BPT minted      |

use crate::balance::get_token_balance_given_invariant_and_all_other_balances;
use crate::error::StableMathError;
use crate::fixed_point::{FixedPoint, Rounding, ONE};
use crate::invariant::calculate_invariant;
use crate::operations::{add_fee, validate_fee, validate_index, TradeOutcome};
use primitive_types::U256;
use tracing::debug;

/// Token amount to deposit at `token_index` to mint exactly `bpt_amount_out`
///
/// Minting nothing costs nothing and skips the solver entirely.
pub fn token_in_for_exact_bpt_out(
    amplification: U256,
    balances: &[U256],
    token_index: usize,
    bpt_amount_out: U256,
    bpt_total_supply: U256,
    fee: U256,
) -> Result<TradeOutcome, StableMathError> {
    validate_index(balances, token_index)?;
    validate_fee(fee)?;

    if bpt_amount_out.is_zero() {
        return Ok(TradeOutcome {
            amount: U256::zero(),
            balances: balances.to_vec(),
        });
    }

    let current_invariant = calculate_invariant(amplification, balances, Rounding::Up)?;
    let supply_ratio = FixedPoint::div_up_fixed(
        FixedPoint::add(bpt_total_supply, bpt_amount_out)?,
        bpt_total_supply,
    )?;
    let new_invariant = FixedPoint::mul_up_fixed(supply_ratio, current_invariant)?;

    let new_balance = get_token_balance_given_invariant_and_all_other_balances(
        amplification,
        balances,
        new_invariant,
        token_index,
    )?;
    let amount_in_without_fee = FixedPoint::sub(new_balance, balances[token_index])?;

    let (non_taxable, taxable) = split_by_weight(balances, token_index, amount_in_without_fee)?;
    let amount_in = FixedPoint::add(non_taxable, add_fee(taxable, fee)?)?;

    debug!(
        "Join single: {} of token {} for {} BPT (taxable {})",
        amount_in, token_index, bpt_amount_out, taxable
    );

    let mut post_trade = balances.to_vec();
    post_trade[token_index] = FixedPoint::add(balances[token_index], amount_in)?;
    Ok(TradeOutcome {
        amount: amount_in,
        balances: post_trade,
    })
}

/// Token amount withdrawn from `token_index` when burning `bpt_amount_in`
///
/// The fee reduces the taxable part of the withdrawal, rounded down.
pub fn exact_bpt_in_for_token_out(
    amplification: U256,
    balances: &[U256],
    token_index: usize,
    bpt_amount_in: U256,
    bpt_total_supply: U256,
    fee: U256,
) -> Result<TradeOutcome, StableMathError> {
    validate_index(balances, token_index)?;
    validate_fee(fee)?;

    if bpt_amount_in.is_zero() {
        return Ok(TradeOutcome {
            amount: U256::zero(),
            balances: balances.to_vec(),
        });
    }

    let current_invariant = calculate_invariant(amplification, balances, Rounding::Up)?;
    let supply_ratio = FixedPoint::div_up_fixed(
        FixedPoint::sub(bpt_total_supply, bpt_amount_in)?,
        bpt_total_supply,
    )?;
    let new_invariant = FixedPoint::mul_up_fixed(supply_ratio, current_invariant)?;

    let new_balance = get_token_balance_given_invariant_and_all_other_balances(
        amplification,
        balances,
        new_invariant,
        token_index,
    )?;
    // Dust burns round the solved balance above the current one and fail here
    let amount_out_without_fee = FixedPoint::sub(balances[token_index], new_balance)?;

    let (non_taxable, taxable) = split_by_weight(balances, token_index, amount_out_without_fee)?;
    let taxable_after_fee =
        FixedPoint::mul_down_fixed(taxable, FixedPoint::complement_fixed(fee))?;
    let amount_out = FixedPoint::add(non_taxable, taxable_after_fee)?;

    debug!(
        "Exit single: {} BPT for {} of token {} (taxable {})",
        bpt_amount_in, amount_out, token_index, taxable
    );

    let mut post_trade = balances.to_vec();
    post_trade[token_index] = FixedPoint::sub(balances[token_index], amount_out)?;
    Ok(TradeOutcome {
        amount: amount_out,
        balances: post_trade,
    })
}

/// BPT minted for depositing `amounts_in`, one entry per pool token
///
/// Deposits above the weighted-average balance ratio pay the fee on the
/// excess. The result is zero whenever the fee-adjusted invariant (rounded
/// down) does not beat the current one (rounded up).
pub fn exact_tokens_in_for_bpt_out(
    amplification: U256,
    balances: &[U256],
    amounts_in: &[U256],
    bpt_total_supply: U256,
    fee: U256,
) -> Result<TradeOutcome, StableMathError> {
    if amounts_in.len() != balances.len() {
        return Err(StableMathError::TokenCountMismatch {
            expected: balances.len(),
            actual: amounts_in.len(),
        });
    }
    validate_fee(fee)?;

    let sum = sum_balances(balances)?;

    let mut balance_ratios = Vec::with_capacity(balances.len());
    let mut invariant_ratio = U256::zero();
    for (balance, amount_in) in balances.iter().zip(amounts_in) {
        let weight = FixedPoint::div_down_fixed(*balance, sum)?;
        let ratio = FixedPoint::div_down_fixed(FixedPoint::add(*balance, *amount_in)?, *balance)?;
        invariant_ratio =
            FixedPoint::add(invariant_ratio, FixedPoint::mul_down_fixed(ratio, weight)?)?;
        balance_ratios.push(ratio);
    }

    // Weights round down, so a proportional deposit can leave the average
    // just under ONE; nothing is untaxed in that case.
    let proportional_growth = if invariant_ratio > ONE {
        invariant_ratio - ONE
    } else {
        U256::zero()
    };

    let mut fee_adjusted = Vec::with_capacity(balances.len());
    for ((balance, amount_in), ratio) in balances.iter().zip(amounts_in).zip(&balance_ratios) {
        let amount_in_without_fee = if *ratio > invariant_ratio {
            let non_taxable = FixedPoint::mul_down_fixed(*balance, proportional_growth)?;
            let taxable = FixedPoint::sub(*amount_in, non_taxable)?;
            FixedPoint::add(
                non_taxable,
                FixedPoint::mul_down_fixed(taxable, FixedPoint::complement_fixed(fee))?,
            )?
        } else {
            *amount_in
        };
        fee_adjusted.push(FixedPoint::add(*balance, amount_in_without_fee)?);
    }

    let current_invariant = calculate_invariant(amplification, balances, Rounding::Up)?;
    let new_invariant = calculate_invariant(amplification, &fee_adjusted, Rounding::Down)?;
    let growth = FixedPoint::div_down_fixed(new_invariant, current_invariant)?;

    let bpt_out = if growth > ONE {
        FixedPoint::mul_down_fixed(bpt_total_supply, growth - ONE)?
    } else {
        U256::zero()
    };

    debug!(
        "Join: {} BPT for deposits {:?} (invariant {} -> {})",
        bpt_out, amounts_in, current_invariant, new_invariant
    );

    let post_trade = balances
        .iter()
        .zip(amounts_in)
        .map(|(balance, amount_in)| FixedPoint::add(*balance, *amount_in))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TradeOutcome {
        amount: bpt_out,
        balances: post_trade,
    })
}

/// Split `amount` into the part covered by the token's weight and the rest
fn split_by_weight(
    balances: &[U256],
    token_index: usize,
    amount: U256,
) -> Result<(U256, U256), StableMathError> {
    let sum = sum_balances(balances)?;
    let weight = FixedPoint::div_down_fixed(balances[token_index], sum)?;
    let taxable_percentage = FixedPoint::complement_fixed(weight);
    let taxable = FixedPoint::mul_up_fixed(amount, taxable_percentage)?;
    let non_taxable = FixedPoint::sub(amount, taxable)?;
    Ok((non_taxable, taxable))
}

fn sum_balances(balances: &[U256]) -> Result<U256, StableMathError> {
    Ok(balances
        .iter()
        .try_fold(U256::zero(), |acc, balance| FixedPoint::add(acc, *balance))?)
}
