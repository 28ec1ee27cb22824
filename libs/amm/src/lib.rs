//! # Stable AMM Library - Exact StableSwap Mathematics
//!
//! ## Purpose
//!
//! Off-chain replica of the StableSwap math used by Balancer and Curve style
//! stable pools. Quotes match the contract to the last unit: every division
//! rounds in the direction the contract rounds, all arithmetic is 256-bit and
//! checked, and the iterative solvers stop under the same rule and budget.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Pool snapshots from `stable-config` or any caller
//!   holding upscaled balances
//! - **Output Destinations**: Quoting tools, routers and simulators that need
//!   contract-exact amounts
//! - **Precision**: All pool math at 18 decimals; [`scaling`] converts from and
//!   to token-native decimals
//!
//! ## Architecture
//!
//! ```text
//! fixed_point ──> solver ──> invariant ──┐
//!                         └─> balance ───┼─> operations (swaps)
//!                                        └─> liquidity (joins, exits)
//!                                                  │
//!                                            pool_traits (StablePoolState)
//! ```
//!
//! ## Failure Modes
//!
//! - Arithmetic overflow, underflow and division by zero surface as
//!   [`MathError`] wrapped in [`StableMathError::Math`]
//! - Solvers that exhaust their 255 iterations return
//!   [`StableMathError::InvariantDidNotConverge`] or
//!   [`StableMathError::BalanceSolveDidNotConverge`]; these are deterministic
//!   and retrying with the same inputs fails again

pub mod balance;
pub mod error;
pub mod fixed_point;
pub mod invariant;
pub mod liquidity;
pub mod operations;
pub mod pool_traits;
pub mod scaling;
pub mod solver;

pub use balance::get_token_balance_given_invariant_and_all_other_balances;
pub use error::{MathError, RootFinderError, ScalingError, StableMathError};
pub use fixed_point::{FixedPoint, Rounding, AMP_PRECISION, ONE};
pub use invariant::calculate_invariant;
pub use liquidity::{
    exact_bpt_in_for_token_out, exact_tokens_in_for_bpt_out, token_in_for_exact_bpt_out,
};
pub use operations::{exact_token_in_for_token_out, token_in_for_exact_token_out, TradeOutcome};
pub use pool_traits::{AmmPool, PoolType, StablePoolState, MAX_AMP, MIN_AMP};
pub use solver::{Convergence, RootFinder, MAX_ITERATIONS};

/// Common types for AMM calculations
pub use primitive_types::U256;
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
