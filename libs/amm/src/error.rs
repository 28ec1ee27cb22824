//! Error types for stable pool math
//!
//! Arithmetic failures (`MathError`) are kept separate from the solver and
//! boundary failures (`StableMathError`) so callers can tell a pathological
//! pool state apart from a malformed request.

use primitive_types::U256;
use thiserror::Error;

/// Failures of the checked 256-bit arithmetic service
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// Result does not fit in 256 bits
    #[error("Arithmetic overflow")]
    Overflow,

    /// Subtraction would produce a negative value
    #[error("Arithmetic underflow")]
    Underflow,

    /// Division with a zero divisor
    #[error("Division by zero")]
    DivisionByZero,
}

/// Failures of the shared root finder
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RootFinderError {
    /// Estimates still moved by more than one unit after the iteration budget
    #[error("No convergence after {iterations} iterations (last estimate {last})")]
    DidNotConverge { iterations: u32, last: U256 },

    #[error(transparent)]
    Math(#[from] MathError),
}

/// Errors surfaced by the stable pool operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StableMathError {
    /// Invariant iteration did not stabilize; retrying with the same inputs
    /// reproduces the failure
    #[error("Stable invariant did not converge after {iterations} iterations")]
    InvariantDidNotConverge { iterations: u32 },

    /// Balance iteration did not stabilize
    #[error("Stable balance solve did not converge after {iterations} iterations")]
    BalanceSolveDidNotConverge { iterations: u32 },

    #[error("Token index {index} out of range for a pool of {token_count} tokens")]
    InvalidTokenIndex { index: usize, token_count: usize },

    #[error("Token in and token out are both index {index}")]
    SameTokenIndex { index: usize },

    /// Swap fee must be strictly below ONE
    #[error("Swap fee {fee} is not below 1.0")]
    InvalidFee { fee: U256 },

    #[error("Expected {expected} amounts, got {actual}")]
    TokenCountMismatch { expected: usize, actual: usize },

    #[error("A stable pool needs at least 2 tokens, got {count}")]
    TooFewTokens { count: usize },

    #[error("Amplification {amplification} outside the supported range")]
    AmplificationOutOfRange { amplification: U256 },

    #[error(transparent)]
    Math(#[from] MathError),
}

/// Errors converting between human decimals and scaled integers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScalingError {
    #[error("Token decimals {decimals} exceed 18")]
    UnsupportedDecimals { decimals: u32 },

    #[error("Negative amount: {value}")]
    NegativeAmount { value: String },

    #[error("Amount {value} has more than {decimals} fractional digits")]
    PrecisionLoss { value: String, decimals: u32 },

    #[error(transparent)]
    Math(#[from] MathError),
}

pub type Result<T, E = StableMathError> = std::result::Result<T, E>;
