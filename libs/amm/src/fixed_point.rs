//! Checked 256-bit arithmetic with explicit rounding
//!
//! Mirrors the contract-side math library: every division states whether it
//! rounds up or down, and no operation ever rounds to nearest. Values are
//! `U256`, the width of the contract's `uint256`, so an overflow here is an
//! overflow on-chain as well.
//!
//! Two families of operations are provided:
//!
//! - **Plain**: `add`, `sub`, `mul`, `div_up`, `div_down` on raw integers
//! - **Fixed**: `*_fixed` variants treating operands as 18-decimal fractions
//!   where [`ONE`] represents 1.0

use crate::error::MathError;
use primitive_types::U256;

/// 1.0 in 18-decimal fixed point
pub const ONE: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

/// Scale applied to the amplification parameter
pub const AMP_PRECISION: U256 = U256([1_000, 0, 0, 0]);

/// Direction in which a division discards its remainder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    Up,
    Down,
}

impl Rounding {
    /// The opposite direction
    pub fn complement(self) -> Self {
        match self {
            Rounding::Up => Rounding::Down,
            Rounding::Down => Rounding::Up,
        }
    }
}

/// Checked arithmetic over `U256`
pub struct FixedPoint;

impl FixedPoint {
    pub fn add(a: U256, b: U256) -> Result<U256, MathError> {
        a.checked_add(b).ok_or(MathError::Overflow)
    }

    pub fn sub(a: U256, b: U256) -> Result<U256, MathError> {
        a.checked_sub(b).ok_or(MathError::Underflow)
    }

    pub fn mul(a: U256, b: U256) -> Result<U256, MathError> {
        a.checked_mul(b).ok_or(MathError::Overflow)
    }

    /// Integer division in the requested direction
    pub fn div(a: U256, b: U256, rounding: Rounding) -> Result<U256, MathError> {
        match rounding {
            Rounding::Up => Self::div_up(a, b),
            Rounding::Down => Self::div_down(a, b),
        }
    }

    pub fn div_down(a: U256, b: U256) -> Result<U256, MathError> {
        if b.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        Ok(a / b)
    }

    /// `ceil(a / b)`, computed as `1 + (a - 1) / b` so it cannot overflow
    pub fn div_up(a: U256, b: U256) -> Result<U256, MathError> {
        if b.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        if a.is_zero() {
            return Ok(U256::zero());
        }
        Ok(U256::one() + (a - U256::one()) / b)
    }

    pub fn mul_down_fixed(a: U256, b: U256) -> Result<U256, MathError> {
        Ok(Self::mul(a, b)? / ONE)
    }

    pub fn mul_up_fixed(a: U256, b: U256) -> Result<U256, MathError> {
        let product = Self::mul(a, b)?;
        if product.is_zero() {
            return Ok(U256::zero());
        }
        Ok((product - U256::one()) / ONE + U256::one())
    }

    pub fn div_down_fixed(a: U256, b: U256) -> Result<U256, MathError> {
        if b.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        if a.is_zero() {
            return Ok(U256::zero());
        }
        Ok(Self::mul(a, ONE)? / b)
    }

    pub fn div_up_fixed(a: U256, b: U256) -> Result<U256, MathError> {
        if b.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        if a.is_zero() {
            return Ok(U256::zero());
        }
        let inflated = Self::mul(a, ONE)?;
        Ok((inflated - U256::one()) / b + U256::one())
    }

    /// `1 - x`, clamped at zero
    pub fn complement_fixed(x: U256) -> U256 {
        if x < ONE {
            ONE - x
        } else {
            U256::zero()
        }
    }
}
