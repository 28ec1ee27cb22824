//! Conversions between token-native amounts, 18-decimal pool amounts and
//! human-readable decimals
//!
//! The pool math only ever sees 18-decimal values. A 6-decimal token such as
//! USDC is upscaled by `10^12` on the way in and downscaled on the way out,
//! with the rounding direction chosen by the caller:
//!
//! - amounts paid to the trader are downscaled rounding down
//! - amounts charged to the trader are downscaled rounding up
//!
//! Human decimals (`rust_decimal::Decimal`) are for configuration and
//! display only; they never enter the solvers.

use crate::error::{MathError, ScalingError};
use crate::fixed_point::FixedPoint;
use primitive_types::U256;
use rust_decimal::Decimal;

/// Precision of every amount inside the pool math
pub const POOL_DECIMALS: u32 = 18;

/// Bits of mantissa a `Decimal` can hold
const DECIMAL_MANTISSA_BITS: usize = 96;

fn scaling_factor(decimals: u32) -> Result<U256, ScalingError> {
    if decimals > POOL_DECIMALS {
        return Err(ScalingError::UnsupportedDecimals { decimals });
    }
    Ok(U256::exp10((POOL_DECIMALS - decimals) as usize))
}

/// Token-native amount to 18 decimals
pub fn upscale(amount: U256, decimals: u32) -> Result<U256, ScalingError> {
    Ok(FixedPoint::mul(amount, scaling_factor(decimals)?)?)
}

/// 18-decimal amount to token-native, discarding the remainder
pub fn downscale_down(amount: U256, decimals: u32) -> Result<U256, ScalingError> {
    Ok(FixedPoint::div_down(amount, scaling_factor(decimals)?)?)
}

/// 18-decimal amount to token-native, rounding any remainder up
pub fn downscale_up(amount: U256, decimals: u32) -> Result<U256, ScalingError> {
    Ok(FixedPoint::div_up(amount, scaling_factor(decimals)?)?)
}

/// Parse a human amount into an integer with `decimals` fractional digits
///
/// `dec!(1.5)` with 6 decimals becomes `1_500_000`. Values that would need
/// rounding are rejected rather than truncated.
pub fn to_fixed(value: Decimal, decimals: u32) -> Result<U256, ScalingError> {
    if decimals > POOL_DECIMALS {
        return Err(ScalingError::UnsupportedDecimals { decimals });
    }
    if value < Decimal::ZERO {
        return Err(ScalingError::NegativeAmount {
            value: value.to_string(),
        });
    }

    let normalized = value.normalize();
    let scale = normalized.scale();
    if scale > decimals {
        return Err(ScalingError::PrecisionLoss {
            value: value.to_string(),
            decimals,
        });
    }

    let mantissa = U256::from(normalized.mantissa().unsigned_abs());
    let factor = U256::exp10((decimals - scale) as usize);
    Ok(FixedPoint::mul(mantissa, factor)?)
}

/// Render an integer with `decimals` fractional digits as a `Decimal`
///
/// Fails with an overflow once the value exceeds the 96-bit mantissa, about
/// 79 billion whole tokens at 18 decimals.
pub fn to_decimal(value: U256, decimals: u32) -> Result<Decimal, ScalingError> {
    if decimals > POOL_DECIMALS {
        return Err(ScalingError::UnsupportedDecimals { decimals });
    }
    if value.bits() > DECIMAL_MANTISSA_BITS {
        return Err(MathError::Overflow.into());
    }
    let decimal = Decimal::from_i128_with_scale(value.as_u128() as i128, decimals);
    Ok(decimal.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_upscale_and_downscale() {
        // 1.5 USDC
        let native = U256::from(1_500_000u64);
        let scaled = upscale(native, 6).unwrap();

        assert_eq!(scaled, U256::from(1_500_000_000_000_000_000u64));
        assert_eq!(downscale_down(scaled, 6).unwrap(), native);
        assert_eq!(downscale_up(scaled, 6).unwrap(), native);
        assert_eq!(upscale(native, 18).unwrap(), native);
    }

    #[test]
    fn test_downscale_rounding_direction() {
        // 1.0000005 USDC in 18 decimals is not representable natively
        let scaled = U256::from(1_000_000_500_000_000_000u64);

        assert_eq!(downscale_down(scaled, 6).unwrap(), U256::from(1_000_000u64));
        assert_eq!(downscale_up(scaled, 6).unwrap(), U256::from(1_000_001u64));
    }

    #[test]
    fn test_rejects_more_than_eighteen_decimals() {
        assert_eq!(
            upscale(U256::one(), 24),
            Err(ScalingError::UnsupportedDecimals { decimals: 24 })
        );
        assert_eq!(
            to_fixed(dec!(1), 19),
            Err(ScalingError::UnsupportedDecimals { decimals: 19 })
        );
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(dec!(1.5), 6).unwrap(), U256::from(1_500_000u64));
        assert_eq!(
            to_fixed(dec!(0.0004), 18).unwrap(),
            U256::from(400_000_000_000_000u64)
        );
        assert_eq!(
            to_fixed(dec!(1000000), 18).unwrap(),
            U256::from_dec_str("1000000000000000000000000").unwrap()
        );
        // Trailing zeros do not count as precision
        assert_eq!(to_fixed(dec!(2.500000000), 2).unwrap(), U256::from(250u64));
        assert_eq!(to_fixed(Decimal::ZERO, 6).unwrap(), U256::zero());
    }

    #[test]
    fn test_to_fixed_rejects_lossy_and_negative_values() {
        assert!(matches!(
            to_fixed(dec!(0.0000001), 6),
            Err(ScalingError::PrecisionLoss { decimals: 6, .. })
        ));
        assert!(matches!(
            to_fixed(dec!(-1), 18),
            Err(ScalingError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn test_to_decimal() {
        let amount = U256::from_dec_str("1000470894377598996145").unwrap();

        assert_eq!(
            to_decimal(amount, 18).unwrap(),
            dec!(1000.470894377598996145)
        );
        assert_eq!(to_decimal(U256::from(1_500_000u64), 6).unwrap(), dec!(1.5));
        assert_eq!(to_decimal(U256::zero(), 18).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_to_decimal_overflow() {
        let too_large = U256::one() << 96;

        assert_eq!(
            to_decimal(too_large, 18),
            Err(ScalingError::Math(MathError::Overflow))
        );
        assert!(to_decimal(too_large - U256::one(), 18).is_ok());
    }
}
