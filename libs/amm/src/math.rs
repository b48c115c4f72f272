//! Overflow-checked integer arithmetic for the pool engine
//!
//! All amounts are exact integers. Multiplications that can exceed 128 bits
//! are promoted to a 256-bit intermediate before dividing back down; a result
//! that does not fit the target width fails with `CalculationOverflow` instead
//! of wrapping.

use crate::error::{Result, SwapError};
use primitive_types::U256;

/// Floor division, `b > 0` required
#[inline]
pub fn floor_div(dividend: u128, divisor: u128) -> Result<u128> {
    dividend
        .checked_div(divisor)
        .ok_or(SwapError::DivisionByZero)
}

/// Ceiling division, `b > 0` required
#[inline]
pub fn ceil_div(dividend: u128, divisor: u128) -> Result<u128> {
    let quotient = floor_div(dividend, divisor)?;
    if dividend % divisor == 0 {
        Ok(quotient)
    } else {
        // quotient < dividend here, so the increment cannot overflow
        Ok(quotient + 1)
    }
}

/// `floor(a * b / c)` with a 256-bit intermediate product
pub fn mul_div_floor(a: u128, b: u128, c: u128) -> Result<u128> {
    if c == 0 {
        return Err(SwapError::DivisionByZero);
    }
    let product = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(SwapError::CalculationOverflow)?;
    to_u128(product / U256::from(c))
}

/// `ceil(a * b / c)` with a 256-bit intermediate product
pub fn mul_div_ceil(a: u128, b: u128, c: u128) -> Result<u128> {
    if c == 0 {
        return Err(SwapError::DivisionByZero);
    }
    let product = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(SwapError::CalculationOverflow)?;
    to_u128(ceil_div_u256(product, U256::from(c))?)
}

/// Ceiling division over 256-bit operands
pub fn ceil_div_u256(dividend: U256, divisor: U256) -> Result<U256> {
    if divisor.is_zero() {
        return Err(SwapError::DivisionByZero);
    }
    let quotient = dividend / divisor;
    if (dividend % divisor).is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::one())
    }
}

/// Floor of the square root, Newton iteration
pub fn integer_sqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (n / 2) + (n % 2);
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

/// Floor of the square root of a 256-bit value
pub fn integer_sqrt_u256(n: U256) -> U256 {
    let two = U256::from(2u8);
    if n < two {
        return n;
    }
    let mut x = n;
    let mut y = (n / two) + (n % two);
    while y < x {
        x = y;
        y = (x + n / x) / two;
    }
    x
}

/// Ceiling of the square root of a 256-bit value
pub fn ceil_sqrt_u256(n: U256) -> U256 {
    let root = integer_sqrt_u256(n);
    // root <= 2^128 so squaring it fits
    if root * root < n {
        root + U256::one()
    } else {
        root
    }
}

/// Narrow a 256-bit value to u128
#[inline]
pub fn to_u128(value: U256) -> Result<u128> {
    if value > U256::from(u128::MAX) {
        return Err(SwapError::CalculationOverflow);
    }
    Ok(value.low_u128())
}

/// Narrow a u128 amount to the u64 ledger width
#[inline]
pub fn to_u64(value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| SwapError::CalculationOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_and_ceil_div() {
        assert_eq!(floor_div(7, 2).unwrap(), 3);
        assert_eq!(ceil_div(7, 2).unwrap(), 4);
        assert_eq!(ceil_div(8, 2).unwrap(), 4);
        assert_eq!(ceil_div(0, 5).unwrap(), 0);
        assert_eq!(floor_div(1, 0), Err(SwapError::DivisionByZero));
        assert_eq!(ceil_div(1, 0), Err(SwapError::DivisionByZero));
    }

    #[test]
    fn test_mul_div_uses_wide_intermediate() {
        // u128::MAX * 4 overflows 128 bits but the quotient fits
        let a = u128::MAX;
        assert_eq!(mul_div_floor(a, 4, 8).unwrap(), a / 2);
        assert_eq!(mul_div_ceil(a, 4, 8).unwrap(), a / 2 + 1);
        assert_eq!(mul_div_floor(10, 10, 3).unwrap(), 33);
        assert_eq!(mul_div_ceil(10, 10, 3).unwrap(), 34);
    }

    #[test]
    fn test_mul_div_overflow_after_division() {
        assert_eq!(
            mul_div_floor(u128::MAX, u128::MAX, 2),
            Err(SwapError::CalculationOverflow)
        );
        assert_eq!(mul_div_floor(1, 1, 0), Err(SwapError::DivisionByZero));
    }

    #[test]
    fn test_integer_sqrt() {
        assert_eq!(integer_sqrt(0), 0);
        assert_eq!(integer_sqrt(1), 1);
        assert_eq!(integer_sqrt(2), 1);
        assert_eq!(integer_sqrt(3), 1);
        assert_eq!(integer_sqrt(4), 2);
        assert_eq!(integer_sqrt(1_000_000_000_000), 1_000_000);
        assert_eq!(integer_sqrt(999_999_999_999), 999_999);
        assert_eq!(integer_sqrt(u128::MAX), u64::MAX as u128);
    }

    #[test]
    fn test_integer_sqrt_u256() {
        let big = U256::from(u128::MAX) * U256::from(u128::MAX);
        assert_eq!(integer_sqrt_u256(big), U256::from(u128::MAX));
        assert_eq!(ceil_sqrt_u256(big), U256::from(u128::MAX));
        assert_eq!(ceil_sqrt_u256(U256::from(5u8)), U256::from(3u8));
        assert_eq!(ceil_sqrt_u256(U256::from(4u8)), U256::from(2u8));
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(to_u64(u64::MAX as u128).unwrap(), u64::MAX);
        assert_eq!(to_u64(u64::MAX as u128 + 1), Err(SwapError::CalculationOverflow));
        assert_eq!(
            to_u128(U256::from(u128::MAX) + U256::one()),
            Err(SwapError::CalculationOverflow)
        );
    }
}
