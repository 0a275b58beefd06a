//! Geometric mean over decimals.
//!
//! Every value is split into a mantissa in [1, 10) and a power of ten. The
//! mantissas are multiplied in `Decimal` (renormalised back into [1, 10)
//! after each step so the product neither overflows nor underflows) while
//! the exponents are summed as integers. The nth root of the mantissa
//! product is found with Newton-Raphson in `Decimal`, seeded from an `f64`
//! estimate, and the exponent is split into a whole power of ten plus a
//! remainder carried by a root of ten. The result is rounded to
//! `ROOT_SIGNIFICANT_DIGITS` significant digits with banker's rounding.

use crate::domain::error::GbceError;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

pub const ROOT_SIGNIFICANT_DIGITS: u32 = 24;
const MAX_ROOT_ITERATIONS: usize = 64;

fn root_tolerance() -> Decimal {
    Decimal::new(1, 26)
}

/// Geometric mean of `values`.
///
/// Fails with `InvalidArgument` for an empty slice or a negative value.
/// A zero anywhere makes the mean zero.
pub fn geometric_mean(values: &[Decimal]) -> Result<Decimal, GbceError> {
    if values.is_empty() {
        return Err(GbceError::invalid(
            "values cannot be empty for geometric mean calculation",
        ));
    }
    if let Some(negative) = values.iter().find(|v| **v < Decimal::ZERO) {
        return Err(GbceError::invalid(format!(
            "geometric mean is undefined for negative value {negative}"
        )));
    }
    if values.iter().any(|v| v.is_zero()) {
        return Ok(Decimal::ZERO);
    }
    if let [single] = values {
        return Ok(*single);
    }

    let n = u32::try_from(values.len())
        .map_err(|_| GbceError::invalid("too many values for geometric mean"))?;

    let mut mantissa = Decimal::ONE;
    let mut exponent = 0i64;
    for value in values {
        let (m, e) = decompose(*value);
        mantissa = mantissa
            .checked_mul(m)
            .ok_or_else(|| GbceError::overflow("geometric mean"))?;
        exponent += i64::from(e);
        if mantissa >= Decimal::TEN {
            mantissa /= Decimal::TEN;
            exponent += 1;
        }
    }

    root_of_scaled(mantissa, exponent, n)
}

/// Principal nth root of a non-negative decimal.
pub fn nth_root(value: Decimal, n: u32) -> Result<Decimal, GbceError> {
    if n == 0 {
        return Err(GbceError::invalid("root degree must be at least 1"));
    }
    if value < Decimal::ZERO {
        return Err(GbceError::invalid("cannot take the root of a negative value"));
    }
    if value.is_zero() || n == 1 {
        return Ok(value);
    }
    let (mantissa, exponent) = decompose(value);
    root_of_scaled(mantissa, i64::from(exponent), n)
}

/// Splits a positive decimal into `(m, e)` with `value = m * 10^e` and `1 <= m < 10`.
fn decompose(value: Decimal) -> (Decimal, i32) {
    let mut digits = value.mantissa().unsigned_abs();
    let mut count = digits.ilog10() + 1;
    let exponent = count as i32 - 1 - value.scale() as i32;
    // 96-bit mantissas can carry 29 digits; a decimal scale tops out at 28.
    if count > 28 {
        digits /= 10u128.pow(count - 28);
        count = 28;
    }
    let mantissa = Decimal::from_i128_with_scale(digits as i128, count - 1);
    (mantissa, exponent)
}

/// nth root of `mantissa * 10^exponent` for a mantissa in [1, 10).
fn root_of_scaled(mantissa: Decimal, exponent: i64, n: u32) -> Result<Decimal, GbceError> {
    let degree = i64::from(n);
    let whole = exponent.div_euclid(degree);
    let remainder = exponent.rem_euclid(degree) as u32;

    let mut root = newton_root(mantissa, n)?;
    if remainder > 0 {
        let tenth_root = newton_root(Decimal::TEN, n)?;
        let carried = checked_powu(tenth_root, remainder)
            .ok_or_else(|| GbceError::overflow("nth root"))?;
        root = root
            .checked_mul(carried)
            .ok_or_else(|| GbceError::overflow("nth root"))?;
    }
    let root = shift_pow10(root, whole).ok_or_else(|| GbceError::overflow("nth root"))?;
    Ok(root.round_sf(ROOT_SIGNIFICANT_DIGITS).unwrap_or(root))
}

/// Newton-Raphson nth root for a value in [1, 10].
fn newton_root(value: Decimal, n: u32) -> Result<Decimal, GbceError> {
    let degree = Decimal::from(n);
    let mut x = initial_guess(value, n);

    for _ in 0..MAX_ROOT_ITERATIONS {
        let x_pow = checked_powu(x, n - 1).ok_or_else(|| GbceError::overflow("nth root"))?;
        let quotient = value
            .checked_div(x_pow)
            .ok_or_else(|| GbceError::overflow("nth root"))?;
        let next = ((degree - Decimal::ONE) * x + quotient) / degree;
        let converged = (next - x).abs() <= root_tolerance();
        x = next;
        if converged {
            break;
        }
    }
    Ok(x)
}

fn initial_guess(value: Decimal, n: u32) -> Decimal {
    value
        .to_f64()
        .map(|v| v.powf(1.0 / f64::from(n)))
        .and_then(Decimal::from_f64)
        .filter(|g| *g > Decimal::ZERO)
        .unwrap_or(Decimal::ONE)
}

fn checked_powu(base: Decimal, exp: u32) -> Option<Decimal> {
    (0..exp).try_fold(Decimal::ONE, |acc, _| acc.checked_mul(base))
}

/// `value * 10^power`; `None` past the top of the decimal range.
fn shift_pow10(value: Decimal, power: i64) -> Option<Decimal> {
    if power >= 0 {
        (0..power).try_fold(value, |acc, _| acc.checked_mul(Decimal::TEN))
    } else {
        (0..-power).try_fold(value, |acc, _| acc.checked_div(Decimal::TEN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn three_values() {
        let result = geometric_mean(&[dec!(100), dec!(200), dec!(300)]).unwrap();
        let expected = (100.0_f64 * 200.0 * 300.0).cbrt();
        assert_abs_diff_eq!(result.to_f64().unwrap(), expected, epsilon = 1e-10);
    }

    #[test]
    fn perfect_powers_are_exact() {
        assert_eq!(geometric_mean(&[dec!(4), dec!(16)]).unwrap(), dec!(8));
        assert_eq!(geometric_mean(&[dec!(2), dec!(4), dec!(8)]).unwrap(), dec!(4));
    }

    #[test]
    fn single_value_is_itself() {
        assert_eq!(geometric_mean(&[dec!(108.25)]).unwrap(), dec!(108.25));
    }

    #[test]
    fn empty_input_fails() {
        assert!(matches!(
            geometric_mean(&[]),
            Err(GbceError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn negative_input_fails() {
        assert!(matches!(
            geometric_mean(&[dec!(10), dec!(-10)]),
            Err(GbceError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn zero_input_gives_zero() {
        assert_eq!(
            geometric_mean(&[dec!(105), Decimal::ZERO]).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn small_values_keep_their_magnitude() {
        assert_eq!(geometric_mean(&[dec!(0.0001); 8]).unwrap(), dec!(0.0001));
        assert_eq!(geometric_mean(&[dec!(0.001); 10]).unwrap(), dec!(0.001));

        let result = geometric_mean(&[dec!(0.00012345); 7]).unwrap();
        assert!(
            (result - dec!(0.00012345)).abs() < dec!(0.000000000000000000001),
            "got {result}"
        );
    }

    #[test]
    fn mixed_magnitudes() {
        // sqrt(0.0001 * 1000000) = 10
        assert_eq!(geometric_mean(&[dec!(0.0001), dec!(1000000)]).unwrap(), dec!(10));
    }

    #[test]
    fn product_beyond_decimal_range() {
        let values = vec![dec!(1000000000); 5];
        assert_eq!(geometric_mean(&values).unwrap(), dec!(1000000000));

        let result = geometric_mean(&[dec!(123456789.5); 6]).unwrap();
        assert!((result - dec!(123456789.5)).abs() < dec!(0.0000000001), "got {result}");
    }

    #[test]
    fn decompose_splits_mantissa_and_exponent() {
        assert_eq!(decompose(dec!(0.00012345)), (dec!(1.2345), -4));
        assert_eq!(decompose(dec!(105.00)), (dec!(1.05), 2));
        assert_eq!(decompose(Decimal::MAX).1, 28);
    }

    #[test]
    fn nth_root_rejects_zero_degree() {
        assert!(nth_root(dec!(8), 0).is_err());
    }

    #[test]
    fn square_root_of_two() {
        let root = nth_root(dec!(2), 2).unwrap();
        assert_abs_diff_eq!(root.to_f64().unwrap(), std::f64::consts::SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn root_of_tiny_value() {
        // sqrt(1e-26) = 1e-13
        assert_eq!(nth_root(Decimal::new(1, 26), 2).unwrap(), Decimal::new(1, 13));
    }
}
