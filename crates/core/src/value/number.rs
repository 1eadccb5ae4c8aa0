//! Exact decimal numbers.
//!
//! DynamoDB numbers are decimals with up to 38 significant digits and travel as
//! strings on the wire. They are kept here as normalized decimal digits plus a
//! base-10 exponent, so `3.5` stays `3.5` all the way through.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Maximum number of significant digits a stored number may carry.
pub const MAX_PRECISION: usize = 38;

/// Smallest and largest adjusted exponent accepted by the store.
const MIN_ADJUSTED_EXPONENT: i64 = -130;
const MAX_ADJUSTED_EXPONENT: i64 = 125;

/// Errors produced while parsing a number.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumberError {
    #[error("'{0}' is not a valid number")]
    Invalid(String),
    #[error("'{0}' has more than {MAX_PRECISION} significant digits")]
    TooPrecise(String),
    #[error("'{0}' is outside the supported magnitude range")]
    OutOfRange(String),
}

/// An exact decimal number: `(-1)^negative * digits * 10^exponent`.
///
/// `digits` never has leading or trailing zeros; zero is the empty digit string.
/// Because the representation is normalized, derived equality is numeric
/// equality (`3.5 == 3.50 == 35e-1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number {
    negative: bool,
    digits: String,
    exponent: i32,
}

impl Number {
    /// Returns zero.
    pub fn zero() -> Self {
        Self {
            negative: false,
            digits: String::new(),
            exponent: 0,
        }
    }

    /// `mantissa * 10^-scale`, e.g. `from_scaled(35, 1)` is `3.5`.
    ///
    /// Magnitudes outside the store's range are representable here; see
    /// [`Number::check_range`].
    pub fn from_scaled(mantissa: i64, scale: u8) -> Self {
        let mut number = Self::from(mantissa);
        if !number.is_zero() {
            number.exponent -= i32::from(scale);
        }
        number
    }

    /// Checks the store's precision and magnitude limits. Numbers parsed from
    /// text always pass; scaled or computed numbers may not.
    pub fn check_range(&self) -> Result<(), NumberError> {
        if self.is_zero() {
            return Ok(());
        }
        if self.digits.len() > MAX_PRECISION {
            return Err(NumberError::TooPrecise(self.to_string()));
        }
        let adjusted = self.adjusted_exponent() - 1;
        if !(MIN_ADJUSTED_EXPONENT..=MAX_ADJUSTED_EXPONENT).contains(&adjusted) {
            return Err(NumberError::OutOfRange(self.to_string()));
        }
        Ok(())
    }

    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Returns true when the number has no fractional part.
    pub fn is_integer(&self) -> bool {
        self.exponent >= 0
    }

    /// Returns the value as `i64` when it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }
        self.to_string().parse().ok()
    }

    fn signum(&self) -> i8 {
        match (self.is_zero(), self.negative) {
            (true, _) => 0,
            (false, true) => -1,
            (false, false) => 1,
        }
    }

    /// Position of the most significant digit relative to the decimal point.
    fn adjusted_exponent(&self) -> i64 {
        self.digits.len() as i64 + i64::from(self.exponent)
    }

    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        self.adjusted_exponent()
            .cmp(&other.adjusted_exponent())
            .then_with(|| self.digits.as_bytes().cmp(other.digits.as_bytes()))
    }

    fn normalize(negative: bool, raw_digits: &str, exponent: i64, source: &str) -> Result<Self, NumberError> {
        let leading_trimmed = raw_digits.trim_start_matches('0');
        let trimmed = leading_trimmed.trim_end_matches('0');
        if trimmed.is_empty() {
            return Ok(Self::zero());
        }

        let exponent = exponent + (leading_trimmed.len() - trimmed.len()) as i64;
        if trimmed.len() > MAX_PRECISION {
            return Err(NumberError::TooPrecise(source.to_string()));
        }

        let adjusted = trimmed.len() as i64 + exponent - 1;
        if !(MIN_ADJUSTED_EXPONENT..=MAX_ADJUSTED_EXPONENT).contains(&adjusted) {
            return Err(NumberError::OutOfRange(source.to_string()));
        }

        Ok(Self {
            negative,
            digits: trimmed.to_string(),
            exponent: i32::try_from(exponent)
                .map_err(|_| NumberError::OutOfRange(source.to_string()))?,
        })
    }
}

impl Default for Number {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for Number {
    type Err = NumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NumberError::Invalid(s.to_string());
        let text = s.trim();

        let (negative, unsigned) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };

        let (mantissa, exponent) = match unsigned.find(|c| c == 'e' || c == 'E') {
            Some(idx) => {
                let exponent: i32 = unsigned[idx + 1..].parse().map_err(|_| invalid())?;
                (&unsigned[..idx], i64::from(exponent))
            }
            None => (unsigned, 0),
        };

        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(invalid());
        }

        let raw_digits = format!("{int_part}{frac_part}");
        Self::normalize(
            negative,
            &raw_digits,
            exponent - frac_part.len() as i64,
            s,
        )
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        let magnitude = value.unsigned_abs().to_string();
        let trimmed = magnitude.trim_end_matches('0');
        if trimmed.is_empty() {
            return Self::zero();
        }
        Self {
            negative: value < 0,
            exponent: (magnitude.len() - trimmed.len()) as i32,
            digits: trimmed.to_string(),
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::from(i64::from(value))
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Self::from(i64::from(value))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.signum().cmp(&other.signum()) {
            Ordering::Equal => match self.signum() {
                0 => Ordering::Equal,
                1 => self.cmp_magnitude(other),
                _ => other.cmp_magnitude(self),
            },
            unequal => unequal,
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        if self.negative {
            write!(f, "-")?;
        }

        if self.exponent >= 0 {
            return write!(f, "{}{}", self.digits, "0".repeat(self.exponent as usize));
        }

        let point = self.adjusted_exponent();
        if point > 0 {
            let (int_part, frac_part) = self.digits.split_at(point as usize);
            write!(f, "{int_part}.{frac_part}")
        } else {
            write!(f, "0.{}{}", "0".repeat(point.unsigned_abs() as usize), self.digits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> Number {
        s.parse().unwrap()
    }

    #[test]
    fn test_check_range() {
        assert!(num("1e125").check_range().is_ok());
        assert!(num("-1e-130").check_range().is_ok());
        assert!(Number::zero().check_range().is_ok());
        assert!(matches!(
            Number::from_scaled(1, 200).check_range(),
            Err(NumberError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_parse_and_display_canonical_form() {
        assert_eq!(num("3.5").to_string(), "3.5");
        assert_eq!(num("3.50").to_string(), "3.5");
        assert_eq!(num("35e-1").to_string(), "3.5");
        assert_eq!(num("0.005").to_string(), "0.005");
        assert_eq!(num("1e5").to_string(), "100000");
        assert_eq!(num("-0.0").to_string(), "0");
        assert_eq!(num("+42").to_string(), "42");
        assert_eq!(num(".25").to_string(), "0.25");
        assert_eq!(num("-12.500").to_string(), "-12.5");
    }

    #[test]
    fn test_equal_values_with_different_spelling_are_equal() {
        assert_eq!(num("3.5"), num("3.500"));
        assert_eq!(num("100"), num("1E2"));
        assert_eq!(num("0"), Number::zero());
        assert_eq!(num("-0"), num("0"));
    }

    #[test]
    fn test_rejects_malformed_input() {
        for bad in ["", "-", ".", "1.2.3", "abc", "1e", "e5", "1,5", "0x10", "NaN"] {
            assert!(
                matches!(bad.parse::<Number>(), Err(NumberError::Invalid(_))),
                "expected '{bad}' to be invalid"
            );
        }
    }

    #[test]
    fn test_rejects_excess_precision() {
        let digits = "1".repeat(MAX_PRECISION + 1);
        assert!(matches!(
            digits.parse::<Number>(),
            Err(NumberError::TooPrecise(_))
        ));
        // Trailing zeros are not significant.
        let padded = format!("{}{}", "1".repeat(MAX_PRECISION), "000");
        assert!(padded.parse::<Number>().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_magnitude() {
        assert!(matches!(
            "1e126".parse::<Number>(),
            Err(NumberError::OutOfRange(_))
        ));
        assert!(matches!(
            "1e-131".parse::<Number>(),
            Err(NumberError::OutOfRange(_))
        ));
        assert!("1e125".parse::<Number>().is_ok());
        assert!("1e-130".parse::<Number>().is_ok());
    }

    #[test]
    fn test_ordering_is_exact() {
        assert!(num("3.4999999999999999999") < num("3.5"));
        assert!(num("2") < num("3.5"));
        assert!(num("10") > num("9.99"));
        assert!(num("-1") < num("0"));
        assert!(num("-10") < num("-9"));
        assert!(num("0.1") > num("0.09"));
        assert!(num("1982") >= num("1982.0"));
    }

    #[test]
    fn test_from_integers() {
        assert_eq!(Number::from(0), Number::zero());
        assert_eq!(Number::from(2015), num("2015"));
        assert_eq!(Number::from(-300), num("-3e2"));
        assert_eq!(Number::from(i64::MIN).to_string(), i64::MIN.to_string());
    }

    #[test]
    fn test_from_scaled() {
        assert_eq!(Number::from_scaled(35, 1), num("3.5"));
        assert_eq!(Number::from_scaled(350, 2), num("3.5"));
        assert_eq!(Number::from_scaled(-5, 3).to_string(), "-0.005");
        assert_eq!(Number::from_scaled(0, 4), Number::zero());
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(num("2015").as_i64(), Some(2015));
        assert_eq!(num("1e3").as_i64(), Some(1000));
        assert_eq!(num("3.5").as_i64(), None);
        assert_eq!(num("1e30").as_i64(), None);
    }
}
