//! Fixed-point money type
//!
//! # Motivation
//!
//! Rental rates, bond amounts and deposits arrive as decimal amounts (TND with
//! millimes, sometimes more precision from legacy imports). Summing them as
//! `f64` drifts by cents over a long rental, and the reporting split between
//! insurer-paid and patient-paid totals must not be rounded before summation.
//!
//! `Micros` stores every monetary amount as an `i64` at 1e-6 scale, so that
//! `daily_rate × days` and every sum are exact.
//!
//! # Scale
//!
//! 1 unit of currency = `Micros(1_000_000)`. Day counts, month counts and
//! basis points stay plain integers and are never implicitly convertible.
//!
//! # Wire format
//!
//! Serialized as a decimal string with six fractional digits (`"300.000000"`).
//! Deserialization accepts either a decimal string or a JSON number with at
//! most six fractional digits. JSON numbers with a fractional part are read
//! through `f64`, which is exact only below 2^53 micros (about 9 billion
//! units); larger fractional numbers are rejected and must be sent as
//! strings. Integral JSON numbers are exact across the whole range.

use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Micros per currency unit.
pub const MICROS_SCALE: i64 = 1_000_000;

const FRACTION_DIGITS: usize = 6;

/// 2^53 micros in currency units; past this, `f64` cannot hold every micro.
const MAX_EXACT_FRACTIONAL_F64: f64 = 9_007_199_254.740_992;

// ---------------------------------------------------------------------------
// Micros newtype
// ---------------------------------------------------------------------------

/// A fixed-point monetary amount at 1e-6 scale.
///
/// There is intentionally no `From<i64>` implementation: callers must be
/// deliberate about when a raw integer is an amount. Use [`Micros::new`] for
/// raw micros, [`Micros::from_units`] for whole currency units, or parse a
/// decimal string.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Micros(i64);

impl Micros {
    pub const ZERO: Micros = Micros(0);
    pub const MAX: Micros = Micros(i64::MAX);
    pub const MIN: Micros = Micros(i64::MIN);

    #[inline]
    pub const fn new(raw: i64) -> Self {
        Micros(raw)
    }

    /// Whole currency units (`from_units(10)` is 10.000000).
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Micros(units * MICROS_SCALE)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn saturating_add(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_add(rhs.0))
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Multiply a per-day rate by a calendar day count.
    ///
    /// Returns `None` on `i64` overflow. This is the only way the engine turns
    /// a daily rate into a period amount, so the product is always exact.
    #[inline]
    pub fn checked_mul_days(self, days: i64) -> Option<Micros> {
        self.0.checked_mul(days).map(Micros)
    }

    /// Round half away from zero to the nearest cent (1/100 unit).
    pub fn round_to_cents(self) -> Micros {
        const CENT: i128 = (MICROS_SCALE / 100) as i128;
        let raw = self.0 as i128;
        let half = CENT / 2;
        let rounded = if raw >= 0 {
            (raw + half) / CENT * CENT
        } else {
            (raw - half) / CENT * CENT
        };
        Micros(rounded.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// `self / divisor` as an exact-as-possible `f64` ratio of raw values.
    ///
    /// Returns `None` when the divisor is zero.
    pub fn ratio(self, divisor: Micros) -> Option<f64> {
        if divisor.0 == 0 {
            None
        } else {
            Some(self.0 as f64 / divisor.0 as f64)
        }
    }
}

// ---------------------------------------------------------------------------
// Sums
// ---------------------------------------------------------------------------

/// Saturating sum; totals over caller-supplied periods must not panic.
impl Sum for Micros {
    fn sum<I: Iterator<Item = Micros>>(iter: I) -> Micros {
        iter.fold(Micros::ZERO, Micros::saturating_add)
    }
}

impl<'a> Sum<&'a Micros> for Micros {
    fn sum<I: Iterator<Item = &'a Micros>>(iter: I) -> Micros {
        iter.copied().sum()
    }
}

// ---------------------------------------------------------------------------
// Display / parsing
// ---------------------------------------------------------------------------

impl fmt::Display for Micros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.0 / MICROS_SCALE;
        let frac = (self.0 % MICROS_SCALE).abs();
        // Between -1 and 0 the integer part truncates to 0 and loses the sign.
        if self.0 < 0 && units == 0 {
            write!(f, "-{units}.{frac:06}")
        } else {
            write!(f, "{units}.{frac:06}")
        }
    }
}

/// Error returned when a decimal amount cannot be represented as [`Micros`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoneyParseError {
    Empty,
    InvalidDigit { input: String },
    TooManyFractionDigits { input: String },
    Overflow { input: String },
    /// Fractional JSON number too large to have survived `f64` intact.
    InexactNumber { input: String },
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::Empty => write!(f, "empty amount"),
            MoneyParseError::InvalidDigit { input } => {
                write!(f, "invalid amount {input:?}: expected a decimal number")
            }
            MoneyParseError::TooManyFractionDigits { input } => write!(
                f,
                "invalid amount {input:?}: more than {FRACTION_DIGITS} fractional digits"
            ),
            MoneyParseError::Overflow { input } => {
                write!(f, "amount {input:?} does not fit the fixed-point range")
            }
            MoneyParseError::InexactNumber { input } => write!(
                f,
                "amount {input} is not exact as a JSON number; send it as a decimal string"
            ),
        }
    }
}

impl std::error::Error for MoneyParseError {}

impl FromStr for Micros {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.is_empty() {
            return Err(MoneyParseError::Empty);
        }
        let (negative, body) = match t.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, t.strip_prefix('+').unwrap_or(t)),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(MoneyParseError::InvalidDigit {
                input: s.to_string(),
            });
        }
        if frac_part.len() > FRACTION_DIGITS {
            // Trailing zeros beyond the scale are harmless ("1.5000000").
            if frac_part[FRACTION_DIGITS..].bytes().any(|b| b != b'0') {
                return Err(MoneyParseError::TooManyFractionDigits {
                    input: s.to_string(),
                });
            }
        }

        let overflow = || MoneyParseError::Overflow {
            input: s.to_string(),
        };
        let units: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| overflow())?
        };
        let mut frac: i64 = 0;
        for (i, b) in frac_part.bytes().take(FRACTION_DIGITS).enumerate() {
            frac += i64::from(b - b'0') * 10_i64.pow((FRACTION_DIGITS - 1 - i) as u32);
        }
        let raw = units
            .checked_mul(MICROS_SCALE)
            .and_then(|u| u.checked_add(frac))
            .ok_or_else(overflow)?;
        Ok(Micros(if negative { -raw } else { raw }))
    }
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

impl Serialize for Micros {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct MicrosVisitor;

impl<'de> Visitor<'de> for MicrosVisitor {
    type Value = Micros;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount as string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Micros, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Micros, E> {
        v.checked_mul(MICROS_SCALE)
            .map(Micros)
            .ok_or_else(|| E::custom(MoneyParseError::Overflow { input: v.to_string() }))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Micros, E> {
        i64::try_from(v)
            .map_err(|_| E::custom(MoneyParseError::Overflow { input: v.to_string() }))
            .and_then(|v| self.visit_i64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Micros, E> {
        if v.fract() != 0.0 && v.abs() >= MAX_EXACT_FRACTIONAL_F64 {
            return Err(E::custom(MoneyParseError::InexactNumber { input: v.to_string() }));
        }
        // Shortest round-trip representation, so 0.1 parses as "0.1".
        self.visit_str(&v.to_string())
    }
}

impl<'de> Deserialize<'de> for Micros {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Micros, D::Error> {
        deserializer.deserialize_any(MicrosVisitor)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_units_scales() {
        assert_eq!(Micros::from_units(10).raw(), 10_000_000);
    }

    #[test]
    fn checked_mul_days_is_exact() {
        let rate: Micros = "12.345".parse().unwrap();
        assert_eq!(rate.checked_mul_days(30), Some(Micros::new(370_350_000)));
    }

    #[test]
    fn checked_mul_days_overflow_returns_none() {
        assert_eq!(Micros::MAX.checked_mul_days(2), None);
    }

    #[test]
    fn sum_saturates_instead_of_panicking() {
        let total: Micros = [Micros::MAX, Micros::from_units(1)].iter().sum();
        assert_eq!(total, Micros::MAX);
    }

    #[test]
    fn parse_accepts_common_forms() {
        assert_eq!("300".parse::<Micros>().unwrap(), Micros::from_units(300));
        assert_eq!("0.5".parse::<Micros>().unwrap(), Micros::new(500_000));
        assert_eq!(".25".parse::<Micros>().unwrap(), Micros::new(250_000));
        assert_eq!("-2.75".parse::<Micros>().unwrap(), Micros::new(-2_750_000));
        assert_eq!(" 1.5000000 ".parse::<Micros>().unwrap(), Micros::new(1_500_000));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!("".parse::<Micros>(), Err(MoneyParseError::Empty));
        assert!(matches!(
            "12a".parse::<Micros>(),
            Err(MoneyParseError::InvalidDigit { .. })
        ));
        assert!(matches!(
            ".".parse::<Micros>(),
            Err(MoneyParseError::InvalidDigit { .. })
        ));
        assert!(matches!(
            "0.0000001".parse::<Micros>(),
            Err(MoneyParseError::TooManyFractionDigits { .. })
        ));
        assert!(matches!(
            "99999999999999999999".parse::<Micros>(),
            Err(MoneyParseError::Overflow { .. })
        ));
    }

    #[test]
    fn round_to_cents_half_away_from_zero() {
        assert_eq!(Micros::new(1_005_000).round_to_cents(), Micros::new(1_010_000));
        assert_eq!(Micros::new(1_004_999).round_to_cents(), Micros::new(1_000_000));
        assert_eq!(Micros::new(-1_005_000).round_to_cents(), Micros::new(-1_010_000));
    }

    #[test]
    fn display_formats_with_six_decimal_places() {
        assert_eq!(Micros::new(1_500_000).to_string(), "1.500000");
        assert_eq!(Micros::new(-250_000).to_string(), "-0.250000");
    }

    #[test]
    fn serde_string_and_number_forms() {
        let from_str: Micros = serde_json::from_str("\"10.5\"").unwrap();
        let from_int: Micros = serde_json::from_str("10").unwrap();
        let from_float: Micros = serde_json::from_str("10.5").unwrap();
        assert_eq!(from_str, Micros::new(10_500_000));
        assert_eq!(from_int, Micros::from_units(10));
        assert_eq!(from_float, from_str);
        assert_eq!(serde_json::to_string(&from_str).unwrap(), "\"10.500000\"");
    }

    #[test]
    fn large_fractional_json_number_is_rejected() {
        let err = serde_json::from_str::<Micros>("12345678901.25").unwrap_err();
        assert!(err.to_string().contains("decimal string"), "{err}");

        let exact: Micros = serde_json::from_str("\"12345678901.25\"").unwrap();
        assert_eq!(exact, Micros::new(12_345_678_901_250_000));

        let integral: Micros = serde_json::from_str("12345678901").unwrap();
        assert_eq!(integral, Micros::from_units(12_345_678_901));

        let small: Micros = serde_json::from_str("9007199254.5").unwrap();
        assert_eq!(small, Micros::new(9_007_199_254_500_000));
    }

    #[test]
    fn ratio_guards_zero_divisor() {
        assert_eq!(Micros::from_units(30).ratio(Micros::ZERO), None);
        assert_eq!(Micros::from_units(30).ratio(Micros::from_units(10)), Some(3.0));
    }
}
