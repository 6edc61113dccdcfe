//! Fixed-point money type.
//!
//! # Motivation
//!
//! All monetary amounts use a 1e-6 (micros) fixed-point representation stored
//! as `i64`.  Using raw `i64` for money is error-prone: it allows accidental
//! arithmetic with unrelated integers (share counts, row ordinals) without
//! any compile-time signal.  `Money` wraps the raw `i64` so the type system
//! prevents:
//! - Implicit construction from raw `i64` (no `From<i64>` impl).
//! - Mixing `Money` with unrelated `i64` values in arithmetic.
//!
//! # Scale
//!
//! 1 currency unit = 1_000_000 micros.  Share quantities remain plain `u64`
//! and are never implicitly convertible.
//!
//! # Precision
//!
//! Input prices parse exactly with up to 6 fractional digits — no float
//! round-trip anywhere.  Reported prices round to the currency's minor unit
//! (2 decimal places) via [`Money::round_to_minor`] / [`Money::per_unit_rounded`],
//! half-up (ties round away from zero).

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Micros per whole currency unit.
pub const MICROS_PER_UNIT: i64 = 1_000_000;

/// Micros per minor unit (one hundredth).
const MICROS_PER_MINOR: i64 = 10_000;

const MAX_FRACTION_DIGITS: usize = 6;

/// A fixed-point monetary amount at 1e-6 scale.
///
/// Construct with [`Money::from_micros`], [`Money::from_units`], or by
/// parsing a decimal string; extract the raw scale with [`Money::micros`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Zero monetary amount.
    pub const ZERO: Money = Money(0);

    /// Construct from a raw micros value.
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        Money(micros)
    }

    /// Construct from a whole number of currency units.
    ///
    /// Saturates at the representable range (±9.2e12 units).
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units.saturating_mul(MICROS_PER_UNIT))
    }

    /// The raw micros value.
    #[inline]
    pub const fn micros(self) -> i64 {
        self.0
    }

    /// `true` if this amount is strictly positive.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Saturating addition.
    #[inline]
    pub fn saturating_add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }

    /// Multiply a per-unit price by a share quantity.
    ///
    /// Returns `None` on overflow; callers must handle this explicitly —
    /// overflow in a trade value is a critical error, not a routine
    /// saturation.
    #[inline]
    pub fn checked_mul_qty(self, qty: u64) -> Option<Money> {
        let qty = i64::try_from(qty).ok()?;
        self.0.checked_mul(qty).map(Money)
    }

    /// Round to the minor unit (2 decimal places), half-up.
    ///
    /// Ties round away from zero: 0.005 → 0.01, -0.005 → -0.01.  This is the
    /// single rounding mode of the whole engine; exact micros only leave the
    /// system through it.
    pub fn round_to_minor(self) -> Money {
        let minor = div_round_half_up(self.0 as i128, MICROS_PER_MINOR as i128);
        Money(clamp_i128(minor.saturating_mul(MICROS_PER_MINOR as i128)))
    }

    /// Divide a total (in micros, i128 to absorb qty×price intermediates) by
    /// a share quantity and round the per-unit result to the minor unit.
    ///
    /// The result saturates at the `i64` micros range; a realistic per-unit
    /// price is always far below it.
    pub fn per_unit_rounded(total_micros: i128, quantity: u64) -> Money {
        debug_assert!(quantity > 0, "per_unit_rounded requires quantity > 0");
        let den = (quantity as i128) * (MICROS_PER_MINOR as i128);
        let minor = div_round_half_up(total_micros, den);
        Money(clamp_i128(minor.saturating_mul(MICROS_PER_MINOR as i128)))
    }
}

/// Divide rounding half away from zero.  `den` must be positive.
fn div_round_half_up(num: i128, den: i128) -> i128 {
    debug_assert!(den > 0);
    if num >= 0 {
        (num + den / 2) / den
    } else {
        -((-num + den / 2) / den)
    }
}

fn clamp_i128(x: i128) -> i64 {
    if x > i64::MAX as i128 {
        i64::MAX
    } else if x < i64::MIN as i128 {
        i64::MIN
    } else {
        x as i64
    }
}

// ---------------------------------------------------------------------------
// Arithmetic operators (closed over Money)
// ---------------------------------------------------------------------------

impl Add for Money {
    type Output = Money;
    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;
    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;
    #[inline]
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Failures turning a decimal string into [`Money`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseMoneyError {
    /// Input was empty or only whitespace.
    Empty,
    /// A character outside `[0-9.\-]` (or a misplaced sign/point) was found.
    InvalidDigit { raw: String },
    /// More than 6 fractional digits — would silently lose precision.
    TooManyFractionDigits { raw: String },
    /// The value does not fit the i64 micros range.
    Overflow { raw: String },
}

impl std::fmt::Display for ParseMoneyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "money amount is empty"),
            Self::InvalidDigit { raw } => write!(f, "'{raw}' is not a decimal amount"),
            Self::TooManyFractionDigits { raw } => {
                write!(f, "'{raw}' has more than {MAX_FRACTION_DIGITS} fractional digits")
            }
            Self::Overflow { raw } => write!(f, "'{raw}' is out of the representable range"),
        }
    }
}

impl std::error::Error for ParseMoneyError {}

impl FromStr for Money {
    type Err = ParseMoneyError;

    /// Parse an exact decimal amount, e.g. `"101.35"`, `"-0.5"`, `"7"`.
    ///
    /// No exponents, no grouping separators, at most 6 fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(ParseMoneyError::Empty);
        }

        let invalid = || ParseMoneyError::InvalidDigit { raw: raw.to_string() };

        let (negative, body) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };

        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, fr)) => (i, fr),
            None => (body, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        if frac_part.len() > MAX_FRACTION_DIGITS {
            return Err(ParseMoneyError::TooManyFractionDigits { raw: raw.to_string() });
        }

        let overflow = || ParseMoneyError::Overflow { raw: raw.to_string() };

        let units: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| overflow())?
        };

        let mut frac_micros: i64 = if frac_part.is_empty() {
            0
        } else {
            // ".5" means 500_000 micros: right-pad to 6 digits.
            frac_part.parse().map_err(|_| overflow())?
        };
        for _ in frac_part.len()..MAX_FRACTION_DIGITS {
            frac_micros *= 10;
        }

        let magnitude = units
            .checked_mul(MICROS_PER_UNIT)
            .and_then(|m| m.checked_add(frac_micros))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -magnitude } else { magnitude }))
    }
}

// ---------------------------------------------------------------------------
// Display / serde
// ---------------------------------------------------------------------------

impl std::fmt::Display for Money {
    /// Decimal rendering with trailing zeros trimmed, minimum 2 fractional
    /// digits: `113.67`, `101.3575`, `5.00`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let units = self.0 / MICROS_PER_UNIT;
        let frac = (self.0 % MICROS_PER_UNIT).abs();

        let mut frac_str = format!("{frac:06}");
        while frac_str.len() > 2 && frac_str.ends_with('0') {
            frac_str.pop();
        }

        // When |value| < 1 unit and negative, `units` truncates to 0 and the
        // sign is lost; emit it explicitly.
        if self.0 < 0 && units == 0 {
            write!(f, "-{units}.{frac_str}")
        } else {
            write!(f, "{units}.{frac_str}")
        }
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
