use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A profit (or loss) target in integer basis points: 10% = 1000 bp.
///
/// Signed on purpose — pricing at a loss is a valid engine-level input; any
/// "no losses" clamp belongs to the presentation layer, not here.  Two
/// decimal places of percent (one basis point) is the finest granularity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfitBps(i64);

impl ProfitBps {
    /// 0% — break-even pricing.
    pub const BREAK_EVEN: ProfitBps = ProfitBps(0);

    #[inline]
    pub const fn from_bps(bps: i64) -> Self {
        ProfitBps(bps)
    }

    #[inline]
    pub const fn bps(self) -> i64 {
        self.0
    }

    /// `true` when the target prices below cost.
    #[inline]
    pub fn is_loss(self) -> bool {
        self.0 < 0
    }
}

impl std::fmt::Display for ProfitBps {
    /// Percent rendering: `1000` bp → `10%`, `1050` bp → `10.5%`, `-25` bp →
    /// `-0.25%`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / 100;
        let frac = abs % 100;
        if frac == 0 {
            write!(f, "{sign}{whole}%")
        } else if frac % 10 == 0 {
            write!(f, "{sign}{whole}.{}%", frac / 10)
        } else {
            write!(f, "{sign}{whole}.{frac:02}%")
        }
    }
}

/// Failures turning a percent string into [`ProfitBps`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseProfitError {
    Empty,
    InvalidDigit { raw: String },
    /// More than 2 fractional percent digits — finer than a basis point.
    TooPrecise { raw: String },
    Overflow { raw: String },
}

impl std::fmt::Display for ParseProfitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "profit percentage is empty"),
            Self::InvalidDigit { raw } => write!(f, "'{raw}' is not a percentage"),
            Self::TooPrecise { raw } => {
                write!(f, "'{raw}' is finer than a basis point (max 2 decimals)")
            }
            Self::Overflow { raw } => write!(f, "'{raw}' is out of range"),
        }
    }
}

impl std::error::Error for ParseProfitError {}

impl FromStr for ProfitBps {
    type Err = ParseProfitError;

    /// Parse a decimal percentage: `"10"`, `"10.5"`, `"-2.25"`, `"0"`.
    /// A trailing `%` is tolerated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().trim_end_matches('%').trim();
        if raw.is_empty() {
            return Err(ParseProfitError::Empty);
        }

        let invalid = || ParseProfitError::InvalidDigit { raw: s.trim().to_string() };

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
        if frac_part.len() > 2 {
            return Err(ParseProfitError::TooPrecise { raw: s.trim().to_string() });
        }

        let overflow = || ParseProfitError::Overflow { raw: s.trim().to_string() };

        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| overflow())?
        };
        let mut frac: i64 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().map_err(|_| overflow())?
        };
        for _ in frac_part.len()..2 {
            frac *= 10;
        }

        let bps = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(overflow)?;

        Ok(ProfitBps(if negative { -bps } else { bps }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_percent_strings_to_basis_points() {
        assert_eq!("10".parse(), Ok(ProfitBps::from_bps(1000)));
        assert_eq!("10.5".parse(), Ok(ProfitBps::from_bps(1050)));
        assert_eq!("10.50%".parse(), Ok(ProfitBps::from_bps(1050)));
        assert_eq!("0".parse(), Ok(ProfitBps::BREAK_EVEN));
        assert_eq!("-2.25".parse(), Ok(ProfitBps::from_bps(-225)));
        assert_eq!(".5".parse(), Ok(ProfitBps::from_bps(50)));
    }

    #[test]
    fn rejects_sub_basis_point_precision() {
        assert!(matches!(
            "1.125".parse::<ProfitBps>(),
            Err(ParseProfitError::TooPrecise { .. })
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!("".parse::<ProfitBps>(), Err(ParseProfitError::Empty));
        assert!(matches!(
            "ten".parse::<ProfitBps>(),
            Err(ParseProfitError::InvalidDigit { .. })
        ));
        assert!(matches!(
            "1..5".parse::<ProfitBps>(),
            Err(ParseProfitError::InvalidDigit { .. })
        ));
    }

    #[test]
    fn displays_as_percent() {
        assert_eq!(ProfitBps::from_bps(1000).to_string(), "10%");
        assert_eq!(ProfitBps::from_bps(1050).to_string(), "10.5%");
        assert_eq!(ProfitBps::from_bps(1025).to_string(), "10.25%");
        assert_eq!(ProfitBps::from_bps(-25).to_string(), "-0.25%");
    }

    #[test]
    fn loss_detection() {
        assert!(ProfitBps::from_bps(-1).is_loss());
        assert!(!ProfitBps::BREAK_EVEN.is_loss());
    }
}
