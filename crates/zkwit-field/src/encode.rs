//! Canonical textual literals for field elements.
//!
//! Witness documents carry every scalar as a string. Two radixes are
//! accepted on input (`"123"` and `"0x7b"`) and either can be produced on
//! output; the parser rejects anything that is not a canonical element.

use core::fmt;
use core::num::IntErrorKind;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Fp64;

/// Output radix for rendered literals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralRadix {
    /// Plain decimal, e.g. `"115"`.
    #[default]
    Decimal,
    /// `0x`-prefixed lowercase hex, e.g. `"0x73"`.
    Hex,
}

/// Why a literal failed to parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseFieldError {
    /// Empty string (or a bare `0x`).
    Empty,
    /// A character outside the radix alphabet.
    InvalidDigit(String),
    /// The value does not fit below the modulus.
    NotCanonical(String),
}

impl fmt::Display for ParseFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty field literal"),
            Self::InvalidDigit(s) => write!(f, "invalid digit in field literal {s:?}"),
            Self::NotCanonical(s) => write!(f, "field literal {s:?} is not below the modulus"),
        }
    }
}

impl std::error::Error for ParseFieldError {}

impl<const P: u64> Fp64<P> {
    /// Parse a decimal or `0x`/`0X`-prefixed hex literal.
    ///
    /// Leading/trailing whitespace is ignored. Negative literals are not
    /// accepted; callers that want `p - x` should build it explicitly.
    pub fn parse(s: &str) -> Result<Self, ParseFieldError> {
        let t = s.trim();
        let (digits, radix) = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
            Some(rest) => (rest, 16),
            None => (t, 10),
        };
        if digits.is_empty() {
            return Err(ParseFieldError::Empty);
        }
        let v = u128::from_str_radix(digits, radix).map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow => ParseFieldError::NotCanonical(t.to_owned()),
            IntErrorKind::Empty => ParseFieldError::Empty,
            _ => ParseFieldError::InvalidDigit(t.to_owned()),
        })?;
        if v >= u128::from(P) {
            return Err(ParseFieldError::NotCanonical(t.to_owned()));
        }
        Ok(Self(v as u64))
    }

    /// Render as a literal in the requested radix.
    #[must_use]
    pub fn to_literal(self, radix: LiteralRadix) -> String {
        match radix {
            LiteralRadix::Decimal => self.0.to_string(),
            LiteralRadix::Hex => format!("{:#x}", self.0),
        }
    }
}

impl<const P: u64> FromStr for Fp64<P> {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Fe, GOLDILOCKS};

    #[test]
    fn parses_both_radixes() {
        assert_eq!(Fe::parse("123").unwrap(), Fe::from_u64(123));
        assert_eq!(Fe::parse("0x7b").unwrap(), Fe::from_u64(123));
        assert_eq!(Fe::parse(" 0X7B ").unwrap(), Fe::from_u64(123));
    }

    #[test]
    fn rejects_garbage_and_overflow() {
        assert_eq!(Fe::parse(""), Err(ParseFieldError::Empty));
        assert_eq!(Fe::parse("0x"), Err(ParseFieldError::Empty));
        assert!(matches!(Fe::parse("12a"), Err(ParseFieldError::InvalidDigit(_))));
        assert!(matches!(Fe::parse("-1"), Err(ParseFieldError::InvalidDigit(_))));
        assert!(matches!(
            Fe::parse(&GOLDILOCKS.to_string()),
            Err(ParseFieldError::NotCanonical(_))
        ));
        assert!(matches!(
            Fe::parse("0xffffffffffffffffffffffffffffffffff"),
            Err(ParseFieldError::NotCanonical(_))
        ));
    }

    #[test]
    fn renders_literals() {
        let x = Fe::from_u64(115);
        assert_eq!(x.to_literal(LiteralRadix::Decimal), "115");
        assert_eq!(x.to_literal(LiteralRadix::Hex), "0x73");
        assert_eq!(Fe::zero().to_literal(LiteralRadix::Hex), "0x0");
    }
}
