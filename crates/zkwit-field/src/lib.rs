//! Small prime field used for witness values, plus Goldilocks helpers.
//!
//! - `Fp64<P>`: prime field modulo a 64-bit prime `P` (const generic).
//! - [`Goldilocks`]: `p = 2^64 - 2^32 + 1`, the field every zkwit circuit lives in.
//! - [`encode`]: canonical decimal / `0x`-hex literals, the textual form used
//!   by witness documents and ABI encoding.
//!
//! Serialization goes through the canonical `u64` representative; values
//! `>= P` are rejected on deserialize so decoded proofs can never carry a
//! non-reduced element.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::doc_markdown
)]

pub mod encode;
pub use encode::{LiteralRadix, ParseFieldError};

use core::fmt;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use serde::{Deserialize, Serialize};

/// 64-bit prime field element (const generic modulus).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Fp64<const P: u64>(
    /// Canonical representative modulo `P`. Public for convenience.
    pub u64,
);

impl<const P: u64> Fp64<P> {
    /// The field modulus.
    pub const MODULUS: u64 = P;

    /// Zero.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// One.
    #[inline]
    #[must_use]
    pub const fn one() -> Self {
        Self(1 % P)
    }

    /// Whether this is the additive identity.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add two raw residues modulo `P` without overflow (via u128).
    #[inline]
    #[must_use]
    pub fn add_raw(a: u64, b: u64) -> u64 {
        let s = u128::from(a) + u128::from(b);
        let s = if s >= u128::from(P) { s - u128::from(P) } else { s };
        s as u64
    }

    /// Subtract two raw residues modulo `P` without overflow (via u128).
    #[inline]
    #[must_use]
    pub fn sub_raw(a: u64, b: u64) -> u64 {
        if a >= b {
            a - b
        } else {
            (u128::from(a) + u128::from(P) - u128::from(b)) as u64
        }
    }

    /// Multiply two raw residues modulo `P` using a 128-bit intermediate.
    #[inline]
    #[must_use]
    pub fn mul_raw(a: u64, b: u64) -> u64 {
        let prod = u128::from(a) * u128::from(b);
        (prod % u128::from(P)) as u64
    }

    /// Exponentiation by squaring.
    #[inline]
    #[must_use]
    pub fn pow(self, mut e: u64) -> Self {
        let mut base = self;
        let mut acc = Self::one();
        while e > 0 {
            if e & 1 == 1 {
                acc *= base;
            }
            base *= base;
            e >>= 1;
        }
        acc
    }

    /// Multiplicative inverse (P assumed prime). The inverse of zero is zero.
    #[inline]
    #[must_use]
    pub fn inv(self) -> Self {
        self.pow(P - 2)
    }

    /// From signed `i64` (two's-complement mapping into the field).
    #[inline]
    #[must_use]
    pub fn from_i64(x: i64) -> Self {
        Self(i128::from(x).rem_euclid(i128::from(P)) as u64)
    }

    /// From `u64` reduced mod `P`.
    #[inline]
    #[must_use]
    pub const fn from_u64(x: u64) -> Self {
        Self(x % P)
    }

    /// From a canonical `u64`; `None` if `x >= P`.
    #[inline]
    #[must_use]
    pub const fn from_canonical(x: u64) -> Option<Self> {
        if x < P {
            Some(Self(x))
        } else {
            None
        }
    }

    /// Build an element from the first 8 bytes of `bytes` (little-endian),
    /// reduced mod `P`. Shorter inputs are zero-extended.
    #[must_use]
    pub fn from_le_bytes_reduced(bytes: &[u8]) -> Self {
        let mut le = [0u8; 8];
        let n = bytes.len().min(8);
        le[..n].copy_from_slice(&bytes[..n]);
        Self::from_u64(u64::from_le_bytes(le))
    }

    /// Into little-endian 8 bytes (canonical for this field).
    #[inline]
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    /// Canonical representative.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Number of significant bits of the canonical representative.
    #[inline]
    #[must_use]
    pub const fn num_bits(self) -> u32 {
        u64::BITS - self.0.leading_zeros()
    }

    /// Additive inverse.
    #[inline]
    #[must_use]
    pub const fn neg(self) -> Self {
        if self.0 == 0 {
            self
        } else {
            Self(P - self.0)
        }
    }
}

impl<const P: u64> Default for Fp64<P> {
    #[inline]
    fn default() -> Self {
        Self::zero()
    }
}

impl<const P: u64> From<bool> for Fp64<P> {
    #[inline]
    fn from(b: bool) -> Self {
        if b {
            Self::one()
        } else {
            Self::zero()
        }
    }
}

impl<const P: u64> From<u8> for Fp64<P> {
    #[inline]
    fn from(x: u8) -> Self {
        Self::from_u64(u64::from(x))
    }
}

impl<const P: u64> From<u32> for Fp64<P> {
    #[inline]
    fn from(x: u32) -> Self {
        Self::from_u64(u64::from(x))
    }
}

impl<const P: u64> TryFrom<u64> for Fp64<P> {
    type Error = NonCanonical;

    fn try_from(x: u64) -> Result<Self, Self::Error> {
        Self::from_canonical(x).ok_or(NonCanonical { value: x, modulus: P })
    }
}

impl<const P: u64> From<Fp64<P>> for u64 {
    #[inline]
    fn from(x: Fp64<P>) -> Self {
        x.0
    }
}

/// A `u64` that is not a canonical representative of the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NonCanonical {
    /// The rejected value.
    pub value: u64,
    /// The field modulus it had to be below.
    pub modulus: u64,
}

impl fmt::Display for NonCanonical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is not a canonical field element (modulus {})",
            self.value, self.modulus
        )
    }
}

impl std::error::Error for NonCanonical {}

impl<const P: u64> fmt::Display for Fp64<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<const P: u64> Add for Fp64<P> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(Self::add_raw(self.0, rhs.0))
    }
}
impl<const P: u64> Sub for Fp64<P> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(Self::sub_raw(self.0, rhs.0))
    }
}
impl<const P: u64> Mul for Fp64<P> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(Self::mul_raw(self.0, rhs.0))
    }
}
impl<const P: u64> AddAssign for Fp64<P> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl<const P: u64> SubAssign for Fp64<P> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
impl<const P: u64> MulAssign for Fp64<P> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}
impl<const P: u64> Neg for Fp64<P> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::neg(self)
    }
}

impl<const P: u64> core::iter::Sum for Fp64<P> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + x)
    }
}

/* ---------------- Goldilocks helpers ---------------- */

/// Goldilocks prime `p = 2^64 - 2^32 + 1`.
pub const GOLDILOCKS: u64 = 0xffff_ffff_0000_0001;

/// Goldilocks field element type.
pub type Goldilocks = Fp64<GOLDILOCKS>;

/// The field element type used throughout zkwit.
pub type Fe = Goldilocks;

#[cfg(test)]
mod tests {
    use super::*;
    const P: u64 = 97;

    #[test]
    fn small_field_arith() {
        let a = Fp64::<P>(90);
        let b = Fp64::<P>(10);
        assert_eq!((a + b).0, 3);
        assert_eq!((b - a).0, 17);
        assert_eq!((a * b).0, 900 % 97);
        assert_eq!((a * a.inv()).0, 1);
        assert_eq!((-Fp64::<P>::zero()).0, 0);
    }

    #[test]
    fn goldilocks_wraps() {
        let max = Fe::from_u64(GOLDILOCKS - 1);
        assert_eq!(max + Fe::one(), Fe::zero());
        assert_eq!(Fe::from_i64(-1), max);
        assert_eq!(Fe::from_u64(GOLDILOCKS), Fe::zero());
    }

    #[test]
    fn canonical_only_on_deserialize() {
        let ok: Fe = serde_json::from_str("42").unwrap();
        assert_eq!(ok, Fe::from_u64(42));
        let bad = serde_json::from_str::<Fe>(&GOLDILOCKS.to_string());
        assert!(bad.is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "42");
    }

    #[test]
    fn num_bits() {
        assert_eq!(Fe::zero().num_bits(), 0);
        assert_eq!(Fe::from_u64(255).num_bits(), 8);
        assert_eq!(Fe::from_u64(256).num_bits(), 9);
    }
}
