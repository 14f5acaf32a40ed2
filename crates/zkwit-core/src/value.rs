//! Typed scalar wrappers and the input-value tree handed to the serializer.
//!
//! Every scalar knows its canonical field element ([`Primitive::to_field`])
//! and how to render it as a witness literal. [`Str`] is the one
//! multi-element primitive: it decodes to a sequence of [`U8`] in UTF-8
//! encounter order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use zkwit_field::{Fe, LiteralRadix};

use crate::bounded::BoundedVec;
use crate::error::{Error, Result};

/// Radix used when rendering scalars into a witness document.
pub type WitnessEncoding = LiteralRadix;

/// A scalar with a canonical field-element encoding.
pub trait Primitive {
    /// The scalar as a field element.
    fn to_field(&self) -> Fe;

    /// The scalar as a witness literal.
    fn render(&self, encoding: WitnessEncoding) -> String {
        self.to_field().to_literal(encoding)
    }
}

macro_rules! unsigned_wrapper {
    ($(#[$doc:meta])* $name:ident, $raw:ty, $bits:expr) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name($raw);

        impl $name {
            /// Bit width of the wrapped integer.
            pub const BITS: u32 = $bits;

            /// Wrap a raw value (total).
            #[inline]
            #[must_use]
            pub const fn new(v: $raw) -> Self {
                Self(v)
            }

            /// The raw value.
            #[inline]
            #[must_use]
            pub const fn get(self) -> $raw {
                self.0
            }

            /// Checked construction from any integer.
            ///
            /// # Errors
            /// [`Error::Encoding`] if `v` is outside the wrapper's width.
            pub fn try_from_int(v: i128) -> Result<Self> {
                <$raw>::try_from(v).map(Self).map_err(|_| {
                    Error::Encoding(format!(
                        "{v} is out of range for {}",
                        stringify!($name)
                    ))
                })
            }
        }

        impl From<$raw> for $name {
            fn from(v: $raw) -> Self {
                Self(v)
            }
        }

        impl Primitive for $name {
            fn to_field(&self) -> Fe {
                Fe::from_u64(u64::from(self.0))
            }
        }
    };
}

unsigned_wrapper!(
    /// An 8-bit unsigned circuit integer.
    U8, u8, 8
);
unsigned_wrapper!(
    /// A 16-bit unsigned circuit integer.
    U16, u16, 16
);
unsigned_wrapper!(
    /// A 32-bit unsigned circuit integer.
    U32, u32, 32
);

/// A 64-bit unsigned circuit integer.
///
/// The scalar field is slightly narrower than 64 bits, so values at or above
/// the modulus are rejected at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct U64(u64);

impl U64 {
    /// Bit width of the wrapped integer.
    pub const BITS: u32 = 64;

    /// Checked construction.
    ///
    /// # Errors
    /// [`Error::Encoding`] if `v` is not below the field modulus.
    pub fn new(v: u64) -> Result<Self> {
        Fe::from_canonical(v).map(|_| Self(v)).ok_or_else(|| {
            Error::Encoding(format!(
                "{v} cannot be represented below the field modulus {}",
                Fe::MODULUS
            ))
        })
    }

    /// Checked construction from any integer.
    ///
    /// # Errors
    /// [`Error::Encoding`] if `v` is negative or not below the field modulus.
    pub fn try_from_int(v: i128) -> Result<Self> {
        let raw = u64::try_from(v)
            .map_err(|_| Error::Encoding(format!("{v} is out of range for U64")))?;
        Self::new(raw)
    }

    /// The raw value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for U64 {
    type Error = Error;

    fn try_from(v: u64) -> Result<Self> {
        Self::new(v)
    }
}

impl From<U64> for u64 {
    fn from(v: U64) -> Self {
        v.0
    }
}

impl Primitive for U64 {
    fn to_field(&self) -> Fe {
        Fe::from_u64(self.0)
    }
}

/// A native field element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Field(Fe);

impl Field {
    /// Wrap an element.
    #[inline]
    #[must_use]
    pub const fn new(fe: Fe) -> Self {
        Self(fe)
    }

    /// Parse a decimal or `0x` hex literal.
    ///
    /// # Errors
    /// [`Error::Encoding`] if the text is not a canonical element.
    pub fn parse(s: &str) -> Result<Self> {
        Fe::parse(s)
            .map(Self)
            .map_err(|e| Error::Encoding(e.to_string()))
    }

    /// The wrapped element.
    #[inline]
    #[must_use]
    pub const fn get(self) -> Fe {
        self.0
    }
}

impl From<Fe> for Field {
    fn from(fe: Fe) -> Self {
        Self(fe)
    }
}

impl Primitive for Field {
    fn to_field(&self) -> Fe {
        self.0
    }
}

/// A boolean, rendered `1`/`0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bool(bool);

impl Bool {
    /// Wrap a bool.
    #[inline]
    #[must_use]
    pub const fn new(b: bool) -> Self {
        Self(b)
    }

    /// The wrapped bool.
    #[inline]
    #[must_use]
    pub const fn get(self) -> bool {
        self.0
    }
}

impl From<bool> for Bool {
    fn from(b: bool) -> Self {
        Self(b)
    }
}

impl Primitive for Bool {
    fn to_field(&self) -> Fe {
        Fe::from(self.0)
    }
}

/// Text, decoded to its UTF-8 bytes in encounter order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Str(String);

impl Str {
    /// Wrap text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Build from Unicode code points.
    ///
    /// # Errors
    /// [`Error::Encoding`] if a code point is not a Unicode scalar value.
    pub fn from_code_points(points: &[u32]) -> Result<Self> {
        points
            .iter()
            .map(|&cp| {
                char::from_u32(cp)
                    .ok_or_else(|| Error::Encoding(format!("U+{cp:X} is not a Unicode scalar value")))
            })
            .collect::<Result<String>>()
            .map(Self)
    }

    /// Byte scalars of the UTF-8 encoding.
    #[must_use]
    pub fn as_bytes(&self) -> Vec<U8> {
        self.0.bytes().map(U8).collect()
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the text is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The wrapped text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Str {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One node of the input tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputValue {
    /// Native field element.
    Field(Field),
    /// `u8`.
    U8(U8),
    /// `u16`.
    U16(U16),
    /// `u32`.
    U32(U32),
    /// `u64`.
    U64(U64),
    /// Boolean.
    Bool(Bool),
    /// Fixed-length text (`str<N>`).
    Str(Str),
    /// Fixed-length homogeneous array.
    Array(Vec<InputValue>),
    /// Variable-length data inside a fixed capacity.
    BoundedVec(BoundedVec<InputValue>),
    /// Named fields.
    Struct(BTreeMap<String, InputValue>),
}

macro_rules! input_from {
    ($($ty:ident),*) => {
        $(impl From<$ty> for InputValue {
            fn from(v: $ty) -> Self {
                Self::$ty(v)
            }
        })*
    };
}

input_from!(Field, U8, U16, U32, U64, Bool, Str);

impl<T: Into<Self>> From<Vec<T>> for InputValue {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<BoundedVec<T>> for InputValue {
    fn from(v: BoundedVec<T>) -> Self {
        Self::BoundedVec(v.map(Into::into))
    }
}

impl From<BTreeMap<String, Self>> for InputValue {
    fn from(fields: BTreeMap<String, Self>) -> Self {
        Self::Struct(fields)
    }
}

/// Named inputs of one circuit invocation.
///
/// ```
/// use zkwit_core::{BoundedVec, Inputs, Str, U8};
///
/// let key = Str::new("secret").as_bytes();
/// let mut bv = BoundedVec::new(key.len(), U8::default)?;
/// bv.extend_from_slice(&key)?;
/// let inputs = Inputs::new().with("key", bv);
/// assert_eq!(inputs.len(), 1);
/// # Ok::<(), zkwit_core::Error>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inputs(BTreeMap<String, InputValue>);

/// Alias kept for call sites that think of inputs as a plain map.
pub type InputMap = Inputs;

impl Inputs {
    /// Empty input set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) one input.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<InputValue>) -> &mut Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Builder-style [`Inputs::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up an input by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.0.get(name)
    }

    /// Inputs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of inputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no inputs are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<InputValue>> FromIterator<(K, V)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
