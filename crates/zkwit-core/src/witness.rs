//! Witness serializer: named input tree → flat witness document.
//!
//! A document maps each input name to a [`WitnessValue`]: a scalar literal,
//! an array, or a nested table. Bounded containers become the table
//! `{ storage: [...capacity entries], len: "<len>" }`. Serialization is pure;
//! the same inputs always give byte-identical output.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;
use zkwit_field::Fe;

use crate::error::{Error, Result};
use crate::value::{InputValue, Inputs, Primitive, WitnessEncoding};

/// One serialized value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WitnessValue {
    /// A field-element literal (or the text of a `str<N>`).
    Scalar(String),
    /// A fixed-length array.
    Array(Vec<WitnessValue>),
    /// A struct or bounded container.
    Table(BTreeMap<String, WitnessValue>),
}

impl WitnessValue {
    /// The literal, if this is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Array(_) => "array",
            Self::Table(_) => "table",
        }
    }
}

/// Ordered mapping from input name to serialized value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WitnessDocument(BTreeMap<String, WitnessValue>);

impl WitnessDocument {
    /// Value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&WitnessValue> {
        self.0.get(name)
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WitnessValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of top-level inputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the document is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compact JSON.
    ///
    /// # Errors
    /// [`Error::Encoding`] if `serde_json` fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Encoding(e.to_string()))
    }

    /// Pretty JSON.
    ///
    /// # Errors
    /// [`Error::Encoding`] if `serde_json` fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Encoding(e.to_string()))
    }

    /// Prover-input TOML.
    ///
    /// # Errors
    /// [`Error::Encoding`] if `toml` fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Encoding(e.to_string()))
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    /// [`Error::Encoding`] if the text is not a witness document.
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| Error::Encoding(e.to_string()))
    }

    /// Parse a TOML document.
    ///
    /// # Errors
    /// [`Error::Encoding`] if the text is not a witness document.
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Encoding(e.to_string()))
    }
}

impl FromIterator<(String, WitnessValue)> for WitnessDocument {
    fn from_iter<I: IntoIterator<Item = (String, WitnessValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Structural type of a value; arrays require equal shapes.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Shape {
    Field,
    Int(u32),
    Bool,
    Str(usize),
    Array(usize, Option<Box<Shape>>),
    Bounded(usize, Box<Shape>),
    Struct(Vec<(String, Shape)>),
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field => f.write_str("Field"),
            Self::Int(bits) => write!(f, "u{bits}"),
            Self::Bool => f.write_str("bool"),
            Self::Str(n) => write!(f, "str<{n}>"),
            Self::Array(n, Some(elem)) => write!(f, "[{elem}; {n}]"),
            Self::Array(n, None) => write!(f, "[_; {n}]"),
            Self::Bounded(n, elem) => write!(f, "BoundedVec<{elem}, {n}>"),
            Self::Struct(fields) => {
                f.write_str("{")?;
                for (i, (name, s)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {s}")?;
                }
                f.write_str("}")
            }
        }
    }
}

fn scalar(p: &impl Primitive, enc: WitnessEncoding) -> WitnessValue {
    WitnessValue::Scalar(p.render(enc))
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_owned()
    } else {
        format!("{path}.{key}")
    }
}

fn encode_elements<'a>(
    path: &str,
    items: impl Iterator<Item = &'a InputValue>,
    enc: WitnessEncoding,
) -> Result<(Vec<WitnessValue>, Option<Shape>)> {
    let mut out = Vec::new();
    let mut first: Option<Shape> = None;
    for (i, item) in items.enumerate() {
        let at = format!("{path}[{i}]");
        let (w, shape) = encode_value(&at, item, enc)?;
        match &first {
            None => first = Some(shape),
            Some(s) if *s != shape => {
                return Err(Error::shape(
                    at,
                    format!("element of shape {shape} in an array of {s}"),
                ))
            }
            Some(_) => {}
        }
        out.push(w);
    }
    Ok((out, first))
}

fn encode_value(path: &str, v: &InputValue, enc: WitnessEncoding) -> Result<(WitnessValue, Shape)> {
    Ok(match v {
        InputValue::Field(x) => (scalar(x, enc), Shape::Field),
        InputValue::U8(x) => (scalar(x, enc), Shape::Int(8)),
        InputValue::U16(x) => (scalar(x, enc), Shape::Int(16)),
        InputValue::U32(x) => (scalar(x, enc), Shape::Int(32)),
        InputValue::U64(x) => (scalar(x, enc), Shape::Int(64)),
        InputValue::Bool(x) => (scalar(x, enc), Shape::Bool),
        InputValue::Str(s) => (WitnessValue::Scalar(s.as_str().to_owned()), Shape::Str(s.len())),
        InputValue::Array(items) => {
            let (vals, elem) = encode_elements(path, items.iter(), enc)?;
            (
                WitnessValue::Array(vals),
                Shape::Array(items.len(), elem.map(Box::new)),
            )
        }
        InputValue::BoundedVec(bv) => {
            let storage_path = join(path, "storage");
            let (vals, elem) = encode_elements(&storage_path, bv.storage().iter(), enc)?;
            let elem = elem.ok_or_else(|| Error::shape(path, "bounded container has no storage"))?;
            let len = Fe::from_u64(bv.len() as u64).to_literal(enc);
            let table = BTreeMap::from([
                ("storage".to_owned(), WitnessValue::Array(vals)),
                ("len".to_owned(), WitnessValue::Scalar(len)),
            ]);
            (
                WitnessValue::Table(table),
                Shape::Bounded(bv.capacity(), Box::new(elem)),
            )
        }
        InputValue::Struct(fields) => {
            if fields.is_empty() {
                return Err(Error::shape(path, "struct has no fields"));
            }
            let mut table = BTreeMap::new();
            let mut shape = Vec::with_capacity(fields.len());
            for (name, field) in fields {
                if name.is_empty() {
                    return Err(Error::shape(path, "struct field name is empty"));
                }
                let (w, s) = encode_value(&join(path, name), field, enc)?;
                table.insert(name.clone(), w);
                shape.push((name.clone(), s));
            }
            (WitnessValue::Table(table), Shape::Struct(shape))
        }
    })
}

/// Serialize named inputs into a witness document.
///
/// # Errors
/// [`Error::UnsupportedShape`] for heterogeneous arrays or containers,
/// empty structs, and empty names.
pub fn to_witness(inputs: &Inputs, encoding: WitnessEncoding) -> Result<WitnessDocument> {
    let mut doc = BTreeMap::new();
    for (name, value) in inputs.iter() {
        if name.is_empty() {
            return Err(Error::shape("<root>", "input name is empty"));
        }
        let (w, _) = encode_value(name, value, encoding)?;
        doc.insert(name.to_owned(), w);
    }
    debug!(inputs = doc.len(), ?encoding, "serialized witness document");
    Ok(WitnessDocument(doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounded::BoundedVec;
    use crate::value::{Bool, Field, Str, U16, U8};

    fn bytes_bv(text: &str, cap: usize) -> BoundedVec<U8> {
        BoundedVec::from_slice(cap, &Str::new(text).as_bytes(), U8::default).unwrap()
    }

    #[test]
    fn bounded_vec_becomes_storage_and_len() {
        let inputs = Inputs::new().with("key", bytes_bv("ab", 4));
        let doc = to_witness(&inputs, WitnessEncoding::Decimal).unwrap();
        assert_eq!(
            doc.to_json().unwrap(),
            r#"{"key":{"len":"2","storage":["97","98","0","0"]}}"#
        );
    }

    #[test]
    fn hex_rendering() {
        let inputs = Inputs::new().with("x", U8::new(115)).with("ok", Bool::new(true));
        let doc = to_witness(&inputs, WitnessEncoding::Hex).unwrap();
        assert_eq!(doc.get("x"), Some(&WitnessValue::Scalar("0x73".into())));
        assert_eq!(doc.get("ok"), Some(&WitnessValue::Scalar("0x1".into())));
    }

    #[test]
    fn nested_structs_and_arrays() {
        let point: BTreeMap<String, InputValue> = BTreeMap::from([
            ("x".to_owned(), Field::parse("5").unwrap().into()),
            ("tags".to_owned(), vec![U16::new(1), U16::new(2)].into()),
        ]);
        let inputs = Inputs::new()
            .with("p", point)
            .with("name", Str::new("zk"));
        let doc = to_witness(&inputs, WitnessEncoding::Decimal).unwrap();
        assert_eq!(
            doc.to_json().unwrap(),
            r#"{"name":"zk","p":{"tags":["1","2"],"x":"5"}}"#
        );
        let back = WitnessDocument::from_json(&doc.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn heterogeneous_array_is_rejected_with_path() {
        let inputs = Inputs::new().with(
            "mixed",
            InputValue::Array(vec![U8::new(1).into(), Bool::new(true).into()]),
        );
        match to_witness(&inputs, WitnessEncoding::Decimal) {
            Err(Error::UnsupportedShape { path, .. }) => assert_eq!(path, "mixed[1]"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bounded_vecs_of_different_capacity_do_not_mix() {
        let inputs = Inputs::new().with(
            "rows",
            InputValue::Array(vec![bytes_bv("a", 2).into(), bytes_bv("b", 3).into()]),
        );
        assert!(matches!(
            to_witness(&inputs, WitnessEncoding::Decimal),
            Err(Error::UnsupportedShape { .. })
        ));
    }

    #[test]
    fn empty_struct_and_names_are_rejected() {
        let empty = Inputs::new().with("s", BTreeMap::<String, InputValue>::new());
        assert!(to_witness(&empty, WitnessEncoding::Decimal).is_err());
        let unnamed = Inputs::new().with("", U8::new(0));
        assert!(to_witness(&unnamed, WitnessEncoding::Decimal).is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let inputs = Inputs::new()
            .with("key", bytes_bv("secret", 6))
            .with("n", U8::new(3));
        let doc = to_witness(&inputs, WitnessEncoding::Decimal).unwrap();
        let text = doc.to_toml().unwrap();
        assert_eq!(WitnessDocument::from_toml(&text).unwrap(), doc);
    }
}
