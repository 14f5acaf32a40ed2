//! Circuit ABI: named, typed parameters and their flattening to field elements.
//!
//! The JSON shape follows the compiled-artifact convention: every type carries
//! a `kind` tag, and a bounded container is the struct
//! `{ storage: [T; N], len: u32 }`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use zkwit_field::Fe;

use crate::error::{Error, Result};
use crate::value::WitnessEncoding;
use crate::witness::{WitnessDocument, WitnessValue};

/// Widest integer an ABI may declare.
pub const MAX_INTEGER_WIDTH: u32 = 64;

/// Struct path used for bounded containers.
pub const BOUNDED_VEC_PATH: &str = "std::collections::bounded_vec::BoundedVec";

/// Integer signedness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    /// Unsigned.
    Unsigned,
    /// Two's-complement signed.
    Signed,
}

/// Whether a parameter is revealed to the verifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Bound into the proof's public inputs.
    Public,
    /// Known only to the prover.
    #[default]
    Private,
}

/// A parameter or return type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AbiType {
    /// Native field element.
    Field,
    /// Boolean.
    Boolean,
    /// Fixed-width integer.
    Integer {
        /// Signedness.
        sign: Sign,
        /// Bit width (at most 64).
        width: u32,
    },
    /// UTF-8 text of exactly `length` bytes.
    String {
        /// Byte length.
        length: usize,
    },
    /// Fixed-length array.
    Array {
        /// Element count.
        length: usize,
        /// Element type.
        #[serde(rename = "type")]
        typ: Box<AbiType>,
    },
    /// Named fields in declaration order.
    Struct {
        /// Fully qualified struct path.
        path: String,
        /// Fields in flattening order.
        fields: Vec<AbiField>,
    },
}

/// One struct field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiField {
    /// Field name.
    pub name: String,
    /// Field type.
    #[serde(rename = "type")]
    pub typ: AbiType,
}

impl AbiType {
    /// `u{width}`.
    #[must_use]
    pub const fn unsigned(width: u32) -> Self {
        Self::Integer {
            sign: Sign::Unsigned,
            width,
        }
    }

    /// `[elem; length]`.
    #[must_use]
    pub fn array(length: usize, elem: Self) -> Self {
        Self::Array {
            length,
            typ: Box::new(elem),
        }
    }

    /// `BoundedVec<elem, capacity>`.
    #[must_use]
    pub fn bounded_vec(capacity: usize, elem: Self) -> Self {
        Self::Struct {
            path: BOUNDED_VEC_PATH.to_owned(),
            fields: vec![
                AbiField {
                    name: "storage".to_owned(),
                    typ: Self::array(capacity, elem),
                },
                AbiField {
                    name: "len".to_owned(),
                    typ: Self::unsigned(32),
                },
            ],
        }
    }

    /// Number of field elements this type flattens to (saturating; see
    /// [`AbiType::validate`] for the checked count).
    #[must_use]
    pub fn field_count(&self) -> usize {
        match self {
            Self::Field | Self::Boolean | Self::Integer { .. } => 1,
            Self::String { length } => *length,
            Self::Array { length, typ } => length.saturating_mul(typ.field_count()),
            Self::Struct { fields, .. } => fields
                .iter()
                .fold(0usize, |n, f| n.saturating_add(f.typ.field_count())),
        }
    }

    /// Check integer widths and return the flattened field count.
    ///
    /// # Errors
    /// [`Error::InvalidCircuit`] for an integer width outside `1..=64` or a
    /// field count that overflows `usize`.
    pub fn validate(&self, path: &str) -> Result<usize> {
        let overflow = || Error::InvalidCircuit(format!("`{path}`: field count overflows"));
        match self {
            Self::Integer { width, .. } if !(1..=MAX_INTEGER_WIDTH).contains(width) => {
                Err(Error::InvalidCircuit(format!(
                    "`{path}`: integer width {width} is outside 1..={MAX_INTEGER_WIDTH}"
                )))
            }
            Self::Field | Self::Boolean | Self::Integer { .. } => Ok(1),
            Self::String { length } => Ok(*length),
            Self::Array { length, typ } => typ
                .validate(&format!("{path}[]"))?
                .checked_mul(*length)
                .ok_or_else(overflow),
            Self::Struct { fields, .. } => fields.iter().try_fold(0usize, |n, f| {
                let sub = f.typ.validate(&format!("{path}.{}", f.name))?;
                n.checked_add(sub).ok_or_else(overflow)
            }),
        }
    }

    fn encode(&self, path: &str, value: &WitnessValue, out: &mut Vec<Fe>) -> Result<()> {
        match (self, value) {
            (Self::Field, WitnessValue::Scalar(s)) => {
                out.push(parse_literal(path, s)?);
            }
            (Self::Boolean, WitnessValue::Scalar(s)) => {
                let b = match s.trim() {
                    "1" | "0x1" | "true" => true,
                    "0" | "0x0" | "false" => false,
                    other => {
                        return Err(Error::Encoding(format!(
                            "`{path}`: {other:?} is not a boolean"
                        )))
                    }
                };
                out.push(Fe::from(b));
            }
            (Self::Integer { sign, width }, WitnessValue::Scalar(s)) => {
                out.push(encode_integer(path, s, *sign, *width)?);
            }
            (Self::String { length }, WitnessValue::Scalar(s)) => {
                if s.len() != *length {
                    return Err(Error::shape(
                        path,
                        format!("expected str<{length}>, got {} bytes", s.len()),
                    ));
                }
                out.extend(s.bytes().map(Fe::from));
            }
            (Self::Array { length, typ }, WitnessValue::Array(items)) => {
                if items.len() != *length {
                    return Err(Error::shape(
                        path,
                        format!("expected {length} elements, got {}", items.len()),
                    ));
                }
                for (i, item) in items.iter().enumerate() {
                    typ.encode(&format!("{path}[{i}]"), item, out)?;
                }
            }
            (Self::Struct { fields, .. }, WitnessValue::Table(table)) => {
                if let Some(extra) = table.keys().find(|k| !fields.iter().any(|f| &f.name == *k)) {
                    return Err(Error::shape(path, format!("unexpected field `{extra}`")));
                }
                for f in fields {
                    let sub = format!("{path}.{}", f.name);
                    let v = table
                        .get(&f.name)
                        .ok_or_else(|| Error::shape(&sub, "missing field"))?;
                    f.typ.encode(&sub, v, out)?;
                }
            }
            (expected, found) => {
                return Err(Error::shape(
                    path,
                    format!("expected {}, found {}", expected.kind_name(), found.kind()),
                ))
            }
        }
        Ok(())
    }

    fn decode(&self, values: &mut impl Iterator<Item = Fe>, enc: WitnessEncoding) -> Option<WitnessValue> {
        Some(match self {
            Self::Field | Self::Boolean | Self::Integer { .. } => {
                WitnessValue::Scalar(values.next()?.to_literal(enc))
            }
            Self::String { length } => {
                let bytes = (0..*length)
                    .map(|_| values.next().and_then(|v| u8::try_from(v.as_u64()).ok()))
                    .collect::<Option<Vec<u8>>>()?;
                WitnessValue::Scalar(String::from_utf8_lossy(&bytes).into_owned())
            }
            Self::Array { length, typ } => WitnessValue::Array(
                (0..*length)
                    .map(|_| typ.decode(values, enc))
                    .collect::<Option<_>>()?,
            ),
            Self::Struct { fields, .. } => WitnessValue::Table(
                fields
                    .iter()
                    .map(|f| Some((f.name.clone(), f.typ.decode(values, enc)?)))
                    .collect::<Option<BTreeMap<_, _>>>()?,
            ),
        })
    }

    const fn kind_name(&self) -> &'static str {
        match self {
            Self::Field | Self::Boolean | Self::Integer { .. } | Self::String { .. } => "scalar",
            Self::Array { .. } => "array",
            Self::Struct { .. } => "table",
        }
    }
}

fn parse_literal(path: &str, s: &str) -> Result<Fe> {
    Fe::parse(s).map_err(|e| Error::Encoding(format!("`{path}`: {e}")))
}

fn encode_integer(path: &str, s: &str, sign: Sign, width: u32) -> Result<Fe> {
    let out_of_range = || Error::Encoding(format!("`{path}`: {s:?} does not fit in {sign:?} {width}-bit integer"));
    if !(1..=MAX_INTEGER_WIDTH).contains(&width) {
        return Err(Error::Encoding(format!("`{path}`: unsupported integer width {width}")));
    }
    match sign {
        Sign::Unsigned => {
            let v = parse_literal(path, s)?;
            if v.num_bits() > width {
                return Err(out_of_range());
            }
            Ok(v)
        }
        Sign::Signed => {
            let t = s.trim();
            let (neg, digits) = t.strip_prefix('-').map_or((false, t), |d| (true, d));
            let magnitude = i128::from(parse_literal(path, digits)?.as_u64());
            let v = if neg { -magnitude } else { magnitude };
            let half = 1i128 << (width - 1);
            if v < -half || v >= half {
                return Err(out_of_range());
            }
            let modulus = 1i128 << width;
            Ok(Fe::from_u64(v.rem_euclid(modulus) as u64))
        }
    }
}

/// One named parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParameter {
    /// Parameter name (key in the witness document).
    pub name: String,
    /// Parameter type.
    #[serde(rename = "type")]
    pub typ: AbiType,
    /// Visibility.
    pub visibility: Visibility,
}

/// Return value description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiReturn {
    /// Return type.
    pub abi_type: AbiType,
    /// Always public for the reference backends.
    pub visibility: Visibility,
}

/// A circuit's interface.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abi {
    /// Parameters in declaration (and flattening) order.
    pub parameters: Vec<AbiParameter>,
    /// Optional return value.
    pub return_type: Option<AbiReturn>,
}

impl Abi {
    /// Total field elements across all parameters.
    #[must_use]
    pub fn parameter_field_count(&self) -> usize {
        self.parameters
            .iter()
            .fold(0usize, |n, p| n.saturating_add(p.typ.field_count()))
    }

    /// Validate every parameter and the return type, returning the checked
    /// parameter and return field counts.
    ///
    /// # Errors
    /// [`Error::InvalidCircuit`] as for [`AbiType::validate`].
    pub fn validate(&self) -> Result<(usize, usize)> {
        let params = self.parameters.iter().try_fold(0usize, |n, p| {
            n.checked_add(p.typ.validate(&p.name)?)
                .ok_or_else(|| Error::InvalidCircuit("parameter field count overflows".into()))
        })?;
        let returns = match &self.return_type {
            Some(r) => r.abi_type.validate("return")?,
            None => 0,
        };
        Ok((params, returns))
    }

    /// Flatten a witness document in parameter order, depth first.
    ///
    /// # Errors
    /// [`Error::UnsupportedShape`] for missing, unexpected or mis-shaped
    /// inputs; [`Error::Encoding`] for out-of-range or unparsable literals.
    pub fn encode(&self, doc: &WitnessDocument) -> Result<Vec<Fe>> {
        if let Some((extra, _)) = doc
            .iter()
            .find(|(k, _)| !self.parameters.iter().any(|p| p.name == *k))
        {
            return Err(Error::shape(extra, "not a parameter of this circuit"));
        }
        let mut out = Vec::new();
        for p in &self.parameters {
            let v = doc
                .get(&p.name)
                .ok_or_else(|| Error::shape(&p.name, "missing input"))?;
            p.typ.encode(&p.name, v, &mut out)?;
        }
        Ok(out)
    }

    /// Render return values as a witness value; `None` if the circuit has no
    /// return or `values` has the wrong length.
    #[must_use]
    pub fn decode_return(&self, values: &[Fe], encoding: WitnessEncoding) -> Option<WitnessValue> {
        let ret = self.return_type.as_ref()?;
        if ret.abi_type.field_count() != values.len() {
            return None;
        }
        ret.abi_type.decode(&mut values.iter().copied(), encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abi() -> Abi {
        Abi {
            parameters: vec![
                AbiParameter {
                    name: "key".into(),
                    typ: AbiType::bounded_vec(3, AbiType::unsigned(8)),
                    visibility: Visibility::Private,
                },
                AbiParameter {
                    name: "delta".into(),
                    typ: AbiType::Integer {
                        sign: Sign::Signed,
                        width: 8,
                    },
                    visibility: Visibility::Public,
                },
            ],
            return_type: Some(AbiReturn {
                abi_type: AbiType::array(2, AbiType::unsigned(8)),
                visibility: Visibility::Public,
            }),
        }
    }

    fn doc(json: &str) -> WitnessDocument {
        WitnessDocument::from_json(json).unwrap()
    }

    #[test]
    fn flattens_in_declaration_order() {
        let d = doc(r#"{"delta":"-2","key":{"storage":["1","2","0"],"len":"2"}}"#);
        let v = abi().encode(&d).unwrap();
        let raw: Vec<u64> = v.iter().map(|x| x.as_u64()).collect();
        assert_eq!(raw, vec![1, 2, 0, 2, 254]);
    }

    #[test]
    fn json_uses_kind_tags() {
        let j = serde_json::to_value(AbiType::bounded_vec(2, AbiType::unsigned(8))).unwrap();
        assert_eq!(j["kind"], "struct");
        assert_eq!(j["fields"][0]["type"]["kind"], "array");
        assert_eq!(j["fields"][1]["type"]["width"], 32);
        let back: AbiType = serde_json::from_value(j).unwrap();
        assert_eq!(back.field_count(), 3);
    }

    #[test]
    fn shape_errors() {
        let wrong_len = doc(r#"{"delta":"0","key":{"storage":["1","2"],"len":"2"}}"#);
        assert!(matches!(abi().encode(&wrong_len), Err(Error::UnsupportedShape { .. })));
        let missing = doc(r#"{"key":{"storage":["1","2","3"],"len":"2"}}"#);
        assert!(matches!(abi().encode(&missing), Err(Error::UnsupportedShape { .. })));
        let extra = doc(r#"{"delta":"0","x":"1","key":{"storage":["1","2","3"],"len":"2"}}"#);
        assert!(matches!(abi().encode(&extra), Err(Error::UnsupportedShape { .. })));
    }

    #[test]
    fn range_errors() {
        let big = doc(r#"{"delta":"0","key":{"storage":["256","2","0"],"len":"2"}}"#);
        assert!(matches!(abi().encode(&big), Err(Error::Encoding(_))));
        let neg = doc(r#"{"delta":"-129","key":{"storage":["1","2","0"],"len":"2"}}"#);
        assert!(matches!(abi().encode(&neg), Err(Error::Encoding(_))));
    }

    #[test]
    fn integer_widths_are_checked() {
        let mut bad = abi();
        bad.parameters[1].typ = AbiType::Integer {
            sign: Sign::Signed,
            width: 0,
        };
        assert!(matches!(bad.validate(), Err(Error::InvalidCircuit(_))));
        let d = doc(r#"{"delta":"0","key":{"storage":["1","2","0"],"len":"2"}}"#);
        assert!(matches!(bad.encode(&d), Err(Error::Encoding(_))));

        bad.parameters[1].typ = AbiType::unsigned(128);
        assert!(matches!(bad.validate(), Err(Error::InvalidCircuit(_))));
        assert!(matches!(bad.encode(&d), Err(Error::Encoding(_))));

        assert_eq!(abi().validate().unwrap(), (5, 2));
    }

    #[test]
    fn oversized_arrays_do_not_overflow() {
        let huge = AbiType::array(usize::MAX, AbiType::array(2, AbiType::Field));
        assert_eq!(huge.field_count(), usize::MAX);
        assert!(matches!(huge.validate("x"), Err(Error::InvalidCircuit(_))));
    }

    #[test]
    fn decodes_return() {
        let v = [Fe::from_u64(7), Fe::from_u64(255)];
        let r = abi().decode_return(&v, WitnessEncoding::Hex).unwrap();
        assert_eq!(
            r,
            WitnessValue::Array(vec![
                WitnessValue::Scalar("0x7".into()),
                WitnessValue::Scalar("0xff".into())
            ])
        );
        assert!(abi().decode_return(&v[..1], WitnessEncoding::Hex).is_none());
    }
}
