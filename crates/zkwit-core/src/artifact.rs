//! Proof artifact shared by every backend and the CLI.
//!
//! [`Proof`] pins the producing backend, the digest of the circuit it was
//! generated for, the claimed public inputs, backend-opaque `proof_bytes`,
//! and a free-form `meta` JSON value for diagnostics.
//!
//! ## Compatibility
//! - No `deny_unknown_fields`, so newer producers stay readable.
//! - Unknown backend tags decode as [`BackendKind::Unknown`].
//! - `meta` is for humans (timings, parameter echoes); never parse it in a
//!   verifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zkwit_field::Fe;

/// Which proving system produced (or should check) a proof.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Transparent, polynomial-IOP style backend.
    Honk,
    /// Setup-based backend with a universal reference string.
    Plonk,
    /// Catch-all for tags this build does not know.
    #[serde(other)]
    Unknown,
}

impl BackendKind {
    /// Every backend this build can run.
    pub const SUPPORTED: [Self; 2] = [Self::Honk, Self::Plonk];

    /// Lowercase tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Honk => "honk",
            Self::Plonk => "plonk",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`BackendKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown backend `{0}` (expected `honk` or `plonk`)")]
pub struct UnknownBackend(pub String);

impl FromStr for BackendKind {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "honk" => Ok(Self::Honk),
            "plonk" => Ok(Self::Plonk),
            other => Err(UnknownBackend(other.to_owned())),
        }
    }
}

/// Serialized proof produced by a backend.
///
/// **Invariants**
/// - `backend` names the system that produced `proof_bytes`; the orchestrator
///   rejects a mismatch before any backend code runs.
/// - `circuit_digest` and `public_inputs` are bound into the backend's
///   transcript, so editing either makes verification fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Backend that produced the proof.
    pub backend: BackendKind,
    /// Digest of the compiled circuit.
    pub circuit_digest: [u8; 32],
    /// Public parameters followed by return values.
    pub public_inputs: Vec<Fe>,
    /// Backend-specific encoding.
    #[serde(with = "hex_bytes")]
    pub proof_bytes: Vec<u8>,
    /// Diagnostics; omitted values deserialize as `Null`.
    #[serde(default)]
    pub meta: serde_json::Value,
}

impl Proof {
    /// Construct a proof artifact.
    #[inline]
    #[must_use]
    pub const fn new(
        backend: BackendKind,
        circuit_digest: [u8; 32],
        public_inputs: Vec<Fe>,
        proof_bytes: Vec<u8>,
        meta: serde_json::Value,
    ) -> Self {
        Self {
            backend,
            circuit_digest,
            public_inputs,
            proof_bytes,
            meta,
        }
    }

    /// Proof bytes.
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.proof_bytes
    }

    /// Length of the proof bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.proof_bytes.len()
    }

    /// Whether the proof bytes are empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.proof_bytes.is_empty()
    }
}

/// Proof bytes as a hex string in human-readable formats, raw bytes otherwise.
mod hex_bytes {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.serialize_str(&hex::encode(bytes))
        } else {
            s.serialize_bytes(bytes)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        if d.is_human_readable() {
            let s = String::deserialize(d)?;
            hex::decode(s).map_err(D::Error::custom)
        } else {
            serde_bytes_compat(d)
        }
    }

    fn serde_bytes_compat<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = Vec<u8>;
            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a byte string")
            }
            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Vec<u8>, E> {
                Ok(v.to_vec())
            }
            fn visit_byte_buf<E: serde::de::Error>(self, v: Vec<u8>) -> Result<Vec<u8>, E> {
                Ok(v)
            }
            fn visit_seq<A: serde::de::SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<u8>, A::Error> {
                let mut out = Vec::new();
                while let Some(b) = seq.next_element::<u8>()? {
                    out.push(b);
                }
                Ok(out)
            }
        }
        d.deserialize_byte_buf(V)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Proof {
        Proof::new(
            BackendKind::Honk,
            [7u8; 32],
            vec![Fe::from_u64(1), Fe::from_u64(2)],
            vec![1, 2, 3, 4],
            json!({"k": "v"}),
        )
    }

    #[test]
    fn serde_roundtrip_json() {
        let p = sample();
        let j = serde_json::to_value(&p).unwrap();
        assert_eq!(j["backend"], "honk");
        assert_eq!(j["proof_bytes"], "01020304");
        let de: Proof = serde_json::from_value(j).unwrap();
        assert_eq!(de, p);
    }

    #[test]
    fn serde_roundtrip_cbor() {
        let p = sample();
        let mut buf = Vec::new();
        ciborium::ser::into_writer(&p, &mut buf).unwrap();
        let de: Proof = ciborium::de::from_reader(buf.as_slice()).unwrap();
        assert_eq!(de, p);
    }

    #[test]
    fn unknown_backend_and_missing_meta() {
        let j = json!({
            "backend": "groth16",
            "circuit_digest": vec![0u8; 32],
            "public_inputs": [],
            "proof_bytes": ""
        });
        let de: Proof = serde_json::from_value(j).unwrap();
        assert_eq!(de.backend, BackendKind::Unknown);
        assert!(de.meta.is_null());
        assert!(de.is_empty());
    }

    #[test]
    fn parses_tags() {
        assert_eq!("Honk".parse::<BackendKind>().unwrap(), BackendKind::Honk);
        assert_eq!(BackendKind::Plonk.to_string(), "plonk");
        assert!("stark".parse::<BackendKind>().is_err());
    }
}
