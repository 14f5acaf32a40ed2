//! Honk proof body (CBOR on the wire).

use serde::{Deserialize, Serialize};
use zkwit_core::{BackendKind, Error, Result};
use zkwit_field::Fe;
use zkwit_merkle::{Digest, ValueOpening};

/// Body carried in `Proof::proof_bytes`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HonkProof {
    /// Root of the salted witness commitment.
    pub witness_root: Digest,
    /// Openings sorted by witness index: the wires of every sampled gate and
    /// every public witness, each exactly once.
    pub openings: Vec<ValueOpening>,
    /// `Σ α^i · r_i` over the sampled gates.
    pub batch: Fe,
}

impl HonkProof {
    /// Encode as CBOR.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(self, &mut buf).map_err(|e| Error::Backend(e.to_string()))?;
        Ok(buf)
    }

    /// Decode from CBOR.
    ///
    /// # Errors
    /// [`Error::MalformedProof`] if the bytes are not a proof body.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::de::from_reader(bytes).map_err(|e| Error::malformed(BackendKind::Honk, e))
    }
}
