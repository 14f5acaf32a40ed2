//! Structured proof object for the PLONK backend (bincode on the wire).

use serde::{Deserialize, Serialize};
use zkwit_field::Fe;
use zkwit_merkle::{Digest, ValueOpening};

/// Openings of every wire of one sampled gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateOpening {
    /// Gate index.
    pub gate: u32,
    /// One opening per wire, in [`zkwit_core::Opcode::wires`] order.
    pub wires: Vec<ValueOpening>,
}

/// Body carried in `Proof::proof_bytes`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlonkProof {
    /// Root of the salted witness commitment.
    pub witness_root: Digest,
    /// Openings of every public witness, in public-input order.
    pub public_openings: Vec<ValueOpening>,
    /// Openings for each sampled gate, in ascending gate order.
    pub gate_openings: Vec<GateOpening>,
    /// `Σ τ^g · r_g` over sampled gates; zero for an honest prover.
    pub srs_eval: Fe,
}

impl PlonkProof {
    /// Encode with bincode.
    ///
    /// # Errors
    /// Propagates bincode failures.
    pub fn to_bytes(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(self)
    }

    /// Decode with bincode.
    ///
    /// # Errors
    /// Propagates bincode failures.
    pub fn from_bytes(bytes: &[u8]) -> bincode::Result<Self> {
        bincode::deserialize(bytes)
    }
}
