//! zkwit-honk — reference Honk-style backend.
//!
//! Transparent: keys are a Merkle commitment to the CBOR-encoded gate table,
//! bound together with the circuit digest and query budget. A proof commits
//! to the salted witness, opens the union of the sampled gates' wires and the
//! public witnesses (sorted, each once), and carries the residuals of the
//! sampled gates batched under a transcript challenge `α`.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation
)]

/// Key derivation.
pub mod keys;
/// Proof body.
pub mod proof;
mod prover;
mod verify;

use std::sync::Arc;

use zkwit_core::{
    Assignment, BackendKind, BackendParams, PreparedCircuit, Proof, ProvingBackend, Result,
};
use zkwit_crypto::{Blake3Transcript, Label, Transcript};
use zkwit_field::Fe;
use zkwit_merkle::Digest;

pub use keys::HonkKeys;
pub use proof::HonkProof;

/// Transcript domain.
pub const DS_HONK: &str = "zkwit-honk/v1";
/// Key digest domain.
pub const DS_KEY: &str = "zkwit-honk/key";
/// Gate-table leaf domain.
pub const DS_GATE_LEAF: &str = "zkwit-honk/gate";
/// Witness-commitment leaf domain.
pub const DS_WITNESS_LEAF: &str = "zkwit-honk/witness";
/// Wire-format tag carried in proof metadata.
pub const PROTO: &str = "honk-ref-v1";

// Same absorb order as the PLONK backend; only the domain differs.
fn transcript(
    circuit_digest: &[u8; 32],
    vk_digest: &Digest,
    public_inputs: &[Fe],
    witness_root: &Digest,
) -> Blake3Transcript {
    let mut tr = Blake3Transcript::new(DS_HONK);
    tr.absorb(Label::CircuitDigest.as_str(), circuit_digest);
    tr.absorb(Label::VerificationKey.as_str(), vk_digest);
    tr.absorb_fields(Label::PublicInputs.as_str(), public_inputs);
    tr.absorb(Label::WitnessRoot.as_str(), witness_root);
    tr
}

/// The Honk backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct HonkBackend;

impl ProvingBackend for HonkBackend {
    const KIND: BackendKind = BackendKind::Honk;
    type Keys = HonkKeys;

    fn derive_keys(circuit: Arc<PreparedCircuit>, params: &BackendParams) -> Result<HonkKeys> {
        keys::derive(circuit, params)
    }

    fn prove(keys: &HonkKeys, assignment: &Assignment) -> Result<Proof> {
        prover::prove(keys, assignment)
    }

    fn verify(keys: &HonkKeys, proof: &Proof) -> Result<bool> {
        verify::verify(keys, proof)
    }
}
