//! zkwit-plonk — reference PLONK-style backend.
//!
//! Setup derives a deterministic universal reference string of powers of `τ`
//! sized to the next power of two above the gate count, and commits to the
//! selector (gate) table with a Merkle root. Both are folded into a
//! verification-key digest that the Fiat–Shamir transcript absorbs.
//!
//! A proof commits to the salted witness vector, opens every wire of the
//! transcript-sampled gates plus every public witness, and carries the
//! `τ`-weighted sum of the sampled residuals. The body is bincode-encoded.
//!
//! This is a gate-by-gate argument over a transparent commitment, not a
//! succinct polynomial one. Every gate is checked unless the keys were
//! derived with [`BackendParams::spot_check`], which is unsound against a
//! prover that grinds commitment salts.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::doc_markdown
)]

/// Domain labels and transcript helpers.
pub mod params;
/// Proof body.
pub mod proof;
mod prover;
/// Reference string and keys.
pub mod setup;
mod verify;

use std::sync::Arc;

use zkwit_core::{Assignment, BackendKind, BackendParams, PreparedCircuit, Proof, ProvingBackend, Result};

pub use proof::{GateOpening, PlonkProof};
pub use setup::{PlonkKeys, Srs, VerificationKey};

/// The PLONK backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlonkBackend;

impl ProvingBackend for PlonkBackend {
    const KIND: BackendKind = BackendKind::Plonk;
    type Keys = PlonkKeys;

    fn derive_keys(circuit: Arc<PreparedCircuit>, params: &BackendParams) -> Result<PlonkKeys> {
        setup::derive(circuit, params)
    }

    fn prove(keys: &PlonkKeys, assignment: &Assignment) -> Result<Proof> {
        prover::prove(keys, assignment)
    }

    fn verify(keys: &PlonkKeys, proof: &Proof) -> Result<bool> {
        verify::verify(keys, proof)
    }
}
