//! Closed set of backend keys the session can hold.

use std::sync::Arc;

use zkwit_core::{Assignment, BackendKind, Proof, ProvingBackend, Result};
use zkwit_honk::{HonkBackend, HonkKeys};
use zkwit_plonk::{PlonkBackend, PlonkKeys};

/// Keys for one backend, tagged by kind.
#[derive(Clone, Debug)]
pub enum BackendKeys {
    /// Honk keys.
    Honk(Arc<HonkKeys>),
    /// Plonk keys.
    Plonk(Arc<PlonkKeys>),
}

impl BackendKeys {
    /// Which backend these keys belong to.
    #[must_use]
    pub const fn kind(&self) -> BackendKind {
        match self {
            Self::Honk(_) => BackendKind::Honk,
            Self::Plonk(_) => BackendKind::Plonk,
        }
    }

    /// Run the backend prover (blocking).
    pub fn prove(&self, assignment: &Assignment) -> Result<Proof> {
        match self {
            Self::Honk(k) => HonkBackend::prove(k, assignment),
            Self::Plonk(k) => PlonkBackend::prove(k, assignment),
        }
    }

    /// Run the backend verifier (blocking).
    pub fn verify(&self, proof: &Proof) -> Result<bool> {
        match self {
            Self::Honk(k) => HonkBackend::verify(k, proof),
            Self::Plonk(k) => PlonkBackend::verify(k, proof),
        }
    }
}
