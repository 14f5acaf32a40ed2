//! Backend abstraction for key derivation, proving and verification.
//!
//! Implementors expose associated functions and an associated `Keys` type;
//! the orchestrator picks one by [`BackendKind`] tag and never dispatches
//! through `dyn`.
//!
//! ## Contracts implementors should uphold
//! - `derive_keys` is a pure function of the circuit and the params, so two
//!   derivations produce interchangeable keys.
//! - `prove` binds the circuit digest and the public inputs into the proof.
//! - `verify` returns `Ok(false)` for a well-formed but invalid proof, and
//!   [`Error::MalformedProof`](crate::Error::MalformedProof) only when the
//!   bytes cannot be parsed at all.
//! - Neither function panics on hostile input.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::artifact::{BackendKind, Proof};
use crate::circuit::PreparedCircuit;
use crate::error::Result;
use crate::solver::Assignment;

/// Tunables shared by the reference backends.
///
/// By default the verifier checks every gate. Spot-checking (`queries:
/// Some(n)`) samples gates from a transcript the prover influences through
/// its commitment salts, so a prover can re-commit until a violated gate
/// falls outside the sample. It is unsound against a cheating prover and
/// only suitable for benchmarking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendParams {
    /// Number of gates to spot-check; `None` checks every gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queries: Option<usize>,
}

impl BackendParams {
    /// Check every gate.
    #[must_use]
    pub const fn full() -> Self {
        Self { queries: None }
    }

    /// Spot-check `queries` transcript-sampled gates. Unsound; see the type docs.
    #[must_use]
    pub const fn spot_check(queries: usize) -> Self {
        Self {
            queries: Some(queries),
        }
    }

    /// Sample size handed to the gate sampler; `usize::MAX` means every gate.
    #[must_use]
    pub const fn sample_budget(&self) -> usize {
        match self.queries {
            Some(n) => n,
            None => usize::MAX,
        }
    }
}

/// A proving system.
///
/// ```ignore
/// let keys = HonkBackend::derive_keys(circuit.clone(), &BackendParams::default())?;
/// let proof = HonkBackend::prove(&keys, &assignment)?;
/// assert!(HonkBackend::verify(&keys, &proof)?);
/// ```
pub trait ProvingBackend {
    /// Tag written into every proof this backend produces.
    const KIND: BackendKind;

    /// Proving and verification material derived from a circuit.
    type Keys: Send + Sync + 'static;

    /// Derive keys for `circuit`.
    ///
    /// # Errors
    /// Returns an error if the circuit is unusable for this backend.
    fn derive_keys(circuit: Arc<PreparedCircuit>, params: &BackendParams) -> Result<Self::Keys>;

    /// Prove that `assignment` satisfies the keyed circuit.
    ///
    /// # Errors
    /// [`Error::Witness`](crate::Error::Witness) if the assignment does not
    /// satisfy a gate.
    fn prove(keys: &Self::Keys, assignment: &Assignment) -> Result<Proof>;

    /// Check a proof.
    ///
    /// # Errors
    /// [`Error::MalformedProof`](crate::Error::MalformedProof) for undecodable bytes.
    fn verify(keys: &Self::Keys, proof: &Proof) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_checks_every_gate() {
        assert_eq!(BackendParams::default(), BackendParams::full());
        assert_eq!(BackendParams::default().sample_budget(), usize::MAX);
        assert_eq!(BackendParams::spot_check(8).sample_budget(), 8);
    }
}
