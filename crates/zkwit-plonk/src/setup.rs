//! Universal setup and per-circuit key derivation.
//!
//! The reference string is the sequence of powers `τ^i` for a `τ` squeezed
//! from a fixed Blake3 seed, so every party derives the same string without a
//! ceremony. Keys bind the string's digest, a Merkle root over the selector
//! (gate) table, and the circuit shape into one verification-key digest.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use zkwit_core::{BackendParams, Error, PreparedCircuit, Result};
use zkwit_crypto::{Blake3Transcript, Transcript};
use zkwit_field::Fe;
use zkwit_merkle::{short_hex, Digest, MerkleTree};

use crate::params::{DS_SELECTOR_LEAF, DS_SRS};

/// Structured reference string: `[1, τ, τ², …]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Srs {
    powers: Vec<Fe>,
    digest: Digest,
}

impl Srs {
    /// Deterministic string with `size` powers.
    #[must_use]
    pub fn universal(size: usize) -> Self {
        let mut seed = Blake3Transcript::new(DS_SRS);
        let mut tau = seed.challenge_field("tau");
        if tau.is_zero() {
            tau = Fe::one();
        }
        let powers: Vec<Fe> = std::iter::successors(Some(Fe::one()), |p| Some(*p * tau))
            .take(size)
            .collect();
        let mut h = blake3::Hasher::new();
        h.update(DS_SRS.as_bytes());
        h.update(&(size as u64).to_le_bytes());
        for p in &powers {
            h.update(&p.to_le_bytes());
        }
        Self {
            powers,
            digest: *h.finalize().as_bytes(),
        }
    }

    /// Number of powers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.powers.len()
    }

    /// Whether the string is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.powers.is_empty()
    }

    /// `τ^i`, if within the string.
    #[must_use]
    pub fn power(&self, i: usize) -> Option<Fe> {
        self.powers.get(i).copied()
    }

    /// Digest of the whole string.
    #[must_use]
    pub const fn digest(&self) -> Digest {
        self.digest
    }
}

/// Public, serializable part of the keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationKey {
    /// Digest of the circuit the key was derived for.
    pub circuit_digest: [u8; 32],
    /// Number of gates.
    pub gate_count: u64,
    /// Number of witness slots.
    pub num_witnesses: u32,
    /// Digest of the reference string.
    pub srs_digest: Digest,
    /// Root of the selector-table commitment.
    pub selector_root: Digest,
}

impl VerificationKey {
    /// Blake3 digest of the bincode encoding.
    ///
    /// # Errors
    /// [`Error::Backend`] if bincode fails.
    pub fn digest(&self) -> Result<Digest> {
        let bytes = bincode::serialize(self).map_err(|e| Error::Backend(e.to_string()))?;
        Ok(*blake3::hash(&bytes).as_bytes())
    }
}

/// Proving and verification keys for one circuit.
#[derive(Clone, Debug)]
pub struct PlonkKeys {
    pub(crate) circuit: Arc<PreparedCircuit>,
    pub(crate) srs: Srs,
    pub(crate) vk: VerificationKey,
    pub(crate) vk_digest: Digest,
    pub(crate) queries: usize,
}

impl PlonkKeys {
    /// Verification key.
    #[must_use]
    pub const fn verification_key(&self) -> &VerificationKey {
        &self.vk
    }

    /// Digest of the verification key.
    #[must_use]
    pub const fn vk_digest(&self) -> Digest {
        self.vk_digest
    }

    /// Circuit the keys belong to.
    #[must_use]
    pub fn circuit(&self) -> &PreparedCircuit {
        &self.circuit
    }
}

fn selector_leaf(index: usize, op_bytes: &[u8]) -> Digest {
    let mut h = blake3::Hasher::new();
    h.update(DS_SELECTOR_LEAF.as_bytes());
    h.update(&(index as u64).to_le_bytes());
    h.update(op_bytes);
    *h.finalize().as_bytes()
}

pub(crate) fn derive(circuit: Arc<PreparedCircuit>, params: &BackendParams) -> Result<PlonkKeys> {
    let program = circuit.program();
    let leaves = program
        .opcodes
        .iter()
        .enumerate()
        .map(|(i, op)| {
            bincode::serialize(op)
                .map(|b| selector_leaf(i, &b))
                .map_err(|e| Error::InvalidCircuit(format!("encode opcode {i}: {e}")))
        })
        .collect::<Result<Vec<Digest>>>()?;
    let selector_root = MerkleTree::from_leaves(&leaves).root();
    let srs = Srs::universal(circuit.gate_count().max(1).next_power_of_two());
    let vk = VerificationKey {
        circuit_digest: circuit.digest(),
        gate_count: circuit.gate_count() as u64,
        num_witnesses: program.num_witnesses,
        srs_digest: srs.digest(),
        selector_root,
    };
    let vk_digest = vk.digest()?;
    debug!(
        gates = vk.gate_count,
        srs = srs.len(),
        vk = %short_hex(&vk_digest),
        "plonk keys derived"
    );
    Ok(PlonkKeys {
        circuit,
        srs,
        vk,
        vk_digest,
        queries: params.sample_budget(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srs_is_deterministic_and_prefix_stable() {
        let a = Srs::universal(8);
        let b = Srs::universal(16);
        assert_eq!(a, Srs::universal(8));
        assert_eq!(a.power(0), Some(Fe::one()));
        for i in 0..8 {
            assert_eq!(a.power(i), b.power(i));
        }
        assert_eq!(a.power(2), Some(a.power(1).unwrap() * a.power(1).unwrap()));
        assert_ne!(a.digest(), b.digest());
    }
}
