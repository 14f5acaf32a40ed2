//! Transparent key derivation: a gate-table commitment bound to the circuit.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use zkwit_core::{BackendParams, Error, PreparedCircuit, Result};
use zkwit_merkle::{short_hex, Digest, MerkleTree};

use crate::{DS_GATE_LEAF, DS_KEY};

/// Keys for one circuit. There is no trusted setup; everything is derived
/// from the circuit itself.
#[derive(Clone, Debug)]
pub struct HonkKeys {
    pub(crate) circuit: Arc<PreparedCircuit>,
    pub(crate) gate_root: Digest,
    pub(crate) vk_digest: Digest,
    pub(crate) queries: usize,
}

impl HonkKeys {
    /// Root of the gate-table commitment.
    #[must_use]
    pub const fn gate_root(&self) -> Digest {
        self.gate_root
    }

    /// Digest absorbed by the transcript in place of a verification key.
    #[must_use]
    pub const fn vk_digest(&self) -> Digest {
        self.vk_digest
    }

    /// Spot-check budget the keys were derived with; `usize::MAX` when every
    /// gate is checked.
    #[must_use]
    pub const fn queries(&self) -> usize {
        self.queries
    }

    /// Circuit the keys belong to.
    #[must_use]
    pub fn circuit(&self) -> &PreparedCircuit {
        &self.circuit
    }
}

fn cbor<T: Serialize>(v: &T) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(v, &mut buf).map_err(|e| e.to_string())?;
    Ok(buf)
}

pub(crate) fn derive(circuit: Arc<PreparedCircuit>, params: &BackendParams) -> Result<HonkKeys> {
    let program = circuit.program();
    let mut leaves = Vec::with_capacity(program.opcodes.len());
    for (i, op) in program.opcodes.iter().enumerate() {
        let bytes = cbor(op).map_err(|e| Error::InvalidCircuit(format!("encode opcode {i}: {e}")))?;
        let mut h = blake3::Hasher::new();
        h.update(DS_GATE_LEAF.as_bytes());
        h.update(&(i as u64).to_le_bytes());
        h.update(&bytes);
        leaves.push(*h.finalize().as_bytes());
    }
    let gate_root = MerkleTree::from_leaves(&leaves).root();

    let mut h = blake3::Hasher::new();
    h.update(DS_KEY.as_bytes());
    h.update(&circuit.digest());
    h.update(&gate_root);
    h.update(&u64::from(program.num_witnesses).to_le_bytes());
    h.update(&(params.sample_budget() as u64).to_le_bytes());
    let vk_digest = *h.finalize().as_bytes();

    debug!(
        gates = program.opcodes.len(),
        gate_root = %short_hex(&gate_root),
        "honk keys derived"
    );
    Ok(HonkKeys {
        circuit,
        gate_root,
        vk_digest,
        queries: params.sample_budget(),
    })
}
