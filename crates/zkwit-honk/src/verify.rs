use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;
use zkwit_core::{BackendKind, Error, Proof, Result, Witness};
use zkwit_crypto::{sample_gates, Label, Transcript};
use zkwit_field::Fe;

use crate::keys::HonkKeys;
use crate::proof::HonkProof;
use crate::{transcript, DS_WITNESS_LEAF};

pub(crate) fn verify(keys: &HonkKeys, proof: &Proof) -> Result<bool> {
    if proof.backend != BackendKind::Honk {
        return Err(Error::BackendMismatch {
            proof: proof.backend,
            expected: BackendKind::Honk,
        });
    }
    let body = HonkProof::from_bytes(&proof.proof_bytes)?;

    if proof.circuit_digest != keys.circuit.digest() {
        debug!("honk: proof is for a different circuit");
        return Ok(false);
    }
    let program = keys.circuit.program();
    let publics = program.public_witnesses();
    if publics.len() != proof.public_inputs.len() {
        return Ok(false);
    }

    let root = body.witness_root;
    let mut tr = transcript(&proof.circuit_digest, &keys.vk_digest, &proof.public_inputs, &root);
    let gates = sample_gates(&mut tr, program.opcodes.len(), keys.queries);
    let alpha = tr.challenge_field(Label::BatchAlpha.as_str());

    let mut expected: BTreeSet<Witness> = publics.iter().copied().collect();
    for &g in &gates {
        expected.extend(program.opcodes[g].wires());
    }
    if body.openings.len() != expected.len() {
        debug!("honk: opening set has the wrong size");
        return Ok(false);
    }
    let mut values = BTreeMap::new();
    for (w, o) in expected.iter().zip(&body.openings) {
        if o.index != w.0 || !o.verify(DS_WITNESS_LEAF, &root) {
            debug!(witness = %w, "honk: opening rejected");
            return Ok(false);
        }
        values.insert(*w, o.value);
    }
    for (w, claimed) in publics.iter().zip(&proof.public_inputs) {
        if values.get(w) != Some(claimed) {
            debug!(witness = %w, "honk: public input does not match its opening");
            return Ok(false);
        }
    }

    let get = |w: Witness| values.get(&w).copied();
    let mut batch = Fe::zero();
    let mut power = Fe::one();
    for &g in &gates {
        let Some(r) = program.opcodes[g].residual(&get) else {
            return Ok(false);
        };
        if !r.is_zero() {
            debug!(gate = g, "honk: gate violated");
            return Ok(false);
        }
        batch += power * r;
        power *= alpha;
    }
    Ok(batch.is_zero() && batch == body.batch)
}
