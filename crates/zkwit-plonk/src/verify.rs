//! PLONK verifier: re-derive the sample, check openings, re-evaluate gates.

use std::collections::HashMap;

use tracing::{debug, warn};
use zkwit_core::{BackendKind, Error, Proof, Result, Witness};
use zkwit_crypto::sample_gates;
use zkwit_field::Fe;
use zkwit_merkle::ValueOpening;

use crate::params::{transcript, DS_WITNESS_LEAF};
use crate::proof::PlonkProof;
use crate::setup::PlonkKeys;

pub(crate) fn verify(keys: &PlonkKeys, proof: &Proof) -> Result<bool> {
    if proof.backend != BackendKind::Plonk {
        return Err(Error::BackendMismatch {
            proof: proof.backend,
            expected: BackendKind::Plonk,
        });
    }
    let body = PlonkProof::from_bytes(&proof.proof_bytes)
        .map_err(|e| Error::malformed(BackendKind::Plonk, e))?;

    if proof.circuit_digest != keys.circuit.digest() {
        warn!("plonk: proof is for a different circuit");
        return Ok(false);
    }
    let program = keys.circuit.program();
    let root = body.witness_root;
    let sound = |o: &ValueOpening, w: Witness| o.index == w.0 && o.verify(DS_WITNESS_LEAF, &root);

    let publics = program.public_witnesses();
    if publics.len() != proof.public_inputs.len() || publics.len() != body.public_openings.len() {
        debug!("plonk: public input arity mismatch");
        return Ok(false);
    }
    for ((w, o), claimed) in publics.iter().zip(&body.public_openings).zip(&proof.public_inputs) {
        if !sound(o, *w) || o.value != *claimed {
            debug!(witness = %w, "plonk: public opening rejected");
            return Ok(false);
        }
    }

    let mut tr = transcript(&proof.circuit_digest, &keys.vk_digest, &proof.public_inputs, &root);
    let gates = sample_gates(&mut tr, program.opcodes.len(), keys.queries);
    if gates.len() != body.gate_openings.len() {
        return Ok(false);
    }

    let mut srs_eval = Fe::zero();
    for (&g, go) in gates.iter().zip(&body.gate_openings) {
        let op = &program.opcodes[g];
        let wires = op.wires();
        if go.gate as usize != g || go.wires.len() != wires.len() {
            return Ok(false);
        }
        let mut vals = HashMap::with_capacity(wires.len());
        for (w, o) in wires.iter().zip(&go.wires) {
            if !sound(o, *w) {
                debug!(gate = g, witness = %w, "plonk: wire opening rejected");
                return Ok(false);
            }
            vals.insert(*w, o.value);
        }
        let get = |w: Witness| vals.get(&w).copied();
        let Some(r) = op.residual(&get) else {
            return Ok(false);
        };
        let Some(tau_g) = keys.srs.power(g) else {
            return Ok(false);
        };
        if !r.is_zero() {
            debug!(gate = g, "plonk: gate violated");
            return Ok(false);
        }
        srs_eval += tau_g * r;
    }
    Ok(srs_eval.is_zero() && srs_eval == body.srs_eval)
}
