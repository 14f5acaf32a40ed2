//! PLONK prover: commit the witness, sample gates, open their wires.

use tracing::debug;
use zkwit_core::{Assignment, BackendKind, Error, Proof, Result, Witness};
use zkwit_crypto::sample_gates;
use zkwit_field::Fe;
use zkwit_merkle::{ValueOpening, WitnessCommitment};

use crate::params::{transcript, DS_WITNESS_LEAF, PROTO};
use crate::proof::{GateOpening, PlonkProof};
use crate::setup::PlonkKeys;

fn open(c: &WitnessCommitment, index: u32) -> Result<ValueOpening> {
    c.open(index)
        .ok_or_else(|| Error::Backend(format!("witness w{index} is outside the commitment")))
}

pub(crate) fn prove(keys: &PlonkKeys, a: &Assignment) -> Result<Proof> {
    let program = keys.circuit.program();
    if a.values.len() != program.num_witnesses as usize {
        return Err(Error::InvalidCircuit(format!(
            "assignment has {} values, circuit has {} witnesses",
            a.values.len(),
            program.num_witnesses
        )));
    }
    let get = |w: Witness| a.get(w);
    for (i, op) in program.opcodes.iter().enumerate() {
        op.check(&get).map_err(|reason| Error::witness(i, reason))?;
    }
    assemble(keys, a)
}

fn assemble(keys: &PlonkKeys, a: &Assignment) -> Result<Proof> {
    let program = keys.circuit.program();
    let get = |w: Witness| a.get(w);
    let commitment = WitnessCommitment::commit(DS_WITNESS_LEAF, &a.values, &mut rand::rng());
    let witness_root = commitment.root();
    let mut tr = transcript(
        &keys.circuit.digest(),
        &keys.vk_digest,
        &a.public_inputs,
        &witness_root,
    );
    let gates = sample_gates(&mut tr, program.opcodes.len(), keys.queries);

    let mut srs_eval = Fe::zero();
    let mut gate_openings = Vec::with_capacity(gates.len());
    for &g in &gates {
        let op = &program.opcodes[g];
        let tau_g = keys
            .srs
            .power(g)
            .ok_or_else(|| Error::Backend(format!("gate {g} is beyond the reference string")))?;
        let r = op
            .residual(&get)
            .ok_or_else(|| Error::witness(g, "unassigned wire"))?;
        srs_eval += tau_g * r;
        let wires = op
            .wires()
            .into_iter()
            .map(|w| open(&commitment, w.0))
            .collect::<Result<Vec<_>>>()?;
        gate_openings.push(GateOpening {
            gate: g as u32,
            wires,
        });
    }
    let public_openings = program
        .public_witnesses()
        .into_iter()
        .map(|w| open(&commitment, w.0))
        .collect::<Result<Vec<_>>>()?;

    let body = PlonkProof {
        witness_root,
        public_openings,
        gate_openings,
        srs_eval,
    };
    let bytes = body.to_bytes().map_err(|e| Error::Backend(e.to_string()))?;
    debug!(
        gates = program.opcodes.len(),
        sampled = gates.len(),
        bytes = bytes.len(),
        "plonk proof assembled"
    );
    Ok(Proof::new(
        BackendKind::Plonk,
        keys.circuit.digest(),
        a.public_inputs.clone(),
        bytes,
        serde_json::json!({
            "proto": PROTO,
            "gates": program.opcodes.len(),
            "sampled": gates.len(),
            "srs_size": keys.srs.len(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use zkwit_core::{
        execute, hmac_sha256_circuit, to_witness, BackendParams, BoundedVec, Inputs,
        PreparedCircuit, WitnessEncoding, U8,
    };

    use super::*;
    use crate::{setup, verify};

    fn solve(c: &PreparedCircuit, message: &[u8]) -> Assignment {
        let pad = |b: &[u8], cap| {
            let data: Vec<U8> = b.iter().copied().map(U8::new).collect();
            BoundedVec::from_slice(cap, &data, U8::default).unwrap()
        };
        let inputs = Inputs::new()
            .with("key", pad(b"secret", 64))
            .with("message", pad(message, 256));
        let doc = to_witness(&inputs, WitnessEncoding::Decimal).unwrap();
        execute(c.program(), &c.abi().encode(&doc).unwrap()).unwrap()
    }

    #[test]
    fn mac_of_another_message_is_rejected_under_default_params() {
        let c = Arc::new(hmac_sha256_circuit(64, 256).unwrap().prepare().unwrap());
        assert!(c.gate_count() > 64);
        let honest = solve(&c, b"hello_world");
        let mut forged = solve(&c, b"hello_worle");
        for (w, v) in c.program().return_values.iter().zip(&honest.public_inputs) {
            forged.values[w.0 as usize] = *v;
        }
        forged.public_inputs = honest.public_inputs.clone();

        let keys = setup::derive(c.clone(), &BackendParams::default()).unwrap();
        assert!(matches!(prove(&keys, &forged), Err(Error::Witness { .. })));
        for _ in 0..8 {
            let proof = assemble(&keys, &forged).unwrap();
            assert_eq!(proof.meta["sampled"], c.gate_count());
            assert!(!verify::verify(&keys, &proof).unwrap());
        }
        let proof = prove(&keys, &honest).unwrap();
        assert!(verify::verify(&keys, &proof).unwrap());
    }
}
