use std::collections::BTreeSet;

use tracing::debug;
use zkwit_core::{Assignment, BackendKind, Error, Proof, Result, Witness};
use zkwit_crypto::{sample_gates, Label, Transcript};
use zkwit_field::Fe;
use zkwit_merkle::WitnessCommitment;

use crate::keys::HonkKeys;
use crate::proof::HonkProof;
use crate::{transcript, DS_WITNESS_LEAF, PROTO};

pub(crate) fn prove(keys: &HonkKeys, a: &Assignment) -> Result<Proof> {
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

// Commit, sample and open without re-checking the gates.
fn assemble(keys: &HonkKeys, a: &Assignment) -> Result<Proof> {
    let program = keys.circuit.program();
    let get = |w: Witness| a.get(w);
    let commitment = WitnessCommitment::commit(DS_WITNESS_LEAF, &a.values, &mut rand::rng());
    let witness_root = commitment.root();
    let mut tr = transcript(&keys.circuit.digest(), &keys.vk_digest, &a.public_inputs, &witness_root);
    let gates = sample_gates(&mut tr, program.opcodes.len(), keys.queries);
    let alpha = tr.challenge_field(Label::BatchAlpha.as_str());

    let mut batch = Fe::zero();
    let mut power = Fe::one();
    let mut opened: BTreeSet<Witness> = program.public_witnesses().into_iter().collect();
    for &g in &gates {
        let op = &program.opcodes[g];
        let r = op.residual(&get).ok_or_else(|| Error::witness(g, "unassigned wire"))?;
        batch += power * r;
        power *= alpha;
        opened.extend(op.wires());
    }
    let openings = opened
        .into_iter()
        .map(|w| {
            commitment
                .open(w.0)
                .ok_or_else(|| Error::Backend(format!("{w} is outside the commitment")))
        })
        .collect::<Result<Vec<_>>>()?;

    let body = HonkProof {
        witness_root,
        openings,
        batch,
    };
    let bytes = body.to_bytes()?;
    debug!(
        sampled = gates.len(),
        openings = body.openings.len(),
        bytes = bytes.len(),
        "honk proof assembled"
    );
    Ok(Proof::new(
        BackendKind::Honk,
        keys.circuit.digest(),
        a.public_inputs.clone(),
        bytes,
        serde_json::json!({
            "proto": PROTO,
            "gates": program.opcodes.len(),
            "sampled": gates.len(),
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
    use crate::{keys, verify};

    fn bytes(b: &[u8], cap: usize) -> BoundedVec<U8> {
        let data: Vec<U8> = b.iter().copied().map(U8::new).collect();
        BoundedVec::from_slice(cap, &data, U8::default).unwrap()
    }

    fn solve(c: &PreparedCircuit, message: &[u8]) -> Assignment {
        let inputs = Inputs::new()
            .with("key", bytes(b"secret", 64))
            .with("message", bytes(message, 256));
        let doc = to_witness(&inputs, WitnessEncoding::Decimal).unwrap();
        let initial = c.abi().encode(&doc).unwrap();
        execute(c.program(), &initial).unwrap()
    }

    // Solve for one message but claim the MAC of another.
    fn forged(c: &PreparedCircuit) -> Assignment {
        let honest = solve(c, b"hello_world");
        let mut a = solve(c, b"hello_worle");
        for (w, v) in c.program().return_values.iter().zip(&honest.public_inputs) {
            a.values[w.0 as usize] = *v;
        }
        a.public_inputs = honest.public_inputs;
        a
    }

    fn large() -> Arc<PreparedCircuit> {
        let c = Arc::new(hmac_sha256_circuit(64, 256).unwrap().prepare().unwrap());
        assert!(c.gate_count() > 64);
        c
    }

    #[test]
    fn forged_mac_is_rejected_when_every_gate_is_checked() {
        let c = large();
        let a = forged(&c);
        let k = keys::derive(c, &BackendParams::default()).unwrap();
        assert!(matches!(prove(&k, &a), Err(Error::Witness { .. })));
        for _ in 0..8 {
            let proof = assemble(&k, &a).unwrap();
            assert_eq!(proof.meta["sampled"], proof.meta["gates"]);
            assert!(!verify::verify(&k, &proof).unwrap());
        }
    }

    #[test]
    fn spot_checking_can_be_ground_past() {
        let c = large();
        let a = forged(&c);
        let k = keys::derive(c, &BackendParams::spot_check(64)).unwrap();
        let accepted = (0..64).any(|_| {
            let proof = assemble(&k, &a).unwrap();
            verify::verify(&k, &proof).unwrap()
        });
        assert!(accepted);
    }
}
