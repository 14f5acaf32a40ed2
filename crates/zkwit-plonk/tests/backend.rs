//! Prove/verify behaviour of the PLONK backend on the HMAC demo circuit.

use std::sync::Arc;

use zkwit_core::{
    execute, hmac_sha256_circuit, to_witness, Assignment, BackendKind, BackendParams,
    BoundedVec, CompiledCircuit, Error, Fe, Inputs, PreparedCircuit, ProvingBackend, Str,
    WitnessEncoding, U8,
};
use zkwit_plonk::{PlonkBackend, PlonkProof};

fn byte_vec(text: &str, cap: usize) -> BoundedVec<U8> {
    let mut bv = BoundedVec::new(cap, U8::default).unwrap();
    bv.extend_from_slice(&Str::new(text).as_bytes()).unwrap();
    bv
}

fn setup(cap_key: usize, cap_msg: usize) -> (Arc<PreparedCircuit>, Assignment) {
    let circuit: CompiledCircuit = hmac_sha256_circuit(cap_key, cap_msg).unwrap();
    let prepared = Arc::new(circuit.prepare().unwrap());
    let inputs = Inputs::new()
        .with("key", byte_vec("secret", cap_key))
        .with("message", byte_vec("hello", cap_msg));
    let doc = to_witness(&inputs, WitnessEncoding::Decimal).unwrap();
    let initial = prepared.abi().encode(&doc).unwrap();
    let assignment = execute(prepared.program(), &initial).unwrap();
    (prepared, assignment)
}

const HMAC_SECRET_HELLO: &str = "88aab3ede8d3adf94d26ab90d3bafd4a2083070c3bcce9c014ee04a443847c0b";

#[test]
fn honest_proof_verifies() {
    let (c, a) = setup(6, 11);
    let keys = PlonkBackend::derive_keys(c, &BackendParams::default()).unwrap();
    let proof = PlonkBackend::prove(&keys, &a).unwrap();
    assert_eq!(proof.backend, BackendKind::Plonk);
    assert_eq!(proof.meta["proto"], "plonk-ref-v1");
    let mac: Vec<u8> = proof.public_inputs.iter().map(|f| f.as_u64() as u8).collect();
    assert_eq!(hex::encode(mac), HMAC_SECRET_HELLO);
    assert!(PlonkBackend::verify(&keys, &proof).unwrap());
}

#[test]
fn sampled_proof_verifies_with_few_queries() {
    let (c, a) = setup(6, 11);
    let keys = PlonkBackend::derive_keys(c, &BackendParams::spot_check(3)).unwrap();
    let proof = PlonkBackend::prove(&keys, &a).unwrap();
    let body = PlonkProof::from_bytes(&proof.proof_bytes).unwrap();
    assert!(body.gate_openings.len() <= 3);
    assert!(PlonkBackend::verify(&keys, &proof).unwrap());
}

#[test]
fn tampered_public_input_is_rejected() {
    let (c, a) = setup(6, 11);
    let keys = PlonkBackend::derive_keys(c, &BackendParams::default()).unwrap();
    let mut proof = PlonkBackend::prove(&keys, &a).unwrap();
    proof.public_inputs[0] += Fe::one();
    assert!(!PlonkBackend::verify(&keys, &proof).unwrap());
}

#[test]
fn unsatisfying_assignment_is_refused() {
    let (c, mut a) = setup(6, 11);
    let keys = PlonkBackend::derive_keys(c, &BackendParams::default()).unwrap();
    let last = a.values.len() - 1;
    a.values[last] += Fe::one();
    assert!(matches!(
        PlonkBackend::prove(&keys, &a),
        Err(Error::Witness { .. })
    ));
}

#[test]
fn garbage_bytes_are_malformed() {
    let (c, a) = setup(6, 11);
    let keys = PlonkBackend::derive_keys(c, &BackendParams::default()).unwrap();
    let mut proof = PlonkBackend::prove(&keys, &a).unwrap();
    proof.proof_bytes = vec![0xff; 5];
    assert!(matches!(
        PlonkBackend::verify(&keys, &proof),
        Err(Error::MalformedProof { backend: BackendKind::Plonk, .. })
    ));
}

#[test]
fn foreign_backend_tag_is_a_mismatch() {
    let (c, a) = setup(6, 11);
    let keys = PlonkBackend::derive_keys(c, &BackendParams::default()).unwrap();
    let mut proof = PlonkBackend::prove(&keys, &a).unwrap();
    proof.backend = BackendKind::Honk;
    assert!(matches!(
        PlonkBackend::verify(&keys, &proof),
        Err(Error::BackendMismatch { proof: BackendKind::Honk, expected: BackendKind::Plonk })
    ));
}

#[test]
fn proof_for_another_circuit_is_rejected() {
    let (c, a) = setup(6, 11);
    let (other, _) = setup(8, 11);
    let keys = PlonkBackend::derive_keys(c, &BackendParams::default()).unwrap();
    let other_keys = PlonkBackend::derive_keys(other, &BackendParams::default()).unwrap();
    let proof = PlonkBackend::prove(&keys, &a).unwrap();
    assert!(!PlonkBackend::verify(&other_keys, &proof).unwrap());
}

#[test]
fn key_derivation_is_deterministic() {
    let (c, _) = setup(6, 11);
    let k1 = PlonkBackend::derive_keys(c.clone(), &BackendParams::default()).unwrap();
    let k2 = PlonkBackend::derive_keys(c, &BackendParams::default()).unwrap();
    assert_eq!(k1.vk_digest(), k2.vk_digest());
    assert_eq!(k1.verification_key(), k2.verification_key());
}
