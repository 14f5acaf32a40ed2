//! Parameter constants and transcript/domain labels for the PLONK backend.

use zkwit_crypto::{Blake3Transcript, Label, Transcript};
use zkwit_field::Fe;
use zkwit_merkle::Digest;

/// Top-level transcript domain.
pub const DS_PLONK: &str = "zkwit-plonk/v1";

/// Seed domain for the universal reference string.
pub const DS_SRS: &str = "zkwit-plonk/srs";

/// Leaf domain for the selector (gate table) commitment.
pub const DS_SELECTOR_LEAF: &str = "zkwit-plonk/selector";

/// Leaf domain for the witness commitment.
pub const DS_WITNESS_LEAF: &str = "zkwit-plonk/witness";

/// Wire-format tag carried in proof metadata.
pub const PROTO: &str = "plonk-ref-v1";

/// Fiat–Shamir transcript shared by prover and verifier.
pub(crate) fn transcript(
    circuit_digest: &[u8; 32],
    vk_digest: &Digest,
    public_inputs: &[Fe],
    witness_root: &Digest,
) -> Blake3Transcript {
    let mut tr = Blake3Transcript::new(DS_PLONK);
    tr.absorb(Label::CircuitDigest.as_str(), circuit_digest);
    tr.absorb(Label::VerificationKey.as_str(), vk_digest);
    tr.absorb_fields(Label::PublicInputs.as_str(), public_inputs);
    tr.absorb(Label::WitnessRoot.as_str(), witness_root);
    tr
}
