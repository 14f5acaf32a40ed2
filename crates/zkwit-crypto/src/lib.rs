// crates/zkwit-crypto/src/lib.rs

//! Minimal crypto substrate: Blake3 transcript with an absorb/challenge API.
//!
//! Both reference backends derive every verifier challenge from a
//! [`Blake3Transcript`] with the same absorb order; they differ only in the
//! domain string, which is enough to make their proofs mutually
//! unverifiable.
//!
//! ⚠️ **Security note:** This models a domain-separated random oracle using
//! Blake3. It is the Fiat–Shamir layer of the reference backends, not a
//! reviewed protocol design.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

use blake3::Hasher;
use zkwit_field::Fe;

/// Prefix hashed into every transcript before its domain string.
const TRANSCRIPT_PREFIX: &[u8] = b"zkwit.transcript.v1";

/// Prover/verifier shared challenge source.
///
/// Absorbs and squeezes are both tagged with their label, so the same bytes
/// under two labels never collide.
pub trait Transcript {
    /// Absorb `bytes` under `label`.
    fn absorb(&mut self, label: &str, bytes: &[u8]);

    /// Absorb a `u64` as 8 little-endian bytes.
    fn absorb_u64(&mut self, label: &str, x: u64) {
        self.absorb(label, &x.to_le_bytes());
    }

    /// Convenience: absorb a slice of field elements (length-prefixed, LE).
    fn absorb_fields(&mut self, label: &str, xs: &[Fe]) {
        let mut buf = Vec::with_capacity(8 + 8 * xs.len());
        buf.extend_from_slice(&(xs.len() as u64).to_le_bytes());
        for x in xs {
            buf.extend_from_slice(&x.to_le_bytes());
        }
        self.absorb(label, &buf);
    }

    /// `n` challenge bytes; a pure function of everything absorbed so far
    /// and of the challenges already drawn.
    #[must_use]
    fn challenge_bytes(&mut self, label: &str, n: usize) -> Vec<u8>;

    /// Squeeze one field element (reduced from 8 challenge bytes).
    #[must_use]
    fn challenge_field(&mut self, label: &str) -> Fe {
        Fe::from_le_bytes_reduced(&self.challenge_bytes(label, 8))
    }

    /// Squeeze `k` indices in `[0, n)`.
    #[must_use]
    fn challenge_indices(&mut self, label: &str, n: usize, k: usize) -> Vec<usize> {
        let bytes = self.challenge_bytes(label, 8 * k);
        bytes
            .chunks_exact(8)
            .map(|c| {
                let mut le = [0u8; 8];
                le.copy_from_slice(c);
                (u64::from_le_bytes(le) % n.max(1) as u64) as usize
            })
            .collect()
    }
}

/// Gates to check: all of them when `queries >= gates`, otherwise a sorted,
/// deduplicated sample drawn under [`Label::GateQueries`].
///
/// A sample only binds a prover that cannot steer the transcript. Pass
/// `usize::MAX` for a sound check.
#[must_use]
pub fn sample_gates<T: Transcript + ?Sized>(tr: &mut T, gates: usize, queries: usize) -> Vec<usize> {
    if gates == 0 {
        return Vec::new();
    }
    if queries >= gates {
        return (0..gates).collect();
    }
    let mut idx = tr.challenge_indices(Label::GateQueries.as_str(), gates, queries.max(1));
    idx.sort_unstable();
    idx.dedup();
    idx
}

/// Fiat–Shamir transcript over an incremental Blake3 state.
#[derive(Clone, Debug)]
pub struct Blake3Transcript {
    st: Hasher,
}

impl Blake3Transcript {
    /// Fresh transcript bound to `domain_sep`.
    #[must_use]
    pub fn new(domain_sep: &str) -> Self {
        let mut st = Hasher::new();
        st.update(TRANSCRIPT_PREFIX);
        st.update(&(domain_sep.len() as u32).to_le_bytes());
        st.update(domain_sep.as_bytes());
        Self { st }
    }
}

impl Transcript for Blake3Transcript {
    fn absorb(&mut self, label: &str, bytes: &[u8]) {
        // tag "absorb", label length+bytes, payload length+bytes.
        self.st.update(b"absorb");
        self.st.update(&(label.len() as u32).to_le_bytes());
        self.st.update(label.as_bytes());
        self.st.update(&(bytes.len() as u64).to_le_bytes());
        self.st.update(bytes);
    }

    fn challenge_bytes(&mut self, label: &str, n: usize) -> Vec<u8> {
        let mut st = self.st.clone();
        st.update(b"challenge");
        st.update(&(label.len() as u32).to_le_bytes());
        st.update(label.as_bytes());

        let mut rdr = st.finalize_xof();
        let mut out = vec![0u8; n];
        rdr.fill(&mut out);

        // Forward progress: two identical challenge calls must not repeat.
        self.st.update(b"after_challenge");
        self.st.update(&(label.len() as u32).to_le_bytes());
        self.st.update(label.as_bytes());

        out
    }
}

/// Canonical transcript labels shared by the reference backends.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Label {
    /// Digest of the compiled circuit (bytecode + ABI).
    CircuitDigest,
    /// Backend verification-key digest.
    VerificationKey,
    /// Public inputs (public parameters then return values).
    PublicInputs,
    /// Root of the salted witness commitment.
    WitnessRoot,
    /// Gate indices to spot-check.
    GateQueries,
    /// Batching challenge for gate residuals.
    BatchAlpha,
}

impl Label {
    /// Label text fed to the transcript.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CircuitDigest => "zkwit/circuit_digest",
            Self::VerificationKey => "zkwit/vk",
            Self::PublicInputs => "zkwit/public_inputs",
            Self::WitnessRoot => "zkwit/witness_root",
            Self::GateQueries => "zkwit/gate_queries",
            Self::BatchAlpha => "zkwit/batch_alpha",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Blake3Transcript, Label, Transcript};
    use zkwit_field::Fe;

    #[test]
    fn determinism_and_label_sep() {
        let mut t1 = Blake3Transcript::new("dom");
        let mut t2 = Blake3Transcript::new("dom");

        t1.absorb("a", b"hello");
        t2.absorb("a", b"hello");

        assert_eq!(t1.challenge_bytes("c", 32), t2.challenge_bytes("c", 32));

        let mut t3 = Blake3Transcript::new("dom");
        t3.absorb("a", b"hello");
        assert_ne!(t1.challenge_bytes("c", 32), t3.challenge_bytes("d", 32));
    }

    #[test]
    fn domain_separation_changes_output() {
        let mut t1 = Blake3Transcript::new("dom1");
        let mut t2 = Blake3Transcript::new("dom2");
        t1.absorb("x", b"payload");
        t2.absorb("x", b"payload");
        assert_ne!(t1.challenge_bytes("c", 16), t2.challenge_bytes("c", 16));
    }

    #[test]
    fn repeated_challenges_differ() {
        let mut t = Blake3Transcript::new("dom");
        let a = t.challenge_field(Label::BatchAlpha.as_str());
        let b = t.challenge_field(Label::BatchAlpha.as_str());
        assert_ne!(a, b);
    }

    #[test]
    fn indices_are_in_range() {
        let mut t = Blake3Transcript::new("dom");
        t.absorb_fields("pi", &[Fe::from_u64(1), Fe::from_u64(2)]);
        let idx = t.challenge_indices(Label::GateQueries.as_str(), 7, 50);
        assert_eq!(idx.len(), 50);
        assert!(idx.iter().all(|&i| i < 7));
    }

    #[test]
    fn gate_sample_is_sorted_and_saturates() {
        let mut t = Blake3Transcript::new("dom");
        assert_eq!(super::sample_gates(&mut t, 5, 5), vec![0, 1, 2, 3, 4]);
        assert!(super::sample_gates(&mut t, 0, 3).is_empty());
        let s = super::sample_gates(&mut t, 1000, 20);
        assert!(!s.is_empty() && s.len() <= 20);
        assert!(s.windows(2).all(|w| w[0] < w[1]));
    }
}
