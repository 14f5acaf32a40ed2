//! Salted, position-bound commitment to a vector of field elements.
//!
//! Leaf `i` is `H(domain || i || value_i || salt_i)`. The salt keeps unopened
//! positions hidden behind the root; the index keeps an opening from being
//! replayed at another position.

use blake3::Hasher;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zkwit_field::Fe;

use crate::{Digest, MerkleProof, MerkleTree};

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Hash one committed value.
#[must_use]
pub fn hash_leaf(domain: &str, index: u32, value: Fe, salt: &[u8; SALT_LEN]) -> Digest {
    let mut h = Hasher::new();
    h.update(&(domain.len() as u32).to_le_bytes());
    h.update(domain.as_bytes());
    h.update(&index.to_le_bytes());
    h.update(&value.to_le_bytes());
    h.update(salt);
    *h.finalize().as_bytes()
}

/// One opened position of a [`WitnessCommitment`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueOpening {
    /// Position in the committed vector.
    pub index: u32,
    /// Committed value.
    pub value: Fe,
    /// Leaf salt.
    pub salt: [u8; SALT_LEN],
    /// Merkle authentication path.
    pub path: MerkleProof,
}

impl ValueOpening {
    /// Check this opening against `root` under `domain`.
    #[must_use]
    pub fn verify(&self, domain: &str, root: &Digest) -> bool {
        let leaf = hash_leaf(domain, self.index, self.value, &self.salt);
        MerkleTree::verify(root, &leaf, self.index as usize, &self.path)
    }
}

/// Prover-side commitment (keeps values and salts so it can open).
#[derive(Clone, Debug)]
pub struct WitnessCommitment {
    domain: &'static str,
    values: Vec<Fe>,
    salts: Vec<[u8; SALT_LEN]>,
    tree: MerkleTree,
}

impl WitnessCommitment {
    /// Commit to `values` with fresh salts drawn from `rng`.
    pub fn commit<R: RngCore + ?Sized>(domain: &'static str, values: &[Fe], rng: &mut R) -> Self {
        let salts: Vec<[u8; SALT_LEN]> = values
            .iter()
            .map(|_| {
                let mut s = [0u8; SALT_LEN];
                rng.fill_bytes(&mut s);
                s
            })
            .collect();
        let leaves: Vec<Digest> = values
            .iter()
            .zip(&salts)
            .enumerate()
            .map(|(i, (v, s))| hash_leaf(domain, i as u32, *v, s))
            .collect();
        Self {
            domain,
            values: values.to_vec(),
            salts,
            tree: MerkleTree::from_leaves(&leaves),
        }
    }

    /// Commitment root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> Digest {
        self.tree.root()
    }

    /// Domain string the leaves were hashed under.
    #[inline]
    #[must_use]
    pub const fn domain(&self) -> &'static str {
        self.domain
    }

    /// Open position `index`; `None` if out of range.
    #[must_use]
    pub fn open(&self, index: u32) -> Option<ValueOpening> {
        let i = index as usize;
        let path = self.tree.open(i)?;
        Some(ValueOpening {
            index,
            value: self.values[i],
            salt: self.salts[i],
            path,
        })
    }
}
