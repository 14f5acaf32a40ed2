// crates/zkwit-merkle/src/lib.rs

//! Blake3 Merkle trees and salted witness commitments.
//!
//! - [`MerkleTree`]: binary tree over 32-byte leaves, padded to a power of
//!   two with zero leaves so every path has the same length.
//! - [`commit`]: a salted, position-bound commitment to a vector of field
//!   elements. Both reference backends commit their witness assignment this
//!   way and open only the positions a verifier asks for.

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

pub mod commit;
pub use commit::{hash_leaf, ValueOpening, WitnessCommitment, SALT_LEN};

use blake3::Hasher;
use serde::{Deserialize, Serialize};

/// A 32-byte Blake3 digest.
pub type Digest = [u8; 32];

#[inline]
fn merkle_parent(a: &Digest, b: &Digest) -> Digest {
    let mut h = Hasher::new();
    h.update(a);
    h.update(b);
    *h.finalize().as_bytes()
}

/// Merkle tree that keeps every level so openings are `O(log n)`.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    // levels[0] = padded leaves, levels.last() = [root]
    levels: Vec<Vec<Digest>>,
    n_leaves: usize,
}

/// Authentication path: siblings bottom→top.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Sibling digests from the leaf level up to (excluding) the root.
    pub siblings: Vec<Digest>,
}

impl MerkleTree {
    /// Build from raw leaves. An empty input commits to a single zero leaf.
    #[must_use]
    pub fn from_leaves(leaves_raw: &[Digest]) -> Self {
        let n_leaves = leaves_raw.len();
        let width = n_leaves.max(1).next_power_of_two();
        let mut lvl = Vec::with_capacity(width);
        lvl.extend_from_slice(leaves_raw);
        lvl.resize(width, [0u8; 32]);

        let mut levels = vec![lvl];
        while levels.last().map_or(0, Vec::len) > 1 {
            let prev = &levels[levels.len() - 1];
            let next: Vec<Digest> = prev
                .chunks_exact(2)
                .map(|pair| merkle_parent(&pair[0], &pair[1]))
                .collect();
            levels.push(next);
        }
        Self { levels, n_leaves }
    }

    /// Root digest.
    #[inline]
    #[must_use]
    pub fn root(&self) -> Digest {
        self.levels
            .last()
            .and_then(|l| l.first())
            .copied()
            .unwrap_or([0u8; 32])
    }

    /// Number of real (unpadded) leaves.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.n_leaves
    }

    /// Whether the tree was built from zero leaves.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.n_leaves == 0
    }

    /// Path depth (number of siblings in every proof).
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Authentication path for leaf `idx`; `None` if out of range.
    #[must_use]
    pub fn open(&self, idx: usize) -> Option<MerkleProof> {
        if idx >= self.n_leaves {
            return None;
        }
        let mut i = idx;
        let siblings = self.levels[..self.levels.len() - 1]
            .iter()
            .map(|lvl| {
                let s = lvl[i ^ 1];
                i >>= 1;
                s
            })
            .collect();
        Some(MerkleProof { siblings })
    }

    /// Check that `leaf` sits at `idx` under `root`.
    #[must_use]
    pub fn verify(root: &Digest, leaf: &Digest, mut idx: usize, proof: &MerkleProof) -> bool {
        let mut cur = *leaf;
        for s in &proof.siblings {
            cur = if idx & 1 == 0 {
                merkle_parent(&cur, s)
            } else {
                merkle_parent(s, &cur)
            };
            idx >>= 1;
        }
        idx == 0 && &cur == root
    }
}

/// Short hex rendering of a digest for logs.
#[must_use]
pub fn short_hex(d: &Digest) -> String {
    hex::encode(&d[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: usize) -> Vec<Digest> {
        (0..n)
            .map(|i| *blake3::hash(&(i as u64).to_le_bytes()).as_bytes())
            .collect()
    }

    #[test]
    fn open_verify_all_positions() {
        for n in [1usize, 2, 3, 5, 8, 13] {
            let ls = leaves(n);
            let t = MerkleTree::from_leaves(&ls);
            for (i, l) in ls.iter().enumerate() {
                let p = t.open(i).unwrap();
                assert_eq!(p.siblings.len(), t.depth());
                assert!(MerkleTree::verify(&t.root(), l, i, &p), "n={n} i={i}");
            }
            assert!(t.open(n).is_none());
        }
    }

    #[test]
    fn wrong_leaf_or_index_fails() {
        let ls = leaves(6);
        let t = MerkleTree::from_leaves(&ls);
        let p = t.open(2).unwrap();
        assert!(!MerkleTree::verify(&t.root(), &ls[3], 2, &p));
        assert!(!MerkleTree::verify(&t.root(), &ls[2], 3, &p));
        // An index beyond the tree width cannot be smuggled through high bits.
        assert!(!MerkleTree::verify(&t.root(), &ls[2], 2 + (1 << 10), &p));
    }

    #[test]
    fn empty_tree_has_zero_leaf_root() {
        let t = MerkleTree::from_leaves(&[]);
        assert!(t.is_empty());
        assert_eq!(t.root(), [0u8; 32]);
        assert!(t.open(0).is_none());
    }
}
