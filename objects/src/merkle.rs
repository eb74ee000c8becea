// Copyright (C) 2023-2025 Tracenet Labs Inc.
// This file is part of the tracenet library.

// The tracenet library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// The tracenet library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with the tracenet library. If not, see <https://www.gnu.org/licenses/>.

use sha2::{Digest, Sha256};

/// Hashes the textual concatenation of two node digests.
pub fn hash_pair(left: &str, right: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    hex::encode(hasher.finalize())
}

fn reduce_level(level: &[String]) -> Vec<String> {
    level
        .chunks(2)
        .map(|pair| {
            let left = &pair[0];
            // An odd tail is paired with itself.
            let right = pair.get(1).unwrap_or(left);
            hash_pair(left, right)
        })
        .collect()
}

/// Computes the Merkle root over an ordered list of transaction ids.
///
/// Returns `None` for an empty list. A single leaf is paired with itself,
/// so every non-empty root is the result of at least one reduction.
pub fn merkle_root(txids: &[String]) -> Option<String> {
    if txids.is_empty() {
        return None;
    }

    let mut level = txids.to_vec();
    loop {
        level = reduce_level(&level);
        if level.len() == 1 {
            return level.pop();
        }
    }
}

/// Returns the sibling digests on the path from leaf `index` to the root,
/// using the same odd-tail duplication rule as `merkle_root`.
pub fn merkle_proof(txids: &[String], index: usize) -> Vec<String> {
    if index >= txids.len() {
        return Vec::new();
    }

    let mut proof = Vec::new();
    let mut level = txids.to_vec();
    let mut index = index;

    loop {
        let sibling = if index % 2 == 0 {
            level.get(index + 1).unwrap_or(&level[index])
        } else {
            &level[index - 1]
        };
        proof.push(sibling.clone());

        level = reduce_level(&level);
        index /= 2;

        if level.len() == 1 {
            return proof;
        }
    }
}

/// Recomputes the root from a leaf, its proof, and the leaf index, whose
/// per-level parity decides the concatenation order.
pub fn verify_proof(leaf: &str, proof: &[String], index: usize, root: &str) -> bool {
    let mut digest = leaf.to_string();
    let mut index = index;

    for sibling in proof {
        digest = if index % 2 == 0 {
            hash_pair(&digest, sibling)
        } else {
            hash_pair(sibling, &digest)
        };
        index /= 2;
    }

    digest == root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| hex::encode(Sha256::digest(format!("leaf-{}", i).as_bytes())))
            .collect()
    }

    #[test]
    fn empty_list_has_no_root() {
        assert_eq!(merkle_root(&[]), None);
    }

    #[test]
    fn single_leaf_is_paired_with_itself() {
        let txids = leaves(1);
        assert_eq!(merkle_root(&txids), Some(hash_pair(&txids[0], &txids[0])));
    }

    #[test]
    fn two_leaves_reduce_to_one_pair_hash() {
        let txids = leaves(2);
        assert_eq!(merkle_root(&txids), Some(hash_pair(&txids[0], &txids[1])));
    }

    #[test]
    fn odd_tail_is_duplicated() {
        let txids = leaves(3);
        let expected = hash_pair(
            &hash_pair(&txids[0], &txids[1]),
            &hash_pair(&txids[2], &txids[2]),
        );
        assert_eq!(merkle_root(&txids), Some(expected));
    }

    #[test]
    fn root_depends_on_leaf_order() {
        let txids = leaves(4);
        let mut reversed = txids.clone();
        reversed.reverse();
        assert_ne!(merkle_root(&txids), merkle_root(&reversed));
    }

    #[test]
    fn proofs_verify_for_every_index() {
        for n in 1..=9 {
            let txids = leaves(n);
            let root = merkle_root(&txids).unwrap();
            for (index, leaf) in txids.iter().enumerate() {
                let proof = merkle_proof(&txids, index);
                assert!(
                    verify_proof(leaf, &proof, index, &root),
                    "proof failed for index {} of {}",
                    index,
                    n
                );
            }
        }
    }

    #[test]
    fn proof_rejects_wrong_leaf() {
        let txids = leaves(8);
        let root = merkle_root(&txids).unwrap();
        let proof = merkle_proof(&txids, 3);
        assert!(!verify_proof(&txids[4], &proof, 3, &root));
    }

    #[test]
    fn out_of_range_index_yields_empty_proof() {
        let txids = leaves(4);
        assert!(merkle_proof(&txids, 4).is_empty());
        assert!(merkle_proof(&[], 0).is_empty());
    }
}
