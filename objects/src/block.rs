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

use crate::{merkle, Transaction};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The `prev_hash` value of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// The Merkle sentinel hashed in place of the root for an empty block.
const NULL_MERKLE_SENTINEL: &str = "null";

/// A block in the provenance ledger.
///
/// The block hash commits to `prev_hash`, the Merkle root and the timestamp
/// only; the transaction sequence is bound through the root rather than
/// hashed directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub prev_hash: String,
    pub timestamp: f64,
    pub merkle: Option<String>,
    pub hash: String,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Creates a block on top of `prev_hash`, stamped with the current
    /// wall-clock time.
    pub fn new(prev_hash: String, transactions: Vec<Transaction>) -> Self {
        let timestamp = Utc::now().timestamp_millis() as f64 / 1000.0;
        Self::with_timestamp(prev_hash, transactions, timestamp)
    }

    /// Creates a block with an explicit timestamp.
    pub fn with_timestamp(prev_hash: String, transactions: Vec<Transaction>, timestamp: f64) -> Self {
        let txids: Vec<String> = transactions.iter().map(|tx| tx.txid.clone()).collect();
        let merkle = merkle::merkle_root(&txids);
        let hash = hash_fields(&prev_hash, merkle.as_deref(), timestamp);

        Self {
            prev_hash,
            timestamp,
            merkle,
            hash,
            transactions,
        }
    }

    /// The network-wide genesis block. Its timestamp is fixed so that every
    /// node derives the same root of trust.
    pub fn genesis() -> Self {
        Self::with_timestamp(GENESIS_PREVIOUS_HASH.to_string(), Vec::new(), 0.0)
    }

    pub fn is_genesis(&self) -> bool {
        self.prev_hash == GENESIS_PREVIOUS_HASH
    }

    /// Recomputes the hash from the committed fields.
    pub fn compute_hash(&self) -> String {
        hash_fields(&self.prev_hash, self.merkle.as_deref(), self.timestamp)
    }
}

/// The block hash preimage is the UTF-8 concatenation of the previous hash,
/// the Merkle root (or the null sentinel), and the shortest-roundtrip
/// rendering of the timestamp.
fn hash_fields(prev_hash: &str, merkle: Option<&str>, timestamp: f64) -> String {
    let preimage = format!(
        "{}{}{}",
        prev_hash,
        merkle.unwrap_or(NULL_MERKLE_SENTINEL),
        timestamp
    );
    hex::encode(Sha256::digest(preimage.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Account;

    use rand::thread_rng;

    fn test_transactions(n: usize) -> Vec<Transaction> {
        let rng = &mut thread_rng();
        let account = Account::new(rng);
        (0..n)
            .map(|i| Transaction::new(&account, "0xfeed", format!("Well #{} spudded", 100 + i), rng))
            .collect()
    }

    #[test]
    fn hash_is_a_pure_function_of_the_committed_fields() {
        let block = Block::new("0".to_string(), test_transactions(3));
        assert_eq!(block.hash, block.compute_hash());

        let twin = Block::with_timestamp("0".to_string(), block.transactions.clone(), block.timestamp);
        assert_eq!(twin.hash, block.hash);
    }

    #[test]
    fn hash_changes_with_any_committed_field() {
        let block = Block::new("0".to_string(), test_transactions(2));

        let other_parent =
            Block::with_timestamp("f00d".to_string(), block.transactions.clone(), block.timestamp);
        assert_ne!(other_parent.hash, block.hash);

        let other_time = Block::with_timestamp(
            block.prev_hash.clone(),
            block.transactions.clone(),
            block.timestamp + 1.0,
        );
        assert_ne!(other_time.hash, block.hash);
    }

    #[test]
    fn empty_block_hashes_the_null_sentinel() {
        let block = Block::with_timestamp("0".to_string(), Vec::new(), 42.0);
        assert_eq!(block.merkle, None);
        assert_eq!(block.hash, block.compute_hash());
    }

    #[test]
    fn genesis_is_deterministic() {
        let genesis = Block::genesis();
        assert!(genesis.is_genesis());
        assert!(genesis.transactions.is_empty());
        assert_eq!(genesis.merkle, None);
        assert_eq!(genesis.hash, Block::genesis().hash);
    }

    #[test]
    fn serde_round_trip_preserves_the_hash() {
        let block = Block::new(Block::genesis().hash, test_transactions(2));
        let json = serde_json::to_string(&block).unwrap();
        let decoded: Block = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, block);
        assert_eq!(decoded.hash, decoded.compute_hash());
    }

    #[test]
    fn empty_merkle_serializes_as_json_null() {
        let json = serde_json::to_string(&Block::genesis()).unwrap();
        assert!(json.contains("\"merkle\":null"));
    }
}
