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

use crate::StorageError;
use tracenet_objects::Block;

use parking_lot::RwLock;
use std::{fs, path::PathBuf};

/// The active chain and its flat-file persistence.
///
/// The whole chain is rewritten as one JSON array on every append; there is
/// no incremental log. A crash mid-write can therefore lose the file, which
/// is recovered on the next start by falling back to a fresh genesis.
pub struct Ledger {
    path: PathBuf,
    chain: RwLock<Vec<Block>>,
}

impl Ledger {
    /// Opens the ledger at `path`, falling back to a fresh genesis chain if
    /// the file is absent, unreadable or inconsistent.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();

        let chain = match Self::load(&path) {
            Ok(chain) => {
                info!("loaded a chain of height {} from {:?}", chain.len(), path);
                chain
            }
            Err(error) => {
                warn!(
                    "could not load a chain from {:?} ({}), starting from a fresh genesis",
                    path, error
                );
                vec![Block::genesis()]
            }
        };

        let ledger = Self {
            path,
            chain: RwLock::new(chain),
        };
        if let Err(error) = ledger.persist(&ledger.chain.read()) {
            warn!("failed to persist the chain: {}", error);
        }
        ledger
    }

    fn load(path: &PathBuf) -> Result<Vec<Block>, StorageError> {
        let raw = fs::read_to_string(path)?;
        let chain: Vec<Block> = serde_json::from_str(&raw)?;
        Self::check_consistency(&chain)?;
        Ok(chain)
    }

    fn check_consistency(chain: &[Block]) -> Result<(), StorageError> {
        match chain.first() {
            Some(genesis) if genesis.is_genesis() => {}
            _ => return Err(StorageError::MissingGenesis),
        }
        for (i, window) in chain.windows(2).enumerate() {
            if window[1].prev_hash != window[0].hash {
                return Err(StorageError::BrokenLinkage(i + 1));
            }
        }
        Ok(())
    }

    /// The current chain height.
    pub fn height(&self) -> usize {
        self.chain.read().len()
    }

    /// The current chain tip.
    pub fn latest_block(&self) -> Block {
        // The chain is never empty; it always holds at least genesis.
        self.chain.read().last().cloned().unwrap_or_else(Block::genesis)
    }

    /// The hash of the current chain tip.
    pub fn latest_hash(&self) -> String {
        self.latest_block().hash
    }

    /// A snapshot of the full chain, for sync responses and index rebuilds.
    pub fn chain_snapshot(&self) -> Vec<Block> {
        self.chain.read().clone()
    }

    /// Whether a block with the given hash is part of the active chain.
    pub fn contains_hash(&self, hash: &str) -> bool {
        self.chain.read().iter().any(|block| block.hash == hash)
    }

    /// Appends a block to the chain and rewrites the store.
    pub fn append(&self, block: Block) -> Result<(), StorageError> {
        let mut chain = self.chain.write();
        chain.push(block);
        self.persist(&chain)
    }

    /// Replaces the active chain wholesale (fork switch or initial sync)
    /// and rewrites the store.
    pub fn replace(&self, new_chain: Vec<Block>) -> Result<(), StorageError> {
        let mut chain = self.chain.write();
        *chain = new_chain;
        self.persist(&chain)
    }

    fn persist(&self, chain: &[Block]) -> Result<(), StorageError> {
        let raw = serde_json::to_vec(chain)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    static TEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn temp_path(tag: &str) -> PathBuf {
        let unique = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "tracenet_ledger_{}_{}_{}.json",
            tag,
            std::process::id(),
            unique
        ))
    }

    #[test]
    fn fresh_ledger_starts_at_genesis() {
        let ledger = Ledger::open(temp_path("fresh"));
        assert_eq!(ledger.height(), 1);
        assert!(ledger.latest_block().is_genesis());
    }

    #[test]
    fn append_and_reload_round_trip() {
        let path = temp_path("roundtrip");

        let ledger = Ledger::open(path.clone());
        let block = Block::new(ledger.latest_hash(), Vec::new());
        ledger.append(block.clone()).unwrap();

        let reloaded = Ledger::open(path);
        assert_eq!(reloaded.height(), 2);
        assert_eq!(reloaded.latest_hash(), block.hash);
        assert!(reloaded.contains_hash(&block.hash));
    }

    #[test]
    fn corrupt_store_falls_back_to_genesis() {
        let path = temp_path("corrupt");
        fs::write(&path, b"{ not json").unwrap();

        let ledger = Ledger::open(path);
        assert_eq!(ledger.height(), 1);
        assert!(ledger.latest_block().is_genesis());
    }

    #[test]
    fn broken_linkage_falls_back_to_genesis() {
        let path = temp_path("linkage");

        let genesis = Block::genesis();
        let stray = Block::new("deadbeef".to_string(), Vec::new());
        let raw = serde_json::to_vec(&vec![genesis, stray]).unwrap();
        fs::write(&path, raw).unwrap();

        let ledger = Ledger::open(path);
        assert_eq!(ledger.height(), 1);
    }

    #[test]
    fn replace_adopts_a_new_chain() {
        let ledger = Ledger::open(temp_path("replace"));

        let genesis = Block::genesis();
        let next = Block::new(genesis.hash.clone(), Vec::new());
        let tip = next.hash.clone();
        ledger.replace(vec![genesis, next]).unwrap();

        assert_eq!(ledger.height(), 2);
        assert_eq!(ledger.latest_hash(), tip);
    }
}
