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

use crate::{message::current_timestamp, Node};
use tracenet_objects::{Block, GENESIS_PREVIOUS_HASH};

use parking_lot::Mutex;

use std::collections::HashMap;

/// The block index and the pending queue of a node.
///
/// The two share one mutex: inbound handlers admit blocks while the queue
/// processor drains them, and a split lock would let a block appear in the
/// queue before it is reachable through the index.
#[derive(Default)]
pub struct BlockStore {
    inner: Mutex<BlockStoreInner>,
}

#[derive(Default)]
struct BlockStoreInner {
    /// Every block this node has admitted, keyed by hash. Blocks store only
    /// their parent's hash, so fork walks are index lookups rather than
    /// pointer traversals, and entries are never evicted in-session.
    index: HashMap<String, Block>,
    /// Admitted blocks not yet applied to the active chain.
    pending: Vec<Block>,
}

impl BlockStore {
    /// Indexes a block and appends it to the pending queue. Returns the
    /// queue length after admission.
    pub fn admit(&self, block: Block) -> usize {
        let mut inner = self.inner.lock();
        inner.index.insert(block.hash.clone(), block.clone());
        inner.pending.push(block);
        inner.pending.len()
    }

    /// Indexes a block without queueing it (own mined or synced blocks).
    pub fn insert(&self, block: Block) {
        self.inner.lock().index.insert(block.hash.clone(), block);
    }

    /// Indexes every block of a chain snapshot.
    pub fn extend_index(&self, chain: &[Block]) {
        let mut inner = self.inner.lock();
        for block in chain {
            inner.index.insert(block.hash.clone(), block.clone());
        }
    }

    /// Whether a block with this hash has been admitted.
    pub fn contains(&self, hash: &str) -> bool {
        self.inner.lock().index.contains_key(hash)
    }

    pub fn pending_len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn pending_is_empty(&self) -> bool {
        self.inner.lock().pending.is_empty()
    }

    /// A snapshot of the pending queue in arrival order.
    pub fn pending_snapshot(&self) -> Vec<Block> {
        self.inner.lock().pending.clone()
    }

    pub fn remove_pending(&self, hash: &str) {
        self.inner.lock().pending.retain(|block| block.hash != hash);
    }

    /// The length of the chain that would end at `tip`, counting every
    /// ancestor reachable through the index.
    pub fn candidate_chain_length(&self, tip: &Block) -> usize {
        let inner = self.inner.lock();
        let mut length = 1;
        let mut prev_hash = &tip.prev_hash;
        while let Some(parent) = inner.index.get(prev_hash) {
            length += 1;
            prev_hash = &parent.prev_hash;
        }
        length
    }

    /// Reconstructs the full chain ending at `tip` by walking the index
    /// back to genesis. Returns `None` when an ancestor is missing; a
    /// partially known fork must not replace the active chain.
    pub fn fork_chain(&self, tip: &Block) -> Option<Vec<Block>> {
        let inner = self.inner.lock();
        let mut chain = vec![tip.clone()];
        let mut prev_hash = tip.prev_hash.clone();

        loop {
            if prev_hash == GENESIS_PREVIOUS_HASH {
                chain.reverse();
                return Some(chain);
            }
            match inner.index.get(&prev_hash) {
                Some(parent) => {
                    chain.push(parent.clone());
                    prev_hash = parent.prev_hash.clone();
                }
                None => return None,
            }
        }
    }
}

impl Node {
    /// Handles a `BLOCK` gossip message.
    ///
    /// The block is admitted iff its timestamp is within tolerance, every
    /// contained transaction verifies, and its parent is either the current
    /// tip or already indexed. Inadmissible blocks are dropped outright,
    /// never indexed or queued. Returns whether the block was admitted and
    /// should be re-gossiped.
    pub fn handle_block(&self, block: Block) -> bool {
        if self.blocks().contains(&block.hash) {
            trace!("block {}… is already known", &block.hash[..12]);
            return false;
        }

        if let Err(error) = self.consensus().verify_block(&block, current_timestamp()) {
            debug!("block {}… rejected: {}", &block.hash[..12], error);
            return false;
        }

        let known_parent = block.prev_hash == self.ledger().latest_hash()
            || self.blocks().contains(&block.prev_hash);
        if !known_parent {
            debug!(
                "block {}… rejected: unknown parent {}…",
                &block.hash[..12],
                &block.prev_hash[..12.min(block.prev_hash.len())]
            );
            return false;
        }

        let pending = self.blocks().admit(block.clone());
        info!("block {}… queued (pending={})", &block.hash[..12], pending);

        // A competitor is ahead; stop racing on a stale parent.
        let candidate_length = self.blocks().candidate_chain_length(&block);
        if candidate_length > self.ledger().height() {
            info!(
                "longer chain detected (length={}), aborting the mining round",
                candidate_length
            );
            self.miner().abort();
        }

        true
    }

    /// Drains one pass over the pending queue, applying blocks to the
    /// active chain under the longest-chain rule.
    ///
    /// Direct extensions are appended; fork tips are applied only when the
    /// reconstructed fork is strictly longer than the active chain, so ties
    /// are kept first-seen. Blocks whose parents are still missing remain
    /// queued for a later pass. If progress was made and the queue is now
    /// empty, the mining timer is aborted so the miner re-drafts on the new
    /// tip. Returns whether any block was applied.
    pub async fn process_pending_queue(&self) -> bool {
        let snapshot = self.blocks().pending_snapshot();
        let mut progressed = false;
        let mut to_broadcast = Vec::new();

        for block in snapshot {
            // A block that reached the chain through another path (fork
            // switch or a duplicate from a second broadcast) is just
            // dropped from the queue.
            if self.ledger().contains_hash(&block.hash) {
                self.blocks().remove_pending(&block.hash);
                continue;
            }

            if block.prev_hash == self.ledger().latest_hash() {
                if let Err(error) = self.ledger().append(block.clone()) {
                    warn!("failed to persist block {}…: {}", &block.hash[..12], error);
                }
                self.blocks().remove_pending(&block.hash);
                info!(
                    "block {}… appended (height={})",
                    &block.hash[..12],
                    self.ledger().height()
                );
                to_broadcast.push(block);
                progressed = true;
            } else if self.blocks().contains(&block.prev_hash) {
                let fork = match self.blocks().fork_chain(&block) {
                    Some(fork) => fork,
                    None => continue,
                };
                if fork.len() > self.ledger().height() {
                    if let Err(error) = self.ledger().replace(fork.clone()) {
                        warn!("failed to persist the fork switch: {}", error);
                    }
                    self.blocks().remove_pending(&block.hash);
                    info!("switched to a longer fork (height={})", fork.len());
                    to_broadcast.push(block);
                    progressed = true;
                }
            }
            // Unknown parent: leave the block queued; a future block may
            // fill the gap.
        }

        if progressed && self.blocks().pending_is_empty() {
            self.miner().abort();
        }

        for block in &to_broadcast {
            self.broadcast_block(block).await;
        }

        progressed
    }
}
