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

use crate::Node;
use tracenet_objects::Block;

use tokio::task;

use std::time::Duration;

/// The continuous mining loop of a node.
pub struct MinerInstance {
    node: Node,
}

impl MinerInstance {
    pub fn new(node: Node) -> Self {
        Self { node }
    }

    /// Spawns the mining loop. It runs for the lifetime of the node and
    /// never propagates an error; failures are logged and the next cycle
    /// starts over.
    pub fn spawn(self) -> task::JoinHandle<()> {
        tokio::spawn(async move { self.mine_loop().await })
    }

    /// One continuous cycle:
    ///
    /// 1. Drain the pending queue.
    /// 2. Idle while the memory pool is empty.
    /// 3. Draft up to the block capacity of transactions, FIFO.
    /// 4. Arm the timer and wait out the round.
    /// 5. On `Mined`, link a block onto the tip *as it is now*, persist,
    ///    index, purge the draft and broadcast.
    /// 6. On `Aborted`, return the draft to the pool in its original order.
    async fn mine_loop(self) {
        let node = &self.node;

        while node.is_syncing() {
            tokio::time::sleep(Duration::from_millis(500)).await;
        }

        info!(
            "mining loop started (hash_power={}%)",
            node.miner().hash_power()
        );

        loop {
            while !node.blocks().pending_is_empty() {
                let progressed = node.process_pending_queue().await;
                tokio::time::sleep(Duration::from_millis(200)).await;
                if !progressed {
                    // The remaining blocks are waiting on missing parents;
                    // spinning on them would starve the miner.
                    break;
                }
            }

            if node.memory_pool().lock().is_empty() {
                tokio::time::sleep(Duration::from_secs(1)).await;
                continue;
            }

            let transactions = {
                let mut pool = node.memory_pool().lock();
                let capacity = node.consensus().max_transactions_per_block;
                pool.take(capacity)
            };
            if transactions.is_empty() {
                tokio::time::sleep(Duration::from_secs(1)).await;
                continue;
            }

            debug!(
                "starting a mining round ({} transactions, pool remaining={})",
                transactions.len(),
                node.memory_pool().lock().size()
            );

            let status = node.miner().mine().await;

            if status.is_mined() {
                // The queue processor may have advanced the chain while the
                // timer ran (the abort can race a just-expired deadline), so
                // the parent is re-read here rather than captured at draft
                // time.
                let prev_hash = node.ledger().latest_hash();
                let block = Block::new(prev_hash, transactions.clone());

                if let Err(error) = node.ledger().append(block.clone()) {
                    warn!("failed to persist the mined block: {}", error);
                }
                node.blocks().insert(block.clone());

                let txids: Vec<String> =
                    transactions.iter().map(|tx| tx.txid.clone()).collect();
                node.memory_pool().lock().remove(&txids);

                info!(
                    "*** mined block {}… (height={}) ***",
                    &block.hash[..16],
                    node.ledger().height()
                );
                node.broadcast_block(&block).await;
            } else {
                let mut pool = node.memory_pool().lock();
                for tx in transactions {
                    let txid = tx.txid.clone();
                    if !pool.add(tx) {
                        warn!(
                            "aborted transaction {}… could not be returned to the pool",
                            &txid[..10]
                        );
                    }
                }
                drop(pool);
                debug!("mining aborted, the draft was returned to the memory pool");
            }
        }
    }
}
