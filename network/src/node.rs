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

use crate::{BlockStore, Environment, MinerInstance, NetworkError};
use tracenet_consensus::{ConsensusParameters, MemoryPool, MiningTimer};
use tracenet_objects::Account;
use tracenet_storage::Ledger;

use parking_lot::Mutex;
use rand::thread_rng;

use std::{
    collections::{HashMap, HashSet},
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

/// A peer-to-peer node of the provenance network.
///
/// All mutable state lives behind shared handles, so the node is cheap to
/// clone into the tasks that make it up: the listener, the per-connection
/// handlers, the mining loop, the liveness probe and the local transaction
/// generator.
#[derive(Clone)]
pub struct Node {
    /// The parameters and settings of this node.
    environment: Environment,
    /// The consensus rules this node validates against.
    consensus: Arc<ConsensusParameters>,
    /// The proof-of-work timer of this node.
    miner: Arc<MiningTimer>,
    /// The active chain and its persistence.
    ledger: Arc<Ledger>,
    /// The pool of unconfirmed transactions.
    memory_pool: Arc<Mutex<MemoryPool>>,
    /// The block index and the pending queue, behind one lock.
    blocks: Arc<BlockStore>,
    /// The identity used to sign locally generated transactions.
    account: Arc<Account>,
    /// The gossip peers of this node.
    peers: Arc<Mutex<HashSet<SocketAddr>>>,
    /// Consecutive liveness failures per peer.
    liveness_failures: Arc<Mutex<HashMap<SocketAddr, u32>>>,
    /// The ids of gossip messages already processed.
    seen_messages: Arc<Mutex<HashSet<String>>>,
    /// The monotonic component of outbound gossip ids.
    message_counter: Arc<AtomicU64>,
    /// Set while the initial chain sync is in progress; gates the miner.
    syncing: Arc<AtomicBool>,
}

impl Node {
    /// Creates a new node. The blocks of the loaded chain are indexed
    /// immediately so fork walks can reach them.
    pub fn new(
        environment: Environment,
        consensus: ConsensusParameters,
        miner: MiningTimer,
        ledger: Ledger,
        memory_pool: MemoryPool,
    ) -> Self {
        let blocks = BlockStore::default();
        blocks.extend_index(&ledger.chain_snapshot());

        Self {
            environment,
            consensus: Arc::new(consensus),
            miner: Arc::new(miner),
            ledger: Arc::new(ledger),
            memory_pool: Arc::new(Mutex::new(memory_pool)),
            blocks: Arc::new(blocks),
            account: Arc::new(Account::new(&mut thread_rng())),
            peers: Arc::new(Mutex::new(HashSet::new())),
            liveness_failures: Arc::new(Mutex::new(HashMap::new())),
            seen_messages: Arc::new(Mutex::new(HashSet::new())),
            message_counter: Arc::new(AtomicU64::new(0)),
            syncing: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Boots the node:
    ///
    /// 1. Register with the seeds and collect a peer list.
    /// 2. Seed the memory pool with local transactions.
    /// 3. Sync the chain from a peer.
    /// 4. Start the listener, the generator, the miner and the liveness
    ///    probe.
    ///
    /// Returns the bound listener address.
    pub async fn start(&self) -> Result<SocketAddr, NetworkError> {
        self.register_with_seeds().await;

        let seeded = self.seed_initial_transactions(self.environment.seed_transaction_count());

        self.request_chain_sync().await;

        let local_address = self.start_listener().await?;

        // Give peers a moment to finish their own boot before the seeded
        // transactions are flooded.
        let node = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            for tx in seeded {
                node.broadcast_transaction(&tx).await;
            }
        });

        self.spawn_transaction_generator();
        MinerInstance::new(self.clone()).spawn();
        self.spawn_liveness_probe();

        info!(
            "node started at {} (hash_power={}%)",
            local_address,
            self.miner.hash_power()
        );
        Ok(local_address)
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn consensus(&self) -> &Arc<ConsensusParameters> {
        &self.consensus
    }

    pub fn miner(&self) -> &Arc<MiningTimer> {
        &self.miner
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn memory_pool(&self) -> &Arc<Mutex<MemoryPool>> {
        &self.memory_pool
    }

    pub fn blocks(&self) -> &Arc<BlockStore> {
        &self.blocks
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn peers(&self) -> &Arc<Mutex<HashSet<SocketAddr>>> {
        &self.peers
    }

    pub(crate) fn liveness_failures(&self) -> &Arc<Mutex<HashMap<SocketAddr, u32>>> {
        &self.liveness_failures
    }

    /// Whether the initial chain sync is still in progress.
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    pub(crate) fn set_syncing(&self, syncing: bool) {
        self.syncing.store(syncing, Ordering::SeqCst);
    }

    /// Records a gossip id; returns `false` if it was already seen.
    pub(crate) fn mark_seen(&self, id: &str) -> bool {
        self.seen_messages.lock().insert(id.to_string())
    }

    /// A fresh gossip id: timestamp, origin, monotonic counter.
    pub(crate) fn next_message_id(&self) -> String {
        let counter = self.message_counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!(
            "{}:{}:{}",
            crate::message::current_timestamp(),
            self.environment.local_address().ip(),
            counter
        )
    }
}
