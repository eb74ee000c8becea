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

use tracenet_objects::Transaction;

use std::collections::{HashMap, VecDeque};

/// The default number of unconfirmed transactions a node is willing to hold.
/// Sized generously relative to the block capacity; there is no eviction.
pub const DEFAULT_MEMORY_POOL_CAPACITY: usize = 500;

/// The pool of unconfirmed transactions held by a single node.
///
/// Transactions are keyed by txid and drained in insertion order, so the
/// take order is the arrival order. Callers share the pool behind a mutex;
/// every method assumes it holds that lock.
pub struct MemoryPool {
    transactions: HashMap<String, Transaction>,
    order: VecDeque<String>,
    capacity: usize,
}

impl MemoryPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            transactions: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    /// Accepts a transaction into the pool.
    ///
    /// Returns `false` without distinguishing a duplicate txid from a full
    /// pool; the gossip path treats both as "not admitted".
    pub fn add(&mut self, tx: Transaction) -> bool {
        if self.transactions.contains_key(&tx.txid) {
            return false;
        }
        if self.transactions.len() >= self.capacity {
            return false;
        }

        self.order.push_back(tx.txid.clone());
        self.transactions.insert(tx.txid.clone(), tx);
        true
    }

    /// Removes and returns up to `n` transactions in insertion order.
    pub fn take(&mut self, n: usize) -> Vec<Transaction> {
        let mut taken = Vec::with_capacity(n.min(self.order.len()));
        while taken.len() < n {
            let txid = match self.order.pop_front() {
                Some(txid) => txid,
                None => break,
            };
            if let Some(tx) = self.transactions.remove(&txid) {
                taken.push(tx);
            }
        }
        taken
    }

    /// A snapshot of the pool in insertion order, without removal.
    pub fn peek(&self) -> Vec<Transaction> {
        self.order
            .iter()
            .filter_map(|txid| self.transactions.get(txid).cloned())
            .collect()
    }

    /// Purges the listed txids; absent ids are ignored.
    pub fn remove(&mut self, txids: &[String]) {
        for txid in txids {
            self.transactions.remove(txid);
        }
        let transactions = &self.transactions;
        self.order.retain(|txid| transactions.contains_key(txid));
    }

    pub fn size(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for MemoryPool {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_POOL_CAPACITY)
    }
}
