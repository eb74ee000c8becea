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
use tracenet_objects::{Account, Transaction};

use rand::{thread_rng, Rng};

const OIL_FIELDS: [&str; 5] = [
    "Ghawar",
    "Prudhoe Bay",
    "Cantarell",
    "North Sea",
    "Permian Basin",
];
const REFINERIES: [&str; 4] = [
    "RefineCo Alpha",
    "PetroRefine Beta",
    "Gulf Refinery",
    "Delta Refinery",
];
const PORTS: [&str; 4] = [
    "Port Rashid",
    "Ras Tanura",
    "Rotterdam",
    "Houston Ship Channel",
];
const PRODUCTS: [&str; 5] = ["Gasoline-95", "Diesel B5", "Jet-A1", "Heavy Fuel Oil", "Naphtha"];
const GRADES: [&str; 4] = ["Brent", "WTI", "Dubai", "Arab Light"];
const STATIONS: [&str; 3] = ["PetroGas Sta-7", "QuickFuel Sta-12", "EnergyMart Sta-3"];

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &'a [&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

/// One randomly drawn petroleum supply-chain event, covering the upstream,
/// midstream, downstream and commercial stages.
pub fn random_event_data<R: Rng + ?Sized>(rng: &mut R) -> String {
    match rng.gen_range(0..10u8) {
        0 => format!(
            "Exploration permit issued for Block-{} in {}",
            rng.gen_range(1..100),
            pick(rng, &OIL_FIELDS)
        ),
        1 => format!(
            "Well #{} production started: {} bbl/day",
            rng.gen_range(100..1000),
            rng.gen_range(100..50_000)
        ),
        2 => format!(
            "Crude extraction report: {} barrels extracted at {}",
            rng.gen_range(100..50_000),
            pick(rng, &OIL_FIELDS)
        ),
        3 => format!(
            "Pipeline shipment #{}: {} barrels from {} to {}",
            rng.gen_range(1000..10_000),
            rng.gen_range(100..50_000),
            pick(rng, &OIL_FIELDS),
            pick(rng, &REFINERIES)
        ),
        4 => format!(
            "Tanker MT-{} loaded: {} barrels crude, departing {}",
            rng.gen_range(100..1000),
            rng.gen_range(100..50_000),
            pick(rng, &PORTS)
        ),
        5 => format!(
            "Refinery {} intake: {} barrels crude (grade {})",
            pick(rng, &REFINERIES),
            rng.gen_range(100..50_000),
            pick(rng, &GRADES)
        ),
        6 => format!(
            "Quality certificate QC-{} issued for {} batch",
            rng.gen_range(100..1000),
            pick(rng, &PRODUCTS)
        ),
        7 => format!(
            "Fuel delivery {} liters of {} to {}",
            rng.gen_range(1000..50_000),
            pick(rng, &PRODUCTS),
            pick(rng, &STATIONS)
        ),
        8 => format!(
            "Invoice INV-{}: {} bbl @ ${:.2}/bbl",
            rng.gen_range(10_000..100_000),
            rng.gen_range(100..50_000),
            rng.gen_range(60.0..110.0)
        ),
        _ => format!(
            "Royalty payment: ${} to government for Q{}",
            rng.gen_range(10_000..5_000_000),
            rng.gen_range(1..5)
        ),
    }
}

impl Node {
    /// Handles a `TX` gossip message. Returns whether the transaction was
    /// admitted to the pool and should be re-gossiped; invalid signatures
    /// and duplicates are dropped silently.
    pub fn handle_transaction(&self, transaction: Transaction) -> bool {
        if !transaction.verify() {
            debug!(
                "transaction {}… has an invalid signature, rejected",
                &transaction.txid[..10]
            );
            return false;
        }

        let txid = transaction.txid.clone();
        let added = self.memory_pool().lock().add(transaction);
        if added {
            info!(
                "transaction {}… added to the memory pool (size={})",
                &txid[..10],
                self.memory_pool().lock().size()
            );
        } else {
            trace!(
                "transaction {}… is a duplicate or the pool is full",
                &txid[..10]
            );
        }
        added
    }

    /// Creates one locally signed supply-chain transaction addressed to a
    /// throwaway receiver.
    pub fn generate_local_transaction(&self) -> Transaction {
        let rng = &mut thread_rng();
        let receiver = Account::new(rng);
        let data = random_event_data(rng);
        Transaction::new(self.account(), receiver.address(), data, rng)
    }

    /// Injects `count` local transactions into the pool at startup; the
    /// caller broadcasts them once the listener is up.
    pub fn seed_initial_transactions(&self, count: usize) -> Vec<Transaction> {
        let mut seeded = Vec::with_capacity(count);
        for _ in 0..count {
            let tx = self.generate_local_transaction();
            self.memory_pool().lock().add(tx.clone());
            info!(
                "seeded transaction {}… | {}",
                &tx.txid[..12],
                &tx.data[..tx.data.len().min(60)]
            );
            seeded.push(tx);
        }
        seeded
    }

    /// Spawns the periodic generator: one fresh transaction per interval,
    /// admitted locally and flooded to the peers.
    pub(crate) fn spawn_transaction_generator(&self) {
        let node = self.clone();
        let interval = self.environment().transaction_interval();

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;

                let tx = node.generate_local_transaction();
                let added = node.memory_pool().lock().add(tx.clone());
                if added {
                    info!(
                        "new transaction {}… (pool size={}) | {}",
                        &tx.txid[..12],
                        node.memory_pool().lock().size(),
                        &tx.data[..tx.data.len().min(60)]
                    );
                }
                node.broadcast_transaction(&tx).await;
            }
        });
    }
}
