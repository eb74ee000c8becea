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

//! Shared fixtures for the integration tests of the workspace crates.

use tracenet_consensus::ConsensusParameters;
use tracenet_objects::{Account, Block, Transaction};

use rand::{thread_rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use std::{
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};

static TEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A deterministic RNG for reproducible fixtures.
pub fn test_rng() -> XorShiftRng {
    XorShiftRng::seed_from_u64(1234567890u64)
}

/// The consensus parameters most tests run with: 20% hash power against a
/// 15-second target interval.
pub fn test_consensus() -> ConsensusParameters {
    ConsensusParameters::new(20.0, 15.0).expect("valid test parameters")
}

/// A fresh random account.
pub fn random_account() -> Account {
    Account::new(&mut thread_rng())
}

/// One signed transaction with the given payload, from a fresh account to a
/// fresh receiver.
pub fn sample_transaction(data: &str) -> Transaction {
    let rng = &mut thread_rng();
    let sender = Account::new(rng);
    let receiver = Account::new(rng);
    Transaction::new(&sender, receiver.address(), data, rng)
}

/// A block of `transaction_count` sample transactions on top of `prev_hash`.
pub fn sample_block(prev_hash: &str, transaction_count: usize) -> Block {
    let transactions = (0..transaction_count)
        .map(|i| sample_transaction(&format!("Storage tank T-{} integrity check: PASS", i + 1)))
        .collect();
    Block::new(prev_hash.to_string(), transactions)
}

/// A unique path under the system temp directory for a throwaway ledger.
pub fn temp_ledger_path(tag: &str) -> PathBuf {
    let unique = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "tracenet_test_{}_{}_{}.json",
        tag,
        std::process::id(),
        unique
    ))
}

/// Polls a condition until it holds or the time limit elapses.
#[macro_export]
macro_rules! wait_until {
    ($limit_secs: expr, $condition: expr) => {
        let now = std::time::Instant::now();
        loop {
            if $condition {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            if now.elapsed() > std::time::Duration::from_secs($limit_secs) {
                panic!("timed out waiting for: {}", stringify!($condition));
            }
        }
    };
}
