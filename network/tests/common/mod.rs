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

use tracenet_consensus::{MemoryPool, MiningTimer};
use tracenet_network::{Environment, Node};
use tracenet_storage::Ledger;
use tracenet_testing::{temp_ledger_path, test_consensus};

use std::time::Duration;

/// A node with an ephemeral listener address, no seeds, and a throwaway
/// ledger. The boot sequence is not run; tests drive the engine directly.
pub fn test_node(tag: &str) -> Node {
    test_node_with_timer(tag, MiningTimer::new(&test_consensus()))
}

pub fn test_node_with_timer(tag: &str, miner: MiningTimer) -> Node {
    let environment = Environment::new(
        "127.0.0.1:0".parse().unwrap(),
        Vec::new(),
        0,
        Duration::from_secs(3600),
    );
    let ledger = Ledger::open(temp_ledger_path(tag));
    Node::new(
        environment,
        test_consensus(),
        miner,
        ledger,
        MemoryPool::default(),
    )
}
