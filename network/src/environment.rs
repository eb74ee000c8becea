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

use std::{net::SocketAddr, time::Duration};

/// The maximum accepted size of a single inbound message.
pub const MAX_MESSAGE_SIZE: usize = 8 * 1024 * 1024;

/// How long an outbound gossip connection may take to connect and send.
pub const GOSSIP_TIMEOUT: Duration = Duration::from_secs(3);

/// How long a registration round-trip with a seed may take.
pub const SEED_TIMEOUT: Duration = Duration::from_secs(5);

/// How long the initial chain sync may take end to end.
pub const SYNC_TIMEOUT: Duration = Duration::from_secs(10);

/// The period of the liveness probe.
pub const LIVENESS_INTERVAL: Duration = Duration::from_secs(13);

/// Consecutive probe failures after which a peer is reported dead.
pub const LIVENESS_FAILURE_LIMIT: u32 = 3;

/// The number of peers kept from the seed responses.
pub const MAX_CONNECTED_PEERS: usize = 4;

/// The static parameters and settings of a node.
#[derive(Clone, Debug)]
pub struct Environment {
    /// The address this node listens on and advertises to its peers.
    local_address: SocketAddr,
    /// The bootstrap seeds consulted for the initial peer list.
    seed_addresses: Vec<SocketAddr>,
    /// The number of local transactions injected at startup.
    seed_transaction_count: usize,
    /// The period of the local transaction generator.
    transaction_interval: Duration,
}

impl Environment {
    pub fn new(
        local_address: SocketAddr,
        seed_addresses: Vec<SocketAddr>,
        seed_transaction_count: usize,
        transaction_interval: Duration,
    ) -> Self {
        Self {
            local_address,
            seed_addresses,
            seed_transaction_count,
            transaction_interval,
        }
    }

    pub fn local_address(&self) -> SocketAddr {
        self.local_address
    }

    pub fn seed_addresses(&self) -> &[SocketAddr] {
        &self.seed_addresses
    }

    pub fn seed_transaction_count(&self) -> usize {
        self.seed_transaction_count
    }

    pub fn transaction_interval(&self) -> Duration {
        self.transaction_interval
    }
}
