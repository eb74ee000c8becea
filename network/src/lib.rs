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

#[macro_use]
extern crate tracing;

pub mod blocks;
pub use blocks::BlockStore;

pub mod environment;
pub use environment::{
    Environment, GOSSIP_TIMEOUT, LIVENESS_FAILURE_LIMIT, LIVENESS_INTERVAL, MAX_CONNECTED_PEERS,
    MAX_MESSAGE_SIZE, SEED_TIMEOUT, SYNC_TIMEOUT,
};

pub mod error;
pub use error::NetworkError;

pub mod inbound;

pub mod message;
pub use message::{read_json, Message, PeerRegistration, DEAD_NODE_PREFIX};

pub mod miner;
pub use miner::MinerInstance;

pub mod node;
pub use node::Node;

pub mod outbound;

pub mod peers;

pub mod sync;

pub mod transactions;
