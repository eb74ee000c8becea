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

pub mod error;
pub use error::ConsensusError;

pub mod memory_pool;
pub use memory_pool::{MemoryPool, DEFAULT_MEMORY_POOL_CAPACITY};

pub mod miner;
pub use miner::{MiningRound, MiningStatus, MiningTimer, ABORT_POLL_INTERVAL};

pub mod parameters;
pub use parameters::{ConsensusParameters, MAX_TIMESTAMP_DRIFT_SECS, TRANSACTIONS_PER_BLOCK};
