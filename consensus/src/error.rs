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

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("hash power must be within (0, 100], got {0}")]
    InvalidHashPower(f64),

    #[error("interarrival must be a positive number of seconds, got {0}")]
    InvalidInterarrival(f64),

    #[error("block timestamp {timestamp} is more than {tolerance}s away from local time {now}")]
    TimestampOutOfRange {
        timestamp: f64,
        now: f64,
        tolerance: f64,
    },

    #[error("transaction {0} carries an invalid signature")]
    InvalidTransactionSignature(String),
}
