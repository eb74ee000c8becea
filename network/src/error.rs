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

use tracenet_consensus::ConsensusError;
use tracenet_storage::StorageError;

use thiserror::Error;

use std::net::SocketAddr;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("consensus error: {0}")]
    Consensus(#[from] ConsensusError),

    #[error("connection to {0} timed out")]
    ConnectionTimeout(SocketAddr),

    #[error("the connection closed before a full message arrived")]
    TruncatedMessage,

    #[error("inbound message exceeds the size limit ({0} bytes)")]
    OversizedMessage(usize),

    #[error("received an unexpected {0} message in response")]
    UnexpectedMessage(&'static str),
}
