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

use crate::{
    message::{read_json, Message},
    NetworkError, Node, SYNC_TIMEOUT,
};
use tracenet_objects::{Block, GENESIS_PREVIOUS_HASH};

use tokio::{io::AsyncWriteExt, net::TcpStream, time::timeout};

use std::net::SocketAddr;

fn chain_is_linked(chain: &[Block]) -> bool {
    match chain.first() {
        Some(genesis) if genesis.prev_hash == GENESIS_PREVIOUS_HASH => {}
        _ => return false,
    }
    chain
        .windows(2)
        .all(|window| window[1].prev_hash == window[0].hash)
}

async fn fetch_chain(peer: SocketAddr) -> Result<Vec<Block>, NetworkError> {
    let mut stream = TcpStream::connect(peer).await?;
    stream
        .write_all(&serde_json::to_vec(&Message::ChainRequest)?)
        .await?;

    match read_json::<Message>(&mut stream).await? {
        Message::ChainResponse { chain } => Ok(chain),
        other => Err(NetworkError::UnexpectedMessage(other.name())),
    }
}

impl Node {
    /// Performs the initial chain sync: ask the first available peer for
    /// its full chain and adopt it if it is strictly longer than ours. The
    /// `syncing` flag is cleared on every path out, including failures;
    /// the miner must not stay gated forever.
    pub async fn request_chain_sync(&self) {
        let peer = self.peers().lock().iter().next().copied();
        let peer = match peer {
            Some(peer) => peer,
            None => {
                debug!("no peers available, skipping the initial sync");
                self.set_syncing(false);
                return;
            }
        };

        match timeout(SYNC_TIMEOUT, fetch_chain(peer)).await {
            Ok(Ok(chain)) => {
                self.adopt_chain(chain);
            }
            Ok(Err(error)) => warn!("chain sync with {} failed: {}", peer, error),
            Err(_) => warn!("chain sync with {} timed out", peer),
        }

        self.set_syncing(false);
        info!("initial sync complete (height={})", self.ledger().height());
    }

    /// Adopts a received chain if it is strictly longer than the active one
    /// and internally consistent, rebuilding the block index from it.
    /// Returns whether the chain was adopted.
    pub fn adopt_chain(&self, chain: Vec<Block>) -> bool {
        if chain.len() <= self.ledger().height() {
            return false;
        }
        if !chain_is_linked(&chain) {
            debug!("ignoring an inconsistent chain of height {}", chain.len());
            return false;
        }

        if let Err(error) = self.ledger().replace(chain.clone()) {
            warn!("failed to persist the synced chain: {}", error);
        }
        self.blocks().extend_index(&chain);
        info!("chain synced to height {}", chain.len());
        true
    }

    /// Serves this node's full chain to a syncing peer.
    pub(crate) fn chain_response(&self) -> Message {
        Message::ChainResponse {
            chain: self.ledger().chain_snapshot(),
        }
    }
}
