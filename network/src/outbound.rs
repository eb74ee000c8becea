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
    message::{current_timestamp, Message},
    NetworkError, Node, GOSSIP_TIMEOUT,
};
use tracenet_objects::{Block, Transaction};

use tokio::{io::AsyncWriteExt, net::TcpStream, time::timeout};

use std::net::SocketAddr;

/// Connects, sends one payload and closes, all within the gossip timeout.
pub(crate) async fn send_raw(address: SocketAddr, payload: &[u8]) -> Result<(), NetworkError> {
    let mut stream = timeout(GOSSIP_TIMEOUT, TcpStream::connect(address))
        .await
        .map_err(|_| NetworkError::ConnectionTimeout(address))??;
    timeout(GOSSIP_TIMEOUT, stream.write_all(payload))
        .await
        .map_err(|_| NetworkError::ConnectionTimeout(address))??;
    Ok(())
}

impl Node {
    /// Floods a message to every peer except the excluded origin. Sends run
    /// as detached tasks; a dead peer delays nobody.
    pub(crate) async fn gossip(&self, message: &Message, exclude: Option<SocketAddr>) {
        let payload = match serde_json::to_vec(message) {
            Ok(payload) => payload,
            Err(error) => {
                warn!("could not serialize a {} message: {}", message, error);
                return;
            }
        };

        let peers: Vec<SocketAddr> = self.peers().lock().iter().copied().collect();
        for peer in peers {
            if Some(peer) == exclude {
                continue;
            }
            let payload = payload.clone();
            tokio::spawn(async move {
                if let Err(error) = send_raw(peer, &payload).await {
                    debug!("gossip to {} failed: {}", peer, error);
                }
            });
        }
    }

    /// Wraps a transaction in a fresh gossip envelope and floods it.
    pub async fn broadcast_transaction(&self, transaction: &Transaction) {
        let id = self.next_message_id();
        self.mark_seen(&id);

        let local = self.environment().local_address();
        let message = Message::Transaction {
            id,
            ip: local.ip().to_string(),
            port: local.port(),
            timestamp: current_timestamp(),
            data: transaction.clone(),
        };
        self.gossip(&message, None).await;
    }

    /// Wraps a block in a fresh gossip envelope and floods it.
    pub async fn broadcast_block(&self, block: &Block) {
        let id = self.next_message_id();
        self.mark_seen(&id);

        let local = self.environment().local_address();
        let message = Message::Block {
            id,
            ip: local.ip().to_string(),
            port: local.port(),
            timestamp: current_timestamp(),
            data: block.clone(),
        };
        self.gossip(&message, None).await;
    }
}
