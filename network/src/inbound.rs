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
    NetworkError, Node,
};

use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
};

use std::net::SocketAddr;

impl Node {
    /// Binds the listener and spawns the accept loop. Each accepted
    /// connection is handled by a short-lived task of its own; a failure in
    /// one handler never reaches its siblings.
    pub async fn start_listener(&self) -> Result<SocketAddr, NetworkError> {
        let listener = TcpListener::bind(self.environment().local_address()).await?;
        let local_address = listener.local_addr()?;
        info!("listening at {}", local_address);

        let node = self.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, remote_address)) => {
                        let node = node.clone();
                        tokio::spawn(async move {
                            if let Err(error) = node.handle_connection(stream).await {
                                debug!("dropped a connection from {}: {}", remote_address, error);
                            }
                        });
                    }
                    Err(error) => warn!("failed to accept a connection: {}", error),
                }
            }
        });

        Ok(local_address)
    }

    async fn handle_connection(&self, mut stream: TcpStream) -> Result<(), NetworkError> {
        let message: Message = read_json(&mut stream).await?;
        trace!("received a {} message", message);
        self.dispatch(message, &mut stream).await
    }

    /// Routes one inbound message. `LIVENESS` and `CHAIN_REQUEST` are
    /// answered on the same connection; flooded kinds go through gossip
    /// deduplication before they are processed and relayed.
    pub(crate) async fn dispatch(
        &self,
        message: Message,
        stream: &mut TcpStream,
    ) -> Result<(), NetworkError> {
        match message {
            Message::Liveness { ip, port, .. } => {
                trace!("liveness ping from {}:{}", ip, port);
                let local = self.environment().local_address();
                let reply = Message::Alive {
                    ip: local.ip().to_string(),
                    port: local.port(),
                };
                stream.write_all(&serde_json::to_vec(&reply)?).await?;
            }
            Message::Alive { .. } => {}
            Message::ChainRequest => {
                let response = self.chain_response();
                stream.write_all(&serde_json::to_vec(&response)?).await?;
            }
            Message::ChainResponse { chain } => {
                // Only ever sent point-to-point during sync; never relayed.
                self.adopt_chain(chain);
            }
            other => {
                let id = match other.id() {
                    Some(id) => id.to_string(),
                    None => return Ok(()),
                };
                if !self.mark_seen(&id) {
                    trace!("dropping duplicate gossip {}", id);
                    return Ok(());
                }

                let admitted = match &other {
                    Message::Transaction { data, .. } => self.handle_transaction(data.clone()),
                    Message::Block { data, .. } => self.handle_block(data.clone()),
                    _ => false,
                };

                if admitted {
                    self.gossip(&other, other.origin()).await;
                }
            }
        }

        Ok(())
    }
}
