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
    message::{current_timestamp, read_json, Message, PeerRegistration, DEAD_NODE_PREFIX},
    outbound::send_raw,
    NetworkError, Node, GOSSIP_TIMEOUT, LIVENESS_FAILURE_LIMIT, LIVENESS_INTERVAL,
    MAX_CONNECTED_PEERS, SEED_TIMEOUT,
};

use tokio::{io::AsyncWriteExt, net::TcpStream, time::timeout};

use std::{collections::HashSet, net::SocketAddr};

async fn request_peer_list(
    seed: SocketAddr,
    registration: Vec<u8>,
) -> Result<Vec<(String, u16)>, NetworkError> {
    let mut stream = TcpStream::connect(seed).await?;
    stream.write_all(&registration).await?;
    read_json(&mut stream).await
}

impl Node {
    /// Registers with every configured seed and keeps a bounded peer set
    /// from the union of their responses, excluding this node itself.
    pub(crate) async fn register_with_seeds(&self) {
        let local = self.environment().local_address();
        let registration = PeerRegistration {
            host: local.ip().to_string(),
            port: local.port(),
        };
        let payload = match serde_json::to_vec(&registration) {
            Ok(payload) => payload,
            Err(error) => {
                warn!("could not serialize the seed registration: {}", error);
                return;
            }
        };

        let mut discovered = HashSet::new();
        for seed in self.environment().seed_addresses().to_vec() {
            match timeout(SEED_TIMEOUT, request_peer_list(seed, payload.clone())).await {
                Ok(Ok(list)) => {
                    for (host, port) in list {
                        if let Ok(address) = format!("{}:{}", host, port).parse::<SocketAddr>() {
                            if address != local {
                                discovered.insert(address);
                            }
                        }
                    }
                }
                Ok(Err(error)) => warn!("seed {} unreachable: {}", seed, error),
                Err(_) => warn!("seed {} timed out", seed),
            }
        }

        let mut peers = self.peers().lock();
        for address in discovered.into_iter().take(MAX_CONNECTED_PEERS) {
            peers.insert(address);
        }
        info!("connected peers: {:?}", *peers);
    }

    async fn ping(&self, peer: SocketAddr) -> Result<(), NetworkError> {
        let local = self.environment().local_address();
        let message = Message::Liveness {
            ip: local.ip().to_string(),
            port: local.port(),
            time: current_timestamp(),
        };
        let mut stream = TcpStream::connect(peer).await?;
        stream.write_all(&serde_json::to_vec(&message)?).await?;
        Ok(())
    }

    /// Spawns the liveness probe: every interval, ping each peer; after
    /// three consecutive failures the peer is reported to the seeds as dead
    /// and dropped from the peer set.
    pub(crate) fn spawn_liveness_probe(&self) {
        let node = self.clone();

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(LIVENESS_INTERVAL).await;

                let peers: Vec<SocketAddr> = node.peers().lock().iter().copied().collect();
                for peer in peers {
                    match timeout(GOSSIP_TIMEOUT, node.ping(peer)).await {
                        Ok(Ok(())) => {
                            node.liveness_failures().lock().insert(peer, 0);
                        }
                        _ => {
                            let failures = {
                                let mut map = node.liveness_failures().lock();
                                let count = map.entry(peer).or_insert(0);
                                *count += 1;
                                *count
                            };
                            warn!("liveness failure #{} for {}", failures, peer);

                            if failures >= LIVENESS_FAILURE_LIMIT {
                                warn!("dead node detected: {}", peer);
                                node.report_dead_node(peer).await;
                                node.peers().lock().remove(&peer);
                                node.liveness_failures().lock().remove(&peer);
                            }
                        }
                    }
                }
            }
        });
    }

    /// Reports a dead peer to every seed as a raw, unframed string.
    pub(crate) async fn report_dead_node(&self, peer: SocketAddr) {
        let report = format!(
            "{}{}:{}:{}:{}",
            DEAD_NODE_PREFIX,
            peer.ip(),
            peer.port(),
            current_timestamp(),
            self.environment().local_address().ip()
        );

        for seed in self.environment().seed_addresses().to_vec() {
            if let Err(error) = send_raw(seed, report.as_bytes()).await {
                debug!("could not report the dead node to seed {}: {}", seed, error);
            }
        }
    }
}
