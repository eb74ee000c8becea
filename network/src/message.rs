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

use crate::{NetworkError, MAX_MESSAGE_SIZE};
use tracenet_objects::{Block, Transaction};

use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::{io::AsyncReadExt, net::TcpStream};

use std::{fmt, net::SocketAddr};

/// The prefix of a raw (non-JSON) dead-node report sent to a seed.
pub const DEAD_NODE_PREFIX: &str = "Dead Node:";

/// A gossip or control message, discriminated by its `type` field.
///
/// `TX` and `BLOCK` carry a gossip id and are flooded; the remaining kinds
/// are point-to-point and are never re-gossiped.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    #[serde(rename = "LIVENESS")]
    Liveness { ip: String, port: u16, time: f64 },

    #[serde(rename = "ALIVE")]
    Alive { ip: String, port: u16 },

    #[serde(rename = "CHAIN_REQUEST")]
    ChainRequest,

    #[serde(rename = "CHAIN_RESPONSE")]
    ChainResponse { chain: Vec<Block> },

    #[serde(rename = "TX")]
    Transaction {
        id: String,
        ip: String,
        port: u16,
        timestamp: f64,
        data: Transaction,
    },

    #[serde(rename = "BLOCK")]
    Block {
        id: String,
        ip: String,
        port: u16,
        timestamp: f64,
        data: Block,
    },
}

impl Message {
    /// The wire name of this message kind.
    pub fn name(&self) -> &'static str {
        match self {
            Message::Liveness { .. } => "LIVENESS",
            Message::Alive { .. } => "ALIVE",
            Message::ChainRequest => "CHAIN_REQUEST",
            Message::ChainResponse { .. } => "CHAIN_RESPONSE",
            Message::Transaction { .. } => "TX",
            Message::Block { .. } => "BLOCK",
        }
    }

    /// The gossip id, present only on flooded kinds.
    pub fn id(&self) -> Option<&str> {
        match self {
            Message::Transaction { id, .. } | Message::Block { id, .. } => Some(id),
            _ => None,
        }
    }

    /// The advertised origin of a flooded message, used to avoid echoing a
    /// message straight back to its sender.
    pub fn origin(&self) -> Option<SocketAddr> {
        match self {
            Message::Transaction { ip, port, .. } | Message::Block { ip, port, .. } => {
                format!("{}:{}", ip, port).parse().ok()
            }
            _ => None,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The registration payload sent to a bootstrap seed; the response is a
/// JSON array of `[host, port]` pairs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeerRegistration {
    pub host: String,
    pub port: u16,
}

/// The current wall-clock time in seconds since the epoch.
pub fn current_timestamp() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Reads one JSON value from the stream.
///
/// Senders may keep the connection open while awaiting a response, so this
/// accumulates chunks until the buffer parses as a complete value rather
/// than reading to EOF.
pub async fn read_json<T: DeserializeOwned>(stream: &mut TcpStream) -> Result<T, NetworkError> {
    let mut buffer = Vec::new();
    let mut chunk = vec![0u8; 64 * 1024];

    loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            if buffer.is_empty() {
                return Err(NetworkError::TruncatedMessage);
            }
            return serde_json::from_slice(&buffer).map_err(NetworkError::from);
        }

        buffer.extend_from_slice(&chunk[..read]);
        if buffer.len() > MAX_MESSAGE_SIZE {
            return Err(NetworkError::OversizedMessage(buffer.len()));
        }

        match serde_json::from_slice::<T>(&buffer) {
            Ok(value) => return Ok(value),
            Err(error) if error.is_eof() => continue,
            Err(error) => return Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_their_wire_discriminator() {
        let json = serde_json::to_string(&Message::ChainRequest).unwrap();
        assert_eq!(json, r#"{"type":"CHAIN_REQUEST"}"#);

        let ping = Message::Liveness {
            ip: "127.0.0.1".to_string(),
            port: 9001,
            time: 12.5,
        };
        let json = serde_json::to_string(&ping).unwrap();
        assert!(json.contains(r#""type":"LIVENESS""#));

        let decoded: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.name(), "LIVENESS");
    }

    #[test]
    fn gossip_ids_are_only_on_flooded_kinds() {
        assert_eq!(Message::ChainRequest.id(), None);
        assert_eq!(
            Message::Alive {
                ip: "127.0.0.1".to_string(),
                port: 9001,
            }
            .id(),
            None
        );
    }

    #[test]
    fn unknown_type_fails_to_parse() {
        let result: Result<Message, _> =
            serde_json::from_str(r#"{"type":"GIBBERISH","ip":"127.0.0.1","port":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn origin_parses_the_advertised_endpoint() {
        let block = Message::Block {
            id: "1:127.0.0.1:1".to_string(),
            ip: "127.0.0.1".to_string(),
            port: 9002,
            timestamp: 0.0,
            data: tracenet_objects::Block::genesis(),
        };
        assert_eq!(block.origin(), Some("127.0.0.1:9002".parse().unwrap()));
    }
}
