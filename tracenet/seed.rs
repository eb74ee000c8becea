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

//! The bootstrap seed: a peer registry nodes consult at startup. It also
//! accepts raw dead-node reports from the liveness probes.

use tracenet_network::{PeerRegistration, DEAD_NODE_PREFIX};

use anyhow::Result;
use clap::{App, Arg};
use parking_lot::Mutex;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use std::{collections::HashSet, sync::Arc};

type PeerSet = Arc<Mutex<HashSet<(String, u16)>>>;

async fn handle_client(mut stream: TcpStream, peers: PeerSet) -> Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = vec![0u8; 4096];

    let registration: PeerRegistration = loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            if buffer.is_empty() {
                return Ok(());
            }
            break serde_json::from_slice(&buffer)?;
        }
        buffer.extend_from_slice(&chunk[..read]);

        if buffer.starts_with(DEAD_NODE_PREFIX.as_bytes()) {
            info!("dead node report: {}", String::from_utf8_lossy(&buffer));
            return Ok(());
        }

        match serde_json::from_slice::<PeerRegistration>(&buffer) {
            Ok(registration) => break registration,
            Err(error) if error.is_eof() => continue,
            Err(error) => return Err(error.into()),
        }
    };

    let list: Vec<(String, u16)> = {
        let mut peers = peers.lock();
        peers.insert((registration.host.clone(), registration.port));
        peers.iter().cloned().collect()
    };
    info!(
        "registered {}:{} ({} known peers)",
        registration.host,
        registration.port,
        list.len()
    );

    stream.write_all(&serde_json::to_vec(&list)?).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = App::new("tracenet-seed")
        .version("1.2.0")
        .about("The bootstrap peer registry of a tracenet network")
        .arg(
            Arg::with_name("host")
                .long("host")
                .value_name("HOST")
                .help("The ip address to listen on")
                .takes_value(true)
                .default_value("127.0.0.1"),
        )
        .arg(
            Arg::with_name("port")
                .long("port")
                .short("p")
                .value_name("PORT")
                .help("The port to listen on")
                .takes_value(true)
                .default_value("8000"),
        )
        .get_matches();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let host = matches.value_of("host").unwrap_or("127.0.0.1");
    let port = matches.value_of("port").unwrap_or("8000");
    let listener = TcpListener::bind(format!("{}:{}", host, port)).await?;
    info!("seed running at {}:{}", host, port);

    let peers: PeerSet = Default::default();
    loop {
        let (stream, remote_address) = listener.accept().await?;
        let peers = peers.clone();
        tokio::spawn(async move {
            if let Err(error) = handle_client(stream, peers).await {
                debug!("dropped a connection from {}: {}", remote_address, error);
            }
        });
    }
}
