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

use tracenet::Config;
use tracenet_consensus::{ConsensusParameters, MemoryPool, MiningTimer};
use tracenet_network::{Environment, Node};
use tracenet_storage::Ledger;

use anyhow::Result;
use clap::{App, Arg};
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::time::Duration;

fn parse_arguments() -> clap::ArgMatches<'static> {
    App::new("tracenet")
        .version("1.2.0")
        .about("A permissioned proof-of-work ledger for supply-chain provenance")
        .arg(
            Arg::with_name("config")
                .long("config")
                .value_name("FILE")
                .help("Path to a TOML configuration file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("host")
                .long("host")
                .value_name("HOST")
                .help("The ip address this node listens on")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("port")
                .long("port")
                .short("p")
                .value_name("PORT")
                .help("The port this node listens on")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .value_name("HOST:PORT")
                .help("A bootstrap seed endpoint (repeatable)")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("hash-power")
                .long("hash-power")
                .value_name("PERCENT")
                .help("This node's share of the network hash power, in (0, 100]")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("interarrival")
                .long("interarrival")
                .value_name("SECONDS")
                .help("The network-wide target block interval")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("seed-tx-count")
                .long("seed-tx-count")
                .value_name("COUNT")
                .help("The number of local transactions injected at startup")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("tx-gen-interval")
                .long("tx-gen-interval")
                .value_name("SECONDS")
                .help("The period of the local transaction generator")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("mempool-capacity")
                .long("mempool-capacity")
                .value_name("COUNT")
                .help("The capacity of the memory pool")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("path")
                .long("path")
                .value_name("FILE")
                .help("The chain store path")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .short("v")
                .multiple(true)
                .help("Increases the log verbosity"),
        )
        .get_matches()
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = parse_arguments();
    let config = Config::load(&matches)?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Configuration errors are the only fatal ones; everything past this
    // point recovers locally.
    let consensus = ConsensusParameters::new(config.hash_power, config.interarrival)?;
    let miner = MiningTimer::new(&consensus);
    let ledger = Ledger::open(config.ledger_path());
    let memory_pool = MemoryPool::new(config.mempool_capacity);
    let environment = Environment::new(
        config.local_address()?,
        config.seed_addresses()?,
        config.seed_tx_count,
        Duration::from_secs(config.tx_gen_interval),
    );

    let node = Node::new(environment, consensus, miner, ledger, memory_pool);
    node.start().await?;

    loop {
        tokio::time::sleep(Duration::from_secs(5)).await;
        info!(
            "chain height={} mempool={} pending={}",
            node.ledger().height(),
            node.memory_pool().lock().size(),
            node.blocks().pending_len()
        );
    }
}
