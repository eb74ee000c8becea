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

use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use serde::Deserialize;

use std::{fs, net::SocketAddr, path::PathBuf};

/// The per-node configuration, loadable from a TOML file with command-line
/// flags taking precedence.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The address this node listens on.
    pub host: String,
    pub port: u16,
    /// The bootstrap seeds, as `host:port` endpoints.
    pub seeds: Vec<String>,
    /// This node's share of the network hash power, in (0, 100].
    pub hash_power: f64,
    /// The network-wide target block interval in seconds.
    pub interarrival: f64,
    /// The number of local transactions injected at startup.
    pub seed_tx_count: usize,
    /// The period of the local transaction generator, in seconds.
    pub tx_gen_interval: u64,
    /// The capacity of the memory pool.
    pub mempool_capacity: usize,
    /// The chain store; defaults to a per-port file in the working
    /// directory.
    pub db_path: Option<String>,
    /// Log verbosity: 0 = warn, 1 = info, 2 = debug, 3+ = trace.
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9001,
            seeds: vec!["127.0.0.1:8000".to_string()],
            hash_power: 20.0,
            interarrival: 15.0,
            seed_tx_count: 5,
            tx_gen_interval: 20,
            mempool_capacity: tracenet_consensus::DEFAULT_MEMORY_POOL_CAPACITY,
            db_path: None,
            verbosity: 1,
        }
    }
}

impl Config {
    /// Builds the configuration from an optional TOML file plus flags.
    pub fn load(matches: &ArgMatches<'_>) -> Result<Self> {
        let mut config = match matches.value_of("config") {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("could not read the config file {}", path))?;
                toml::from_str(&raw)
                    .with_context(|| format!("could not parse the config file {}", path))?
            }
            None => Self::default(),
        };

        if let Some(host) = matches.value_of("host") {
            config.host = host.to_string();
        }
        if let Some(port) = matches.value_of("port") {
            config.port = port.parse().context("invalid --port")?;
        }
        if matches.occurrences_of("seed") > 0 {
            config.seeds = matches
                .values_of("seed")
                .map(|values| values.map(str::to_string).collect())
                .unwrap_or_default();
        }
        if let Some(hash_power) = matches.value_of("hash-power") {
            config.hash_power = hash_power.parse().context("invalid --hash-power")?;
        }
        if let Some(interarrival) = matches.value_of("interarrival") {
            config.interarrival = interarrival.parse().context("invalid --interarrival")?;
        }
        if let Some(count) = matches.value_of("seed-tx-count") {
            config.seed_tx_count = count.parse().context("invalid --seed-tx-count")?;
        }
        if let Some(interval) = matches.value_of("tx-gen-interval") {
            config.tx_gen_interval = interval.parse().context("invalid --tx-gen-interval")?;
        }
        if let Some(capacity) = matches.value_of("mempool-capacity") {
            config.mempool_capacity = capacity.parse().context("invalid --mempool-capacity")?;
        }
        if let Some(path) = matches.value_of("path") {
            config.db_path = Some(path.to_string());
        }
        if matches.occurrences_of("verbose") > 0 {
            config.verbosity = matches.occurrences_of("verbose") as u8;
        }

        Ok(config)
    }

    /// The listener address of this node.
    pub fn local_address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| anyhow!("invalid host/port: {}:{}", self.host, self.port))
    }

    /// The parsed seed endpoints; invalid entries are fatal at boot.
    pub fn seed_addresses(&self) -> Result<Vec<SocketAddr>> {
        self.seeds
            .iter()
            .map(|seed| {
                seed.parse()
                    .map_err(|_| anyhow!("invalid seed endpoint: {}", seed))
            })
            .collect()
    }

    /// Where the chain is persisted.
    pub fn ledger_path(&self) -> PathBuf {
        match &self.db_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(format!("tracenet_chain_{}.json", self.port)),
        }
    }

    /// The env-filter directive matching the configured verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
