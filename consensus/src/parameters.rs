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

use crate::error::ConsensusError;
use tracenet_objects::Block;

/// The number of transactions drafted from the memory pool per block.
pub const TRANSACTIONS_PER_BLOCK: usize = 5;

/// The tolerated skew between a received block's timestamp and local time.
pub const MAX_TIMESTAMP_DRIFT_SECS: f64 = 3600.0;

/// The consensus parameters of a single node.
///
/// The difficulty of this network is not retargeted; each node is statically
/// parameterised with its share of the total hash power, and the mining rate
/// follows from it.
#[derive(Clone, Debug)]
pub struct ConsensusParameters {
    /// This node's share of the network hash power, as a percentage.
    hash_power: f64,
    /// The network-wide target block interval in seconds.
    interarrival: f64,
    /// The number of transactions drafted per candidate block.
    pub max_transactions_per_block: usize,
    /// The tolerated clock skew for received blocks, in seconds.
    pub max_timestamp_drift: f64,
}

impl ConsensusParameters {
    /// Creates a new set of consensus parameters.
    ///
    /// Fails if `hash_power` is outside `(0, 100]` or `interarrival` is not
    /// positive; these are the only fatal configuration checks in the core.
    pub fn new(hash_power: f64, interarrival: f64) -> Result<Self, ConsensusError> {
        if !(hash_power > 0.0 && hash_power <= 100.0) {
            return Err(ConsensusError::InvalidHashPower(hash_power));
        }
        if !(interarrival > 0.0) {
            return Err(ConsensusError::InvalidInterarrival(interarrival));
        }

        Ok(Self {
            hash_power,
            interarrival,
            max_transactions_per_block: TRANSACTIONS_PER_BLOCK,
            max_timestamp_drift: MAX_TIMESTAMP_DRIFT_SECS,
        })
    }

    pub fn hash_power(&self) -> f64 {
        self.hash_power
    }

    pub fn interarrival(&self) -> f64 {
        self.interarrival
    }

    /// The network-wide block-finding rate, `1 / interarrival`.
    pub fn mean_block_rate(&self) -> f64 {
        1.0 / self.interarrival
    }

    /// This node's Poisson block-finding rate.
    pub fn lambda(&self) -> f64 {
        self.hash_power * self.mean_block_rate() / 100.0
    }

    /// The expected waiting time until this node finds a block, `1 / lambda`.
    pub fn expected_wait(&self) -> f64 {
        1.0 / self.lambda()
    }

    /// Checks the stateless admission criteria for a received block: the
    /// timestamp must lie within the tolerated skew (inclusive) and every
    /// contained transaction must verify under its stated public key.
    ///
    /// Linkage against the chain tip and the block index is the engine's
    /// responsibility; it requires state this type does not hold.
    pub fn verify_block(&self, block: &Block, now: f64) -> Result<(), ConsensusError> {
        if (block.timestamp - now).abs() > self.max_timestamp_drift {
            return Err(ConsensusError::TimestampOutOfRange {
                timestamp: block.timestamp,
                now,
                tolerance: self.max_timestamp_drift,
            });
        }

        for tx in &block.transactions {
            if !tx.verify() {
                return Err(ConsensusError::InvalidTransactionSignature(tx.txid.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_hash_power() {
        assert!(ConsensusParameters::new(0.0, 15.0).is_err());
        assert!(ConsensusParameters::new(-5.0, 15.0).is_err());
        assert!(ConsensusParameters::new(100.1, 15.0).is_err());
        assert!(ConsensusParameters::new(100.0, 15.0).is_ok());
    }

    #[test]
    fn rejects_non_positive_interarrival() {
        assert!(ConsensusParameters::new(20.0, 0.0).is_err());
        assert!(ConsensusParameters::new(20.0, -1.0).is_err());
    }

    #[test]
    fn lambda_arithmetic() {
        // hash_power = 20%, interarrival = 15s.
        let parameters = ConsensusParameters::new(20.0, 15.0).unwrap();
        assert!((parameters.lambda() - 20.0 * (1.0 / 15.0) / 100.0).abs() < 1e-12);
        assert!((parameters.expected_wait() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn lambda_is_monotonic_in_hash_power() {
        let interarrival = 15.0;
        let mut previous = 0.0;
        for hash_power in &[1.0, 5.0, 20.0, 50.0, 100.0] {
            let lambda = ConsensusParameters::new(*hash_power, interarrival)
                .unwrap()
                .lambda();
            assert!(lambda > previous);
            previous = lambda;
        }
    }
}
