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

use crate::ConsensusParameters;

use parking_lot::Mutex;
use rand::thread_rng;
use rand_distr::{Distribution, Exp};

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

/// How often the timer checks for an abort while waiting out a round.
pub const ABORT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The outcome of a single mining round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MiningStatus {
    /// The waiting time elapsed; this node found the block.
    Mined,
    /// An abort was observed before the deadline.
    Aborted,
}

impl MiningStatus {
    pub fn is_mined(&self) -> bool {
        matches!(self, MiningStatus::Mined)
    }
}

/// Diagnostics for the most recent round, for test and analysis consumers.
#[derive(Clone, Copy, Debug)]
pub struct MiningRound {
    pub lambda: f64,
    pub tau: f64,
    pub status: Option<MiningStatus>,
}

/// The proof-of-work process of a single node, modelled as an exponential
/// waiting time.
///
/// Each round samples a fresh waiting time `tau ~ Exp(lambda)` with `lambda`
/// proportional to this node's hash-power fraction, then waits it out while
/// polling an abort flag. The race between all nodes' timers is itself a
/// Poisson process, and a node wins a round with probability
/// `lambda_i / sum(lambda)`; an abort encodes the observation that a
/// competitor's block arrived first.
pub struct MiningTimer {
    hash_power: f64,
    lambda: f64,
    abort_flag: AtomicBool,
    last_round: Mutex<Option<MiningRound>>,
    sampler: Box<dyn Fn(f64) -> f64 + Send + Sync>,
}

impl MiningTimer {
    /// Creates a timer drawing waiting times from `Exp(lambda)`.
    pub fn new(parameters: &ConsensusParameters) -> Self {
        // The lambda range is enforced by `ConsensusParameters::new`.
        let exp = Exp::new(parameters.lambda()).expect("lambda is validated at construction");
        Self::with_sampler(parameters, Box::new(move |_| exp.sample(&mut thread_rng())))
    }

    /// Creates a timer with a custom waiting-time sampler. The sampler is
    /// handed the current lambda and must return the round's wait in seconds;
    /// deterministic samplers make the timer testable.
    pub fn with_sampler(
        parameters: &ConsensusParameters,
        sampler: Box<dyn Fn(f64) -> f64 + Send + Sync>,
    ) -> Self {
        Self {
            hash_power: parameters.hash_power(),
            lambda: parameters.lambda(),
            abort_flag: AtomicBool::new(false),
            last_round: Mutex::new(None),
            sampler,
        }
    }

    pub fn hash_power(&self) -> f64 {
        self.hash_power
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Draws one waiting time for the current lambda.
    pub fn sample_wait_time(&self) -> f64 {
        (self.sampler)(self.lambda)
    }

    /// Runs one mining round: IDLE -> ARMED -> {MINED, ABORTED}.
    ///
    /// The abort flag is cleared at round start, never at round end, so an
    /// `abort()` issued between rounds cannot leak into the next one. A
    /// fresh waiting time is drawn on every call.
    pub async fn mine(&self) -> MiningStatus {
        self.abort_flag.store(false, Ordering::SeqCst);

        let tau = self.sample_wait_time();
        *self.last_round.lock() = Some(MiningRound {
            lambda: self.lambda,
            tau,
            status: None,
        });
        debug!(
            "armed the mining timer: lambda={:.6} tau={:.2}s hash_power={}%",
            self.lambda, tau, self.hash_power
        );

        let deadline = Instant::now() + Duration::from_secs_f64(tau);
        let status = loop {
            if self.abort_flag.load(Ordering::SeqCst) {
                break MiningStatus::Aborted;
            }
            let now = Instant::now();
            if now >= deadline {
                break MiningStatus::Mined;
            }
            tokio::time::sleep(ABORT_POLL_INTERVAL.min(deadline - now)).await;
        };

        if let Some(round) = self.last_round.lock().as_mut() {
            round.status = Some(status);
        }
        match status {
            MiningStatus::Mined => debug!("the waiting time elapsed after {:.2}s", tau),
            MiningStatus::Aborted => debug!("the mining round was aborted"),
        }

        status
    }

    /// Signals the current round to stop. Idempotent, safe from any thread,
    /// and harmless when no round is running.
    pub fn abort(&self) {
        self.abort_flag.store(true, Ordering::SeqCst);
    }

    /// The diagnostics of the most recent round, if any was started.
    pub fn last_round(&self) -> Option<MiningRound> {
        *self.last_round.lock()
    }
}
