// Copyright 2025 the election-forecaster authors.
// This file is part of election-forecaster.

// election-forecaster is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// election-forecaster is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with election-forecaster.  If not, see <http://www.gnu.org/licenses/>.

//! The Monte Carlo engine.
//!
//! Each trial draws one Bernoulli outcome per region and sums candidate A's
//! electors; regions are independent, no inter-region correlation is modeled
//! (a simplifying assumption, not a bug). Trials are partitioned into
//! near-equal shards across a fixed pool of blocking workers. Workers share
//! only immutable data and a cancellation flag, each owns a privately seeded
//! RNG, and the partial summaries are reduced by elementwise addition once
//! every worker has joined.

use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	time::{SystemTime, UNIX_EPOCH},
};

use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{
	aggregate::StateAggregate,
	college::ElectoralCollege,
	error::Error,
	prelude::LOG_TARGET,
};

/// How many trials a worker runs between looks at the cancellation flag.
const CANCEL_POLL_INTERVAL: u64 = 256;

/// How a region's electors are decided in a trial.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Outcome {
	/// Candidate A takes the region when the uniform draw lands below this
	/// win probability.
	Polled(f64),
	/// No usable polling: the region goes deterministically to the prior
	/// election's winner (`true` = candidate A).
	Fallback(bool),
}

/// One region flattened for simulation: its electors and how they resolve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionOdds {
	electors: u32,
	outcome: Outcome,
}

impl RegionOdds {
	/// A region decided by its aggregated win probability.
	pub fn polled(electors: u32, win_probability_a: f64) -> Self {
		Self { electors, outcome: Outcome::Polled(win_probability_a) }
	}

	/// A region decided by the prior-election fallback.
	pub fn fallback(electors: u32, prior_winner_a: bool) -> Self {
		Self { electors, outcome: Outcome::Fallback(prior_winner_a) }
	}

	/// Flatten the aggregates against the reference table. Fails on any
	/// region the table does not know, before a single trial runs.
	pub fn build(
		aggregates: &[StateAggregate],
		college: &ElectoralCollege,
	) -> Result<Vec<Self>, Error> {
		aggregates
			.iter()
			.map(|agg| {
				let seat = college.seat(agg.region())?;
				Ok(if agg.has_polls() {
					Self::polled(seat.electors, agg.win_probability_a())
				} else {
					Self::fallback(seat.electors, seat.prior_winner_a)
				})
			})
			.collect()
	}
}

/// Reduced result of a batch of trials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrialSummary {
	/// Trials actually run (may undercut the request when cancelled).
	pub trials: u64,
	/// Trials in which candidate A reached the majority threshold.
	pub wins: u64,
	/// Candidate A's electors summed over all trials.
	pub electors: u64,
}

impl TrialSummary {
	/// Elementwise reduction of worker partials.
	pub fn merge(&mut self, other: Self) {
		self.trials += other.trials;
		self.wins += other.wins;
		self.electors += other.electors;
	}
}

/// One complete simulated national outcome: candidate A's elector sum.
fn sample_trial(odds: &[RegionOdds], rng: &mut SmallRng) -> u64 {
	let mut electors = 0u64;
	for region in odds {
		let a_takes_it = match region.outcome {
			Outcome::Polled(p) => rng.random::<f64>() < p,
			Outcome::Fallback(prior_winner_a) => prior_winner_a,
		};
		if a_takes_it {
			electors += region.electors as u64;
		}
	}
	electors
}

/// Run `trials` trials sequentially against one RNG. This is both the
/// per-worker shard body and the sequential cross-check path.
pub fn run_shard(
	trials: u64,
	odds: &[RegionOdds],
	majority: u32,
	rng: &mut SmallRng,
	cancel: &AtomicBool,
) -> TrialSummary {
	let mut summary = TrialSummary::default();
	for trial in 0..trials {
		if trial % CANCEL_POLL_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
			break;
		}
		let electors = sample_trial(odds, rng);
		summary.trials += 1;
		summary.electors += electors;
		if electors >= majority as u64 {
			summary.wins += 1;
		}
	}
	summary
}

/// Sequential execution path, structurally equivalent to [`run`] with one
/// worker.
pub fn run_sequential(
	trials: u64,
	odds: &[RegionOdds],
	majority: u32,
	seed: u64,
	cancel: &AtomicBool,
) -> TrialSummary {
	let mut rng = SmallRng::seed_from_u64(seed);
	run_shard(trials, odds, majority, &mut rng, cancel)
}

/// Parallel execution path: `workers` blocking tasks, each with a private
/// seed, joined and reduced. A cancelled run returns the partial summary
/// accumulated so far.
pub async fn run(
	trials: u64,
	workers: usize,
	odds: Arc<Vec<RegionOdds>>,
	majority: u32,
	cancel: Arc<AtomicBool>,
) -> Result<TrialSummary, Error> {
	let workers = workers.max(1);
	log::debug!(target: LOG_TARGET, "running {trials} trials on {workers} workers");

	// One clock read mixed with distinct per-worker constants: seeds cannot
	// collide across the workers of a run.
	let clock = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap_or_default()
		.as_nanos() as u64;

	let mut handles = Vec::with_capacity(workers);
	for (index, shard) in shard_sizes(trials, workers).into_iter().enumerate() {
		let odds = odds.clone();
		let cancel = cancel.clone();
		let seed = clock ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
		handles.push(tokio::task::spawn_blocking(move || {
			run_sequential(shard, &odds, majority, seed, &cancel)
		}));
	}

	let mut summary = TrialSummary::default();
	for partial in futures::future::join_all(handles).await {
		summary.merge(partial?);
	}
	Ok(summary)
}

/// Split `trials` into `workers` near-equal shards; the remainder is spread
/// over the first shards.
fn shard_sizes(trials: u64, workers: usize) -> Vec<u64> {
	let workers = workers.max(1) as u64;
	let base = trials / workers;
	let remainder = trials % workers;
	(0..workers).map(|i| base + u64::from(i < remainder)).collect()
}
