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

//! Per-region poll aggregation.
//!
//! A [`StateAggregate`] folds a most-recent-first stream of qualifying poll
//! observations into a running two-candidate vote total and derives the
//! normal-approximation win probability after each fold. Once the effective
//! sample count reaches the configured cap the aggregate freezes, so older
//! polls silently drop out. That is an implicit recency weighting; whether it
//! was ever a deliberate design choice is unclear, but it is kept as-is.

use crate::{error::Error, prelude::Region, stats};

/// Knobs of the aggregation model, validated once and copied into every
/// aggregate.
#[derive(Debug, Clone, Copy)]
pub struct AggregationLimits {
	/// Stop folding polls once this many effective samples have accumulated.
	/// Zero means no cap.
	pub sample_cap: u32,
	/// Lower bound on the standard error. As polls accumulate the naive
	/// standard error shrinks toward zero and win probabilities become
	/// artificially overconfident; the floor bounds that. Zero means no floor.
	pub min_std_dev: f64,
}

/// Running two-candidate vote totals for one region and the derived
/// probability model.
///
/// Invariants: `n >= 0`; `0 < mean_a < 1` and `std_dev > 0` whenever `n > 0`
/// (an update only counts when both candidates contribute at least one vote);
/// `0 <= win_probability_a <= 1`.
#[derive(Debug, Clone)]
pub struct StateAggregate {
	region: Region,
	limits: AggregationLimits,
	votes_a: f64,
	votes_b: f64,
	n: f64,
	mean_a: f64,
	std_dev: f64,
	win_probability_a: f64,
	frozen: bool,
}

impl StateAggregate {
	/// An empty aggregate for `region`. `n` is zero until the first update.
	pub fn new(region: Region, limits: AggregationLimits) -> Self {
		Self {
			region,
			limits,
			votes_a: 0.0,
			votes_b: 0.0,
			n: 0.0,
			mean_a: 0.0,
			std_dev: 0.0,
			win_probability_a: 0.0,
			frozen: false,
		}
	}

	/// Fold one poll into the running totals.
	///
	/// The reported percentages are converted to counted votes by truncation,
	/// `floor(pct * size / 100)`, which deliberately discards undecided and
	/// third-party respondents: the poll is reduced to a head-to-head between
	/// the two tracked candidates and the effective sample size shrinks
	/// accordingly, widening the uncertainty as it should.
	///
	/// Returns `Ok(true)` if the poll was folded in, `Ok(false)` if the
	/// aggregate is frozen or the poll carries no effective two-party sample.
	pub fn update(
		&mut self,
		a_percent: u32,
		b_percent: u32,
		sample_size: u32,
	) -> Result<bool, Error> {
		let delta_a = (a_percent as f64 * sample_size as f64 / 100.0).floor();
		let delta_b = (b_percent as f64 * sample_size as f64 / 100.0).floor();

		// A side with zero counted votes would degenerate the variance to
		// zero; such a poll carries no usable head-to-head signal.
		if delta_a == 0.0 || delta_b == 0.0 {
			return Ok(false);
		}

		let cap = self.limits.sample_cap as f64;
		if self.frozen {
			return Ok(false);
		}
		// Freeze instead of crossing the cap. The first poll is exempt so a
		// single oversized poll still yields an estimate.
		if self.limits.sample_cap != 0 && self.n > 0.0 && self.n + delta_a + delta_b > cap {
			self.frozen = true;
			return Ok(false);
		}

		self.votes_a += delta_a;
		self.votes_b += delta_b;
		self.n = self.votes_a + self.votes_b;

		self.mean_a = self.votes_a / self.n;
		let raw = (self.mean_a * (1.0 - self.mean_a) / self.n).sqrt();
		self.std_dev = if self.limits.min_std_dev > 0.0 && raw < self.limits.min_std_dev {
			self.limits.min_std_dev
		} else {
			raw
		};
		self.win_probability_a = stats::upper_tail(0.5, self.mean_a, self.std_dev)?;

		if self.limits.sample_cap != 0 && self.n > cap {
			self.frozen = true;
		}
		Ok(true)
	}

	pub fn region(&self) -> &str {
		&self.region
	}

	/// Effective sample count accumulated so far.
	pub fn n(&self) -> f64 {
		self.n
	}

	/// Whether any usable polling was folded in. A region without polls is
	/// resolved by the prior-election fallback instead of this model.
	pub fn has_polls(&self) -> bool {
		self.n > 0.0
	}

	pub fn mean_a(&self) -> f64 {
		self.mean_a
	}

	pub fn std_dev(&self) -> f64 {
		self.std_dev
	}

	/// Upper-tail probability that candidate A's true support exceeds 50%.
	pub fn win_probability_a(&self) -> f64 {
		self.win_probability_a
	}

	/// Once frozen, further updates are no-ops for the rest of the run.
	pub fn is_frozen(&self) -> bool {
		self.frozen
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const NO_LIMITS: AggregationLimits = AggregationLimits { sample_cap: 0, min_std_dev: 0.0 };

	fn aggregate(limits: AggregationLimits) -> StateAggregate {
		StateAggregate::new("OH".to_string(), limits)
	}

	#[test]
	fn single_poll_yields_the_expected_model() {
		let mut agg = aggregate(NO_LIMITS);
		assert!(agg.update(52, 48, 1000).unwrap());

		assert_eq!(agg.n(), 1000.0);
		assert_eq!(agg.mean_a(), 0.52);
		assert!((agg.std_dev() - 0.01579).abs() < 1e-4);
		// upper_tail(0.5, 0.52, 0.0158) is roughly 0.90, bounded by the erf
		// approximation error.
		assert!((agg.win_probability_a() - 0.90).abs() < 1e-2);
	}

	#[test]
	fn truncation_discards_partial_votes() {
		let mut agg = aggregate(NO_LIMITS);
		// 47% of 850 = 399.5 and 45% of 850 = 382.5; both truncate.
		assert!(agg.update(47, 45, 850).unwrap());
		assert_eq!(agg.n(), 399.0 + 382.0);
	}

	#[test]
	fn one_sided_poll_is_not_counted() {
		let mut agg = aggregate(NO_LIMITS);
		// 1% of 50 truncates to zero votes for B.
		assert!(!agg.update(52, 1, 50).unwrap());
		assert_eq!(agg.n(), 0.0);
		assert!(!agg.has_polls());
	}

	#[test]
	fn aggregate_freezes_at_the_sample_cap() {
		let mut agg = aggregate(AggregationLimits { sample_cap: 100, min_std_dev: 0.0 });
		assert!(agg.update(52, 48, 80).unwrap());
		let n_after_first = agg.n();

		// The second poll would push past the cap, so it is dropped and the
		// aggregate freezes.
		assert!(!agg.update(52, 48, 80).unwrap());
		assert!(agg.is_frozen());
		assert_eq!(agg.n(), n_after_first);

		// Frozen means frozen, even for a tiny poll that would still fit.
		assert!(!agg.update(50, 50, 2).unwrap());
		assert_eq!(agg.n(), n_after_first);
	}

	#[test]
	fn an_oversized_first_poll_is_still_used() {
		let mut agg = aggregate(AggregationLimits { sample_cap: 100, min_std_dev: 0.0 });
		assert!(agg.update(52, 48, 3000).unwrap());
		assert!(agg.n() > 100.0);
		assert!(agg.is_frozen());
	}

	#[test]
	fn zero_cap_never_freezes() {
		let mut agg = aggregate(NO_LIMITS);
		for _ in 0..50 {
			assert!(agg.update(52, 48, 1000).unwrap());
		}
		assert!(!agg.is_frozen());
		assert_eq!(agg.n(), 50.0 * 1000.0);
	}

	#[test]
	fn std_dev_floor_clamps_the_standard_error() {
		let mut agg = aggregate(AggregationLimits { sample_cap: 0, min_std_dev: 0.05 });
		agg.update(52, 48, 10_000).unwrap();
		// The raw standard error for N=10000 is ~0.005, well below the floor.
		assert_eq!(agg.std_dev(), 0.05);

		let mut unfloored = aggregate(NO_LIMITS);
		unfloored.update(52, 48, 10_000).unwrap();
		assert!(unfloored.win_probability_a() > agg.win_probability_a());
	}

	#[test]
	fn accumulation_pools_polls() {
		let mut agg = aggregate(NO_LIMITS);
		agg.update(60, 40, 100).unwrap();
		agg.update(40, 60, 100).unwrap();
		assert_eq!(agg.n(), 200.0);
		assert_eq!(agg.mean_a(), 0.5);
		// Dead heat: the win probability sits at one half.
		assert!((agg.win_probability_a() - 0.5).abs() < 1e-9);
	}
}
