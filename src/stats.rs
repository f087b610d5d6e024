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

//! Normal-approximation probabilities built on Winitzki's closed-form
//! approximation of the Gauss error function.
//!
//! Sergei Winitzki, "A handy approximation for the error function and its
//! inverse". The maximum absolute error is below 2e-4 over the whole real
//! line, comfortably inside the 1e-3 the win-probability model needs.

use crate::error::Error;

const WINITZKI_A: f64 = 0.14;

/// The Gauss error function.
///
/// Odd by construction: the approximation is evaluated on `x²` and the sign of
/// `x` is applied to the result, so `erf(-x) == -erf(x)` holds exactly.
pub fn erf(x: f64) -> f64 {
	let x2 = x * x;
	let val = (1.0 -
		(-x2 * (4.0 / std::f64::consts::PI + WINITZKI_A * x2) / (1.0 + WINITZKI_A * x2))
			.exp())
	.sqrt();
	if x >= 0.0 { val } else { -val }
}

/// Probability that a normally-distributed variable with the given `mean` and
/// `std_dev` is less than or equal to `x`. Monotonically non-decreasing in `x`.
///
/// A non-positive `std_dev` is a programming error, not a data problem, and
/// aborts the run rather than producing a silently wrong probability.
pub fn cdf(x: f64, mean: f64, std_dev: f64) -> Result<f64, Error> {
	if std_dev <= 0.0 {
		return Err(Error::NonPositiveStdDev(std_dev));
	}
	Ok(0.5 * (1.0 + erf((x - mean) / (std_dev * std::f64::consts::SQRT_2))))
}

/// Probability mass above `x`: `1 - cdf(x, mean, std_dev)`.
pub fn upper_tail(x: f64, mean: f64, std_dev: f64) -> Result<f64, Error> {
	cdf(x, mean, std_dev).map(|p| 1.0 - p)
}

#[cfg(test)]
mod tests {
	use super::*;

	const TOL: f64 = 1e-12;

	fn assert_close(found: f64, expected: f64, tol: f64) {
		assert!(
			(found - expected).abs() <= tol,
			"found {found}, expected {expected} (tol {tol})"
		);
	}

	#[test]
	fn erf_matches_reference_values() {
		// Reference values of the Winitzki approximation itself.
		assert_close(erf(3.0), 0.999979214581871, TOL);
		assert_close(erf(-3.0), -0.999979214581871, TOL);
	}

	#[test]
	fn erf_is_odd() {
		for x in [0.0, 0.137, 0.5, 1.0, 2.25, 4.9] {
			assert_eq!(erf(-x), -erf(x));
		}
	}

	#[test]
	fn erf_tracks_the_true_error_function() {
		// Spot checks against high-precision erf values; the approximation is
		// specified to stay within 1e-3 absolute error.
		for (x, expected) in [
			(0.5, 0.5204998778),
			(1.0, 0.8427007929),
			(1.5, 0.9661051465),
			(2.0, 0.9953222650),
		] {
			assert_close(erf(x), expected, 1e-3);
		}
	}

	#[test]
	fn cdf_matches_reference_values() {
		assert_close(cdf(1.0, 0.0, 1.0).unwrap(), 0.841384034263321, TOL);
		assert_close(cdf(40.0, 47.0, 10.0).unwrap(), 0.24195429670945612, TOL);
		assert_close(cdf(12.0, 10.0, 2.5).unwrap(), 0.7881610565888237, TOL);
	}

	#[test]
	fn cdf_at_the_mean_is_one_half() {
		for (mean, std_dev) in [(0.0, 1.0), (0.52, 0.0158), (-3.0, 12.5)] {
			assert_close(cdf(mean, mean, std_dev).unwrap(), 0.5, 1e-6);
		}
	}

	#[test]
	fn cdf_is_monotone_in_x() {
		let mut prev = 0.0;
		let mut x = -5.0;
		while x <= 5.0 {
			let p = cdf(x, 0.3, 1.7).unwrap();
			assert!(p >= prev, "cdf decreased at x={x}");
			prev = p;
			x += 0.01;
		}
	}

	#[test]
	fn upper_tail_complements_cdf() {
		for x in [-2.0, 0.0, 0.5, 3.3] {
			let lower = cdf(x, 0.5, 0.25).unwrap();
			let upper = upper_tail(x, 0.5, 0.25).unwrap();
			assert_close(lower + upper, 1.0, TOL);
		}
	}

	#[test]
	fn non_positive_std_dev_is_rejected() {
		assert!(matches!(cdf(0.5, 0.5, 0.0), Err(Error::NonPositiveStdDev(_))));
		assert!(matches!(upper_tail(0.5, 0.5, -1.0), Err(Error::NonPositiveStdDev(_))));
	}
}
