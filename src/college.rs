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

//! The electoral reference table: elector counts and prior-election winners.
//!
//! Built once at startup, injected into whatever needs it, never mutated.

use std::{collections::BTreeMap, fs::File, path::Path};

use serde::Deserialize;

use crate::error::Error;

/// One region's constant electoral data.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Seat {
	/// Electors awarded en bloc to the region's winner.
	pub electors: u32,
	/// Whether candidate A's party carried the region in the prior election.
	/// Consulted only for regions with no usable polling.
	pub prior_winner_a: bool,
}

/// Immutable mapping from region identifier to its [`Seat`].
#[derive(Debug, Clone)]
pub struct ElectoralCollege {
	seats: BTreeMap<String, Seat>,
	total_electors: u32,
}

/// The bundled reference table: 2012 apportionment, prior outcome per state,
/// 538 electors across 50 states plus DC.
const DEFAULT_COLLEGE: &[(&str, u32, bool)] = &[
	("AK", 3, false),
	("AL", 9, false),
	("AR", 6, false),
	("AZ", 11, false),
	("CA", 55, true),
	("CO", 9, true),
	("CT", 7, true),
	("DC", 3, true),
	("DE", 3, true),
	("FL", 29, true),
	("GA", 16, false),
	("HI", 4, true),
	("IA", 6, true),
	("ID", 4, false),
	("IL", 20, true),
	("IN", 11, true),
	("KS", 6, false),
	("KY", 8, false),
	("LA", 8, false),
	("MA", 11, true),
	("MD", 10, true),
	("ME", 4, true),
	("MI", 16, true),
	("MN", 10, true),
	("MO", 10, false),
	("MS", 6, false),
	("MT", 3, false),
	("NC", 15, true),
	("ND", 3, false),
	("NE", 5, false),
	("NH", 4, true),
	("NJ", 14, true),
	("NM", 5, true),
	("NV", 6, true),
	("NY", 29, true),
	("OH", 18, true),
	("OK", 7, false),
	("OR", 7, true),
	("PA", 20, true),
	("RI", 4, true),
	("SC", 9, false),
	("SD", 3, false),
	("TN", 11, false),
	("TX", 38, false),
	("UT", 6, false),
	("VA", 13, true),
	("VT", 3, true),
	("WA", 12, true),
	("WI", 10, true),
	("WV", 5, false),
	("WY", 3, false),
];

impl ElectoralCollege {
	/// The bundled map.
	pub fn bundled() -> Self {
		let seats = DEFAULT_COLLEGE
			.iter()
			.map(|&(region, electors, prior_winner_a)| {
				(region.to_string(), Seat { electors, prior_winner_a })
			})
			.collect();
		Self::from_seats(seats)
	}

	/// Build from an explicit seat map. Regions with zero electors are a
	/// configuration defect.
	pub fn try_from_seats(seats: BTreeMap<String, Seat>) -> Result<Self, Error> {
		if seats.is_empty() {
			return Err(Error::InvalidParameter("electoral college table is empty".into()));
		}
		if let Some((region, _)) = seats.iter().find(|(_, seat)| seat.electors == 0) {
			return Err(Error::InvalidParameter(format!(
				"region `{region}` has zero electors"
			)));
		}
		Ok(Self::from_seats(seats))
	}

	fn from_seats(seats: BTreeMap<String, Seat>) -> Self {
		let total_electors = seats.values().map(|seat| seat.electors).sum();
		Self { seats, total_electors }
	}

	/// Load a replacement table from a JSON file shaped as
	/// `{"OH": {"electors": 18, "prior_winner_a": true}, ...}`.
	pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
		let file = File::open(path.as_ref())?;
		let seats: BTreeMap<String, Seat> = serde_json::from_reader(file)?;
		Self::try_from_seats(seats)
	}

	/// Lookup is total: a simulated region missing from the table is a fatal
	/// configuration error.
	pub fn seat(&self, region: &str) -> Result<Seat, Error> {
		self.seats
			.get(region)
			.copied()
			.ok_or_else(|| Error::UnknownRegion(region.to_string()))
	}

	pub fn regions(&self) -> impl Iterator<Item = &str> {
		self.seats.keys().map(String::as_str)
	}

	pub fn entries(&self) -> impl Iterator<Item = (&str, Seat)> {
		self.seats.iter().map(|(region, seat)| (region.as_str(), *seat))
	}

	pub fn len(&self) -> usize {
		self.seats.len()
	}

	pub fn total_electors(&self) -> u32 {
		self.total_electors
	}

	/// Electors needed to win: more than half of the map.
	pub fn majority(&self) -> u32 {
		self.total_electors / 2 + 1
	}
}

/// Resolve the table for a run: a user-supplied JSON file or the bundled map.
pub fn load_college(file: Option<&str>) -> Result<ElectoralCollege, Error> {
	match file {
		Some(path) => ElectoralCollege::from_json_file(path),
		None => Ok(ElectoralCollege::bundled()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bundled_map_covers_the_full_college() {
		let college = ElectoralCollege::bundled();
		assert_eq!(college.len(), 51);
		assert_eq!(college.total_electors(), 538);
		assert_eq!(college.majority(), 270);
	}

	#[test]
	fn seat_lookup_is_total() {
		let college = ElectoralCollege::bundled();
		assert_eq!(college.seat("OH").unwrap(), Seat { electors: 18, prior_winner_a: true });
		assert!(matches!(college.seat("ZZ"), Err(Error::UnknownRegion(r)) if r == "ZZ"));
	}

	#[test]
	fn custom_table_parses_and_validates() {
		let seats: BTreeMap<String, Seat> = serde_json::from_str(
			r#"{"N1": {"electors": 10, "prior_winner_a": true},
			    "N2": {"electors": 8, "prior_winner_a": false}}"#,
		)
		.unwrap();
		let college = ElectoralCollege::try_from_seats(seats).unwrap();
		assert_eq!(college.total_electors(), 18);
		assert_eq!(college.majority(), 10);
	}

	#[test]
	fn zero_elector_regions_are_rejected() {
		let seats: BTreeMap<String, Seat> =
			serde_json::from_str(r#"{"N1": {"electors": 0, "prior_winner_a": true}}"#).unwrap();
		assert!(matches!(
			ElectoralCollege::try_from_seats(seats),
			Err(Error::InvalidParameter(_))
		));
	}
}
