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

//! Wire types of the polling API and the extraction of usable observations.
//!
//! Raw poll records are noisy and partial, so every wire field is optional.
//! [`observe`] reduces one record to a [`PollObservation`] or a
//! [`SkipReason`]; a skip is a diagnostic, never an error.

use serde::Deserialize;

/// The sub-population preferred when a question carries several.
const LIKELY_VOTERS: &str = "Likely Voters";

/// A raw poll record as served by the API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Poll {
	pub pollster: Option<String>,
	pub last_updated: Option<String>,
	#[serde(default)]
	pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Question {
	pub topic: Option<String>,
	#[serde(default)]
	pub subpopulations: Vec<Subpopulation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Subpopulation {
	pub name: Option<String>,
	/// The poll's reported sample size.
	pub observations: Option<u32>,
	#[serde(default)]
	pub responses: Vec<Response>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
	pub choice: Option<String>,
	/// Vote share in percent, 0-100.
	pub value: Option<u32>,
}

/// The race being forecast: candidate labels, the poll topic that selects the
/// right question, and the pollster denylist. Nothing about a particular race
/// is hardcoded anywhere else.
#[derive(Debug, Clone)]
pub struct Race {
	pub candidate_a: String,
	pub candidate_b: String,
	pub topic: String,
	/// Pollsters whose polls are never folded in, matched case-insensitively.
	pub excluded_pollsters: Vec<String>,
}

/// A validated observation, immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PollObservation {
	pub a_percent: u32,
	pub b_percent: u32,
	pub sample_size: u32,
	pub pollster: String,
	pub last_updated: String,
}

/// Why a poll was left out of a region's aggregate. Recovered locally by
/// skipping the observation; the run never aborts over any of these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkipReason {
	#[error("missing a vote share for one of the candidates")]
	MissingValue,
	#[error("missing the sample size")]
	MissingSampleSize,
	#[error("no question matches the configured topic")]
	TopicMismatch,
	#[error("several sub-populations and none is `{LIKELY_VOTERS}`")]
	UnresolvedSubpopulation,
	#[error("pollster `{0}` is on the exclusion list")]
	ExcludedPollster(String),
}

/// Reduce one raw poll to a usable observation for the configured race.
pub fn observe(poll: &Poll, race: &Race) -> Result<PollObservation, SkipReason> {
	let pollster = poll.pollster.clone().unwrap_or_default();
	if race.excluded_pollsters.iter().any(|excluded| excluded.eq_ignore_ascii_case(&pollster)) {
		return Err(SkipReason::ExcludedPollster(pollster));
	}

	let question = poll
		.questions
		.iter()
		.find(|question| {
			question
				.topic
				.as_deref()
				.is_some_and(|topic| topic.eq_ignore_ascii_case(&race.topic))
		})
		.ok_or(SkipReason::TopicMismatch)?;

	let subpopulation = resolve_subpopulation(question)?;
	let sample_size = match subpopulation.observations {
		Some(size) if size > 0 => size,
		_ => return Err(SkipReason::MissingSampleSize),
	};

	let (a_percent, b_percent) = candidate_shares(subpopulation, race)?;

	Ok(PollObservation {
		a_percent,
		b_percent,
		sample_size,
		pollster,
		last_updated: poll.last_updated.clone().unwrap_or_default(),
	})
}

/// A single sub-population is taken as-is; among several only a
/// "Likely Voters" one is acceptable.
fn resolve_subpopulation(question: &Question) -> Result<&Subpopulation, SkipReason> {
	match question.subpopulations.as_slice() {
		[] => Err(SkipReason::UnresolvedSubpopulation),
		[single] => Ok(single),
		several => several
			.iter()
			.find(|sub| {
				sub.name.as_deref().is_some_and(|name| name.eq_ignore_ascii_case(LIKELY_VOTERS))
			})
			.ok_or(SkipReason::UnresolvedSubpopulation),
	}
}

/// Pick the two tracked candidates' shares out of the response list. A share
/// that is absent or zero means the record never measured that candidate.
fn candidate_shares(
	subpopulation: &Subpopulation,
	race: &Race,
) -> Result<(u32, u32), SkipReason> {
	let mut a_percent = 0;
	let mut b_percent = 0;
	for response in &subpopulation.responses {
		let (Some(choice), Some(value)) = (response.choice.as_deref(), response.value) else {
			continue;
		};
		if choice.eq_ignore_ascii_case(&race.candidate_a) {
			a_percent = value;
		} else if choice.eq_ignore_ascii_case(&race.candidate_b) {
			b_percent = value;
		}
	}
	if a_percent == 0 || b_percent == 0 {
		return Err(SkipReason::MissingValue);
	}
	Ok((a_percent, b_percent))
}
