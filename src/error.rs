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

/// Fatal conditions. Everything in here aborts the run; a single bad poll or
/// an unreachable data source never lands here, those degrade one region's
/// input only and are handled as [`crate::pollster::SkipReason`] or an empty
/// poll sequence.
#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("Failed to parse log directive: `{0}´")]
	LogParse(#[from] tracing_subscriber::filter::ParseError),
	#[error("I/O error: `{0}`")]
	Io(#[from] std::io::Error),
	#[error("HTTP error: `{0}`")]
	Http(#[from] reqwest::Error),
	#[error("JSON error: `{0}`")]
	Json(#[from] serde_json::Error),
	#[error("{0}")]
	Join(#[from] tokio::task::JoinError),
	#[error("Region `{0}` has no electoral college entry")]
	UnknownRegion(String),
	#[error("Standard deviation must be strictly positive, got `{0}`")]
	NonPositiveStdDev(f64),
	#[error("Invalid parameter: {0}")]
	InvalidParameter(String),
	#[error("Other error: `{0}`")]
	Other(String),
}
