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

//! HTTP retrieval of poll records.
//!
//! The retrieval contract is deliberately soft: a region whose polls cannot
//! be fetched or parsed yields an empty sequence plus a diagnostic, never a
//! fatal error — the simulation then resolves that region through the
//! prior-election fallback.

use std::time::Duration;

use serde::Deserialize;

use crate::{error::Error, pollster::Poll, prelude::LOG_TARGET};

/// Timeout for one request before the next endpoint is tried.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Thin wrapper over the polling API. Supports multiple base endpoints with
/// ordered failover; endpoints are given as a comma-separated list.
#[derive(Clone, Debug)]
pub struct PollsterClient {
	http: reqwest::Client,
	endpoints: Vec<String>,
}

/// Failure shape the API serves with a 200 status.
#[derive(Debug, Deserialize)]
struct ApiErrors {
	errors: Vec<String>,
}

impl PollsterClient {
	/// Create a new client from a comma-separated list of base endpoints.
	pub fn new(uris: &str) -> Result<Self, Error> {
		let endpoints: Vec<String> = uris
			.split(',')
			.map(|uri| uri.trim().trim_end_matches('/').to_string())
			.filter(|uri| !uri.is_empty())
			.collect();

		if endpoints.is_empty() {
			return Err(Error::InvalidParameter("no API endpoints provided".into()));
		}
		if endpoints.len() > 1 {
			log::info!(target: LOG_TARGET, "API endpoint pool: {} endpoint(s)", endpoints.len());
		}

		let http = reqwest::Client::builder()
			.timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
			.build()?;

		Ok(Self { http, endpoints })
	}

	/// Fetch `region`'s polls for `topic`, most recent first.
	///
	/// Tries each endpoint in order; when all fail the region is treated as
	/// having no polling data at all.
	pub async fn fetch_polls(&self, topic: &str, region: &str) -> Vec<Poll> {
		let total = self.endpoints.len();
		for (index, endpoint) in self.endpoints.iter().enumerate() {
			match self.try_fetch(endpoint, topic, region).await {
				Ok(polls) => return polls,
				Err(e) => {
					log::warn!(
						target: LOG_TARGET,
						"{region}: endpoint {}/{total} failed: {e}",
						index + 1,
					);
				},
			}
		}
		log::warn!(
			target: LOG_TARGET,
			"{region}: all endpoints failed, treating the region as unpolled"
		);
		Vec::new()
	}

	async fn try_fetch(&self, endpoint: &str, topic: &str, region: &str) -> Result<Vec<Poll>, Error> {
		// `sort=updated` puts the most recent polls first; the aggregation
		// cap depends on that ordering.
		let url = format!("{endpoint}/polls.json?sort=updated&topic={topic}&state={region}");
		log::debug!(target: LOG_TARGET, "GET {url}");
		let body = self.http.get(&url).send().await?.error_for_status()?.text().await?;
		parse_poll_body(&body)
	}
}

/// Decode a response body into poll records.
///
/// The API reports failures as `{"errors": [...]}` under a 200 status; those
/// are logged and flattened into "no polls".
fn parse_poll_body(body: &str) -> Result<Vec<Poll>, Error> {
	match serde_json::from_str::<Vec<Poll>>(body) {
		Ok(polls) => Ok(polls),
		Err(parse_err) => {
			if let Ok(api) = serde_json::from_str::<ApiErrors>(body) {
				for message in &api.errors {
					log::warn!(target: LOG_TARGET, "API error: {message}");
				}
				return Ok(Vec::new());
			}
			Err(parse_err.into())
		},
	}
}
