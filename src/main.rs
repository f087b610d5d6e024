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

//! # Election Forecaster.
//!
//! Estimates the probability distribution of a two-candidate national
//! election from state-level polling: polls are aggregated per region into a
//! normal-approximation win probability, then a parallel Monte Carlo
//! simulation samples national outcomes over the electoral college.
//! See `help` for more information.
//!
//! # Implementation Notes:
//!
//! A failed or unparsable poll retrieval only degrades that one region, which
//! falls back to the prior election's outcome. Interrupting a run (SIGINT /
//! SIGTERM) stops the simulation between trial batches and reports whatever
//! completed.

mod aggregate;
mod client;
mod college;
mod commands;
mod engine;
mod error;
mod pollster;
mod prelude;
mod stats;
mod utils;

use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};

use clap::Parser;
use error::Error;
use futures::future::{BoxFuture, FutureExt};
use tracing_subscriber::EnvFilter;

use crate::{
	client::PollsterClient,
	commands::types::{CollegeConfig, ForecastConfig},
	prelude::{DEFAULT_URI, LOG_TARGET},
};

#[derive(Debug, Clone, Parser)]
#[cfg_attr(test, derive(PartialEq))]
#[clap(author, version, about)]
pub struct Opt {
	/// The base URI(s) of the polling API. Multiple URIs can be
	/// comma-separated for failover.
	/// Example: "http://polls.example.com/api,http://mirror.example.com/api"
	#[clap(long, short, default_value = DEFAULT_URI, env = "URI")]
	pub uri: String,

	#[clap(subcommand)]
	pub command: Command,

	/// Sets a custom logging filter. Syntax is `<target>=<level>`, e.g.
	/// -lelection-forecaster=debug.
	///
	/// Log levels (least to most verbose) are error, warn, info, debug, and
	/// trace. By default, all targets log `info`. The global log level can be
	/// set with `-l<level>`.
	#[clap(long, short, default_value = "info")]
	pub log: String,
}

#[derive(Debug, Clone, Parser)]
#[cfg_attr(test, derive(PartialEq))]
pub enum Command {
	/// Aggregate state polling and simulate the electoral college.
	Forecast(ForecastConfig),
	/// Print the electoral reference table and exit.
	College(CollegeConfig),
}

#[tokio::main]
async fn main() -> Result<(), Error> {
	let Opt { uri, command, log } = Opt::parse();
	let filter = EnvFilter::from_default_env().add_directive(log.parse()?);
	tracing_subscriber::fmt().with_env_filter(filter).init();

	// Flipped by the signal handler; the engine's workers poll it between
	// trial batches.
	let cancel = Arc::new(AtomicBool::new(false));

	let fut = match command {
		Command::College(config) => return commands::college_cmd(config),
		Command::Forecast(config) => {
			let config = config.validated()?;
			let client = PollsterClient::new(&uri)?;
			commands::forecast_cmd(client, config, cancel.clone()).boxed()
		},
	};

	let res = run_command(fut, cancel).await;
	log::debug!(target: LOG_TARGET, "run finished. outcome = {res:?}");
	res
}

#[cfg(target_family = "unix")]
async fn run_command(
	mut fut: BoxFuture<'_, Result<(), Error>>,
	cancel: Arc<AtomicBool>,
) -> Result<(), Error> {
	use tokio::signal::unix::{SignalKind, signal};

	let mut stream_int = signal(SignalKind::interrupt()).map_err(Error::Io)?;
	let mut stream_term = signal(SignalKind::terminate()).map_err(Error::Io)?;

	// On a signal the command is not dropped: the cancellation flag stops the
	// simulation workers between batches and the command reports whatever
	// completed.
	loop {
		tokio::select! {
			_ = stream_int.recv() => {
				log::warn!(target: LOG_TARGET, "received SIGINT, finishing with partial results");
				cancel.store(true, Ordering::SeqCst);
			}
			_ = stream_term.recv() => {
				log::warn!(target: LOG_TARGET, "received SIGTERM, finishing with partial results");
				cancel.store(true, Ordering::SeqCst);
			}
			res = &mut fut => return res,
		}
	}
}

#[cfg(not(unix))]
async fn run_command(
	mut fut: BoxFuture<'_, Result<(), Error>>,
	cancel: Arc<AtomicBool>,
) -> Result<(), Error> {
	use tokio::signal::ctrl_c;

	loop {
		tokio::select! {
			_ = ctrl_c() => {
				log::warn!(target: LOG_TARGET, "interrupted, finishing with partial results");
				cancel.store(true, Ordering::SeqCst);
			},
			res = &mut fut => return res,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cli_forecast_works() {
		let opt = Opt::try_parse_from([
			env!("CARGO_PKG_NAME"),
			"--uri",
			"http://polls.example.com/api",
			"forecast",
			"--trials",
			"5000",
			"--workers",
			"2",
			"--min-std-dev",
			"0.03",
		])
		.unwrap();

		assert_eq!(opt.uri, "http://polls.example.com/api".to_string());
		assert_eq!(opt.log, "info".to_string());
		let Command::Forecast(config) = opt.command else {
			panic!("expected the forecast command");
		};
		assert_eq!(config.trials, 5000);
		assert_eq!(config.workers, Some(2));
		assert_eq!(config.min_std_dev, 0.03);
		// Defaults.
		assert_eq!(config.candidate_a, "Clinton".to_string());
		assert_eq!(config.candidate_b, "Trump".to_string());
		assert_eq!(config.election_year, 2016);
		assert_eq!(config.acceptable_size, 2000);
		assert_eq!(config.college_file, None);
	}

	#[test]
	fn cli_forecast_default_works() {
		let opt = Opt::try_parse_from([env!("CARGO_PKG_NAME"), "forecast"]).unwrap();

		assert_eq!(opt.uri, DEFAULT_URI.to_string());
		let Command::Forecast(config) = opt.command else {
			panic!("expected the forecast command");
		};
		assert_eq!(config.trials, 25_000);
		assert_eq!(config.workers, None);
		assert_eq!(config.min_std_dev, 0.0);
		assert_eq!(
			config.swing,
			vec!["CO", "FL", "IA", "NC", "NH", "NV", "OH", "PA", "VA", "WI"]
				.into_iter()
				.map(str::to_string)
				.collect::<Vec<_>>()
		);
	}

	#[test]
	fn cli_forecast_with_race_overrides_works() {
		let opt = Opt::try_parse_from([
			env!("CARGO_PKG_NAME"),
			"forecast",
			"--candidate-a",
			"Obama",
			"--candidate-b",
			"Romney",
			"--election-year",
			"2012",
			"--exclude-pollster",
			"Rasmussen",
			"--exclude-pollster",
			"Acme Surveys",
		])
		.unwrap();

		let Command::Forecast(config) = opt.command else {
			panic!("expected the forecast command");
		};
		assert_eq!(config.candidate_a, "Obama".to_string());
		assert_eq!(config.candidate_b, "Romney".to_string());
		assert_eq!(config.topic(), "2012-president");
		assert_eq!(
			config.exclude_pollster,
			vec!["Rasmussen".to_string(), "Acme Surveys".to_string()]
		);
	}

	#[test]
	fn cli_college_works() {
		let opt = Opt::try_parse_from([env!("CARGO_PKG_NAME"), "college"]).unwrap();
		assert_eq!(opt.command, Command::College(CollegeConfig { college_file: None }));
	}
}
