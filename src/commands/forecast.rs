//! The forecast orchestrator: fan out one fetch-and-aggregate task per
//! region, join, report the per-region picture, then hand the flattened
//! probabilities to the Monte Carlo engine and summarize.

use std::sync::{Arc, atomic::AtomicBool};

use chrono::{Datelike, NaiveDate, Utc};

use crate::{
	aggregate::{AggregationLimits, StateAggregate},
	client::PollsterClient,
	college::ElectoralCollege,
	commands::types::ForecastConfig,
	engine::{self, RegionOdds, TrialSummary},
	error::Error,
	pollster::{Race, observe},
	prelude::{LOG_TARGET, Region},
	utils::TimedFuture,
};

/// Run a full forecast with the given configuration.
pub async fn forecast_cmd(
	client: PollsterClient,
	config: ForecastConfig,
	cancel: Arc<AtomicBool>,
) -> Result<(), Error> {
	let college = Arc::new(config.college()?);
	let race = Arc::new(config.race());
	log_parameters(&config, &college);

	println!("Election {} Monte Carlo simulation", config.election_year);
	println!(
		"There are {} days until the election.\n",
		days_until_election(config.election_year)
	);

	// Stage one: every region's retrieval and aggregation is independent of
	// every other region's, so they all run as parallel tasks and join here.
	let limits = config.limits();
	let mut tasks = Vec::with_capacity(college.len());
	for region in college.regions() {
		let client = client.clone();
		let race = race.clone();
		let region = region.to_string();
		tasks.push(tokio::spawn(
			async move { load_region(&client, &race, limits, region).await },
		));
	}

	let (joined, elapsed) = futures::future::join_all(tasks).timed().await;
	let mut aggregates = Vec::with_capacity(joined.len());
	for task in joined {
		aggregates.push(task??);
	}
	// Task completion order is arbitrary; reports should not be.
	aggregates.sort_by(|a, b| a.region().cmp(b.region()));
	log::info!(
		target: LOG_TARGET,
		"collected polling for {} regions in {elapsed:.2?}",
		aggregates.len()
	);

	report_regions(&aggregates, &college, &config)?;

	// Stage two: the aggregates and the table are immutable from here on;
	// the engine shares them across its workers without locks.
	let odds = Arc::new(RegionOdds::build(&aggregates, &college)?);
	let (summary, elapsed) = engine::run(
		config.trials,
		config.workers(),
		odds,
		college.majority(),
		cancel,
	)
	.timed()
	.await;
	let summary = summary?;
	log::info!(target: LOG_TARGET, "ran {} trials in {elapsed:.2?}", summary.trials);

	if summary.trials < config.trials {
		log::warn!(
			target: LOG_TARGET,
			"run was cancelled: {} of {} trials completed",
			summary.trials,
			config.trials
		);
	}

	report_summary(&summary, &college, &config);
	Ok(())
}

/// Fetch one region's polls and fold the qualifying ones, most recent first.
async fn load_region(
	client: &PollsterClient,
	race: &Race,
	limits: AggregationLimits,
	region: Region,
) -> Result<StateAggregate, Error> {
	let polls = client.fetch_polls(&race.topic, &region).await;
	log::debug!(target: LOG_TARGET, "found {} polls in {region}", polls.len());

	let mut aggregate = StateAggregate::new(region, limits);
	for poll in &polls {
		if aggregate.is_frozen() {
			break;
		}
		match observe(poll, race) {
			Ok(obs) => {
				log::debug!(
					target: LOG_TARGET,
					"{}: adding {} {:.10}: {}({}), {}({}), size {}",
					aggregate.region(),
					obs.pollster,
					obs.last_updated,
					race.candidate_a,
					obs.a_percent,
					race.candidate_b,
					obs.b_percent,
					obs.sample_size
				);
				aggregate.update(obs.a_percent, obs.b_percent, obs.sample_size)?;
			},
			Err(skip) => {
				log::debug!(target: LOG_TARGET, "{}: skipping poll: {skip}", aggregate.region());
			},
		}
	}

	if aggregate.has_polls() {
		log::info!(
			target: LOG_TARGET,
			"{}: polling mean={:.4}, n={}, std-dev={:.4} -> Pr({})={:.4}",
			aggregate.region(),
			aggregate.mean_a(),
			aggregate.n() as u64,
			aggregate.std_dev(),
			race.candidate_a,
			aggregate.win_probability_a()
		);
	} else {
		log::info!(
			target: LOG_TARGET,
			"{}: no usable polls, falling back to the prior election outcome",
			aggregate.region()
		);
	}
	Ok(aggregate)
}

fn log_parameters(config: &ForecastConfig, college: &ElectoralCollege) {
	log::info!(target: LOG_TARGET, "Simulation parameters:");
	log::info!(
		target: LOG_TARGET,
		"  {} vs {}, topic `{}`",
		config.candidate_a,
		config.candidate_b,
		config.topic()
	);
	log::info!(
		target: LOG_TARGET,
		"  college: {} regions, {} electors, majority at {}",
		college.len(),
		college.total_electors(),
		college.majority()
	);
	log::info!(
		target: LOG_TARGET,
		"  stop adding polls past {} samples (0 = no cap)",
		config.acceptable_size
	);
	log::info!(
		target: LOG_TARGET,
		"  {} trials on {} workers, std-dev floor {} (0 = no floor)",
		config.trials,
		config.workers(),
		config.min_std_dev
	);
}

/// Per-region reporting: swing regions get a line each, fallback regions an
/// explicit note naming the year whose outcome decided them.
fn report_regions(
	aggregates: &[StateAggregate],
	college: &ElectoralCollege,
	config: &ForecastConfig,
) -> Result<(), Error> {
	let prior_year = config.election_year - 4;
	let mut without_polls = 0usize;

	println!("Swing regions:");
	for aggregate in aggregates {
		let swing = config.is_swing(aggregate.region());
		if aggregate.has_polls() {
			if swing {
				println!(
					"  Probability of {} winning {}: {:.2}%",
					config.candidate_a,
					aggregate.region(),
					100.0 * aggregate.win_probability_a()
				);
			}
		} else {
			without_polls += 1;
			if swing {
				let seat = college.seat(aggregate.region())?;
				let beneficiary = if seat.prior_winner_a {
					&config.candidate_a
				} else {
					&config.candidate_b
				};
				println!(
					"  {} has no polls yet; assigned to {} based on the {} outcome.",
					aggregate.region(),
					beneficiary,
					prior_year
				);
			}
		}
	}
	println!(
		"{} of {} regions have no usable polls and were assigned their {} outcome.",
		without_polls,
		aggregates.len(),
		prior_year
	);
	Ok(())
}

/// National summary: win probabilities and expected elector counts. The two
/// elector counts always sum to the college total.
fn report_summary(summary: &TrialSummary, college: &ElectoralCollege, config: &ForecastConfig) {
	let trials = summary.trials.max(1) as f64;
	let win_probability = 100.0 * summary.wins as f64 / trials;
	let average_electors = (summary.electors as f64 / trials).round() as u64;

	println!();
	println!("{} win probability: {:.2}%", config.candidate_a, win_probability);
	println!("{} win probability: {:.2}%", config.candidate_b, 100.0 - win_probability);
	println!("Average electoral votes for {}: {}", config.candidate_a, average_electors);
	println!(
		"Average electoral votes for {}: {}",
		config.candidate_b,
		college.total_electors() as u64 - average_electors
	);
}

/// US election day: the first Tuesday after the first Monday of November.
fn election_day(year: i32) -> NaiveDate {
	let first = NaiveDate::from_ymd_opt(year, 11, 1)
		.expect("November 1st exists in every validated year; qed");
	let days_to_monday = (7 - first.weekday().num_days_from_monday()) % 7;
	first + chrono::Days::new(days_to_monday as u64 + 1)
}

fn days_until_election(year: i32) -> i64 {
	(election_day(year) - Utc::now().date_naive()).num_days()
}
