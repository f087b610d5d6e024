use crate::{
	aggregate::AggregationLimits,
	college::{self, ElectoralCollege},
	error::Error,
	pollster::Race,
	prelude::{DEFAULT_SAMPLE_CAP, DEFAULT_SWING_REGIONS, DEFAULT_TRIALS},
};

/// Configuration of one forecast run. Validated once in `main` and passed by
/// reference into the orchestrator and the engine; nothing reads it from
/// ambient state.
#[derive(Debug, Clone, clap::Parser)]
#[cfg_attr(test, derive(PartialEq))]
pub struct ForecastConfig {
	/// Response label of candidate A, whose win probability is modeled.
	#[clap(long, default_value = "Clinton")]
	pub candidate_a: String,

	/// Response label of candidate B.
	#[clap(long, default_value = "Trump")]
	pub candidate_b: String,

	/// Election year; drives the default poll topic and the prior-outcome
	/// year shown for fallback regions.
	#[clap(long, default_value_t = 2016)]
	pub election_year: i32,

	/// Poll topic filter. Defaults to `<election-year>-president`.
	#[clap(long)]
	pub topic: Option<String>,

	/// Stop folding a region's polls once this many effective samples have
	/// accumulated. 0 means no cap.
	#[clap(long, default_value_t = DEFAULT_SAMPLE_CAP)]
	pub acceptable_size: u32,

	/// Number of Monte Carlo trials to run.
	#[clap(long, default_value_t = DEFAULT_TRIALS)]
	pub trials: u64,

	/// Number of simulation workers. Defaults to the available hardware
	/// parallelism.
	#[clap(long)]
	pub workers: Option<usize>,

	/// Lower bound on a region's standard deviation. 0 means no floor.
	#[clap(long, default_value_t = 0.0, allow_negative_numbers = true)]
	pub min_std_dev: f64,

	/// Regions reported with emphasis. Reporting only, no effect on the
	/// simulation.
	#[clap(long, default_value = DEFAULT_SWING_REGIONS, value_delimiter = ',')]
	pub swing: Vec<String>,

	/// Pollster whose polls are never folded in. Repeatable.
	#[clap(long = "exclude-pollster", default_value = "Rasmussen")]
	pub exclude_pollster: Vec<String>,

	/// Path to a JSON electoral college table replacing the bundled one.
	#[clap(long, env = "COLLEGE_FILE")]
	pub college_file: Option<String>,
}

impl ForecastConfig {
	/// Reject defective parameters before any I/O happens.
	pub fn validated(self) -> Result<Self, Error> {
		if self.trials == 0 {
			return Err(Error::InvalidParameter("trials must be greater than zero".into()));
		}
		if self.workers == Some(0) {
			return Err(Error::InvalidParameter("workers must be greater than zero".into()));
		}
		if !self.min_std_dev.is_finite() || self.min_std_dev < 0.0 {
			return Err(Error::InvalidParameter(format!(
				"min-std-dev must be a non-negative number, got {}",
				self.min_std_dev
			)));
		}
		if !(1583..=9999).contains(&self.election_year) {
			return Err(Error::InvalidParameter(format!(
				"election-year {} is out of range",
				self.election_year
			)));
		}
		if self.candidate_a.trim().is_empty() || self.candidate_b.trim().is_empty() {
			return Err(Error::InvalidParameter("candidate labels must not be empty".into()));
		}
		Ok(self)
	}

	pub fn topic(&self) -> String {
		self.topic
			.clone()
			.unwrap_or_else(|| format!("{}-president", self.election_year))
	}

	pub fn race(&self) -> Race {
		Race {
			candidate_a: self.candidate_a.clone(),
			candidate_b: self.candidate_b.clone(),
			topic: self.topic(),
			excluded_pollsters: self.exclude_pollster.clone(),
		}
	}

	pub fn limits(&self) -> AggregationLimits {
		AggregationLimits { sample_cap: self.acceptable_size, min_std_dev: self.min_std_dev }
	}

	pub fn workers(&self) -> usize {
		self.workers.unwrap_or_else(|| {
			std::thread::available_parallelism().map(usize::from).unwrap_or(1)
		})
	}

	pub fn college(&self) -> Result<ElectoralCollege, Error> {
		college::load_college(self.college_file.as_deref())
	}

	pub fn is_swing(&self, region: &str) -> bool {
		self.swing.iter().any(|swing| swing.eq_ignore_ascii_case(region))
	}
}

/// Configuration of the `college` command.
#[derive(Debug, Clone, clap::Parser)]
#[cfg_attr(test, derive(PartialEq))]
pub struct CollegeConfig {
	/// Path to a JSON electoral college table replacing the bundled one.
	#[clap(long, env = "COLLEGE_FILE")]
	pub college_file: Option<String>,
}
