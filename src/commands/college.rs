//! Print the electoral reference table in use and exit.

use crate::{college, commands::types::CollegeConfig, error::Error};

pub fn college_cmd(config: CollegeConfig) -> Result<(), Error> {
	let college = college::load_college(config.college_file.as_deref())?;

	println!("{:<8} {:>8}  prior winner", "region", "electors");
	for (region, seat) in college.entries() {
		println!(
			"{:<8} {:>8}  {}",
			region,
			seat.electors,
			if seat.prior_winner_a { "A" } else { "B" }
		);
	}
	println!(
		"{} regions, {} electors, majority at {}",
		college.len(),
		college.total_electors(),
		college.majority()
	);
	Ok(())
}
