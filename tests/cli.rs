use assert_cmd::cargo::cargo_bin;
use regex::Regex;

#[test]
fn cli_version_works() {
	let crate_name = env!("CARGO_PKG_NAME");
	let output = assert_cmd::Command::new(cargo_bin(crate_name))
		.arg("--version")
		.output()
		.unwrap();

	assert!(output.status.success(), "command returned with non-success exit code");
	let version = String::from_utf8_lossy(&output.stdout).trim().to_owned();

	assert_eq!(version, format!("{} {}", crate_name, env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_help_lists_the_commands() {
	let output = assert_cmd::Command::new(cargo_bin(env!("CARGO_PKG_NAME")))
		.arg("--help")
		.output()
		.unwrap();

	assert!(output.status.success());
	let help = String::from_utf8_lossy(&output.stdout);
	assert!(help.contains("forecast"));
	assert!(help.contains("college"));
}

#[test]
fn cli_college_prints_the_bundled_table() -> anyhow::Result<()> {
	let output = assert_cmd::Command::new(cargo_bin(env!("CARGO_PKG_NAME")))
		.arg("college")
		.output()?;

	assert!(output.status.success());
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("51 regions, 538 electors, majority at 270"));

	// Every line of the table body names a region and its electors.
	let row = Regex::new(r"(?m)^[A-Z]{2}\s+\d+\s+[AB]$")?;
	assert_eq!(row.find_iter(&stdout).count(), 51);
	Ok(())
}

#[test]
fn cli_rejects_zero_trials_before_any_io() {
	let output = assert_cmd::Command::new(cargo_bin(env!("CARGO_PKG_NAME")))
		.args(["forecast", "--trials", "0"])
		.output()
		.unwrap();

	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("trials"), "unexpected stderr: {stderr}");
}
