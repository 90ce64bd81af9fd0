//! JSON Comparison CLI
//!
//! Compares two JSON documents, ignoring key and array element order, and
//! writes every difference to a CSV report.

use anyhow::{bail, Context, Result};
use clap::Parser;
use json_compare::loader::load_pair;
use json_compare::writer::{ensure_csv_extension, write_report, WriteOutcome, DEFAULT_OUTPUT};
use json_compare::{compare, Config};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "json-compare")]
#[command(author = "Fellow <engineering@fellow.app>")]
#[command(version)]
#[command(about = "Report structural differences between two JSON documents", long_about = None)]
struct Args {
	/// First JSON document (prompted for when omitted)
	#[arg(value_name = "FIRST")]
	first: Option<PathBuf>,

	/// Second JSON document (prompted for when omitted)
	#[arg(value_name = "SECOND")]
	second: Option<PathBuf>,

	/// CSV report file; `.csv` is appended when missing
	#[arg(value_name = "OUTPUT")]
	output: Option<String>,

	/// Maximum nesting depth accepted in either document
	#[arg(long, default_value = "256")]
	max_depth: usize,

	/// Do not report fields that only the second document has
	#[arg(long)]
	no_missing_in_first: bool,

	/// Print debug logging and document fingerprints
	#[arg(short, long)]
	verbose: bool,
}

/// Input and output locations after prompting
#[derive(Debug)]
struct Locations {
	first: PathBuf,
	second: PathBuf,
	output: PathBuf,
}

fn main() -> ExitCode {
	let args = Args::parse();
	init_logging(args.verbose);

	match run(args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			eprintln!("Error: {:#}", err);
			ExitCode::FAILURE
		}
	}
}

fn init_logging(verbose: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.init();
}

fn run(args: Args) -> Result<()> {
	let locations = resolve_locations(&args, &mut io::stdin().lock())?;

	let config = Config {
		max_depth: args.max_depth,
		report_missing_in_first: !args.no_missing_in_first,
	};

	let start_time = Instant::now();
	println!(
		"Loading {} and {}...",
		locations.first.display(),
		locations.second.display()
	);
	let (first, second) = load_pair(&locations.first, &locations.second, args.max_depth)?;

	println!("Comparing documents...");
	let report = compare(&first, &second, &config)?;

	if args.verbose {
		println!("First fingerprint:  {}", report.left_fingerprint);
		println!("Second fingerprint: {}", report.right_fingerprint);
	}

	match write_report(&report.differences, &locations.output)? {
		WriteOutcome::NoDifferences => println!("No differences found!"),
		WriteOutcome::Written { rows } => {
			println!("Differences saved to: {}", locations.output.display());
			println!("Total differences found: {}", rows);
		}
	}

	if report.is_identical() {
		println!("\nThe documents are identical.");
	} else {
		println!("\n=== Difference summary ===");
		for (kind, count) in report.summary.iter() {
			println!("{}: {}", kind, count);
		}
	}

	if args.verbose {
		println!(
			"\nTotal time: {:.2}s",
			start_time.elapsed().as_secs_f64()
		);
	}

	Ok(())
}

/// Take locations from the arguments, prompting on `input` for any that are
/// missing. The output name is only asked for when an input was prompted for.
fn resolve_locations(args: &Args, input: &mut impl BufRead) -> Result<Locations> {
	if let (Some(first), Some(second)) = (&args.first, &args.second) {
		let output = args.output.as_deref().unwrap_or(DEFAULT_OUTPUT);
		return Ok(Locations {
			first: first.clone(),
			second: second.clone(),
			output: ensure_csv_extension(output),
		});
	}

	let first = match &args.first {
		Some(first) => first.clone(),
		None => PathBuf::from(prompt(input, "Path of the first JSON file: ")?),
	};
	let second = match &args.second {
		Some(second) => second.clone(),
		None => PathBuf::from(prompt(input, "Path of the second JSON file: ")?),
	};
	let output = match &args.output {
		Some(output) => output.clone(),
		None => prompt(
			input,
			&format!("Output CSV file name (default: {}): ", DEFAULT_OUTPUT),
		)?,
	};

	if first.as_os_str().is_empty() || second.as_os_str().is_empty() {
		bail!("Two input files are required.\nUsage: json-compare <FIRST> <SECOND> [OUTPUT]");
	}

	let output = if output.is_empty() {
		DEFAULT_OUTPUT
	} else {
		output.as_str()
	};

	Ok(Locations {
		first,
		second,
		output: ensure_csv_extension(output),
	})
}

fn prompt(input: &mut impl BufRead, message: &str) -> Result<String> {
	print!("{}", message);
	io::stdout().flush().context("Failed to write prompt")?;

	let mut line = String::new();
	input.read_line(&mut line).context("Failed to read answer")?;
	Ok(line.trim().to_string())
}
