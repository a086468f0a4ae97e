use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use assemblage::coffee;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Parse and generate coffee price lists.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
	/// Log matching at debug level unless RUST_LOG says otherwise.
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Parse one coffee per line, from a file or stdin.
	Parse { file: Option<PathBuf> },
	/// Print random lines the coffee grammar accepts.
	Random {
		#[arg(short, long, default_value_t = 5)]
		count: usize,
		#[arg(short, long, default_value_t = 4)]
		depth: usize,
		/// Seed for repeatable output; random if omitted.
		#[arg(short, long)]
		seed: Option<u64>,
	},
	/// Print the coffee grammar.
	Grammar,
}

fn main() -> anyhow::Result<ExitCode> {
	let args = Args::parse();

	let default_level = if args.verbose { "debug" } else { "warn" };
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
		.with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
		.init();

	let (grammar, start) = coffee::grammar()?;
	match args.command {
		Command::Parse { file } => {
			let input = match &file {
				Some(path) => fs::read_to_string(path)
					.with_context(|| format!("couldn't read {}", path.display()))?,
				None => {
					let mut input = String::new();
					io::stdin().read_to_string(&mut input).context("couldn't read stdin")?;
					input
				},
			};

			let mut failed = 0;
			for (number, line) in input.lines().enumerate() {
				if line.trim().is_empty() {
					continue;
				}
				match coffee::recognize(&grammar, start, line) {
					Ok(coffee) => println!("{coffee}"),
					Err(err) => {
						failed += 1;
						eprintln!("line {}: {err:#}", number + 1);
					},
				}
			}
			if failed > 0 {
				return Ok(ExitCode::FAILURE);
			}
		},
		Command::Random { count, depth, seed } => {
			let mut rng = match seed {
				Some(seed) => Xoshiro256StarStar::seed_from_u64(seed),
				None => Xoshiro256StarStar::from_entropy(),
			};
			debug!(count, depth, ?seed, "generating");
			for _ in 0 .. count {
				println!("{}", grammar.random_input(start, depth, " ", &mut rng)?);
			}
		},
		Command::Grammar => println!("{}", grammar.describe(start)),
	}
	Ok(ExitCode::SUCCESS)
}
