mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{ErrorLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Stitch tiles into overlapping group mosaics
	Groups(tools::groups::Subcommand),

	/// Merge all tiles into a single mosaic
	Merge(tools::merge::Subcommand),

	/// Resample tiles to a target ground sampling distance
	Downsample(tools::downsample::Subcommand),

	/// Show the tiles covering an area of interest
	Aoi(tools::aoi::Subcommand),

	/// Cut the overlap border off georeferenced rasters
	Trim(tools::trim::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Groups(arguments) => tools::groups::run(arguments),
		Commands::Merge(arguments) => tools::merge::run(arguments),
		Commands::Downsample(arguments) => tools::downsample::run(arguments),
		Commands::Aoi(arguments) => tools::aoi::run(arguments),
		Commands::Trim(arguments) => tools::trim::run(arguments),
	}
}
