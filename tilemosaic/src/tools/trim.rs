use super::ConfigArgs;
use anyhow::{Context, Result};
use std::{fs, path::PathBuf, sync::Arc};
use tilemosaic::Trimmer;
use tilemosaic_image::{GeoTiffStore, RasterStore};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// directory containing georeferenced rasters, e.g. group mosaics
	#[arg()]
	input_dir: PathBuf,

	/// directory for the trimmed rasters, created if missing
	#[arg()]
	output_dir: PathBuf,

	/// pixels removed from every side. Default: the tile size
	#[arg(long, value_name = "int", display_order = 1)]
	border: Option<u32>,

	#[command(flatten)]
	config: ConfigArgs,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("trim rasters from {:?} into {:?}", arguments.input_dir, arguments.output_dir);

	let config = arguments.config.load()?;
	config.validate()?;

	let trimmer = match arguments.border {
		Some(border) => Trimmer::new(border),
		None => Trimmer::from_config(&config),
	};

	fs::create_dir_all(&arguments.output_dir)
		.with_context(|| format!("creating output directory {:?}", arguments.output_dir))?;

	let store: Arc<dyn RasterStore> = Arc::new(GeoTiffStore);
	let report = trimmer
		.run(
			store,
			&arguments.input_dir,
			&arguments.output_dir,
			&config.tile_pattern(),
			config.limits().cpu_bound,
		)
		.await?;

	report.log_summary("trim");
	report.ensure_success("trim")
}
