use super::ConfigArgs;
use anyhow::{Context, Result};
use std::{fs, path::PathBuf, sync::Arc};
use tilemosaic::{GroupPlanner, MosaicAssembler, TileCatalog};
use tilemosaic_image::{GeoTiffStore, RasterStore};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// directory containing tiles named tile_z<Z>_x<X>_y<Y>.<ext>
	#[arg()]
	input_dir: PathBuf,

	/// directory for the group mosaics, created if missing
	#[arg()]
	output_dir: PathBuf,

	/// number of tiles per group side. Default: 35
	#[arg(long, value_name = "int", display_order = 1)]
	group_size: Option<u32>,

	/// distance between group origins in tiles, at most the group size. Default: 33
	#[arg(long, value_name = "int", display_order = 1)]
	stride: Option<u32>,

	/// empty tile slots added before the first tile on each axis. Default: 1
	#[arg(long, value_name = "int", display_order = 1)]
	padding: Option<u32>,

	#[command(flatten)]
	config: ConfigArgs,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("group tiles from {:?} into {:?}", arguments.input_dir, arguments.output_dir);

	let mut config = arguments.config.load()?;
	config.override_optional_group_size(&arguments.group_size);
	config.override_optional_stride(&arguments.stride);
	config.override_optional_padding(&arguments.padding);
	config.validate()?;

	let store: Arc<dyn RasterStore> = Arc::new(GeoTiffStore);
	let catalog = Arc::new(TileCatalog::discover(store.as_ref(), &arguments.input_dir, &config)?);
	let plan = GroupPlanner::from_config(&config)?.plan(&catalog);

	fs::create_dir_all(&arguments.output_dir)
		.with_context(|| format!("creating output directory {:?}", arguments.output_dir))?;

	let report = MosaicAssembler::from_config(catalog, store, &config)
		.write_groups(
			&plan,
			&arguments.output_dir,
			&config.tile_pattern(),
			config.limits().cpu_bound,
		)
		.await;

	report.log_summary("groups");
	report.ensure_success("groups")
}
