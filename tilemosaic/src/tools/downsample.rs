use super::ConfigArgs;
use anyhow::{Context, Result};
use std::{fs, path::PathBuf, sync::Arc};
use tilemosaic::{Downsampler, TileCatalog};
use tilemosaic_image::{GeoTiffStore, RasterStore};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// directory containing tiles named tile_z<Z>_x<X>_y<Y>.<ext>
	#[arg()]
	input_dir: PathBuf,

	/// directory for the resampled tiles, created if missing
	#[arg()]
	output_dir: PathBuf,

	/// target ground sampling distance in meters per pixel. Default: 0.2
	#[arg(long, value_name = "meters", display_order = 1)]
	gsd: Option<f64>,

	#[command(flatten)]
	config: ConfigArgs,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("downsample tiles from {:?} into {:?}", arguments.input_dir, arguments.output_dir);

	let mut config = arguments.config.load()?;
	config.override_optional_target_gsd(&arguments.gsd);
	config.validate()?;

	let store: Arc<dyn RasterStore> = Arc::new(GeoTiffStore);
	let catalog = TileCatalog::discover(store.as_ref(), &arguments.input_dir, &config)?;

	fs::create_dir_all(&arguments.output_dir)
		.with_context(|| format!("creating output directory {:?}", arguments.output_dir))?;

	let report = Downsampler::from_config(&config)?
		.run(store, &catalog, &arguments.output_dir, config.limits().cpu_bound)
		.await?;

	report.log_summary("downsample");
	report.ensure_success("downsample")
}

#[cfg(test)]
mod tests {
	use crate::{
		tests::run_command,
		tools::test_utils::{path_str, write_tile},
	};
	use assert_fs::TempDir;
	use image::GenericImageView;
	use tilemosaic_image::{GeoTiffStore, RasterStore};

	#[test]
	fn downsample_keeps_names() {
		let dir = TempDir::new().unwrap();
		write_tile(dir.path(), 18, 232_831, 103_251, 155, [50, 100, 150]);
		write_tile(dir.path(), 18, 232_832, 103_251, 155, [50, 100, 150]);
		let output = dir.path().join("out");

		run_command(vec![
			"tilemosaic",
			"downsample",
			path_str(dir.path()),
			path_str(&output),
			"--gsd",
			"0.8",
		])
		.unwrap();

		for name in ["tile_z18_x232831_y103251.tif", "tile_z18_x232832_y103251.tif"] {
			let raster = GeoTiffStore.read(&output.join(name)).unwrap();
			assert_eq!(raster.image.dimensions(), (154, 154));
			assert_eq!(raster.band_count(), 3);
		}
	}

	#[test]
	fn gsd_must_be_positive() {
		let dir = TempDir::new().unwrap();
		write_tile(dir.path(), 18, 232_831, 103_251, 4, [0, 0, 0]);
		let output = dir.path().join("out");
		let result = run_command(vec![
			"tilemosaic",
			"downsample",
			path_str(dir.path()),
			path_str(&output),
			"--gsd=-1",
		]);
		assert!(result.is_err());
	}
}
