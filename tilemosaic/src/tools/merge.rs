use super::ConfigArgs;
use anyhow::{Context, Result};
use std::{fs, path::PathBuf, sync::Arc};
use tilemosaic::{FullMosaicMerger, TileCatalog};
use tilemosaic_image::{GeoTiffStore, RasterStore};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// directory containing tiles named tile_z<Z>_x<X>_y<Y>.<ext>
	#[arg()]
	input_dir: PathBuf,

	/// GeoTIFF file to write, parent directories are created if missing
	#[arg()]
	output_file: PathBuf,

	#[command(flatten)]
	config: ConfigArgs,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("merge tiles from {:?} into {:?}", arguments.input_dir, arguments.output_file);

	let config = arguments.config.load()?;
	config.validate()?;

	let store: Arc<dyn RasterStore> = Arc::new(GeoTiffStore);
	let catalog = TileCatalog::discover(store.as_ref(), &arguments.input_dir, &config)?;
	let paths: Vec<PathBuf> = catalog.entries().into_iter().map(|entry| entry.path).collect();

	let mosaic = FullMosaicMerger::merge_paths(Arc::clone(&store), paths, config.limits().io_bound).await?;

	if let Some(parent) = arguments.output_file.parent() {
		fs::create_dir_all(parent).with_context(|| format!("creating directory {parent:?}"))?;
	}
	store
		.write(&arguments.output_file, &mosaic)
		.with_context(|| format!("writing {:?}", arguments.output_file))?;

	log::info!(
		"merged {} tiles into {}x{} pixels",
		catalog.len(),
		mosaic.width(),
		mosaic.height()
	);
	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::{
		tests::run_command,
		tools::test_utils::{path_str, write_tile},
	};
	use approx::assert_relative_eq;
	use assert_fs::TempDir;
	use image::GenericImageView;
	use tilemosaic_core::TileRange;
	use tilemosaic_image::{GeoTiffStore, RasterStore};

	#[test]
	fn merge_into_one_raster() {
		let dir = TempDir::new().unwrap();
		write_tile(dir.path(), 18, 100, 200, 8, [10, 10, 10]);
		write_tile(dir.path(), 18, 101, 200, 8, [20, 20, 20]);
		write_tile(dir.path(), 18, 101, 201, 8, [30, 30, 30]);
		let output = dir.path().join("result").join("mosaic.tif");

		run_command(vec!["tilemosaic", "merge", path_str(dir.path()), path_str(&output)]).unwrap();

		let mosaic = GeoTiffStore.read(&output).unwrap();
		assert_eq!(mosaic.image.dimensions(), (16, 16));
		assert_eq!(mosaic.image.get_pixel(2, 2).0, [10, 10, 10, 255]);
		assert_eq!(mosaic.image.get_pixel(10, 2).0, [20, 20, 20, 255]);
		assert_eq!(mosaic.image.get_pixel(10, 10).0, [30, 30, 30, 255]);
		assert_eq!(mosaic.image.get_pixel(2, 10).0, [0, 0, 0, 255]);

		let expected = TileRange::new(18, 100, 200, 101, 201).unwrap().to_geo_bbox().as_array();
		for (actual, expected) in mosaic.bounds().iter().zip(expected) {
			assert_relative_eq!(*actual, expected, epsilon = 1e-6);
		}
	}

	#[test]
	fn merge_without_tiles() {
		let dir = TempDir::new().unwrap();
		let output = dir.path().join("mosaic.tif");
		assert!(run_command(vec!["tilemosaic", "merge", path_str(dir.path()), path_str(&output)]).is_err());
	}
}
