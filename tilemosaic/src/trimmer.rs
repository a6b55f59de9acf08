//! Removing the overlap border from group mosaics.
//!
//! Neighbouring groups overlap, and padded groups start one tile before the data. Cutting
//! `border` pixels from every side and shrinking the bounds by the same number of pixels keeps
//! the georeferencing exact.

use crate::{BatchReport, MosaicConfig, UnitOutcome, run_batch};
use anyhow::{Context, Result};
use std::{path::Path, sync::Arc};
use tilemosaic_core::{MosaicError, TileNamePattern};
use tilemosaic_image::{DynamicImageTraitOperation, GeoRaster, RasterStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trimmer {
	border: u32,
}

impl Trimmer {
	pub fn new(border: u32) -> Trimmer {
		Trimmer { border }
	}

	/// Trims one tile per side. Neighbouring groups share `group_size - stride` tiles, so with the
	/// default 35/33 planning the two trimmed edge tiles are exactly the shared ones.
	pub fn from_config(config: &MosaicConfig) -> Trimmer {
		Trimmer::new(config.tile_size)
	}

	pub fn border(&self) -> u32 {
		self.border
	}

	/// Crops the border and adjusts the bounds. The result keeps the CRS and uses nodata 0.
	///
	/// # Errors
	/// Fails if the raster is not larger than `2 * border` in both directions.
	pub fn trim(&self, raster: &GeoRaster) -> Result<GeoRaster> {
		let image = raster.image.get_trimmed(self.border)?;

		let [west, south, east, north] = raster.bounds();
		let dx = f64::from(self.border) * (east - west) / f64::from(raster.width());
		let dy = f64::from(self.border) * (north - south) / f64::from(raster.height());
		let bounds = [west + dx, south + dy, east - dx, north - dy];

		Ok(GeoRaster::from_bounds(image, bounds, raster.crs)?.with_nodata(0.0))
	}

	/// Trims every file with the extension of `pattern` in `input_dir` into `output_dir`, keeping
	/// the file names.
	pub async fn run(
		&self,
		store: Arc<dyn RasterStore>,
		input_dir: &Path,
		output_dir: &Path,
		pattern: &TileNamePattern,
		concurrency: usize,
	) -> Result<BatchReport> {
		let units: Vec<(String, String)> = store
			.list(input_dir)?
			.into_iter()
			.filter(|name| {
				Path::new(name)
					.extension()
					.and_then(|ext| ext.to_str())
					.is_some_and(|ext| ext.eq_ignore_ascii_case(pattern.extension()))
			})
			.map(|name| (name.clone(), name))
			.collect();

		if units.is_empty() {
			return Err(MosaicError::EmptyCatalog(input_dir.to_path_buf()).into());
		}
		log::info!("trimming {} pixels from {} rasters", self.border, units.len());

		let trimmer = *self;
		let input_dir = input_dir.to_path_buf();
		let output_dir = output_dir.to_path_buf();
		Ok(run_batch(units, concurrency, move |name| {
			let raster = store
				.read(&input_dir.join(&name))
				.with_context(|| format!("reading {name:?}"))?;
			let trimmed = trimmer.trim(&raster)?;
			let path = output_dir.join(&name);
			store.write(&path, &trimmed).with_context(|| format!("writing {path:?}"))?;
			Ok(UnitOutcome::Written(path))
		})
		.await)
	}
}
