//! Resampling tiles to a uniform ground sampling distance.
//!
//! The target size is derived once, from the first tile in file name order, and applied to the
//! whole batch. Each resampled tile gets a fresh geotransform spanning the bounds of its tile
//! index, in WGS84.

use crate::{BatchReport, MosaicConfig, TileCatalog, TileEntry, UnitOutcome, run_batch};
use anyhow::{Context, Result, ensure};
use image::DynamicImage;
use std::{path::Path, sync::Arc};
use tilemosaic_core::{GeoBBox, MosaicError, TileCoord};
use tilemosaic_image::{Crs, DynamicImageTraitOperation, GeoRaster, RasterStore};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Downsampler {
	target_gsd: f64,
	meters_per_degree_lon: f64,
	meters_per_degree_lat: f64,
}

impl Downsampler {
	pub fn new(target_gsd: f64, meters_per_degree_lon: f64, meters_per_degree_lat: f64) -> Result<Downsampler> {
		if !(target_gsd.is_finite() && target_gsd > 0.0) {
			return Err(MosaicError::InvalidConfig(format!("target_gsd ({target_gsd}) must be a positive number")).into());
		}
		Ok(Downsampler {
			target_gsd,
			meters_per_degree_lon,
			meters_per_degree_lat,
		})
	}

	pub fn from_config(config: &MosaicConfig) -> Result<Downsampler> {
		Downsampler::new(
			config.target_gsd,
			config.meters_per_degree_lon,
			config.meters_per_degree_lat,
		)
	}

	/// Side length in pixels that gives `bbox` the target ground sampling distance.
	///
	/// The east-west extent is measured at the center latitude. Both extents are averaged and the
	/// resulting pixel count is truncated.
	pub fn target_size(&self, bbox: &GeoBBox) -> Result<u32> {
		let [_, center_lat] = bbox.center();
		let lon_distance = bbox.width() * self.meters_per_degree_lon * center_lat.to_radians().cos();
		let lat_distance = bbox.height() * self.meters_per_degree_lat;
		let size = ((lon_distance + lat_distance) / 2.0 / self.target_gsd).trunc();
		ensure!(
			size >= 1.0 && size <= f64::from(u32::MAX),
			"a ground sampling distance of {} m gives an invalid tile size of {size} pixels for {bbox:?}",
			self.target_gsd
		);
		Ok(size as u32)
	}

	/// Resamples `image` to `size × size` with Lanczos3 and georeferences it to `coord`.
	///
	/// Images that already have the target size are kept unchanged.
	pub fn resample(&self, image: DynamicImage, coord: &TileCoord, size: u32) -> Result<GeoRaster> {
		let image = if image.width() == size && image.height() == size {
			image
		} else {
			image.get_resampled(size, size)?
		};
		GeoRaster::from_bounds(image, coord.to_geo_bbox().as_array(), Crs::WGS84)
	}

	/// Resamples every tile of `catalog` into `output_dir`, keeping the file names.
	pub async fn run(
		&self,
		store: Arc<dyn RasterStore>,
		catalog: &TileCatalog,
		output_dir: &Path,
		concurrency: usize,
	) -> Result<BatchReport> {
		let entries = catalog.entries();
		let first = entries.first().ok_or(MosaicError::NoTiles)?;
		let size = self
			.target_size(&first.coord.to_geo_bbox())
			.with_context(|| format!("deriving the target size from {:?}", first.path))?;
		log::info!("resampling {} tiles to {size}x{size} pixels", entries.len());

		let units: Vec<(String, TileEntry)> = entries
			.into_iter()
			.map(|entry| (entry.file_name().to_string(), entry))
			.collect();

		let downsampler = *self;
		let output_dir = output_dir.to_path_buf();
		Ok(run_batch(units, concurrency, move |entry| {
			let image = store
				.read_pixels(&entry.path)
				.with_context(|| format!("reading tile {:?}", entry.path))?;
			let raster = downsampler.resample(image, &entry.coord, size)?;
			let path = output_dir.join(entry.file_name());
			store.write(&path, &raster).with_context(|| format!("writing {path:?}"))?;
			Ok(UnitOutcome::Written(path))
		})
		.await)
	}
}
