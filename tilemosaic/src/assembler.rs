//! Stitching the tiles of one group into a georeferenced RGBA raster.
//!
//! The canvas is `group_size * tile_size` pixels square. Tile slot `(i, j)` lands at pixel
//! `(i * tile_size, j * tile_size)`. Color is stored as RGB, alpha is 255 where a tile was placed
//! and 0 in empty slots, which are also marked as nodata.

use crate::{
	BatchReport, Group, MosaicConfig, PlannedGroup, TileCatalog, UnitOutcome, run_batch,
};
use anyhow::{Context, Result};
use image::DynamicImage;
use std::{
	path::{Path, PathBuf},
	sync::Arc,
};
use tilemosaic_core::{MosaicError, TileNamePattern};
use tilemosaic_image::{Crs, DynamicImageTraitOperation, GeoRaster, RasterStore};

#[derive(Debug, Clone)]
pub struct MosaicAssembler {
	catalog: Arc<TileCatalog>,
	store: Arc<dyn RasterStore>,
	tile_size: u32,
}

impl MosaicAssembler {
	pub fn new(catalog: Arc<TileCatalog>, store: Arc<dyn RasterStore>, tile_size: u32) -> MosaicAssembler {
		MosaicAssembler {
			catalog,
			store,
			tile_size,
		}
	}

	pub fn from_config(catalog: Arc<TileCatalog>, store: Arc<dyn RasterStore>, config: &MosaicConfig) -> MosaicAssembler {
		MosaicAssembler::new(catalog, store, config.tile_size)
	}

	/// Composites all tiles of `group`.
	///
	/// Returns `Ok(None)` if no slot of the group holds a tile.
	///
	/// # Errors
	/// Fails if a tile cannot be read or is not `tile_size` pixels square
	/// ([`MosaicError::TileSizeMismatch`]).
	pub fn assemble(&self, group: &Group) -> Result<Option<GeoRaster>> {
		let side = group
			.size
			.checked_mul(self.tile_size)
			.with_context(|| format!("{group:?} is too large for tiles of {} pixels", self.tile_size))?;

		let mut canvas: Option<DynamicImage> = None;
		for (i, j, x, y) in group.slots() {
			let Some(path) = self.catalog.get(x, y) else {
				continue;
			};
			log::trace!("placing {path:?} into slot ({i}, {j})");

			let tile = self.read_tile(path)?.to_covered_rgba();
			canvas
				.get_or_insert_with(|| DynamicImage::new_rgba8(side, side))
				.paste(&tile, i * self.tile_size, j * self.tile_size)?;
		}

		let Some(image) = canvas else {
			return Ok(None);
		};

		let raster = GeoRaster::from_bounds(image, group.bounds(self.catalog.level()), Crs::WGS84)?.with_nodata(0.0);
		Ok(Some(raster))
	}

	fn read_tile(&self, path: &Path) -> Result<DynamicImage> {
		let image = self
			.store
			.read_pixels(path)
			.with_context(|| format!("reading tile {path:?}"))?;

		if image.width() != self.tile_size || image.height() != self.tile_size {
			return Err(MosaicError::TileSizeMismatch {
				path: path.to_path_buf(),
				width: image.width(),
				height: image.height(),
				expected: self.tile_size,
			}
			.into());
		}
		Ok(image)
	}

	/// Assembles every planned group in parallel and writes it to `output_dir`.
	///
	/// Each group is one unit of the returned report, named after its output file.
	pub async fn write_groups(
		self,
		plan: &[PlannedGroup],
		output_dir: &Path,
		pattern: &TileNamePattern,
		concurrency: usize,
	) -> BatchReport {
		let units: Vec<(String, (Group, PathBuf))> = plan
			.iter()
			.map(|planned| {
				let name = planned.file_name(pattern);
				let path = output_dir.join(&name);
				(name, (planned.group, path))
			})
			.collect();

		let assembler = Arc::new(self);
		run_batch(units, concurrency, move |(group, path)| {
			let Some(raster) = assembler.assemble(&group)? else {
				return Ok(UnitOutcome::Skipped(format!("{group:?} contains no tiles")));
			};
			assembler
				.store
				.write(&path, &raster)
				.with_context(|| format!("writing {path:?}"))?;
			Ok(UnitOutcome::Written(path))
		})
		.await
	}
}
