//! Discovery of input tiles.
//!
//! A [`TileCatalog`] maps tile indices of a single zoom level to their files. It is built once
//! and then shared read-only by all workers.

use crate::MosaicConfig;
use anyhow::Result;
use std::{
	cmp::Ordering,
	collections::HashMap,
	path::{Path, PathBuf},
};
use tilemosaic_core::{MosaicError, TileCoord, TileRange};
use tilemosaic_image::RasterStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileEntry {
	pub coord: TileCoord,
	pub path: PathBuf,
}

impl TileEntry {
	pub fn new(coord: TileCoord, path: impl Into<PathBuf>) -> TileEntry {
		TileEntry {
			coord,
			path: path.into(),
		}
	}

	/// File name used for ordering and as output name.
	pub fn file_name(&self) -> &str {
		self.path.file_name().and_then(|name| name.to_str()).unwrap_or_default()
	}

	fn cmp_by_file_name(&self, other: &TileEntry) -> Ordering {
		self.file_name()
			.cmp(other.file_name())
			.then_with(|| self.path.cmp(&other.path))
	}
}

#[derive(Debug, Clone)]
pub struct TileCatalog {
	level: u8,
	tiles: HashMap<(u32, u32), PathBuf>,
	range: TileRange,
}

impl TileCatalog {
	/// Scans `dir` for files named `tile_z<Z>_x<X>_y<Y>.<ext>`.
	///
	/// Unrelated files are ignored, malformed tile names are skipped with a warning.
	///
	/// # Errors
	/// [`MosaicError::EmptyCatalog`] if no tile was found, [`MosaicError::MixedZoom`] if
	/// `strict_zoom` is set and the tiles do not share one zoom level.
	pub fn discover(store: &dyn RasterStore, dir: &Path, config: &MosaicConfig) -> Result<TileCatalog> {
		let pattern = config.tile_pattern();
		let mut entries = Vec::new();

		for name in store.list(dir)? {
			match pattern.parse(&name) {
				Ok(Some(coord)) => entries.push(TileEntry::new(coord, dir.join(&name))),
				Ok(None) => log::trace!("ignoring {name:?}"),
				Err(err) => log::warn!("skipping {name:?}: {err:#}"),
			}
		}

		if entries.is_empty() {
			return Err(MosaicError::EmptyCatalog(dir.to_path_buf()).into());
		}

		let catalog = TileCatalog::from_entries(entries, config.strict_zoom)?;
		log::info!(
			"found {} tiles at zoom level {} in {dir:?}, range {:?}",
			catalog.len(),
			catalog.level(),
			catalog.range()
		);
		Ok(catalog)
	}

	/// Builds a catalog from entries in any order.
	///
	/// Entries are processed in file name order: the zoom level of the first one is the catalog's
	/// level, and of two entries with the same index the later one replaces the earlier one.
	pub fn from_entries(mut entries: Vec<TileEntry>, strict_zoom: bool) -> Result<TileCatalog> {
		entries.sort_by(TileEntry::cmp_by_file_name);
		let Some(first) = entries.first() else {
			return Err(MosaicError::EmptyCatalog(PathBuf::new()).into());
		};
		let level = first.coord.level;
		let mut range = TileRange::from_coord(&first.coord);
		let mut tiles = HashMap::with_capacity(entries.len());

		for TileEntry { coord, path } in entries {
			if coord.level != level {
				if strict_zoom {
					return Err(MosaicError::MixedZoom {
						expected: level,
						found: coord.level,
						path,
					}
					.into());
				}
				log::warn!("skipping {path:?}: zoom level {} differs from {level}", coord.level);
				continue;
			}

			range.include(coord.x, coord.y);
			if let Some(previous) = tiles.insert((coord.x, coord.y), path) {
				log::warn!("tile {coord} appears more than once, {previous:?} is ignored");
			}
		}

		Ok(TileCatalog { level, tiles, range })
	}

	/// The zoom level shared by all tiles.
	pub fn level(&self) -> u8 {
		self.level
	}

	pub fn len(&self) -> usize {
		self.tiles.len()
	}

	/// Always `false`: a catalog contains at least one tile.
	pub fn is_empty(&self) -> bool {
		self.tiles.is_empty()
	}

	/// Smallest tile range containing every tile.
	pub fn range(&self) -> &TileRange {
		&self.range
	}

	/// Returns `(min_x, max_x, min_y, max_y)`, inclusive.
	pub fn bounding_rectangle(&self) -> (u32, u32, u32, u32) {
		self.range.as_tuple()
	}

	/// Looks up a tile slot. Indices outside the world are simply absent.
	pub fn get(&self, x: i64, y: i64) -> Option<&Path> {
		let x = u32::try_from(x).ok()?;
		let y = u32::try_from(y).ok()?;
		self.tiles.get(&(x, y)).map(PathBuf::as_path)
	}

	pub fn contains(&self, x: i64, y: i64) -> bool {
		self.get(x, y).is_some()
	}

	/// All tiles, sorted by file name.
	pub fn entries(&self) -> Vec<TileEntry> {
		let mut entries: Vec<TileEntry> = self
			.tiles
			.iter()
			.map(|(&(x, y), path)| TileEntry::new(TileCoord { level: self.level, x, y }, path.clone()))
			.collect();
		entries.sort_by(TileEntry::cmp_by_file_name);
		entries
	}
}
