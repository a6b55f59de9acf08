//! Raster storage backends.
//!
//! The mosaicking code never touches files directly. It talks to a [`RasterStore`], which is
//! [`GeoTiffStore`] in production and [`MemoryStore`] in tests.

use crate::{
	GeoRaster,
	geotiff::{read_geotiff, read_tiff_pixels, write_geotiff},
};
use anyhow::{Context, Result, anyhow};
use image::DynamicImage;
use std::{
	collections::BTreeMap,
	fmt::Debug,
	fs,
	path::{Path, PathBuf},
	sync::Mutex,
};

/// Reads and writes georeferenced rasters.
pub trait RasterStore: Debug + Send + Sync {
	/// Returns the names of all files in `dir`, sorted by name.
	fn list(&self, dir: &Path) -> Result<Vec<String>>;

	/// Reads only the pixels; the file does not need to be georeferenced.
	fn read_pixels(&self, path: &Path) -> Result<DynamicImage>;

	/// Reads pixels and georeferencing.
	fn read(&self, path: &Path) -> Result<GeoRaster>;

	/// Writes a raster, replacing an existing one.
	fn write(&self, path: &Path, raster: &GeoRaster) -> Result<()>;
}

/// GeoTIFF files on the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoTiffStore;

impl RasterStore for GeoTiffStore {
	fn list(&self, dir: &Path) -> Result<Vec<String>> {
		let mut names = Vec::new();
		for entry in fs::read_dir(dir).with_context(|| format!("reading directory {dir:?}"))? {
			let entry = entry?;
			if !entry.file_type()?.is_file() {
				continue;
			}
			match entry.file_name().into_string() {
				Ok(name) => names.push(name),
				Err(name) => log::debug!("skipping non UTF-8 file name {name:?}"),
			}
		}
		names.sort();
		Ok(names)
	}

	fn read_pixels(&self, path: &Path) -> Result<DynamicImage> {
		read_tiff_pixels(path)
	}

	fn read(&self, path: &Path) -> Result<GeoRaster> {
		read_geotiff(path)
	}

	fn write(&self, path: &Path, raster: &GeoRaster) -> Result<()> {
		write_geotiff(path, raster)
	}
}

/// Keeps rasters in memory, keyed by path.
#[derive(Debug, Default)]
pub struct MemoryStore {
	rasters: Mutex<BTreeMap<PathBuf, GeoRaster>>,
}

impl MemoryStore {
	pub fn new() -> MemoryStore {
		MemoryStore::default()
	}

	/// Stores a raster directly, e.g. to prepare test input.
	pub fn insert(&self, path: impl Into<PathBuf>, raster: GeoRaster) {
		self.lock().insert(path.into(), raster);
	}

	/// Returns a copy of the raster at `path`.
	pub fn get(&self, path: &Path) -> Option<GeoRaster> {
		self.lock().get(path).cloned()
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<PathBuf, GeoRaster>> {
		self.rasters.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
	}
}

impl RasterStore for MemoryStore {
	fn list(&self, dir: &Path) -> Result<Vec<String>> {
		Ok(self
			.lock()
			.keys()
			.filter(|path| path.parent() == Some(dir))
			.filter_map(|path| path.file_name()?.to_str().map(String::from))
			.collect())
	}

	fn read_pixels(&self, path: &Path) -> Result<DynamicImage> {
		Ok(self.read(path)?.image)
	}

	fn read(&self, path: &Path) -> Result<GeoRaster> {
		self.get(path).ok_or_else(|| anyhow!("raster {path:?} not found"))
	}

	fn write(&self, path: &Path, raster: &GeoRaster) -> Result<()> {
		raster.validate()?;
		self.insert(path, raster.clone());
		Ok(())
	}
}
