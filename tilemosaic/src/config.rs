//! Configuration shared by all tools.
//!
//! Every field has a default, so an empty YAML document is a valid configuration:
//!
//! ```yaml
//! tile_size: 155        # pixels per tile side
//! group_size: 35        # tiles per group side
//! stride: 33            # tiles between group origins
//! padding: 1            # tiles added before the first tile on each axis
//! extension: tif
//! target_gsd: 0.2       # meters per pixel after downsampling
//! meters_per_degree_lon: 111320
//! meters_per_degree_lat: 110540
//! strict_zoom: true     # fail on tiles of more than one zoom level
//! concurrency: 8        # optional, defaults to the number of CPUs
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
};
use tilemosaic_core::{ConcurrencyLimits, MosaicError, TileNamePattern};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct MosaicConfig {
	/// Width and height of every input tile in pixels.
	pub tile_size: u32,

	/// Number of tiles per group side.
	pub group_size: u32,

	/// Distance between neighbouring group origins in tiles. Neighbours overlap by
	/// `group_size - stride` tiles.
	pub stride: u32,

	/// Number of tile slots added on the low side of each axis before the first tile.
	pub padding: u32,

	/// File extension of input tiles, without the dot.
	pub extension: String,

	/// Target ground sampling distance of the downsampler in meters per pixel.
	pub target_gsd: f64,

	pub meters_per_degree_lon: f64,
	pub meters_per_degree_lat: f64,

	/// Fail if the input contains more than one zoom level. Otherwise the first zoom level (in file
	/// name order) is used and other tiles are skipped with a warning.
	pub strict_zoom: bool,

	/// Number of tiles or groups processed in parallel.
	pub concurrency: Option<usize>,
}

impl Default for MosaicConfig {
	fn default() -> Self {
		MosaicConfig {
			tile_size: 155,
			group_size: 35,
			stride: 33,
			padding: 1,
			extension: String::from("tif"),
			target_gsd: 0.2,
			meters_per_degree_lon: 111_320.0,
			meters_per_degree_lat: 110_540.0,
			strict_zoom: true,
			concurrency: None,
		}
	}
}

impl MosaicConfig {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("opening config file {path:?}"))?;
		MosaicConfig::from_reader(BufReader::new(file)).with_context(|| format!("parsing config file {path:?}"))
	}

	/// Checks value ranges and the relation of stride and padding to the group size.
	pub fn validate(&self) -> Result<()> {
		let invalid = |message: String| -> Result<()> { Err(MosaicError::InvalidConfig(message).into()) };

		if self.tile_size == 0 {
			return invalid(String::from("tile_size must be > 0"));
		}
		if self.group_size == 0 {
			return invalid(String::from("group_size must be > 0"));
		}
		if self.stride == 0 || self.stride > self.group_size {
			return invalid(format!(
				"stride ({}) must be between 1 and group_size ({})",
				self.stride, self.group_size
			));
		}
		if self.padding >= self.group_size {
			return invalid(format!(
				"padding ({}) must be smaller than group_size ({})",
				self.padding, self.group_size
			));
		}
		if !(self.target_gsd.is_finite() && self.target_gsd > 0.0) {
			return invalid(format!("target_gsd ({}) must be a positive number", self.target_gsd));
		}
		if !(self.meters_per_degree_lon > 0.0 && self.meters_per_degree_lat > 0.0) {
			return invalid(String::from("meters per degree must be positive"));
		}
		if self.extension.trim_start_matches('.').is_empty() {
			return invalid(String::from("extension must not be empty"));
		}
		if self.concurrency == Some(0) {
			return invalid(String::from("concurrency must be > 0"));
		}
		Ok(())
	}

	pub fn tile_pattern(&self) -> TileNamePattern {
		TileNamePattern::new(&self.extension)
	}

	pub fn limits(&self) -> ConcurrencyLimits {
		ConcurrencyLimits::default().with_cpu_bound(self.concurrency)
	}

	pub fn override_optional_tile_size(&mut self, tile_size: &Option<u32>) {
		if let Some(value) = tile_size {
			self.tile_size = *value;
		}
	}
	pub fn override_optional_group_size(&mut self, group_size: &Option<u32>) {
		if let Some(value) = group_size {
			self.group_size = *value;
		}
	}
	pub fn override_optional_stride(&mut self, stride: &Option<u32>) {
		if let Some(value) = stride {
			self.stride = *value;
		}
	}
	pub fn override_optional_padding(&mut self, padding: &Option<u32>) {
		if let Some(value) = padding {
			self.padding = *value;
		}
	}
	pub fn override_optional_extension(&mut self, extension: &Option<String>) {
		if let Some(value) = extension {
			self.extension = value.clone();
		}
	}
	pub fn override_optional_target_gsd(&mut self, target_gsd: &Option<f64>) {
		if let Some(value) = target_gsd {
			self.target_gsd = *value;
		}
	}
	pub fn override_optional_concurrency(&mut self, concurrency: &Option<usize>) {
		if concurrency.is_some() {
			self.concurrency = *concurrency;
		}
	}
	/// `true` switches to lenient zoom handling; `false` keeps the configured value.
	pub fn override_lenient_zoom(&mut self, lenient: bool) {
		if lenient {
			self.strict_zoom = false;
		}
	}
}
