pub mod aoi;
pub mod downsample;
pub mod groups;
pub mod merge;
pub mod trim;

use anyhow::Result;
use std::path::PathBuf;
use tilemosaic::MosaicConfig;

/// Options shared by the tools that read tile directories.
#[derive(clap::Args, Debug)]
pub struct ConfigArgs {
	/// Path to a configuration file (YAML format).
	/// Command line arguments will override configuration file settings.
	#[arg(short = 'c', long, value_name = "FILE", display_order = 0, verbatim_doc_comment)]
	pub config: Option<PathBuf>,

	/// width and height of the input tiles in pixels. Default: 155
	#[arg(long, value_name = "int", display_order = 2)]
	pub tile_size: Option<u32>,

	/// file extension of the input tiles. Default: tif
	#[arg(long, value_name = "ext", display_order = 2)]
	pub extension: Option<String>,

	/// accept tiles of several zoom levels, use the first one in file name order and skip the others
	#[arg(long, display_order = 3)]
	pub lenient_zoom: bool,

	/// number of tiles or groups processed in parallel. Default: number of CPUs
	#[arg(short = 'j', long, value_name = "int", display_order = 4)]
	pub concurrency: Option<usize>,
}

impl ConfigArgs {
	/// Loads the configuration file (if any) and applies the shared overrides.
	///
	/// Callers apply their own overrides and then call [`MosaicConfig::validate`].
	pub fn load(&self) -> Result<MosaicConfig> {
		let mut config = match &self.config {
			Some(path) => MosaicConfig::from_path(path)?,
			None => MosaicConfig::default(),
		};
		config.override_optional_tile_size(&self.tile_size);
		config.override_optional_extension(&self.extension);
		config.override_lenient_zoom(self.lenient_zoom);
		config.override_optional_concurrency(&self.concurrency);
		Ok(config)
	}
}
