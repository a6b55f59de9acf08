//! Reportable error kinds of the mosaicking pipeline.
//!
//! Functions in this workspace return [`anyhow::Result`]. Whenever a failure belongs to one of the
//! kinds below, the returned error wraps a [`MosaicError`], so callers can recover the kind with
//! [`MosaicError::kind_of`] (or `err.downcast_ref::<MosaicError>()`).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MosaicError {
	/// Tile coordinates outside `[0, 2^level)`.
	#[error("tile index ({x}, {y}) is out of range for zoom level {level}")]
	InvalidIndex { level: u8, x: i64, y: i64 },

	/// Zoom levels above 31 cannot be addressed with 32 bit tile indices.
	#[error("zoom level {0} must be <= 31")]
	InvalidLevel(u8),

	/// No file in the directory follows the tile naming convention.
	#[error("no tile files found in {0:?}")]
	EmptyCatalog(PathBuf),

	/// A merge was requested without any input.
	#[error("there are no tiles to merge")]
	NoTiles,

	/// A file name looks like a tile but does not parse as `tile_z<Z>_x<X>_y<Y>.<ext>`.
	#[error("malformed tile file name {0:?}")]
	MalformedFilename(String),

	/// The catalog contains tiles of more than one zoom level.
	#[error("tile {path:?} has zoom level {found}, but the catalog uses zoom level {expected}")]
	MixedZoom { expected: u8, found: u8, path: PathBuf },

	/// A tile does not have the configured pixel size.
	#[error("tile {path:?} has {width}x{height} pixels, but the tile size is {expected}")]
	TileSizeMismatch {
		path: PathBuf,
		width: u32,
		height: u32,
		expected: u32,
	},

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),
}

impl MosaicError {
	/// Returns the [`MosaicError`] wrapped somewhere in the chain of `err`, if there is one.
	pub fn kind_of(err: &anyhow::Error) -> Option<&MosaicError> {
		err.chain().find_map(|cause| cause.downcast_ref::<MosaicError>())
	}
}
