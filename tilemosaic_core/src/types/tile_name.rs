//! File naming conventions
//!
//! Input tiles are named `tile_z<Z>_x<X>_y<Y>.<ext>` (decimal numbers, zero padding allowed).
//! Group mosaics are named `mosaic_group_<NNN>_x<baseX>_y<baseY>.<ext>`.

use crate::{MosaicError, TileCoord};
use anyhow::{Context, Result};
use regex::Regex;
use std::sync::LazyLock;

const TILE_PREFIX: &str = "tile_z";

static TILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^tile_z([0-9]+)_x([0-9]+)_y([0-9]+)\.([A-Za-z0-9]+)$").expect("static regex must compile")
});

/// Recognizes tile file names with a given extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileNamePattern {
	extension: String,
}

impl TileNamePattern {
	/// `extension` is given without the leading dot, e.g. `"tif"`. Matching ignores ASCII case.
	pub fn new(extension: &str) -> TileNamePattern {
		TileNamePattern {
			extension: extension.trim_start_matches('.').to_string(),
		}
	}

	pub fn extension(&self) -> &str {
		&self.extension
	}

	/// Parses a file name.
	///
	/// Returns `Ok(None)` for names that do not look like tiles at all (`tile_z*.<ext>`), so
	/// unrelated files in a directory are ignored.
	///
	/// # Errors
	/// [`MosaicError::MalformedFilename`] if the name looks like a tile but does not follow the
	/// convention, [`MosaicError::InvalidIndex`]/[`MosaicError::InvalidLevel`] if the parsed
	/// index is not a valid tile.
	pub fn parse(&self, file_name: &str) -> Result<Option<TileCoord>> {
		if !file_name.starts_with(TILE_PREFIX) || !self.has_extension(file_name) {
			return Ok(None);
		}

		let malformed = || MosaicError::MalformedFilename(file_name.to_string());
		let captures = TILE_NAME.captures(file_name).ok_or_else(malformed)?;

		let level: u8 = captures[1].parse().map_err(|_| malformed())?;
		let x: u32 = captures[2].parse().map_err(|_| malformed())?;
		let y: u32 = captures[3].parse().map_err(|_| malformed())?;

		TileCoord::new(level, x, y)
			.with_context(|| format!("tile file name {file_name:?}"))
			.map(Some)
	}

	/// Formats the canonical file name of a tile.
	pub fn tile_file_name(&self, coord: &TileCoord) -> String {
		format!("tile_z{}_x{}_y{}.{}", coord.level, coord.x, coord.y, self.extension)
	}

	/// Formats the file name of a group mosaic. `id` is zero padded to three digits.
	pub fn group_file_name(&self, id: usize, base_x: i64, base_y: i64) -> String {
		format!("mosaic_group_{id:03}_x{base_x}_y{base_y}.{}", self.extension)
	}

	fn has_extension(&self, file_name: &str) -> bool {
		file_name
			.rsplit_once('.')
			.is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(&self.extension))
	}
}

impl Default for TileNamePattern {
	fn default() -> Self {
		TileNamePattern::new("tif")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn kind(name: &str) -> Option<MosaicError> {
		let err = TileNamePattern::default().parse(name).unwrap_err();
		MosaicError::kind_of(&err).cloned()
	}

	#[rstest]
	#[case("tile_z18_x100_y200.tif", 18, 100, 200)]
	#[case("tile_z18_x0100_y0200.tif", 18, 100, 200)]
	#[case("tile_z0_x0_y0.TIF", 0, 0, 0)]
	#[case("tile_z20_x931757_y413000.tif", 20, 931_757, 413_000)]
	fn parse_valid(#[case] name: &str, #[case] level: u8, #[case] x: u32, #[case] y: u32) {
		let coord = TileNamePattern::default().parse(name).unwrap().unwrap();
		assert_eq!(coord, TileCoord::new(level, x, y).unwrap());
	}

	#[rstest]
	#[case("readme.txt")]
	#[case("mosaic_group_000_x1_y2.tif")]
	#[case("tile_z18_x100_y200.png")]
	#[case("tile_z18_x100_y200")]
	#[case("tiles.tif")]
	fn ignore_unrelated(#[case] name: &str) {
		assert_eq!(TileNamePattern::default().parse(name).unwrap(), None);
	}

	#[rstest]
	#[case("tile_z18_x100.tif")]
	#[case("tile_z18_x-1_y200.tif")]
	#[case("tile_z18_x100_y200_copy.tif")]
	#[case("tile_z18_x99999999999_y200.tif")]
	#[case("tile_z999_x1_y2.tif")]
	fn malformed(#[case] name: &str) {
		assert_eq!(kind(name), Some(MosaicError::MalformedFilename(name.to_string())));
	}

	#[test]
	fn index_out_of_range() {
		assert_eq!(
			kind("tile_z2_x4_y0.tif"),
			Some(MosaicError::InvalidIndex { level: 2, x: 4, y: 0 })
		);
		assert_eq!(kind("tile_z40_x0_y0.tif"), Some(MosaicError::InvalidLevel(40)));
	}

	#[test]
	fn other_extension() {
		let pattern = TileNamePattern::new(".png");
		assert_eq!(pattern.extension(), "png");
		assert!(pattern.parse("tile_z1_x1_y1.png").unwrap().is_some());
		assert!(pattern.parse("tile_z1_x1_y1.tif").unwrap().is_none());
	}

	#[test]
	fn file_names() {
		let pattern = TileNamePattern::default();
		let coord = TileCoord::new(18, 100, 200).unwrap();
		assert_eq!(pattern.tile_file_name(&coord), "tile_z18_x100_y200.tif");
		assert_eq!(pattern.group_file_name(11, 931_757, 413_000), "mosaic_group_011_x931757_y413000.tif");
		assert_eq!(pattern.group_file_name(1234, -1, 99), "mosaic_group_1234_x-1_y99.tif");
	}
}
