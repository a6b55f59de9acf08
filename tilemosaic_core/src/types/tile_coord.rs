//! Tile coordinates in the slippy-map (Web Mercator indexed) tile scheme
//!
//! At zoom level `z` the world is divided into `2^z × 2^z` tiles. `x` grows eastwards starting at
//! 180° west, `y` grows southwards starting at the northern Mercator limit.
//!
//! Tile bounds are computed with the inverse Web Mercator formula, but all consumers then treat
//! them as a degree-linear (equirectangular) frame when building geotransforms. The pixels of a
//! tile are Mercator projected, so this introduces a small distortion inside each raster that
//! grows with the distance from the equator. Output files depend on this exact behavior, so it is
//! kept as is.
//!
//! # Examples
//!
//! ```
//! use tilemosaic_core::TileCoord;
//!
//! let coord = TileCoord::new(18, 232_831, 103_251).unwrap();
//! let bbox = coord.to_geo_bbox();
//! assert!(bbox.x_min < bbox.x_max);
//!
//! let [lon, lat] = bbox.center();
//! assert_eq!(TileCoord::from_geo(lon, lat, 18).unwrap(), coord);
//! ```

use crate::{GeoBBox, MosaicError};
use anyhow::{Result, ensure};
use std::{f64::consts::PI, fmt};

/// Highest zoom level whose indices fit into `u32`.
pub const MAX_LEVEL: u8 = 31;

/// A tile index: zoom level plus x and y.
#[derive(Eq, PartialEq, Clone, Copy, Hash)]
pub struct TileCoord {
	pub level: u8,
	pub x: u32,
	pub y: u32,
}

impl TileCoord {
	/// Creates a new `TileCoord`.
	///
	/// # Errors
	/// [`MosaicError::InvalidLevel`] if `level` > 31, [`MosaicError::InvalidIndex`] if `x` or `y`
	/// is outside `[0, 2^level)`.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		ensure!(level <= MAX_LEVEL, MosaicError::InvalidLevel(level));
		let size = 1u64 << level;
		ensure!(
			u64::from(x) < size && u64::from(y) < size,
			MosaicError::InvalidIndex {
				level,
				x: i64::from(x),
				y: i64::from(y),
			}
		);
		Ok(TileCoord { level, x, y })
	}

	/// Returns the tile containing the point `lon`/`lat` (degrees) at zoom `level`.
	///
	/// Latitudes beyond the Mercator limit (±85.0511°) and the antimeridian are clamped onto the
	/// outermost tiles, so every valid WGS84 position maps to a tile.
	pub fn from_geo(lon: f64, lat: f64, level: u8) -> Result<TileCoord> {
		ensure!(level <= MAX_LEVEL, MosaicError::InvalidLevel(level));
		ensure!((-180.0..=180.0).contains(&lon), "longitude ({lon}) must be within [-180, 180]");
		ensure!((-90.0..=90.0).contains(&lat), "latitude ({lat}) must be within [-90, 90]");

		let n = f64::from(1u32 << level);
		let x = (lon + 180.0) / 360.0 * n;
		let y = (1.0 - lat.to_radians().tan().asinh() / PI) / 2.0 * n;

		let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.floor().clamp(0.0, n - 1.0) };
		TileCoord::new(level, clamp(x) as u32, clamp(y) as u32)
	}

	/// Converts a position on the tile grid of `level` into `[lon, lat]` degrees.
	///
	/// `x` and `y` are not range checked: positions outside the world (e.g. the padding column
	/// left of tile 0) are extrapolated with the same formula, which is what group bounds need.
	pub fn grid_to_geo(level: u8, x: f64, y: f64) -> [f64; 2] {
		let n = 2.0f64.powi(i32::from(level));
		[
			x / n * 360.0 - 180.0,
			(PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees(),
		]
	}

	/// Returns the bounds `[west, south, east, north]` of the grid cell `x`, `y` at `level`
	/// without checking that the cell exists.
	pub fn grid_bounds(level: u8, x: i64, y: i64) -> [f64; 4] {
		let [west, north] = TileCoord::grid_to_geo(level, x as f64, y as f64);
		let [east, south] = TileCoord::grid_to_geo(level, (x + 1) as f64, (y + 1) as f64);
		[west, south, east, north]
	}

	/// Returns the geographic bounds of this tile.
	pub fn to_geo_bbox(&self) -> GeoBBox {
		let [west, south, east, north] = TileCoord::grid_bounds(self.level, i64::from(self.x), i64::from(self.y));
		GeoBBox {
			x_min: west,
			y_min: south,
			x_max: east,
			y_max: north,
		}
	}
}

impl fmt::Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileCoord({}, [{}, {}])", self.level, self.x, self.y)
	}
}

impl fmt::Display for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.level, self.x, self.y)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;
	use rstest::rstest;

	#[test]
	fn new_validates_range() {
		TileCoord::new(0, 0, 0).unwrap();
		TileCoord::new(31, (1 << 31) - 1, 0).unwrap();

		let err = TileCoord::new(2, 4, 0).unwrap_err();
		assert_eq!(
			MosaicError::kind_of(&err),
			Some(&MosaicError::InvalidIndex { level: 2, x: 4, y: 0 })
		);

		let err = TileCoord::new(32, 0, 0).unwrap_err();
		assert_eq!(MosaicError::kind_of(&err), Some(&MosaicError::InvalidLevel(32)));
	}

	#[test]
	fn world_tile_bounds() {
		let bbox = TileCoord::new(0, 0, 0).unwrap().to_geo_bbox();
		assert_eq!(bbox.x_min, -180.0);
		assert_eq!(bbox.x_max, 180.0);
		assert_relative_eq!(bbox.y_max, 85.0511287798066, epsilon = 1e-12);
		assert_relative_eq!(bbox.y_min, -85.0511287798066, epsilon = 1e-12);
	}

	#[test]
	fn known_tile_bounds() {
		let bbox = TileCoord::new(5, 3, 4).unwrap().to_geo_bbox();
		assert_relative_eq!(bbox.x_min, -146.25);
		assert_relative_eq!(bbox.x_max, -135.0);
		assert_relative_eq!(bbox.y_min, 76.84081641443098, epsilon = 1e-12);
		assert_relative_eq!(bbox.y_max, 79.17133464081945, epsilon = 1e-12);
	}

	#[rstest]
	#[case(1, 0, 0)]
	#[case(5, 3, 4)]
	#[case(10, 1023, 1023)]
	#[case(18, 100, 200)]
	#[case(18, 232_831, 103_251)]
	#[case(20, 931_757, 413_000)]
	#[case(24, 0, (1 << 24) - 1)]
	fn bounds_are_ordered_and_center_round_trips(#[case] level: u8, #[case] x: u32, #[case] y: u32) {
		let coord = TileCoord::new(level, x, y).unwrap();
		let bbox = coord.to_geo_bbox();
		assert!(bbox.x_min < bbox.x_max, "{bbox:?}");
		assert!(bbox.y_min < bbox.y_max, "{bbox:?}");

		let [lon, lat] = bbox.center();
		assert_eq!(TileCoord::from_geo(lon, lat, level).unwrap(), coord);
	}

	#[rstest]
	#[case(139.903748, 35.369656, 20, 931_787, 414_021)]
	#[case(139.910869, 35.362094, 20, 931_807, 414_048)]
	#[case(-180.0, 0.0, 3, 0, 4)]
	#[case(180.0, 0.0, 3, 7, 4)]
	#[case(0.0, 90.0, 3, 4, 0)]
	#[case(0.0, -90.0, 3, 4, 7)]
	fn from_geo_cases(#[case] lon: f64, #[case] lat: f64, #[case] level: u8, #[case] x: u32, #[case] y: u32) {
		let coord = TileCoord::from_geo(lon, lat, level).unwrap();
		assert_eq!(coord, TileCoord::new(level, x, y).unwrap());
		if lat.abs() < 85.0 && lon.abs() < 180.0 {
			let bbox = coord.to_geo_bbox();
			assert!((bbox.x_min..=bbox.x_max).contains(&lon));
			assert!((bbox.y_min..=bbox.y_max).contains(&lat));
		}
	}

	#[test]
	fn from_geo_rejects_invalid_input() {
		assert!(TileCoord::from_geo(181.0, 0.0, 3).is_err());
		assert!(TileCoord::from_geo(0.0, -91.0, 3).is_err());
		assert!(TileCoord::from_geo(f64::NAN, 0.0, 3).is_err());
		assert!(TileCoord::from_geo(0.0, 0.0, 32).is_err());
	}

	#[test]
	fn grid_bounds_extrapolate_outside_the_world() {
		let [west, south, east, north] = TileCoord::grid_bounds(2, -1, -1);
		assert_eq!(west, -270.0);
		assert_eq!(east, -180.0);
		assert!(north > south);
		assert_relative_eq!(south, 85.0511287798066, epsilon = 1e-12);
	}

	#[test]
	fn neighbours_share_edges() {
		let a = TileCoord::new(18, 100, 200).unwrap().to_geo_bbox();
		let b = TileCoord::new(18, 101, 201).unwrap().to_geo_bbox();
		assert_eq!(a.x_max, b.x_min);
		assert_eq!(a.y_min, b.y_max);
	}

	#[test]
	fn formatting() {
		let coord = TileCoord::new(4, 7, 8).unwrap();
		assert_eq!(format!("{coord:?}"), "TileCoord(4, [7, 8])");
		assert_eq!(coord.to_string(), "4/7/8");
	}
}
