use crate::{GeoBBox, TileCoord};
use anyhow::{Result, ensure};
use std::fmt;

/// An inclusive, never empty rectangle of tile indices at one zoom level.
///
/// # Examples
///
/// ```
/// use tilemosaic_core::{TileCoord, TileRange};
///
/// let mut range = TileRange::from_coord(&TileCoord::new(18, 100, 200).unwrap());
/// range.include(102, 199);
/// assert_eq!(range.as_tuple(), (100, 102, 199, 200));
/// assert_eq!(range.count_tiles(), 6);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRange {
	pub level: u8,
	pub x_min: u32,
	pub y_min: u32,
	pub x_max: u32,
	pub y_max: u32,
}

impl TileRange {
	/// Creates a range from inclusive minimum and maximum indices.
	pub fn new(level: u8, x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Result<TileRange> {
		TileCoord::new(level, x_max, y_max)?;
		ensure!(x_min <= x_max, "x_min ({x_min}) must be <= x_max ({x_max})");
		ensure!(y_min <= y_max, "y_min ({y_min}) must be <= y_max ({y_max})");
		Ok(TileRange {
			level,
			x_min,
			y_min,
			x_max,
			y_max,
		})
	}

	/// Creates a range covering a single tile.
	pub fn from_coord(coord: &TileCoord) -> TileRange {
		TileRange {
			level: coord.level,
			x_min: coord.x,
			y_min: coord.y,
			x_max: coord.x,
			y_max: coord.y,
		}
	}

	/// Returns all tiles at `level` touched by `bbox`.
	///
	/// The north-west corner selects the first tile, the south-east corner the last one.
	pub fn from_geo(level: u8, bbox: &GeoBBox) -> Result<TileRange> {
		let nw = TileCoord::from_geo(bbox.x_min, bbox.y_max, level)?;
		let se = TileCoord::from_geo(bbox.x_max, bbox.y_min, level)?;
		TileRange::new(level, nw.x, nw.y, se.x, se.y)
	}

	/// Grows the range so that it contains the tile `x`, `y`.
	pub fn include(&mut self, x: u32, y: u32) {
		self.x_min = self.x_min.min(x);
		self.y_min = self.y_min.min(y);
		self.x_max = self.x_max.max(x);
		self.y_max = self.y_max.max(y);
	}

	pub fn contains(&self, x: u32, y: u32) -> bool {
		(self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
	}

	pub fn width(&self) -> u32 {
		self.x_max - self.x_min + 1
	}

	pub fn height(&self) -> u32 {
		self.y_max - self.y_min + 1
	}

	pub fn count_tiles(&self) -> u64 {
		u64::from(self.width()) * u64::from(self.height())
	}

	/// Returns `(x_min, x_max, y_min, y_max)`.
	pub fn as_tuple(&self) -> (u32, u32, u32, u32) {
		(self.x_min, self.x_max, self.y_min, self.y_max)
	}

	/// Geographic bounds of the whole range.
	pub fn to_geo_bbox(&self) -> GeoBBox {
		let [west, _, _, north] = TileCoord::grid_bounds(self.level, i64::from(self.x_min), i64::from(self.y_min));
		let [_, south, east, _] = TileCoord::grid_bounds(self.level, i64::from(self.x_max), i64::from(self.y_max));
		GeoBBox {
			x_min: west,
			y_min: south,
			x_max: east,
			y_max: north,
		}
	}

	/// Iterates column by column: all `y` of the first `x`, then the next `x`.
	pub fn iter_coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
		(self.x_min..=self.x_max).flat_map(move |x| {
			(self.y_min..=self.y_max).map(move |y| TileCoord {
				level: self.level,
				x,
				y,
			})
		})
	}
}

impl fmt::Debug for TileRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"TileRange({}, [{}, {}, {}, {}])",
			self.level, self.x_min, self.y_min, self.x_max, self.y_max
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn new_validates() {
		TileRange::new(2, 0, 0, 3, 3).unwrap();
		assert!(TileRange::new(2, 0, 0, 4, 3).is_err());
		assert!(TileRange::new(2, 2, 0, 1, 3).is_err());
	}

	#[test]
	fn include_and_size() {
		let mut range = TileRange::from_coord(&TileCoord::new(18, 100, 200).unwrap());
		assert_eq!(range.count_tiles(), 1);
		range.include(101, 201);
		assert_eq!(range.width(), 2);
		assert_eq!(range.height(), 2);
		assert!(range.contains(101, 200));
		assert!(!range.contains(102, 200));
		assert_eq!(format!("{range:?}"), "TileRange(18, [100, 200, 101, 201])");
	}

	#[test]
	fn from_geo_area_of_interest() {
		let bbox = GeoBBox::from_corners(139.903748, 35.369656, 139.910869, 35.362094).unwrap();
		let range = TileRange::from_geo(20, &bbox).unwrap();
		assert_eq!(range.as_tuple(), (931_787, 931_807, 414_021, 414_048));
		assert_eq!(range.count_tiles(), 21 * 28);
	}

	#[rstest]
	#[case(0, 1)]
	#[case(1, 4)]
	#[case(3, 64)]
	fn whole_world(#[case] level: u8, #[case] count: u64) {
		let bbox = GeoBBox::new(-180.0, -85.0, 180.0, 85.0).unwrap();
		assert_eq!(TileRange::from_geo(level, &bbox).unwrap().count_tiles(), count);
	}

	#[test]
	fn geo_bbox_covers_all_tiles() {
		let range = TileRange::new(18, 100, 200, 101, 201).unwrap();
		let bbox = range.to_geo_bbox();
		for coord in range.iter_coords() {
			let tile = coord.to_geo_bbox();
			assert!(bbox.x_min <= tile.x_min && tile.x_max <= bbox.x_max);
			assert!(bbox.y_min <= tile.y_min && tile.y_max <= bbox.y_max);
		}
	}

	#[test]
	fn iteration_is_column_major() {
		let range = TileRange::new(16, 1, 5, 2, 6).unwrap();
		let names: Vec<String> = range.iter_coords().map(|c| format!("{},{}", c.x, c.y)).collect();
		assert_eq!(names, ["1,5", "1,6", "2,5", "2,6"]);
	}
}
