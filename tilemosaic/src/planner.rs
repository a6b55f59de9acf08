//! Partitioning of a tile range into overlapping square groups.
//!
//! Groups are `group_size × group_size` tile slots. Their origins are `stride` tiles apart, so
//! neighbouring groups share `group_size - stride` columns or rows. The first origin lies
//! `padding` tiles before the smallest tile index on each axis.

use crate::{MosaicConfig, TileCatalog};
use anyhow::Result;
use std::fmt;
use tilemosaic_core::{MosaicError, TileCoord, TileNamePattern, TileRange};

/// A square block of tile slots. The origin may lie outside the world because of padding.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Group {
	pub base_x: i64,
	pub base_y: i64,
	pub size: u32,
}

impl Group {
	pub fn new(base_x: i64, base_y: i64, size: u32) -> Group {
		Group { base_x, base_y, size }
	}

	/// Returns `[west, south, east, north]`: west and south of the bottom-left slot, east and north
	/// of the top-right slot.
	pub fn bounds(&self, level: u8) -> [f64; 4] {
		let last = i64::from(self.size) - 1;
		let [west, south, _, _] = TileCoord::grid_bounds(level, self.base_x, self.base_y + last);
		let [_, _, east, north] = TileCoord::grid_bounds(level, self.base_x + last, self.base_y);
		[west, south, east, north]
	}

	/// Iterates all slots as `(i, j, x, y)`, column by column.
	pub fn slots(&self) -> impl Iterator<Item = (u32, u32, i64, i64)> + '_ {
		(0..self.size).flat_map(move |i| {
			(0..self.size).map(move |j| (i, j, self.base_x + i64::from(i), self.base_y + i64::from(j)))
		})
	}

	/// Number of slots filled by a tile of `catalog`.
	pub fn count_tiles(&self, catalog: &TileCatalog) -> usize {
		self.slots().filter(|&(_, _, x, y)| catalog.contains(x, y)).count()
	}
}

impl fmt::Debug for Group {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Group([{}, {}], size: {})", self.base_x, self.base_y, self.size)
	}
}

/// A non-empty group together with its output id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedGroup {
	pub id: usize,
	pub group: Group,
	pub tile_count: usize,
}

impl PlannedGroup {
	/// Returns `mosaic_group_<id>_x<base_x>_y<base_y>.<ext>`.
	pub fn file_name(&self, pattern: &TileNamePattern) -> String {
		pattern.group_file_name(self.id, self.group.base_x, self.group.base_y)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupPlanner {
	group_size: u32,
	stride: u32,
	padding: u32,
}

impl GroupPlanner {
	/// # Errors
	/// [`MosaicError::InvalidConfig`] unless `1 <= stride <= group_size` and
	/// `padding < group_size`. A larger padding would leave the first tile outside every group.
	pub fn new(group_size: u32, stride: u32, padding: u32) -> Result<GroupPlanner> {
		if group_size == 0 || stride == 0 || stride > group_size {
			return Err(MosaicError::InvalidConfig(format!(
				"stride ({stride}) must be between 1 and group_size ({group_size})"
			))
			.into());
		}
		if padding >= group_size {
			return Err(MosaicError::InvalidConfig(format!(
				"padding ({padding}) must be smaller than group_size ({group_size})"
			))
			.into());
		}
		Ok(GroupPlanner {
			group_size,
			stride,
			padding,
		})
	}

	pub fn from_config(config: &MosaicConfig) -> Result<GroupPlanner> {
		GroupPlanner::new(config.group_size, config.stride, config.padding)
	}

	pub fn group_size(&self) -> u32 {
		self.group_size
	}

	/// Number of tiles shared by neighbouring groups.
	pub fn overlap(&self) -> u32 {
		self.group_size - self.stride
	}

	/// Number of group origins on one axis: `ceil((max - min + stride) / stride)`.
	pub fn group_count(&self, min: u32, max: u32) -> u64 {
		debug_assert!(min <= max);
		let stride = u64::from(self.stride);
		(u64::from(max - min) + stride).div_ceil(stride)
	}

	/// All groups covering `range`, x-major: every `y` origin of the first `x` origin, then the
	/// next `x` origin.
	pub fn groups(&self, range: &TileRange) -> Vec<Group> {
		let nx = self.group_count(range.x_min, range.x_max);
		let ny = self.group_count(range.y_min, range.y_max);

		(0..nx)
			.flat_map(|gx| {
				(0..ny).map(move |gy| {
					Group::new(
						self.origin(range.x_min, gx),
						self.origin(range.y_min, gy),
						self.group_size,
					)
				})
			})
			.collect()
	}

	fn origin(&self, min: u32, index: u64) -> i64 {
		i64::from(min) - i64::from(self.padding) + (index * u64::from(self.stride)) as i64
	}

	/// Enumerates the groups of `catalog` and numbers the non-empty ones densely from 0.
	pub fn plan(&self, catalog: &TileCatalog) -> Vec<PlannedGroup> {
		let mut planned = Vec::new();
		for group in self.groups(catalog.range()) {
			let tile_count = group.count_tiles(catalog);
			if tile_count == 0 {
				log::debug!("{group:?} contains no tiles");
				continue;
			}
			if tile_count < (self.group_size as usize).pow(2) {
				log::trace!("{group:?} is partial with {tile_count} tiles");
			}
			planned.push(PlannedGroup {
				id: planned.len(),
				group,
				tile_count,
			});
		}
		log::info!("planned {} non-empty groups", planned.len());
		planned
	}
}
