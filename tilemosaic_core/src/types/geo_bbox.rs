use anyhow::{Result, ensure};
use std::fmt::Debug;

/// A geographical bounding box in degrees.
///
/// - `x_min` (west): minimum longitude
/// - `y_min` (south): minimum latitude
/// - `x_max` (east): maximum longitude
/// - `y_max` (north): maximum latitude
///
/// # Examples
///
/// ```
/// use tilemosaic_core::GeoBBox;
///
/// let bbox = GeoBBox::from_corners(139.91, 35.37, 139.90, 35.36).unwrap();
/// assert_eq!(bbox.as_array(), [139.90, 35.36, 139.91, 35.37]);
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct GeoBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl GeoBBox {
	/// Creates a new `GeoBBox` from `west, south, east, north`.
	///
	/// # Errors
	/// Fails if a value lies outside the WGS84 range or if min > max on an axis.
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<GeoBBox> {
		GeoBBox {
			x_min,
			y_min,
			x_max,
			y_max,
		}
		.checked()
	}

	/// Creates a `GeoBBox` from two arbitrary corners, sorting the coordinates per axis.
	///
	/// This is how an area of interest given as two `lat,lon` corner points is turned into a box.
	pub fn from_corners(lon0: f64, lat0: f64, lon1: f64, lat1: f64) -> Result<GeoBBox> {
		GeoBBox::new(lon0.min(lon1), lat0.min(lat1), lon0.max(lon1), lat0.max(lat1))
	}

	/// Returns `[west, south, east, north]`.
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}

	/// Width in degrees of longitude.
	pub fn width(&self) -> f64 {
		self.x_max - self.x_min
	}

	/// Height in degrees of latitude.
	pub fn height(&self) -> f64 {
		self.y_max - self.y_min
	}

	/// Returns the center as `[lon, lat]`.
	pub fn center(&self) -> [f64; 2] {
		[(self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0]
	}

	fn checked(self) -> Result<Self> {
		ensure!(self.x_min >= -180., "x_min ({}) must be >= -180", self.x_min);
		ensure!(self.y_min >= -90., "y_min ({}) must be >= -90", self.y_min);
		ensure!(self.x_max <= 180., "x_max ({}) must be <= 180", self.x_max);
		ensure!(self.y_max <= 90., "y_max ({}) must be <= 90", self.y_max);
		ensure!(
			self.x_min <= self.x_max,
			"x_min ({}) must be <= x_max ({})",
			self.x_min,
			self.x_max
		);
		ensure!(
			self.y_min <= self.y_max,
			"y_min ({}) must be <= y_max ({})",
			self.y_min,
			self.y_max
		);
		Ok(self)
	}
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "GeoBBox({}, {}, {}, {})", self.x_min, self.y_min, self.x_max, self.y_max)
	}
}
