//! Affine pixel → geographic transforms
//!
//! A [`GeoTransform`] maps a pixel position `(col, row)` to coordinates `(x, y)`:
//!
//! ```text
//! x = a * col + b * row + c
//! y = d * col + e * row + f
//! ```
//!
//! Rasters written by this workspace are always "north up": `b` and `d` are zero, `(c, f)` is the
//! north-west corner and `e` is negative.

use anyhow::{Result, ensure};
use std::fmt;

#[derive(Clone, Copy, PartialEq)]
pub struct GeoTransform {
	pub a: f64,
	pub b: f64,
	pub c: f64,
	pub d: f64,
	pub e: f64,
	pub f: f64,
}

impl GeoTransform {
	/// Maps a `width × height` pixel grid linearly onto the bounds `west, south, east, north`.
	///
	/// # Errors
	/// Fails for an empty pixel grid or for bounds with min > max.
	pub fn from_bounds(west: f64, south: f64, east: f64, north: f64, width: u32, height: u32) -> Result<GeoTransform> {
		ensure!(width > 0 && height > 0, "raster size {width}x{height} must not be empty");
		ensure!(
			west <= east && south <= north,
			"invalid bounds [{west}, {south}, {east}, {north}]"
		);
		Ok(GeoTransform::from_origin(
			west,
			north,
			(east - west) / f64::from(width),
			(north - south) / f64::from(height),
		))
	}

	/// Creates a north-up transform from the north-west corner and the pixel size.
	pub fn from_origin(west: f64, north: f64, pixel_width: f64, pixel_height: f64) -> GeoTransform {
		GeoTransform {
			a: pixel_width,
			b: 0.0,
			c: west,
			d: 0.0,
			e: -pixel_height,
			f: north,
		}
	}

	/// Returns `true` if the transform has no rotation or shear terms.
	pub fn is_north_up(&self) -> bool {
		self.b == 0.0 && self.d == 0.0 && self.a > 0.0 && self.e < 0.0
	}

	/// Horizontal pixel size.
	pub fn pixel_width(&self) -> f64 {
		self.a
	}

	/// Vertical pixel size, as a positive number.
	pub fn pixel_height(&self) -> f64 {
		-self.e
	}

	/// Returns the coordinates of the pixel corner `(col, row)`.
	pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
		(
			self.a * col + self.b * row + self.c,
			self.d * col + self.e * row + self.f,
		)
	}

	/// Returns `[west, south, east, north]` covered by a `width × height` raster.
	pub fn bounds(&self, width: u32, height: u32) -> [f64; 4] {
		let (x0, y0) = self.apply(0.0, 0.0);
		let (x1, y1) = self.apply(f64::from(width), f64::from(height));
		[x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)]
	}
}

impl fmt::Debug for GeoTransform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"GeoTransform([{}, {}, {}], [{}, {}, {}])",
			self.a, self.b, self.c, self.d, self.e, self.f
		)
	}
}
