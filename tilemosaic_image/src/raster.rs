//! Georeferenced rasters: pixels plus the metadata needed to place them on the map.

use anyhow::{Result, ensure};
use image::DynamicImage;
use std::fmt;
use tilemosaic_core::GeoTransform;

/// Coordinate reference system of a raster, identified by its EPSG code.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
	Epsg(u16),
	/// The file carried no (or an unsupported) CRS definition.
	Unknown,
}

impl Crs {
	/// Geographic WGS84 (`EPSG:4326`), the CRS of every mosaic written by this workspace.
	pub const WGS84: Crs = Crs::Epsg(4326);

	/// Returns a label like `"EPSG:4326"`.
	pub fn label(&self) -> String {
		match self {
			Crs::Epsg(code) => format!("EPSG:{code}"),
			Crs::Unknown => String::from("unknown"),
		}
	}

	/// Geographic CRS codes are interpreted as latitude/longitude degrees.
	pub fn is_geographic(&self) -> bool {
		matches!(self, Crs::Epsg(4000..=4999))
	}
}

impl fmt::Debug for Crs {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Crs({})", self.label())
	}
}

impl fmt::Display for Crs {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.label())
	}
}

/// An 8 bit raster with its geotransform, CRS and optional nodata value.
#[derive(Clone, PartialEq)]
pub struct GeoRaster {
	pub image: DynamicImage,
	pub transform: GeoTransform,
	pub crs: Crs,
	pub nodata: Option<f64>,
}

impl GeoRaster {
	/// Creates a raster whose pixel grid spans exactly `bounds` (`[west, south, east, north]`).
	pub fn from_bounds(image: DynamicImage, bounds: [f64; 4], crs: Crs) -> Result<GeoRaster> {
		let [west, south, east, north] = bounds;
		let transform = GeoTransform::from_bounds(west, south, east, north, image.width(), image.height())?;
		Ok(GeoRaster {
			image,
			transform,
			crs,
			nodata: None,
		})
	}

	#[must_use]
	pub fn with_nodata(mut self, nodata: f64) -> GeoRaster {
		self.nodata = Some(nodata);
		self
	}

	pub fn width(&self) -> u32 {
		self.image.width()
	}

	pub fn height(&self) -> u32 {
		self.image.height()
	}

	/// Number of bands (1 gray, 3 RGB, 4 RGBA).
	pub fn band_count(&self) -> u8 {
		self.image.color().channel_count()
	}

	/// Returns `[west, south, east, north]`.
	pub fn bounds(&self) -> [f64; 4] {
		self.transform.bounds(self.width(), self.height())
	}

	/// Checks the invariants every writer relies on.
	pub fn validate(&self) -> Result<()> {
		ensure!(
			self.width() > 0 && self.height() > 0,
			"raster must not be empty, got {}x{} pixels",
			self.width(),
			self.height()
		);
		ensure!(
			self.transform.is_north_up(),
			"only north-up transforms are supported, got {:?}",
			self.transform
		);
		Ok(())
	}
}

impl fmt::Debug for GeoRaster {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GeoRaster")
			.field("size", &(self.width(), self.height()))
			.field("color", &self.image.color())
			.field("transform", &self.transform)
			.field("crs", &self.crs)
			.field("nodata", &self.nodata)
			.finish()
	}
}
