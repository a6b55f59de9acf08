use super::*;
use crate::{Crs, GeoRaster};
use anyhow::{Context, Result, anyhow, bail, ensure};
use image::{DynamicImage, ImageBuffer};
use std::{
	fs::File,
	io::{BufReader, Read, Seek},
	path::Path,
};
use tiff::{
	ColorType,
	decoder::{Decoder, DecodingResult, Limits},
};
use tilemosaic_core::GeoTransform;

/// Reads the first image of a (Geo)TIFF file.
pub struct GeoTiffReader<R: Read + Seek> {
	decoder: Decoder<R>,
}

impl GeoTiffReader<BufReader<File>> {
	pub fn open(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("opening {path:?}"))?;
		GeoTiffReader::new(BufReader::new(file)).with_context(|| format!("reading TIFF header of {path:?}"))
	}
}

impl<R: Read + Seek> GeoTiffReader<R> {
	pub fn new(reader: R) -> Result<Self> {
		let decoder = Decoder::new(reader)?.with_limits(Limits::unlimited());
		Ok(GeoTiffReader { decoder })
	}

	pub fn dimensions(&mut self) -> Result<(u32, u32)> {
		Ok(self.decoder.dimensions()?)
	}

	/// Decodes the pixels. Supported are 8 bit Gray, RGB and RGBA.
	pub fn read_image(&mut self) -> Result<DynamicImage> {
		let (width, height) = self.dimensions()?;
		let color_type = self.decoder.colortype()?;
		let DecodingResult::U8(data) = self.decoder.read_image()? else {
			bail!("unsupported sample format, expected 8 bit samples for {color_type:?}")
		};

		let image = match color_type {
			ColorType::Gray(8) => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
			ColorType::RGB(8) => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
			ColorType::RGBA(8) => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageRgba8),
			other => bail!("unsupported color type {other:?}"),
		};
		image.ok_or_else(|| anyhow!("pixel buffer does not match the image size {width}x{height}"))
	}

	/// Reads the pixel → model transform, if the file is georeferenced.
	///
	/// Both the `ModelPixelScale` + `ModelTiepoint` pair and a `ModelTransformation` matrix are
	/// understood.
	pub fn read_transform(&mut self) -> Result<Option<GeoTransform>> {
		let scale = self.read_f64s(MODEL_PIXEL_SCALE)?;
		let tiepoint = self.read_f64s(MODEL_TIEPOINT)?;

		if let (Some(scale), Some(tiepoint)) = (scale, tiepoint) {
			ensure!(scale.len() >= 2, "ModelPixelScale needs 3 values, got {}", scale.len());
			ensure!(tiepoint.len() >= 6, "ModelTiepoint needs 6 values, got {}", tiepoint.len());
			let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
			return Ok(Some(GeoTransform::from_origin(
				x - i * scale[0],
				y + j * scale[1],
				scale[0],
				scale[1],
			)));
		}

		if let Some(m) = self.read_f64s(MODEL_TRANSFORMATION)? {
			ensure!(m.len() == 16, "ModelTransformation needs 16 values, got {}", m.len());
			return Ok(Some(GeoTransform {
				a: m[0],
				b: m[1],
				c: m[3],
				d: m[4],
				e: m[5],
				f: m[7],
			}));
		}

		Ok(None)
	}

	/// Reads the EPSG code from the `GeoKeyDirectory`.
	pub fn read_crs(&mut self) -> Result<Crs> {
		let Some(value) = self.decoder.find_tag(geo_tag(GEO_KEY_DIRECTORY))? else {
			return Ok(Crs::Unknown);
		};
		let keys = value.into_u16_vec()?;
		ensure!(keys.len() >= 4, "GeoKeyDirectory is truncated");

		let key_count = usize::from(keys[3]);
		for entry in keys[4..].chunks_exact(4).take(key_count) {
			let (id, location, value) = (entry[0], entry[1], entry[3]);
			if location == 0 && (id == KEY_GEOGRAPHIC_TYPE || id == KEY_PROJECTED_CS_TYPE) {
				return Ok(Crs::Epsg(value));
			}
		}
		Ok(Crs::Unknown)
	}

	/// Reads the GDAL nodata value.
	pub fn read_nodata(&mut self) -> Result<Option<f64>> {
		let Some(value) = self.decoder.find_tag(geo_tag(GDAL_NODATA))? else {
			return Ok(None);
		};
		let text = value.into_string()?;
		let text = text.trim_end_matches('\0').trim();
		let nodata = text
			.parse::<f64>()
			.with_context(|| format!("parsing nodata value {text:?}"))?;
		Ok(Some(nodata))
	}

	/// Reads pixels and georeferencing. Fails if the file has no geotransform.
	pub fn read_raster(mut self) -> Result<GeoRaster> {
		let transform = self
			.read_transform()?
			.ok_or_else(|| anyhow!("TIFF has no georeferencing tags"))?;
		let crs = self.read_crs()?;
		let nodata = self.read_nodata()?;
		let image = self.read_image()?;
		Ok(GeoRaster {
			image,
			transform,
			crs,
			nodata,
		})
	}

	fn read_f64s(&mut self, code: u16) -> Result<Option<Vec<f64>>> {
		match self.decoder.find_tag(geo_tag(code))? {
			Some(value) => Ok(Some(value.into_f64_vec()?)),
			None => Ok(None),
		}
	}
}

/// Reads a georeferenced raster from a file.
pub fn read_geotiff(path: &Path) -> Result<GeoRaster> {
	GeoTiffReader::open(path)?
		.read_raster()
		.with_context(|| format!("reading GeoTIFF {path:?}"))
}

/// Reads only the pixels of a (Geo)TIFF file.
pub fn read_tiff_pixels(path: &Path) -> Result<DynamicImage> {
	GeoTiffReader::open(path)?
		.read_image()
		.with_context(|| format!("reading pixels of {path:?}"))
}
