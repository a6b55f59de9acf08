use super::*;
use crate::{Crs, GeoRaster};
use anyhow::{Context, Result, bail};
use image::DynamicImage;
use std::{
	fs::File,
	io::{BufWriter, Cursor, Seek, Write},
	path::Path,
};
use tiff::encoder::{
	DirectoryEncoder, TiffEncoder, TiffKind,
	colortype::{Gray8, RGB8, RGBA8},
};

/// Encodes a raster as an uncompressed GeoTIFF into `writer`.
pub fn write_geotiff_to<W: Write + Seek>(writer: W, raster: &GeoRaster) -> Result<()> {
	raster.validate()?;
	let (width, height) = (raster.width(), raster.height());
	let mut encoder = TiffEncoder::new(writer)?;

	match &raster.image {
		DynamicImage::ImageLuma8(buffer) => {
			let mut image = encoder.new_image::<Gray8>(width, height)?;
			write_geo_tags(image.encoder(), raster)?;
			image.write_data(buffer.as_raw())?;
		}
		DynamicImage::ImageRgb8(buffer) => {
			let mut image = encoder.new_image::<RGB8>(width, height)?;
			write_geo_tags(image.encoder(), raster)?;
			image.write_data(buffer.as_raw())?;
		}
		DynamicImage::ImageRgba8(buffer) => {
			let mut image = encoder.new_image::<RGBA8>(width, height)?;
			write_geo_tags(image.encoder(), raster)?;
			image.write_data(buffer.as_raw())?;
		}
		other => bail!("unsupported color type {:?}, expected L8, Rgb8 or Rgba8", other.color()),
	}
	Ok(())
}

/// Writes a raster to a GeoTIFF file, replacing an existing file.
pub fn write_geotiff(path: &Path, raster: &GeoRaster) -> Result<()> {
	let file = File::create(path).with_context(|| format!("creating {path:?}"))?;
	let mut writer = BufWriter::new(file);
	write_geotiff_to(&mut writer, raster).with_context(|| format!("writing GeoTIFF {path:?}"))?;
	writer.flush().with_context(|| format!("flushing {path:?}"))?;
	Ok(())
}

/// Encodes a raster as GeoTIFF bytes.
pub fn encode_geotiff(raster: &GeoRaster) -> Result<Vec<u8>> {
	let mut cursor = Cursor::new(Vec::new());
	write_geotiff_to(&mut cursor, raster)?;
	Ok(cursor.into_inner())
}

fn write_geo_tags<W: Write + Seek, K: TiffKind>(dir: &mut DirectoryEncoder<'_, W, K>, raster: &GeoRaster) -> Result<()> {
	let t = &raster.transform;

	let pixel_scale = [t.pixel_width(), t.pixel_height(), 0.0];
	dir.write_tag(geo_tag(MODEL_PIXEL_SCALE), &pixel_scale[..])?;

	// pixel (0, 0) is tied to the north-west corner
	let tiepoint = [0.0, 0.0, 0.0, t.c, t.f, 0.0];
	dir.write_tag(geo_tag(MODEL_TIEPOINT), &tiepoint[..])?;

	let geokeys = geo_key_directory(raster.crs);
	dir.write_tag(geo_tag(GEO_KEY_DIRECTORY), &geokeys[..])?;

	if let Some(nodata) = raster.nodata {
		let text = nodata.to_string();
		dir.write_tag(geo_tag(GDAL_NODATA), text.as_str())?;
	}
	Ok(())
}

/// Builds the `GeoKeyDirectory`: header `[version, revision, minor, count]` followed by
/// `[key, location, count, value]` entries.
pub(super) fn geo_key_directory(crs: Crs) -> Vec<u16> {
	let mut entries: Vec<[u16; 4]> = Vec::new();
	match crs {
		Crs::Epsg(code) if crs.is_geographic() => {
			entries.push([KEY_MODEL_TYPE, 0, 1, MODEL_TYPE_GEOGRAPHIC]);
			entries.push([KEY_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA]);
			entries.push([KEY_GEOGRAPHIC_TYPE, 0, 1, code]);
		}
		Crs::Epsg(code) => {
			entries.push([KEY_MODEL_TYPE, 0, 1, MODEL_TYPE_PROJECTED]);
			entries.push([KEY_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA]);
			entries.push([KEY_PROJECTED_CS_TYPE, 0, 1, code]);
		}
		Crs::Unknown => entries.push([KEY_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA]),
	}

	let mut keys = vec![1, 1, 0, entries.len() as u16];
	keys.extend(entries.into_iter().flatten());
	keys
}
