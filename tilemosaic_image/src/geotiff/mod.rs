//! Minimal GeoTIFF support on top of the `tiff` crate.
//!
//! Only what the mosaicking tools need is covered: single image, 8 bit samples, chunky Gray, RGB
//! or RGBA. Georeferencing is stored as `ModelPixelScale` + `ModelTiepoint`, the CRS as an EPSG
//! code in the `GeoKeyDirectory` and nodata in the GDAL ASCII tag.

mod reader;
mod writer;

pub use reader::*;
pub use writer::*;

use tiff::tags::Tag;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

const KEY_MODEL_TYPE: u16 = 1024;
const KEY_RASTER_TYPE: u16 = 1025;
const KEY_GEOGRAPHIC_TYPE: u16 = 2048;
const KEY_PROJECTED_CS_TYPE: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// Maps a numeric GeoTIFF tag onto the decoder's tag type, so lookups hit named variants as well.
fn geo_tag(code: u16) -> Tag {
	Tag::from_u16_exhaustive(code)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Crs, GeoRaster};
	use super::writer::geo_key_directory;
	use image::{DynamicImage, GrayImage, Rgb, RgbImage, RgbaImage};
	use rstest::rstest;
	use std::io::Cursor;
	use tilemosaic_core::GeoTransform;

	fn raster(image: DynamicImage) -> GeoRaster {
		GeoRaster::from_bounds(image, [139.9, 35.3, 140.1, 35.4], Crs::WGS84).unwrap()
	}

	#[rstest]
	#[case::gray(DynamicImage::ImageLuma8(GrayImage::from_fn(7, 5, |x, y| image::Luma([(x * 10 + y) as u8]))))]
	#[case::rgb(DynamicImage::ImageRgb8(RgbImage::from_fn(7, 5, |x, y| Rgb([x as u8, y as u8, 200]))))]
	#[case::rgba(DynamicImage::ImageRgba8(RgbaImage::from_fn(7, 5, |x, y| image::Rgba([x as u8, y as u8, 9, 255]))))]
	fn write_then_read(#[case] image: DynamicImage) {
		let input = raster(image).with_nodata(0.0);
		let bytes = encode_geotiff(&input).unwrap();
		assert_eq!(&bytes[0..2], b"II");

		let output = GeoTiffReader::new(Cursor::new(bytes)).unwrap().read_raster().unwrap();
		assert_eq!(output.image, input.image);
		assert_eq!(output.crs, Crs::WGS84);
		assert_eq!(output.nodata, Some(0.0));
		assert_eq!(output.transform, input.transform);
	}

	#[test]
	fn pixels_without_georeferencing() {
		let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, Rgb([1, 2, 3])));
		let mut bytes = Cursor::new(Vec::new());
		let mut encoder = tiff::encoder::TiffEncoder::new(&mut bytes).unwrap();
		encoder
			.write_image::<tiff::encoder::colortype::RGB8>(3, 3, image.as_bytes())
			.unwrap();

		let mut reader = GeoTiffReader::new(Cursor::new(bytes.into_inner())).unwrap();
		assert_eq!(reader.read_transform().unwrap(), None);
		assert_eq!(reader.read_crs().unwrap(), Crs::Unknown);
		assert_eq!(reader.read_image().unwrap(), image);
		assert!(reader.read_raster().is_err());
	}

	#[test]
	fn read_model_transformation() {
		let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 2, Rgb([5, 6, 7])));
		#[rustfmt::skip]
		let matrix = [
			0.5, 0.0, 0.0, 10.0,
			0.0, -0.25, 0.0, 50.0,
			0.0, 0.0, 0.0, 0.0,
			0.0, 0.0, 0.0, 1.0,
		];
		let mut bytes = Cursor::new(Vec::new());
		let mut encoder = tiff::encoder::TiffEncoder::new(&mut bytes).unwrap();
		let mut tiff_image = encoder.new_image::<tiff::encoder::colortype::RGB8>(4, 2).unwrap();
		tiff_image
			.encoder()
			.write_tag(geo_tag(MODEL_TRANSFORMATION), &matrix[..])
			.unwrap();
		let geokeys = geo_key_directory(Crs::WGS84);
		tiff_image
			.encoder()
			.write_tag(geo_tag(GEO_KEY_DIRECTORY), &geokeys[..])
			.unwrap();
		tiff_image.write_data(image.as_bytes()).unwrap();

		let mut reader = GeoTiffReader::new(Cursor::new(bytes.into_inner())).unwrap();
		let transform = reader.read_transform().unwrap().unwrap();
		assert_eq!(transform, GeoTransform::from_origin(10.0, 50.0, 0.5, 0.25));

		let raster = reader.read_raster().unwrap();
		assert_eq!(raster.crs, Crs::WGS84);
		assert_eq!(raster.nodata, None);
		assert_eq!(raster.image, image);
		assert_eq!(raster.bounds(), [10.0, 49.5, 12.0, 50.0]);
	}

	#[test]
	fn geokeys_for_wgs84() {
		assert_eq!(
			geo_key_directory(Crs::WGS84),
			[1, 1, 0, 3, 1024, 0, 1, 2, 1025, 0, 1, 1, 2048, 0, 1, 4326]
		);
		assert_eq!(geo_key_directory(Crs::Epsg(3857))[12..], [3072, 0, 1, 3857]);
		assert_eq!(geo_key_directory(Crs::Unknown), [1, 1, 0, 1, 1025, 0, 1, 1]);
	}

	#[test]
	fn unsupported_color_type() {
		let image = DynamicImage::ImageRgb16(image::ImageBuffer::new(2, 2));
		assert!(encode_geotiff(&raster(image)).is_err());
	}
}
