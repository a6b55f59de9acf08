//! Merging georeferenced rasters into one raster spanning their union.
//!
//! The canvas uses the finest input resolution. Rasters are copied in input order with plain
//! overwrite, so where footprints overlap the last raster wins. Rasters at a coarser resolution
//! are scaled up with nearest neighbour sampling first.

use anyhow::{Context, Result};
use futures::{StreamExt, TryStreamExt, stream};
use image::{DynamicImage, imageops::replace};
use std::{borrow::Cow, path::PathBuf, sync::Arc};
use tilemosaic_core::{GeoTransform, MosaicError};
use tilemosaic_image::{DynamicImageTraitOperation, GeoRaster, RasterStore};

#[derive(Debug, Clone, Copy, Default)]
pub struct FullMosaicMerger;

impl FullMosaicMerger {
	/// Merges `rasters` in order.
	///
	/// Color type, CRS and nodata of the result are taken from the first raster.
	///
	/// # Errors
	/// [`MosaicError::NoTiles`] if `rasters` is empty.
	pub fn merge(rasters: &[GeoRaster]) -> Result<GeoRaster> {
		let Some(first) = rasters.first() else {
			return Err(MosaicError::NoTiles.into());
		};

		let [mut west, mut south, mut east, mut north] = first.bounds();
		let mut pixel_width = first.transform.pixel_width();
		let mut pixel_height = first.transform.pixel_height();
		for raster in rasters {
			raster.validate()?;
			let [w, s, e, n] = raster.bounds();
			(west, south, east, north) = (west.min(w), south.min(s), east.max(e), north.max(n));
			pixel_width = pixel_width.min(raster.transform.pixel_width());
			pixel_height = pixel_height.min(raster.transform.pixel_height());
			if raster.crs != first.crs {
				log::warn!("raster in {} is merged into a mosaic in {}", raster.crs, first.crs);
			}
		}

		let width = ((east - west) / pixel_width).round().max(1.0) as u32;
		let height = ((north - south) / pixel_height).round().max(1.0) as u32;
		log::debug!("merging {} rasters into {width}x{height} pixels", rasters.len());

		let color = first.image.color();
		let mut canvas = DynamicImage::new(width, height, color);

		for raster in rasters {
			let mut image = Cow::Borrowed(&raster.image);
			if image.color() != color {
				image = Cow::Owned(image.get_converted(color)?);
			}

			let [w, s, e, n] = raster.bounds();
			let target_width = ((e - w) / pixel_width).round().max(1.0) as u32;
			let target_height = ((n - s) / pixel_height).round().max(1.0) as u32;
			if (target_width, target_height) != (image.width(), image.height()) {
				image = Cow::Owned(image.get_resized_nearest(target_width, target_height)?);
			}

			let col = ((w - west) / pixel_width).round() as i64;
			let row = ((north - n) / pixel_height).round() as i64;
			replace(&mut canvas, image.as_ref(), col, row);
		}

		Ok(GeoRaster {
			image: canvas,
			transform: GeoTransform::from_origin(west, north, pixel_width, pixel_height),
			crs: first.crs,
			nodata: first.nodata,
		})
	}

	/// Reads `paths` with up to `concurrency` parallel reads and merges them in the given order.
	pub async fn merge_paths(store: Arc<dyn RasterStore>, paths: Vec<PathBuf>, concurrency: usize) -> Result<GeoRaster> {
		if paths.is_empty() {
			return Err(MosaicError::NoTiles.into());
		}

		let rasters: Vec<GeoRaster> = stream::iter(paths)
			.map(|path| {
				let store = Arc::clone(&store);
				async move {
					tokio::task::spawn_blocking(move || store.read(&path).with_context(|| format!("reading {path:?}"))).await?
				}
			})
			.buffered(concurrency.max(1))
			.try_collect()
			.await?;

		tokio::task::spawn_blocking(move || FullMosaicMerger::merge(&rasters)).await?
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;
	use image::{GenericImageView, Rgb, RgbImage, RgbaImage};
	use pretty_assertions::assert_eq;
	use tilemosaic_image::{Crs, MemoryStore};

	fn solid(width: u32, height: u32, value: u8, bounds: [f64; 4]) -> GeoRaster {
		let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value, value, value])));
		GeoRaster::from_bounds(image, bounds, Crs::WGS84).unwrap()
	}

	#[test]
	fn empty_input() {
		let err = FullMosaicMerger::merge(&[]).unwrap_err();
		assert_eq!(MosaicError::kind_of(&err), Some(&MosaicError::NoTiles));
	}

	#[test]
	fn identical_footprints_keep_the_last() {
		let bounds = [10.0, 20.0, 11.0, 21.0];
		let rasters = [solid(4, 4, 1, bounds), solid(4, 4, 2, bounds), solid(4, 4, 3, bounds)];
		let merged = FullMosaicMerger::merge(&rasters).unwrap();
		assert_eq!(merged, rasters[2]);
	}

	#[test]
	fn side_by_side() {
		let left = solid(4, 2, 10, [0.0, 0.0, 2.0, 1.0]);
		let right = solid(4, 2, 20, [2.0, 0.0, 4.0, 1.0]);
		let merged = FullMosaicMerger::merge(&[left, right]).unwrap();

		assert_eq!(merged.image.dimensions(), (8, 2));
		assert_eq!(merged.bounds(), [0.0, 0.0, 4.0, 1.0]);
		assert_eq!(merged.image.get_pixel(3, 1).0, [10, 10, 10, 255]);
		assert_eq!(merged.image.get_pixel(4, 0).0, [20, 20, 20, 255]);
	}

	#[test]
	fn gaps_stay_empty_and_overlap_follows_order() {
		let a = solid(2, 2, 10, [0.0, 1.0, 2.0, 3.0]);
		let b = solid(2, 2, 20, [1.0, 0.0, 3.0, 2.0]);
		let merged = FullMosaicMerger::merge(&[a.clone(), b.clone()]).unwrap();
		assert_eq!(merged.image.dimensions(), (3, 3));
		assert_eq!(merged.image.get_pixel(0, 0).0[0], 10);
		assert_eq!(merged.image.get_pixel(1, 1).0[0], 20);
		assert_eq!(merged.image.get_pixel(2, 0).0[0], 0);
		assert_eq!(merged.image.get_pixel(0, 2).0[0], 0);

		let merged = FullMosaicMerger::merge(&[b, a]).unwrap();
		assert_eq!(merged.image.get_pixel(1, 1).0[0], 10);
	}

	#[test]
	fn finest_resolution_wins() {
		let coarse = solid(1, 1, 10, [0.0, 0.0, 2.0, 2.0]);
		let fine = solid(2, 2, 20, [2.0, 0.0, 3.0, 1.0]);
		let merged = FullMosaicMerger::merge(&[coarse, fine]).unwrap();

		assert_eq!(merged.image.dimensions(), (6, 4));
		assert_relative_eq!(merged.transform.pixel_width(), 0.5);
		assert_eq!(merged.image.get_pixel(0, 0).0[0], 10);
		assert_eq!(merged.image.get_pixel(3, 3).0[0], 10);
		assert_eq!(merged.image.get_pixel(4, 2).0[0], 20);
		assert_eq!(merged.image.get_pixel(5, 0).0[0], 0);
	}

	#[test]
	fn color_and_metadata_follow_the_first_raster() {
		let first = solid(2, 2, 10, [0.0, 0.0, 1.0, 1.0]).with_nodata(0.0);
		let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 4])));
		let second = GeoRaster::from_bounds(image, [1.0, 0.0, 2.0, 1.0], Crs::Epsg(3857)).unwrap();

		let merged = FullMosaicMerger::merge(&[first, second]).unwrap();
		assert_eq!(merged.band_count(), 3);
		assert_eq!(merged.crs, Crs::WGS84);
		assert_eq!(merged.nodata, Some(0.0));
		assert_eq!(merged.image.get_pixel(3, 0).0, [1, 2, 3, 255]);
	}

	#[tokio::test]
	async fn merge_paths_keeps_order() {
		let store = Arc::new(MemoryStore::new());
		let bounds = [0.0, 0.0, 1.0, 1.0];
		let mut paths = Vec::new();
		for value in 1..=6 {
			let path = PathBuf::from(format!("in/tile_{value}.tif"));
			store.insert(&path, solid(3, 3, value, bounds));
			paths.push(path);
		}

		let merged = FullMosaicMerger::merge_paths(store.clone(), paths.clone(), 4).await.unwrap();
		assert_eq!(merged.image.get_pixel(1, 1).0[0], 6);

		paths.reverse();
		let merged = FullMosaicMerger::merge_paths(store.clone(), paths, 4).await.unwrap();
		assert_eq!(merged.image.get_pixel(1, 1).0[0], 1);

		let err = FullMosaicMerger::merge_paths(store, vec![PathBuf::from("in/missing.tif")], 4)
			.await
			.unwrap_err();
		assert!(err.to_string().starts_with("reading"));
	}
}
