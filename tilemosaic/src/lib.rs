//! # tilemosaic
//!
//! Builds large georeferenced mosaics from slippy-map tiles named `tile_z<Z>_x<X>_y<Y>.<ext>`.
//!
//! ## Tools
//! - **Groups**: partition the tile range into overlapping square groups and stitch each group
//!   into an RGBA GeoTIFF, see [`GroupPlanner`] and [`MosaicAssembler`].
//! - **Merge**: merge all tiles into one raster, see [`FullMosaicMerger`].
//! - **Downsample**: resample tiles to a target ground sampling distance, see [`Downsampler`].
//! - **Trim**: cut the overlap border off group mosaics, see [`Trimmer`].
//!
//! ## Usage Example
//!
//! ```rust
//! use image::{DynamicImage, Rgb, RgbImage};
//! use std::{path::Path, sync::Arc};
//! use tilemosaic::{GroupPlanner, MosaicAssembler, MosaicConfig, TileCatalog};
//! use tilemosaic_core::TileCoord;
//! use tilemosaic_image::{Crs, GeoRaster, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! for (x, y) in [(100, 200), (101, 201)] {
//!     let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(155, 155, Rgb([90, 120, 60])));
//!     let bounds = TileCoord::new(18, x, y).unwrap().to_geo_bbox().as_array();
//!     let raster = GeoRaster::from_bounds(image, bounds, Crs::WGS84).unwrap();
//!     store.insert(format!("input/tile_z18_x{x}_y{y}.tif"), raster);
//! }
//!
//! let config = MosaicConfig { group_size: 2, stride: 2, padding: 0, ..MosaicConfig::default() };
//! let catalog = Arc::new(TileCatalog::discover(store.as_ref(), Path::new("input"), &config).unwrap());
//! let plan = GroupPlanner::from_config(&config).unwrap().plan(&catalog);
//! assert_eq!(plan.len(), 1);
//!
//! let assembler = MosaicAssembler::from_config(catalog, store, &config);
//! let mosaic = assembler.assemble(&plan[0].group).unwrap().unwrap();
//! assert_eq!((mosaic.width(), mosaic.height()), (310, 310));
//! assert_eq!(mosaic.band_count(), 4);
//! ```

mod assembler;
pub use assembler::*;

mod batch;
pub use batch::*;

mod catalog;
pub use catalog::*;

mod config;
pub use config::*;

mod downsampler;
pub use downsampler::*;

mod merger;
pub use merger::*;

mod planner;
pub use planner::*;

mod trimmer;
pub use trimmer::*;
