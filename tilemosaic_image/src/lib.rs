//! Georeferenced raster handling for the `tilemosaic` tools: the [`GeoRaster`] type, GeoTIFF
//! encoding/decoding, storage backends and pixel operations.

pub mod geotiff;

mod raster;
pub use raster::*;

mod store;
pub use store::*;

pub mod traits;
pub use traits::*;
