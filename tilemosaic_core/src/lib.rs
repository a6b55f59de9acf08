//! Contains the tile index math, bounding boxes, geotransforms and the error kinds shared by the
//! `tilemosaic` crates.

mod concurrency;
pub use concurrency::*;

mod error;
pub use error::*;

pub mod types;
pub use types::*;
