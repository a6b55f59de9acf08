//! Contains types like tile coordinates, bounding boxes, geotransforms and tile file names.

mod geo_bbox;
pub use geo_bbox::*;

mod geo_transform;
pub use geo_transform::*;

mod tile_coord;
pub use tile_coord::*;

mod tile_name;
pub use tile_name::*;

mod tile_range;
pub use tile_range::*;
