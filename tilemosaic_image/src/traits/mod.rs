//! Trait extensions for [`image::DynamicImage`].
//!
//! - [`DynamicImageTraitOperation`]: resampling, canvas conversion, pasting and trimming.
//! - [`DynamicImageTraitTest`]: deterministic test images (tests and the `test` feature only).

mod operation;

pub use operation::*;
#[cfg(any(test, feature = "test"))]
pub use test::*;
