//! Pixel operations on `DynamicImage` used by the mosaicking tools.
//!
//! - Resampling to an exact size (`Lanczos3` for quality, nearest neighbour for alignment)
//! - Converting tiles onto the RGBA mosaic canvas, with alpha marking coverage
//! - Pasting one image into another at a pixel offset
//! - Cropping a border

use anyhow::{Context, Result, bail, ensure};
use fast_image_resize::{FilterType, ResizeAlg, ResizeOptions, Resizer};
use image::{ColorType, DynamicImage, imageops::replace};

pub trait DynamicImageTraitOperation {
	/// Number of channels (1, 3 or 4 for the supported 8 bit variants).
	fn channel_count(&self) -> u8;

	/// Resamples to `width × height` with a Lanczos3 convolution.
	fn get_resampled(&self, width: u32, height: u32) -> Result<DynamicImage>;

	/// Resizes to `width × height` with nearest neighbour sampling, keeping exact pixel values.
	fn get_resized_nearest(&self, width: u32, height: u32) -> Result<DynamicImage>;

	/// Converts a tile into a canvas pixel layout: color as RGB, alpha 255.
	///
	/// Gray is promoted to RGB. An existing alpha channel is discarded, because alpha on the
	/// canvas only records which tile slots are covered.
	fn to_covered_rgba(&self) -> DynamicImage;

	/// Converts to one of the supported 8 bit color types.
	fn get_converted(&self, color: ColorType) -> Result<DynamicImage>;

	/// Copies `top` into `self` with its top-left corner at `(x, y)`, replacing the pixels.
	///
	/// Both images must have the same color type and `top` must fit completely.
	fn paste(&mut self, top: &DynamicImage, x: u32, y: u32) -> Result<()>;

	/// Removes `border` pixels from every side.
	fn get_trimmed(&self, border: u32) -> Result<DynamicImage>;
}

impl DynamicImageTraitOperation for DynamicImage {
	fn channel_count(&self) -> u8 {
		self.color().channel_count()
	}

	fn get_resampled(&self, width: u32, height: u32) -> Result<DynamicImage> {
		resize(self, width, height, ResizeAlg::Convolution(FilterType::Lanczos3))
			.with_context(|| format!("resampling {}x{} to {width}x{height}", self.width(), self.height()))
	}

	fn get_resized_nearest(&self, width: u32, height: u32) -> Result<DynamicImage> {
		resize(self, width, height, ResizeAlg::Nearest)
			.with_context(|| format!("resizing {}x{} to {width}x{height}", self.width(), self.height()))
	}

	fn to_covered_rgba(&self) -> DynamicImage {
		DynamicImage::ImageRgba8(DynamicImage::ImageRgb8(self.to_rgb8()).to_rgba8())
	}

	fn get_converted(&self, color: ColorType) -> Result<DynamicImage> {
		Ok(match color {
			ColorType::L8 => DynamicImage::ImageLuma8(self.to_luma8()),
			ColorType::Rgb8 => DynamicImage::ImageRgb8(self.to_rgb8()),
			ColorType::Rgba8 => DynamicImage::ImageRgba8(self.to_rgba8()),
			_ => bail!("unsupported color type {color:?}"),
		})
	}

	fn paste(&mut self, top: &DynamicImage, x: u32, y: u32) -> Result<()> {
		ensure!(
			self.color() == top.color(),
			"cannot paste a {:?} image into a {:?} image",
			top.color(),
			self.color()
		);
		ensure!(
			u64::from(x) + u64::from(top.width()) <= u64::from(self.width())
				&& u64::from(y) + u64::from(top.height()) <= u64::from(self.height()),
			"{}x{} image at ({x}, {y}) does not fit into {}x{}",
			top.width(),
			top.height(),
			self.width(),
			self.height()
		);
		replace(self, top, i64::from(x), i64::from(y));
		Ok(())
	}

	fn get_trimmed(&self, border: u32) -> Result<DynamicImage> {
		let (width, height) = (self.width(), self.height());
		ensure!(
			u64::from(width) > 2 * u64::from(border) && u64::from(height) > 2 * u64::from(border),
			"cannot remove a border of {border} pixels from a {width}x{height} image"
		);
		Ok(self.crop_imm(border, border, width - 2 * border, height - 2 * border))
	}
}

fn resize(image: &DynamicImage, width: u32, height: u32, alg: ResizeAlg) -> Result<DynamicImage> {
	ensure!(width > 0 && height > 0, "target size {width}x{height} must not be empty");
	let mut dst_image = DynamicImage::new(width, height, image.color());
	Resizer::new().resize(image, &mut dst_image, &ResizeOptions::default().resize_alg(alg))?;
	Ok(dst_image)
}
