use anyhow::{anyhow, Result};
use fast_image_resize::{images::Image, ResizeOptions, Resizer};
use image::{imageops, ImageBuffer, Rgb, RgbImage};

use super::crop::OUTPUT_SIZE;

/// Letterbox a crop onto a square black canvas.
///
/// The canvas side is the larger of the crop dimensions and the crop is
/// pasted centered with integer-division offsets. No resampling happens at
/// this step.
pub fn letterbox(crop: &RgbImage) -> RgbImage {
    let (width, height) = crop.dimensions();
    let max_dim = width.max(height);

    let mut canvas: RgbImage = ImageBuffer::from_pixel(max_dim, max_dim, Rgb([0, 0, 0]));

    let x = (max_dim - width) / 2;
    let y = (max_dim - height) / 2;
    imageops::replace(&mut canvas, crop, i64::from(x), i64::from(y));

    canvas
}

/// Resize a square canvas to the fixed output resolution in a single pass.
///
/// Resampling filter: Lanczos3 (the fast_image_resize default convolution).
/// Buffers stay interleaved RGB (U8x3) throughout, so channel order is
/// preserved.
pub fn resize_to_output(img: RgbImage) -> Result<RgbImage> {
    let (width, height) = img.dimensions();
    if width == OUTPUT_SIZE && height == OUTPUT_SIZE {
        return Ok(img);
    }

    let src = Image::from_vec_u8(
        width,
        height,
        img.into_raw(),
        fast_image_resize::PixelType::U8x3,
    )?;
    let mut dst = Image::new(OUTPUT_SIZE, OUTPUT_SIZE, fast_image_resize::PixelType::U8x3);

    let mut resizer = Resizer::new();
    resizer.resize(&src, &mut dst, Some(&ResizeOptions::default()))?;

    RgbImage::from_raw(OUTPUT_SIZE, OUTPUT_SIZE, dst.buffer().to_vec())
        .ok_or_else(|| anyhow!("Resized buffer does not match {0}x{0}", OUTPUT_SIZE))
}

/// Full compositing step for one crop: letterbox then resize.
pub fn process_crop(crop: &RgbImage) -> Result<RgbImage> {
    resize_to_output(letterbox(crop))
}
