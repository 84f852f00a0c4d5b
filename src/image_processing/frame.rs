use anyhow::{anyhow, Result};
use fast_image_resize::{images::Image, PixelType, ResizeOptions, Resizer};
use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::error::InvalidScale;

/// Width of the white border added on every side of the scaled image
pub const FRAME_WIDTH: u32 = 20;

const FRAME_FILL: Rgb<u8> = Rgb([255, 255, 255]);
const FRAME_EDGE: Rgb<u8> = Rgb([0, 0, 0]);

/// Percentage applied to the longer side of an image, always within `0..=100`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScalePercent(u8);

impl ScalePercent {
    pub const FULL: ScalePercent = ScalePercent(100);

    pub fn new(percent: u32) -> Result<Self, InvalidScale> {
        if percent > 100 {
            return Err(InvalidScale(percent));
        }
        Ok(Self(percent as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn factor(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl TryFrom<u32> for ScalePercent {
    type Error = InvalidScale;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for ScalePercent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Size of the scaled picture, before the frame is added.
///
/// The longer side is multiplied by the scale and the shorter one follows the
/// original aspect ratio. Square images take the width branch.
pub fn scaled_dimensions(width: u32, height: u32, scale: ScalePercent) -> (u32, u32) {
    let factor = scale.factor();

    if width >= height {
        let ratio = height as f64 / width as f64;
        let scaled_width = (width as f64 * factor).round() as u32;
        let scaled_height = (ratio * scaled_width as f64).round() as u32;
        (scaled_width, scaled_height)
    } else {
        let ratio = width as f64 / height as f64;
        let scaled_height = (height as f64 * factor).round() as u32;
        let scaled_width = (ratio * scaled_height as f64).round() as u32;
        (scaled_width, scaled_height)
    }
}

/// Size of the final canvas for a picture of the given scaled size
pub fn framed_dimensions(scaled_width: u32, scaled_height: u32) -> (u32, u32) {
    (
        scaled_width + FRAME_WIDTH * 2,
        scaled_height + FRAME_WIDTH * 2,
    )
}

/// Build the framed canvas: white background, one pixel black edge and the
/// scaled picture inset by [`FRAME_WIDTH`].
///
/// A zero-sized interior (scale 0, or a very thin image) leaves the frame empty.
pub fn frame_image(img: &RgbImage, scale: ScalePercent) -> Result<RgbImage> {
    let (src_width, src_height) = img.dimensions();
    let (scaled_width, scaled_height) = scaled_dimensions(src_width, src_height, scale);
    let (canvas_width, canvas_height) = framed_dimensions(scaled_width, scaled_height);

    let mut canvas = RgbImage::from_pixel(canvas_width, canvas_height, FRAME_FILL);
    draw_hollow_rect_mut(
        &mut canvas,
        Rect::at(0, 0).of_size(canvas_width, canvas_height),
        FRAME_EDGE,
    );

    if scaled_width > 0 && scaled_height > 0 {
        let scaled = resize_image(img, scaled_width, scaled_height)?;
        imageops::replace(&mut canvas, &scaled, FRAME_WIDTH as i64, FRAME_WIDTH as i64);
    }

    Ok(canvas)
}

/// Resize with a Lanczos3 convolution; same-size requests return an exact copy
fn resize_image(img: &RgbImage, width: u32, height: u32) -> Result<RgbImage> {
    let (src_width, src_height) = img.dimensions();

    if src_width == width && src_height == height {
        return Ok(img.clone());
    }

    if src_width == 0 || src_height == 0 || width == 0 || height == 0 {
        return Err(anyhow!(
            "Cannot resize {}x{} image to {}x{}",
            src_width,
            src_height,
            width,
            height
        ));
    }

    let src_image = Image::from_vec_u8(src_width, src_height, img.as_raw().clone(), PixelType::U8x3)?;
    let mut dst_image = Image::new(width, height, PixelType::U8x3);

    let mut resizer = Resizer::new();
    resizer.resize(&src_image, &mut dst_image, Some(&ResizeOptions::default()))?;

    RgbImage::from_raw(width, height, dst_image.buffer().to_vec())
        .ok_or_else(|| anyhow!("Resized buffer does not match {}x{}", width, height))
}
