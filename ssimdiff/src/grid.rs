//! Decoded pixel grids and their shapes.

use std::fmt;

use image::{ColorType, DynamicImage, RgbImage};
use imgref::ImgRef;
use rgb::RGB8;
use serde::Serialize;

/// Shape of a pixel grid as (height, width, channels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Shape {
    /// Rows.
    pub height: u32,
    /// Columns.
    pub width: u32,
    /// Samples per pixel: 1 (gray), 3 (RGB) or 4 (RGBA).
    pub channels: u8,
}

impl Shape {
    /// Creates a shape.
    pub const fn new(height: u32, width: u32, channels: u8) -> Self {
        Self {
            height,
            width,
            channels,
        }
    }

    /// True if either spatial dimension is zero.
    pub const fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0
    }

    /// Compact `HxWxC` form used in delimited reports.
    pub fn compact(&self) -> String {
        format!("{}x{}x{}", self.height, self.width, self.channels)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.height, self.width, self.channels)
    }
}

/// An immutable decoded image.
///
/// Samples are unsigned 8-bit, row-major, in one of three layouts:
/// gray (`L`), `R G B`, or `R G B A`. Higher bit depths are reduced to 8 bits
/// and gray+alpha is widened to RGBA when the grid is built.
#[derive(Debug, Clone)]
pub struct PixelGrid {
    pixels: DynamicImage,
    origin: String,
}

impl PixelGrid {
    /// Wraps a decoded image, normalizing its layout.
    ///
    /// `origin` is the path or label reported in errors.
    pub fn from_dynamic(image: DynamicImage, origin: impl Into<String>) -> Self {
        let pixels = match image.color() {
            ColorType::L8 | ColorType::Rgb8 | ColorType::Rgba8 => image,
            ColorType::L16 => DynamicImage::ImageLuma8(image.to_luma8()),
            color if color.has_alpha() => DynamicImage::ImageRgba8(image.to_rgba8()),
            _ => DynamicImage::ImageRgb8(image.to_rgb8()),
        };
        Self {
            pixels,
            origin: origin.into(),
        }
    }

    /// Wraps an RGB buffer.
    pub fn from_rgb_image(image: RgbImage, origin: impl Into<String>) -> Self {
        Self {
            pixels: DynamicImage::ImageRgb8(image),
            origin: origin.into(),
        }
    }

    /// Copies an `imgref` RGB image (the layout used by other metric crates).
    pub fn from_rgb8(img: ImgRef<'_, RGB8>, origin: impl Into<String>) -> Self {
        let width = img.width() as u32;
        let height = img.height() as u32;
        let mut raw = Vec::with_capacity(img.width() * img.height() * 3);
        for row in img.rows() {
            for px in row {
                raw.extend_from_slice(&[px.r, px.g, px.b]);
            }
        }
        // Length is exactly width * height * 3 by construction
        let image = RgbImage::from_raw(width, height, raw)
            .unwrap_or_else(|| RgbImage::new(width, height));
        Self::from_rgb_image(image, origin)
    }

    /// Shape of the grid as decoded.
    pub fn shape(&self) -> Shape {
        Shape::new(
            self.pixels.height(),
            self.pixels.width(),
            self.pixels.color().channel_count(),
        )
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Samples per pixel.
    pub fn channels(&self) -> u8 {
        self.pixels.color().channel_count()
    }

    /// Path or label this grid was loaded from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Borrow the underlying image.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.pixels
    }

    /// RGB copy: gray is replicated across channels, alpha is dropped.
    pub fn to_rgb(&self) -> RgbImage {
        self.pixels.to_rgb8()
    }
}
