//! # ssimdiff
//!
//! Compares two raster images by structural similarity (SSIM) and renders a
//! visual map of where they differ.
//!
//! The pipeline is a chain of pure stages:
//! - Loader: decodes JPEG, PNG, BMP or TIFF into a [`PixelGrid`]
//! - Normalizer: resizes both inputs to their common (smallest) shape and
//!   derives BT.601 luma planes
//! - Scorer: SSIM over the luma planes via `image-compare`, producing a mean
//!   score and a per-pixel map
//! - Renderer: red highlight overlay and side-by-side composite
//! - Report: human readable summary and structured records
//!
//! ## Example
//!
//! ```rust
//! use image::{Rgb, RgbImage};
//! use ssimdiff::{compare, CompareParams, PixelGrid};
//!
//! let red = RgbImage::from_pixel(32, 32, Rgb([255, 0, 0]));
//! let a = PixelGrid::from_rgb_image(red.clone(), "a");
//! let b = PixelGrid::from_rgb_image(red, "b");
//!
//! let result = compare(&a, &b, &CompareParams::default()).unwrap();
//! assert_eq!(result.similarity_score(), 1.0);
//! assert!(result.identical());
//! ```
//!
//! ## Pinned choices
//!
//! - Resize: bilinear (`FilterType::Triangle`), skipped when shapes match
//! - Luma: `0.299 R + 0.587 G + 0.114 B`
//! - SSIM: `image-compare` `MSSIMSimple`, 8x8 tiles, `K1 = 0.01`, `K2 = 0.03`;
//!   inputs must hold a 7x7 window (shrunk to 3x3 at most)
//! - Highlight: dissimilarity `> 0.1`, red at 70% opacity

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod batch;
mod compare;
mod grid;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod render;
pub mod report;
pub mod ssim;

use std::io;
use std::path::PathBuf;

pub use compare::{compare, compare_bytes, compare_files, ComparisonResult};
pub use grid::{PixelGrid, Shape};
pub use loader::{is_supported_extension, load_image, load_image_from_memory};
pub use render::Region;
pub use ssim::{DEFAULT_WINDOW_SIZE, MIN_WINDOW_SIZE};

// Re-export the pixel container types used at the API boundary
pub use image::{GrayImage, RgbImage};
pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb::RGB8;

/// Why an input could not be turned into a [`PixelGrid`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LoadFailure {
    /// No file at the given path.
    #[error("file not found")]
    NotFound,
    /// The file exists but could not be read.
    #[error("unreadable: {0}")]
    Read(#[source] io::Error),
    /// Content does not match any known image signature.
    #[error("unrecognized image data")]
    UnknownFormat,
    /// Recognized, but not one of JPEG, PNG, BMP or TIFF.
    #[error("unsupported format {0:?} (expected JPEG, PNG, BMP or TIFF)")]
    Unsupported(image::ImageFormat),
    /// Corrupt or truncated data.
    #[error("decode failed: {0}")]
    Decode(#[source] image::ImageError),
}

/// Error type for comparison operations.
///
/// Every variant belongs to exactly one pipeline stage, see [`CompareError::stage`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CompareError {
    /// An input could not be loaded.
    #[error("cannot load '{origin}': {reason}")]
    Load {
        /// Path or label of the input.
        origin: String,
        /// Underlying cause.
        reason: LoadFailure,
    },
    /// An input has zero width or height.
    #[error("zero-sized image '{origin}': {width}x{height}")]
    Dimension {
        /// Path or label of the input.
        origin: String,
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },
    /// The common shape cannot fit the minimum SSIM window.
    #[error(
        "image too small: {width}x{height} (minimum {min}x{min} for the similarity window)",
        min = MIN_WINDOW_SIZE
    )]
    TooSmall {
        /// Common width.
        width: u32,
        /// Common height.
        height: u32,
    },
    /// An output artifact could not be written.
    #[error("failed to write '{}': {source}", path.display())]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying cause.
        source: io::Error,
    },
    /// A [`CompareParams`] value is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParams(String),
    /// The similarity backend rejected the planes.
    #[error("similarity computation failed: {0}")]
    Similarity(#[from] image_compare::CompareError),
}

impl CompareError {
    /// Name of the pipeline stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::Dimension { .. } => "normalize",
            Self::TooSmall { .. } | Self::Similarity(_) => "score",
            Self::Io { .. } => "write",
            Self::InvalidParams(_) => "params",
        }
    }
}

/// Threshold on per-pixel dissimilarity above which a pixel is highlighted.
pub const DEFAULT_HIGHLIGHT_THRESHOLD: f32 = 0.1;

/// Opacity of the red highlight blended over the first image.
pub const DEFAULT_HIGHLIGHT_OPACITY: f32 = 0.7;

/// Comparison parameters.
///
/// Use the builder pattern to construct:
/// ```rust
/// use ssimdiff::CompareParams;
///
/// let params = CompareParams::new()
///     .with_window_size(11)          // larger structural window
///     .with_highlight_threshold(0.2) // only flag strong differences
///     .with_render_diff(false)       // no difference image
///     .with_render_composite(false); // no side-by-side composite
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CompareParams {
    window_size: usize,
    highlight_threshold: f32,
    highlight_opacity: f32,
    render_diff: bool,
    render_composite: bool,
}

impl Default for CompareParams {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            highlight_threshold: DEFAULT_HIGHLIGHT_THRESHOLD,
            highlight_opacity: DEFAULT_HIGHLIGHT_OPACITY,
            render_diff: true,
            render_composite: true,
        }
    }
}

impl CompareParams {
    /// Creates a new `CompareParams` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the SSIM window the common shape must hold (odd, at least 3).
    ///
    /// Images smaller than the window are accepted if the largest odd window
    /// that fits is at least [`MIN_WINDOW_SIZE`]. Scoring itself always uses
    /// [`ssim::TILE_SIZE`] tiles.
    #[must_use]
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Sets the dissimilarity threshold for highlighting (0.0 - 1.0).
    #[must_use]
    pub fn with_highlight_threshold(mut self, threshold: f32) -> Self {
        self.highlight_threshold = threshold;
        self
    }

    /// Sets the opacity of the highlight overlay (0.0 - 1.0).
    #[must_use]
    pub fn with_highlight_opacity(mut self, opacity: f32) -> Self {
        self.highlight_opacity = opacity;
        self
    }

    /// Sets whether to render the highlighted difference image.
    #[must_use]
    pub fn with_render_diff(mut self, render_diff: bool) -> Self {
        self.render_diff = render_diff;
        self
    }

    /// Sets whether to render the side-by-side composite.
    ///
    /// The composite holds both resized inputs, so batch runs leave it off.
    #[must_use]
    pub fn with_render_composite(mut self, render_composite: bool) -> Self {
        self.render_composite = render_composite;
        self
    }

    /// Returns the requested SSIM window size.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Returns the highlight threshold.
    pub fn highlight_threshold(&self) -> f32 {
        self.highlight_threshold
    }

    /// Returns the highlight opacity.
    pub fn highlight_opacity(&self) -> f32 {
        self.highlight_opacity
    }

    /// Returns whether the difference image is rendered.
    pub fn render_diff(&self) -> bool {
        self.render_diff
    }

    /// Returns whether the side-by-side composite is rendered.
    pub fn render_composite(&self) -> bool {
        self.render_composite
    }

    /// Checks that every setting is in range.
    pub fn validate(&self) -> Result<(), CompareError> {
        if self.window_size < MIN_WINDOW_SIZE || self.window_size % 2 == 0 {
            return Err(CompareError::InvalidParams(format!(
                "window size must be odd and at least {MIN_WINDOW_SIZE}, got {}",
                self.window_size
            )));
        }
        if !(0.0..=1.0).contains(&self.highlight_threshold) {
            return Err(CompareError::InvalidParams(format!(
                "highlight threshold must be within 0..=1, got {}",
                self.highlight_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.highlight_opacity) {
            return Err(CompareError::InvalidParams(format!(
                "highlight opacity must be within 0..=1, got {}",
                self.highlight_opacity
            )));
        }
        Ok(())
    }
}
