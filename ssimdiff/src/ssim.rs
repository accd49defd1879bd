//! Structural similarity (SSIM).
//!
//! Scoring is delegated to `image-compare`'s `MSSIMSimple`: the luma planes
//! are split into non-overlapping [`TILE_SIZE`] x [`TILE_SIZE`] tiles (edge
//! tiles clipped), SSIM is evaluated per tile with `K1 = 0.01`, `K2 = 0.03`
//! and the score is the area-weighted tile mean. Every pixel of a tile carries
//! that tile's SSIM in the map.
//!
//! The requested window only gates the input size: the common shape must hold
//! it, or the largest odd window that fits, or the comparison fails with
//! [`CompareError::TooSmall`].

use image::GrayImage;
use image_compare::Algorithm;
use imgref::ImgVec;
use log::debug;

use crate::CompareError;

/// Default window edge length.
pub const DEFAULT_WINDOW_SIZE: usize = 7;

/// Smallest window the scorer will shrink to.
pub const MIN_WINDOW_SIZE: usize = 3;

/// Tile edge `image-compare` computes SSIM statistics over.
pub const TILE_SIZE: u32 = 8;

/// Output of [`compute_similarity`].
#[derive(Debug, Clone)]
pub struct SimilarityMap {
    /// Mean SSIM clamped to [0, 1].
    pub score: f64,
    /// Per-pixel local dissimilarity `clamp(1 - ssim, 0, 1)`.
    pub dissimilarity: ImgVec<f32>,
    /// Window the inputs were checked against.
    pub window: usize,
}

/// Picks the window for a `width` x `height` image.
///
/// Returns `requested` if it fits, otherwise the largest odd size that does.
/// Fails with [`CompareError::TooSmall`] if not even [`MIN_WINDOW_SIZE`] fits.
pub fn effective_window(width: u32, height: u32, requested: usize) -> Result<usize, CompareError> {
    let fit = width.min(height) as usize;
    if requested <= fit {
        return Ok(requested);
    }
    let largest_odd = if fit % 2 == 0 { fit.saturating_sub(1) } else { fit };
    if largest_odd < MIN_WINDOW_SIZE {
        return Err(CompareError::TooSmall { width, height });
    }
    debug!("shrinking SSIM window from {requested} to {largest_odd} for {width}x{height}");
    Ok(largest_odd)
}

/// Computes SSIM between two gray images of identical shape.
///
/// # Panics
/// Panics if the images differ in size.
pub fn compute_similarity(
    a: &GrayImage,
    b: &GrayImage,
    window: usize,
) -> Result<SimilarityMap, CompareError> {
    assert_eq!(a.dimensions(), b.dimensions(), "SSIM inputs must share a shape");
    if window < MIN_WINDOW_SIZE || window % 2 == 0 {
        return Err(CompareError::InvalidParams(format!(
            "window size must be odd and at least {MIN_WINDOW_SIZE}, got {window}"
        )));
    }
    let (width, height) = a.dimensions();
    let window = effective_window(width, height, window)?;

    let similarity = image_compare::gray_similarity_structure(&Algorithm::MSSIMSimple, a, b)?;
    let score = similarity.score.clamp(0.0, 1.0);

    // The gray map comes back as clamp(ssim, 0, 1) * 255
    let map = similarity.image.to_color_map().into_luma8();
    let dissimilarity = ImgVec::new(
        map.pixels()
            .map(|p| 1.0 - f32::from(p.0[0]) / 255.0)
            .collect(),
        width as usize,
        height as usize,
    );

    Ok(SimilarityMap {
        score,
        dissimilarity,
        window,
    })
}
