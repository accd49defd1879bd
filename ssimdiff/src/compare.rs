//! The comparison entry points.

use std::path::Path;

use image::RgbImage;
use log::debug;

use crate::loader::{load_image, load_image_from_memory};
use crate::normalize::normalize_pair;
use crate::render::{changed_region, highlight_differences, highlighted_pixels, side_by_side, Region};
use crate::ssim::compute_similarity;
use crate::{CompareError, CompareParams, PixelGrid, Shape};

/// Result of comparing two images.
///
/// Built once per comparison and never modified afterwards.
/// `difference_percentage` is always `100 - similarity_score * 100`.
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    first_origin: String,
    second_origin: String,
    similarity_score: f64,
    difference_percentage: f64,
    original_shape_1: Shape,
    original_shape_2: Shape,
    common_shape: Shape,
    identical: bool,
    window_size: usize,
    highlighted_pixels: usize,
    changed_region: Option<Region>,
    difference_image: Option<RgbImage>,
    side_by_side: Option<RgbImage>,
}

impl ComparisonResult {
    /// Path or label of the first input.
    pub fn first_origin(&self) -> &str {
        &self.first_origin
    }

    /// Path or label of the second input.
    pub fn second_origin(&self) -> &str {
        &self.second_origin
    }

    /// Mean SSIM in [0, 1]; 1 means structurally identical.
    pub fn similarity_score(&self) -> f64 {
        self.similarity_score
    }

    /// `similarity_score * 100`.
    pub fn similarity_percentage(&self) -> f64 {
        self.similarity_score * 100.0
    }

    /// `100 - similarity_score * 100`.
    pub fn difference_percentage(&self) -> f64 {
        self.difference_percentage
    }

    /// Shape of the first input as decoded.
    pub fn original_shape_1(&self) -> Shape {
        self.original_shape_1
    }

    /// Shape of the second input as decoded.
    pub fn original_shape_2(&self) -> Shape {
        self.original_shape_2
    }

    /// Shape both inputs were resized to.
    pub fn common_shape(&self) -> Shape {
        self.common_shape
    }

    /// True iff the score is exactly 1.0 and the resized images are
    /// pixel-equal.
    pub fn identical(&self) -> bool {
        self.identical
    }

    /// SSIM window the common shape was checked against (may be smaller
    /// than requested).
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Pixels above the highlight threshold.
    pub fn highlighted_pixels(&self) -> usize {
        self.highlighted_pixels
    }

    /// Bounding box of the highlighted pixels.
    pub fn changed_region(&self) -> Option<Region> {
        self.changed_region
    }

    /// First resized image with differences highlighted, if rendered.
    pub fn difference_image(&self) -> Option<&RgbImage> {
        self.difference_image.as_ref()
    }

    /// Both resized images side by side, if rendered.
    pub fn side_by_side(&self) -> Option<&RgbImage> {
        self.side_by_side.as_ref()
    }
}

/// Compares two decoded images.
pub fn compare(
    a: &PixelGrid,
    b: &PixelGrid,
    params: &CompareParams,
) -> Result<ComparisonResult, CompareError> {
    params.validate()?;

    let pair = normalize_pair(a, b)?;
    let similarity = compute_similarity(&pair.first_luma, &pair.second_luma, params.window_size())?;

    let threshold = params.highlight_threshold();
    let dissimilarity = similarity.dissimilarity.as_ref();
    let difference_image = params.render_diff().then(|| {
        highlight_differences(
            &pair.first,
            dissimilarity,
            threshold,
            params.highlight_opacity(),
        )
    });
    let composite = params
        .render_composite()
        .then(|| side_by_side(&pair.first, &pair.second));

    let identical = similarity.score == 1.0 && pair.first.as_raw() == pair.second.as_raw();
    let score = similarity.score;
    debug!(
        "compared {} vs {}: ssim={score:.6} window={} identical={identical}",
        a.origin(),
        b.origin(),
        similarity.window
    );

    Ok(ComparisonResult {
        first_origin: a.origin().to_string(),
        second_origin: b.origin().to_string(),
        similarity_score: score,
        difference_percentage: 100.0 - score * 100.0,
        original_shape_1: a.shape(),
        original_shape_2: b.shape(),
        common_shape: pair.shape(),
        identical,
        window_size: similarity.window,
        highlighted_pixels: highlighted_pixels(dissimilarity, threshold),
        changed_region: changed_region(dissimilarity, threshold),
        difference_image,
        side_by_side: composite,
    })
}

/// Loads and compares two image files.
pub fn compare_files(
    a: &Path,
    b: &Path,
    params: &CompareParams,
) -> Result<ComparisonResult, CompareError> {
    let first = load_image(a)?;
    let second = load_image(b)?;
    compare(&first, &second, params)
}

/// Compares two encoded images held in memory, e.g. uploads.
pub fn compare_bytes(
    a: &[u8],
    b: &[u8],
    params: &CompareParams,
) -> Result<ComparisonResult, CompareError> {
    let first = load_image_from_memory(a, "image 1")?;
    let second = load_image_from_memory(b, "image 2")?;
    compare(&first, &second, params)
}
