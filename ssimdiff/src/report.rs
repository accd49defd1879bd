//! Presenting results.
//!
//! Nothing here computes; it only formats a [`ComparisonResult`] or a batch
//! of them.

use std::fmt::Write as _;

use serde::Serialize;

use crate::batch::PairOutcome;
use crate::render::Region;
use crate::{ComparisonResult, Shape};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Multi-line human readable summary.
pub fn summary(result: &ComparisonResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Image Comparison Results:");
    let _ = writeln!(out, "========================");
    let _ = writeln!(out, "Are images identical: {}", result.identical());
    let _ = writeln!(out, "Similarity score: {:.2}%", result.similarity_percentage());
    let _ = writeln!(
        out,
        "Difference percentage: {:.2}%",
        result.difference_percentage()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Original image shapes:");
    let _ = writeln!(out, "- Image 1: {}", result.original_shape_1());
    let _ = writeln!(out, "- Image 2: {}", result.original_shape_2());
    let _ = writeln!(out);
    let _ = writeln!(out, "Resized to common shape: {}", result.common_shape());
    if let Some(region) = result.changed_region() {
        let _ = writeln!(
            out,
            "Changed region: {}x{} at ({}, {})",
            region.width, region.height, region.x, region.y
        );
    }
    out
}

/// Structured view of one comparison, in a fixed field order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRecord {
    /// Path or label of the first input.
    pub image_1: String,
    /// Path or label of the second input.
    pub image_2: String,
    /// Score is exactly 1.0 and the resized images are pixel-equal.
    pub identical: bool,
    /// Mean SSIM in [0, 1].
    pub similarity_score: f64,
    /// `similarity_score * 100`, rounded to 2 decimal places.
    pub similarity_percentage: f64,
    /// `100 - similarity_percentage`, rounded to 2 decimal places.
    pub difference_percentage: f64,
    /// Decoded shape of the first input.
    pub original_shape_1: Shape,
    /// Decoded shape of the second input.
    pub original_shape_2: Shape,
    /// Shape both inputs were resized to.
    pub common_shape: Shape,
    /// SSIM window the common shape was checked against.
    pub window_size: usize,
    /// Pixels above the highlight threshold.
    pub highlighted_pixels: usize,
    /// Bounding box of the highlighted pixels, absent when none are.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_region: Option<Region>,
}

/// Column order of [`ReportRecord::fields`].
pub const FIELD_NAMES: [&str; 12] = [
    "image_1",
    "image_2",
    "identical",
    "similarity_score",
    "similarity_percentage",
    "difference_percentage",
    "original_shape_1",
    "original_shape_2",
    "common_shape",
    "window_size",
    "highlighted_pixels",
    "changed_region",
];

impl ReportRecord {
    /// Extracts the record from a result.
    pub fn from_result(result: &ComparisonResult) -> Self {
        Self {
            image_1: result.first_origin().to_string(),
            image_2: result.second_origin().to_string(),
            identical: result.identical(),
            similarity_score: result.similarity_score(),
            similarity_percentage: round2(result.similarity_percentage()),
            difference_percentage: round2(result.difference_percentage()),
            original_shape_1: result.original_shape_1(),
            original_shape_2: result.original_shape_2(),
            common_shape: result.common_shape(),
            window_size: result.window_size(),
            highlighted_pixels: result.highlighted_pixels(),
            changed_region: result.changed_region(),
        }
    }

    /// Field name to value, in [`FIELD_NAMES`] order.
    ///
    /// Shapes are written `HxWxC`, the region `WxH+X+Y` (empty if none).
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let region = self
            .changed_region
            .map(|r| format!("{}x{}+{}+{}", r.width, r.height, r.x, r.y))
            .unwrap_or_default();
        let values = [
            self.image_1.clone(),
            self.image_2.clone(),
            self.identical.to_string(),
            format!("{:.6}", self.similarity_score),
            format!("{:.2}", self.similarity_percentage),
            format!("{:.2}", self.difference_percentage),
            self.original_shape_1.compact(),
            self.original_shape_2.compact(),
            self.common_shape.compact(),
            self.window_size.to_string(),
            self.highlighted_pixels.to_string(),
            region,
        ];
        FIELD_NAMES.into_iter().zip(values).collect()
    }

    /// `key=value` lines.
    pub fn to_key_value(&self) -> String {
        self.fields()
            .into_iter()
            .fold(String::new(), |mut out, (key, value)| {
                let _ = writeln!(out, "{key}={value}");
                out
            })
    }

    /// CSV header line (no trailing newline).
    pub fn csv_header() -> String {
        FIELD_NAMES.join(",")
    }

    /// CSV data line (no trailing newline).
    pub fn to_csv_row(&self) -> String {
        self.fields()
            .into_iter()
            .map(|(_, value)| csv_escape(&value))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Aggregate over a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Similarity percentages over successful pairs; `None` if there were none.
    pub min_similarity: Option<f64>,
    pub max_similarity: Option<f64>,
    pub mean_similarity: Option<f64>,
}

impl BatchSummary {
    /// Tallies outcomes.
    pub fn from_outcomes(outcomes: &[PairOutcome]) -> Self {
        let percentages: Vec<f64> = outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(ComparisonResult::similarity_percentage)
            .collect();
        let succeeded = percentages.len();
        let (min, max, mean) = if percentages.is_empty() {
            (None, None, None)
        } else {
            (
                Some(percentages.iter().copied().fold(f64::INFINITY, f64::min)),
                Some(percentages.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
                Some(percentages.iter().sum::<f64>() / succeeded as f64),
            )
        };
        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            min_similarity: min,
            max_similarity: max,
            mean_similarity: mean,
        }
    }

    /// Human readable block.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Batch Comparison Summary:");
        let _ = writeln!(out, "==================================================");
        let _ = writeln!(out, "Total pairs processed: {}", self.total);
        let _ = writeln!(out, "Successful comparisons: {}", self.succeeded);
        let _ = writeln!(out, "Failed comparisons: {}", self.failed);
        if let (Some(min), Some(max), Some(mean)) =
            (self.min_similarity, self.max_similarity, self.mean_similarity)
        {
            let _ = writeln!(out, "Average similarity: {mean:.2}%");
            let _ = writeln!(out, "Similarity range: {min:.2}% - {max:.2}%");
        }
        out
    }
}
