//! Comparing corresponding images across two directories.
//!
//! Pairs are independent, so they are compared on the rayon pool. Results
//! are sorted by the first path afterwards; a failing pair is recorded in
//! its outcome and never stops the run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;

use crate::loader::is_supported_extension;
use crate::{compare_files, CompareError, CompareParams, ComparisonResult, LoadFailure};

/// How files in the two directories are matched up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairingMode {
    /// i-th file of each sorted listing; the longer listing is truncated.
    #[default]
    ByOrder,
    /// Same file name in both directories.
    ByName,
}

/// Two files to compare.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ImagePair {
    /// From the first directory.
    pub first: PathBuf,
    /// From the second directory.
    pub second: PathBuf,
}

/// Result for one pair.
#[derive(Debug)]
pub struct PairOutcome {
    /// 1-based position after sorting.
    pub index: usize,
    /// The inputs.
    pub pair: ImagePair,
    /// The comparison, or why it failed.
    pub result: Result<ComparisonResult, CompareError>,
}

/// Supported image files directly inside `dir`, sorted by path.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, CompareError> {
    let fail = |e: io::Error| CompareError::Load {
        origin: dir.display().to_string(),
        reason: if e.kind() == io::ErrorKind::NotFound {
            LoadFailure::NotFound
        } else {
            LoadFailure::Read(e)
        },
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(fail)? {
        let path = entry.map_err(fail)?.path();
        if path.is_file() && is_supported_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Matches up the images of two directories.
pub fn find_pairs(
    dir_a: &Path,
    dir_b: &Path,
    mode: PairingMode,
) -> Result<Vec<ImagePair>, CompareError> {
    let first = list_images(dir_a)?;
    let pairs: Vec<ImagePair> = match mode {
        PairingMode::ByName => {
            let (pairs, unmatched) = match_by_name(first, dir_b);
            if !unmatched.is_empty() {
                let names: Vec<_> = unmatched.iter().map(|p| p.display().to_string()).collect();
                warn!(
                    "{} file(s) have no counterpart in {}: {}",
                    unmatched.len(),
                    dir_b.display(),
                    names.join(", ")
                );
            }
            pairs
        }
        PairingMode::ByOrder => {
            let second = list_images(dir_b)?;
            if first.len() != second.len() {
                debug!(
                    "directory sizes differ ({} vs {}), pairing the first {}",
                    first.len(),
                    second.len(),
                    first.len().min(second.len())
                );
            }
            first
                .into_iter()
                .zip(second)
                .map(|(first, second)| ImagePair { first, second })
                .collect()
        }
    };
    debug!(
        "found {} pairs in {} and {}",
        pairs.len(),
        dir_a.display(),
        dir_b.display()
    );
    Ok(pairs)
}

/// Splits `first` into pairs with a same-named file in `dir_b` and the rest.
fn match_by_name(first: Vec<PathBuf>, dir_b: &Path) -> (Vec<ImagePair>, Vec<PathBuf>) {
    let mut pairs = Vec::new();
    let mut unmatched = Vec::new();
    for path in first {
        let second = path.file_name().map(|name| dir_b.join(name));
        match second {
            Some(second) if second.is_file() => pairs.push(ImagePair {
                first: path,
                second,
            }),
            _ => unmatched.push(path),
        }
    }
    (pairs, unmatched)
}

/// Compares every pair, in parallel.
///
/// Outcomes come back sorted by the pair paths with `index` assigned in
/// that order.
pub fn run_batch(pairs: &[ImagePair], params: &CompareParams) -> Vec<PairOutcome> {
    let mut outcomes: Vec<PairOutcome> = pairs
        .par_iter()
        .map(|pair| {
            let result = compare_files(&pair.first, &pair.second, params);
            if let Err(e) = &result {
                warn!(
                    "skipping {} vs {}: {e}",
                    pair.first.display(),
                    pair.second.display()
                );
            }
            PairOutcome {
                index: 0,
                pair: pair.clone(),
                result,
            }
        })
        .collect();

    outcomes.sort_by(|a, b| a.pair.cmp(&b.pair));
    for (i, outcome) in outcomes.iter_mut().enumerate() {
        outcome.index = i + 1;
    }
    outcomes
}
