//! Writing artifacts to disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{ImageError, ImageFormat, RgbImage};
use log::debug;

use crate::CompareError;

/// Where a single difference image goes unless told otherwise.
pub const DEFAULT_DIFF_PATH: &str = "diff_output/diff.png";

/// Where batch difference images go unless told otherwise.
pub const DEFAULT_OUTPUT_DIR: &str = "diff_output";

/// File name for the difference image of the `index`-th (1-based) batch pair.
pub fn batch_diff_name(index: usize) -> String {
    format!("diff_pair_{index}.png")
}

fn io_error(path: &Path, source: io::Error) -> CompareError {
    CompareError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn create_parent(path: &Path) -> Result<(), CompareError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))
        }
        _ => Ok(()),
    }
}

/// Writes `image` as PNG, creating missing parent directories.
pub fn save_png(image: &RgbImage, path: &Path) -> Result<PathBuf, CompareError> {
    create_parent(path)?;
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| match e {
            ImageError::IoError(source) => io_error(path, source),
            other => io_error(path, io::Error::other(other.to_string())),
        })?;
    debug!("wrote {}", path.display());
    Ok(path.to_path_buf())
}

/// Writes a text report, creating missing parent directories.
pub fn write_text(contents: &str, path: &Path) -> Result<PathBuf, CompareError> {
    create_parent(path)?;
    fs::write(path, contents).map_err(|e| io_error(path, e))?;
    debug!("wrote {}", path.display());
    Ok(path.to_path_buf())
}
