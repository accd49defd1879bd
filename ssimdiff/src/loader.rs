//! Image loading.
//!
//! The container format is detected from the file content. The extension is
//! only a hint, used by [`is_supported_extension`] to pre-filter directories.

use std::io::{self, BufRead, Cursor, Seek};
use std::path::Path;

use image::{ImageFormat, ImageReader};
use log::debug;

use crate::{CompareError, LoadFailure, PixelGrid};

/// Extensions accepted when scanning directories.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

const SUPPORTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
];

/// True if the path has one of [`SUPPORTED_EXTENSIONS`] (case-insensitive).
pub fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Decodes the image at `path`.
pub fn load_image(path: &Path) -> Result<PixelGrid, CompareError> {
    let origin = path.display().to_string();
    let fail = |reason| CompareError::Load {
        origin: origin.clone(),
        reason,
    };

    let reader = ImageReader::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            fail(LoadFailure::NotFound)
        } else {
            fail(LoadFailure::Read(e))
        }
    })?;

    decode(reader, &origin)
}

/// Decodes an in-memory buffer, e.g. an uploaded file.
///
/// `label` names the buffer in error messages.
pub fn load_image_from_memory(bytes: &[u8], label: &str) -> Result<PixelGrid, CompareError> {
    decode(ImageReader::new(Cursor::new(bytes)), label)
}

fn decode<R: BufRead + Seek>(reader: ImageReader<R>, origin: &str) -> Result<PixelGrid, CompareError> {
    let fail = |reason| CompareError::Load {
        origin: origin.to_string(),
        reason,
    };

    // Content sniffing overrides the extension-derived guess when it succeeds
    let reader = reader
        .with_guessed_format()
        .map_err(|e| fail(LoadFailure::Read(e)))?;

    let format = reader
        .format()
        .ok_or_else(|| fail(LoadFailure::UnknownFormat))?;
    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(fail(LoadFailure::Unsupported(format)));
    }

    let image = reader
        .decode()
        .map_err(|e| fail(LoadFailure::Decode(e)))?;

    let grid = PixelGrid::from_dynamic(image, origin);
    debug!("loaded {origin}: {format:?} {}", grid.shape());
    Ok(grid)
}
