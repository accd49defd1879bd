//! Common test utilities for ssimdiff tests.

#![allow(dead_code)]

pub mod generators;

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use image::{ImageFormat, RgbImage};

/// Fresh, empty temp directory unique to this process and call.
pub fn temp_dir(tag: &str) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "ssimdiff-test-{tag}-{}-{id}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("Failed to create temp dir");
    dir
}

/// Encode to an in-memory buffer.
pub fn encode(image: &RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, format)
        .expect("Failed to encode image");
    buf.into_inner()
}

/// Write `image` to `path` in the format implied by its extension.
pub fn write_image(image: &RgbImage, path: &Path) {
    image.save(path).expect("Failed to write image");
}
