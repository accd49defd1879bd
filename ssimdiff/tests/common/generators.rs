//! Deterministic synthetic images for ssimdiff tests.
//!
//! Noise comes from an LCG so inputs are identical across platforms.

use image::{Rgb, RgbImage};

// ============================================================================
// LCG PRNG
// ============================================================================

/// LCG pseudo-random number generator (deterministic)
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u8(&mut self) -> u8 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.state >> 33) & 0xFF) as u8
    }
}

// ============================================================================
// Image Generation Functions
// ============================================================================

/// Uniform color image
pub fn gen_uniform(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(rgb))
}

/// Smooth RGB gradient: red grows to the right, green downward
pub fn gen_color_gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let r = if width > 1 { x * 255 / (width - 1) } else { 128 };
        let g = if height > 1 { y * 255 / (height - 1) } else { 128 };
        Rgb([r as u8, g as u8, 128])
    })
}

/// Checkerboard pattern
pub fn gen_checkerboard(width: u32, height: u32, block_size: u32, lo: u8, hi: u8) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let v = if ((x / block_size) + (y / block_size)) % 2 == 0 {
            hi
        } else {
            lo
        };
        Rgb([v, v, v])
    })
}

/// Random noise
pub fn gen_noise(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut lcg = Lcg::new(seed);
    RgbImage::from_fn(width, height, |_, _| {
        Rgb([lcg.next_u8(), lcg.next_u8(), lcg.next_u8()])
    })
}

/// Copy of `image` with a `size` x `size` square at (`x`, `y`) recolored
pub fn with_patch(image: &RgbImage, x: u32, y: u32, size: u32, rgb: [u8; 3]) -> RgbImage {
    let mut out = image.clone();
    for py in y..y + size {
        for px in x..x + size {
            out.put_pixel(px, py, Rgb(rgb));
        }
    }
    out
}
