//! Floyd-Steinberg error-diffusion dithering from color to grayscale.
//!
//! Diffusion runs on 16-bit premultiplied RGB channels. Each pixel is reduced
//! to 8-bit gray with a truncating luma model and, optionally, snapped to
//! fewer gray levels. The per-channel difference between the source and the
//! chosen gray is carried forward.

use image::{GrayImage, Luma, Rgba, RgbaImage};
use tracing::debug;

/// Number of evenly spaced gray levels the ditherer quantizes to.
///
/// `FULL` keeps every 8-bit gray value and only diffuses the sub-level
/// residual; `BINARY` yields pure black and white for 1-bit panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayLevels(u16);

impl GrayLevels {
    pub const BINARY: Self = Self(2);
    pub const FULL: Self = Self(256);

    /// Returns `None` outside `2..=256`.
    pub fn new(levels: u16) -> Option<Self> {
        (2..=256).contains(&levels).then_some(Self(levels))
    }

    pub fn count(self) -> u16 {
        self.0
    }

    /// Snap a (possibly out-of-range) value to the nearest level.
    pub fn quantize(self, value: i32) -> i32 {
        let steps = i32::from(self.0) - 1;
        let index = (value.clamp(0, 255) * steps + 127) / 255;
        index * 255 / steps
    }
}

impl Default for GrayLevels {
    fn default() -> Self {
        Self::FULL
    }
}

const CHANNEL_MAX: i32 = 0xffff;

/// 16-bit premultiplied RGB of a straight-alpha 8-bit pixel.
pub fn premultiplied(pixel: Rgba<u8>) -> [i32; 3] {
    let [r, g, b, a] = pixel.0.map(i32::from);
    [r, g, b].map(|c| c * 0x101 * a / 0xff)
}

/// 8-bit gray of 16-bit RGB, truncating. Channels are clamped first.
pub fn gray(rgb: [i32; 3]) -> i32 {
    let [r, g, b] = rgb.map(|c| c.clamp(0, CHANNEL_MAX) as u32);
    ((19595 * r + 38470 * g + 7471 * b + (1 << 15)) >> 24) as i32
}

/// Gray value of a single pixel, without dithering.
pub fn luma(pixel: Rgba<u8>) -> i32 {
    gray(premultiplied(pixel))
}

/// Apply Floyd-Steinberg dithering while converting to grayscale.
///
/// Pixels are visited in raster order. Error distribution pattern:
/// - Right:        7/16
/// - Bottom-left:  3/16
/// - Bottom:       5/16
/// - Bottom-right: 1/16
///
/// Errors accumulate as sixteenths and are divided (truncating toward
/// zero) when read.
pub fn floyd_steinberg_dither(img: &RgbaImage, levels: GrayLevels) -> GrayImage {
    let (width, height) = img.dimensions();
    debug!(width, height, levels = levels.count(), "Applying Floyd-Steinberg dithering");

    let w = width as usize;
    // One spare column on each side so edge pixels need no bounds checks
    let mut current = vec![[0i32; 3]; w + 2];
    let mut below = vec![[0i32; 3]; w + 2];
    let mut output = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let col = x as usize;
            let source = premultiplied(*img.get_pixel(x, y));
            let mut channels = [0i32; 3];
            for c in 0..3 {
                channels[c] = (source[c] + current[col + 1][c] / 16).clamp(0, CHANNEL_MAX);
            }

            let value = levels.quantize(gray(channels));
            output.put_pixel(x, y, Luma([value as u8]));

            let expanded = value * 0x101;
            for c in 0..3 {
                let error = channels[c] - expanded;
                below[col][c] += error * 3;
                below[col + 1][c] += error * 5;
                below[col + 2][c] += error;
                current[col + 2][c] += error * 7;
            }
        }
        std::mem::swap(&mut current, &mut below);
        below.fill([0; 3]);
    }

    debug!("Floyd-Steinberg dithering complete");
    output
}
