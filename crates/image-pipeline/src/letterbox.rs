//! Aspect-preserving resize onto a filled canvas.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};

/// Placement of a scaled image inside a target canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl Layout {
    /// Fit a `src_w` x `src_h` image into a `target_w` x `target_h` canvas.
    ///
    /// The scale factor is `min(target_w / src_w, target_h / src_h)`. The
    /// comparison and the scaled size are computed on integers so the fitted
    /// axis lands exactly on the target; the other axis is truncated.
    pub fn fit(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> Self {
        let (sw, sh) = (u64::from(src_w.max(1)), u64::from(src_h.max(1)));
        let (tw, th) = (u64::from(target_w), u64::from(target_h));

        let (scaled_width, scaled_height) = if tw * sh <= th * sw {
            (tw, sh * tw / sw)
        } else {
            (sw * th / sh, th)
        };
        let scaled_width = scaled_width.clamp(1, tw.max(1)) as u32;
        let scaled_height = scaled_height.clamp(1, th.max(1)) as u32;

        Self {
            canvas_width: target_w,
            canvas_height: target_h,
            scaled_width,
            scaled_height,
            offset_x: target_w.saturating_sub(scaled_width) / 2,
            offset_y: target_h.saturating_sub(scaled_height) / 2,
        }
    }

    /// Whether the canvas is exactly the source size, so no resampling is needed.
    pub fn is_identity(&self, source: (u32, u32)) -> bool {
        (self.canvas_width, self.canvas_height) == source
    }
}

/// Replace zero target dimensions with the matching source dimension.
pub fn resolve_target(source: (u32, u32), width: u32, height: u32) -> (u32, u32) {
    let width = if width == 0 { source.0 } else { width };
    let height = if height == 0 { source.1 } else { height };
    (width, height)
}

/// Canvas fill: black for dark artwork, white otherwise.
pub fn background(dark: bool) -> Luma<u8> {
    if dark { Luma([0]) } else { Luma([255]) }
}

/// Scale `img` per `layout` and composite it centered on a filled canvas.
pub fn letterbox(img: &GrayImage, layout: &Layout, fill: Luma<u8>) -> GrayImage {
    // Triangle (bilinear); sharper filters ring and break up the dither pattern.
    let scaled = imageops::resize(img, layout.scaled_width, layout.scaled_height, FilterType::Triangle);

    let mut canvas = GrayImage::from_pixel(layout.canvas_width, layout.canvas_height, fill);
    imageops::replace(
        &mut canvas,
        &scaled,
        i64::from(layout.offset_x),
        i64::from(layout.offset_y),
    );
    canvas
}
