//! Image processing pipeline for e-ink panel output.
//!
//! Provides ingest (decode, Floyd-Steinberg dithering, bitmap encoding) and
//! letterboxed resizing of stored bitmaps to the panel resolution.

pub mod codec;
pub mod dither;
pub mod letterbox;

use tracing::debug;

// Re-exports for convenience
pub use codec::{decode_bitmap, decode_source, encode_bitmap};
pub use dither::{GrayLevels, floyd_steinberg_dither};
pub use letterbox::{Layout, background, letterbox, resolve_target};

/// Content type of every bitmap produced by this crate.
pub const BITMAP_CONTENT_TYPE: &str = "image/bmp";

/// Largest width or height [`resize`] will produce.
pub const MAX_TARGET_SIDE: u32 = 8192;

/// Pipeline error type.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Unrecognized image data: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Stored bitmap is corrupt: {0}")]
    CorruptBitmap(#[source] image::ImageError),

    #[error("Failed to encode bitmap: {0}")]
    Encode(#[source] std::io::Error),

    #[error("Requested size {width}x{height} exceeds {max} pixels per side", max = MAX_TARGET_SIDE)]
    TargetTooLarge { width: u32, height: u32 },
}

/// Convert an uploaded image of any supported format into a dithered bitmap.
///
/// The output keeps the source resolution. Only [`PipelineError::Decode`] is
/// expected for user input; encoding failures indicate a bug.
pub fn ingest(raw: &[u8], levels: GrayLevels) -> Result<Vec<u8>, PipelineError> {
    let decoded = decode_source(raw)?;
    debug!(
        width = decoded.width(),
        height = decoded.height(),
        levels = levels.count(),
        "Ingesting uploaded image"
    );

    let dithered = floyd_steinberg_dither(&decoded.to_rgba8(), levels);
    encode_bitmap(&dithered)
}

/// Re-frame a stored bitmap to `width` x `height`.
///
/// A zero in either axis keeps the original value for that axis. When the
/// target equals the stored resolution the raster is re-encoded untouched.
/// Otherwise the image is scaled to fit and centered on a canvas filled
/// black (`dark`) or white. Requested sides above [`MAX_TARGET_SIDE`] are
/// rejected before anything is decoded or allocated.
pub fn resize(stored: &[u8], dark: bool, width: u32, height: u32) -> Result<Vec<u8>, PipelineError> {
    if width > MAX_TARGET_SIDE || height > MAX_TARGET_SIDE {
        return Err(PipelineError::TargetTooLarge { width, height });
    }

    let source = decode_bitmap(stored)?;
    let (target_width, target_height) = resolve_target(source.dimensions(), width, height);
    let layout = Layout::fit(source.width(), source.height(), target_width, target_height);

    if layout.is_identity(source.dimensions()) {
        debug!(
            width = source.width(),
            height = source.height(),
            "Bitmap already at target size, skipping resize"
        );
        return encode_bitmap(&source);
    }

    debug!(
        orig_w = source.width(),
        orig_h = source.height(),
        target_width,
        target_height,
        scaled_width = layout.scaled_width,
        scaled_height = layout.scaled_height,
        "Letterboxing bitmap"
    );

    let framed = letterbox(&source, &layout, background(dark));
    encode_bitmap(&framed)
}
