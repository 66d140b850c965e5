//! Decoding of uploads and the bitmap wire format served to the panel.
//!
//! The panel firmware reads 8-bit grayscale BMP: 14-byte file header,
//! BITMAPINFOHEADER, 256-entry gray palette and bottom-up rows padded to
//! four bytes. Resolution and colors-used fields are left at zero and every
//! palette entry carries 0xFF in its reserved byte, matching the bitmaps
//! older firmware was built against.

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use image::{DynamicImage, GrayImage, ImageFormat};

use crate::PipelineError;

const FILE_HEADER_LEN: u32 = 14;
const INFO_HEADER_LEN: u32 = 40;
const PALETTE_LEN: u32 = 256 * 4;

/// Offset of the first pixel row in every bitmap produced here.
const PIXEL_OFFSET: u32 = FILE_HEADER_LEN + INFO_HEADER_LEN + PALETTE_LEN;

/// Decode an uploaded image, guessing its format from the content.
pub fn decode_source(raw: &[u8]) -> Result<DynamicImage, PipelineError> {
    image::load_from_memory(raw).map_err(PipelineError::Decode)
}

/// Decode a bitmap previously produced by [`encode_bitmap`].
pub fn decode_bitmap(stored: &[u8]) -> Result<GrayImage, PipelineError> {
    image::load_from_memory_with_format(stored, ImageFormat::Bmp)
        .map(DynamicImage::into_luma8)
        .map_err(PipelineError::CorruptBitmap)
}

/// Encode a grayscale raster as an 8-bit paletted BMP.
pub fn encode_bitmap(img: &GrayImage) -> Result<Vec<u8>, PipelineError> {
    write_bitmap(img).map_err(PipelineError::Encode)
}

fn write_bitmap(img: &GrayImage) -> io::Result<Vec<u8>> {
    let (width, height) = img.dimensions();
    let stride = (width as usize + 3) & !3;
    let too_large = || io::Error::new(io::ErrorKind::InvalidInput, "bitmap exceeds 4 GiB");
    let image_size = stride
        .checked_mul(height as usize)
        .and_then(|size| u32::try_from(size).ok())
        .filter(|size| size.checked_add(PIXEL_OFFSET).is_some())
        .ok_or_else(too_large)?;
    let signed_width = i32::try_from(width).map_err(|_| too_large())?;
    let signed_height = i32::try_from(height).map_err(|_| too_large())?;

    let mut out = Vec::with_capacity((PIXEL_OFFSET + image_size) as usize);

    // BITMAPFILEHEADER
    out.write_all(b"BM")?;
    out.write_u32::<LittleEndian>(PIXEL_OFFSET + image_size)?;
    out.write_u32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(PIXEL_OFFSET)?;

    // BITMAPINFOHEADER
    out.write_u32::<LittleEndian>(INFO_HEADER_LEN)?;
    out.write_i32::<LittleEndian>(signed_width)?;
    out.write_i32::<LittleEndian>(signed_height)?;
    out.write_u16::<LittleEndian>(1)?; // planes
    out.write_u16::<LittleEndian>(8)?; // bits per pixel
    out.write_u32::<LittleEndian>(0)?; // BI_RGB
    out.write_u32::<LittleEndian>(image_size)?;
    out.write_i32::<LittleEndian>(0)?; // x pixels per meter
    out.write_i32::<LittleEndian>(0)?; // y pixels per meter
    out.write_u32::<LittleEndian>(0)?; // colors used
    out.write_u32::<LittleEndian>(0)?; // colors important

    for level in 0..=255u8 {
        out.write_all(&[level, level, level, 0xFF])?;
    }

    let padding = [0u8; 3];
    let pad = stride - width as usize;
    for row in img.rows().rev() {
        for pixel in row {
            out.write_u8(pixel.0[0])?;
        }
        out.write_all(&padding[..pad])?;
    }
    Ok(out)
}
