use std::io::Cursor;

use crate::{
    composition::model::OutputFormat,
    foundation::error::{ComposeError, ComposeResult},
    render::buffer::PixelBuffer,
};

/// Encode a premultiplied buffer as a straight-alpha RGBA8 still image.
pub fn encode(buffer: &PixelBuffer, format: OutputFormat) -> ComposeResult<Vec<u8>> {
    let (width, height) = buffer.dimensions();
    let img = image::RgbaImage::from_raw(width, height, buffer.to_straight_rgba8())
        .ok_or_else(|| ComposeError::encode("pixel buffer does not match its dimensions"))?;

    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), format.image_format())
        .map_err(|e| ComposeError::encode(format!("write {}: {e}", format.extension())))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/bitmap.rs"]
mod tests;
