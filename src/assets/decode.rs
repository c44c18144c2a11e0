use crate::{
    foundation::error::{ComposeError, ComposeResult},
    render::buffer::PixelBuffer,
};

/// Upper bound for either side of a rasterized SVG.
const MAX_SVG_DIM: u32 = 16_384;

/// Decode encoded image bytes (any raster format `image` recognizes, or SVG) into
/// premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> ComposeResult<PixelBuffer> {
    decode_image_with_hint(bytes, None)
}

/// Decode with a minimum raster width for vector inputs.
///
/// SVG documents are rasterized at least `min_width` pixels wide so that scaling them up
/// later does not blur. Raster inputs ignore the hint.
pub fn decode_image_with_hint(bytes: &[u8], min_width: Option<u32>) -> ComposeResult<PixelBuffer> {
    if bytes.is_empty() {
        return Err(ComposeError::decode("input is empty"));
    }
    if looks_like_svg(bytes) {
        return rasterize_svg(bytes, min_width);
    }

    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| ComposeError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(ComposeError::decode(format!(
            "decoded image is empty ({width}x{height})"
        )));
    }
    PixelBuffer::from_straight_rgba8(width, height, rgba.into_raw())
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let head = &bytes[start..];
    head.starts_with(b"<svg") || head.starts_with(b"<?xml") || head.starts_with(b"<!DOCTYPE svg")
}

fn rasterize_svg(bytes: &[u8], min_width: Option<u32>) -> ComposeResult<PixelBuffer> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| ComposeError::decode(format!("parse svg tree: {e}")))?;

    let size = tree.size();
    let (base_w, base_h) = (size.width(), size.height());
    if !base_w.is_finite() || !base_h.is_finite() || base_w <= 0.0 || base_h <= 0.0 {
        return Err(ComposeError::decode("svg has invalid width/height"));
    }

    let natural_w = (base_w.ceil() as u32).max(1);
    let natural_h = (base_h.ceil() as u32).max(1);
    if natural_w > MAX_SVG_DIM || natural_h > MAX_SVG_DIM {
        return Err(ComposeError::decode(format!(
            "svg intrinsic size too large: {natural_w}x{natural_h} (max {MAX_SVG_DIM}x{MAX_SVG_DIM})"
        )));
    }

    // Hinted sizes are capped at MAX_SVG_DIM; only the intrinsic size can fail.
    let max_scale = (MAX_SVG_DIM as f32 / base_w).min(MAX_SVG_DIM as f32 / base_h);
    let scale = match min_width {
        Some(mw) if (mw as f32) > base_w => ((mw as f32) / base_w).min(max_scale).max(1.0),
        _ => 1.0,
    };
    let width = ((base_w * scale).ceil() as u32).clamp(1, MAX_SVG_DIM);
    let height = ((base_h * scale).ceil() as u32).clamp(1, MAX_SVG_DIM);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ComposeError::decode("failed to allocate svg pixmap"))?;
    let xform = resvg::tiny_skia::Transform::from_scale(
        (width as f32) / base_w,
        (height as f32) / base_h,
    );
    resvg::render(&tree, xform, &mut pixmap.as_mut());
    tracing::debug!(width, height, "rasterized svg input");

    PixelBuffer::from_premul_rgba8(width, height, pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
