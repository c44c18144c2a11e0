use crate::{
    foundation::{core::CanvasSpec, core::Rgba8Premul, error::ComposeResult},
    render::buffer::PixelBuffer,
};

/// Allocate the destination canvas, fully transparent.
///
/// Dimensions are checked before anything is allocated.
pub fn build_canvas(spec: CanvasSpec) -> ComposeResult<PixelBuffer> {
    spec.validate()?;
    PixelBuffer::transparent(spec.width, spec.height)
}

/// Clear the canvas to a straight-alpha RGBA8 colour.
pub fn fill_canvas(canvas: &mut PixelBuffer, rgba: [u8; 4]) {
    let [r, g, b, a] = rgba;
    canvas.fill(Rgba8Premul::from_straight_rgba(r, g, b, a));
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
