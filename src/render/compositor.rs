//! Resample an image through an affine transform and blend it into a canvas.
//!
//! Sampling is bilinear over premultiplied RGBA8 with clamp-to-edge addressing. A canvas
//! pixel is covered when its centre maps inside the source rectangle, so axis-aligned
//! placements at integer offsets reproduce the source exactly.

use crate::{
    effects::composite::over,
    foundation::{
        core::{Affine, Point, Rect},
        error::{ComposeError, ComposeResult},
    },
    render::buffer::PixelBuffer,
};

/// Draw `image` into `canvas` through `transform` (image pixel space to canvas pixel space).
///
/// `opacity` is clamped to `[0, 1]`; NaN draws nothing.
pub fn draw(
    canvas: &mut PixelBuffer,
    image: &PixelBuffer,
    transform: Affine,
    opacity: f64,
) -> ComposeResult<()> {
    let inverse = invert(transform)?;
    let opacity = clamp_opacity(opacity);
    if opacity <= 0.0 {
        return Ok(());
    }

    let (iw, ih) = (f64::from(image.width()), f64::from(image.height()));
    let bbox = transform.transform_rect_bbox(Rect::new(0.0, 0.0, iw, ih));
    let Some(span) = PixelSpan::clip(bbox, canvas.width(), canvas.height()) else {
        return Ok(());
    };

    let op = opacity as f32;
    let stride = canvas.width() as usize;
    let dst = canvas.data_mut();
    for y in span.y0..span.y1 {
        for x in span.x0..span.x1 {
            let p = inverse * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if p.x < 0.0 || p.y < 0.0 || p.x >= iw || p.y >= ih {
                continue;
            }
            let src = sample_bilinear(image, p.x - 0.5, p.y - 0.5);
            if src[3] == 0 {
                continue;
            }
            let idx = ((y as usize) * stride + (x as usize)) * 4;
            let d = [dst[idx], dst[idx + 1], dst[idx + 2], dst[idx + 3]];
            dst[idx..idx + 4].copy_from_slice(&over(d, src, op));
        }
    }
    Ok(())
}

pub(crate) fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        0.0
    } else {
        opacity.clamp(0.0, 1.0)
    }
}

fn invert(transform: Affine) -> ComposeResult<Affine> {
    if transform.as_coeffs().iter().any(|c| !c.is_finite()) {
        return Err(ComposeError::invalid_placement(
            "draw transform has non-finite coefficients",
        ));
    }
    let det = transform.determinant();
    let inverse = transform.inverse();
    let inverse_finite = inverse.as_coeffs().iter().all(|c| c.is_finite());
    if det == 0.0 || !det.is_finite() || !inverse_finite {
        return Err(ComposeError::invalid_placement(
            "draw transform is singular",
        ));
    }
    Ok(inverse)
}

/// Half-open canvas pixel range touched by a drawn image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PixelSpan {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl PixelSpan {
    fn clip(bbox: Rect, width: u32, height: u32) -> Option<Self> {
        let x0 = bbox.x0.floor().max(0.0);
        let y0 = bbox.y0.floor().max(0.0);
        let x1 = bbox.x1.ceil().min(f64::from(width));
        let y1 = bbox.y1.ceil().min(f64::from(height));
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(Self {
            x0: x0 as u32,
            y0: y0 as u32,
            x1: x1 as u32,
            y1: y1 as u32,
        })
    }
}

/// Bilinear sample at continuous texel coordinates (texel centres at integers).
fn sample_bilinear(image: &PixelBuffer, u: f64, v: f64) -> [u8; 4] {
    let max_x = i64::from(image.width()) - 1;
    let max_y = i64::from(image.height()) - 1;
    let fx0 = u.floor();
    let fy0 = v.floor();
    let tx = (u - fx0) as f32;
    let ty = (v - fy0) as f32;
    let x0 = fx0 as i64;
    let y0 = fy0 as i64;

    let fetch = |x: i64, y: i64| -> [f32; 4] {
        let cx = x.clamp(0, max_x) as usize;
        let cy = y.clamp(0, max_y) as usize;
        let idx = (cy * image.width() as usize + cx) * 4;
        let d = image.data();
        [
            f32::from(d[idx]),
            f32::from(d[idx + 1]),
            f32::from(d[idx + 2]),
            f32::from(d[idx + 3]),
        ]
    };

    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1, y0);
    let p01 = fetch(x0, y0 + 1);
    let p11 = fetch(x0 + 1, y0 + 1);

    let w00 = (1.0 - tx) * (1.0 - ty);
    let w10 = tx * (1.0 - ty);
    let w01 = (1.0 - tx) * ty;
    let w11 = tx * ty;

    let mut out = [0u8; 4];
    for c in 0..4 {
        let v = p00[c] * w00 + p10[c] * w10 + p01[c] * w01 + p11[c] * w11;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    // Rounding can push a colour channel one step past alpha.
    for c in 0..3 {
        out[c] = out[c].min(out[3]);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
