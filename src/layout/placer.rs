use crate::{
    composition::model::{BaseFit, PlacementMode},
    foundation::{
        core::{Affine, CanvasSpec, Rect, ReferenceFrame, Vec2},
        error::{ComposeError, ComposeResult},
    },
    render::{buffer::PixelBuffer, compositor},
};

/// Where the base layer lands and which frame overlay coordinates are measured against.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct BasePlan {
    /// Reference frame for normalized overlay placement.
    pub frame: ReferenceFrame,
    /// Destination rectangle of the base image in canvas pixels. May exceed the canvas.
    pub dest: Rect,
    /// Intrinsic base image size the plan was computed for.
    pub source_size: (u32, u32),
}

impl BasePlan {
    /// Base image pixel space to canvas pixel space.
    pub fn transform(&self) -> Affine {
        let (w, h) = self.source_size;
        Affine::translate(Vec2::new(self.dest.x0, self.dest.y0))
            * Affine::scale_non_uniform(
                self.dest.width() / f64::from(w),
                self.dest.height() / f64::from(h),
            )
    }
}

/// Compute the base layer placement without touching any pixels.
pub fn plan_base(
    canvas: CanvasSpec,
    base_width: u32,
    base_height: u32,
    mode: PlacementMode,
) -> ComposeResult<BasePlan> {
    canvas.validate()?;
    if base_width == 0 || base_height == 0 {
        return Err(ComposeError::invalid_dimension(format!(
            "base image must be non-empty (got {base_width}x{base_height})"
        )));
    }

    let cw = i64::from(canvas.width);
    let ch = i64::from(canvas.height);
    let img_aspect = f64::from(base_width) / f64::from(base_height);

    let (frame, dest) = match mode {
        PlacementMode::ScaleToFillCentered => {
            let canvas_aspect = cw as f64 / ch as f64;
            let (draw_w, draw_h) = if img_aspect > canvas_aspect {
                (round_px(ch as f64 * img_aspect), ch)
            } else {
                (cw, round_px(cw as f64 / img_aspect))
            };
            check_draw_size(draw_w, draw_h)?;
            let x = (cw - draw_w) / 2;
            let y = (ch - draw_h) / 2;
            (ReferenceFrame::full_canvas(canvas), px_rect(x, y, draw_w, draw_h))
        }
        PlacementMode::FixedSizeCentered { size_px, fit } => {
            if size_px == 0 {
                return Err(ComposeError::invalid_dimension(
                    "fixed base size must be > 0",
                ));
            }
            let s = i64::from(size_px);
            let ox = (cw - s) / 2;
            let oy = (ch - s) / 2;
            let frame = ReferenceFrame::new(ox as f64, oy as f64, s as f64, s as f64);
            let dest = match fit {
                BaseFit::Stretch => px_rect(ox, oy, s, s),
                BaseFit::Contain => {
                    let (draw_w, draw_h) = if base_width >= base_height {
                        (s, round_px(s as f64 / img_aspect))
                    } else {
                        (round_px(s as f64 * img_aspect), s)
                    };
                    check_draw_size(draw_w, draw_h)?;
                    px_rect(ox + (s - draw_w) / 2, oy + (s - draw_h) / 2, draw_w, draw_h)
                }
            };
            (frame, dest)
        }
    };

    tracing::debug!(?frame, ?dest, "planned base layer");
    Ok(BasePlan {
        frame,
        dest,
        source_size: (base_width, base_height),
    })
}

/// Draw the base layer according to a previously computed plan.
pub fn draw_base(
    canvas: &mut PixelBuffer,
    base: &PixelBuffer,
    plan: &BasePlan,
) -> ComposeResult<()> {
    if base.dimensions() != plan.source_size {
        return Err(ComposeError::invalid_dimension(format!(
            "base plan was computed for {:?} but image is {:?}",
            plan.source_size,
            base.dimensions()
        )));
    }
    compositor::draw(canvas, base, plan.transform(), 1.0)
}

/// Draw `base` into `canvas` under `mode` and return the resulting reference frame.
pub fn place(
    canvas: &mut PixelBuffer,
    base: &PixelBuffer,
    mode: PlacementMode,
) -> ComposeResult<ReferenceFrame> {
    let spec = CanvasSpec::new(canvas.width(), canvas.height());
    let plan = plan_base(spec, base.width(), base.height(), mode)?;
    draw_base(canvas, base, &plan)?;
    Ok(plan.frame)
}

fn round_px(v: f64) -> i64 {
    v.round() as i64
}

fn check_draw_size(w: i64, h: i64) -> ComposeResult<()> {
    if w <= 0 || h <= 0 {
        return Err(ComposeError::invalid_dimension(format!(
            "computed base draw size {w}x{h} is empty"
        )));
    }
    Ok(())
}

fn px_rect(x: i64, y: i64, w: i64, h: i64) -> Rect {
    Rect::new(x as f64, y as f64, (x + w) as f64, (y + h) as f64)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/placer.rs"]
mod tests;
