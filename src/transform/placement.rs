use crate::{
    composition::model::Placement,
    foundation::{
        core::{Affine, Point, ReferenceFrame, Vec2},
        error::{ComposeError, ComposeResult},
    },
};

/// Intermediate values of the overlay placement, all in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PlacementGeometry {
    /// Overlay width after scaling.
    pub target_width: f64,
    /// Overlay height after scaling, derived from the overlay aspect ratio.
    pub target_height: f64,
    /// Pre-rotation top-left corner of the overlay.
    pub top_left: Point,
    /// Canvas point the overlay anchor is pinned to.
    pub anchor: Point,
    /// Overlay pixel space to canvas pixel space.
    pub affine: Affine,
}

/// Map normalized placement parameters to a single overlay transform.
///
/// The overlay pixel at `(anchor_x * overlay_width, anchor_y * overlay_height)` always lands
/// on [`PlacementGeometry::anchor`], whatever the rotation.
pub fn compute_transform(
    frame: &ReferenceFrame,
    overlay_width: u32,
    overlay_height: u32,
    placement: &Placement,
) -> ComposeResult<Affine> {
    placement_geometry(frame, overlay_width, overlay_height, placement).map(|g| g.affine)
}

/// Like [`compute_transform`], returning the intermediate geometry as well.
pub fn placement_geometry(
    frame: &ReferenceFrame,
    overlay_width: u32,
    overlay_height: u32,
    placement: &Placement,
) -> ComposeResult<PlacementGeometry> {
    if overlay_width == 0 || overlay_height == 0 {
        return Err(ComposeError::invalid_placement(format!(
            "overlay must be non-empty (got {overlay_width}x{overlay_height})"
        )));
    }
    placement.validate()?;
    if !(frame.width.is_finite() && frame.height.is_finite())
        || frame.width <= 0.0
        || frame.height <= 0.0
    {
        return Err(ComposeError::invalid_dimension(format!(
            "reference frame must have positive size (got {}x{})",
            frame.width, frame.height
        )));
    }

    let ow = f64::from(overlay_width);
    let oh = f64::from(overlay_height);

    let target_width = placement.rel_w * frame.width;
    let target_height = target_width * (oh / ow);

    let top_left = Point::new(
        frame.x + placement.rel_x * frame.width,
        frame.y + placement.rel_y * frame.height,
    );
    let anchor_px = Vec2::new(
        placement.anchor_x * target_width,
        placement.anchor_y * target_height,
    );

    // T(top_left) * T(anchor_px) * R(theta) * S(target/source) * T(-anchor_src)
    let affine = Affine::translate(top_left.to_vec2())
        * Affine::translate(anchor_px)
        * Affine::rotate(placement.rotation_deg.to_radians())
        * Affine::scale_non_uniform(target_width / ow, target_height / oh)
        * Affine::translate(Vec2::new(
            -placement.anchor_x * ow,
            -placement.anchor_y * oh,
        ));

    // A sub-pixel overlay draws nothing. Only a non-invertible transform is an error.
    let det = affine.determinant();
    let inverse_finite = affine.inverse().as_coeffs().iter().all(|c| c.is_finite());
    if det == 0.0 || !det.is_finite() || !inverse_finite {
        return Err(ComposeError::invalid_placement(format!(
            "overlay transform is singular (relW {} on a {}px frame)",
            placement.rel_w, frame.width
        )));
    }

    let geometry = PlacementGeometry {
        target_width,
        target_height,
        top_left,
        anchor: top_left + anchor_px,
        affine,
    };
    tracing::debug!(?geometry, "computed overlay placement");
    Ok(geometry)
}

#[cfg(test)]
#[path = "../../tests/unit/transform/placement.rs"]
mod tests;
