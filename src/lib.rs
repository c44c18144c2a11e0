//! qrcompose overlays a decoded image onto a base layer (typically a QR code) and encodes
//! the result.
//!
//! The public API is request-oriented:
//!
//! - Describe the output with a [`ComposeRequest`] (JSON or [`ComposeRequestBuilder`])
//! - Call [`compose`] with the encoded base and overlay bytes
//! - Or work on decoded [`PixelBuffer`]s with [`compose_decoded`] and the lower-level
//!   [`place`], [`compute_transform`] and [`draw`] primitives
//!
//! All pixel data is premultiplied RGBA8. Both layers are resampled bilinearly with
//! clamp-to-edge addressing.
#![forbid(unsafe_code)]

mod assets;
mod composition;
mod effects;
mod encode;
mod foundation;
mod layout;
mod render;
mod transform;

pub use crate::assets::decode::{decode_image, decode_image_with_hint};
pub use crate::composition::dsl::ComposeRequestBuilder;
pub use crate::composition::model::{
    BaseFit, ComposeRequest, LayerOrder, OutputFormat, Placement, PlacementMode,
};
pub use crate::effects::composite::{PremulRgba8, over};
pub use crate::encode::bitmap::encode;
pub use crate::foundation::core::{
    Affine, CanvasSpec, Point, Rect, ReferenceFrame, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{ComposeError, ComposeResult};
pub use crate::layout::placer::{BasePlan, draw_base, place, plan_base};
pub use crate::render::buffer::PixelBuffer;
pub use crate::render::canvas::{build_canvas, fill_canvas};
pub use crate::render::compositor::draw;
pub use crate::render::pipeline::{
    BatchThreading, ComposeJob, ComposeLimits, ComposePlan, MAX_CANVAS_PIXELS_ENV, compose,
    compose_batch, compose_batch_with_limits, compose_decoded, compose_with_limits,
    decode_inputs, plan_composition,
};
pub use crate::transform::placement::{PlacementGeometry, compute_transform, placement_geometry};
