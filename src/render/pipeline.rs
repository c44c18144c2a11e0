use rayon::prelude::*;

use crate::{
    assets::decode::decode_image_with_hint,
    composition::model::{ComposeRequest, LayerOrder},
    encode::bitmap::encode,
    foundation::{
        core::CanvasSpec,
        error::{ComposeError, ComposeResult},
    },
    layout::placer::{BasePlan, draw_base, plan_base},
    render::{
        buffer::PixelBuffer,
        canvas::{build_canvas, fill_canvas},
        compositor,
    },
    transform::placement::{PlacementGeometry, placement_geometry},
};

/// Environment variable overriding [`ComposeLimits::max_canvas_pixels`].
pub const MAX_CANVAS_PIXELS_ENV: &str = "QRCOMPOSE_MAX_CANVAS_PIXELS";

/// Resource limits applied before any pixel buffer is allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComposeLimits {
    pub max_canvas_pixels: u64,
}

impl Default for ComposeLimits {
    fn default() -> Self {
        Self {
            max_canvas_pixels: 64 * 1024 * 1024,
        }
    }
}

impl ComposeLimits {
    /// Defaults, with `QRCOMPOSE_MAX_CANVAS_PIXELS` applied when it parses to a positive number.
    pub fn from_env() -> Self {
        let max_canvas_pixels = std::env::var(MAX_CANVAS_PIXELS_ENV)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(Self::default().max_canvas_pixels);
        Self { max_canvas_pixels }
    }

    pub fn check(&self, canvas: CanvasSpec) -> ComposeResult<()> {
        if canvas.pixel_count() > self.max_canvas_pixels {
            return Err(ComposeError::invalid_dimension(format!(
                "canvas {}x{} exceeds the limit of {} pixels",
                canvas.width, canvas.height, self.max_canvas_pixels
            )));
        }
        Ok(())
    }
}

/// Decode both inputs, compose them and encode the result.
///
/// This is the primary one-shot API. Pipeline:
/// 1. [`ComposeRequest::validate`] and [`ComposeLimits::check`]
/// 2. decode base and overlay
/// 3. [`compose_decoded`]
/// 4. encode to [`ComposeRequest::format`]
pub fn compose(
    base_bytes: &[u8],
    overlay_bytes: &[u8],
    request: &ComposeRequest,
) -> ComposeResult<Vec<u8>> {
    compose_with_limits(base_bytes, overlay_bytes, request, &ComposeLimits::from_env())
}

/// [`compose`] with explicit resource limits.
#[tracing::instrument(skip(base_bytes, overlay_bytes), fields(base_len = base_bytes.len(), overlay_len = overlay_bytes.len()))]
pub fn compose_with_limits(
    base_bytes: &[u8],
    overlay_bytes: &[u8],
    request: &ComposeRequest,
    limits: &ComposeLimits,
) -> ComposeResult<Vec<u8>> {
    request.validate()?;
    limits.check(request.canvas)?;

    let (base, overlay) = decode_inputs(base_bytes, overlay_bytes, request)?;
    let canvas = compose_decoded(&base, &overlay, request)?;
    encode(&canvas, request.format)
}

/// Decode base and overlay the way [`compose`] does.
///
/// SVG inputs are rasterized at least as wide as they will be drawn: the base at the frame
/// width, the overlay at `ceil(rel_w * frame_width)`.
pub fn decode_inputs(
    base_bytes: &[u8],
    overlay_bytes: &[u8],
    request: &ComposeRequest,
) -> ComposeResult<(PixelBuffer, PixelBuffer)> {
    let frame_width = request.mode.frame_width(request.canvas);
    let base = decode_image_with_hint(base_bytes, Some(frame_width))
        .map_err(|e| label_decode("base", e))?;
    let overlay_hint = (request.placement.rel_w * f64::from(frame_width)).ceil();
    let overlay_hint = (overlay_hint.is_finite() && overlay_hint >= 1.0)
        .then(|| overlay_hint.min(f64::from(u32::MAX)) as u32);
    let overlay = decode_image_with_hint(overlay_bytes, overlay_hint)
        .map_err(|e| label_decode("overlay", e))?;
    Ok((base, overlay))
}

/// Geometry of a request against decoded inputs, without drawing anything.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ComposePlan {
    pub base: BasePlan,
    pub overlay: PlacementGeometry,
}

/// Compute and validate all geometry for `request`. No pixels are allocated.
pub fn plan_composition(
    base: &PixelBuffer,
    overlay: &PixelBuffer,
    request: &ComposeRequest,
) -> ComposeResult<ComposePlan> {
    request.validate()?;
    let base_plan = plan_base(request.canvas, base.width(), base.height(), request.mode)?;
    let overlay_geometry = placement_geometry(
        &base_plan.frame,
        overlay.width(),
        overlay.height(),
        &request.placement,
    )?;
    Ok(ComposePlan {
        base: base_plan,
        overlay: overlay_geometry,
    })
}

/// Compose already decoded buffers into a new canvas.
///
/// All geometry is validated before the canvas is allocated, so a rejected request never
/// produces a partial image.
pub fn compose_decoded(
    base: &PixelBuffer,
    overlay: &PixelBuffer,
    request: &ComposeRequest,
) -> ComposeResult<PixelBuffer> {
    let plan = plan_composition(base, overlay, request)?;

    let mut canvas = build_canvas(request.canvas)?;
    if let Some(rgba) = request.background {
        fill_canvas(&mut canvas, rgba);
    }

    let opacity = request.placement.opacity;
    match request.layer_order {
        LayerOrder::OverlayOnTop => {
            draw_base(&mut canvas, base, &plan.base)?;
            compositor::draw(&mut canvas, overlay, plan.overlay.affine, opacity)?;
        }
        LayerOrder::BaseOnTop => {
            compositor::draw(&mut canvas, overlay, plan.overlay.affine, opacity)?;
            draw_base(&mut canvas, base, &plan.base)?;
        }
    }

    tracing::debug!(
        width = canvas.width(),
        height = canvas.height(),
        order = ?request.layer_order,
        "composed canvas"
    );
    Ok(canvas)
}

fn label_decode(which: &str, err: ComposeError) -> ComposeError {
    match err {
        ComposeError::Decode(msg) => ComposeError::decode(format!("{which} image: {msg}")),
        other => other,
    }
}

/// One independent unit of work for [`compose_batch`].
#[derive(Clone, Debug)]
pub struct ComposeJob<'a> {
    pub base: &'a [u8],
    pub overlay: &'a [u8],
    pub request: ComposeRequest,
}

#[derive(Clone, Debug)]
pub struct BatchThreading {
    /// Compose jobs concurrently on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the number of worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

impl Default for BatchThreading {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
        }
    }
}

/// Compose many independent requests. Results keep the order of `jobs`, and one failing
/// job does not affect the others.
pub fn compose_batch(
    jobs: &[ComposeJob<'_>],
    threading: &BatchThreading,
) -> ComposeResult<Vec<ComposeResult<Vec<u8>>>> {
    compose_batch_with_limits(jobs, threading, &ComposeLimits::from_env())
}

/// [`compose_batch`] with explicit resource limits applied to every job.
pub fn compose_batch_with_limits(
    jobs: &[ComposeJob<'_>],
    threading: &BatchThreading,
    limits: &ComposeLimits,
) -> ComposeResult<Vec<ComposeResult<Vec<u8>>>> {
    let run = |job: &ComposeJob<'_>| compose_with_limits(job.base, job.overlay, &job.request, limits);

    if !threading.parallel {
        return Ok(jobs.iter().map(run).collect());
    }

    let pool = build_thread_pool(threading.threads)?;
    Ok(pool.install(|| jobs.par_iter().map(run).collect()))
}

fn build_thread_pool(threads: Option<usize>) -> ComposeResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ComposeError::validation(
            "batch threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ComposeError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
