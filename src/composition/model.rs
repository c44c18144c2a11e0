use std::{io::Read, path::Path};

use anyhow::Context;

use crate::foundation::{
    core::CanvasSpec,
    error::{ComposeError, ComposeResult},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Everything needed to compose one base layer and one overlay.
///
/// A request is a pure data model that can be:
/// - built programmatically (see [`crate::ComposeRequestBuilder`])
/// - serialized/deserialized via Serde (JSON, camelCase keys)
///
/// Composition itself is performed by [`crate::compose`].
pub struct ComposeRequest {
    /// Output canvas dimensions.
    pub canvas: CanvasSpec,
    /// How the base layer is placed and which frame the overlay is measured against.
    #[serde(default)]
    pub mode: PlacementMode,
    /// Normalized overlay placement.
    pub placement: Placement,
    /// Which layer ends up visually on top.
    #[serde(default)]
    pub layer_order: LayerOrder,
    /// Encoded output format.
    #[serde(default)]
    pub format: OutputFormat,
    /// Optional straight-alpha RGBA8 colour the canvas is cleared to before drawing.
    #[serde(default)]
    pub background: Option<[u8; 4]>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
/// Base layer placement mode.
pub enum PlacementMode {
    /// Scale the base uniformly so it covers the canvas, centered; overflow is clipped.
    /// The reference frame is the whole canvas.
    #[default]
    ScaleToFillCentered,
    /// Draw the base in a centered `size_px` square, which is also the reference frame.
    #[serde(rename_all = "camelCase")]
    FixedSizeCentered {
        /// Side of the square footprint in pixels.
        size_px: u32,
        /// How the base image fills the footprint.
        #[serde(default)]
        fit: BaseFit,
    },
}

impl PlacementMode {
    /// Fixed-size mode with the base stretched over the footprint.
    pub fn fixed(size_px: u32) -> Self {
        Self::FixedSizeCentered {
            size_px,
            fit: BaseFit::Stretch,
        }
    }

    pub fn validate(self) -> ComposeResult<()> {
        if let Self::FixedSizeCentered { size_px: 0, .. } = self {
            return Err(ComposeError::invalid_dimension(
                "fixed base size must be > 0",
            ));
        }
        Ok(())
    }

    /// Width of the reference frame this mode produces on `canvas`.
    pub fn frame_width(self, canvas: CanvasSpec) -> u32 {
        match self {
            Self::ScaleToFillCentered => canvas.width,
            Self::FixedSizeCentered { size_px, .. } => size_px,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// How a fixed-size base fills its square footprint.
pub enum BaseFit {
    /// Draw the base at exactly the footprint size.
    #[default]
    Stretch,
    /// Keep the base aspect ratio, centered inside the footprint.
    Contain,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Z-order of the two layers.
pub enum LayerOrder {
    /// Base first, overlay blended on top.
    #[default]
    OverlayOnTop,
    /// Overlay first, base drawn on top of it.
    BaseOnTop,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Lossless output formats with an alpha channel.
pub enum OutputFormat {
    #[default]
    Png,
    Bmp,
    Tiff,
}

impl OutputFormat {
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Bmp => image::ImageFormat::Bmp,
            Self::Tiff => image::ImageFormat::Tiff,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Normalized overlay placement relative to the reference frame.
pub struct Placement {
    /// Pre-rotation left edge, as a fraction of the frame width.
    #[serde(alias = "normX")]
    pub rel_x: f64,
    /// Pre-rotation top edge, as a fraction of the frame height.
    #[serde(alias = "normY")]
    pub rel_y: f64,
    /// Overlay width as a fraction of the frame width. Must be > 0.
    #[serde(alias = "normW")]
    pub rel_w: f64,
    /// Clockwise rotation in degrees.
    #[serde(default, alias = "rotation")]
    pub rotation_deg: f64,
    /// Pivot inside the overlay, `0..=1` of its width.
    #[serde(default = "default_anchor", alias = "anchorAx")]
    pub anchor_x: f64,
    /// Pivot inside the overlay, `0..=1` of its height.
    #[serde(default = "default_anchor", alias = "anchorAy")]
    pub anchor_y: f64,
    /// Overlay opacity. Clamped to `0..=1` when drawing.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_anchor() -> f64 {
    0.5
}

fn default_opacity() -> f64 {
    1.0
}

impl Placement {
    /// Placement with a centered anchor, no rotation and full opacity.
    pub fn new(rel_x: f64, rel_y: f64, rel_w: f64) -> Self {
        Self {
            rel_x,
            rel_y,
            rel_w,
            rotation_deg: 0.0,
            anchor_x: default_anchor(),
            anchor_y: default_anchor(),
            opacity: default_opacity(),
        }
    }

    pub fn with_rotation(mut self, rotation_deg: f64) -> Self {
        self.rotation_deg = rotation_deg;
        self
    }

    pub fn with_anchor(mut self, anchor_x: f64, anchor_y: f64) -> Self {
        self.anchor_x = anchor_x;
        self.anchor_y = anchor_y;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Check every field against its valid range. Opacity is only required to be a number.
    pub fn validate(&self) -> ComposeResult<()> {
        for (name, value) in [
            ("relX", self.rel_x),
            ("relY", self.rel_y),
            ("relW", self.rel_w),
            ("rotationDeg", self.rotation_deg),
            ("anchorX", self.anchor_x),
            ("anchorY", self.anchor_y),
        ] {
            if !value.is_finite() {
                return Err(ComposeError::invalid_placement(format!(
                    "{name} must be finite (got {value})"
                )));
            }
        }
        if self.rel_w <= 0.0 {
            return Err(ComposeError::invalid_placement(format!(
                "relW must be > 0 (got {})",
                self.rel_w
            )));
        }
        for (name, value) in [("anchorX", self.anchor_x), ("anchorY", self.anchor_y)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ComposeError::invalid_placement(format!(
                    "{name} must be within 0..=1 (got {value})"
                )));
            }
        }
        if self.opacity.is_nan() {
            return Err(ComposeError::invalid_placement("opacity must be a number"));
        }
        Ok(())
    }
}

impl ComposeRequest {
    /// Request with default mode, layer order, format and no background.
    pub fn new(canvas: CanvasSpec, placement: Placement) -> Self {
        Self {
            canvas,
            mode: PlacementMode::default(),
            placement,
            layer_order: LayerOrder::default(),
            format: OutputFormat::default(),
            background: None,
        }
    }

    /// Validate everything that does not depend on the decoded images.
    pub fn validate(&self) -> ComposeResult<()> {
        self.canvas.validate()?;
        self.mode.validate()?;
        self.placement.validate()
    }

    /// Parse and validate a JSON request.
    pub fn from_json_str(s: &str) -> ComposeResult<Self> {
        let req: Self = serde_json::from_str(s)
            .map_err(|e| ComposeError::serde(format!("parse compose request: {e}")))?;
        req.validate()?;
        Ok(req)
    }

    pub fn from_json_reader<R: Read>(r: R) -> ComposeResult<Self> {
        let req: Self = serde_json::from_reader(r)
            .map_err(|e| ComposeError::serde(format!("parse compose request: {e}")))?;
        req.validate()?;
        Ok(req)
    }

    pub fn from_json_path(path: &Path) -> ComposeResult<Self> {
        let f = std::fs::File::open(path)
            .with_context(|| format!("open compose request '{}'", path.display()))?;
        Self::from_json_reader(std::io::BufReader::new(f))
    }

    pub fn to_json_pretty(&self) -> ComposeResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ComposeError::serde(format!("serialize compose request: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
