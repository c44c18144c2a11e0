use crate::{
    composition::model::{
        BaseFit, ComposeRequest, LayerOrder, OutputFormat, Placement, PlacementMode,
    },
    foundation::{core::CanvasSpec, error::ComposeResult},
};

/// Fluent construction of a validated [`ComposeRequest`].
pub struct ComposeRequestBuilder {
    canvas: CanvasSpec,
    mode: PlacementMode,
    placement: Placement,
    layer_order: LayerOrder,
    format: OutputFormat,
    background: Option<[u8; 4]>,
}

impl ComposeRequestBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: CanvasSpec::new(width, height),
            mode: PlacementMode::default(),
            placement: Placement::new(0.0, 0.0, 1.0),
            layer_order: LayerOrder::default(),
            format: OutputFormat::default(),
            background: None,
        }
    }

    pub fn scale_to_fill(mut self) -> Self {
        self.mode = PlacementMode::ScaleToFillCentered;
        self
    }

    pub fn fixed_size(mut self, size_px: u32, fit: BaseFit) -> Self {
        self.mode = PlacementMode::FixedSizeCentered { size_px, fit };
        self
    }

    pub fn mode(mut self, mode: PlacementMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn position(mut self, rel_x: f64, rel_y: f64, rel_w: f64) -> Self {
        self.placement.rel_x = rel_x;
        self.placement.rel_y = rel_y;
        self.placement.rel_w = rel_w;
        self
    }

    pub fn rotation(mut self, degrees: f64) -> Self {
        self.placement.rotation_deg = degrees;
        self
    }

    pub fn anchor(mut self, anchor_x: f64, anchor_y: f64) -> Self {
        self.placement.anchor_x = anchor_x;
        self.placement.anchor_y = anchor_y;
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.placement.opacity = opacity;
        self
    }

    pub fn layer_order(mut self, order: LayerOrder) -> Self {
        self.layer_order = order;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn background(mut self, rgba: [u8; 4]) -> Self {
        self.background = Some(rgba);
        self
    }

    pub fn build(self) -> ComposeResult<ComposeRequest> {
        let req = ComposeRequest {
            canvas: self.canvas,
            mode: self.mode,
            placement: self.placement,
            layer_order: self.layer_order,
            format: self.format,
            background: self.background,
        };
        req.validate()?;
        Ok(req)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/dsl.rs"]
mod tests;
