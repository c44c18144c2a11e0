use super::*;
use crate::composition::model::{OutputFormat, Placement, PlacementMode};

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn solid(w: u32, h: u32, px: [u8; 4]) -> PixelBuffer {
    let data = px.repeat((w * h) as usize);
    PixelBuffer::from_straight_rgba8(w, h, data).unwrap()
}

fn request(w: u32, h: u32, placement: Placement) -> ComposeRequest {
    ComposeRequest::new(CanvasSpec::new(w, h), placement)
}

#[test]
fn overlay_on_top_covers_base_in_overlay_area() {
    let base = solid(8, 8, RED);
    let overlay = solid(4, 4, BLUE);
    let req = request(16, 16, Placement::new(0.25, 0.25, 0.5));

    let out = compose_decoded(&base, &overlay, &req).unwrap();
    assert_eq!(out.dimensions(), (16, 16));
    assert_eq!(out.pixel(8, 8), Some(BLUE));
    assert_eq!(out.pixel(1, 1), Some(RED));
}

#[test]
fn base_on_top_hides_overlay_under_opaque_base() {
    let base = solid(8, 8, RED);
    let overlay = solid(4, 4, BLUE);
    let mut req = request(16, 16, Placement::new(0.25, 0.25, 0.5));
    req.layer_order = LayerOrder::BaseOnTop;

    let out = compose_decoded(&base, &overlay, &req).unwrap();
    assert_eq!(out.pixel(8, 8), Some(RED));
}

#[test]
fn base_on_top_shows_overlay_outside_fixed_footprint() {
    let base = solid(4, 4, RED);
    let overlay = solid(4, 4, BLUE);
    let mut req = request(16, 16, Placement::new(-0.5, -0.5, 2.0));
    req.mode = PlacementMode::fixed(8);
    req.layer_order = LayerOrder::BaseOnTop;

    let out = compose_decoded(&base, &overlay, &req).unwrap();
    assert_eq!(out.pixel(8, 8), Some(RED));
    assert_eq!(out.pixel(1, 1), Some(BLUE));
}

#[test]
fn zero_opacity_matches_base_only_render() {
    let base = solid(8, 8, RED);
    let overlay = solid(4, 4, BLUE);
    let req = request(16, 16, Placement::new(0.25, 0.25, 0.5).with_opacity(0.0));

    let out = compose_decoded(&base, &overlay, &req).unwrap();
    let mut expected = build_canvas(req.canvas).unwrap();
    crate::layout::placer::place(&mut expected, &base, req.mode).unwrap();
    assert_eq!(out, expected);
}

#[test]
fn background_is_visible_outside_fixed_footprint() {
    let base = solid(4, 4, RED);
    let overlay = solid(2, 2, BLUE);
    let mut req = request(16, 16, Placement::new(0.0, 0.0, 0.25));
    req.mode = PlacementMode::fixed(8);
    req.background = Some([255, 255, 255, 255]);

    let out = compose_decoded(&base, &overlay, &req).unwrap();
    assert_eq!(out.pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(out.pixel(15, 15), Some([255, 255, 255, 255]));
    assert_eq!(out.pixel(7, 7), Some(RED));
}

#[test]
fn non_positive_rel_w_is_rejected_before_drawing() {
    let base = solid(4, 4, RED);
    let overlay = solid(2, 2, BLUE);
    let req = request(16, 16, Placement::new(0.1, 0.1, 0.0));

    let err = compose_decoded(&base, &overlay, &req).unwrap_err();
    assert!(matches!(err, ComposeError::InvalidPlacement(_)));
}

#[test]
fn zero_width_canvas_is_invalid_dimension() {
    let base = solid(4, 4, RED);
    let overlay = solid(2, 2, BLUE);
    let req = request(0, 16, Placement::new(0.1, 0.1, 0.5));

    let err = compose_decoded(&base, &overlay, &req).unwrap_err();
    assert!(matches!(err, ComposeError::InvalidDimension(_)));
}

#[test]
fn plan_reports_both_layers() {
    let base = solid(10, 10, RED);
    let overlay = solid(400, 200, BLUE);
    let mut req = request(1024, 1024, Placement::new(0.10, 0.15, 0.35));
    req.mode = PlacementMode::fixed(720);

    let plan = plan_composition(&base, &overlay, &req).unwrap();
    assert_eq!(plan.base.frame.origin(), crate::foundation::core::Point::new(152.0, 152.0));
    assert!((plan.overlay.anchor.x - 350.0).abs() < 1e-9);
    assert!((plan.overlay.anchor.y - 323.0).abs() < 1e-9);
}

#[test]
fn limits_reject_oversized_canvas() {
    let limits = ComposeLimits {
        max_canvas_pixels: 100,
    };
    assert!(limits.check(CanvasSpec::new(10, 10)).is_ok());
    let err = limits.check(CanvasSpec::new(10, 11)).unwrap_err();
    assert!(matches!(err, ComposeError::InvalidDimension(_)));
}

#[test]
fn compose_with_limits_decodes_and_encodes() {
    let base = encode(&solid(4, 4, RED), OutputFormat::Png).unwrap();
    let overlay = encode(&solid(2, 2, BLUE), OutputFormat::Png).unwrap();
    let req = request(8, 8, Placement::new(0.25, 0.25, 0.5));

    let png = compose_with_limits(&base, &overlay, &req, &ComposeLimits::default()).unwrap();
    let decoded = crate::assets::decode::decode_image(&png).unwrap();
    assert_eq!(decoded.dimensions(), (8, 8));
    assert_eq!(decoded.pixel(4, 4), Some(BLUE));
    assert_eq!(decoded.pixel(0, 0), Some(RED));
}

#[test]
fn undecodable_overlay_is_labelled() {
    let base = encode(&solid(4, 4, RED), OutputFormat::Png).unwrap();
    let req = request(8, 8, Placement::new(0.25, 0.25, 0.5));

    let err = compose_with_limits(&base, b"not an image", &req, &ComposeLimits::default())
        .unwrap_err();
    match err {
        ComposeError::Decode(msg) => assert!(msg.starts_with("overlay image:"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn batch_rejects_zero_threads() {
    let threading = BatchThreading {
        parallel: true,
        threads: Some(0),
    };
    let err = compose_batch(&[], &threading).unwrap_err();
    assert!(matches!(err, ComposeError::Validation(_)));
}

#[test]
fn batch_keeps_job_order_and_isolates_failures() {
    let base = encode(&solid(4, 4, RED), OutputFormat::Png).unwrap();
    let overlay = encode(&solid(2, 2, BLUE), OutputFormat::Png).unwrap();
    let good = request(8, 8, Placement::new(0.25, 0.25, 0.5));
    let bad = request(8, 8, Placement::new(0.25, 0.25, -1.0));
    let jobs = vec![
        ComposeJob {
            base: &base,
            overlay: &overlay,
            request: good.clone(),
        },
        ComposeJob {
            base: &base,
            overlay: &overlay,
            request: bad,
        },
        ComposeJob {
            base: &base,
            overlay: &overlay,
            request: good,
        },
    ];

    let threading = BatchThreading {
        parallel: true,
        threads: Some(2),
    };
    let results = compose_batch(&jobs, &threading).unwrap();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(ComposeError::InvalidPlacement(_))));
    assert_eq!(results[0].as_ref().unwrap(), results[2].as_ref().unwrap());
}

#[test]
fn tiny_rel_w_composes_to_base_only() {
    let base = encode(&solid(4, 4, RED), OutputFormat::Png).unwrap();
    let overlay = encode(&solid(64, 64, BLUE), OutputFormat::Png).unwrap();
    let req = request(64, 64, Placement::new(0.1, 0.1, 1e-7));

    let png = compose_with_limits(&base, &overlay, &req, &ComposeLimits::default()).unwrap();
    let decoded = crate::assets::decode::decode_image(&png).unwrap();
    assert!(decoded.data().chunks_exact(4).all(|px| px == RED));
}

const TALL_SVG: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="1000">
  <rect x="0" y="0" width="10" height="1000" fill="#0000ff"/>
</svg>"##;

#[test]
fn decode_inputs_rasterizes_svg_overlay_at_drawn_width() {
    let base = encode(&solid(4, 4, RED), OutputFormat::Png).unwrap();
    let req = request(64, 64, Placement::new(0.0, 0.0, 0.5));

    let (base, overlay) = decode_inputs(&base, TALL_SVG, &req).unwrap();
    assert_eq!(base.dimensions(), (4, 4));
    assert_eq!(overlay.dimensions(), (32, 3200));
}

#[test]
fn svg_overlay_far_larger_than_raster_limit_still_composes() {
    let base = encode(&solid(4, 4, RED), OutputFormat::Png).unwrap();
    let req = request(64, 64, Placement::new(-5.0, -5.0, 20.0));

    let (_, overlay) = decode_inputs(&base, TALL_SVG, &req).unwrap();
    assert_eq!(overlay.height(), 16_384);

    let png = compose_with_limits(&base, TALL_SVG, &req, &ComposeLimits::default()).unwrap();
    let decoded = crate::assets::decode::decode_image(&png).unwrap();
    assert_eq!(decoded.dimensions(), (64, 64));
}

#[test]
fn batch_with_limits_applies_limits_to_each_job() {
    let base = encode(&solid(4, 4, RED), OutputFormat::Png).unwrap();
    let overlay = encode(&solid(2, 2, BLUE), OutputFormat::Png).unwrap();
    let jobs = vec![
        ComposeJob {
            base: &base,
            overlay: &overlay,
            request: request(8, 8, Placement::new(0.25, 0.25, 0.5)),
        },
        ComposeJob {
            base: &base,
            overlay: &overlay,
            request: request(16, 16, Placement::new(0.25, 0.25, 0.5)),
        },
    ];
    let limits = ComposeLimits {
        max_canvas_pixels: 100,
    };

    let results = compose_batch_with_limits(&jobs, &BatchThreading::default(), &limits).unwrap();
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(ComposeError::InvalidDimension(_))));
}
