use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_negative_and_nan_opacity_are_noop() {
    let dst = [9, 8, 7, 255];
    let src = [255, 255, 255, 255];
    assert_eq!(over(dst, src, -3.0), dst);
    assert_eq!(over(dst, src, f32::NAN), dst);
}

#[test]
fn over_opacity_above_1_is_clamped() {
    let dst = [0, 0, 0, 255];
    let src = [10, 200, 30, 255];
    assert_eq!(over(dst, src, 7.5), over(dst, src, 1.0));
    assert_eq!(over(dst, src, 7.5), src);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src, 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_dst_transparent_returns_scaled_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_half_opacity_mixes_with_dst() {
    let dst = [0, 0, 255, 255];
    let src = [255, 0, 0, 255];
    let out = over(dst, src, 0.5);
    assert_eq!(out[3], 255);
    assert!(out[0] > 120 && out[0] < 135);
    assert!(out[2] > 120 && out[2] < 135);
}
