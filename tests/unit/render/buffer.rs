use super::*;

#[test]
fn transparent_buffer_is_zeroed() {
    let buf = PixelBuffer::transparent(3, 2).unwrap();
    assert_eq!(buf.dimensions(), (3, 2));
    assert_eq!(buf.data().len(), 3 * 2 * 4);
    assert!(buf.data().iter().all(|&b| b == 0));
}

#[test]
fn zero_sized_buffers_are_rejected() {
    assert!(matches!(
        PixelBuffer::transparent(0, 4),
        Err(ComposeError::InvalidDimension(_))
    ));
    assert!(matches!(
        PixelBuffer::from_premul_rgba8(4, 0, Vec::new()),
        Err(ComposeError::InvalidDimension(_))
    ));
}

#[test]
fn data_length_must_match_dimensions() {
    let err = PixelBuffer::from_premul_rgba8(2, 2, vec![0u8; 15]).unwrap_err();
    assert!(matches!(err, ComposeError::InvalidDimension(_)));
}

#[test]
fn straight_alpha_roundtrips_through_premultiplication() {
    let buf = PixelBuffer::from_straight_rgba8(2, 1, vec![200, 100, 50, 255, 200, 100, 50, 0])
        .unwrap();
    assert_eq!(buf.pixel(0, 0), Some([200, 100, 50, 255]));
    assert_eq!(buf.pixel(1, 0), Some([0, 0, 0, 0]));
    assert_eq!(buf.pixel(2, 0), None);
    assert_eq!(buf.to_straight_rgba8(), vec![200, 100, 50, 255, 0, 0, 0, 0]);
}

#[test]
fn unpremultiply_recovers_half_alpha_color() {
    let buf = PixelBuffer::from_premul_rgba8(1, 1, vec![64, 32, 0, 128]).unwrap();
    let straight = buf.to_straight_rgba8();
    assert_eq!(straight[3], 128);
    assert!((i32::from(straight[0]) - 128).abs() <= 1);
    assert!((i32::from(straight[1]) - 64).abs() <= 1);
}

#[test]
fn fill_sets_every_pixel() {
    let mut buf = PixelBuffer::transparent(2, 2).unwrap();
    buf.fill(Rgba8Premul::from_straight_rgba(255, 255, 255, 255));
    assert!(buf.data().iter().all(|&b| b == 255));
}
