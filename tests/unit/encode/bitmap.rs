use super::*;

fn sample_buffer() -> PixelBuffer {
    let data = [
        [255u8, 0, 0, 255],
        [0, 0, 0, 0],
        [64, 32, 0, 128],
        [0, 255, 0, 255],
    ]
    .concat();
    PixelBuffer::from_premul_rgba8(2, 2, data).unwrap()
}

#[test]
fn png_output_keeps_size_and_alpha() {
    let bytes = encode(&sample_buffer(), OutputFormat::Png).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));

    let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (2, 2));
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(1, 0).0[3], 0);
    assert_eq!(decoded.get_pixel(0, 1).0[3], 128);
}

#[test]
fn every_format_produces_a_readable_image() {
    for format in [OutputFormat::Png, OutputFormat::Bmp, OutputFormat::Tiff] {
        let bytes = encode(&sample_buffer(), format).unwrap();
        let guessed = image::guess_format(&bytes).unwrap();
        assert_eq!(guessed, format.image_format());
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 2));
    }
}
