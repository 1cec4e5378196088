use super::*;

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: rgba.repeat((width * height) as usize),
        premultiplied: true,
    }
}

#[test]
fn encodes_decodable_jpeg_with_same_dimensions() {
    let frame = solid(16, 8, [200, 40, 40, 255]);
    let bytes = encode_jpeg(&frame, DEFAULT_JPEG_QUALITY, [255, 255, 255]).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

    let decoded = image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg)
        .unwrap()
        .to_rgb8();
    assert_eq!(decoded.dimensions(), (16, 8));
    let p = decoded.get_pixel(8, 4);
    assert!(p[0] > 150 && p[1] < 90 && p[2] < 90, "{p:?}");
}

#[test]
fn transparent_pixels_take_the_background() {
    let frame = solid(8, 8, [0, 0, 0, 0]);
    let bytes = encode_jpeg(&frame, 90, [255, 255, 255]).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert!(decoded.get_pixel(4, 4)[0] > 240);
}

#[test]
fn rejects_bad_quality_and_short_buffers() {
    let frame = solid(2, 2, [0, 0, 0, 255]);
    assert!(matches!(
        encode_jpeg(&frame, 0, [0, 0, 0]),
        Err(MemeError::Validation(_))
    ));
    assert!(matches!(
        encode_jpeg(&frame, 101, [0, 0, 0]),
        Err(MemeError::Validation(_))
    ));

    let mut short = frame.clone();
    short.data.pop();
    assert!(matches!(
        encode_jpeg(&short, 95, [0, 0, 0]),
        Err(MemeError::Composition(_))
    ));
}
