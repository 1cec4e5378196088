use std::io::Cursor;

use super::*;

fn encode(img: image::RgbaImage, format: image::ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    let dyn_img = match format {
        image::ImageFormat::Jpeg => {
            image::DynamicImage::ImageRgb8(image::DynamicImage::ImageRgba8(img).to_rgb8())
        }
        _ => image::DynamicImage::ImageRgba8(img),
    };
    dyn_img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50u8, 200u8, 128u8]).unwrap();
    let prepared = decode_image(&encode(img, image::ImageFormat::Png)).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn local_png_and_jpeg_are_accepted() {
    let img = image::RgbaImage::from_pixel(4, 3, image::Rgba([10, 20, 30, 255]));
    let png = ImageFile::new("a.png", Some("image/png"), encode(img.clone(), image::ImageFormat::Png));
    let jpg = ImageFile::new("b.jpg", Some("image/jpeg"), encode(img, image::ImageFormat::Jpeg));
    let sniffed = ImageFile::new("c", None, png.bytes.clone());

    for file in [png, jpg, sniffed] {
        let prepared = decode_local_image(&file).unwrap();
        assert_eq!((prepared.width, prepared.height), (4, 3));
    }
}

#[test]
fn wrong_mime_is_unsupported_even_with_valid_content() {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255]));
    let file = ImageFile::new("x.gif", Some("image/gif"), encode(img, image::ImageFormat::Png));
    let err = decode_local_image(&file).unwrap_err();
    assert!(matches!(err, MemeError::UnsupportedImage(_)), "{err}");
}

#[test]
fn garbage_and_truncated_content_are_unsupported() {
    let garbage = ImageFile::new("notes.png", Some("image/png"), b"hello world".to_vec());
    assert!(matches!(
        decode_local_image(&garbage),
        Err(MemeError::UnsupportedImage(_))
    ));

    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([1, 2, 3, 255]));
    let mut bytes = encode(img, image::ImageFormat::Png);
    bytes.truncate(bytes.len() / 2);
    let truncated = ImageFile::new("half.png", None, bytes);
    assert!(matches!(
        decode_local_image(&truncated),
        Err(MemeError::UnsupportedImage(_))
    ));
}

#[test]
fn from_path_derives_mime_from_extension() {
    let dir = std::path::PathBuf::from("target").join("unit_decode");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("pic.JPEG");
    std::fs::write(&path, b"not really").unwrap();

    let file = ImageFile::from_path(&path).unwrap();
    assert_eq!(file.name, "pic.JPEG");
    assert_eq!(file.mime.as_deref(), Some("image/jpeg"));
    assert!(ImageFile::from_path(dir.join("missing.png")).is_err());
}
