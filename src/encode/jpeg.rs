use image::ImageEncoder as _;

use crate::foundation::error::{MemeError, MemeResult};
use crate::render::composite::flatten_to_rgb8;
use crate::render::frame::FrameRGBA;

/// JPEG quality used for exports unless configured otherwise.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Encode `frame` as baseline JPEG.
///
/// JPEG carries no alpha, so the frame is flattened onto `background` first. `quality` must be
/// in `1..=100`.
pub fn encode_jpeg(frame: &FrameRGBA, quality: u8, background: [u8; 3]) -> MemeResult<Vec<u8>> {
    if !(1..=100).contains(&quality) {
        return Err(MemeError::validation(format!(
            "jpeg quality must be in 1..=100, got {quality}"
        )));
    }
    let expected = FrameRGBA::byte_len(frame.width, frame.height)
        .ok_or_else(|| MemeError::composition("frame size overflow"))?;
    if expected == 0 || frame.data.len() != expected {
        return Err(MemeError::composition(format!(
            "frame buffer has {} bytes, expected {expected} for {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    let rgb = if frame.premultiplied {
        flatten_to_rgb8(&frame.data, background)?
    } else {
        let mut premul = frame.data.clone();
        for px in premul.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * a + 127) / 255) as u8;
            }
        }
        flatten_to_rgb8(&premul, background)?
    };

    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(
            &rgb,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| MemeError::composition(format!("jpeg encode failed: {e}")))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/jpeg.rs"]
mod tests;
