use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{MemeError, MemeResult};

/// MIME types accepted from the image picker (`.jpg, .jpeg, .png`).
const ACCEPTED_MIME: &[&str] = &["image/jpeg", "image/jpg", "image/pjpeg", "image/png"];

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// A user-picked file: name, optional MIME type and raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFile {
    /// File name as shown to the user.
    pub name: String,
    /// Declared MIME type. `None` means "sniff the content".
    pub mime: Option<String>,
    /// File content.
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Wrap in-memory content.
    pub fn new(name: impl Into<String>, mime: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.map(str::to_string),
            bytes,
        }
    }

    /// Read a file from disk, deriving the MIME type from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> MemeResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read image file '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = path
            .extension()
            .and_then(|e| e.to_str())
            .map(mime_for_extension);
        Ok(Self { name, mime, bytes })
    }
}

fn mime_for_extension(ext: &str) -> String {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" | "jfif" => "image/jpeg".to_string(),
        "png" => "image/png".to_string(),
        "gif" => "image/gif".to_string(),
        "webp" => "image/webp".to_string(),
        "bmp" => "image/bmp".to_string(),
        other => format!("application/x-{other}"),
    }
}

/// Decode encoded image bytes into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> MemeResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(MemeError::validation("image has zero width or height"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Validate and decode a user-picked file.
///
/// Only JPEG and PNG are accepted, both by declared MIME type and by sniffed content. Every
/// rejection is [`MemeError::UnsupportedImage`].
pub fn decode_local_image(file: &ImageFile) -> MemeResult<PreparedImage> {
    if let Some(mime) = file.mime.as_deref() {
        let mime = mime.trim().to_ascii_lowercase();
        if !ACCEPTED_MIME.contains(&mime.as_str()) {
            return Err(MemeError::unsupported_image(format!(
                "'{}' has type {mime}; expected a JPEG or PNG image",
                file.name
            )));
        }
    }

    match image::guess_format(&file.bytes) {
        Ok(image::ImageFormat::Jpeg | image::ImageFormat::Png) => {}
        Ok(other) => {
            return Err(MemeError::unsupported_image(format!(
                "'{}' contains {other:?} data; expected a JPEG or PNG image",
                file.name
            )));
        }
        Err(_) => {
            return Err(MemeError::unsupported_image(format!(
                "'{}' is not a recognizable image",
                file.name
            )));
        }
    }

    decode_image(&file.bytes)
        .map_err(|e| MemeError::unsupported_image(format!("'{}' could not be decoded: {e}", file.name)))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
