use std::path::PathBuf;
use std::time::Duration;

use crate::assets::decode::{PreparedImage, decode_image};
use crate::assets::fetch::{DefaultImageFetcher, ImageFetcher};
use crate::encode::jpeg::{DEFAULT_JPEG_QUALITY, encode_jpeg};
use crate::foundation::error::{MemeError, MemeResult};
use crate::render::caption::{CaptionRenderer, CaptionStyle};
use crate::render::composite::over_in_place;
use crate::render::frame::FrameRGBA;
use crate::session::export::{BaseLayer, DEFAULT_EXPORT_FILE_NAME, ExportArtifact, RenderTree};

/// Turns a [`RenderTree`] into an encoded image.
pub trait Compositor {
    /// Rasterize and encode `tree`. Failures are [`MemeError::Composition`].
    fn compose(&mut self, tree: &RenderTree) -> MemeResult<ExportArtifact>;
}

/// Options for [`RasterCompositor`].
#[derive(Clone, Debug)]
pub struct CompositorOpts {
    /// JPEG quality in `1..=100`.
    pub jpeg_quality: u8,
    /// Opaque color under transparent base-image pixels.
    pub background: [u8; 3],
    /// Caption styling.
    pub caption_style: CaptionStyle,
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` fonts.
    pub font_dirs: Vec<PathBuf>,
    /// Download file name stamped on artifacts.
    pub file_name: String,
    /// Let template URLs name local files (bare paths or `file://`). Off by default, so a
    /// listing served over HTTP can only point at `http(s)` images.
    pub allow_local_templates: bool,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            background: [255, 255, 255],
            caption_style: CaptionStyle::default(),
            font_dirs: Vec::new(),
            file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            allow_local_templates: false,
        }
    }
}

impl CompositorOpts {
    /// Override the JPEG quality.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Add a font directory.
    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }

    /// Allow or forbid template URLs that name local files.
    pub fn with_local_templates(mut self, allow: bool) -> Self {
        self.allow_local_templates = allow;
        self
    }

    /// Override the artifact file name.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }
}

/// CPU compositor: base image, caption layer on top, JPEG out.
pub struct RasterCompositor {
    opts: CompositorOpts,
    fetcher: Box<dyn ImageFetcher>,
    captions: CaptionRenderer,
}

impl std::fmt::Debug for RasterCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterCompositor")
            .field("opts", &self.opts)
            .field("captions", &self.captions)
            .finish_non_exhaustive()
    }
}

impl RasterCompositor {
    /// Create a compositor reading templates through `fetcher`.
    pub fn new(opts: CompositorOpts, fetcher: impl ImageFetcher + 'static) -> Self {
        let captions = CaptionRenderer::new(opts.caption_style.clone(), &opts.font_dirs);
        Self {
            opts,
            fetcher: Box::new(fetcher),
            captions,
        }
    }

    /// Create a compositor with the default HTTP/file fetcher.
    pub fn with_default_fetcher(opts: CompositorOpts, timeout: Duration) -> MemeResult<Self> {
        Ok(Self::new(opts, DefaultImageFetcher::new(timeout)?))
    }

    /// Options in use.
    pub fn opts(&self) -> &CompositorOpts {
        &self.opts
    }

    /// The caption renderer.
    pub fn caption_renderer(&self) -> &CaptionRenderer {
        &self.captions
    }

    /// Compose `tree` into premultiplied pixels without encoding.
    pub fn render(&mut self, tree: &RenderTree) -> MemeResult<FrameRGBA> {
        let base = self.resolve_base(&tree.base)?;
        let mut data = base.rgba8_premul.as_ref().clone();

        if !tree.captions.is_empty() {
            let layer = self
                .captions
                .rasterize(base.width, base.height, &tree.captions)?;
            over_in_place(&mut data, &layer)?;
        }

        Ok(FrameRGBA {
            width: base.width,
            height: base.height,
            data,
            premultiplied: true,
        })
    }

    fn resolve_base(&mut self, base: &BaseLayer) -> MemeResult<PreparedImage> {
        match base {
            BaseLayer::Local { image, .. } => Ok(image.clone()),
            BaseLayer::Remote { url } => {
                if !self.opts.allow_local_templates && !is_http_url(url) {
                    return Err(MemeError::composition(format!(
                        "template url '{url}' is not http(s); local template files are disabled"
                    )));
                }
                let bytes = self.fetcher.fetch(url).map_err(|e| {
                    MemeError::composition(format!("could not read base image '{url}': {e}"))
                })?;
                decode_image(&bytes).map_err(|e| {
                    MemeError::composition(format!("could not decode base image '{url}': {e}"))
                })
            }
        }
    }
}

fn is_http_url(url: &str) -> bool {
    let scheme = url.split_once("://").map(|(s, _)| s.to_ascii_lowercase());
    matches!(scheme.as_deref(), Some("http" | "https"))
}

impl Compositor for RasterCompositor {
    #[tracing::instrument(skip(self, tree), fields(base = %tree.base.url(), captions = tree.captions.len()))]
    fn compose(&mut self, tree: &RenderTree) -> MemeResult<ExportArtifact> {
        let frame = self.render(tree)?;
        let bytes = encode_jpeg(&frame, self.opts.jpeg_quality, self.opts.background).map_err(
            |e| match e {
                MemeError::Composition(_) => e,
                other => MemeError::composition(other.to_string()),
            },
        )?;
        tracing::debug!(bytes = bytes.len(), "export encoded");

        Ok(ExportArtifact {
            bytes,
            width: frame.width,
            height: frame.height,
            mime: "image/jpeg",
            file_name: self.opts.file_name.clone(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
