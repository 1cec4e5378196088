use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::core::CaptionSlot;
use crate::foundation::error::{MemeError, MemeResult};
use crate::session::export::PositionedCaption;

/// Rough advance of one glyph relative to the font size, used to shrink long captions.
const AVG_GLYPH_ADVANCE: f64 = 0.6;
/// Fraction of the image width a caption may span before it is shrunk.
const MAX_LINE_FRACTION: f64 = 0.95;

/// Visual styling shared by both captions.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionStyle {
    /// CSS font-family list.
    pub font_families: String,
    /// Glyph fill color.
    pub fill: [u8; 3],
    /// Outline color.
    pub stroke: [u8; 3],
    /// Font size as a fraction of the image height.
    pub size_ratio: f64,
    /// Lower bound for the font size in pixels.
    pub min_font_px: f64,
    /// Upper bound for the font size in pixels.
    pub max_font_px: f64,
    /// Distance between a caption and its image edge in pixels.
    pub margin_px: f64,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_families: "Impact, Anton, 'Arial Black', 'DejaVu Sans', sans-serif".to_string(),
            fill: [255, 255, 255],
            stroke: [0, 0, 0],
            size_ratio: 0.1,
            min_font_px: 16.0,
            max_font_px: 120.0,
            margin_px: 10.0,
        }
    }
}

/// Where one caption lands on an image of a given size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptionLayout {
    /// Horizontal center of the text.
    pub center_x: f64,
    /// Baseline of the text.
    pub baseline_y: f64,
    /// Font size in pixels.
    pub font_px: f64,
}

impl CaptionStyle {
    /// Place `caption` on a `width x height` image.
    ///
    /// Captions are centered horizontally. The top caption hangs `margin_px` below the top edge,
    /// the bottom caption sits `margin_px` above the bottom edge, then both move by their offset.
    pub fn layout(&self, width: u32, height: u32, caption: &PositionedCaption) -> CaptionLayout {
        let w = f64::from(width);
        let h = f64::from(height);

        let mut font_px = (h * self.size_ratio).clamp(self.min_font_px, self.max_font_px);
        let glyphs = caption.text.chars().count().max(1) as f64;
        let fit_px = (w * MAX_LINE_FRACTION) / (glyphs * AVG_GLYPH_ADVANCE);
        if fit_px < font_px {
            font_px = fit_px.max(self.min_font_px.min(font_px));
        }

        let anchor_y = match caption.slot {
            CaptionSlot::Top => self.margin_px + font_px * 0.9,
            CaptionSlot::Bottom => h - self.margin_px - font_px * 0.2,
        };

        CaptionLayout {
            center_x: w / 2.0 + caption.offset.dx,
            baseline_y: anchor_y + caption.offset.dy,
            font_px,
        }
    }
}

/// Rasterizes captions into a transparent premultiplied RGBA8 layer.
///
/// Text goes through an SVG document rendered by `resvg`, so glyph outlines, strokes and font
/// fallback all come from the same font database.
pub struct CaptionRenderer {
    style: CaptionStyle,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for CaptionRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionRenderer")
            .field("style", &self.style)
            .field("font_faces", &self.fontdb.len())
            .finish()
    }
}

impl CaptionRenderer {
    /// Create a renderer using system fonts plus any fonts found in `font_dirs`.
    pub fn new(style: CaptionStyle, font_dirs: &[PathBuf]) -> Self {
        Self {
            style,
            fontdb: build_caption_fontdb(font_dirs),
        }
    }

    /// Styling in use.
    pub fn style(&self) -> &CaptionStyle {
        &self.style
    }

    /// Number of font faces available for captions. Zero means text cannot be drawn.
    pub fn font_face_count(&self) -> usize {
        self.fontdb.len()
    }

    /// The SVG document for `captions` on a `width x height` canvas.
    pub fn svg_document(&self, width: u32, height: u32, captions: &[PositionedCaption]) -> String {
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        for caption in captions {
            let l = self.style.layout(width, height, caption);
            let [fr, fg, fb] = self.style.fill;
            let [sr, sg, sb] = self.style.stroke;
            let _ = write!(
                svg,
                r#"<text xml:space="preserve" x="{x:.2}" y="{y:.2}" text-anchor="middle" font-family="{family}" font-weight="bold" font-size="{size:.2}" fill="rgb({fr},{fg},{fb})" stroke="rgb({sr},{sg},{sb})" stroke-width="{stroke:.2}" stroke-linejoin="round" paint-order="stroke">{text}</text>"#,
                x = l.center_x,
                y = l.baseline_y,
                family = escape_xml(&self.style.font_families),
                size = l.font_px,
                stroke = (l.font_px / 14.0).max(1.0),
                text = escape_xml(&caption.text),
            );
        }
        svg.push_str("</svg>");
        svg
    }

    /// Rasterize `captions` into a `width x height` premultiplied RGBA8 layer.
    pub fn rasterize(
        &self,
        width: u32,
        height: u32,
        captions: &[PositionedCaption],
    ) -> MemeResult<Vec<u8>> {
        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| MemeError::composition("failed to allocate caption pixmap"))?;
        if captions.is_empty() {
            return Ok(pixmap.data().to_vec());
        }
        if self.fontdb.is_empty() {
            tracing::warn!("no fonts available; captions will not be visible");
        }

        let svg = self.svg_document(width, height, captions);
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            font_resolver: make_caption_font_resolver(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts)
            .map_err(|e| MemeError::composition(format!("build caption layer: {e}")))?;

        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );
        Ok(pixmap.data().to_vec())
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() && c != '\t' && c != '\n' => {}
            c => out.push(c),
        }
    }
    out
}

fn build_caption_fontdb(font_dirs: &[PathBuf]) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    for dir in font_dirs {
        load_fonts_from_dir(&mut db, dir);
    }
    tracing::debug!(faces = db.len(), "caption font database ready");
    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    }
    let before = db.len();
    db.load_fonts_dir(dir);
    tracing::debug!(dir = %dir.display(), faces = db.len() - before, "loaded caption fonts");
}

// Named families from the style, then any sans-serif, then whatever face exists.
fn make_caption_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::fontdb::{Family, Query, Stretch, Style, Weight};

    usvg::FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families: Vec<Family<'_>> = font
                .families()
                .iter()
                .filter_map(|f| match f {
                    usvg::FontFamily::Named(name) => Some(Family::Name(name.as_str())),
                    _ => None,
                })
                .collect();
            families.push(Family::SansSerif);

            let query = Query {
                families: &families,
                weight: Weight(font.weight()),
                stretch: Stretch::Normal,
                style: Style::Normal,
            };
            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|f| f.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/caption.rs"]
mod tests;
