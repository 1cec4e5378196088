use std::collections::HashMap;
use std::io::Cursor;

use super::*;
use crate::foundation::core::{CaptionSlot, Offset};
use crate::session::export::PositionedCaption;

struct MapFetcher(HashMap<String, Vec<u8>>);

impl ImageFetcher for MapFetcher {
    fn fetch(&mut self, url: &str) -> MemeResult<Vec<u8>> {
        self.0
            .get(url)
            .cloned()
            .ok_or_else(|| MemeError::Other(anyhow::anyhow!("blocked: {url}")))
    }
}

fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn compositor() -> RasterCompositor {
    let mut map = HashMap::new();
    map.insert("https://example.test/blue.png".to_string(), png(40, 30, [0, 0, 255, 255]));
    map.insert("https://example.test/garbage".to_string(), b"nope".to_vec());
    RasterCompositor::new(CompositorOpts::default(), MapFetcher(map))
}

#[test]
fn remote_base_without_captions_keeps_pixels() {
    let mut c = compositor();
    let tree = RenderTree {
        base: BaseLayer::Remote {
            url: "https://example.test/blue.png".into(),
        },
        captions: vec![],
    };
    let frame = c.render(&tree).unwrap();
    assert_eq!((frame.width, frame.height), (40, 30));
    assert_eq!(&frame.data[..4], &[0, 0, 255, 255]);

    let artifact = c.compose(&tree).unwrap();
    assert_eq!(artifact.mime, "image/jpeg");
    assert_eq!(artifact.file_name, "meme.jpeg");
    assert_eq!((artifact.width, artifact.height), (40, 30));
    let decoded = image::load_from_memory(&artifact.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (40, 30));
}

#[test]
fn unreadable_or_undecodable_base_is_a_composition_error() {
    let mut c = compositor();
    for url in ["https://other.test/cross-origin.png", "https://example.test/garbage"] {
        let tree = RenderTree {
            base: BaseLayer::Remote { url: url.into() },
            captions: vec![],
        };
        let err = c.compose(&tree).unwrap_err();
        assert!(matches!(err, MemeError::Composition(_)), "{err}");
        assert!(err.to_string().contains(url));
    }
}

#[test]
fn captions_render_over_base_with_same_size() {
    let mut c = compositor();
    let tree = RenderTree {
        base: BaseLayer::Remote {
            url: "https://example.test/blue.png".into(),
        },
        captions: vec![PositionedCaption {
            slot: CaptionSlot::Bottom,
            text: "BOTTOM".into(),
            offset: Offset::new(-3.0, -2.0),
        }],
    };
    let frame = c.render(&tree).unwrap();
    assert_eq!(frame.data.len(), 40 * 30 * 4);
    assert!(frame.data.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn invalid_quality_surfaces_as_composition_error() {
    let mut c = RasterCompositor::new(
        CompositorOpts::default().with_jpeg_quality(0),
        MapFetcher(HashMap::from([(
            "https://example.test/u.png".to_string(),
            png(2, 2, [1, 1, 1, 255]),
        )])),
    );
    let tree = RenderTree {
        base: BaseLayer::Remote {
            url: "https://example.test/u.png".into(),
        },
        captions: vec![],
    };
    assert!(matches!(c.compose(&tree), Err(MemeError::Composition(_))));
}

#[test]
fn local_template_urls_need_opt_in() {
    let urls = ["/home/u/private.png", "file:///home/u/private.png", "ftp://x.test/a.png"];
    let fetcher = || {
        MapFetcher(
            urls.iter()
                .map(|u| (u.to_string(), png(4, 4, [9, 9, 9, 255])))
                .collect(),
        )
    };
    let tree = |url: &str| RenderTree {
        base: BaseLayer::Remote { url: url.into() },
        captions: vec![],
    };

    let mut strict = RasterCompositor::new(CompositorOpts::default(), fetcher());
    for url in urls {
        let err = strict.compose(&tree(url)).unwrap_err();
        assert!(matches!(err, MemeError::Composition(_)), "{err}");
    }

    let mut local = RasterCompositor::new(
        CompositorOpts::default().with_local_templates(true),
        fetcher(),
    );
    let frame = local.render(&tree("/home/u/private.png")).unwrap();
    assert_eq!((frame.width, frame.height), (4, 4));
}

#[test]
fn scheme_check_ignores_case() {
    assert!(is_http_url("HTTPS://example.test/a.png"));
    assert!(is_http_url("http://example.test/a.png"));
    assert!(!is_http_url("example.test/http://a.png"));
    assert!(!is_http_url("/tmp/a.png"));
}
