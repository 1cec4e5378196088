use super::*;
use crate::foundation::core::Offset;

fn caption(slot: CaptionSlot, text: &str, offset: Offset) -> PositionedCaption {
    PositionedCaption {
        slot,
        text: text.to_string(),
        offset,
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn anchors_follow_edges_and_offsets() {
    let style = CaptionStyle::default();

    let top = style.layout(400, 300, &caption(CaptionSlot::Top, "hi", Offset::ZERO));
    assert!(approx(top.font_px, 30.0));
    assert!(approx(top.center_x, 200.0));
    assert!(approx(top.baseline_y, 10.0 + 27.0));

    let bottom = style.layout(
        400,
        300,
        &caption(CaptionSlot::Bottom, "hi", Offset::new(5.0, 3.0)),
    );
    assert!(approx(bottom.center_x, 205.0));
    assert!(approx(bottom.baseline_y, 300.0 - 10.0 - 6.0 + 3.0));
}

#[test]
fn long_captions_shrink_but_not_below_minimum() {
    let style = CaptionStyle::default();
    let medium = style.layout(400, 300, &caption(CaptionSlot::Top, &"x".repeat(25), Offset::ZERO));
    assert!(medium.font_px < 30.0 && medium.font_px >= style.min_font_px);

    let long = style.layout(400, 300, &caption(CaptionSlot::Top, &"x".repeat(200), Offset::ZERO));
    assert!(approx(long.font_px, style.min_font_px));
}

#[test]
fn svg_escapes_text_and_preserves_whitespace() {
    let r = CaptionRenderer::new(CaptionStyle::default(), &[]);
    let svg = r.svg_document(
        100,
        80,
        &[caption(CaptionSlot::Top, "  <b>&\"cats\"  ", Offset::ZERO)],
    );
    assert!(svg.contains(r#"xml:space="preserve""#));
    assert!(svg.contains(">  &lt;b&gt;&amp;&quot;cats&quot;  </text>"));
    assert!(svg.starts_with("<svg"));
    assert!(svg.ends_with("</svg>"));
}

#[test]
fn rasterize_produces_full_layer() {
    let r = CaptionRenderer::new(CaptionStyle::default(), &[]);

    let empty = r.rasterize(32, 24, &[]).unwrap();
    assert_eq!(empty.len(), 32 * 24 * 4);
    assert!(empty.iter().all(|&b| b == 0));

    let layer = r
        .rasterize(
            200,
            120,
            &[caption(CaptionSlot::Top, "WHEN THE TEST", Offset::ZERO)],
        )
        .unwrap();
    assert_eq!(layer.len(), 200 * 120 * 4);
    if r.font_face_count() > 0 {
        assert!(layer.iter().any(|&b| b != 0), "expected visible caption pixels");
    }
}

#[test]
fn unreadable_font_dir_is_tolerated() {
    let r = CaptionRenderer::new(
        CaptionStyle::default(),
        &[PathBuf::from("target/definitely/not/a/font/dir")],
    );
    assert!(r.rasterize(8, 8, &[]).is_ok());
}
