use std::io::Cursor;

use super::*;
use crate::foundation::random::ScriptedIndexSource;

fn png_file(name: &str, rgba: [u8; 4]) -> ImageFile {
    let img = image::RgbaImage::from_pixel(3, 2, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    ImageFile::new(name, Some("image/png"), buf)
}

fn loaded(indices: impl IntoIterator<Item = usize>) -> Session {
    let mut s = Session::with_index_source(ScriptedIndexSource::new(indices));
    s.load_catalog(Template::list_from_urls(["a", "b", "c"]))
        .unwrap();
    s
}

#[test]
fn second_catalog_load_is_rejected_and_keeps_state() {
    let mut s = loaded([2]);
    let err = s
        .load_catalog(Template::list_from_urls(["x"]))
        .unwrap_err();
    assert!(matches!(err, MemeError::Validation(_)));
    assert_eq!(s.catalog().len(), 3);
    assert_eq!(s.active_image().map(ActiveImage::url), Some("c"));
}

#[test]
fn out_of_range_draw_is_rejected_without_changes() {
    let mut s = loaded([0, 7]);
    assert!(matches!(
        s.select_random_template(),
        Err(MemeError::Validation(_))
    ));
    assert_eq!(s.active_image().map(ActiveImage::url), Some("a"));
}

#[test]
fn render_tree_omits_empty_captions_and_carries_offsets() {
    let mut s = loaded([1]);
    s.set_caption_text(CaptionSlot::Bottom, "bottom text");
    s.move_caption(CaptionSlot::Bottom, Offset::new(4.0, -2.0));
    s.move_caption(CaptionSlot::Top, Offset::new(9.0, 9.0));

    let tree = s.render_tree().unwrap();
    assert_eq!(tree.base, BaseLayer::Remote { url: "b".into() });
    assert_eq!(
        tree.captions,
        vec![PositionedCaption {
            slot: CaptionSlot::Bottom,
            text: "bottom text".into(),
            offset: Offset::new(4.0, -2.0),
        }]
    );
}

#[test]
fn render_tree_without_image_is_a_composition_error() {
    let s = Session::with_index_source(ScriptedIndexSource::fixed(0));
    assert!(matches!(s.render_tree(), Err(MemeError::Composition(_))));
}

#[test]
fn base_image_changes_keep_text_and_offsets() {
    let mut s = loaded([0, 1]);
    s.set_caption_text(CaptionSlot::Top, "hi");
    s.move_caption(CaptionSlot::Top, Offset::new(1.0, 1.0));

    s.set_active_image_from_local_file(png_file("me.png", [1, 2, 3, 255]))
        .unwrap();
    assert_eq!(s.caption_text().top, "hi");
    assert_eq!(s.caption_positions().top, Offset::new(1.0, 1.0));

    s.select_random_template().unwrap();
    assert_eq!(s.caption_positions().top, Offset::new(1.0, 1.0));
    s.set_active_image_from_local_file(png_file("me.png", [1, 2, 3, 255]))
        .unwrap();

    let tree = s.render_tree().unwrap();
    let BaseLayer::Local { image, .. } = tree.base else {
        panic!("expected local base layer");
    };
    assert_eq!((image.width, image.height), (3, 2));
}

#[test]
fn switching_back_to_a_template_releases_the_local_image() {
    let mut s = loaded([0, 2]);
    s.set_active_image_from_local_file(png_file("me.png", [1, 2, 3, 255]))
        .unwrap();
    assert_eq!(s.local_images().live_count(), 1);

    s.select_random_template().unwrap();
    assert_eq!(s.local_images().live_count(), 0);
    assert_eq!(s.active_image().map(ActiveImage::url), Some("c"));
}

#[test]
fn finish_export_normalizes_failures_and_frees_the_slot() {
    let mut s = loaded([0]);
    let ticket = s.begin_export().unwrap();
    assert!(s.is_exporting());

    let err = s
        .finish_export(ticket, Err(MemeError::validation("bad pixels")))
        .unwrap_err();
    assert!(matches!(err, MemeError::Composition(_)));
    assert!(!s.is_exporting());
    assert!(s.begin_export().is_ok());
}

#[test]
fn drag_count_tracks_gestures() {
    let mut s = Session::with_index_source(ScriptedIndexSource::fixed(0));
    s.begin_drag(CaptionSlot::Top);
    s.begin_drag(CaptionSlot::Bottom);
    assert_eq!(s.active_drags(), 2);
    s.end_drag(CaptionSlot::Top);
    s.end_drag(CaptionSlot::Bottom);
    s.end_drag(CaptionSlot::Bottom);
    assert_eq!(s.active_drags(), 0);
}

struct BrokenSource;

impl TemplateSource for BrokenSource {
    fn fetch_templates(&self) -> MemeResult<Vec<Template>> {
        Err(MemeError::catalog_load("503 from listing"))
    }

    fn describe(&self) -> String {
        "broken".into()
    }
}

#[test]
fn failed_catalog_stays_failed() {
    let mut s = Session::with_index_source(ScriptedIndexSource::fixed(0));
    assert!(matches!(
        s.load_from_source(&BrokenSource),
        Err(MemeError::CatalogLoad(_))
    ));
    let failed = s.catalog_status().clone();
    assert!(matches!(failed, CatalogStatus::Failed(_)));

    let err = s.load_catalog(Template::list_from_urls(["a"])).unwrap_err();
    assert!(matches!(err, MemeError::Validation(_)));
    assert!(matches!(
        s.load_from_source(&BrokenSource),
        Err(MemeError::Validation(_))
    ));
    assert_eq!(s.catalog_status(), &failed);
    assert!(s.catalog().is_empty());
    assert!(s.active_image().is_none());
}

#[test]
fn dropping_an_unfinished_ticket_frees_the_export_slot() {
    let mut s = loaded([0]);
    {
        let _abandoned = s.begin_export().unwrap();
        assert!(s.is_exporting());
    }
    assert!(!s.is_exporting());

    let ticket = s.begin_export().unwrap();
    assert_eq!(ticket.id(), 2);
    assert!(matches!(s.begin_export(), Err(MemeError::ExportInProgress)));
}

#[test]
fn ticket_from_another_session_does_not_free_this_one() {
    let mut a = loaded([0]);
    let mut b = loaded([0]);
    let held = a.begin_export().unwrap();
    let foreign = b.begin_export().unwrap();
    assert_eq!(held.id(), foreign.id());

    let _ = a.finish_export(foreign, Err(MemeError::composition("x")));
    assert!(a.is_exporting());
    assert!(!b.is_exporting());
    drop(held);
    assert!(!a.is_exporting());
}
