use super::*;

#[test]
fn offset_parses_dx_dy_pairs() {
    assert_eq!("12,-4.5".parse::<Offset>().unwrap(), Offset::new(12.0, -4.5));
    assert_eq!(" 3 , 4 ".parse::<Offset>().unwrap(), Offset::new(3.0, 4.0));
    assert!("12".parse::<Offset>().is_err());
    assert!("a,b".parse::<Offset>().is_err());
    assert!("inf,0".parse::<Offset>().is_err());
}

#[test]
fn offsets_accumulate() {
    let mut o = Offset::ZERO;
    o += Offset::new(5.0, 3.0);
    o += Offset::new(-2.0, 1.0);
    assert_eq!(o, Offset::new(3.0, 4.0));
    assert_eq!(Offset::new(1.0, 1.0) + Offset::new(1.0, -1.0), Offset::new(2.0, 0.0));
}

#[test]
fn caption_text_is_verbatim_by_slot() {
    let mut text = CaptionText::default();
    assert!(text.is_blank());

    text.set(CaptionSlot::Top, "  ");
    assert_eq!(text.get(CaptionSlot::Top), "  ");
    assert_eq!(text.get(CaptionSlot::Bottom), "");
    assert!(!text.is_blank());
}

#[test]
fn caption_slot_parses_names() {
    assert_eq!("TOP".parse::<CaptionSlot>().unwrap(), CaptionSlot::Top);
    assert_eq!("lower".parse::<CaptionSlot>().unwrap(), CaptionSlot::Bottom);
    assert!("middle".parse::<CaptionSlot>().is_err());
}

#[test]
fn positions_are_independent_per_slot() {
    let mut p = CaptionPositions::default();
    *p.get_mut(CaptionSlot::Bottom) += Offset::new(1.0, 2.0);
    assert_eq!(p.get(CaptionSlot::Top), Offset::ZERO);
    assert_eq!(p.get(CaptionSlot::Bottom), Offset::new(1.0, 2.0));
}
