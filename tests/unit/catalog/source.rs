use super::*;

#[test]
fn parses_imgflip_listing_in_order() {
    let body = br#"{
        "success": true,
        "data": {
            "memes": [
                {"id": "181913649", "name": "Drake Hotline Bling", "url": "https://i.imgflip.com/30b1gx.jpg", "width": 1200, "height": 1200, "box_count": 2},
                {"id": 87743020, "name": "Two Buttons", "url": "https://i.imgflip.com/1g8my4.jpg"},
                {"url": "https://i.imgflip.com/1ur9b0.jpg", "captions": 1234}
            ]
        }
    }"#;

    let templates = parse_catalog_json(body).unwrap();
    assert_eq!(templates.len(), 3);
    assert_eq!(templates[0].display_url(), "https://i.imgflip.com/30b1gx.jpg");
    assert_eq!(templates[0].name(), Some("Drake Hotline Bling"));
    assert_eq!(templates[0].source_id(), Some("181913649"));
    assert_eq!(templates[0].size(), Some((1200, 1200)));
    assert_eq!(templates[0].box_count(), Some(2));
    assert_eq!(templates[1].source_id(), Some("87743020"));
    assert_eq!(templates[2].index(), 2);
    assert_eq!(templates[2].name(), None);
}

#[test]
fn empty_listing_is_not_a_parse_error() {
    let templates = parse_catalog_json(br#"{"data":{"memes":[]}}"#).unwrap();
    assert!(templates.is_empty());
}

#[test]
fn wrong_shapes_are_catalog_load_errors() {
    for body in [
        &br#"not json"#[..],
        br#"{"memes": []}"#,
        br#"{"data": {"memes": [{"name": "no url"}]}}"#,
        br#"{"data": {"memes": {"url": "x"}}}"#,
    ] {
        let err = parse_catalog_json(body).unwrap_err();
        assert!(matches!(err, MemeError::CatalogLoad(_)), "{err}");
    }
}

#[test]
fn failure_envelope_surfaces_message() {
    let err = parse_catalog_json(br#"{"success": false, "error_message": "rate limited"}"#)
        .unwrap_err();
    assert!(err.to_string().contains("rate limited"));
}

#[test]
fn file_source_reads_listing_and_reports_missing_file() {
    let dir = std::path::PathBuf::from("target").join("unit_file_source");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("memes.json");
    std::fs::write(&path, br#"{"data":{"memes":[{"url":"a"},{"url":"b"}]}}"#).unwrap();

    let src = FileTemplateSource::new(&path);
    let urls: Vec<String> = src
        .fetch_templates()
        .unwrap()
        .iter()
        .map(|t| t.display_url().to_string())
        .collect();
    assert_eq!(urls, vec!["a", "b"]);

    let missing = FileTemplateSource::new(dir.join("nope.json"));
    assert!(matches!(
        missing.fetch_templates(),
        Err(MemeError::CatalogLoad(_))
    ));
}
