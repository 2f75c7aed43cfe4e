mod fixture;

use std::fs;

use contui::config::EnvConfig;
use contui::css::{Rule, Stylesheet};
use contui::{CssError, StylesheetError};

#[test]
fn load_fixture_from_disk() {
    let path = fixture::fixture_path("sample.css");
    let sheet = Stylesheet::load(&path, &EnvConfig::default()).expect("load sample");
    assert_eq!(sheet.len(), 3);
    assert!(!sheet.constructed());
    assert_eq!(sheet.content_type(), "text/css");
}

#[test]
fn strict_config_rejects_broken_sheet() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.css");
    fs::write(&path, "a { color: \"red\n }").expect("write");

    let strict = EnvConfig {
        strict_css: true,
        ..EnvConfig::default()
    };
    let err = Stylesheet::load(&path, &strict).expect_err("strict load fails");
    assert!(matches!(err, CssError::Strict { .. }));
    assert!(err.to_string().contains("newline in string"));

    let sheet = Stylesheet::load(&path, &EnvConfig::default()).expect("lenient load");
    assert_eq!(sheet.len(), 1);
}

#[test]
fn ascii_charset_rejects_high_bytes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ascii.css");
    fs::write(&path, b"@charset \"us-ascii\";a { content: \"\xE9\" }").expect("write");
    assert!(matches!(
        Stylesheet::from_path(&path, false),
        Err(CssError::InvalidEncoding { charset, .. }) if charset == "us-ascii"
    ));
}

#[test]
fn constructed_sheet_round_trip() {
    let mut sheet = Stylesheet::new();
    sheet
        .replace("@import \"skip.css\"; b { color: red }")
        .expect("replace");
    sheet.insert_rule("@media print { a {} }", 1).expect("insert");
    assert_eq!(sheet.len(), 2);
    assert!(matches!(&sheet.rules()[1], Rule::At(rule) if rule.is_named("media")));

    let removed = sheet.delete_rule(0).expect("delete");
    assert!(matches!(removed, Rule::Qualified(_)));
    assert!(matches!(
        sheet.delete_rule(5),
        Err(StylesheetError::IndexSize { index: 5, len: 1 })
    ));
}
