mod fixture;

use contui::core::node::{Properties, Size};
use contui::core::style::ColorCode;
use contui::css::parser::serialize;
use contui::css::{
    minify, parse_comma_separated, parse_rule_list, parse_stylesheet, style_from_declarations,
    tokenize, Rule, StyleItem, Token,
};
use pretty_assertions::assert_eq;

fn describe(token: &Token) -> String {
    let kind = match token {
        Token::Ident(_) => "ident",
        Token::Function(_) => "function",
        Token::AtKeyword(_) => "at-keyword",
        Token::Hash { .. } => "hash",
        Token::String(_) => "string",
        Token::BadString(_) => "bad-string",
        Token::Url(_) => "url",
        Token::BadUrl => "bad-url",
        Token::Delim(_) => "delim",
        Token::Number(_) => "number",
        Token::Percentage(_) => "percentage",
        Token::Dimension { .. } => "dimension",
        Token::Comment(_) => "comment",
        Token::Whitespace(_) => "whitespace",
        _ => "punct",
    };
    format!("{kind} {token}")
}

#[test]
fn golden_minified_sample() {
    let source = fixture::read_fixture("sample.css");
    assert_eq!(minify(&source), fixture::read_unescaped("sample.min.css"));
}

#[test]
fn minified_sample_parses_to_the_same_rules() {
    let source = fixture::read_fixture("sample.css");
    let original: Vec<String> = parse_rule_list(source.as_str())
        .iter()
        .map(|rule| minify(&rule.to_string()))
        .collect();
    let minified: Vec<String> = parse_rule_list(minify(&source))
        .iter()
        .map(|rule| minify(&rule.to_string()))
        .collect();
    assert_eq!(original, minified);
}

#[test]
fn token_stream_of_a_selector_and_block() {
    let described: Vec<String> = tokenize("a:hover{margin:-1.5em 0 url(x.png)}")
        .iter()
        .map(describe)
        .collect();
    assert_eq!(
        described,
        [
            "ident a",
            "punct :",
            "ident hover",
            "punct {",
            "ident margin",
            "punct :",
            "dimension -1.5em",
            "whitespace  ",
            "number 0",
            "whitespace  ",
            "url url(x.png)",
            "punct }",
        ]
    );
}

#[test]
fn sample_stylesheet_structure() {
    let source = fixture::read_fixture("sample.css");
    let sheet = parse_stylesheet(source.as_str(), Some("sample.css"));
    assert!(sheet.errors().is_empty());
    assert_eq!(sheet.href(), Some("sample.css"));
    assert_eq!(sheet.len(), 3);
    assert!(sheet.rules()[0].is_at_rule("import"));

    let Rule::Qualified(panel) = &sheet.rules()[1] else {
        panic!("expected a style rule");
    };
    let selectors: Vec<String> = parse_comma_separated(panel.prelude.clone())
        .iter()
        .map(|group| serialize(group))
        .collect();
    assert_eq!(selectors, [".panel > .title", "#main"]);

    let items = panel.style_items();
    assert_eq!(items.len(), 5);
    assert!(matches!(&items[4], StyleItem::Rule(Rule::Qualified(nested)) if nested.prelude_text() == "& .hint"));

    let decls = panel.declarations();
    let rendered: Vec<String> = decls.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        [
            "width: 40",
            "height: 50%",
            "color: #ff0000 !important",
            "background: rgb(0, 0, 128)",
        ]
    );

    let props = Properties::from_declarations(&decls);
    assert_eq!(props.width, Size::Cells(40));
    assert_eq!(props.height, Size::Fraction(0.5));

    let style = style_from_declarations(&decls);
    assert_eq!(style.fg, Some(ColorCode::Rgb(255, 0, 0)));
    assert_eq!(style.bg, Some(ColorCode::Rgb(0, 0, 128)));
}

#[test]
fn media_block_holds_nested_rules() {
    let source = fixture::read_fixture("sample.css");
    let sheet = parse_stylesheet(source.as_str(), None);
    let Rule::At(media) = &sheet.rules()[2] else {
        panic!("expected @media");
    };
    assert_eq!(media.prelude_text(), "(min-width: 80ch)");

    let block = media.block.clone().unwrap_or_default();
    let nested = parse_rule_list(block);
    assert_eq!(nested.len(), 1);
    let Rule::Qualified(panel) = &nested[0] else {
        panic!("expected a style rule");
    };
    let props = Properties::from_declarations(&panel.declarations());
    assert_eq!(props.width, Size::FitContent);
}
