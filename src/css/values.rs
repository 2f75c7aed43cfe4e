//! Reading node properties and styles out of CSS declarations.

use crate::core::node::{Properties, Size};
use crate::core::style::{Attr, ColorCode, Style};
use crate::css::parser::{ComponentValue, Declaration};
use crate::css::token::Token;

fn single_value(values: &[ComponentValue]) -> Option<&ComponentValue> {
    let mut significant = values.iter().filter(|value| !value.is_whitespace());
    let first = significant.next()?;
    significant.next().is_none().then_some(first)
}

/// `12` → cells, `50%` → fraction, `fit-content`.
pub fn size_from_value(values: &[ComponentValue]) -> Option<Size> {
    match single_value(values)?.token()? {
        Token::Number(number) if number.is_integer() && number.value >= 0.0 => {
            Some(Size::Cells(number.value as usize))
        }
        Token::Percentage(number) if number.value >= 0.0 => {
            Some(Size::Fraction((number.value / 100.0) as f32))
        }
        token if token.is_ident("fit-content") => Some(Size::FitContent),
        _ => None,
    }
}

/// `#rgb`, `#rrggbb`, a basic color name, or `rgb(r, g, b)`.
pub fn color_from_value(values: &[ComponentValue]) -> Option<ColorCode> {
    match single_value(values)? {
        ComponentValue::Preserved(Token::Hash { value, .. }) => ColorCode::hex(value).ok(),
        ComponentValue::Preserved(Token::Ident(name)) => ColorCode::named(name),
        ComponentValue::Function { name, value } if name.eq_ignore_ascii_case("rgb") => {
            rgb_from_args(value)
        }
        _ => None,
    }
}

fn rgb_from_args(args: &[ComponentValue]) -> Option<ColorCode> {
    let mut channels = Vec::with_capacity(3);
    for arg in args {
        match arg.token()? {
            Token::Whitespace(_) | Token::Comma => {}
            Token::Number(number) if number.is_integer() => {
                channels.push(number.value.clamp(0.0, 255.0) as u8);
            }
            _ => return None,
        }
    }
    match channels[..] {
        [r, g, b] => Some(ColorCode::Rgb(r, g, b)),
        _ => None,
    }
}

/// The declarations that win for each property: `!important` beats normal, later beats
/// earlier. Source order of the winners is kept.
fn winning<'a>(decls: impl IntoIterator<Item = &'a Declaration>) -> Vec<&'a Declaration> {
    let mut winners: Vec<&Declaration> = Vec::new();
    for decl in decls {
        match winners
            .iter()
            .position(|won| won.name.eq_ignore_ascii_case(&decl.name))
        {
            Some(idx) if winners[idx].important && !decl.important => {}
            Some(idx) => {
                winners.remove(idx);
                winners.push(decl);
            }
            None => winners.push(decl),
        }
    }
    winners
}

impl Properties {
    /// Apply `width` and `height` declarations. Values that do not parse are dropped before
    /// the cascade, so an earlier valid value still applies.
    pub fn apply(&mut self, decls: &[Declaration]) {
        let sizes = decls.iter().filter(|decl| is_size_property(&decl.name));
        let valid = sizes.filter(|decl| {
            let ok = size_from_value(&decl.value).is_some();
            if !ok {
                tracing::debug!(declaration = %decl, "ignoring unsupported size");
            }
            ok
        });
        for decl in winning(valid) {
            let Some(size) = size_from_value(&decl.value) else {
                continue;
            };
            if decl.name.eq_ignore_ascii_case("width") {
                self.width = size;
            } else {
                self.height = size;
            }
        }
    }

    pub fn from_declarations(decls: &[Declaration]) -> Self {
        let mut properties = Self::default();
        properties.apply(decls);
        properties
    }
}

fn is_size_property(name: &str) -> bool {
    name.eq_ignore_ascii_case("width") || name.eq_ignore_ascii_case("height")
}

fn keyword(values: &[ComponentValue]) -> Option<String> {
    match single_value(values)?.token()? {
        Token::Ident(name) => Some(name.to_ascii_lowercase()),
        _ => None,
    }
}

/// Build a terminal [`Style`] from `color`, `background`, `font-weight`, `font-style` and
/// `text-decoration`.
pub fn style_from_declarations(decls: &[Declaration]) -> Style {
    let valid = decls.iter().filter(|decl| {
        match decl.name.to_ascii_lowercase().as_str() {
            "color" | "background" | "background-color" => {
                color_from_value(&decl.value).is_some()
            }
            _ => true,
        }
    });
    let mut style = Style::default();
    for decl in winning(valid) {
        match decl.name.to_ascii_lowercase().as_str() {
            "color" => style.fg = color_from_value(&decl.value),
            "background" | "background-color" => style.bg = color_from_value(&decl.value),
            "font-weight" => {
                let bold = match single_value(&decl.value).and_then(ComponentValue::token) {
                    Some(Token::Number(weight)) => weight.value >= 600.0,
                    Some(token) => token.is_ident("bold") || token.is_ident("bolder"),
                    None => false,
                };
                toggle(&mut style, Attr::Bold, bold);
            }
            "font-style" => {
                let italic = matches!(keyword(&decl.value).as_deref(), Some("italic" | "oblique"));
                toggle(&mut style, Attr::Italic, italic);
            }
            "text-decoration" | "text-decoration-line" => {
                let lines: Vec<String> = decl
                    .value
                    .iter()
                    .filter_map(ComponentValue::token)
                    .filter_map(|token| match token {
                        Token::Ident(name) => Some(name.to_ascii_lowercase()),
                        _ => None,
                    })
                    .collect();
                toggle(
                    &mut style,
                    Attr::Underline,
                    lines.iter().any(|line| line == "underline"),
                );
                toggle(
                    &mut style,
                    Attr::Strike,
                    lines.iter().any(|line| line == "line-through"),
                );
            }
            _ => {}
        }
    }
    style
}

fn toggle(style: &mut Style, attr: Attr, on: bool) {
    if on {
        style.attrs.insert(attr);
    } else {
        style.attrs.remove(attr);
    }
}

#[cfg(test)]
mod tests {
    use super::{color_from_value, size_from_value, style_from_declarations};
    use crate::core::node::{Properties, Size};
    use crate::core::style::{Attr, ColorCode, Style};
    use crate::css::parser::{parse_component_values, parse_rule_list, Declaration, Rule};

    fn declarations(block: &str) -> Vec<Declaration> {
        let rules = parse_rule_list(format!("x {{ {block} }}"));
        match &rules[0] {
            Rule::Qualified(rule) => rule.declarations(),
            Rule::At(_) => panic!("expected qualified rule"),
        }
    }

    #[test]
    fn sizes() {
        assert_eq!(size_from_value(&parse_component_values(" 12 ")), Some(Size::Cells(12)));
        assert_eq!(size_from_value(&parse_component_values("50%")), Some(Size::Fraction(0.5)));
        assert_eq!(
            size_from_value(&parse_component_values("fit-content")),
            Some(Size::FitContent)
        );
        assert_eq!(size_from_value(&parse_component_values("1.5")), None);
        assert_eq!(size_from_value(&parse_component_values("-3")), None);
        assert_eq!(size_from_value(&parse_component_values("1 2")), None);
    }

    #[test]
    fn colors() {
        assert_eq!(
            color_from_value(&parse_component_values("#0f0")),
            Some(ColorCode::Rgb(0, 255, 0))
        );
        assert_eq!(
            color_from_value(&parse_component_values("Blue")),
            Some(ColorCode::BLUE)
        );
        assert_eq!(
            color_from_value(&parse_component_values("rgb(10, 20 ,300)")),
            Some(ColorCode::Rgb(10, 20, 255))
        );
        assert_eq!(color_from_value(&parse_component_values("rgb(1, 2)")), None);
        assert_eq!(color_from_value(&parse_component_values("#12")), None);
        assert_eq!(color_from_value(&parse_component_values("chartreuse")), None);
    }

    #[test]
    fn properties_apply_width_and_height() {
        let mut props = Properties::default();
        props.apply(&declarations("width: 20; height: 50%; width: nonsense"));
        assert_eq!(props.width, Size::Cells(20));
        assert_eq!(props.height, Size::Fraction(0.5));
    }

    #[test]
    fn important_declarations_win() {
        let props =
            Properties::from_declarations(&declarations("width: 5 !important; width: 9"));
        assert_eq!(props.width, Size::Cells(5));
    }

    #[test]
    fn style_from_block() {
        let style = style_from_declarations(&declarations(
            "color: red; background: #000; font-weight: bold; font-style: italic; \
             text-decoration: underline line-through",
        ));
        let expected = Style::default()
            .fg(ColorCode::RED)
            .bg((0u8, 0, 0))
            .bold()
            .italic()
            .underline()
            .with(Attr::Strike);
        assert_eq!(style, expected);
    }

    #[test]
    fn later_declarations_override_and_invalid_ones_are_dropped() {
        let style = style_from_declarations(&declarations(
            "font-weight: 700; color: red; font-weight: normal; color: nope",
        ));
        assert_eq!(style, Style::default().fg(ColorCode::RED));
    }
}
