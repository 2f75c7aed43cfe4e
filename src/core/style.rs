//! Composable ANSI (SGR) styles.
//!
//! A [`Style`] is a plain value: a set of [`Attr`]s plus optional foreground and background
//! [`ColorCode`]s. It renders to a single `ESC[...m` sequence and can be parsed back from one.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::error::StyleError;

/// The eight basic terminal colors, in SGR order.
pub const NAMED_COLORS: [&str; 8] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
];

/// A resolved terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorCode {
    /// SGR 30-37 / 40-47.
    Basic(u8),
    /// SGR 90-97 / 100-107.
    Bright(u8),
    /// 256-color palette index.
    Xterm(u8),
    /// 24-bit color.
    Rgb(u8, u8, u8),
}

impl ColorCode {
    pub const BLACK: Self = Self::Basic(0);
    pub const RED: Self = Self::Basic(1);
    pub const GREEN: Self = Self::Basic(2);
    pub const YELLOW: Self = Self::Basic(3);
    pub const BLUE: Self = Self::Basic(4);
    pub const MAGENTA: Self = Self::Basic(5);
    pub const CYAN: Self = Self::Basic(6);
    pub const WHITE: Self = Self::Basic(7);

    /// Look up one of the eight named colors (case-insensitive).
    pub fn named(name: &str) -> Option<Self> {
        NAMED_COLORS
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(name))
            .map(|index| Self::Basic(index as u8))
    }

    /// Parse `#rgb`, `#rrggbb`, `rgb` or `rrggbb`.
    pub fn hex(code: &str) -> Result<Self, StyleError> {
        let digits = code.strip_prefix('#').unwrap_or(code);
        if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(StyleError::InvalidHex(code.to_string()));
        }
        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|ch| [ch, ch]).collect::<String>(),
            6 => digits.to_string(),
            _ => return Err(StyleError::InvalidHex(code.to_string())),
        };
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&expanded[range], 16)
                .map_err(|_| StyleError::InvalidHex(code.to_string()))
        };
        Ok(Self::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// A named color, or failing that a hex color.
    pub fn parse(spec: &str) -> Result<Self, StyleError> {
        match Self::named(spec) {
            Some(color) => Ok(color),
            None => Self::hex(spec),
        }
    }

    /// SGR parameters selecting this color as the foreground.
    pub fn fg_params(&self) -> String {
        match *self {
            Self::Basic(n) => format!("3{}", n & 7),
            Self::Bright(n) => format!("9{}", n & 7),
            Self::Xterm(n) => format!("38;5;{n}"),
            Self::Rgb(r, g, b) => format!("38;2;{r};{g};{b}"),
        }
    }

    /// SGR parameters selecting this color as the background.
    pub fn bg_params(&self) -> String {
        match *self {
            Self::Basic(n) => format!("4{}", n & 7),
            Self::Bright(n) => format!("10{}", n & 7),
            Self::Xterm(n) => format!("48;5;{n}"),
            Self::Rgb(r, g, b) => format!("48;2;{r};{g};{b}"),
        }
    }
}

impl From<(u8, u8, u8)> for ColorCode {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::Rgb(r, g, b)
    }
}

impl From<u8> for ColorCode {
    fn from(index: u8) -> Self {
        Self::Xterm(index)
    }
}

/// Text attributes, including the SGR codes that switch them back off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    Bold,
    Dim,
    Italic,
    Underline,
    Blink,
    Reverse,
    Strike,
    NormalIntensity,
    NoItalic,
    NoUnderline,
    NoBlink,
    NoReverse,
    NoStrike,
}

impl Attr {
    pub const ALL: [Attr; 13] = [
        Attr::Bold,
        Attr::Dim,
        Attr::Italic,
        Attr::Underline,
        Attr::Blink,
        Attr::Reverse,
        Attr::Strike,
        Attr::NormalIntensity,
        Attr::NoItalic,
        Attr::NoUnderline,
        Attr::NoBlink,
        Attr::NoReverse,
        Attr::NoStrike,
    ];

    pub fn code(self) -> u16 {
        match self {
            Attr::Bold => 1,
            Attr::Dim => 2,
            Attr::Italic => 3,
            Attr::Underline => 4,
            Attr::Blink => 6,
            Attr::Reverse => 7,
            Attr::Strike => 9,
            Attr::NormalIntensity => 22,
            Attr::NoItalic => 23,
            Attr::NoUnderline => 24,
            Attr::NoBlink => 25,
            Attr::NoReverse => 27,
            Attr::NoStrike => 29,
        }
    }

    /// The code that undoes this attribute. Reset attributes have nothing to undo.
    pub fn reset_code(self) -> Option<u16> {
        match self {
            Attr::Bold | Attr::Dim => Some(22),
            Attr::Italic => Some(23),
            Attr::Underline => Some(24),
            Attr::Blink => Some(25),
            Attr::Reverse => Some(27),
            Attr::Strike => Some(29),
            _ => None,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        // 5 (slow blink) and 6 (rapid blink) collapse to a single attribute.
        if code == 5 {
            return Some(Attr::Blink);
        }
        Self::ALL.into_iter().find(|attr| attr.code() == code)
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// A set of [`Attr`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Attrs(u16);

impl Attrs {
    pub const EMPTY: Attrs = Attrs(0);

    pub fn contains(self, attr: Attr) -> bool {
        self.0 & attr.bit() != 0
    }

    pub fn insert(&mut self, attr: Attr) {
        self.0 |= attr.bit();
    }

    pub fn remove(&mut self, attr: Attr) {
        self.0 &= !attr.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Attributes in ascending SGR code order.
    pub fn iter(self) -> impl Iterator<Item = Attr> {
        Attr::ALL
            .into_iter()
            .filter(move |attr| self.contains(*attr))
    }
}

impl From<Attr> for Attrs {
    fn from(attr: Attr) -> Self {
        Attrs(attr.bit())
    }
}

impl BitOr<Attr> for Attrs {
    type Output = Attrs;

    fn bitor(mut self, rhs: Attr) -> Attrs {
        self.insert(rhs);
        self
    }
}

impl BitOr for Attr {
    type Output = Attrs;

    fn bitor(self, rhs: Attr) -> Attrs {
        Attrs::from(self) | rhs
    }
}

impl BitOrAssign<Attr> for Attrs {
    fn bitor_assign(&mut self, rhs: Attr) {
        self.insert(rhs);
    }
}

impl FromIterator<Attr> for Attrs {
    fn from_iter<I: IntoIterator<Item = Attr>>(iter: I) -> Self {
        let mut attrs = Attrs::EMPTY;
        for attr in iter {
            attrs.insert(attr);
        }
        attrs
    }
}

/// Attributes plus optional colors, rendered as one SGR sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Style {
    pub attrs: Attrs,
    pub fg: Option<ColorCode>,
    pub bg: Option<ColorCode>,
}

impl Style {
    pub fn new(attrs: impl Into<Attrs>, fg: Option<ColorCode>, bg: Option<ColorCode>) -> Self {
        Self {
            attrs: attrs.into(),
            fg,
            bg,
        }
    }

    pub fn with(mut self, attr: Attr) -> Self {
        self.attrs.insert(attr);
        self
    }

    pub fn bold(self) -> Self {
        self.with(Attr::Bold)
    }

    pub fn italic(self) -> Self {
        self.with(Attr::Italic)
    }

    pub fn underline(self) -> Self {
        self.with(Attr::Underline)
    }

    pub fn fg(mut self, color: impl Into<ColorCode>) -> Self {
        self.fg = Some(color.into());
        self
    }

    pub fn bg(mut self, color: impl Into<ColorCode>) -> Self {
        self.bg = Some(color.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty() && self.fg.is_none() && self.bg.is_none()
    }

    /// Parse an `ESC[...m` sequence.
    pub fn from_ansi(sequence: &str) -> Result<Self, StyleError> {
        let body = sequence.strip_prefix("\x1b[").unwrap_or(sequence);
        let Some(params) = body.strip_suffix('m') else {
            return Err(StyleError::NotSgr(sequence.to_string()));
        };

        let mut style = Style::default();
        if params.is_empty() {
            return Ok(style);
        }

        let codes = params
            .split(';')
            .map(|part| {
                if part.is_empty() {
                    Ok(0)
                } else {
                    part.parse::<u16>()
                        .map_err(|_| StyleError::InvalidCode(part.to_string()))
                }
            })
            .collect::<Result<Vec<u16>, _>>()?;

        let mut idx = 0;
        while idx < codes.len() {
            let code = codes[idx];
            match code {
                0 => style = Style::default(),
                30..=37 => style.fg = Some(ColorCode::Basic((code - 30) as u8)),
                40..=47 => style.bg = Some(ColorCode::Basic((code - 40) as u8)),
                90..=97 => style.fg = Some(ColorCode::Bright((code - 90) as u8)),
                100..=107 => style.bg = Some(ColorCode::Bright((code - 100) as u8)),
                39 => style.fg = None,
                49 => style.bg = None,
                38 | 48 => {
                    let (color, consumed) = parse_extended(code, &codes[idx + 1..])?;
                    if code == 38 {
                        style.fg = Some(color);
                    } else {
                        style.bg = Some(color);
                    }
                    idx += consumed;
                }
                _ => {
                    if let Some(attr) = Attr::from_code(code) {
                        style.attrs.insert(attr);
                    }
                }
            }
            idx += 1;
        }

        Ok(style)
    }

    /// The sequence that applies this style, or `""` for the empty style.
    pub fn ansi(&self) -> String {
        let mut codes: Vec<String> = self.attrs.iter().map(|a| a.code().to_string()).collect();
        if let Some(fg) = self.fg.as_ref() {
            codes.push(fg.fg_params());
        }
        if let Some(bg) = self.bg.as_ref() {
            codes.push(bg.bg_params());
        }
        sgr(&codes)
    }

    /// The sequence that undoes exactly what this style sets.
    pub fn reset(&self) -> String {
        let mut resets: Vec<u16> = self.attrs.iter().filter_map(Attr::reset_code).collect();
        resets.sort_unstable();
        resets.dedup();
        let mut codes: Vec<String> = resets.into_iter().map(|code| code.to_string()).collect();
        if self.fg.is_some() {
            codes.push("39".to_string());
        }
        if self.bg.is_some() {
            codes.push("49".to_string());
        }
        sgr(&codes)
    }
}

impl From<Attr> for Style {
    fn from(attr: Attr) -> Self {
        Style::default().with(attr)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ansi())
    }
}

fn sgr(codes: &[String]) -> String {
    if codes.is_empty() {
        return String::new();
    }
    format!("\x1b[{}m", codes.join(";"))
}

/// Parse the tail of a `38;...` / `48;...` parameter list. Returns the color and how many
/// parameters after `code` were consumed.
fn parse_extended(code: u16, rest: &[u16]) -> Result<(ColorCode, usize), StyleError> {
    let Some(&kind) = rest.first() else {
        return Err(StyleError::MissingColorType { code });
    };
    match kind {
        5 => {
            let Some(&index) = rest.get(1) else {
                return Err(StyleError::MissingXterm { code });
            };
            Ok((ColorCode::Xterm(component(index)?), 2))
        }
        2 => {
            let available = rest.len().saturating_sub(1);
            if available < 3 {
                return Err(StyleError::MissingRgb {
                    code,
                    missing: 3 - available,
                });
            }
            let color = ColorCode::Rgb(component(rest[1])?, component(rest[2])?, component(rest[3])?);
            Ok((color, 4))
        }
        other => Err(StyleError::InvalidColorType { code, kind: other }),
    }
}

fn component(value: u16) -> Result<u8, StyleError> {
    u8::try_from(value).map_err(|_| StyleError::ComponentRange(value))
}

#[cfg(test)]
mod tests {
    use super::{Attr, ColorCode, Style};
    use crate::error::StyleError;

    #[test]
    fn hex_colors_expand_short_form() {
        assert_eq!(ColorCode::hex("#f0a"), Ok(ColorCode::Rgb(0xff, 0x00, 0xaa)));
        assert_eq!(ColorCode::hex("102030"), Ok(ColorCode::Rgb(0x10, 0x20, 0x30)));
        assert!(matches!(ColorCode::hex("#abcd"), Err(StyleError::InvalidHex(_))));
        assert!(matches!(ColorCode::hex("#ggg"), Err(StyleError::InvalidHex(_))));
    }

    #[test]
    fn named_colors_take_priority_over_hex() {
        assert_eq!(ColorCode::parse("Red"), Ok(ColorCode::RED));
        assert_eq!(ColorCode::parse("#000"), Ok(ColorCode::Rgb(0, 0, 0)));
    }

    #[test]
    fn ansi_joins_attrs_then_colors() {
        let style = Style::default().bold().underline().fg(ColorCode::RED).bg((1u8, 2, 3));
        assert_eq!(style.ansi(), "\x1b[1;4;31;48;2;1;2;3m");
        assert_eq!(style.to_string(), style.ansi());
    }

    #[test]
    fn empty_style_renders_nothing() {
        assert_eq!(Style::default().ansi(), "");
        assert_eq!(Style::default().reset(), "");
    }

    #[test]
    fn reset_dedupes_intensity() {
        let style = Style::default().bold().with(Attr::Dim).fg(9u8);
        assert_eq!(style.reset(), "\x1b[22;39m");
    }

    #[test]
    fn from_ansi_parses_attrs_and_colors() {
        let style = Style::from_ansi("\x1b[1;3;38;5;208;44m").expect("valid sgr");
        assert!(style.attrs.contains(Attr::Bold));
        assert!(style.attrs.contains(Attr::Italic));
        assert_eq!(style.fg, Some(ColorCode::Xterm(208)));
        assert_eq!(style.bg, Some(ColorCode::Basic(4)));
    }

    #[test]
    fn from_ansi_round_trips_rendered_style() {
        let style = Style::default().with(Attr::Strike).fg((10u8, 20, 30)).bg(ColorCode::Bright(2));
        assert_eq!(Style::from_ansi(&style.ansi()), Ok(style));
    }

    #[test]
    fn from_ansi_reset_codes_are_attributes() {
        let style = Style::from_ansi("\x1b[22;25m").expect("valid sgr");
        assert!(style.attrs.contains(Attr::NormalIntensity));
        assert!(style.attrs.contains(Attr::NoBlink));
        assert_eq!(style.reset(), "");
    }

    #[test]
    fn from_ansi_zero_resets_previous_codes() {
        let style = Style::from_ansi("\x1b[1;31;0;4m").expect("valid sgr");
        assert_eq!(style, Style::default().underline());
    }

    #[test]
    fn from_ansi_empty_params_reset() {
        assert_eq!(Style::from_ansi("\x1b[m"), Ok(Style::default()));
    }

    #[test]
    fn from_ansi_slow_blink() {
        let style = Style::from_ansi("\x1b[5m").expect("valid sgr");
        assert_eq!(style, Style::default().with(Attr::Blink));
    }

    #[test]
    fn from_ansi_default_color_codes_clear() {
        let style = Style::from_ansi("\x1b[31;42;39;49m").expect("valid sgr");
        assert_eq!(style.fg, None);
        assert_eq!(style.bg, None);
    }

    #[test]
    fn from_ansi_bright_foreground() {
        assert_eq!(Style::from_ansi("\x1b[90m"), Ok(Style::default().fg(ColorCode::Bright(0))));
        assert_eq!(Style::from_ansi("\x1b[97m"), Ok(Style::default().fg(ColorCode::Bright(7))));
    }

    #[test]
    fn from_ansi_skips_unknown_codes() {
        let style = Style::from_ansi("\x1b[1;58;4m").expect("valid sgr");
        assert_eq!(style, Style::default().bold().underline());
    }

    #[test]
    fn from_ansi_reports_extended_color_errors() {
        assert_eq!(
            Style::from_ansi("\x1b[38m"),
            Err(StyleError::MissingColorType { code: 38 })
        );
        assert_eq!(
            Style::from_ansi("\x1b[48;3;1m"),
            Err(StyleError::InvalidColorType { code: 48, kind: 3 })
        );
        assert_eq!(
            Style::from_ansi("\x1b[38;5m"),
            Err(StyleError::MissingXterm { code: 38 })
        );
        assert_eq!(
            Style::from_ansi("\x1b[38;2;10m"),
            Err(StyleError::MissingRgb { code: 38, missing: 2 })
        );
        assert_eq!(
            Style::from_ansi("\x1b[38;5;300m"),
            Err(StyleError::ComponentRange(300))
        );
    }

    #[test]
    fn from_ansi_rejects_garbage() {
        assert!(matches!(Style::from_ansi("\x1b[1;xm"), Err(StyleError::InvalidCode(_))));
        assert!(matches!(Style::from_ansi("\x1b[2J"), Err(StyleError::NotSgr(_))));
    }
}
