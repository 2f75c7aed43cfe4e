//! CSS tokens (CSS Syntax Level 3, §4).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Integer,
    Number,
}

/// The numeric part of a number, percentage, or dimension token.
#[derive(Debug, Clone, PartialEq)]
pub struct Numeric {
    pub value: f64,
    pub kind: NumericKind,
    /// Source text of the number, sign and exponent included.
    pub repr: String,
}

impl Numeric {
    pub fn is_integer(&self) -> bool {
        self.kind == NumericKind::Integer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKind {
    /// The value would also start an identifier (usable as an id selector).
    Id,
    Unrestricted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Function(String),
    AtKeyword(String),
    Hash { value: String, kind: HashKind },
    String(String),
    BadString(String),
    Url(String),
    BadUrl,
    Delim(char),
    Colon,
    Semicolon,
    Comma,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    Number(Numeric),
    Percentage(Numeric),
    Dimension { value: Numeric, unit: String },
    Comment(String),
    Whitespace(String),
    Cdo,
    Cdc,
}

impl Token {
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Token::Whitespace(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Token::Comment(_))
    }

    pub fn is_delim(&self, ch: char) -> bool {
        matches!(self, Token::Delim(delim) if *delim == ch)
    }

    /// An identifier equal to `name`, ASCII case-insensitively.
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(self, Token::Ident(ident) if ident.eq_ignore_ascii_case(name))
    }

    /// The closing token for an opening bracket, and vice versa.
    pub fn mirror(&self) -> Option<Token> {
        match self {
            Token::LeftBrace => Some(Token::RightBrace),
            Token::RightBrace => Some(Token::LeftBrace),
            Token::LeftBracket => Some(Token::RightBracket),
            Token::RightBracket => Some(Token::LeftBracket),
            Token::LeftParen => Some(Token::RightParen),
            Token::RightParen => Some(Token::LeftParen),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => f.write_str(name),
            Token::Function(name) => write!(f, "{name}("),
            Token::AtKeyword(name) => write!(f, "@{name}"),
            Token::Hash { value, .. } => write!(f, "#{value}"),
            Token::String(value) => write_quoted(f, value),
            Token::BadString(value) => write!(f, "\"{value}"),
            Token::Url(url) => write!(f, "url({url})"),
            Token::BadUrl => f.write_str("url()"),
            Token::Delim(ch) => write!(f, "{ch}"),
            Token::Colon => f.write_str(":"),
            Token::Semicolon => f.write_str(";"),
            Token::Comma => f.write_str(","),
            Token::LeftBrace => f.write_str("{"),
            Token::RightBrace => f.write_str("}"),
            Token::LeftBracket => f.write_str("["),
            Token::RightBracket => f.write_str("]"),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::Number(number) => f.write_str(&number.repr),
            Token::Percentage(number) => write!(f, "{}%", number.repr),
            Token::Dimension { value, unit } => write!(f, "{}{unit}", value.repr),
            Token::Comment(text) => write!(f, "/*{text}*/"),
            Token::Whitespace(raw) => f.write_str(raw),
            Token::Cdo => f.write_str("<!--"),
            Token::Cdc => f.write_str("-->"),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in value.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\a ")?,
            other => write!(f, "{other}")?,
        }
    }
    f.write_str("\"")
}

#[cfg(test)]
mod tests {
    use super::{HashKind, Numeric, NumericKind, Token};

    #[test]
    fn display_serializes_token_text() {
        let number = Numeric {
            value: 1.5,
            kind: NumericKind::Number,
            repr: "1.5".to_string(),
        };
        assert_eq!(Token::Function("rgb".into()).to_string(), "rgb(");
        assert_eq!(Token::AtKeyword("media".into()).to_string(), "@media");
        assert_eq!(
            Token::Hash {
                value: "fff".into(),
                kind: HashKind::Unrestricted
            }
            .to_string(),
            "#fff"
        );
        assert_eq!(Token::Percentage(number.clone()).to_string(), "1.5%");
        assert_eq!(
            Token::Dimension {
                value: number,
                unit: "em".into()
            }
            .to_string(),
            "1.5em"
        );
        assert_eq!(Token::Comment(" hi ".into()).to_string(), "/* hi */");
    }

    #[test]
    fn strings_are_requoted_with_escapes() {
        assert_eq!(Token::String("a\"b\\".into()).to_string(), "\"a\\\"b\\\\\"");
    }

    #[test]
    fn brackets_mirror_each_other() {
        assert_eq!(Token::LeftBrace.mirror(), Some(Token::RightBrace));
        assert_eq!(Token::RightParen.mirror(), Some(Token::LeftParen));
        assert_eq!(Token::Colon.mirror(), None);
    }
}
