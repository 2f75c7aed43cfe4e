//! CSS tokenizer, following CSS Syntax Level 3 §4.3.
//!
//! Recoverable problems (unterminated strings, bad escapes, ...) never stop tokenization; they
//! are collected and exposed through [`Lexer::errors`].

use std::fs;
use std::path::Path;

use crate::css::token::{HashKind, Numeric, NumericKind, Token};
use crate::error::CssError;

const REPLACEMENT_CHARACTER: char = '\u{FFFD}';
const MAX_CODE_POINT: u32 = 0x10FFFF;

fn is_ident_start(ch: Option<char>) -> bool {
    matches!(ch, Some(c) if c.is_ascii_alphabetic() || !c.is_ascii() || c == '_')
}

fn is_ident_char(ch: Option<char>) -> bool {
    is_ident_start(ch) || matches!(ch, Some(c) if c.is_ascii_digit() || c == '-')
}

fn is_digit(ch: Option<char>) -> bool {
    matches!(ch, Some(c) if c.is_ascii_digit())
}

fn is_whitespace(ch: Option<char>) -> bool {
    matches!(ch, Some('\n' | '\t' | ' '))
}

fn is_non_printable(ch: char) -> bool {
    matches!(ch, '\u{0}'..='\u{8}' | '\u{B}' | '\u{E}'..='\u{1F}' | '\u{7F}')
}

/// Two code points form a valid escape.
fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    first == Some('\\') && second != Some('\n')
}

/// Three code points would start an ident sequence.
fn would_start_ident(first: Option<char>, second: Option<char>, third: Option<char>) -> bool {
    match first {
        Some('-') => is_ident_start(second) || second == Some('-') || is_valid_escape(second, third),
        Some('\\') => is_valid_escape(first, second),
        other => is_ident_start(other),
    }
}

/// Three code points would start a number.
fn would_start_number(first: Option<char>, second: Option<char>, third: Option<char>) -> bool {
    match first {
        Some('+' | '-') => is_digit(second) || (second == Some('.') && is_digit(third)),
        Some('.') => is_digit(second),
        other => is_digit(other),
    }
}

/// Normalize newlines and replace NUL, as the input stream preprocessing step requires.
fn preprocess(source: &str) -> Vec<char> {
    let mut chars = Vec::with_capacity(source.len());
    let mut iter = source.chars().peekable();
    while let Some(ch) = iter.next() {
        match ch {
            '\r' => {
                if iter.peek() == Some(&'\n') {
                    iter.next();
                }
                chars.push('\n');
            }
            '\u{C}' => chars.push('\n'),
            '\0' => chars.push(REPLACEMENT_CHARACTER),
            other => chars.push(other),
        }
    }
    chars
}

pub struct Lexer {
    chars: Vec<char>,
    /// Offsets of every `\n` in `chars`, ascending.
    newlines: Vec<usize>,
    pos: usize,
    errors: Vec<CssError>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        let chars = preprocess(source);
        let newlines = chars
            .iter()
            .enumerate()
            .filter_map(|(idx, &ch)| (ch == '\n').then_some(idx))
            .collect();
        Self {
            chars,
            newlines,
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Tokenize a stylesheet file, honoring a leading `@charset` rule.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CssError> {
        Ok(Self::new(&read_css(path)?))
    }

    /// Tokenize the whole input.
    pub fn process(&mut self) -> Vec<Token> {
        self.by_ref().collect()
    }

    pub fn errors(&self) -> &[CssError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<CssError> {
        std::mem::take(&mut self.errors)
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn reconsume(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    /// 1-based line and column of the current position.
    fn location(&self) -> (usize, usize) {
        let pos = self.pos.min(self.chars.len());
        let before = self.newlines.partition_point(|&offset| offset < pos);
        let line_start = match before {
            0 => 0,
            n => self.newlines[n - 1] + 1,
        };
        (before + 1, pos - line_start + 1)
    }

    fn error(&mut self, message: &str) {
        let (line, column) = self.location();
        tracing::debug!(line, column, "css: {message}");
        self.errors.push(CssError::parse(message, line, column));
    }

    fn consume_token(&mut self) -> Option<Token> {
        let ch = self.bump()?;
        let token = match ch {
            '/' if self.peek(0) == Some('*') => {
                self.bump();
                self.consume_comment()
            }
            '\n' | '\t' | ' ' => self.consume_whitespace(ch),
            '"' | '\'' => self.consume_string(ch),
            '#' => {
                if is_ident_char(self.peek(0)) || is_valid_escape(self.peek(0), self.peek(1)) {
                    let kind = if would_start_ident(self.peek(0), self.peek(1), self.peek(2)) {
                        HashKind::Id
                    } else {
                        HashKind::Unrestricted
                    };
                    Token::Hash {
                        value: self.consume_ident_sequence(),
                        kind,
                    }
                } else {
                    Token::Delim(ch)
                }
            }
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '[' => Token::LeftBracket,
            ']' => Token::RightBracket,
            '{' => Token::LeftBrace,
            '}' => Token::RightBrace,
            ',' => Token::Comma,
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            '+' | '.' => {
                if would_start_number(Some(ch), self.peek(0), self.peek(1)) {
                    self.reconsume();
                    self.consume_numeric()
                } else {
                    Token::Delim(ch)
                }
            }
            '-' => {
                if would_start_number(Some(ch), self.peek(0), self.peek(1)) {
                    self.reconsume();
                    self.consume_numeric()
                } else if self.peek(0) == Some('-') && self.peek(1) == Some('>') {
                    self.pos += 2;
                    Token::Cdc
                } else if would_start_ident(Some(ch), self.peek(0), self.peek(1)) {
                    self.reconsume();
                    self.consume_ident_like()
                } else {
                    Token::Delim(ch)
                }
            }
            '<' => {
                if self.peek(0) == Some('!') && self.peek(1) == Some('-') && self.peek(2) == Some('-')
                {
                    self.pos += 3;
                    Token::Cdo
                } else {
                    Token::Delim(ch)
                }
            }
            '@' => {
                if would_start_ident(self.peek(0), self.peek(1), self.peek(2)) {
                    Token::AtKeyword(self.consume_ident_sequence())
                } else {
                    Token::Delim(ch)
                }
            }
            '\\' => {
                if is_valid_escape(Some(ch), self.peek(0)) {
                    self.reconsume();
                    self.consume_ident_like()
                } else {
                    self.error("invalid escape");
                    Token::Delim(ch)
                }
            }
            c if c.is_ascii_digit() => {
                self.reconsume();
                self.consume_numeric()
            }
            c if is_ident_start(Some(c)) => {
                self.reconsume();
                self.consume_ident_like()
            }
            other => Token::Delim(other),
        };
        Some(token)
    }

    /// After the opening `/*`.
    fn consume_comment(&mut self) -> Token {
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('*') if self.peek(0) == Some('/') => {
                    self.bump();
                    return Token::Comment(text);
                }
                Some(ch) => text.push(ch),
                None => {
                    self.error("unterminated comment");
                    return Token::Comment(text);
                }
            }
        }
    }

    fn consume_whitespace(&mut self, first: char) -> Token {
        let mut raw = String::from(first);
        while is_whitespace(self.peek(0)) {
            if let Some(ch) = self.bump() {
                raw.push(ch);
            }
        }
        Token::Whitespace(raw)
    }

    /// After the opening quote.
    fn consume_string(&mut self, ending: char) -> Token {
        let mut value = String::new();
        loop {
            match self.bump() {
                None => {
                    self.error("unterminated string");
                    return Token::String(value);
                }
                Some(ch) if ch == ending => return Token::String(value),
                Some('\n') => {
                    self.reconsume();
                    self.error("newline in string");
                    return Token::BadString(value);
                }
                Some('\\') => match self.peek(0) {
                    None => {}
                    Some('\n') => {
                        self.bump();
                    }
                    Some(_) => value.push(self.consume_escape()),
                },
                Some(ch) => value.push(ch),
            }
        }
    }

    /// After the backslash of a valid escape.
    fn consume_escape(&mut self) -> char {
        let Some(first) = self.bump() else {
            self.error("escape at end of input");
            return REPLACEMENT_CHARACTER;
        };
        if !first.is_ascii_hexdigit() {
            return first;
        }

        let mut digits = String::from(first);
        while digits.len() < 6 {
            match self.peek(0) {
                Some(ch) if ch.is_ascii_hexdigit() => {
                    digits.push(ch);
                    self.pos += 1;
                }
                _ => break,
            }
        }
        if is_whitespace(self.peek(0)) {
            self.pos += 1;
        }

        let code = u32::from_str_radix(&digits, 16).unwrap_or(0);
        if code == 0 || code > MAX_CODE_POINT {
            return REPLACEMENT_CHARACTER;
        }
        // Surrogates are rejected by `from_u32`.
        char::from_u32(code).unwrap_or(REPLACEMENT_CHARACTER)
    }

    fn consume_ident_sequence(&mut self) -> String {
        let mut result = String::new();
        loop {
            if is_ident_char(self.peek(0)) {
                if let Some(ch) = self.bump() {
                    result.push(ch);
                }
            } else if is_valid_escape(self.peek(0), self.peek(1)) {
                self.bump();
                result.push(self.consume_escape());
            } else {
                return result;
            }
        }
    }

    fn consume_number(&mut self) -> Numeric {
        let mut repr = String::new();
        let mut kind = NumericKind::Integer;

        if let Some(sign @ ('+' | '-')) = self.peek(0) {
            repr.push(sign);
            self.pos += 1;
        }
        self.push_digits(&mut repr);

        if self.peek(0) == Some('.') && is_digit(self.peek(1)) {
            repr.push('.');
            self.pos += 1;
            self.push_digits(&mut repr);
            kind = NumericKind::Number;
        }

        if let Some(e @ ('e' | 'E')) = self.peek(0) {
            let signed = matches!(self.peek(1), Some('+' | '-')) && is_digit(self.peek(2));
            if signed || is_digit(self.peek(1)) {
                repr.push(e);
                self.pos += 1;
                if signed {
                    if let Some(sign) = self.bump() {
                        repr.push(sign);
                    }
                }
                self.push_digits(&mut repr);
                kind = NumericKind::Number;
            }
        }

        let value = repr.parse::<f64>().unwrap_or(0.0);
        Numeric { value, kind, repr }
    }

    fn push_digits(&mut self, out: &mut String) {
        while let Some(ch) = self.peek(0).filter(char::is_ascii_digit) {
            out.push(ch);
            self.pos += 1;
        }
    }

    fn consume_numeric(&mut self) -> Token {
        let value = self.consume_number();
        if would_start_ident(self.peek(0), self.peek(1), self.peek(2)) {
            let unit = self.consume_ident_sequence();
            Token::Dimension { value, unit }
        } else if self.peek(0) == Some('%') {
            self.pos += 1;
            Token::Percentage(value)
        } else {
            Token::Number(value)
        }
    }

    fn consume_ident_like(&mut self) -> Token {
        let name = self.consume_ident_sequence();
        if name.eq_ignore_ascii_case("url") && self.peek(0) == Some('(') {
            self.pos += 1;
            while is_whitespace(self.peek(0)) && is_whitespace(self.peek(1)) {
                self.pos += 1;
            }
            let quoted = |ch: Option<char>| matches!(ch, Some('"' | '\''));
            if quoted(self.peek(0)) || (is_whitespace(self.peek(0)) && quoted(self.peek(1))) {
                return Token::Function(name);
            }
            return self.consume_url();
        }
        if self.peek(0) == Some('(') {
            self.pos += 1;
            return Token::Function(name);
        }
        Token::Ident(name)
    }

    /// After `url(`, for an unquoted url.
    fn consume_url(&mut self) -> Token {
        let mut url = String::new();
        while is_whitespace(self.peek(0)) {
            self.pos += 1;
        }
        loop {
            match self.bump() {
                Some(')') => return Token::Url(url),
                None => {
                    self.error("unterminated url");
                    return Token::Url(url);
                }
                Some('\n' | '\t' | ' ') => {
                    while is_whitespace(self.peek(0)) {
                        self.pos += 1;
                    }
                    match self.peek(0) {
                        Some(')') => {
                            self.pos += 1;
                            return Token::Url(url);
                        }
                        None => {
                            self.error("unterminated url");
                            return Token::Url(url);
                        }
                        Some(_) => {
                            self.error("whitespace inside url");
                            self.consume_bad_url_remnants();
                            return Token::BadUrl;
                        }
                    }
                }
                Some(ch @ ('"' | '\'' | '(')) => {
                    self.error(&format!("unexpected {ch:?} in url"));
                    self.consume_bad_url_remnants();
                    return Token::BadUrl;
                }
                Some(ch) if is_non_printable(ch) => {
                    self.error("non-printable character in url");
                    self.consume_bad_url_remnants();
                    return Token::BadUrl;
                }
                Some('\\') => {
                    if is_valid_escape(Some('\\'), self.peek(0)) {
                        url.push(self.consume_escape());
                    } else {
                        self.error("invalid escape in url");
                        self.consume_bad_url_remnants();
                        return Token::BadUrl;
                    }
                }
                Some(ch) => url.push(ch),
            }
        }
    }

    fn consume_bad_url_remnants(&mut self) {
        loop {
            match self.bump() {
                None | Some(')') => return,
                Some('\\') if is_valid_escape(Some('\\'), self.peek(0)) => {
                    self.consume_escape();
                }
                Some(_) => {}
            }
        }
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.consume_token()
    }
}

/// Tokenize `source`, discarding errors.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).process()
}

/// Read a stylesheet file into a string.
///
/// A UTF-8 byte order mark is dropped. A leading `@charset "<name>";` rule selects the decoding
/// for the rest of the file and is removed; otherwise the file must be UTF-8. The result is
/// trimmed.
pub fn read_css(path: impl AsRef<Path>) -> Result<String, CssError> {
    const CHARSET_PREFIX: &[u8] = b"@charset \"";

    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| CssError::io(path, source))?;
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);

    let (charset, body) = match bytes.strip_prefix(CHARSET_PREFIX) {
        Some(rest) => match rest.windows(2).position(|pair| pair == b"\";") {
            Some(end) => (
                String::from_utf8_lossy(&rest[..end]).trim().to_ascii_lowercase(),
                &rest[end + 2..],
            ),
            None => ("utf-8".to_string(), bytes),
        },
        None => ("utf-8".to_string(), bytes),
    };

    let invalid = || CssError::InvalidEncoding {
        path: path.to_path_buf(),
        charset: charset.clone(),
    };
    let text = match charset.as_str() {
        "utf-8" | "utf8" | "unicode-1-1-utf-8" => {
            String::from_utf8(body.to_vec()).map_err(|_| invalid())?
        }
        "us-ascii" | "ascii" => {
            if !body.is_ascii() {
                return Err(invalid());
            }
            String::from_utf8_lossy(body).into_owned()
        }
        "iso-8859-1" | "latin1" | "latin-1" | "l1" => body.iter().map(|&b| char::from(b)).collect(),
        _ => {
            return Err(CssError::UnsupportedCharset {
                path: path.to_path_buf(),
                charset: charset.clone(),
            })
        }
    };

    tracing::debug!(path = %path.display(), charset = %charset, "read stylesheet");
    Ok(text.trim().to_string())
}

/// Serialize `source` without comments and with whitespace collapsed where it is not needed.
///
/// A run of whitespace and comments becomes one space, or nothing when it borders `{`, `}`,
/// `;`, `,`, `:`, `>` or `~`.
pub fn minify(source: &str) -> String {
    fn hugs_space(token: &Token) -> bool {
        matches!(
            token,
            Token::LeftBrace
                | Token::RightBrace
                | Token::Semicolon
                | Token::Comma
                | Token::Colon
                | Token::Delim('>' | '~')
        )
    }

    let mut out = String::new();
    let mut previous: Option<Token> = None;
    let mut gap = false;
    for token in Lexer::new(source) {
        if token.is_whitespace() || token.is_comment() {
            gap = true;
            continue;
        }
        if gap {
            if let Some(prev) = previous.as_ref() {
                if !hugs_space(prev) && !hugs_space(&token) {
                    out.push(' ');
                }
            }
        }
        out.push_str(&token.to_string());
        previous = Some(token);
        gap = false;
    }
    out
}
