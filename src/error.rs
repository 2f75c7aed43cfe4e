//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while building or parsing ANSI styles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    #[error("hex color must be 3 or 6 hex digits, got {0:?}")]
    InvalidHex(String),

    #[error("invalid SGR parameter {0:?}")]
    InvalidCode(String),

    #[error("missing extended color type after {code}; expected `{code};5` or `{code};2`")]
    MissingColorType { code: u16 },

    #[error("invalid extended color type {kind} after {code}; expected 5 or 2")]
    InvalidColorType { code: u16, kind: u16 },

    #[error("missing xterm color index in `{code};5;<n>`")]
    MissingXterm { code: u16 },

    #[error("missing {missing} rgb component(s) in `{code};2;r;g;b`")]
    MissingRgb { code: u16, missing: usize },

    #[error("color component {0} is out of range 0..=255")]
    ComponentRange(u16),

    #[error("not an SGR sequence: {0:?}")]
    NotSgr(String),
}

/// Failures while tokenizing, parsing, or loading CSS.
#[derive(Debug, Error)]
pub enum CssError {
    #[error("{message} at {line}:{column}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("I/O error while reading stylesheet {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported @charset {charset:?} in {path}")]
    UnsupportedCharset { path: PathBuf, charset: String },

    #[error("stylesheet {path} is not valid {charset}")]
    InvalidEncoding { path: PathBuf, charset: String },

    #[error("stylesheet {path} has {count} parse error(s); first: {first}")]
    Strict {
        path: PathBuf,
        count: usize,
        first: String,
    },
}

impl CssError {
    #[must_use]
    pub fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    #[must_use]
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax(message.into())
    }

    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures while mutating a [`crate::css::Stylesheet`].
#[derive(Debug, Error)]
pub enum StylesheetError {
    #[error("stylesheet origin is not clean")]
    Security,

    #[error("stylesheet does not allow modification")]
    NotAllowed,

    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("rule index {index} is out of range for {len} rule(s)")]
    IndexSize { index: usize, len: usize },

    #[error(transparent)]
    Syntax(#[from] CssError),
}
