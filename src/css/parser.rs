//! CSS parser (CSS Syntax Level 3, §5).
//!
//! Parsing never stops at the first problem. Structural errors (unclosed blocks, at-rules
//! without a terminator, declarations without a colon) are collected on the [`Parser`] and
//! parsing resumes at the next sensible boundary. Only the single-item entry points
//! ([`parse_rule`], [`parse_declaration`], [`parse_component_value`]) turn them into a
//! `CssError::Syntax`.

use std::collections::VecDeque;
use std::fmt;

use crate::css::lexer::Lexer;
use crate::css::stylesheet::Stylesheet;
use crate::css::token::Token;
use crate::error::CssError;

/// Deepest block or function nesting the parser builds. Anything deeper is skipped.
pub const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Brace,
    Bracket,
    Paren,
}

impl BlockKind {
    fn opened_by(token: &Token) -> Option<Self> {
        match token {
            Token::LeftBrace => Some(BlockKind::Brace),
            Token::LeftBracket => Some(BlockKind::Bracket),
            Token::LeftParen => Some(BlockKind::Paren),
            _ => None,
        }
    }

    pub fn open(self) -> Token {
        match self {
            BlockKind::Brace => Token::LeftBrace,
            BlockKind::Bracket => Token::LeftBracket,
            BlockKind::Paren => Token::LeftParen,
        }
    }

    pub fn close(self) -> Token {
        match self {
            BlockKind::Brace => Token::RightBrace,
            BlockKind::Bracket => Token::RightBracket,
            BlockKind::Paren => Token::RightParen,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComponentValue {
    /// Any token that is not an opening bracket or a function token.
    Preserved(Token),
    Function {
        name: String,
        value: Vec<ComponentValue>,
    },
    Block {
        kind: BlockKind,
        value: Vec<ComponentValue>,
    },
}

impl ComponentValue {
    pub fn token(&self) -> Option<&Token> {
        match self {
            ComponentValue::Preserved(token) => Some(token),
            _ => None,
        }
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, ComponentValue::Preserved(token) if token.is_whitespace())
    }

    fn is_token(&self, expected: &Token) -> bool {
        matches!(self, ComponentValue::Preserved(token) if token == expected)
    }
}

impl From<Token> for ComponentValue {
    fn from(token: Token) -> Self {
        ComponentValue::Preserved(token)
    }
}

impl fmt::Display for ComponentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentValue::Preserved(token) => write!(f, "{token}"),
            ComponentValue::Function { name, value } => {
                write!(f, "{name}(")?;
                write_values(f, value)?;
                f.write_str(")")
            }
            ComponentValue::Block { kind, value } => {
                write!(f, "{}", kind.open())?;
                write_values(f, value)?;
                write!(f, "{}", kind.close())
            }
        }
    }
}

fn write_values(f: &mut fmt::Formatter<'_>, values: &[ComponentValue]) -> fmt::Result {
    values.iter().try_for_each(|value| write!(f, "{value}"))
}

/// Serialize component values back to CSS text, trimmed of surrounding whitespace.
pub fn serialize(values: &[ComponentValue]) -> String {
    let text: String = values.iter().map(ToString::to_string).collect();
    text.trim().to_string()
}

fn trim_whitespace(values: &mut Vec<ComponentValue>) {
    while values.last().is_some_and(ComponentValue::is_whitespace) {
        values.pop();
    }
    let leading = values
        .iter()
        .take_while(|value| value.is_whitespace())
        .count();
    values.drain(..leading);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub value: Vec<ComponentValue>,
    pub important: bool,
}

impl Declaration {
    /// The value as CSS text, without `!important`.
    pub fn value_text(&self) -> String {
        serialize(&self.value)
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value_text())?;
        if self.important {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedRule {
    pub prelude: Vec<ComponentValue>,
    /// Contents of the `{}` block.
    pub block: Vec<ComponentValue>,
}

impl QualifiedRule {
    pub fn prelude_text(&self) -> String {
        serialize(&self.prelude)
    }

    /// The block parsed as a style block.
    pub fn style_items(&self) -> Vec<StyleItem> {
        parse_style_block(self.block.as_slice())
    }

    /// Declarations of the style block, in source order.
    pub fn declarations(&self) -> Vec<Declaration> {
        self.style_items()
            .into_iter()
            .filter_map(|item| match item {
                StyleItem::Declaration(decl) => Some(decl),
                StyleItem::Rule(_) => None,
            })
            .collect()
    }
}

impl fmt::Display for QualifiedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{{}}}", self.prelude_text(), serialize(&self.block))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    pub name: String,
    pub prelude: Vec<ComponentValue>,
    pub block: Option<Vec<ComponentValue>>,
}

impl AtRule {
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn prelude_text(&self) -> String {
        serialize(&self.prelude)
    }
}

impl fmt::Display for AtRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        let prelude = self.prelude_text();
        if !prelude.is_empty() {
            write!(f, " {prelude}")?;
        }
        match &self.block {
            Some(block) => write!(f, " {{{}}}", serialize(block)),
            None => f.write_str(";"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Qualified(QualifiedRule),
    At(AtRule),
}

impl Rule {
    /// The at-rule name, if this is an at-rule.
    pub fn at_name(&self) -> Option<&str> {
        match self {
            Rule::At(rule) => Some(&rule.name),
            Rule::Qualified(_) => None,
        }
    }

    pub fn is_at_rule(&self, name: &str) -> bool {
        matches!(self, Rule::At(rule) if rule.is_named(name))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Qualified(rule) => write!(f, "{rule}"),
            Rule::At(rule) => write!(f, "{rule}"),
        }
    }
}

/// An item of a style block: declarations come first, then nested rules.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleItem {
    Declaration(Declaration),
    Rule(Rule),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationItem {
    Declaration(Declaration),
    AtRule(AtRule),
}

/// Input accepted by the parser.
///
/// Strings are tokenized first and their comments dropped; tokenizer errors are carried over
/// into the parser's error list.
pub trait ParseSource {
    fn into_component_values(self) -> (Vec<ComponentValue>, Vec<CssError>);
}

impl ParseSource for &str {
    fn into_component_values(self) -> (Vec<ComponentValue>, Vec<CssError>) {
        let mut lexer = Lexer::new(self);
        let values = lexer
            .by_ref()
            .filter(|token| !token.is_comment())
            .map(ComponentValue::Preserved)
            .collect();
        (values, lexer.take_errors())
    }
}

impl ParseSource for &String {
    fn into_component_values(self) -> (Vec<ComponentValue>, Vec<CssError>) {
        self.as_str().into_component_values()
    }
}

impl ParseSource for String {
    fn into_component_values(self) -> (Vec<ComponentValue>, Vec<CssError>) {
        self.as_str().into_component_values()
    }
}

impl ParseSource for Vec<Token> {
    fn into_component_values(self) -> (Vec<ComponentValue>, Vec<CssError>) {
        (
            self.into_iter().map(ComponentValue::Preserved).collect(),
            Vec::new(),
        )
    }
}

impl ParseSource for Vec<ComponentValue> {
    fn into_component_values(self) -> (Vec<ComponentValue>, Vec<CssError>) {
        (self, Vec::new())
    }
}

impl ParseSource for &[ComponentValue] {
    fn into_component_values(self) -> (Vec<ComponentValue>, Vec<CssError>) {
        (self.to_vec(), Vec::new())
    }
}

pub struct Parser {
    input: VecDeque<ComponentValue>,
    errors: Vec<CssError>,
    depth: usize,
}

impl Parser {
    pub fn new(source: impl ParseSource) -> Self {
        let (values, errors) = source.into_component_values();
        Self {
            input: values.into(),
            errors,
            depth: 0,
        }
    }

    pub fn errors(&self) -> &[CssError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<CssError> {
        self.errors
    }

    fn next(&mut self) -> Option<ComponentValue> {
        self.input.pop_front()
    }

    fn peek(&self) -> Option<&ComponentValue> {
        self.input.front()
    }

    fn peek_is(&self, expected: &Token) -> bool {
        self.peek().is_some_and(|value| value.is_token(expected))
    }

    fn reconsume(&mut self, value: ComponentValue) {
        self.input.push_front(value);
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(ComponentValue::is_whitespace) {
            self.input.pop_front();
        }
    }

    fn at_end(&self) -> bool {
        self.input.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("css: {message}");
        self.errors.push(CssError::syntax(message));
    }

    fn first_error_or(&mut self, fallback: &str) -> CssError {
        if self.errors.is_empty() {
            CssError::syntax(fallback)
        } else {
            self.errors.swap_remove(0)
        }
    }

    /// Consume the next component value, grouping blocks and functions.
    pub fn consume_component_value(&mut self) -> Option<ComponentValue> {
        let first = self.next()?;
        Some(self.consume_nested(first))
    }

    fn consume_nested(&mut self, first: ComponentValue) -> ComponentValue {
        match first {
            ComponentValue::Preserved(Token::Function(name)) => {
                let value = self.consume_until_close(&Token::RightParen, "function was not closed");
                ComponentValue::Function { name, value }
            }
            ComponentValue::Preserved(token) => match BlockKind::opened_by(&token) {
                Some(kind) => ComponentValue::Block {
                    kind,
                    value: self.consume_block(kind),
                },
                None => ComponentValue::Preserved(token),
            },
            other => other,
        }
    }

    fn consume_block(&mut self, kind: BlockKind) -> Vec<ComponentValue> {
        self.consume_until_close(&kind.close(), "block was not closed")
    }

    fn consume_until_close(&mut self, close: &Token, unclosed: &str) -> Vec<ComponentValue> {
        let mut value = Vec::new();
        if self.depth >= MAX_NESTING {
            self.error("nesting too deep");
            self.skip_nested();
            return value;
        }
        self.depth += 1;
        loop {
            match self.next() {
                None => {
                    self.error(unclosed);
                    break;
                }
                Some(item) if item.is_token(close) => break,
                Some(item) => value.push(self.consume_nested(item)),
            }
        }
        self.depth -= 1;
        value
    }

    /// Drop input up to and including the close that balances an already consumed opener.
    fn skip_nested(&mut self) {
        let mut open = 1usize;
        while let Some(item) = self.next() {
            match item.token() {
                Some(
                    Token::Function(_) | Token::LeftBrace | Token::LeftBracket | Token::LeftParen,
                ) => open += 1,
                Some(Token::RightBrace | Token::RightBracket | Token::RightParen) => {
                    open -= 1;
                    if open == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    fn consume_at_rule(&mut self, name: String) -> AtRule {
        let mut rule = AtRule {
            name,
            prelude: Vec::new(),
            block: None,
        };
        loop {
            match self.next() {
                None => {
                    self.error(format!("at-rule @{} missing ';'", rule.name));
                    return rule;
                }
                Some(ComponentValue::Preserved(Token::Semicolon)) => return rule,
                Some(ComponentValue::Preserved(Token::LeftBrace)) => {
                    rule.block = Some(self.consume_block(BlockKind::Brace));
                    return rule;
                }
                Some(ComponentValue::Block {
                    kind: BlockKind::Brace,
                    value,
                }) => {
                    rule.block = Some(value);
                    return rule;
                }
                Some(item) => {
                    let item = self.consume_nested(item);
                    rule.prelude.push(item);
                }
            }
        }
    }

    fn consume_qualified_rule(&mut self) -> Option<QualifiedRule> {
        let mut prelude = Vec::new();
        loop {
            match self.next() {
                None => {
                    self.error("qualified rule is not closed");
                    return None;
                }
                Some(ComponentValue::Preserved(Token::LeftBrace)) => {
                    let block = self.consume_block(BlockKind::Brace);
                    return Some(QualifiedRule { prelude, block });
                }
                Some(ComponentValue::Block {
                    kind: BlockKind::Brace,
                    value,
                }) => {
                    return Some(QualifiedRule {
                        prelude,
                        block: value,
                    })
                }
                Some(item) => {
                    let item = self.consume_nested(item);
                    prelude.push(item);
                }
            }
        }
    }

    /// Consume rules until the input runs out. `<!--` and `-->` are skipped at the top level.
    pub fn consume_rule_list(&mut self, top_level: bool) -> Vec<Rule> {
        let mut rules = Vec::new();
        while let Some(item) = self.next() {
            match item {
                ComponentValue::Preserved(Token::Whitespace(_)) => {}
                ComponentValue::Preserved(Token::Cdo | Token::Cdc) if top_level => {}
                ComponentValue::Preserved(Token::AtKeyword(name)) => {
                    rules.push(Rule::At(self.consume_at_rule(name)));
                }
                other => {
                    self.reconsume(other);
                    if let Some(rule) = self.consume_qualified_rule() {
                        rules.push(Rule::Qualified(rule));
                    }
                }
            }
        }
        rules
    }

    fn consume_declaration(&mut self) -> Option<Declaration> {
        let name = match self.next() {
            Some(ComponentValue::Preserved(Token::Ident(name))) => name,
            other => {
                if let Some(other) = other {
                    self.reconsume(other);
                }
                self.error("expected a declaration name");
                return None;
            }
        };

        self.skip_whitespace();
        if !self.peek_is(&Token::Colon) {
            self.error(format!("expected ':' after {name:?}"));
            return None;
        }
        self.next();
        self.skip_whitespace();

        let mut value = Vec::new();
        while let Some(item) = self.consume_component_value() {
            value.push(item);
        }
        trim_whitespace(&mut value);
        let important = strip_important(&mut value);

        Some(Declaration {
            name,
            value,
            important,
        })
    }

    /// Parse the values collected up to a `;` as one declaration, keeping any errors.
    fn declaration_from(&mut self, values: Vec<ComponentValue>) -> Option<Declaration> {
        let mut inner = Parser::new(values);
        let decl = inner.consume_declaration();
        self.errors.append(&mut inner.errors);
        decl
    }

    fn collect_until_semicolon(&mut self, first: ComponentValue) -> Vec<ComponentValue> {
        let mut values = vec![first];
        while !self.at_end() && !self.peek_is(&Token::Semicolon) {
            if let Some(item) = self.consume_component_value() {
                values.push(item);
            }
        }
        values
    }

    fn skip_until_semicolon(&mut self) {
        while !self.at_end() && !self.peek_is(&Token::Semicolon) {
            self.consume_component_value();
        }
    }

    /// Consume the contents of a style rule's block.
    pub fn consume_style_block(&mut self) -> Vec<StyleItem> {
        let mut decls = Vec::new();
        let mut rules = Vec::new();
        while let Some(item) = self.next() {
            match item {
                ComponentValue::Preserved(Token::Whitespace(_) | Token::Semicolon) => {}
                ComponentValue::Preserved(Token::AtKeyword(name)) => {
                    rules.push(StyleItem::Rule(Rule::At(self.consume_at_rule(name))));
                }
                item @ ComponentValue::Preserved(Token::Ident(_)) => {
                    let values = self.collect_until_semicolon(item);
                    if let Some(decl) = self.declaration_from(values) {
                        decls.push(StyleItem::Declaration(decl));
                    }
                }
                item @ ComponentValue::Preserved(Token::Delim('&')) => {
                    self.reconsume(item);
                    if let Some(rule) = self.consume_qualified_rule() {
                        rules.push(StyleItem::Rule(Rule::Qualified(rule)));
                    }
                }
                other => {
                    self.error(format!("unexpected {other} in style block"));
                    self.reconsume(other);
                    self.skip_until_semicolon();
                }
            }
        }
        decls.extend(rules);
        decls
    }

    /// Consume a list of declarations and at-rules.
    pub fn consume_declaration_list(&mut self) -> Vec<DeclarationItem> {
        let mut items = Vec::new();
        while let Some(item) = self.next() {
            match item {
                ComponentValue::Preserved(Token::Whitespace(_) | Token::Semicolon) => {}
                ComponentValue::Preserved(Token::AtKeyword(name)) => {
                    items.push(DeclarationItem::AtRule(self.consume_at_rule(name)));
                }
                item @ ComponentValue::Preserved(Token::Ident(_)) => {
                    let values = self.collect_until_semicolon(item);
                    if let Some(decl) = self.declaration_from(values) {
                        items.push(DeclarationItem::Declaration(decl));
                    }
                }
                other => {
                    self.error(format!("unexpected {other} in declaration list"));
                    self.reconsume(other);
                    self.skip_until_semicolon();
                }
            }
        }
        items
    }
}

/// Remove a trailing `! important` (any whitespace between the two parts).
fn strip_important(value: &mut Vec<ComponentValue>) -> bool {
    if !value
        .last()
        .and_then(ComponentValue::token)
        .is_some_and(|token| token.is_ident("important"))
    {
        return false;
    }
    let Some(bang) = value[..value.len() - 1]
        .iter()
        .rposition(|item| !item.is_whitespace())
    else {
        return false;
    };
    if !value[bang].is_token(&Token::Delim('!')) {
        return false;
    }
    value.truncate(bang);
    trim_whitespace(value);
    true
}

/// Parse exactly one component value, allowing surrounding whitespace.
pub fn parse_component_value(source: impl ParseSource) -> Result<ComponentValue, CssError> {
    let mut parser = Parser::new(source);
    parser.skip_whitespace();
    let Some(value) = parser.consume_component_value() else {
        return Err(CssError::syntax("expected component value"));
    };
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(CssError::syntax(
            "expected a single component value but found more input",
        ));
    }
    Ok(value)
}

pub fn parse_component_values(source: impl ParseSource) -> Vec<ComponentValue> {
    let mut parser = Parser::new(source);
    std::iter::from_fn(|| parser.consume_component_value()).collect()
}

/// Split the input on top-level commas. Groups are trimmed of whitespace; empty groups are
/// dropped.
pub fn parse_comma_separated(source: impl ParseSource) -> Vec<Vec<ComponentValue>> {
    let mut parser = Parser::new(source);
    let mut groups = Vec::new();
    let mut current = Vec::new();
    while let Some(value) = parser.consume_component_value() {
        if value.is_token(&Token::Comma) {
            push_group(&mut groups, std::mem::take(&mut current));
        } else {
            current.push(value);
        }
    }
    push_group(&mut groups, current);
    groups
}

fn push_group(groups: &mut Vec<Vec<ComponentValue>>, mut group: Vec<ComponentValue>) {
    trim_whitespace(&mut group);
    if !group.is_empty() {
        groups.push(group);
    }
}

pub fn parse_rule_list(source: impl ParseSource) -> Vec<Rule> {
    Parser::new(source).consume_rule_list(false)
}

/// Parse exactly one rule, allowing surrounding whitespace.
pub fn parse_rule(source: impl ParseSource) -> Result<Rule, CssError> {
    let mut parser = Parser::new(source);
    parser.skip_whitespace();

    let rule = match parser.next() {
        None => return Err(CssError::syntax("expected a rule")),
        Some(ComponentValue::Preserved(Token::AtKeyword(name))) => {
            Rule::At(parser.consume_at_rule(name))
        }
        Some(other) => {
            parser.reconsume(other);
            match parser.consume_qualified_rule() {
                Some(rule) => Rule::Qualified(rule),
                None => return Err(parser.first_error_or("invalid rule")),
            }
        }
    };

    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(CssError::syntax("unexpected input after rule"));
    }
    Ok(rule)
}

/// Parse one declaration such as `color: red !important`.
pub fn parse_declaration(source: impl ParseSource) -> Result<Declaration, CssError> {
    let mut parser = Parser::new(source);
    parser.skip_whitespace();
    if !matches!(
        parser.peek().and_then(ComponentValue::token),
        Some(Token::Ident(_))
    ) {
        return Err(CssError::syntax("declaration must start with an identifier"));
    }
    match parser.consume_declaration() {
        Some(decl) => Ok(decl),
        None => Err(parser.first_error_or("invalid declaration")),
    }
}

/// Parse a whole stylesheet. `url` becomes the sheet's `href`.
pub fn parse_stylesheet(source: impl ParseSource, url: Option<&str>) -> Stylesheet {
    let mut parser = Parser::new(source);
    let rules = parser.consume_rule_list(true);
    if !parser.errors.is_empty() {
        tracing::debug!(
            href = url.unwrap_or("<inline>"),
            errors = parser.errors.len(),
            "stylesheet parsed with errors"
        );
    }
    Stylesheet::parsed(rules, url.map(str::to_string), parser.into_errors())
}

pub fn parse_style_block(source: impl ParseSource) -> Vec<StyleItem> {
    Parser::new(source).consume_style_block()
}

pub fn parse_declaration_list(source: impl ParseSource) -> Vec<DeclarationItem> {
    Parser::new(source).consume_declaration_list()
}
