//! CSS tokenizer, parser and object model.

pub mod lexer;
pub mod parser;
pub mod stylesheet;
pub mod token;
pub mod values;

pub use lexer::{minify, read_css, tokenize, Lexer};
pub use parser::{
    parse_comma_separated, parse_component_value, parse_component_values, parse_declaration,
    parse_declaration_list, parse_rule, parse_rule_list, parse_style_block, parse_stylesheet,
    AtRule, BlockKind, ComponentValue, Declaration, DeclarationItem, ParseSource, Parser,
    QualifiedRule, Rule, StyleItem,
};
pub use stylesheet::{Stylesheet, StylesheetInit};
pub use token::{HashKind, Numeric, NumericKind, Token};
pub use values::{color_from_value, size_from_value, style_from_declarations};
