#![allow(unused_imports)]

use contui::{
    parse_declaration, parse_rule, parse_rule_list, parse_stylesheet, visible_width, Attr, Attrs,
    Buffer, BufferView, ColorCode, CssError, Declaration, MemoryTerminal, Node, OutputGate, Pixel,
    Properties, Rect, Rule, Size, Style, StyleError, Stylesheet, StylesheetError, Terminal,
    TerminalCmd, TerminalGuard, Text,
};

#[cfg(unix)]
use contui::ProcessTerminal;

#[test]
fn public_api_exports_compile() {}
