//! Draw a CSS-styled line of text on the alternate screen for two seconds.
//!
//! Run with `CONTUI_LOG_FILE=/tmp/contui.log` to capture tracing output.

use std::thread;
use std::time::Duration;

use contui::config::EnvConfig;
use contui::css::{parse_stylesheet, style_from_declarations, Rule};
use contui::{Buffer, Node, OutputGate, Properties, Terminal, TerminalCmd, TerminalGuard, Text};

const SHEET: &str = "
text {
    color: cyan;
    font-weight: bold;
    width: fit-content;
    height: 1;
}
";

#[cfg(unix)]
fn main() -> std::io::Result<()> {
    let config = EnvConfig::from_env();
    let _logging = contui::logging::init(&config);

    let sheet = parse_stylesheet(SHEET, None);
    let decls = match sheet.rules().first() {
        Some(Rule::Qualified(rule)) => rule.declarations(),
        _ => Vec::new(),
    };
    let mut text = Text::with_properties(Properties::from_declarations(&decls));
    text.set_style(style_from_declarations(&decls));
    text.write(&["Hello from contui"], "");

    let mut guard = TerminalGuard::new(contui::ProcessTerminal::with_config(&config));
    let Some(terminal) = guard.terminal_mut() else {
        return Ok(());
    };
    terminal.start(Box::new(|| {}))?;

    let mut gate = OutputGate::new();
    gate.extend([TerminalCmd::EnterAltScreen, TerminalCmd::HideCursor]);
    gate.flush(terminal);

    let mut buffer = Buffer::for_terminal(terminal);
    let rect = text.layout(buffer.area());
    text.render(rect, &mut buffer);
    buffer.write(terminal, Some((2, 1)));

    thread::sleep(Duration::from_secs(2));

    gate.extend([TerminalCmd::ShowCursor, TerminalCmd::LeaveAltScreen]);
    gate.flush(terminal);
    Ok(())
}

#[cfg(not(unix))]
fn main() {
    eprintln!("hello_text needs a unix terminal");
}
