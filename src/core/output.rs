//! Typed terminal output commands and a single output gate.
//!
//! Invariant: all terminal writes must flow through `OutputGate::flush(..)`.

use std::fmt::Write as _;

use crate::core::terminal::Terminal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCmd {
    /// Raw bytes/control sequences (UTF-8 string) to be written to the terminal.
    Bytes(String),

    /// Erase the whole screen.
    ClearScreen,
    /// Absolute cursor placement, 1-based.
    MoveTo { row: u16, col: u16 },
    /// Drop every active SGR attribute.
    ResetStyle,

    /// Cursor visibility.
    HideCursor,
    ShowCursor,

    /// Alternate screen toggles.
    EnterAltScreen,
    LeaveAltScreen,
}

impl TerminalCmd {
    pub fn bytes(data: impl Into<String>) -> Self {
        Self::Bytes(data.into())
    }

    /// Append the encoded command to `out`.
    pub fn encode_into(&self, out: &mut String) {
        match self {
            TerminalCmd::Bytes(data) => out.push_str(data),
            TerminalCmd::ClearScreen => out.push_str("\x1b[2J"),
            TerminalCmd::MoveTo { row, col } => {
                let _ = write!(out, "\x1b[{row};{col}H");
            }
            TerminalCmd::ResetStyle => out.push_str("\x1b[0m"),
            TerminalCmd::HideCursor => out.push_str("\x1b[?25l"),
            TerminalCmd::ShowCursor => out.push_str("\x1b[?25h"),
            TerminalCmd::EnterAltScreen => out.push_str("\x1b[?1049h"),
            TerminalCmd::LeaveAltScreen => out.push_str("\x1b[?1049l"),
        }
    }
}

/// Concatenate the encoded form of `cmds`.
pub fn encode(cmds: &[TerminalCmd]) -> String {
    let mut out = String::new();
    for cmd in cmds {
        cmd.encode_into(&mut out);
    }
    out
}

#[derive(Debug, Default)]
pub struct OutputGate {
    cmds: Vec<TerminalCmd>,
}

impl OutputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: TerminalCmd) {
        self.cmds.push(cmd);
    }

    pub fn extend<I>(&mut self, cmds: I)
    where
        I: IntoIterator<Item = TerminalCmd>,
    {
        self.cmds.extend(cmds);
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    /// Flush buffered commands to the terminal as a single write.
    ///
    /// This is the single write gate: `Terminal::write(..)` must not be called
    /// from anywhere else.
    pub fn flush<T: Terminal + ?Sized>(&mut self, term: &mut T) {
        if self.cmds.is_empty() {
            return;
        }
        let data = encode(&self.cmds);
        self.cmds.clear();
        term.write(&data);
    }
}
