//! Terminal trait and lifecycle helpers.

/// Fallback size used when the terminal cannot report its dimensions.
pub const DEFAULT_COLUMNS: u16 = 80;
pub const DEFAULT_ROWS: u16 = 24;

/// Minimal terminal interface for the TUI.
pub trait Terminal {
    /// Put the terminal into UI mode and register a resize handler.
    fn start(&mut self, on_resize: Box<dyn FnMut() + Send>) -> std::io::Result<()>;

    /// Stop the terminal and restore state.
    fn stop(&mut self) -> std::io::Result<()>;

    /// Write output to the terminal.
    fn write(&mut self, data: &str);

    /// Terminal dimensions.
    fn columns(&self) -> u16;
    fn rows(&self) -> u16;
}

/// RAII guard that stops the terminal on drop.
pub struct TerminalGuard<T: Terminal> {
    terminal: Option<T>,
}

impl<T: Terminal> TerminalGuard<T> {
    pub fn new(terminal: T) -> Self {
        Self {
            terminal: Some(terminal),
        }
    }

    /// Access the wrapped terminal.
    pub fn terminal_mut(&mut self) -> Option<&mut T> {
        self.terminal.as_mut()
    }

    /// Consume the guard without running cleanup.
    pub fn into_inner(mut self) -> Option<T> {
        self.terminal.take()
    }
}

impl<T: Terminal> Drop for TerminalGuard<T> {
    fn drop(&mut self) {
        if let Some(terminal) = self.terminal.as_mut() {
            if let Err(err) = terminal.stop() {
                tracing::warn!(error = %err, "failed to restore terminal");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Terminal, TerminalGuard};
    use crate::platform::MemoryTerminal;

    #[test]
    fn guard_stops_terminal_on_drop() {
        let mut term = MemoryTerminal::new(4, 4);
        term.start(Box::new(|| {})).expect("start");
        let stopped = term.stopped_flag();
        drop(TerminalGuard::new(term));
        assert!(stopped.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn into_inner_skips_cleanup() {
        let mut term = MemoryTerminal::new(4, 4);
        term.start(Box::new(|| {})).expect("start");
        let stopped = term.stopped_flag();
        let term = TerminalGuard::new(term).into_inner().expect("terminal");
        assert!(!stopped.load(std::sync::atomic::Ordering::SeqCst));
        assert!(term.is_started());
    }
}
