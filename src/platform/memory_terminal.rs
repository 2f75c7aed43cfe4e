//! In-memory terminal for headless rendering and tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::terminal::Terminal;

/// Records every write and reports a fixed, adjustable size.
#[derive(Default)]
pub struct MemoryTerminal {
    columns: u16,
    rows: u16,
    writes: Vec<String>,
    started: bool,
    stopped: Arc<AtomicBool>,
    on_resize: Option<Box<dyn FnMut() + Send>>,
}

impl MemoryTerminal {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            ..Self::default()
        }
    }

    /// Each `write` call, in order.
    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    /// Everything written so far, concatenated.
    pub fn output(&self) -> String {
        self.writes.concat()
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.writes).concat()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Shared flag flipped by `stop`, observable after the terminal is moved.
    pub fn stopped_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stopped)
    }

    /// Change the reported size and fire the resize handler if started.
    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.columns = columns;
        self.rows = rows;
        if let Some(handler) = self.on_resize.as_mut() {
            handler();
        }
    }
}

impl Terminal for MemoryTerminal {
    fn start(&mut self, on_resize: Box<dyn FnMut() + Send>) -> std::io::Result<()> {
        self.on_resize = Some(on_resize);
        self.started = true;
        self.stopped.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> std::io::Result<()> {
        self.on_resize = None;
        self.started = false;
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn write(&mut self, data: &str) {
        self.writes.push(data.to_string());
    }

    fn columns(&self) -> u16 {
        self.columns
    }

    fn rows(&self) -> u16 {
        self.rows
    }
}
