//! Platform-specific terminal integrations.

pub mod memory_terminal;
pub mod process_terminal;

pub use memory_terminal::MemoryTerminal;
#[cfg(unix)]
pub use process_terminal::ProcessTerminal;
pub use process_terminal::terminal_size;
