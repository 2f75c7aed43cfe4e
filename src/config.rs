//! Environment configuration.

use std::env;

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub log_filter: Option<String>,
    pub log_file: Option<String>,
    pub write_log: Option<String>,
    pub debug_redraw: bool,
    pub strict_css: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            log_filter: env_string_opt("CONTUI_LOG"),
            log_file: env_string_opt("CONTUI_LOG_FILE"),
            write_log: env_string_opt("CONTUI_WRITE_LOG"),
            debug_redraw: env_flag("CONTUI_DEBUG_REDRAW"),
            strict_css: env_flag("CONTUI_STRICT_CSS"),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
