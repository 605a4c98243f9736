use crate::errors::MacroError;
use crate::logging::append_run_log;
use crate::runtime::Terminal;
use serde_json::json;

/// Keeps the terminal in raw mode while alive and restores it on drop, so
/// early returns and unwinding release it the same way a normal exit does.
pub struct RawModeGuard<'a> {
    terminal: &'a dyn Terminal,
}

impl<'a> RawModeGuard<'a> {
    pub fn acquire(terminal: &'a dyn Terminal) -> Result<Self, MacroError> {
        terminal.enable_raw_mode()?;
        Ok(Self { terminal })
    }
}

impl Drop for RawModeGuard<'_> {
    fn drop(&mut self) {
        if let Err(error) = self.terminal.disable_raw_mode() {
            append_run_log(
                "warn",
                "terminal.restore_failed",
                json!({ "error": error.to_string() }),
            );
        }
    }
}
