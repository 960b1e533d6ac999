//! Raw terminal mode for single keystroke input, scoped by [`RawLock`].
use crossterm::terminal;
use std::io;
use std::io::Write;

/// Terminal stays raw while this lives, dropping it restores the previous mode.
pub struct RawLock {
    /// False if raw mode could not be enabled, e.g. when not attached to a terminal
    enabled: bool,
}

impl RawLock {
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Drop for RawLock {
    fn drop(&mut self) {
        if !self.enabled {
            return;
        }
        // terminal stays in raw mode but no means to repair
        if let Err(e) = terminal::disable_raw_mode() {
            eprintln!("Error resetting terminal {e}");
        }
    }
}

/// Set terminal to raw in best-effort mode, only log on failure, since it does not work for
/// redirected stdin or test runs.
#[must_use]
pub fn set_terminal_raw() -> RawLock {
    match terminal::enable_raw_mode() {
        Ok(()) => RawLock { enabled: true },
        Err(e) => {
            log::warn!("Could not set terminal to raw mode: {e}");
            RawLock { enabled: false }
        }
    }
}

/// Output adapter for raw mode where `\n` no longer returns the cursor to the first column.
/// Without `translate_newlines` the output is passed through unchanged.
pub struct RawModeWriter<W: Write> {
    inner: W,
    translate_newlines: bool,
}

impl<W: Write> RawModeWriter<W> {
    pub const fn new(inner: W, translate_newlines: bool) -> Self {
        Self {
            inner,
            translate_newlines,
        }
    }
}

impl<W: Write> Write for RawModeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.translate_newlines {
            return self.inner.write(buf);
        }
        for (idx, part) in buf.split(|b| *b == b'\n').enumerate() {
            if idx > 0 {
                self.inner.write_all(b"\r\n")?;
            }
            self.inner.write_all(part)?;
        }
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
