// SPDX-License-Identifier: MIT
//
// Raw mode — termios setup with RAII and panic-safe restore.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr) and isatty. These are the standard POSIX interfaces for
// terminal control and there is no safe alternative. Each unsafe block
// is minimal.
#![allow(unsafe_code)]
//
// Key decoding only works if the terminal hands us every byte the moment
// it is typed: no line buffering, no echo, no Ctrl-C translation. That is
// raw mode. `RawMode::enable()` switches stdin into it and the returned
// guard switches it back on drop, including when the process panics.
//
// Unlike a full-screen UI we leave the main screen and the cursor alone.
// The probe prints straight into the scrollback, so the only state we
// touch is the line discipline.

#[cfg(unix)]
use std::io;
use std::sync::Once;
#[cfg(unix)]
use std::sync::Mutex;

use crate::error::TermError;

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic-Safe Restore ─────────────────────────────────────────────────────

/// Global backup of the original termios for panic recovery.
///
/// The [`RawMode`] guard owns its own copy, but the panic hook can't reach
/// it. This backup, behind a [`Mutex`] rather than `static mut`, lets the
/// hook restore the line discipline without the guard.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
            }
        }
    }
}

#[cfg(not(unix))]
fn restore_termios_from_backup() {}

/// Panic hook guard — the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that leaves raw mode before the message prints.
///
/// Without it a panic leaves the shell with no echo and no line editing,
/// and the panic message itself comes out as a staircase because output
/// post-processing is off.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_termios_from_backup();
            original(info);
        }));
    });
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// Guard that keeps stdin in raw mode while it is alive.
///
/// When stdin is not a terminal (pipes, CI, tests) the guard is inert:
/// nothing is changed and nothing is restored. Bytes still flow, they
/// just arrive however the pipe delivers them.
///
/// # Example
///
/// ```no_run
/// use rawkey_term::RawMode;
///
/// let raw = RawMode::enable()?;
/// // ... read keys ...
/// drop(raw); // terminal restored
/// # Ok::<(), rawkey_term::TermError>(())
/// ```
#[derive(Debug)]
pub struct RawMode {
    /// Original termios saved before entering raw mode. `None` when stdin
    /// was not a terminal.
    #[cfg(unix)]
    original: Option<libc::termios>,
}

impl RawMode {
    /// Put stdin into raw mode.
    ///
    /// Disables canonical mode, echo, signal generation (Ctrl-C arrives
    /// as byte `0x03`), flow control and output post-processing. Reads
    /// block until at least one byte is available (`VMIN=1`, `VTIME=0`).
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Termios`] if the terminal attributes cannot be
    /// read or written.
    #[cfg(unix)]
    pub fn enable() -> Result<Self, TermError> {
        if !is_tty() {
            tracing::debug!(message = "stdin is not a tty, raw mode skipped");
            return Ok(Self { original: None });
        }

        install_panic_hook();

        let fd = libc::STDIN_FILENO;
        let original = unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(TermError::Termios {
                    action: "read",
                    source: io::Error::last_os_error(),
                });
            }
            termios
        };

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(original);
        }

        let mut settings = original;
        make_raw(&mut settings);

        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const settings) } != 0 {
            return Err(TermError::Termios {
                action: "write",
                source: io::Error::last_os_error(),
            });
        }

        tracing::debug!(message = "raw mode enabled");
        Ok(Self {
            original: Some(original),
        })
    }

    /// Raw mode is a POSIX concept; elsewhere the guard does nothing.
    ///
    /// # Errors
    ///
    /// Never fails on non-unix targets.
    #[cfg(not(unix))]
    pub fn enable() -> Result<Self, TermError> {
        Ok(Self {})
    }

    /// Whether this guard actually changed the terminal.
    #[cfg(unix)]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.original.is_some()
    }

    #[cfg(not(unix))]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        false
    }

    #[cfg(unix)]
    fn restore(&mut self) {
        if let Some(original) = self.original.take() {
            unsafe {
                if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const original) != 0 {
                    tracing::warn!(
                        message = "failed to restore terminal attributes",
                        error = %io::Error::last_os_error()
                    );
                }
            }

            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
            tracing::debug!(message = "raw mode disabled");
        }
    }

    #[cfg(not(unix))]
    fn restore(&mut self) {}
}

impl Drop for RawMode {
    fn drop(&mut self) {
        self.restore();
    }
}

/// cfmakeraw equivalent: disable all line processing.
#[cfg(unix)]
fn make_raw(termios: &mut libc::termios) {
    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    // VMIN=1, VTIME=0: read() blocks until at least 1 byte available.
    termios.c_cc[libc::VMIN] = 1;
    termios.c_cc[libc::VTIME] = 0;
}

// ─── Tests ───────────────────────────────────────────────────────────────────
