// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Interrupt flag — how an outside `kill -INT` reaches the reader worker.
//
// Raw mode turns Ctrl-C into a plain byte, so the keyboard can no longer
// interrupt us. A signal from elsewhere (the shell, a supervisor, the
// test harness) still can. The handler only sets an `AtomicBool`; every
// `CancelToken` consults it, so byte sources wind down on their next poll
// timeout instead of being torn down mid-read.

use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag set by the SIGINT/SIGTERM handler.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Whether an interrupt signal has arrived since startup.
#[must_use]
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::Relaxed)
}

/// Install handlers for SIGINT and SIGTERM.
///
/// The handler simply sets the [`INTERRUPTED`] flag. This is
/// async-signal-safe: writing to an atomic is one of the few operations
/// permitted inside signal handlers. `SA_RESTART` is deliberately left
/// off so a blocking `poll()` returns `EINTR` and the reader notices
/// the flag right away.
#[cfg(unix)]
pub fn install_interrupt_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = interrupt_handler as *const () as usize;
        sa.sa_flags = 0;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGINT, &raw const sa, std::ptr::null_mut());
        libc::sigaction(libc::SIGTERM, &raw const sa, std::ptr::null_mut());
    }
    tracing::debug!(message = "interrupt handlers installed");
}

#[cfg(unix)]
extern "C" fn interrupt_handler(_sig: libc::c_int) {
    INTERRUPTED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
pub fn install_interrupt_handler() {
    // No-op on non-unix platforms.
}

// ─── Tests ───────────────────────────────────────────────────────────────────
