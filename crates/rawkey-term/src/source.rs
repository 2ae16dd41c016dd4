// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Byte sources — where the decoder's bytes come from.
//
// The decoder pulls one byte at a time through the `ByteSource` trait and
// never learns how the byte was obtained. Three implementations:
//
// - `StdinSource` reads stdin on the calling thread.
// - `IsolatedSource` (in `reader.rs`) runs any source on a worker thread
//   and hands bytes over through a channel.
// - `ScriptedSource` replays a fixed byte list, for tests and replays.
//
// A source blocks until it has a byte. `None` means the stream is over:
// cancelled, interrupted, stdin closed, or the script ran out. A live
// terminal never ends on its own.

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::TermError;
use crate::reader::IsolatedSource;
use crate::signal;

/// How often a blocked stdin read checks for cancellation (milliseconds).
///
/// Cancellation latency is at most one poll interval. 50ms is below what
/// a person notices and costs nothing while idle.
const POLL_TIMEOUT_MS: i32 = 50;

// ─── ByteSource ─────────────────────────────────────────────────────────────

/// A blocking, pull-based stream of raw input bytes.
pub trait ByteSource {
    /// Block until the next byte is available.
    ///
    /// Returns `None` once the stream has ended. After that, further calls
    /// keep returning `None`.
    fn next_byte(&mut self) -> Option<u8>;

    /// Borrow the source as an [`Iterator`] over its bytes.
    fn bytes(&mut self) -> Bytes<'_, Self>
    where
        Self: Sized,
    {
        Bytes { source: self }
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn next_byte(&mut self) -> Option<u8> {
        (**self).next_byte()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn next_byte(&mut self) -> Option<u8> {
        (**self).next_byte()
    }
}

/// Iterator adapter returned by [`ByteSource::bytes`].
#[derive(Debug)]
pub struct Bytes<'a, S> {
    source: &'a mut S,
}

impl<S: ByteSource> Iterator for Bytes<'_, S> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.source.next_byte()
    }
}

// ─── CancelToken ────────────────────────────────────────────────────────────

/// Shared stop flag for byte sources.
///
/// Clones share the same flag. A token also reports cancelled once the
/// process has received SIGINT/SIGTERM (see [`signal`]).
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder of this token to stop.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether [`cancel`](Self::cancel) was called or an interrupt arrived.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || signal::interrupted()
    }
}

// ─── StdinSource ────────────────────────────────────────────────────────────

/// Reads stdin one byte at a time on the calling thread.
///
/// Transient failures (`EINTR`, `EAGAIN`) are retried silently. End of
/// file and hard I/O errors end the stream; the latter are logged.
#[derive(Debug, Default)]
pub struct StdinSource {
    cancel: CancelToken,
    done: bool,
}

impl StdinSource {
    /// A stdin source that stops when `cancel` fires.
    #[must_use]
    pub const fn new(cancel: CancelToken) -> Self {
        Self {
            cancel,
            done: false,
        }
    }

    #[cfg(unix)]
    fn read_one(&self) -> Option<u8> {
        let fd = libc::STDIN_FILENO;

        loop {
            if self.cancel.is_cancelled() {
                tracing::debug!(message = "stdin source cancelled");
                return None;
            }

            let ready = unsafe {
                let mut pfd = libc::pollfd {
                    fd,
                    events: libc::POLLIN,
                    revents: 0,
                };
                libc::poll(&raw mut pfd, 1, POLL_TIMEOUT_MS)
            };

            if ready == 0 {
                continue;
            }
            if ready < 0 {
                let err = io::Error::last_os_error();
                if is_transient(&err) {
                    continue;
                }
                tracing::warn!(message = "stdin poll failed", error = %err);
                return None;
            }

            let mut byte = 0u8;
            let n = unsafe { libc::read(fd, (&raw mut byte).cast(), 1) };

            match n {
                1 => return Some(byte),
                0 => {
                    tracing::debug!(message = "stdin reached EOF");
                    return None;
                }
                _ => {
                    let err = io::Error::last_os_error();
                    if is_transient(&err) {
                        continue;
                    }
                    tracing::warn!(message = "stdin read failed", error = %err);
                    return None;
                }
            }
        }
    }

    /// Non-unix fallback: a plain blocking read with no poll.
    ///
    /// Cancellation is only noticed between bytes.
    #[cfg(not(unix))]
    fn read_one(&self) -> Option<u8> {
        use std::io::Read;

        let mut buf = [0u8; 1];
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }
            match io::stdin().lock().read(&mut buf) {
                Ok(1) => return Some(buf[0]),
                Ok(_) => return None,
                Err(err) if is_transient(&err) => {}
                Err(err) => {
                    tracing::warn!(message = "stdin read failed", error = %err);
                    return None;
                }
            }
        }
    }
}

impl ByteSource for StdinSource {
    fn next_byte(&mut self) -> Option<u8> {
        if self.done {
            return None;
        }
        let byte = self.read_one();
        self.done = byte.is_none();
        byte
    }
}

/// Errors worth retrying instead of ending the stream.
fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    )
}

// ─── ScriptedSource ─────────────────────────────────────────────────────────

/// Replays a fixed list of bytes, then ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedSource {
    bytes: VecDeque<u8>,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self {
            bytes: bytes.into(),
        }
    }

    /// Append more bytes to the end of the script.
    pub fn push(&mut self, bytes: &[u8]) {
        self.bytes.extend(bytes);
    }

    /// Bytes not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }
}

impl ByteSource for ScriptedSource {
    fn next_byte(&mut self) -> Option<u8> {
        self.bytes.pop_front()
    }
}

impl FromIterator<u8> for ScriptedSource {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        Self {
            bytes: iter.into_iter().collect(),
        }
    }
}

// ─── SourceMode ─────────────────────────────────────────────────────────────

/// Which scheduling model reads the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMode {
    /// Read stdin on the thread that decodes.
    InProcess,
    /// Read stdin on a dedicated worker thread and pass bytes through a
    /// channel, so a blocking read never stalls other work on the
    /// consumer's thread.
    #[default]
    Isolated,
}

impl SourceMode {
    /// The spelling accepted by [`FromStr`] and produced by [`Display`](fmt::Display).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProcess => "in-process",
            Self::Isolated => "isolated",
        }
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in-process" | "inprocess" | "inline" => Ok(Self::InProcess),
            "isolated" | "thread" | "worker" => Ok(Self::Isolated),
            other => Err(format!(
                "unknown source mode `{other}` (expected `in-process` or `isolated`)"
            )),
        }
    }
}

/// Open a stdin byte source in the requested mode.
///
/// # Errors
///
/// Returns [`TermError::Spawn`] if the isolated worker thread cannot be
/// started.
pub fn open_stdin(
    mode: SourceMode,
    cancel: &CancelToken,
) -> Result<Box<dyn ByteSource + Send>, TermError> {
    tracing::debug!(message = "opening stdin source", %mode);
    let stdin = StdinSource::new(cancel.clone());
    match mode {
        SourceMode::InProcess => Ok(Box::new(stdin)),
        SourceMode::Isolated => Ok(Box::new(IsolatedSource::spawn(stdin, cancel.clone())?)),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn poll_timeout_reasonable() {
        assert!(POLL_TIMEOUT_MS >= 10);
        assert!(POLL_TIMEOUT_MS <= 500);
    }

    #[test]
    fn scripted_replays_in_order_then_ends() {
        let mut src = ScriptedSource::new(vec![0x1b, b'[', b'A']);
        assert_eq!(src.next_byte(), Some(0x1b));
        assert_eq!(src.next_byte(), Some(b'['));
        assert_eq!(src.next_byte(), Some(b'A'));
        assert_eq!(src.next_byte(), None);
        assert_eq!(src.next_byte(), None);
    }

    #[test]
    fn scripted_push_appends() {
        let mut src = ScriptedSource::new(*b"a");
        src.push(b"bc");
        assert_eq!(src.remaining(), 3);
        assert_eq!(src.bytes().collect::<Vec<_>>(), b"abc".to_vec());
    }

    #[test]
    fn scripted_from_iterator() {
        let mut src: ScriptedSource = (1..=4).collect();
        assert_eq!(src.bytes().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn boxed_source_delegates() {
        let mut src: Box<dyn ByteSource + Send> = Box::new(ScriptedSource::new(*b"xy"));
        assert_eq!(src.next_byte(), Some(b'x'));
        assert_eq!(src.next_byte(), Some(b'y'));
        assert_eq!(src.next_byte(), None);
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn cancelled_stdin_source_ends_immediately() {
        let token = CancelToken::new();
        token.cancel();
        let mut src = StdinSource::new(token);
        assert_eq!(src.next_byte(), None);
        assert_eq!(src.next_byte(), None);
    }

    #[test]
    fn transient_errors() {
        assert!(is_transient(&io::Error::from(io::ErrorKind::Interrupted)));
        assert!(is_transient(&io::Error::from(io::ErrorKind::WouldBlock)));
        assert!(!is_transient(&io::Error::from(io::ErrorKind::BrokenPipe)));
    }

    #[test]
    fn source_mode_parse_and_display() {
        assert_eq!("in-process".parse::<SourceMode>(), Ok(SourceMode::InProcess));
        assert_eq!("Isolated".parse::<SourceMode>(), Ok(SourceMode::Isolated));
        assert_eq!("thread".parse::<SourceMode>(), Ok(SourceMode::Isolated));
        assert!("process".parse::<SourceMode>().is_err());
        assert_eq!(SourceMode::InProcess.to_string(), "in-process");
        assert_eq!(SourceMode::default(), SourceMode::Isolated);
    }
}
