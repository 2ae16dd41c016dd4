// SPDX-License-Identifier: MIT
//
// Isolated reader — runs a byte source on its own thread.
//
// A dedicated worker calls the inner source in a tight loop and sends
// every byte through a standard channel. The consumer pulls from the
// channel and blocks only when it is empty.
//
// Why a dedicated thread? Because `read()` on stdin blocks, and a host
// process usually has other work on the go (a network client polling a
// socket, an animation timer). Keeping the blocking read in its own
// scheduling context means it can never stall that work. The price is
// one channel hop per byte.
//
// Ordering: one producer, one consumer, FIFO channel. Bytes come out in
// exactly the order the inner source produced them.
//
// Shutdown: the worker stops when the cancel token fires (explicitly, via
// `stop()`/drop, or through SIGINT/SIGTERM) or when the inner source ends.
// `StdinSource` polls with a short timeout, so cancellation reaches a
// worker parked on stdin within one interval.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::error::TermError;
use crate::source::{ByteSource, CancelToken};

/// Name given to the worker thread (shows up in debuggers and `top -H`).
const WORKER_NAME: &str = "rawkey-reader";

/// Byte source backed by a worker thread.
///
/// # Example
///
/// ```no_run
/// use rawkey_term::{ByteSource, CancelToken, IsolatedSource, StdinSource};
///
/// let cancel = CancelToken::new();
/// let mut source = IsolatedSource::spawn(StdinSource::new(cancel.clone()), cancel)?;
///
/// while let Some(byte) = source.next_byte() {
///     println!("got {byte:#x}");
/// }
/// // Worker stops when the source is dropped.
/// # Ok::<(), rawkey_term::TermError>(())
/// ```
#[derive(Debug)]
pub struct IsolatedSource {
    /// Receiving end of the byte channel.
    rx: Receiver<u8>,
    /// The worker thread handle. `None` after `stop()` joins it.
    handle: Option<JoinHandle<()>>,
    /// Shared with the inner source so the worker can be told to exit.
    cancel: CancelToken,
}

impl IsolatedSource {
    /// Move `inner` onto a new worker thread and start pumping bytes.
    ///
    /// `cancel` should be the token `inner` watches (if it watches one),
    /// so that [`stop`](Self::stop) can unblock it.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Spawn`] if the OS cannot spawn a new thread.
    pub fn spawn<S>(inner: S, cancel: CancelToken) -> Result<Self, TermError>
    where
        S: ByteSource + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let stop = cancel.clone();

        let handle = thread::Builder::new()
            .name(WORKER_NAME.into())
            .spawn(move || worker_loop(inner, &tx, &stop))
            .map_err(TermError::Spawn)?;

        tracing::debug!(message = "reader worker spawned", name = WORKER_NAME);

        Ok(Self {
            rx,
            handle: Some(handle),
            cancel,
        })
    }

    /// Signal the worker to stop and wait for it to exit.
    ///
    /// Idempotent: calling `stop()` after the worker has already exited is
    /// a no-op. Bytes already in the channel can still be drained with
    /// [`next_byte`](ByteSource::next_byte).
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!(message = "reader worker panicked");
            }
        }
    }

    /// Whether the worker thread is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl ByteSource for IsolatedSource {
    /// Pop the next byte, blocking while the channel is empty.
    ///
    /// Ends once the worker has exited and the channel is drained.
    fn next_byte(&mut self) -> Option<u8> {
        self.rx.recv().ok()
    }
}

impl Drop for IsolatedSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The worker's main loop: pull from the inner source, push to the channel.
fn worker_loop<S: ByteSource>(mut inner: S, tx: &Sender<u8>, stop: &CancelToken) {
    let mut sent: u64 = 0;

    while !stop.is_cancelled() {
        let Some(byte) = inner.next_byte() else {
            tracing::debug!(message = "reader worker: inner source ended", sent);
            return;
        };

        // `Drop` joins the worker before the receiver goes away, so this
        // only fails if the channel was torn down some other way.
        if tx.send(byte).is_err() {
            return;
        }
        sent += 1;
    }

    tracing::debug!(message = "reader worker: cancelled", sent);
}

// ─── Tests ───────────────────────────────────────────────────────────────────
