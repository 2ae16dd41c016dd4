// SPDX-License-Identifier: MIT
//
// rawkey-term — Terminal plumbing for rawkey.
//
// Everything that touches the real terminal lives here: the raw-mode
// guard, the interrupt flag, and the byte sources that feed the decoder.
// The decoder itself never sees a file descriptor. It pulls bytes from a
// `ByteSource`, and whether those bytes come from stdin on the calling
// thread, from a dedicated reader thread, or from a scripted list in a
// test is decided here.

pub mod error;
pub mod reader;
pub mod signal;
pub mod source;
pub mod terminal;

pub use error::TermError;
pub use reader::IsolatedSource;
pub use source::{open_stdin, ByteSource, CancelToken, ScriptedSource, SourceMode, StdinSource};
pub use terminal::RawMode;
