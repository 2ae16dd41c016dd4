// SPDX-License-Identifier: MIT
//
// Error types for terminal setup.
//
// Reading bytes never produces an error value: transient failures are
// retried inside the sources and hard failures end the stream. What can
// fail is getting the terminal ready in the first place.

use std::io;

use miette::Diagnostic;

/// Failures while preparing the terminal or spawning the reader worker.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum TermError {
    /// `tcgetattr` / `tcsetattr` refused to cooperate.
    #[error("failed to {action} terminal attributes")]
    #[diagnostic(
        code(rawkey_term::termios),
        help("stdin must be an interactive terminal for raw mode")
    )]
    Termios {
        action: &'static str,
        #[source]
        source: io::Error,
    },

    /// The OS would not give us a thread for the isolated reader.
    #[error("failed to spawn the stdin reader thread")]
    #[diagnostic(code(rawkey_term::spawn), help("try `--source in-process`"))]
    Spawn(#[source] io::Error),
}
