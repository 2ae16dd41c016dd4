// SPDX-License-Identifier: MIT
//
// Logging setup.
//
// The terminal belongs to the command output (and is in raw mode while a
// command runs), so log lines never go to stdout or stderr. Logging is
// off unless a log file is given; the filter comes from `RAWKEY_LOG`
// and defaults to `info`.
//
// Lines are handed to a background writer thread so a slow disk never
// delays the key loop. The returned guard flushes that thread on drop and
// must live until the command is done.

use std::path::Path;

use miette::{IntoDiagnostic, miette};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the `tracing` filter directives.
pub const LOG_ENV: &str = "RAWKEY_LOG";

/// Install the global subscriber writing to `path`, if one is given.
///
/// Returns the writer guard; dropping it flushes pending lines.
///
/// # Errors
///
/// Returns an error if the log file cannot be created, or the filter in
/// [`LOG_ENV`] does not parse.
pub fn init(path: Option<&Path>) -> miette::Result<Option<WorkerGuard>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let filter = match std::env::var(LOG_ENV) {
        Ok(directives) => EnvFilter::try_new(directives).into_diagnostic()?,
        Err(_) => EnvFilter::new("info"),
    };
    let (writer, guard) = file_writer(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| miette!("failed to install log subscriber: {e}"))?;

    tracing::info!(message = "logging started", path = %path.display());
    Ok(Some(guard))
}

/// Open `path` for appending behind a non-blocking writer.
fn file_writer(path: &Path) -> miette::Result<(NonBlocking, WorkerGuard)> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| miette!("log file path `{}` has no usable file name", path.display()))?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(parent)
        .into_diagnostic()
        .map_err(|e| e.wrap_err(format!("cannot open log file `{}`", path.display())))?;

    Ok(tracing_appender::non_blocking(appender))
}
