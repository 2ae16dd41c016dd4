//! Diagnostic echo of decoded codes.
//!
//! Point it at a terminal, press a key, and it prints the code that key
//! produced. Bytes of one key-press arrive in a burst, so whenever more
//! than the idle gap passes between two codes the probe prints an empty
//! line: each visual group is one physical key.
//!
//! Output lines end in `\r\n` because the terminal is in raw mode and no
//! longer translates `\n`.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::code::Code;
use crate::keys::key_name;

/// Idle time that separates two key-presses in the probe output.
pub const DEFAULT_IDLE_GAP: Duration = Duration::from_millis(50);

/// Echoes codes to a sink with idle-gap breaks.
#[derive(Debug, Clone)]
pub struct Probe {
    idle_gap: Duration,
    /// When the previous code was recorded.
    last: Option<Instant>,
    recorded: u64,
}

impl Probe {
    #[must_use]
    pub const fn new(idle_gap: Duration) -> Self {
        Self {
            idle_gap,
            last: None,
            recorded: 0,
        }
    }

    #[must_use]
    pub const fn idle_gap(&self) -> Duration {
        self.idle_gap
    }

    /// Codes recorded so far.
    #[must_use]
    pub const fn recorded(&self) -> u64 {
        self.recorded
    }

    /// Write one line for `code`, preceded by a blank line if more than
    /// the idle gap has passed since the previous code.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `out`.
    pub fn record<W: Write>(&mut self, code: Code, now: Instant, out: &mut W) -> io::Result<()> {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) > self.idle_gap {
                out.write_all(b"\r\n")?;
            }
        }
        self.last = Some(now);
        self.recorded += 1;

        match key_name(code) {
            Some(name) => write!(out, "got {code} ({name})\r\n")?,
            None => write!(out, "got {code}\r\n")?,
        }
        out.flush()
    }

    /// Record every code from `codes` until `quit` returns `true` or the
    /// stream ends. The quitting code itself is not echoed.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `out`.
    pub fn run<I, W, F>(&mut self, codes: I, out: &mut W, quit: F) -> io::Result<()>
    where
        I: IntoIterator<Item = Code>,
        W: Write,
        F: Fn(Code) -> bool,
    {
        for code in codes {
            if quit(code) {
                tracing::debug!(message = "probe quit", %code, recorded = self.recorded);
                return Ok(());
            }
            self.record(code, Instant::now(), out)?;
        }
        Ok(())
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_GAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{CTRL_C, UP};
    use pretty_assertions::assert_eq;

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn burst_prints_without_breaks() {
        let mut probe = Probe::default();
        let mut out = Vec::new();
        let t0 = Instant::now();

        probe.record(Code::from(0x1b), t0, &mut out).unwrap();
        probe.record(Code::from(b'['), t0 + Duration::from_millis(1), &mut out).unwrap();
        probe.record(Code::from(UP), t0 + Duration::from_millis(2), &mut out).unwrap();

        assert_eq!(
            output(out),
            "got 0x1b (esc)\r\ngot 0x5b ([)\r\ngot 0x41 (A)\r\n"
        );
        assert_eq!(probe.recorded(), 3);
    }

    #[test]
    fn idle_gap_inserts_one_blank_line() {
        let mut probe = Probe::new(Duration::from_millis(50));
        let mut out = Vec::new();
        let t0 = Instant::now();

        probe.record(Code::new(UP, 1), t0, &mut out).unwrap();
        probe.record(Code::from(b'x'), t0 + Duration::from_millis(51), &mut out).unwrap();
        probe.record(Code::from(b'y'), t0 + Duration::from_millis(60), &mut out).unwrap();

        assert_eq!(
            output(out),
            "got 0x4100 (up)\r\n\r\ngot 0x78 (x)\r\ngot 0x79 (y)\r\n"
        );
    }

    #[test]
    fn gap_equal_to_threshold_is_not_a_break() {
        let mut probe = Probe::new(Duration::from_millis(50));
        let mut out = Vec::new();
        let t0 = Instant::now();

        probe.record(Code::from(b'a'), t0, &mut out).unwrap();
        probe.record(Code::from(b'b'), t0 + Duration::from_millis(50), &mut out).unwrap();

        assert_eq!(output(out), "got 0x61 (a)\r\ngot 0x62 (b)\r\n");
    }

    #[test]
    fn unknown_codes_have_no_name() {
        let mut probe = Probe::default();
        let mut out = Vec::new();
        probe.record(Code::new(b'x', 1), Instant::now(), &mut out).unwrap();
        assert_eq!(output(out), "got 0x7800\r\n");
    }

    #[test]
    fn run_stops_on_quit_code() {
        let mut probe = Probe::default();
        let mut out = Vec::new();
        let codes = [Code::from(b'a'), Code::from(CTRL_C), Code::from(b'b')];

        probe
            .run(codes, &mut out, |c| c == Code::from(CTRL_C))
            .unwrap();

        assert_eq!(probe.recorded(), 1);
        assert!(output(out).starts_with("got 0x61 (a)"));
    }
}
