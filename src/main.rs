// SPDX-License-Identifier: MIT
//
// rawkey — decode raw terminal key presses.
//
// This is the binary that wires the crates together:
//
//   rawkey-term   → raw mode, interrupt flag, stdin byte sources
//   rawkey-decode → trie, decoder state machine, key maps, probe
//
// Each keypress flows through:
//
//   stdin → [worker thread → channel] → Decoder → KeyMap → command
//
// Two commands:
//
//   probe — echo the code each key produces, grouped per key-press
//   walk  — move a marker over a grid with the arrow keys

mod cli;
mod grid;
mod logging;

use std::io::{self, Write};
use std::time::Duration;

use clap::Parser;
use miette::IntoDiagnostic;

use rawkey_decode::keys::{self, Direction};
use rawkey_decode::{Code, Decoder, KeyMap, Probe};
use rawkey_term::{ByteSource, CancelToken, RawMode, SourceMode, open_stdin, signal};

use crate::cli::{Cli, Command};
use crate::grid::{Grid, Pos, WalkCommand};

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.log_file.as_deref())?;
    signal::install_interrupt_handler();

    tracing::info!(message = "starting", source = %cli.source, command = ?cli.command);

    match cli.command {
        Command::Probe { gap_ms, raw } => run_probe(cli.source, Duration::from_millis(gap_ms), raw),
        Command::Walk {
            width,
            height,
            holes,
        } => run_walk(cli.source, Grid::new(width, height).with_holes(holes)),
    }
}

// ─── probe ──────────────────────────────────────────────────────────────────

fn run_probe(mode: SourceMode, gap: Duration, raw_bytes: bool) -> miette::Result<()> {
    let raw_mode = RawMode::enable()?;
    let cancel = CancelToken::new();
    let mut source = open_stdin(mode, &cancel)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write!(
        out,
        "rawkey probe ({mode}, {}): press keys, Ctrl-C to quit\r\n",
        if raw_bytes { "raw bytes" } else { "decoded" }
    )
    .into_diagnostic()?;
    out.flush().into_diagnostic()?;

    let quit = |code: Code| code == Code::from(keys::CTRL_C);
    let mut probe = Probe::new(gap);
    let result = if raw_bytes {
        probe.run(source.bytes().map(Code::from), &mut out, quit)
    } else {
        probe.run(Decoder::new(source), &mut out, quit)
    };
    result.into_diagnostic()?;

    cancel.cancel();
    drop(raw_mode);
    tracing::info!(message = "probe finished", recorded = probe.recorded());
    Ok(())
}

// ─── walk ───────────────────────────────────────────────────────────────────

/// Keys `walk` reacts to. Everything else is filtered out by the decoder.
fn walk_keys() -> KeyMap<WalkCommand> {
    let mut map: KeyMap<WalkCommand> = Direction::ALL
        .into_iter()
        .map(|d| (d.arrow_code(), WalkCommand::Step(d)))
        .collect();
    map.extend(
        Direction::ALL
            .into_iter()
            .map(|d| (d.shift_arrow_code(), WalkCommand::Jump(d))),
    );
    map.insert(b'q', WalkCommand::Quit);
    map.insert(keys::CTRL_C, WalkCommand::Quit);
    map
}

fn run_walk(mode: SourceMode, grid: Grid) -> miette::Result<()> {
    let Some(mut pos) = grid.first_cell() else {
        return Err(miette::miette!(
            "the grid has no cells to walk ({}x{})",
            grid.width(),
            grid.height()
        ));
    };

    let raw_mode = RawMode::enable()?;
    let cancel = CancelToken::new();
    let source = open_stdin(mode, &cancel)?;
    let keymap = walk_keys();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write!(out, "rawkey walk ({mode}): arrows move, shift-arrows jump, q quits\r\n")
        .into_diagnostic()?;
    draw(&mut out, &grid, pos, false).into_diagnostic()?;

    for &command in Decoder::new(source).mapped(&keymap) {
        if command == WalkCommand::Quit {
            break;
        }
        if let Some(next) = grid.apply(pos, command) {
            tracing::debug!(message = "moved", from = %pos, to = %next, ?command);
            pos = next;
            draw(&mut out, &grid, pos, true).into_diagnostic()?;
        }
    }

    cancel.cancel();
    drop(raw_mode);
    tracing::info!(message = "walk finished", at = %pos);
    Ok(())
}

/// Draw the grid in place: when `redraw` is set, move the cursor back up
/// over the previous frame first.
fn draw<W: Write>(out: &mut W, grid: &Grid, marker: Pos, redraw: bool) -> io::Result<()> {
    let lines = grid.render(marker);
    if redraw && !lines.is_empty() {
        write!(out, "\x1b[{}A", lines.len())?;
    }
    for line in &lines {
        write!(out, "\r{line}\x1b[K\r\n")?;
    }
    out.flush()
}

// ─── Tests ──────────────────────────────────────────────────────────────────
