// SPDX-License-Identifier: MIT
//
// Command-line configuration.
//
// Every option can also come from the environment, so a wrapper script
// can pin the source mode without touching the command line.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rawkey_term::SourceMode;

use crate::grid::Pos;

#[derive(Debug, Parser)]
#[command(name = "rawkey", version, about = "Decode raw terminal key presses")]
pub struct Cli {
    /// Where the blocking stdin read runs: `isolated` (worker thread) or
    /// `in-process` (the decoding thread).
    #[arg(long, env = "RAWKEY_SOURCE", default_value_t = SourceMode::Isolated, global = true)]
    pub source: SourceMode,

    /// Append logs to this file. Logging is off without it.
    #[arg(long, env = "RAWKEY_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Echo the code every key produces. Ctrl-C quits.
    Probe {
        /// Idle time (ms) that starts a new group of codes.
        #[arg(long, default_value_t = 50)]
        gap_ms: u64,

        /// Echo raw bytes instead of decoded codes.
        #[arg(long)]
        raw: bool,
    },

    /// Move a marker over a grid with the arrow keys; shift-arrows jump
    /// to the edge. `q` or Ctrl-C quits.
    Walk {
        #[arg(long, default_value_t = 8)]
        width: usize,

        #[arg(long, default_value_t = 4)]
        height: usize,

        /// Cells with nothing in them, as `col,row` pairs separated by `;`.
        #[arg(long, value_delimiter = ';')]
        holes: Vec<Pos>,
    },
}
