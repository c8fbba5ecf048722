//! # sfs
//!
//! The binary is intentionally thin: argument parsing, rendering and exit
//! codes live in `cli/`, this file only calls `cli::run()` and turns an error
//! into `ERROR: <message>` on stderr with exit status 1.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/sfs/cli/)                                   │
//! │  - clap argument parsing and grouped help (setup.rs)        │
//! │  - Context wiring and per-command handlers (commands.rs)    │
//! │  - Tables, JSON and messages via templates (render.rs)      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  sfsclient library (src/sfs/lib.rs)                         │
//! │  - Managers, versioned dispatch, session, transport         │
//! │  - No knowledge of stdout/stderr or process exits           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logging goes to stderr through `env_logger`. `--debug` turns on request
//! logging; `RUST_LOG` overrides the filter entirely.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}
