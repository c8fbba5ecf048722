//! # CLI Behavior
//!
//! This is **one possible UI client** for the Shared File System library, not
//! the library itself. It is the only place that knows about terminal I/O,
//! exit codes and output formatting.
//!
//! ## Subcommands
//!
//! Every subcommand maps to one manager method. Commands that accept a share,
//! snapshot or share type take either its name or its id; the name is looked
//! up when no resource has that id. Commands that accept several items
//! (`delete a b c`) act on all of them and fail at the end if any failed.
//!
//! ## Versions
//!
//! Without `--api-version` the session asks the service for its version range
//! and uses the newest version both sides support. An operation the chosen
//! version does not offer fails before any request is sent. `sfs help` marks
//! commands whose operation is still experimental.
//!
//! ## Output
//!
//! Lists print as tables, single resources as `Property | Value` tables, and
//! `--format json` prints the resource JSON instead.

mod commands;
mod complete;
mod render;
mod setup;
mod styles;
mod templates;

pub use commands::run;
