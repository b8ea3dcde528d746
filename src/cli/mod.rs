//! Command-line interface for the `zlits` binary.
//!
//! | Submodule     | Responsibility |
//! |---------------|---------------|
//! | [`constants`] | Program identity, exit codes, the shared `DISPLAY_LEVEL` atomic and display macros. |
//! | [`op_mode`]   | Environment-based defaults (`ZLITS_NBWORKERS`, `ZLITS_DISPLAY_LEVEL`) and worker-count resolution. |
//! | [`args`]      | `clap` definition of global flags and subcommands. |
//! | [`commands`]  | Subcommand implementations and exit-code mapping. |
//!
//! Typical call sequence: `init_display_level` → `Cli::parse` → `commands::run` → `commands::outcome_code`.

pub mod constants;
pub mod op_mode;
pub mod args;
pub mod commands;
