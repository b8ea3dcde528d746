//! Binary entry point for the `zlits` command-line tool.
//!
//! # Control flow
//!
//! 1. The display level starts from `ZLITS_DISPLAY_LEVEL` and is adjusted by
//!    `-v` / `-q`.
//! 2. The worker count comes from `-T#`, else `ZLITS_NBWORKERS`, else one
//!    per core.
//! 3. [`commands::run`] executes the subcommand; its outcome becomes the
//!    exit code (0 ok, 1 error, 3 defect).

use clap::Parser;

use zlits::cli::args::Cli;
use zlits::cli::commands;
use zlits::cli::constants::{set_display_level, PROGRAM_NAME, PROGRAM_VERSION, WELCOME_MESSAGE_FMT};
use zlits::cli::op_mode::{init_display_level, init_nb_workers};
use zlits::displaylevel;

fn main() {
    let cli = Cli::parse();
    set_display_level(cli.display_level(init_display_level()));

    displaylevel!(
        3,
        "{}",
        WELCOME_MESSAGE_FMT
            .replacen("{}", PROGRAM_NAME, 1)
            .replacen("{}", PROGRAM_VERSION, 1)
            .replacen("{}", &(std::mem::size_of::<*const ()>() * 8).to_string(), 1)
    );

    let nb_workers = cli.threads.unwrap_or_else(init_nb_workers);
    let res = commands::run(&cli, nb_workers);
    if let Err(e) = &res {
        displaylevel!(1, "{}: {:#}\n", PROGRAM_NAME, e);
    }
    std::process::exit(commands::outcome_code(&res));
}
