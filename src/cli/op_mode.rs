//! Startup defaults for the CLI.
//!
//! This module provides:
//! - [`init_nb_workers`] / [`init_display_level`]: per-process defaults read
//!   from `ZLITS_NBWORKERS` and `ZLITS_DISPLAY_LEVEL`.
//! - [`resolve_nb_workers`]: turns a requested worker count (0 = auto) into
//!   the number of threads actually started.
//!
//! Each `init_*` function has a `*_from` twin taking the raw variable value,
//! so the parsing can be tested without touching the process environment.

use crate::cli::constants::display_level;
use crate::config::{DISPLAY_LEVEL_DEFAULT, NB_WORKERS_DEFAULT, NB_WORKERS_MAX};

pub const ENV_NBWORKERS: &str = "ZLITS_NBWORKERS";
pub const ENV_DISPLAY_LEVEL: &str = "ZLITS_DISPLAY_LEVEL";

/// Leading decimal digits of `s`; `None` when `s` does not start with one.
fn leading_u32(s: &str) -> Option<u32> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    Some(s[..digits].parse::<u32>().unwrap_or(u32::MAX))
}

fn warn_ignored(var: &str, value: &str) {
    if display_level() >= 2 {
        eprintln!("Ignore environment variable setting {}={}: not a valid unsigned value ", var, value);
    }
}

/// Worker count from `ZLITS_NBWORKERS`, or [`NB_WORKERS_DEFAULT`].
pub fn init_nb_workers() -> usize {
    init_nb_workers_from(std::env::var(ENV_NBWORKERS).ok().as_deref())
}

/// Testable core of [`init_nb_workers`]. Values above [`NB_WORKERS_MAX`]
/// are clamped.
pub fn init_nb_workers_from(env_val: Option<&str>) -> usize {
    if let Some(env) = env_val {
        if let Some(val) = leading_u32(env) {
            return (val as usize).min(NB_WORKERS_MAX);
        }
        warn_ignored(ENV_NBWORKERS, env);
    }
    NB_WORKERS_DEFAULT
}

/// Display level from `ZLITS_DISPLAY_LEVEL`, or [`DISPLAY_LEVEL_DEFAULT`].
pub fn init_display_level() -> u32 {
    init_display_level_from(std::env::var(ENV_DISPLAY_LEVEL).ok().as_deref())
}

/// Testable core of [`init_display_level`].
pub fn init_display_level_from(env_val: Option<&str>) -> u32 {
    if let Some(env) = env_val {
        if let Some(val) = leading_u32(env) {
            return val;
        }
        warn_ignored(ENV_DISPLAY_LEVEL, env);
    }
    DISPLAY_LEVEL_DEFAULT
}

/// Threads to start for `requested` workers: 0 means one per logical core.
pub fn resolve_nb_workers(requested: usize) -> usize {
    let n = if requested == 0 {
        num_cpus::get()
    } else {
        requested
    };
    n.clamp(1, NB_WORKERS_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nb_workers_numeric() {
        assert_eq!(init_nb_workers_from(Some("4")), 4);
        assert_eq!(init_nb_workers_from(Some("8threads")), 8);
    }

    #[test]
    fn nb_workers_unset_or_invalid() {
        assert_eq!(init_nb_workers_from(None), NB_WORKERS_DEFAULT);
        assert_eq!(init_nb_workers_from(Some("auto")), NB_WORKERS_DEFAULT);
    }

    #[test]
    fn nb_workers_clamped() {
        assert_eq!(init_nb_workers_from(Some("100000")), NB_WORKERS_MAX);
        assert_eq!(init_nb_workers_from(Some("99999999999999")), NB_WORKERS_MAX);
    }

    #[test]
    fn display_level_from_env() {
        assert_eq!(init_display_level_from(Some("4")), 4);
        assert_eq!(init_display_level_from(Some("loud")), DISPLAY_LEVEL_DEFAULT);
        assert_eq!(init_display_level_from(None), DISPLAY_LEVEL_DEFAULT);
    }

    #[test]
    fn auto_workers_start_at_least_one_thread() {
        assert!(resolve_nb_workers(0) >= 1);
        assert_eq!(resolve_nb_workers(3), 3);
        assert_eq!(resolve_nb_workers(1000), NB_WORKERS_MAX);
    }
}
