// cli/constants.rs: Program identity, exit codes and display infrastructure.
//
// The display macros are shared by the binary and, for debug traces, by the
// library core. Output goes to stdout for reports and stderr for everything
// else, gated by a process-wide display level.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::DISPLAY_LEVEL_DEFAULT;

// ── Identity ──────────────────────────────────────────────────────────────────
pub const PROGRAM_NAME: &str = "zlits";
pub const PROGRAM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Welcome message format. Caller substitutes: program name, version,
/// pointer-width bits.
pub const WELCOME_MESSAGE_FMT: &str = "*** {} v{} {}-bit, zstd literals inspector ***\n";

// ── Size multiplier ──────────────────────────────────────────────────────────
pub const MB: u64 = 1 << 20;

// ── Exit codes ────────────────────────────────────────────────────────────────
pub const EXIT_OK: i32 = 0;
/// Bad input or I/O failure.
pub const EXIT_ERROR: i32 = 1;
/// Internal inconsistency (`ZlitsError::UnsupportedState`).
pub const EXIT_DEFECT: i32 = 3;

// ── Display level ─────────────────────────────────────────────────────────────
//
// 0 = no output; 1 = errors only; 2 = normal; 3 = per-block detail;
// 4 = verbose, repeat-mode decisions included
pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(DISPLAY_LEVEL_DEFAULT);

/// Returns the current display level.
#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the display level.
#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

// ── Display helpers ───────────────────────────────────────────────────────────

/// Print to stdout.
#[macro_export]
macro_rules! displayout {
    ($($arg:tt)*) => { print!($($arg)*) };
}

/// Print to stderr when the display level is at least `level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::cli::constants::display_level() >= $level {
            eprint!($($arg)*);
        }
    };
}

/// Print to stderr in debug builds only.
#[macro_export]
macro_rules! debugoutput {
    ($($arg:tt)*) => {
        #[cfg(debug_assertions)]
        eprint!($($arg)*);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_name_constant() {
        assert_eq!(PROGRAM_NAME, "zlits");
    }

    #[test]
    fn exit_codes_are_distinct() {
        assert_ne!(EXIT_ERROR, EXIT_DEFECT);
        assert_ne!(EXIT_OK, EXIT_ERROR);
    }

    #[test]
    fn display_level_round_trips() {
        // Other tests may mutate the global; restore it afterwards.
        let prev = display_level();
        set_display_level(3);
        assert_eq!(display_level(), 3);
        set_display_level(prev);
    }
}
