//! Input list construction for the CLI.
//!
//! [`expand_inputs`] turns command-line operands into the list of files to
//! read. With recursion enabled, directories are walked with [`walkdir`];
//! without it they are rejected up front rather than failing on read.
//!
//! Symlinks inside a walked directory are not followed (`walkdir` default),
//! which also keeps cyclic links from looping. A symlink named directly on
//! the command line is passed through.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Expand `inputs` into regular files, in command-line order.
///
/// Directory entries come out sorted by file name so reports are stable
/// across runs.
pub fn expand_inputs<P: AsRef<Path>>(inputs: &[P], recursive: bool) -> io::Result<Vec<PathBuf>> {
    let mut result = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        if !input.is_dir() {
            result.push(input.to_path_buf());
            continue;
        }
        if !recursive {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory (use -r to recurse)", input.display()),
            ));
        }
        for entry in WalkDir::new(input).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                e.io_error()
                    .map(|io| io::Error::new(io.kind(), io.to_string()))
                    .unwrap_or_else(|| io::Error::other(e.to_string()))
            })?;
            if entry.file_type().is_file() {
                result.push(entry.into_path());
            }
        }
    }
    Ok(result)
}
