pub mod build;
pub mod check;
pub mod init;
pub mod view;

use std::fmt::Display;
use std::path::Path;
use std::process;

/// Read a serialized SIR file, or report and exit.
pub fn read_sir_bytes(path: &Path) -> Vec<u8> {
    match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

/// Unwrap a pipeline result, or report and exit.
pub fn or_die<T, E: Display>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
