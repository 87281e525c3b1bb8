use std::path::PathBuf;
use std::process;

use clap::Args;

use super::read_sir_bytes;

#[derive(Args)]
pub struct CheckArgs {
    /// Input serialized SIR file (.sir)
    pub input: PathBuf,
}

pub fn cmd_check(args: CheckArgs) {
    let bytes = read_sir_bytes(&args.input);
    match stencilc::check(&bytes) {
        Ok(()) => eprintln!("OK: {}", args.input.display()),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
