use std::path::PathBuf;

use clap::Args;

use stencilc::sir::serialize::{deserialize, to_text};

use super::{or_die, read_sir_bytes};

#[derive(Args)]
pub struct ViewArgs {
    /// Input serialized SIR file (.sir)
    pub input: PathBuf,
}

pub fn cmd_view(args: ViewArgs) {
    let bytes = read_sir_bytes(&args.input);
    let sir = or_die(deserialize(&bytes));
    println!("{}", to_text(&sir));
}
