use std::path::PathBuf;
use std::process;

use clap::Args;

use stencilc::codegen::CXX_NAIVE_ICO;
use stencilc::sir::serialize::{deserialize, to_text};

use super::{or_die, read_sir_bytes};

#[derive(Args)]
pub struct BuildArgs {
    /// Input serialized SIR file (.sir)
    pub input: PathBuf,
    /// Output file (default: the SIR's declared output filename)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Code generation backend
    #[arg(long, default_value = CXX_NAIVE_ICO)]
    pub backend: String,
    /// Print the SIR transcoding before compiling
    #[arg(long)]
    pub emit_sir: bool,
}

pub fn cmd_build(args: BuildArgs) {
    let bytes = read_sir_bytes(&args.input);
    let sir = or_die(deserialize(&bytes));

    if args.emit_sir {
        println!("{}", to_text(&sir));
    }

    let code = or_die(stencilc::compile_sir(&sir, &args.backend));

    let out_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&sir.filename));
    println!("Writing generated code to '{}'", out_path.display());
    if let Err(e) = std::fs::write(&out_path, code) {
        eprintln!("error: cannot write '{}': {}", out_path.display(), e);
        process::exit(1);
    }
}
