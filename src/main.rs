mod cli;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "stencilc",
    version,
    about = "Stencil IR compiler for unstructured meshes"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a serialized SIR file to generated source code
    Build(cli::build::BuildArgs),
    /// Validate a serialized SIR file without emitting code
    Check(cli::check::CheckArgs),
    /// Print the human-readable transcoding of a SIR file
    View(cli::view::ViewArgs),
    /// Write an example copy-stencil SIR as a starting point
    Init(cli::init::InitArgs),
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => cli::build::cmd_build(args),
        Command::Check(args) => cli::check::cmd_check(args),
        Command::View(args) => cli::view::cmd_view(args),
        Command::Init(args) => cli::init::cmd_init(args),
    }
}
