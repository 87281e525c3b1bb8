use std::path::PathBuf;
use std::process;

use clap::Args;

use stencilc::error::CompileError;
use stencilc::sir::builder::{
    make_assignment, make_field, make_field_access, make_field_dimensions_unstructured,
    make_interval, make_literal, make_neighbor_chain, make_offset_field_access,
    make_reduction_over_neighbors, make_sir, make_stencil, make_vertical_region,
};
use stencilc::sir::serialize::to_text;
use stencilc::sir::{BuiltinType, Direction, GridType, LevelMarker, LocationType, Sir};

use super::or_die;

#[derive(Args)]
pub struct InitArgs {
    /// Stencil name (also names the .sir and generated files)
    #[arg(default_value = "unstructured_stencil")]
    pub name: String,
}

/// Build the example copy stencil: one forward vertical region over
/// the full interval with `out = reduce(+, in, init=1.0)` across the
/// Cell->Edge->Cell chain.
fn copy_stencil_sir(name: &str) -> Result<Sir, CompileError> {
    let interval = make_interval(LevelMarker::Start, LevelMarker::End, 0, 0);

    let reduction = make_reduction_over_neighbors(
        "+",
        make_offset_field_access("in")?,
        make_literal("1.0", BuiltinType::Float)?,
        make_neighbor_chain(vec![
            LocationType::Cell,
            LocationType::Edge,
            LocationType::Cell,
        ])?,
    )?;
    let assignment = make_assignment(make_field_access("out")?, reduction, "=")?;
    let region = make_vertical_region(vec![assignment], interval, Direction::Forward)?;

    let fields = vec![
        make_field(
            "in",
            make_field_dimensions_unstructured(LocationType::Cell, 1)?,
        )?,
        make_field(
            "out",
            make_field_dimensions_unstructured(LocationType::Cell, 1)?,
        )?,
    ];

    make_sir(
        &format!("{}.cpp", name),
        GridType::Unstructured,
        vec![make_stencil(name, fields, vec![region])?],
    )
}

pub fn cmd_init(args: InitArgs) {
    let sir = or_die(copy_stencil_sir(&args.name));
    let path = PathBuf::from(format!("{}.sir", args.name));
    if let Err(e) = std::fs::write(&path, to_text(&sir)) {
        eprintln!("error: cannot write '{}': {}", path.display(), e);
        process::exit(1);
    }
    eprintln!("Wrote '{}'", path.display());
}
