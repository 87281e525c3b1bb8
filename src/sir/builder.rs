//! Constructor functions for SIR entities.
//!
//! One `make_*` function per entity. Each validates only its own
//! locally-checkable constraints (non-empty name, non-empty chain,
//! rank >= 1) and fails with `InvalidArgument`, so a constructor never
//! returns a partially invalid value. Cross-entity invariants (field
//! resolution, chain adjacency, interval ordering) belong to the
//! driver's validation pass.

use crate::error::CompileError;
use crate::sir::{
    AssignmentStmt, Bound, BuiltinType, Direction, Expr, Field, FieldAccess, FieldDimensions,
    GridType, Interval, LevelMarker, LocationType, NeighborChain, Sir, Stencil, Stmt,
    VerticalRegionStmt,
};

fn require_name(what: &str, name: &str) -> Result<(), CompileError> {
    if name.trim().is_empty() {
        return Err(CompileError::invalid_argument(format!(
            "{} name must not be empty",
            what
        )));
    }
    Ok(())
}

/// Unstructured field dimensions: anchored at a location, rank >= 1.
pub fn make_field_dimensions_unstructured(
    location: LocationType,
    rank: u32,
) -> Result<FieldDimensions, CompileError> {
    if rank == 0 {
        return Err(CompileError::invalid_argument(
            "field rank must be at least 1",
        ));
    }
    Ok(FieldDimensions::Unstructured { location, rank })
}

/// Cartesian field dimensions, rank >= 1.
pub fn make_field_dimensions_cartesian(rank: u32) -> Result<FieldDimensions, CompileError> {
    if rank == 0 {
        return Err(CompileError::invalid_argument(
            "field rank must be at least 1",
        ));
    }
    Ok(FieldDimensions::Cartesian { rank })
}

pub fn make_field(name: &str, dimensions: FieldDimensions) -> Result<Field, CompileError> {
    require_name("field", name)?;
    Ok(Field {
        name: name.to_string(),
        dimensions,
    })
}

/// Interval over `[lower_marker + lower_offset, upper_marker + upper_offset]`.
pub fn make_interval(
    lower_marker: LevelMarker,
    upper_marker: LevelMarker,
    lower_offset: i32,
    upper_offset: i32,
) -> Interval {
    Interval {
        lower: Bound {
            marker: lower_marker,
            offset: lower_offset,
        },
        upper: Bound {
            marker: upper_marker,
            offset: upper_offset,
        },
    }
}

pub fn make_literal(value: &str, ty: BuiltinType) -> Result<Expr, CompileError> {
    if value.trim().is_empty() {
        return Err(CompileError::invalid_argument(
            "literal value must not be empty",
        ));
    }
    Ok(Expr::Literal {
        value: value.to_string(),
        ty,
    })
}

/// Field read at the primary (iteration) element.
pub fn make_field_access(field: &str) -> Result<Expr, CompileError> {
    require_name("field", field)?;
    Ok(Expr::FieldAccess(FieldAccess {
        field: field.to_string(),
        horizontal_offset: false,
    }))
}

/// Field read at the iterated neighbor element (reduction bodies only).
pub fn make_offset_field_access(field: &str) -> Result<Expr, CompileError> {
    require_name("field", field)?;
    Ok(Expr::FieldAccess(FieldAccess {
        field: field.to_string(),
        horizontal_offset: true,
    }))
}

pub fn make_neighbor_chain(locations: Vec<LocationType>) -> Result<NeighborChain, CompileError> {
    if locations.is_empty() {
        return Err(CompileError::invalid_argument(
            "neighbor chain must not be empty",
        ));
    }
    Ok(NeighborChain::from_vec(locations))
}

pub fn make_binary(op: &str, lhs: Expr, rhs: Expr) -> Result<Expr, CompileError> {
    if op.trim().is_empty() {
        return Err(CompileError::invalid_argument(
            "binary operator must not be empty",
        ));
    }
    Ok(Expr::Binary {
        op: op.to_string(),
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

/// Reduction folding `op` over the neighbors reached via `chain`,
/// seeded with `init`, evaluating `rhs` once per neighbor.
pub fn make_reduction_over_neighbors(
    op: &str,
    rhs: Expr,
    init: Expr,
    chain: NeighborChain,
) -> Result<Expr, CompileError> {
    if op.trim().is_empty() {
        return Err(CompileError::invalid_argument(
            "reduction operator must not be empty",
        ));
    }
    Ok(Expr::ReductionOverNeighbors {
        op: op.to_string(),
        rhs: Box::new(rhs),
        init: Box::new(init),
        chain,
    })
}

/// `left op right`. The left side must be a field access expression.
pub fn make_assignment(left: Expr, right: Expr, op: &str) -> Result<Stmt, CompileError> {
    if op.trim().is_empty() {
        return Err(CompileError::invalid_argument(
            "assignment operator must not be empty",
        ));
    }
    let left = match left {
        Expr::FieldAccess(access) => access,
        other => {
            return Err(CompileError::invalid_argument(format!(
                "assignment target must be a field access, got '{}'",
                other
            )))
        }
    };
    Ok(Stmt::Assignment(AssignmentStmt {
        left,
        op: op.to_string(),
        right,
    }))
}

pub fn make_vertical_region(
    body: Vec<Stmt>,
    interval: Interval,
    direction: Direction,
) -> Result<Stmt, CompileError> {
    if body.is_empty() {
        return Err(CompileError::invalid_argument(
            "vertical region body must not be empty",
        ));
    }
    Ok(Stmt::VerticalRegion(VerticalRegionStmt {
        body,
        interval,
        direction,
    }))
}

pub fn make_stencil(
    name: &str,
    fields: Vec<Field>,
    ast: Vec<Stmt>,
) -> Result<Stencil, CompileError> {
    require_name("stencil", name)?;
    if ast.is_empty() {
        return Err(CompileError::invalid_argument(
            "stencil AST must not be empty",
        ));
    }
    Ok(Stencil {
        name: name.to_string(),
        fields,
        ast,
    })
}

pub fn make_sir(
    filename: &str,
    grid_type: GridType,
    stencils: Vec<Stencil>,
) -> Result<Sir, CompileError> {
    require_name("output file", filename)?;
    if stencils.is_empty() {
        return Err(CompileError::invalid_argument(
            "SIR must contain at least one stencil",
        ));
    }
    Ok(Sir {
        filename: filename.to_string(),
        grid_type,
        stencils,
    })
}
