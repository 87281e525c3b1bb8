//! Cross-entity validation of a deserialized SIR.
//!
//! The builder only checks local shape, and wire input bypasses the
//! builder entirely, so both the shape constraints and everything
//! relational are checked here: field resolution, name uniqueness,
//! grid-type consistency, region shape, interval ordering, chain
//! adjacency, and access anchoring.
//! First violation wins and aborts the compile with a `Semantic` error
//! carrying the offending node's path.

use std::collections::HashMap;

use crate::error::{CompileError, NodePath};
use crate::sir::{
    AssignmentStmt, Expr, Field, FieldDimensions, GridType, Interval, LevelMarker, LocationType,
    NeighborChain, Sir, Stencil, Stmt,
};

/// Two location kinds are adjacent when the mesh topology stores a
/// direct incidence between them: cells border edges, edges end in
/// vertices. Cells and vertices only meet through an edge, and a kind
/// is never its own neighbor.
pub fn adjacent(a: LocationType, b: LocationType) -> bool {
    use LocationType::*;
    matches!((a, b), (Cell, Edge) | (Edge, Cell) | (Edge, Vertex) | (Vertex, Edge))
}

/// Validate every cross-entity invariant of the SIR.
///
/// Shape constraints the builder enforces are re-asserted here because
/// wire input never went through the builder.
pub fn validate_sir(sir: &Sir) -> Result<(), CompileError> {
    if sir.filename.trim().is_empty() {
        return Err(CompileError::semantic(
            "output filename must not be empty",
            NodePath::new(),
        ));
    }
    if sir.stencils.is_empty() {
        return Err(CompileError::semantic(
            "SIR must contain at least one stencil",
            NodePath::new(),
        ));
    }
    for stencil in &sir.stencils {
        StencilValidator::new(sir.grid_type, stencil)?.check()?;
    }
    Ok(())
}

/// Per-stencil validation context: declared fields by name plus the
/// grid flavor, threaded through a recursive walk of the AST.
struct StencilValidator<'a> {
    grid_type: GridType,
    stencil: &'a Stencil,
    fields: HashMap<&'a str, &'a Field>,
}

impl<'a> StencilValidator<'a> {
    fn new(grid_type: GridType, stencil: &'a Stencil) -> Result<Self, CompileError> {
        let mut fields = HashMap::new();
        for field in &stencil.fields {
            if fields.insert(field.name.as_str(), field).is_some() {
                return Err(CompileError::semantic(
                    format!("duplicate field declaration '{}'", field.name),
                    NodePath::stencil(&stencil.name),
                ));
            }
        }
        Ok(StencilValidator {
            grid_type,
            stencil,
            fields,
        })
    }

    fn check(&self) -> Result<(), CompileError> {
        let path = NodePath::stencil(&self.stencil.name);

        if self.stencil.name.trim().is_empty() {
            return Err(CompileError::semantic(
                "stencil name must not be empty",
                NodePath::new(),
            ));
        }
        if self.stencil.ast.is_empty() {
            return Err(CompileError::semantic("stencil AST must not be empty", path));
        }

        for field in &self.stencil.fields {
            self.check_field_grid(field, &path)?;
        }

        for (i, stmt) in self.stencil.ast.iter().enumerate() {
            let stmt_path = path.statement(i);
            match stmt {
                Stmt::VerticalRegion(region) => {
                    self.check_interval(&region.interval, &stmt_path)?;
                    if region.body.is_empty() {
                        return Err(CompileError::semantic(
                            "vertical region body must not be empty",
                            stmt_path,
                        ));
                    }
                    for (j, body_stmt) in region.body.iter().enumerate() {
                        let body_path = stmt_path.child(format!("body statement {}", j));
                        match body_stmt {
                            Stmt::Assignment(assign) => {
                                self.check_assignment(assign, &body_path)?
                            }
                            Stmt::VerticalRegion(_) => {
                                return Err(CompileError::semantic(
                                    "vertical regions must not nest",
                                    body_path,
                                ))
                            }
                        }
                    }
                }
                Stmt::Assignment(_) => {
                    return Err(CompileError::semantic(
                        "top-level stencil statements must be vertical regions",
                        stmt_path,
                    ))
                }
            }
        }
        Ok(())
    }

    fn check_field_grid(&self, field: &Field, path: &NodePath) -> Result<(), CompileError> {
        let consistent = matches!(
            (self.grid_type, &field.dimensions),
            (GridType::Unstructured, FieldDimensions::Unstructured { .. })
                | (GridType::Structured, FieldDimensions::Cartesian { .. })
        );
        if !consistent {
            return Err(CompileError::semantic(
                format!(
                    "field '{}' dimensionality does not match grid type {}",
                    field.name, self.grid_type
                ),
                path.child(format!("field '{}'", field.name)),
            ));
        }
        Ok(())
    }

    /// Bounds must describe a non-reversed interval: lower <= upper.
    fn check_interval(&self, interval: &Interval, path: &NodePath) -> Result<(), CompileError> {
        let ordered = match (interval.lower.marker, interval.upper.marker) {
            (LevelMarker::Start, LevelMarker::End) => true,
            (LevelMarker::End, LevelMarker::Start) => false,
            _ => interval.lower.offset <= interval.upper.offset,
        };
        if !ordered {
            return Err(CompileError::semantic(
                format!("interval {} is reversed", interval),
                path.child(format!("interval {}", interval)),
            ));
        }
        Ok(())
    }

    fn resolve_field(&self, name: &str, path: &NodePath) -> Result<&'a Field, CompileError> {
        self.fields.get(name).copied().ok_or_else(|| {
            CompileError::semantic(
                format!("field '{}' is not declared in the stencil", name),
                path.clone(),
            )
        })
    }

    fn field_location(&self, field: &Field) -> Option<LocationType> {
        match field.dimensions {
            FieldDimensions::Unstructured { location, .. } => Some(location),
            FieldDimensions::Cartesian { .. } => None,
        }
    }

    fn check_assignment(
        &self,
        assign: &AssignmentStmt,
        path: &NodePath,
    ) -> Result<(), CompileError> {
        if assign.left.horizontal_offset {
            return Err(CompileError::semantic(
                format!(
                    "assignment target '{}' must not carry a horizontal offset",
                    assign.left.field
                ),
                path.clone(),
            ));
        }
        let target = self.resolve_field(&assign.left.field, path)?;

        // The LHS field anchors the iteration space. On a structured
        // grid there is no mesh location; neighbor reductions are then
        // rejected inside the expression walk.
        let iteration_loc = self.field_location(target);
        self.check_expr(&assign.right, iteration_loc, None, path)
    }

    /// Walk one expression. `element_loc` is the location kind the
    /// enclosing context iterates over; `chain` is the innermost
    /// enclosing reduction chain, if any.
    fn check_expr(
        &self,
        expr: &Expr,
        element_loc: Option<LocationType>,
        chain: Option<&NeighborChain>,
        path: &NodePath,
    ) -> Result<(), CompileError> {
        match expr {
            Expr::Literal { .. } => Ok(()),
            Expr::FieldAccess(access) => {
                let field = self.resolve_field(&access.field, path)?;
                let Some(field_loc) = self.field_location(field) else {
                    // Cartesian fields have no anchor to check; the
                    // grid-consistency pass already vetted them.
                    return Ok(());
                };
                if access.horizontal_offset {
                    let Some(chain) = chain else {
                        return Err(CompileError::semantic(
                            format!(
                                "offset access to '{}' outside a reduction body",
                                access.field
                            ),
                            path.clone(),
                        ));
                    };
                    let target = chain.target().expect("validated chain is non-empty");
                    if field_loc != target {
                        return Err(CompileError::semantic(
                            format!(
                                "field '{}' is anchored at {} but the chain {} ends at {}",
                                access.field, field_loc, chain, target
                            ),
                            path.clone(),
                        ));
                    }
                } else if let Some(element_loc) = element_loc {
                    if field_loc != element_loc {
                        return Err(CompileError::semantic(
                            format!(
                                "field '{}' is anchored at {} but the iteration space is {}",
                                access.field, field_loc, element_loc
                            ),
                            path.clone(),
                        ));
                    }
                }
                Ok(())
            }
            Expr::Binary { lhs, rhs, .. } => {
                self.check_expr(lhs, element_loc, chain, path)?;
                self.check_expr(rhs, element_loc, chain, path)
            }
            Expr::ReductionOverNeighbors {
                rhs,
                init,
                chain: red_chain,
                ..
            } => {
                let red_path = path.child(format!("reduce over {}", red_chain));
                if self.grid_type == GridType::Structured {
                    return Err(CompileError::semantic(
                        "neighbor reductions require an unstructured grid",
                        red_path,
                    ));
                }
                // A nested reduction iterates from the enclosing
                // chain's neighbor element, so its chain roots at that
                // chain's target, not at the primary element.
                let anchor = match chain {
                    Some(enclosing) => enclosing.target(),
                    None => element_loc,
                };
                self.check_chain(red_chain, anchor, &red_path)?;
                // The init is evaluated before iteration starts, in the
                // enclosing context.
                self.check_expr(init, element_loc, chain, &red_path)?;
                self.check_expr(rhs, element_loc, Some(red_chain), &red_path)
            }
        }
    }

    fn check_chain(
        &self,
        chain: &NeighborChain,
        anchor: Option<LocationType>,
        path: &NodePath,
    ) -> Result<(), CompileError> {
        if chain.len() < 2 {
            return Err(CompileError::semantic(
                format!("neighbor chain {} needs at least two locations", chain),
                path.clone(),
            ));
        }
        let locations = chain.locations();
        for pair in locations.windows(2) {
            if !adjacent(pair[0], pair[1]) {
                return Err(CompileError::semantic(
                    format!(
                        "locations {} and {} are not adjacent in chain {}",
                        pair[0], pair[1], chain
                    ),
                    path.clone(),
                ));
            }
        }
        if let (Some(source), Some(anchor)) = (chain.source(), anchor) {
            if source != anchor {
                return Err(CompileError::semantic(
                    format!(
                        "chain {} starts at {} but the enclosing element is {}",
                        chain, source, anchor
                    ),
                    path.clone(),
                ));
            }
        }
        Ok(())
    }
}
