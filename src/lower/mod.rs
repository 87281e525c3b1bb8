//! Lowering of the SIR AST to the backend-neutral tree.
//!
//! Two things happen here:
//! - vertical region bounds resolve into concrete level bounds
//!   (`FromStart`/`FromEnd` offsets over the mesh's k levels);
//! - every `ReductionOverNeighbors` flattens into an explicit
//!   [`LoweredStmt::Accumulate`]: a fresh accumulator seeded with the
//!   init value, folded left-to-right over the neighbor set, feeding
//!   the enclosing expression through a temporary.
//!
//! Structural nodes carry nested bodies so each backend picks its own
//! loop emission strategy.

use crate::sir::{
    AssignmentStmt, BuiltinType, Direction, Expr, Field, FieldDimensions, Interval, LevelMarker,
    LocationType, NeighborChain, Sir, Stencil, Stmt,
};

// ─── Lowered tree ─────────────────────────────────────────────────

/// A vertical loop bound resolved against the mesh's level range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelBound {
    /// Offset from the bottom level (level 0).
    FromStart(i32),
    /// Offset from the top level (level k_size - 1).
    FromEnd(i32),
}

/// A lowered expression. `Temp` references an accumulator introduced
/// by a preceding `Accumulate` statement.
#[derive(Clone, Debug, PartialEq)]
pub enum LoweredExpr {
    FieldAt {
        field: String,
        /// Read at the iterated neighbor element instead of the
        /// primary element.
        at_neighbor: bool,
    },
    Literal {
        value: String,
        ty: BuiltinType,
    },
    Temp(String),
    Binary {
        op: String,
        lhs: Box<LoweredExpr>,
        rhs: Box<LoweredExpr>,
    },
}

/// A lowered statement inside one k-loop iteration.
#[derive(Clone, Debug, PartialEq)]
pub enum LoweredStmt {
    /// `acc = init; for nbh in neighbors(chain, loc) { pre...; acc = acc op rhs }`
    ///
    /// `pre` holds statements evaluated per neighbor (nested
    /// accumulations); the fold itself applies `op` left-to-right in
    /// neighbor-table order.
    Accumulate {
        acc: String,
        ty: BuiltinType,
        init: LoweredExpr,
        op: String,
        chain: NeighborChain,
        pre: Vec<LoweredStmt>,
        rhs: LoweredExpr,
    },
    /// `field[loc, k] op value`
    Assign {
        field: String,
        op: String,
        value: LoweredExpr,
    },
}

/// One assignment's iteration over the primary mesh location. The
/// location comes from the assignment's left-hand field; `None` means
/// a Cartesian target, which only a structured-grid backend could
/// iterate.
#[derive(Clone, Debug, PartialEq)]
pub struct HorizontalLoop {
    pub location: Option<LocationType>,
    pub body: Vec<LoweredStmt>,
}

/// One lowered vertical region: concrete bounds, direction, body.
#[derive(Clone, Debug, PartialEq)]
pub struct KLoop {
    pub lower: LevelBound,
    pub upper: LevelBound,
    pub direction: Direction,
    pub body: Vec<HorizontalLoop>,
}

/// One lowered stencil: the declared fields become the generated
/// function's parameters, the k-loops its body.
#[derive(Clone, Debug, PartialEq)]
pub struct LoweredStencil {
    pub name: String,
    pub fields: Vec<Field>,
    pub k_loops: Vec<KLoop>,
}

/// Everything a backend needs to emit one artifact.
#[derive(Clone, Debug, PartialEq)]
pub struct LoweredModule {
    pub filename: String,
    pub stencils: Vec<LoweredStencil>,
}

// ─── Lowering ─────────────────────────────────────────────────────

/// Lower a validated SIR. Total over validated input; validation has
/// already rejected nested regions and unresolvable accesses.
pub fn lower_sir(sir: &Sir) -> LoweredModule {
    LoweredModule {
        filename: sir.filename.clone(),
        stencils: sir.stencils.iter().map(lower_stencil).collect(),
    }
}

fn lower_stencil(stencil: &Stencil) -> LoweredStencil {
    let mut lowerer = Lowerer::default();
    let mut k_loops = Vec::new();
    for stmt in &stencil.ast {
        if let Stmt::VerticalRegion(region) = stmt {
            let mut body = Vec::new();
            for body_stmt in &region.body {
                // Validation guarantees region bodies hold assignments.
                if let Stmt::Assignment(assign) = body_stmt {
                    let mut stmts = Vec::new();
                    lowerer.lower_assignment(assign, &mut stmts);
                    body.push(HorizontalLoop {
                        location: iteration_location(stencil, &assign.left.field),
                        body: stmts,
                    });
                }
            }
            k_loops.push(KLoop {
                lower: lower_bound(&region.interval, true),
                upper: lower_bound(&region.interval, false),
                direction: region.direction,
                body,
            });
        }
    }
    LoweredStencil {
        name: stencil.name.clone(),
        fields: stencil.fields.clone(),
        k_loops,
    }
}

/// Mesh location anchoring the assignment's iteration space.
fn iteration_location(stencil: &Stencil, field: &str) -> Option<LocationType> {
    stencil
        .fields
        .iter()
        .find(|f| f.name == field)
        .and_then(|f| match f.dimensions {
            FieldDimensions::Unstructured { location, .. } => Some(location),
            FieldDimensions::Cartesian { .. } => None,
        })
}

fn lower_bound(interval: &Interval, lower: bool) -> LevelBound {
    let bound = if lower { interval.lower } else { interval.upper };
    match bound.marker {
        LevelMarker::Start => LevelBound::FromStart(bound.offset),
        LevelMarker::End => LevelBound::FromEnd(bound.offset),
    }
}

/// Carries the accumulator counter so temporaries stay unique within a
/// stencil.
#[derive(Default)]
struct Lowerer {
    temp_counter: u32,
}

impl Lowerer {
    fn fresh_temp(&mut self) -> String {
        let name = format!("red_{}", self.temp_counter);
        self.temp_counter += 1;
        name
    }

    fn lower_assignment(&mut self, assign: &AssignmentStmt, out: &mut Vec<LoweredStmt>) {
        let value = self.lower_expr(&assign.right, out);
        out.push(LoweredStmt::Assign {
            field: assign.left.field.clone(),
            op: assign.op.clone(),
            value,
        });
    }

    /// Lower one expression, appending any accumulate statements it
    /// needs to `pre`.
    fn lower_expr(&mut self, expr: &Expr, pre: &mut Vec<LoweredStmt>) -> LoweredExpr {
        match expr {
            Expr::FieldAccess(access) => LoweredExpr::FieldAt {
                field: access.field.clone(),
                at_neighbor: access.horizontal_offset,
            },
            Expr::Literal { value, ty } => LoweredExpr::Literal {
                value: value.clone(),
                ty: *ty,
            },
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.lower_expr(lhs, pre);
                let rhs = self.lower_expr(rhs, pre);
                LoweredExpr::Binary {
                    op: op.clone(),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }
            }
            Expr::ReductionOverNeighbors {
                op,
                rhs,
                init,
                chain,
            } => {
                let init = self.lower_expr(init, pre);
                let mut inner = Vec::new();
                let rhs = self.lower_expr(rhs, &mut inner);
                let acc = self.fresh_temp();
                let ty = accumulator_type(&init);
                pre.push(LoweredStmt::Accumulate {
                    acc: acc.clone(),
                    ty,
                    init,
                    op: op.clone(),
                    chain: chain.clone(),
                    pre: inner,
                    rhs,
                });
                LoweredExpr::Temp(acc)
            }
        }
    }
}

/// Accumulator type follows the seed expression; field reads and
/// temporaries are floating-point.
fn accumulator_type(init: &LoweredExpr) -> BuiltinType {
    match init {
        LoweredExpr::Literal { ty, .. } => *ty,
        LoweredExpr::Binary { lhs, .. } => accumulator_type(lhs),
        LoweredExpr::FieldAt { .. } | LoweredExpr::Temp(_) => BuiltinType::Double,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sir::builder::*;
    use crate::sir::{GridType, LocationType};

    fn cell_field(name: &str) -> Field {
        make_field(
            name,
            make_field_dimensions_unstructured(LocationType::Cell, 1).unwrap(),
        )
        .unwrap()
    }

    fn reduction(op: &str) -> Expr {
        make_reduction_over_neighbors(
            op,
            make_offset_field_access("in").unwrap(),
            make_literal("1.0", BuiltinType::Float).unwrap(),
            make_neighbor_chain(vec![
                LocationType::Cell,
                LocationType::Edge,
                LocationType::Cell,
            ])
            .unwrap(),
        )
        .unwrap()
    }

    fn sir_with_rhs(rhs: Expr) -> Sir {
        let assign = make_assignment(make_field_access("out").unwrap(), rhs, "=").unwrap();
        let region = make_vertical_region(
            vec![assign],
            make_interval(LevelMarker::Start, LevelMarker::End, 0, 0),
            Direction::Forward,
        )
        .unwrap();
        let stencil = make_stencil(
            "copy",
            vec![cell_field("in"), cell_field("out")],
            vec![region],
        )
        .unwrap();
        make_sir("copy.cpp", GridType::Unstructured, vec![stencil]).unwrap()
    }

    #[test]
    fn test_full_interval_bounds() {
        let module = lower_sir(&sir_with_rhs(reduction("+")));
        let k_loop = &module.stencils[0].k_loops[0];
        assert_eq!(k_loop.lower, LevelBound::FromStart(0));
        assert_eq!(k_loop.upper, LevelBound::FromEnd(0));
        assert_eq!(k_loop.direction, Direction::Forward);
    }

    #[test]
    fn test_offset_bounds() {
        let assign = make_assignment(
            make_field_access("out").unwrap(),
            make_field_access("out").unwrap(),
            "=",
        )
        .unwrap();
        let region = make_vertical_region(
            vec![assign],
            make_interval(LevelMarker::Start, LevelMarker::End, 1, -2),
            Direction::Backward,
        )
        .unwrap();
        let stencil = make_stencil("s", vec![cell_field("out")], vec![region]).unwrap();
        let sir = make_sir("s.cpp", GridType::Unstructured, vec![stencil]).unwrap();
        let k_loop = &lower_sir(&sir).stencils[0].k_loops[0];
        assert_eq!(k_loop.lower, LevelBound::FromStart(1));
        assert_eq!(k_loop.upper, LevelBound::FromEnd(-2));
        assert_eq!(k_loop.direction, Direction::Backward);
    }

    #[test]
    fn test_reduction_flattens_to_accumulate_then_assign() {
        let module = lower_sir(&sir_with_rhs(reduction("+")));
        let h_loop = &module.stencils[0].k_loops[0].body[0];
        assert_eq!(h_loop.location, Some(LocationType::Cell));
        let body = &h_loop.body;
        assert_eq!(body.len(), 2);
        match &body[0] {
            LoweredStmt::Accumulate {
                acc,
                ty,
                init,
                op,
                chain,
                pre,
                rhs,
            } => {
                assert_eq!(acc, "red_0");
                assert_eq!(*ty, BuiltinType::Float);
                assert_eq!(op, "+");
                assert_eq!(chain.len(), 3);
                assert!(pre.is_empty());
                assert_eq!(
                    *init,
                    LoweredExpr::Literal {
                        value: "1.0".to_string(),
                        ty: BuiltinType::Float,
                    }
                );
                assert_eq!(
                    *rhs,
                    LoweredExpr::FieldAt {
                        field: "in".to_string(),
                        at_neighbor: true,
                    }
                );
            }
            other => panic!("expected accumulate, got {:?}", other),
        }
        match &body[1] {
            LoweredStmt::Assign { field, op, value } => {
                assert_eq!(field, "out");
                assert_eq!(op, "=");
                assert_eq!(*value, LoweredExpr::Temp("red_0".to_string()));
            }
            other => panic!("expected assign, got {:?}", other),
        }
    }

    #[test]
    fn test_two_reductions_get_distinct_temps() {
        let rhs = make_binary("+", reduction("+"), reduction("*")).unwrap();
        let module = lower_sir(&sir_with_rhs(rhs));
        let body = &module.stencils[0].k_loops[0].body[0].body;
        assert_eq!(body.len(), 3);
        let accs: Vec<&str> = body
            .iter()
            .filter_map(|s| match s {
                LoweredStmt::Accumulate { acc, .. } => Some(acc.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(accs, vec!["red_0", "red_1"]);
        match &body[2] {
            LoweredStmt::Assign { value, .. } => assert_eq!(
                *value,
                LoweredExpr::Binary {
                    op: "+".to_string(),
                    lhs: Box::new(LoweredExpr::Temp("red_0".to_string())),
                    rhs: Box::new(LoweredExpr::Temp("red_1".to_string())),
                }
            ),
            other => panic!("expected assign, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_reduction_lands_in_pre() {
        let inner = make_reduction_over_neighbors(
            "+",
            make_offset_field_access("in").unwrap(),
            make_literal("0.0", BuiltinType::Float).unwrap(),
            make_neighbor_chain(vec![LocationType::Cell, LocationType::Edge]).unwrap(),
        )
        .unwrap();
        let outer = make_reduction_over_neighbors(
            "+",
            inner,
            make_literal("0.0", BuiltinType::Float).unwrap(),
            make_neighbor_chain(vec![
                LocationType::Cell,
                LocationType::Edge,
                LocationType::Cell,
            ])
            .unwrap(),
        )
        .unwrap();
        let module = lower_sir(&sir_with_rhs(outer));
        let body = &module.stencils[0].k_loops[0].body[0].body;
        match &body[0] {
            LoweredStmt::Accumulate { acc, pre, rhs, .. } => {
                assert_eq!(acc, "red_1");
                assert_eq!(pre.len(), 1);
                assert!(matches!(&pre[0], LoweredStmt::Accumulate { acc, .. } if acc == "red_0"));
                assert_eq!(*rhs, LoweredExpr::Temp("red_0".to_string()));
            }
            other => panic!("expected accumulate, got {:?}", other),
        }
    }
}
