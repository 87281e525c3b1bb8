//! SIR, the Stencil Intermediate Representation.
//!
//! The SIR is the serializable description of one or more mesh stencils:
//! declared fields, a vertical region, and an AST of assignments whose
//! right-hand sides may reduce over mesh neighbors.
//!
//! Pipeline:
//! ```text
//! builder → Sir ─→ serialize   → Vec<u8>   (canonical wire form)
//!               ├→ validate    → ()         (cross-entity invariants)
//!               └→ lower       → LoweredModule → Backend → String
//! ```
//!
//! Every entity is an immutable value object: built once, serialized,
//! and consumed read-only by the driver. Polymorphic nodes (`Expr`,
//! `Stmt`, `FieldDimensions`) are tagged unions with an explicit
//! `"kind"` tag on the wire so the format stays self-describing.

pub mod builder;
pub mod serialize;

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Mesh locations ───────────────────────────────────────────────

/// A mesh location kind. Anchors a field and forms neighbor chains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationType {
    Cell,
    Edge,
    Vertex,
}

impl LocationType {
    /// Plural spelling used by mesh accessors in generated code.
    pub fn plural(&self) -> &'static str {
        match self {
            LocationType::Cell => "Cells",
            LocationType::Edge => "Edges",
            LocationType::Vertex => "Vertices",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationType::Cell => write!(f, "Cell"),
            LocationType::Edge => write!(f, "Edge"),
            LocationType::Vertex => write!(f, "Vertex"),
        }
    }
}

/// An ordered traversal path across mesh location kinds, e.g.
/// Cell->Edge->Cell. Adjacency of consecutive entries is a cross-entity
/// invariant checked by the driver, not here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborChain(Vec<LocationType>);

impl NeighborChain {
    /// Wrap a raw location list. Callers go through
    /// [`builder::make_neighbor_chain`] for the non-empty check.
    pub(crate) fn from_vec(locations: Vec<LocationType>) -> Self {
        NeighborChain(locations)
    }

    pub fn locations(&self) -> &[LocationType] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Location kind the traversal starts from.
    pub fn source(&self) -> Option<LocationType> {
        self.0.first().copied()
    }

    /// Location kind the traversal ends at.
    pub fn target(&self) -> Option<LocationType> {
        self.0.last().copied()
    }
}

impl fmt::Display for NeighborChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, loc) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "->")?;
            }
            write!(f, "{}", loc)?;
        }
        Ok(())
    }
}

// ─── Expressions ──────────────────────────────────────────────────

/// Declared type of a literal. The literal's source spelling is kept
/// verbatim; this tag decides the emitted accumulator/operand type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuiltinType {
    Boolean,
    Integer,
    Float,
    Double,
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuiltinType::Boolean => write!(f, "Boolean"),
            BuiltinType::Integer => write!(f, "Integer"),
            BuiltinType::Float => write!(f, "Float"),
            BuiltinType::Double => write!(f, "Double"),
        }
    }
}

/// A read of a declared field.
///
/// `horizontal_offset = false` reads the primary (iteration) element;
/// `true` reads the iterated neighbor element and is only legal inside
/// a reduction body (checked by the driver).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAccess {
    pub field: String,
    pub horizontal_offset: bool,
}

/// An expression. Closed variant set; lowering and codegen match
/// exhaustively so a new variant fails to compile until handled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Expr {
    FieldAccess(FieldAccess),
    Literal {
        value: String,
        ty: BuiltinType,
    },
    /// Fold `op` left-to-right over the neighbor set reached via
    /// `chain`, seeded with `init`, evaluating `rhs` per neighbor.
    ReductionOverNeighbors {
        op: String,
        rhs: Box<Expr>,
        init: Box<Expr>,
        chain: NeighborChain,
    },
    Binary {
        op: String,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::FieldAccess(access) => {
                if access.horizontal_offset {
                    write!(f, "{}[nbh]", access.field)
                } else {
                    write!(f, "{}", access.field)
                }
            }
            Expr::Literal { value, .. } => write!(f, "{}", value),
            Expr::ReductionOverNeighbors {
                op,
                rhs,
                init,
                chain,
            } => write!(f, "reduce({}, {}, init={}, {})", op, rhs, init, chain),
            Expr::Binary { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
        }
    }
}

// ─── Statements ───────────────────────────────────────────────────

/// Sentinel level marker for interval bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelMarker {
    Start,
    End,
}

/// One interval bound: a level marker plus an integer offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bound {
    pub marker: LevelMarker,
    pub offset: i32,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.marker {
            LevelMarker::Start => "Start",
            LevelMarker::End => "End",
        };
        if self.offset >= 0 {
            write!(f, "{}+{}", marker, self.offset)
        } else {
            write!(f, "{}{}", marker, self.offset)
        }
    }
}

/// A vertical interval: lower and upper bound, both inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: Bound,
    pub upper: Bound,
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

/// Vertical traversal direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "Forward"),
            Direction::Backward => write!(f, "Backward"),
        }
    }
}

/// `left op right`, e.g. `out = reduce(...)`. The left-hand side is a
/// typed [`FieldAccess`], not a general expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssignmentStmt {
    pub left: FieldAccess,
    pub op: String,
    pub right: Expr,
}

/// Scopes a body of statements to a vertical interval and direction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerticalRegionStmt {
    pub body: Vec<Stmt>,
    pub interval: Interval,
    pub direction: Direction,
}

/// A statement. Top-level stencil statements must be vertical regions;
/// region bodies must be assignments (checked by the driver).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Stmt {
    Assignment(AssignmentStmt),
    VerticalRegion(VerticalRegionStmt),
}

// ─── Fields and stencils ──────────────────────────────────────────

/// Dimensionality descriptor of a field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum FieldDimensions {
    Cartesian { rank: u32 },
    Unstructured { location: LocationType, rank: u32 },
}

/// A declared field. Names are unique within a stencil (checked by the
/// driver).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub dimensions: FieldDimensions,
}

/// A named computation over declared fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stencil {
    pub name: String,
    pub fields: Vec<Field>,
    pub ast: Vec<Stmt>,
}

/// Grid flavor of the whole SIR. Must be consistent with every field's
/// dimensionality kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridType {
    Structured,
    Unstructured,
}

impl fmt::Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridType::Structured => write!(f, "Structured"),
            GridType::Unstructured => write!(f, "Unstructured"),
        }
    }
}

/// Top-level SIR: declared output filename, grid flavor, stencils.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sir {
    pub filename: String,
    pub grid_type: GridType,
    pub stencils: Vec<Stencil>,
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        assert_eq!(format!("{}", LocationType::Cell), "Cell");
        assert_eq!(format!("{}", LocationType::Edge), "Edge");
        assert_eq!(format!("{}", LocationType::Vertex), "Vertex");
        assert_eq!(LocationType::Cell.plural(), "Cells");
        assert_eq!(LocationType::Vertex.plural(), "Vertices");
    }

    #[test]
    fn test_chain_endpoints() {
        let chain = NeighborChain::from_vec(vec![
            LocationType::Cell,
            LocationType::Edge,
            LocationType::Cell,
        ]);
        assert_eq!(chain.source(), Some(LocationType::Cell));
        assert_eq!(chain.target(), Some(LocationType::Cell));
        assert_eq!(chain.len(), 3);
        assert_eq!(format!("{}", chain), "Cell->Edge->Cell");
    }

    #[test]
    fn test_bound_display() {
        let b = Bound {
            marker: LevelMarker::Start,
            offset: 0,
        };
        assert_eq!(format!("{}", b), "Start+0");
        let b = Bound {
            marker: LevelMarker::End,
            offset: -1,
        };
        assert_eq!(format!("{}", b), "End-1");
    }

    #[test]
    fn test_expr_display() {
        let expr = Expr::ReductionOverNeighbors {
            op: "+".to_string(),
            rhs: Box::new(Expr::FieldAccess(FieldAccess {
                field: "in".to_string(),
                horizontal_offset: true,
            })),
            init: Box::new(Expr::Literal {
                value: "1.0".to_string(),
                ty: BuiltinType::Float,
            }),
            chain: NeighborChain::from_vec(vec![
                LocationType::Cell,
                LocationType::Edge,
                LocationType::Cell,
            ]),
        };
        assert_eq!(
            format!("{}", expr),
            "reduce(+, in[nbh], init=1.0, Cell->Edge->Cell)"
        );
    }

    #[test]
    fn test_interval_display() {
        let interval = Interval {
            lower: Bound {
                marker: LevelMarker::Start,
                offset: 0,
            },
            upper: Bound {
                marker: LevelMarker::End,
                offset: 0,
            },
        };
        assert_eq!(format!("{}", interval), "[Start+0, End+0]");
    }
}
