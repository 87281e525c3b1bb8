//! Naive unstructured C++ backend.
//!
//! Emits one templated class per stencil against a header-only mesh
//! interface: `getCells`/`getEdges`/`getVertices` iterate a location
//! kind, `getNeighbors` walks a location-type chain from an element.
//! Reductions become sequential accumulation loops, so the fold order
//! is the neighbor-table order, left to right.
//!
//! Strict allow-list: unstructured rank-1 fields, reduction operators
//! `+ * min max`, binary operators `+ - * /`, assignment operators
//! `= += -= *= /=`. Anything else fails with `UnsupportedConstruct`
//! before any text is returned.

use super::Backend;
use crate::error::CompileError;
use crate::lower::{
    HorizontalLoop, KLoop, LevelBound, LoweredExpr, LoweredModule, LoweredStencil, LoweredStmt,
};
use crate::sir::{BuiltinType, Direction, FieldDimensions, LocationType, NeighborChain};

pub struct CxxNaiveIco;

impl CxxNaiveIco {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CxxNaiveIco {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for CxxNaiveIco {
    fn name(&self) -> &str {
        "CXXNaiveIco"
    }

    fn output_extension(&self) -> &str {
        ".cpp"
    }

    fn generate(&self, module: &LoweredModule) -> Result<String, CompileError> {
        let mut out = Vec::new();
        out.push("// Generated by the naive unstructured backend. Do not edit.".to_string());
        out.push("#pragma once".to_string());
        out.push(String::new());
        // <algorithm> covers the std::min/std::max reduction folds.
        out.push("#include <algorithm>".to_string());
        out.push(String::new());
        out.push("#include \"unstructured_interface.hpp\"".to_string());
        out.push(String::new());
        out.push("namespace generated {".to_string());
        for stencil in &module.stencils {
            out.push(String::new());
            emit_stencil(stencil, &mut out)?;
        }
        out.push(String::new());
        out.push("} // namespace generated".to_string());
        Ok(out.join("\n") + "\n")
    }
}

fn line(out: &mut Vec<String>, depth: usize, text: impl AsRef<str>) {
    out.push(format!("{}{}", "  ".repeat(depth), text.as_ref()));
}

fn cxx_type(ty: BuiltinType) -> &'static str {
    match ty {
        BuiltinType::Boolean => "bool",
        BuiltinType::Integer => "int",
        // The mesh interface's float type is double precision.
        BuiltinType::Float | BuiltinType::Double => "double",
    }
}

fn field_cxx_type(location: LocationType) -> &'static str {
    match location {
        LocationType::Cell => "cell_field_t<LibTag, double>",
        LocationType::Edge => "edge_field_t<LibTag, double>",
        LocationType::Vertex => "vertex_field_t<LibTag, double>",
    }
}

fn chain_literal(chain: &NeighborChain) -> String {
    let entries: Vec<String> = chain
        .locations()
        .iter()
        .map(|loc| format!("LocationType::{}", loc.plural()))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

fn emit_stencil(stencil: &LoweredStencil, out: &mut Vec<String>) -> Result<(), CompileError> {
    let mut params = Vec::new();
    let mut members = Vec::new();
    let mut inits = vec!["m_mesh(mesh)".to_string(), "m_k_size(k_size)".to_string()];
    for field in &stencil.fields {
        let location = match field.dimensions {
            FieldDimensions::Unstructured { location, rank: 1 } => location,
            FieldDimensions::Unstructured { rank, .. } => {
                return Err(CompileError::unsupported_construct(
                    format!("field '{}' of rank {}", field.name, rank),
                    "CXXNaiveIco",
                ))
            }
            FieldDimensions::Cartesian { .. } => {
                return Err(CompileError::unsupported_construct(
                    format!("Cartesian field '{}'", field.name),
                    "CXXNaiveIco",
                ))
            }
        };
        let ty = field_cxx_type(location);
        params.push(format!("{}& {}", ty, field.name));
        members.push(format!("{}& m_{};", ty, field.name));
        inits.push(format!("m_{}({})", field.name, field.name));
    }

    line(out, 0, "template <typename LibTag>");
    line(out, 0, format!("class {} {{", stencil.name));
    line(out, 0, "private:");
    line(out, 1, "mesh_t<LibTag> const& m_mesh;");
    line(out, 1, "int m_k_size;");
    for member in &members {
        line(out, 1, member);
    }
    line(out, 0, "");
    line(out, 0, "public:");
    let mut signature = format!("{}(mesh_t<LibTag> const& mesh, int k_size", stencil.name);
    for param in &params {
        signature.push_str(", ");
        signature.push_str(param);
    }
    signature.push(')');
    line(out, 1, signature);
    line(out, 2, format!(": {} {{}}", inits.join(", ")));
    line(out, 0, "");
    line(out, 1, "void run() {");
    for k_loop in &stencil.k_loops {
        emit_k_loop(k_loop, out)?;
    }
    line(out, 1, "}");
    line(out, 0, "};");
    Ok(())
}

fn level_expr(bound: LevelBound) -> String {
    match bound {
        LevelBound::FromStart(offset) => format!("{}", offset),
        LevelBound::FromEnd(offset) => {
            // Top level is m_k_size - 1.
            let adjusted = offset - 1;
            if adjusted == 0 {
                "m_k_size".to_string()
            } else if adjusted < 0 {
                format!("m_k_size - {}", -adjusted)
            } else {
                format!("m_k_size + {}", adjusted)
            }
        }
    }
}

fn emit_k_loop(k_loop: &KLoop, out: &mut Vec<String>) -> Result<(), CompileError> {
    let lower = level_expr(k_loop.lower);
    let upper = level_expr(k_loop.upper);
    let header = match k_loop.direction {
        Direction::Forward => format!("for (int k = {}; k <= {}; ++k) {{", lower, upper),
        Direction::Backward => format!("for (int k = {}; k >= {}; --k) {{", upper, lower),
    };
    line(out, 2, header);
    for h_loop in &k_loop.body {
        emit_horizontal_loop(h_loop, out)?;
    }
    line(out, 2, "}");
    Ok(())
}

fn emit_horizontal_loop(h_loop: &HorizontalLoop, out: &mut Vec<String>) -> Result<(), CompileError> {
    let Some(location) = h_loop.location else {
        return Err(CompileError::unsupported_construct(
            "Cartesian iteration space",
            "CXXNaiveIco",
        ));
    };
    line(
        out,
        3,
        format!(
            "for (auto const& loc : get{}(LibTag{{}}, m_mesh)) {{",
            location.plural()
        ),
    );
    for stmt in &h_loop.body {
        emit_stmt(stmt, 4, None, out)?;
    }
    line(out, 3, "}");
    Ok(())
}

/// `nbh_var` is the innermost live neighbor variable, if any; it is
/// what offset field reads resolve to.
fn emit_stmt(
    stmt: &LoweredStmt,
    depth: usize,
    nbh_var: Option<&str>,
    out: &mut Vec<String>,
) -> Result<(), CompileError> {
    match stmt {
        LoweredStmt::Assign { field, op, value } => {
            check_assign_op(op)?;
            let value = emit_expr(value, nbh_var)?;
            line(out, depth, format!("m_{}(loc, k) {} {};", field, op, value));
            Ok(())
        }
        LoweredStmt::Accumulate {
            acc,
            ty,
            init,
            op,
            chain,
            pre,
            rhs,
        } => {
            let init = emit_expr(init, nbh_var)?;
            line(out, depth, format!("{} {} = {};", cxx_type(*ty), acc, init));
            let anchor = nbh_var.unwrap_or("loc");
            let inner_var = match nbh_var {
                None => "nbh".to_string(),
                Some(outer) => format!("{}_i", outer),
            };
            line(
                out,
                depth,
                format!(
                    "for (auto const& {} : getNeighbors(LibTag{{}}, m_mesh, {}, {})) {{",
                    inner_var,
                    chain_literal(chain),
                    anchor
                ),
            );
            for pre_stmt in pre {
                emit_stmt(pre_stmt, depth + 1, Some(&inner_var), out)?;
            }
            let rhs = emit_expr(rhs, Some(&inner_var))?;
            let fold = match op.as_str() {
                "+" | "*" => format!("{} = {} {} {};", acc, acc, op, rhs),
                "min" => format!("{} = std::min({}, {});", acc, acc, rhs),
                "max" => format!("{} = std::max({}, {});", acc, acc, rhs),
                other => {
                    return Err(CompileError::unsupported_construct(
                        format!("reduction operator '{}'", other),
                        "CXXNaiveIco",
                    ))
                }
            };
            line(out, depth + 1, fold);
            line(out, depth, "}");
            Ok(())
        }
    }
}

fn check_assign_op(op: &str) -> Result<(), CompileError> {
    match op {
        "=" | "+=" | "-=" | "*=" | "/=" => Ok(()),
        other => Err(CompileError::unsupported_construct(
            format!("assignment operator '{}'", other),
            "CXXNaiveIco",
        )),
    }
}

fn emit_expr(expr: &LoweredExpr, nbh_var: Option<&str>) -> Result<String, CompileError> {
    match expr {
        LoweredExpr::Literal { value, .. } => Ok(value.clone()),
        LoweredExpr::Temp(name) => Ok(name.clone()),
        LoweredExpr::FieldAt { field, at_neighbor } => {
            let element = if *at_neighbor {
                nbh_var.ok_or_else(|| {
                    CompileError::unsupported_construct(
                        format!("offset access to '{}' outside a neighbor loop", field),
                        "CXXNaiveIco",
                    )
                })?
            } else {
                "loc"
            };
            Ok(format!("m_{}({}, k)", field, element))
        }
        LoweredExpr::Binary { op, lhs, rhs } => {
            match op.as_str() {
                "+" | "-" | "*" | "/" => {}
                other => {
                    return Err(CompileError::unsupported_construct(
                        format!("binary operator '{}'", other),
                        "CXXNaiveIco",
                    ))
                }
            }
            let lhs = emit_expr(lhs, nbh_var)?;
            let rhs = emit_expr(rhs, nbh_var)?;
            Ok(format!("({} {} {})", lhs, op, rhs))
        }
    }
}
