//! Compiler error taxonomy.
//!
//! Every failure mode of the pipeline is one variant of [`CompileError`].
//! Semantic errors carry a [`NodePath`] identifying the offending
//! stencil/statement/expression, since the input is a serialized blob
//! with no source spans to point at.

use std::fmt;

/// Breadcrumb path to an IR node, innermost segment last.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path rooted at a stencil.
    pub fn stencil(name: &str) -> Self {
        NodePath {
            segments: vec![format!("stencil '{}'", name)],
        }
    }

    /// Extend the path with one segment, returning the child path.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        NodePath { segments }
    }

    /// Child path for the `index`-th statement at the current level.
    pub fn statement(&self, index: usize) -> Self {
        self.child(format!("statement {}", index))
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, " > ")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// All errors the pipeline can produce. Deterministic given the input;
/// retrying without changing the input is pointless.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileError {
    /// Malformed constructor input, caught at build time.
    InvalidArgument { message: String },
    /// Wire bytes do not match the expected schema.
    MalformedInput { message: String },
    /// Validated IR violates a cross-entity invariant.
    Semantic { message: String, path: NodePath },
    /// Backend selector names no registered backend.
    UnsupportedBackend { name: String },
    /// Lowered tree contains a node outside the backend's allow-list.
    UnsupportedConstruct { construct: String, backend: String },
}

impl CompileError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CompileError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn malformed_input(message: impl Into<String>) -> Self {
        CompileError::MalformedInput {
            message: message.into(),
        }
    }

    pub fn semantic(message: impl Into<String>, path: NodePath) -> Self {
        CompileError::Semantic {
            message: message.into(),
            path,
        }
    }

    pub fn unsupported_backend(name: impl Into<String>) -> Self {
        CompileError::UnsupportedBackend { name: name.into() }
    }

    pub fn unsupported_construct(
        construct: impl Into<String>,
        backend: impl Into<String>,
    ) -> Self {
        CompileError::UnsupportedConstruct {
            construct: construct.into(),
            backend: backend.into(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::InvalidArgument { message } => {
                write!(f, "invalid argument: {}", message)
            }
            CompileError::MalformedInput { message } => {
                write!(f, "malformed input: {}", message)
            }
            CompileError::Semantic { message, path } => {
                if path.is_empty() {
                    write!(f, "semantic error: {}", message)
                } else {
                    write!(f, "semantic error at {}: {}", path, message)
                }
            }
            CompileError::UnsupportedBackend { name } => {
                write!(f, "unsupported backend: '{}'", name)
            }
            CompileError::UnsupportedConstruct { construct, backend } => {
                write!(
                    f,
                    "unsupported construct for backend '{}': {}",
                    backend, construct
                )
            }
        }
    }
}

impl std::error::Error for CompileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = NodePath::stencil("copy").statement(0).child("reduce");
        assert_eq!(format!("{}", path), "stencil 'copy' > statement 0 > reduce");
    }

    #[test]
    fn test_path_child_does_not_mutate_parent() {
        let parent = NodePath::stencil("s");
        let _child = parent.statement(3);
        assert_eq!(format!("{}", parent), "stencil 's'");
    }

    #[test]
    fn test_semantic_display() {
        let err = CompileError::semantic(
            "field 'in' is not declared",
            NodePath::stencil("copy").statement(1),
        );
        assert_eq!(
            format!("{}", err),
            "semantic error at stencil 'copy' > statement 1: field 'in' is not declared"
        );
    }

    #[test]
    fn test_semantic_display_without_path() {
        let err = CompileError::semantic("empty SIR", NodePath::new());
        assert_eq!(format!("{}", err), "semantic error: empty SIR");
    }

    #[test]
    fn test_other_variant_display() {
        assert_eq!(
            format!("{}", CompileError::unsupported_backend("DoesNotExist")),
            "unsupported backend: 'DoesNotExist'"
        );
        assert_eq!(
            format!(
                "{}",
                CompileError::unsupported_construct("Cartesian field 'f'", "CXXNaiveIco")
            ),
            "unsupported construct for backend 'CXXNaiveIco': Cartesian field 'f'"
        );
        assert_eq!(
            format!("{}", CompileError::invalid_argument("empty field name")),
            "invalid argument: empty field name"
        );
        assert_eq!(
            format!("{}", CompileError::malformed_input("unknown kind tag")),
            "malformed input: unknown kind tag"
        );
    }
}
