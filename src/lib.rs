pub mod api;
pub mod codegen;
pub mod error;
pub mod lower;
pub mod sir;
pub mod validate;

pub use api::*;
pub use error::{CompileError, NodePath};
