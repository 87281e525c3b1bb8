//! Code generation backends.
//!
//! A `Backend` consumes the lowered tree and produces the generated
//! source text for one artifact. Backends are selected by name; an
//! unknown name is `UnsupportedBackend`, and a lowered node outside a
//! backend's allow-list is `UnsupportedConstruct`. Emission is all or
//! nothing.

mod cxx_naive_ico;

use crate::error::CompileError;
use crate::lower::LoweredModule;

pub use cxx_naive_ico::CxxNaiveIco;

/// Name of the only backend this crate registers.
pub const CXX_NAIVE_ICO: &str = "CXXNaiveIco";

/// Generates target source text from a lowered module.
pub trait Backend {
    /// Backend selector name (e.g. "CXXNaiveIco").
    fn name(&self) -> &str;
    /// File extension for generated output (e.g. ".cpp").
    fn output_extension(&self) -> &str;
    /// Emit the whole module, or fail without partial output.
    fn generate(&self, module: &LoweredModule) -> Result<String, CompileError>;
}

impl std::fmt::Debug for dyn Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").field("name", &self.name()).finish()
    }
}

/// Create the backend registered under `name`.
pub fn create_backend(name: &str) -> Result<Box<dyn Backend>, CompileError> {
    match name {
        CXX_NAIVE_ICO | "cxx-naive-ico" => Ok(Box::new(CxxNaiveIco::new())),
        other => Err(CompileError::unsupported_backend(other)),
    }
}
