//! Public compiler API.
//!
//! `compile` is the driver entry point: deserialize, validate, lower,
//! generate. It is a pure function of its inputs, with no global state
//! or caches, so independent calls are safe to run on parallel threads
//! and identical inputs always produce byte-identical output.


use crate::codegen::{create_backend, CXX_NAIVE_ICO};
use crate::error::CompileError;
use crate::lower::lower_sir;
use crate::sir::serialize::deserialize;
use crate::sir::Sir;
use crate::validate::validate_sir;

/// Options controlling one compilation. Output naming stays with the
/// caller: the SIR's declared filename is data, not ambient state.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// Backend selector name.
    pub backend: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            backend: CXX_NAIVE_ICO.to_string(),
        }
    }
}

impl CompileOptions {
    pub fn for_backend(backend: &str) -> Self {
        Self {
            backend: backend.to_string(),
        }
    }
}

/// Compile serialized SIR bytes to generated source text.
pub fn compile(bytes: &[u8], backend: &str) -> Result<String, CompileError> {
    compile_with_options(bytes, &CompileOptions::for_backend(backend))
}

/// Compile serialized SIR bytes with options.
pub fn compile_with_options(
    bytes: &[u8],
    options: &CompileOptions,
) -> Result<String, CompileError> {
    let sir = deserialize(bytes)?;
    compile_sir(&sir, &options.backend)
}

/// Compile an already-deserialized SIR.
pub fn compile_sir(sir: &Sir, backend: &str) -> Result<String, CompileError> {
    validate_sir(sir)?;
    let backend = create_backend(backend)?;
    let module = lower_sir(sir);
    backend.generate(&module)
}

/// Deserialize and validate only (no code emission).
pub fn check(bytes: &[u8]) -> Result<(), CompileError> {
    let sir = deserialize(bytes)?;
    validate_sir(&sir)
}
