// Fri Jan 16 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompileError {
    #[error("Input contains no disassembly text")]
    EmptyInput,
    #[error("Function {name} has {count} instructions (limit {limit})")]
    FunctionTooLarge {
        name: String,
        count: usize,
        limit: usize,
    },
    #[error("Decompilation failed: {0}")]
    Internal(String),
}

pub type DecompileResult<T> = Result<T, DecompileError>;
