// Fri Jan 16 2026 - Alex

pub mod config;
pub mod decompiler;
pub mod output;
pub mod ui;
pub mod utils;

pub use config::{ConfigError, DecompilerConfig};
pub use decompiler::{
    decompile, DecompilationResult, DecompileError, DecompiledModule, Decompiler, ModuleAnalysis,
};
pub use output::OutputFormat;
