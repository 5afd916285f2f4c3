// Fri Jan 16 2026 - Alex

pub mod analysis;
pub mod error;
pub mod extractor;
pub mod interpreter;
pub mod model;
pub mod naming;
pub mod opcode;
pub mod renderer;
pub mod signature;
pub mod tokenizer;

pub use analysis::{FunctionMetrics, ModuleAnalysis};
pub use error::{DecompileError, DecompileResult};
pub use model::{DecompiledFunction, DecompiledModule, FunctionBlock, StructBlock, Visibility};

use crate::config::DecompilerConfig;
use crate::utils::logging::ScopedTimer;
use interpreter::{interpret, InterpreterOptions};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

pub const UNKNOWN_MODULE: &str = "unknown";

/// Output of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct Decompilation {
    pub source: String,
    pub module: DecompiledModule,
    pub warnings: Vec<String>,
    pub analysis: ModuleAnalysis,
}

#[derive(Debug, Clone)]
pub struct DecompilationResult {
    pub source: String,
    pub warnings: Vec<String>,
    pub success: bool,
    /// `None` when the annotated fallback was produced.
    pub module: Option<DecompiledModule>,
    pub analysis: ModuleAnalysis,
}

impl DecompilationResult {
    pub fn new() -> Self {
        Self {
            source: String::new(),
            warnings: Vec::new(),
            success: false,
            module: None,
            analysis: ModuleAnalysis::new(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_fallback(&self) -> bool {
        self.module.is_none()
    }
}

impl Default for DecompilationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Decompilation> for DecompilationResult {
    fn from(d: Decompilation) -> Self {
        Self {
            source: d.source,
            warnings: d.warnings,
            success: true,
            module: Some(d.module),
            analysis: d.analysis,
        }
    }
}

impl fmt::Display for DecompilationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)?;
        if !self.warnings.is_empty() {
            writeln!(f, "\n// Warnings:")?;
            for warn in &self.warnings {
                writeln!(f, "// {}", warn)?;
            }
        }
        Ok(())
    }
}

/// Move disassembly to pseudo-source decompiler
#[derive(Debug, Clone, Default)]
pub struct Decompiler {
    config: DecompilerConfig,
}

impl Decompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: DecompilerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DecompilerConfig {
        &self.config
    }

    fn interpreter_options(&self) -> InterpreterOptions {
        InterpreterOptions {
            emit_branch_comments: self.config.emit_branch_comments,
            keep_type_arguments: self.config.keep_type_arguments,
            max_vector_elements: self.config.max_instructions_per_function,
        }
    }

    /// Runs the pipeline and reports internal failures as errors.
    pub fn try_decompile(&self, text: &str) -> DecompileResult<Decompilation> {
        if text.trim().is_empty() {
            return Err(DecompileError::EmptyInput);
        }

        let extracted = {
            let _timer = ScopedTimer::new("extract");
            extractor::extract(text)
        };
        log::debug!(
            "extracted {} struct(s) and {} function(s)",
            extracted.structs.len(),
            extracted.functions.len()
        );

        let _timer = ScopedTimer::new("interpret");
        let options = self.interpreter_options();
        let limit = self.config.max_instructions_per_function;
        let mut analysis = ModuleAnalysis::new();
        let mut warnings = Vec::new();
        let mut functions = Vec::with_capacity(extracted.functions.len());

        for block in &extracted.functions {
            let body = tokenizer::tokenize(&block.body_lines);
            if body.instructions.len() > limit {
                return Err(DecompileError::FunctionTooLarge {
                    name: block.name.clone(),
                    count: body.instructions.len(),
                    limit,
                });
            }

            let interpreted = interpret(block, &body, options);

            for name in &interpreted.unknown_opcodes {
                warnings.push(format!("{}: skipped unknown opcode {}", block.name, name));
            }
            if interpreted.unresolved_operands > 0 {
                warnings.push(format!(
                    "{}: {} unresolved operand(s) rendered as ?",
                    block.name, interpreted.unresolved_operands
                ));
            }
            if interpreted.leftover_stack > 0 {
                warnings.push(format!(
                    "{}: {} value(s) left on the stack",
                    block.name, interpreted.leftover_stack
                ));
            }

            let metrics = FunctionMetrics::from_instructions(&block.name, &body.instructions)
                .with_leftover_stack(interpreted.leftover_stack);
            analysis.record_function(metrics, &body.instructions);
            functions.push(interpreted.function);
        }

        let module = DecompiledModule {
            module_name: extracted
                .module_name
                .unwrap_or_else(|| UNKNOWN_MODULE.to_string()),
            uses: extracted.uses,
            constants: extracted.constants,
            structs: extracted.structs,
            functions,
        };

        let source = renderer::render_module(&module, &self.config);

        Ok(Decompilation {
            source,
            module,
            warnings,
            analysis,
        })
    }

    /// Always produces output: pipeline failures and panics fall back to
    /// the annotated listing.
    pub fn decompile(&self, text: &str) -> DecompilationResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.try_decompile(text)));

        let error = match outcome {
            Ok(Ok(decompilation)) => return decompilation.into(),
            Ok(Err(err)) => err,
            Err(payload) => DecompileError::Internal(panic_message(payload.as_ref())),
        };

        log::warn!("falling back to annotated disassembly: {}", error);
        DecompilationResult {
            source: self.annotate(text),
            warnings: vec![error.to_string()],
            success: false,
            module: None,
            analysis: ModuleAnalysis::new(),
        }
    }

    pub fn annotate(&self, text: &str) -> String {
        renderer::annotate_fallback(text)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub fn decompile(text: &str) -> DecompilationResult {
    Decompiler::new().decompile(text)
}
