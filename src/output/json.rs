// Fri Jan 16 2026 - Alex

use crate::decompiler::{DecompilationResult, DecompiledModule, ModuleAnalysis};
use serde::Serialize;
use serde_json::{to_string, to_string_pretty};

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub input: &'a str,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<&'a DecompiledModule>,
    /// Only present for the annotated fallback, which has no module.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<&'a str>,
    pub warnings: &'a [String],
}

impl<'a> JsonReport<'a> {
    pub fn new(input: &'a str, result: &'a DecompilationResult) -> Self {
        Self {
            input,
            success: result.success,
            module: result.module.as_ref(),
            fallback: if result.is_fallback() {
                Some(result.source.as_str())
            } else {
                None
            },
            warnings: &result.warnings,
        }
    }
}

#[derive(Debug, Serialize)]
struct AnalysisReport<'a> {
    input: &'a str,
    #[serde(flatten)]
    analysis: &'a ModuleAnalysis,
}

pub struct JsonSerializer {
    pretty_print: bool,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self { pretty_print: true }
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    fn to_json<T: Serialize>(&self, value: &T) -> serde_json::Result<String> {
        if self.pretty_print {
            to_string_pretty(value)
        } else {
            to_string(value)
        }
    }

    pub fn serialize_result(&self, input: &str, result: &DecompilationResult) -> serde_json::Result<String> {
        self.to_json(&JsonReport::new(input, result))
    }

    pub fn serialize_analysis(&self, input: &str, analysis: &ModuleAnalysis) -> serde_json::Result<String> {
        self.to_json(&AnalysisReport { input, analysis })
    }
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::new()
    }
}
