// Fri Jan 16 2026 - Alex

pub mod json;

pub use json::{JsonReport, JsonSerializer};

use crate::decompiler::DecompilationResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const STDIN_NAME: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "move",
            OutputFormat::Json => "json",
        }
    }

    pub fn render(&self, input: &str, result: &DecompilationResult) -> serde_json::Result<String> {
        match self {
            OutputFormat::Text => Ok(result.to_string()),
            OutputFormat::Json => JsonSerializer::new().serialize_result(input, result),
        }
    }
}

/// Where the output for `input` goes. `None` means standard output.
///
/// With several inputs `target` is a directory and each input gets
/// `<stem>.<ext>` inside it; with one input `target` is the file itself
/// unless it names an existing directory.
pub fn output_path_for(
    input: &Path,
    target: Option<&Path>,
    format: OutputFormat,
    multiple: bool,
) -> Option<PathBuf> {
    let target = target?;

    if !multiple && !target.is_dir() {
        return Some(target.to_path_buf());
    }

    let stem = if input.as_os_str() == STDIN_NAME {
        "stdin".to_string()
    } else {
        input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "module".to_string())
    };

    Some(target.join(format!("{}.{}", stem, format.extension())))
}
