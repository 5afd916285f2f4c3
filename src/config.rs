// Fri Jan 16 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MAX_INDENT_SIZE: usize = 16;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid config: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompilerConfig {
    pub indent_size: usize,
    pub emit_header_comment: bool,
    pub emit_branch_comments: bool,
    pub keep_type_arguments: bool,
    pub render_use_declarations: bool,
    pub max_instructions_per_function: usize,
    pub jobs: usize,
}

impl Default for DecompilerConfig {
    fn default() -> Self {
        Self {
            indent_size: 4,
            emit_header_comment: true,
            emit_branch_comments: true,
            keep_type_arguments: false,
            render_use_declarations: true,
            max_instructions_per_function: 100_000,
            jobs: num_cpus::get(),
        }
    }
}

impl DecompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent_size(mut self, size: usize) -> Self {
        self.indent_size = size;
        self
    }

    pub fn with_header_comment(mut self, enabled: bool) -> Self {
        self.emit_header_comment = enabled;
        self
    }

    pub fn with_branch_comments(mut self, enabled: bool) -> Self {
        self.emit_branch_comments = enabled;
        self
    }

    pub fn with_type_arguments(mut self, keep: bool) -> Self {
        self.keep_type_arguments = keep;
        self
    }

    pub fn with_use_declarations(mut self, enabled: bool) -> Self {
        self.render_use_declarations = enabled;
        self
    }

    pub fn with_max_instructions(mut self, limit: usize) -> Self {
        self.max_instructions_per_function = limit;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !ext.eq_ignore_ascii_case("json") {
            return Err(ConfigError::UnsupportedFormat(ext.to_string()));
        }

        let contents = fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;

        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        if !ext.eq_ignore_ascii_case("json") {
            return Err(ConfigError::UnsupportedFormat(ext.to_string()));
        }

        let contents =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indent_size > MAX_INDENT_SIZE {
            return Err(ConfigError::Validation(format!(
                "indent_size must be at most {}",
                MAX_INDENT_SIZE
            )));
        }
        if self.max_instructions_per_function == 0 {
            return Err(ConfigError::Validation(
                "max_instructions_per_function must be greater than 0".to_string(),
            ));
        }
        if self.jobs == 0 {
            return Err(ConfigError::Validation("jobs must be greater than 0".to_string()));
        }
        Ok(())
    }
}
