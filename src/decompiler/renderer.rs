// Fri Jan 16 2026 - Alex

use crate::config::DecompilerConfig;
use crate::decompiler::model::{DecompiledFunction, DecompiledModule, StructBlock};
use crate::decompiler::opcode::Opcode;
use crate::decompiler::tokenizer::parse_instruction;
use crate::utils::string::StringUtils;
use itertools::Itertools;
use std::fmt::Write;

pub const HEADER_COMMENT: &str = "// Decompiled from Move bytecode disassembly";
pub const EMPTY_BODY_COMMENT: &str = "// no statements produced";

/// Writes pseudo-source for a whole module.
pub struct Renderer<'a> {
    config: &'a DecompilerConfig,
    out: String,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a DecompilerConfig) -> Self {
        Self {
            config,
            out: String::new(),
        }
    }

    fn indent(&self, level: usize) -> String {
        StringUtils::indent(level, self.config.indent_size)
    }

    fn line(&mut self, level: usize, text: &str) {
        let indent = self.indent(level);
        let _ = writeln!(self.out, "{}{}", indent, text);
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    pub fn render(mut self, module: &DecompiledModule) -> String {
        if self.config.emit_header_comment {
            self.line(0, HEADER_COMMENT);
        }
        self.line(0, &format!("module {} {{", module.module_name));

        let mut sections = 0;

        if self.config.render_use_declarations && !module.uses.is_empty() {
            for decl in &module.uses {
                self.line(1, &format!("use {};", decl.path));
            }
            sections += 1;
        }

        if !module.constants.is_empty() {
            if sections > 0 {
                self.blank();
            }
            for constant in &module.constants {
                self.line(
                    1,
                    &format!("const {}: {} = {};", constant.name, constant.const_type, constant.value),
                );
            }
            sections += 1;
        }

        for block in &module.structs {
            if sections > 0 {
                self.blank();
            }
            self.render_struct(block);
            sections += 1;
        }

        for function in &module.functions {
            if sections > 0 {
                self.blank();
            }
            self.render_function(function);
            sections += 1;
        }

        self.line(0, "}");
        self.out
    }

    fn render_struct(&mut self, block: &StructBlock) {
        let mut header = format!("struct {}", block.name);
        if !block.type_parameters.is_empty() {
            let _ = write!(header, "<{}>", block.type_parameters.join(", "));
        }
        if !block.abilities.is_empty() {
            let _ = write!(header, " has {}", block.abilities.iter().join(", "));
        }

        if block.fields.is_empty() {
            self.line(1, &format!("{} {{}}", header));
            return;
        }

        self.line(1, &format!("{} {{", header));
        for field in &block.fields {
            self.line(2, &format!("{}: {},", field.name, field.field_type));
        }
        self.line(1, "}");
    }

    fn render_function(&mut self, function: &DecompiledFunction) {
        self.line(1, &format!("{} {{", function_header(function)));

        if function.statements.is_empty() {
            self.line(2, EMPTY_BODY_COMMENT);
        } else {
            for statement in &function.statements {
                self.line(2, statement);
            }
        }

        self.line(1, "}");
    }
}

pub fn function_header(function: &DecompiledFunction) -> String {
    let mut header = format!("{}fun {}", function.visibility.keyword(), function.name);

    if !function.type_parameters.is_empty() {
        let _ = write!(header, "<{}>", function.type_parameters.join(", "));
    }

    let params = function
        .parameters
        .iter()
        .map(|p| format!("{}: {}", p.name, p.param_type))
        .join(", ");
    let _ = write!(header, "({})", params);

    let ret = function.return_type.trim();
    if !ret.is_empty() && ret != "()" {
        let _ = write!(header, ": {}", ret);
    }

    header
}

pub fn render_module(module: &DecompiledModule, config: &DecompilerConfig) -> String {
    Renderer::new(config).render(module)
}

/// Degraded output: every input line kept verbatim, recognized
/// instructions followed by a short comment.
pub fn annotate_fallback(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 2);

    for line in text.lines() {
        out.push_str(line);
        if let Some(record) = parse_instruction(line) {
            if !matches!(record.opcode, Opcode::Unknown(_)) {
                let _ = write!(out, "  // {}", record.opcode.describe());
            }
        }
        out.push('\n');
    }

    out
}
