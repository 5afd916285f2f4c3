// Fri Jan 16 2026 - Alex

use crate::decompiler::opcode::Opcode;
use crate::decompiler::tokenizer::InstructionRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-function metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionMetrics {
    pub name: String,
    pub instruction_count: usize,
    pub branch_count: usize,
    pub call_count: usize,
    pub complexity: f64,
    pub leftover_stack: usize,
}

impl FunctionMetrics {
    pub fn from_instructions(name: &str, instructions: &[InstructionRecord]) -> Self {
        let branch_count = instructions.iter().filter(|r| r.opcode.is_branch()).count();
        let call_count = instructions.iter().filter(|r| r.opcode == Opcode::Call).count();

        Self {
            name: name.to_string(),
            instruction_count: instructions.len(),
            branch_count,
            call_count,
            complexity: 1.0 + branch_count as f64 + 0.5 * call_count as f64,
            leftover_stack: 0,
        }
    }

    pub fn with_leftover_stack(mut self, leftover: usize) -> Self {
        self.leftover_stack = leftover;
        self
    }
}

/// Opcode statistics for one decompiled module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleAnalysis {
    pub instruction_count: usize,
    pub family_frequency: BTreeMap<String, usize>,
    pub unknown_opcodes: BTreeMap<String, usize>,
    pub functions: Vec<FunctionMetrics>,
}

impl ModuleAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_function(&mut self, metrics: FunctionMetrics, instructions: &[InstructionRecord]) {
        for record in instructions {
            *self
                .family_frequency
                .entry(record.opcode.family().to_string())
                .or_default() += 1;

            if let Opcode::Unknown(name) = &record.opcode {
                *self.unknown_opcodes.entry(name.clone()).or_default() += 1;
            }
        }

        self.instruction_count += instructions.len();
        self.functions.push(metrics);
    }

    pub fn most_common_families(&self, n: usize) -> Vec<(String, usize)> {
        let mut sorted: Vec<_> = self
            .family_frequency
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        sorted.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
        sorted.truncate(n);
        sorted
    }

    pub fn total_complexity(&self) -> f64 {
        self.functions.iter().map(|f| f.complexity).sum()
    }

    pub fn most_complex(&self) -> Option<&FunctionMetrics> {
        self.functions
            .iter()
            .max_by(|a, b| a.complexity.total_cmp(&b.complexity))
    }

    /// Functions whose reconstruction left fragments on the stack.
    pub fn incomplete_functions(&self) -> Vec<&str> {
        self.functions
            .iter()
            .filter(|f| f.leftover_stack > 0)
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn unknown_count(&self) -> usize {
        self.unknown_opcodes.values().sum()
    }
}
