// Fri Jan 16 2026 - Alex

//! Single left-to-right pass over one function body. Every opcode family
//! has a fixed stack effect; branches become comments and nothing is ever
//! revisited, so the pass always terminates.

use crate::decompiler::model::{DecompiledFunction, FunctionBlock, Parameter};
use crate::decompiler::naming::{infer_name, NameAllocator, NamingContext};
use crate::decompiler::opcode::Opcode;
use crate::decompiler::signature::{base_type_name, return_arity, CallSignature};
use crate::decompiler::tokenizer::{tokenize, InstructionRecord, LocalDecl, TokenizedBody};
use crate::utils::string::sanitize_identifier;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Rendered in place of any operand that could not be resolved.
pub const PLACEHOLDER: &str = "?";

/// Longer stack underflows collapse into a single placeholder.
const MAX_PLACEHOLDER_RUN: usize = 16;

pub const DEFAULT_MAX_VECTOR_ELEMENTS: usize = 100_000;

static ARG_SLOT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Arg(\d+)$").expect("arg slot pattern"));
static LOC_SLOT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^loc(\d+)$").expect("local slot pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Arg(usize),
    Local(usize),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Arg(n) => write!(f, "Arg{}", n),
            Slot::Local(n) => write!(f, "L{}", n),
        }
    }
}

/// Slot -> display name for one function. Entries are only ever added.
#[derive(Debug, Clone, Default)]
pub struct LocalsTable {
    names: IndexMap<Slot, String>,
    allocator: NameAllocator,
}

impl LocalsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.names.get(&slot).map(String::as_str)
    }

    /// Returns the existing name for `slot`, or allocates one from `base`.
    pub fn bind(&mut self, slot: Slot, base: &str) -> String {
        if let Some(name) = self.names.get(&slot) {
            return name.clone();
        }
        let name = self.allocator.allocate(base);
        self.names.insert(slot, name.clone());
        name
    }

    /// Allocates a name that is not bound to any slot.
    pub fn temporary(&mut self, base: &str) -> String {
        self.allocator.allocate(base)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Slot, &String)> {
        self.names.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterOptions {
    pub emit_branch_comments: bool,
    pub keep_type_arguments: bool,
    /// Upper bound on the element count read from `VecPack`/`VecUnpack`.
    pub max_vector_elements: usize,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            emit_branch_comments: true,
            keep_type_arguments: false,
            max_vector_elements: DEFAULT_MAX_VECTOR_ELEMENTS,
        }
    }
}

/// Result of interpreting one function.
#[derive(Debug, Clone)]
pub struct InterpretedFunction {
    pub function: DecompiledFunction,
    pub unknown_opcodes: Vec<String>,
    pub unresolved_operands: usize,
    /// Fragments still on the stack when the body ended.
    pub leftover_stack: usize,
}

impl InterpretedFunction {
    pub fn is_complete(&self) -> bool {
        self.unknown_opcodes.is_empty() && self.unresolved_operands == 0 && self.leftover_stack == 0
    }
}

fn strip_borrow(fragment: &str) -> &str {
    if let Some(rest) = fragment.strip_prefix("&mut ") {
        rest
    } else if let Some(rest) = fragment.strip_prefix('&') {
        rest
    } else {
        fragment
    }
}

fn deref(fragment: &str) -> String {
    if fragment.starts_with('&') {
        strip_borrow(fragment).to_string()
    } else {
        format!("*{}", fragment)
    }
}

/// Splits `label: type` at the first top-level single colon, leaving
/// `0x2::coin::Coin<T>` paths intact.
fn split_annotation(annotation: &str) -> (&str, Option<&str>) {
    let bytes = annotation.as_bytes();
    let mut depth = 0i32;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'<' | b'(' | b'[' => depth += 1,
            b'>' | b')' | b']' => depth -= 1,
            b':' if depth == 0 => {
                let doubled = (i > 0 && bytes[i - 1] == b':') || bytes.get(i + 1) == Some(&b':');
                if !doubled {
                    return (annotation[..i].trim(), Some(annotation[i + 1..].trim()));
                }
            }
            _ => {}
        }
    }

    (annotation.trim(), None)
}

/// True when the outer parentheses of `fragment` enclose all of it.
/// Only `(`/`)` count: `<` and `>` in fragments are comparison operators.
fn is_wrapped(fragment: &str) -> bool {
    if !fragment.starts_with('(') || !fragment.ends_with(')') {
        return false;
    }

    let last = fragment.len() - 1;
    let mut depth = 0i32;
    for (i, c) in fragment.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth == 0 && i != last {
            return false;
        }
    }
    depth == 0
}

fn parenthesize(fragment: &str) -> String {
    if is_wrapped(fragment) {
        fragment.to_string()
    } else {
        format!("({})", fragment)
    }
}

fn negate(fragment: &str) -> String {
    let simple = fragment.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.');
    if simple {
        format!("!{}", fragment)
    } else {
        format!("!{}", parenthesize(fragment))
    }
}

/// Interpreter context for exactly one function. Built fresh per function
/// and consumed by `finish`.
pub struct StackMachine<'a> {
    function: &'a FunctionBlock,
    options: InterpreterOptions,
    stack: Vec<String>,
    locals: LocalsTable,
    statements: Vec<String>,
    assigned: HashSet<Slot>,
    declared_slots: HashMap<usize, usize>,
    unknown_opcodes: Vec<String>,
    unresolved_operands: usize,
}

impl<'a> StackMachine<'a> {
    pub fn new(function: &'a FunctionBlock, options: InterpreterOptions) -> Self {
        let mut machine = Self {
            function,
            options,
            stack: Vec::new(),
            locals: LocalsTable::new(),
            statements: Vec::new(),
            assigned: HashSet::new(),
            declared_slots: HashMap::new(),
            unknown_opcodes: Vec::new(),
            unresolved_operands: 0,
        };
        machine.seed_parameters();
        machine
    }

    fn seed_parameters(&mut self) {
        let mut seen_types: HashMap<String, usize> = HashMap::new();

        for (i, param) in self.function.parameters.iter().enumerate() {
            let family = base_type_name(&param.param_type).to_string();
            let position = seen_types.entry(family).or_insert(0);

            let base = if ARG_SLOT_RE.is_match(&param.name) || param.name.is_empty() {
                let ctx = NamingContext::for_function(&self.function.name).at_position(*position);
                infer_name(&param.param_type, &ctx)
            } else {
                sanitize_identifier(&param.name)
            };
            *position += 1;

            self.locals.bind(Slot::Arg(i), &base);
            self.assigned.insert(Slot::Arg(i));
        }
    }

    pub fn declare_local(&mut self, decl: &LocalDecl) {
        let index = match LOC_SLOT_RE.captures(&decl.name) {
            Some(caps) => caps[1].parse().unwrap_or(self.declared_slots.len()),
            None => self.declared_slots.len(),
        };
        self.declared_slots.insert(decl.slot, index);
        let base = infer_name(&decl.local_type, &NamingContext::default());
        self.locals.bind(Slot::Local(index), &base);
    }

    pub fn locals(&self) -> &LocalsTable {
        &self.locals
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    fn push(&mut self, fragment: String) {
        self.stack.push(fragment);
    }

    fn pop(&mut self) -> String {
        match self.stack.pop() {
            Some(fragment) => fragment,
            None => {
                self.unresolved_operands += 1;
                PLACEHOLDER.to_string()
            }
        }
    }

    /// Pops `n` fragments and returns them in original push order. Missing
    /// fragments become leading placeholders.
    fn pop_n(&mut self, n: usize) -> Vec<String> {
        let available = n.min(self.stack.len());
        let items = self.stack.split_off(self.stack.len() - available);

        let shortfall = n - available;
        if shortfall == 0 {
            return items;
        }
        self.unresolved_operands += shortfall;

        let run = if shortfall <= MAX_PLACEHOLDER_RUN { shortfall } else { 1 };
        let mut padded = vec![PLACEHOLDER.to_string(); run];
        padded.extend(items);
        padded
    }

    fn emit(&mut self, statement: String) {
        self.statements.push(statement);
    }

    fn resolve_slot(&self, record: &InstructionRecord) -> Option<(Slot, Option<String>)> {
        let (label, ty) = match record.annotation.as_deref().map(split_annotation) {
            Some((label, ty)) => (Some(label), ty.map(str::to_string)),
            None => (None, None),
        };

        if let Some(label) = label {
            if let Some(caps) = ARG_SLOT_RE.captures(label) {
                if let Ok(n) = caps[1].parse() {
                    return Some((Slot::Arg(n), ty));
                }
            }
            if let Some(caps) = LOC_SLOT_RE.captures(label) {
                if let Ok(n) = caps[1].parse() {
                    return Some((Slot::Local(n), ty));
                }
            }
        }

        let index = record.operand_index()?;
        let params = self.function.parameters.len();
        let slot = if index < params {
            Slot::Arg(index)
        } else if let Some(&local) = self.declared_slots.get(&index) {
            Slot::Local(local)
        } else {
            Slot::Local(index - params)
        };
        Some((slot, ty))
    }

    fn local_name(&mut self, record: &InstructionRecord) -> Option<(Slot, String)> {
        let (slot, ty) = match self.resolve_slot(record) {
            Some(resolved) => resolved,
            None => {
                self.unresolved_operands += 1;
                return None;
            }
        };

        if let Some(name) = self.locals.get(slot) {
            return Some((slot, name.to_string()));
        }

        let base = match ty.as_deref() {
            Some(ty) => infer_name(ty, &NamingContext::default()),
            None => match slot {
                Slot::Arg(n) => format!("arg{}", n),
                Slot::Local(n) => format!("loc{}", n),
            },
        };
        Some((slot, self.locals.bind(slot, &base)))
    }

    fn local_or_placeholder(&mut self, record: &InstructionRecord) -> String {
        self.local_name(record)
            .map(|(_, name)| name)
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    fn argument_or_placeholder(&mut self, record: &InstructionRecord) -> String {
        match record.argument() {
            Some(arg) => arg.to_string(),
            None => {
                self.unresolved_operands += 1;
                PLACEHOLDER.to_string()
            }
        }
    }

    /// Struct name from `Coin<T>` or `Coin.balance: ...` style annotations.
    fn type_name_of(&mut self, record: &InstructionRecord) -> String {
        match record.annotation.as_deref() {
            Some(annotation) => {
                let (head, _) = split_annotation(annotation);
                let name = base_type_name(head);
                let name = name.split('.').next().unwrap_or(name);
                if name.is_empty() {
                    self.unresolved_operands += 1;
                    PLACEHOLDER.to_string()
                } else {
                    name.to_string()
                }
            }
            None => {
                self.unresolved_operands += 1;
                PLACEHOLDER.to_string()
            }
        }
    }

    fn field_name_of(&mut self, record: &InstructionRecord) -> String {
        let field = record.annotation.as_deref().and_then(|annotation| {
            let (head, _) = split_annotation(annotation);
            head.rsplit('.').next().map(str::trim).filter(|f| !f.is_empty() && *f != head)
        });

        match field {
            Some(field) => field.to_string(),
            None => {
                self.unresolved_operands += 1;
                PLACEHOLDER.to_string()
            }
        }
    }

    /// Element count of `VecPack`/`VecUnpack`: the last integer in the
    /// annotation (`VecPack(2, 3)`), else the bracketed operand.
    fn element_count(&mut self, record: &InstructionRecord) -> usize {
        let from_annotation = record.annotation.as_deref().and_then(|annotation| {
            annotation
                .split(',')
                .filter_map(|part| part.trim().parse::<usize>().ok())
                .last()
        });

        match from_annotation.or_else(|| record.operand_index()) {
            Some(n) if n > self.options.max_vector_elements => {
                log::debug!(
                    "{}: element count {} at {} exceeds {}",
                    self.function.name,
                    n,
                    record.offset,
                    self.options.max_vector_elements
                );
                self.unresolved_operands += 1;
                self.options.max_vector_elements
            }
            Some(n) => n,
            None => {
                self.unresolved_operands += 1;
                0
            }
        }
    }

    fn branch_target(record: &InstructionRecord) -> String {
        record.argument().unwrap_or(PLACEHOLDER).to_string()
    }

    fn emit_call(&mut self, record: &InstructionRecord) {
        let signature = record.annotation.as_deref().and_then(CallSignature::parse);
        let signature = match signature {
            Some(signature) => signature,
            None => {
                self.unresolved_operands += 1;
                let target = record.argument().unwrap_or(PLACEHOLDER);
                self.emit(format!("// unresolved call {}", target));
                return;
            }
        };

        let args = self.pop_n(signature.arg_count());
        let call = format!(
            "{}({})",
            signature.display_path(self.options.keep_type_arguments),
            args.join(", ")
        );

        match signature.return_arity() {
            0 => self.emit(format!("{};", call)),
            1 => self.push(call),
            n => {
                let names: Vec<String> = (0..n).map(|_| self.locals.temporary("result")).collect();
                self.emit(format!("let ({}) = {};", names.join(", "), call));
                for name in names {
                    self.push(name);
                }
            }
        }
    }

    fn emit_return(&mut self) {
        match return_arity(&self.function.return_type) {
            0 => self.emit("return;".to_string()),
            1 => {
                let value = self.pop();
                self.emit(format!("return {};", value));
            }
            n => {
                let values = self.pop_n(n);
                self.emit(format!("return ({});", values.join(", ")));
            }
        }
    }

    pub fn step(&mut self, record: &InstructionRecord) {
        match &record.opcode {
            Opcode::CopyLoc | Opcode::MoveLoc => {
                let name = self.local_or_placeholder(record);
                self.push(name);
            }
            Opcode::ImmBorrowLoc => {
                let name = self.local_or_placeholder(record);
                self.push(format!("&{}", name));
            }
            Opcode::MutBorrowLoc => {
                let name = self.local_or_placeholder(record);
                self.push(format!("&mut {}", name));
            }
            Opcode::StLoc => {
                let value = self.pop();
                match self.local_name(record) {
                    Some((slot, name)) => {
                        if self.assigned.insert(slot) {
                            self.emit(format!("let {} = {};", name, value));
                        } else {
                            self.emit(format!("{} = {};", name, value));
                        }
                    }
                    None => self.emit(format!("{} = {};", PLACEHOLDER, value)),
                }
            }
            Opcode::Call => self.emit_call(record),
            Opcode::Pack => {
                let name = self.type_name_of(record);
                self.push(format!("{} {{ ... }}", name));
            }
            Opcode::Unpack => {
                let value = self.pop();
                let name = self.type_name_of(record);
                self.emit(format!("let {} {{ ... }} = {};", name, value));
            }
            Opcode::Ret => self.emit_return(),
            Opcode::FreezeRef => {
                let value = self.pop();
                let frozen = match value.strip_prefix("&mut ") {
                    Some(rest) => format!("&{}", rest),
                    None => value,
                };
                self.push(frozen);
            }
            Opcode::LdInt(_) => {
                let literal = self.argument_or_placeholder(record);
                self.push(literal);
            }
            Opcode::LdTrue => self.push("true".to_string()),
            Opcode::LdFalse => self.push("false".to_string()),
            Opcode::LdConst => {
                let value = record
                    .annotation
                    .as_deref()
                    .and_then(|a| split_annotation(a).1.map(str::to_string))
                    .filter(|v| !v.is_empty());
                let literal = match (value, record.operand_index()) {
                    (Some(value), _) => value,
                    (None, Some(index)) => format!("CONST_{}", index),
                    (None, None) => self.argument_or_placeholder(record),
                };
                self.push(literal);
            }
            Opcode::Pop => {
                let value = self.pop();
                if value != PLACEHOLDER {
                    self.emit(format!("_ = {};", value));
                }
            }
            Opcode::BrTrue => {
                let cond = self.pop();
                if self.options.emit_branch_comments {
                    let target = Self::branch_target(record);
                    self.emit(format!("// if {} goto {}", parenthesize(&cond), target));
                }
            }
            Opcode::BrFalse => {
                let cond = self.pop();
                if self.options.emit_branch_comments {
                    let target = Self::branch_target(record);
                    self.emit(format!("// if {} goto {}", negate(&cond), target));
                }
            }
            Opcode::Branch => {
                if self.options.emit_branch_comments {
                    let target = Self::branch_target(record);
                    self.emit(format!("// goto {}", target));
                }
            }
            Opcode::Abort => {
                let code = self.pop();
                self.emit(format!("abort {};", code));
            }
            Opcode::ImmBorrowField | Opcode::MutBorrowField => {
                let object = self.pop();
                let field = self.field_name_of(record);
                let prefix = if record.opcode == Opcode::MutBorrowField { "&mut " } else { "&" };
                self.push(format!("{}{}.{}", prefix, strip_borrow(&object), field));
            }
            Opcode::ReadRef => {
                let reference = self.pop();
                self.push(deref(&reference));
            }
            Opcode::WriteRef => {
                let reference = self.pop();
                let value = self.pop();
                self.emit(format!("{} = {};", deref(&reference), value));
            }
            Opcode::Binary(op) => {
                let rhs = self.pop();
                let lhs = self.pop();
                self.push(format!("({} {} {})", lhs, op.symbol(), rhs));
            }
            Opcode::Not => {
                let value = self.pop();
                self.push(negate(&value));
            }
            Opcode::Cast(ty) => {
                let value = self.pop();
                self.push(format!("({} as {})", value, ty));
            }
            Opcode::VecPack => {
                let count = self.element_count(record);
                let items = self.pop_n(count);
                self.push(format!("vector[{}]", items.join(", ")));
            }
            Opcode::VecLen => {
                let vector = self.pop();
                self.push(format!("{}.length()", strip_borrow(&vector)));
            }
            Opcode::VecImmBorrow | Opcode::VecMutBorrow => {
                let index = self.pop();
                let vector = self.pop();
                let method = if record.opcode == Opcode::VecMutBorrow { "borrow_mut" } else { "borrow" };
                self.push(format!("{}.{}({})", strip_borrow(&vector), method, index));
            }
            Opcode::VecPushBack => {
                let element = self.pop();
                let vector = self.pop();
                self.emit(format!("{}.push_back({});", strip_borrow(&vector), element));
            }
            Opcode::VecPopBack => {
                let vector = self.pop();
                self.push(format!("{}.pop_back()", strip_borrow(&vector)));
            }
            Opcode::VecUnpack => {
                let count = self.element_count(record);
                let vector = self.pop();
                for i in 0..count {
                    self.push(format!("{}[{}]", vector, i));
                }
            }
            Opcode::VecSwap => {
                let j = self.pop();
                let i = self.pop();
                let vector = self.pop();
                self.emit(format!("{}.swap({}, {});", strip_borrow(&vector), i, j));
            }
            Opcode::Exists | Opcode::MoveFrom | Opcode::ImmBorrowGlobal | Opcode::MutBorrowGlobal => {
                let address = self.pop();
                let name = self.type_name_of(record);
                let builtin = match record.opcode {
                    Opcode::Exists => "exists",
                    Opcode::MoveFrom => "move_from",
                    Opcode::ImmBorrowGlobal => "borrow_global",
                    _ => "borrow_global_mut",
                };
                self.push(format!("{}<{}>({})", builtin, name, address));
            }
            Opcode::MoveTo => {
                let value = self.pop();
                let signer = self.pop();
                self.emit(format!("move_to({}, {});", signer, value));
            }
            Opcode::Nop => {}
            Opcode::Unknown(name) => {
                log::debug!("{}: skipping unknown opcode {} at {}", self.function.name, name, record.offset);
                self.unknown_opcodes.push(name.clone());
            }
        }
    }

    pub fn finish(self) -> InterpretedFunction {
        let leftover_stack = self.stack.len();
        if leftover_stack > 0 {
            log::debug!("{}: {} fragment(s) left on the stack", self.function.name, leftover_stack);
        }

        let parameters = self
            .function
            .parameters
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let name = self.locals.get(Slot::Arg(i)).unwrap_or(p.name.as_str());
                Parameter::new(name, &p.param_type)
            })
            .collect();

        InterpretedFunction {
            function: DecompiledFunction {
                visibility: self.function.visibility,
                name: self.function.name.clone(),
                type_parameters: self.function.type_parameters.clone(),
                parameters,
                return_type: self.function.return_type.clone(),
                statements: self.statements,
            },
            unknown_opcodes: self.unknown_opcodes,
            unresolved_operands: self.unresolved_operands,
            leftover_stack,
        }
    }
}

/// Runs an already tokenized body through a fresh machine.
pub fn interpret(
    function: &FunctionBlock,
    body: &TokenizedBody,
    options: InterpreterOptions,
) -> InterpretedFunction {
    let mut machine = StackMachine::new(function, options);
    for decl in &body.locals {
        machine.declare_local(decl);
    }
    for record in &body.instructions {
        machine.step(record);
    }
    machine.finish()
}

/// Tokenizes and interprets `function.body_lines`.
pub fn interpret_function(function: &FunctionBlock, options: InterpreterOptions) -> InterpretedFunction {
    let body = tokenize(&function.body_lines);
    interpret(function, &body, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompiler::model::Visibility;
    use crate::decompiler::tokenizer::parse_instruction;

    fn run(function: FunctionBlock) -> InterpretedFunction {
        interpret_function(&function, InterpreterOptions::default())
    }

    fn statements(function: FunctionBlock) -> Vec<String> {
        run(function).function.statements
    }

    #[test]
    fn test_transfer_scenario() {
        let function = FunctionBlock::new(Visibility::Public, "transfer")
            .with_parameter("coin", "Coin<SUI>")
            .with_parameter("recipient", "address")
            .with_body([
                "0: MoveLoc[0](Arg0: Coin<SUI>)",
                "1: MoveLoc[1](Arg1: address)",
                "2: Call(transfer::public_transfer<SUI>(Coin<SUI>,address):())",
                "3: Ret",
            ]);

        assert_eq!(
            statements(function),
            vec!["transfer::public_transfer(coin, recipient);", "return;"]
        );
    }

    #[test]
    fn test_arithmetic_keeps_operand_order() {
        let function = FunctionBlock::new(Visibility::Public, "calc")
            .with_parameter("a", "u64")
            .with_parameter("b", "u64")
            .with_return_type("u64")
            .with_body([
                "0: CopyLoc[0](Arg0: u64)",
                "1: CopyLoc[1](Arg1: u64)",
                "2: Add",
                "3: LdU64(2)",
                "4: Sub",
                "5: Ret",
            ]);

        assert_eq!(statements(function), vec!["return ((a + b) - 2);"]);
    }

    #[test]
    fn test_call_pops_exactly_arg_count() {
        let function = FunctionBlock::new(Visibility::Public, "f")
            .with_parameter("x", "u64")
            .with_parameter("y", "u64")
            .with_parameter("z", "u64")
            .with_body([
                "0: CopyLoc[0](Arg0: u64)",
                "1: CopyLoc[1](Arg1: u64)",
                "2: CopyLoc[2](Arg2: u64)",
                "3: Call math::max(u64, u64): u64",
                "4: StLoc[3](loc0: u64)",
            ]);

        let result = run(function);
        assert_eq!(result.function.statements, vec!["let amount = math::max(y, z);"]);
        assert_eq!(result.leftover_stack, 1);
        assert_eq!(result.unresolved_operands, 0);
    }

    #[test]
    fn test_unknown_opcode_does_not_stop_processing() {
        let function = FunctionBlock::new(Visibility::Public, "g")
            .with_parameter("x", "u64")
            .with_return_type("u64")
            .with_body([
                "0: CopyLoc[0](Arg0: u64)",
                "1: VendorMagic[7](whatever)",
                "2: LdU64(1)",
                "3: Add",
                "4: Ret",
            ]);

        let result = run(function);
        assert_eq!(result.function.statements, vec!["return (x + 1);"]);
        assert_eq!(result.unknown_opcodes, vec!["VendorMagic"]);
        assert!(!result.is_complete());
    }

    #[test]
    fn test_stloc_declares_then_reassigns() {
        let function = FunctionBlock::new(Visibility::Private, "counter")
            .with_body([
                "L0:\tloc0: u64",
                "0: LdU64(0)",
                "1: StLoc[0](loc0: u64)",
                "2: CopyLoc[0](loc0: u64)",
                "3: LdU64(1)",
                "4: Add",
                "5: StLoc[0](loc0: u64)",
                "6: Ret",
            ]);

        assert_eq!(
            statements(function),
            vec!["let amount = 0;", "amount = (amount + 1);", "return;"]
        );
    }

    #[test]
    fn test_branches_become_comments() {
        let function = FunctionBlock::new(Visibility::Public, "check")
            .with_parameter("x", "u64")
            .with_body([
                "B0:",
                "0: CopyLoc[0](Arg0: u64)",
                "1: LdU64(10)",
                "2: Lt",
                "3: BrFalse(6)",
                "B1:",
                "4: LdU64(7)",
                "5: Abort",
                "B2:",
                "6: Branch(7)",
                "7: Ret",
            ]);

        assert_eq!(
            statements(function),
            vec!["// if !(x < 10) goto 6", "abort 7;", "// goto 7", "return;"]
        );
    }

    #[test]
    fn test_branch_comments_can_be_disabled() {
        let function = FunctionBlock::new(Visibility::Public, "check")
            .with_parameter("flag", "bool")
            .with_body(["0: CopyLoc[0](Arg0: bool)", "1: BrTrue(3)", "2: Branch(3)", "3: Ret"]);
        let options = InterpreterOptions {
            emit_branch_comments: false,
            ..InterpreterOptions::default()
        };

        let result = interpret_function(&function, options);
        assert_eq!(result.function.statements, vec!["return;"]);
        assert_eq!(result.leftover_stack, 0);
    }

    #[test]
    fn test_field_borrow_and_write_ref() {
        let function = FunctionBlock::new(Visibility::Public, "set_value")
            .with_parameter("Arg0", "&mut Counter")
            .with_parameter("Arg1", "u64")
            .with_body([
                "0: CopyLoc[1](Arg1: u64)",
                "1: MoveLoc[0](Arg0: &mut Counter)",
                "2: MutBorrowField[0](Counter.value: u64)",
                "3: WriteRef",
                "4: Ret",
            ]);

        let result = run(function);
        assert_eq!(result.function.statements, vec!["counter.value = amount;", "return;"]);
        assert_eq!(result.function.parameters[0].name, "counter");
        assert_eq!(result.function.parameters[1].name, "amount");
    }

    #[test]
    fn test_read_ref_and_freeze() {
        let function = FunctionBlock::new(Visibility::Public, "value")
            .with_parameter("Arg0", "&Pool")
            .with_return_type("u64")
            .with_body([
                "0: MoveLoc[0](Arg0: &Pool)",
                "1: ImmBorrowField[0](Pool.reserve: u64)",
                "2: ReadRef",
                "3: Ret",
            ]);
        assert_eq!(statements(function), vec!["return pool.reserve;"]);

        let function = FunctionBlock::new(Visibility::Public, "freeze")
            .with_parameter("v", "vector<u64>")
            .with_return_type("&vector<u64>")
            .with_body(["0: MutBorrowLoc[0](Arg0: vector<u64>)", "1: FreezeRef", "2: Ret"]);
        assert_eq!(statements(function), vec!["return &v;"]);
    }

    #[test]
    fn test_pack_unpack_placeholders() {
        let function = FunctionBlock::new(Visibility::Public, "wrap")
            .with_parameter("Arg0", "Wrapper")
            .with_return_type("Receipt")
            .with_body([
                "0: MoveLoc[0](Arg0: Wrapper)",
                "1: Unpack[0](Wrapper)",
                "2: Pack[1](Receipt<T>)",
                "3: Ret",
            ]);

        assert_eq!(
            statements(function),
            vec!["let Wrapper { ... } = wrapper;", "return Receipt { ... };"]
        );
    }

    #[test]
    fn test_vector_operations() {
        let function = FunctionBlock::new(Visibility::Public, "vecs")
            .with_parameter("items", "&mut vector<u64>")
            .with_return_type("u64")
            .with_body([
                "0: LdU64(1)",
                "1: LdU64(2)",
                "2: LdU64(3)",
                "3: VecPack(4, 3)",
                "4: Pop",
                "5: CopyLoc[0](Arg0: &mut vector<u64>)",
                "6: LdU64(9)",
                "7: VecPushBack(4)",
                "8: CopyLoc[0](Arg0: &mut vector<u64>)",
                "9: VecLen(4)",
                "10: Ret",
            ]);

        assert_eq!(
            statements(function),
            vec!["_ = vector[1, 2, 3];", "items.push_back(9);", "return items.length();"]
        );
    }

    #[test]
    fn test_casts_and_constants() {
        let function = FunctionBlock::new(Visibility::Public, "consts")
            .with_return_type("u128")
            .with_body(["0: LdConst[2](U64: 1000)", "1: CastU128", "2: Ret"]);
        assert_eq!(statements(function), vec!["return (1000 as u128);"]);

        let function = FunctionBlock::new(Visibility::Public, "consts")
            .with_return_type("u64")
            .with_body(["0: LdConst[5]", "1: Ret"]);
        assert_eq!(statements(function), vec!["return CONST_5;"]);
    }

    fn feed(machine: &mut StackMachine<'_>, lines: &[&str]) {
        for line in lines {
            let record = parse_instruction(line).unwrap();
            machine.step(&record);
        }
    }

    #[test]
    fn test_vector_borrows_step_by_step() {
        let function = FunctionBlock::new(Visibility::Public, "touch")
            .with_parameter("v", "vector<u64>")
            .with_parameter("i", "u64");
        let mut machine = StackMachine::new(&function, InterpreterOptions::default());

        feed(&mut machine, &["0: ImmBorrowLoc[0](Arg0: vector<u64>)"]);
        assert_eq!(machine.stack_depth(), 1);
        feed(&mut machine, &["1: CopyLoc[1](Arg1: u64)", "2: VecImmBorrow(4)"]);
        assert_eq!(machine.stack_depth(), 1);
        feed(&mut machine, &["3: ReadRef", "4: StLoc[2](loc0: u64)"]);
        assert_eq!(machine.stack_depth(), 0);

        feed(
            &mut machine,
            &[
                "5: LdU64(5)",
                "6: MutBorrowLoc[0](Arg0: vector<u64>)",
                "7: LdU64(0)",
                "8: VecMutBorrow(4)",
                "9: WriteRef",
                "10: MutBorrowLoc[0](Arg0: vector<u64>)",
                "11: VecPopBack(4)",
            ],
        );
        assert_eq!(machine.stack_depth(), 1);
        feed(
            &mut machine,
            &[
                "12: Pop",
                "13: MutBorrowLoc[0](Arg0: vector<u64>)",
                "14: LdU64(0)",
                "15: LdU64(1)",
                "16: VecSwap(4)",
                "17: Nop",
                "18: Ret",
            ],
        );
        assert_eq!(machine.stack_depth(), 0);

        let result = machine.finish();
        assert_eq!(
            result.function.statements,
            vec![
                "let amount = *v.borrow(i);",
                "*v.borrow_mut(0) = 5;",
                "_ = v.pop_back();",
                "v.swap(0, 1);",
                "return;",
            ]
        );
        assert!(result.is_complete());
    }

    #[test]
    fn test_not_negates() {
        let function = FunctionBlock::new(Visibility::Public, "flip")
            .with_parameter("flag", "bool")
            .with_return_type("bool")
            .with_body(["0: CopyLoc[0](Arg0: bool)", "1: Not", "2: Ret"]);
        assert_eq!(statements(function), vec!["return !flag;"]);

        let function = FunctionBlock::new(Visibility::Public, "outside")
            .with_parameter("a", "u64")
            .with_parameter("b", "u64")
            .with_return_type("bool")
            .with_body([
                "0: CopyLoc[0](Arg0: u64)",
                "1: CopyLoc[1](Arg1: u64)",
                "2: Lt",
                "3: Not",
                "4: Ret",
            ]);
        assert_eq!(statements(function), vec!["return !(a < b);"]);
    }

    #[test]
    fn test_vec_unpack_pushes_elements() {
        let function = FunctionBlock::new(Visibility::Public, "pair").with_parameter("v", "vector<u64>");
        let mut machine = StackMachine::new(&function, InterpreterOptions::default());

        feed(&mut machine, &["0: MoveLoc[0](Arg0: vector<u64>)", "1: VecUnpack(4, 2)"]);
        assert_eq!(machine.stack_depth(), 2);
        feed(&mut machine, &["2: StLoc[1](loc0: u64)", "3: Pop", "4: Ret"]);

        let result = machine.finish();
        assert_eq!(result.function.statements, vec!["let amount = v[1];", "_ = v[0];", "return;"]);
        assert_eq!(result.leftover_stack, 0);
    }

    #[test]
    fn test_global_storage() {
        let function = FunctionBlock::new(Visibility::Public, "publish")
            .with_parameter("account", "&signer")
            .with_parameter("addr", "address")
            .with_parameter("pool", "Pool");
        let mut machine = StackMachine::new(&function, InterpreterOptions::default());

        feed(&mut machine, &["0: CopyLoc[1](Arg1: address)", "1: Exists[0](Pool)"]);
        assert_eq!(machine.stack_depth(), 1);
        feed(
            &mut machine,
            &[
                "2: Pop",
                "3: MoveLoc[0](Arg0: &signer)",
                "4: MoveLoc[2](Arg2: Pool)",
                "5: MoveTo[0](Pool)",
            ],
        );
        assert_eq!(machine.stack_depth(), 0);
        feed(
            &mut machine,
            &[
                "6: CopyLoc[1](Arg1: address)",
                "7: ImmBorrowGlobal[0](Pool)",
                "8: Pop",
                "9: CopyLoc[1](Arg1: address)",
                "10: MutBorrowGlobalGeneric[0](Pool)",
                "11: Pop",
                "12: CopyLoc[1](Arg1: address)",
                "13: MoveFrom[0](Pool)",
                "14: Unpack[0](Pool)",
                "15: Ret",
            ],
        );

        let result = machine.finish();
        assert_eq!(
            result.function.statements,
            vec![
                "_ = exists<Pool>(addr);",
                "move_to(account, pool);",
                "_ = borrow_global<Pool>(addr);",
                "_ = borrow_global_mut<Pool>(addr);",
                "let Pool { ... } = move_from<Pool>(addr);",
                "return;",
            ]
        );
        assert!(result.is_complete());
    }

    #[test]
    fn test_stack_underflow_is_bounded() {
        let function = FunctionBlock::new(Visibility::Public, "short").with_body([
            "0: LdU64(1)",
            "1: Call math::sum(u64, u64, u64): u64",
            "2: Pop",
            "3: LdU64(7)",
            "4: VecPack(4, 100)",
            "5: Pop",
            "6: Ret",
        ]);

        let result = run(function);
        assert_eq!(
            result.function.statements,
            vec!["_ = math::sum(?, ?, 1);", "_ = vector[?, 7];", "return;"]
        );
        assert_eq!(result.unresolved_operands, 2 + 99);
    }

    #[test]
    fn test_vector_element_limit() {
        let function = FunctionBlock::new(Visibility::Public, "many").with_parameter("v", "vector<u64>");
        let options = InterpreterOptions {
            max_vector_elements: 3,
            ..InterpreterOptions::default()
        };
        let mut machine = StackMachine::new(&function, options);

        feed(&mut machine, &["0: MoveLoc[0](Arg0: vector<u64>)", "1: VecUnpack(4, 9000000000)"]);
        assert_eq!(machine.stack_depth(), 3);

        let result = machine.finish();
        assert_eq!(result.unresolved_operands, 1);
        assert_eq!(result.leftover_stack, 3);
    }

    #[test]
    fn test_missing_operands_render_placeholders() {
        let function = FunctionBlock::new(Visibility::Public, "broken")
            .with_return_type("u64")
            .with_body(["0: Add", "1: Pop", "2: Ret"]);

        let result = run(function);
        assert_eq!(result.function.statements, vec!["_ = (? + ?);", "return ?;"]);
        assert_eq!(result.unresolved_operands, 3);
    }

    #[test]
    fn test_tuple_call_and_return() {
        let function = FunctionBlock::new(Visibility::Public, "split")
            .with_parameter("x", "u64")
            .with_return_type("(u64, u64)")
            .with_body([
                "0: CopyLoc[0](Arg0: u64)",
                "1: Call math::div_mod(u64): (u64, u64)",
                "2: Ret",
            ]);

        assert_eq!(
            statements(function),
            vec!["let (result, result_1) = math::div_mod(x);", "return (result, result_1);"]
        );
    }

    #[test]
    fn test_swap_parameter_names() {
        let function = FunctionBlock::new(Visibility::PublicEntry, "swap")
            .with_parameter("Arg0", "Coin<A>")
            .with_parameter("Arg1", "Coin<B>")
            .with_parameter("Arg2", "Coin<A>")
            .with_parameter("Arg3", "&mut TxContext");

        let result = run(function);
        let names: Vec<&str> = result.function.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["coin_in", "coin_out", "coin_out_1", "ctx"]);
    }

    #[test]
    fn test_parenthesize_comparisons() {
        assert_eq!(parenthesize("(x < 10)"), "(x < 10)");
        assert_eq!(parenthesize("(a > b)"), "(a > b)");
        assert_eq!(parenthesize("(a) + (b)"), "((a) + (b))");
        assert_eq!(negate("flag"), "!flag");
        assert_eq!(negate("(x >= y)"), "!(x >= y)");
    }

    #[test]
    fn test_split_annotation() {
        assert_eq!(split_annotation("Arg0: 0x2::coin::Coin<T>"), ("Arg0", Some("0x2::coin::Coin<T>")));
        assert_eq!(split_annotation("0x2::coin::Coin<T>"), ("0x2::coin::Coin<T>", None));
        assert_eq!(split_annotation("Pool.reserve: u64"), ("Pool.reserve", Some("u64")));
    }

    #[test]
    fn test_locals_table_only_grows() {
        let function = FunctionBlock::new(Visibility::Public, "f").with_parameter("x", "u64");
        let mut machine = StackMachine::new(&function, InterpreterOptions::default());
        assert_eq!(machine.locals().len(), 1);

        let body = tokenize(&[
            "0: CopyLoc[0](Arg0: u64)",
            "1: StLoc[1](loc0: u64)",
            "2: CopyLoc[1](loc0: u64)",
        ]);
        for record in &body.instructions {
            machine.step(record);
        }

        assert_eq!(machine.locals().len(), 2);
        assert_eq!(machine.stack_depth(), 1);
        assert_eq!(machine.locals().get(Slot::Local(0)), Some("amount"));
        assert_eq!(Slot::Arg(0).to_string(), "Arg0");
        assert_eq!(Slot::Local(3).to_string(), "L3");
    }

    #[test]
    fn test_no_leakage_between_functions() {
        let first = FunctionBlock::new(Visibility::Public, "first")
            .with_body(["0: LdU64(1)", "1: LdU64(2)"]);
        let second = FunctionBlock::new(Visibility::Public, "second")
            .with_return_type("u64")
            .with_body(["0: Ret"]);

        assert_eq!(run(first).leftover_stack, 2);
        let result = run(second);
        assert_eq!(result.function.statements, vec!["return ?;"]);
        assert_eq!(result.leftover_stack, 0);
    }
}
