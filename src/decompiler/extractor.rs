// Fri Jan 16 2026 - Alex

use crate::decompiler::model::{
    Ability, ConstDecl, FunctionBlock, Parameter, StructBlock, UseDecl, Visibility,
};
use crate::decompiler::signature::{find_matching, split_top_level};
use once_cell::sync::Lazy;
use regex::Regex;

static MODULE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*module\s+([A-Za-z0-9_:.]+)\s*\{?\s*$").expect("module pattern")
});

static STRUCT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:public\s+)?struct\s+([A-Za-z_][A-Za-z0-9_]*)\s*(?:<([^>]*)>)?\s*(?:has\s+([A-Za-z_,\s]+?))?\s*(\{.*)?$")
        .expect("struct pattern")
});

static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*:\s*(.+?)\s*,?\s*$").expect("field pattern")
});

static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:((?:(?:public\s*\(\s*(?:friend|package)\s*\)|public|entry|friend|private|native)\s+)+)(?:fun\s+)?|fun\s+)([A-Za-z_][A-Za-z0-9_]*)")
        .expect("function pattern")
});

static USE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*use\s+([^;]+?)\s*;?\s*$").expect("use pattern")
});

static CONST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*const\s+([A-Za-z_][A-Za-z0-9_]*)\s*:\s*([^=]+?)\s*=\s*(.+?)\s*;?\s*$")
        .expect("const pattern")
});

static INSTRUCTION_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\d+:").expect("instruction prefix pattern")
});

/// Words that may follow the visibility modifiers on a line that is not a
/// function header.
const NON_FUNCTION_KEYWORDS: &[&str] = &["struct", "module", "use", "const", "enum", "friend"];

/// Everything carved out of one disassembly text, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedModule {
    pub module_name: Option<String>,
    pub uses: Vec<UseDecl>,
    pub constants: Vec<ConstDecl>,
    pub structs: Vec<StructBlock>,
    pub functions: Vec<FunctionBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Module,
    Struct,
    Function,
}

fn brace_delta(line: &str) -> i64 {
    line.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

/// Final path segment of `0x2::coin` or `2.coin`.
pub fn parse_module_header(line: &str) -> Option<String> {
    let caps = MODULE_RE.captures(line)?;
    let path = caps.get(1)?.as_str();
    path.rsplit(|c: char| c == ':' || c == '.')
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn parse_struct_header(line: &str) -> Option<StructBlock> {
    let caps = STRUCT_RE.captures(line)?;
    let mut block = StructBlock::new(caps.get(1)?.as_str());

    if let Some(params) = caps.get(2) {
        block.type_parameters = split_top_level(params.as_str(), ',');
    }

    if let Some(abilities) = caps.get(3) {
        for word in abilities.as_str().split(',') {
            if let Some(ability) = Ability::from_str(word) {
                block.add_ability(ability);
            }
        }
    }

    Some(block)
}

pub fn parse_field(line: &str) -> Option<(String, String)> {
    let caps = FIELD_RE.captures(line)?;
    let field_type = caps[2].trim().trim_end_matches(',').trim();
    if field_type.is_empty() {
        return None;
    }
    Some((caps[1].to_string(), field_type.to_string()))
}

fn parse_parameter(index: usize, text: &str) -> Parameter {
    match text.split_once(':') {
        Some((name, ty)) if !name.trim().is_empty() && !name.contains('<') => {
            Parameter::new(name.trim(), ty.trim())
        }
        _ => Parameter::new(&format!("Arg{}", index), text.trim()),
    }
}

/// Parses `visibility name<T>(params): Ret {` into a body-less block.
/// Returns `None` for anything that is not a function signature.
pub fn parse_function_header(line: &str) -> Option<FunctionBlock> {
    let caps = FUNCTION_RE.captures(line)?;
    let name = caps.get(2)?.as_str();
    if NON_FUNCTION_KEYWORDS.contains(&name) {
        return None;
    }

    let modifiers = caps
        .get(1)
        .map_or("", |m| m.as_str())
        .replace("( ", "(")
        .replace(" )", ")")
        .replace("public (", "public(");
    let visibility = Visibility::from_modifiers(modifiers.split_whitespace());

    let full_end = caps.get(0)?.end();
    let mut idx = full_end + (line[full_end..].len() - line[full_end..].trim_start().len());
    let mut block = FunctionBlock::new(visibility, name);

    if line.as_bytes().get(idx) == Some(&b'<') {
        let close = find_matching(line, idx)?;
        block.type_parameters = split_top_level(&line[idx + 1..close], ',');
        idx = close + 1;
        idx += line[idx..].len() - line[idx..].trim_start().len();
    }

    if line.as_bytes().get(idx) != Some(&b'(') {
        return None;
    }
    let close = find_matching(line, idx)?;
    block.parameters = split_top_level(&line[idx + 1..close], ',')
        .iter()
        .enumerate()
        .map(|(i, p)| parse_parameter(i, p))
        .collect();

    let tail = line[close + 1..]
        .trim()
        .trim_end_matches(|c: char| c == '{' || c == ';')
        .trim();
    if let Some(ret) = tail.strip_prefix(':') {
        let ret = match ret.find(" acquires ") {
            Some(pos) => &ret[..pos],
            None => ret,
        };
        block.return_type = ret.trim().to_string();
    }

    Some(block)
}

pub fn classify_header(line: &str) -> Option<HeaderKind> {
    if STRUCT_RE.is_match(line) {
        Some(HeaderKind::Struct)
    } else if FUNCTION_RE.is_match(line) {
        Some(HeaderKind::Function)
    } else if MODULE_RE.is_match(line) {
        Some(HeaderKind::Module)
    } else {
        None
    }
}

enum State {
    Top,
    InStruct { block: StructBlock, depth: i64, opened: bool },
    InFunction { block: FunctionBlock, depth: i64, opened: bool },
}

/// Scans the disassembly once, carving out structs and functions by brace
/// depth. Never fails: lines that fit no pattern are skipped, and a struct
/// that never closes is left out.
pub fn extract(text: &str) -> ExtractedModule {
    let mut module = ExtractedModule::default();
    let mut state = State::Top;

    for line in text.lines() {
        state = match state {
            State::InStruct { block, depth, opened } => {
                if matches!(classify_header(line), Some(HeaderKind::Struct | HeaderKind::Function)) {
                    log::debug!("struct {} is not closed before the next header; dropping it", block.name);
                    scan_top_level(&mut module, line)
                } else {
                    continue_struct(&mut module, block, depth, opened, line)
                }
            }
            State::InFunction { block, depth, opened } => {
                if matches!(classify_header(line), Some(HeaderKind::Struct | HeaderKind::Function)) {
                    log::debug!("function {} is not closed before the next header", block.name);
                    module.functions.push(block);
                    scan_top_level(&mut module, line)
                } else {
                    continue_function(&mut module, block, depth, opened, line)
                }
            }
            State::Top => scan_top_level(&mut module, line),
        };
    }

    match state {
        State::InFunction { block, .. } => {
            log::debug!("function {} runs to end of input", block.name);
            module.functions.push(block);
        }
        State::InStruct { block, .. } => {
            log::debug!("struct {} runs to end of input; dropping it", block.name);
        }
        State::Top => {}
    }

    module
}

fn scan_top_level(module: &mut ExtractedModule, line: &str) -> State {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with("//") {
        return State::Top;
    }

    if let Some(name) = parse_module_header(line) {
        if module.module_name.is_none() {
            module.module_name = Some(name);
        }
        return State::Top;
    }

    if let Some(caps) = USE_RE.captures(line) {
        module.uses.push(UseDecl { path: caps[1].to_string() });
        return State::Top;
    }

    if let Some(caps) = CONST_RE.captures(line) {
        module.constants.push(ConstDecl {
            name: caps[1].to_string(),
            const_type: caps[2].to_string(),
            value: caps[3].to_string(),
        });
        return State::Top;
    }

    if let Some(block) = parse_struct_header(line) {
        let opened = line.contains('{');
        let depth = brace_delta(line);
        if opened && depth <= 0 {
            module.structs.push(block);
            return State::Top;
        }
        return State::InStruct { block, depth, opened };
    }

    if FUNCTION_RE.is_match(line) {
        return match parse_function_header(line) {
            Some(block) => {
                let opened = line.contains('{');
                let depth = brace_delta(line);
                let bodiless = trimmed.ends_with(';') || trimmed.split_whitespace().any(|w| w == "native");
                if (opened && depth <= 0) || (!opened && bodiless) {
                    module.functions.push(block);
                    State::Top
                } else {
                    State::InFunction { block, depth, opened }
                }
            }
            None => {
                log::trace!("rejected signature: {}", trimmed);
                State::Top
            }
        };
    }

    State::Top
}

fn continue_struct(
    module: &mut ExtractedModule,
    mut block: StructBlock,
    depth: i64,
    opened: bool,
    line: &str,
) -> State {
    let delta = brace_delta(line);
    if delta != 0 {
        let rest = line.replace(&['{', '}'][..], " ");
        if let Some((name, field_type)) = parse_field(&rest) {
            block.add_field(&name, &field_type);
        }

        let depth = depth + delta;
        let opened = opened || line.contains('{');
        if opened && depth <= 0 {
            module.structs.push(block);
            return State::Top;
        }
        return State::InStruct { block, depth, opened };
    }

    if let Some((name, field_type)) = parse_field(line) {
        block.add_field(&name, &field_type);
    }
    State::InStruct { block, depth, opened }
}

fn continue_function(
    module: &mut ExtractedModule,
    mut block: FunctionBlock,
    depth: i64,
    opened: bool,
    line: &str,
) -> State {
    if INSTRUCTION_PREFIX_RE.is_match(line) {
        block.body_lines.push(line.to_string());
        return State::InFunction { block, depth, opened };
    }

    let delta = brace_delta(line);
    let depth = depth + delta;
    let opened = opened || line.contains('{');

    if opened && depth <= 0 {
        module.functions.push(block);
        return State::Top;
    }

    if !line.trim().is_empty() && !(line.trim() == "{" && delta > 0) {
        block.body_lines.push(line.to_string());
    }
    State::InFunction { block, depth, opened }
}

pub fn extract_structs(text: &str) -> Vec<StructBlock> {
    extract(text).structs
}

pub fn extract_functions(text: &str) -> Vec<FunctionBlock> {
    extract(text).functions
}

#[cfg(test)]
mod tests {
    use super::*;

    const COIN_MODULE: &str = "\
// Move bytecode v6
module 0x2::coin {
use 0x2::balance;
use 0x2::object;

struct Coin<phantom T> has store, key {
\tid: UID,
\tbalance: Balance<T>
}

struct Marker has drop {}

public value<T>(Arg0: &Coin<T>): u64 {
B0:
\t0: MoveLoc[0](Arg0: &Coin<T>)
\t1: ImmBorrowField[0](Coin.balance: Balance<T>)
\t2: Call balance::value<T>(&Balance<T>): u64
\t3: Ret
}

entry public transfer(Arg0: Coin<SUI>, Arg1: address) {
B0:
\t0: MoveLoc[0](Arg0: Coin<SUI>)
\t1: MoveLoc[1](Arg1: address)
\t2: Call(transfer::public_transfer<SUI>(Coin<SUI>,address):())
\t3: Ret
}
}
";

    #[test]
    fn test_extract_module_parts() {
        let module = extract(COIN_MODULE);
        assert_eq!(module.module_name.as_deref(), Some("coin"));
        assert_eq!(module.uses.len(), 2);
        assert_eq!(module.structs.len(), 2);
        assert_eq!(module.functions.len(), 2);
    }

    #[test]
    fn test_struct_fields_in_order_and_trimmed() {
        let structs = extract_structs(COIN_MODULE);
        let coin = &structs[0];
        assert_eq!(coin.name, "Coin");
        assert_eq!(coin.type_parameters, vec!["phantom T"]);
        assert_eq!(coin.abilities, vec![Ability::Store, Ability::Key]);
        assert_eq!(coin.fields.len(), 2);
        assert_eq!(coin.fields[0].name, "id");
        assert_eq!(coin.fields[0].field_type, "UID");
        assert_eq!(coin.fields[1].field_type, "Balance<T>");

        let marker = &structs[1];
        assert_eq!(marker.name, "Marker");
        assert!(marker.fields.is_empty());
        assert_eq!(marker.abilities, vec![Ability::Drop]);
    }

    #[test]
    fn test_field_on_closing_brace_line() {
        let structs = extract_structs("struct Pool has key {\n    id: UID,\n    reserve: u64 }\n");
        assert_eq!(structs.len(), 1);
        assert_eq!(structs[0].fields.len(), 2);
        assert_eq!(structs[0].fields[1].name, "reserve");
        assert_eq!(structs[0].fields[1].field_type, "u64");

        let structs = extract_structs("struct Flag has drop\n{\n    set: bool\n}\n");
        assert_eq!(structs[0].fields.len(), 1);
        assert_eq!(structs[0].fields[0].field_type, "bool");
    }

    #[test]
    fn test_function_signatures() {
        let functions = extract_functions(COIN_MODULE);

        let value = &functions[0];
        assert_eq!(value.visibility, Visibility::Public);
        assert_eq!(value.name, "value");
        assert_eq!(value.type_parameters, vec!["T"]);
        assert_eq!(value.parameters, vec![Parameter::new("Arg0", "&Coin<T>")]);
        assert_eq!(value.return_type, "u64");
        assert_eq!(value.body_lines.len(), 5);

        let transfer = &functions[1];
        assert_eq!(transfer.visibility, Visibility::PublicEntry);
        assert_eq!(transfer.parameters.len(), 2);
        assert!(transfer.returns_unit());
        assert!(transfer.body_lines.iter().all(|l| !l.contains('}')));
    }

    #[test]
    fn test_malformed_struct_is_omitted() {
        let text = "\
module 0x1::m {
struct Good has drop {
\tx: u64
}
struct Broken has key {
\tid: UID,
\tvalue: u64
";
        let structs = extract_structs(text);
        assert_eq!(structs.len(), 1);
        assert_eq!(structs[0].name, "Good");
    }

    #[test]
    fn test_unclosed_struct_abandoned_at_next_header() {
        let text = "\
struct Broken has key {
\tid: UID
struct Next has copy, drop {
\ta: u8,
}
";
        let structs = extract_structs(text);
        assert_eq!(structs.len(), 1);
        assert_eq!(structs[0].name, "Next");
        assert_eq!(structs[0].fields.len(), 1);
    }

    #[test]
    fn test_false_positive_headers_rejected() {
        assert!(parse_function_header("public struct Pool has key {").is_none());
        assert!(parse_function_header("public use 0x2::coin;").is_none());
        assert!(parse_function_header("public const MAX: u64 = 1;").is_none());
        assert!(parse_function_header("public garbage without parens").is_none());
    }

    #[test]
    fn test_function_header_variants() {
        let f = parse_function_header("public(friend) fun split<T: store>(Arg0: &mut Coin<T>, Arg1: u64): (Coin<T>, u64) {").unwrap();
        assert_eq!(f.visibility, Visibility::Friend);
        assert_eq!(f.name, "split");
        assert_eq!(f.type_parameters, vec!["T: store"]);
        assert_eq!(f.return_type, "(Coin<T>, u64)");

        let f = parse_function_header("private helper(x: u64) {").unwrap();
        assert_eq!(f.visibility, Visibility::Private);
        assert_eq!(f.parameters, vec![Parameter::new("x", "u64")]);

        let f = parse_function_header("fun helper2(): bool {").unwrap();
        assert_eq!(f.visibility, Visibility::Private);
        assert_eq!(f.return_type, "bool");

        let f = parse_function_header("entry mint(Arg0: &mut TreasuryCap<T>): u64 acquires Pool {").unwrap();
        assert_eq!(f.visibility, Visibility::Entry);
        assert_eq!(f.return_type, "u64");
    }

    #[test]
    fn test_native_function_has_no_body() {
        let text = "native public fun hash(Arg0: vector<u8>): vector<u8>;\npublic f() {\n0: Ret\n}\n";
        let functions = extract_functions(text);
        assert_eq!(functions.len(), 2);
        assert!(functions[0].body_lines.is_empty());
        assert_eq!(functions[1].body_lines.len(), 1);
    }

    #[test]
    fn test_no_functions_is_not_an_error() {
        let module = extract("module 0x1::empty {\n}\n");
        assert_eq!(module.module_name.as_deref(), Some("empty"));
        assert!(module.functions.is_empty());
        assert!(module.structs.is_empty());
    }

    #[test]
    fn test_constants_collected() {
        let module = extract("const MAX_SUPPLY: u64 = 1000000;\n");
        assert_eq!(module.constants.len(), 1);
        assert_eq!(module.constants[0].name, "MAX_SUPPLY");
        assert_eq!(module.constants[0].const_type, "u64");
        assert_eq!(module.constants[0].value, "1000000");
    }
}
