// Fri Jan 16 2026 - Alex

//! Helpers for the type and signature strings that appear in disassembly
//! text. Everything here works on ASCII delimiters only, so byte offsets
//! are always valid slice boundaries.

use serde::{Deserialize, Serialize};

fn is_open(b: u8) -> bool {
    matches!(b, b'<' | b'(' | b'[' | b'{')
}

fn is_close(b: u8) -> bool {
    matches!(b, b'>' | b')' | b']' | b'}')
}

/// Returns the index of the delimiter closing the one at `open_idx`.
pub fn find_matching(s: &str, open_idx: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    if open_idx >= bytes.len() || !is_open(bytes[open_idx]) {
        return None;
    }

    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open_idx) {
        if is_open(b) {
            depth += 1;
        } else if is_close(b) {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(i);
            }
        }
    }

    None
}

/// Splits `s` on `sep` where it is not nested inside any bracket pair.
/// Parts are trimmed; an all-whitespace input yields no parts.
pub fn split_top_level(s: &str, sep: char) -> Vec<String> {
    if s.trim().is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for c in s.chars() {
        if c.is_ascii() && is_open(c as u8) {
            depth += 1;
        } else if c.is_ascii() && is_close(c as u8) {
            depth = depth.saturating_sub(1);
        }

        if c == sep && depth == 0 {
            parts.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }

    let last = current.trim();
    if !last.is_empty() {
        parts.push(last.to_string());
    }

    parts
}

/// `&mut T` / `&T` -> `T`
pub fn strip_references(ty: &str) -> &str {
    let ty = ty.trim();
    if let Some(rest) = ty.strip_prefix("&mut ") {
        rest.trim()
    } else if let Some(rest) = ty.strip_prefix('&') {
        rest.trim()
    } else {
        ty
    }
}

/// Unqualified type constructor: `&mut 0x2::coin::Coin<SUI>` -> `Coin`.
pub fn base_type_name(ty: &str) -> &str {
    let ty = strip_references(ty);
    let end = ty.find('<').unwrap_or(ty.len());
    let path = ty[..end].trim();
    path.rsplit("::").next().unwrap_or(path).trim()
}

/// Type arguments of the outermost constructor: `Coin<SUI>` -> `["SUI"]`.
pub fn generic_arguments(ty: &str) -> Vec<String> {
    let ty = strip_references(ty);
    match ty.find('<') {
        Some(open) => match find_matching(ty, open) {
            Some(close) => split_top_level(&ty[open + 1..close], ','),
            None => Vec::new(),
        },
        None => Vec::new(),
    }
}

/// Number of values a return type carries: unit is 0, a tuple is its
/// element count, anything else is 1.
pub fn return_arity(ret: &str) -> usize {
    let ret = ret.trim();
    if ret.is_empty() || ret == "()" {
        return 0;
    }

    if ret.starts_with('(') && find_matching(ret, 0) == Some(ret.len() - 1) {
        return split_top_level(&ret[1..ret.len() - 1], ',').len();
    }

    1
}

/// Drops the address/package prefix of a call path, keeping at most
/// `module::function`.
pub fn short_call_path(path: &str) -> String {
    let segments: Vec<&str> = path.split("::").map(str::trim).collect();
    if segments.len() <= 2 {
        segments.join("::")
    } else {
        segments[segments.len() - 2..].join("::")
    }
}

/// Parsed form of a `Call` annotation such as
/// `transfer::public_transfer<SUI>(Coin<SUI>,address):()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSignature {
    pub path: String,
    pub type_arguments: Vec<String>,
    pub parameter_types: Vec<String>,
    pub return_type: String,
}

impl CallSignature {
    pub fn parse(annotation: &str) -> Option<Self> {
        let s = annotation.trim();
        let name_end = s.find(|c: char| c == '<' || c == '(')?;
        let path = s[..name_end].trim();
        if path.is_empty() || path.contains(char::is_whitespace) {
            return None;
        }

        let mut idx = name_end;
        let mut type_arguments = Vec::new();
        if s.as_bytes()[idx] == b'<' {
            let close = find_matching(s, idx)?;
            type_arguments = split_top_level(&s[idx + 1..close], ',');
            idx = close + 1;
        }

        let rest = &s[idx..];
        let skipped = rest.len() - rest.trim_start().len();
        idx += skipped;
        if s.as_bytes().get(idx) != Some(&b'(') {
            return None;
        }

        let close = find_matching(s, idx)?;
        let parameter_types = split_top_level(&s[idx + 1..close], ',');

        let tail = s[close + 1..].trim();
        let return_type = tail
            .strip_prefix(':')
            .map(str::trim)
            .unwrap_or("")
            .to_string();

        Some(Self {
            path: path.to_string(),
            type_arguments,
            parameter_types,
            return_type,
        })
    }

    pub fn arg_count(&self) -> usize {
        self.parameter_types.len()
    }

    pub fn return_arity(&self) -> usize {
        return_arity(&self.return_type)
    }

    pub fn returns_unit(&self) -> bool {
        self.return_arity() == 0
    }

    pub fn function_name(&self) -> &str {
        self.path.rsplit("::").next().unwrap_or(&self.path)
    }

    /// Call target as it should appear in pseudo-source.
    pub fn display_path(&self, keep_type_arguments: bool) -> String {
        let path = short_call_path(&self.path);
        if keep_type_arguments && !self.type_arguments.is_empty() {
            format!("{}<{}>", path, self.type_arguments.join(", "))
        } else {
            path
        }
    }
}
