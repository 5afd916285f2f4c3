// Fri Jan 16 2026 - Alex

//! Display names for parameters and locals.
//!
//! Resolution runs in three steps: a fixed table of well-known types, then
//! a function-name override that may refine the table entry, then the bare
//! type name in snake case. Nothing here can fail.

use crate::decompiler::signature::{base_type_name, generic_arguments, strip_references};
use crate::utils::string::{sanitize_identifier, snake_case};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

static TYPE_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // framework objects and capabilities
        ("TxContext", "ctx"),
        ("UID", "id"),
        ("ID", "id"),
        ("Clock", "clock"),
        ("Random", "random"),
        ("Publisher", "publisher"),
        ("AdminCap", "admin_cap"),
        ("OwnerCap", "owner_cap"),
        ("TreasuryCap", "treasury_cap"),
        ("UpgradeCap", "upgrade_cap"),
        ("DenyCap", "deny_cap"),
        ("Kiosk", "kiosk"),
        ("KioskOwnerCap", "kiosk_cap"),
        ("TransferPolicy", "policy"),
        ("TransferPolicyCap", "policy_cap"),
        ("CoinMetadata", "metadata"),
        ("signer", "account"),
        // containers
        ("Table", "table"),
        ("ObjectTable", "object_table"),
        ("Bag", "bag"),
        ("ObjectBag", "object_bag"),
        ("VecMap", "map"),
        ("VecSet", "set"),
        ("LinkedTable", "linked_table"),
        ("Option", "opt"),
        ("String", "name"),
        ("Url", "url"),
        // primitives
        ("address", "addr"),
        ("bool", "flag"),
        ("u8", "byte"),
        ("u16", "value"),
        ("u32", "value"),
        ("u64", "amount"),
        ("u128", "value"),
        ("u256", "value"),
    ])
});

static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "abort", "acquires", "as", "break", "const", "continue", "copy", "else", "enum",
        "false", "friend", "fun", "has", "if", "let", "loop", "match", "module", "move",
        "mut", "native", "public", "return", "script", "spec", "struct", "true", "type",
        "use", "while",
    ])
});

/// Context a name is being chosen in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamingContext<'a> {
    pub function_name: Option<&'a str>,
    /// Zero-based occurrence of this type family among the function's
    /// parameters (the second `Coin` parameter has position 1).
    pub position: Option<usize>,
}

impl<'a> NamingContext<'a> {
    pub fn for_function(function_name: &'a str) -> Self {
        Self {
            function_name: Some(function_name),
            position: None,
        }
    }

    pub fn at_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

/// Type argument names are short and capitalised (`T`, `T0`, `CoinType`
/// is not one).
fn is_type_parameter(ty: &str) -> bool {
    let mut chars = ty.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            ty.len() <= 2 && chars.all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

fn is_coin_like(base: &str) -> bool {
    base == "Coin" || base == "Balance"
}

fn pluralize(name: &str) -> String {
    if name.ends_with('s') {
        format!("{}_list", name)
    } else {
        format!("{}s", name)
    }
}

/// Step 1: well-known types, including coin/balance types named after
/// their generic argument.
fn table_name(ty: &str) -> Option<String> {
    let base = base_type_name(ty);
    let args = generic_arguments(ty);

    if is_coin_like(base) {
        let kind = snake_case(base);
        return Some(match args.first() {
            Some(arg) if !is_type_parameter(base_type_name(arg)) => {
                format!("{}_{}", snake_case(base_type_name(arg)), kind)
            }
            _ => kind,
        });
    }

    if base == "vector" {
        return Some(match args.first() {
            Some(elem) if strip_references(elem) == "u8" => "bytes".to_string(),
            Some(elem) => pluralize(&infer_without_context(elem)),
            None => "items".to_string(),
        });
    }

    TYPE_NAMES.get(base).map(|name| name.to_string())
}

/// Step 2: names implied by what the enclosing function does.
fn context_name(ty: &str, ctx: &NamingContext<'_>) -> Option<String> {
    let function = ctx.function_name?.to_lowercase();
    let base = base_type_name(ty);
    let position = ctx.position.unwrap_or(0);
    let coin = is_coin_like(base);
    let kind = snake_case(base);

    if function.contains("swap") {
        if coin {
            return Some(if position == 0 {
                format!("{}_in", kind)
            } else {
                format!("{}_out", kind)
            });
        }
        if base == "u64" {
            return Some(if position == 0 { "amount_in" } else { "min_amount_out" }.to_string());
        }
        return None;
    }

    if function.contains("transfer") {
        return match base {
            "address" => Some("recipient".to_string()),
            _ if coin => Some(kind),
            _ => None,
        };
    }

    if function.contains("deposit") {
        return match base {
            _ if coin => Some("payment".to_string()),
            "u64" => Some("amount".to_string()),
            _ => None,
        };
    }

    if function.contains("withdraw") || function.contains("mint") {
        return match base {
            "u64" => Some("amount".to_string()),
            "address" => Some("recipient".to_string()),
            _ => None,
        };
    }

    if function.contains("burn") {
        return match base {
            _ if coin => Some(format!("{}_to_burn", kind)),
            "u64" => Some("amount".to_string()),
            _ => None,
        };
    }

    None
}

/// Step 3: the bare type name.
fn fallback_name(ty: &str) -> String {
    let base = base_type_name(ty);
    if base.is_empty() || is_type_parameter(base) {
        return "value".to_string();
    }
    sanitize_identifier(&snake_case(base))
}

fn infer_without_context(ty: &str) -> String {
    table_name(ty).unwrap_or_else(|| fallback_name(ty))
}

fn avoid_reserved(name: String) -> String {
    if RESERVED.contains(name.as_str()) {
        format!("{}_", name)
    } else {
        name
    }
}

/// Picks a display name for a value of type `ty`.
pub fn infer_name(ty: &str, ctx: &NamingContext<'_>) -> String {
    let name = match context_name(ty, ctx) {
        Some(name) => name,
        None => infer_without_context(ty),
    };
    avoid_reserved(name)
}

/// Hands out unique names within one function. The first request for a
/// base name gets it unchanged; later ones get `_1`, `_2`, ...
#[derive(Debug, Clone, Default)]
pub struct NameAllocator {
    counters: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, base: &str) -> String {
        let base = if base.is_empty() { "value" } else { base };
        let counter = self.counters.entry(base.to_string()).or_insert(0);

        loop {
            let candidate = if *counter == 0 {
                base.to_string()
            } else {
                format!("{}_{}", base, counter)
            };
            *counter += 1;

            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }
}
