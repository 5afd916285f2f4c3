// Fri Jan 16 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Copy,
    Drop,
    Store,
    Key,
}

impl Ability {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "copy" => Some(Ability::Copy),
            "drop" => Some(Ability::Drop),
            "store" => Some(Ability::Store),
            "key" => Some(Ability::Key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Ability::Copy => "copy",
            Ability::Drop => "drop",
            Ability::Store => "store",
            Ability::Key => "key",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub field_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructBlock {
    pub name: String,
    pub type_parameters: Vec<String>,
    /// Abilities in declaration order, without duplicates.
    pub abilities: Vec<Ability>,
    pub fields: Vec<StructField>,
}

impl StructBlock {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_parameters: Vec::new(),
            abilities: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn add_ability(&mut self, ability: Ability) {
        if !self.abilities.contains(&ability) {
            self.abilities.push(ability);
        }
    }

    pub fn add_field(&mut self, name: &str, field_type: &str) {
        self.fields.push(StructField {
            name: name.to_string(),
            field_type: field_type.to_string(),
        });
    }

    pub fn has_ability(&self, ability: Ability) -> bool {
        self.abilities.contains(&ability)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    Public,
    PublicEntry,
    Entry,
    Friend,
    Private,
}

impl Visibility {
    /// Folds the modifier words of a function header into one visibility.
    pub fn from_modifiers<'a, I>(modifiers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut public = false;
        let mut entry = false;
        let mut friend = false;

        for word in modifiers {
            match word {
                "public" => public = true,
                "entry" => entry = true,
                "friend" | "public(friend)" | "public(package)" => friend = true,
                _ => {}
            }
        }

        match (public, entry, friend) {
            (_, _, true) => Visibility::Friend,
            (true, true, _) => Visibility::PublicEntry,
            (true, false, _) => Visibility::Public,
            (false, true, _) => Visibility::Entry,
            _ => Visibility::Private,
        }
    }

    /// Keyword prefix used in front of `fun` when rendering.
    pub fn keyword(&self) -> &'static str {
        match self {
            Visibility::Public => "public ",
            Visibility::PublicEntry => "public entry ",
            Visibility::Entry => "entry ",
            Visibility::Friend => "public(friend) ",
            Visibility::Private => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: String,
}

impl Parameter {
    pub fn new(name: &str, param_type: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type: param_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionBlock {
    pub visibility: Visibility,
    pub name: String,
    pub type_parameters: Vec<String>,
    pub parameters: Vec<Parameter>,
    /// Empty for functions returning unit.
    pub return_type: String,
    pub body_lines: Vec<String>,
}

impl FunctionBlock {
    pub fn new(visibility: Visibility, name: &str) -> Self {
        Self {
            visibility,
            name: name.to_string(),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: String::new(),
            body_lines: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, name: &str, param_type: &str) -> Self {
        self.parameters.push(Parameter::new(name, param_type));
        self
    }

    pub fn with_return_type(mut self, return_type: &str) -> Self {
        self.return_type = return_type.trim().to_string();
        self
    }

    pub fn with_body<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body_lines = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn returns_unit(&self) -> bool {
        let ret = self.return_type.trim();
        ret.is_empty() || ret == "()"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseDecl {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstDecl {
    pub name: String,
    pub const_type: String,
    pub value: String,
}

/// A function after interpretation: its header, the display names chosen
/// for its parameters, and the reconstructed body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecompiledFunction {
    pub visibility: Visibility,
    pub name: String,
    pub type_parameters: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: String,
    pub statements: Vec<String>,
}

impl DecompiledFunction {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecompiledModule {
    pub module_name: String,
    pub uses: Vec<UseDecl>,
    pub constants: Vec<ConstDecl>,
    pub structs: Vec<StructBlock>,
    pub functions: Vec<DecompiledFunction>,
}

impl DecompiledModule {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            uses: Vec::new(),
            constants: Vec::new(),
            structs: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn get_function(&self, name: &str) -> Option<&DecompiledFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn statement_count(&self) -> usize {
        self.functions.iter().map(|f| f.statements.len()).sum()
    }
}
