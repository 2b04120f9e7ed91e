//! Flat structural model of a single source file

pub mod ordered;

pub use ordered::OrderedMap;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel used when a parameter or field carries no type annotation
pub const UNTYPED: &str = "any";

/// Function parameter; `param_type` is the annotation's literal source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
}

/// A function, arrow/function-expression binding, method or constructor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRecord {
    /// `name`, `Class.method` or `Class.constructor`
    pub name: String,
    pub params: Vec<Parameter>,
    /// Zero or one entries
    pub return_types: Vec<String>,
    pub is_async: bool,
    pub is_exported: bool,
    pub start_line: usize,
    pub end_line: usize,
    pub body_text: String,
}

impl FunctionRecord {
    /// Parameters, return annotation and async flag all match
    pub fn same_signature(&self, other: &FunctionRecord) -> bool {
        self.params == other.params
            && self.return_types == other.return_types
            && self.is_async == other.is_async
    }
}

/// Kind of a named type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Interface,
    Type,
    Class,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Interface => write!(f, "interface"),
            TypeKind::Type => write!(f, "type"),
            TypeKind::Class => write!(f, "class"),
        }
    }
}

/// An interface, type alias or class with its flat property members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRecord {
    pub name: String,
    pub kind: TypeKind,
    /// Field name to literal type text
    pub fields: OrderedMap<String>,
    pub is_exported: bool,
    pub start_line: usize,
    pub end_line: usize,
}

/// Everything extracted from one file.
///
/// Keys are unique per file: a later declaration with the same name replaces
/// the earlier one (shadowed locals and overloads collapse, which is lossy).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceModel {
    pub functions: OrderedMap<FunctionRecord>,
    pub types: OrderedMap<TypeRecord>,
    /// Module path to default-import alias (empty when there is none)
    pub imports: OrderedMap<String>,
}

impl SourceModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.types.is_empty() && self.imports.is_empty()
    }
}
