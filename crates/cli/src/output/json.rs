//! JSON output documents

use anyhow::Result;
use serde::{Deserialize, Serialize};
use structlens_core::{ChangeSummary, FunctionDiff, ImportDiff, StructuralDiff, TypeDiff};

/// Language tag carried by every diff document
pub const LANGUAGE: &str = "typescript";

/// Output of the diff tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffDocument {
    pub language: String,
    pub file_path: String,
    pub functions: Vec<FunctionDiff>,
    pub types: Vec<TypeDiff>,
    pub imports: Vec<ImportDiff>,
    pub summary: ChangeSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DiffDocument {
    pub fn new(file_path: &str, diff: StructuralDiff) -> Self {
        let summary = diff.summary();
        Self {
            language: LANGUAGE.to_string(),
            file_path: file_path.to_string(),
            functions: diff.functions,
            types: diff.types,
            imports: diff.imports,
            summary,
            error: None,
        }
    }

    /// Empty lists, zero summary and the failure message
    pub fn failed(file_path: &str, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(file_path, StructuralDiff::default())
        }
    }
}

/// Two-space indented JSON
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
