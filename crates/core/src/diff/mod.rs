//! Structural diff between two versions of a file's source model
//!
//! Identity is the declaration name only: a renamed function or type shows up
//! as one removal plus one addition.

use crate::model::{FunctionRecord, OrderedMap, Parameter, SourceModel, TypeKind, TypeRecord};
use serde::{Deserialize, Serialize};

/// Kind of a change between two model versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "added",
            ChangeType::Removed => "removed",
            ChangeType::Modified => "modified",
        }
    }
}

/// Signature view of a function as reported in diffs (body text omitted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub params: Vec<Parameter>,
    pub returns: Vec<String>,
    pub is_async: bool,
    pub is_exported: bool,
    pub start_line: usize,
    pub end_line: usize,
}

impl From<&FunctionRecord> for FunctionSignature {
    fn from(record: &FunctionRecord) -> Self {
        Self {
            params: record.params.clone(),
            returns: record.return_types.clone(),
            is_async: record.is_async,
            is_exported: record.is_exported,
            start_line: record.start_line,
            end_line: record.end_line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDiff {
    pub name: String,
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<FunctionSignature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<FunctionSignature>,
    /// Which aspects changed, e.g. `parameters changed, implementation changed`
    #[serde(rename = "body_diff", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiff {
    pub name: String,
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDiff {
    pub name: String,
    pub kind: TypeKind,
    pub change_type: ChangeType,
    /// Present on modified types only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDiff>>,
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDiff {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub change_type: ChangeType,
}

/// Per-category change counts, always derived from the diff lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub functions_added: usize,
    pub functions_removed: usize,
    pub functions_modified: usize,
    pub types_added: usize,
    pub types_removed: usize,
    pub types_modified: usize,
    pub imports_added: usize,
    pub imports_removed: usize,
}

impl ChangeSummary {
    pub fn from_diffs(
        functions: &[FunctionDiff],
        types: &[TypeDiff],
        imports: &[ImportDiff],
    ) -> Self {
        let functions: Vec<ChangeType> = functions.iter().map(|f| f.change_type).collect();
        let types: Vec<ChangeType> = types.iter().map(|t| t.change_type).collect();
        let imports: Vec<ChangeType> = imports.iter().map(|i| i.change_type).collect();

        Self {
            functions_added: count(&functions, ChangeType::Added),
            functions_removed: count(&functions, ChangeType::Removed),
            functions_modified: count(&functions, ChangeType::Modified),
            types_added: count(&types, ChangeType::Added),
            types_removed: count(&types, ChangeType::Removed),
            types_modified: count(&types, ChangeType::Modified),
            imports_added: count(&imports, ChangeType::Added),
            imports_removed: count(&imports, ChangeType::Removed),
        }
    }

    pub fn total(&self) -> usize {
        self.functions_added
            + self.functions_removed
            + self.functions_modified
            + self.types_added
            + self.types_removed
            + self.types_modified
            + self.imports_added
            + self.imports_removed
    }
}

fn count(changes: &[ChangeType], wanted: ChangeType) -> usize {
    changes.iter().filter(|c| **c == wanted).count()
}

/// Result of comparing two source models
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralDiff {
    pub functions: Vec<FunctionDiff>,
    pub types: Vec<TypeDiff>,
    pub imports: Vec<ImportDiff>,
}

impl StructuralDiff {
    pub fn summary(&self) -> ChangeSummary {
        ChangeSummary::from_diffs(&self.functions, &self.types, &self.imports)
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.types.is_empty() && self.imports.is_empty()
    }
}

/// Compare two models. Removed and modified entries follow `before`'s
/// declaration order, added entries follow `after`'s.
pub fn diff_models(before: &SourceModel, after: &SourceModel) -> StructuralDiff {
    StructuralDiff {
        functions: compare_functions(&before.functions, &after.functions),
        types: compare_types(&before.types, &after.types),
        imports: compare_imports(&before.imports, &after.imports),
    }
}

fn compare_functions(
    before: &OrderedMap<FunctionRecord>,
    after: &OrderedMap<FunctionRecord>,
) -> Vec<FunctionDiff> {
    let mut diffs = Vec::new();

    for (name, old) in before.iter() {
        let Some(new) = after.get(name) else {
            diffs.push(FunctionDiff {
                name: name.to_string(),
                change_type: ChangeType::Removed,
                before: Some(old.into()),
                after: None,
                note: None,
            });
            continue;
        };

        // Body comparison is textual: whitespace-only edits count
        let body_changed = old.body_text != new.body_text;
        if old.same_signature(new) && !body_changed {
            continue;
        }

        let mut changes = Vec::new();
        if old.params != new.params {
            changes.push("parameters changed");
        }
        if old.return_types != new.return_types {
            changes.push("return type changed");
        }
        if old.is_async != new.is_async {
            changes.push("async modifier changed");
        }
        if body_changed {
            changes.push("implementation changed");
        }

        diffs.push(FunctionDiff {
            name: name.to_string(),
            change_type: ChangeType::Modified,
            before: Some(old.into()),
            after: Some(new.into()),
            note: Some(changes.join(", ")),
        });
    }

    for (name, new) in after.iter() {
        if !before.contains_key(name) {
            diffs.push(FunctionDiff {
                name: name.to_string(),
                change_type: ChangeType::Added,
                before: None,
                after: Some(new.into()),
                note: None,
            });
        }
    }

    diffs
}

fn compare_types(before: &OrderedMap<TypeRecord>, after: &OrderedMap<TypeRecord>) -> Vec<TypeDiff> {
    let mut diffs = Vec::new();

    for (name, old) in before.iter() {
        let Some(new) = after.get(name) else {
            diffs.push(TypeDiff {
                name: name.to_string(),
                kind: old.kind,
                change_type: ChangeType::Removed,
                fields: None,
                start_line: old.start_line,
                end_line: old.end_line,
            });
            continue;
        };

        let field_diffs = compare_fields(&old.fields, &new.fields);
        // Same kind and no field changes counts as unchanged, even if
        // the lines or export flag moved
        if field_diffs.is_empty() && old.kind == new.kind {
            continue;
        }

        diffs.push(TypeDiff {
            name: name.to_string(),
            kind: new.kind,
            change_type: ChangeType::Modified,
            fields: Some(field_diffs),
            start_line: new.start_line,
            end_line: new.end_line,
        });
    }

    for (name, new) in after.iter() {
        if !before.contains_key(name) {
            diffs.push(TypeDiff {
                name: name.to_string(),
                kind: new.kind,
                change_type: ChangeType::Added,
                fields: None,
                start_line: new.start_line,
                end_line: new.end_line,
            });
        }
    }

    diffs
}

fn compare_fields(before: &OrderedMap<String>, after: &OrderedMap<String>) -> Vec<FieldDiff> {
    let mut diffs = Vec::new();

    for (name, old_type) in before.iter() {
        match after.get(name) {
            None => diffs.push(FieldDiff {
                name: name.to_string(),
                change_type: ChangeType::Removed,
                old_type: Some(old_type.clone()),
                new_type: None,
            }),
            Some(new_type) if new_type != old_type => diffs.push(FieldDiff {
                name: name.to_string(),
                change_type: ChangeType::Modified,
                old_type: Some(old_type.clone()),
                new_type: Some(new_type.clone()),
            }),
            Some(_) => {}
        }
    }

    for (name, new_type) in after.iter() {
        if !before.contains_key(name) {
            diffs.push(FieldDiff {
                name: name.to_string(),
                change_type: ChangeType::Added,
                old_type: None,
                new_type: Some(new_type.clone()),
            });
        }
    }

    diffs
}

/// Presence only: an alias change on a kept import is not reported
fn compare_imports(before: &OrderedMap<String>, after: &OrderedMap<String>) -> Vec<ImportDiff> {
    let alias = |a: &String| if a.is_empty() { None } else { Some(a.clone()) };
    let mut diffs = Vec::new();

    for (path, old_alias) in before.iter() {
        if !after.contains_key(path) {
            diffs.push(ImportDiff {
                path: path.to_string(),
                alias: alias(old_alias),
                change_type: ChangeType::Removed,
            });
        }
    }

    for (path, new_alias) in after.iter() {
        if !before.contains_key(path) {
            diffs.push(ImportDiff {
                path: path.to_string(),
                alias: alias(new_alias),
                change_type: ChangeType::Added,
            });
        }
    }

    diffs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(name: &str, body: &str) -> FunctionRecord {
        FunctionRecord {
            name: name.to_string(),
            params: vec![],
            return_types: vec![],
            is_async: false,
            is_exported: false,
            start_line: 1,
            end_line: 1,
            body_text: body.to_string(),
        }
    }

    #[test]
    fn test_whitespace_body_change_is_modification() {
        let mut before = SourceModel::new();
        before.functions.insert("f", function("f", "{ return 1; }"));
        let mut after = SourceModel::new();
        after.functions.insert("f", function("f", "{  return 1; }"));

        let diff = diff_models(&before, &after);
        assert_eq!(diff.functions.len(), 1);
        assert_eq!(diff.functions[0].change_type, ChangeType::Modified);
        assert_eq!(
            diff.functions[0].note.as_deref(),
            Some("implementation changed")
        );
    }

    #[test]
    fn test_import_alias_change_not_reported() {
        let mut before = SourceModel::new();
        before.imports.insert("axios", "axios".to_string());
        let mut after = SourceModel::new();
        after.imports.insert("axios", "http".to_string());

        assert!(diff_models(&before, &after).is_empty());
    }

    #[test]
    fn test_summary_counts_follow_lists() {
        let mut before = SourceModel::new();
        before.functions.insert("gone", function("gone", "{}"));
        let mut after = SourceModel::new();
        after.functions.insert("fresh", function("fresh", "{}"));
        after.imports.insert("./util", String::new());

        let diff = diff_models(&before, &after);
        let summary = diff.summary();
        assert_eq!(summary.functions_added, 1);
        assert_eq!(summary.functions_removed, 1);
        assert_eq!(summary.imports_added, 1);
        assert_eq!(summary.total(), 3);
        assert_eq!(diff.imports[0].alias, None);
    }
}
