//! Tests for structural diffs between file versions.
//!
//! Each test writes a before/after pair to a temp dir, extracts both models
//! and compares them.

use std::path::{Path, PathBuf};
use structlens_core::{
    diff_models, ChangeType, ModelExtractor, SourceModel, StructuralDiff, TypeKind,
};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn model(path: &Path) -> SourceModel {
    ModelExtractor::new().extract_file(path).unwrap()
}

fn model_of(source: &str) -> SourceModel {
    ModelExtractor::new()
        .extract_source(source, Path::new("inline.ts"))
        .unwrap()
}

fn change_of(diff: &StructuralDiff, name: &str) -> Option<ChangeType> {
    diff.functions
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.change_type)
}

const BEFORE: &str = r#"interface User {
  id: number;
  name: string;
}

function greet(name: string): string {
  return `Hello, ${name}`;
}

const formatName = (user: User): string => {
  return user.name;
};

class UserService {
  constructor(private baseUrl: string) {}

  getUser(id: number): User {
    return { id, name: "x" };
  }
}
"#;

const AFTER: &str = r#"interface User {
  id: number;
  name: string;
  email: string;
  isActive: boolean;
}

function greet(name: string, greeting?: string): string {
  return `Hello, ${name}`;
}

function validateEmail(email: string): boolean {
  return email.includes("@");
}

class UserService {
  constructor(private baseUrl: string, private config: object) {}

  getUser(id: number): User {
    return { id, name: "x" };
  }

  updateUser(user: User): void {}
}
"#;

// ── Fixture pair ───────────────────────────────────────────────────────────

#[test]
fn test_fixture_pair_types() {
    let dir = TempDir::new().unwrap();
    let before = write(&dir, "before.ts", BEFORE);
    let after = write(&dir, "after.ts", AFTER);

    let diff = diff_models(&model(&before), &model(&after));

    assert_eq!(diff.types.len(), 1, "types: {:?}", diff.types);
    let user = &diff.types[0];
    assert_eq!(user.name, "User");
    assert_eq!(user.kind, TypeKind::Interface);
    assert_eq!(user.change_type, ChangeType::Modified);

    let fields = user.fields.as_ref().expect("modified type carries fields");
    let added: Vec<(&str, Option<&str>)> = fields
        .iter()
        .map(|f| {
            assert_eq!(f.change_type, ChangeType::Added);
            (f.name.as_str(), f.new_type.as_deref())
        })
        .collect();
    assert_eq!(
        added,
        vec![("email", Some("string")), ("isActive", Some("boolean"))]
    );
}

#[test]
fn test_fixture_pair_functions() {
    let diff = diff_models(&model_of(BEFORE), &model_of(AFTER));

    assert_eq!(change_of(&diff, "formatName"), Some(ChangeType::Removed));
    assert_eq!(change_of(&diff, "validateEmail"), Some(ChangeType::Added));
    assert_eq!(change_of(&diff, "greet"), Some(ChangeType::Modified));
    assert_eq!(
        change_of(&diff, "UserService.constructor"),
        Some(ChangeType::Modified)
    );
    assert_eq!(
        change_of(&diff, "UserService.updateUser"),
        Some(ChangeType::Added)
    );
    assert_eq!(change_of(&diff, "UserService.getUser"), None);

    let greet = diff.functions.iter().find(|f| f.name == "greet").unwrap();
    assert_eq!(greet.note.as_deref(), Some("parameters changed"));
    assert_eq!(greet.before.as_ref().unwrap().params.len(), 1);
    assert_eq!(greet.after.as_ref().unwrap().params.len(), 2);

    // Removed and modified follow before's order, added come last
    let order: Vec<&str> = diff.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "greet",
            "formatName",
            "UserService.constructor",
            "validateEmail",
            "UserService.updateUser",
        ]
    );

    let summary = diff.summary();
    assert_eq!(summary.functions_added, 2);
    assert_eq!(summary.functions_removed, 1);
    assert_eq!(summary.functions_modified, 2);
    assert_eq!(summary.types_modified, 1);
}

#[test]
fn test_change_records_carry_expected_sides() {
    let diff = diff_models(&model_of(BEFORE), &model_of(AFTER));

    for function in &diff.functions {
        match function.change_type {
            ChangeType::Added => {
                assert!(function.before.is_none() && function.after.is_some());
                assert!(function.note.is_none());
            }
            ChangeType::Removed => {
                assert!(function.before.is_some() && function.after.is_none());
            }
            ChangeType::Modified => {
                assert!(function.before.is_some() && function.after.is_some());
                assert!(function.note.is_some());
            }
        }
    }
}

// ── Properties ─────────────────────────────────────────────────────────────

#[test]
fn test_self_diff_is_empty() {
    let before = model_of(BEFORE);
    let diff = diff_models(&before, &before);

    assert!(diff.is_empty());
    assert_eq!(diff.summary().total(), 0);
}

#[test]
fn test_diff_is_symmetric() {
    let a = model_of(BEFORE);
    let b = model_of(AFTER);
    let forward = diff_models(&a, &b);
    let backward = diff_models(&b, &a);

    for f in &forward.functions {
        let mirrored = change_of(&backward, &f.name);
        match f.change_type {
            ChangeType::Added => assert_eq!(mirrored, Some(ChangeType::Removed)),
            ChangeType::Removed => assert_eq!(mirrored, Some(ChangeType::Added)),
            ChangeType::Modified => assert_eq!(mirrored, Some(ChangeType::Modified)),
        }
    }
    let (forward, backward) = (forward.summary(), backward.summary());
    assert_eq!(forward.functions_added, backward.functions_removed);
    assert_eq!(forward.imports_added, backward.imports_removed);
}

#[test]
fn test_rename_is_remove_plus_add() {
    let before = model_of("function oldName(x: number) {\n  return x * 2;\n}\n");
    let after = model_of("function newName(x: number) {\n  return x * 2;\n}\n");

    let diff = diff_models(&before, &after);
    assert_eq!(diff.functions.len(), 2);
    assert_eq!(change_of(&diff, "oldName"), Some(ChangeType::Removed));
    assert_eq!(change_of(&diff, "newName"), Some(ChangeType::Added));
}

// ── Edge cases ─────────────────────────────────────────────────────────────

#[test]
fn test_new_file_is_all_added() {
    let diff = diff_models(&SourceModel::new(), &model_of(AFTER));

    assert!(diff
        .functions
        .iter()
        .all(|f| f.change_type == ChangeType::Added));
    assert_eq!(diff.summary().functions_removed, 0);
    assert_eq!(diff.types.len(), 2);
}

#[test]
fn test_async_and_return_notes_in_order() {
    let before = model_of("function load(): string { return a; }\n");
    let after = model_of("async function load(): Promise<string> { return  a; }\n");

    let diff = diff_models(&before, &after);
    assert_eq!(
        diff.functions[0].note.as_deref(),
        Some("return type changed, async modifier changed, implementation changed")
    );
}

#[test]
fn test_type_kind_change_is_modified() {
    let before = model_of("interface Shape { x: number }\n");
    let after = model_of("type Shape = { x: number };\n");

    let diff = diff_models(&before, &after);
    assert_eq!(diff.types.len(), 1);
    assert_eq!(diff.types[0].change_type, ChangeType::Modified);
    assert_eq!(diff.types[0].kind, TypeKind::Type);
    assert_eq!(diff.types[0].fields.as_deref(), Some(&[][..]));
}

#[test]
fn test_field_type_change_and_import_changes() {
    let before_source = "import a from 'a';\ninterface Cfg { port: number; host: string }\n";
    let before = model_of(before_source);
    let after = model_of("import b from 'b';\ninterface Cfg { port: string }\n");

    let diff = diff_models(&before, &after);
    let fields = diff.types[0].fields.as_ref().unwrap();
    assert_eq!(fields[0].name, "port");
    assert_eq!(fields[0].change_type, ChangeType::Modified);
    assert_eq!(fields[0].old_type.as_deref(), Some("number"));
    assert_eq!(fields[0].new_type.as_deref(), Some("string"));
    assert_eq!(fields[1].name, "host");
    assert_eq!(fields[1].change_type, ChangeType::Removed);

    let imports: Vec<(&str, ChangeType)> = diff
        .imports
        .iter()
        .map(|i| (i.path.as_str(), i.change_type))
        .collect();
    assert_eq!(
        imports,
        vec![("a", ChangeType::Removed), ("b", ChangeType::Added)]
    );
    assert_eq!(diff.imports[0].alias.as_deref(), Some("a"));
}
