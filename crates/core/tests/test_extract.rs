//! Tests for source model extraction

use std::path::{Path, PathBuf};
use structlens_core::{ModelExtractor, Parameter, SourceModel, TypeKind};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

fn extract(source: &str) -> SourceModel {
    ModelExtractor::new()
        .extract_source(source, Path::new("test.ts"))
        .unwrap()
}

fn param(name: &str, ty: &str) -> Parameter {
    Parameter {
        name: name.to_string(),
        param_type: ty.to_string(),
    }
}

// ── Functions ──────────────────────────────────────────────────────────────

#[test]
fn test_exported_async_function() {
    let model = extract(
        "export async function load(id: string, opts?: Options): Promise<User> {\n\
         \x20 return fetch(id);\n}\n",
    );

    let load = model.functions.get("load").expect("load extracted");
    let expected = vec![param("id", "string"), param("opts", "Options")];
    assert_eq!(load.params, expected);
    assert_eq!(load.return_types, vec!["Promise<User>".to_string()]);
    assert!(load.is_async);
    assert!(load.is_exported);
    assert_eq!((load.start_line, load.end_line), (1, 3));
    assert!(load.body_text.contains("return fetch(id);"));
}

#[test]
fn test_arrow_binding_spans_statement() {
    let model = extract("const add = (a: number, b = 2) =>\n  a + b;\n");

    let add = model.functions.get("add").expect("add extracted");
    assert_eq!(add.params, vec![param("a", "number"), param("b", "any")]);
    assert!(add.return_types.is_empty());
    assert!(!add.is_async);
    assert!(!add.is_exported);
    assert_eq!((add.start_line, add.end_line), (1, 2));
    assert_eq!(add.body_text, "a + b");
}

#[test]
fn test_function_expression_binding() {
    let source = "export let handler = async function (event) { return event; };\n";
    let model = extract(source);

    let handler = model.functions.get("handler").expect("handler extracted");
    assert_eq!(handler.params, vec![param("event", "any")]);
    assert!(handler.is_async);
    assert!(handler.is_exported);
}

#[test]
fn test_rest_parameter_drops_ellipsis() {
    let model = extract("function join(sep: string, ...parts: string[]) {}\n");

    let join = model.functions.get("join").unwrap();
    assert_eq!(
        join.params,
        vec![param("sep", "string"), param("parts", "string[]")]
    );
}

#[test]
fn test_non_function_binding_ignored() {
    let model = extract("const limit = 10;\nconst [first] = items;\n");
    assert!(model.functions.is_empty());
}

#[test]
fn test_nested_declarations_are_flat() {
    let source = "function outer() {\n  function inner() {}\n  const cb = () => 1;\n}\n";
    let model = extract(source);

    let names: Vec<&str> = model.functions.keys().collect();
    assert_eq!(names, vec!["outer", "inner", "cb"]);
}

#[test]
fn test_duplicate_name_last_wins_first_position() {
    let model = extract("function f(a) {}\nfunction g() {}\nfunction f(b, c) {}\n");

    let names: Vec<&str> = model.functions.keys().collect();
    assert_eq!(names, vec!["f", "g"]);
    assert_eq!(model.functions.get("f").unwrap().params.len(), 2);
}

// ── Types ──────────────────────────────────────────────────────────────────

#[test]
fn test_interface_fields_in_order() {
    let source = "export interface User {\n  id: number;\n  name?: string;\n  tags: string[];\n}\n";
    let model = extract(source);

    let user = model.types.get("User").expect("User extracted");
    assert_eq!(user.kind, TypeKind::Interface);
    assert!(user.is_exported);
    let fields: Vec<(&str, &String)> = user.fields.iter().collect();
    assert_eq!(
        fields,
        vec![
            ("id", &"number".to_string()),
            ("name", &"string".to_string()),
            ("tags", &"string[]".to_string()),
        ]
    );
    assert_eq!((user.start_line, user.end_line), (1, 5));
}

#[test]
fn test_type_alias_object_and_union() {
    let source = "type Point = { x: number; y: number };\ntype Id = string | number;\n";
    let model = extract(source);

    let point = model.types.get("Point").unwrap();
    assert_eq!(point.kind, TypeKind::Type);
    assert_eq!(point.fields.keys().collect::<Vec<_>>(), vec!["x", "y"]);

    let id = model.types.get("Id").unwrap();
    assert_eq!(id.kind, TypeKind::Type);
    assert!(id.fields.is_empty());
}

#[test]
fn test_class_fields_and_methods() {
    let source = r#"export class Service {
  private url: string;
  count = 0;

  constructor(url: string) {
    this.url = url;
  }

  get size(): number {
    return 1;
  }

  async fetch(id: string): Promise<void> {}
}
"#;
    let model = extract(source);

    let service = model.types.get("Service").expect("class extracted");
    assert_eq!(service.kind, TypeKind::Class);
    assert_eq!(service.fields.get("url"), Some(&"string".to_string()));
    assert_eq!(service.fields.get("count"), Some(&"any".to_string()));

    let names: Vec<&str> = model.functions.keys().collect();
    assert_eq!(names, vec!["Service.constructor", "Service.fetch"]);

    let fetch = model.functions.get("Service.fetch").unwrap();
    assert!(fetch.is_async);
    assert!(fetch.is_exported);
    assert_eq!(fetch.return_types, vec!["Promise<void>".to_string()]);
}

#[test]
fn test_abstract_methods_and_overloads() {
    let source = r#"export abstract class Store {
  abstract load(id: string): Promise<Item>;
  save(item: Item): void;
  save(items: Item[]): void;
  save(input: any): void {
    this.write(input);
  }
}
"#;
    let model = extract(source);

    let names: Vec<&str> = model.functions.keys().collect();
    assert_eq!(names, vec!["Store.load", "Store.save"]);

    let load = model.functions.get("Store.load").unwrap();
    assert_eq!(load.params, vec![param("id", "string")]);
    assert_eq!(load.return_types, vec!["Promise<Item>".to_string()]);
    assert!(load.body_text.is_empty());
    assert!(load.is_exported);

    // The implementation is declared last and wins
    let save = model.functions.get("Store.save").unwrap();
    assert_eq!(save.params, vec![param("input", "any")]);
    assert!(save.body_text.contains("this.write(input);"));
    assert_eq!(save.start_line, 5);
}

// ── Imports ────────────────────────────────────────────────────────────────

#[test]
fn test_import_aliases() {
    let source = "import React from 'react';\nimport { a } from './a';\n\
                  import * as fs from \"fs\";\nimport './side-effect';\n";
    let model = extract(source);

    let imports: Vec<(&str, &String)> = model.imports.iter().collect();
    assert_eq!(
        imports,
        vec![
            ("react", &"React".to_string()),
            ("./a", &String::new()),
            ("fs", &String::new()),
            ("./side-effect", &String::new()),
        ]
    );
}

// ── Files ──────────────────────────────────────────────────────────────────

#[test]
fn test_missing_and_empty_paths_give_empty_model() {
    let extractor = ModelExtractor::new();
    assert!(extractor.extract_file(Path::new("")).unwrap().is_empty());
    assert!(extractor
        .extract_file(Path::new("/definitely/not/here.ts"))
        .unwrap()
        .is_empty());
}

#[test]
fn test_non_utf8_file_gives_empty_model() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("binary.ts");
    std::fs::write(&path, [0xff, 0xfe, 0x00, 0x41]).unwrap();

    let model = ModelExtractor::new().extract_file(&path).unwrap();
    assert!(model.is_empty());
}

#[test]
fn test_tsx_file_parses_jsx() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "view.tsx",
        "export function View(props: Props) {\n  return <div>{props.title}</div>;\n}\n",
    );

    let model = ModelExtractor::new().extract_file(&path).unwrap();
    let view = model.functions.get("View").expect("View extracted");
    assert_eq!(view.params, vec![param("props", "Props")]);
    assert!(view.is_exported);
}
