//! Source model extraction: functions, types and imports of one file
//!
//! A single pre-order walk over the syntax tree, driven by an explicit work
//! stack. Each node kind maps to at most one handler in [`ModelBuilder::visit`];
//! every node is descended into regardless, so nested declarations are found
//! too. The resulting model is flat and not scope-aware.

use crate::model::{
    FunctionRecord, OrderedMap, Parameter, SourceModel, TypeKind, TypeRecord, UNTYPED,
};
use crate::parser::syntax::{self, SyntaxKind};
use crate::parser::{ParseError, SourceParser};
use std::path::Path;
use tree_sitter::{Node, Tree};

// Tests live in crates/core/tests/test_extract.rs

/// Builds [`SourceModel`]s from files or source text
#[derive(Debug, Default)]
pub struct ModelExtractor {
    parser: SourceParser,
}

impl ModelExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract a file's model.
    ///
    /// An empty path, a missing file or unreadable contents give an empty
    /// model so that added and deleted files can be diffed.
    pub fn extract_file(&self, path: &Path) -> Result<SourceModel, ParseError> {
        if path.as_os_str().is_empty() || !path.is_file() {
            tracing::debug!(path = %path.display(), "no file, using empty model");
            return Ok(SourceModel::new());
        }

        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                tracing::debug!(
                    path = %path.display(),
                    error = %e,
                    "unreadable file, using empty model"
                );
                return Ok(SourceModel::new());
            }
        };

        self.extract_source(&source, path)
    }

    /// Extract a model from source text; `path` selects the grammar
    pub fn extract_source(&self, source: &str, path: &Path) -> Result<SourceModel, ParseError> {
        let tree = self.parser.parse_source(source, path)?;
        Ok(extract_from_tree(&tree, source))
    }
}

/// Walk an already parsed tree
pub fn extract_from_tree(tree: &Tree, source: &str) -> SourceModel {
    let mut builder = ModelBuilder {
        source,
        model: SourceModel::new(),
    };

    let mut stack = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        builder.visit(&node);

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    builder.model
}

struct ModelBuilder<'s> {
    source: &'s str,
    model: SourceModel,
}

impl<'s> ModelBuilder<'s> {
    fn visit(&mut self, node: &Node<'_>) {
        match SyntaxKind::of(node) {
            SyntaxKind::ImportStatement => self.import(node),
            SyntaxKind::FunctionDeclaration
            | SyntaxKind::GeneratorFunctionDeclaration
            | SyntaxKind::FunctionSignature => self.function_declaration(node),
            SyntaxKind::LexicalDeclaration | SyntaxKind::VariableDeclaration => {
                self.variable_statement(node)
            }
            SyntaxKind::InterfaceDeclaration => self.interface(node),
            SyntaxKind::TypeAliasDeclaration => self.type_alias(node),
            SyntaxKind::ClassDeclaration | SyntaxKind::AbstractClassDeclaration => {
                self.class(node)
            }
            _ => {}
        }
    }

    fn import(&mut self, node: &Node<'_>) {
        let Some(module) = syntax::import_source(node, self.source) else {
            return;
        };

        let alias = syntax::import_clause(node)
            .and_then(|clause| {
                let mut cursor = clause.walk();
                let default = clause
                    .named_children(&mut cursor)
                    .find(|c| SyntaxKind::of(c) == SyntaxKind::Identifier);
                default
            })
            .map(|ident| syntax::text(&ident, self.source).to_string())
            .unwrap_or_default();

        self.model.imports.insert(module, alias);
    }

    fn function_declaration(&mut self, node: &Node<'_>) {
        let Some(name) = syntax::field_text(node, "name", self.source) else {
            return;
        };
        let exported = syntax::is_exported(node);
        let record = self.function_record(name.to_string(), node, node, exported);
        self.model.functions.insert(record.name.clone(), record);
    }

    /// `const f = () => ...` and `let g = function () {}`
    fn variable_statement(&mut self, node: &Node<'_>) {
        let exported = syntax::is_exported(node);
        let mut cursor = node.walk();
        for declarator in node.named_children(&mut cursor) {
            if SyntaxKind::of(&declarator) != SyntaxKind::VariableDeclarator {
                continue;
            }
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            if SyntaxKind::of(&name_node) != SyntaxKind::Identifier {
                continue;
            }
            let Some(value) = declarator.child_by_field_name("value") else {
                continue;
            };
            if !SyntaxKind::of(&value).is_function_value() {
                continue;
            }

            let name = syntax::text(&name_node, self.source).to_string();
            let record = self.function_record(name, &value, node, exported);
            self.model.functions.insert(record.name.clone(), record);
        }
    }

    fn interface(&mut self, node: &Node<'_>) {
        let Some(name) = syntax::field_text(node, "name", self.source) else {
            return;
        };
        let fields = node
            .child_by_field_name("body")
            .map(|body| self.property_signatures(&body))
            .unwrap_or_default();

        self.insert_type(name, TypeKind::Interface, fields, node);
    }

    fn type_alias(&mut self, node: &Node<'_>) {
        let Some(name) = syntax::field_text(node, "name", self.source) else {
            return;
        };
        // Unions, primitives and mapped types are tracked without fields
        let fields = node
            .child_by_field_name("value")
            .filter(|value| SyntaxKind::of(value) == SyntaxKind::ObjectType)
            .map(|value| self.property_signatures(&value))
            .unwrap_or_default();

        self.insert_type(name, TypeKind::Type, fields, node);
    }

    fn class(&mut self, node: &Node<'_>) {
        let Some(class_name) = syntax::field_text(node, "name", self.source) else {
            return;
        };
        let exported = syntax::is_exported(node);
        let mut fields = OrderedMap::new();

        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                match SyntaxKind::of(&member) {
                    SyntaxKind::PublicFieldDefinition => {
                        if let Some(field) = syntax::field_text(&member, "name", self.source) {
                            fields.insert(field.to_string(), self.member_type(&member));
                        }
                    }
                    // Signatures cover overloads and abstract methods
                    SyntaxKind::MethodDefinition | SyntaxKind::MethodSignature => {
                        // Accessors are properties, not callable members
                        let getter = syntax::has_keyword(&member, "get");
                        if getter || syntax::has_keyword(&member, "set") {
                            continue;
                        }
                        let Some(method) = syntax::field_text(&member, "name", self.source) else {
                            continue;
                        };
                        let qualified = format!("{}.{}", class_name, method);
                        let record = self.function_record(qualified, &member, &member, exported);
                        self.model.functions.insert(record.name.clone(), record);
                    }
                    _ => {}
                }
            }
        }

        self.insert_type(class_name, TypeKind::Class, fields, node);
    }

    fn property_signatures(&self, body: &Node<'_>) -> OrderedMap<String> {
        let mut fields = OrderedMap::new();
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            if SyntaxKind::of(&member) != SyntaxKind::PropertySignature {
                continue;
            }
            if let Some(field) = syntax::field_text(&member, "name", self.source) {
                fields.insert(field.to_string(), self.member_type(&member));
            }
        }
        fields
    }

    fn member_type(&self, member: &Node<'_>) -> String {
        member
            .child_by_field_name("type")
            .and_then(|t| syntax::type_annotation_text(&t, self.source))
            .unwrap_or_else(|| UNTYPED.to_string())
    }

    fn insert_type(
        &mut self,
        name: &str,
        kind: TypeKind,
        fields: OrderedMap<String>,
        node: &Node<'_>,
    ) {
        self.model.types.insert(
            name.to_string(),
            TypeRecord {
                name: name.to_string(),
                kind,
                fields,
                is_exported: syntax::is_exported(node),
                start_line: syntax::start_line(node),
                end_line: syntax::end_line(node),
            },
        );
    }

    /// `function_node` carries parameters, annotations and body; `span` gives
    /// the reported line range (the whole statement for variable bindings).
    fn function_record(
        &self,
        name: String,
        function_node: &Node<'_>,
        span: &Node<'_>,
        is_exported: bool,
    ) -> FunctionRecord {
        let params = syntax::parameters(function_node, self.source)
            .into_iter()
            .map(|p| Parameter {
                name: p.name,
                param_type: p.type_text.unwrap_or_else(|| UNTYPED.to_string()),
            })
            .collect();

        let body_text = function_node
            .child_by_field_name("body")
            .map(|body| syntax::text(&body, self.source).to_string())
            .unwrap_or_default();

        FunctionRecord {
            name,
            params,
            return_types: syntax::return_type_text(function_node, self.source)
                .into_iter()
                .collect(),
            is_async: syntax::has_keyword(function_node, "async"),
            is_exported,
            start_line: syntax::start_line(span),
            end_line: syntax::end_line(span),
            body_text,
        }
    }
}
