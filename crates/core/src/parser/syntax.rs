//! Closed set of tree-sitter node kinds the engine reacts to, plus small
//! text and position helpers shared by the extractors.

use tree_sitter::Node;

/// Node kinds the extractors dispatch on. Everything else is `Other` and is
/// only descended into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    ImportStatement,
    ExportStatement,
    FunctionDeclaration,
    GeneratorFunctionDeclaration,
    FunctionSignature,
    LexicalDeclaration,
    VariableDeclaration,
    VariableDeclarator,
    ArrowFunction,
    FunctionExpression,
    InterfaceDeclaration,
    TypeAliasDeclaration,
    ClassDeclaration,
    AbstractClassDeclaration,
    ClassBody,
    MethodDefinition,
    PublicFieldDefinition,
    PropertySignature,
    MethodSignature,
    ObjectType,
    Object,
    Pair,
    CallExpression,
    NewExpression,
    MemberExpression,
    SubscriptExpression,
    ParenthesizedExpression,
    Identifier,
    This,
    Super,
    String,
    TemplateString,
    Other,
}

impl SyntaxKind {
    pub fn of(node: &Node<'_>) -> Self {
        Self::from_kind(node.kind())
    }

    pub fn from_kind(kind: &str) -> Self {
        match kind {
            "import_statement" => SyntaxKind::ImportStatement,
            "export_statement" => SyntaxKind::ExportStatement,
            "function_declaration" => SyntaxKind::FunctionDeclaration,
            "generator_function_declaration" => SyntaxKind::GeneratorFunctionDeclaration,
            "function_signature" => SyntaxKind::FunctionSignature,
            "lexical_declaration" => SyntaxKind::LexicalDeclaration,
            "variable_declaration" => SyntaxKind::VariableDeclaration,
            "variable_declarator" => SyntaxKind::VariableDeclarator,
            "arrow_function" => SyntaxKind::ArrowFunction,
            "function_expression" | "function" | "generator_function" => {
                SyntaxKind::FunctionExpression
            }
            "interface_declaration" => SyntaxKind::InterfaceDeclaration,
            "type_alias_declaration" => SyntaxKind::TypeAliasDeclaration,
            "class_declaration" => SyntaxKind::ClassDeclaration,
            "abstract_class_declaration" => SyntaxKind::AbstractClassDeclaration,
            "class_body" => SyntaxKind::ClassBody,
            "method_definition" => SyntaxKind::MethodDefinition,
            "public_field_definition" => SyntaxKind::PublicFieldDefinition,
            "property_signature" => SyntaxKind::PropertySignature,
            "method_signature" | "abstract_method_signature" => SyntaxKind::MethodSignature,
            "object_type" | "interface_body" => SyntaxKind::ObjectType,
            "object" => SyntaxKind::Object,
            "pair" => SyntaxKind::Pair,
            "call_expression" => SyntaxKind::CallExpression,
            "new_expression" => SyntaxKind::NewExpression,
            "member_expression" => SyntaxKind::MemberExpression,
            "subscript_expression" => SyntaxKind::SubscriptExpression,
            "parenthesized_expression" => SyntaxKind::ParenthesizedExpression,
            "identifier" => SyntaxKind::Identifier,
            "this" => SyntaxKind::This,
            "super" => SyntaxKind::Super,
            "string" => SyntaxKind::String,
            "template_string" => SyntaxKind::TemplateString,
            _ => SyntaxKind::Other,
        }
    }

    /// Class declarations in both their plain and `abstract` spellings
    pub fn is_class(self) -> bool {
        matches!(
            self,
            SyntaxKind::ClassDeclaration | SyntaxKind::AbstractClassDeclaration
        )
    }

    /// Named function statements, including overload signatures
    pub fn is_function_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::FunctionDeclaration
                | SyntaxKind::GeneratorFunctionDeclaration
                | SyntaxKind::FunctionSignature
        )
    }

    /// Function values that can initialise a binding
    pub fn is_function_value(self) -> bool {
        matches!(
            self,
            SyntaxKind::ArrowFunction | SyntaxKind::FunctionExpression
        )
    }

    pub fn is_variable_statement(self) -> bool {
        matches!(
            self,
            SyntaxKind::LexicalDeclaration | SyntaxKind::VariableDeclaration
        )
    }
}

/// A parameter as written in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSyntax {
    pub name: String,
    pub type_text: Option<String>,
    /// Declared with an accessibility or `readonly` modifier, which makes a
    /// constructor parameter a class property as well
    pub is_property: bool,
}

/// Source text of a node, or the empty string when the slice is not UTF-8
pub fn text<'s>(node: &Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Text of a named field child
pub fn field_text<'s>(node: &Node<'_>, field: &str, source: &'s str) -> Option<&'s str> {
    node.child_by_field_name(field).map(|n| text(&n, source))
}

/// 1-based first line of a node
pub fn start_line(node: &Node<'_>) -> usize {
    node.start_position().row + 1
}

/// 1-based last line of a node
pub fn end_line(node: &Node<'_>) -> usize {
    node.end_position().row + 1
}

/// 1-based column of a node's first character, counted in characters
pub fn start_column(node: &Node<'_>, source: &str) -> usize {
    let start = node.start_byte();
    let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    source
        .get(line_start..start)
        .map(|prefix| prefix.chars().count())
        .unwrap_or(node.start_position().column)
        + 1
}

/// Whether an anonymous keyword token (e.g. `async`, `get`) is a direct child
pub fn has_keyword(node: &Node<'_>, keyword: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == keyword);
    found
}

/// Whether the declaration sits directly inside an `export` statement
pub fn is_exported(node: &Node<'_>) -> bool {
    node.parent()
        .map(|p| SyntaxKind::of(&p) == SyntaxKind::ExportStatement)
        .unwrap_or(false)
}

/// Extract the type text from a type_annotation node (strips the leading ":")
///
/// Other annotation shapes (`asserts x`, type predicates) are kept verbatim.
pub fn type_annotation_text(node: &Node<'_>, source: &str) -> Option<String> {
    if node.kind() == "type_annotation" {
        let count = node.child_count();
        if count > 0 {
            let type_node = node.child(count - 1)?;
            return Some(text(&type_node, source).to_string());
        }
    }
    let raw = text(node, source).trim_start_matches(':').trim();
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Return annotation of a function-like node
pub fn return_type_text(node: &Node<'_>, source: &str) -> Option<String> {
    node.child_by_field_name("return_type")
        .and_then(|t| type_annotation_text(&t, source))
}

/// Parameters of a function-like node in declaration order
pub fn parameters(node: &Node<'_>, source: &str) -> Vec<ParameterSyntax> {
    if let Some(params) = node.child_by_field_name("parameters") {
        return formal_parameters(&params, source);
    }
    // Single parameter arrow function without parens: x => x + 1
    if let Some(param) = node.child_by_field_name("parameter") {
        return vec![ParameterSyntax {
            name: text(&param, source).to_string(),
            type_text: None,
            is_property: false,
        }];
    }
    Vec::new()
}

fn formal_parameters(params: &Node<'_>, source: &str) -> Vec<ParameterSyntax> {
    let mut result = Vec::new();
    let mut cursor = params.walk();

    for child in params.named_children(&mut cursor) {
        match child.kind() {
            "required_parameter" | "optional_parameter" => {
                let Some(pattern) = child.child_by_field_name("pattern") else {
                    continue;
                };
                let name = text(&pattern, source).trim_start_matches("...").to_string();
                let type_text = child
                    .child_by_field_name("type")
                    .and_then(|t| type_annotation_text(&t, source));
                let is_property = {
                    let mut inner = child.walk();
                    let found = child.children(&mut inner).any(|c| {
                        c.kind() == "accessibility_modifier" || c.kind() == "readonly"
                    });
                    found
                };
                result.push(ParameterSyntax {
                    name,
                    type_text,
                    is_property,
                });
            }
            // JavaScript-style parameters without wrappers
            "identifier" => result.push(ParameterSyntax {
                name: text(&child, source).to_string(),
                type_text: None,
                is_property: false,
            }),
            "assignment_pattern" => {
                if let Some(left) = child.child_by_field_name("left") {
                    result.push(ParameterSyntax {
                        name: text(&left, source).to_string(),
                        type_text: None,
                        is_property: false,
                    });
                }
            }
            "rest_pattern" => result.push(ParameterSyntax {
                name: text(&child, source).trim_start_matches("...").to_string(),
                type_text: None,
                is_property: false,
            }),
            _ => {}
        }
    }

    result
}

/// Module specifier of an import statement, without quotes
pub fn import_source(node: &Node<'_>, source: &str) -> Option<String> {
    let source_node = node.child_by_field_name("source")?;
    if SyntaxKind::of(&source_node) != SyntaxKind::String {
        return None;
    }
    Some(
        text(&source_node, source)
            .trim_matches(|c| c == '\'' || c == '"')
            .to_string(),
    )
}

/// The `import_clause` child of an import statement, if any
pub fn import_clause<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let clause = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "import_clause");
    clause
}

/// Name of the superclass in a class declaration's `extends` clause
pub fn extends_name(class_node: &Node<'_>, source: &str) -> Option<String> {
    let mut cursor = class_node.walk();
    let heritage = class_node
        .children(&mut cursor)
        .find(|c| c.kind() == "class_heritage")?;

    let mut heritage_cursor = heritage.walk();
    let extends = heritage
        .children(&mut heritage_cursor)
        .find(|c| c.kind() == "extends_clause")?;

    let value = extends.child_by_field_name("value").or_else(|| {
        let mut ext_cursor = extends.walk();
        let first = extends.named_children(&mut ext_cursor).next();
        first
    })?;
    Some(text(&value, source).to_string())
}

/// Reduce an annotation like `Repo<User>` or `Readonly<Api>` to the bare
/// type name used for member lookups. Unions, arrays and object types give
/// `None`.
pub fn simple_type_name(type_text: &str) -> Option<&str> {
    let trimmed = type_text.trim();
    let head = trimmed.split('<').next().unwrap_or(trimmed).trim();
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    if head.is_empty() || !head.chars().all(is_ident) {
        return None;
    }
    Some(head)
}
