//! Local bindings visible from inside one function body.
//!
//! Flat and approximate: every parameter and declarator anywhere in the
//! function, including nested callbacks, shares one namespace.

use crate::parser::syntax::{self, SyntaxKind};
use std::collections::HashMap;
use tree_sitter::Node;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalBinding {
    /// A nested function or function-valued variable
    Function,
    /// Annotated, or initialised with `new Type(...)`
    Typed(String),
    Untyped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalScope {
    bindings: HashMap<String, LocalBinding>,
}

impl LocalScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the parameters and body-local bindings of a function-like node
    pub fn collect(function_node: &Node<'_>, source: &str) -> Self {
        let mut scope = Self::new();
        scope.add_parameters(function_node, source);

        let Some(body) = function_node.child_by_field_name("body") else {
            return scope;
        };

        let mut stack = vec![body];
        while let Some(node) = stack.pop() {
            match SyntaxKind::of(&node) {
                SyntaxKind::VariableDeclarator => scope.add_declarator(&node, source),
                kind if kind.is_function_declaration() => {
                    if let Some(name) = syntax::field_text(&node, "name", source) {
                        scope.insert(name, LocalBinding::Function);
                    }
                    scope.add_parameters(&node, source);
                }
                kind if kind.is_function_value() => scope.add_parameters(&node, source),
                _ => {}
            }

            let mut cursor = node.walk();
            stack.extend(node.named_children(&mut cursor));
        }

        scope
    }

    pub fn insert(&mut self, name: impl Into<String>, binding: LocalBinding) {
        self.bindings.insert(name.into(), binding);
    }

    pub fn get(&self, name: &str) -> Option<&LocalBinding> {
        self.bindings.get(name)
    }

    fn add_parameters(&mut self, function_node: &Node<'_>, source: &str) {
        for param in syntax::parameters(function_node, source) {
            let binding = match param.type_text {
                Some(t) => LocalBinding::Typed(t),
                None => LocalBinding::Untyped,
            };
            self.insert(param.name, binding);
        }
    }

    fn add_declarator(&mut self, declarator: &Node<'_>, source: &str) {
        let Some(name_node) = declarator.child_by_field_name("name") else {
            return;
        };
        if SyntaxKind::of(&name_node) != SyntaxKind::Identifier {
            return;
        }
        let name = syntax::text(&name_node, source);
        self.insert(name, declared_binding(declarator, source));
    }
}

/// What a `name = value` declarator tells us about `name`
pub(crate) fn declared_binding(declarator: &Node<'_>, source: &str) -> LocalBinding {
    if let Some(annotation) = declarator
        .child_by_field_name("type")
        .and_then(|t| syntax::type_annotation_text(&t, source))
    {
        return LocalBinding::Typed(annotation);
    }

    let Some(value) = declarator.child_by_field_name("value") else {
        return LocalBinding::Untyped;
    };
    match SyntaxKind::of(&value) {
        kind if kind.is_function_value() => LocalBinding::Function,
        SyntaxKind::NewExpression => value
            .child_by_field_name("constructor")
            .filter(|c| {
                matches!(
                    SyntaxKind::of(c),
                    SyntaxKind::Identifier | SyntaxKind::MemberExpression
                )
            })
            .map(|c| LocalBinding::Typed(syntax::text(&c, source).to_string()))
            .unwrap_or(LocalBinding::Untyped),
        _ => LocalBinding::Untyped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SourceParser;
    use std::path::Path;

    #[test]
    fn test_collect_params_and_locals() {
        let source = r#"
function run(api: Api, count) {
    const repo = new Repo();
    const cb = () => 1;
    let plain = compute();
    function inner() {}
}
"#;
        let tree = SourceParser::default()
            .parse_source(source, Path::new("a.ts"))
            .unwrap();
        let root = tree.root_node();
        let function = root.named_child(0).unwrap();
        let scope = LocalScope::collect(&function, source);

        assert_eq!(scope.get("api"), Some(&LocalBinding::Typed("Api".into())));
        assert_eq!(scope.get("count"), Some(&LocalBinding::Untyped));
        assert_eq!(scope.get("repo"), Some(&LocalBinding::Typed("Repo".into())));
        assert_eq!(scope.get("cb"), Some(&LocalBinding::Function));
        assert_eq!(scope.get("plain"), Some(&LocalBinding::Untyped));
        assert_eq!(scope.get("inner"), Some(&LocalBinding::Function));
        assert!(scope.get("run").is_none());
    }
}
