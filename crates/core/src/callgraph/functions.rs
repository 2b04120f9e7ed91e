//! Function discovery and call-site collection for one parsed file

use super::CallSite;
use crate::parser::syntax::{self, SyntaxKind};
use crate::parser::ParsedSource;
use crate::resolve::{CallContext, CallSiteResolver, LocalScope};
use std::path::PathBuf;
use tree_sitter::Node;

/// A function found in a file, before caller relationships are known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFunction {
    pub name: String,
    pub file: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
    pub call_sites: Vec<CallSite>,
}

/// Every function-like declaration of a file, in pre-order.
///
/// Covers function declarations, function-valued `const`/`let`/`var`
/// bindings, class methods and constructors (`Class.method`), and
/// object-literal methods or function-valued properties (bare key).
pub fn extract_functions(
    parsed: &ParsedSource,
    resolver: &CallSiteResolver<'_>,
) -> Vec<ParsedFunction> {
    let walker = FunctionWalker { parsed, resolver };
    let mut functions = Vec::new();

    let mut stack: Vec<(Node<'_>, Option<String>)> = vec![(parsed.root(), None)];
    while let Some((node, class)) = stack.pop() {
        let kind = SyntaxKind::of(&node);
        walker.visit(&node, kind, class.as_deref(), &mut functions);

        // `this` inside nested code refers to the innermost class
        let inner_class = if kind.is_class() {
            syntax::field_text(&node, "name", &parsed.source)
                .map(str::to_string)
                .or(class)
        } else {
            class
        };

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        stack.extend(
            children
                .into_iter()
                .rev()
                .map(|child| (child, inner_class.clone())),
        );
    }

    tracing::debug!(
        file = %parsed.path.display(),
        functions = functions.len(),
        "extracted functions"
    );
    functions
}

struct FunctionWalker<'a, 'r> {
    parsed: &'a ParsedSource,
    resolver: &'a CallSiteResolver<'r>,
}

impl FunctionWalker<'_, '_> {
    fn source(&self) -> &str {
        &self.parsed.source
    }

    fn visit(
        &self,
        node: &Node<'_>,
        kind: SyntaxKind,
        class: Option<&str>,
        out: &mut Vec<ParsedFunction>,
    ) {
        match kind {
            k if k.is_function_declaration() => {
                if let Some(name) = syntax::field_text(node, "name", self.source()) {
                    out.push(self.function(name.to_string(), node, node, class));
                }
            }
            k if k.is_variable_statement() => {
                let mut cursor = node.walk();
                for declarator in node.named_children(&mut cursor) {
                    if SyntaxKind::of(&declarator) != SyntaxKind::VariableDeclarator {
                        continue;
                    }
                    let name = declarator
                        .child_by_field_name("name")
                        .filter(|n| SyntaxKind::of(n) == SyntaxKind::Identifier);
                    let value = declarator
                        .child_by_field_name("value")
                        .filter(|v| SyntaxKind::of(v).is_function_value());
                    if let (Some(name), Some(value)) = (name, value) {
                        let name = syntax::text(&name, self.source()).to_string();
                        out.push(self.function(name, &value, node, class));
                    }
                }
            }
            k if k.is_class() => self.class_members(node, out),
            SyntaxKind::Pair => {
                let value = node
                    .child_by_field_name("value")
                    .filter(|v| SyntaxKind::of(v).is_function_value());
                if let (Some(key), Some(value)) =
                    (syntax::field_text(node, "key", self.source()), value)
                {
                    out.push(self.function(unquote(key), &value, node, class));
                }
            }
            // Shorthand methods of object literals; class methods are
            // handled with their class
            SyntaxKind::MethodDefinition if in_object_literal(node) => {
                if let Some(name) = syntax::field_text(node, "name", self.source()) {
                    out.push(self.function(unquote(name), node, node, class));
                }
            }
            _ => {}
        }
    }

    fn class_members(&self, class_node: &Node<'_>, out: &mut Vec<ParsedFunction>) {
        let Some(class_name) = syntax::field_text(class_node, "name", self.source()) else {
            return;
        };
        let Some(body) = class_node.child_by_field_name("body") else {
            return;
        };

        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            if SyntaxKind::of(&member) != SyntaxKind::MethodDefinition {
                continue;
            }
            if syntax::has_keyword(&member, "get") || syntax::has_keyword(&member, "set") {
                continue;
            }
            if let Some(method) = syntax::field_text(&member, "name", self.source()) {
                let name = format!("{}.{}", class_name, method);
                out.push(self.function(name, &member, &member, Some(class_name)));
            }
        }
    }

    /// `function_node` owns the body and parameters; `span` gives the lines
    fn function(
        &self,
        name: String,
        function_node: &Node<'_>,
        span: &Node<'_>,
        class: Option<&str>,
    ) -> ParsedFunction {
        let locals = LocalScope::collect(function_node, self.source());
        let ctx = CallContext {
            file: &self.parsed.path,
            class,
            locals: &locals,
        };
        let call_sites = function_node
            .child_by_field_name("body")
            .map(|body| self.call_sites(&body, &ctx))
            .unwrap_or_default();

        ParsedFunction {
            name,
            file: self.parsed.path.clone(),
            start_line: syntax::start_line(span),
            end_line: syntax::end_line(span),
            call_sites,
        }
    }

    /// Every call and `new` expression in the subtree, nested callbacks included
    fn call_sites(&self, body: &Node<'_>, ctx: &CallContext<'_>) -> Vec<CallSite> {
        let source = self.source();
        let mut sites = Vec::new();

        let mut stack = vec![*body];
        while let Some(node) = stack.pop() {
            match SyntaxKind::of(&node) {
                SyntaxKind::CallExpression if !is_tagged_template(&node) => {
                    if let Some(target) = self.resolver.resolve_call(&node, source, ctx) {
                        sites.push(CallSite::at(&node, source, target));
                    }
                }
                SyntaxKind::NewExpression => {
                    let target = self.resolver.resolve_new(&node, source);
                    sites.push(CallSite::at(&node, source, target));
                }
                _ => {}
            }

            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }

        sites
    }
}

/// tree-sitter parses tag`...` as a call whose arguments are a template
fn is_tagged_template(call: &Node<'_>) -> bool {
    call.child_by_field_name("arguments")
        .map(|args| SyntaxKind::of(&args) == SyntaxKind::TemplateString)
        .unwrap_or(false)
}

fn in_object_literal(node: &Node<'_>) -> bool {
    node.parent()
        .map(|p| SyntaxKind::of(&p) == SyntaxKind::Object)
        .unwrap_or(false)
}

fn unquote(key: &str) -> String {
    key.trim_matches(|c| c == '\'' || c == '"').to_string()
}
