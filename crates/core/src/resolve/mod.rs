//! Call-site resolution: turns call and `new` expressions into target names
//!
//! Resolution goes through the [`SymbolResolver`] capability. Full mode uses a
//! [`DeclarationIndex`] built once over the whole file set; light mode uses
//! [`NullResolver`] and reports callee source text verbatim.

pub mod index;
pub mod modules;
pub mod scope;

pub use index::DeclarationIndex;
pub use scope::{LocalBinding, LocalScope};

use crate::parser::syntax::{self, SyntaxKind};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// Built-ins and globals that would otherwise dominate every call graph
pub const DEFAULT_IGNORED_CALLEES: &[&str] = &[
    "require",
    "console.log",
    "console.error",
    "console.warn",
    "console.info",
    "console.debug",
    "JSON.stringify",
    "JSON.parse",
    "Object.keys",
    "Object.values",
    "Object.entries",
];

/// Placeholder for element-access callees that could not be resolved
pub const DYNAMIC_TARGET: &str = "<dynamic>";
/// Placeholder for callees with no usable name
pub const ANONYMOUS_TARGET: &str = "<anonymous>";

/// How call targets are named for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionMode {
    /// Index-assisted resolution with canonical names
    #[default]
    Full,
    /// Callee source text only
    Light,
}

/// Exact-match set of `object.member` or bare identifiers to drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSet {
    names: HashSet<String>,
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORED_CALLEES.iter().copied())
    }
}

impl IgnoreSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// An empty set, so every call is recorded
    pub fn none() -> Self {
        Self {
            names: HashSet::new(),
        }
    }

    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `foo(...)`, `obj.member(...)` and `obj['member'](...)` forms
    pub fn matches_callee(&self, callee: &CalleeExpr) -> bool {
        match callee {
            CalleeExpr::Identifier(name) => self.contains(name),
            CalleeExpr::Member {
                object, property, ..
            } => match object.as_ref() {
                CalleeExpr::Identifier(obj) => self.contains(&format!("{}.{}", obj, property)),
                _ => false,
            },
            _ => false,
        }
    }
}

/// Syntax-independent shape of a callee expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalleeExpr {
    Identifier(String),
    This,
    Super,
    /// `object.property`, or `object['property']` when `subscript` is set
    Member {
        object: Box<CalleeExpr>,
        property: String,
        subscript: bool,
    },
    /// `object[expr]` with a computed key
    Computed { object: Box<CalleeExpr> },
    /// Call results, parenthesized and other expressions
    Other,
}

impl CalleeExpr {
    pub fn from_node(node: &Node<'_>, source: &str) -> Self {
        match SyntaxKind::of(node) {
            SyntaxKind::Identifier => {
                CalleeExpr::Identifier(syntax::text(node, source).to_string())
            }
            SyntaxKind::This => CalleeExpr::This,
            SyntaxKind::Super => CalleeExpr::Super,
            SyntaxKind::MemberExpression => {
                let object = node
                    .child_by_field_name("object")
                    .map(|o| CalleeExpr::from_node(&o, source))
                    .unwrap_or(CalleeExpr::Other);
                match syntax::field_text(node, "property", source) {
                    Some(property) => CalleeExpr::Member {
                        object: Box::new(object),
                        property: property.to_string(),
                        subscript: false,
                    },
                    None => CalleeExpr::Other,
                }
            }
            SyntaxKind::SubscriptExpression => {
                let object = Box::new(
                    node.child_by_field_name("object")
                        .map(|o| CalleeExpr::from_node(&o, source))
                        .unwrap_or(CalleeExpr::Other),
                );
                match node.child_by_field_name("index") {
                    Some(index) if SyntaxKind::of(&index) == SyntaxKind::String => {
                        CalleeExpr::Member {
                            object,
                            property: syntax::text(&index, source)
                                .trim_matches(|c| c == '\'' || c == '"')
                                .to_string(),
                            subscript: true,
                        }
                    }
                    _ => CalleeExpr::Computed { object },
                }
            }
            _ => CalleeExpr::Other,
        }
    }

    /// Member or element access, i.e. a method-style call
    pub fn is_method(&self) -> bool {
        matches!(
            self,
            CalleeExpr::Member { .. } | CalleeExpr::Computed { .. }
        )
    }
}

/// Kind of declaration a callee resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Function,
    Variable,
    Class,
    Constructor,
    Method,
    Property,
    Accessor,
}

/// Named declaration that encloses a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    Class(String),
    Interface(String),
    /// Object literal bound to a variable
    Object(String),
}

/// Where a resolved callee is declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationSite {
    pub name: String,
    pub kind: DeclarationKind,
    pub container: Option<Container>,
    /// `None` for symbols from modules outside the analyzed file set
    pub file: Option<PathBuf>,
}

impl DeclarationSite {
    /// Stable, container-qualified name.
    ///
    /// `Class.constructor`, then `Class.member` / `Interface.member`, then
    /// `fileStem.name`, then the bare name. The base name of each form is
    /// still the plain symbol name.
    pub fn canonical_name(&self) -> String {
        match (&self.kind, &self.container) {
            (DeclarationKind::Constructor, Some(Container::Class(class))) => {
                return format!("{}.constructor", class);
            }
            (
                DeclarationKind::Method | DeclarationKind::Property | DeclarationKind::Accessor,
                Some(Container::Class(owner) | Container::Interface(owner)),
            ) => return format!("{}.{}", owner, self.name),
            _ => {}
        }

        match self
            .file
            .as_deref()
            .and_then(Path::file_stem)
            .and_then(|s| s.to_str())
        {
            Some(stem) if !stem.is_empty() && !self.name.is_empty() => {
                format!("{}.{}", stem, self.name)
            }
            _ => self.name.clone(),
        }
    }
}

/// What the resolver knows about the call's surroundings
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    pub file: &'a Path,
    /// Class whose body encloses the call, for `this` and `super`
    pub class: Option<&'a str>,
    pub locals: &'a LocalScope,
}

/// Capability that maps a callee to its declaration
pub trait SymbolResolver {
    fn resolve(&self, callee: &CalleeExpr, ctx: &CallContext<'_>) -> Option<DeclarationSite>;
}

/// Resolves nothing; the light-mode resolver
#[derive(Debug, Default, Clone, Copy)]
pub struct NullResolver;

impl SymbolResolver for NullResolver {
    fn resolve(&self, _callee: &CalleeExpr, _ctx: &CallContext<'_>) -> Option<DeclarationSite> {
        None
    }
}

static NULL_RESOLVER: NullResolver = NullResolver;

/// Target name of one call or construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTarget {
    pub target: String,
    pub is_method: bool,
}

/// Names call and `new` expressions, dropping ignored built-ins
pub struct CallSiteResolver<'r> {
    resolver: &'r dyn SymbolResolver,
    ignore: &'r IgnoreSet,
    mode: ResolutionMode,
}

impl<'r> CallSiteResolver<'r> {
    pub fn full(resolver: &'r dyn SymbolResolver, ignore: &'r IgnoreSet) -> Self {
        Self {
            resolver,
            ignore,
            mode: ResolutionMode::Full,
        }
    }

    pub fn light(ignore: &'r IgnoreSet) -> Self {
        Self {
            resolver: &NULL_RESOLVER,
            ignore,
            mode: ResolutionMode::Light,
        }
    }

    /// Target of a `call_expression`, or `None` when the call is ignored
    pub fn resolve_call(
        &self,
        call: &Node<'_>,
        source: &str,
        ctx: &CallContext<'_>,
    ) -> Option<CallTarget> {
        let callee_node = call.child_by_field_name("function")?;
        let callee = CalleeExpr::from_node(&callee_node, source);
        if self.ignore.matches_callee(&callee) {
            return None;
        }

        let is_method = callee.is_method();
        let target = match self.mode {
            ResolutionMode::Light => syntax::text(&callee_node, source).to_string(),
            ResolutionMode::Full => match self.resolver.resolve(&callee, ctx) {
                Some(site) => site.canonical_name(),
                None => fallback_target(&callee, &callee_node, source),
            },
        };

        if self.ignore.contains(&target) {
            return None;
        }

        Some(CallTarget { target, is_method })
    }

    /// Target of a `new_expression`
    pub fn resolve_new(&self, new_expr: &Node<'_>, source: &str) -> CallTarget {
        let constructor = new_expr.child_by_field_name("constructor");
        let target = match (self.mode, constructor) {
            (ResolutionMode::Light, Some(c)) => format!("new {}", syntax::text(&c, source)),
            (ResolutionMode::Full, Some(c))
                if matches!(
                    SyntaxKind::of(&c),
                    SyntaxKind::Identifier | SyntaxKind::MemberExpression
                ) =>
            {
                format!("new {}", syntax::text(&c, source))
            }
            _ => format!("new {}", ANONYMOUS_TARGET),
        };

        CallTarget {
            target,
            is_method: false,
        }
    }
}

/// Textual name for a callee the resolver could not place
fn fallback_target(callee: &CalleeExpr, node: &Node<'_>, source: &str) -> String {
    match callee {
        CalleeExpr::Identifier(name) => name.clone(),
        CalleeExpr::Member {
            subscript: false, ..
        } => syntax::text(node, source).to_string(),
        CalleeExpr::Member { subscript: true, .. } | CalleeExpr::Computed { .. } => {
            DYNAMIC_TARGET.to_string()
        }
        _ => ANONYMOUS_TARGET.to_string(),
    }
}

/// Suffix after the last `.`, used for loose name matching
pub fn base_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("UserService.getUser"), "getUser");
        assert_eq!(base_name("greet"), "greet");
        assert_eq!(base_name("a.b.c"), "c");
    }

    #[test]
    fn test_canonical_name_precedence() {
        let ctor = DeclarationSite {
            name: "constructor".into(),
            kind: DeclarationKind::Constructor,
            container: Some(Container::Class("UserService".into())),
            file: Some(PathBuf::from("/src/service.ts")),
        };
        assert_eq!(ctor.canonical_name(), "UserService.constructor");

        let method = DeclarationSite {
            name: "get".into(),
            kind: DeclarationKind::Method,
            container: Some(Container::Interface("Api".into())),
            file: Some(PathBuf::from("/src/api.ts")),
        };
        assert_eq!(method.canonical_name(), "Api.get");

        let function = DeclarationSite {
            name: "helper".into(),
            kind: DeclarationKind::Function,
            container: None,
            file: Some(PathBuf::from("/src/util.ts")),
        };
        assert_eq!(function.canonical_name(), "util.helper");

        let external = DeclarationSite {
            name: "hash".into(),
            kind: DeclarationKind::Function,
            container: None,
            file: None,
        };
        assert_eq!(external.canonical_name(), "hash");
    }

    #[test]
    fn test_ignore_set_matches_callee_forms() {
        let ignore = IgnoreSet::default();
        let require = CalleeExpr::Identifier("require".into());
        assert!(ignore.matches_callee(&require));
        assert!(ignore.matches_callee(&CalleeExpr::Member {
            object: Box::new(CalleeExpr::Identifier("console".into())),
            property: "log".into(),
            subscript: true,
        }));
        assert!(!ignore.matches_callee(&CalleeExpr::Member {
            object: Box::new(CalleeExpr::This),
            property: "log".into(),
            subscript: false,
        }));
        assert!(IgnoreSet::none().is_empty());
    }
}
