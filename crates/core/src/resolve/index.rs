//! Cross-file declaration index used by full-mode resolution.
//!
//! Built once over every parsed file, then queried per call site. Lookups
//! follow import bindings into other analyzed files, walk `extends` chains
//! for inherited members and use annotations or `new X()` initialisers to
//! type receivers. Anything it cannot place falls back to textual names.

use super::modules::resolve_module;
use super::scope::{declared_binding, LocalBinding};
use super::{CallContext, CalleeExpr, Container, DeclarationKind, DeclarationSite, SymbolResolver};
use crate::parser::syntax::{self, SyntaxKind};
use crate::parser::ParsedSource;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// Bound on import, inheritance and member-chain hops
const MAX_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Imported {
    Named(String),
    Default,
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ImportBinding {
    /// `None` for modules outside the file set
    target: Option<PathBuf>,
    imported: Imported,
}

#[derive(Debug, Clone, Default)]
struct VariableSymbol {
    type_name: Option<String>,
    /// Keys of an object-literal initialiser
    members: HashSet<String>,
}

#[derive(Debug, Clone)]
struct MemberSymbol {
    kind: DeclarationKind,
    type_name: Option<String>,
}

/// A class or interface with its own members and declared bases
#[derive(Debug, Clone, Default)]
struct TypeSymbol {
    bases: Vec<String>,
    members: HashMap<String, MemberSymbol>,
}

#[derive(Debug, Default)]
struct FileSymbols {
    functions: HashSet<String>,
    variables: HashMap<String, VariableSymbol>,
    classes: HashMap<String, TypeSymbol>,
    interfaces: HashMap<String, TypeSymbol>,
    imports: HashMap<String, ImportBinding>,
    default_export: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TypeRef {
    file: PathBuf,
    name: String,
    is_class: bool,
}

/// What a member access is performed on
#[derive(Debug, Clone)]
enum Receiver {
    Type(TypeRef),
    Module(PathBuf),
    Object { file: PathBuf, name: String },
}

/// Declarations of every analyzed file, keyed by path
#[derive(Debug, Default)]
pub struct DeclarationIndex {
    files: HashMap<PathBuf, FileSymbols>,
}

impl DeclarationIndex {
    pub fn build(sources: &[ParsedSource]) -> Self {
        let known: HashSet<PathBuf> = sources.iter().map(|s| s.path.clone()).collect();
        let files = sources
            .iter()
            .map(|parsed| (parsed.path.clone(), index_file(parsed, &known)))
            .collect();

        let index = Self { files };
        tracing::debug!(files = index.files.len(), "built declaration index");
        index
    }

    fn symbols(&self, file: &Path) -> Option<&FileSymbols> {
        self.files.get(file)
    }

    // ── Identifier bindings ─────────────────────────────────────────────────

    fn resolve_identifier(&self, name: &str, ctx: &CallContext<'_>) -> Option<DeclarationSite> {
        if let Some(binding) = ctx.locals.get(name) {
            let kind = match binding {
                LocalBinding::Function => DeclarationKind::Function,
                _ => DeclarationKind::Variable,
            };
            return Some(site(name, kind, None, Some(ctx.file)));
        }
        self.top_level(ctx.file, name, 0)
    }

    /// A file's own top-level declaration, or the declaration behind an import
    fn top_level(&self, file: &Path, name: &str, depth: usize) -> Option<DeclarationSite> {
        if depth > MAX_DEPTH {
            return None;
        }
        let symbols = self.symbols(file)?;

        if symbols.functions.contains(name) {
            return Some(site(name, DeclarationKind::Function, None, Some(file)));
        }
        if symbols.classes.contains_key(name) {
            return Some(site(name, DeclarationKind::Class, None, Some(file)));
        }
        if symbols.variables.contains_key(name) {
            return Some(site(name, DeclarationKind::Variable, None, Some(file)));
        }

        let import = symbols.imports.get(name)?;
        match (&import.target, &import.imported) {
            (Some(target), Imported::Named(original)) => {
                self.top_level(target, original, depth + 1)
            }
            (Some(target), Imported::Default) => {
                let exported = self.symbols(target)?.default_export.as_deref()?;
                self.top_level(target, exported, depth + 1)
            }
            // External named import: the alias unwraps to the imported name
            (None, Imported::Named(original)) => {
                Some(site(original, DeclarationKind::Function, None, None))
            }
            _ => None,
        }
    }

    // ── Receivers ───────────────────────────────────────────────────────────

    fn receiver(&self, expr: &CalleeExpr, ctx: &CallContext<'_>, depth: usize) -> Option<Receiver> {
        if depth > MAX_DEPTH {
            return None;
        }
        match expr {
            CalleeExpr::This => self
                .type_ref(ctx.file, ctx.class?, depth)
                .map(Receiver::Type),
            CalleeExpr::Super => self.base_of_enclosing(ctx, depth).map(Receiver::Type),
            CalleeExpr::Identifier(name) => match ctx.locals.get(name) {
                Some(LocalBinding::Typed(type_text)) => self
                    .type_ref(ctx.file, type_text, depth)
                    .map(Receiver::Type),
                Some(_) => None,
                None => self.named_receiver(ctx.file, name, depth),
            },
            CalleeExpr::Member {
                object, property, ..
            } => {
                let owner = self.receiver(object, ctx, depth + 1)?;
                self.member_receiver(&owner, property, depth + 1)
            }
            _ => None,
        }
    }

    /// Receiver named by a top-level identifier of `file`
    fn named_receiver(&self, file: &Path, name: &str, depth: usize) -> Option<Receiver> {
        if depth > MAX_DEPTH {
            return None;
        }
        let symbols = self.symbols(file)?;

        // Static access through the class itself
        if symbols.classes.contains_key(name) {
            return Some(Receiver::Type(TypeRef {
                file: file.to_path_buf(),
                name: name.to_string(),
                is_class: true,
            }));
        }

        if let Some(variable) = symbols.variables.get(name) {
            if let Some(type_name) = &variable.type_name {
                return self.type_ref(file, type_name, depth).map(Receiver::Type);
            }
            if !variable.members.is_empty() {
                return Some(Receiver::Object {
                    file: file.to_path_buf(),
                    name: name.to_string(),
                });
            }
            return None;
        }

        let import = symbols.imports.get(name)?;
        let target = import.target.as_deref()?;
        match &import.imported {
            Imported::Namespace => Some(Receiver::Module(target.to_path_buf())),
            Imported::Named(original) => self.named_receiver(target, original, depth + 1),
            Imported::Default => {
                let exported = self.symbols(target)?.default_export.as_deref()?;
                self.named_receiver(target, exported, depth + 1)
            }
        }
    }

    /// Receiver reached through `owner.property`
    fn member_receiver(&self, owner: &Receiver, property: &str, depth: usize) -> Option<Receiver> {
        match owner {
            Receiver::Type(type_ref) => {
                let (holder, member) = self.find_member(type_ref, property, depth)?;
                let type_name = member.type_name.as_deref()?;
                self.type_ref(&holder.file, type_name, depth + 1)
                    .map(Receiver::Type)
            }
            Receiver::Module(file) => self.named_receiver(file, property, depth + 1),
            Receiver::Object { .. } => None,
        }
    }

    // ── Types and members ───────────────────────────────────────────────────

    /// Class or interface named by an annotation, following imports
    fn type_ref(&self, file: &Path, type_text: &str, depth: usize) -> Option<TypeRef> {
        if depth > MAX_DEPTH {
            return None;
        }
        let name = syntax::simple_type_name(type_text)?;
        let symbols = self.symbols(file)?;

        if symbols.classes.contains_key(name) || symbols.interfaces.contains_key(name) {
            return Some(TypeRef {
                file: file.to_path_buf(),
                name: name.to_string(),
                is_class: symbols.classes.contains_key(name),
            });
        }

        let import = symbols.imports.get(name)?;
        let target = import.target.as_deref()?;
        match &import.imported {
            Imported::Named(original) => self.type_ref(target, original, depth + 1),
            Imported::Default => {
                let exported = self.symbols(target)?.default_export.as_deref()?;
                self.type_ref(target, exported, depth + 1)
            }
            Imported::Namespace => None,
        }
    }

    fn type_symbol(&self, type_ref: &TypeRef) -> Option<&TypeSymbol> {
        let symbols = self.symbols(&type_ref.file)?;
        if type_ref.is_class {
            symbols.classes.get(&type_ref.name)
        } else {
            symbols.interfaces.get(&type_ref.name)
        }
    }

    /// A member declared on the type or inherited from its bases
    fn find_member(
        &self,
        type_ref: &TypeRef,
        property: &str,
        depth: usize,
    ) -> Option<(TypeRef, &MemberSymbol)> {
        if depth > MAX_DEPTH {
            return None;
        }
        let symbol = self.type_symbol(type_ref)?;
        if let Some(member) = symbol.members.get(property) {
            return Some((type_ref.clone(), member));
        }

        symbol.bases.iter().find_map(|base| {
            let base_ref = self.type_ref(&type_ref.file, base, depth + 1)?;
            self.find_member(&base_ref, property, depth + 1)
        })
    }

    fn member_site(
        &self,
        owner: &Receiver,
        property: &str,
        depth: usize,
    ) -> Option<DeclarationSite> {
        match owner {
            Receiver::Type(type_ref) => {
                let (holder, member) = self.find_member(type_ref, property, depth)?;
                let container = if holder.is_class {
                    Container::Class(holder.name.clone())
                } else {
                    Container::Interface(holder.name.clone())
                };
                Some(site(
                    property,
                    member.kind,
                    Some(container),
                    Some(holder.file.as_path()),
                ))
            }
            Receiver::Module(file) => self.top_level(file, property, depth + 1),
            Receiver::Object { file, name } => {
                let variable = self.symbols(file)?.variables.get(name)?;
                variable.members.contains(property).then(|| {
                    site(
                        property,
                        DeclarationKind::Method,
                        Some(Container::Object(name.clone())),
                        Some(file.as_path()),
                    )
                })
            }
        }
    }

    fn base_of_enclosing(&self, ctx: &CallContext<'_>, depth: usize) -> Option<TypeRef> {
        let class = self.type_ref(ctx.file, ctx.class?, depth)?;
        let base = self.type_symbol(&class)?.bases.first()?;
        self.type_ref(&class.file, base, depth + 1)
    }

    /// `super(...)`: the base class constructor, or the base class itself
    /// when no constructor is declared anywhere up the chain
    fn resolve_super_call(&self, ctx: &CallContext<'_>) -> Option<DeclarationSite> {
        let base = self.base_of_enclosing(ctx, 0)?;
        if let Some(found) = self.member_site(&Receiver::Type(base.clone()), "constructor", 0) {
            return Some(found);
        }
        Some(site(
            &base.name,
            DeclarationKind::Class,
            None,
            Some(base.file.as_path()),
        ))
    }
}

impl SymbolResolver for DeclarationIndex {
    fn resolve(&self, callee: &CalleeExpr, ctx: &CallContext<'_>) -> Option<DeclarationSite> {
        match callee {
            CalleeExpr::Member {
                object, property, ..
            } => {
                let owner = self.receiver(object, ctx, 0)?;
                self.member_site(&owner, property, 0)
            }
            CalleeExpr::Identifier(name) => self.resolve_identifier(name, ctx),
            CalleeExpr::Super => self.resolve_super_call(ctx),
            _ => None,
        }
    }
}

fn site(
    name: &str,
    kind: DeclarationKind,
    container: Option<Container>,
    file: Option<&Path>,
) -> DeclarationSite {
    DeclarationSite {
        name: name.to_string(),
        kind,
        container,
        file: file.map(Path::to_path_buf),
    }
}

// ── Index construction ──────────────────────────────────────────────────────

fn index_file(parsed: &ParsedSource, known: &HashSet<PathBuf>) -> FileSymbols {
    let source = parsed.source.as_str();
    let mut symbols = FileSymbols::default();

    let mut stack = vec![parsed.root()];
    while let Some(node) = stack.pop() {
        match SyntaxKind::of(&node) {
            kind if kind.is_function_declaration() => {
                if let Some(name) = syntax::field_text(&node, "name", source) {
                    symbols.functions.insert(name.to_string());
                }
            }
            SyntaxKind::VariableDeclarator => index_declarator(&node, source, &mut symbols),
            kind if kind.is_class() => {
                if let Some(name) = syntax::field_text(&node, "name", source) {
                    symbols.classes.insert(name.to_string(), class_symbol(&node, source));
                }
            }
            SyntaxKind::InterfaceDeclaration => {
                if let Some(name) = syntax::field_text(&node, "name", source) {
                    symbols
                        .interfaces
                        .insert(name.to_string(), interface_symbol(&node, source));
                }
            }
            SyntaxKind::ImportStatement => {
                index_import(&node, source, &parsed.path, known, &mut symbols.imports)
            }
            SyntaxKind::ExportStatement => {
                if let Some(name) = default_export_name(&node, source) {
                    symbols.default_export = Some(name);
                }
            }
            _ => {}
        }

        let mut cursor = node.walk();
        stack.extend(node.named_children(&mut cursor));
    }

    symbols
}

fn index_declarator(declarator: &Node<'_>, source: &str, symbols: &mut FileSymbols) {
    let Some(name_node) = declarator.child_by_field_name("name") else {
        return;
    };
    if SyntaxKind::of(&name_node) != SyntaxKind::Identifier {
        return;
    }
    let name = syntax::text(&name_node, source).to_string();

    let type_name = match declared_binding(declarator, source) {
        LocalBinding::Function => {
            symbols.functions.insert(name);
            return;
        }
        LocalBinding::Typed(t) => Some(t),
        LocalBinding::Untyped => None,
    };

    let members = declarator
        .child_by_field_name("value")
        .filter(|v| SyntaxKind::of(v) == SyntaxKind::Object)
        .map(|object| object_keys(&object, source))
        .unwrap_or_default();

    symbols
        .variables
        .insert(name, VariableSymbol { type_name, members });
}

/// Keys of `{ a: ..., b() {}, c }`
fn object_keys(object: &Node<'_>, source: &str) -> HashSet<String> {
    let mut keys = HashSet::new();
    let mut cursor = object.walk();
    for member in object.named_children(&mut cursor) {
        let key = match member.kind() {
            "pair" => syntax::field_text(&member, "key", source),
            "method_definition" => syntax::field_text(&member, "name", source),
            "shorthand_property_identifier" => Some(syntax::text(&member, source)),
            _ => None,
        };
        if let Some(key) = key {
            keys.insert(key.trim_matches(|c| c == '\'' || c == '"').to_string());
        }
    }
    keys
}

fn class_symbol(node: &Node<'_>, source: &str) -> TypeSymbol {
    let mut symbol = TypeSymbol {
        bases: syntax::extends_name(node, source).into_iter().collect(),
        members: HashMap::new(),
    };
    let Some(body) = node.child_by_field_name("body") else {
        return symbol;
    };

    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        let Some(name) = syntax::field_text(&member, "name", source) else {
            continue;
        };
        match SyntaxKind::of(&member) {
            SyntaxKind::MethodDefinition if name == "constructor" => {
                // Parameter properties: constructor(private api: Api)
                for param in syntax::parameters(&member, source) {
                    if param.is_property {
                        symbol.members.insert(
                            param.name,
                            MemberSymbol {
                                kind: DeclarationKind::Property,
                                type_name: param.type_text,
                            },
                        );
                    }
                }
                symbol.members.insert(
                    name.to_string(),
                    MemberSymbol {
                        kind: DeclarationKind::Constructor,
                        type_name: None,
                    },
                );
            }
            SyntaxKind::MethodDefinition => {
                let getter = syntax::has_keyword(&member, "get");
                let kind = if getter || syntax::has_keyword(&member, "set") {
                    DeclarationKind::Accessor
                } else {
                    DeclarationKind::Method
                };
                let type_name = match kind {
                    DeclarationKind::Accessor => syntax::return_type_text(&member, source),
                    _ => None,
                };
                symbol
                    .members
                    .insert(name.to_string(), MemberSymbol { kind, type_name });
            }
            SyntaxKind::PublicFieldDefinition => {
                symbol.members.insert(
                    name.to_string(),
                    MemberSymbol {
                        kind: DeclarationKind::Property,
                        type_name: field_type(&member, source),
                    },
                );
            }
            SyntaxKind::MethodSignature => {
                symbol.members.insert(
                    name.to_string(),
                    MemberSymbol {
                        kind: DeclarationKind::Method,
                        type_name: None,
                    },
                );
            }
            _ => {}
        }
    }

    symbol
}

fn interface_symbol(node: &Node<'_>, source: &str) -> TypeSymbol {
    let mut symbol = TypeSymbol::default();

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "extends_type_clause" {
            let mut inner = child.walk();
            symbol.bases.extend(
                child
                    .named_children(&mut inner)
                    .map(|base| syntax::text(&base, source).to_string()),
            );
        }
    }

    let Some(body) = node.child_by_field_name("body") else {
        return symbol;
    };
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        let Some(name) = syntax::field_text(&member, "name", source) else {
            continue;
        };
        let entry = match SyntaxKind::of(&member) {
            SyntaxKind::PropertySignature => MemberSymbol {
                kind: DeclarationKind::Property,
                type_name: field_type(&member, source),
            },
            SyntaxKind::MethodSignature => MemberSymbol {
                kind: DeclarationKind::Method,
                type_name: None,
            },
            _ => continue,
        };
        symbol.members.insert(name.to_string(), entry);
    }

    symbol
}

/// Declared type of a field, or the class it is initialised with
fn field_type(member: &Node<'_>, source: &str) -> Option<String> {
    if let Some(annotation) = member
        .child_by_field_name("type")
        .and_then(|t| syntax::type_annotation_text(&t, source))
    {
        return Some(annotation);
    }
    let value = member.child_by_field_name("value")?;
    if SyntaxKind::of(&value) != SyntaxKind::NewExpression {
        return None;
    }
    syntax::field_text(&value, "constructor", source).map(str::to_string)
}

fn index_import(
    node: &Node<'_>,
    source: &str,
    file: &Path,
    known: &HashSet<PathBuf>,
    out: &mut HashMap<String, ImportBinding>,
) {
    let Some(specifier) = syntax::import_source(node, source) else {
        return;
    };
    let Some(clause) = syntax::import_clause(node) else {
        return;
    };
    let target = resolve_module(&specifier, file, known);

    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => {
                out.insert(
                    syntax::text(&child, source).to_string(),
                    ImportBinding {
                        target: target.clone(),
                        imported: Imported::Default,
                    },
                );
            }
            "namespace_import" => {
                let mut inner = child.walk();
                let local = child
                    .named_children(&mut inner)
                    .find(|c| c.kind() == "identifier")
                    .map(|c| syntax::text(&c, source).to_string());
                if let Some(local) = local {
                    out.insert(
                        local,
                        ImportBinding {
                            target: target.clone(),
                            imported: Imported::Namespace,
                        },
                    );
                }
            }
            "named_imports" => {
                let mut inner = child.walk();
                for specifier in child.named_children(&mut inner) {
                    if specifier.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(imported) = syntax::field_text(&specifier, "name", source) else {
                        continue;
                    };
                    let local = syntax::field_text(&specifier, "alias", source).unwrap_or(imported);
                    out.insert(
                        local.to_string(),
                        ImportBinding {
                            target: target.clone(),
                            imported: Imported::Named(imported.to_string()),
                        },
                    );
                }
            }
            _ => {}
        }
    }
}

/// Name bound by `export default name` or `export default function name`
fn default_export_name(node: &Node<'_>, source: &str) -> Option<String> {
    if !syntax::has_keyword(node, "default") {
        return None;
    }
    let exported = node
        .child_by_field_name("declaration")
        .or_else(|| node.child_by_field_name("value"))?;
    if SyntaxKind::of(&exported) == SyntaxKind::Identifier {
        return Some(syntax::text(&exported, source).to_string());
    }
    syntax::field_text(&exported, "name", source).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SourceParser;
    use crate::resolve::LocalScope;

    fn parsed(path: &str, source: &str) -> ParsedSource {
        let path = PathBuf::from(path);
        let tree = SourceParser::default().parse_source(source, &path).unwrap();
        ParsedSource {
            path,
            source: source.to_string(),
            tree,
        }
    }

    fn resolve(
        index: &DeclarationIndex,
        file: &str,
        class: Option<&str>,
        callee: CalleeExpr,
    ) -> Option<String> {
        let locals = LocalScope::new();
        let ctx = CallContext {
            file: Path::new(file),
            class,
            locals: &locals,
        };
        index.resolve(&callee, &ctx).map(|s| s.canonical_name())
    }

    fn ident(name: &str) -> CalleeExpr {
        CalleeExpr::Identifier(name.to_string())
    }

    fn member(object: CalleeExpr, property: &str) -> CalleeExpr {
        CalleeExpr::Member {
            object: Box::new(object),
            property: property.to_string(),
            subscript: false,
        }
    }

    #[test]
    fn test_named_import_unwraps_to_declaration() {
        let index = DeclarationIndex::build(&[
            parsed("/p/util.ts", "export function helper() {}"),
            parsed("/p/main.ts", "import { helper as h } from './util';\nh();"),
        ]);
        assert_eq!(
            resolve(&index, "/p/main.ts", None, ident("h")),
            Some("util.helper".to_string())
        );
    }

    #[test]
    fn test_inherited_member_through_typed_field() {
        let index = DeclarationIndex::build(&[
            parsed(
                "/p/api.ts",
                "export class Base { get(id: string) {} }\nexport class Api extends Base {}",
            ),
            parsed(
                "/p/svc.ts",
                "import { Api } from './api';\n\
                 class Svc { constructor(private api: Api) {} run() { this.api.get('x'); } }",
            ),
        ]);
        let callee = member(member(CalleeExpr::This, "api"), "get");
        assert_eq!(
            resolve(&index, "/p/svc.ts", Some("Svc"), callee),
            Some("Base.get".to_string())
        );
    }

    #[test]
    fn test_external_named_import_and_unknown() {
        let index = DeclarationIndex::build(&[parsed(
            "/p/main.ts",
            "import { hash as h } from 'crypto-lib';\nh();",
        )]);
        assert_eq!(
            resolve(&index, "/p/main.ts", None, ident("h")),
            Some("hash".to_string())
        );
        assert_eq!(
            resolve(&index, "/p/main.ts", None, ident("nowhere")),
            None
        );
    }

    #[test]
    fn test_super_call_resolves_base_constructor() {
        let index = DeclarationIndex::build(&[parsed(
            "/p/a.ts",
            "class A { constructor() {} }\nclass B extends A { constructor() { super(); } }",
        )]);
        assert_eq!(
            resolve(&index, "/p/a.ts", Some("B"), CalleeExpr::Super),
            Some("A.constructor".to_string())
        );
    }
}
