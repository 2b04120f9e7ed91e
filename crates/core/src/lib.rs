//! StructLens Core - structural analysis of TypeScript sources
//!
//! This crate provides the analysis engine behind the StructLens tools:
//! - AST parsing via Tree-sitter (TypeScript and TSX grammars)
//! - Flat source models of functions, types and imports per file
//! - Structural diffs between two versions of a file
//! - Cross-file call-site resolution and function-level call graphs

pub mod callgraph;
pub mod config;
pub mod diff;
pub mod extract;
pub mod model;
pub mod parser;
pub mod resolve;

pub use callgraph::{
    analyze, CallGraph, CallGraphOptions, CallGraphReport, CallSite, CallerInfo, FunctionInfo,
};
pub use config::{DiffFormat, StructlensConfig};
pub use diff::{
    diff_models, ChangeSummary, ChangeType, FieldDiff, FunctionDiff, FunctionSignature,
    ImportDiff, StructuralDiff, TypeDiff,
};
pub use extract::ModelExtractor;
pub use model::{FunctionRecord, OrderedMap, Parameter, SourceModel, TypeKind, TypeRecord};
pub use parser::{ParseError, ParsedSource, SourceLanguage, SourceParser};
pub use resolve::{
    CallSiteResolver, DeclarationIndex, IgnoreSet, NullResolver, ResolutionMode, SymbolResolver,
};

/// StructLens version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
