//! Tree-sitter front end: grammar selection, parsing and node-kind dispatch

pub mod syntax;

pub use syntax::SyntaxKind;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tree_sitter::{Parser, Tree};

/// Error types for parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse file: {0}")]
    ParseFailed(String),

    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),
}

/// Grammar flavour used for a file, picked from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    /// `.ts`, `.mts`, `.cts` and plain JavaScript
    TypeScript,
    /// `.tsx` and `.jsx`
    Tsx,
}

impl SourceLanguage {
    /// Pick the grammar for a path. Unknown extensions use the TypeScript
    /// grammar, which also accepts plain JavaScript.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("tsx") | Some("jsx") => SourceLanguage::Tsx,
            _ => SourceLanguage::TypeScript,
        }
    }

    fn grammar(self) -> tree_sitter::Language {
        match self {
            SourceLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceLanguage::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// One file's text together with its syntax tree
pub struct ParsedSource {
    pub path: PathBuf,
    pub source: String,
    pub tree: Tree,
}

impl ParsedSource {
    pub fn root(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }
}

/// Parses TypeScript and JavaScript sources
#[derive(Debug, Default)]
pub struct SourceParser;

impl SourceParser {
    pub fn new() -> Self {
        Self
    }

    fn create_parser(&self, language: SourceLanguage) -> Result<Parser, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.grammar())
            .map_err(|e| ParseError::TreeSitter(e.to_string()))?;
        Ok(parser)
    }

    /// Parse source text. The path only selects the grammar.
    pub fn parse_source(&self, source: &str, path: &Path) -> Result<Tree, ParseError> {
        let language = SourceLanguage::from_path(path);
        tracing::trace!(path = %path.display(), ?language, "parsing source");
        let mut parser = self.create_parser(language)?;
        parser.parse(source, None).ok_or_else(|| {
            ParseError::ParseFailed(format!("{}: parser returned no tree", path.display()))
        })
    }

    /// Read and parse a file
    pub fn parse_file(&self, path: &Path) -> Result<ParsedSource, ParseError> {
        let source = std::fs::read_to_string(path)?;
        let tree = self.parse_source(&source, path)?;
        Ok(ParsedSource {
            path: path.to_path_buf(),
            source,
            tree,
        })
    }
}
