//! Function-level call graph across a set of files
//!
//! Functions are collected per file with their call sites, then linked into
//! a directed graph with one node per function name and one edge per call
//! site that matched a known function. `called_by` lists are read back from
//! incoming edges.

pub mod functions;

pub use functions::{extract_functions, ParsedFunction};

use crate::parser::syntax;
use crate::parser::{ParseError, ParsedSource, SourceParser};
use crate::resolve::{
    base_name, CallSiteResolver, CallTarget, DeclarationIndex, IgnoreSet, ResolutionMode,
};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tree_sitter::Node;

/// Reported in-band when none of the given paths exist
pub const NO_VALID_FILES: &str = "No valid files to analyze";
/// Reported in-band when every existing path failed to read
pub const NO_READABLE_FILES: &str = "No readable files to analyze";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub target: String,
    pub line: usize,
    pub column: usize,
    pub is_method: bool,
}

impl CallSite {
    pub(crate) fn at(node: &Node<'_>, source: &str, target: CallTarget) -> Self {
        Self {
            target: target.target,
            line: syntax::start_line(node),
            column: syntax::start_column(node, source),
            is_method: target.is_method,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerInfo {
    pub function: String,
    pub file: String,
    /// Line of the call site, not of the caller's declaration
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub file: String,
    #[serde(rename = "line")]
    pub start_line: usize,
    pub end_line: usize,
    pub call_sites: Vec<CallSite>,
    pub called_by: Vec<CallerInfo>,
}

/// Call-graph output document; `error` carries the in-band failures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallGraphReport {
    pub functions: Vec<FunctionInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallGraphReport {
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            functions: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Per-run settings
#[derive(Debug, Clone, Default)]
pub struct CallGraphOptions {
    pub mode: ResolutionMode,
    pub ignore: IgnoreSet,
}

/// Caller relationships between function names
#[derive(Debug, Default)]
pub struct CallGraph {
    graph: DiGraph<String, CallerInfo>,
    nodes: HashMap<String, NodeIndex>,
}

impl CallGraph {
    /// Link every call site to the best-matching function, see [`match_target`]
    pub fn build(functions: &[ParsedFunction]) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes: HashMap<String, NodeIndex> = HashMap::new();
        for function in functions {
            nodes
                .entry(function.name.clone())
                .or_insert_with(|| graph.add_node(function.name.clone()));
        }

        let mut call_graph = Self { graph, nodes };
        let mut unmatched = 0usize;

        for caller in functions {
            for site in &caller.call_sites {
                let Some(callee) = match_target(functions, &site.target) else {
                    unmatched += 1;
                    continue;
                };
                call_graph.add_call(caller, &callee.name, site.line);
            }
        }

        tracing::debug!(
            functions = call_graph.nodes.len(),
            edges = call_graph.graph.edge_count(),
            unmatched,
            "linked call sites"
        );
        call_graph
    }

    fn add_call(&mut self, caller: &ParsedFunction, callee: &str, line: usize) {
        let from = self.nodes.get(&caller.name).copied();
        let to = self.nodes.get(callee).copied();
        let (Some(from), Some(to)) = (from, to) else {
            return;
        };
        self.graph.add_edge(
            from,
            to,
            CallerInfo {
                function: caller.name.clone(),
                file: caller.file.display().to_string(),
                line,
            },
        );
    }

    /// Callers of `name`, in the order their call sites were linked
    pub fn callers_of(&self, name: &str) -> Vec<CallerInfo> {
        let Some(&node) = self.nodes.get(name) else {
            return Vec::new();
        };
        let mut incoming: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|edge| (edge.id(), edge.weight()))
            .collect();
        incoming.sort_by_key(|(id, _)| *id);
        incoming.into_iter().map(|(_, info)| info.clone()).collect()
    }

    pub fn function_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn call_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Exact name first, then the target's base name, then a shared base name;
/// encounter order within each tier.
fn match_target<'f>(functions: &'f [ParsedFunction], target: &str) -> Option<&'f ParsedFunction> {
    let target_base = base_name(target);
    functions
        .iter()
        .find(|f| f.name == target)
        .or_else(|| functions.iter().find(|f| f.name == target_base))
        .or_else(|| {
            functions
                .iter()
                .find(|f| base_name(&f.name) == target_base)
        })
}

/// Whether a function is selected by a `--functions` style filter
fn is_requested(name: &str, targets: &[String]) -> bool {
    targets.is_empty() || targets.iter().any(|t| t == name || t == base_name(name))
}

/// Read, parse and link `files`, reporting the functions named in `targets`
/// (all of them when empty).
///
/// Missing and unreadable files are dropped. When nothing is left the
/// report carries an in-band error instead of failing.
pub fn analyze(
    files: &[PathBuf],
    targets: &[String],
    options: &CallGraphOptions,
) -> Result<CallGraphReport, ParseError> {
    if files.is_empty() {
        return Ok(CallGraphReport::default());
    }

    let existing: Vec<&PathBuf> = files.iter().filter(|p| p.exists()).collect();
    if existing.is_empty() {
        return Ok(CallGraphReport::with_error(NO_VALID_FILES));
    }

    let parser = SourceParser::new();
    let mut sources: Vec<ParsedSource> = Vec::with_capacity(existing.len());
    for path in existing {
        match parser.parse_file(path) {
            Ok(parsed) => sources.push(parsed),
            Err(ParseError::FileRead(e)) => {
                tracing::debug!(
                    path = %path.display(),
                    error = %e,
                    "skipping unreadable file"
                );
            }
            Err(e) => return Err(e),
        }
    }
    if sources.is_empty() {
        return Ok(CallGraphReport::with_error(NO_READABLE_FILES));
    }

    let index = match options.mode {
        ResolutionMode::Full => Some(DeclarationIndex::build(&sources)),
        ResolutionMode::Light => None,
    };
    let resolver = match &index {
        Some(index) => CallSiteResolver::full(index, &options.ignore),
        None => CallSiteResolver::light(&options.ignore),
    };

    let functions: Vec<ParsedFunction> = sources
        .iter()
        .flat_map(|parsed| extract_functions(parsed, &resolver))
        .collect();
    let graph = CallGraph::build(&functions);

    let reported: Vec<FunctionInfo> = functions
        .into_iter()
        .filter(|f| is_requested(&f.name, targets))
        .map(|f| FunctionInfo {
            called_by: graph.callers_of(&f.name),
            file: f.file.display().to_string(),
            name: f.name,
            start_line: f.start_line,
            end_line: f.end_line,
            call_sites: f.call_sites,
        })
        .collect();

    tracing::info!(
        files = sources.len(),
        functions = graph.function_count(),
        calls = graph.call_count(),
        reported = reported.len(),
        ignored_callees = options.ignore.len(),
        mode = ?options.mode,
        "call graph built"
    );

    Ok(CallGraphReport {
        functions: reported,
        error: None,
    })
}
