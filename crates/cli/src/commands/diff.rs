//! Diff command: semantic diff of one file between two versions

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;
use structlens_core::{diff_models, DiffFormat, ModelExtractor};

use super::{emit, load_config, FAILURE};
use crate::output::terminal::print_usage_error;
use crate::output::{render_markdown, to_pretty_json, DiffDocument};
use crate::DiffArgs;

pub const USAGE: &str = "structlens-diff --before <before-path> --after <after-path>";

/// Before/after paths after flag, positional and empty-marker handling.
/// An empty path stands for a file that does not exist on that side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffRequest {
    pub before: String,
    pub after: String,
}

impl DiffRequest {
    pub fn from_args(args: &DiffArgs) -> Self {
        let mut positional = args.paths.iter().cloned();
        let before = args.before.clone().or_else(|| positional.next());
        let after = args.after.clone().or_else(|| positional.next());

        Self {
            before: strip_empty_marker(before.unwrap_or_default()),
            after: strip_empty_marker(after.unwrap_or_default()),
        }
    }

    /// Path reported in the document: the after side when present
    pub fn file_path(&self) -> &str {
        if self.after.is_empty() {
            &self.before
        } else {
            &self.after
        }
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

/// Callers pass a literal `""` or `''` when a side does not exist
fn strip_empty_marker(path: String) -> String {
    if path == "\"\"" || path == "''" {
        String::new()
    } else {
        path
    }
}

/// Extract both sides and compare them
pub fn build_document(request: &DiffRequest) -> Result<DiffDocument> {
    let extractor = ModelExtractor::new();
    let before = extractor
        .extract_file(Path::new(&request.before))
        .with_context(|| format!("failed to analyze {}", request.before))?;
    let after = extractor
        .extract_file(Path::new(&request.after))
        .with_context(|| format!("failed to analyze {}", request.after))?;

    let diff = diff_models(&before, &after);
    tracing::info!(
        file = request.file_path(),
        changes = diff.summary().total(),
        "semantic diff computed"
    );
    Ok(DiffDocument::new(request.file_path(), diff))
}

pub fn render(doc: &DiffDocument, format: DiffFormat) -> Result<String> {
    match format {
        DiffFormat::Json => to_pretty_json(doc),
        DiffFormat::Markdown => Ok(render_markdown(doc)),
    }
}

pub fn run(args: &DiffArgs) -> ExitCode {
    let request = DiffRequest::from_args(args);
    if request.is_empty() {
        print_usage_error(
            "At least one of --before or --after must be specified",
            USAGE,
        );
        return ExitCode::from(FAILURE);
    }

    let config = load_config();
    let format = args
        .format
        .map(DiffFormat::from)
        .or_else(|| config.as_ref().ok().map(|c| c.diff.format))
        .unwrap_or_default();

    let (doc, code) = match config.and_then(|_| build_document(&request)) {
        Ok(doc) => (doc, ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "diff failed");
            (
                DiffDocument::failed(request.file_path(), format!("{:#}", e)),
                ExitCode::from(FAILURE),
            )
        }
    };

    match render(&doc, format) {
        Ok(text) => {
            emit(&text);
            code
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(FAILURE)
        }
    }
}
