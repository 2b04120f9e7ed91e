//! StructLens CLI library, exposed for integration tests

pub mod commands;
pub mod logging;
pub mod output;

use clap::Parser;
use std::path::PathBuf;

/// Semantic diff of one TypeScript file between two versions
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "structlens-diff")]
#[command(override_usage = commands::diff::USAGE)]
#[command(about = "Emit a semantic diff of a TypeScript file as JSON", long_about = None)]
#[command(version = structlens_core::VERSION)]
pub struct DiffArgs {
    /// Path of the old version ("" for a newly added file)
    #[arg(long, allow_hyphen_values = true)]
    pub before: Option<String>,

    /// Path of the new version ("" for a deleted file)
    #[arg(long, allow_hyphen_values = true)]
    pub after: Option<String>,

    /// Positional `<before> <after>`, filling whichever flag was not given.
    /// Anything past the first two is ignored.
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,

    /// Output format (default: config `diff.format`, then json)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Function-level call graph across TypeScript files
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "structlens-callgraph")]
#[command(override_usage = commands::callgraph::USAGE)]
#[command(
    about = "Emit function call relationships of TypeScript files as JSON",
    long_about = None
)]
#[command(version = structlens_core::VERSION)]
pub struct CallGraphArgs {
    /// Files to analyze
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Comma-separated list of function names to focus on
    #[arg(long, value_delimiter = ',')]
    pub functions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
}

impl From<OutputFormat> for structlens_core::DiffFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => structlens_core::DiffFormat::Json,
            OutputFormat::Markdown => structlens_core::DiffFormat::Markdown,
        }
    }
}
