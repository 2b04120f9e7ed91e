//! Call-graph command: function call relationships across files

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use structlens_core::callgraph::{analyze, CallGraphOptions, CallGraphReport};
use structlens_core::config::LIGHT_MODE_ENV;
use structlens_core::resolve::modules::normalize_path;
use structlens_core::StructlensConfig;

use super::{emit, working_dir, FAILURE};
use crate::output::to_pretty_json;
use crate::CallGraphArgs;

pub const USAGE: &str = "structlens-callgraph <files...> [--functions func1,func2,...]";

/// Trimmed, non-empty names from `--functions`
pub fn requested_functions(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolution mode and ignore set from the environment and configuration
pub fn options_from(config: &StructlensConfig) -> CallGraphOptions {
    let env = std::env::var(LIGHT_MODE_ENV).ok();
    CallGraphOptions {
        mode: config.callgraph.resolution_mode(env.as_deref()),
        ignore: config.callgraph.ignore_set(),
    }
}

/// Analyze `files`, made absolute against `cwd`
pub fn analyze_in(
    cwd: &Path,
    files: &[PathBuf],
    functions: &[String],
    options: &CallGraphOptions,
) -> Result<CallGraphReport> {
    let files: Vec<PathBuf> = files
        .iter()
        .map(|file| normalize_path(&cwd.join(file)))
        .collect();
    let targets = requested_functions(functions);
    Ok(analyze(&files, &targets, options)?)
}

fn execute(args: &CallGraphArgs) -> Result<CallGraphReport> {
    let cwd = working_dir()?;
    let config = StructlensConfig::find_and_load(&cwd)?;
    analyze_in(&cwd, &args.files, &args.functions, &options_from(&config))
}

pub fn run(args: &CallGraphArgs) -> ExitCode {
    // In-band "no valid/readable files" reports still exit 0
    let (report, code) = match execute(args) {
        Ok(report) => (report, ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "call graph failed");
            (
                CallGraphReport::with_error(format!("{:#}", e)),
                ExitCode::from(FAILURE),
            )
        }
    };

    match to_pretty_json(&report) {
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
