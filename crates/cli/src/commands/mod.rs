//! CLI commands
//!
//! Each command turns any processing failure into a well-formed document
//! with an `error` field on stdout plus exit code 1. Usage errors go to
//! stderr only.

pub mod callgraph;
pub mod diff;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use structlens_core::StructlensConfig;

/// Exit code for usage and processing errors
pub const FAILURE: u8 = 1;

/// Parse command-line arguments; help and version exit 0, anything else
/// clap rejects exits 1 without touching stdout.
pub fn parse_args<T, I, A>(args: I) -> Result<T, ExitCode>
where
    T: Parser,
    I: IntoIterator<Item = A>,
    A: Into<OsString> + Clone,
{
    T::try_parse_from(args).map_err(|e| {
        let _ = e.print();
        match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
            _ => ExitCode::from(FAILURE),
        }
    })
}

pub(crate) fn working_dir() -> Result<PathBuf> {
    std::env::current_dir().context("cannot determine the working directory")
}

/// Configuration discovered from the working directory upward
pub(crate) fn load_config() -> Result<StructlensConfig> {
    StructlensConfig::find_and_load(&working_dir()?)
}

/// Print a document on stdout, newline-terminated
pub(crate) fn emit(text: &str) {
    if text.ends_with('\n') {
        print!("{}", text);
    } else {
        println!("{}", text);
    }
}
