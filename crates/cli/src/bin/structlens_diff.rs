//! structlens-diff - semantic diff of a TypeScript file as JSON

use std::process::ExitCode;
use structlens_cli::{commands, logging, DiffArgs};

fn main() -> ExitCode {
    logging::init();

    let args = match commands::parse_args::<DiffArgs, _, _>(std::env::args_os()) {
        Ok(args) => args,
        Err(code) => return code,
    };
    commands::diff::run(&args)
}
