//! structlens-callgraph - function call relationships of TypeScript files as JSON

use std::process::ExitCode;
use structlens_cli::{commands, logging, CallGraphArgs};

fn main() -> ExitCode {
    logging::init();

    let args = match commands::parse_args::<CallGraphArgs, _, _>(std::env::args_os()) {
        Ok(args) => args,
        Err(code) => return code,
    };
    commands::callgraph::run(&args)
}
