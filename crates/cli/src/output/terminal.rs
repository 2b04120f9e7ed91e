//! Colored stderr messages for usage problems

use colored::Colorize;

/// `Error: <message>` followed by the usage line
pub fn print_usage_error(message: &str, usage: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
    print_usage(usage);
}

pub fn print_usage(usage: &str) {
    eprintln!("{} {}", "Usage:".bold(), usage);
}
