//! Output formatting

pub mod json;
pub mod markdown;
pub mod terminal;

pub use json::{to_pretty_json, DiffDocument};
pub use markdown::render_markdown;
