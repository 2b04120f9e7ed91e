//! Module specifier resolution within the analyzed file set
//!
//! Only relative specifiers (`./x`, `../x`) can land inside the file set;
//! package imports are external and resolve to `None`.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "d.ts", "js", "jsx", "mts", "cts"];
const INDEX_FILES: &[&str] = &["index.ts", "index.tsx", "index.js", "index.jsx"];

/// Lexically fold `.` and `..` components, without touching the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve `specifier` as imported from `importing_file` to a member of `files`
pub fn resolve_module(
    specifier: &str,
    importing_file: &Path,
    files: &HashSet<PathBuf>,
) -> Option<PathBuf> {
    if !(specifier.starts_with("./") || specifier.starts_with("../")) {
        return None;
    }
    let base = importing_file.parent()?;
    let raw = normalize_path(&base.join(specifier));
    try_with_extensions(&raw, files)
}

/// Try a base path as-is, with each source extension appended, with an
/// emitted `.js` mapped back to its sources, then as a directory index.
fn try_with_extensions(base: &Path, files: &HashSet<PathBuf>) -> Option<PathBuf> {
    if files.contains(base) {
        return Some(base.to_path_buf());
    }

    let raw = base.as_os_str().to_string_lossy();
    for ext in SOURCE_EXTENSIONS {
        let p = PathBuf::from(format!("{}.{}", raw, ext));
        if files.contains(&p) {
            return Some(p);
        }
    }

    // ESM-style `./util.js` written against `util.ts`
    if let Some(stem) = raw.strip_suffix(".js").or_else(|| raw.strip_suffix(".jsx")) {
        for ext in ["ts", "tsx"] {
            let p = PathBuf::from(format!("{}.{}", stem, ext));
            if files.contains(&p) {
                return Some(p);
            }
        }
    }

    for name in INDEX_FILES {
        let p = base.join(name);
        if files.contains(&p) {
            return Some(p);
        }
    }

    None
}
