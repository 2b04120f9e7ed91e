//! Markdown report for diff documents

use super::json::DiffDocument;
use std::fmt::Write;
use structlens_core::{ChangeType, FunctionDiff, FunctionSignature, ImportDiff, TypeDiff};

pub fn render_markdown(doc: &DiffDocument) -> String {
    let mut out = String::new();
    let s = &doc.summary;

    let _ = writeln!(out, "# Semantic Changes: {}\n", doc.file_path);
    let _ = writeln!(out, "**Language:** {}\n", doc.language);
    if let Some(error) = &doc.error {
        let _ = writeln!(out, "**Error:** {}\n", error);
    }

    out.push_str("## Summary\n\n");
    out.push_str("| Category | Added | Removed | Modified |\n");
    out.push_str("|----------|-------|---------|----------|\n");
    let _ = writeln!(
        out,
        "| Functions | {} | {} | {} |",
        s.functions_added, s.functions_removed, s.functions_modified
    );
    let _ = writeln!(
        out,
        "| Types | {} | {} | {} |",
        s.types_added, s.types_removed, s.types_modified
    );
    let (added, removed) = (s.imports_added, s.imports_removed);
    let _ = writeln!(out, "| Imports | {} | {} | - |\n", added, removed);

    if !doc.functions.is_empty() {
        out.push_str("## Functions\n\n");
        for function in &doc.functions {
            render_function(&mut out, function);
        }
    }

    if !doc.types.is_empty() {
        out.push_str("## Types\n\n");
        for ty in &doc.types {
            render_type(&mut out, ty);
        }
    }

    if !doc.imports.is_empty() {
        out.push_str("## Imports\n\n");
        for import in &doc.imports {
            render_import(&mut out, import);
        }
    }

    out
}

fn render_function(out: &mut String, function: &FunctionDiff) {
    let marker = icon(function.change_type);
    let _ = writeln!(out, "### {} `{}`\n", marker, function.name);
    let _ = writeln!(out, "**Status:** {}\n", status(function.change_type));

    match function.change_type {
        ChangeType::Added | ChangeType::Removed => {
            let sig = function.after.as_ref().or(function.before.as_ref());
            if let Some(sig) = sig {
                let _ = writeln!(out, "```\n{}\n```\n", signature(&function.name, sig));
            }
        }
        ChangeType::Modified => {
            if let Some(note) = &function.note {
                let _ = writeln!(out, "**Changes:** {}\n", note);
            }
            if let (Some(before), Some(after)) = (&function.before, &function.after) {
                let before = signature(&function.name, before);
                let after = signature(&function.name, after);
                let _ = writeln!(out, "**Before:**\n```\n{}\n```\n", before);
                let _ = writeln!(out, "**After:**\n```\n{}\n```\n", after);
            }
        }
    }
}

fn render_type(out: &mut String, ty: &TypeDiff) {
    let marker = icon(ty.change_type);
    let _ = writeln!(out, "### {} `{}` ({})\n", marker, ty.name, ty.kind);
    let _ = writeln!(out, "**Status:** {}", status(ty.change_type));
    let _ = writeln!(out, "**Lines:** {}-{}\n", ty.start_line, ty.end_line);

    let Some(fields) = ty.fields.as_ref().filter(|f| !f.is_empty()) else {
        return;
    };
    out.push_str("**Field Changes:**\n\n");
    out.push_str("| Field | Change | Old Type | New Type |\n");
    out.push_str("|-------|--------|----------|----------|\n");
    for field in fields {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            field.name,
            field.change_type.as_str(),
            field.old_type.as_deref().unwrap_or(""),
            field.new_type.as_deref().unwrap_or("")
        );
    }
    out.push('\n');
}

fn render_import(out: &mut String, import: &ImportDiff) {
    let alias = import
        .alias
        .as_deref()
        .map(|a| format!(" as {}", a))
        .unwrap_or_default();
    let marker = icon(import.change_type);
    let _ = writeln!(out, "- {} `{}`{}", marker, import.path, alias);
}

/// `async name(a: string, b: any): Promise<void>`
fn signature(name: &str, sig: &FunctionSignature) -> String {
    let params: Vec<String> = sig
        .params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.param_type))
        .collect();
    let returns = if sig.returns.is_empty() {
        "void".to_string()
    } else {
        sig.returns.join(", ")
    };
    let prefix = if sig.is_async { "async " } else { "" };
    format!("{}{}({}): {}", prefix, name, params.join(", "), returns)
}

fn icon(change: ChangeType) -> &'static str {
    match change {
        ChangeType::Added => "+",
        ChangeType::Removed => "-",
        ChangeType::Modified => "~",
    }
}

fn status(change: ChangeType) -> &'static str {
    match change {
        ChangeType::Added => "Added",
        ChangeType::Removed => "Removed",
        ChangeType::Modified => "Modified",
    }
}
