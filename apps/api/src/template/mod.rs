//! Template Binding Engine — fills `${path}` placeholders in block content
//! from the structured resume record.
//!
//! Resolution is best-effort: a placeholder whose path is malformed or does
//! not resolve renders as an empty string and is logged at `debug`. Resume
//! templates routinely point at optional entries (a second school, a missing
//! profile URL), so a miss must never break rendering.
//!
//! Substituted values are HTML-escaped; only the template's own markup
//! reaches the output as markup.

pub mod path;

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

use crate::blocks::{Block, BlockBody};
use crate::text::escape_html;

pub use path::{FieldPath, PathError, PathSegment};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Replaces every `${path}` in `template` with the value found at `path`.
pub fn resolve(template: &str, data: &Value) -> String {
    if !template.contains("${") {
        return template.to_string();
    }
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| render_placeholder(&caps[1], data))
        .into_owned()
}

/// Resolves each string of a block body independently; column count and
/// order are preserved.
pub fn resolve_body(body: &BlockBody, data: &Value) -> BlockBody {
    body.map_strings(|s| resolve(s, data))
}

/// Preview rendering of a whole block list. Ids and parents are untouched.
pub fn resolve_blocks(blocks: &[Block], data: &Value) -> Vec<Block> {
    blocks
        .iter()
        .map(|block| Block {
            body: resolve_body(&block.body, data),
            ..block.clone()
        })
        .collect()
}

fn render_placeholder(raw_path: &str, data: &Value) -> String {
    let path = match raw_path.parse::<FieldPath>() {
        Ok(path) => path,
        Err(e) => {
            debug!(path = raw_path, "template resolution miss: {e}");
            return String::new();
        }
    };

    match path.lookup(data).and_then(render_value) {
        Some(text) => escape_html(&text),
        None => {
            debug!(path = raw_path, "template resolution miss: no value");
            String::new()
        }
    }
}

/// Scalars render as text; arrays of scalars are joined with `,`.
/// `null` and objects have no textual form.
fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(render_scalar)
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(",")),
        other => render_scalar(other),
    }
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
