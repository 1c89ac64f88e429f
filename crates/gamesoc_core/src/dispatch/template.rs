//! Message body placeholders.
//!
//! The sending service substitutes the literal tokens `{{name}}` and
//! `{{email}}` per recipient. The helpers here only serve the compose
//! preview and pre-send warnings; dispatch never rewrites the body.

use crate::model::recipient::Recipient;
use once_cell::sync::Lazy;
use regex::Regex;

pub const NAME_TOKEN: &str = "{{name}}";
pub const EMAIL_TOKEN: &str = "{{email}}";

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("valid placeholder regex"));

/// Renders `body` the way the sender would for one recipient.
pub fn render_preview(body: &str, recipient: &Recipient) -> String {
    body.replace(NAME_TOKEN, &recipient.name)
        .replace(EMAIL_TOKEN, &recipient.email)
}

/// Lists `{{...}}` tokens the sender will leave untouched, in order of
/// first appearance.
///
/// Only the exact spellings `{{name}}` and `{{email}}` are substituted, so
/// `{{ name }}` or `{{Name}}` are reported too.
pub fn unknown_placeholders(body: &str) -> Vec<String> {
    let mut unknown: Vec<String> = Vec::new();
    for captures in PLACEHOLDER_RE.captures_iter(body) {
        let token = &captures[0];
        if token == NAME_TOKEN || token == EMAIL_TOKEN {
            continue;
        }
        let inner = captures[1].to_string();
        if !unknown.contains(&inner) {
            unknown.push(inner);
        }
    }
    unknown
}
