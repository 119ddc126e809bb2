//! HTML rendering of a submission. Plain string concatenation; the body is
//! a heading, one paragraph per form field, and a fixed details block.

use chrono::Local;
use serde_json::Value;

use crate::submission::{Submission, SubmissionKind};

const NOT_PROVIDED: &str = "Not provided";

/// Turn a camelCase field name into a display label: a space goes in front
/// of every ASCII uppercase letter, then the first character is uppercased.
pub fn humanize_key(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            label.push(' ');
        }
        label.push(ch);
    }

    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => NOT_PROVIDED.to_string(),
        Value::String(text) if text.is_empty() => NOT_PROVIDED.to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn render_html(submission: &Submission, kind: SubmissionKind) -> String {
    let mut html = String::new();
    html.push_str(&format!("<h2>{}</h2>\n", kind.title()));
    html.push_str("<h3>Form Data:</h3>\n");
    html.push_str(
        "<div style=\"background-color: #f5f5f5; padding: 15px; border-radius: 5px; margin: 10px 0;\">\n",
    );

    for (key, value) in &submission.form_data {
        html.push_str(&format!(
            "<p><strong>{}:</strong> {}</p>\n",
            humanize_key(key),
            display_value(value)
        ));
    }

    html.push_str("</div>\n");
    html.push_str("<h3>Submission Details:</h3>\n");
    html.push_str(&format!(
        "<p><strong>Submission Type:</strong> {}</p>\n",
        submission.meta.kind.as_deref().unwrap_or(NOT_PROVIDED)
    ));
    html.push_str(&format!(
        "<p><strong>Reference:</strong> {}</p>\n",
        submission.meta.reference.as_deref().unwrap_or(NOT_PROVIDED)
    ));
    html.push_str(&format!(
        "<p><strong>Submitted At:</strong> {}</p>\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));

    html
}
