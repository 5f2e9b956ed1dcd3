//! URL and header templating
//!
//! URL templates support three placeholder styles, all resolved from the same
//! parameter map: `{var}`, `{{var}}` and `:var`. Header values support the
//! brace styles only; a colon in a header value is never a placeholder.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::TemplateError;

/// Render a JSON value as a URL/header fragment. Strings are used verbatim,
/// numbers and booleans via their display form.
pub fn value_fragment(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn substitute_braces(
    template: &str,
    parameters: &BTreeMap<String, Value>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        // {{var}} before {var}
        let (name_start, close) = if rest.starts_with("{{") {
            (2, "}}")
        } else {
            (1, "}")
        };
        let after_open = &rest[name_start..];
        let end = after_open
            .find(close)
            .ok_or_else(|| TemplateError::UnresolvedPlaceholder(rest.to_string()))?;
        let name = &after_open[..end];

        let value = parameters
            .get(name)
            .ok_or_else(|| TemplateError::UnresolvedPlaceholder(name.to_string()))?;
        out.push_str(&value_fragment(value));

        rest = &after_open[end + close.len()..];
    }
    out.push_str(rest);
    Ok(out)
}

fn substitute_colons(
    template: &str,
    parameters: &BTreeMap<String, Value>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    for (i, segment) in template.split('/').enumerate() {
        if i > 0 {
            out.push('/');
        }
        match segment.strip_prefix(':') {
            Some(name) if !name.is_empty() => {
                let value = parameters
                    .get(name)
                    .ok_or_else(|| TemplateError::UnresolvedPlaceholder(name.to_string()))?;
                out.push_str(&value_fragment(value));
            }
            _ => out.push_str(segment),
        }
    }
    Ok(out)
}

/// Render a URL template against the resolved parameter map.
pub fn render_url(
    template: &str,
    parameters: &BTreeMap<String, Value>,
) -> Result<String, TemplateError> {
    // The scheme's "://" survives colon substitution because ":" only counts
    // at the start of a path segment
    let braced = substitute_braces(template, parameters)?;
    substitute_colons(&braced, parameters)
}

/// Render a static header value, resolving brace placeholders from the
/// parameter map.
pub fn render_header(
    value: &str,
    parameters: &BTreeMap<String, Value>,
) -> Result<String, TemplateError> {
    substitute_braces(value, parameters)
}
