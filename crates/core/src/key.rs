// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock key templates and their restricted substitution language
//!
//! A key template is either a literal (`"qrcode:generate"`) or contains
//! `#{...}` spans (`"order:#{#orderId}"`). Spans are limited to variable
//! and field-path lookups against the call's argument bindings; anything
//! resembling method invocation is rejected. Resolution is a pure
//! function of `(template, bindings)`.

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

/// Namespace prefix for every resolved key, keeping lock entries apart
/// from unrelated broker keys.
pub const KEY_PREFIX: &str = "distributed:lock:";

// Regex pattern for #{...} spans - this is a constant valid pattern
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static SPAN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\{([^}]*)\}").expect("constant regex pattern is valid"));

// A span body must be `#name` followed by zero or more `.field` segments.
#[allow(clippy::expect_used)]
static EXPR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([a-zA-Z_][a-zA-Z0-9_]*)((?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)$")
        .expect("constant regex pattern is valid")
});

/// Errors from key resolution; always local and non-retryable
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("lock key template must not be blank")]
    BlankTemplate,
    #[error("unsupported key expression: {expr} (only #name and #name.field lookups are allowed)")]
    UnsupportedExpression { expr: String },
    #[error("no binding for variable: {name}")]
    UnknownVariable { name: String },
    #[error("value for {expr} cannot be rendered into a key")]
    Unrenderable { expr: String },
}

/// Named call-argument values a template is resolved against
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    values: HashMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a named argument value (builder form)
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Prefix a resolved key with [`KEY_PREFIX`], idempotently
pub fn namespaced(key: &str) -> String {
    if key.starts_with(KEY_PREFIX) {
        key.to_string()
    } else {
        format!("{}{}", KEY_PREFIX, key)
    }
}

/// Resolve a key template against argument bindings
///
/// Templates without a `#{...}` span are returned unchanged. Identical
/// inputs always yield the identical key.
pub fn resolve(template: &str, bindings: &Bindings) -> Result<String, KeyError> {
    if template.trim().is_empty() {
        return Err(KeyError::BlankTemplate);
    }

    if !template.contains("#{") {
        return Ok(template.to_string());
    }

    let mut resolved = String::with_capacity(template.len());
    let mut last = 0;
    for caps in SPAN_PATTERN.captures_iter(template) {
        // Index 0 always exists for a match
        #[allow(clippy::expect_used)]
        let span = caps.get(0).expect("capture 0 is the whole match");
        resolved.push_str(&template[last..span.start()]);
        resolved.push_str(&eval_span(caps[1].trim(), bindings)?);
        last = span.end();
    }
    resolved.push_str(&template[last..]);

    Ok(resolved)
}

/// Evaluate one span body (`#name` or `#name.field.path`)
fn eval_span(expr: &str, bindings: &Bindings) -> Result<String, KeyError> {
    let caps = EXPR_PATTERN
        .captures(expr)
        .ok_or_else(|| KeyError::UnsupportedExpression {
            expr: expr.to_string(),
        })?;

    let name = &caps[1];
    let mut value = bindings.get(name).ok_or_else(|| KeyError::UnknownVariable {
        name: name.to_string(),
    })?;

    for segment in caps[2].split('.').filter(|s| !s.is_empty()) {
        value = value.get(segment).ok_or_else(|| KeyError::UnknownVariable {
            name: format!("{}{}", name, &caps[2]),
        })?;
    }

    render(value, expr)
}

/// Render a bound value as a key fragment
///
/// JSON strings render without quotes; structured values have no
/// canonical key form and are rejected.
fn render(value: &Value, expr: &str) -> Result<String, KeyError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(KeyError::Unrenderable {
            expr: expr.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;
