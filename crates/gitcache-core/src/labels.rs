//! Human-readable labels for long-running operations.
//!
//! Labels are looked up by a dotted code and interpolated with `%{key}`
//! placeholders taken from a JSON object. They are purely cosmetic: an unknown
//! code or a missing key never fails, it just yields a less friendly label.

use std::collections::HashMap;

use serde_json::Value;

/// Label code for cloning a remote mirror.
pub const GIT_ARTIFACT_CLONE: &str = "process.git_artifact_clone";

/// Label code for fetching into a remote mirror.
pub const GIT_ARTIFACT_FETCH: &str = "process.git_artifact_fetch";

/// Label code for removing a remote mirror.
pub const GIT_ARTIFACT_DISPOSE: &str = "process.git_artifact_dispose";

/// Lookup table turning `(code, data)` pairs into labels.
#[derive(Debug, Clone)]
pub struct LabelCatalog {
    templates: HashMap<String, String>,
}

impl LabelCatalog {
    /// Creates an empty catalog.
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Adds or replaces the template for `code`.
    pub fn insert(&mut self, code: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(code.into(), template.into());
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with(mut self, code: impl Into<String>, template: impl Into<String>) -> Self {
        self.insert(code, template);
        self
    }

    /// Renders the label for `code`.
    ///
    /// Falls back to the code itself when no template is registered.
    pub fn label(&self, code: &str, data: &Value) -> String {
        match self.templates.get(code) {
            Some(template) => interpolate(template, data),
            None => code.to_string(),
        }
    }
}

impl Default for LabelCatalog {
    fn default() -> Self {
        Self::empty()
            .with(GIT_ARTIFACT_CLONE, "Clone %{name}")
            .with(GIT_ARTIFACT_FETCH, "Fetch %{name}")
            .with(GIT_ARTIFACT_DISPOSE, "Remove %{name}")
    }
}

fn interpolate(template: &str, data: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("%{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        match data.get(key) {
            Some(Value::String(s)) => out.push_str(s),
            Some(Value::Null) | None => {
                out.push_str("%{");
                out.push_str(key);
                out.push('}');
            },
            Some(other) => out.push_str(&other.to_string()),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}
