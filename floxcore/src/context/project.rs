//! Project identity and variable space.

use super::Variables;
use serde::Serialize;
use serde_json::Value;

/// Identity and variables for one working directory.
///
/// `id` and `description` come from the reserved `project` section of the
/// settings document. Any other key of that section lands in
/// [`Project::extra`], in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Project {
    id: Option<String>,
    description: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, Value>,
    #[serde(skip)]
    variables: Variables,
}

impl Project {
    /// Creates an empty project.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the project id.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the project description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns an additional field of the `project` section.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Returns all additional fields in document order.
    #[must_use]
    pub const fn extra(&self) -> &serde_json::Map<String, Value> {
        &self.extra
    }

    /// Returns the layered variable space.
    #[must_use]
    pub const fn variables(&self) -> &Variables {
        &self.variables
    }

    pub(crate) fn set_variables(&mut self, variables: Variables) {
        self.variables = variables;
    }

    /// Clears identity, extra fields and variables.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Assigns the fields of a `project` section.
    pub(crate) fn apply_section(&mut self, section: serde_json::Map<String, Value>) {
        for (key, value) in section {
            match key.as_str() {
                "id" | "description" => match identity_text(&value) {
                    Some(text) => {
                        let slot = if key == "id" {
                            &mut self.id
                        } else {
                            &mut self.description
                        };
                        *slot = text;
                    }
                    None => {
                        tracing::warn!(field = %key, "non-scalar project field kept as extra field");
                        self.extra.insert(key, value);
                    }
                },
                _ => {
                    self.extra.insert(key, value);
                }
            }
        }
    }
}

/// Converts a scalar to identity text. `None` means the value is not a scalar.
fn identity_text(value: &Value) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) => Some(Some(s.clone())),
        Value::Bool(b) => Some(Some(b.to_string())),
        Value::Number(n) => Some(Some(n.to_string())),
        Value::Array(_) | Value::Object(_) => None,
    }
}
