//! Layered, first-match-wins project variables.

use crate::plugin::VariableMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::HashSet;

/// One plugin's contribution to the variable space.
#[derive(Debug, Clone, PartialEq)]
struct Layer {
    source: String,
    values: VariableMap,
}

/// An ordered list of variable mappings searched front to back.
///
/// Layers are kept in plugin registration order. A lookup returns the value
/// from the first layer that defines the name, so an earlier plugin always
/// shadows a later one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    layers: Vec<Layer>,
}

impl Variables {
    /// Creates an empty variable space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a variable space from `(source, mapping)` pairs in lookup order.
    #[must_use]
    pub fn from_layers<I, S>(layers: I) -> Self
    where
        I: IntoIterator<Item = (S, VariableMap)>,
        S: Into<String>,
    {
        let mut variables = Self::new();
        for (source, values) in layers {
            variables.push_layer(source, values);
        }
        variables
    }

    /// Appends a layer with the lowest precedence so far.
    pub fn push_layer(&mut self, source: impl Into<String>, values: VariableMap) {
        self.layers.push(Layer {
            source: source.into(),
            values,
        });
    }

    /// Looks a name up across layers; the first hit wins.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.layers.iter().find_map(|layer| layer.values.get(name))
    }

    /// Looks a name up and returns it as a string slice.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Returns true if any layer defines `name`.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.layers.iter().any(|layer| layer.values.contains_key(name))
    }

    /// Returns the source (plugin name) whose value `get` would return.
    #[must_use]
    pub fn source_of(&self, name: &str) -> Option<&str> {
        self.layers
            .iter()
            .find(|layer| layer.values.contains_key(name))
            .map(|layer| layer.source.as_str())
    }

    /// Returns the raw mapping contributed by one source.
    #[must_use]
    pub fn layer(&self, source: &str) -> Option<&VariableMap> {
        self.layers
            .iter()
            .find(|layer| layer.source == source)
            .map(|layer| &layer.values)
    }

    /// Iterates layers in lookup order.
    pub fn layers(&self) -> impl Iterator<Item = (&str, &VariableMap)> {
        self.layers
            .iter()
            .map(|layer| (layer.source.as_str(), &layer.values))
    }

    /// Returns every visible name once, in first-seen order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.layers
            .iter()
            .flat_map(|layer| layer.values.keys())
            .map(String::as_str)
            .filter(|key| seen.insert(*key))
            .collect()
    }

    /// Collapses the layers into the mapping lookups would observe.
    #[must_use]
    pub fn resolved(&self) -> VariableMap {
        let mut resolved = VariableMap::new();
        for layer in &self.layers {
            for (key, value) in &layer.values {
                if !resolved.contains_key(key) {
                    resolved.insert(key.clone(), value.clone());
                }
            }
        }
        resolved
    }

    /// Returns the number of distinct visible names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    /// Returns true if no layer defines anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|layer| layer.values.is_empty())
    }
}

impl Serialize for Variables {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let resolved = self.resolved();
        let mut map = serializer.serialize_map(Some(resolved.len()))?;
        for (key, value) in &resolved {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn map(value: Value) -> VariableMap {
        match value {
            Value::Object(map) => map,
            _ => VariableMap::new(),
        }
    }

    #[test]
    fn test_first_layer_wins() {
        let vars = Variables::from_layers([
            ("p1", map(json!({"x": 1}))),
            ("p2", map(json!({"x": 2, "y": 3}))),
        ]);

        assert_eq!(vars.get("x"), Some(&json!(1)));
        assert_eq!(vars.get("y"), Some(&json!(3)));
        assert_eq!(vars.source_of("x"), Some("p1"));
        assert_eq!(vars.source_of("y"), Some("p2"));
        assert_eq!(vars.get("z"), None);
    }

    #[test]
    fn test_layer_lookup_keeps_shadowed_values() {
        let vars = Variables::from_layers([
            ("p1", map(json!({"x": "first"}))),
            ("p2", map(json!({"x": "second"}))),
        ]);

        assert_eq!(vars.get_str("x"), Some("first"));
        assert_eq!(vars.layer("p2").and_then(|l| l.get("x")), Some(&json!("second")));
        assert!(vars.layer("p3").is_none());
    }

    #[test]
    fn test_keys_and_resolved() {
        let vars = Variables::from_layers([
            ("p1", map(json!({"b": 1, "a": 2}))),
            ("p2", map(json!({"a": 3, "c": 4}))),
        ]);

        assert_eq!(vars.keys(), vec!["b", "a", "c"]);
        assert_eq!(vars.len(), 3);
        assert_eq!(
            Value::Object(vars.resolved()),
            json!({"b": 1, "a": 2, "c": 4})
        );
        assert_eq!(serde_json::to_value(&vars).unwrap(), json!({"b": 1, "a": 2, "c": 4}));
    }

    #[test]
    fn test_keys_across_many_overlapping_layers() {
        let layers = (0..200).map(|i| {
            let mut values = VariableMap::new();
            for k in 0..50 {
                values.insert(format!("shared_{k}"), json!(i));
            }
            values.insert(format!("own_{i}"), json!(i));
            (format!("p{i}"), values)
        });
        let vars = Variables::from_layers(layers);

        let keys = vars.keys();
        assert_eq!(keys.len(), 250);
        assert_eq!(keys[0], "shared_0");
        assert_eq!(keys[50], "own_0");
        assert_eq!(keys[249], "own_199");
        assert_eq!(vars.len(), 250);
        assert_eq!(vars.get("shared_7"), Some(&json!(0)));
    }

    #[test]
    fn test_empty_layers() {
        let vars = Variables::from_layers([("p1", VariableMap::new())]);
        assert!(vars.is_empty());
        assert_eq!(vars.layers().count(), 1);
        assert!(Variables::new().is_empty());
    }
}
