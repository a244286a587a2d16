//! Image-fill and variable inputs supplied alongside a design tree.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Resolved image fills keyed by asset reference.
///
/// Only string values count as resolved; a reference that is absent or maps to
/// anything else was not resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageFillMap(BTreeMap<String, String>);

impl ImageFillMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_object(object: &Map<String, Value>) -> Self {
        Self(
            object
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect(),
        )
    }

    pub fn insert(&mut self, asset_ref: impl Into<String>, data: impl Into<String>) {
        self.0.insert(asset_ref.into(), data.into());
    }

    pub fn resolves(&self, asset_ref: &str) -> bool {
        self.0.contains_key(asset_ref)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ImageFillMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Outcome of the external variable-resolution step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableBundle {
    /// Identifiers known to the design and the subset bound to a value.
    Resolved {
        raw: BTreeSet<String>,
        resolved: BTreeSet<String>,
    },
    /// Resolution failed as a whole.
    Failed { message: String },
}

impl VariableBundle {
    /// Read a bundle of the form `{variables: {...}, resolved: {...}}` or
    /// `{error: ...}`. Any other shape reads as an empty resolved bundle.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::empty();
        };

        if let Some(error) = object.get("error") {
            let message = match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return VariableBundle::Failed { message };
        }

        VariableBundle::Resolved {
            raw: object_keys(object.get("variables")),
            resolved: object_keys(object.get("resolved")),
        }
    }

    pub fn empty() -> Self {
        VariableBundle::Resolved {
            raw: BTreeSet::new(),
            resolved: BTreeSet::new(),
        }
    }
}

fn object_keys(value: Option<&Value>) -> BTreeSet<String> {
    value
        .and_then(Value::as_object)
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}
