//! Node payloads for the authoritative design tree and the captured tree.
//!
//! Design nodes carry their kind under `meta.type` (falling back to a
//! top-level `type`, as in raw Figma node JSON) and the root declares its
//! image references under `assets.image_refs`. Captured nodes carry text runs
//! under `text.segments`.

use serde_json::{Map, Value};

use crate::tree::{FromShape, Tree};

/// Node kind tag for text layers.
pub const TEXT_KIND: &str = "TEXT";

pub type DesignTree = Tree<DesignNode>;
pub type CapturedTree = Tree<CapturedNode>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesignNode {
    pub kind: Option<String>,
    /// Declared image references; non-string entries are dropped.
    pub asset_refs: Vec<String>,
}

impl DesignNode {
    pub fn is_text(&self) -> bool {
        self.kind.as_deref() == Some(TEXT_KIND)
    }
}

impl FromShape for DesignNode {
    fn from_object(object: &Map<String, Value>) -> Self {
        let kind = object
            .get("meta")
            .and_then(Value::as_object)
            .and_then(|meta| meta.get("type"))
            .or_else(|| object.get("type"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let asset_refs = object
            .get("assets")
            .and_then(Value::as_object)
            .and_then(|assets| assets.get("image_refs"))
            .and_then(Value::as_array)
            .map(|refs| {
                refs.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self { kind, asset_refs }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedNode {
    /// Captured text runs. `Some(vec![])` still means the text was captured.
    pub text_segments: Option<Vec<Value>>,
}

impl CapturedNode {
    pub fn has_segments(&self) -> bool {
        self.text_segments.is_some()
    }
}

impl FromShape for CapturedNode {
    fn from_object(object: &Map<String, Value>) -> Self {
        let text_segments = object
            .get("text")
            .and_then(Value::as_object)
            .and_then(|text| text.get("segments"))
            .and_then(Value::as_array)
            .cloned();
        Self { text_segments }
    }
}

/// Output of the external content-capture step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureSnapshot {
    pub ok: bool,
    pub payload: Option<CapturedTree>,
}

impl CaptureSnapshot {
    pub fn from_value(value: &Value) -> Self {
        match value.as_object() {
            Some(object) => Self {
                ok: object.get("ok").map(truthy).unwrap_or(false),
                payload: object.get("payload").map(CapturedTree::from_value),
            },
            None => Self::default(),
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
