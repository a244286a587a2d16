//! Evaluation inputs and their extraction from raw service payloads.
//!
//! A node bundle is the JSON object returned by the design-tree service:
//!
//! ```json
//! {
//!   "dsl_json": { "meta": {"type": "FRAME"}, "assets": {"image_refs": ["r1"]}, "children": [] },
//!   "plugin_snapshot": { "ok": true, "payload": { "text": {"segments": []}, "children": [] } },
//!   "image_fills": { "images": { "r1": "https://..." } },
//!   "variables": { "variables": {"v1": {}}, "resolved": {"v1": "#fff"} }
//! }
//! ```
//!
//! Every field is optional and every accessor is shape-checked; a bundle
//! never fails to load once it parses as JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{
    CaptureSnapshot, DesignTree, ImageFillMap, ImagePair, PixelMatrix, VariableBundle,
};

/// Everything one evaluation may look at. Absent fields disable the metrics
/// that need them.
#[derive(Debug, Clone, Default)]
pub struct EvaluationInputs {
    pub design: Option<DesignTree>,
    pub capture: Option<CaptureSnapshot>,
    pub image_fills: Option<ImageFillMap>,
    pub variables: Option<VariableBundle>,
    pub images: Option<ImagePair>,
    pub fidelity_loop: Option<LoopSummary>,
}

impl EvaluationInputs {
    /// Extract inputs from a node bundle value.
    pub fn from_bundle(bundle: &Value) -> Self {
        let Some(object) = bundle.as_object() else {
            return Self::default();
        };

        let design = present(object, "dsl_json").map(DesignTree::from_value);
        let capture = present(object, "plugin_snapshot").map(CaptureSnapshot::from_value);
        let image_fills = present(object, "image_fills").map(|fills| {
            fills
                .get("images")
                .and_then(Value::as_object)
                .map(ImageFillMap::from_object)
                .unwrap_or_default()
        });
        let variables = present(object, "variables").map(VariableBundle::from_value);

        Self {
            design,
            capture,
            image_fills,
            variables,
            images: None,
            fidelity_loop: None,
        }
    }

    pub fn with_images(mut self, reference: PixelMatrix, candidate: PixelMatrix) -> Self {
        self.images = Some(ImagePair {
            reference,
            candidate,
        });
        self
    }

    pub fn with_fidelity_loop(mut self, summary: LoopSummary) -> Self {
        self.fidelity_loop = Some(summary);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.design.is_none()
            && self.image_fills.is_none()
            && self.variables.is_none()
            && self.images.is_none()
            && self.fidelity_loop.is_none()
    }
}

fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|v| !v.is_null())
}

/// Summary of a remote depth-search run (the search itself happens
/// elsewhere; only its result is read here).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achieved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fidelity: Option<Map<String, Value>>,
}

impl LoopSummary {
    /// Read a loop result; `None` when the result is not an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let fidelity = object
            .get("best")
            .and_then(Value::as_object)
            .and_then(|best| best.get("fidelity"))
            .and_then(Value::as_object)
            .cloned();

        Some(Self {
            target_score: object.get("target_score").and_then(Value::as_f64),
            best_score: object.get("best_score").and_then(Value::as_f64),
            achieved: object.get("achieved").and_then(Value::as_bool),
            attempts: object
                .get("attempts")
                .and_then(Value::as_array)
                .map(Vec::len),
            fidelity,
        })
    }
}
