use std::collections::HashSet;

use crate::error::{MotionError, MotionResult};
use crate::schema;

/// Static, validated description of a canvas and its addressable elements.
/// Produced once by the upstream extractor and immutable afterwards; element
/// ids are the only handle by which a motion track may reference an element.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneModel {
    pub elements: Vec<Element>,
    pub meta: SceneMeta,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Element {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementType,
    pub bbox: BBox,
    #[serde(default)]
    pub editable: bool,
    #[serde(
        rename = "semanticRole",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub semantic_role: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Button,
    Text,
    Input,
    Cursor,
    Container,
    Shape,
    Image,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SceneModel {
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Model-level invariants the wire schema cannot express.
    pub fn validate(&self) -> MotionResult<()> {
        if !(self.meta.width > 0.0) || !(self.meta.height > 0.0) {
            return Err(MotionError::validation(
                "scene canvas width/height must be > 0",
            ));
        }
        let mut seen = HashSet::new();
        for el in &self.elements {
            if !seen.insert(el.id.as_str()) {
                return Err(MotionError::validation(format!(
                    "duplicate element id '{}'",
                    el.id
                )));
            }
        }
        Ok(())
    }

    /// Trusted-path load for scene documents produced by the upstream
    /// extractor. Untrusted payloads go through [`crate::gate::gate_scene_json`]
    /// instead, which reports issues as values rather than errors.
    pub fn from_json(raw: &str) -> MotionResult<Self> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| MotionError::parse(e.to_string()))?;
        let issues = schema::check_scene_value(&value);
        if !issues.is_empty() {
            let joined = issues
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(MotionError::validation(joined));
        }
        let scene: SceneModel =
            serde_json::from_value(value).map_err(|e| MotionError::serde(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }
}
