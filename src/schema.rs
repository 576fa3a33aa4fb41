//! Structural validation of wire documents against the embedded JSON Schemas.
//!
//! This stage is scene-independent: it checks field names, types, numeric
//! ranges, and the closed-shape contract before any cross-document rule
//! runs. It is total over arbitrary JSON values and always reports every
//! violation it finds, never just the first.

use std::fmt;
use std::sync::OnceLock;

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

static MOTION_SCHEMA: OnceLock<JSONSchema> = OnceLock::new();
static SCENE_SCHEMA: OnceLock<JSONSchema> = OnceLock::new();

fn compile_schema(source: &'static str) -> JSONSchema {
    let schema_value: Value =
        serde_json::from_str(source).expect("embedded schema should parse as JSON");
    JSONSchema::options()
        .with_draft(Draft::Draft202012)
        .compile(&schema_value)
        .expect("embedded schema should compile")
}

fn motion_schema() -> &'static JSONSchema {
    MOTION_SCHEMA.get_or_init(|| compile_schema(include_str!("../schema/motion_ir.schema.json")))
}

fn scene_schema() -> &'static JSONSchema {
    SCENE_SCHEMA.get_or_init(|| compile_schema(include_str!("../schema/scene.schema.json")))
}

/// One shape violation, located by a JSON pointer into the offending
/// document (empty pointer means the document root).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct StructuralIssue {
    pub path: String,
    pub message: String,
}

impl fmt::Display for StructuralIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} {}", self.path, self.message)
        }
    }
}

fn check_value(schema: &JSONSchema, value: &Value) -> Vec<StructuralIssue> {
    match schema.validate(value) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|err| StructuralIssue {
                path: err.instance_path.to_string(),
                message: err.to_string(),
            })
            .collect(),
    }
}

/// Checks a parsed value against the Motion IR wire shape. Empty result
/// means structural acceptance.
pub fn check_motion_value(value: &Value) -> Vec<StructuralIssue> {
    check_value(motion_schema(), value)
}

/// Checks a parsed value against the Scene Model wire shape.
pub fn check_scene_value(value: &Value) -> Vec<StructuralIssue> {
    check_value(scene_schema(), value)
}
