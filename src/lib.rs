#![forbid(unsafe_code)]

pub mod ease;
pub mod error;
pub mod eval;
pub mod gate;
pub mod model;
pub mod scene;
pub mod schema;
pub mod validate;

pub use ease::Ease;
pub use error::{MotionError, MotionResult};
pub use eval::{CameraState, ElementState, FrameEvaluator, FrameProps};
pub use gate::{
    AcceptedMotion, GateIssue, GateOutcome, gate_generation, gate_motion_json, gate_scene_json,
};
pub use model::{CameraKeyframe, ElementKeyframe, MotionIr, Track};
pub use scene::{BBox, Element, ElementType, SceneMeta, SceneModel};
pub use schema::{StructuralIssue, check_motion_value, check_scene_value};
pub use validate::{IssueCode, MotionRules, SemanticIssue, Verdict, validate_motion};
