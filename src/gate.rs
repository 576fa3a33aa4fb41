//! The trust boundary: raw generator text in, validated values out.
//!
//! The generator is untrusted and expected to sometimes produce invalid
//! output, so nothing here returns `Err` or panics on bad payloads; a
//! malformed or policy-violating document is an ordinary [`GateOutcome::Rejected`]
//! carrying the complete list of reasons.

use serde_json::Value;

use crate::model::MotionIr;
use crate::scene::SceneModel;
use crate::schema::{StructuralIssue, check_motion_value, check_scene_value};
use crate::validate::{IssueCode, MotionRules, validate_motion};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GateIssue {
    pub code: IssueCode,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GateOutcome<T> {
    Accepted(T),
    /// Rejection always carries at least one issue.
    Rejected(Vec<GateIssue>),
}

impl<T> GateOutcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn into_accepted(self) -> Option<T> {
        match self {
            Self::Accepted(value) => Some(value),
            Self::Rejected(_) => None,
        }
    }

    pub fn issues(&self) -> &[GateIssue] {
        match self {
            Self::Accepted(_) => &[],
            Self::Rejected(issues) => issues,
        }
    }
}

/// A Motion IR that passed parse, structural, and semantic validation.
///
/// The gate functions in this module are the only constructors, so any
/// downstream signature taking `AcceptedMotion` cannot be handed ungated
/// data.
#[derive(Clone, Debug, PartialEq)]
pub struct AcceptedMotion {
    ir: MotionIr,
}

impl AcceptedMotion {
    pub fn ir(&self) -> &MotionIr {
        &self.ir
    }

    pub fn into_ir(self) -> MotionIr {
        self.ir
    }
}

fn parse_issue(err: &serde_json::Error) -> Vec<GateIssue> {
    vec![GateIssue {
        code: IssueCode::Parse,
        message: format!("invalid JSON: {err}"),
    }]
}

fn structural_issues(code: IssueCode, issues: Vec<StructuralIssue>) -> Vec<GateIssue> {
    issues
        .into_iter()
        .map(|issue| GateIssue {
            code,
            message: issue.to_string(),
        })
        .collect()
}

/// Gates raw generator text against an already-validated scene: parse, then
/// structural check, then semantic validation. Each stage only runs if the
/// previous one accepted.
#[tracing::instrument(skip_all, fields(bytes = raw.len()))]
pub fn gate_motion_json(
    raw: &str,
    scene: &SceneModel,
    rules: &MotionRules,
) -> GateOutcome<AcceptedMotion> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => return GateOutcome::Rejected(parse_issue(&err)),
    };

    let structural = check_motion_value(&value);
    if !structural.is_empty() {
        tracing::debug!(issues = structural.len(), "motion rejected at structural stage");
        return GateOutcome::Rejected(structural_issues(IssueCode::Schema, structural));
    }

    let ir: MotionIr = match serde_json::from_value(value) {
        Ok(ir) => ir,
        Err(err) => {
            // The typed model accepts every shape the schema does; if the
            // two ever drift, this rejects instead of raising.
            return GateOutcome::Rejected(vec![GateIssue {
                code: IssueCode::Schema,
                message: err.to_string(),
            }]);
        }
    };

    let verdict = validate_motion(&ir, scene, rules);
    if !verdict.ok {
        tracing::debug!(issues = verdict.issues.len(), "motion rejected at semantic stage");
        return GateOutcome::Rejected(
            verdict
                .issues
                .into_iter()
                .map(|issue| GateIssue {
                    code: issue.code,
                    message: issue.message,
                })
                .collect(),
        );
    }

    GateOutcome::Accepted(AcceptedMotion { ir })
}

/// Gates a scene payload alone. No semantic stage: there is no second
/// document to cross-check against, only the wire shape and the scene's own
/// model-level invariants.
#[tracing::instrument(skip_all, fields(bytes = raw.len()))]
pub fn gate_scene_json(raw: &str) -> GateOutcome<SceneModel> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => return GateOutcome::Rejected(parse_issue(&err)),
    };

    let structural = check_scene_value(&value);
    if !structural.is_empty() {
        return GateOutcome::Rejected(structural_issues(IssueCode::Schema, structural));
    }

    let scene: SceneModel = match serde_json::from_value(value) {
        Ok(scene) => scene,
        Err(err) => {
            return GateOutcome::Rejected(vec![GateIssue {
                code: IssueCode::Schema,
                message: err.to_string(),
            }]);
        }
    };

    if let Err(err) = scene.validate() {
        return GateOutcome::Rejected(vec![GateIssue {
            code: IssueCode::Schema,
            message: err.to_string(),
        }]);
    }

    GateOutcome::Accepted(scene)
}

/// Gates a scene payload and a motion payload together: the scene must be
/// accepted before the motion is checked against it. Scene failures are
/// tagged `scene_schema` so callers can tell which document sank the pair.
#[tracing::instrument(skip_all)]
pub fn gate_generation(
    scene_raw: &str,
    motion_raw: &str,
    rules: &MotionRules,
) -> GateOutcome<(SceneModel, AcceptedMotion)> {
    let scene = match gate_scene_json(scene_raw) {
        GateOutcome::Accepted(scene) => scene,
        GateOutcome::Rejected(issues) => {
            return GateOutcome::Rejected(
                issues
                    .into_iter()
                    .map(|issue| GateIssue {
                        code: match issue.code {
                            IssueCode::Parse => IssueCode::Parse,
                            _ => IssueCode::SceneSchema,
                        },
                        message: issue.message,
                    })
                    .collect(),
            );
        }
    };

    match gate_motion_json(motion_raw, &scene, rules) {
        GateOutcome::Accepted(motion) => GateOutcome::Accepted((scene, motion)),
        GateOutcome::Rejected(issues) => GateOutcome::Rejected(issues),
    }
}
