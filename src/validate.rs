//! Semantic validation: scene-dependent legality rules for a structurally
//! accepted Motion IR.
//!
//! Deliberately separate from the structural stage in [`crate::schema`]:
//! these rules need the scene and encode product policy (safe camera moves,
//! legal content edits) that evolves independently of the wire shape.

use std::fmt;

use crate::model::{MotionIr, Track};
use crate::scene::SceneModel;

/// Closed issue vocabulary shared by the validators and the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    Parse,
    Schema,
    SceneSchema,
    Timeline,
    FrameRange,
    FrameOrder,
    MissingElement,
    TextEditIllegal,
    HiddenTextEdit,
    ScaleIllegal,
    CameraBounds,
    CameraZoom,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Schema => "schema",
            Self::SceneSchema => "scene_schema",
            Self::Timeline => "timeline",
            Self::FrameRange => "frame_range",
            Self::FrameOrder => "frame_order",
            Self::MissingElement => "missing_element",
            Self::TextEditIllegal => "text_edit_illegal",
            Self::HiddenTextEdit => "hidden_text_edit",
            Self::ScaleIllegal => "scale_illegal",
            Self::CameraBounds => "camera_bounds",
            Self::CameraZoom => "camera_zoom",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SemanticIssue {
    pub code: IssueCode,
    pub message: String,
}

impl SemanticIssue {
    fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Product-level policy knobs for semantic validation.
#[derive(Clone, Copy, Debug)]
pub struct MotionRules {
    pub max_zoom: f64,
}

impl Default for MotionRules {
    fn default() -> Self {
        Self { max_zoom: 4.0 }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Verdict {
    pub ok: bool,
    pub issues: Vec<SemanticIssue>,
}

/// Checks a Motion IR against a specific scene. Exhaustive: every violation
/// yields its own issue, nothing short-circuits.
pub fn validate_motion(ir: &MotionIr, scene: &SceneModel, rules: &MotionRules) -> Verdict {
    let mut issues = Vec::new();

    if ir.timeline == 0 {
        issues.push(SemanticIssue::new(
            IssueCode::Timeline,
            "timeline must be > 0",
        ));
    }

    for track in &ir.tracks {
        let frames: Vec<u64> = track.keyframe_frames().collect();
        for &f in &frames {
            if f > ir.timeline {
                issues.push(SemanticIssue::new(
                    IssueCode::FrameRange,
                    format!("keyframe {f} out of [0, {}]", ir.timeline),
                ));
            }
        }
        for w in frames.windows(2) {
            if w[1] < w[0] {
                issues.push(SemanticIssue::new(
                    IssueCode::FrameOrder,
                    "keyframes must be non-decreasing by frame",
                ));
            }
        }
    }

    for track in &ir.tracks {
        if let Track::Element {
            target_id,
            keyframes,
        } = track
        {
            let element = scene.element(target_id);
            if element.is_none() {
                issues.push(SemanticIssue::new(
                    IssueCode::MissingElement,
                    format!("targetId {target_id} not found"),
                ));
            }
            for kf in keyframes {
                if kf.text_content.is_some() {
                    // A missing element is never editable; both issues apply.
                    let editable = element.is_some_and(|e| e.editable);
                    if !editable {
                        issues.push(SemanticIssue::new(
                            IssueCode::TextEditIllegal,
                            format!("textContent change requires editable=true on {target_id}"),
                        ));
                    }
                    if kf.opacity == Some(0.0) {
                        issues.push(SemanticIssue::new(
                            IssueCode::HiddenTextEdit,
                            format!("textContent change while opacity=0 on {target_id}"),
                        ));
                    }
                }
                if let Some(scale) = kf.scale {
                    if scale <= 0.0 {
                        issues.push(SemanticIssue::new(
                            IssueCode::ScaleIllegal,
                            format!("scale must be > 0 on {target_id}"),
                        ));
                    }
                }
            }
        }
    }

    let width = scene.meta.width;
    let height = scene.meta.height;
    for track in &ir.tracks {
        if let Track::Camera { keyframes } = track {
            for kf in keyframes {
                if let Some(x) = kf.x {
                    if x < 0.0 || x > width {
                        issues.push(SemanticIssue::new(
                            IssueCode::CameraBounds,
                            format!("camera x={x} outside [0, {width}]"),
                        ));
                    }
                }
                if let Some(y) = kf.y {
                    if y < 0.0 || y > height {
                        issues.push(SemanticIssue::new(
                            IssueCode::CameraBounds,
                            format!("camera y={y} outside [0, {height}]"),
                        ));
                    }
                }
                if let Some(z) = kf.z {
                    if z <= 0.0 || z > rules.max_zoom {
                        issues.push(SemanticIssue::new(
                            IssueCode::CameraZoom,
                            format!("camera z={z} outside (0, {}]", rules.max_zoom),
                        ));
                    }
                }
            }
        }
    }

    Verdict {
        ok: issues.is_empty(),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CameraKeyframe, ElementKeyframe};
    use crate::scene::{BBox, Element, ElementType, SceneMeta, SceneModel};

    fn scene() -> SceneModel {
        SceneModel {
            elements: vec![
                Element {
                    id: "btn".to_string(),
                    kind: ElementType::Button,
                    bbox: BBox {
                        x: 10.0,
                        y: 10.0,
                        width: 100.0,
                        height: 40.0,
                    },
                    editable: false,
                    semantic_role: None,
                },
                Element {
                    id: "field".to_string(),
                    kind: ElementType::Input,
                    bbox: BBox {
                        x: 10.0,
                        y: 60.0,
                        width: 200.0,
                        height: 40.0,
                    },
                    editable: true,
                    semantic_role: None,
                },
            ],
            meta: SceneMeta {
                source: None,
                width: 640.0,
                height: 480.0,
            },
        }
    }

    fn camera_track(keyframes: Vec<CameraKeyframe>) -> Track {
        Track::Camera { keyframes }
    }

    fn element_track(target: &str, keyframes: Vec<ElementKeyframe>) -> Track {
        Track::Element {
            target_id: target.to_string(),
            keyframes,
        }
    }

    fn ir(tracks: Vec<Track>) -> MotionIr {
        MotionIr {
            timeline: 100,
            tracks,
        }
    }

    fn codes(v: &Verdict) -> Vec<IssueCode> {
        v.issues.iter().map(|i| i.code).collect()
    }

    #[test]
    fn accepts_legal_motion() {
        let ir = ir(vec![
            camera_track(vec![
                CameraKeyframe {
                    frame: 0,
                    x: Some(0.0),
                    y: Some(0.0),
                    z: Some(1.0),
                    ..Default::default()
                },
                CameraKeyframe {
                    frame: 100,
                    x: Some(640.0),
                    y: Some(480.0),
                    z: Some(4.0),
                    ..Default::default()
                },
            ]),
            element_track(
                "field",
                vec![ElementKeyframe {
                    frame: 50,
                    opacity: Some(1.0),
                    text_content: Some("hello".to_string()),
                    ..Default::default()
                }],
            ),
        ]);
        let v = validate_motion(&ir, &scene(), &MotionRules::default());
        assert!(v.ok, "{:?}", v.issues);
    }

    #[test]
    fn rejects_zero_timeline() {
        let ir = MotionIr {
            timeline: 0,
            tracks: vec![],
        };
        let v = validate_motion(&ir, &scene(), &MotionRules::default());
        assert_eq!(codes(&v), vec![IssueCode::Timeline]);
    }

    #[test]
    fn rejects_frame_out_of_range() {
        let ir = ir(vec![camera_track(vec![CameraKeyframe {
            frame: 101,
            ..Default::default()
        }])]);
        let v = validate_motion(&ir, &scene(), &MotionRules::default());
        assert_eq!(codes(&v), vec![IssueCode::FrameRange]);
    }

    #[test]
    fn frame_at_timeline_is_legal() {
        let ir = ir(vec![camera_track(vec![CameraKeyframe {
            frame: 100,
            ..Default::default()
        }])]);
        assert!(validate_motion(&ir, &scene(), &MotionRules::default()).ok);
    }

    #[test]
    fn rejects_decreasing_frames() {
        let ir = ir(vec![element_track(
            "btn",
            vec![
                ElementKeyframe {
                    frame: 30,
                    ..Default::default()
                },
                ElementKeyframe {
                    frame: 10,
                    ..Default::default()
                },
            ],
        )]);
        let v = validate_motion(&ir, &scene(), &MotionRules::default());
        assert_eq!(codes(&v), vec![IssueCode::FrameOrder]);
    }

    #[test]
    fn rejects_missing_element() {
        let ir = ir(vec![element_track(
            "ghost",
            vec![ElementKeyframe {
                frame: 0,
                ..Default::default()
            }],
        )]);
        let v = validate_motion(&ir, &scene(), &MotionRules::default());
        assert_eq!(codes(&v), vec![IssueCode::MissingElement]);
    }

    #[test]
    fn rejects_text_edit_on_non_editable_element() {
        let ir = ir(vec![element_track(
            "btn",
            vec![ElementKeyframe {
                frame: 0,
                text_content: Some("OK".to_string()),
                ..Default::default()
            }],
        )]);
        let v = validate_motion(&ir, &scene(), &MotionRules::default());
        assert_eq!(codes(&v), vec![IssueCode::TextEditIllegal]);
    }

    #[test]
    fn rejects_hidden_text_edit() {
        let ir = ir(vec![element_track(
            "field",
            vec![ElementKeyframe {
                frame: 0,
                opacity: Some(0.0),
                text_content: Some("hi".to_string()),
                ..Default::default()
            }],
        )]);
        let v = validate_motion(&ir, &scene(), &MotionRules::default());
        assert_eq!(codes(&v), vec![IssueCode::HiddenTextEdit]);
    }

    #[test]
    fn missing_element_text_edit_reports_both() {
        let ir = ir(vec![element_track(
            "ghost",
            vec![ElementKeyframe {
                frame: 0,
                text_content: Some("hi".to_string()),
                ..Default::default()
            }],
        )]);
        let v = validate_motion(&ir, &scene(), &MotionRules::default());
        assert_eq!(
            codes(&v),
            vec![IssueCode::MissingElement, IssueCode::TextEditIllegal]
        );
    }

    #[test]
    fn rejects_non_positive_scale() {
        let ir = ir(vec![element_track(
            "btn",
            vec![ElementKeyframe {
                frame: 0,
                scale: Some(0.0),
                ..Default::default()
            }],
        )]);
        let v = validate_motion(&ir, &scene(), &MotionRules::default());
        assert_eq!(codes(&v), vec![IssueCode::ScaleIllegal]);
    }

    #[test]
    fn camera_bounds_are_inclusive() {
        let at_edge = ir(vec![camera_track(vec![CameraKeyframe {
            frame: 0,
            x: Some(640.0),
            y: Some(480.0),
            ..Default::default()
        }])]);
        assert!(validate_motion(&at_edge, &scene(), &MotionRules::default()).ok);

        let past_edge = ir(vec![camera_track(vec![CameraKeyframe {
            frame: 0,
            x: Some(650.0),
            ..Default::default()
        }])]);
        let v = validate_motion(&past_edge, &scene(), &MotionRules::default());
        assert_eq!(codes(&v), vec![IssueCode::CameraBounds]);
    }

    #[test]
    fn camera_zoom_respects_rules() {
        let ir = ir(vec![camera_track(vec![CameraKeyframe {
            frame: 0,
            z: Some(5.0),
            ..Default::default()
        }])]);
        let v = validate_motion(&ir, &scene(), &MotionRules::default());
        assert_eq!(codes(&v), vec![IssueCode::CameraZoom]);

        let relaxed = MotionRules { max_zoom: 8.0 };
        assert!(validate_motion(&ir, &scene(), &relaxed).ok);
    }

    #[test]
    fn reports_every_violation_without_short_circuiting() {
        let ir = MotionIr {
            timeline: 10,
            tracks: vec![
                camera_track(vec![CameraKeyframe {
                    frame: 99,
                    x: Some(-5.0),
                    z: Some(9.0),
                    ..Default::default()
                }]),
                element_track(
                    "ghost",
                    vec![ElementKeyframe {
                        frame: 0,
                        scale: Some(-1.0),
                        ..Default::default()
                    }],
                ),
            ],
        };
        let v = validate_motion(&ir, &scene(), &MotionRules::default());
        assert!(!v.ok);
        let got = codes(&v);
        for expected in [
            IssueCode::FrameRange,
            IssueCode::CameraBounds,
            IssueCode::CameraZoom,
            IssueCode::MissingElement,
            IssueCode::ScaleIllegal,
        ] {
            assert!(got.contains(&expected), "missing {expected}: {got:?}");
        }
    }

    #[test]
    fn issue_codes_serialize_snake_case() {
        assert_eq!(IssueCode::MissingElement.to_string(), "missing_element");
        assert_eq!(
            serde_json::to_string(&IssueCode::HiddenTextEdit).unwrap(),
            "\"hidden_text_edit\""
        );
        assert_eq!(
            serde_json::to_string(&IssueCode::SceneSchema).unwrap(),
            "\"scene_schema\""
        );
    }
}
