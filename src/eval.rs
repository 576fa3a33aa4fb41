//! Frame evaluation: piecewise keyframe interpolation and multi-track
//! composition.
//!
//! Evaluation is pure. [`FrameEvaluator::new`] snapshots each track's
//! keyframes sorted by frame (stable, so ties keep source order) and
//! [`FrameEvaluator::evaluate`] reads that snapshot without mutating it,
//! which makes a shared evaluator safe to call from any number of threads.

use std::collections::BTreeMap;

use crate::ease::Ease;
use crate::model::{CameraKeyframe, ElementKeyframe, MotionIr, Track};

/// Camera state at a frame. Starts from the identity camera and only the
/// fields a sampled keyframe explicitly carries overwrite it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CameraState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub rotation: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 1.0,
            rotation: 0.0,
        }
    }
}

/// Per-element partial property record. Absent fields were never set by any
/// track up to this frame; the renderer falls back to the element's static
/// scene state for them.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ElementState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(rename = "textContent", skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameProps {
    pub camera: CameraState,
    pub elements: BTreeMap<String, ElementState>,
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn mix_num(a: Option<f64>, b: Option<f64>, t: f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(lerp(a, b, t)),
        (a, b) => b.or(a),
    }
}

/// A keyframe shape the generic sampler can clamp, bracket, and blend.
trait Sampled: Clone {
    fn frame(&self) -> u64;
    fn ease(&self) -> Option<Ease>;
    fn mix(a: &Self, b: &Self, t: f64) -> Self;
}

impl Sampled for CameraKeyframe {
    fn frame(&self) -> u64 {
        self.frame
    }

    fn ease(&self) -> Option<Ease> {
        self.easing
    }

    fn mix(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            frame: b.frame,
            easing: b.easing.or(a.easing),
            x: mix_num(a.x, b.x, t),
            y: mix_num(a.y, b.y, t),
            z: mix_num(a.z, b.z, t),
            rotation: mix_num(a.rotation, b.rotation, t),
        }
    }
}

impl Sampled for ElementKeyframe {
    fn frame(&self) -> u64 {
        self.frame
    }

    fn ease(&self) -> Option<Ease> {
        self.easing
    }

    fn mix(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            frame: b.frame,
            easing: b.easing.or(a.easing),
            x: mix_num(a.x, b.x, t),
            y: mix_num(a.y, b.y, t),
            opacity: mix_num(a.opacity, b.opacity, t),
            scale: mix_num(a.scale, b.scale, t),
            rotation: mix_num(a.rotation, b.rotation, t),
            // Non-numeric fields step, they never interpolate.
            text_content: b.text_content.clone().or_else(|| a.text_content.clone()),
        }
    }
}

/// Samples one track at `frame`: clamp outside the keyframe span, eased
/// field-by-field blend of the bracketing pair inside it. `None` when the
/// track has no keyframes at all.
fn sample<K: Sampled>(keys: &[K], frame: f64) -> Option<K> {
    let first = keys.first()?;
    // NaN compares false against every bound, which would otherwise dodge
    // both clamps; resolve it past the end, where the clamp lands.
    if frame.is_nan() {
        return keys.last().cloned();
    }
    if frame <= first.frame() as f64 {
        return Some(first.clone());
    }
    let last = keys.last()?;
    if frame >= last.frame() as f64 {
        return Some(last.clone());
    }

    // First key at or past `frame` ends the bracketing segment, so a frame
    // sitting exactly on a keyframe resolves as the end of the segment
    // arriving at it.
    let hi = keys.partition_point(|k| (k.frame() as f64) < frame);
    let a = &keys[hi - 1];
    let b = &keys[hi];

    let span = (b.frame() - a.frame()) as f64;
    let t_lin = if span == 0.0 {
        1.0
    } else {
        (frame - a.frame() as f64) / span
    };
    let ease = b.ease().or_else(|| a.ease()).unwrap_or(Ease::None);
    Some(K::mix(a, b, ease.apply(t_lin)))
}

enum SortedTrack {
    Camera(Vec<CameraKeyframe>),
    Element {
        target_id: String,
        keyframes: Vec<ElementKeyframe>,
    },
}

/// Memoized evaluator for one accepted Motion IR.
pub struct FrameEvaluator {
    tracks: Vec<SortedTrack>,
}

impl FrameEvaluator {
    /// The sort is defensive: accepted IR already has non-decreasing
    /// keyframes, but the evaluator must behave on IR that skipped
    /// validation.
    #[tracing::instrument(skip(ir), fields(tracks = ir.tracks.len()))]
    pub fn new(ir: &MotionIr) -> Self {
        let tracks = ir
            .tracks
            .iter()
            .map(|track| match track {
                Track::Camera { keyframes } => {
                    let mut keys = keyframes.clone();
                    keys.sort_by_key(|k| k.frame);
                    SortedTrack::Camera(keys)
                }
                Track::Element {
                    target_id,
                    keyframes,
                } => {
                    let mut keys = keyframes.clone();
                    keys.sort_by_key(|k| k.frame);
                    SortedTrack::Element {
                        target_id: target_id.clone(),
                        keyframes: keys,
                    }
                }
            })
            .collect();
        Self { tracks }
    }

    /// Evaluates every track at `frame` and composes the results in declared
    /// track order: later camera tracks overwrite camera state field by
    /// field, element tracks sharing a target merge additively into one
    /// record. Out-of-range frames clamp, they never fail.
    pub fn evaluate(&self, frame: f64) -> FrameProps {
        let mut camera = CameraState::default();
        let mut elements: BTreeMap<String, ElementState> = BTreeMap::new();

        for track in &self.tracks {
            match track {
                SortedTrack::Camera(keys) => {
                    if let Some(k) = sample(keys, frame) {
                        if let Some(x) = k.x {
                            camera.x = x;
                        }
                        if let Some(y) = k.y {
                            camera.y = y;
                        }
                        if let Some(z) = k.z {
                            camera.z = z;
                        }
                        if let Some(rotation) = k.rotation {
                            camera.rotation = rotation;
                        }
                    }
                }
                SortedTrack::Element {
                    target_id,
                    keyframes,
                } => {
                    if let Some(k) = sample(keyframes, frame) {
                        let state = elements.entry(target_id.clone()).or_default();
                        if let Some(x) = k.x {
                            state.x = Some(x);
                        }
                        if let Some(y) = k.y {
                            state.y = Some(y);
                        }
                        if let Some(opacity) = k.opacity {
                            state.opacity = Some(opacity);
                        }
                        if let Some(scale) = k.scale {
                            state.scale = Some(scale);
                        }
                        if let Some(rotation) = k.rotation {
                            state.rotation = Some(rotation);
                        }
                        if let Some(text) = k.text_content {
                            state.text_content = Some(text);
                        }
                    }
                }
            }
        }

        FrameProps { camera, elements }
    }
}
