use crate::ease::Ease;

/// JSON Schema (like the structural stage here) counts `10.0` as an
/// integer, so the typed model has to as well: zero-fraction floats decode
/// as the integer they denote.
fn wire_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct WireU64;

    impl serde::de::Visitor<'_> for WireU64 {
        type Value = u64;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a non-negative integer")
        }

        fn visit_u64<E>(self, v: u64) -> Result<u64, E>
        where
            E: serde::de::Error,
        {
            Ok(v)
        }

        fn visit_i64<E>(self, v: i64) -> Result<u64, E>
        where
            E: serde::de::Error,
        {
            u64::try_from(v).map_err(|_| E::custom(format!("integer out of range: {v}")))
        }

        fn visit_f64<E>(self, v: f64) -> Result<u64, E>
        where
            E: serde::de::Error,
        {
            if v.fract() == 0.0 && (0.0..=u64::MAX as f64).contains(&v) {
                Ok(v as u64)
            } else {
                Err(E::custom(format!("expected a non-negative integer, got {v}")))
            }
        }
    }

    deserializer.deserialize_any(WireU64)
}

/// The animation description: a timeline length in frames plus an ordered
/// set of independent tracks.
///
/// Values of this type may come straight off the wire and carry no
/// guarantees; pass them through [`crate::validate::validate_motion`] (or
/// obtain an [`crate::gate::AcceptedMotion`] from the gate) before trusting
/// them.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MotionIr {
    #[serde(deserialize_with = "wire_u64")]
    pub timeline: u64,
    pub tracks: Vec<Track>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Track {
    Camera {
        keyframes: Vec<CameraKeyframe>,
    },
    Element {
        #[serde(rename = "targetId")]
        target_id: String,
        keyframes: Vec<ElementKeyframe>,
    },
}

impl Track {
    pub fn keyframe_frames(&self) -> impl Iterator<Item = u64> + '_ {
        let frames: Vec<u64> = match self {
            Self::Camera { keyframes } => keyframes.iter().map(|k| k.frame).collect(),
            Self::Element { keyframes, .. } => keyframes.iter().map(|k| k.frame).collect(),
        };
        frames.into_iter()
    }
}

/// A partial record: unset fields carry forward from the nearest defined
/// neighbor during evaluation, they do not reset the property.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraKeyframe {
    #[serde(deserialize_with = "wire_u64")]
    pub frame: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<Ease>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementKeyframe {
    #[serde(deserialize_with = "wire_u64")]
    pub frame: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<Ease>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(
        rename = "textContent",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub text_content: Option<String>,
}
