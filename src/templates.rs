//! # Template Library
//!
//! Built-in motions and the named templates built on them.
//!
//! ## Responsibilities
//! - **Motion profiles**: keyframe fractions, values and easing for each motion.
//! - **Frame placement**: maps fractions onto a span of whole frames.
//! - **Templates**: apply one motion over the whole document to every
//!   top-level layer (or a requested subset).
//!
//! | Motion | Property | Fractions | Values |
//! |---|---|---|---|
//! | fade_in | opacity | 0 → 0.5 | 0 → 100, linear |
//! | scale_up | scale | 0 → 0.5 | 50% → 100% of rest, ease-out |
//! | rotation | rotation | 0 → 1 | rest → rest + degrees, linear |
//! | scale_pulse | scale | 0 → 0.33 → 0.66 → 1 | 100/130/90/100% of rest, ease-in-out |
//! | bottom_to_center | position | 0 → 0.5 | rest + (0, canvas height) → rest, ease-out |

use crate::channel::{ChannelValue, Keyframe, PropertyChannel, PropertyKind};
use crate::easing::{Easing, EasingIntent, OVERSHOOT_PROFILE};
use crate::error::MotionError;
use crate::tree::{LayerId, LayerTree, SourceLayer};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Canvas facts a motion may depend on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionContext {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl MotionContext {
    pub fn for_tree(tree: &LayerTree, fps: u32) -> Self {
        Self {
            width: tree.width,
            height: tree.height,
            fps,
        }
    }
}

fn full_turn() -> f32 {
    360.0
}

/// A single-property animation generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Motion {
    FadeIn,
    ScaleUp,
    #[serde(alias = "rotate")]
    Rotation {
        #[serde(default = "full_turn")]
        degrees: f32,
    },
    #[serde(alias = "bounce")]
    ScalePulse,
    BottomToCenter,
}

impl Motion {
    pub fn property(&self) -> PropertyKind {
        match self {
            Motion::FadeIn => PropertyKind::Opacity,
            Motion::ScaleUp | Motion::ScalePulse => PropertyKind::Scale,
            Motion::Rotation { .. } => PropertyKind::Rotation,
            Motion::BottomToCenter => PropertyKind::Position,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Motion::FadeIn => "fade_in",
            Motion::ScaleUp => "scale_up",
            Motion::Rotation { .. } => "rotation",
            Motion::ScalePulse => "scale_pulse",
            Motion::BottomToCenter => "bottom_to_center",
        }
    }

    fn intent(&self) -> EasingIntent {
        match self {
            Motion::FadeIn | Motion::Rotation { .. } => EasingIntent::Linear,
            Motion::ScaleUp | Motion::BottomToCenter => EasingIntent::EaseOut,
            Motion::ScalePulse => EasingIntent::EaseInOut,
        }
    }

    fn profile(&self, layer: &SourceLayer, ctx: &MotionContext) -> Vec<(f32, ChannelValue)> {
        let rest = &layer.transform;
        match self {
            Motion::FadeIn => vec![
                (0.0, ChannelValue::Scalar(0.0)),
                (0.5, ChannelValue::Scalar(100.0)),
            ],
            Motion::ScaleUp => vec![
                (0.0, ChannelValue::Vector(rest.scale * 0.5)),
                (0.5, ChannelValue::Vector(rest.scale)),
            ],
            Motion::Rotation { degrees } => vec![
                (0.0, ChannelValue::Scalar(rest.rotation)),
                (1.0, ChannelValue::Scalar(rest.rotation + *degrees)),
            ],
            Motion::ScalePulse => OVERSHOOT_PROFILE
                .iter()
                .map(|(fraction, percent)| {
                    (*fraction, ChannelValue::Vector(rest.scale * (*percent / 100.0)))
                })
                .collect(),
            Motion::BottomToCenter => {
                let offset = Vec2::new(0.0, ctx.height as f32);
                vec![
                    (0.0, ChannelValue::Vector(rest.position + offset)),
                    (0.5, ChannelValue::Vector(rest.position)),
                ]
            }
        }
    }

    /// Channel for `layer` over local frames `[0, span]`.
    pub fn generate(
        &self,
        layer: &SourceLayer,
        span: u32,
        ctx: &MotionContext,
    ) -> Result<PropertyChannel, MotionError> {
        let keys = place_keys(&self.profile(layer, ctx), span, self.intent().easing());
        debug!(
            layer = %layer.id,
            motion = self.name(),
            span,
            keys = keys.len(),
            "generated channel"
        );
        PropertyChannel::new(layer.id.clone(), self.property(), keys)
    }
}

/// Whole frame for a profile fraction, rounded down: half of 61 frames is 30.
fn frame_at(fraction: f32, span: u32) -> u32 {
    ((fraction * span as f32).floor() as u32).min(span)
}

/// Places profile keys on whole frames.
///
/// Keys that land on the same frame collapse: the earliest wins, except on the
/// final frame where the final key wins, so the motion always ends at rest.
fn place_keys(profile: &[(f32, ChannelValue)], span: u32, easing: Easing) -> Vec<Keyframe> {
    let final_frame = profile
        .last()
        .map(|(fraction, _)| frame_at(*fraction, span))
        .unwrap_or(0);

    let mut keys: Vec<Keyframe> = Vec::with_capacity(profile.len());
    for (fraction, value) in profile {
        let frame = frame_at(*fraction, span);
        match keys.last_mut() {
            Some(prev) if prev.frame >= frame => {
                if frame == final_frame {
                    prev.value = *value;
                }
            }
            _ => keys.push(Keyframe::new(frame, *value, easing)),
        }
    }
    keys
}

/// Requested animation: a built-in template, or `complex` for custom effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum AnimationType {
    FadeIn,
    ScaleUp,
    Rotate,
    Bounce,
    BottomToCenter,
    Complex,
}

impl AnimationType {
    pub const ALL: [AnimationType; 6] = [
        AnimationType::FadeIn,
        AnimationType::ScaleUp,
        AnimationType::Rotate,
        AnimationType::Bounce,
        AnimationType::BottomToCenter,
        AnimationType::Complex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnimationType::FadeIn => "fade_in",
            AnimationType::ScaleUp => "scale_up",
            AnimationType::Rotate => "rotate",
            AnimationType::Bounce => "bounce",
            AnimationType::BottomToCenter => "bottom_to_center",
            AnimationType::Complex => "complex",
        }
    }

    /// The motion a template applies, `None` for `complex`.
    pub fn motion(self) -> Option<Motion> {
        match self {
            AnimationType::FadeIn => Some(Motion::FadeIn),
            AnimationType::ScaleUp => Some(Motion::ScaleUp),
            AnimationType::Rotate => Some(Motion::Rotation {
                degrees: full_turn(),
            }),
            AnimationType::Bounce => Some(Motion::ScalePulse),
            AnimationType::BottomToCenter => Some(Motion::BottomToCenter),
            AnimationType::Complex => None,
        }
    }

    pub fn available() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for AnimationType {
    fn default() -> Self {
        AnimationType::FadeIn
    }
}

impl fmt::Display for AnimationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimationType {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| MotionError::UnknownAnimationType {
                name: s.to_string(),
                available: Self::available(),
            })
    }
}

impl TryFrom<String> for AnimationType {
    type Error = MotionError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

/// Resolves the layers a motion on `property` targets: `scope` when given,
/// otherwise every top-level layer.
///
/// Transforms reach children through Lottie parenting, opacity does not: an
/// opacity motion aimed at a group lands on every shape layer below it.
pub(crate) fn target_layers<'a>(
    tree: &'a LayerTree,
    scope: Option<&[LayerId]>,
    property: PropertyKind,
) -> Result<Vec<&'a SourceLayer>, MotionError> {
    let roots: Vec<&SourceLayer> = match scope {
        None => tree.layers.iter().collect(),
        Some(ids) => ids
            .iter()
            .map(|id| {
                tree.find(id)
                    .ok_or_else(|| MotionError::UnknownLayer { layer: id.clone() })
            })
            .collect::<Result<_, _>>()?,
    };

    let mut seen = HashSet::new();
    let mut layers = Vec::with_capacity(roots.len());
    for root in roots {
        let expanded = if property == PropertyKind::Opacity {
            root.drawn_layers()
        } else {
            vec![root]
        };
        for layer in expanded {
            if seen.insert(layer.id.as_str()) {
                layers.push(layer);
            }
        }
    }
    Ok(layers)
}

/// Applies `motion` over `[0, duration]` to the targeted layers.
pub fn apply_template(
    tree: &LayerTree,
    motion: Motion,
    duration: u32,
    ctx: &MotionContext,
    scope: Option<&[LayerId]>,
) -> Result<Vec<PropertyChannel>, MotionError> {
    target_layers(tree, scope, motion.property())?
        .into_iter()
        .map(|layer| motion.generate(layer, duration, ctx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(keys: &[Keyframe]) -> Vec<u32> {
        keys.iter().map(|k| k.frame).collect()
    }

    #[test]
    fn place_keys_spreads_over_span() {
        let profile: Vec<(f32, ChannelValue)> = OVERSHOOT_PROFILE
            .iter()
            .map(|(f, v)| (*f, ChannelValue::Scalar(*v)))
            .collect();
        let keys = place_keys(&profile, 60, Easing::Linear);
        assert_eq!(frames(&keys), vec![0, 19, 39, 60]);
    }

    #[test]
    fn frames_round_down_on_odd_spans() {
        assert_eq!(frame_at(0.5, 61), 30);
        assert_eq!(frame_at(0.5, 7), 3);
        assert_eq!(frame_at(1.0, 61), 61);
        assert_eq!(frame_at(0.66, 3), 1);
    }

    #[test]
    fn place_keys_collapses_on_tiny_span() {
        let profile: Vec<(f32, ChannelValue)> = OVERSHOOT_PROFILE
            .iter()
            .map(|(f, v)| (*f, ChannelValue::Scalar(*v)))
            .collect();
        let keys = place_keys(&profile, 1, Easing::Linear);
        assert_eq!(frames(&keys), vec![0, 1]);
        assert_eq!(keys[0].value, ChannelValue::Scalar(100.0));
        assert_eq!(keys[1].value, ChannelValue::Scalar(100.0));
    }

    #[test]
    fn animation_type_parses_known_names() {
        for t in AnimationType::ALL {
            assert_eq!(t.as_str().parse::<AnimationType>(), Ok(t));
        }
        assert!(matches!(
            "spin".parse::<AnimationType>(),
            Err(MotionError::UnknownAnimationType { .. })
        ));
    }

    #[test]
    fn animation_type_deserializes_through_from_str() {
        let bounce: AnimationType = serde_json::from_str("\"bounce\"").unwrap();
        assert_eq!(bounce, AnimationType::Bounce);
        assert_eq!(serde_json::to_string(&bounce).unwrap(), "\"bounce\"");

        let err = serde_json::from_str::<AnimationType>("\"spin\"").unwrap_err();
        assert!(err
            .to_string()
            .starts_with("unknown animation type 'spin' (available: fade_in, scale_up"));
    }

    #[test]
    fn only_complex_has_no_motion() {
        for t in AnimationType::ALL {
            assert_eq!(t.motion().is_none(), t == AnimationType::Complex);
        }
    }
}
