//! # Effect Compositor
//!
//! Merges named, time-windowed effects into one channel per
//! (layer, property).
//!
//! ## Rules
//! - Windows are half-open `[start, end)` and must not overlap on the same
//!   layer and property; overlap is rejected, never blended.
//! - Each window runs its motion over the window span, shifted to global frames.
//! - Across a gap the value freezes at the end of the earlier window (hold key).
//! - Adjacent windows share a frame; the later window owns it and the earlier
//!   one holds its last visible value up to it.
//! - Properties no window mentions get no channel.

use crate::channel::{Keyframe, PropertyChannel, PropertyKind};
use crate::easing::Easing;
use crate::error::MotionError;
use crate::templates::{target_layers, Motion, MotionContext};
use crate::tree::{LayerId, LayerTree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A named effect as supplied in a request.
///
/// ```json
/// { "effect": "rotation", "degrees": 180, "start": 30, "end": 90, "layers": ["logo"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEffect {
    #[serde(flatten)]
    pub motion: Motion,
    pub start: u32,
    pub end: u32,
    /// Target layer ids. Defaults to the request scope, then to every
    /// top-level layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<LayerId>>,
}

impl CustomEffect {
    pub fn new(motion: Motion, start: u32, end: u32) -> Self {
        Self {
            motion,
            start,
            end,
            layers: None,
        }
    }

    pub fn on_layers(mut self, layers: Vec<LayerId>) -> Self {
        self.layers = Some(layers);
        self
    }
}

/// One effect bound to one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectWindow {
    pub name: String,
    pub layer: LayerId,
    pub motion: Motion,
    pub start: u32,
    pub end: u32,
}

impl EffectWindow {
    pub fn property(&self) -> PropertyKind {
        self.motion.property()
    }

    pub fn span(&self) -> u32 {
        self.end - self.start
    }
}

/// Expands named effects into per-layer windows.
pub fn expand_effects(
    tree: &LayerTree,
    effects: &BTreeMap<String, CustomEffect>,
    scope: Option<&[LayerId]>,
) -> Result<Vec<EffectWindow>, MotionError> {
    let mut windows = Vec::new();
    for (name, effect) in effects {
        if effect.end <= effect.start {
            return Err(MotionError::InvalidEffectWindow {
                name: name.clone(),
                start: effect.start,
                end: effect.end,
            });
        }
        let targets = target_layers(
            tree,
            effect.layers.as_deref().or(scope),
            effect.motion.property(),
        )?;
        windows.extend(targets.into_iter().map(|layer| EffectWindow {
            name: name.clone(),
            layer: layer.id.clone(),
            motion: effect.motion,
            start: effect.start,
            end: effect.end,
        }));
    }
    Ok(windows)
}

/// Document duration for a composite request: the latest window end, or an
/// override that is at least that long.
pub fn composite_duration(
    windows: &[EffectWindow],
    duration_override: Option<u32>,
) -> Result<u32, MotionError> {
    let required = windows.iter().map(|w| w.end).max().unwrap_or(0);
    match duration_override {
        Some(requested) if requested < required => {
            Err(MotionError::DurationTooShort { requested, required })
        }
        Some(requested) => Ok(requested),
        None => Ok(required),
    }
}

/// Composes windows into channels, one per (layer, property) they touch.
pub fn compose(
    tree: &LayerTree,
    windows: &[EffectWindow],
    ctx: &MotionContext,
) -> Result<Vec<PropertyChannel>, MotionError> {
    let mut groups: BTreeMap<(&str, PropertyKind), Vec<&EffectWindow>> = BTreeMap::new();
    for window in windows {
        if window.end <= window.start {
            return Err(MotionError::InvalidEffectWindow {
                name: window.name.clone(),
                start: window.start,
                end: window.end,
            });
        }
        groups
            .entry((window.layer.as_str(), window.property()))
            .or_default()
            .push(window);
    }

    let mut channels = Vec::with_capacity(groups.len());
    for ((layer_id, property), mut group) in groups {
        let layer = tree.find(layer_id).ok_or_else(|| MotionError::UnknownLayer {
            layer: layer_id.to_string(),
        })?;

        group.sort_by_key(|w| (w.start, w.end));
        for pair in group.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(MotionError::ConflictingEffectWindow {
                    layer: layer_id.to_string(),
                    property,
                    first: pair[0].name.clone(),
                    second: pair[1].name.clone(),
                });
            }
        }

        let mut keys: Vec<Keyframe> = Vec::new();
        let mut previous: Option<(&EffectWindow, PropertyChannel)> = None;
        for window in group {
            let fragment = window
                .motion
                .generate(layer, window.span(), ctx)?
                .shifted(window.start);

            if let Some((prev_window, prev_fragment)) = &previous {
                join_fragments(&mut keys, prev_window, prev_fragment, window.start);
            }
            keys.extend_from_slice(fragment.keyframes());
            previous = Some((window, fragment));
        }

        debug!(layer = layer_id, %property, keys = keys.len(), "composed channel");
        channels.push(PropertyChannel::new(layer_id, property, keys)?);
    }

    Ok(channels)
}

// Prepares `keys` (ending with `prev_fragment`) for a fragment starting at
// `next_start`, so no segment interpolates across the boundary.
fn join_fragments(
    keys: &mut Vec<Keyframe>,
    prev_window: &EffectWindow,
    prev_fragment: &PropertyChannel,
    next_start: u32,
) {
    let end = prev_window.end;
    let Some(last_frame) = keys.last().map(|k| k.frame) else {
        return;
    };

    if next_start == end && last_frame == end {
        // Windows are half-open: the later window owns the shared frame, the
        // earlier one holds its last visible value.
        keys.pop();
        let visible = end - 1;
        match keys.last_mut() {
            Some(key) if key.frame == visible => key.easing = Easing::Hold,
            _ => keys.push(Keyframe::new(
                visible,
                prev_fragment.sample(visible as f32),
                Easing::Hold,
            )),
        }
    } else if next_start == end || last_frame == end {
        if let Some(key) = keys.last_mut() {
            key.easing = Easing::Hold;
        }
    } else {
        keys.push(Keyframe::new(
            end,
            prev_fragment.sample(end as f32),
            Easing::Hold,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(name: &str, start: u32, end: u32) -> EffectWindow {
        EffectWindow {
            name: name.to_string(),
            layer: "root".to_string(),
            motion: Motion::FadeIn,
            start,
            end,
        }
    }

    #[test]
    fn duration_defaults_to_latest_end() {
        let windows = vec![window("a", 0, 30), window("b", 10, 90), window("c", 100, 120)];
        assert_eq!(composite_duration(&windows, None), Ok(120));
        assert_eq!(composite_duration(&windows, Some(150)), Ok(150));
        assert_eq!(
            composite_duration(&windows, Some(100)),
            Err(MotionError::DurationTooShort {
                requested: 100,
                required: 120
            })
        );
    }

    #[test]
    fn custom_effect_parses_tagged_motion() {
        let effect: CustomEffect = serde_json::from_value(serde_json::json!({
            "effect": "rotate",
            "degrees": 90,
            "start": 10,
            "end": 40
        }))
        .unwrap();
        assert_eq!(effect.motion, Motion::Rotation { degrees: 90.0 });
        assert_eq!((effect.start, effect.end), (10, 40));
        assert!(effect.layers.is_none());

        let pulse: CustomEffect = serde_json::from_value(serde_json::json!({
            "effect": "bounce",
            "start": 0,
            "end": 30,
            "layers": ["a"]
        }))
        .unwrap();
        assert_eq!(pulse.motion, Motion::ScalePulse);
        assert_eq!(pulse.layers, Some(vec!["a".to_string()]));
    }
}
