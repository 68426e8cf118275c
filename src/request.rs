//! Animation requests and the top-level synthesis entry point.

use crate::assembler::{assemble, DocumentTiming};
use crate::channel::PropertyChannel;
use crate::compositor::{composite_duration, compose, expand_effects, CustomEffect};
use crate::error::MotionError;
use crate::templates::{apply_template, AnimationType, MotionContext};
use crate::tree::{LayerId, LayerTree};
use lottie_data::model::LottieJson;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const DEFAULT_FPS: u32 = 30;
pub const DEFAULT_DURATION: u32 = 60;
pub const DEFAULT_GENERATOR: &str = "SVG to Lottie Converter";

/// Values used when a request leaves a field out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionDefaults {
    pub fps: u32,
    /// Frames.
    pub duration: u32,
    /// Written to `meta.g`.
    pub generator: String,
}

impl Default for MotionDefaults {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            duration: DEFAULT_DURATION,
            generator: DEFAULT_GENERATOR.to_string(),
        }
    }
}

/// What to animate and how.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationRequest {
    #[serde(default)]
    pub animation_type: AnimationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    /// Frames. For `complex` an override of the latest effect end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// Named effects, `complex` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_effects: Option<BTreeMap<String, CustomEffect>>,
    /// Restricts targeting to these layer ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<LayerId>>,
}

impl AnimationRequest {
    pub fn new(animation_type: AnimationType) -> Self {
        Self {
            animation_type,
            ..Self::default()
        }
    }

    pub fn complex(effects: impl IntoIterator<Item = (String, CustomEffect)>) -> Self {
        Self {
            animation_type: AnimationType::Complex,
            custom_effects: Some(effects.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_layers(mut self, layers: Vec<LayerId>) -> Self {
        self.layers = Some(layers);
        self
    }
}

/// Produces the channels a request asks for, with the document duration
/// they were built against.
pub fn plan_channels(
    tree: &LayerTree,
    request: &AnimationRequest,
    defaults: &MotionDefaults,
) -> Result<(Vec<PropertyChannel>, u32), MotionError> {
    let fps = positive(request.fps.unwrap_or(defaults.fps), "fps")?;
    if let Some(duration) = request.duration {
        positive(duration, "duration")?;
    }
    let ctx = MotionContext::for_tree(tree, fps);
    let scope = request.layers.as_deref();

    match request.animation_type.motion() {
        Some(motion) => {
            if request.custom_effects.as_ref().is_some_and(|e| !e.is_empty()) {
                warn!(
                    animation_type = %request.animation_type,
                    "custom_effects are only used by complex animations, ignoring"
                );
            }
            let duration = request.duration.unwrap_or(defaults.duration);
            let channels = apply_template(tree, motion, duration, &ctx, scope)?;
            Ok((channels, duration))
        }
        None => {
            let effects = request
                .custom_effects
                .as_ref()
                .filter(|e| !e.is_empty())
                .ok_or(MotionError::MissingCustomEffects)?;
            let windows = expand_effects(tree, effects, scope)?;
            let duration = composite_duration(&windows, request.duration)?;
            debug!(effects = effects.len(), windows = windows.len(), duration, "expanded effects");
            let channels = compose(tree, &windows, &ctx)?;
            Ok((channels, duration))
        }
    }
}

/// Synthesizes an animated document for `tree`.
pub fn synthesize(
    tree: &LayerTree,
    request: &AnimationRequest,
    defaults: &MotionDefaults,
) -> Result<LottieJson, MotionError> {
    let (channels, duration) = plan_channels(tree, request, defaults)?;
    let fps = request.fps.unwrap_or(defaults.fps);

    let mut doc = assemble(
        tree,
        &channels,
        DocumentTiming::new(fps, duration),
        &defaults.generator,
    )?;
    doc.nm = Some(request.animation_type.to_string());
    Ok(doc)
}

fn positive(value: u32, field: &'static str) -> Result<u32, MotionError> {
    if value == 0 {
        return Err(MotionError::InvalidRequest { field });
    }
    Ok(value)
}
