//! Keyframe synthesis for vector artwork.
//!
//! Takes an imported [`LayerTree`] plus an [`AnimationRequest`] and produces a
//! Lottie document (`lottie_data::model::LottieJson`) whose transform
//! properties carry time-keyed channels.
//!
//! ```text
//! LayerTree + AnimationRequest
//!     -> templates (one motion over the whole document)
//!      | compositor (named effects in frame windows)
//!     -> PropertyChannel per (layer, property)
//!     -> assembler -> LottieJson
//! ```

pub mod assembler;
pub mod channel;
pub mod compositor;
pub mod easing;
pub mod error;
pub mod request;
pub mod templates;
pub mod tree;

pub use assembler::{assemble, DocumentTiming, LOTTIE_VERSION};
pub use channel::{ChannelValue, Keyframe, PropertyChannel, PropertyKind};
pub use compositor::{compose, composite_duration, expand_effects, CustomEffect, EffectWindow};
pub use easing::{BezierHandles, Easing, EasingIntent};
pub use error::MotionError;
pub use request::{plan_channels, synthesize, AnimationRequest, MotionDefaults};
pub use templates::{apply_template, AnimationType, Motion, MotionContext};
pub use tree::{LayerId, LayerKind, LayerTransform, LayerTree, SourceLayer, VectorImport};

pub use lottie_data;
