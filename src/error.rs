use crate::channel::PropertyKind;
use crate::tree::LayerId;

/// Errors surfaced by the synthesis engine.
///
/// Every variant carries the offending identifiers so a transport layer can
/// map it to a response without parsing the message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum MotionError {
    #[error("unknown animation type '{name}' (available: {available})")]
    UnknownAnimationType { name: String, available: String },

    #[error("{field} must be a positive integer")]
    InvalidRequest { field: &'static str },

    #[error("animation_type 'complex' requires at least one custom effect")]
    MissingCustomEffects,

    #[error("layer '{layer}' does not exist in the imported tree")]
    UnknownLayer { layer: LayerId },

    #[error("effect '{name}' has an empty window: end {end} must be greater than start {start}")]
    InvalidEffectWindow { name: String, start: u32, end: u32 },

    #[error(
        "effects '{first}' and '{second}' both animate {property} on layer '{layer}' over overlapping frames"
    )]
    ConflictingEffectWindow {
        layer: LayerId,
        property: PropertyKind,
        first: String,
        second: String,
    },

    #[error("duration {requested} is shorter than the last effect, which ends at frame {required}")]
    DurationTooShort { requested: u32, required: u32 },

    #[error("canvas has no area ({width}x{height})")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("{property} keyframes on layer '{layer}' are out of order: frame {next} follows frame {previous}")]
    InvalidKeyframeOrder {
        layer: LayerId,
        property: PropertyKind,
        previous: u32,
        next: u32,
    },

    #[error("{property} on layer '{layer}' expects {expected} component(s) but frame {frame} has {found}")]
    ValueShapeMismatch {
        layer: LayerId,
        property: PropertyKind,
        frame: u32,
        expected: usize,
        found: usize,
    },

    #[error("{property} channel on layer '{layer}' has no keyframes")]
    EmptyChannel { layer: LayerId, property: PropertyKind },

    #[error("{property} channel targets layer '{layer}' which is not in the document")]
    OrphanedChannel { layer: LayerId, property: PropertyKind },

    #[error("layer '{layer}' has more than one {property} channel")]
    DuplicateChannel { layer: LayerId, property: PropertyKind },

    #[error(
        "{property} keyframe at frame {frame} on layer '{layer}' lies outside [{in_point}, {out_point}]"
    )]
    KeyframeOutOfRange {
        layer: LayerId,
        property: PropertyKind,
        frame: u32,
        in_point: u32,
        out_point: u32,
    },
}

impl MotionError {
    /// True for invariant violations raised by the engine itself rather than
    /// by a malformed request.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            MotionError::InvalidKeyframeOrder { .. }
                | MotionError::ValueShapeMismatch { .. }
                | MotionError::EmptyChannel { .. }
                | MotionError::OrphanedChannel { .. }
                | MotionError::DuplicateChannel { .. }
                | MotionError::KeyframeOutOfRange { .. }
        )
    }

    /// Stable snake_case identifier of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            MotionError::UnknownAnimationType { .. } => "unknown_animation_type",
            MotionError::InvalidRequest { .. } => "invalid_request",
            MotionError::MissingCustomEffects => "missing_custom_effects",
            MotionError::UnknownLayer { .. } => "unknown_layer",
            MotionError::InvalidEffectWindow { .. } => "invalid_effect_window",
            MotionError::ConflictingEffectWindow { .. } => "conflicting_effect_window",
            MotionError::DurationTooShort { .. } => "duration_too_short",
            MotionError::EmptyCanvas { .. } => "empty_canvas",
            MotionError::InvalidKeyframeOrder { .. } => "invalid_keyframe_order",
            MotionError::ValueShapeMismatch { .. } => "value_shape_mismatch",
            MotionError::EmptyChannel { .. } => "empty_channel",
            MotionError::OrphanedChannel { .. } => "orphaned_channel",
            MotionError::DuplicateChannel { .. } => "duplicate_channel",
            MotionError::KeyframeOutOfRange { .. } => "keyframe_out_of_range",
        }
    }
}
