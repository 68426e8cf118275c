//! # Property Channel Model
//!
//! A `PropertyChannel` is the keyframe track of one animatable property of one
//! layer. Construction validates ordering and value arity; once built a
//! channel is immutable.

use crate::easing::Easing;
use crate::error::MotionError;
use crate::tree::LayerId;
use glam::Vec2;
use std::fmt;

/// Animatable transform property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKind {
    Opacity,
    Scale,
    Position,
    Rotation,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 4] = [
        PropertyKind::Opacity,
        PropertyKind::Scale,
        PropertyKind::Position,
        PropertyKind::Rotation,
    ];

    /// Number of components a value of this property carries.
    pub fn arity(self) -> usize {
        match self {
            PropertyKind::Opacity | PropertyKind::Rotation => 1,
            PropertyKind::Scale | PropertyKind::Position => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyKind::Opacity => "opacity",
            PropertyKind::Scale => "scale",
            PropertyKind::Position => "position",
            PropertyKind::Rotation => "rotation",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelValue {
    Scalar(f32),
    Vector(Vec2),
}

impl ChannelValue {
    pub fn arity(&self) -> usize {
        match self {
            ChannelValue::Scalar(_) => 1,
            ChannelValue::Vector(_) => 2,
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            ChannelValue::Scalar(v) => Some(*v),
            ChannelValue::Vector(_) => None,
        }
    }

    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            ChannelValue::Vector(v) => Some(*v),
            ChannelValue::Scalar(_) => None,
        }
    }

    /// Component-wise blend. Mismatched arities keep `self`.
    pub fn lerp(&self, other: &ChannelValue, t: f32) -> ChannelValue {
        match (self, other) {
            (ChannelValue::Scalar(a), ChannelValue::Scalar(b)) => {
                ChannelValue::Scalar(a + (b - a) * t)
            }
            (ChannelValue::Vector(a), ChannelValue::Vector(b)) => {
                ChannelValue::Vector(a.lerp(*b, t))
            }
            _ => *self,
        }
    }
}

impl From<f32> for ChannelValue {
    fn from(v: f32) -> Self {
        ChannelValue::Scalar(v)
    }
}

impl From<Vec2> for ChannelValue {
    fn from(v: Vec2) -> Self {
        ChannelValue::Vector(v)
    }
}

/// One point of a channel. `easing` governs the segment to the next keyframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub frame: u32,
    pub value: ChannelValue,
    pub easing: Easing,
}

impl Keyframe {
    pub fn new(frame: u32, value: impl Into<ChannelValue>, easing: impl Into<Easing>) -> Self {
        Self {
            frame,
            value: value.into(),
            easing: easing.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChannel {
    layer: LayerId,
    kind: PropertyKind,
    keyframes: Vec<Keyframe>,
}

impl PropertyChannel {
    /// Builds a validated channel.
    ///
    /// Fails with `ValueShapeMismatch` when a value's arity does not match
    /// `kind`, and with `InvalidKeyframeOrder` unless frames strictly increase.
    pub fn new(
        layer: impl Into<LayerId>,
        kind: PropertyKind,
        keyframes: Vec<Keyframe>,
    ) -> Result<Self, MotionError> {
        let layer = layer.into();

        if keyframes.is_empty() {
            return Err(MotionError::EmptyChannel {
                layer,
                property: kind,
            });
        }

        for key in &keyframes {
            if key.value.arity() != kind.arity() {
                return Err(MotionError::ValueShapeMismatch {
                    layer,
                    property: kind,
                    frame: key.frame,
                    expected: kind.arity(),
                    found: key.value.arity(),
                });
            }
        }

        for pair in keyframes.windows(2) {
            if pair[1].frame <= pair[0].frame {
                return Err(MotionError::InvalidKeyframeOrder {
                    layer,
                    property: kind,
                    previous: pair[0].frame,
                    next: pair[1].frame,
                });
            }
        }

        Ok(Self {
            layer,
            kind,
            keyframes,
        })
    }

    /// Builds a channel from `(frame, value)` pairs sharing one easing.
    pub fn from_pairs<V>(
        layer: impl Into<LayerId>,
        kind: PropertyKind,
        pairs: impl IntoIterator<Item = (u32, V)>,
        easing: Easing,
    ) -> Result<Self, MotionError>
    where
        V: Into<ChannelValue>,
    {
        let keyframes = pairs
            .into_iter()
            .map(|(frame, value)| Keyframe::new(frame, value, easing))
            .collect();
        Self::new(layer, kind, keyframes)
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn first(&self) -> &Keyframe {
        // Non-empty by construction.
        &self.keyframes[0]
    }

    pub fn last(&self) -> &Keyframe {
        &self.keyframes[self.keyframes.len() - 1]
    }

    /// `(first frame, last frame)`.
    pub fn span(&self) -> (u32, u32) {
        (self.first().frame, self.last().frame)
    }

    /// Value at `frame`, clamped to the first/last keyframe outside the span.
    pub fn sample(&self, frame: f32) -> ChannelValue {
        let first = self.first();
        if frame <= first.frame as f32 {
            return first.value;
        }
        let last = self.last();
        if frame >= last.frame as f32 {
            return last.value;
        }

        // `frame` is strictly inside the span, so some segment contains it.
        let idx = self
            .keyframes
            .windows(2)
            .position(|pair| frame < pair[1].frame as f32)
            .unwrap_or(self.keyframes.len() - 2);
        let from = &self.keyframes[idx];
        let to = &self.keyframes[idx + 1];

        if from.easing.is_hold() {
            return from.value;
        }

        let t = (frame - from.frame as f32) / (to.frame - from.frame) as f32;
        from.value.lerp(&to.value, from.easing.progress(t))
    }

    /// Same channel with every frame moved `offset` frames later.
    pub fn shifted(&self, offset: u32) -> Self {
        Self {
            layer: self.layer.clone(),
            kind: self.kind,
            keyframes: self
                .keyframes
                .iter()
                .map(|key| Keyframe {
                    frame: key.frame + offset,
                    ..*key
                })
                .collect(),
        }
    }

    pub fn into_keyframes(self) -> Vec<Keyframe> {
        self.keyframes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opacity(keys: Vec<Keyframe>) -> PropertyChannel {
        PropertyChannel::new("mark", PropertyKind::Opacity, keys).unwrap()
    }

    #[test]
    fn sample_clamps_outside_the_span() {
        let channel = PropertyChannel::from_pairs(
            "mark",
            PropertyKind::Opacity,
            [(10, 20.0_f32), (30, 80.0)],
            Easing::Linear,
        )
        .unwrap();
        assert_eq!(channel.sample(0.0), ChannelValue::Scalar(20.0));
        assert_eq!(channel.sample(45.0), ChannelValue::Scalar(80.0));
        assert_eq!(channel.sample(20.0), ChannelValue::Scalar(50.0));
    }

    #[test]
    fn sample_respects_segment_easing() {
        let channel = opacity(vec![
            Keyframe::new(0, 0.0_f32, Easing::Hold),
            Keyframe::new(10, 100.0_f32, Easing::Linear),
            Keyframe::new(20, 0.0_f32, Easing::Linear),
        ]);
        assert_eq!(channel.sample(9.5), ChannelValue::Scalar(0.0));
        assert_eq!(channel.sample(10.0), ChannelValue::Scalar(100.0));
        assert_eq!(channel.sample(15.0), ChannelValue::Scalar(50.0));

        let scale = PropertyChannel::from_pairs(
            "mark",
            PropertyKind::Scale,
            [(0, Vec2::splat(50.0)), (10, Vec2::splat(100.0))],
            Easing::Linear,
        )
        .unwrap();
        assert_eq!(scale.sample(5.0), ChannelValue::Vector(Vec2::splat(75.0)));
    }

    #[test]
    fn shifted_moves_every_key() {
        let channel = opacity(vec![
            Keyframe::new(0, 0.0_f32, Easing::Linear),
            Keyframe::new(15, 100.0_f32, Easing::Linear),
        ]);
        let moved = channel.shifted(40);

        assert_eq!(moved.layer(), "mark");
        assert_eq!(moved.span(), (40, 55));
        assert_eq!(moved.sample(47.5), channel.sample(7.5));
        assert_eq!(channel.span(), (0, 15));
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let err = PropertyChannel::new(
            "mark",
            PropertyKind::Position,
            vec![Keyframe::new(0, 1.0_f32, Easing::Linear)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MotionError::ValueShapeMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }
}
