//! # Easing & Interpolation Policy
//!
//! Maps an animation intent to the concrete interpolation handles written
//! into each keyframe.
//!
//! ## Modes
//! - **Linear**: identity tangents, used for fades and slides.
//! - **Bezier**: asymmetric out/in control points for scale and position.
//! - **Hold**: the value snaps at the next keyframe (Lottie `h: 1`).
//!
//! Bounce overshoot is a value profile, not a curve: see [`OVERSHOOT_PROFILE`].

use keyframe::mint::Vector2;
use keyframe::{functions, EasingFunction};
use lottie_data::model::BezierTangent;

/// Control points of a cubic-bezier timing curve running from (0,0) to (1,1).
/// `out` is the first control point (Lottie `o`), `in` the second (Lottie `i`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierHandles {
    pub out_x: f32,
    pub out_y: f32,
    pub in_x: f32,
    pub in_y: f32,
}

impl BezierHandles {
    pub const fn new(out_x: f32, out_y: f32, in_x: f32, in_y: f32) -> Self {
        Self {
            out_x,
            out_y,
            in_x,
            in_y,
        }
    }
}

pub const LINEAR_HANDLES: BezierHandles = BezierHandles::new(0.0, 0.0, 1.0, 1.0);
pub const EASE_IN_HANDLES: BezierHandles = BezierHandles::new(0.42, 0.0, 1.0, 1.0);
pub const EASE_OUT_HANDLES: BezierHandles = BezierHandles::new(0.0, 0.0, 0.58, 1.0);
pub const EASE_IN_OUT_HANDLES: BezierHandles = BezierHandles::new(0.42, 0.0, 0.58, 1.0);

/// Single damped-spring cycle used by the bounce template:
/// (fraction of the span, percent of the resting scale).
pub const OVERSHOOT_PROFILE: [(f32, f32); 4] = [(0.0, 100.0), (0.33, 130.0), (0.66, 90.0), (1.0, 100.0)];

/// Interpolation of the segment leaving a keyframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    Bezier(BezierHandles),
    Hold,
}

/// What a template wants a segment to feel like.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EasingIntent {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Hold,
}

impl EasingIntent {
    pub fn easing(self) -> Easing {
        match self {
            EasingIntent::Linear => Easing::Linear,
            EasingIntent::EaseIn => Easing::Bezier(EASE_IN_HANDLES),
            EasingIntent::EaseOut => Easing::Bezier(EASE_OUT_HANDLES),
            EasingIntent::EaseInOut => Easing::Bezier(EASE_IN_OUT_HANDLES),
            EasingIntent::Hold => Easing::Hold,
        }
    }
}

impl From<EasingIntent> for Easing {
    fn from(intent: EasingIntent) -> Self {
        intent.easing()
    }
}

impl Easing {
    pub fn is_hold(&self) -> bool {
        matches!(self, Easing::Hold)
    }

    pub fn handles(&self) -> Option<BezierHandles> {
        match self {
            Easing::Linear => Some(LINEAR_HANDLES),
            Easing::Bezier(handles) => Some(*handles),
            Easing::Hold => None,
        }
    }

    /// Lottie `(o, i)` tangents, or `None` for a hold segment.
    pub fn tangents(&self) -> Option<(BezierTangent, BezierTangent)> {
        self.handles().map(|h| {
            (
                BezierTangent::new(h.out_x, h.out_y),
                BezierTangent::new(h.in_x, h.in_y),
            )
        })
    }

    /// Eased progress for a linear progress `t` in `[0, 1]`.
    pub fn progress(&self, t: f32) -> f32 {
        self.y(t as f64) as f32
    }
}

impl EasingFunction for Easing {
    fn y(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        match self {
            Easing::Linear => functions::Linear.y(x),
            Easing::Hold => 0.0,
            Easing::Bezier(h) => functions::BezierCurve::from(
                Vector2 {
                    x: h.out_x,
                    y: h.out_y,
                },
                Vector2 {
                    x: h.in_x,
                    y: h.in_y,
                },
            )
            .y(x),
        }
    }
}
