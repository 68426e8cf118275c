//! # Document Assembler
//!
//! Binds synthesized channels to the imported layers and emits a Lottie
//! document.
//!
//! ## Layer mapping
//! - Layers are emitted topmost first (descending z), children right after
//!   their parent and linked through `parent`.
//! - `ind` is 1-based in emission order.
//! - Group layers become null layers (`ty` 3), shape layers `ty` 4.
//! - Every layer spans the document's `[ip, op]`.
//! - 2-vectors become Lottie 3-vectors: z 0 for position, z 100 for scale.

use crate::channel::{ChannelValue, PropertyChannel, PropertyKind};
use crate::error::MotionError;
use crate::tree::{LayerKind, LayerTree, SourceLayer};
use lottie_data::model::{self as data, LottieJson, Property, Vec3DefaultZero, Vec3Scale};
use std::collections::HashMap;
use tracing::info;

/// Lottie schema version written into every document.
pub const LOTTIE_VERSION: &str = "5.7.0";

/// Frame rate and playback range of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentTiming {
    pub fps: u32,
    pub in_point: u32,
    pub out_point: u32,
}

impl DocumentTiming {
    /// Range `[0, duration]` at `fps`.
    pub fn new(fps: u32, duration: u32) -> Self {
        Self {
            fps,
            in_point: 0,
            out_point: duration,
        }
    }

    pub fn duration(&self) -> u32 {
        self.out_point.saturating_sub(self.in_point)
    }
}

type ChannelIndex<'a> = HashMap<(&'a str, PropertyKind), &'a PropertyChannel>;

/// Assembles the final document.
///
/// Channels must each target a distinct (layer, property) of `tree` and keep
/// every keyframe inside `[in_point, out_point]`.
pub fn assemble(
    tree: &LayerTree,
    channels: &[PropertyChannel],
    timing: DocumentTiming,
    generator: &str,
) -> Result<LottieJson, MotionError> {
    if tree.width == 0 || tree.height == 0 {
        return Err(MotionError::EmptyCanvas {
            width: tree.width,
            height: tree.height,
        });
    }
    if timing.fps == 0 {
        return Err(MotionError::InvalidRequest { field: "fps" });
    }
    if timing.out_point <= timing.in_point {
        return Err(MotionError::InvalidRequest { field: "duration" });
    }

    let index = index_channels(tree, channels, timing)?;

    let mut layers = Vec::with_capacity(tree.layer_count());
    let mut next_ind = 1;
    flatten(&tree.layers, None, &index, timing, &mut layers, &mut next_ind)?;

    info!(
        layers = layers.len(),
        channels = channels.len(),
        fps = timing.fps,
        frames = timing.duration(),
        "assembled document"
    );

    Ok(LottieJson {
        v: Some(LOTTIE_VERSION.to_string()),
        nm: None,
        ip: timing.in_point as f32,
        op: timing.out_point as f32,
        fr: timing.fps as f32,
        w: tree.width,
        h: tree.height,
        ddd: Some(0),
        layers,
        assets: tree.assets.clone(),
        meta: Some(data::Meta {
            g: Some(generator.to_string()),
            ..Default::default()
        }),
    })
}

fn index_channels<'a>(
    tree: &LayerTree,
    channels: &'a [PropertyChannel],
    timing: DocumentTiming,
) -> Result<ChannelIndex<'a>, MotionError> {
    let mut index = ChannelIndex::with_capacity(channels.len());
    for channel in channels {
        if !tree.contains(channel.layer()) {
            return Err(MotionError::OrphanedChannel {
                layer: channel.layer().to_string(),
                property: channel.kind(),
            });
        }

        let (first, last) = channel.span();
        let outside = if first < timing.in_point {
            Some(first)
        } else if last > timing.out_point {
            Some(last)
        } else {
            None
        };
        if let Some(frame) = outside {
            return Err(MotionError::KeyframeOutOfRange {
                layer: channel.layer().to_string(),
                property: channel.kind(),
                frame,
                in_point: timing.in_point,
                out_point: timing.out_point,
            });
        }

        if index
            .insert((channel.layer(), channel.kind()), channel)
            .is_some()
        {
            return Err(MotionError::DuplicateChannel {
                layer: channel.layer().to_string(),
                property: channel.kind(),
            });
        }
    }
    Ok(index)
}

fn flatten(
    layers: &[SourceLayer],
    parent: Option<u32>,
    index: &ChannelIndex<'_>,
    timing: DocumentTiming,
    out: &mut Vec<data::Layer>,
    next_ind: &mut u32,
) -> Result<(), MotionError> {
    let mut ordered: Vec<&SourceLayer> = layers.iter().collect();
    ordered.sort_by(|a, b| b.z_index.cmp(&a.z_index));

    for layer in ordered {
        let ind = *next_ind;
        *next_ind += 1;

        out.push(lottie_layer(layer, ind, parent, index, timing)?);
        flatten(&layer.children, Some(ind), index, timing, out, next_ind)?;
    }
    Ok(())
}

fn lottie_layer(
    layer: &SourceLayer,
    ind: u32,
    parent: Option<u32>,
    index: &ChannelIndex<'_>,
    timing: DocumentTiming,
) -> Result<data::Layer, MotionError> {
    let rest = &layer.transform;
    let mut ks = data::Transform::fixed(
        rest.anchor.to_array(),
        rest.position.to_array(),
        rest.scale.to_array(),
        rest.rotation,
        rest.opacity,
    );

    for kind in PropertyKind::ALL {
        let Some(channel) = index.get(&(layer.id.as_str(), kind)) else {
            continue;
        };
        match kind {
            PropertyKind::Opacity => ks.o = Property::animated(lottie_keyframes(channel, scalar)?),
            PropertyKind::Rotation => ks.r = Property::animated(lottie_keyframes(channel, scalar)?),
            PropertyKind::Position => {
                ks.p = data::PositionProperty::Unified(Property::animated(lottie_keyframes(
                    channel,
                    |v| v.as_vec2().map(|p| Vec3DefaultZero([p.x, p.y, 0.0])),
                )?))
            }
            PropertyKind::Scale => {
                ks.s = Property::animated(lottie_keyframes(channel, |v| {
                    v.as_vec2().map(|s| Vec3Scale([s.x, s.y, 100.0]))
                })?)
            }
        }
    }

    let (ty, shapes) = match layer.kind {
        LayerKind::Group => (data::LAYER_NULL, None),
        LayerKind::Shape => (data::LAYER_SHAPE, Some(layer.shapes.clone())),
    };

    Ok(data::Layer {
        ty,
        ind: Some(ind),
        parent,
        nm: Some(layer.display_name().to_string()),
        layer_id: Some(layer.id.clone()),
        ip: timing.in_point as f32,
        op: timing.out_point as f32,
        st: 0.0,
        sr: 1.0,
        ks,
        ao: Some(0),
        ddd: Some(0),
        hd: None,
        bm: None,
        shapes,
    })
}

fn scalar(value: &ChannelValue) -> Option<f32> {
    value.as_scalar()
}

// Easing lives on the outgoing segment, so the last key carries none.
fn lottie_keyframes<T>(
    channel: &PropertyChannel,
    convert: impl Fn(&ChannelValue) -> Option<T>,
) -> Result<Vec<data::Keyframe<T>>, MotionError> {
    let keys = channel.keyframes();
    keys.iter()
        .enumerate()
        .map(|(idx, key)| {
            let value = convert(&key.value).ok_or_else(|| MotionError::ValueShapeMismatch {
                layer: channel.layer().to_string(),
                property: channel.kind(),
                frame: key.frame,
                expected: channel.kind().arity(),
                found: key.value.arity(),
            })?;

            let mut out = data::Keyframe::at(key.frame as f32, value);
            if idx + 1 < keys.len() {
                match key.easing.tangents() {
                    Some((o, i)) => {
                        out.o = Some(o);
                        out.i = Some(i);
                    }
                    None => out.h = Some(1),
                }
            }
            Ok(out)
        })
        .collect()
}
