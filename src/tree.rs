//! # Imported Layer Tree
//!
//! The shape/layer tree handed to the engine by a vector importer.
//!
//! ## Key Types
//! - `SourceLayer`: one drawable node with its initial transform. Children are
//!   owned by their parent; the engine never mutates a layer.
//! - `LayerTree`: canvas size plus the ordered top-level layers.
//! - `VectorImport`: the seam a markup parser implements to produce a tree.

use glam::Vec2;
use lottie_data::model as data;

pub type LayerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Draws its own shape items.
    Shape,
    /// Carries a transform for its children only.
    Group,
}

/// Initial transform of a layer, in Lottie units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerTransform {
    pub position: Vec2,
    pub anchor: Vec2,
    /// Percent per axis.
    pub scale: Vec2,
    /// Degrees.
    pub rotation: f32,
    /// 0..=100.
    pub opacity: f32,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            anchor: Vec2::ZERO,
            scale: Vec2::splat(100.0),
            rotation: 0.0,
            opacity: 100.0,
        }
    }
}

impl LayerTransform {
    /// Identity transform pivoting around `center`.
    pub fn centered_on(center: Vec2) -> Self {
        Self {
            position: center,
            anchor: center,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceLayer {
    pub id: LayerId,
    pub name: Option<String>,
    pub kind: LayerKind,
    pub transform: LayerTransform,
    /// Higher values draw on top.
    pub z_index: i32,
    pub shapes: Vec<data::Shape>,
    pub children: Vec<SourceLayer>,
}

impl SourceLayer {
    pub fn shape(id: impl Into<LayerId>, shapes: Vec<data::Shape>) -> Self {
        Self {
            id: id.into(),
            name: None,
            kind: LayerKind::Shape,
            transform: LayerTransform::default(),
            z_index: 0,
            shapes,
            children: Vec::new(),
        }
    }

    pub fn group(id: impl Into<LayerId>, children: Vec<SourceLayer>) -> Self {
        Self {
            id: id.into(),
            name: None,
            kind: LayerKind::Group,
            transform: LayerTransform::default(),
            z_index: 0,
            shapes: Vec::new(),
            children,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transform(mut self, transform: LayerTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Shape layers at or below this one, depth first.
    pub fn drawn_layers(&self) -> Vec<&SourceLayer> {
        match self.kind {
            LayerKind::Shape => vec![self],
            LayerKind::Group => self
                .children
                .iter()
                .flat_map(SourceLayer::drawn_layers)
                .collect(),
        }
    }

    fn find(&self, id: &str) -> Option<&SourceLayer> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(SourceLayer::count).sum::<usize>()
    }
}

/// Output of a vector import: canvas size and top-level layers.
#[derive(Debug, Clone)]
pub struct LayerTree {
    pub width: u32,
    pub height: u32,
    pub layers: Vec<SourceLayer>,
    pub assets: Vec<data::Asset>,
}

impl LayerTree {
    pub fn new(width: u32, height: u32, layers: Vec<SourceLayer>) -> Self {
        Self {
            width,
            height,
            layers,
            assets: Vec::new(),
        }
    }

    /// Looks a layer up at any depth.
    pub fn find(&self, id: &str) -> Option<&SourceLayer> {
        self.layers.iter().find_map(|layer| layer.find(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Number of layers at every depth.
    pub fn layer_count(&self) -> usize {
        self.layers.iter().map(SourceLayer::count).sum()
    }

    pub fn top_level_ids(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|layer| layer.id.as_str())
    }
}

/// Turns raw vector markup into a [`LayerTree`].
pub trait VectorImport {
    type Error: std::error::Error + Send + Sync + 'static;

    fn import(&self, markup: &str) -> Result<LayerTree, Self::Error>;
}
