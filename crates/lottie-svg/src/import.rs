use crate::error::ImportError;
use crate::geometry::{affine_scale, bez_path, lottie_paths, usvg_affine};
use crate::payload::{decode_svg_payload, extract_dimensions};
use glam::Vec2;
use kurbo::{Affine, Rect, Shape as _};
use lottie_data::model::{self as data, Property};
use lottie_motion::{LayerTransform, LayerTree, SourceLayer, VectorImport};
use std::collections::HashSet;
use tracing::{debug, warn};

/// `usvg`-backed [`VectorImport`].
///
/// Every top-level element becomes one shape layer pivoting on the centre of
/// its bounds. Geometry is baked into canvas coordinates, so layer space and
/// canvas space coincide at rest.
#[derive(Debug, Clone, Default)]
pub struct SvgImporter {
    /// Keep elements with no visible paint.
    pub keep_unpainted: bool,
}

impl SvgImporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VectorImport for SvgImporter {
    type Error = ImportError;

    fn import(&self, markup: &str) -> Result<LayerTree, ImportError> {
        if markup.trim().is_empty() {
            return Err(ImportError::Empty);
        }

        let dims = extract_dimensions(markup);
        let tree = usvg::Tree::from_str(markup, &usvg::Options::default())?;

        // usvg lays out in width/height units; the canvas follows the viewBox.
        let size = tree.size();
        let fit = Affine::scale_non_uniform(
            dims.width as f64 / size.width() as f64,
            dims.height as f64 / size.height() as f64,
        );

        let mut walker = Walker {
            fit,
            keep_unpainted: self.keep_unpainted,
            ids: HashSet::new(),
            generated: 0,
        };
        let mut layers = Vec::new();
        for (z, node) in tree.root().children().iter().enumerate() {
            if let Some(layer) = walker.layer(node) {
                layers.push(layer.with_z_index(z as i32));
            }
        }

        debug!(
            width = dims.width,
            height = dims.height,
            layers = layers.len(),
            "imported svg"
        );
        Ok(LayerTree::new(dims.width, dims.height, layers))
    }
}

/// Decodes a base64 payload and imports it with the default importer.
pub fn import_payload(payload: &str) -> Result<LayerTree, ImportError> {
    let markup = decode_svg_payload(payload)?;
    SvgImporter::new().import(&markup)
}

struct Walker {
    fit: Affine,
    keep_unpainted: bool,
    ids: HashSet<String>,
    generated: usize,
}

impl Walker {
    fn layer(&mut self, node: &usvg::Node) -> Option<SourceLayer> {
        let (items, bounds) = self.items(node)?;
        let id = self.layer_id(node.id(), kind_name(node));
        let center = bounds.center();

        let mut layer = SourceLayer::shape(id, items).with_transform(LayerTransform::centered_on(
            Vec2::new(center.x as f32, center.y as f32),
        ));
        if !node.id().is_empty() {
            layer = layer.with_name(node.id());
        }
        Some(layer)
    }

    // Shape items for `node` and their canvas bounds.
    fn items(&mut self, node: &usvg::Node) -> Option<(Vec<data::Shape>, Rect)> {
        match node {
            usvg::Node::Path(path) => self.path_items(path),
            usvg::Node::Group(group) => self.group_items(group),
            usvg::Node::Text(text) => self.group_items(text.flattened()),
            usvg::Node::Image(image) => {
                warn!(id = image.id(), "raster images are not imported, skipping");
                None
            }
        }
    }

    fn group_items(&mut self, group: &usvg::Group) -> Option<(Vec<data::Shape>, Rect)> {
        let mut items = Vec::new();
        let mut bounds: Option<Rect> = None;
        for child in group.children() {
            if let Some((child_items, child_bounds)) = self.items(child) {
                items.extend(child_items);
                bounds = Some(bounds.map_or(child_bounds, |b| b.union(child_bounds)));
            }
        }
        let bounds = bounds?;

        items.push(transform_item(group.opacity().get() * 100.0));
        let shape = data::Shape::Group(data::GroupShape {
            nm: (!group.id().is_empty()).then(|| group.id().to_string()),
            np: Some(items.len() as u32),
            it: items,
        });
        Some((vec![shape], bounds))
    }

    fn path_items(&mut self, path: &usvg::Path) -> Option<(Vec<data::Shape>, Rect)> {
        let affine = self.fit * usvg_affine(path.abs_transform());
        let geometry = bez_path(path.data(), affine);
        let outlines = lottie_paths(&geometry);
        if outlines.is_empty() {
            return None;
        }

        let fill = path.fill().and_then(fill_item);
        let stroke = path
            .stroke()
            .and_then(|stroke| stroke_item(stroke, affine_scale(affine)));
        if fill.is_none() && stroke.is_none() && !self.keep_unpainted {
            debug!(id = path.id(), "path has no supported paint, skipping");
            return None;
        }

        let mut items: Vec<data::Shape> = outlines
            .into_iter()
            .map(|outline| {
                data::Shape::Path(data::PathShape {
                    nm: None,
                    ks: Property::fixed(outline),
                })
            })
            .collect();
        items.extend(stroke);
        items.extend(fill);
        items.push(transform_item(100.0));

        let shape = data::Shape::Group(data::GroupShape {
            nm: (!path.id().is_empty()).then(|| path.id().to_string()),
            np: Some(items.len() as u32),
            it: items,
        });
        Some((vec![shape], geometry.bounding_box()))
    }

    fn layer_id(&mut self, svg_id: &str, kind: &str) -> String {
        if !svg_id.is_empty() && self.ids.insert(svg_id.to_string()) {
            return svg_id.to_string();
        }
        loop {
            self.generated += 1;
            let candidate = format!("{kind}_{}", self.generated);
            if self.ids.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

fn kind_name(node: &usvg::Node) -> &'static str {
    match node {
        usvg::Node::Group(_) => "group",
        usvg::Node::Path(_) => "path",
        usvg::Node::Text(_) => "text",
        usvg::Node::Image(_) => "image",
    }
}

fn transform_item(opacity: f32) -> data::Shape {
    data::Shape::Transform(data::TransformShape {
        t: data::Transform::fixed([0.0, 0.0], [0.0, 0.0], [100.0, 100.0], 0.0, opacity),
    })
}

fn solid_color(paint: &usvg::Paint) -> Option<data::Vec4> {
    match paint {
        usvg::Paint::Color(c) => Some([
            c.red as f32 / 255.0,
            c.green as f32 / 255.0,
            c.blue as f32 / 255.0,
            1.0,
        ]),
        _ => {
            warn!("gradient and pattern paints are not imported");
            None
        }
    }
}

fn fill_item(fill: &usvg::Fill) -> Option<data::Shape> {
    let color = solid_color(fill.paint())?;
    Some(data::Shape::Fill(data::FillShape {
        nm: None,
        c: Property::fixed(color),
        o: Property::fixed(fill.opacity().get() * 100.0),
        r: Some(match fill.rule() {
            usvg::FillRule::NonZero => 1,
            usvg::FillRule::EvenOdd => 2,
        }),
    }))
}

fn stroke_item(stroke: &usvg::Stroke, scale: f64) -> Option<data::Shape> {
    let color = solid_color(stroke.paint())?;
    Some(data::Shape::Stroke(data::StrokeShape {
        nm: None,
        c: Property::fixed(color),
        w: Property::fixed(stroke.width().get() * scale as f32),
        o: Property::fixed(stroke.opacity().get() * 100.0),
        lc: match stroke.linecap() {
            usvg::LineCap::Butt => 1,
            usvg::LineCap::Round => 2,
            usvg::LineCap::Square => 3,
        },
        lj: match stroke.linejoin() {
            usvg::LineJoin::Miter | usvg::LineJoin::MiterClip => 1,
            usvg::LineJoin::Round => 2,
            usvg::LineJoin::Bevel => 3,
        },
        ml: Some(stroke.miterlimit().get()),
    }))
}
