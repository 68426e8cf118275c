//! Path conversion between `usvg`, `kurbo` and Lottie bezier shapes.
//!
//! Lottie stores each subpath as vertices with tangents relative to their
//! vertex: `o[k]` leaves `v[k]`, `i[k]` enters it. Quadratic segments are
//! raised to cubics; lines get zero tangents.

use kurbo::{Affine, BezPath, PathEl, Point, Vec2};
use lottie_data::model::BezierPath;
use usvg::tiny_skia_path::PathSegment;

/// `usvg` (tiny-skia) transform as a kurbo affine.
pub fn usvg_affine(ts: usvg::Transform) -> Affine {
    Affine::new([
        ts.sx as f64,
        ts.ky as f64,
        ts.kx as f64,
        ts.sy as f64,
        ts.tx as f64,
        ts.ty as f64,
    ])
}

/// Path data of a `usvg` path, mapped through `affine`.
pub(crate) fn bez_path(data: &usvg::tiny_skia_path::Path, affine: Affine) -> BezPath {
    let pt = |p: usvg::tiny_skia_path::Point| Point::new(p.x as f64, p.y as f64);

    let mut path = BezPath::new();
    for segment in data.segments() {
        match segment {
            PathSegment::MoveTo(p) => path.move_to(pt(p)),
            PathSegment::LineTo(p) => path.line_to(pt(p)),
            PathSegment::QuadTo(c, p) => path.quad_to(pt(c), pt(p)),
            PathSegment::CubicTo(c1, c2, p) => path.curve_to(pt(c1), pt(c2), pt(p)),
            PathSegment::Close => path.close_path(),
        }
    }
    path.apply_affine(affine);
    path
}

/// Uniform scale factor of `affine`, used for stroke widths.
pub(crate) fn affine_scale(affine: Affine) -> f64 {
    affine.determinant().abs().sqrt()
}

struct Subpath {
    v: Vec<Point>,
    i: Vec<Vec2>,
    o: Vec<Vec2>,
    closed: bool,
}

impl Subpath {
    fn starting_at(p: Point) -> Self {
        Self {
            v: vec![p],
            i: vec![Vec2::ZERO],
            o: vec![Vec2::ZERO],
            closed: false,
        }
    }

    fn current(&self) -> Point {
        self.v.last().copied().unwrap_or(Point::ORIGIN)
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        let from = self.current();
        if let Some(out) = self.o.last_mut() {
            *out = c1 - from;
        }
        self.v.push(p);
        self.i.push(c2 - p);
        self.o.push(Vec2::ZERO);
    }

    fn close(&mut self) {
        self.closed = true;
        let n = self.v.len() - 1;
        // An explicit segment back to the start duplicates the first vertex.
        if n > 0 && (self.v[n] - self.v[0]).hypot() < 1e-6 {
            self.i[0] = self.i[n];
            self.v.pop();
            self.i.pop();
            self.o.pop();
        }
    }

    fn into_lottie(self) -> BezierPath {
        let arr_p = |p: &Point| [p.x as f32, p.y as f32];
        let arr_v = |v: &Vec2| [v.x as f32, v.y as f32];
        BezierPath {
            c: self.closed,
            v: self.v.iter().map(arr_p).collect(),
            i: self.i.iter().map(arr_v).collect(),
            o: self.o.iter().map(arr_v).collect(),
        }
    }
}

/// Splits `path` into Lottie bezier shapes, one per subpath. Subpaths without
/// a drawn segment are dropped.
pub fn lottie_paths(path: &BezPath) -> Vec<BezierPath> {
    let mut shapes = Vec::new();
    let mut current: Option<Subpath> = None;

    let mut flush = |sub: Option<Subpath>| {
        if let Some(sub) = sub.filter(|s| s.v.len() > 1) {
            shapes.push(sub.into_lottie());
        }
    };

    for el in path.elements() {
        if let PathEl::MoveTo(p) = *el {
            flush(current.take());
            current = Some(Subpath::starting_at(p));
            continue;
        }

        // Drawing after a close continues from the closed subpath's start.
        let sub = match current.take() {
            Some(sub) if sub.closed => {
                let start = sub.v[0];
                flush(Some(sub));
                current.insert(Subpath::starting_at(start))
            }
            Some(sub) => current.insert(sub),
            None => current.insert(Subpath::starting_at(Point::ORIGIN)),
        };

        let from = sub.current();
        match *el {
            PathEl::LineTo(p) => sub.curve_to(from, p, p),
            PathEl::QuadTo(q, p) => {
                let c1 = from + (q - from) * (2.0 / 3.0);
                let c2 = p + (q - p) * (2.0 / 3.0);
                sub.curve_to(c1, c2, p);
            }
            PathEl::CurveTo(c1, c2, p) => sub.curve_to(c1, c2, p),
            PathEl::ClosePath => sub.close(),
            PathEl::MoveTo(_) => {}
        }
    }
    flush(current.take());
    shapes
}
