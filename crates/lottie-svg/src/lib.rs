//! SVG front end for `lottie-motion`.
//!
//! - [`decode_svg_payload`] turns a base64 payload (optionally a
//!   `data:image/svg+xml;base64,` URL) into markup.
//! - [`extract_dimensions`] reads the canvas size from the root `<svg>` tag.
//! - [`SvgImporter`] parses markup with `usvg` and builds a
//!   [`LayerTree`](lottie_motion::LayerTree): one shape layer per top-level
//!   element, nested groups kept as Lottie shape groups.

mod error;
mod geometry;
mod import;
mod payload;

pub use error::ImportError;
pub use geometry::{lottie_paths, usvg_affine};
pub use import::{import_payload, SvgImporter};
pub use payload::{
    decode_svg_payload, extract_dimensions, Dimensions, DEFAULT_DIMENSIONS, SVG_DATA_URL_PREFIX,
};
