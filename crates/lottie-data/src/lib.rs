//! Serde data model for the subset of the Lottie format produced by the
//! motion synthesizer: composition, layers, transforms, shape items and
//! keyframed properties.

pub mod model;
