//! Command-line and HTTP front ends for `lottie-motion`.

pub mod convert;
pub mod server;
