#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to decode base64 SVG: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("decoded SVG is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("failed to parse SVG: {0}")]
    Parse(#[from] usvg::Error),

    #[error("SVG payload is empty")]
    Empty,
}
