use crate::error::ImportError;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

pub const SVG_DATA_URL_PREFIX: &str = "data:image/svg+xml;base64,";

/// Canvas size used when the markup declares neither a viewBox nor a size.
pub const DEFAULT_DIMENSIONS: Dimensions = Dimensions {
    width: 512,
    height: 512,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Decodes a base64 SVG payload, with or without the data-URL prefix.
pub fn decode_svg_payload(payload: &str) -> Result<String, ImportError> {
    let trimmed = payload.trim();
    let encoded = trimmed.strip_prefix(SVG_DATA_URL_PREFIX).unwrap_or(trimmed);

    // Wrapped base64 is common in pasted payloads.
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(ImportError::Empty);
    }

    let markup = String::from_utf8(BASE64_STANDARD.decode(compact.as_bytes())?)?;
    if markup.trim().is_empty() {
        return Err(ImportError::Empty);
    }
    debug!(bytes = markup.len(), "decoded svg payload");
    Ok(markup)
}

fn svg_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?is)<svg\b[^>]*>").expect("valid svg tag pattern"))
}

fn view_box_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)\bviewBox\s*=\s*["']([^"']*)["']"#).expect("valid viewBox pattern")
    })
}

fn size_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)\s(width|height)\s*=\s*["']?\s*(\d+(?:\.\d+)?)\s*(?:px)?\s*(?:["'\s/>]|$)"#)
            .expect("valid size pattern")
    })
}

/// Canvas size of an SVG document: the viewBox size first, then the root
/// `width`/`height` attributes, else [`DEFAULT_DIMENSIONS`]. Fractions are
/// truncated.
pub fn extract_dimensions(markup: &str) -> Dimensions {
    let root = svg_tag_pattern()
        .find(markup)
        .map(|m| m.as_str())
        .unwrap_or(markup);

    if let Some(dims) = view_box_size(root) {
        return dims;
    }

    let mut width = None;
    let mut height = None;
    for caps in size_pattern().captures_iter(root) {
        let value = caps[2].parse::<f32>().ok().map(|v| v as u32);
        if caps[1].eq_ignore_ascii_case("width") {
            width = width.or(value);
        } else {
            height = height.or(value);
        }
    }

    match (width, height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => Dimensions { width, height },
        _ => DEFAULT_DIMENSIONS,
    }
}

fn view_box_size(root: &str) -> Option<Dimensions> {
    let caps = view_box_pattern().captures(root)?;
    let values: Vec<f32> = caps[1]
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    if values.len() < 4 {
        return None;
    }

    let (width, height) = (values[2] as u32, values[3] as u32);
    (width > 0 && height > 0).then_some(Dimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_box_wins_over_attributes() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="512" height="256" viewBox="0 0 100 50.7"></svg>"#;
        assert_eq!(
            extract_dimensions(svg),
            Dimensions {
                width: 100,
                height: 50
            }
        );
    }

    #[test]
    fn attributes_when_no_view_box() {
        let svg = r#"<svg width="320px" height='240'><rect stroke-width="9" width="4" height="4"/></svg>"#;
        assert_eq!(
            extract_dimensions(svg),
            Dimensions {
                width: 320,
                height: 240
            }
        );
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(extract_dimensions("<svg></svg>"), DEFAULT_DIMENSIONS);
        assert_eq!(
            extract_dimensions(r#"<svg width="100%" height="100%"/>"#),
            DEFAULT_DIMENSIONS
        );
        assert_eq!(
            extract_dimensions(r#"<svg viewBox="0 0 0 0" width="10" height="20"/>"#),
            Dimensions {
                width: 10,
                height: 20
            }
        );
    }

    #[test]
    fn decodes_with_and_without_prefix() {
        let markup = "<svg/>";
        let encoded = BASE64_STANDARD.encode(markup);
        assert_eq!(decode_svg_payload(&encoded).unwrap(), markup);
        assert_eq!(
            decode_svg_payload(&format!("{SVG_DATA_URL_PREFIX}{encoded}")).unwrap(),
            markup
        );
        assert!(matches!(decode_svg_payload("  "), Err(ImportError::Empty)));
        assert!(matches!(
            decode_svg_payload("not base64!"),
            Err(ImportError::Decode(_))
        ));
        let latin1 = BASE64_STANDARD.encode([0xffu8, 0xfe, 0x00]);
        assert!(matches!(
            decode_svg_payload(&latin1),
            Err(ImportError::Utf8(_))
        ));
    }
}
