use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use lottie_motion::{AnimationRequest, AnimationType, MotionDefaults};
use lottie_motion_cli::convert::{convert_batch, convert_source, ConvertError};
use std::fs;
use tempfile::tempdir;

const STAR_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64">
  <path id="star" d="M32 4 L40 24 L60 24 L44 38 L50 58 L32 46 L14 58 L20 38 L4 24 L24 24 Z" fill="#ffcc00"/>
</svg>"##;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[test]
fn test_markup_and_payload_sources() {
    init_tracing();
    let request = AnimationRequest::new(AnimationType::ScaleUp);
    let defaults = MotionDefaults::default();

    let from_markup = convert_source(STAR_SVG, &request, &defaults).unwrap();
    let from_payload =
        convert_source(&BASE64_STANDARD.encode(STAR_SVG), &request, &defaults).unwrap();

    assert_eq!(from_markup.nm.as_deref(), Some("scale_up"));
    assert_eq!((from_markup.w, from_markup.h), (64, 64));
    assert_eq!(
        serde_json::to_value(&from_markup).unwrap(),
        serde_json::to_value(&from_payload).unwrap()
    );
}

#[test]
fn test_source_errors_keep_their_origin() {
    let request = AnimationRequest::default();
    let defaults = MotionDefaults::default();

    let err = convert_source("@@not base64@@", &request, &defaults).unwrap_err();
    assert!(matches!(err, ConvertError::Import(_)));

    let complex = AnimationRequest::new(AnimationType::Complex);
    let err = convert_source(STAR_SVG, &complex, &defaults).unwrap_err();
    assert!(matches!(err, ConvertError::Motion(_)));
}

#[test]
fn test_batch_writes_into_directory() {
    init_tracing();
    let dir = tempdir().expect("temp dir");
    let first = dir.path().join("star.svg");
    let second = dir.path().join("encoded.txt");
    let broken = dir.path().join("broken.svg");
    fs::write(&first, STAR_SVG).expect("write svg");
    fs::write(&second, BASE64_STANDARD.encode(STAR_SVG)).expect("write payload");
    fs::write(&broken, "<svg><path").expect("write broken");

    let out = dir.path().join("out");
    let inputs = vec![first, second, broken.clone()];
    let report = convert_batch(
        &inputs,
        Some(&out),
        &AnimationRequest::new(AnimationType::Bounce).with_duration(30),
        &MotionDefaults::default(),
        true,
    );

    assert_eq!(report.converted.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, broken);

    let written = fs::read_to_string(out.join("star.json")).expect("star output");
    let doc: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(doc["op"], 30.0);
    assert_eq!(doc["layers"][0]["ln"], "star");
    assert!(out.join("encoded.json").exists());
}

#[test]
fn test_batch_rejects_colliding_outputs() {
    init_tracing();
    let dir = tempdir().expect("temp dir");
    let mut inputs = Vec::new();
    for folder in ["a", "b"] {
        let folder = dir.path().join(folder);
        fs::create_dir_all(&folder).expect("input dir");
        let input = folder.join("logo.svg");
        fs::write(&input, STAR_SVG).expect("write svg");
        inputs.push(input);
    }

    let out = dir.path().join("out");
    let report = convert_batch(
        &inputs,
        Some(&out),
        &AnimationRequest::default(),
        &MotionDefaults::default(),
        false,
    );

    assert_eq!(report.converted, vec![out.join("logo.json")]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, inputs[1]);
    assert!(format!("{:#}", report.failed[0].1).contains("already written by"));
}

#[test]
fn test_single_input_next_to_source() {
    let dir = tempdir().expect("temp dir");
    let input = dir.path().join("logo.svg");
    fs::write(&input, STAR_SVG).expect("write svg");

    let report = convert_batch(
        std::slice::from_ref(&input),
        None,
        &AnimationRequest::default(),
        &MotionDefaults::default(),
        false,
    );
    assert!(report.failed.is_empty());
    assert_eq!(report.converted, vec![dir.path().join("logo.json")]);
}
