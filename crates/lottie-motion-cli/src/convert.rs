//! Conversion pipeline shared by the CLI and the HTTP service.

use anyhow::{anyhow, Context, Result};
use lottie_data::model::LottieJson;
use lottie_motion::{synthesize, AnimationRequest, MotionDefaults, MotionError, VectorImport};
use lottie_svg::{decode_svg_payload, ImportError, SvgImporter};
use rayon::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Motion(#[from] MotionError),
}

pub fn convert_markup(
    markup: &str,
    request: &AnimationRequest,
    defaults: &MotionDefaults,
) -> Result<LottieJson, ConvertError> {
    let tree = SvgImporter::new().import(markup)?;
    Ok(synthesize(&tree, request, defaults)?)
}

pub fn convert_payload(
    payload: &str,
    request: &AnimationRequest,
    defaults: &MotionDefaults,
) -> Result<LottieJson, ConvertError> {
    let markup = decode_svg_payload(payload)?;
    convert_markup(&markup, request, defaults)
}

/// Converts file contents: SVG markup, or a base64 payload when the text does
/// not open with a tag.
pub fn convert_source(
    source: &str,
    request: &AnimationRequest,
    defaults: &MotionDefaults,
) -> Result<LottieJson, ConvertError> {
    if source.trim_start().starts_with('<') {
        convert_markup(source, request, defaults)
    } else {
        convert_payload(source, request, defaults)
    }
}

/// Where the document for `input` is written.
///
/// A single input with a `.json` output is written to that file; otherwise
/// the output is a directory. Without an output the document lands next to
/// the input.
pub fn output_path(input: &Path, output: Option<&Path>, batch: bool) -> PathBuf {
    match output {
        Some(file) if !batch && file.extension().is_some_and(|ext| ext == "json") => {
            file.to_path_buf()
        }
        Some(dir) => {
            let stem = input.file_stem().unwrap_or(input.as_os_str());
            dir.join(Path::new(stem).with_extension("json"))
        }
        None => input.with_extension("json"),
    }
}

pub fn convert_file(
    input: &Path,
    output: &Path,
    request: &AnimationRequest,
    defaults: &MotionDefaults,
    pretty: bool,
) -> Result<()> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let doc = convert_source(&source, request, defaults)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    let json = if pretty {
        serde_json::to_string_pretty(&doc)?
    } else {
        serde_json::to_string(&doc)?
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(output, json).with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        input = %input.display(),
        output = %output.display(),
        layers = doc.layers.len(),
        frames = doc.duration_frames(),
        "wrote animation"
    );
    Ok(())
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

/// Pairs each input with its output path. An input whose output is already
/// claimed by an earlier input fails instead of overwriting it.
fn plan_outputs<'a>(
    inputs: &'a [PathBuf],
    output: Option<&Path>,
) -> Vec<(&'a PathBuf, Result<PathBuf>)> {
    let batch = inputs.len() > 1;
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    inputs
        .iter()
        .map(|input| {
            let target = output_path(input, output, batch);
            let planned = match claimed.entry(target.clone()) {
                Entry::Occupied(owner) => Err(anyhow!(
                    "output {} is already written by {}",
                    target.display(),
                    owner.get().display()
                )),
                Entry::Vacant(slot) => {
                    slot.insert(input);
                    Ok(target)
                }
            };
            (input, planned)
        })
        .collect()
}

/// Converts every input in parallel. Failures are collected, not fatal.
pub fn convert_batch(
    inputs: &[PathBuf],
    output: Option<&Path>,
    request: &AnimationRequest,
    defaults: &MotionDefaults,
    pretty: bool,
) -> BatchReport {
    let results: Vec<(PathBuf, Result<PathBuf>)> = plan_outputs(inputs, output)
        .into_par_iter()
        .map(|(input, planned)| {
            let result = planned.and_then(|target| {
                convert_file(input, &target, request, defaults, pretty).map(|_| target)
            });
            (input.clone(), result)
        })
        .collect();

    let mut report = BatchReport::default();
    for (input, result) in results {
        match result {
            Ok(target) => report.converted.push(target),
            Err(err) => {
                warn!(input = %input.display(), error = %format!("{err:#}"), "conversion failed");
                report.failed.push((input, err));
            }
        }
    }
    report
}
