//! # svg2lottie
//!
//! Converts SVG artwork into animated Lottie documents.
//!
//! ## Commands
//! - `convert`: Convert one or more SVG files (markup or base64 payloads)
//! - `types`: List the available animation types
//! - `serve`: Run the HTTP conversion service

use anyhow::{bail, Context, Result};
use axum::http::HeaderValue;
use clap::{Parser, Subcommand};
use lottie_motion::{AnimationRequest, AnimationType, CustomEffect, MotionDefaults};
use lottie_motion_cli::{convert, server};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_LOG_FILTER: &str = "svg2lottie=info,lottie_motion_cli=info,lottie_motion=info,lottie_svg=info";

#[derive(Parser)]
#[command(name = "svg2lottie")]
#[command(about = "Turn static SVG artwork into animated Lottie JSON")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert SVG files to animated Lottie documents
    Convert {
        /// Input files: SVG markup or base64 payloads
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Animation type; defaults to `complex` when --effects is given
        #[arg(short = 't', long = "type")]
        animation_type: Option<String>,

        /// Frames per second
        #[arg(long)]
        fps: Option<u32>,

        /// Duration in frames
        #[arg(short, long)]
        duration: Option<u32>,

        /// JSON file mapping effect names to effects
        #[arg(short, long)]
        effects: Option<PathBuf>,

        /// Restrict animation to these layer ids
        #[arg(short, long)]
        layers: Vec<String>,

        /// Output file (single input) or directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List available animation types
    Types,

    /// Run the HTTP conversion service
    Serve {
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: String,

        #[arg(short, long, env = "PORT", default_value_t = 5001)]
        port: u16,

        /// Value of the Access-Control-Allow-Origin header
        #[arg(long, env = "SVG2LOTTIE_ALLOW_ORIGIN", default_value = "*")]
        allow_origin: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            inputs,
            animation_type,
            fps,
            duration,
            effects,
            layers,
            output,
            pretty,
        } => {
            let request = build_request(
                animation_type.as_deref(),
                fps,
                duration,
                effects.as_deref(),
                layers,
            )?;
            cmd_convert(&inputs, output.as_deref(), &request, pretty)
        }
        Commands::Types => cmd_types(),
        Commands::Serve {
            host,
            port,
            allow_origin,
        } => cmd_serve(&host, port, &allow_origin),
    }
}

fn build_request(
    animation_type: Option<&str>,
    fps: Option<u32>,
    duration: Option<u32>,
    effects: Option<&Path>,
    layers: Vec<String>,
) -> Result<AnimationRequest> {
    let custom_effects = effects.map(read_effects).transpose()?;
    let animation_type = match animation_type {
        Some(name) => name.parse::<AnimationType>()?,
        None if custom_effects.is_some() => AnimationType::Complex,
        None => AnimationType::default(),
    };

    let mut request = AnimationRequest::new(animation_type);
    request.fps = fps;
    request.duration = duration;
    request.custom_effects = custom_effects;
    if !layers.is_empty() {
        request.layers = Some(layers);
    }
    Ok(request)
}

fn read_effects(path: &Path) -> Result<BTreeMap<String, CustomEffect>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read effects file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid effects in {}", path.display()))
}

fn cmd_convert(
    inputs: &[PathBuf],
    output: Option<&Path>,
    request: &AnimationRequest,
    pretty: bool,
) -> Result<()> {
    let defaults = MotionDefaults::default();
    let report = convert::convert_batch(inputs, output, request, &defaults, pretty);

    for path in &report.converted {
        println!("{}", path.display());
    }
    for (input, err) in &report.failed {
        eprintln!("{}: {err:#}", input.display());
    }
    if !report.failed.is_empty() {
        bail!(
            "{} of {} conversions failed",
            report.failed.len(),
            inputs.len()
        );
    }
    info!(converted = report.converted.len(), "done");
    Ok(())
}

fn cmd_types() -> Result<()> {
    println!("Available animation types:");
    for animation_type in AnimationType::ALL {
        let marker = if animation_type == AnimationType::default() {
            " (default)"
        } else {
            ""
        };
        println!("  {animation_type}{marker}");
    }
    Ok(())
}

fn cmd_serve(host: &str, port: u16, allow_origin: &str) -> Result<()> {
    let origin = allow_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid allow-origin value '{allow_origin}'"))?;
    let state = server::AppState::new(MotionDefaults::default()).with_allow_origin(origin);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(server::serve(host, port, state))
}
