// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Glyphpen: packed glyph outlines, interpolation algebra, change records
//! and pen-tool edit behaviors for font editors

use anyhow::{Context, bail};
use std::path::PathBuf;

pub mod changes;
pub mod editing;
pub mod error;
pub mod geometry;
pub mod path;
pub mod replay;
pub mod settings;
pub mod tools;
pub mod variation;

pub use changes::{Change, ChangeRecord, PathChangeRecorder, PathEdit};
pub use editing::{DragEvent, EditContext, LocalEditContext, PointerEvent, Selection, UndoInfo};
pub use error::{ChangeError, EditError, PathError, VariationError};
pub use path::{PackedPath, PathPoint, PointType};
pub use settings::PenSettings;
pub use tools::{GestureOutcome, PenScene, PenTool};

const USAGE: &str = "Usage: glyphpen <path.json> <gesture.json> [--settings pen.toml]";

/// Entry point for the replay binary
pub fn run() -> anyhow::Result<()> {
    // Initialize tracing subscriber (can be controlled via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("glyphpen=info".parse().context("bad log directive")?),
        )
        .init();

    let args = Args::parse(std::env::args().skip(1))?;

    let settings = match &args.settings {
        Some(file) => {
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("reading settings {}", file.display()))?;
            PenSettings::from_toml_str(&text)
                .with_context(|| format!("parsing settings {}", file.display()))?
        }
        None => PenSettings::default(),
    };

    let path_text = std::fs::read_to_string(&args.path)
        .with_context(|| format!("reading path {}", args.path.display()))?;
    let path: PackedPath = serde_json::from_str(&path_text)
        .with_context(|| format!("parsing path {}", args.path.display()))?;

    let script_text = std::fs::read_to_string(&args.gesture)
        .with_context(|| format!("reading gesture {}", args.gesture.display()))?;
    let script: replay::GestureScript = serde_json::from_str(&script_text)
        .with_context(|| format!("parsing gesture {}", args.gesture.display()))?;

    tracing::info!(
        "Replaying {} on a path of {} points",
        args.gesture.display(),
        path.num_points()
    );
    let report = replay::replay(&PenTool::new(settings), path, script).context("gesture failed")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Command-line arguments
#[derive(Debug, PartialEq)]
struct Args {
    path: PathBuf,
    gesture: PathBuf,
    settings: Option<PathBuf>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut positional = Vec::new();
        let mut settings = None;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--settings" {
                let file = args.next().context("--settings needs a file")?;
                settings = Some(PathBuf::from(file));
            } else {
                positional.push(PathBuf::from(arg));
            }
        }
        let [path, gesture] = <[PathBuf; 2]>::try_from(positional).ok().context(USAGE)?;
        if path == gesture {
            bail!("path and gesture must be different files");
        }
        Ok(Self {
            path,
            gesture,
            settings,
        })
    }
}
