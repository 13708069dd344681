// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Scripted pen gestures.
//!
//! A gesture script is a JSON document describing one pointer gesture:
//!
//! ```json
//! {
//!   "selection": ["point/1"],
//!   "down": {"x": 20, "y": 0},
//!   "events": [
//!     {"type": "move", "x": 20, "y": 10},
//!     {"type": "release", "x": 20, "y": 30}
//!   ],
//!   "location": {"wght": 400}
//! }
//! ```

use crate::editing::{DragEvent, EditMessage, LocalEditContext, PointerEvent, Selection};
use crate::error::EditError;
use crate::path::PackedPath;
use crate::tools::{GestureOutcome, PenScene, PenTool};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct GestureScript {
    #[serde(default)]
    pub selection: Selection,
    pub down: PointerEvent,
    #[serde(default)]
    pub events: Vec<DragEvent>,
    #[serde(default)]
    pub location: BTreeMap<String, f64>,
}

/// Everything a replayed gesture produced
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    #[serde(flatten)]
    pub outcome: GestureOutcome,
    pub messages: Vec<EditMessage>,
    pub selection: Selection,
    pub path: PackedPath,
}

/// Run `script` with `tool` on `path`, against a fresh local edit context
pub fn replay(tool: &PenTool, path: PackedPath, script: GestureScript) -> Result<ReplayReport, EditError> {
    let mut ctx = LocalEditContext::new(path.clone());
    let mut scene = PenScene {
        path,
        selection: script.selection,
        location: script.location,
    };
    tracing::debug!("Replaying gesture with {} events", script.events.len());
    let outcome = tool.handle_drag(&mut scene, &mut ctx, script.down, script.events)?;
    if ctx.path() != &scene.path {
        tracing::warn!("Edit context diverged from the tool's path");
    }
    Ok(ReplayReport {
        outcome,
        messages: ctx.messages().to_vec(),
        selection: scene.selection,
        path: scene.path,
    })
}
