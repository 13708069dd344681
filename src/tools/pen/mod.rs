// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Pen tool for drawing contours
//!
//! A pointer-down picks a behavior (see `select`), then the gesture is
//! streamed to an `EditContext`: the click's tentative change first, and
//! once the pointer travels past the drag threshold, the handle-shaping
//! changes. Release commits, cancel rolls back.

mod behavior;
mod select;

pub use behavior::{BehaviorKind, HandlePlan, PenBehavior};
pub use select::{AppendTarget, append_target, pen_behavior_for_click};

use crate::editing::{
    DragEvent, DragStart, EditContext, PointerEvent, Selection, UndoInfo, should_initiate_drag,
};
use crate::error::EditError;
use crate::geometry::round_point;
use crate::path::PackedPath;
use crate::settings::PenSettings;
use serde::Serialize;
use std::collections::BTreeMap;

/// What a pen tool works on: the layer's path, the current selection
/// and the layer's design-space location
#[derive(Debug, Clone, Default)]
pub struct PenScene {
    pub path: PackedPath,
    pub selection: Selection,
    pub location: BTreeMap<String, f64>,
}

impl PenScene {
    pub fn new(path: PackedPath, selection: Selection) -> Self {
        Self {
            path,
            selection,
            location: BTreeMap::new(),
        }
    }
}

/// How a gesture ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum GestureOutcome {
    /// The click did not produce an edit
    NoEdit,
    /// The edit was committed under this undo label
    Committed { label: String },
    /// The gesture was cancelled and rolled back
    Aborted,
}

/// How the event stream ended for a behavior
enum GestureEnd {
    Complete,
    Cancel,
}

/// Pen tool state
#[derive(Debug, Clone, Default)]
pub struct PenTool {
    settings: PenSettings,
}

impl PenTool {
    pub fn new(settings: PenSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PenSettings {
        &self.settings
    }

    /// Run one pointer gesture against `scene`, streaming its changes to
    /// `ctx`.
    ///
    /// `initial` is the pointer-down; `events` is everything after it. On
    /// success the scene holds the committed path and selection. On
    /// cancel or error the scene is restored and any open edit aborted.
    pub fn handle_drag(
        &self,
        scene: &mut PenScene,
        ctx: &mut impl EditContext,
        initial: PointerEvent,
        events: impl IntoIterator<Item = DragEvent>,
    ) -> Result<GestureOutcome, EditError> {
        let round = self.settings.round_anchor;
        let anchor = if round {
            round_point(initial.position())
        } else {
            initial.position()
        };
        let clicked = scene
            .path
            .hit_test(initial.position(), self.settings.click_margin)
            .map(Selection::point)
            .unwrap_or_default();
        let initial_selection = scene.selection.clone();

        let Some(mut behavior) = pen_behavior_for_click(
            &mut scene.path,
            &initial_selection,
            &clicked,
            anchor,
            self.settings.curve_type.point_type(),
            round,
        ) else {
            return Ok(GestureOutcome::NoEdit);
        };

        let mut began = false;
        let mut events = events.into_iter();
        let end = self.drive(
            &mut behavior,
            &mut scene.selection,
            ctx,
            &initial,
            &mut events,
            &mut began,
        );

        match end {
            Ok(GestureEnd::Complete) if !began => Ok(GestureOutcome::NoEdit),
            Ok(GestureEnd::Complete) => {
                let label = behavior.undo_label().to_string();
                let undo_info = UndoInfo {
                    label: label.clone(),
                    undo_selection: initial_selection.clone(),
                    redo_selection: scene.selection.clone(),
                    location: scene.location.clone(),
                };
                if let Err(err) = ctx.edit_end(&behavior.final_change(), &undo_info) {
                    tracing::warn!("Pen edit was not accepted: {err}");
                    abort_quietly(&mut behavior, ctx, began);
                    scene.selection = initial_selection;
                    return Err(err);
                }
                tracing::debug!("Pen gesture committed: {}", label);
                Ok(GestureOutcome::Committed { label })
            }
            Ok(GestureEnd::Cancel) => {
                let rollback = behavior.rollback_change();
                behavior.abort();
                scene.selection = initial_selection;
                if began {
                    ctx.edit_abort(&rollback)?;
                }
                tracing::debug!("Pen gesture cancelled");
                Ok(GestureOutcome::Aborted)
            }
            Err(err) => {
                tracing::warn!("Pen gesture failed: {err}");
                abort_quietly(&mut behavior, ctx, began);
                scene.selection = initial_selection;
                Err(err)
            }
        }
    }

    fn drive(
        &self,
        behavior: &mut PenBehavior<'_>,
        selection: &mut Selection,
        ctx: &mut impl EditContext,
        initial: &PointerEvent,
        events: &mut impl Iterator<Item = DragEvent>,
        began: &mut bool,
    ) -> Result<GestureEnd, EditError> {
        if behavior.wants_initial_change() {
            *selection = behavior.selection().clone();
            ctx.edit_begin()?;
            *began = true;
            ctx.edit_set_rollback(&behavior.rollback_change())?;
            ctx.edit_incremental(&behavior.initial_change())?;
        }

        if !behavior.wants_drag() {
            for event in events {
                match event {
                    DragEvent::Move(_) => {}
                    DragEvent::Release(_) => return Ok(GestureEnd::Complete),
                    DragEvent::Cancel => return Ok(GestureEnd::Cancel),
                }
            }
            return Ok(GestureEnd::Cancel);
        }

        let first = match should_initiate_drag(initial, events, self.settings.drag_threshold) {
            DragStart::Dragging(pointer) => pointer,
            DragStart::Released(_) => return Ok(GestureEnd::Complete),
            DragStart::Cancelled => return Ok(GestureEnd::Cancel),
        };

        // the click's change is replaced by the drag setup; undo it on the
        // collaborator's side before streaming the new initial change
        let previous_rollback = behavior.rollback_change();
        behavior.start_dragging()?;
        *selection = behavior.selection().clone();
        if *began {
            ctx.edit_incremental(&previous_rollback)?;
        } else {
            ctx.edit_begin()?;
            *began = true;
        }
        ctx.edit_set_rollback(&behavior.rollback_change())?;
        ctx.edit_incremental(&behavior.initial_change())?;
        let change = behavior.incremental_change(first.position(), first.modifiers.shift)?;
        ctx.edit_incremental_may_drop(&change)?;

        for event in events {
            match event {
                DragEvent::Move(pointer) => {
                    let change =
                        behavior.incremental_change(pointer.position(), pointer.modifiers.shift)?;
                    ctx.edit_incremental_may_drop(&change)?;
                }
                DragEvent::Release(pointer) => {
                    let change =
                        behavior.incremental_change(pointer.position(), pointer.modifiers.shift)?;
                    ctx.edit_incremental(&change)?;
                    return Ok(GestureEnd::Complete);
                }
                DragEvent::Cancel => return Ok(GestureEnd::Cancel),
            }
        }
        Ok(GestureEnd::Cancel)
    }
}

/// Roll back the behavior and any open edit after a failure
fn abort_quietly(behavior: &mut PenBehavior<'_>, ctx: &mut impl EditContext, began: bool) {
    let rollback = behavior.rollback_change();
    behavior.abort();
    if began {
        if let Err(err) = ctx.edit_abort(&rollback) {
            tracing::warn!("Failed to abort pen edit: {err}");
        }
    }
}
