// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Editing model and interaction
//!
//! Tools do not own the glyph's undo history or its transport. They talk
//! to an `EditContext`, which receives the change records of one edit in a
//! fixed order: begin, set rollback, zero or more incremental changes,
//! then either end (with the final change and undo info) or abort.

mod drag;
mod local;
mod selection;

pub use drag::{DragEvent, DragStart, Modifiers, PointerEvent, should_initiate_drag};
pub use local::{EditMessage, LocalEditContext};
pub use selection::{Selection, point_key};

use crate::changes::ChangeRecord;
use crate::error::EditError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Undo descriptor committed with a final change
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoInfo {
    pub label: String,
    pub undo_selection: Selection,
    pub redo_selection: Selection,
    /// Design-space location of the edited layer
    #[serde(default)]
    pub location: BTreeMap<String, f64>,
}

/// The edit-session collaborator a tool streams its changes to
pub trait EditContext {
    /// Open an edit. Fails while another edit is open.
    fn edit_begin(&mut self) -> Result<(), EditError>;

    /// Replace the rollback for the open edit
    fn edit_set_rollback(&mut self, rollback: &ChangeRecord) -> Result<(), EditError>;

    fn edit_incremental(&mut self, change: &ChangeRecord) -> Result<(), EditError>;

    /// Best-effort incremental change; a collaborator may coalesce or drop it
    fn edit_incremental_may_drop(&mut self, change: &ChangeRecord) -> Result<(), EditError> {
        self.edit_incremental(change)
    }

    /// Commit the edit. `Ok` confirms the final change was accepted.
    fn edit_end(&mut self, change: &ChangeRecord, undo_info: &UndoInfo) -> Result<(), EditError>;

    /// Close the edit without committing, reverting with `rollback`
    fn edit_abort(&mut self, rollback: &ChangeRecord) -> Result<(), EditError> {
        self.edit_incremental(rollback)
    }
}
