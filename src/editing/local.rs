// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! In-memory edit context with an undo stack.
//!
//! `LocalEditContext` keeps its own copy of the path and applies every
//! change record it receives, the way a remote collaborator would. On
//! `edit_end` it checks that the final change reproduces the streamed
//! state and that the rollback restores the pre-edit state.

use super::{EditContext, UndoInfo};
use crate::changes::ChangeRecord;
use crate::error::EditError;
use crate::path::PackedPath;
use serde::Serialize;

/// A message received by the context, in arrival order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "message", rename_all = "camelCase")]
pub enum EditMessage {
    Begin,
    SetRollback {
        change: ChangeRecord,
    },
    #[serde(rename_all = "camelCase")]
    Incremental {
        change: ChangeRecord,
        may_drop: bool,
    },
    #[serde(rename_all = "camelCase")]
    End {
        change: ChangeRecord,
        undo_info: UndoInfo,
    },
    Abort {
        rollback: ChangeRecord,
    },
}

/// A committed edit
#[derive(Debug, Clone)]
struct UndoRecord {
    change: ChangeRecord,
    rollback: ChangeRecord,
    info: UndoInfo,
}

#[derive(Debug, Clone)]
struct OpenEdit {
    start: PackedPath,
    rollback: ChangeRecord,
}

#[derive(Debug, Clone, Default)]
pub struct LocalEditContext {
    path: PackedPath,
    open: Option<OpenEdit>,
    undo_stack: Vec<UndoRecord>,
    redo_stack: Vec<UndoRecord>,
    messages: Vec<EditMessage>,
}

impl LocalEditContext {
    pub fn new(path: PackedPath) -> Self {
        Self {
            path,
            ..Default::default()
        }
    }

    /// The context's copy of the path
    pub fn path(&self) -> &PackedPath {
        &self.path
    }

    pub fn is_editing(&self) -> bool {
        self.open.is_some()
    }

    /// Every message received so far
    pub fn messages(&self) -> &[EditMessage] {
        &self.messages
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn open_edit(&mut self) -> Result<&mut OpenEdit, EditError> {
        self.open.as_mut().ok_or(EditError::NoOpenEdit)
    }

    /// Revert the last committed edit, returning its undo info
    pub fn undo(&mut self) -> Result<Option<UndoInfo>, EditError> {
        if self.open.is_some() {
            return Err(EditError::EditInProgress);
        }
        let Some(record) = self.undo_stack.pop() else {
            return Ok(None);
        };
        if let Err(err) = record.rollback.apply(&mut self.path) {
            self.undo_stack.push(record);
            return Err(err.into());
        }
        tracing::debug!("Undo: {}", record.info.label);
        let info = record.info.clone();
        self.redo_stack.push(record);
        Ok(Some(info))
    }

    /// Reapply the last undone edit, returning its undo info
    pub fn redo(&mut self) -> Result<Option<UndoInfo>, EditError> {
        if self.open.is_some() {
            return Err(EditError::EditInProgress);
        }
        let Some(record) = self.redo_stack.pop() else {
            return Ok(None);
        };
        if let Err(err) = record.change.apply(&mut self.path) {
            self.redo_stack.push(record);
            return Err(err.into());
        }
        tracing::debug!("Redo: {}", record.info.label);
        let info = record.info.clone();
        self.undo_stack.push(record);
        Ok(Some(info))
    }
}

impl EditContext for LocalEditContext {
    fn edit_begin(&mut self) -> Result<(), EditError> {
        if self.open.is_some() {
            return Err(EditError::EditInProgress);
        }
        self.open = Some(OpenEdit {
            start: self.path.clone(),
            rollback: ChangeRecord::new(),
        });
        self.messages.push(EditMessage::Begin);
        Ok(())
    }

    fn edit_set_rollback(&mut self, rollback: &ChangeRecord) -> Result<(), EditError> {
        self.open_edit()?.rollback = rollback.clone();
        self.messages.push(EditMessage::SetRollback {
            change: rollback.clone(),
        });
        Ok(())
    }

    fn edit_incremental(&mut self, change: &ChangeRecord) -> Result<(), EditError> {
        self.open_edit()?;
        change.apply(&mut self.path)?;
        self.messages.push(EditMessage::Incremental {
            change: change.clone(),
            may_drop: false,
        });
        Ok(())
    }

    fn edit_incremental_may_drop(&mut self, change: &ChangeRecord) -> Result<(), EditError> {
        self.open_edit()?;
        change.apply(&mut self.path)?;
        self.messages.push(EditMessage::Incremental {
            change: change.clone(),
            may_drop: true,
        });
        Ok(())
    }

    fn edit_end(&mut self, change: &ChangeRecord, undo_info: &UndoInfo) -> Result<(), EditError> {
        let open = self.open.as_ref().ok_or(EditError::NoOpenEdit)?;
        let mut committed = open.start.clone();
        change.apply(&mut committed)?;
        if committed != self.path {
            return Err(EditError::Rejected(
                "final change does not reproduce the incremental state".into(),
            ));
        }
        let mut restored = committed.clone();
        open.rollback.apply(&mut restored)?;
        if restored != open.start {
            return Err(EditError::Rejected(
                "rollback does not restore the pre-edit state".into(),
            ));
        }

        let rollback = open.rollback.clone();
        self.open = None;
        self.undo_stack.push(UndoRecord {
            change: change.clone(),
            rollback,
            info: undo_info.clone(),
        });
        self.redo_stack.clear();
        self.messages.push(EditMessage::End {
            change: change.clone(),
            undo_info: undo_info.clone(),
        });
        tracing::debug!("Committed edit: {}", undo_info.label);
        Ok(())
    }

    fn edit_abort(&mut self, rollback: &ChangeRecord) -> Result<(), EditError> {
        let open = self.open.take().ok_or(EditError::NoOpenEdit)?;
        let result = rollback.apply(&mut self.path);
        if result.is_err() || self.path != open.start {
            tracing::warn!("Abort rollback did not restore the path, resetting");
            self.path = open.start;
        }
        self.messages.push(EditMessage::Abort {
            rollback: rollback.clone(),
        });
        result.map_err(EditError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::{PathEdit, forward_record, rollback_record};
    use crate::editing::Selection;
    use crate::path::tests::two_contour_path;

    fn move_point_zero(path: &PackedPath) -> (ChangeRecord, ChangeRecord) {
        let edit = PathEdit::SetPointPosition {
            index: 0,
            x: 3.0,
            y: 4.0,
        };
        let inverse = edit.inverse(path).unwrap();
        (forward_record(&[edit]), rollback_record(&[inverse]))
    }

    fn info(label: &str) -> UndoInfo {
        UndoInfo {
            label: label.into(),
            undo_selection: Selection::point(0),
            redo_selection: Selection::point(0),
            location: Default::default(),
        }
    }

    #[test]
    fn commit_then_undo_and_redo() {
        let original = two_contour_path();
        let mut ctx = LocalEditContext::new(original.clone());
        let (change, rollback) = move_point_zero(&original);

        ctx.edit_begin().unwrap();
        ctx.edit_set_rollback(&rollback).unwrap();
        ctx.edit_incremental(&change).unwrap();
        ctx.edit_end(&change, &info("move")).unwrap();
        assert!(!ctx.is_editing());
        let moved = ctx.path().clone();
        assert_ne!(moved, original);

        assert_eq!(ctx.undo().unwrap().unwrap().label, "move");
        assert_eq!(ctx.path(), &original);
        ctx.redo().unwrap();
        assert_eq!(ctx.path(), &moved);
        assert_eq!(ctx.messages().len(), 4);
    }

    #[test]
    fn second_begin_is_rejected() {
        let mut ctx = LocalEditContext::new(two_contour_path());
        ctx.edit_begin().unwrap();
        assert_eq!(ctx.edit_begin(), Err(EditError::EditInProgress));
        assert_eq!(ctx.undo(), Err(EditError::EditInProgress));
    }

    #[test]
    fn calls_without_begin_fail() {
        let mut ctx = LocalEditContext::new(two_contour_path());
        let empty = ChangeRecord::new();
        assert_eq!(ctx.edit_incremental(&empty), Err(EditError::NoOpenEdit));
        assert_eq!(ctx.edit_end(&empty, &UndoInfo::default()), Err(EditError::NoOpenEdit));
    }

    #[test]
    fn end_rejects_mismatched_final_change() {
        let original = two_contour_path();
        let mut ctx = LocalEditContext::new(original.clone());
        let (change, rollback) = move_point_zero(&original);
        ctx.edit_begin().unwrap();
        ctx.edit_set_rollback(&rollback).unwrap();
        ctx.edit_incremental(&change).unwrap();
        let result = ctx.edit_end(&ChangeRecord::new(), &info("nothing"));
        assert!(matches!(result, Err(EditError::Rejected(_))));
        assert!(ctx.is_editing());

        ctx.edit_abort(&rollback).unwrap();
        assert_eq!(ctx.path(), &original);
        assert!(!ctx.can_undo());
    }
}
