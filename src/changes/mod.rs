// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Replayable change records.
//!
//! A `PathEdit` is one typed, reversible mutation of a packed path. On the
//! wire it becomes a `Change`: a selector naming the field, a mutation
//! kind and a list of JSON arguments, so an independently held copy of the
//! path can replay it. Edits are recorded through `PathChangeRecorder`,
//! which also captures the inverse of every edit.

mod recorder;

pub use recorder::PathChangeRecorder;

use crate::error::{ChangeError, PathError};
use crate::path::{Attrs, Contour, PackedPath, PathPoint};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;

const PATH: &str = "path";
const POINT_TYPES: &str = "pointTypes";
const POINT_ATTRIBUTES: &str = "pointAttributes";
const CONTOUR_INFO: &str = "contourInfo";
const IS_CLOSED: &str = "isClosed";

const SET: &str = "=";
const SET_XY: &str = "=xy";
const INSERT_POINT: &str = "insertPoint";
const DELETE_POINT: &str = "deletePoint";
const INSERT_CONTOUR: &str = "insertContour";
const DELETE_CONTOUR: &str = "deleteContour";

// ============================================================================
// WIRE FORMAT
// ============================================================================

/// One mutation in wire form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub path_selector: Vec<String>,
    pub mutation_kind: String,
    pub arguments: Vec<Value>,
}

impl Change {
    fn new(path_selector: &[&str], mutation_kind: &str, arguments: Vec<Value>) -> Self {
        Self {
            path_selector: path_selector.iter().map(|s| s.to_string()).collect(),
            mutation_kind: mutation_kind.to_string(),
            arguments,
        }
    }

    /// Apply this change to a path
    pub fn apply(&self, path: &mut PackedPath) -> Result<(), ChangeError> {
        PathEdit::from_change(self)?.apply(path)?;
        Ok(())
    }
}

/// An ordered list of changes, applied front to back.
///
/// Serializes as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeRecord(Vec<Change>);

impl ChangeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire form of a list of edits, in the given order
    pub fn from_edits<'a>(edits: impl IntoIterator<Item = &'a PathEdit>) -> Self {
        Self(edits.into_iter().map(PathEdit::to_change).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn changes(&self) -> &[Change] {
        &self.0
    }

    /// Decode every change into a typed edit
    pub fn to_edits(&self) -> Result<Vec<PathEdit>, ChangeError> {
        self.0.iter().map(PathEdit::from_change).collect()
    }

    /// Apply all changes in order. Either every change applies or the path
    /// is left untouched.
    pub fn apply(&self, path: &mut PackedPath) -> Result<(), ChangeError> {
        let mut scratch = path.clone();
        for change in &self.0 {
            change.apply(&mut scratch)?;
        }
        *path = scratch;
        Ok(())
    }
}

impl From<Vec<Change>> for ChangeRecord {
    fn from(changes: Vec<Change>) -> Self {
        Self(changes)
    }
}

// ============================================================================
// TYPED EDITS
// ============================================================================

/// A single reversible path mutation
#[derive(Debug, Clone, PartialEq)]
pub enum PathEdit {
    SetPointPosition { index: usize, x: f64, y: f64 },
    /// Set the packed type byte (type plus smooth flag)
    SetPointType { index: usize, point_type: u8 },
    SetPointAttrs { index: usize, attrs: Option<Attrs> },
    InsertPoint { contour: usize, point: usize, value: PathPoint },
    DeletePoint { contour: usize, point: usize },
    InsertContour { index: usize, contour: Contour },
    DeleteContour { index: usize },
    OpenCloseContour { index: usize, is_closed: bool },
}

/// The field a non-structural edit writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FieldKey {
    Position(usize),
    Type(usize),
    Attrs(usize),
    Closed(usize),
}

impl PathEdit {
    /// Apply to a path. On error the path is unchanged.
    pub fn apply(&self, path: &mut PackedPath) -> Result<(), PathError> {
        match self {
            PathEdit::SetPointPosition { index, x, y } => path.set_point_position(*index, *x, *y),
            PathEdit::SetPointType { index, point_type } => {
                path.set_packed_point_type(*index, *point_type)
            }
            PathEdit::SetPointAttrs { index, attrs } => path.set_point_attrs(*index, attrs.clone()),
            PathEdit::InsertPoint {
                contour,
                point,
                value,
            } => path.insert_point(*contour, *point, value),
            PathEdit::DeletePoint { contour, point } => {
                path.delete_point(*contour, *point).map(|_| ())
            }
            PathEdit::InsertContour { index, contour } => path.insert_contour(*index, contour),
            PathEdit::DeleteContour { index } => path.delete_contour(*index).map(|_| ()),
            PathEdit::OpenCloseContour { index, is_closed } => {
                path.open_close_contour(*index, *is_closed).map(|_| ())
            }
        }
    }

    /// The edit that undoes this one, computed against the path as it is
    /// before this edit is applied
    pub fn inverse(&self, path: &PackedPath) -> Result<PathEdit, PathError> {
        Ok(match self {
            PathEdit::SetPointPosition { index, .. } => {
                let p = path.point_position(*index)?;
                PathEdit::SetPointPosition {
                    index: *index,
                    x: p.x,
                    y: p.y,
                }
            }
            PathEdit::SetPointType { index, .. } => PathEdit::SetPointType {
                index: *index,
                point_type: path.packed_point_type(*index)?,
            },
            PathEdit::SetPointAttrs { index, .. } => PathEdit::SetPointAttrs {
                index: *index,
                attrs: path.point_attrs(*index)?,
            },
            PathEdit::InsertPoint { contour, point, .. } => {
                path.absolute_point_index(*contour, *point, true)?;
                PathEdit::DeletePoint {
                    contour: *contour,
                    point: *point,
                }
            }
            PathEdit::DeletePoint { contour, point } => PathEdit::InsertPoint {
                contour: *contour,
                point: *point,
                value: path.contour_point(*contour, *point)?,
            },
            PathEdit::InsertContour { index, .. } => {
                path.contour_start_point(*index)?;
                PathEdit::DeleteContour { index: *index }
            }
            PathEdit::DeleteContour { index } => PathEdit::InsertContour {
                index: *index,
                contour: path.contour(*index)?,
            },
            PathEdit::OpenCloseContour { index, .. } => PathEdit::OpenCloseContour {
                index: *index,
                is_closed: path.is_contour_closed(*index)?,
            },
        })
    }

    fn field_key(&self) -> Option<FieldKey> {
        match self {
            PathEdit::SetPointPosition { index, .. } => Some(FieldKey::Position(*index)),
            PathEdit::SetPointType { index, .. } => Some(FieldKey::Type(*index)),
            PathEdit::SetPointAttrs { index, .. } => Some(FieldKey::Attrs(*index)),
            PathEdit::OpenCloseContour { index, .. } => Some(FieldKey::Closed(*index)),
            _ => None,
        }
    }

    /// Whether this edit inserts or removes points or contours
    pub fn is_structural(&self) -> bool {
        self.field_key().is_none()
    }

    /// Wire form
    pub fn to_change(&self) -> Change {
        match self {
            PathEdit::SetPointPosition { index, x, y } => {
                Change::new(&[PATH], SET_XY, vec![json!(index), json!(x), json!(y)])
            }
            PathEdit::SetPointType { index, point_type } => {
                Change::new(&[PATH, POINT_TYPES], SET, vec![json!(index), json!(point_type)])
            }
            PathEdit::SetPointAttrs { index, attrs } => Change::new(
                &[PATH, POINT_ATTRIBUTES],
                SET,
                vec![json!(index), json!(attrs)],
            ),
            PathEdit::InsertPoint {
                contour,
                point,
                value,
            } => Change::new(
                &[PATH],
                INSERT_POINT,
                vec![json!(contour), json!(point), json!(value)],
            ),
            PathEdit::DeletePoint { contour, point } => {
                Change::new(&[PATH], DELETE_POINT, vec![json!(contour), json!(point)])
            }
            PathEdit::InsertContour { index, contour } => {
                Change::new(&[PATH], INSERT_CONTOUR, vec![json!(index), json!(contour)])
            }
            PathEdit::DeleteContour { index } => {
                Change::new(&[PATH], DELETE_CONTOUR, vec![json!(index)])
            }
            PathEdit::OpenCloseContour { index, is_closed } => Change::new(
                &[PATH, CONTOUR_INFO, &index.to_string()],
                SET,
                vec![json!(IS_CLOSED), json!(is_closed)],
            ),
        }
    }

    /// Decode a wire change
    pub fn from_change(change: &Change) -> Result<PathEdit, ChangeError> {
        let args = Args::new(change);
        let selector: Vec<&str> = change.path_selector.iter().map(String::as_str).collect();
        match (selector.as_slice(), change.mutation_kind.as_str()) {
            ([PATH], SET_XY) => {
                args.expect_len(3)?;
                Ok(PathEdit::SetPointPosition {
                    index: args.index(0)?,
                    x: args.number(1)?,
                    y: args.number(2)?,
                })
            }
            ([PATH, POINT_TYPES], SET) => {
                args.expect_len(2)?;
                let byte = args.index(1)?;
                Ok(PathEdit::SetPointType {
                    index: args.index(0)?,
                    point_type: u8::try_from(byte)
                        .map_err(|_| args.bad(format!("point type {byte} out of range")))?,
                })
            }
            ([PATH, POINT_ATTRIBUTES], SET) => {
                args.expect_len(2)?;
                Ok(PathEdit::SetPointAttrs {
                    index: args.index(0)?,
                    attrs: args.decode(1)?,
                })
            }
            ([PATH], INSERT_POINT) => {
                args.expect_len(3)?;
                Ok(PathEdit::InsertPoint {
                    contour: args.index(0)?,
                    point: args.index(1)?,
                    value: args.decode(2)?,
                })
            }
            ([PATH], DELETE_POINT) => {
                args.expect_len(2)?;
                Ok(PathEdit::DeletePoint {
                    contour: args.index(0)?,
                    point: args.index(1)?,
                })
            }
            ([PATH], INSERT_CONTOUR) => {
                args.expect_len(2)?;
                Ok(PathEdit::InsertContour {
                    index: args.index(0)?,
                    contour: args.decode(1)?,
                })
            }
            ([PATH], DELETE_CONTOUR) => {
                args.expect_len(1)?;
                Ok(PathEdit::DeleteContour {
                    index: args.index(0)?,
                })
            }
            ([PATH, CONTOUR_INFO, index], SET) => {
                args.expect_len(2)?;
                if args.values[0] != json!(IS_CLOSED) {
                    return Err(args.bad("only isClosed can be set on contour info".into()));
                }
                let index = index
                    .parse()
                    .map_err(|_| args.bad(format!("bad contour index {index:?}")))?;
                let is_closed = args.values[1]
                    .as_bool()
                    .ok_or_else(|| args.bad("isClosed must be a boolean".into()))?;
                Ok(PathEdit::OpenCloseContour { index, is_closed })
            }
            _ => Err(ChangeError::UnknownMutation {
                path: change.path_selector.clone(),
                kind: change.mutation_kind.clone(),
            }),
        }
    }
}

/// Argument accessors that report `BadArguments` with the mutation kind
struct Args<'a> {
    kind: &'a str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    fn new(change: &'a Change) -> Self {
        Self {
            kind: &change.mutation_kind,
            values: &change.arguments,
        }
    }

    fn bad(&self, reason: String) -> ChangeError {
        ChangeError::BadArguments {
            kind: self.kind.to_string(),
            reason,
        }
    }

    fn expect_len(&self, len: usize) -> Result<(), ChangeError> {
        if self.values.len() != len {
            return Err(self.bad(format!(
                "expected {len} arguments, got {}",
                self.values.len()
            )));
        }
        Ok(())
    }

    fn index(&self, i: usize) -> Result<usize, ChangeError> {
        self.values[i]
            .as_u64()
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| self.bad(format!("argument {i} is not an index")))
    }

    fn number(&self, i: usize) -> Result<f64, ChangeError> {
        self.values[i]
            .as_f64()
            .ok_or_else(|| self.bad(format!("argument {i} is not a number")))
    }

    fn decode<T: serde::de::DeserializeOwned>(&self, i: usize) -> Result<T, ChangeError> {
        serde_json::from_value(self.values[i].clone())
            .map_err(|err| self.bad(format!("argument {i}: {err}")))
    }
}

// ============================================================================
// CONSOLIDATION
// ============================================================================

/// Merge repeated writes to the same field, keeping the last value.
///
/// Only writes not separated by a structural edit are merged, since a
/// structural edit renumbers the fields after it. The merged edit keeps
/// the position of the first write; the final state is unchanged.
pub fn consolidate(edits: impl IntoIterator<Item = PathEdit>) -> Vec<PathEdit> {
    let mut result: Vec<PathEdit> = Vec::new();
    let mut slots: HashMap<FieldKey, usize> = HashMap::new();
    for edit in edits {
        match edit.field_key() {
            Some(key) => match slots.get(&key) {
                Some(&slot) => result[slot] = edit,
                None => {
                    slots.insert(key, result.len());
                    result.push(edit);
                }
            },
            None => {
                slots.clear();
                result.push(edit);
            }
        }
    }
    result
}

/// Rollback edits recorded in application order, reversed for replay
/// and consolidated
pub fn rollback_record(rollback: &[PathEdit]) -> ChangeRecord {
    ChangeRecord::from_edits(&consolidate(rollback.iter().rev().cloned()))
}

/// Forward edits consolidated into a record
pub fn forward_record(edits: &[PathEdit]) -> ChangeRecord {
    ChangeRecord::from_edits(&consolidate(edits.iter().cloned()))
}
