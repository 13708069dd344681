// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types for path structure, interpolation, change records and
//! edit sessions.

use thiserror::Error;

/// Structural errors raised by `PackedPath` operations.
///
/// These are always fatal to the operation that raised them; the path is
/// left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("contour index {index} out of range (path has {count} contours)")]
    ContourIndexOutOfRange { index: usize, count: usize },

    #[error("point index {index} out of range (path has {count} points)")]
    PointIndexOutOfRange { index: usize, count: usize },

    #[error("point index {index} out of range for contour {contour} ({count} points)")]
    ContourPointIndexOutOfRange {
        contour: usize,
        index: usize,
        count: usize,
    },

    #[error("coordinate count {coordinates} does not match {points} points")]
    CoordinateCount { coordinates: usize, points: usize },

    #[error("malformed contour info: {0}")]
    BadContourInfo(String),

    #[error("invalid packed point type {0:#04x}")]
    BadPointType(u8),

    #[error("point attribute count {attributes} does not match {points} points")]
    AttributeCount { attributes: usize, points: usize },
}

/// Errors raised by itemwise arithmetic on incompatible values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariationError {
    #[error("incompatible values: {0}")]
    IncompatibleValue(String),

    #[error("sequences have incompatible lengths: {0} != {1}")]
    IncompatibleLength(usize, usize),

    #[error("records have incompatible key sets: {0:?} != {1:?}")]
    IncompatibleKeys(Vec<String>, Vec<String>),

    #[error("incompatible shapes: {0}")]
    IncompatibleShape(String),
}

/// Errors raised while decoding or applying a change record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChangeError {
    #[error("unknown mutation {kind:?} at {path:?}")]
    UnknownMutation { path: Vec<String>, kind: String },

    #[error("bad arguments for {kind:?}: {reason}")]
    BadArguments { kind: String, reason: String },

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Errors reported by an edit-session collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("an edit is already in progress")]
    EditInProgress,

    #[error("no edit is open")]
    NoOpenEdit,

    #[error(transparent)]
    Change(#[from] ChangeError),

    #[error("edit rejected: {0}")]
    Rejected(String),
}

impl From<PathError> for EditError {
    fn from(err: PathError) -> Self {
        EditError::Change(ChangeError::Path(err))
    }
}
