// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Recording path mutations as forward and rollback edits.

use super::PathEdit;
use crate::error::PathError;
use crate::path::{Attrs, Contour, PackedPath, PathPoint, PointType};
use kurbo::Point;

/// Applies edits to a path while recording them.
///
/// Every successful operation appends the forward edit to `edits` and,
/// when a rollback list is given, the inverse edit to `rollback`. Rollback
/// edits are stored in application order; replay them in reverse to undo.
/// A failed operation records nothing and leaves the path unchanged.
pub struct PathChangeRecorder<'a> {
    path: &'a mut PackedPath,
    rollback: Option<&'a mut Vec<PathEdit>>,
    edits: &'a mut Vec<PathEdit>,
}

impl<'a> PathChangeRecorder<'a> {
    pub fn new(
        path: &'a mut PackedPath,
        rollback: Option<&'a mut Vec<PathEdit>>,
        edits: &'a mut Vec<PathEdit>,
    ) -> Self {
        Self {
            path,
            rollback,
            edits,
        }
    }

    /// The path as modified so far
    pub fn path(&self) -> &PackedPath {
        self.path
    }

    /// Apply and record a single edit
    pub fn record(&mut self, edit: PathEdit) -> Result<(), PathError> {
        let inverse = edit.inverse(self.path)?;
        edit.apply(self.path)?;
        tracing::trace!("Recorded path edit: {:?}", edit);
        if let Some(rollback) = self.rollback.as_deref_mut() {
            rollback.push(inverse);
        }
        self.edits.push(edit);
        Ok(())
    }

    pub fn set_point_position(&mut self, index: usize, point: Point) -> Result<(), PathError> {
        self.record(PathEdit::SetPointPosition {
            index,
            x: point.x,
            y: point.y,
        })
    }

    pub fn set_point_type(
        &mut self,
        index: usize,
        typ: PointType,
        smooth: bool,
    ) -> Result<(), PathError> {
        self.record(PathEdit::SetPointType {
            index,
            point_type: typ.pack(smooth),
        })
    }

    pub fn set_point_attrs(&mut self, index: usize, attrs: Option<Attrs>) -> Result<(), PathError> {
        self.record(PathEdit::SetPointAttrs { index, attrs })
    }

    /// Overwrite a point's position, type and attributes
    pub fn set_point(&mut self, index: usize, point: &PathPoint) -> Result<(), PathError> {
        self.path.point(index)?;
        self.set_point_position(index, point.position())?;
        self.set_point_type(index, point.typ, point.smooth)?;
        self.set_point_attrs(index, point.attrs.clone())
    }

    pub fn insert_point(
        &mut self,
        contour: usize,
        point: usize,
        value: PathPoint,
    ) -> Result<(), PathError> {
        self.record(PathEdit::InsertPoint {
            contour,
            point,
            value,
        })
    }

    pub fn append_point(&mut self, contour: usize, value: PathPoint) -> Result<(), PathError> {
        let point = self.path.num_points_of_contour(contour)?;
        self.insert_point(contour, point, value)
    }

    pub fn delete_point(&mut self, contour: usize, point: usize) -> Result<(), PathError> {
        self.record(PathEdit::DeletePoint { contour, point })
    }

    pub fn insert_contour(&mut self, index: usize, contour: Contour) -> Result<(), PathError> {
        contour.validate()?;
        self.record(PathEdit::InsertContour { index, contour })
    }

    pub fn append_contour(&mut self, contour: Contour) -> Result<(), PathError> {
        self.insert_contour(self.path.num_contours(), contour)
    }

    pub fn delete_contour(&mut self, index: usize) -> Result<(), PathError> {
        self.record(PathEdit::DeleteContour { index })
    }

    /// Replace a contour (recorded as delete plus insert)
    pub fn set_contour(&mut self, index: usize, contour: Contour) -> Result<(), PathError> {
        contour.validate()?;
        self.path.contour_range(index)?;
        self.delete_contour(index)?;
        self.insert_contour(index, contour)
    }

    pub fn open_close_contour(&mut self, index: usize, is_closed: bool) -> Result<(), PathError> {
        self.record(PathEdit::OpenCloseContour { index, is_closed })
    }

    pub fn delete_n_trailing_contours(&mut self, count: usize) -> Result<(), PathError> {
        let num_contours = self.path.num_contours();
        if count > num_contours {
            return Err(PathError::ContourIndexOutOfRange {
                index: count,
                count: num_contours,
            });
        }
        for index in (num_contours - count..num_contours).rev() {
            self.delete_contour(index)?;
        }
        Ok(())
    }

    /// Append every contour of `other`
    pub fn append_path(&mut self, other: &PackedPath) -> Result<(), PathError> {
        for index in 0..other.num_contours() {
            self.append_contour(other.contour(index)?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::{ChangeRecord, forward_record, rollback_record};
    use crate::path::tests::two_contour_path;

    #[test]
    fn rollback_after_forward_restores_path() {
        let original = two_contour_path();
        let mut path = original.clone();
        let mut rollback = Vec::new();
        let mut edits = Vec::new();
        {
            let mut recorder = PathChangeRecorder::new(&mut path, Some(&mut rollback), &mut edits);
            recorder
                .insert_point(0, 2, PathPoint::smooth(Point::new(20.0, 5.0)))
                .unwrap();
            recorder.set_point_position(0, Point::new(-3.0, 4.0)).unwrap();
            recorder
                .set_point_type(1, PointType::OffCurveCubic, false)
                .unwrap();
            recorder.open_close_contour(0, true).unwrap();
            recorder.delete_point(1, 1).unwrap();
            recorder.append_path(&original).unwrap();
            recorder.set_contour(0, Contour::empty()).unwrap();
        }
        assert_eq!(edits.len(), rollback.len());

        // forward record replays on an independent copy
        let mut copy = original.clone();
        forward_record(&edits).apply(&mut copy).unwrap();
        assert_eq!(copy, path);

        rollback_record(&rollback).apply(&mut path).unwrap();
        assert_eq!(path, original);
    }

    #[test]
    fn failed_operation_records_nothing() {
        let original = two_contour_path();
        let mut path = original.clone();
        let mut rollback = Vec::new();
        let mut edits = Vec::new();
        let mut recorder = PathChangeRecorder::new(&mut path, Some(&mut rollback), &mut edits);
        assert!(recorder.delete_point(0, 7).is_err());
        assert!(recorder.set_point(9, &PathPoint::on_curve(Point::ZERO)).is_err());
        assert!(recorder.delete_n_trailing_contours(3).is_err());
        drop(recorder);
        assert!(edits.is_empty() && rollback.is_empty());
        assert_eq!(path, original);
    }

    #[test]
    fn incremental_scope_without_rollback() {
        let mut path = two_contour_path();
        let mut edits = Vec::new();
        let mut recorder = PathChangeRecorder::new(&mut path, None, &mut edits);
        recorder.set_point_position(1, Point::new(11.0, 1.0)).unwrap();
        recorder.set_point_position(1, Point::new(12.0, 2.0)).unwrap();
        drop(recorder);
        let record = forward_record(&edits);
        assert_eq!(record.len(), 1);
        assert_eq!(record, ChangeRecord::from_edits(&edits[1..]));
    }

    #[test]
    fn trailing_contours_deleted_last_first() {
        let original = two_contour_path();
        let mut path = original.clone();
        let mut rollback = Vec::new();
        let mut edits = Vec::new();
        let mut recorder = PathChangeRecorder::new(&mut path, Some(&mut rollback), &mut edits);
        recorder.delete_n_trailing_contours(2).unwrap();
        assert!(recorder.path().is_empty());
        drop(recorder);
        rollback_record(&rollback).apply(&mut path).unwrap();
        assert_eq!(path, original);
    }
}
