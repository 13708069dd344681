// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Packed path: the flat-array outline representation.
//!
//! A `PackedPath` stores every point of every contour in three parallel
//! buffers (coordinates, packed point types, optional attributes) plus a
//! contour boundary table. Contours are slices `[start, end)` of those
//! buffers, so a point is identified by its absolute index alone, and
//! every structural edit renumbers the points after it.
//!
//! All mutating methods validate their indices before touching a buffer:
//! on error the path is unchanged.

mod bounds;
mod iter;
mod point;
mod ufo;
mod wire;

pub use iter::{Segment, SegmentKind};
pub use point::{
    Attrs, Contour, ContourInfo, OFF_CURVE_CUBIC, OFF_CURVE_QUAD, ON_CURVE, POINT_TYPE_MASK,
    PathPoint, PointType, SMOOTH_FLAG, UnpackedContour,
};

use crate::error::PathError;
use kurbo::{Affine, Point};
use std::ops::Range;

/// A glyph outline in packed form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackedPath {
    coordinates: Vec<f64>,
    point_types: Vec<u8>,
    contour_info: Vec<ContourInfo>,
    point_attributes: Option<Vec<Option<Attrs>>>,
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

impl PackedPath {
    /// Create an empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a path from raw buffers, checking every invariant
    pub fn from_parts(
        coordinates: Vec<f64>,
        point_types: Vec<u8>,
        contour_info: Vec<ContourInfo>,
        point_attributes: Option<Vec<Option<Attrs>>>,
    ) -> Result<Self, PathError> {
        let mut path = Self {
            coordinates,
            point_types,
            contour_info,
            point_attributes,
        };
        path.check_integrity()?;
        path.normalize_attributes();
        Ok(path)
    }

    /// Build a path from a list of unpacked contours
    pub fn from_unpacked_contours<'a, I>(contours: I) -> Self
    where
        I: IntoIterator<Item = &'a UnpackedContour>,
    {
        let mut path = Self::new();
        for contour in contours {
            path.push_contour(&Contour::from(contour));
        }
        path.normalize_attributes();
        path
    }

    /// Verify the structural invariants of the buffers
    pub fn check_integrity(&self) -> Result<(), PathError> {
        let num_points = self.point_types.len();
        if self.coordinates.len() != 2 * num_points {
            return Err(PathError::CoordinateCount {
                coordinates: self.coordinates.len(),
                points: num_points,
            });
        }
        for &byte in &self.point_types {
            PointType::unpack(byte)?;
        }
        let mut previous = 0;
        for (index, info) in self.contour_info.iter().enumerate() {
            if info.end < previous {
                return Err(PathError::BadContourInfo(format!(
                    "contour {index} ends at {} before previous end {previous}",
                    info.end
                )));
            }
            previous = info.end;
        }
        if previous != num_points {
            return Err(PathError::BadContourInfo(format!(
                "last contour ends at {previous} but path has {num_points} points"
            )));
        }
        if let Some(attrs) = &self.point_attributes
            && attrs.len() != num_points
        {
            return Err(PathError::AttributeCount {
                attributes: attrs.len(),
                points: num_points,
            });
        }
        Ok(())
    }

    /// Drop the attribute column when no point carries attributes
    fn normalize_attributes(&mut self) {
        if self
            .point_attributes
            .as_ref()
            .is_some_and(|attrs| attrs.iter().all(Option::is_none))
        {
            self.point_attributes = None;
        }
    }
}

// ============================================================================
// QUERIES
// ============================================================================

impl PackedPath {
    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    pub fn point_types(&self) -> &[u8] {
        &self.point_types
    }

    pub fn contour_info(&self) -> &[ContourInfo] {
        &self.contour_info
    }

    pub fn point_attributes(&self) -> Option<&[Option<Attrs>]> {
        self.point_attributes.as_deref()
    }

    pub fn num_points(&self) -> usize {
        self.point_types.len()
    }

    pub fn num_contours(&self) -> usize {
        self.contour_info.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contour_info.is_empty()
    }

    fn check_contour_index(&self, contour_index: usize) -> Result<(), PathError> {
        if contour_index >= self.contour_info.len() {
            return Err(PathError::ContourIndexOutOfRange {
                index: contour_index,
                count: self.contour_info.len(),
            });
        }
        Ok(())
    }

    fn check_point_index(&self, point_index: usize) -> Result<(), PathError> {
        if point_index >= self.num_points() {
            return Err(PathError::PointIndexOutOfRange {
                index: point_index,
                count: self.num_points(),
            });
        }
        Ok(())
    }

    /// Absolute index of the first point of a contour.
    ///
    /// `contour_index` may equal the contour count, which yields the
    /// total point count (the position of a contour appended at the end).
    pub fn contour_start_point(&self, contour_index: usize) -> Result<usize, PathError> {
        if contour_index > self.contour_info.len() {
            return Err(PathError::ContourIndexOutOfRange {
                index: contour_index,
                count: self.contour_info.len(),
            });
        }
        Ok(match contour_index {
            0 => 0,
            _ => self.contour_info[contour_index - 1].end,
        })
    }

    /// Range of absolute point indices covered by a contour
    pub fn contour_range(&self, contour_index: usize) -> Result<Range<usize>, PathError> {
        self.check_contour_index(contour_index)?;
        let start = self.contour_start_point(contour_index)?;
        Ok(start..self.contour_info[contour_index].end)
    }

    pub fn num_points_of_contour(&self, contour_index: usize) -> Result<usize, PathError> {
        Ok(self.contour_range(contour_index)?.len())
    }

    pub fn is_contour_closed(&self, contour_index: usize) -> Result<bool, PathError> {
        self.check_contour_index(contour_index)?;
        Ok(self.contour_info[contour_index].is_closed)
    }

    /// Contour containing an absolute point index (binary search)
    pub fn contour_index(&self, point_index: usize) -> Result<usize, PathError> {
        self.check_point_index(point_index)?;
        Ok(self
            .contour_info
            .partition_point(|info| info.end <= point_index))
    }

    /// Map an absolute point index to `(contour_index, contour_point_index)`
    pub fn contour_and_point_index(&self, point_index: usize) -> Result<(usize, usize), PathError> {
        let contour_index = self.contour_index(point_index)?;
        let start = self.contour_start_point(contour_index)?;
        Ok((contour_index, point_index - start))
    }

    /// Map `(contour_index, contour_point_index)` to an absolute index.
    ///
    /// Without `prefer_end` the local index must name an existing point.
    /// With `prefer_end` the local index may also equal the contour length:
    /// that append position resolves to just past the last point of
    /// *this* contour, never to the first point of the next one (the two
    /// share an absolute index). Empty contours only admit local index 0
    /// with `prefer_end`.
    pub fn absolute_point_index(
        &self,
        contour_index: usize,
        contour_point_index: usize,
        prefer_end: bool,
    ) -> Result<usize, PathError> {
        let range = self.contour_range(contour_index)?;
        let limit = range.len() + usize::from(prefer_end);
        if contour_point_index >= limit {
            return Err(PathError::ContourPointIndexOutOfRange {
                contour: contour_index,
                index: contour_point_index,
                count: range.len(),
            });
        }
        Ok(range.start + contour_point_index)
    }

    /// Unpacked copy of a point
    pub fn point(&self, point_index: usize) -> Result<PathPoint, PathError> {
        self.check_point_index(point_index)?;
        Ok(self.point_unchecked(point_index))
    }

    pub(crate) fn point_unchecked(&self, point_index: usize) -> PathPoint {
        let (typ, smooth) =
            PointType::unpack(self.point_types[point_index]).unwrap_or((PointType::OnCurve, false));
        PathPoint {
            x: self.coordinates[2 * point_index],
            y: self.coordinates[2 * point_index + 1],
            typ,
            smooth,
            attrs: self.attrs_unchecked(point_index),
        }
    }

    fn attrs_unchecked(&self, point_index: usize) -> Option<Attrs> {
        self.point_attributes
            .as_ref()
            .and_then(|attrs| attrs[point_index].clone())
    }

    pub(crate) fn position_unchecked(&self, point_index: usize) -> Point {
        Point::new(
            self.coordinates[2 * point_index],
            self.coordinates[2 * point_index + 1],
        )
    }

    pub fn point_position(&self, point_index: usize) -> Result<Point, PathError> {
        self.check_point_index(point_index)?;
        Ok(self.position_unchecked(point_index))
    }

    /// Packed type byte of a point
    pub fn packed_point_type(&self, point_index: usize) -> Result<u8, PathError> {
        self.check_point_index(point_index)?;
        Ok(self.point_types[point_index])
    }

    pub fn point_attrs(&self, point_index: usize) -> Result<Option<Attrs>, PathError> {
        self.check_point_index(point_index)?;
        Ok(self.attrs_unchecked(point_index))
    }

    pub fn contour_point(
        &self,
        contour_index: usize,
        contour_point_index: usize,
    ) -> Result<PathPoint, PathError> {
        let point_index = self.absolute_point_index(contour_index, contour_point_index, false)?;
        Ok(self.point_unchecked(point_index))
    }

    /// Detached packed copy of a contour
    pub fn contour(&self, contour_index: usize) -> Result<Contour, PathError> {
        let range = self.contour_range(contour_index)?;
        Ok(Contour {
            coordinates: self.coordinates[2 * range.start..2 * range.end].to_vec(),
            point_types: self.point_types[range.clone()].to_vec(),
            is_closed: self.contour_info[contour_index].is_closed,
            point_attributes: self
                .point_attributes
                .as_ref()
                .map(|attrs| attrs[range].to_vec())
                .filter(|attrs| attrs.iter().any(Option::is_some)),
        })
    }

    /// Contour as a list of unpacked points
    pub fn unpacked_contour(&self, contour_index: usize) -> Result<UnpackedContour, PathError> {
        let range = self.contour_range(contour_index)?;
        Ok(UnpackedContour {
            points: range.map(|i| self.point_unchecked(i)).collect(),
            is_closed: self.contour_info[contour_index].is_closed,
        })
    }

    pub fn unpacked_contours(&self) -> Vec<UnpackedContour> {
        self.iter_contours().collect()
    }

    /// Structural equality ignoring coordinates: same contour count, same
    /// point count per contour, same closedness per contour
    pub fn is_compatible(&self, other: &PackedPath) -> bool {
        self.contour_info == other.contour_info
    }
}

/// True when every path is compatible with the first one
pub fn are_paths_compatible(paths: &[PackedPath]) -> bool {
    match paths.split_first() {
        Some((first, rest)) => rest.iter().all(|path| first.is_compatible(path)),
        None => true,
    }
}

// ============================================================================
// STRUCTURAL MUTATION
// ============================================================================

impl PackedPath {
    /// Shift the end index of every contour from `contour_index` on
    fn move_end_points(&mut self, contour_index: usize, added: usize, removed: usize) {
        for info in &mut self.contour_info[contour_index..] {
            info.end = info.end + added - removed;
        }
    }

    pub fn set_point_position(&mut self, point_index: usize, x: f64, y: f64) -> Result<(), PathError> {
        self.check_point_index(point_index)?;
        self.coordinates[2 * point_index] = x;
        self.coordinates[2 * point_index + 1] = y;
        Ok(())
    }

    pub fn set_point_type(
        &mut self,
        point_index: usize,
        typ: PointType,
        smooth: bool,
    ) -> Result<(), PathError> {
        self.set_packed_point_type(point_index, typ.pack(smooth))
    }

    pub fn set_packed_point_type(&mut self, point_index: usize, byte: u8) -> Result<(), PathError> {
        self.check_point_index(point_index)?;
        PointType::unpack(byte)?;
        self.point_types[point_index] = byte;
        Ok(())
    }

    pub fn set_point_attrs(
        &mut self,
        point_index: usize,
        attrs: Option<Attrs>,
    ) -> Result<(), PathError> {
        self.check_point_index(point_index)?;
        if attrs.is_none() && self.point_attributes.is_none() {
            return Ok(());
        }
        let num_points = self.num_points();
        let column = self
            .point_attributes
            .get_or_insert_with(|| vec![None; num_points]);
        column[point_index] = attrs;
        self.normalize_attributes();
        Ok(())
    }

    /// Overwrite position, type and attributes of a point
    pub fn set_point(&mut self, point_index: usize, point: &PathPoint) -> Result<(), PathError> {
        self.check_point_index(point_index)?;
        self.set_point_position(point_index, point.x, point.y)?;
        self.set_point_type(point_index, point.typ, point.smooth)?;
        self.set_point_attrs(point_index, point.attrs.clone())
    }

    pub fn insert_point(
        &mut self,
        contour_index: usize,
        contour_point_index: usize,
        point: &PathPoint,
    ) -> Result<(), PathError> {
        let point_index = self.absolute_point_index(contour_index, contour_point_index, true)?;
        self.coordinates
            .splice(2 * point_index..2 * point_index, [point.x, point.y]);
        self.point_types.insert(point_index, point.packed_type());
        if let Some(column) = &mut self.point_attributes {
            column.insert(point_index, point.attrs.clone());
        } else if let Some(attrs) = &point.attrs {
            let mut column = vec![None; self.point_types.len() - 1];
            column.insert(point_index, Some(attrs.clone()));
            self.point_attributes = Some(column);
        }
        self.move_end_points(contour_index, 1, 0);
        Ok(())
    }

    pub fn append_point(&mut self, contour_index: usize, point: &PathPoint) -> Result<(), PathError> {
        let len = self.num_points_of_contour(contour_index)?;
        self.insert_point(contour_index, len, point)
    }

    /// Remove a point, returning it
    pub fn delete_point(
        &mut self,
        contour_index: usize,
        contour_point_index: usize,
    ) -> Result<PathPoint, PathError> {
        let point_index = self.absolute_point_index(contour_index, contour_point_index, false)?;
        let point = self.point_unchecked(point_index);
        self.coordinates.drain(2 * point_index..2 * point_index + 2);
        self.point_types.remove(point_index);
        if let Some(column) = &mut self.point_attributes {
            column.remove(point_index);
        }
        self.normalize_attributes();
        self.move_end_points(contour_index, 0, 1);
        Ok(point)
    }

    /// Insert a detached contour before `contour_index`.
    ///
    /// `contour_index` may equal the contour count to append. The contour
    /// may be empty.
    pub fn insert_contour(&mut self, contour_index: usize, contour: &Contour) -> Result<(), PathError> {
        contour.validate()?;
        let start = self.contour_start_point(contour_index)?;
        let len = contour.len();
        self.coordinates
            .splice(2 * start..2 * start, contour.coordinates.iter().copied());
        self.point_types
            .splice(start..start, contour.point_types.iter().copied());
        if self.point_attributes.is_none() && contour.point_attributes.is_some() {
            self.point_attributes = Some(vec![None; self.point_types.len() - len]);
        }
        if let Some(column) = &mut self.point_attributes {
            match &contour.point_attributes {
                Some(attrs) => {
                    column.splice(start..start, attrs.iter().cloned());
                }
                None => {
                    column.splice(start..start, std::iter::repeat_n(None, len));
                }
            }
        }
        self.contour_info.insert(
            contour_index,
            ContourInfo {
                end: start,
                is_closed: contour.is_closed,
            },
        );
        self.move_end_points(contour_index, len, 0);
        self.normalize_attributes();
        Ok(())
    }

    pub fn append_contour(&mut self, contour: &Contour) -> Result<(), PathError> {
        self.insert_contour(self.num_contours(), contour)
    }

    /// Append a contour known to be valid (used by builders)
    fn push_contour(&mut self, contour: &Contour) {
        if let Err(err) = self.append_contour(contour) {
            tracing::warn!("skipping malformed contour: {err}");
        }
    }

    /// Remove a contour, returning it
    pub fn delete_contour(&mut self, contour_index: usize) -> Result<Contour, PathError> {
        let contour = self.contour(contour_index)?;
        let range = self.contour_range(contour_index)?;
        let len = range.len();
        self.coordinates.drain(2 * range.start..2 * range.end);
        self.point_types.drain(range.clone());
        if let Some(column) = &mut self.point_attributes {
            column.drain(range);
        }
        self.contour_info.remove(contour_index);
        self.move_end_points(contour_index, 0, len);
        self.normalize_attributes();
        Ok(contour)
    }

    /// Replace a contour, returning the previous one
    pub fn set_contour(&mut self, contour_index: usize, contour: &Contour) -> Result<Contour, PathError> {
        self.check_contour_index(contour_index)?;
        contour.validate()?;
        let old = self.delete_contour(contour_index)?;
        self.insert_contour(contour_index, contour)?;
        Ok(old)
    }

    /// Set closedness of a contour, returning the previous value
    pub fn open_close_contour(
        &mut self,
        contour_index: usize,
        is_closed: bool,
    ) -> Result<bool, PathError> {
        self.check_contour_index(contour_index)?;
        let info = &mut self.contour_info[contour_index];
        Ok(std::mem::replace(&mut info.is_closed, is_closed))
    }

    pub fn delete_n_trailing_contours(&mut self, count: usize) -> Result<(), PathError> {
        if count > self.num_contours() {
            return Err(PathError::ContourIndexOutOfRange {
                index: count,
                count: self.num_contours(),
            });
        }
        for _ in 0..count {
            self.delete_contour(self.num_contours() - 1)?;
        }
        Ok(())
    }

    /// Append all contours of `other`
    pub fn append_path(&mut self, other: &PackedPath) {
        for contour_index in 0..other.num_contours() {
            if let Ok(contour) = other.contour(contour_index) {
                self.push_contour(&contour);
            }
        }
    }

    /// New path with the contours of `self` followed by those of `other`
    pub fn concat(&self, other: &PackedPath) -> PackedPath {
        let mut path = self.clone();
        path.append_path(other);
        path
    }
}

// ============================================================================
// PEN-STYLE BUILDERS
// ============================================================================

impl PackedPath {
    fn last_contour_index(&mut self) -> usize {
        if self.contour_info.is_empty() {
            self.push_contour(&Contour::empty());
        }
        self.contour_info.len() - 1
    }

    fn push_point(&mut self, point: PathPoint) {
        let contour_index = self.last_contour_index();
        if let Err(err) = self.append_point(contour_index, &point) {
            tracing::warn!("failed to append point: {err}");
        }
    }

    /// Start a new open contour at `point`
    pub fn move_to(&mut self, point: Point) {
        self.push_contour(&Contour::empty());
        self.push_point(PathPoint::on_curve(point));
    }

    pub fn line_to(&mut self, point: Point) {
        self.push_point(PathPoint::on_curve(point));
    }

    pub fn cubic_curve_to(&mut self, c1: Point, c2: Point, point: Point) {
        self.push_point(PathPoint::off_curve(c1, PointType::OffCurveCubic));
        self.push_point(PathPoint::off_curve(c2, PointType::OffCurveCubic));
        self.push_point(PathPoint::on_curve(point));
    }

    /// Quadratic curve through any number of off-curve points
    pub fn quad_curve_to(&mut self, controls: &[Point], point: Point) {
        for &control in controls {
            self.push_point(PathPoint::off_curve(control, PointType::OffCurveQuad));
        }
        self.push_point(PathPoint::on_curve(point));
    }

    /// Close the last contour
    pub fn close_path(&mut self) {
        if let Some(info) = self.contour_info.last_mut() {
            info.is_closed = true;
        }
    }
}

// ============================================================================
// WHOLE-PATH TRANSFORMS
// ============================================================================

impl PackedPath {
    /// Copy of this path with every point transformed
    pub fn transformed(&self, transform: &Affine) -> PackedPath {
        let mut path = self.clone();
        for pair in path.coordinates.chunks_exact_mut(2) {
            let p = *transform * Point::new(pair[0], pair[1]);
            pair[0] = p.x;
            pair[1] = p.y;
        }
        path
    }

    /// Copy of this path with coordinates rounded to integers
    pub fn round_coordinates(&self) -> PackedPath {
        self.map_coordinates(f64::round)
    }

    pub(crate) fn map_coordinates(&self, f: impl Fn(f64) -> f64) -> PackedPath {
        let mut path = self.clone();
        for value in &mut path.coordinates {
            *value = f(*value);
        }
        path
    }

    /// Copy of this path with coordinates combined pairwise with `other`.
    ///
    /// Callers check compatibility first.
    pub(crate) fn zip_coordinates(&self, other: &PackedPath, f: impl Fn(f64, f64) -> f64) -> PackedPath {
        let mut path = self.clone();
        for (value, &rhs) in path.coordinates.iter_mut().zip(&other.coordinates) {
            *value = f(*value, rhs);
        }
        path
    }
}
