// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Read-only iteration over packed paths.
//!
//! All iterators borrow the path, so the borrow checker rules out
//! structural edits while one is alive. Each call starts a fresh pass.

use super::{PackedPath, PathPoint, PointType, UnpackedContour};
use kurbo::{CubicBez, Line, PathSeg, Point, QuadBez, Rect};

/// Kind of a decomposed segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Line,
    Quad,
    Cubic,
}

/// One drawable segment of a contour.
///
/// `points` holds start, control points and end: 2 for a line, 3 for a
/// quad, 4 for a cubic. Quadratic runs with several off-curve points are
/// split at their implied on-curve midpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub points: Vec<Point>,
}

impl Segment {
    fn line(p0: Point, p1: Point) -> Self {
        Self {
            kind: SegmentKind::Line,
            points: vec![p0, p1],
        }
    }

    fn quad(p0: Point, p1: Point, p2: Point) -> Self {
        Self {
            kind: SegmentKind::Quad,
            points: vec![p0, p1, p2],
        }
    }

    fn cubic(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self {
            kind: SegmentKind::Cubic,
            points: vec![p0, p1, p2, p3],
        }
    }

    /// Convert to a kurbo segment
    pub fn to_path_seg(&self) -> PathSeg {
        let p = &self.points;
        match self.kind {
            SegmentKind::Line => PathSeg::Line(Line::new(p[0], p[1])),
            SegmentKind::Quad => PathSeg::Quad(QuadBez::new(p[0], p[1], p[2])),
            SegmentKind::Cubic => PathSeg::Cubic(CubicBez::new(p[0], p[1], p[2], p[3])),
        }
    }
}

impl PackedPath {
    /// All points in absolute index order
    pub fn iter_points(&self) -> impl Iterator<Item = PathPoint> + '_ {
        (0..self.num_points()).map(|i| self.point_unchecked(i))
    }

    /// All contours, unpacked
    pub fn iter_contours(&self) -> impl Iterator<Item = UnpackedContour> + '_ {
        (0..self.num_contours()).filter_map(|c| self.unpacked_contour(c).ok())
    }

    /// Every adjacent on-curve/off-curve pair, as `(on_curve, off_curve)`
    /// positions. Closed contours wrap around.
    pub fn iter_handles(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        (0..self.num_contours()).flat_map(move |c| {
            let range = self.contour_range(c).unwrap_or(0..0);
            let closed = self.contour_info[c].is_closed;
            let len = range.len();
            let pairs = if closed && len > 1 { len } else { len.saturating_sub(1) };
            (0..pairs).filter_map(move |k| {
                let a = range.start + k;
                let b = range.start + (k + 1) % len;
                let a_on = self.point_types[a] & super::POINT_TYPE_MASK == super::ON_CURVE;
                let b_on = self.point_types[b] & super::POINT_TYPE_MASK == super::ON_CURVE;
                match (a_on, b_on) {
                    (true, false) => Some((self.position_unchecked(a), self.position_unchecked(b))),
                    (false, true) => Some((self.position_unchecked(b), self.position_unchecked(a))),
                    _ => None,
                }
            })
        })
    }

    /// Absolute indices of the points inside `rect` (edges included)
    pub fn iter_points_in_rect(&self, rect: Rect) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_points()).filter(move |&i| {
            let p = self.position_unchecked(i);
            p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
        })
    }

    /// Collected form of `iter_points_in_rect`
    pub fn points_in_rect(&self, rect: Rect) -> Vec<usize> {
        self.iter_points_in_rect(rect).collect()
    }

    /// Decompose a contour into line, quad and cubic segments.
    ///
    /// Open contours ignore off-curve points before the first or after the
    /// last on-curve point. A closed contour made only of quadratic
    /// off-curve points starts at the implied point between its last and
    /// first points.
    pub fn iter_contour_segments(&self, contour_index: usize) -> impl Iterator<Item = Segment> {
        let segments = match self.unpacked_contour(contour_index) {
            Ok(contour) => decompose(&contour.points, contour.is_closed),
            Err(_) => Vec::new(),
        };
        segments.into_iter()
    }
}

fn decompose(points: &[PathPoint], closed: bool) -> Vec<Segment> {
    let mut segments = Vec::new();
    let Some(first_on) = points.iter().position(PathPoint::is_on_curve) else {
        if closed && points.len() > 1 {
            let (first, last) = (points[0].position(), points[points.len() - 1].position());
            let start = first.midpoint(last);
            let offs: Vec<_> = points.iter().map(PathPoint::position).collect();
            push_quads(&mut segments, start, &offs, start);
        }
        return segments;
    };

    let n = points.len();
    let steps = if closed { n } else { n - first_on };
    let mut start = points[first_on].position();
    let mut offs: Vec<Point> = Vec::new();
    let mut off_type = PointType::OffCurveCubic;
    for k in 1..=steps {
        let point = if closed {
            &points[(first_on + k) % n]
        } else if first_on + k < n {
            &points[first_on + k]
        } else {
            break;
        };
        if point.is_off_curve() {
            offs.push(point.position());
            off_type = point.typ;
            continue;
        }
        let end = point.position();
        match (offs.len(), off_type) {
            (0, _) => segments.push(Segment::line(start, end)),
            (1, _) => segments.push(Segment::quad(start, offs[0], end)),
            (_, PointType::OffCurveQuad) => push_quads(&mut segments, start, &offs, end),
            (_, _) => segments.push(Segment::cubic(start, offs[0], offs[offs.len() - 1], end)),
        }
        offs.clear();
        start = end;
    }
    segments
}

/// Split a quadratic run at implied on-curve midpoints
fn push_quads(segments: &mut Vec<Segment>, start: Point, offs: &[Point], end: Point) {
    let mut p0 = start;
    for (i, &control) in offs.iter().enumerate() {
        let p2 = match offs.get(i + 1) {
            Some(next) => control.midpoint(*next),
            None => end,
        };
        segments.push(Segment::quad(p0, control, p2));
        p0 = p2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterators_are_restartable() {
        let path = crate::path::tests::two_contour_path();
        assert_eq!(path.iter_points().count(), 5);
        assert_eq!(path.iter_points().count(), 5);
        let contours: Vec<_> = path.iter_contours().collect();
        assert_eq!(contours.len(), 2);
        assert!(contours[1].is_closed);
        assert_eq!(contours[1].points.len(), 3);
    }

    #[test]
    fn closed_polygon_segments_wrap() {
        let path = crate::path::tests::two_contour_path();
        let segments: Vec<_> = path.iter_contour_segments(1).collect();
        assert_eq!(segments.len(), 3);
        assert!(segments.iter().all(|s| s.kind == SegmentKind::Line));
        assert_eq!(segments[2].points, vec![Point::new(100.0, 100.0), Point::new(0.0, 100.0)]);

        let open: Vec<_> = path.iter_contour_segments(0).collect();
        assert_eq!(open.len(), 1);
    }

    #[test]
    fn cubic_and_quad_segments() {
        let mut path = PackedPath::new();
        path.move_to(Point::new(0.0, 0.0));
        path.cubic_curve_to(Point::new(0.0, 10.0), Point::new(10.0, 20.0), Point::new(20.0, 20.0));
        path.quad_curve_to(
            &[Point::new(30.0, 20.0), Point::new(40.0, 10.0)],
            Point::new(40.0, 0.0),
        );
        let segments: Vec<_> = path.iter_contour_segments(0).collect();
        let kinds: Vec<_> = segments.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SegmentKind::Cubic, SegmentKind::Quad, SegmentKind::Quad]);
        // implied on-curve point between the two quad controls
        assert_eq!(segments[1].points[2], Point::new(35.0, 15.0));
    }

    #[test]
    fn all_off_curve_quad_contour() {
        let mut path = PackedPath::new();
        path.quad_curve_to(
            &[
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ],
            Point::new(0.0, 0.0),
        );
        // drop the trailing on-curve point to get a pure off-curve contour
        path.delete_point(0, 4).unwrap();
        path.close_path();
        let segments: Vec<_> = path.iter_contour_segments(0).collect();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0].points[0], Point::new(0.0, 5.0));
        assert_eq!(segments[3].points[2], Point::new(0.0, 5.0));
    }

    #[test]
    fn handles_pair_on_and_off_points() {
        let mut path = PackedPath::new();
        path.move_to(Point::new(0.0, 0.0));
        path.cubic_curve_to(Point::new(0.0, 10.0), Point::new(10.0, 20.0), Point::new(20.0, 20.0));
        let handles: Vec<_> = path.iter_handles().collect();
        assert_eq!(
            handles,
            vec![
                (Point::new(0.0, 0.0), Point::new(0.0, 10.0)),
                (Point::new(20.0, 20.0), Point::new(10.0, 20.0)),
            ]
        );
    }

    #[test]
    fn points_in_rect_includes_edges() {
        let path = crate::path::tests::two_contour_path();
        let hits = path.points_in_rect(Rect::new(0.0, 0.0, 10.0, 100.0));
        assert_eq!(hits, vec![0, 1, 2]);
    }
}
