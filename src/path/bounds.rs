// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Derived geometry: bounding boxes, hulls, hit testing and kurbo export.

use super::{PackedPath, SegmentKind};
use crate::geometry;
use kurbo::{BezPath, ParamCurveExtrema, Point, Rect};

impl PackedPath {
    /// Bounding box of all points, control points included
    pub fn control_bounds(&self) -> Option<Rect> {
        geometry::rect_from_points((0..self.num_points()).map(|i| self.position_unchecked(i)))
    }

    pub fn control_bounds_for_contour(&self, contour_index: usize) -> Option<Rect> {
        let range = self.contour_range(contour_index).ok()?;
        geometry::rect_from_points(range.map(|i| self.position_unchecked(i)))
    }

    /// Tight bounding box of the drawn outline.
    ///
    /// Single-point contours contribute their point.
    pub fn bounds(&self) -> Option<Rect> {
        let mut rect: Option<Rect> = None;
        for contour_index in 0..self.num_contours() {
            let mut segments = self.iter_contour_segments(contour_index).peekable();
            if segments.peek().is_none() {
                if let Some(contour_rect) = self.control_bounds_for_contour(contour_index) {
                    rect = Some(rect.map_or(contour_rect, |r| r.union(contour_rect)));
                }
                continue;
            }
            for segment in segments {
                let seg_rect = segment.to_path_seg().bounding_box();
                rect = Some(rect.map_or(seg_rect, |r| r.union(seg_rect)));
            }
        }
        rect
    }

    /// Convex hull of all points, control points included
    pub fn convex_hull(&self) -> Vec<Point> {
        let points: Vec<Point> = (0..self.num_points())
            .map(|i| self.position_unchecked(i))
            .collect();
        geometry::convex_hull(&points)
    }

    /// Index of the point nearest to `point`, if closer than `margin`.
    ///
    /// On equal distance the later point wins, since it is drawn on top.
    pub fn hit_test(&self, point: Point, margin: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for i in 0..self.num_points() {
            let distance = (self.position_unchecked(i) - point).hypot();
            if distance >= margin {
                continue;
            }
            if best.is_none_or(|(_, d)| distance <= d) {
                best = Some((i, distance));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Convert to a kurbo path for rendering or measuring
    pub fn to_bezpath(&self) -> BezPath {
        let mut bez = BezPath::new();
        for contour_index in 0..self.num_contours() {
            let mut started = false;
            for segment in self.iter_contour_segments(contour_index) {
                let p = &segment.points;
                if !started {
                    bez.move_to(p[0]);
                    started = true;
                }
                match segment.kind {
                    SegmentKind::Line => bez.line_to(p[1]),
                    SegmentKind::Quad => bez.quad_to(p[1], p[2]),
                    SegmentKind::Cubic => bez.curve_to(p[1], p[2], p[3]),
                }
            }
            if !started {
                if let Ok(first) = self.contour_point(contour_index, 0) {
                    bez.move_to(first.position());
                }
                continue;
            }
            if self.contour_info[contour_index].is_closed {
                bez.close_path();
            }
        }
        bez
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_bounds_include_off_curves() {
        let mut path = PackedPath::new();
        path.move_to(Point::new(0.0, 0.0));
        path.cubic_curve_to(Point::new(0.0, 100.0), Point::new(100.0, 100.0), Point::new(100.0, 0.0));
        assert_eq!(path.control_bounds(), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));

        let tight = path.bounds().unwrap();
        assert!((tight.y1 - 75.0).abs() < 1e-9);
        assert_eq!(tight.x0, 0.0);
        assert_eq!(tight.x1, 100.0);
    }

    #[test]
    fn empty_path_has_no_bounds() {
        let path = PackedPath::new();
        assert_eq!(path.control_bounds(), None);
        assert_eq!(path.bounds(), None);
        assert!(path.convex_hull().is_empty());
    }

    #[test]
    fn hit_test_prefers_later_point_on_tie() {
        let mut path = PackedPath::new();
        path.move_to(Point::new(0.0, 0.0));
        path.line_to(Point::new(0.0, 0.0));
        path.line_to(Point::new(50.0, 0.0));
        assert_eq!(path.hit_test(Point::new(1.0, 1.0), 5.0), Some(1));
        assert_eq!(path.hit_test(Point::new(48.0, 0.0), 5.0), Some(2));
        assert_eq!(path.hit_test(Point::new(25.0, 0.0), 5.0), None);
        assert_eq!(path.hit_test(Point::new(50.0, 5.0), 5.0), None);
    }

    #[test]
    fn bezpath_closes_closed_contours() {
        let path = crate::path::tests::two_contour_path();
        let bez = path.to_bezpath();
        let closes = bez
            .elements()
            .iter()
            .filter(|el| matches!(el, kurbo::PathEl::ClosePath))
            .count();
        assert_eq!(closes, 1);
        assert_eq!(bez.elements().len(), 2 + 4 + 1);
    }
}
