// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Geometry helpers on top of kurbo.
//!
//! Points, vectors, rectangles and affine matrices are kurbo types. This
//! module adds the handful of operations the pen tool and the path
//! queries need: rounding, handle mirroring, 45° constraint, bounding
//! rectangles and convex hulls.

mod transform;

pub use transform::DecomposedTransform;

use kurbo::{Point, Rect, Vec2};

/// Tangent of 22.5°: below this a vector snaps to the nearest axis
const TAN_22_5: f64 = 0.414;

/// Tangent of 67.5°
const TAN_67_5: f64 = 2.414;

/// Round both coordinates to the nearest integer
pub fn round_point(point: Point) -> Point {
    Point::new(point.x.round(), point.y.round())
}

/// Mirror `handle` through `anchor`: `anchor + (anchor - handle)`
pub fn opposite_handle(anchor: Point, handle: Point) -> Point {
    anchor + (anchor - handle)
}

/// Constrain a vector to horizontal, vertical or a 45° diagonal.
///
/// The vector is projected onto whichever of the four directions is
/// nearest to it.
pub fn constrain_hor_ver_diag(vector: Vec2) -> Vec2 {
    let ax = vector.x.abs();
    let ay = vector.y.abs();
    let tan = if ax < 0.001 { 0.0 } else { ay / ax };
    if TAN_22_5 < tan && tan < TAN_67_5 {
        let d = 0.5 * (ax + ay);
        Vec2::new(d * sign(vector.x), d * sign(vector.y))
    } else if ax > ay {
        Vec2::new(vector.x, 0.0)
    } else {
        Vec2::new(0.0, vector.y)
    }
}

/// Constrain `point` relative to `anchor` with `constrain_hor_ver_diag`
pub fn shift_constrain(anchor: Point, point: Point) -> Point {
    anchor + constrain_hor_ver_diag(point - anchor)
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Smallest rectangle containing all points, or `None` when empty
pub fn rect_from_points<I>(points: I) -> Option<Rect>
where
    I: IntoIterator<Item = Point>,
{
    let mut points = points.into_iter();
    let first = points.next()?;
    let mut rect = Rect::from_points(first, first);
    for point in points {
        rect = rect.union_pt(point);
    }
    Some(rect)
}

/// Convex hull of a point set (Andrew's monotone chain).
///
/// Returns the hull in counter-clockwise order without repeating the
/// first point. Inputs with fewer than three points are returned as-is.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut hull: Vec<Point> = Vec::with_capacity(2 * sorted.len());

    // Lower hull
    for &p in &sorted {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }

    // Upper hull
    let lower_len = hull.len() + 1;
    for &p in sorted.iter().rev() {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }

    hull.pop();
    hull
}

/// 2D cross product of OA and OB
fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}
