// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Choosing a pen behavior from the selection and the clicked point.

use super::behavior::{BehaviorKind, PenBehavior};
use crate::editing::Selection;
use crate::path::{PackedPath, PointType};
use kurbo::Point;

/// Where a click extends an open contour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendTarget {
    pub contour_index: usize,
    /// Local index the next point goes to
    pub contour_point_index: usize,
    /// Extending after the last point rather than before the first
    pub should_append: bool,
    /// Whether the selected endpoint is on-curve
    pub is_on_curve: bool,
}

/// The open-contour endpoint the selection designates, if any.
///
/// A selection designates an endpoint when it is exactly one point, that
/// point is the first or last of an open contour, and it exists.
pub fn append_target(path: &PackedPath, selection: &Selection) -> Option<AppendTarget> {
    let point_index = selection.single_point()?;
    if point_index >= path.num_points() {
        return None;
    }
    let (contour_index, local) = path.contour_and_point_index(point_index).ok()?;
    if path.is_contour_closed(contour_index).ok()? {
        return None;
    }
    let num_points = path.num_points_of_contour(contour_index).ok()?;
    if local != 0 && local != num_points - 1 {
        return None;
    }
    let should_append = local != 0 || num_points == 1;
    let point = path.point(point_index).ok()?;
    Some(AppendTarget {
        contour_index,
        contour_point_index: if should_append { local + 1 } else { 0 },
        should_append,
        is_on_curve: point.is_on_curve(),
    })
}

/// Pick and build the behavior for a pointer-down at `anchor`.
///
/// `clicked` is the hit-test result at the pointer position. Returns
/// `None` when the click should do nothing.
pub fn pen_behavior_for_click<'a>(
    path: &'a mut PackedPath,
    selection: &Selection,
    clicked: &Selection,
    anchor: Point,
    curve_type: PointType,
    round: bool,
) -> Option<PenBehavior<'a>> {
    let (kind, contour_index, contour_point_index, should_append) =
        match append_target(path, selection) {
            None => (BehaviorKind::AddContourAndPoints, path.num_contours(), 0, true),
            Some(target) => choose_kind(path, selection, clicked, target)?,
        };
    tracing::debug!(
        "Pen behavior: {:?} at contour {} point {} (append: {})",
        kind,
        contour_index,
        contour_point_index,
        should_append
    );
    match PenBehavior::new(
        path,
        kind,
        contour_index,
        contour_point_index,
        should_append,
        anchor,
        curve_type,
        round,
    ) {
        Ok(behavior) => Some(behavior),
        Err(err) => {
            tracing::warn!("Could not start pen behavior {:?}: {}", kind, err);
            None
        }
    }
}

fn choose_kind(
    path: &PackedPath,
    selection: &Selection,
    clicked: &Selection,
    target: AppendTarget,
) -> Option<(BehaviorKind, usize, usize, bool)> {
    let AppendTarget {
        contour_index,
        mut contour_point_index,
        should_append,
        is_on_curve,
    } = target;

    let mut kind = if is_on_curve {
        BehaviorKind::AddPointsSingleHandle
    } else {
        BehaviorKind::AddPoints
    };

    if clicked == selection {
        // re-click on the selected endpoint
        if should_append {
            contour_point_index -= 1;
        }
        if is_on_curve {
            kind = BehaviorKind::AddHandle;
        } else {
            if path.num_points_of_contour(contour_index).ok()? <= 2 {
                tracing::warn!("Refusing to delete a handle from a contour of two points or fewer");
                return None;
            }
            kind = BehaviorKind::DeleteHandle;
        }
    } else if let Some(clicked_target) = append_target(path, clicked) {
        if clicked_target.contour_index == contour_index {
            let selected_local = contour_point_index - usize::from(should_append);
            let selected_on_curve = path
                .contour_point(contour_index, selected_local)
                .is_ok_and(|p| p.is_on_curve());
            kind = if !clicked_target.is_on_curve || selected_on_curve {
                BehaviorKind::CloseContourNoDrag
            } else {
                BehaviorKind::CloseContourDrag
            };
        } else {
            tracing::debug!(
                "Clicked endpoint of contour {} while extending contour {}, adding a point",
                clicked_target.contour_index,
                contour_index
            );
        }
    }
    Some((kind, contour_index, contour_point_index, should_append))
}
