// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Pen-tool edit behaviors.
//!
//! One `PenBehavior` lives for one pointer gesture. It owns the path for
//! the duration of the gesture and records every mutation as forward and
//! rollback edits. The variants share one state shape; what differs is a
//! table of four steps picked when the behavior is built:
//!
//! 1. contour setup (open a contour, or close one and re-root it)
//! 2. initial change (the tentative click result)
//! 3. dragging setup (retract the tentative insertion)
//! 4. handle plan (which points to insert once dragging starts, and which
//!    of them follow the pointer)

use crate::changes::{ChangeRecord, PathChangeRecorder, PathEdit, consolidate, forward_record, rollback_record};
use crate::editing::Selection;
use crate::error::PathError;
use crate::geometry::{opposite_handle, round_point, shift_constrain};
use crate::path::{Contour, PackedPath, PathPoint, PointType};
use kurbo::Point;

/// The pen-tool behavior variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorKind {
    /// Start a new contour with one point; drag pulls out a handle
    AddContourAndPoints,
    /// Extend from an off-curve endpoint; drag adds a smooth point with two handles
    AddPoints,
    /// Extend from an on-curve endpoint; drag adds a point with one handle
    AddPointsSingleHandle,
    /// Re-click an on-curve endpoint; drag pulls out a handle
    AddHandle,
    /// Re-click an off-curve endpoint to remove it
    DeleteHandle,
    /// Close the contour; drag pulls out a closing handle
    CloseContourDrag,
    /// Close the contour
    CloseContourNoDrag,
}

impl BehaviorKind {
    /// Whether the click itself produces a change
    pub fn wants_initial_change(self) -> bool {
        !matches!(self, BehaviorKind::AddHandle)
    }

    /// Whether dragging past the threshold does anything
    pub fn wants_drag(self) -> bool {
        !matches!(
            self,
            BehaviorKind::DeleteHandle | BehaviorKind::CloseContourNoDrag
        )
    }

    pub fn undo_label(self) -> &'static str {
        match self {
            BehaviorKind::AddContourAndPoints
            | BehaviorKind::AddPoints
            | BehaviorKind::AddPointsSingleHandle => "add point",
            BehaviorKind::AddHandle => "add handle",
            BehaviorKind::DeleteHandle => "delete handle",
            BehaviorKind::CloseContourDrag | BehaviorKind::CloseContourNoDrag => "close contour",
        }
    }

    fn strategy(self) -> &'static Strategy {
        match self {
            BehaviorKind::AddContourAndPoints => &ADD_CONTOUR_AND_POINTS,
            BehaviorKind::AddPoints => &ADD_POINTS,
            BehaviorKind::AddPointsSingleHandle => &ADD_POINTS_SINGLE_HANDLE,
            BehaviorKind::AddHandle => &ADD_HANDLE,
            BehaviorKind::DeleteHandle => &DELETE_HANDLE,
            BehaviorKind::CloseContourDrag | BehaviorKind::CloseContourNoDrag => &CLOSE_CONTOUR,
        }
    }
}

/// Points to insert when a drag starts, and the handles that track the
/// pointer. Indices are local to the behavior's contour.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HandlePlan {
    pub handle_in: Option<usize>,
    pub handle_out: Option<usize>,
    pub inserts: Vec<(usize, PathPoint)>,
}

type Step = fn(&mut PenBehavior<'_>) -> Result<(), PathError>;

struct Strategy {
    setup_contour_changes: Step,
    setup_initial_changes: Step,
    setup_dragging_changes: Step,
    indices_and_points: fn(&PenBehavior<'_>) -> HandlePlan,
}

static ADD_POINTS: Strategy = Strategy {
    setup_contour_changes: no_changes,
    setup_initial_changes: insert_anchor,
    setup_dragging_changes: drop_tentative_anchor,
    indices_and_points: smooth_anchor_plan,
};

static ADD_POINTS_SINGLE_HANDLE: Strategy = Strategy {
    setup_contour_changes: no_changes,
    setup_initial_changes: insert_anchor,
    setup_dragging_changes: drop_tentative_anchor,
    indices_and_points: single_handle_plan,
};

static ADD_CONTOUR_AND_POINTS: Strategy = Strategy {
    setup_contour_changes: insert_empty_contour,
    setup_initial_changes: insert_anchor,
    setup_dragging_changes: drop_tentative_anchor,
    indices_and_points: single_handle_plan,
};

static ADD_HANDLE: Strategy = Strategy {
    setup_contour_changes: no_changes,
    setup_initial_changes: clear_selection,
    setup_dragging_changes: drop_tentative_anchor,
    indices_and_points: add_handle_plan,
};

static DELETE_HANDLE: Strategy = Strategy {
    setup_contour_changes: delete_handle,
    setup_initial_changes: select_handle_neighbor,
    setup_dragging_changes: no_changes,
    indices_and_points: no_handles,
};

static CLOSE_CONTOUR: Strategy = Strategy {
    setup_contour_changes: close_contour,
    setup_initial_changes: select_contour_start,
    setup_dragging_changes: no_changes,
    indices_and_points: close_contour_plan,
};

/// State of one pen gesture
#[derive(Debug)]
pub struct PenBehavior<'a> {
    path: &'a mut PackedPath,
    kind: BehaviorKind,
    contour_index: usize,
    contour_point_index: usize,
    should_append: bool,
    anchor: Point,
    curve_type: PointType,
    round: bool,
    contour_start_point: usize,
    handle_in: Option<usize>,
    handle_out: Option<usize>,
    rollback: Vec<PathEdit>,
    edits: Vec<PathEdit>,
    incremental: Vec<PathEdit>,
    selection: Selection,
}

impl<'a> PenBehavior<'a> {
    /// Build a behavior and record its contour setup and initial change.
    ///
    /// On error every recorded edit is reverted and the path is as before.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        path: &'a mut PackedPath,
        kind: BehaviorKind,
        contour_index: usize,
        contour_point_index: usize,
        should_append: bool,
        anchor: Point,
        curve_type: PointType,
        round: bool,
    ) -> Result<Self, PathError> {
        let mut behavior = Self {
            path,
            kind,
            contour_index,
            contour_point_index,
            should_append,
            anchor,
            curve_type,
            round,
            contour_start_point: 0,
            handle_in: None,
            handle_out: None,
            rollback: Vec::new(),
            edits: Vec::new(),
            incremental: Vec::new(),
            selection: Selection::new(),
        };
        if let Err(err) = behavior.setup() {
            behavior.abort();
            return Err(err);
        }
        Ok(behavior)
    }

    fn setup(&mut self) -> Result<(), PathError> {
        let strategy = self.kind.strategy();
        (strategy.setup_contour_changes)(self)?;
        self.contour_start_point = if self.contour_index >= self.path.num_contours() {
            self.path.num_points()
        } else {
            self.path.absolute_point_index(self.contour_index, 0, true)?
        };
        (strategy.setup_initial_changes)(self)
    }

    pub fn kind(&self) -> BehaviorKind {
        self.kind
    }

    pub fn wants_initial_change(&self) -> bool {
        self.kind.wants_initial_change()
    }

    pub fn wants_drag(&self) -> bool {
        self.kind.wants_drag()
    }

    pub fn undo_label(&self) -> &'static str {
        self.kind.undo_label()
    }

    /// Selection to show for the current state of the gesture
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn path(&self) -> &PackedPath {
        self.path
    }

    /// Record a group of edits. If any fails, the whole group is reverted.
    fn record(
        &mut self,
        f: impl FnOnce(&mut PathChangeRecorder<'_>) -> Result<(), PathError>,
    ) -> Result<(), PathError> {
        let mark = self.rollback.len();
        let mut recorder = PathChangeRecorder::new(self.path, Some(&mut self.rollback), &mut self.edits);
        let result = f(&mut recorder);
        if result.is_err() {
            for inverse in self.rollback.drain(mark..).rev() {
                if let Err(err) = inverse.apply(self.path) {
                    tracing::warn!("Failed to revert partial edit group: {err}");
                }
            }
            self.edits.truncate(mark);
        }
        result
    }

    /// Remove the most recent edit and revert it on the path
    pub fn drop_last_change(&mut self) -> Result<(), PathError> {
        let (Some(inverse), Some(_)) = (self.rollback.pop(), self.edits.pop()) else {
            return Ok(());
        };
        inverse.apply(self.path)
    }

    /// Switch from click to drag: retract the tentative change and insert
    /// the points the pointer will shape
    pub fn start_dragging(&mut self) -> Result<(), PathError> {
        let strategy = self.kind.strategy();
        (strategy.setup_dragging_changes)(self)?;
        let plan = (strategy.indices_and_points)(self);
        let contour_index = self.contour_index;
        self.record(|recorder| {
            for (index, point) in plan.inserts {
                recorder.insert_point(contour_index, index, point)?;
            }
            Ok(())
        })?;
        self.handle_in = plan.handle_in;
        self.handle_out = plan.handle_out;
        if let Some(handle_out) = self.handle_out {
            self.selection = Selection::point(self.contour_start_point + handle_out);
        }
        tracing::debug!(
            "Pen drag started: {:?}, handle in {:?}, handle out {:?}",
            self.kind,
            self.handle_in,
            self.handle_out
        );
        Ok(())
    }

    /// Move the tracking handles for a pointer position. Replaces the
    /// previous incremental change.
    pub fn incremental_change(&mut self, point: Point, constrain: bool) -> Result<ChangeRecord, PathError> {
        let mut handle_out = if constrain {
            shift_constrain(self.anchor, point)
        } else {
            point
        };
        if self.round {
            handle_out = round_point(handle_out);
        }
        let start = self.contour_start_point;
        let anchor = self.anchor;
        let (handle_in_index, handle_out_index) = (self.handle_in, self.handle_out);

        self.incremental.clear();
        let mut recorder = PathChangeRecorder::new(self.path, None, &mut self.incremental);
        if let Some(index) = handle_out_index {
            recorder.set_point_position(start + index, handle_out)?;
        }
        if let Some(index) = handle_in_index {
            recorder.set_point_position(start + index, opposite_handle(anchor, handle_out))?;
        }
        Ok(forward_record(&self.incremental))
    }

    /// Change that undoes everything recorded so far
    pub fn rollback_change(&self) -> ChangeRecord {
        rollback_record(&self.rollback)
    }

    /// Change recorded by the click and drag setup
    pub fn initial_change(&self) -> ChangeRecord {
        forward_record(&self.edits)
    }

    /// Initial change plus the last incremental change
    pub fn final_change(&self) -> ChangeRecord {
        let all = self.edits.iter().chain(&self.incremental).cloned();
        ChangeRecord::from_edits(&consolidate(all))
    }

    /// Revert every recorded edit on the path
    pub fn abort(&mut self) {
        for inverse in self.rollback.iter().rev() {
            if let Err(err) = inverse.apply(self.path) {
                tracing::warn!("Failed to roll back pen edit: {err}");
            }
        }
        self.rollback.clear();
        self.edits.clear();
        self.incremental.clear();
    }
}

// ============================================================================
// STRATEGY STEPS
// ============================================================================

fn no_changes(_: &mut PenBehavior<'_>) -> Result<(), PathError> {
    Ok(())
}

fn insert_empty_contour(b: &mut PenBehavior<'_>) -> Result<(), PathError> {
    let contour_index = b.contour_index;
    b.record(|recorder| recorder.insert_contour(contour_index, Contour::empty()))
}

fn insert_anchor(b: &mut PenBehavior<'_>) -> Result<(), PathError> {
    b.selection = Selection::point(b.contour_start_point + b.contour_point_index);
    let (contour_index, point_index) = (b.contour_index, b.contour_point_index);
    let anchor = PathPoint::on_curve(b.anchor);
    b.record(|recorder| recorder.insert_point(contour_index, point_index, anchor))
}

fn drop_tentative_anchor(b: &mut PenBehavior<'_>) -> Result<(), PathError> {
    b.drop_last_change()
}

fn clear_selection(b: &mut PenBehavior<'_>) -> Result<(), PathError> {
    b.selection = Selection::new();
    Ok(())
}

/// Turn the neighbor of the clicked handle into a plain on-curve point
/// and delete the handle
fn delete_handle(b: &mut PenBehavior<'_>) -> Result<(), PathError> {
    let (contour_index, point_index) = (b.contour_index, b.contour_point_index);
    let absolute = b.path.absolute_point_index(contour_index, point_index, false)?;
    let neighbor = if b.should_append {
        absolute.checked_sub(1).ok_or(PathError::PointIndexOutOfRange {
            index: absolute,
            count: b.path.num_points(),
        })?
    } else {
        absolute + 1
    };
    b.record(|recorder| {
        recorder.set_point_type(neighbor, PointType::OnCurve, false)?;
        recorder.delete_point(contour_index, point_index)
    })
}

fn select_handle_neighbor(b: &mut PenBehavior<'_>) -> Result<(), PathError> {
    let deleted = b.contour_start_point + b.contour_point_index;
    b.selection = Selection::point(if b.should_append { deleted - 1 } else { deleted });
    Ok(())
}

/// Close the contour. When extending backwards from the first point, the
/// last point moves to the front so the clicked point becomes the start.
fn close_contour(b: &mut PenBehavior<'_>) -> Result<(), PathError> {
    let contour_index = b.contour_index;
    let should_append = b.should_append;
    b.record(|recorder| {
        recorder.open_close_contour(contour_index, true)?;
        if !should_append {
            let last = recorder.path().num_points_of_contour(contour_index)? - 1;
            let point = recorder.path().contour_point(contour_index, last)?;
            recorder.delete_point(contour_index, last)?;
            recorder.insert_point(contour_index, 0, point)?;
        }
        Ok(())
    })?;
    b.anchor = b.path.contour_point(contour_index, 0)?.position();
    Ok(())
}

fn select_contour_start(b: &mut PenBehavior<'_>) -> Result<(), PathError> {
    b.selection = Selection::point(b.contour_start_point);
    Ok(())
}

// ============================================================================
// HANDLE PLANS
// ============================================================================

impl PenBehavior<'_> {
    fn handle_point(&self) -> PathPoint {
        PathPoint::off_curve(self.anchor, self.curve_type)
    }
}

fn no_handles(_: &PenBehavior<'_>) -> HandlePlan {
    HandlePlan::default()
}

/// Off-curve, smooth anchor, off-curve
fn smooth_anchor_plan(b: &PenBehavior<'_>) -> HandlePlan {
    let handle = b.handle_point();
    let anchor = PathPoint::smooth(b.anchor);
    let cpi = b.contour_point_index;
    if b.should_append {
        HandlePlan {
            handle_in: Some(cpi),
            handle_out: Some(cpi + 2),
            inserts: vec![(cpi, handle.clone()), (cpi + 1, anchor), (cpi + 2, handle)],
        }
    } else {
        HandlePlan {
            handle_in: Some(2),
            handle_out: Some(0),
            inserts: vec![(0, handle.clone()), (0, anchor), (0, handle)],
        }
    }
}

/// Anchor plus one outgoing handle
fn single_handle_plan(b: &PenBehavior<'_>) -> HandlePlan {
    let handle = b.handle_point();
    let anchor = PathPoint::on_curve(b.anchor);
    let cpi = b.contour_point_index;
    if b.should_append {
        HandlePlan {
            handle_in: None,
            handle_out: Some(cpi + 1),
            inserts: vec![(cpi, anchor), (cpi + 1, handle)],
        }
    } else {
        HandlePlan {
            handle_in: None,
            handle_out: Some(0),
            inserts: vec![(0, anchor), (0, handle)],
        }
    }
}

/// One handle next to the re-clicked endpoint
fn add_handle_plan(b: &PenBehavior<'_>) -> HandlePlan {
    let index = if b.should_append {
        b.contour_point_index + 1
    } else {
        0
    };
    HandlePlan {
        handle_in: None,
        handle_out: Some(index),
        inserts: vec![(index, b.handle_point())],
    }
}

/// One handle on the closing segment, mirrored through the start point
fn close_contour_plan(b: &PenBehavior<'_>) -> HandlePlan {
    let index = if b.should_append {
        b.contour_point_index
    } else {
        1
    };
    HandlePlan {
        handle_in: Some(index),
        handle_out: None,
        inserts: vec![(index, b.handle_point())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_line() -> PackedPath {
        let mut path = PackedPath::new();
        path.move_to(Point::new(0.0, 0.0));
        path.line_to(Point::new(100.0, 0.0));
        path
    }

    fn build<'a>(
        path: &'a mut PackedPath,
        kind: BehaviorKind,
        contour_point_index: usize,
        should_append: bool,
        anchor: Point,
    ) -> PenBehavior<'a> {
        PenBehavior::new(
            path,
            kind,
            0,
            contour_point_index,
            should_append,
            anchor,
            PointType::OffCurveCubic,
            true,
        )
        .unwrap()
    }

    #[test]
    fn add_points_drag_inserts_smooth_anchor_with_handles() {
        let mut path = open_line();
        path.set_point_type(1, PointType::OffCurveCubic, false).unwrap();
        let original = path.clone();
        let mut b = build(&mut path, BehaviorKind::AddPoints, 2, true, Point::new(200.0, 0.0));
        assert_eq!(b.path().num_points(), 3);
        assert_eq!(b.selection(), &Selection::point(2));

        b.start_dragging().unwrap();
        assert_eq!(b.path().num_points(), 5);
        assert_eq!(b.selection(), &Selection::point(4));

        b.incremental_change(Point::new(220.4, 30.6), false).unwrap();
        assert_eq!(b.path().point_position(4).unwrap(), Point::new(220.0, 31.0));
        assert_eq!(b.path().point_position(2).unwrap(), Point::new(180.0, -31.0));
        assert!(b.path().point(3).unwrap().smooth);

        let mut copy = original.clone();
        b.final_change().apply(&mut copy).unwrap();
        assert_eq!(&copy, b.path());

        b.rollback_change().apply(&mut copy).unwrap();
        assert_eq!(copy, original);
    }

    #[test]
    fn prepend_single_handle_goes_to_front() {
        let mut path = open_line();
        let mut b = build(
            &mut path,
            BehaviorKind::AddPointsSingleHandle,
            0,
            false,
            Point::new(-50.0, 0.0),
        );
        b.start_dragging().unwrap();
        b.incremental_change(Point::new(-50.0, 40.0), false).unwrap();
        let contour = b.path().unpacked_contour(0).unwrap();
        assert_eq!(contour.points.len(), 4);
        assert!(contour.points[0].is_off_curve());
        assert_eq!(contour.points[0].position(), Point::new(-50.0, 40.0));
        assert_eq!(contour.points[1].position(), Point::new(-50.0, 0.0));
        assert_eq!(b.selection(), &Selection::point(0));
    }

    #[test]
    fn add_contour_starts_new_contour() {
        let mut path = open_line();
        let mut b = PenBehavior::new(
            &mut path,
            BehaviorKind::AddContourAndPoints,
            1,
            0,
            true,
            Point::new(10.0, 10.0),
            PointType::OffCurveQuad,
            true,
        )
        .unwrap();
        assert_eq!(b.path().num_contours(), 2);
        assert_eq!(b.selection(), &Selection::point(2));

        b.start_dragging().unwrap();
        b.incremental_change(Point::new(30.0, 10.0), false).unwrap();
        let contour = b.path().unpacked_contour(1).unwrap();
        assert_eq!(contour.points.len(), 2);
        assert_eq!(contour.points[1].typ, PointType::OffCurveQuad);
        assert_eq!(contour.points[1].position(), Point::new(30.0, 10.0));
        assert_eq!(b.selection(), &Selection::point(3));
    }

    #[test]
    fn add_handle_has_no_initial_change() {
        let mut path = open_line();
        let original = path.clone();
        let mut b = build(&mut path, BehaviorKind::AddHandle, 1, true, Point::new(100.0, 0.0));
        assert!(b.initial_change().is_empty());
        assert!(b.selection().is_empty());
        assert_eq!(b.path(), &original);

        b.start_dragging().unwrap();
        b.incremental_change(Point::new(100.0, 50.0), false).unwrap();
        assert_eq!(b.path().num_points(), 3);
        assert_eq!(b.path().point_position(2).unwrap(), Point::new(100.0, 50.0));
    }

    #[test]
    fn delete_handle_converts_neighbor() {
        let mut path = open_line();
        path.cubic_curve_to(Point::new(150.0, 0.0), Point::new(200.0, 50.0), Point::new(200.0, 100.0));
        path.line_to(Point::new(250.0, 100.0));
        path.append_point(0, &PathPoint::off_curve(Point::new(300.0, 100.0), PointType::OffCurveCubic))
            .unwrap();
        path.set_point_type(5, PointType::OnCurve, true).unwrap();
        let mut b = build(&mut path, BehaviorKind::DeleteHandle, 6, true, Point::new(300.0, 100.0));
        assert_eq!(b.path().num_points(), 6);
        assert_eq!(b.path().point(5).unwrap(), PathPoint::on_curve(Point::new(250.0, 100.0)));
        assert_eq!(b.selection(), &Selection::point(5));
        assert!(b.start_dragging().is_ok());
    }

    #[test]
    fn close_prepending_reroots_contour() {
        let mut path = open_line();
        path.line_to(Point::new(100.0, 100.0));
        let mut b = build(
            &mut path,
            BehaviorKind::CloseContourDrag,
            0,
            false,
            Point::new(101.0, 99.0),
        );
        let contour = b.path().unpacked_contour(0).unwrap();
        assert!(contour.is_closed);
        assert_eq!(contour.points[0].position(), Point::new(100.0, 100.0));
        assert_eq!(contour.points[1].position(), Point::new(0.0, 0.0));
        assert_eq!(b.selection(), &Selection::point(0));

        b.start_dragging().unwrap();
        b.incremental_change(Point::new(120.0, 100.0), false).unwrap();
        // the closing handle sits before the old start point, mirrored
        // through the re-rooted start
        assert_eq!(b.path().point_position(1).unwrap(), Point::new(80.0, 100.0));
        assert_eq!(b.selection(), &Selection::point(0));
    }

    #[test]
    fn constrained_handle_snaps_to_diagonal() {
        let mut path = open_line();
        let mut b = build(&mut path, BehaviorKind::AddHandle, 1, true, Point::new(100.0, 0.0));
        b.start_dragging().unwrap();
        b.incremental_change(Point::new(110.0, 8.0), true).unwrap();
        assert_eq!(b.path().point_position(2).unwrap(), Point::new(109.0, 9.0));
    }

    #[test]
    fn failed_setup_leaves_path_untouched() {
        let mut path = open_line();
        let original = path.clone();
        let result = PenBehavior::new(
            &mut path,
            BehaviorKind::AddPoints,
            0,
            7,
            true,
            Point::ZERO,
            PointType::OffCurveCubic,
            true,
        );
        assert!(result.is_err());
        assert_eq!(path, original);
    }

    #[test]
    fn abort_restores_path() {
        let mut path = open_line();
        let original = path.clone();
        let mut b = build(&mut path, BehaviorKind::AddPointsSingleHandle, 2, true, Point::new(150.0, 0.0));
        b.start_dragging().unwrap();
        b.incremental_change(Point::new(170.0, 20.0), false).unwrap();
        b.abort();
        assert_eq!(path, original);
    }

    #[test]
    fn drop_last_change_on_empty_history_is_noop() {
        let mut path = open_line();
        let mut b = build(&mut path, BehaviorKind::AddHandle, 1, true, Point::new(100.0, 0.0));
        assert!(b.drop_last_change().is_ok());
        assert_eq!(b.path().num_points(), 2);
    }
}
