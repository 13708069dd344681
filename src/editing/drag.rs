// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Pointer events for drag gestures, in design-space coordinates.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys held during an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
}

/// A pointer position plus modifiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            modifiers: Modifiers::default(),
        }
    }

    /// Same event with shift held
    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One step of a drag gesture after the initial pointer-down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DragEvent {
    Move(PointerEvent),
    Release(PointerEvent),
    Cancel,
}

/// How a pointer-down gesture continued
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragStart {
    /// The pointer moved past the threshold; carries that move
    Dragging(PointerEvent),
    /// Released before reaching the threshold
    Released(PointerEvent),
    /// Cancelled, or the event stream ended without a release
    Cancelled,
}

/// Consume events until the pointer travels more than `threshold` from
/// the pointer-down position, or the gesture ends.
pub fn should_initiate_drag(
    initial: &PointerEvent,
    events: &mut impl Iterator<Item = DragEvent>,
    threshold: f64,
) -> DragStart {
    let origin = initial.position();
    for event in events {
        match event {
            DragEvent::Move(pointer) => {
                if (pointer.position() - origin).hypot() > threshold {
                    return DragStart::Dragging(pointer);
                }
            }
            DragEvent::Release(pointer) => return DragStart::Released(pointer),
            DragEvent::Cancel => return DragStart::Cancelled,
        }
    }
    DragStart::Cancelled
}
