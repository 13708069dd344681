// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Tool system for glyph editing

pub mod pen;

pub use pen::{BehaviorKind, GestureOutcome, PenScene, PenTool};
