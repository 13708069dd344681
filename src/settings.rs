// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Editing settings and configuration constants.
//!
//! The constants below are the compiled-in defaults. `PenSettings` carries
//! the same values at runtime and can be overridden from a TOML file.

use crate::path::PointType;
use serde::Deserialize;

// ============================================================================
// PEN TOOL SETTINGS
// ============================================================================
/// Minimum pointer travel (design units) before a click becomes a drag
const PEN_DRAG_THRESHOLD: f64 = 3.0;

/// Hit-test radius around points when clicking (design units)
const PEN_CLICK_MARGIN: f64 = 5.0;

/// Whether new handles are cubic (true) or quadratic (false) off-curves
const PEN_CURVE_TYPE_CUBIC: bool = true;

/// Round anchor and handle positions to whole units
const PEN_ROUND_ANCHOR: bool = true;

// ============================================================================
// INTERPOLATION SETTINGS
// ============================================================================
/// Tolerance used when comparing interpolated coordinates
const INTERPOLATION_EPSILON: f64 = 1e-9;

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Pen tool settings
pub mod pen {
    /// Drag threshold in design units
    pub const DRAG_THRESHOLD: f64 = super::PEN_DRAG_THRESHOLD;

    /// Click hit-test margin in design units
    pub const CLICK_MARGIN: f64 = super::PEN_CLICK_MARGIN;

    /// New handles are cubic off-curve points
    pub const CURVE_TYPE_CUBIC: bool = super::PEN_CURVE_TYPE_CUBIC;

    /// Round new points to integer coordinates
    pub const ROUND_ANCHOR: bool = super::PEN_ROUND_ANCHOR;
}

/// Interpolation settings
pub mod interpolation {
    pub const EPSILON: f64 = super::INTERPOLATION_EPSILON;
}

/// Runtime pen settings, loadable from TOML.
///
/// Missing keys fall back to the compiled-in defaults.
///
/// ```toml
/// drag_threshold = 4.0
/// click_margin = 6.0
/// curve_type = "quad"
/// round_anchor = false
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PenSettings {
    pub drag_threshold: f64,
    pub click_margin: f64,
    pub curve_type: CurveType,
    pub round_anchor: bool,
}

/// Kind of off-curve point the pen tool creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    Cubic,
    Quad,
}

impl Default for PenSettings {
    fn default() -> Self {
        Self {
            drag_threshold: pen::DRAG_THRESHOLD,
            click_margin: pen::CLICK_MARGIN,
            curve_type: if pen::CURVE_TYPE_CUBIC {
                CurveType::Cubic
            } else {
                CurveType::Quad
            },
            round_anchor: pen::ROUND_ANCHOR,
        }
    }
}

impl CurveType {
    /// Point type of the off-curve points this curve type creates
    pub fn point_type(self) -> PointType {
        match self {
            CurveType::Cubic => PointType::OffCurveCubic,
            CurveType::Quad => PointType::OffCurveQuad,
        }
    }
}

impl PenSettings {
    /// Parse settings from a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let settings = PenSettings::default();
        assert_eq!(settings.drag_threshold, pen::DRAG_THRESHOLD);
        assert_eq!(settings.click_margin, pen::CLICK_MARGIN);
        assert_eq!(settings.curve_type, CurveType::Cubic);
        assert!(settings.round_anchor);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings = PenSettings::from_toml_str("curve_type = \"quad\"\n").unwrap();
        assert_eq!(settings.curve_type, CurveType::Quad);
        assert_eq!(settings.drag_threshold, pen::DRAG_THRESHOLD);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(PenSettings::from_toml_str("drag_threshold = \"far\"").is_err());
    }
}
