// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Point and contour value types for packed paths.
//!
//! Inside a `PackedPath` a point is not an object but a column in the flat
//! buffers: two coordinates, one packed type byte and an optional
//! attribute record. `PathPoint` is the unpacked copy handed out by
//! accessors and taken by insertion methods.

use crate::error::PathError;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form point attributes (point names, anchors, custom data)
pub type Attrs = BTreeMap<String, serde_json::Value>;

/// Packed type byte for an on-curve point
pub const ON_CURVE: u8 = 0x00;
/// Packed type byte for a quadratic off-curve point
pub const OFF_CURVE_QUAD: u8 = 0x01;
/// Packed type byte for a cubic off-curve point
pub const OFF_CURVE_CUBIC: u8 = 0x02;
/// Smooth flag, only valid together with `ON_CURVE`
pub const SMOOTH_FLAG: u8 = 0x08;
/// Mask selecting the type bits of a packed byte
pub const POINT_TYPE_MASK: u8 = 0x07;

/// Point type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PointType {
    /// A point the curve passes through
    #[default]
    #[serde(rename = "on")]
    OnCurve,
    /// Quadratic (TrueType-style) control point
    #[serde(rename = "quad")]
    OffCurveQuad,
    /// Cubic (PostScript-style) control point
    #[serde(rename = "cubic")]
    OffCurveCubic,
}

impl PointType {
    pub fn is_on_curve(self) -> bool {
        self == PointType::OnCurve
    }

    pub fn is_off_curve(self) -> bool {
        !self.is_on_curve()
    }

    /// Pack this type plus smooth flag into a type byte.
    ///
    /// The smooth flag is dropped for off-curve points.
    pub fn pack(self, smooth: bool) -> u8 {
        match self {
            PointType::OnCurve if smooth => ON_CURVE | SMOOTH_FLAG,
            PointType::OnCurve => ON_CURVE,
            PointType::OffCurveQuad => OFF_CURVE_QUAD,
            PointType::OffCurveCubic => OFF_CURVE_CUBIC,
        }
    }

    /// Unpack a type byte into its type and smooth flag
    pub fn unpack(byte: u8) -> Result<(PointType, bool), PathError> {
        let smooth = byte & SMOOTH_FLAG != 0;
        let typ = match byte & POINT_TYPE_MASK {
            ON_CURVE => PointType::OnCurve,
            OFF_CURVE_QUAD => PointType::OffCurveQuad,
            OFF_CURVE_CUBIC => PointType::OffCurveCubic,
            _ => return Err(PathError::BadPointType(byte)),
        };
        if byte & !(POINT_TYPE_MASK | SMOOTH_FLAG) != 0 || (smooth && typ.is_off_curve()) {
            return Err(PathError::BadPointType(byte));
        }
        Ok((typ, smooth))
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// An unpacked point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type", default)]
    pub typ: PointType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub smooth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Attrs>,
}

impl PathPoint {
    /// A plain (non-smooth) on-curve point
    pub fn on_curve(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            typ: PointType::OnCurve,
            smooth: false,
            attrs: None,
        }
    }

    /// A smooth on-curve point
    pub fn smooth(point: Point) -> Self {
        Self {
            smooth: true,
            ..Self::on_curve(point)
        }
    }

    /// An off-curve point of the given type
    pub fn off_curve(point: Point, typ: PointType) -> Self {
        Self {
            typ,
            ..Self::on_curve(point)
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_on_curve(&self) -> bool {
        self.typ.is_on_curve()
    }

    pub fn is_off_curve(&self) -> bool {
        self.typ.is_off_curve()
    }

    /// Packed type byte for this point
    pub fn packed_type(&self) -> u8 {
        self.typ.pack(self.smooth)
    }
}

/// Boundary table entry: exclusive end index plus closedness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContourInfo {
    pub end: usize,
    pub is_closed: bool,
}

/// A single contour in packed form, detached from any path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contour {
    pub coordinates: Vec<f64>,
    pub point_types: Vec<u8>,
    pub is_closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_attributes: Option<Vec<Option<Attrs>>>,
}

impl Contour {
    /// An open contour without points
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.point_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point_types.is_empty()
    }

    /// Check the buffer lengths and type bytes
    pub fn validate(&self) -> Result<(), PathError> {
        if self.coordinates.len() != 2 * self.point_types.len() {
            return Err(PathError::CoordinateCount {
                coordinates: self.coordinates.len(),
                points: self.point_types.len(),
            });
        }
        for &byte in &self.point_types {
            PointType::unpack(byte)?;
        }
        if let Some(attrs) = &self.point_attributes
            && attrs.len() != self.point_types.len()
        {
            return Err(PathError::AttributeCount {
                attributes: attrs.len(),
                points: self.point_types.len(),
            });
        }
        Ok(())
    }
}

/// A contour as a list of unpacked points
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpackedContour {
    pub points: Vec<PathPoint>,
    pub is_closed: bool,
}

impl From<&UnpackedContour> for Contour {
    fn from(unpacked: &UnpackedContour) -> Self {
        let has_attrs = unpacked.points.iter().any(|p| p.attrs.is_some());
        Contour {
            coordinates: unpacked.points.iter().flat_map(|p| [p.x, p.y]).collect(),
            point_types: unpacked.points.iter().map(PathPoint::packed_type).collect(),
            is_closed: unpacked.is_closed,
            point_attributes: has_attrs
                .then(|| unpacked.points.iter().map(|p| p.attrs.clone()).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_types() {
        for (typ, smooth) in [
            (PointType::OnCurve, false),
            (PointType::OnCurve, true),
            (PointType::OffCurveQuad, false),
            (PointType::OffCurveCubic, false),
        ] {
            assert_eq!(PointType::unpack(typ.pack(smooth)).unwrap(), (typ, smooth));
        }
    }

    #[test]
    fn smooth_flag_dropped_for_off_curve() {
        assert_eq!(PointType::OffCurveCubic.pack(true), OFF_CURVE_CUBIC);
    }

    #[test]
    fn bad_type_bytes_rejected() {
        assert_eq!(PointType::unpack(0x03), Err(PathError::BadPointType(0x03)));
        assert_eq!(PointType::unpack(0x0A), Err(PathError::BadPointType(0x0A)));
        assert_eq!(PointType::unpack(0x10), Err(PathError::BadPointType(0x10)));
    }

    #[test]
    fn point_json_shape() {
        let point = PathPoint::off_curve(Point::new(1.0, 2.0), PointType::OffCurveCubic);
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json, serde_json::json!({"x": 1.0, "y": 2.0, "type": "cubic"}));

        let back: PathPoint = serde_json::from_value(serde_json::json!({"x": 3, "y": 4})).unwrap();
        assert_eq!(back, PathPoint::on_curve(Point::new(3.0, 4.0)));
    }

    #[test]
    fn contour_validation() {
        let contour = Contour {
            coordinates: vec![0.0, 0.0, 1.0],
            point_types: vec![ON_CURVE, ON_CURVE],
            is_closed: false,
            point_attributes: None,
        };
        assert!(matches!(
            contour.validate(),
            Err(PathError::CoordinateCount { .. })
        ));
    }
}
