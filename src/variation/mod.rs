// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Itemwise algebra for interpolating between compatible values.
//!
//! Interpolating a glyph between two masters is done with three
//! operations: add, subtract and scale. They are defined structurally:
//! numbers use arithmetic, paths combine their coordinate buffers,
//! decomposed transforms combine field by field, and anything that does
//! not match structurally is an error rather than a silent coercion.

mod value;

pub use value::VarValue;

use crate::error::VariationError;
use crate::geometry::DecomposedTransform;
use crate::path::PackedPath;

/// Values that can be added and subtracted item by item
pub trait Itemwise: Sized {
    fn add_itemwise(&self, other: &Self) -> Result<Self, VariationError>;
    fn sub_itemwise(&self, other: &Self) -> Result<Self, VariationError>;
}

/// Values that can be multiplied by a scalar
pub trait ScalarMul: Sized {
    fn mul_scalar(&self, scalar: f64) -> Self;
}

pub fn add_itemwise<T: Itemwise>(a: &T, b: &T) -> Result<T, VariationError> {
    a.add_itemwise(b)
}

pub fn sub_itemwise<T: Itemwise>(a: &T, b: &T) -> Result<T, VariationError> {
    a.sub_itemwise(b)
}

/// Multiply by a scalar. A scalar of exactly 1 returns a clone untouched.
pub fn mul_scalar<T: ScalarMul + Clone>(value: &T, scalar: f64) -> T {
    if scalar == 1.0 {
        return value.clone();
    }
    value.mul_scalar(scalar)
}

/// Linear interpolation `a + (b - a) * t`
pub fn interpolate<T>(a: &T, b: &T, t: f64) -> Result<T, VariationError>
where
    T: Itemwise + ScalarMul + Clone,
{
    let delta = b.sub_itemwise(a)?;
    a.add_itemwise(&mul_scalar(&delta, t))
}

/// Sum of `delta * scalar` over all deltas, skipping zero scalars.
///
/// Returns `None` when every scalar is zero.
pub fn interpolate_from_deltas<T>(deltas: &[T], scalars: &[f64]) -> Result<Option<T>, VariationError>
where
    T: Itemwise + ScalarMul + Clone,
{
    if deltas.len() != scalars.len() {
        return Err(VariationError::IncompatibleLength(deltas.len(), scalars.len()));
    }
    let mut result: Option<T> = None;
    for (delta, &scalar) in deltas.iter().zip(scalars) {
        if scalar == 0.0 {
            continue;
        }
        let contribution = mul_scalar(delta, scalar);
        result = Some(match result {
            Some(sum) => sum.add_itemwise(&contribution)?,
            None => contribution,
        });
    }
    Ok(result)
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl Itemwise for f64 {
    fn add_itemwise(&self, other: &Self) -> Result<Self, VariationError> {
        Ok(self + other)
    }

    fn sub_itemwise(&self, other: &Self) -> Result<Self, VariationError> {
        Ok(self - other)
    }
}

impl ScalarMul for f64 {
    fn mul_scalar(&self, scalar: f64) -> Self {
        self * scalar
    }
}

impl PackedPath {
    fn check_interpolatable(&self, other: &PackedPath) -> Result<(), VariationError> {
        if !self.is_compatible(other) {
            return Err(VariationError::IncompatibleShape(format!(
                "contour structure differs ({} contours / {} points vs {} contours / {} points)",
                self.num_contours(),
                self.num_points(),
                other.num_contours(),
                other.num_points()
            )));
        }
        if self.point_types() != other.point_types() {
            return Err(VariationError::IncompatibleShape(
                "point types differ".to_string(),
            ));
        }
        Ok(())
    }
}

impl Itemwise for PackedPath {
    fn add_itemwise(&self, other: &Self) -> Result<Self, VariationError> {
        self.check_interpolatable(other)?;
        Ok(self.zip_coordinates(other, |a, b| a + b))
    }

    fn sub_itemwise(&self, other: &Self) -> Result<Self, VariationError> {
        self.check_interpolatable(other)?;
        Ok(self.zip_coordinates(other, |a, b| a - b))
    }
}

impl ScalarMul for PackedPath {
    fn mul_scalar(&self, scalar: f64) -> Self {
        self.map_coordinates(|v| v * scalar)
    }
}

impl DecomposedTransform {
    fn zip_fields(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        Self {
            translate_x: f(self.translate_x, other.translate_x),
            translate_y: f(self.translate_y, other.translate_y),
            rotation: f(self.rotation, other.rotation),
            scale_x: f(self.scale_x, other.scale_x),
            scale_y: f(self.scale_y, other.scale_y),
            skew_x: f(self.skew_x, other.skew_x),
            skew_y: f(self.skew_y, other.skew_y),
            t_center_x: f(self.t_center_x, other.t_center_x),
            t_center_y: f(self.t_center_y, other.t_center_y),
        }
    }
}

impl Itemwise for DecomposedTransform {
    fn add_itemwise(&self, other: &Self) -> Result<Self, VariationError> {
        Ok(self.zip_fields(other, |a, b| a + b))
    }

    fn sub_itemwise(&self, other: &Self) -> Result<Self, VariationError> {
        Ok(self.zip_fields(other, |a, b| a - b))
    }
}

impl ScalarMul for DecomposedTransform {
    fn mul_scalar(&self, scalar: f64) -> Self {
        self.zip_fields(self, |a, _| a * scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::tests::two_contour_path;
    use kurbo::{Affine, Point};

    fn assert_paths_close(a: &PackedPath, b: &PackedPath) {
        assert!(a.is_compatible(b));
        for (x, y) in a.coordinates().iter().zip(b.coordinates()) {
            assert!((x - y).abs() < crate::settings::interpolation::EPSILON, "{x} != {y}");
        }
    }

    #[test]
    fn path_sub_then_add_round_trips() {
        let a = two_contour_path().transformed(&Affine::new([1.3, 0.2, -0.1, 0.9, 7.5, -3.25]));
        let b = two_contour_path();
        let delta = sub_itemwise(&a, &b).unwrap();
        let back = add_itemwise(&delta, &b).unwrap();
        assert_paths_close(&back, &a);
    }

    #[test]
    fn mul_scalar_one_is_identity() {
        let path = two_contour_path();
        assert_eq!(mul_scalar(&path, 1.0), path);
        let t = DecomposedTransform {
            rotation: 12.0,
            ..Default::default()
        };
        assert_eq!(mul_scalar(&t, 1.0), t);
    }

    #[test]
    fn incompatible_paths_fail() {
        let a = two_contour_path();
        let mut b = a.clone();
        b.line_to(Point::new(1.0, 1.0));
        assert!(matches!(
            a.add_itemwise(&b),
            Err(VariationError::IncompatibleShape(_))
        ));

        let mut c = a.clone();
        c.set_point_type(0, crate::path::PointType::OnCurve, true).unwrap();
        assert!(matches!(
            a.sub_itemwise(&c),
            Err(VariationError::IncompatibleShape(_))
        ));
    }

    #[test]
    fn interpolate_halfway() {
        let a = two_contour_path();
        let b = a.transformed(&Affine::translate((100.0, 0.0)));
        let mid = interpolate(&a, &b, 0.5).unwrap();
        assert_eq!(mid.point_position(0).unwrap(), Point::new(50.0, 0.0));
    }

    #[test]
    fn deltas_skip_zero_scalars() {
        let deltas = [1.0, 10.0, 100.0];
        assert_eq!(interpolate_from_deltas(&deltas, &[1.0, 0.0, 0.5]).unwrap(), Some(51.0));
        assert_eq!(interpolate_from_deltas(&deltas, &[0.0, 0.0, 0.0]).unwrap(), None);
        assert!(interpolate_from_deltas(&deltas, &[1.0]).is_err());
    }

    #[test]
    fn transform_fields_interpolate() {
        let a = DecomposedTransform::default();
        let b = DecomposedTransform {
            rotation: 90.0,
            scale_x: 3.0,
            ..Default::default()
        };
        let mid = interpolate(&a, &b, 0.5).unwrap();
        assert_eq!(mid.rotation, 45.0);
        assert_eq!(mid.scale_x, 2.0);
        assert_eq!(mid.scale_y, 1.0);
    }
}
