// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Decomposed affine transforms, as stored on components.
//!
//! A decomposed transform keeps translation, rotation (degrees), scale and
//! skew (degrees) as separate fields around a transformation center, so it
//! can be interpolated field by field between masters.

use kurbo::{Affine, Vec2};
use serde::{Deserialize, Serialize};

const EPSILON: f64 = 1e-15;

/// A transform split into interpolatable components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecomposedTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub skew_x: f64,
    pub skew_y: f64,
    pub t_center_x: f64,
    pub t_center_y: f64,
}

impl Default for DecomposedTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl DecomposedTransform {
    pub const IDENTITY: Self = Self {
        translate_x: 0.0,
        translate_y: 0.0,
        rotation: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        skew_x: 0.0,
        skew_y: 0.0,
        t_center_x: 0.0,
        t_center_y: 0.0,
    };

    /// Compose the fields into a single affine matrix
    pub fn to_affine(&self) -> Affine {
        let center = Vec2::new(self.t_center_x, self.t_center_y);
        Affine::translate(Vec2::new(self.translate_x, self.translate_y) + center)
            * rotation(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::skew(
                self.skew_x.to_radians().tan(),
                self.skew_y.to_radians().tan(),
            )
            * Affine::translate(-center)
    }

    /// Decompose an affine matrix (QR-like decomposition, center at origin)
    pub fn from_affine(affine: Affine) -> Self {
        let [mut a, mut b, c, d, dx, dy] = affine.as_coeffs();

        let sx = if a < 0.0 { -1.0 } else { 1.0 };
        if sx < 0.0 {
            a *= sx;
            b *= sx;
        }
        let delta = a * d - b * c;

        let mut rotation = 0.0;
        let (mut scale_x, mut scale_y) = (0.0, 0.0);
        let (mut skew_x, mut skew_y) = (0.0, 0.0);

        if a != 0.0 || b != 0.0 {
            let r = (a * a + b * b).sqrt();
            rotation = if b >= 0.0 {
                (a / r).acos()
            } else {
                -(a / r).acos()
            };
            scale_x = r;
            scale_y = delta / r;
            skew_x = ((a * c + b * d) / (r * r)).atan();
        } else if c != 0.0 || d != 0.0 {
            let s = (c * c + d * d).sqrt();
            rotation = std::f64::consts::FRAC_PI_2
                - if d >= 0.0 {
                    (-c / s).acos()
                } else {
                    -(c / s).acos()
                };
            scale_x = delta / s;
            scale_y = s;
            skew_y = ((a * c + b * d) / (s * s)).atan();
        }

        Self {
            translate_x: dx,
            translate_y: dy,
            rotation: rotation.to_degrees(),
            scale_x: scale_x * sx,
            scale_y,
            skew_x: skew_x.to_degrees() * sx,
            skew_y: skew_y.to_degrees(),
            t_center_x: 0.0,
            t_center_y: 0.0,
        }
    }

    /// Prepend `transform`, keeping this transform's center
    pub fn prepend(&self, transform: Affine) -> Self {
        let center = Vec2::new(self.t_center_x, self.t_center_y);
        let combined =
            Affine::translate(-center) * transform * self.to_affine() * Affine::translate(center);
        let mut decomposed = Self::from_affine(combined);
        decomposed.t_center_x = self.t_center_x;
        decomposed.t_center_y = self.t_center_y;
        decomposed
    }
}

/// Rotation matrix with sin/cos snapped to 0 and ±1
fn rotation(angle: f64) -> Affine {
    let c = norm_sin_cos(angle.cos());
    let s = norm_sin_cos(angle.sin());
    Affine::new([c, s, -s, c, 0.0, 0.0])
}

fn norm_sin_cos(v: f64) -> f64 {
    if v.abs() < EPSILON {
        0.0
    } else if v > 1.0 - EPSILON {
        1.0
    } else if v < -1.0 + EPSILON {
        -1.0
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn assert_close(a: Point, b: Point) {
        assert!((a - b).hypot() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn identity_is_identity() {
        assert_eq!(DecomposedTransform::IDENTITY.to_affine(), Affine::IDENTITY);
    }

    #[test]
    fn quarter_rotation_is_exact() {
        let t = DecomposedTransform {
            rotation: 90.0,
            ..Default::default()
        };
        assert_eq!(t.to_affine().as_coeffs(), [0.0, 1.0, -1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn decompose_round_trips() {
        let t = DecomposedTransform {
            translate_x: 20.0,
            translate_y: -5.0,
            rotation: 30.0,
            scale_x: 2.0,
            scale_y: 0.5,
            skew_x: 10.0,
            ..Default::default()
        };
        let affine = t.to_affine();
        let back = DecomposedTransform::from_affine(affine).to_affine();
        for p in [Point::new(0.0, 0.0), Point::new(100.0, 50.0), Point::new(-7.0, 3.0)] {
            assert_close(affine * p, back * p);
        }
    }

    #[test]
    fn center_is_fixed_point_of_rotation() {
        let t = DecomposedTransform {
            rotation: 45.0,
            t_center_x: 100.0,
            t_center_y: 100.0,
            ..Default::default()
        };
        assert_close(t.to_affine() * Point::new(100.0, 100.0), Point::new(100.0, 100.0));
    }

    #[test]
    fn prepend_keeps_center() {
        let t = DecomposedTransform {
            t_center_x: 10.0,
            t_center_y: 20.0,
            ..Default::default()
        };
        let moved = t.prepend(Affine::translate((5.0, 0.0)));
        assert_eq!(moved.t_center_x, 10.0);
        assert_eq!(moved.t_center_y, 20.0);
    }
}
