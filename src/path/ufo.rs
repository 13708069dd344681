// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Conversion between packed paths and UFO contours (norad).
//!
//! UFO marks the curve type on the on-curve point that ends a segment,
//! while packed paths mark it on the off-curve points. Open contours start
//! with a `move` point. Point names round-trip through the `name` attribute.

use super::{Attrs, PackedPath, PathPoint, PointType, UnpackedContour};
use norad::PointType as UfoPointType;

const NAME_ATTR: &str = "name";

impl PackedPath {
    /// Build a packed path from UFO glyph contours
    pub fn from_norad_contours(contours: &[norad::Contour]) -> Self {
        let unpacked: Vec<UnpackedContour> = contours.iter().map(convert_contour).collect();
        PackedPath::from_unpacked_contours(&unpacked)
    }

    /// Convert to UFO glyph contours
    pub fn to_norad_contours(&self) -> Vec<norad::Contour> {
        self.iter_contours().map(|c| to_norad_contour(&c)).collect()
    }
}

fn convert_contour(contour: &norad::Contour) -> UnpackedContour {
    let points = &contour.points;
    let is_closed = points
        .first()
        .is_none_or(|pt| pt.typ != UfoPointType::Move);

    let converted = points
        .iter()
        .enumerate()
        .map(|(i, pt)| {
            let typ = match pt.typ {
                UfoPointType::OffCurve => off_curve_type(points, i, is_closed),
                _ => PointType::OnCurve,
            };
            let attrs = pt.name.as_ref().map(|name| {
                let mut attrs = Attrs::new();
                attrs.insert(NAME_ATTR.into(), serde_json::Value::String(name.to_string()));
                attrs
            });
            PathPoint {
                x: pt.x,
                y: pt.y,
                typ,
                smooth: pt.smooth && typ.is_on_curve(),
                attrs,
            }
        })
        .collect();

    UnpackedContour {
        points: converted,
        is_closed,
    }
}

/// Off-curve points take their type from the on-curve point that ends
/// their run; runs that never end are quadratic.
fn off_curve_type(points: &[norad::ContourPoint], index: usize, is_closed: bool) -> PointType {
    let n = points.len();
    let limit = if is_closed { n } else { n - index };
    for step in 1..limit {
        let next = if is_closed {
            &points[(index + step) % n]
        } else {
            &points[index + step]
        };
        match next.typ {
            UfoPointType::OffCurve => continue,
            UfoPointType::QCurve => return PointType::OffCurveQuad,
            _ => return PointType::OffCurveCubic,
        }
    }
    PointType::OffCurveQuad
}

fn to_norad_contour(contour: &UnpackedContour) -> norad::Contour {
    let points = &contour.points;
    let n = points.len();
    let converted = points
        .iter()
        .enumerate()
        .map(|(i, pt)| {
            let typ = if pt.is_off_curve() {
                UfoPointType::OffCurve
            } else if i == 0 && !contour.is_closed {
                UfoPointType::Move
            } else {
                let previous = if i == 0 { n - 1 } else { i - 1 };
                match points[previous].typ {
                    PointType::OnCurve => UfoPointType::Line,
                    PointType::OffCurveQuad => UfoPointType::QCurve,
                    PointType::OffCurveCubic => UfoPointType::Curve,
                }
            };
            let name = pt
                .attrs
                .as_ref()
                .and_then(|attrs| attrs.get(NAME_ATTR))
                .and_then(|value| value.as_str())
                .and_then(|name| norad::Name::new(name).ok());
            norad::ContourPoint::new(pt.x, pt.y, typ, pt.smooth, name, None, None)
        })
        .collect();
    norad::Contour::new(converted, None, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn ufo_point(x: f64, y: f64, typ: UfoPointType, smooth: bool) -> norad::ContourPoint {
        norad::ContourPoint::new(x, y, typ, smooth, None, None, None)
    }

    #[test]
    fn open_ufo_contour_starts_with_move() {
        let mut path = PackedPath::new();
        path.move_to(Point::new(0.0, 0.0));
        path.cubic_curve_to(Point::new(0.0, 10.0), Point::new(10.0, 20.0), Point::new(20.0, 20.0));
        let contours = path.to_norad_contours();
        let types: Vec<_> = contours[0].points.iter().map(|p| p.typ.clone()).collect();
        assert_eq!(
            types,
            vec![
                UfoPointType::Move,
                UfoPointType::OffCurve,
                UfoPointType::OffCurve,
                UfoPointType::Curve,
            ]
        );
        assert_eq!(PackedPath::from_norad_contours(&contours), path);
    }

    #[test]
    fn closed_contour_wraps_curve_type() {
        let contour = norad::Contour::new(
            vec![
                ufo_point(0.0, 0.0, UfoPointType::QCurve, true),
                ufo_point(100.0, 0.0, UfoPointType::Line, false),
                ufo_point(100.0, 100.0, UfoPointType::OffCurve, false),
            ],
            None,
            None,
        );
        let path = PackedPath::from_norad_contours(&[contour]);
        assert!(path.is_contour_closed(0).unwrap());
        let last = path.point(2).unwrap();
        assert_eq!(last.typ, PointType::OffCurveQuad);
        assert!(path.point(0).unwrap().smooth);

        let back = path.to_norad_contours();
        assert_eq!(back[0].points[0].typ, UfoPointType::QCurve);
        assert_eq!(back[0].points[1].typ, UfoPointType::Line);
    }

    #[test]
    fn point_names_become_attributes() {
        let mut path = PackedPath::new();
        path.move_to(Point::new(0.0, 0.0));
        path.line_to(Point::new(5.0, 0.0));
        let mut attrs = Attrs::new();
        attrs.insert(NAME_ATTR.into(), serde_json::json!("tip"));
        path.set_point_attrs(1, Some(attrs)).unwrap();

        let contours = path.to_norad_contours();
        assert_eq!(contours[0].points[1].name.as_ref().map(|n| n.to_string()), Some("tip".to_string()));
        assert_eq!(PackedPath::from_norad_contours(&contours), path);
    }
}
