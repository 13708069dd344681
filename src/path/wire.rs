// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! JSON wire format for packed paths.
//!
//! The wire form stores inclusive contour end points (`endPoint`, which is
//! `-1` for an empty leading contour) and point attributes as a sparse map
//! from absolute point index to attribute record.

use super::{Attrs, ContourInfo, PackedPath};
use crate::error::PathError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContourInfoWire {
    end_point: i64,
    #[serde(default)]
    is_closed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackedPathWire {
    #[serde(default)]
    coordinates: Vec<f64>,
    #[serde(default)]
    point_types: Vec<u8>,
    #[serde(default)]
    contour_info: Vec<ContourInfoWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    point_attributes: Option<BTreeMap<usize, Attrs>>,
}

impl From<&PackedPath> for PackedPathWire {
    fn from(path: &PackedPath) -> Self {
        Self {
            coordinates: path.coordinates.clone(),
            point_types: path.point_types.clone(),
            contour_info: path
                .contour_info
                .iter()
                .map(|info| ContourInfoWire {
                    end_point: info.end as i64 - 1,
                    is_closed: info.is_closed,
                })
                .collect(),
            point_attributes: path.point_attributes.as_ref().map(|column| {
                column
                    .iter()
                    .enumerate()
                    .filter_map(|(i, attrs)| attrs.clone().map(|attrs| (i, attrs)))
                    .collect()
            }),
        }
    }
}

impl TryFrom<PackedPathWire> for PackedPath {
    type Error = PathError;

    fn try_from(wire: PackedPathWire) -> Result<Self, Self::Error> {
        let contour_info = wire
            .contour_info
            .iter()
            .map(|info| {
                let end = usize::try_from(info.end_point + 1).map_err(|_| {
                    PathError::BadContourInfo(format!("negative end point {}", info.end_point))
                })?;
                Ok(ContourInfo {
                    end,
                    is_closed: info.is_closed,
                })
            })
            .collect::<Result<Vec<_>, PathError>>()?;

        let num_points = wire.point_types.len();
        let point_attributes = match wire.point_attributes {
            Some(sparse) => {
                let mut column = vec![None; num_points];
                for (index, attrs) in sparse {
                    let slot = column.get_mut(index).ok_or(PathError::PointIndexOutOfRange {
                        index,
                        count: num_points,
                    })?;
                    *slot = Some(attrs);
                }
                Some(column)
            }
            None => None,
        };

        PackedPath::from_parts(wire.coordinates, wire.point_types, contour_info, point_attributes)
    }
}

impl Serialize for PackedPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PackedPathWire::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PackedPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = PackedPathWire::deserialize(deserializer)?;
        PackedPath::try_from(wire).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Contour;
    use serde_json::json;

    #[test]
    fn wire_uses_inclusive_end_points() {
        let path = crate::path::tests::two_contour_path();
        let value = serde_json::to_value(&path).unwrap();
        assert_eq!(
            value,
            json!({
                "coordinates": [0.0, 0.0, 10.0, 0.0, 0.0, 100.0, 50.0, 150.0, 100.0, 100.0],
                "pointTypes": [0, 0, 0, 0, 0],
                "contourInfo": [
                    {"endPoint": 1, "isClosed": false},
                    {"endPoint": 4, "isClosed": true},
                ],
            })
        );
        let back: PackedPath = serde_json::from_value(value).unwrap();
        assert_eq!(back, path);
    }

    #[test]
    fn empty_leading_contour_has_minus_one() {
        let mut path = PackedPath::new();
        path.append_contour(&Contour::empty()).unwrap();
        let value = serde_json::to_value(&path).unwrap();
        assert_eq!(value["contourInfo"][0]["endPoint"], json!(-1));
        let back: PackedPath = serde_json::from_value(value).unwrap();
        assert_eq!(back, path);
    }

    #[test]
    fn sparse_attributes() {
        let value = json!({
            "coordinates": [0, 0, 5, 5],
            "pointTypes": [0, 8],
            "contourInfo": [{"endPoint": 1, "isClosed": false}],
            "pointAttributes": {"1": {"name": "tip"}},
        });
        let path: PackedPath = serde_json::from_value(value).unwrap();
        assert_eq!(path.point_attrs(0).unwrap(), None);
        assert_eq!(path.point_attrs(1).unwrap().unwrap()["name"], json!("tip"));
        assert!(path.point(1).unwrap().smooth);

        let out = serde_json::to_value(&path).unwrap();
        assert_eq!(out["pointAttributes"], json!({"1": {"name": "tip"}}));
    }

    #[test]
    fn malformed_wire_is_rejected() {
        let value = json!({
            "coordinates": [0, 0],
            "pointTypes": [0],
            "contourInfo": [{"endPoint": 3, "isClosed": false}],
        });
        assert!(serde_json::from_value::<PackedPath>(value).is_err());

        let value = json!({
            "coordinates": [0, 0],
            "pointTypes": [0],
            "contourInfo": [{"endPoint": 0}],
            "pointAttributes": {"4": {}},
        });
        assert!(serde_json::from_value::<PackedPath>(value).is_err());
    }
}
