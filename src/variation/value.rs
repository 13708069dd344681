// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! The closed set of values that itemwise algebra understands.

use super::{Itemwise, ScalarMul};
use crate::error::VariationError;
use crate::geometry::DecomposedTransform;
use crate::path::PackedPath;
use std::collections::BTreeMap;

/// A variable glyph value: a scalar, a container of values, or a
/// structured value with its own itemwise implementation.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    /// A field missing from a record
    Absent,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<VarValue>),
    Record(BTreeMap<String, VarValue>),
    Path(PackedPath),
    Transform(DecomposedTransform),
}

impl VarValue {
    fn type_name(&self) -> &'static str {
        match self {
            VarValue::Absent => "absent",
            VarValue::Null => "null",
            VarValue::Bool(_) => "bool",
            VarValue::Number(_) => "number",
            VarValue::String(_) => "string",
            VarValue::List(_) => "list",
            VarValue::Record(_) => "record",
            VarValue::Path(_) => "path",
            VarValue::Transform(_) => "transform",
        }
    }

    /// Apply a binary itemwise operation, recursing into containers
    fn combine(
        &self,
        other: &VarValue,
        number_op: fn(f64, f64) -> f64,
        path_op: fn(&PackedPath, &PackedPath) -> Result<PackedPath, VariationError>,
        transform_op: fn(&DecomposedTransform, &DecomposedTransform) -> Result<DecomposedTransform, VariationError>,
    ) -> Result<VarValue, VariationError> {
        use VarValue::*;
        Ok(match (self, other) {
            (Absent, Absent) => Absent,
            (Null, Null) => Null,
            (Number(a), Number(b)) => Number(number_op(*a, *b)),
            (Bool(a), Bool(b)) if a == b => Bool(*a),
            (String(a), String(b)) if a == b => String(a.clone()),
            (Bool(a), Bool(b)) => {
                return Err(VariationError::IncompatibleValue(format!(
                    "unexpected different booleans: {a} != {b}"
                )));
            }
            (String(a), String(b)) => {
                return Err(VariationError::IncompatibleValue(format!(
                    "unexpected different strings: {a:?} != {b:?}"
                )));
            }
            (List(a), List(b)) => {
                if a.len() != b.len() {
                    return Err(VariationError::IncompatibleLength(a.len(), b.len()));
                }
                List(
                    a.iter()
                        .zip(b)
                        .map(|(x, y)| x.combine(y, number_op, path_op, transform_op))
                        .collect::<Result<_, _>>()?,
                )
            }
            (Record(a), Record(b)) => {
                if !a.keys().eq(b.keys()) {
                    return Err(VariationError::IncompatibleKeys(
                        a.keys().cloned().collect(),
                        b.keys().cloned().collect(),
                    ));
                }
                Record(
                    a.iter()
                        .zip(b.values())
                        .map(|((key, x), y)| {
                            Ok((key.clone(), x.combine(y, number_op, path_op, transform_op)?))
                        })
                        .collect::<Result<_, VariationError>>()?,
                )
            }
            (Path(a), Path(b)) => Path(path_op(a, b)?),
            (Transform(a), Transform(b)) => Transform(transform_op(a, b)?),
            (a, b) => {
                return Err(VariationError::IncompatibleValue(format!(
                    "incompatible value types: {} != {}",
                    a.type_name(),
                    b.type_name()
                )));
            }
        })
    }
}

impl Itemwise for VarValue {
    fn add_itemwise(&self, other: &Self) -> Result<Self, VariationError> {
        self.combine(other, |a, b| a + b, PackedPath::add_itemwise, DecomposedTransform::add_itemwise)
    }

    fn sub_itemwise(&self, other: &Self) -> Result<Self, VariationError> {
        self.combine(other, |a, b| a - b, PackedPath::sub_itemwise, DecomposedTransform::sub_itemwise)
    }
}

impl ScalarMul for VarValue {
    fn mul_scalar(&self, scalar: f64) -> Self {
        match self {
            VarValue::Number(v) => VarValue::Number(v * scalar),
            VarValue::List(items) => {
                VarValue::List(items.iter().map(|item| item.mul_scalar(scalar)).collect())
            }
            VarValue::Record(fields) => VarValue::Record(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.mul_scalar(scalar)))
                    .collect(),
            ),
            VarValue::Path(path) => VarValue::Path(path.mul_scalar(scalar)),
            VarValue::Transform(t) => VarValue::Transform(t.mul_scalar(scalar)),
            other => other.clone(),
        }
    }
}

impl From<serde_json::Value> for VarValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => VarValue::Null,
            serde_json::Value::Bool(b) => VarValue::Bool(b),
            serde_json::Value::Number(n) => VarValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => VarValue::String(s),
            serde_json::Value::Array(items) => {
                VarValue::List(items.into_iter().map(VarValue::from).collect())
            }
            serde_json::Value::Object(fields) => VarValue::Record(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, VarValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<f64> for VarValue {
    fn from(value: f64) -> Self {
        VarValue::Number(value)
    }
}

impl From<PackedPath> for VarValue {
    fn from(path: PackedPath) -> Self {
        VarValue::Path(path)
    }
}

impl From<DecomposedTransform> for VarValue {
    fn from(transform: DecomposedTransform) -> Self {
        VarValue::Transform(transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variation::{add_itemwise, mul_scalar, sub_itemwise};
    use serde_json::json;

    fn glyph_record(x: f64, name: &str) -> VarValue {
        VarValue::from(json!({
            "xAdvance": x,
            "name": name,
            "flags": [true, false],
            "anchors": [{"x": x, "y": 10.0}],
        }))
    }

    #[test]
    fn records_combine_numeric_leaves() {
        let a = glyph_record(500.0, "a");
        let b = glyph_record(600.0, "a");
        let delta = sub_itemwise(&b, &a).unwrap();
        let back = add_itemwise(&delta, &a).unwrap();
        assert_eq!(back, b);
        assert_eq!(mul_scalar(&a, 1.0), a);
    }

    #[test]
    fn different_strings_are_incompatible() {
        let err = add_itemwise(&glyph_record(1.0, "a"), &glyph_record(1.0, "b")).unwrap_err();
        assert!(matches!(err, VariationError::IncompatibleValue(_)));
    }

    #[test]
    fn list_length_mismatch() {
        let a = VarValue::from(json!([1, 2, 3]));
        let b = VarValue::from(json!([1, 2]));
        assert_eq!(add_itemwise(&a, &b), Err(VariationError::IncompatibleLength(3, 2)));
    }

    #[test]
    fn record_key_mismatch() {
        let a = VarValue::from(json!({"x": 1, "y": 2}));
        let b = VarValue::from(json!({"x": 1, "z": 2}));
        assert!(matches!(
            sub_itemwise(&a, &b),
            Err(VariationError::IncompatibleKeys(_, _))
        ));
    }

    #[test]
    fn absent_and_null_must_match() {
        assert_eq!(add_itemwise(&VarValue::Absent, &VarValue::Absent), Ok(VarValue::Absent));
        assert_eq!(add_itemwise(&VarValue::Null, &VarValue::Null), Ok(VarValue::Null));
        assert!(add_itemwise(&VarValue::Null, &VarValue::Absent).is_err());
        assert!(add_itemwise(&VarValue::Number(1.0), &VarValue::Null).is_err());
    }

    #[test]
    fn scaling_leaves_strings_and_bools() {
        let value = VarValue::from(json!({"n": 2, "s": "keep", "b": true}));
        let scaled = value.mul_scalar(3.0);
        assert_eq!(scaled, VarValue::from(json!({"n": 6.0, "s": "keep", "b": true})));
    }

    #[test]
    fn nested_paths_delegate() {
        let path = crate::path::tests::two_contour_path();
        let a = VarValue::List(vec![VarValue::from(path.clone())]);
        let doubled = add_itemwise(&a, &a).unwrap();
        assert_eq!(doubled, VarValue::List(vec![VarValue::from(path.mul_scalar(2.0))]));
    }
}
