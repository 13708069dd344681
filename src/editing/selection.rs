// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Immutable selection set of item keys.
//!
//! `Selection` wraps an `Arc<BTreeSet<String>>` so it can be cheaply cloned
//! for undo snapshots. Mutations produce a new set. Keys are strings such
//! as `"point/12"`; two selections are equal when their key sets are.

use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

const POINT_PREFIX: &str = "point/";

/// A set of selected items (points, for the pen tool)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    inner: Arc<BTreeSet<String>>,
}

impl Selection {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection of a single point
    pub fn point(index: usize) -> Self {
        Self::from_points([index])
    }

    pub fn from_points(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            inner: Arc::new(indices.into_iter().map(point_key).collect()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.inner.iter().map(String::as_str)
    }

    /// Add a key to the selection
    pub fn insert(&mut self, key: impl Into<String>) {
        Arc::make_mut(&mut self.inner).insert(key.into());
    }

    /// Remove a key from the selection
    pub fn remove(&mut self, key: &str) {
        if self.inner.contains(key) {
            Arc::make_mut(&mut self.inner).remove(key);
        }
    }

    /// Indices of all selected points, ascending
    pub fn point_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.iter().filter_map(parse_point_key).collect();
        indices.sort_unstable();
        indices
    }

    /// The point index when exactly one item, a point, is selected
    pub fn single_point(&self) -> Option<usize> {
        if self.inner.len() != 1 {
            return None;
        }
        self.iter().next().and_then(parse_point_key)
    }
}

/// Selection key for a point
pub fn point_key(index: usize) -> String {
    format!("{POINT_PREFIX}{index}")
}

fn parse_point_key(key: &str) -> Option<usize> {
    key.strip_prefix(POINT_PREFIX)?.parse().ok()
}

impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.inner.len()))?;
        for key in self.inner.iter() {
            seq.serialize_element(key)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Selection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SelectionVisitor;

        impl<'de> Visitor<'de> for SelectionVisitor {
            type Value = Selection;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a list of selection keys")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Selection, A::Error> {
                let mut set = BTreeSet::new();
                while let Some(key) = seq.next_element::<String>()? {
                    set.insert(key);
                }
                Ok(Selection {
                    inner: Arc::new(set),
                })
            }
        }

        deserializer.deserialize_seq(SelectionVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_selection_is_empty() {
        let sel = Selection::new();
        assert!(sel.is_empty());
        assert_eq!(sel.len(), 0);
        assert_eq!(sel.single_point(), None);
    }

    #[test]
    fn point_keys() {
        let sel = Selection::point(7);
        assert!(sel.contains("point/7"));
        assert_eq!(sel.single_point(), Some(7));
    }

    #[test]
    fn point_indices_sort_numerically() {
        let sel = Selection::from_points([10, 2, 33]);
        assert_eq!(sel.point_indices(), vec![2, 10, 33]);
        assert_eq!(sel.single_point(), None);
    }

    #[test]
    fn non_point_keys_are_ignored() {
        let mut sel = Selection::new();
        sel.insert("component/0");
        assert_eq!(sel.single_point(), None);
        sel.insert(point_key(1));
        assert_eq!(sel.point_indices(), vec![1]);
    }

    #[test]
    fn clone_is_independent() {
        let mut sel = Selection::point(1);
        let mut clone = sel.clone();
        clone.insert(point_key(2));
        assert!(!sel.contains("point/2"));
        sel.remove("point/1");
        assert!(sel.is_empty());
        assert_eq!(clone.len(), 2);
    }

    #[test]
    fn equality_is_set_equality() {
        assert_eq!(Selection::from_points([1, 2]), Selection::from_points([2, 1, 2]));
        assert_ne!(Selection::point(1), Selection::point(2));
    }

    #[test]
    fn serializes_as_list() {
        let sel = Selection::from_points([3, 1]);
        let json = serde_json::to_value(&sel).unwrap();
        assert_eq!(json, serde_json::json!(["point/1", "point/3"]));
        let back: Selection = serde_json::from_value(json).unwrap();
        assert_eq!(back, sel);
    }
}
