//! Path search over dynamically shaped trees (`serde_json::Value`).
//!
//! Nodes are arbitrary JSON values. Children live under a configurable
//! object key (default `"children"`). Malformed shapes never fail the search:
//!
//! - a forest that is not an array has no roots;
//! - `null` entries in any array are skipped and never appear in a path;
//! - a children value that is not an array means "no children";
//! - non-object nodes (numbers, strings, arrays, ...) are still tested by the
//!   predicate but have no children.

#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

use std::iter::FusedIterator;
use std::slice;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::search::{self, FoundPath};

/// Key used for child sequences when none is configured.
pub const DEFAULT_CHILDREN_KEY: &str = "children";

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// The non-null entries of a JSON array, in order.
///
/// Any non-array value yields nothing.
#[derive(Debug, Clone)]
pub struct Nodes<'a> {
    inner: slice::Iter<'a, Value>,
}

impl<'a> Nodes<'a> {
    pub fn empty() -> Self {
        Self {
            inner: slice::Iter::default(),
        }
    }

    /// Entries of `value` if it is an array.
    pub fn of(value: &'a Value) -> Self {
        value
            .as_array()
            .map_or_else(Self::empty, |items| Self { inner: items.iter() })
    }

    /// Children of `node` stored under `key`.
    pub fn children(node: &'a Value, key: &str) -> Self {
        node.as_object()
            .and_then(|fields| fields.get(key))
            .map_or_else(Self::empty, Self::of)
    }
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        self.inner.find(|value| !value.is_null())
    }
}

impl FusedIterator for Nodes<'_> {}

// ---------------------------------------------------------------------------
// SearchOptions
// ---------------------------------------------------------------------------

/// Settings for a search over JSON-shaped trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Object key holding each node's children.
    #[serde(default = "default_children_key")]
    pub children_key: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            children_key: default_children_key(),
        }
    }
}

fn default_children_key() -> String {
    DEFAULT_CHILDREN_KEY.to_string()
}

impl SearchOptions {
    pub fn with_children_key(key: impl Into<String>) -> Self {
        Self {
            children_key: key.into(),
        }
    }

    /// See [`find_in_value`].
    pub fn find<'a, P>(&self, forest: &'a Value, predicate: P) -> FoundPath<'a, Value>
    where
        P: FnMut(&Value) -> bool,
    {
        find_in_value(forest, &self.children_key, predicate)
    }

    /// See [`try_find_in_value`].
    ///
    /// # Errors
    ///
    /// Returns the predicate's first error unchanged.
    pub fn try_find<'a, P, E>(&self, forest: &'a Value, predicate: P) -> Result<FoundPath<'a, Value>, E>
    where
        P: FnMut(&Value) -> Result<bool, E>,
    {
        try_find_in_value(forest, &self.children_key, predicate)
    }
}

// ---------------------------------------------------------------------------
// Search entry points
// ---------------------------------------------------------------------------

/// Find the first node (pre-order) satisfying `predicate`, reading children
/// from `children_key`.
pub fn find_in_value<'a, P>(forest: &'a Value, children_key: &str, predicate: P) -> FoundPath<'a, Value>
where
    P: FnMut(&Value) -> bool,
{
    search::find_path_by(
        Nodes::of(forest),
        |node| Nodes::children(node, children_key),
        predicate,
    )
}

/// [`find_in_value`] with the default `"children"` key.
pub fn find_in_value_default<P>(forest: &Value, predicate: P) -> FoundPath<'_, Value>
where
    P: FnMut(&Value) -> bool,
{
    find_in_value(forest, DEFAULT_CHILDREN_KEY, predicate)
}

/// [`find_in_value`] with a fallible predicate.
///
/// # Errors
///
/// Returns the predicate's first error unchanged.
pub fn try_find_in_value<'a, P, E>(
    forest: &'a Value,
    children_key: &str,
    predicate: P,
) -> Result<FoundPath<'a, Value>, E>
where
    P: FnMut(&Value) -> Result<bool, E>,
{
    search::try_find_path_by(
        Nodes::of(forest),
        |node| Nodes::children(node, children_key),
        predicate,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
