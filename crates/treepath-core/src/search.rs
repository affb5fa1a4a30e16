//! Pre-order path search over forests of tree-shaped data.
//!
//! # Overview
//!
//! Given a forest (ordered roots), a way to reach each node's children and a
//! predicate, the search returns the first node that satisfies the predicate
//! together with its ancestor chain, root first and match last.
//!
//! # Design
//!
//! - **Pre-order, left-to-right**: a node is tested before its children, its
//!   children are exhausted before its next sibling, and roots are visited in
//!   forest order.
//! - **Short-circuit**: the predicate is never called again after the first
//!   match.
//! - **Explicit stack**: the traversal keeps a stack of sibling iterators on
//!   the heap, so call-stack usage does not grow with tree depth. The ancestor
//!   stack is pushed on entry, popped on backtrack and returned as-is on
//!   success.
//! - **Borrowed**: nodes are referenced, never cloned or mutated.
//!
//! # Usage
//!
//! ```rust
//! use treepath_core::search::{TreeNode, find_path};
//!
//! struct Dir {
//!     name: &'static str,
//!     entries: Vec<Dir>,
//! }
//!
//! impl TreeNode for Dir {
//!     fn children(&self) -> &[Self] {
//!         &self.entries
//!     }
//! }
//!
//! let forest = vec![Dir {
//!     name: "src",
//!     entries: vec![Dir { name: "lib.rs", entries: vec![] }],
//! }];
//!
//! let found = find_path(&forest, |d| d.name == "lib.rs");
//! let names: Vec<_> = found.path().iter().map(|d| d.name).collect();
//! assert_eq!(names, ["src", "lib.rs"]);
//! ```

#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

use std::convert::Infallible;
use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::trace;

// ---------------------------------------------------------------------------
// TreeNode
// ---------------------------------------------------------------------------

/// A node type that can list its own children.
///
/// Leaves return an empty slice.
pub trait TreeNode: Sized {
    fn children(&self) -> &[Self];
}

// ---------------------------------------------------------------------------
// FoundPath
// ---------------------------------------------------------------------------

/// Outcome of a search: the ancestor path of the first match.
///
/// The path runs from a root to the matched node, both inclusive. It is
/// empty exactly when nothing matched, and [`FoundPath::target`] is always
/// the last element of the path.
pub struct FoundPath<'a, T> {
    path: Vec<&'a T>,
}

impl<'a, T> FoundPath<'a, T> {
    /// A result with no match.
    pub const fn empty() -> Self {
        Self { path: Vec::new() }
    }

    /// The matched node, or `None` when nothing matched.
    pub fn target(&self) -> Option<&'a T> {
        self.path.last().copied()
    }

    /// Root-to-match chain, inclusive. Empty when nothing matched.
    pub fn path(&self) -> &[&'a T] {
        &self.path
    }

    /// The strict ancestors of the match (path without its tail).
    pub fn ancestors(&self) -> &[&'a T] {
        match self.path.split_last() {
            Some((_, ancestors)) => ancestors,
            None => &[],
        }
    }

    pub fn is_found(&self) -> bool {
        !self.path.is_empty()
    }

    /// Number of nodes in the path. A root match has depth 1.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn into_path(self) -> Vec<&'a T> {
        self.path
    }

    /// Split into `(path, target)`.
    pub fn into_parts(self) -> (Vec<&'a T>, Option<&'a T>) {
        let target = self.target();
        (self.path, target)
    }
}

impl<T> Default for FoundPath<'_, T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Clone for FoundPath<'_, T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for FoundPath<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoundPath")
            .field("path", &self.path)
            .field("target", &self.target())
            .finish()
    }
}

impl<T: PartialEq> PartialEq for FoundPath<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl<T: Serialize> Serialize for FoundPath<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FoundPath", 2)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("target", &self.target())?;
        state.end()
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// One level of the traversal stack: the remaining roots, or the remaining
/// children of the ancestor at the same height.
enum Level<R, C> {
    Roots(R),
    Children(C),
}

impl<R, C> Iterator for Level<R, C>
where
    R: Iterator,
    C: Iterator<Item = R::Item>,
{
    type Item = R::Item;

    fn next(&mut self) -> Option<R::Item> {
        match self {
            Self::Roots(roots) => roots.next(),
            Self::Children(children) => children.next(),
        }
    }
}

/// Search with a fallible predicate.
///
/// `children` yields a node's children in order; yielding nothing means the
/// node is a leaf.
///
/// # Errors
///
/// The first `Err` returned by `predicate` aborts the traversal and is
/// returned unchanged. No partial path is produced.
pub fn try_find_path_by<'a, T, F, C, I, P, E>(
    forest: F,
    mut children: C,
    mut predicate: P,
) -> Result<FoundPath<'a, T>, E>
where
    T: 'a,
    F: IntoIterator<Item = &'a T>,
    C: FnMut(&'a T) -> I,
    I: IntoIterator<Item = &'a T>,
    P: FnMut(&T) -> Result<bool, E>,
{
    // Invariant: path.len() + 1 == levels.len() while the roots level is live.
    let mut path: Vec<&'a T> = Vec::new();
    let mut levels: Vec<Level<F::IntoIter, I::IntoIter>> =
        vec![Level::Roots(forest.into_iter())];
    let mut visited = 0_usize;

    while let Some(level) = levels.last_mut() {
        if let Some(node) = level.next() {
            visited += 1;
            path.push(node);
            if predicate(node)? {
                trace!(visited, depth = path.len(), "tree search matched");
                return Ok(FoundPath { path });
            }
            levels.push(Level::Children(children(node).into_iter()));
        } else {
            // Exhausted: backtrack past the ancestor that owned this level.
            levels.pop();
            path.pop();
        }
    }

    trace!(visited, "tree search found no match");
    Ok(FoundPath::empty())
}

/// Search with an infallible predicate and a children accessor closure.
pub fn find_path_by<'a, T, F, C, I, P>(forest: F, children: C, mut predicate: P) -> FoundPath<'a, T>
where
    T: 'a,
    F: IntoIterator<Item = &'a T>,
    C: FnMut(&'a T) -> I,
    I: IntoIterator<Item = &'a T>,
    P: FnMut(&T) -> bool,
{
    match try_find_path_by(forest, children, |node| {
        Ok::<bool, Infallible>(predicate(node))
    }) {
        Ok(found) => found,
        Err(never) => match never {},
    }
}

/// Search a forest of [`TreeNode`]s.
pub fn find_path<T, P>(forest: &[T], predicate: P) -> FoundPath<'_, T>
where
    T: TreeNode,
    P: FnMut(&T) -> bool,
{
    find_path_by(forest, T::children, predicate)
}

/// Search a forest of [`TreeNode`]s with a fallible predicate.
///
/// # Errors
///
/// Returns the predicate's first error unchanged.
pub fn try_find_path<T, P, E>(forest: &[T], predicate: P) -> Result<FoundPath<'_, T>, E>
where
    T: TreeNode,
    P: FnMut(&T) -> Result<bool, E>,
{
    try_find_path_by(forest, T::children, predicate)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
