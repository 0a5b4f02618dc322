// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree node representation: tagged leaf/internal nodes and their bbox upkeep.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::ops::Range;

use crate::types::{Aabb2D, Scalar};

/// An indexed item: a bounding box plus an opaque caller payload.
///
/// Entries are immutable once inserted; removal takes them out of the tree by
/// predicate match rather than mutating them in place.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry<T, P> {
    /// The item's bounding box.
    pub aabb: Aabb2D<T>,
    /// The caller payload carried alongside the box.
    pub payload: P,
}

impl<T, P> Entry<T, P> {
    /// Create a new entry.
    #[inline]
    pub const fn new(aabb: Aabb2D<T>, payload: P) -> Self {
        Self { aabb, payload }
    }
}

/// Sort axis for split heuristics.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Axis {
    X,
    Y,
}

/// Children of a node: entries at the leaf level, nodes elsewhere.
///
/// Keeping the two kinds in a sum type means the leaf/internal distinction is
/// checked by the compiler instead of a runtime tag.
#[derive(Clone, Debug)]
pub(crate) enum Children<T, P> {
    Entries(Vec<Entry<T, P>>),
    Nodes(Vec<Node<T, P>>),
}

impl<T, P> Children<T, P> {
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Entries(entries) => entries.len(),
            Self::Nodes(nodes) => nodes.len(),
        }
    }

    /// Split off the tail `[at..]`, preserving the children kind.
    pub(crate) fn split_off(&mut self, at: usize) -> Self {
        match self {
            Self::Entries(entries) => Self::Entries(entries.split_off(at)),
            Self::Nodes(nodes) => Self::Nodes(nodes.split_off(at)),
        }
    }
}

/// A tree node. `height` is 1 for leaves and `child.height + 1` above; all
/// children of an internal node share the same height (the tree stays
/// balanced). `aabb` is always the exact union of the children's boxes.
#[derive(Clone, Debug)]
pub(crate) struct Node<T, P> {
    pub(crate) aabb: Aabb2D<T>,
    pub(crate) height: usize,
    pub(crate) children: Children<T, P>,
}

impl<T: Scalar, P> Node<T, P> {
    /// A leaf with no entries; the state of a freshly created (or cleared) root.
    pub(crate) fn empty_leaf() -> Self {
        Self {
            aabb: Aabb2D::empty(),
            height: 1,
            children: Children::Entries(Vec::new()),
        }
    }

    pub(crate) fn new_leaf(entries: Vec<Entry<T, P>>) -> Self {
        let mut node = Self {
            aabb: Aabb2D::empty(),
            height: 1,
            children: Children::Entries(entries),
        };
        node.calc_bbox();
        node
    }

    pub(crate) fn new_internal(height: usize, children: Vec<Self>) -> Self {
        let mut node = Self {
            aabb: Aabb2D::empty(),
            height,
            children: Children::Nodes(children),
        };
        node.calc_bbox();
        node
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.children, Children::Entries(_))
    }

    pub(crate) fn len(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The box of the `i`-th child, whichever kind the children are.
    pub(crate) fn child_bbox(&self, i: usize) -> Aabb2D<T> {
        match &self.children {
            Children::Entries(entries) => entries[i].aabb,
            Children::Nodes(nodes) => nodes[i].aabb,
        }
    }

    /// Union of the children's boxes over `range`.
    pub(crate) fn dist_bbox(&self, range: Range<usize>) -> Aabb2D<T> {
        let mut bbox = Aabb2D::empty();
        for i in range {
            bbox.extend(&self.child_bbox(i));
        }
        bbox
    }

    /// Recompute this node's box from its children. The empty node gets the
    /// union identity.
    pub(crate) fn calc_bbox(&mut self) {
        self.aabb = self.dist_bbox(0..self.len());
    }

    /// Sort children ascending by their box's lower coordinate on `axis`.
    pub(crate) fn sort_by_axis(&mut self, axis: Axis) {
        fn key_cmp<T: PartialOrd>(a: &T, b: &T) -> Ordering {
            // Coordinates are assumed NaN-free; incomparable pairs sort as equal.
            a.partial_cmp(b).unwrap_or(Ordering::Equal)
        }
        match (&mut self.children, axis) {
            (Children::Entries(entries), Axis::X) => {
                entries.sort_unstable_by(|a, b| key_cmp(&a.aabb.min_x, &b.aabb.min_x));
            }
            (Children::Entries(entries), Axis::Y) => {
                entries.sort_unstable_by(|a, b| key_cmp(&a.aabb.min_y, &b.aabb.min_y));
            }
            (Children::Nodes(nodes), Axis::X) => {
                nodes.sort_unstable_by(|a, b| key_cmp(&a.aabb.min_x, &b.aabb.min_x));
            }
            (Children::Nodes(nodes), Axis::Y) => {
                nodes.sort_unstable_by(|a, b| key_cmp(&a.aabb.min_y, &b.aabb.min_y));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn entry(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Entry<f64, u32> {
        Entry::new(Aabb2D::new(min_x, min_y, max_x, max_y), 0)
    }

    #[test]
    fn leaf_bbox_is_exact_union() {
        let node = Node::new_leaf(vec![
            entry(0.0, 0.0, 1.0, 1.0),
            entry(4.0, -2.0, 5.0, 3.0),
        ]);
        assert_eq!(node.aabb, Aabb2D::new(0.0, -2.0, 5.0, 3.0));
        assert_eq!(node.height, 1);
        assert!(node.is_leaf());
    }

    #[test]
    fn empty_leaf_has_identity_bbox() {
        let node = Node::<f64, u32>::empty_leaf();
        assert_eq!(node.aabb, Aabb2D::empty());
        assert!(node.is_empty());
    }

    #[test]
    fn sort_by_axis_orders_lower_coordinates() {
        let mut node = Node::new_leaf(vec![
            entry(3.0, 0.0, 4.0, 1.0),
            entry(1.0, 9.0, 2.0, 10.0),
            entry(2.0, 5.0, 3.0, 6.0),
        ]);
        node.sort_by_axis(Axis::X);
        assert_eq!(node.child_bbox(0).min_x, 1.0);
        assert_eq!(node.child_bbox(2).min_x, 3.0);

        node.sort_by_axis(Axis::Y);
        assert_eq!(node.child_bbox(0).min_y, 0.0);
        assert_eq!(node.child_bbox(2).min_y, 9.0);
    }

    #[test]
    fn split_off_keeps_kind_and_bboxes() {
        let mut node = Node::new_leaf(vec![
            entry(0.0, 0.0, 1.0, 1.0),
            entry(2.0, 0.0, 3.0, 1.0),
            entry(4.0, 0.0, 5.0, 1.0),
        ]);
        let tail = node.children.split_off(1);
        assert_eq!(node.children.len(), 1);
        assert_eq!(tail.len(), 2);
        node.calc_bbox();
        assert_eq!(node.aabb, Aabb2D::new(0.0, 0.0, 1.0, 1.0));
    }
}
