// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `RTree` container: insertion, bulk loading, queries, and removal.

use alloc::vec::Vec;
use smallvec::SmallVec;

use crate::error::Error;
use crate::node::{Children, Entry, Node};
use crate::select::multi_select;
use crate::split::split;
use crate::types::{Aabb2D, Scalar};

/// Default maximum number of children per node.
///
/// Nine entries with a 40% minimum fill is the classic sweet spot for search
/// performance on mixed workloads.
const DEFAULT_MAX_ENTRIES: usize = 9;

/// A dynamic 2D R-tree over axis-aligned bounding boxes.
///
/// Supports single insertion, OMT bulk loading, rectangle search, and
/// first-match removal with tree condensation. The tree is a plain in-memory,
/// single-threaded structure: all operations run to completion synchronously
/// and keep the structural invariants (exact bounding boxes, uniform leaf
/// depth) as postconditions. Structure is deterministic for a fixed
/// insertion/bulk-load order.
///
/// ## Example
///
/// ```rust
/// use bramble_rtree::{Aabb2D, Entry, RTree};
///
/// let mut tree: RTree<f64, u32> = RTree::new();
/// tree.insert(Entry::new(Aabb2D::new(0.0, 0.0, 1.0, 1.0), 7));
/// tree.insert(Entry::new(Aabb2D::new(5.0, 5.0, 6.0, 6.0), 8));
///
/// let hits = tree.search(&Aabb2D::new(-1.0, -1.0, 2.0, 2.0));
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].payload, 7);
/// ```
#[derive(Clone, Debug)]
pub struct RTree<T: Scalar, P> {
    pub(crate) root: Node<T, P>,
    max_entries: usize,
    min_entries: usize,
}

/// What is being inserted: a single entry at leaf level, or a whole packed
/// subtree at the level matching its height (bulk-load merge).
enum Seed<T, P> {
    Entry(Entry<T, P>),
    Subtree(Node<T, P>),
}

impl<T: Scalar, P> Seed<T, P> {
    fn aabb(&self) -> Aabb2D<T> {
        match self {
            Self::Entry(entry) => entry.aabb,
            Self::Subtree(node) => node.aabb,
        }
    }
}

impl<T: Scalar, P> Default for RTree<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar, P> RTree<T, P> {
    /// Create an empty tree with the default tuning
    /// (`max_entries = 9`, `min_entries = ceil(0.4 * max_entries)`).
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    /// Create an empty tree with a custom fan-out. `max_entries` is floored
    /// at 4; `min_entries` becomes `ceil(0.4 * max_entries)`, floored at 2.
    pub fn with_max_entries(max_entries: usize) -> Self {
        let max_entries = max_entries.max(4);
        let min_entries = (max_entries * 2).div_ceil(5).max(2);
        Self {
            root: Node::empty_leaf(),
            max_entries,
            min_entries,
        }
    }

    /// Create an empty tree with explicit bounds. `max_entries` is floored at
    /// 4; `min_entries` is clamped into `[2, max_entries / 2]`.
    pub fn with_entries(max_entries: usize, min_entries: usize) -> Self {
        let max_entries = max_entries.max(4);
        let min_entries = min_entries.clamp(2, max_entries / 2);
        Self {
            root: Node::empty_leaf(),
            max_entries,
            min_entries,
        }
    }

    /// Upper bound on children per node.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Lower bound on children per non-root node after a split.
    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    /// Height of the tree; 1 for an empty tree or a single leaf root.
    pub fn height(&self) -> usize {
        self.root.height
    }

    /// The root bounding box: the exact union of every item in the tree, or
    /// the empty-box identity when the tree holds nothing.
    pub fn bbox(&self) -> Aabb2D<T> {
        self.root.aabb
    }

    /// Whether the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Remove every item, resetting to an empty leaf root.
    pub fn clear(&mut self) {
        self.root = Node::empty_leaf();
    }

    /// Insert a single entry.
    ///
    /// The item goes to the leaf whose box needs the least area enlargement;
    /// boxes along the path are extended, and overflowing nodes split upward,
    /// growing a new root when the split reaches it.
    pub fn insert(&mut self, entry: Entry<T, P>) {
        let depth = self.root.height - 1;
        self.insert_seed(Seed::Entry(entry), depth);
    }

    /// Bulk-load a batch of entries with the OMT packing algorithm and merge
    /// the packed subtree into the tree. Empty input is a no-op; batches
    /// smaller than `min_entries` fall back to one-at-a-time insertion.
    pub fn load(&mut self, entries: Vec<Entry<T, P>>) {
        if entries.is_empty() {
            return;
        }
        if entries.len() < self.min_entries {
            for entry in entries {
                self.insert(entry);
            }
            return;
        }

        let node = self.build(entries, None);

        if self.root.is_empty() {
            self.root = node;
        } else if self.root.height == node.height {
            self.grow_root(node);
        } else {
            let shorter = if self.root.height < node.height {
                // The packed tree is taller; it becomes the root and the old
                // root is merged into it.
                core::mem::replace(&mut self.root, node)
            } else {
                node
            };
            let depth = self.root.height - shorter.height - 1;
            self.insert_seed(Seed::Subtree(shorter), depth);
        }
    }

    /// Bulk-load from coordinate columns plus a payload column.
    ///
    /// All five columns must have equal lengths and every box must satisfy
    /// `min <= max` on both axes; otherwise an error is returned and the tree
    /// is left untouched.
    pub fn try_load_columns(
        &mut self,
        min_x: &[T],
        min_y: &[T],
        max_x: &[T],
        max_y: &[T],
        payloads: Vec<P>,
    ) -> Result<(), Error> {
        let expected = min_x.len();
        for got in [min_y.len(), max_x.len(), max_y.len(), payloads.len()] {
            if got != expected {
                return Err(Error::LengthMismatch { expected, got });
            }
        }
        for index in 0..expected {
            // `!(a <= b)` also rejects NaN coordinates.
            if !(min_x[index] <= max_x[index]) || !(min_y[index] <= max_y[index]) {
                return Err(Error::InvertedBox { index });
            }
        }

        let entries = payloads
            .into_iter()
            .enumerate()
            .map(|(i, payload)| {
                Entry::new(Aabb2D::new(min_x[i], min_y[i], max_x[i], max_y[i]), payload)
            })
            .collect();
        self.load(entries);
        Ok(())
    }

    /// Collect every entry whose box overlaps `query` (edges included).
    pub fn search<'a>(&'a self, query: &Aabb2D<T>) -> Vec<&'a Entry<T, P>> {
        let mut out = Vec::new();
        self.visit_search(query, |entry| out.push(entry));
        out
    }

    /// Visit every entry whose box overlaps `query` without allocating result
    /// storage.
    ///
    /// Iterative depth-first traversal; once the query fully contains a
    /// subtree's box, that subtree is drained without any further box tests.
    pub fn visit_search<'a, F: FnMut(&'a Entry<T, P>)>(&'a self, query: &Aabb2D<T>, mut f: F) {
        if !query.overlaps(&self.root.aabb) {
            return;
        }
        let mut stack: SmallVec<[&Node<T, P>; 32]> = SmallVec::new();
        stack.push(&self.root);

        while let Some(node) = stack.pop() {
            match &node.children {
                Children::Entries(entries) => {
                    for entry in entries {
                        if query.overlaps(&entry.aabb) {
                            f(entry);
                        }
                    }
                }
                Children::Nodes(nodes) => {
                    for child in nodes {
                        if !query.overlaps(&child.aabb) {
                            continue;
                        }
                        if query.contains(&child.aabb) {
                            collect_subtree(child, &mut f);
                        } else {
                            stack.push(child);
                        }
                    }
                }
            }
        }
    }

    /// Whether any entry's box overlaps `query`. Stops at the first hit.
    pub fn collides(&self, query: &Aabb2D<T>) -> bool {
        if !query.overlaps(&self.root.aabb) {
            return false;
        }
        let mut stack: SmallVec<[&Node<T, P>; 32]> = SmallVec::new();
        stack.push(&self.root);

        while let Some(node) = stack.pop() {
            match &node.children {
                Children::Entries(entries) => {
                    if entries.iter().any(|entry| query.overlaps(&entry.aabb)) {
                        return true;
                    }
                }
                Children::Nodes(nodes) => {
                    for child in nodes {
                        if !query.overlaps(&child.aabb) {
                            continue;
                        }
                        // A fully contained subtree is never empty, so it
                        // must contribute an item.
                        if query.contains(&child.aabb) {
                            return true;
                        }
                        stack.push(child);
                    }
                }
            }
        }
        false
    }

    /// Every entry in the tree, in unspecified order.
    pub fn all(&self) -> Vec<&Entry<T, P>> {
        let mut out = Vec::new();
        collect_subtree(&self.root, &mut |entry| out.push(entry));
        out
    }

    /// Remove the first entry that matches `aabb` and `payload` exactly.
    ///
    /// Returns the removed entry, or `None` (a no-op) when nothing matches.
    pub fn remove(&mut self, aabb: &Aabb2D<T>, payload: &P) -> Option<Entry<T, P>>
    where
        P: PartialEq,
    {
        self.remove_with(aabb, |entry| {
            entry.aabb == *aabb && entry.payload == *payload
        })
    }

    /// Remove the first entry matching `predicate`, descending only into
    /// subtrees whose box contains `aabb`.
    ///
    /// Condensation runs on the way back up: emptied nodes are pruned and
    /// ancestor boxes recomputed. An internal root left with a sole child
    /// collapses into it.
    pub fn remove_with<F>(&mut self, aabb: &Aabb2D<T>, predicate: F) -> Option<Entry<T, P>>
    where
        F: Fn(&Entry<T, P>) -> bool,
    {
        let removed = remove_in(&mut self.root, aabb, &predicate)?;

        loop {
            match &mut self.root.children {
                Children::Nodes(nodes) if nodes.is_empty() => {
                    self.root = Node::empty_leaf();
                    break;
                }
                Children::Nodes(nodes) if nodes.len() == 1 => {
                    if let Some(child) = nodes.pop() {
                        self.root = child;
                    }
                }
                _ => break,
            }
        }
        Some(removed)
    }

    // --- internals ---

    /// Insert an entry or a packed subtree `depth` levels below the root,
    /// splitting overflowing nodes on the way back up.
    fn insert_seed(&mut self, seed: Seed<T, P>, depth: usize) {
        if let Some(sibling) = insert_at(
            &mut self.root,
            seed,
            depth,
            self.max_entries,
            self.min_entries,
        ) {
            self.grow_root(sibling);
        }
    }

    /// Replace the root with a new two-child internal node covering the old
    /// root and `sibling`.
    fn grow_root(&mut self, sibling: Node<T, P>) {
        let old_root = core::mem::replace(&mut self.root, Node::empty_leaf());
        let height = old_root.height + 1;
        let mut children = Vec::with_capacity(2);
        children.push(old_root);
        children.push(sibling);
        self.root = Node::new_internal(height, children);
    }

    /// Recursively pack `items` into a balanced subtree (OMT).
    ///
    /// The first call computes the target height and a widened root fan-out
    /// so non-power-of-`max_entries` sizes still pack tightly; recursion then
    /// tiles the input into near-square groups by X slabs and Y runs.
    fn build(&self, mut items: Vec<Entry<T, P>>, height: Option<usize>) -> Node<T, P> {
        let n = items.len();
        if n <= self.max_entries {
            return Node::new_leaf(items);
        }

        let (height, fanout) = match height {
            Some(h) => (h, self.max_entries),
            None => {
                let (h, subtree_cap) = target_height(n, self.max_entries);
                (h, n.div_ceil(subtree_cap))
            }
        };

        // Split the items into `fanout` mostly square tiles: slabs of n1 by
        // X, runs of n2 by Y within each slab.
        let n2 = n.div_ceil(fanout);
        let n1 = n2 * isqrt_ceil(fanout);

        multi_select(&mut items, 0, n - 1, n1, &|entry: &Entry<T, P>| {
            entry.aabb.min_x
        });

        let mut children = Vec::new();
        // Groups are carved off the tail so each recursive call owns its
        // items; a final reverse restores left-to-right order.
        let slab_starts: Vec<usize> = (0..n).step_by(n1).collect();
        for &slab_start in slab_starts.iter().rev() {
            let mut slab = items.split_off(slab_start);
            let slab_len = slab.len();
            multi_select(&mut slab, 0, slab_len - 1, n2, &|entry: &Entry<T, P>| {
                entry.aabb.min_y
            });

            let run_starts: Vec<usize> = (0..slab_len).step_by(n2).collect();
            for &run_start in run_starts.iter().rev() {
                let run = slab.split_off(run_start);
                children.push(self.build(run, Some(height - 1)));
            }
        }
        children.reverse();

        Node::new_internal(height, children)
    }
}

/// Smallest height `h` with `max_entries^h >= n`, plus `max_entries^(h-1)`
/// (the item capacity of one root child at that height).
fn target_height(n: usize, max_entries: usize) -> (usize, usize) {
    let mut height = 1;
    let mut subtree_cap: usize = 1;
    while subtree_cap.saturating_mul(max_entries) < n {
        subtree_cap *= max_entries;
        height += 1;
    }
    (height, subtree_cap)
}

/// Returns the square root of the number, rounded up.
#[inline]
const fn isqrt_ceil(num: usize) -> usize {
    let s = num.isqrt();

    // This multiplication cannot overflow because `s` is the rounded-down square root of `num`,
    // i.e., `s * s` is guaranteed to be less than or equal to `num`.
    if s * s < num { s + 1 } else { s }
}

/// Among an internal node's children, the index of the best subtree for
/// `bbox`: least area enlargement, then smallest area. Falls back to the
/// first child if no candidate improved on the sentinels (unreachable for
/// non-empty children).
fn choose_subtree_index<T: Scalar, P>(children: &[Node<T, P>], bbox: &Aabb2D<T>) -> usize {
    // (index, net enlargement, running minimum area)
    let mut best: Option<(usize, T::Acc, T::Acc)> = None;

    for (i, child) in children.iter().enumerate() {
        let area = child.aabb.area();
        let enlargement = child.aabb.enlarged_area(bbox) - area;

        match &mut best {
            None => best = Some((i, enlargement, area)),
            Some((index, min_enlargement, min_area)) => {
                if enlargement < *min_enlargement {
                    *index = i;
                    *min_enlargement = enlargement;
                    *min_area = if area < *min_area { area } else { *min_area };
                } else if enlargement == *min_enlargement && area < *min_area {
                    *index = i;
                    *min_area = area;
                }
            }
        }
    }

    best.map_or(0, |(index, _, _)| index)
}

/// Recursive insertion worker. `depth == 0` means "insert here"; otherwise
/// descend into the least-enlargement child. Returns the new sibling when
/// this node overflowed and split.
fn insert_at<T: Scalar, P>(
    node: &mut Node<T, P>,
    seed: Seed<T, P>,
    depth: usize,
    max_entries: usize,
    min_entries: usize,
) -> Option<Node<T, P>> {
    let bbox = seed.aabb();

    if depth == 0 {
        match (&mut node.children, seed) {
            (Children::Entries(entries), Seed::Entry(entry)) => entries.push(entry),
            (Children::Nodes(nodes), Seed::Subtree(subtree)) => nodes.push(subtree),
            _ => unreachable!("insertion level does not match the node kind"),
        }
        node.aabb.extend(&bbox);
    } else {
        match &mut node.children {
            Children::Nodes(nodes) => {
                let i = choose_subtree_index(nodes, &bbox);
                if let Some(sibling) =
                    insert_at(&mut nodes[i], seed, depth - 1, max_entries, min_entries)
                {
                    nodes.push(sibling);
                }
            }
            Children::Entries(_) => unreachable!("reached a leaf above the insertion level"),
        }
        node.aabb.extend(&bbox);
    }

    (node.len() > max_entries).then(|| split(node, min_entries))
}

/// Push every entry under `node` through `f`, with no box tests.
fn collect_subtree<'a, T: Scalar, P, F: FnMut(&'a Entry<T, P>)>(node: &'a Node<T, P>, f: &mut F) {
    let mut stack: SmallVec<[&Node<T, P>; 32]> = SmallVec::new();
    stack.push(node);
    while let Some(node) = stack.pop() {
        match &node.children {
            Children::Entries(entries) => {
                for entry in entries {
                    f(entry);
                }
            }
            Children::Nodes(nodes) => stack.extend(nodes.iter()),
        }
    }
}

/// Depth-first removal worker: descend only into children whose box contains
/// the target, remove the first predicate match at leaf level, and condense
/// (prune emptied children, recompute boxes) while unwinding.
fn remove_in<T: Scalar, P, F>(
    node: &mut Node<T, P>,
    target: &Aabb2D<T>,
    predicate: &F,
) -> Option<Entry<T, P>>
where
    F: Fn(&Entry<T, P>) -> bool,
{
    match &mut node.children {
        Children::Entries(entries) => {
            let i = entries.iter().position(predicate)?;
            let removed = entries.remove(i);
            node.calc_bbox();
            Some(removed)
        }
        Children::Nodes(nodes) => {
            for i in 0..nodes.len() {
                if !nodes[i].aabb.contains(target) {
                    continue;
                }
                if let Some(removed) = remove_in(&mut nodes[i], target, predicate) {
                    if nodes[i].is_empty() {
                        let _ = nodes.remove(i);
                    }
                    node.calc_bbox();
                    return Some(removed);
                }
            }
            None
        }
    }
}
