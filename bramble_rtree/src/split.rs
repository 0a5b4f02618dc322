// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Split engine: axis and index choice for overflowing nodes.
//!
//! Axis choice minimizes the total margin summed over every valid split
//! distribution (margin is a cheap compactness proxy); index choice then
//! minimizes the overlap between the two halves, breaking ties by the smaller
//! combined area. All metrics are computed in the scalar's widened
//! accumulator type so comparisons stay robust.

use crate::node::{Axis, Node};
use crate::types::{Aabb2D, Scalar};

/// Split an overflowing node around the best axis and index.
///
/// The original node keeps the children left of the split index (callers
/// holding a path to it stay valid); the returned sibling takes the rest and
/// inherits the node's height and leaf/internal kind. Both boxes are
/// recomputed from the partitioned children.
pub(crate) fn split<T: Scalar, P>(node: &mut Node<T, P>, min_entries: usize) -> Node<T, P> {
    choose_split_axis(node, min_entries);
    let index = choose_split_index(node, min_entries);

    let tail = node.children.split_off(index);
    let mut sibling = Node {
        aabb: Aabb2D::empty(),
        height: node.height,
        children: tail,
    };
    node.calc_bbox();
    sibling.calc_bbox();
    sibling
}

/// Sort the node's children by the axis with the smaller total distribution
/// margin.
///
/// Side effect by design: both axes are measured (each measurement sorts the
/// children), and the X order is re-established only when its total margin is
/// strictly smaller. On a tie the children stay in the Y order computed
/// second.
fn choose_split_axis<T: Scalar, P>(node: &mut Node<T, P>, min_entries: usize) {
    let x_margin = all_dist_margin(node, min_entries, Axis::X);
    let y_margin = all_dist_margin(node, min_entries, Axis::Y);

    if x_margin < y_margin {
        node.sort_by_axis(Axis::X);
    }
}

/// Total margin over all split distributions that leave at least
/// `min_entries` children on each side, after sorting by `axis`.
///
/// Prefix and suffix boxes are grown incrementally so the whole sweep is one
/// forward and one backward pass.
fn all_dist_margin<T: Scalar, P>(node: &mut Node<T, P>, min_entries: usize, axis: Axis) -> T::Acc {
    node.sort_by_axis(axis);

    let total = node.len();
    let m = min_entries;

    let mut left = node.dist_bbox(0..m);
    let mut right = node.dist_bbox(total - m..total);
    let mut margin = left.margin() + right.margin();

    for i in m..total - m {
        left.extend(&node.child_bbox(i));
        margin = margin + left.margin();
    }
    for i in (m..=total - m - 1).rev() {
        right.extend(&node.child_bbox(i));
        margin = margin + right.margin();
    }

    margin
}

/// Pick the split index over the axis-sorted children: minimum overlap
/// between the halves, then minimum combined area, then the smallest index.
/// Falls back to `min_entries` if no candidate improved on the sentinels
/// (unreachable for well-formed inputs).
fn choose_split_index<T: Scalar, P>(node: &Node<T, P>, min_entries: usize) -> usize {
    let total = node.len();
    let m = min_entries;

    // (index, overlap, running minimum area)
    let mut best: Option<(usize, T::Acc, T::Acc)> = None;

    for i in m..=total - m {
        let bbox1 = node.dist_bbox(0..i);
        let bbox2 = node.dist_bbox(i..total);

        let overlap = bbox1.intersection_area(&bbox2);
        let area = bbox1.area() + bbox2.area();

        match &mut best {
            None => best = Some((i, overlap, area)),
            Some((index, min_overlap, min_area)) => {
                if overlap < *min_overlap {
                    *index = i;
                    *min_overlap = overlap;
                    if area < *min_area {
                        *min_area = area;
                    }
                } else if overlap == *min_overlap && area < *min_area {
                    *index = i;
                    *min_area = area;
                }
            }
        }
    }

    best.map_or(min_entries, |(index, _, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Entry;
    use alloc::vec::Vec;

    fn leaf_of(boxes: &[(f64, f64, f64, f64)]) -> Node<f64, usize> {
        let entries: Vec<Entry<f64, usize>> = boxes
            .iter()
            .enumerate()
            .map(|(i, &(x0, y0, x1, y1))| Entry::new(Aabb2D::new(x0, y0, x1, y1), i))
            .collect();
        Node::new_leaf(entries)
    }

    #[test]
    fn split_partitions_two_clusters() {
        // Two well-separated clusters along x; the split must not mix them.
        let mut node = leaf_of(&[
            (0.0, 0.0, 1.0, 1.0),
            (1.0, 1.0, 2.0, 2.0),
            (2.0, 0.0, 3.0, 1.0),
            (100.0, 0.0, 101.0, 1.0),
            (101.0, 1.0, 102.0, 2.0),
            (102.0, 0.0, 103.0, 1.0),
        ]);
        let sibling = split(&mut node, 2);

        assert_eq!(node.len() + sibling.len(), 6);
        assert!(node.len() >= 2 && sibling.len() >= 2, "both halves at least min full");
        assert_eq!(node.aabb.intersection_area(&sibling.aabb), 0.0);

        let (low, high) = if node.aabb.min_x < sibling.aabb.min_x {
            (&node, &sibling)
        } else {
            (&sibling, &node)
        };
        assert_eq!(low.aabb, Aabb2D::new(0.0, 0.0, 3.0, 2.0));
        assert_eq!(high.aabb, Aabb2D::new(100.0, 0.0, 103.0, 2.0));
    }

    #[test]
    fn split_prefers_axis_with_smaller_margin() {
        // Clusters separated along y; the y axis must win even though the
        // children arrive ordered by x.
        let mut node = leaf_of(&[
            (0.0, 0.0, 1.0, 1.0),
            (1.0, 100.0, 2.0, 101.0),
            (2.0, 0.0, 3.0, 1.0),
            (3.0, 100.0, 4.0, 101.0),
            (4.0, 0.0, 5.0, 1.0),
            (5.0, 100.0, 6.0, 101.0),
        ]);
        let sibling = split(&mut node, 2);
        assert_eq!(node.aabb.intersection_area(&sibling.aabb), 0.0);
        // One half holds the low band, the other the high band.
        let bands = [node.aabb, sibling.aabb];
        assert!(bands.iter().any(|b| b.max_y <= 1.0), "low band half expected");
        assert!(bands.iter().any(|b| b.min_y >= 100.0), "high band half expected");
    }

    #[test]
    fn split_keeps_height_and_kind() {
        let mut node = leaf_of(&[
            (0.0, 0.0, 1.0, 1.0),
            (10.0, 0.0, 11.0, 1.0),
            (20.0, 0.0, 21.0, 1.0),
            (30.0, 0.0, 31.0, 1.0),
            (40.0, 0.0, 41.0, 1.0),
        ]);
        let sibling = split(&mut node, 2);
        assert_eq!(sibling.height, node.height);
        assert!(sibling.is_leaf());
    }

    #[test]
    fn split_index_minimizes_overlap_first() {
        // Sorted by x: indices 2 and 3 both leave min-full halves; splitting
        // between the clusters (index 2 in the 2+3 case below) has zero
        // overlap and must win over any overlapping distribution.
        let mut node = leaf_of(&[
            (0.0, 0.0, 2.0, 2.0),
            (1.0, 0.0, 3.0, 2.0),
            (50.0, 0.0, 52.0, 2.0),
            (51.0, 0.0, 53.0, 2.0),
            (52.0, 0.0, 54.0, 2.0),
        ]);
        let sibling = split(&mut node, 2);
        assert_eq!(node.aabb.intersection_area(&sibling.aabb), 0.0);
    }
}
