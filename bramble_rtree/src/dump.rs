// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural snapshots of a tree, for persistence and interchange.
//!
//! A [`NodeDump`] mirrors the tree shape exactly, so a dump round-trips to an
//! identical structure: boxes are carried over as stored, not recomputed.
//! With the `serde` feature enabled the dump (de)serializes with any serde
//! format crate.

use alloc::vec::Vec;

use crate::error::Error;
use crate::node::{Children, Entry, Node};
use crate::tree::RTree;
use crate::types::{Aabb2D, Scalar};

/// An owned snapshot of one tree node and everything below it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeDump<T, P> {
    /// A leaf and its entries.
    Leaf {
        /// The node's bounding box.
        aabb: Aabb2D<T>,
        /// The leaf's entries.
        entries: Vec<Entry<T, P>>,
    },
    /// An internal node and its child subtrees.
    Internal {
        /// The node's bounding box.
        aabb: Aabb2D<T>,
        /// The node's height; leaves sit at height 1.
        height: usize,
        /// The child subtrees, each one level below this node.
        children: Vec<NodeDump<T, P>>,
    },
}

impl<T: Scalar, P> RTree<T, P> {
    /// Snapshot the tree structure into an owned [`NodeDump`].
    pub fn to_dump(&self) -> NodeDump<T, P>
    where
        P: Clone,
    {
        dump_node(&self.root)
    }

    /// Rebuild a tree from a snapshot, with the given fan-out tuning.
    ///
    /// The dump's structure is validated (consistent heights, no empty
    /// internal nodes below the root); its boxes are trusted as stored.
    pub fn from_dump(dump: NodeDump<T, P>, max_entries: usize) -> Result<Self, Error> {
        let mut tree = Self::with_max_entries(max_entries);
        tree.root = restore_node(dump, true)?;
        Ok(tree)
    }
}

fn dump_node<T: Scalar, P: Clone>(node: &Node<T, P>) -> NodeDump<T, P> {
    match &node.children {
        Children::Entries(entries) => NodeDump::Leaf {
            aabb: node.aabb,
            entries: entries.clone(),
        },
        Children::Nodes(nodes) => NodeDump::Internal {
            aabb: node.aabb,
            height: node.height,
            children: nodes.iter().map(dump_node).collect(),
        },
    }
}

fn restore_node<T: Scalar, P>(dump: NodeDump<T, P>, is_root: bool) -> Result<Node<T, P>, Error> {
    match dump {
        NodeDump::Leaf { aabb, entries } => Ok(Node {
            aabb,
            height: 1,
            children: Children::Entries(entries),
        }),
        NodeDump::Internal {
            aabb,
            height,
            children,
        } => {
            if height < 2 {
                return Err(Error::InvalidDump {
                    reason: "internal node below leaf height",
                });
            }
            if children.is_empty() && !is_root {
                return Err(Error::InvalidDump {
                    reason: "empty internal node below the root",
                });
            }
            let mut nodes = Vec::with_capacity(children.len());
            for child in children {
                let child = restore_node(child, false)?;
                if child.height + 1 != height {
                    return Err(Error::InvalidDump {
                        reason: "child height does not match its parent",
                    });
                }
                nodes.push(child);
            }
            Ok(Node {
                aabb,
                height,
                children: Children::Nodes(nodes),
            })
        }
    }
}
