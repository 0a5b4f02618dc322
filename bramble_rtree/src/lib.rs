// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=bramble_rtree --heading-base-level=0

//! Bramble R-tree: a dynamic 2D spatial index over axis-aligned bounding boxes.
//!
//! Bramble R-tree is a reusable building block for maps, editors, and simulations that
//! need fast rectangle queries over a changing set of boxes.
//!
//! - Insert single items, or bulk-load whole batches with OMT packing for a tighter tree.
//! - Search by intersecting rectangle, or test for any collision with an early-out.
//! - Remove items by exact match or by predicate, with automatic tree condensation.
//!
//! It is generic over the scalar type `T` and carries an opaque payload `P` per item.
//! Split and insertion heuristics compute their metrics in widened accumulator types
//! (f32→f64, f64→f64, i64→i128) so area and margin comparisons stay robust.
//!
//! ## Features
//!
//! - `serde`: derives `Serialize`/`Deserialize` for [`Aabb2D`], [`Entry`], and
//!   [`NodeDump`], so trees can be persisted via [`RTree::to_dump`] and rebuilt with
//!   [`RTree::from_dump`].
//!
//! # Example
//!
//! ```rust
//! use bramble_rtree::{Aabb2D, Entry, RTree};
//!
//! // Bulk-load a tree, then keep it current with single-item updates.
//! let mut tree: RTree<f64, u32> = RTree::new();
//! tree.load(vec![
//!     Entry::new(Aabb2D::new(0.0, 0.0, 10.0, 10.0), 1),
//!     Entry::new(Aabb2D::new(20.0, 20.0, 30.0, 30.0), 2),
//!     Entry::new(Aabb2D::new(25.0, 0.0, 35.0, 10.0), 3),
//! ]);
//! tree.insert(Entry::new(Aabb2D::new(5.0, 5.0, 15.0, 15.0), 4));
//!
//! // Rectangle query: edges count as overlapping.
//! let hits: Vec<u32> = tree
//!     .search(&Aabb2D::new(0.0, 0.0, 12.0, 12.0))
//!     .iter()
//!     .map(|e| e.payload)
//!     .collect();
//! assert_eq!(hits.len(), 2);
//!
//! // Remove an item by its box and payload.
//! let removed = tree.remove(&Aabb2D::new(20.0, 20.0, 30.0, 30.0), &2);
//! assert!(removed.is_some());
//! assert!(!tree.collides(&Aabb2D::new(20.0, 20.0, 30.0, 30.0)));
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates; use
//! [`RTree::try_load_columns`] to validate untrusted input up front. Boxes must
//! satisfy `min <= max` on both axes; degenerate (zero-area) boxes are fine.

#![no_std]

extern crate alloc;

mod dump;
mod error;
mod node;
mod select;
mod split;
mod tree;
mod types;

pub use dump::NodeDump;
pub use error::Error;
pub use node::Entry;
pub use tree::RTree;
pub use types::{Aabb2D, Scalar};
