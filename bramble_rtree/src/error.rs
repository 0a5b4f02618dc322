// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types reported by fallible tree operations.

/// The reasons loading or reconstructing a tree can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Column inputs have differing lengths.
    #[error("column length mismatch: expected {expected} elements, got {got}")]
    LengthMismatch {
        /// Length of the first column, which the rest must match.
        expected: usize,
        /// Length of the column that differed.
        got: usize,
    },
    /// A box has `min > max` (or a NaN coordinate) on some axis.
    #[error("box at index {index} has min > max on some axis")]
    InvertedBox {
        /// Position of the offending box in the input columns.
        index: usize,
    },
    /// A serialized tree dump has inconsistent structure.
    #[error("dump is structurally invalid: {reason}")]
    InvalidDump {
        /// What the structural check found.
        reason: &'static str,
    },
}
