// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and the scalar abstraction.

use core::cmp::Ordering;
use core::fmt::Debug;

/// Axis-aligned bounding box in 2D.
///
/// The "empty" box (`min` at the positive sentinel, `max` at the negative
/// sentinel) is the identity element for [`union`][Self::union]: extending it
/// by any box yields that box. A box that has been extended by at least one
/// item satisfies `min_x <= max_x` and `min_y <= max_y`; degenerate
/// (zero-area) boxes are valid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb2D<T> {
    /// Minimum x (left)
    pub min_x: T,
    /// Minimum y (top)
    pub min_y: T,
    /// Maximum x (right)
    pub max_x: T,
    /// Maximum y (bottom)
    pub max_y: T,
}

impl<T> Aabb2D<T> {
    /// Create a new AABB from min/max corners.
    #[inline(always)]
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Copy + PartialOrd> Aabb2D<T> {
    /// Whether this AABB fully contains `other` (edges included).
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    /// Determines whether this AABB overlaps with another in any way.
    ///
    /// Note that the edge of the AABB is considered to be part of itself,
    /// meaning that two AABBs that share an edge are considered to overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// The smallest AABB enclosing two AABBs.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: min_t(self.min_x, other.min_x),
            min_y: min_t(self.min_y, other.min_y),
            max_x: max_t(self.max_x, other.max_x),
            max_y: max_t(self.max_y, other.max_y),
        }
    }

    /// Enlarge this AABB in place so that it encloses `other`.
    #[inline]
    pub fn extend(&mut self, other: &Self) {
        *self = self.union(other);
    }
}

impl<T: Scalar> Aabb2D<T> {
    /// The identity element for [`union`][Self::union].
    #[inline]
    pub fn empty() -> Self {
        Self {
            min_x: T::max_sentinel(),
            min_y: T::max_sentinel(),
            max_x: T::min_sentinel(),
            max_y: T::min_sentinel(),
        }
    }

    /// Compute the area of the AABB using the scalar's widened accumulator type.
    #[inline]
    pub fn area(&self) -> T::Acc {
        let w = T::sub(self.max_x, self.min_x);
        let h = T::sub(self.max_y, self.min_y);
        T::widen(w) * T::widen(h)
    }

    /// Half the perimeter, widened. A cheap compactness proxy for split-axis
    /// selection.
    #[inline]
    pub fn margin(&self) -> T::Acc {
        let w = T::sub(self.max_x, self.min_x);
        let h = T::sub(self.max_y, self.min_y);
        T::widen(w) + T::widen(h)
    }

    /// Area of `self.union(other)` without building the union box.
    #[inline]
    pub fn enlarged_area(&self, other: &Self) -> T::Acc {
        let w = T::sub(
            max_t(self.max_x, other.max_x),
            min_t(self.min_x, other.min_x),
        );
        let h = T::sub(
            max_t(self.max_y, other.max_y),
            min_t(self.min_y, other.min_y),
        );
        T::widen(w) * T::widen(h)
    }

    /// Area of the intersection of two AABBs; zero when they are disjoint.
    #[inline]
    pub fn intersection_area(&self, other: &Self) -> T::Acc {
        let w = T::sub(
            min_t(self.max_x, other.max_x),
            max_t(self.min_x, other.min_x),
        );
        let h = T::sub(
            min_t(self.max_y, other.max_y),
            max_t(self.min_y, other.min_y),
        );
        T::widen(T::max(w, T::zero())) * T::widen(T::max(h, T::zero()))
    }
}

/// Numeric scalar abstraction for 2D AABBs.
///
/// This trait provides the small set of operations the split and insertion
/// heuristics need, plus an associated widened accumulator type for area and
/// margin metrics (e.g., f32→f64, i64→i128) so comparisons stay robust.
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Widened accumulator type suitable for area/margin computations.
    type Acc: Copy
        + PartialOrd
        + core::ops::Add<Output = Self::Acc>
        + core::ops::Sub<Output = Self::Acc>
        + core::ops::Mul<Output = Self::Acc>
        + Debug;

    /// Subtract two scalar values: a - b.
    fn sub(a: Self, b: Self) -> Self;

    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// Max of the two scalar values.
    fn max(a: Self, b: Self) -> Self;

    /// Smallest representable value; the `max` corner of the empty box.
    fn min_sentinel() -> Self;

    /// Largest representable value; the `min` corner of the empty box.
    fn max_sentinel() -> Self;

    /// Convert a scalar to the accumulator type.
    fn widen(v: Self) -> Self::Acc;
}

impl Scalar for f32 {
    type Acc = f64;

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        Self::max(a, b)
    }

    #[inline(always)]
    fn min_sentinel() -> Self {
        Self::NEG_INFINITY
    }

    #[inline(always)]
    fn max_sentinel() -> Self {
        Self::INFINITY
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as f64
    }
}

impl Scalar for f64 {
    type Acc = Self;

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        Self::max(a, b)
    }

    #[inline(always)]
    fn min_sentinel() -> Self {
        Self::NEG_INFINITY
    }

    #[inline(always)]
    fn max_sentinel() -> Self {
        Self::INFINITY
    }

    #[inline(always)]
    fn widen(v: Self) -> Self::Acc {
        v
    }
}

impl Scalar for i64 {
    type Acc = i128;

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a.saturating_sub(b)
    }

    #[inline(always)]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        core::cmp::max(a, b)
    }

    #[inline(always)]
    fn min_sentinel() -> Self {
        Self::MIN
    }

    #[inline(always)]
    fn max_sentinel() -> Self {
        Self::MAX
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as i128
    }
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb2D;

    #[test]
    fn empty_is_union_identity() {
        let e = Aabb2D::<f64>::empty();
        let b = Aabb2D::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(e.union(&b), b);
        assert_eq!(b.union(&e), b);
    }

    #[test]
    fn area_and_margin() {
        let b = Aabb2D::<f64>::new(5.0, 7.0, 10.0, 9.0);
        assert_eq!(b.area(), 10.0);
        assert_eq!(b.margin(), 7.0);

        // Degenerate boxes are valid.
        let p = Aabb2D::<f64>::new(3.0, 3.0, 3.0, 3.0);
        assert_eq!(p.area(), 0.0);
        assert_eq!(p.margin(), 0.0);
    }

    #[test]
    fn enlarged_area_matches_union_area() {
        let a = Aabb2D::<f64>::new(0.0, 0.0, 2.0, 2.0);
        let b = Aabb2D::new(5.0, 1.0, 6.0, 7.0);
        assert_eq!(a.enlarged_area(&b), a.union(&b).area());
    }

    #[test]
    fn intersection_area_clamps_to_zero() {
        let a = Aabb2D::<f64>::new(0.0, 0.0, 2.0, 2.0);
        let b = Aabb2D::new(1.0, 1.0, 3.0, 3.0);
        assert_eq!(a.intersection_area(&b), 1.0);

        let c = Aabb2D::new(10.0, 10.0, 12.0, 12.0);
        assert_eq!(a.intersection_area(&c), 0.0);
        // Disjoint on one axis only still has zero intersection.
        let d = Aabb2D::new(1.0, 10.0, 3.0, 12.0);
        assert_eq!(a.intersection_area(&d), 0.0);
    }

    #[test]
    fn contains_and_overlaps_are_edge_inclusive() {
        let outer = Aabb2D::<i64>::new(0, 0, 10, 10);
        let inner = Aabb2D::new(0, 0, 10, 5);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));

        let touching = Aabb2D::new(10, 0, 20, 10);
        assert!(outer.overlaps(&touching));
        let apart = Aabb2D::new(11, 0, 20, 10);
        assert!(!outer.overlaps(&apart));
    }

    #[test]
    fn i64_metrics_widen_to_i128() {
        let b = Aabb2D::<i64>::new(-2_000_000_000, -2_000_000_000, 2_000_000_000, 2_000_000_000);
        // Does not fit in i64; the widened accumulator holds it.
        assert_eq!(b.area(), 16_000_000_000_000_000_000_i128);
    }
}
