// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-place partial sorting: Floyd–Rivest selection and grouped multi-select.
//!
//! The bulk loader does not need totally sorted input, only contiguous groups
//! whose keys are ordered *between* groups. [`multi_select`] produces exactly
//! that by repeatedly partitioning around group boundaries, which is much
//! cheaper than a full sort.

use smallvec::SmallVec;

/// Ranges longer than this use Floyd–Rivest sampling to pick a better pivot.
const SAMPLE_THRESHOLD: usize = 600;

/// Rearrange `items[left..=right]` in place so that `items[k]` is the element
/// that would occupy position `k` in a full ascending sort by `key`, with
/// everything left of `k` less than or equal to it and everything right of
/// `k` greater than or equal to it.
///
/// Keys must admit a total order over the input (no NaN coordinates). Ties
/// may land on either side of `k`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Sampling bounds are clamped into [left, right] before the cast."
)]
pub(crate) fn quickselect<I, T, K>(items: &mut [I], k: usize, mut left: usize, mut right: usize, key: &K)
where
    T: Copy + PartialOrd,
    K: Fn(&I) -> T,
{
    while right > left {
        if right - left > SAMPLE_THRESHOLD {
            // Floyd–Rivest: select within a sampled subrange around k first,
            // so the partition below runs against a near-median pivot.
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = libm::log(n);
            let s = 0.5 * libm::exp(2.0 * z / 3.0);
            let sign = if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 };
            let sd = 0.5 * libm::sqrt(z * s * (n - s) / n) * sign;
            let kf = k as f64;
            let new_left = f64::max(left as f64, libm::floor(kf - m * s / n + sd)) as usize;
            let new_right = f64::min(right as f64, libm::floor(kf + (n - m) * s / n + sd)) as usize;
            quickselect(items, k, new_left, new_right, key);
        }

        // Hoare partition around the key of the element currently at k.
        let t = key(&items[k]);
        let mut i = left;
        let mut j = right;

        items.swap(left, k);
        if key(&items[right]) > t {
            items.swap(left, right);
        }

        while i < j {
            items.swap(i, j);
            i += 1;
            j -= 1;
            while key(&items[i]) < t {
                i += 1;
            }
            while key(&items[j]) > t {
                j -= 1;
            }
        }

        if key(&items[left]) == t {
            items.swap(left, j);
        } else {
            j += 1;
            items.swap(j, right);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            right = j.saturating_sub(1);
            if j == 0 {
                break;
            }
        }
    }
}

/// Partition `items[left..=right]` into contiguous runs of length `n` whose
/// keys are non-decreasing between runs. Runs are not individually sorted.
///
/// Iterative with an explicit range stack so deeply uneven inputs cannot blow
/// the call stack.
pub(crate) fn multi_select<I, T, K>(items: &mut [I], left: usize, right: usize, n: usize, key: &K)
where
    T: Copy + PartialOrd,
    K: Fn(&I) -> T,
{
    let mut stack: SmallVec<[(usize, usize); 16]> = SmallVec::new();
    stack.push((left, right));

    while let Some((left, right)) = stack.pop() {
        if right - left <= n {
            continue;
        }
        // Split at the group boundary nearest the middle of the range.
        let mid = left + (right - left).div_ceil(2 * n) * n;
        quickselect(items, mid, left, right, key);
        stack.push((left, mid));
        stack.push((mid, right));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn ident(v: &i64) -> i64 {
        *v
    }

    #[test]
    fn selects_kth_smallest() {
        let mut items = [65_i64, 28, 59, 33, 21, 56, 22, 95, 50, 12, 90, 53, 28, 77, 39];
        let last = items.len() - 1;
        quickselect(&mut items, 8, 0, last, &ident);

        let mut sorted = items;
        sorted.sort_unstable();
        assert_eq!(items[8], sorted[8]);
        for i in 0..8 {
            assert!(items[i] <= items[8], "left side must not exceed the pivot");
        }
        for i in 9..items.len() {
            assert!(items[i] >= items[8], "right side must not undercut the pivot");
        }
    }

    #[test]
    fn selects_in_subrange_only() {
        let mut items: Vec<i64> = (0..40).rev().collect();
        let frozen_head = items[..5].to_vec();
        quickselect(&mut items, 20, 5, 39, &ident);
        // Elements outside [left, right] are untouched.
        assert_eq!(&items[..5], frozen_head.as_slice());
        let mut expected: Vec<i64> = items[5..].to_vec();
        expected.sort_unstable();
        assert_eq!(items[20], expected[15]);
    }

    #[test]
    fn sampling_path_above_threshold() {
        // Deterministic pseudo-random permutation, long enough to trigger the
        // Floyd–Rivest sampling branch.
        let mut items: Vec<i64> = (0..5000).map(|i| (i * 2654435761_i64) % 9973).collect();
        let last = items.len() - 1;
        let k = 2500;
        quickselect(&mut items, k, 0, last, &ident);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(items[k], sorted[k]);
        assert!(items[..k].iter().all(|v| *v <= items[k]), "prefix partitioned");
        assert!(items[k + 1..].iter().all(|v| *v >= items[k]), "suffix partitioned");
    }

    #[test]
    fn handles_duplicate_keys() {
        let mut items = [5_i64, 5, 5, 5, 1, 5, 5, 9, 5];
        let last = items.len() - 1;
        quickselect(&mut items, 4, 0, last, &ident);
        let mut sorted = items;
        sorted.sort_unstable();
        assert_eq!(items[4], sorted[4]);
    }

    #[test]
    fn multi_select_orders_between_runs() {
        let mut items: Vec<i64> = (0..200).map(|i| (i * 7919) % 401).collect();
        let last = items.len() - 1;
        let n = 16;
        multi_select(&mut items, 0, last, n, &ident);

        // Max of each run must not exceed the min of the next run.
        let mut start = 0;
        while start + n <= last {
            let run_max = items[start..start + n].iter().copied().fold(i64::MIN, i64::max);
            let next_end = (start + 2 * n).min(items.len());
            let next_min = items[start + n..next_end].iter().copied().fold(i64::MAX, i64::min);
            assert!(run_max <= next_min, "runs must be ordered between themselves");
            start += n;
        }
    }
}
