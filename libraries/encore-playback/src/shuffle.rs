//! Shuffle permutations
//!
//! Produces visiting orders over queue indices rather than reordering the
//! tracks themselves, so the queue keeps its source order.

use crate::random::RandomSource;

/// Sequential order `[0, 1, ..., n - 1]`
pub fn identity(n: usize) -> Vec<usize> {
    (0..n).collect()
}

/// Unbiased random permutation of `[0, n)` (Fisher-Yates)
///
/// Walks from the last slot down to 1, swapping each slot with a uniformly
/// chosen slot at or before it.
pub fn permutation(n: usize, rng: &mut dyn RandomSource) -> Vec<usize> {
    let mut order = identity(n);
    for i in (1..n).rev() {
        let j = rng.index_below(i + 1);
        order.swap(i, j);
    }
    order
}

/// Check that `order` is a bijection on `[0, n)`
pub fn is_permutation(order: &[usize], n: usize) -> bool {
    if order.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &index in order {
        if index >= n || seen[index] {
            return false;
        }
        seen[index] = true;
    }
    true
}
