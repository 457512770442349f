//! Play order for the track queue
//!
//! The queue itself is a plain list of tracks owned by the engine. `PlayOrder`
//! holds the visiting order over its indices:
//!
//! ```text
//! tracks:  [A, B, C, D]
//! order:   [2, 0, 3, 1]   (shuffled)
//! current: 0 (A) -> next is order[pos(0) + 1] = 3 (D)
//! ```
//!
//! Navigation always wraps modulo the queue length; there is no end of queue.

use crate::random::RandomSource;
use crate::shuffle;

/// Visiting order over queue indices
#[derive(Debug, Clone, Default)]
pub struct PlayOrder {
    /// Always a permutation of `[0, len)`
    order: Vec<usize>,

    /// Whether `order` was produced by a shuffle
    shuffled: bool,
}

impl PlayOrder {
    /// Create an empty order
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the order for a queue of `n` tracks
    ///
    /// Called whenever the queue length or the shuffle flag changes.
    pub fn regenerate(&mut self, n: usize, shuffled: bool, rng: &mut dyn RandomSource) {
        self.order = if shuffled {
            shuffle::permutation(n, rng)
        } else {
            shuffle::identity(n)
        };
        self.shuffled = shuffled;
    }

    /// Index that follows `current`
    ///
    /// Returns `None` only for an empty queue. A one-track queue returns
    /// the same index.
    pub fn next_index(&self, current: usize) -> Option<usize> {
        self.step(current, 1)
    }

    /// Index that precedes `current`
    pub fn previous_index(&self, current: usize) -> Option<usize> {
        self.step(current, self.order.len().saturating_sub(1))
    }

    /// First index of the order (where a fresh queue starts)
    pub fn first(&self) -> Option<usize> {
        self.order.first().copied()
    }

    /// Current visiting order
    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    /// Number of indices in the order
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the order is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether the order is shuffled
    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    fn step(&self, current: usize, offset: usize) -> Option<usize> {
        let n = self.order.len();
        if n == 0 {
            return None;
        }

        if self.shuffled {
            // An index missing from the order can only come from a caller bug;
            // restart from the head rather than panic.
            let pos = self.order.iter().position(|&i| i == current).unwrap_or(0);
            Some(self.order[(pos + offset) % n])
        } else {
            Some((current % n + offset) % n)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::StdRandom;

    fn sequential(n: usize) -> PlayOrder {
        let mut order = PlayOrder::new();
        order.regenerate(n, false, &mut StdRandom::seeded(0));
        order
    }

    #[test]
    fn sequential_wraps_forward() {
        let order = sequential(3);
        assert_eq!(order.next_index(0), Some(1));
        assert_eq!(order.next_index(1), Some(2));
        assert_eq!(order.next_index(2), Some(0));
    }

    #[test]
    fn sequential_wraps_backward() {
        let order = sequential(3);
        assert_eq!(order.previous_index(0), Some(2));
        assert_eq!(order.previous_index(2), Some(1));
    }

    #[test]
    fn single_track_returns_itself() {
        let order = sequential(1);
        assert_eq!(order.next_index(0), Some(0));
        assert_eq!(order.previous_index(0), Some(0));

        let mut shuffled = PlayOrder::new();
        shuffled.regenerate(1, true, &mut StdRandom::seeded(1));
        assert_eq!(shuffled.next_index(0), Some(0));
    }

    #[test]
    fn empty_queue_has_no_neighbours() {
        let order = sequential(0);
        assert_eq!(order.next_index(0), None);
        assert_eq!(order.previous_index(0), None);
        assert_eq!(order.first(), None);
    }

    #[test]
    fn shuffled_follows_permutation() {
        let mut order = PlayOrder::new();
        order.regenerate(6, true, &mut StdRandom::seeded(99));
        let perm = order.as_slice().to_vec();

        for (pos, &index) in perm.iter().enumerate() {
            assert_eq!(order.next_index(index), Some(perm[(pos + 1) % 6]));
            assert_eq!(order.previous_index(index), Some(perm[(pos + 5) % 6]));
        }
    }

    #[test]
    fn regenerate_tracks_shuffle_flag() {
        let mut order = PlayOrder::new();
        let mut rng = StdRandom::seeded(5);

        order.regenerate(4, true, &mut rng);
        assert!(order.is_shuffled());

        order.regenerate(4, false, &mut rng);
        assert!(!order.is_shuffled());
        assert_eq!(order.as_slice(), &[0, 1, 2, 3]);
    }
}
