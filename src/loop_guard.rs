// Head-position cycle detection
//
// A snake that keeps revisiting the same cells in the same order is stuck;
// the guard spots the smallest repeated window in the bounded head history.

use std::collections::VecDeque;

use crate::types::Coord;

/// Detects repeating head-position cycles in a bounded history window.
pub struct LoopGuard {
    min_window: usize,
}

impl LoopGuard {
    pub fn new(min_window: usize) -> Self {
        LoopGuard { min_window }
    }

    /// Returns true when, for some window length `L` between the minimum
    /// and half the available history, the last `L` positions exactly equal
    /// the `L` positions immediately preceding them. Windows are scanned
    /// smallest first.
    pub fn detect(&self, history: &VecDeque<Coord>) -> bool {
        let len = history.len();
        if len < self.min_window * 2 {
            return false;
        }

        for window in self.min_window..=len / 2 {
            let repeated = (0..window)
                .all(|i| history[len - window + i] == history[len - 2 * window + i]);
            if repeated {
                return true;
            }
        }

        false
    }
}
