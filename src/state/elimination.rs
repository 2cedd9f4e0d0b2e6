//! Removal of wrong options at fixed points of the answering countdown.

use std::collections::BTreeSet;

use rand::{Rng, seq::IndexedRandom};

/// Countdown values (seconds remaining) at which one distractor is removed.
pub const DEFAULT_CHECKPOINTS: [u32; 2] = [25, 10];

/// Decides when an elimination happens and which option it removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EliminationScheduler {
    checkpoints: BTreeSet<u32>,
}

impl Default for EliminationScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_CHECKPOINTS)
    }
}

impl EliminationScheduler {
    /// Build a scheduler firing at each of `checkpoints` (seconds remaining).
    pub fn new(checkpoints: impl IntoIterator<Item = u32>) -> Self {
        Self {
            checkpoints: checkpoints.into_iter().collect(),
        }
    }

    /// Whether `time_remaining_secs` is one of the configured checkpoints.
    pub fn is_checkpoint(&self, time_remaining_secs: u32) -> bool {
        self.checkpoints.contains(&time_remaining_secs)
    }

    /// Pick, uniformly at random, an option that is neither the correct one nor
    /// already eliminated. Returns `None` when nothing is left to remove.
    pub fn pick<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        option_count: usize,
        correct_index: usize,
        eliminated: &BTreeSet<usize>,
    ) -> Option<usize> {
        let eligible: Vec<usize> = (0..option_count)
            .filter(|index| *index != correct_index && !eliminated.contains(index))
            .collect();
        eligible.choose(rng).copied()
    }
}
