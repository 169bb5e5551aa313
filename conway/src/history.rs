// history.rs - Detects repeating grid states from a short hash history

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::grid::Snapshot;

/// Number of past generations remembered.
pub const HISTORY_LEN: usize = 10;

/// Ring buffer of recent `(hash, generation)` pairs.
#[derive(Debug, Clone, Default)]
pub struct CycleDetector {
    history: [(u64, u64); HISTORY_LEN],
    count: usize,
}

impl CycleDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash of the snapshot's cells; the generation number is not included.
    pub fn hash_cells(snapshot: &Snapshot) -> u64 {
        let mut hasher = DefaultHasher::new();
        snapshot.cells().hash(&mut hasher);
        hasher.finish()
    }

    /// Records `snapshot`. Returns the period if the same cells were seen
    /// within the last [`HISTORY_LEN`] observations.
    pub fn observe(&mut self, snapshot: &Snapshot) -> Option<u64> {
        let hash = Self::hash_cells(snapshot);
        let generation = snapshot.generation();

        let seen = self.history[..self.count.min(HISTORY_LEN)]
            .iter()
            .filter(|&&(h, _)| h == hash)
            .map(|&(_, g)| g)
            .max();

        self.history[self.count % HISTORY_LEN] = (hash, generation);
        self.count += 1;

        seen.map(|g| generation.saturating_sub(g))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
