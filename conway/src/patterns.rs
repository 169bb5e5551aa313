// patterns.rs - Built-in block seeds

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cell::CellState;
use crate::error::SeedError;
use crate::seed::SeedPattern;

/// Named pattern, cells given relative to the block centre.
pub struct Pattern {
    pub name: &'static str,
    pub cells: &'static [(isize, isize)],
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "Glider",
        cells: &[(-1, 0), (0, 1), (1, -1), (1, 0), (1, 1)],
    },
    Pattern {
        name: "Blinker",
        cells: &[(0, -1), (0, 0), (0, 1)],
    },
    Pattern {
        name: "Block",
        cells: &[(0, 0), (0, 1), (1, 0), (1, 1)],
    },
    Pattern {
        name: "Toad",
        cells: &[(0, 0), (0, 1), (0, 2), (1, -1), (1, 0), (1, 1)],
    },
    Pattern {
        name: "Beacon",
        cells: &[(-2, -2), (-2, -1), (-1, -2), (-1, -1), (0, 0), (0, 1), (1, 0), (1, 1)],
    },
    Pattern {
        name: "R-pentomino",
        cells: &[(0, 0), (0, 1), (-1, 1), (1, 0), (1, -1)],
    },
    Pattern {
        name: "Pulsar",
        cells: &[
            // Top half
            (-6, -4), (-6, -3), (-6, -2), (-6, 2), (-6, 3), (-6, 4),
            (-4, -6), (-4, -1), (-4, 1), (-4, 6),
            (-3, -6), (-3, -1), (-3, 1), (-3, 6),
            (-2, -6), (-2, -1), (-2, 1), (-2, 6),
            (-1, -4), (-1, -3), (-1, -2), (-1, 2), (-1, 3), (-1, 4),
            // Bottom half (mirrored)
            (1, -4), (1, -3), (1, -2), (1, 2), (1, 3), (1, 4),
            (2, -6), (2, -1), (2, 1), (2, 6),
            (3, -6), (3, -1), (3, 1), (3, 6),
            (4, -6), (4, -1), (4, 1), (4, 6),
            (6, -4), (6, -3), (6, -2), (6, 2), (6, 3), (6, 4),
        ],
    },
];

impl Pattern {
    /// Places the pattern at the centre of a `rows x cols` block. Cells that
    /// fall outside the block are dropped.
    pub fn to_seed(&self, rows: usize, cols: usize) -> SeedPattern {
        let (cr, cc) = ((rows / 2) as isize, (cols / 2) as isize);
        let mut seed = SeedPattern::empty(rows, cols);
        for &(dr, dc) in self.cells {
            let (r, c) = (cr + dr, cc + dc);
            if r >= 0 && c >= 0 {
                seed.set(r as usize, c as usize, CellState::Live);
            }
        }
        seed
    }
}

/// Case-insensitive lookup by name.
pub fn find(name: &str) -> Result<&'static Pattern, SeedError> {
    PATTERNS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| SeedError::UnknownPattern(name.to_string()))
}

pub fn names() -> impl Iterator<Item = &'static str> {
    PATTERNS.iter().map(|p| p.name)
}

/// Random block seed; each cell is live with probability `density`.
/// The same `seed` always yields the same pattern.
pub fn random_seed(rows: usize, cols: usize, seed: u64, density: f64) -> SeedPattern {
    let mut rng = StdRng::seed_from_u64(seed);
    let density = if density.is_nan() { 0.0 } else { density.clamp(0.0, 1.0) };
    let mut pattern = SeedPattern::empty(rows, cols);
    for r in 0..rows {
        for c in 0..cols {
            if rng.gen_bool(density) {
                pattern.set(r, c, CellState::Live);
            }
        }
    }
    pattern
}
