// cell.rs - Cell state for the block automaton

/// Binary state of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    #[default]
    Dead,
    Live,
}

impl CellState {
    /// Maps a seed token (`0` or `1`) to a state. Anything else is `None`.
    pub fn from_token(token: i64) -> Option<Self> {
        match token {
            0 => Some(CellState::Dead),
            1 => Some(CellState::Live),
            _ => None,
        }
    }

    pub fn as_token(self) -> u8 {
        match self {
            CellState::Dead => 0,
            CellState::Live => 1,
        }
    }

    #[inline]
    pub fn is_live(self) -> bool {
        self == CellState::Live
    }
}

impl From<bool> for CellState {
    fn from(alive: bool) -> Self {
        if alive { CellState::Live } else { CellState::Dead }
    }
}
