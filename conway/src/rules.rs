// rules.rs - Conway's rules as a pure transition function

use crate::cell::CellState;

/// Next state of a cell given its current state and live-neighbour count.
///
/// Live cells with fewer than two or more than three live neighbours die,
/// dead cells with exactly three are born, every other cell keeps its state.
#[inline]
pub fn next_state(state: CellState, live_neighbours: u8) -> CellState {
    use CellState::{Dead, Live};

    match (state, live_neighbours) {
        (Live, 0..=1) => Dead,   // Underpopulation
        (Live, 4..)   => Dead,   // Overpopulation
        (Dead, 3)     => Live,   // Birth
        (unchanged, _) => unchanged,
    }
}
