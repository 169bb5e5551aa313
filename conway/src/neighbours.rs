// neighbours.rs - Live-neighbour counting with block-local toroidal wrap

use crate::cell::CellState;

/// Counts the live cells among the eight neighbours of `(row, col)`.
///
/// `cells` is one block in row-major order, `rows × cols` long. Offsets wrap
/// modulo the block's own extents, so a block is a closed torus and never
/// looks at another block's cells.
///
/// Neighbour layout:
///
/// ```text
///   a b c
///   d X e
///   f g h
/// ```
pub fn count_live_neighbours(
    cells: &[CellState],
    rows: usize,
    cols: usize,
    row: usize,
    col: usize,
) -> u8 {
    debug_assert_eq!(cells.len(), rows * cols);
    debug_assert!(row < rows && col < cols);

    let up    = (row + rows - 1) % rows;
    let down  = (row + 1) % rows;
    let left  = (col + cols - 1) % cols;
    let right = (col + 1) % cols;

    let neighbours = [
        (up, left),   (up, col),   (up, right),
        (row, left),               (row, right),
        (down, left), (down, col), (down, right),
    ];

    let mut count = 0;
    for &(nr, nc) in &neighbours {
        if cells[nr * cols + nc].is_live() { count += 1; }
    }
    count
}
