// seed.rs - One block's initial pattern, replicated into every block

use std::io::Read;

use crate::cell::CellState;
use crate::error::SeedError;
use crate::partition::BlockLayout;

/// Initial pattern for a single `rows x cols` block, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPattern {
    rows: usize,
    cols: usize,
    cells: Vec<CellState>,
}

impl SeedPattern {
    /// All-dead pattern.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self { rows, cols, cells: vec![CellState::Dead; rows * cols] }
    }

    /// Pattern with the given block-local cells alive. Cells outside the
    /// block are ignored.
    pub fn with_live(rows: usize, cols: usize, live: &[(usize, usize)]) -> Self {
        let mut seed = Self::empty(rows, cols);
        for &(r, c) in live {
            if r < rows && c < cols {
                seed.cells[r * cols + c] = CellState::Live;
            }
        }
        seed
    }

    /// Wraps already-decoded cells; the length must be `rows * cols`.
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<CellState>) -> Result<Self, SeedError> {
        if cells.len() != rows * cols {
            return Err(SeedError::TokenCount { expected: rows * cols, found: cells.len() });
        }
        Ok(Self { rows, cols, cells })
    }

    /// Decodes integer tokens; each must be 0 or 1 and there must be exactly
    /// `rows * cols` of them.
    pub fn from_tokens(tokens: &[i64], rows: usize, cols: usize) -> Result<Self, SeedError> {
        let cells = tokens
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                CellState::from_token(value).ok_or(SeedError::NonBinary { index, value })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_cells(rows, cols, cells)
    }

    /// Parses whitespace-separated tokens.
    pub fn parse(text: &str, rows: usize, cols: usize) -> Result<Self, SeedError> {
        let tokens = text
            .split_whitespace()
            .enumerate()
            .map(|(index, token)| {
                token.parse::<i64>().map_err(|_| SeedError::NotInteger {
                    index,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_tokens(&tokens, rows, cols)
    }

    /// Reads the whole stream and parses it.
    pub fn read_from<R: Read>(mut reader: R, rows: usize, cols: usize) -> Result<Self, SeedError> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| SeedError::Read(e.to_string()))?;
        Self::parse(&text, rows, cols)
    }

    /// Checks that the pattern fits the layout's block shape.
    pub fn check_shape(&self, layout: &BlockLayout) -> Result<(), SeedError> {
        if self.rows != layout.block_rows() || self.cols != layout.block_cols() {
            return Err(SeedError::ShapeMismatch {
                seed_rows: self.rows,
                seed_cols: self.cols,
                block_rows: layout.block_rows(),
                block_cols: layout.block_cols(),
            });
        }
        Ok(())
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub fn get(&self, r: usize, c: usize) -> Option<CellState> {
        (r < self.rows && c < self.cols).then(|| self.cells[r * self.cols + c])
    }

    pub fn set(&mut self, r: usize, c: usize, state: CellState) {
        if r < self.rows && c < self.cols {
            self.cells[r * self.cols + c] = state;
        }
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_live()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_row_major_tokens() {
        let seed = SeedPattern::parse("0 1 0\n1 1 0\n", 2, 3).unwrap();
        assert_eq!(seed.get(0, 1), Some(CellState::Live));
        assert_eq!(seed.get(1, 0), Some(CellState::Live));
        assert_eq!(seed.get(1, 2), Some(CellState::Dead));
        assert_eq!(seed.live_count(), 3);
    }

    #[test]
    fn rejects_short_and_long_input() {
        assert_eq!(
            SeedPattern::parse("0 1 0", 2, 2),
            Err(SeedError::TokenCount { expected: 4, found: 3 })
        );
        assert_eq!(
            SeedPattern::parse("0 1 0 1 1", 2, 2),
            Err(SeedError::TokenCount { expected: 4, found: 5 })
        );
    }

    #[test]
    fn rejects_non_binary_values() {
        assert_eq!(
            SeedPattern::parse("0 1 2 0", 2, 2),
            Err(SeedError::NonBinary { index: 2, value: 2 })
        );
    }

    #[test]
    fn end_of_input_sentinel_is_not_special() {
        assert_eq!(
            SeedPattern::parse("0 1 1 0 9999", 2, 2),
            Err(SeedError::NonBinary { index: 4, value: 9999 })
        );
    }

    #[test]
    fn rejects_non_integer_tokens() {
        assert!(matches!(
            SeedPattern::parse("0 x 1 0", 2, 2),
            Err(SeedError::NotInteger { index: 1, .. })
        ));
    }

    #[test]
    fn reads_from_a_stream() {
        let seed = SeedPattern::read_from("1 0\n0 1".as_bytes(), 2, 2).unwrap();
        assert_eq!(seed.live_count(), 2);
    }

    #[test]
    fn with_live_clips_to_the_block() {
        let seed = SeedPattern::with_live(3, 3, &[(1, 1), (5, 5)]);
        assert_eq!(seed.live_count(), 1);
    }

    #[test]
    fn shape_must_match_layout() {
        let layout = BlockLayout::new(10, 10, 5, 5).unwrap();
        assert!(SeedPattern::empty(5, 5).check_shape(&layout).is_ok());
        assert!(matches!(
            SeedPattern::empty(5, 4).check_shape(&layout),
            Err(SeedError::ShapeMismatch { .. })
        ));
    }
}
