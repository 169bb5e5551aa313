// partition.rs - Splits the grid into a K x L layout of disjoint blocks

use crate::error::{Axis, ConfigError};

/// One rectangular block of the grid.
///
/// `(row, col)` are block coordinates in `[0, K) x [0, L)`; the block owns
/// grid cells `[row_offset, row_offset + rows) x [col_offset, col_offset + cols)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    pub row: usize,
    pub col: usize,
    pub index: usize,       // row-major position within the layout
    pub row_offset: usize,
    pub col_offset: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Block {
    /// Number of cells in the block.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether grid cell `(r, c)` belongs to this block.
    pub fn contains(&self, r: usize, c: usize) -> bool {
        (self.row_offset..self.row_offset + self.rows).contains(&r)
            && (self.col_offset..self.col_offset + self.cols).contains(&c)
    }

    /// Converts grid coordinates to block-local ones.
    pub fn local(&self, r: usize, c: usize) -> Option<(usize, usize)> {
        self.contains(r, c).then(|| (r - self.row_offset, c - self.col_offset))
    }
}

/// Grid extents `NE x ME` split into blocks of `NC x MC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    grid_rows: usize,
    grid_cols: usize,
    block_rows: usize,
    block_cols: usize,
}

impl BlockLayout {
    /// Validates the dimensions. Extents must be non-zero and each grid
    /// extent must be an exact multiple of the matching block extent.
    pub fn new(
        grid_rows: usize,
        grid_cols: usize,
        block_rows: usize,
        block_cols: usize,
    ) -> Result<Self, ConfigError> {
        for (value, what) in [
            (grid_rows, "grid rows"),
            (grid_cols, "grid cols"),
            (block_rows, "block rows"),
            (block_cols, "block cols"),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroExtent { what });
            }
        }
        if grid_rows % block_rows != 0 {
            return Err(ConfigError::Indivisible {
                axis: Axis::Rows,
                extent: grid_rows,
                block: block_rows,
            });
        }
        if grid_cols % block_cols != 0 {
            return Err(ConfigError::Indivisible {
                axis: Axis::Cols,
                extent: grid_cols,
                block: block_cols,
            });
        }

        Ok(Self { grid_rows, grid_cols, block_rows, block_cols })
    }

    pub fn grid_rows(&self) -> usize { self.grid_rows }
    pub fn grid_cols(&self) -> usize { self.grid_cols }
    pub fn block_rows(&self) -> usize { self.block_rows }
    pub fn block_cols(&self) -> usize { self.block_cols }

    /// K: blocks per grid column.
    pub fn blocks_down(&self) -> usize {
        self.grid_rows / self.block_rows
    }

    /// L: blocks per grid row.
    pub fn blocks_across(&self) -> usize {
        self.grid_cols / self.block_cols
    }

    /// K * L, also the number of worker threads.
    pub fn block_count(&self) -> usize {
        self.blocks_down() * self.blocks_across()
    }

    pub fn cell_count(&self) -> usize {
        self.grid_rows * self.grid_cols
    }

    /// Descriptor for block `(row, col)`.
    pub fn block(&self, row: usize, col: usize) -> Option<Block> {
        if row >= self.blocks_down() || col >= self.blocks_across() {
            return None;
        }
        Some(Block {
            row,
            col,
            index: row * self.blocks_across() + col,
            row_offset: row * self.block_rows,
            col_offset: col * self.block_cols,
            rows: self.block_rows,
            cols: self.block_cols,
        })
    }

    /// All blocks in row-major order; `blocks().nth(i).index == i`.
    pub fn blocks(&self) -> impl Iterator<Item = Block> + '_ {
        (0..self.blocks_down())
            .flat_map(move |r| (0..self.blocks_across()).map(move |c| (r, c)))
            .filter_map(move |(r, c)| self.block(r, c))
    }

    /// Block owning grid cell `(r, c)`.
    pub fn block_of(&self, r: usize, c: usize) -> Option<Block> {
        if r >= self.grid_rows || c >= self.grid_cols {
            return None;
        }
        self.block(r / self.block_rows, c / self.block_cols)
    }
}
