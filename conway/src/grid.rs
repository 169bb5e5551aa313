// grid.rs - Double-buffered grid state, stored block by block

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::cell::CellState;
use crate::error::SeedError;
use crate::partition::{Block, BlockLayout};
use crate::seed::SeedPattern;

/// Both buffers of one block, each `rows * cols` long in row-major order.
#[derive(Debug)]
struct BlockCells {
    buffers: [Vec<CellState>; 2],
}

/// The grid's `current` and `next` buffers.
///
/// Cells are grouped per block so a worker can borrow its own block
/// exclusively. `front` names the buffer holding `current`; flipping it is
/// the generation swap.
#[derive(Debug)]
pub struct GridState {
    layout: BlockLayout,
    blocks: Vec<Mutex<BlockCells>>,
    front: AtomicUsize,
}

impl GridState {
    /// Replicates the seed into every block, in both buffers.
    pub fn from_seed(layout: BlockLayout, seed: &SeedPattern) -> Result<Self, SeedError> {
        let seeds = vec![seed.clone(); layout.block_count()];
        Self::from_block_seeds(layout, &seeds)
    }

    /// Seeds each block from its own pattern, `seeds[block.index]`.
    pub fn from_block_seeds(layout: BlockLayout, seeds: &[SeedPattern]) -> Result<Self, SeedError> {
        if seeds.len() != layout.block_count() {
            return Err(SeedError::BlockCount { expected: layout.block_count(), found: seeds.len() });
        }
        for seed in seeds {
            seed.check_shape(&layout)?;
        }

        let blocks = layout
            .blocks()
            .map(|block| {
                debug!(block_row = block.row, block_col = block.col, "transferring block");
                let cells = seeds[block.index].cells();
                Mutex::new(BlockCells { buffers: [cells.to_vec(), cells.to_vec()] })
            })
            .collect::<Vec<_>>();

        info!(
            blocks = blocks.len(),
            live = seeds.iter().map(SeedPattern::live_count).sum::<usize>(),
            "grid seeded"
        );

        Ok(Self { layout, blocks, front: AtomicUsize::new(0) })
    }

    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    /// Exclusive handle on one block for the duration of an update.
    ///
    /// Only the worker bound to `block` calls this while a generation is
    /// advancing, so the lock is never contended.
    pub(crate) fn block_writer(&self, block: &Block) -> BlockWriter<'_> {
        BlockWriter {
            cells: self.blocks[block.index].lock(),
            front: self.front.load(Ordering::Acquire),
        }
    }

    /// Exchanges the roles of `current` and `next`.
    ///
    /// Must only run while every worker is parked at a barrier.
    pub(crate) fn swap(&self) {
        self.front.fetch_xor(1, Ordering::AcqRel);
    }

    /// Full `current` buffer in grid-wide row-major order.
    pub(crate) fn snapshot(&self, generation: u64) -> Snapshot {
        let front = self.front.load(Ordering::Acquire);
        let cols = self.layout.grid_cols();
        let mut cells = vec![CellState::Dead; self.layout.cell_count()];

        for block in self.layout.blocks() {
            let guard = self.blocks[block.index].lock();
            let current = &guard.buffers[front];
            for r in 0..block.rows {
                let src = &current[r * block.cols..(r + 1) * block.cols];
                let start = (block.row_offset + r) * cols + block.col_offset;
                cells[start..start + block.cols].copy_from_slice(src);
            }
        }

        Snapshot {
            rows: self.layout.grid_rows(),
            cols,
            generation,
            cells,
        }
    }
}

/// Write handle scoped to a single block: read access to its `current`
/// cells, write access to its `next` cells, nothing else.
pub struct BlockWriter<'a> {
    cells: MutexGuard<'a, BlockCells>,
    front: usize,
}

impl BlockWriter<'_> {
    /// `(current, next)` for this block.
    pub fn split(&mut self) -> (&[CellState], &mut [CellState]) {
        let [a, b] = &mut self.cells.buffers;
        if self.front == 0 {
            (a.as_slice(), b.as_mut_slice())
        } else {
            (b.as_slice(), a.as_mut_slice())
        }
    }
}

/// Read-only copy of `current`, taken between generations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Snapshot {
    rows: usize,
    cols: usize,
    generation: u64,
    cells: Vec<CellState>,
}

impl Snapshot {
    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }

    /// Generation this snapshot shows; 0 is the seeded grid.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub fn get(&self, r: usize, c: usize) -> Option<CellState> {
        (r < self.rows && c < self.cols).then(|| self.cells[r * self.cols + c])
    }

    pub fn row(&self, r: usize) -> &[CellState] {
        &self.cells[r * self.cols..(r + 1) * self.cols]
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_live()).count()
    }

    /// Fraction of live cells, in `[0, 1]`.
    pub fn population_ratio(&self) -> f32 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.live_count() as f32 / self.cells.len() as f32
    }

    /// Cells of one block, block-local row-major.
    pub fn block_cells(&self, block: &Block) -> Vec<CellState> {
        let mut out = Vec::with_capacity(block.len());
        for r in block.row_offset..block.row_offset + block.rows {
            let start = r * self.cols + block.col_offset;
            out.extend_from_slice(&self.cells[start..start + block.cols]);
        }
        out
    }

    /// Live cells per block, in layout order.
    pub fn block_live_counts(&self, layout: &BlockLayout) -> Vec<usize> {
        layout
            .blocks()
            .map(|block| self.block_cells(&block).iter().filter(|c| c.is_live()).count())
            .collect()
    }

    /// Text rendering, one line per row.
    pub fn render(&self, live: char, dead: char) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols + 1));
        for r in 0..self.rows {
            for cell in self.row(r) {
                out.push(if cell.is_live() { live } else { dead });
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render('#', '.'))
    }
}
