// worker.rs - Per-block worker threads and the block update kernel

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::barrier::{Fault, GenerationBarrier, Signal};
use crate::cell::CellState;
use crate::grid::GridState;
use crate::neighbours::count_live_neighbours;
use crate::partition::Block;
use crate::rules::next_state;

/// Reason a kernel could not update its block.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct KernelFault(pub String);

/// Computes one block's next generation from its current one.
///
/// `current` and `next` are the block's own cells, row-major,
/// `block.rows * block.cols` long. Every cell of `next` must be written.
pub trait BlockKernel: Send + Sync {
    fn advance(
        &self,
        block: &Block,
        generation: u64,
        current: &[CellState],
        next: &mut [CellState],
    ) -> Result<(), KernelFault>;
}

/// Conway's Game of Life on a block-local torus.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifeKernel;

impl BlockKernel for LifeKernel {
    fn advance(
        &self,
        block: &Block,
        _generation: u64,
        current: &[CellState],
        next: &mut [CellState],
    ) -> Result<(), KernelFault> {
        let (rows, cols) = (block.rows, block.cols);
        for i in 0..rows {
            for j in 0..cols {
                let live = count_live_neighbours(current, rows, cols, i, j);
                next[i * cols + j] = next_state(current[i * cols + j], live);
            }
        }
        Ok(())
    }
}

/// Everything a worker is bound to for its whole lifetime.
#[derive(Clone)]
pub(crate) struct WorkerBinding {
    pub block: Block,
    pub kernel: Arc<dyn BlockKernel>,
}

/// Worker thread body: park, update the bound block, report, repeat.
pub(crate) fn run_worker(
    binding: WorkerBinding,
    grid: Arc<GridState>,
    barrier: Arc<GenerationBarrier>,
) {
    let WorkerBinding { block, kernel } = binding;
    let mut seen = 0;
    debug!(block_row = block.row, block_col = block.col, "worker parked");

    while let Signal::Advance { generation } = barrier.wait_for_signal(&mut seen) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut writer = grid.block_writer(&block);
            let (current, next) = writer.split();
            kernel.advance(&block, generation, current, next)
        }));

        let fault = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(fault)) => Some(fault.0),
            Err(payload) => Some(panic_message(&*payload)),
        };

        match fault {
            Some(reason) => {
                warn!(block_row = block.row, block_col = block.col, generation, %reason, "block update failed");
                barrier.report(Some(Fault { block, generation, reason }));
            }
            None => {
                trace!(block_row = block.row, block_col = block.col, generation, "block updated");
                barrier.report(None);
            }
        }
    }

    debug!(block_row = block.row, block_col = block.col, "worker exiting");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("worker panicked: {s}")
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::BlockLayout;
    use CellState::{Dead, Live};

    fn run_kernel(rows: usize, cols: usize, current: &[CellState]) -> Vec<CellState> {
        let layout = BlockLayout::new(rows, cols, rows, cols).unwrap();
        let block = layout.block(0, 0).unwrap();
        let mut next = vec![Dead; rows * cols];
        LifeKernel.advance(&block, 1, current, &mut next).unwrap();
        next
    }

    #[test]
    fn blinker_turns_vertical() {
        let mut current = vec![Dead; 25];
        for c in 1..4 {
            current[2 * 5 + c] = Live;
        }
        let next = run_kernel(5, 5, &current);

        let live: Vec<usize> = (0..25).filter(|&i| next[i].is_live()).collect();
        assert_eq!(live, vec![7, 12, 17]); // column 2, rows 1..=3
    }

    #[test]
    fn kernel_writes_every_cell_of_next() {
        let current = vec![Dead; 12];
        let layout = BlockLayout::new(3, 4, 3, 4).unwrap();
        let block = layout.block(0, 0).unwrap();
        let mut next = vec![Live; 12];
        LifeKernel.advance(&block, 1, &current, &mut next).unwrap();
        assert!(next.iter().all(|c| !c.is_live()));
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload: Box<dyn Any + Send> = Box::new("oops");
        assert_eq!(panic_message(&*payload), "worker panicked: oops");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bad block"));
        assert_eq!(panic_message(&*payload), "worker panicked: bad block");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(&*payload), "worker panicked");
    }
}
