// coordinator.rs - Drives the generation loop over the block workers

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::barrier::GenerationBarrier;
use crate::error::{Result, StepError};
use crate::grid::{GridState, Snapshot};
use crate::history::CycleDetector;
use crate::partition::BlockLayout;
use crate::seed::SeedPattern;
use crate::worker::{run_worker, BlockKernel, LifeKernel, WorkerBinding};

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Workers parked, `current` readable.
    Idle,
    /// Workers updating their blocks.
    Advancing,
    /// All workers done, buffers being exchanged.
    Swapping,
    /// Workers released and joined; no further generations.
    Halted,
}

/// How long a run lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Generations(u64),
    UntilStopped,
}

/// Options for [`Engine::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub mode: RunMode,
    /// Stop at the first generation that repeats a recent one.
    pub halt_on_cycle: bool,
    /// Hand a snapshot to the observer every N generations.
    pub observe_every: Option<u64>,
}

impl RunOptions {
    pub fn generations(n: u64) -> Self {
        Self { mode: RunMode::Generations(n), halt_on_cycle: false, observe_every: None }
    }

    pub fn until_stopped() -> Self {
        Self { mode: RunMode::UntilStopped, halt_on_cycle: false, observe_every: None }
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    Completed,
    StopRequested,
    Cycle { period: u64 },
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::Completed => f.write_str("completed"),
            HaltReason::StopRequested => f.write_str("stop requested"),
            HaltReason::Cycle { period } => write!(f, "cycle of period {period}"),
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Generations advanced by this run.
    pub generations: u64,
    /// Generation shown by the grid when the run ended.
    pub final_generation: u64,
    pub halt_reason: HaltReason,
    pub elapsed: Duration,
    pub final_live: usize,
}

/// Cloneable stop request, honoured only between generations.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// The generation coordinator and the worker pool it owns.
///
/// One worker thread per block is spawned by [`Engine::start`] and lives
/// until the engine halts. `step` and `snapshot` borrow the engine, so a
/// snapshot can never be taken while a generation is in flight.
pub struct Engine {
    layout: BlockLayout,
    grid: Arc<GridState>,
    barrier: Arc<GenerationBarrier>,
    workers: Vec<JoinHandle<()>>,
    phase: Phase,
    generation: u64,
}

impl Engine {
    /// Seeds the grid and spawns one Life worker per block.
    pub fn start(layout: BlockLayout, seed: &SeedPattern) -> Result<Self> {
        Self::start_with_kernel(layout, seed, Arc::new(LifeKernel))
    }

    /// Like [`Engine::start`] with a custom block kernel.
    pub fn start_with_kernel(
        layout: BlockLayout,
        seed: &SeedPattern,
        kernel: Arc<dyn BlockKernel>,
    ) -> Result<Self> {
        let grid = GridState::from_seed(layout, seed)?;
        Self::spawn(grid, kernel)
    }

    /// Starts with one seed per block (`seeds[block.index]`) instead of a
    /// single replicated pattern.
    pub fn start_with_seeds(
        layout: BlockLayout,
        seeds: &[SeedPattern],
        kernel: Arc<dyn BlockKernel>,
    ) -> Result<Self> {
        let grid = GridState::from_block_seeds(layout, seeds)?;
        Self::spawn(grid, kernel)
    }

    // The grid is fully validated and seeded before the first thread exists.
    fn spawn(grid: GridState, kernel: Arc<dyn BlockKernel>) -> Result<Self> {
        let layout = *grid.layout();
        let grid = Arc::new(grid);
        let barrier = Arc::new(GenerationBarrier::new(layout.block_count()));

        let mut engine = Self {
            layout,
            grid,
            barrier,
            workers: Vec::with_capacity(layout.block_count()),
            phase: Phase::Idle,
            generation: 0,
        };

        for block in layout.blocks() {
            let binding = WorkerBinding { block, kernel: Arc::clone(&kernel) };
            let grid = Arc::clone(&engine.grid);
            let barrier = Arc::clone(&engine.barrier);

            let spawned = thread::Builder::new()
                .name(format!("block-{}-{}", block.row, block.col))
                .spawn(move || run_worker(binding, grid, barrier));

            match spawned {
                Ok(handle) => engine.workers.push(handle),
                Err(e) => {
                    error!(block_row = block.row, block_col = block.col, error = %e, "failed to spawn worker");
                    // dropping the engine releases and joins what was spawned
                    return Err(e.into());
                }
            }
        }

        info!(
            grid_rows = layout.grid_rows(),
            grid_cols = layout.grid_cols(),
            block_rows = layout.block_rows(),
            block_cols = layout.block_cols(),
            workers = engine.workers.len(),
            "engine started"
        );
        Ok(engine)
    }

    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Generation currently held in `current`; 0 is the seed.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_halted(&self) -> bool {
        self.phase == Phase::Halted
    }

    /// Copy of the `current` buffer.
    pub fn snapshot(&self) -> Snapshot {
        self.grid.snapshot(self.generation)
    }

    /// Advances every block by one generation and swaps the buffers.
    ///
    /// On a worker fault the engine halts, all workers are released and
    /// joined, and the fault is returned with its block and generation.
    pub fn step(&mut self) -> std::result::Result<u64, StepError> {
        if self.phase == Phase::Halted {
            return Err(StepError::Halted { generation: self.generation });
        }

        let generation = self.generation + 1;
        self.phase = Phase::Advancing;
        let faults = self.barrier.advance(generation);

        if let Some(fault) = faults.into_iter().min_by_key(|f| f.block.index) {
            error!(
                block_row = fault.block.row,
                block_col = fault.block.col,
                generation,
                reason = %fault.reason,
                "generation aborted"
            );
            // the failed step is not retried; workers still get released
            let _ = self.halt();
            return Err(StepError::WorkerFailure {
                block_row: fault.block.row,
                block_col: fault.block.col,
                generation: fault.generation,
                reason: fault.reason,
            });
        }

        self.phase = Phase::Swapping;
        self.grid.swap();
        self.generation = generation;
        self.phase = Phase::Idle;

        debug!(generation, "generation complete");
        Ok(generation)
    }

    /// Steps until the run mode is satisfied, a stop is requested, or
    /// (optionally) a cycle is found. The engine is halted afterwards.
    pub fn run(&mut self, options: RunOptions, stop: &StopHandle) -> Result<RunReport> {
        self.run_with(options, stop, |_| {})
    }

    /// [`Engine::run`], handing snapshots to `observe` every
    /// `options.observe_every` generations.
    pub fn run_with<F>(&mut self, options: RunOptions, stop: &StopHandle, mut observe: F) -> Result<RunReport>
    where
        F: FnMut(&Snapshot),
    {
        if self.phase == Phase::Halted {
            return Err(StepError::Halted { generation: self.generation }.into());
        }

        let started = Instant::now();
        let first = self.generation;
        let mut cycles = options.halt_on_cycle.then(CycleDetector::new);
        if let Some(detector) = cycles.as_mut() {
            detector.observe(&self.snapshot());
        }

        info!(mode = ?options.mode, halt_on_cycle = options.halt_on_cycle, "run started");

        let halt_reason = loop {
            if stop.is_stop_requested() {
                break HaltReason::StopRequested;
            }
            if let RunMode::Generations(n) = options.mode {
                if self.generation - first >= n {
                    break HaltReason::Completed;
                }
            }

            let generation = self.step()?;

            let observe_now = options
                .observe_every
                .is_some_and(|every| every > 0 && generation % every == 0);
            if !observe_now && cycles.is_none() {
                continue;
            }

            let snapshot = self.snapshot();
            if observe_now {
                observe(&snapshot);
            }
            if let Some(period) = cycles.as_mut().and_then(|d| d.observe(&snapshot)) {
                break HaltReason::Cycle { period };
            }
        };

        let report = RunReport {
            generations: self.generation - first,
            final_generation: self.generation,
            halt_reason,
            elapsed: started.elapsed(),
            final_live: self.snapshot().live_count(),
        };
        self.halt()?;

        info!(
            generations = report.generations,
            reason = %report.halt_reason,
            elapsed_ms = report.elapsed.as_millis() as u64,
            live = report.final_live,
            "run finished"
        );
        Ok(report)
    }

    /// Releases every parked worker and joins it. Idempotent.
    pub fn halt(&mut self) -> std::result::Result<(), StepError> {
        if self.phase == Phase::Halted && self.workers.is_empty() {
            return Ok(());
        }
        self.phase = Phase::Halted;
        self.barrier.halt();

        let mut lost = false;
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                lost = true;
            }
        }

        if lost {
            warn!(generation = self.generation, "worker thread terminated abnormally");
            return Err(StepError::WorkerLost { generation: self.generation });
        }
        debug!(generation = self.generation, "workers joined");
        Ok(())
    }

    /// Halts and returns the final snapshot.
    pub fn shutdown(mut self) -> std::result::Result<Snapshot, StepError> {
        self.halt()?;
        Ok(self.snapshot())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        let _ = self.halt();
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("layout", &self.layout)
            .field("phase", &self.phase)
            .field("generation", &self.generation)
            .field("workers", &self.workers.len())
            .finish()
    }
}
