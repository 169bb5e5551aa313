//! End-to-end behaviour of the block-parallel engine.

use std::sync::Arc;

use conway_blocks::neighbours::count_live_neighbours;
use conway_blocks::rules::next_state;
use conway_blocks::{
    patterns, Block, BlockKernel, BlockLayout, CellState, ConfigError, EngineConfig, Engine, Error,
    HaltReason, KernelFault, LifeKernel, RunOptions, SeedPattern, Snapshot, StepError, StopHandle,
};

/// Runs `generations` steps and collects every snapshot, seed included.
fn history(layout: BlockLayout, seed: &SeedPattern, generations: u64) -> Vec<Snapshot> {
    let mut engine = Engine::start(layout, seed).unwrap();
    let mut snapshots = vec![engine.snapshot()];
    for _ in 0..generations {
        engine.step().unwrap();
        snapshots.push(engine.snapshot());
    }
    snapshots
}

/// Single-threaded reference: one generation of one block.
fn reference_step(rows: usize, cols: usize, cells: &[CellState]) -> Vec<CellState> {
    (0..rows * cols)
        .map(|i| {
            let (r, c) = (i / cols, i % cols);
            next_state(cells[i], count_live_neighbours(cells, rows, cols, r, c))
        })
        .collect()
}

struct FailingKernel {
    block: (usize, usize),
    generation: u64,
    panic: bool,
}

impl BlockKernel for FailingKernel {
    fn advance(
        &self,
        block: &Block,
        generation: u64,
        current: &[CellState],
        next: &mut [CellState],
    ) -> Result<(), KernelFault> {
        if (block.row, block.col) == self.block && generation == self.generation {
            if self.panic {
                panic!("injected panic");
            }
            return Err(KernelFault("injected fault".into()));
        }
        LifeKernel.advance(block, generation, current, next)
    }
}

#[test]
fn runs_are_deterministic() {
    let layout = BlockLayout::new(24, 32, 8, 8).unwrap();
    let seed = patterns::random_seed(8, 8, 7, 0.4);

    let first = history(layout, &seed, 20);
    let second = history(layout, &seed, 20);
    assert_eq!(first, second);
}

#[test]
fn matches_a_single_threaded_reference() {
    let layout = BlockLayout::new(12, 18, 6, 6).unwrap();
    let seed = patterns::random_seed(6, 6, 99, 0.35);
    let snapshots = history(layout, &seed, 8);

    let mut expected = seed.cells().to_vec();
    for snapshot in &snapshots[1..] {
        expected = reference_step(6, 6, &expected);
        for block in layout.blocks() {
            assert_eq!(snapshot.block_cells(&block), expected, "generation {}", snapshot.generation());
        }
    }
}

#[test]
fn still_life_is_unchanged() {
    let layout = BlockLayout::new(12, 12, 6, 6).unwrap();
    let seed = SeedPattern::with_live(6, 6, &[(2, 2), (2, 3), (3, 2), (3, 3)]);
    let snapshots = history(layout, &seed, 6);

    let after_one = snapshots[1].cells();
    for snapshot in &snapshots[1..] {
        assert_eq!(snapshot.cells(), after_one);
    }
    assert_eq!(snapshots[0].cells(), after_one);
}

#[test]
fn blinker_oscillates_with_period_two() {
    let layout = BlockLayout::new(10, 15, 5, 5).unwrap();
    let horizontal = SeedPattern::with_live(5, 5, &[(2, 1), (2, 2), (2, 3)]);
    let vertical = SeedPattern::with_live(5, 5, &[(1, 2), (2, 2), (3, 2)]);
    let snapshots = history(layout, &horizontal, 4);

    for (generation, snapshot) in snapshots.iter().enumerate() {
        let expected = if generation % 2 == 0 { &horizontal } else { &vertical };
        for block in layout.blocks() {
            assert_eq!(
                snapshot.block_cells(&block),
                expected.cells(),
                "generation {generation}, block ({}, {})",
                block.row,
                block.col
            );
        }
    }
}

#[test]
fn wrap_stays_inside_the_block() {
    // a vertical blinker straddling the top/bottom edge of each block
    let layout = BlockLayout::new(8, 8, 4, 4).unwrap();
    let seed = SeedPattern::with_live(4, 4, &[(3, 1), (0, 1), (1, 1)]);
    let snapshots = history(layout, &seed, 1);

    let expected = SeedPattern::with_live(4, 4, &[(0, 0), (0, 1), (0, 2)]);
    for block in layout.blocks() {
        assert_eq!(snapshots[1].block_cells(&block), expected.cells());
    }
}

#[test]
fn blocks_do_not_influence_each_other() {
    let layout = BlockLayout::new(16, 16, 8, 8).unwrap();
    let glider = patterns::find("Glider").unwrap().to_seed(8, 8);
    let pentomino = patterns::find("R-pentomino").unwrap().to_seed(8, 8);

    let uniform = vec![glider.clone(); layout.block_count()];
    let mut mutated = uniform.clone();
    let changed = layout.block(1, 0).unwrap();
    mutated[changed.index] = pentomino;

    let mut a = Engine::start_with_seeds(layout, &uniform, Arc::new(LifeKernel)).unwrap();
    let mut b = Engine::start_with_seeds(layout, &mutated, Arc::new(LifeKernel)).unwrap();

    for _ in 0..30 {
        a.step().unwrap();
        b.step().unwrap();
        let (sa, sb) = (a.snapshot(), b.snapshot());
        for block in layout.blocks().filter(|blk| blk.index != changed.index) {
            assert_eq!(sa.block_cells(&block), sb.block_cells(&block));
        }
    }
    assert_ne!(a.snapshot().block_cells(&changed), b.snapshot().block_cells(&changed));
}

#[test]
fn config_validation_happens_before_start() {
    let mut config = EngineConfig::default();
    config.grid.rows = 10;
    config.grid.cols = 10;
    config.block.rows = 3;
    config.block.cols = 5;
    assert!(matches!(config.validate(), Err(ConfigError::Indivisible { .. })));

    config.block.rows = 5;
    let layout = config.validate().unwrap();
    assert_eq!(layout.block_count(), 4);
}

#[test]
fn mismatched_seed_is_rejected() {
    let layout = BlockLayout::new(10, 10, 5, 5).unwrap();
    let err = Engine::start(layout, &SeedPattern::empty(4, 5)).unwrap_err();
    assert!(matches!(err, Error::Seed(_)));
}

#[test]
fn worker_fault_aborts_the_run() {
    let layout = BlockLayout::new(10, 10, 5, 5).unwrap();
    let seed = patterns::find("Blinker").unwrap().to_seed(5, 5);
    let kernel = FailingKernel { block: (1, 0), generation: 3, panic: false };
    let mut engine = Engine::start_with_kernel(layout, &seed, Arc::new(kernel)).unwrap();

    assert_eq!(engine.step(), Ok(1));
    assert_eq!(engine.step(), Ok(2));
    let err = engine.step().unwrap_err();
    assert_eq!(
        err,
        StepError::WorkerFailure {
            block_row: 1,
            block_col: 0,
            generation: 3,
            reason: "injected fault".into(),
        }
    );
    assert!(engine.is_halted());
    assert_eq!(engine.generation(), 2);
    assert_eq!(engine.step(), Err(StepError::Halted { generation: 2 }));
}

#[test]
fn panicking_worker_is_reported_and_nobody_deadlocks() {
    let layout = BlockLayout::new(12, 12, 4, 4).unwrap();
    let seed = SeedPattern::empty(4, 4);
    let kernel = FailingKernel { block: (2, 2), generation: 1, panic: true };
    let mut engine = Engine::start_with_kernel(layout, &seed, Arc::new(kernel)).unwrap();

    let err = engine.run(RunOptions::generations(5), &StopHandle::new()).unwrap_err();
    match err {
        Error::Step(StepError::WorkerFailure { block_row, block_col, generation, reason }) => {
            assert_eq!((block_row, block_col, generation), (2, 2, 1));
            assert!(reason.contains("injected panic"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(engine.is_halted());
}

#[test]
fn stop_is_honoured_at_a_generation_boundary() {
    let layout = BlockLayout::new(8, 8, 4, 4).unwrap();
    let seed = patterns::find("Glider").unwrap().to_seed(4, 4);
    let mut engine = Engine::start(layout, &seed).unwrap();

    let stop = StopHandle::new();
    let trigger = stop.clone();
    let options = RunOptions { observe_every: Some(1), ..RunOptions::until_stopped() };
    let report = engine
        .run_with(options, &stop, |snapshot| {
            if snapshot.generation() == 5 {
                trigger.request_stop();
            }
        })
        .unwrap();

    assert_eq!(report.halt_reason, HaltReason::StopRequested);
    assert_eq!(report.generations, 5);
    assert_eq!(engine.snapshot().generation(), 5);
}

#[test]
fn stop_from_another_thread() {
    let layout = BlockLayout::new(20, 20, 10, 10).unwrap();
    let seed = patterns::random_seed(10, 10, 3, 0.5);
    let mut engine = Engine::start(layout, &seed).unwrap();

    let stop = StopHandle::new();
    let remote = stop.clone();
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(20));
        remote.request_stop();
    });

    let report = engine.run(RunOptions::until_stopped(), &stop).unwrap();
    stopper.join().unwrap();
    assert_eq!(report.halt_reason, HaltReason::StopRequested);
    assert!(engine.is_halted());
}

#[test]
fn many_small_blocks() {
    // 64 workers
    let layout = BlockLayout::new(32, 32, 4, 4).unwrap();
    let seed = patterns::find("Block").unwrap().to_seed(4, 4);
    let mut engine = Engine::start(layout, &seed).unwrap();
    let report = engine.run(RunOptions::generations(10), &StopHandle::new()).unwrap();
    assert_eq!(report.final_live, 4 * layout.block_count());
}
