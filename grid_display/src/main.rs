// main.rs - egui window around the block-parallel engine

mod ui;

use std::time::{Duration, Instant};

use clap::Parser;
use eframe::egui;
use egui::Color32;
use tracing::{error, info};

use conway_blocks::telemetry::{self, TracingConfig};
use conway_blocks::{patterns, BlockLayout, CellState, Engine, SeedPattern, Snapshot};

/// Interactive viewer for the block-parallel Game of Life.
#[derive(Parser, Debug)]
#[command(name = "grid_display", version)]
struct Args {
    /// Grid rows.
    #[arg(long, default_value_t = 48)]
    rows: usize,

    /// Grid columns.
    #[arg(long, default_value_t = 48)]
    cols: usize,

    /// Block rows; must divide --rows.
    #[arg(long, default_value_t = 16)]
    block_rows: usize,

    /// Block columns; must divide --cols.
    #[arg(long, default_value_t = 16)]
    block_cols: usize,

    /// Tracing directives, e.g. conway_blocks=debug.
    #[arg(long)]
    log: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    telemetry::init_tracing(&TracingConfig {
        directives: args.log.clone(),
        ..TracingConfig::default()
    });

    let layout = BlockLayout::new(args.rows, args.cols, args.block_rows, args.block_cols)?;
    let app = GridViewer::new(layout)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 960.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Block-parallel Game of Life",
        options,
        Box::new(|_cc| Box::new(app)),
    )
    .map_err(|e| anyhow::anyhow!("window closed with error: {e}"))
}

/// Viewer state. The seed is one block's pattern, edited by clicking while
/// paused; every edit restarts the engine from generation 0.
pub struct GridViewer {
    layout: BlockLayout,
    engine: Engine,
    seed: SeedPattern,
    frame: Snapshot,
    failure: Option<String>,
    is_running: bool,
    last_update: Instant,
    update_interval: Duration,
    selected_pattern: usize,
    random_seed: u64,
    live_color: Color32,
    dead_color: Color32,
    show_blocks: bool,
}

impl GridViewer {
    fn new(layout: BlockLayout) -> conway_blocks::Result<Self> {
        let seed = patterns::PATTERNS[0].to_seed(layout.block_rows(), layout.block_cols());
        let engine = Engine::start(layout, &seed)?;
        let frame = engine.snapshot();

        Ok(Self {
            layout,
            engine,
            seed,
            frame,
            failure: None,
            is_running: false,
            last_update: Instant::now(),
            update_interval: Duration::from_millis(100),
            selected_pattern: 0,
            random_seed: 1,
            live_color: Color32::from_rgb(255, 200, 0),
            dead_color: Color32::from_rgb(30, 30, 30),
            show_blocks: true,
        })
    }

    /// Restarts the engine from the current seed.
    fn reset(&mut self) {
        self.is_running = false;
        match Engine::start(self.layout, &self.seed) {
            Ok(engine) => {
                // the old engine halts and joins its workers on drop
                self.engine = engine;
                self.frame = self.engine.snapshot();
                self.failure = None;
            }
            Err(e) => {
                error!(error = %e, "failed to restart engine");
                self.failure = Some(e.to_string());
            }
        }
    }

    fn update_generation(&mut self) {
        match self.engine.step() {
            Ok(_) => self.frame = self.engine.snapshot(),
            Err(e) => {
                error!(error = %e, "generation failed");
                self.is_running = false;
                self.failure = Some(e.to_string());
            }
        }
    }

    fn apply_selected_pattern(&mut self) {
        let pattern = &patterns::PATTERNS[self.selected_pattern];
        info!(pattern = pattern.name, "applying pattern");
        self.seed = pattern.to_seed(self.layout.block_rows(), self.layout.block_cols());
        self.reset();
    }

    fn apply_random_pattern(&mut self) {
        self.seed = patterns::random_seed(self.layout.block_rows(), self.layout.block_cols(), self.random_seed, 0.33);
        self.random_seed = self.random_seed.wrapping_add(1);
        self.reset();
    }

    fn clear(&mut self) {
        self.seed = SeedPattern::empty(self.layout.block_rows(), self.layout.block_cols());
        self.reset();
    }

    /// Toggles the seed cell under grid position `(r, c)`; the change shows
    /// up in every block.
    fn toggle_cell(&mut self, r: usize, c: usize) {
        let Some((lr, lc)) = self.layout.block_of(r, c).and_then(|block| block.local(r, c)) else {
            return;
        };
        let flipped = match self.seed.get(lr, lc) {
            Some(CellState::Live) => CellState::Dead,
            _ => CellState::Live,
        };
        self.seed.set(lr, lc, flipped);
        self.reset();
    }
}
