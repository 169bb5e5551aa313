//! Block-parallel Conway's Game of Life.
//!
//! The grid is split into `K x L` equal blocks. Each block is an independent
//! toroidal universe updated by its own long-lived worker thread; a
//! coordinator releases all workers once per generation, waits for every
//! one of them, then swaps the `current` and `next` buffers.
//!
//! ```no_run
//! use conway_blocks::{BlockLayout, Engine, RunOptions, StopHandle, patterns};
//!
//! # fn main() -> conway_blocks::Result<()> {
//! let layout = BlockLayout::new(20, 20, 10, 10)?;
//! let seed = patterns::find("Glider")?.to_seed(10, 10);
//! let mut engine = Engine::start(layout, &seed)?;
//! let report = engine.run(RunOptions::generations(50), &StopHandle::new())?;
//! println!("{} live cells after {} generations", report.final_live, report.generations);
//! # Ok(())
//! # }
//! ```

mod barrier;
pub mod cell;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod grid;
pub mod history;
pub mod neighbours;
pub mod partition;
pub mod patterns;
pub mod rules;
pub mod seed;
pub mod telemetry;
pub mod worker;

pub use cell::CellState;
pub use config::EngineConfig;
pub use coordinator::{Engine, HaltReason, Phase, RunMode, RunOptions, RunReport, StopHandle};
pub use error::{ConfigError, Error, Result, SeedError, StepError};
pub use grid::Snapshot;
pub use partition::{Block, BlockLayout};
pub use seed::SeedPattern;
pub use worker::{BlockKernel, KernelFault, LifeKernel};
