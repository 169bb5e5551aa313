// main.rs - Console driver: loads config and seed, runs the engine, prints the grid

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use conway_blocks::config::{EngineConfig, Extent};
use conway_blocks::telemetry::{self, TracingConfig};
use conway_blocks::{patterns, BlockLayout, Engine, RunOptions, RunReport, SeedPattern, Snapshot, StopHandle};

/// Block-parallel Conway's Game of Life.
///
/// The seed is one block's pattern; it is copied into every block. Without
/// --seed, --pattern or --random the seed is read from stdin as NC*MC
/// whitespace-separated 0/1 tokens.
#[derive(Parser, Debug)]
#[command(name = "conway_blocks", version)]
struct Args {
    /// YAML configuration file; command-line options override it.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Grid extents, e.g. 40x60.
    #[arg(long, value_name = "ROWSxCOLS", value_parser = parse_extent)]
    grid: Option<Extent>,

    /// Block extents, e.g. 10x20. Must divide the grid extents.
    #[arg(long, value_name = "ROWSxCOLS", value_parser = parse_extent)]
    block: Option<Extent>,

    /// Number of generations to run.
    #[arg(short = 'n', long, conflicts_with = "until_stopped")]
    generations: Option<u64>,

    /// Run until interrupted with Ctrl-C.
    #[arg(long)]
    until_stopped: bool,

    /// Seed file with NC*MC 0/1 tokens, or - for stdin.
    #[arg(long, value_name = "FILE", group = "source")]
    seed: Option<String>,

    /// Built-in pattern placed at the centre of every block.
    #[arg(long, value_name = "NAME", group = "source")]
    pattern: Option<String>,

    /// Random seed pattern from this RNG seed.
    #[arg(long, value_name = "SEED", group = "source")]
    random: Option<u64>,

    /// Live-cell probability for --random.
    #[arg(long, default_value_t = 0.33)]
    density: f64,

    /// Print the grid every N generations (and the seeded grid).
    #[arg(long, value_name = "N")]
    render_every: Option<u64>,

    /// Print cells as 1/0 instead of #/.
    #[arg(long)]
    raw: bool,

    /// Stop when the grid repeats a recent state.
    #[arg(long)]
    halt_on_cycle: bool,

    /// Tracing directives, e.g. conway_blocks=debug.
    #[arg(long, value_name = "DIRECTIVE")]
    log: Option<String>,

    /// List built-in patterns and exit.
    #[arg(long)]
    list_patterns: bool,

    /// Print the effective configuration as YAML and exit.
    #[arg(long)]
    print_config: bool,
}

fn parse_extent(text: &str) -> Result<Extent, String> {
    let (rows, cols) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected ROWSxCOLS, got {text:?}"))?;
    let rows = rows.trim().parse().map_err(|e| format!("bad row count: {e}"))?;
    let cols = cols.trim().parse().map_err(|e| format!("bad column count: {e}"))?;
    Ok(Extent { rows, cols })
}

fn build_config(args: &Args) -> anyhow::Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_yaml_file(path)?,
        None => EngineConfig::default(),
    };

    if let Some(grid) = args.grid {
        config.grid = grid;
    }
    if let Some(block) = args.block {
        config.block = block;
    }
    if let Some(n) = args.generations {
        config.run.generations = n;
        config.run.until_stopped = false;
    }
    if args.until_stopped {
        config.run.until_stopped = true;
    }
    if args.halt_on_cycle {
        config.halt_on_cycle = true;
    }
    Ok(config)
}

fn load_seed(args: &Args, layout: &BlockLayout) -> anyhow::Result<SeedPattern> {
    let (rows, cols) = (layout.block_rows(), layout.block_cols());

    if let Some(name) = &args.pattern {
        return Ok(patterns::find(name)?.to_seed(rows, cols));
    }
    if let Some(rng_seed) = args.random {
        return Ok(patterns::random_seed(rows, cols, rng_seed, args.density));
    }

    let seed = match args.seed.as_deref() {
        Some(path) if path != "-" => {
            let file = std::fs::File::open(path).with_context(|| format!("opening seed {path}"))?;
            SeedPattern::read_from(file, rows, cols)?
        }
        _ => {
            info!(rows, cols, "loading template block from stdin");
            SeedPattern::read_from(io::stdin().lock(), rows, cols)?
        }
    };
    Ok(seed)
}

fn render(snapshot: &Snapshot, raw: bool) {
    let (live, dead) = if raw { ('1', '0') } else { ('#', '.') };
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "generation {} ({} live)", snapshot.generation(), snapshot.live_count());
    let _ = write!(out, "{}", snapshot.render(live, dead));
    let _ = writeln!(out);
}

async fn run(
    layout: BlockLayout,
    seed: SeedPattern,
    options: RunOptions,
    raw: bool,
) -> anyhow::Result<RunReport> {
    let stop = StopHandle::new();

    let ctrl_c_stop = stop.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("stop requested, finishing the current generation");
            ctrl_c_stop.request_stop();
        }
    });

    let report = tokio::task::spawn_blocking(move || -> conway_blocks::Result<RunReport> {
        let mut engine = Engine::start(layout, &seed)?;
        if options.observe_every.is_some() {
            render(&engine.snapshot(), raw);
        }
        engine.run_with(options, &stop, |snapshot| render(snapshot, raw))
    })
    .await
    .context("engine task panicked")??;

    watcher.abort();
    Ok(report)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    telemetry::init_tracing(&TracingConfig {
        directives: args.log.clone(),
        ..TracingConfig::default()
    });

    if args.list_patterns {
        for name in patterns::names() {
            println!("{name}");
        }
        return Ok(());
    }

    let config = build_config(&args)?;
    if args.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    // everything is validated before the engine spawns a single worker
    let layout = config.validate()?;
    let seed = load_seed(&args, &layout)?;
    let options = RunOptions {
        observe_every: args.render_every,
        ..config.run_options()
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(run(layout, seed, options, args.raw))?;

    println!(
        "{} generations in {:.2?} ({}), {} live cells",
        report.generations, report.elapsed, report.halt_reason, report.final_live
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_extents() {
        assert_eq!(parse_extent("10x20"), Ok(Extent { rows: 10, cols: 20 }));
        assert_eq!(parse_extent("3X4"), Ok(Extent { rows: 3, cols: 4 }));
        assert!(parse_extent("10").is_err());
        assert!(parse_extent("ax2").is_err());
    }

    #[test]
    fn command_line_overrides_defaults() {
        let args = Args::parse_from([
            "conway_blocks", "--grid", "10x10", "--block", "5x5", "-n", "7", "--halt-on-cycle",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.grid, Extent { rows: 10, cols: 10 });
        assert_eq!(config.run.generations, 7);
        assert!(config.halt_on_cycle);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn seed_sources_are_exclusive() {
        let parsed = Args::try_parse_from(["conway_blocks", "--pattern", "Glider", "--random", "3"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn pattern_seed_matches_block_shape() {
        let args = Args::parse_from(["conway_blocks", "--block", "6x6", "--grid", "12x12", "--pattern", "block"]);
        let layout = build_config(&args).unwrap().validate().unwrap();
        let seed = load_seed(&args, &layout).unwrap();
        assert_eq!((seed.rows(), seed.cols()), (6, 6));
        assert_eq!(seed.live_count(), 4);
    }

    #[test]
    fn indivisible_grid_is_rejected_before_start() {
        let args = Args::parse_from(["conway_blocks", "--grid", "10x10", "--block", "3x5"]);
        assert!(build_config(&args).unwrap().validate().is_err());
    }
}
