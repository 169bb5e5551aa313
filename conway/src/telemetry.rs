//! Tracing subscriber setup shared by the console and GUI binaries.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter};

/// How the subscriber should format events.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    /// Directives such as `conway_blocks=debug`. When absent, `RUST_LOG`
    /// is used, then [`TracingConfig::default_directive`].
    pub directives: Option<String>,
    pub default_directive: String,
    /// Show module paths.
    pub include_targets: bool,
    pub ansi: bool,
    /// Show the emitting thread's name (`block-R-C` for workers).
    pub thread_names: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            directives: None,
            default_directive: "info".to_string(),
            include_targets: false,
            ansi: true,
            thread_names: true,
        }
    }
}

impl TracingConfig {
    fn filter(&self) -> EnvFilter {
        if let Some(directives) = &self.directives {
            if let Ok(filter) = EnvFilter::try_new(directives) {
                return filter;
            }
        }
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.default_directive))
    }
}

/// Installs the process-wide subscriber. Later calls are ignored, so tests
/// and binaries can call this freely. Returns whether this call installed it.
pub fn init_tracing(config: &TracingConfig) -> bool {
    tracing_fmt()
        .with_env_filter(config.filter())
        .with_target(config.include_targets)
        .with_ansi(config.ansi)
        .with_thread_names(config.thread_names)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .finish()
        .try_init()
        .is_ok()
}
