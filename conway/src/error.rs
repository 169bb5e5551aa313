//! Error types for configuration, seeding and generation stepping

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which grid axis a configuration error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Rows,
    Cols,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Rows => f.write_str("rows"),
            Axis::Cols => f.write_str("cols"),
        }
    }
}

/// Errors raised while validating grid and block dimensions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Grid extent is not a multiple of the block extent
    #[error("grid {axis} ({extent}) is not divisible by block {axis} ({block})")]
    Indivisible { axis: Axis, extent: usize, block: usize },

    /// A grid or block extent is zero
    #[error("{what} must be greater than zero")]
    ZeroExtent { what: &'static str },

    /// A bounded run was asked for zero generations
    #[error("generation count must be greater than zero")]
    NoGenerations,

    /// Configuration source could not be read or parsed
    #[error("failed to load configuration: {0}")]
    Load(String),
}

/// Errors raised while loading the seed pattern
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeedError {
    /// Wrong number of tokens for one block
    #[error("seed has {found} tokens, expected {expected}")]
    TokenCount { expected: usize, found: usize },

    /// Token could not be parsed as an integer
    #[error("seed token {index} ({token:?}) is not an integer")]
    NotInteger { index: usize, token: String },

    /// Token is an integer other than 0 or 1
    #[error("seed token {index} has value {value}, expected 0 or 1")]
    NonBinary { index: usize, value: i64 },

    /// Seed was built for a different block shape
    #[error("seed is {seed_rows}x{seed_cols}, block is {block_rows}x{block_cols}")]
    ShapeMismatch {
        seed_rows: usize,
        seed_cols: usize,
        block_rows: usize,
        block_cols: usize,
    },

    /// Per-block seeds do not match the number of blocks
    #[error("{found} block seeds given for {expected} blocks")]
    BlockCount { expected: usize, found: usize },

    /// No built-in pattern with this name
    #[error("unknown pattern: {0}")]
    UnknownPattern(String),

    /// Seed source could not be read
    #[error("failed to read seed: {0}")]
    Read(String),
}

/// Errors raised by a generation step
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    /// A worker could not finish its block; the run was aborted
    #[error("block ({block_row}, {block_col}) failed at generation {generation}: {reason}")]
    WorkerFailure {
        block_row: usize,
        block_col: usize,
        generation: u64,
        reason: String,
    },

    /// The engine has already halted and cannot advance
    #[error("engine halted at generation {generation}")]
    Halted { generation: u64 },

    /// A worker thread terminated without passing the barrier protocol
    #[error("worker thread lost at generation {generation}")]
    WorkerLost { generation: u64 },
}

/// Top-level engine error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error(transparent)]
    Step(#[from] StepError),

    /// Worker thread could not be spawned
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}
