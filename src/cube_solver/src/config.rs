use crate::pruning::CORNER_GODS_NUMBER;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The default hard ceiling on the IDA* bound.
pub const DEFAULT_MAX_DEPTH: u8 = 20;

/// Knobs for building the corner pruning table and running the solver. Every
/// field is optional when deserializing; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Where the corner pruning table is loaded from and saved to.
    pub database_path: PathBuf,
    /// The solver gives up once the IDA* bound would exceed this.
    pub max_depth: u8,
    /// Breadth-first generation stops expanding states at this depth.
    /// Anything lower than [`CORNER_GODS_NUMBER`] leaves entries unvisited,
    /// which read as zero and weaken pruning.
    pub generation_depth_limit: u8,
    /// Whether a freshly generated table is written to `database_path`.
    pub save_generated: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("corner.db"),
            max_depth: DEFAULT_MAX_DEPTH,
            generation_depth_limit: CORNER_GODS_NUMBER,
            save_generated: true,
        }
    }
}
