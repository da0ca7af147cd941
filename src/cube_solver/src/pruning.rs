//! Admissible heuristics for the solver. The main one is the corner pruning
//! table: the exact distance to solved of every corner configuration, indexed
//! by [`CubeState::corner_index`].
//!
//! The table is persisted as a flat file of exactly [`CORNER_STATES`] bytes,
//! byte `i` being the entry for corner index `i`. There is no header; a file
//! is accepted on its length, plus the entry of the solved state being zero.

use crate::{
    config::SolverConfig,
    puzzle::{CubeState, Move, corners::CORNER_STATES},
    start, success, working,
};
use log::{Level, debug, info, log, warn};
use std::{
    collections::VecDeque,
    fs, io,
    path::Path,
    sync::Arc,
    time::Instant,
};
use thiserror::Error;

/// The diameter of the corner group under the 18 face turns: no corner
/// configuration is more than 11 moves from solved. Generating with this
/// ceiling visits every entry. A lower ceiling leaves entries at
/// [`UNVISITED`], which read as zero and only weaken pruning.
pub const CORNER_GODS_NUMBER: u8 = 11;

/// The marker of an entry that generation never reached.
pub const UNVISITED: u8 = 0xFF;

/// A lower bound on the number of moves to solve a state.
pub trait PruningTables {
    /// Must never exceed the true distance of `state` to solved.
    fn admissible_heuristic(&self, state: &CubeState) -> u8;
}

/// The trivial heuristic. Turns IDA* into plain iterative deepening.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroTable;

/// The corner pattern database. Read-only once built; share it between
/// solvers behind an [`Arc`].
pub struct CornerPruningTable {
    table: Box<[u8]>,
}

#[derive(Error, Debug)]
pub enum PruningTableError {
    #[error("Pruning table I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Pruning table file has {actual} bytes, expected {expected}")]
    SizeMismatch { expected: u64, actual: u64 },
    #[error("Pruning table file does not record the solved state at depth zero")]
    UnsolvedEntry,
}

impl PruningTableError {
    /// How loudly a rejected table file is reported. A wrong-sized file is
    /// only informational.
    #[must_use]
    pub fn rejection_level(&self) -> Level {
        match self {
            PruningTableError::SizeMismatch { .. } => Level::Info,
            PruningTableError::Io(_) | PruningTableError::UnsolvedEntry => Level::Warn,
        }
    }
}

impl PruningTables for ZeroTable {
    fn admissible_heuristic(&self, _state: &CubeState) -> u8 {
        0
    }
}

impl PruningTables for CornerPruningTable {
    fn admissible_heuristic(&self, state: &CubeState) -> u8 {
        self.estimate(state)
    }
}

impl<T: PruningTables + ?Sized> PruningTables for &T {
    fn admissible_heuristic(&self, state: &CubeState) -> u8 {
        (**self).admissible_heuristic(state)
    }
}

impl<T: PruningTables + ?Sized> PruningTables for Arc<T> {
    fn admissible_heuristic(&self, state: &CubeState) -> u8 {
        (**self).admissible_heuristic(state)
    }
}

impl CornerPruningTable {
    /// Allocate a table with every entry [`UNVISITED`].
    #[must_use]
    pub fn new_unvisited() -> Self {
        Self {
            table: vec![UNVISITED; CORNER_STATES].into_boxed_slice(),
        }
    }

    /// Load the table from `config.database_path`, or generate it and save it
    /// back when the file is missing or rejected. Failing to save is only
    /// logged; the generated table is returned either way.
    #[must_use]
    pub fn load_or_generate(config: &SolverConfig) -> Self {
        let mut pruning_table = Self::new_unvisited();
        match pruning_table.try_load(&config.database_path) {
            Ok(()) => {
                info!(
                    success!("Loaded corner pruning table from {}"),
                    config.database_path.display()
                );
                return pruning_table;
            }
            Err(PruningTableError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    "No corner pruning table at {}",
                    config.database_path.display()
                );
            }
            Err(e) => {
                log!(
                    e.rejection_level(),
                    "Ignoring corner pruning table at {}: {e}",
                    config.database_path.display()
                );
            }
        }

        pruning_table.generate(config.generation_depth_limit);
        if config.save_generated {
            match pruning_table.save(&config.database_path) {
                Ok(()) => info!(
                    success!("Saved corner pruning table to {}"),
                    config.database_path.display()
                ),
                Err(e) => warn!(
                    "Could not save corner pruning table to {}: {e}",
                    config.database_path.display()
                ),
            }
        }
        pruning_table
    }

    /// Fill the table by breadth-first search from the solved state. States
    /// at `depth_limit` are recorded but not expanded. Returns the number of
    /// entries recorded at each depth.
    ///
    /// The queue holds full cube states rather than corner indices because
    /// successors are found by applying moves to a state.
    pub fn generate(&mut self, depth_limit: u8) -> Vec<u64> {
        info!(start!("Generating corner pruning table"));
        let start = Instant::now();

        self.table.fill(UNVISITED);
        let solved = CubeState::solved();
        self.table[solved.corner_index() as usize] = 0;

        let mut depth_counts = vec![1_u64];
        let mut queue = VecDeque::from([solved]);
        let mut current_depth = 0;
        let mut depth_start = Instant::now();

        while let Some(state) = queue.pop_front() {
            let depth = self.table[state.corner_index() as usize];
            // Breadth-first order means depths only ever increase
            if depth != current_depth {
                debug!(
                    working!("Depth {} done: {} states in {:.3}s"),
                    current_depth,
                    depth_counts[usize::from(current_depth)],
                    depth_start.elapsed().as_secs_f64()
                );
                current_depth = depth;
                depth_start = Instant::now();
            }
            if depth >= depth_limit {
                continue;
            }

            for move_ in Move::ALL {
                let next = state.with_move(move_);
                let entry = &mut self.table[next.corner_index() as usize];
                if *entry == UNVISITED {
                    *entry = depth + 1;
                    if depth_counts.len() <= usize::from(depth + 1) {
                        depth_counts.push(0);
                    }
                    depth_counts[usize::from(depth + 1)] += 1;
                    queue.push_back(next);
                }
            }
        }

        info!(
            success!("Generated {} corner pruning table entries in {:.3}s"),
            depth_counts.iter().sum::<u64>(),
            start.elapsed().as_secs_f64()
        );
        depth_counts
    }

    /// Load the table from `path`, leaving it untouched if the file is
    /// missing, the wrong size or otherwise rejected.
    pub fn load(&mut self, path: impl AsRef<Path>) -> bool {
        self.try_load(path).is_ok()
    }

    /// Like [`CornerPruningTable::load`], but report why a file was rejected.
    ///
    /// # Errors
    ///
    /// If the file cannot be read, is not exactly [`CORNER_STATES`] bytes
    /// long, or does not record the solved state at depth zero. See
    /// [`PruningTableError`].
    pub fn try_load(&mut self, path: impl AsRef<Path>) -> Result<(), PruningTableError> {
        let path = path.as_ref();
        let actual = fs::metadata(path)?.len();
        let expected = CORNER_STATES as u64;
        if actual != expected {
            return Err(PruningTableError::SizeMismatch { expected, actual });
        }

        let bytes = fs::read(path)?;
        // The file could have changed between the two calls
        if bytes.len() != CORNER_STATES {
            return Err(PruningTableError::SizeMismatch {
                expected,
                actual: bytes.len() as u64,
            });
        }
        if bytes[CubeState::solved().corner_index() as usize] != 0 {
            return Err(PruningTableError::UnsolvedEntry);
        }

        self.table = bytes.into_boxed_slice();
        Ok(())
    }

    /// Write the table to `path` verbatim.
    ///
    /// # Errors
    ///
    /// If the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PruningTableError> {
        fs::write(path, &self.table)?;
        Ok(())
    }

    /// The corner distance of `state`, with unvisited entries read as zero.
    #[must_use]
    pub fn estimate(&self, state: &CubeState) -> u8 {
        match self.entry(state.corner_index() as usize) {
            Some(UNVISITED) | None => 0,
            Some(depth) => depth,
        }
    }

    /// The raw entry at `index`, [`UNVISITED`] included.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<u8> {
        self.table.get(index).copied()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::MoveSequence;
    use std::{path::PathBuf, sync::LazyLock};

    const TEST_DEPTH_LIMIT: u8 = 4;

    /// The known number of corner configurations at each depth.
    const CORNER_DEPTH_COUNTS: [u64; 12] = [
        1, 18, 243, 2_874, 28_000, 205_416, 1_168_516, 5_402_628, 20_776_176, 45_391_616,
        15_139_616, 64_736,
    ];

    static SHALLOW: LazyLock<(CornerPruningTable, Vec<u64>)> = LazyLock::new(|| {
        let mut pruning_table = CornerPruningTable::new_unvisited();
        let depth_counts = pruning_table.generate(TEST_DEPTH_LIMIT);
        (pruning_table, depth_counts)
    });

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cube_solver_{}_{name}.db", std::process::id()))
    }

    #[test_log::test]
    fn test_shallow_generation() {
        let (pruning_table, depth_counts) = &*SHALLOW;
        assert_eq!(depth_counts.as_slice(), &CORNER_DEPTH_COUNTS[..=usize::from(TEST_DEPTH_LIMIT)]);

        let visited = pruning_table
            .as_bytes()
            .iter()
            .filter(|&&entry| entry != UNVISITED)
            .count() as u64;
        assert_eq!(visited, depth_counts.iter().sum::<u64>());
        assert!(
            pruning_table
                .as_bytes()
                .iter()
                .all(|&entry| entry == UNVISITED || entry <= TEST_DEPTH_LIMIT)
        );

        let solved = CubeState::solved();
        assert_eq!(pruning_table.entry(0), Some(0));
        assert_eq!(pruning_table.estimate(&solved), 0);
        for move_ in Move::ALL {
            assert_eq!(pruning_table.estimate(&solved.with_move(move_)), 1, "{move_}");
        }
    }

    #[test_log::test]
    fn test_matches_independent_bfs() {
        // A separate breadth-first search keyed by corner index alone
        let (pruning_table, _) = &*SHALLOW;
        let mut distances = fxhash::FxHashMap::default();
        let mut frontier = vec![CubeState::solved()];
        distances.insert(0, 0_u8);
        for depth in 1..=TEST_DEPTH_LIMIT {
            let mut next_frontier = vec![];
            for state in &frontier {
                for move_ in Move::ALL {
                    let next = state.with_move(move_);
                    distances.entry(next.corner_index()).or_insert_with(|| {
                        next_frontier.push(next);
                        depth
                    });
                }
            }
            frontier = next_frontier;
        }

        assert_eq!(distances.len() as u64, SHALLOW.1.iter().sum::<u64>());
        for (&index, &depth) in &distances {
            assert_eq!(pruning_table.entry(index as usize), Some(depth));
        }
    }

    #[test_log::test]
    fn test_unvisited_reads_as_zero() {
        let (pruning_table, _) = &*SHALLOW;
        let mut beyond_limit = 0;
        for _ in 0..200 {
            let mut state = CubeState::solved();
            MoveSequence::random(30).apply_to(&mut state);
            let index = state.corner_index() as usize;
            if pruning_table.entry(index) == Some(UNVISITED) {
                beyond_limit += 1;
                assert_eq!(pruning_table.estimate(&state), 0);
            } else {
                assert!(pruning_table.estimate(&state) <= TEST_DEPTH_LIMIT);
            }
        }
        // Almost every random state lies beyond depth four
        assert!(beyond_limit > 150);
    }

    #[test]
    fn test_zero_table() {
        let mut state = CubeState::solved();
        MoveSequence::random(20).apply_to(&mut state);
        assert_eq!(ZeroTable.admissible_heuristic(&state), 0);
        assert_eq!((&ZeroTable).admissible_heuristic(&state), 0);
        assert_eq!(Arc::new(ZeroTable).admissible_heuristic(&state), 0);
    }

    #[test_log::test]
    fn test_save_and_load() {
        let (pruning_table, _) = &*SHALLOW;
        let path = temp_path("save_and_load");
        pruning_table.save(&path).unwrap();

        let mut loaded = CornerPruningTable::new_unvisited();
        assert!(loaded.load(&path));
        assert_eq!(loaded.as_bytes(), pruning_table.as_bytes());

        // A same-length file that does not start from solved is rejected and
        // the table is left alone
        let mut bytes = fs::read(&path).unwrap();
        bytes[0] = 3;
        fs::write(&path, &bytes).unwrap();
        let mut rejected = CornerPruningTable::new_unvisited();
        assert!(matches!(
            rejected.try_load(&path),
            Err(PruningTableError::UnsolvedEntry)
        ));
        assert!(rejected.as_bytes().iter().all(|&entry| entry == UNVISITED));

        fs::remove_file(&path).unwrap();
    }

    #[test_log::test]
    fn test_load_rejects_wrong_size() {
        let path = temp_path("wrong_size");
        fs::write(&path, [0_u8; 1024]).unwrap();

        let mut pruning_table = CornerPruningTable::new_unvisited();
        assert!(!pruning_table.load(&path));
        assert!(matches!(
            pruning_table.try_load(&path),
            Err(PruningTableError::SizeMismatch {
                expected: 88_179_840,
                actual: 1024
            })
        ));
        assert!(pruning_table.as_bytes().iter().all(|&entry| entry == UNVISITED));
        fs::remove_file(&path).unwrap();

        assert_eq!(
            PruningTableError::SizeMismatch {
                expected: 88_179_840,
                actual: 1024
            }
            .rejection_level(),
            Level::Info
        );
        assert_eq!(PruningTableError::UnsolvedEntry.rejection_level(), Level::Warn);

        assert!(!pruning_table.load(temp_path("does_not_exist")));
        assert!(matches!(
            pruning_table.try_load(temp_path("does_not_exist")),
            Err(PruningTableError::Io(_))
        ));
    }

    #[test_log::test]
    fn test_load_or_generate() {
        let config = SolverConfig {
            database_path: temp_path("load_or_generate"),
            generation_depth_limit: 3,
            ..SolverConfig::default()
        };
        let generated = CornerPruningTable::load_or_generate(&config);
        assert_eq!(generated.estimate(&CubeState::solved()), 0);
        assert!(config.database_path.exists());

        // The second time around the saved file is picked up
        let loaded = CornerPruningTable::load_or_generate(&SolverConfig {
            generation_depth_limit: 0,
            save_generated: false,
            ..config.clone()
        });
        assert_eq!(loaded.as_bytes(), generated.as_bytes());
        fs::remove_file(&config.database_path).unwrap();
    }

    #[test_log::test]
    fn test_unwritable_path_is_not_fatal() {
        let config = SolverConfig {
            database_path: temp_path("missing_dir").join("corner.db"),
            generation_depth_limit: 2,
            ..SolverConfig::default()
        };
        let pruning_table = CornerPruningTable::load_or_generate(&config);
        assert!(!config.database_path.exists());
        assert_eq!(
            pruning_table.estimate(&CubeState::solved().with_move(Move::ALL[4])),
            1
        );
    }

    #[test_log::test]
    #[ignore = "generates the full table, which takes minutes and several gigabytes"]
    fn test_full_generation() {
        let mut pruning_table = CornerPruningTable::new_unvisited();
        let depth_counts = pruning_table.generate(CORNER_GODS_NUMBER);
        assert_eq!(depth_counts, CORNER_DEPTH_COUNTS);
        assert!(pruning_table.as_bytes().iter().all(|&entry| entry != UNVISITED));
    }
}
