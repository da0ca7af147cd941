#![warn(clippy::pedantic)]
#![allow(clippy::similar_names, clippy::too_many_lines)]

pub mod config;
pub mod pruning;
pub mod puzzle;
pub(crate) mod puzzle_state_history;
pub mod solver;

pub use config::SolverConfig;
pub use pruning::{CornerPruningTable, PruningTables, ZeroTable};
pub use puzzle::{Color, CubeState, Face, Move, MoveSequence};
pub use solver::{MAX_SEARCH_DEPTH, NOT_FOUND, Solution, Solver, SolverError, solve};

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}

/// A precomputed factorial table for 0! to 7!, where index[i] is i!. Eight
/// corners only ever need up to 7! for their Lehmer code.
#[allow(clippy::cast_possible_truncation)]
const FACT_UNTIL_7: [u32; 8] = {
    let mut arr = [0; 8];
    arr[0] = 1;
    let mut i = 1;
    while i < arr.len() {
        arr[i] = arr[i - 1] * i as u32;
        i += 1;
    }
    arr
};
