use super::{
    config::SolverConfig,
    pruning::PruningTables,
    puzzle::{CubeState, Move, MoveSequence},
    puzzle_state_history::PuzzleStateHistory,
};
use crate::{config::DEFAULT_MAX_DEPTH, start, success, working};
use log::{debug, info};
use std::{fmt, time::Instant};
use thiserror::Error;

/// What [`solve`] returns when no solution exists within the depth ceiling.
/// It can never be mistaken for a move sequence.
pub const NOT_FOUND: &str = "Solution not found (Max Depth Reached)";

/// The deepest the solver will search. One below `u8::MAX` so that the cost of
/// a child node always fits.
pub const MAX_SEARCH_DEPTH: u8 = u8::MAX - 1;

pub struct Solver<T: PruningTables> {
    pruning_tables: T,
    max_depth: u8,
}

struct SolverMutable {
    puzzle_state_history: PuzzleStateHistory,
    nodes_visited: u64,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SolverError {
    #[error("Solution not found (Max Depth Reached)")]
    MaxDepthExceeded { max_depth: u8 },
}

/// The return type of the IDA* recursion. A failed search reports the
/// smallest total cost estimate that exceeded the bound, which becomes the
/// next bound.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum SearchOutcome {
    Found,
    NextBound(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub moves: MoveSequence,
    /// Nodes expanded over every iteration of the search.
    pub nodes_visited: u64,
    /// The bound of the iteration that found the solution.
    pub depth: u8,
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.moves, f)
    }
}

/// Whether `move_` is never worth searching right after `last`:
///
/// - it undoes `last`;
/// - it turns the same face as `last` and does not come after it in
///   [`Move::ALL`];
/// - it turns the face opposite to `last`'s and that face comes first in
///   [`Move::ALL`]. Opposite faces commute, so only one order is searched.
fn is_redundant(last: Move, move_: Move) -> bool {
    move_ == last.inverse()
        || (move_.face() == last.face() && move_.index() <= last.index())
        || (move_.face() == last.face().opposite() && move_.face() < last.face())
}

impl<T: PruningTables> Solver<T> {
    #[must_use]
    pub fn new(pruning_tables: T) -> Self {
        Self {
            pruning_tables,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[must_use]
    pub fn from_config(pruning_tables: T, config: &SolverConfig) -> Self {
        Self::new(pruning_tables).with_max_depth(config.max_depth)
    }

    /// Set the depth ceiling, clamped to [`MAX_SEARCH_DEPTH`].
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth.min(MAX_SEARCH_DEPTH);
        self
    }

    #[must_use]
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    #[must_use]
    pub fn pruning_tables(&self) -> &T {
        &self.pruning_tables
    }

    /// One depth-first pass of IDA* below the last state of the history,
    /// `cost` moves away from the root.
    fn search_for_solution(
        &self,
        mutable: &mut SolverMutable,
        cost: u8,
        bound: u8,
    ) -> SearchOutcome {
        mutable.nodes_visited += 1;
        let last_puzzle_state = *mutable.puzzle_state_history.last_state();

        let estimate = cost.saturating_add(
            self.pruning_tables
                .admissible_heuristic(&last_puzzle_state),
        );
        if estimate > bound {
            return SearchOutcome::NextBound(estimate);
        }
        if last_puzzle_state.is_solved() {
            return SearchOutcome::Found;
        }

        let last_move = mutable.puzzle_state_history.last_move();
        let mut next_bound = u8::MAX;
        for move_ in Move::ALL {
            if last_move.is_some_and(|last| is_redundant(last, move_)) {
                continue;
            }

            mutable.puzzle_state_history.push_stack(move_);
            match self.search_for_solution(mutable, cost.saturating_add(1), bound) {
                // Keep the path on the stack, it is the solution
                SearchOutcome::Found => return SearchOutcome::Found,
                SearchOutcome::NextBound(child_bound) => {
                    next_bound = next_bound.min(child_bound);
                }
            }
            mutable.puzzle_state_history.pop_stack();
        }
        SearchOutcome::NextBound(next_bound)
    }

    /// Find a solution of at most `max_depth` moves with [iterative
    /// deepening A*][IDA]. Every iteration is a depth-first search that
    /// abandons a branch once its cost so far plus the admissible heuristic
    /// exceeds the bound. The next bound is the smallest such total seen.
    ///
    /// With an admissible heuristic the first solution found is optimal
    /// among the sequences the move pruning still allows.
    ///
    /// [IDA]: https://en.wikipedia.org/wiki/Iterative_deepening_A*
    ///
    /// # Errors
    ///
    /// [`SolverError::MaxDepthExceeded`] if the bound would have to grow
    /// past `max_depth`.
    pub fn solve(&self, puzzle_state: &CubeState) -> Result<Solution, SolverError> {
        info!(start!("Searching for a solution"));
        let start = Instant::now();

        let mut mutable = SolverMutable {
            puzzle_state_history: PuzzleStateHistory::new(
                *puzzle_state,
                usize::from(self.max_depth),
            ),
            nodes_visited: 0,
        };

        let mut bound = self.pruning_tables.admissible_heuristic(puzzle_state);
        while bound <= self.max_depth {
            debug!(working!("Searching depth {}..."), bound);
            let depth_start = Instant::now();
            let nodes_before = mutable.nodes_visited;
            let outcome = self.search_for_solution(&mut mutable, 0, bound);
            debug!(
                working!("Traversed {} nodes in {:.3}s"),
                mutable.nodes_visited - nodes_before,
                depth_start.elapsed().as_secs_f64()
            );

            match outcome {
                SearchOutcome::Found => {
                    let moves = MoveSequence::from(
                        mutable.puzzle_state_history.create_move_history(),
                    );
                    info!(
                        success!("Found a {} move solution in {:.3}s"),
                        moves.len(),
                        start.elapsed().as_secs_f64()
                    );
                    return Ok(Solution {
                        moves,
                        nodes_visited: mutable.nodes_visited,
                        depth: bound,
                    });
                }
                // Nothing exceeded the bound, so nothing is left to search
                SearchOutcome::NextBound(u8::MAX) => break,
                SearchOutcome::NextBound(next_bound) => bound = next_bound,
            }
        }

        info!(
            "No solution within {} moves after {:.3}s",
            self.max_depth,
            start.elapsed().as_secs_f64()
        );
        Err(SolverError::MaxDepthExceeded {
            max_depth: self.max_depth,
        })
    }

    /// Solve a 54 character facelet string, read leniently as by
    /// [`CubeState::from_facelets_lossy`]. Returns the space separated
    /// moves, or [`NOT_FOUND`].
    #[must_use]
    pub fn solve_facelets(&self, facelets: &str) -> String {
        match self.solve(&CubeState::from_facelets_lossy(facelets)) {
            Ok(solution) => solution.to_string(),
            Err(e) => e.to_string(),
        }
    }
}

/// Solve a 54 character facelet string with a fresh solver over
/// `pruning_tables`. See [`Solver::solve_facelets`].
#[must_use]
pub fn solve<T: PruningTables>(facelets: &str, pruning_tables: T, max_depth: u8) -> String {
    Solver::new(pruning_tables)
        .with_max_depth(max_depth)
        .solve_facelets(facelets)
}
