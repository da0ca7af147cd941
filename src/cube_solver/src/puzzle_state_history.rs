use super::puzzle::{CubeState, Move};

/// The current root-to-node trail of the IDA* search. Every entry owns its
/// own copy of the state it describes, so sibling branches never alias. The
/// first entry is the root and has no move.
pub struct PuzzleStateHistory {
    stack: Vec<(CubeState, Option<Move>)>,
}

impl PuzzleStateHistory {
    /// Create a history rooted at `initial` with room for `max_depth` moves.
    pub fn new(initial: CubeState, max_depth: usize) -> Self {
        let mut stack = Vec::with_capacity(max_depth + 1);
        stack.push((initial, None));
        Self { stack }
    }

    /// Push the state reached by applying `move_` to the last state.
    pub fn push_stack(&mut self, move_: Move) {
        let next = self.last_state().with_move(move_);
        self.stack.push((next, Some(move_)));
    }

    /// Pop the last state from the stack. The root is never popped.
    pub fn pop_stack(&mut self) {
        debug_assert!(self.stack.len() > 1);
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    pub fn last_state(&self) -> &CubeState {
        // The root entry is never popped, so the stack is never empty
        &self.stack[self.stack.len() - 1].0
    }

    pub fn last_move(&self) -> Option<Move> {
        self.stack[self.stack.len() - 1].1
    }

    /// The moves from the root to the last state, in application order.
    pub fn create_move_history(&self) -> Vec<Move> {
        self.stack.iter().filter_map(|&(_, move_)| move_).collect()
    }
}
