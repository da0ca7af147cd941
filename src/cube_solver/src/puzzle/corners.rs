//! Corner-only view of a [`CubeState`], used to index the corner pruning
//! table. Edges are ignored entirely.

use super::{Color, CubeState, SOLVED_FACELETS};
use crate::FACT_UNTIL_7;

/// The number of corner permutations, 8!.
pub const CORNER_PERMUTATIONS: u32 = 40_320;
/// The number of corner orientations, 3^7. The eighth twist is determined by
/// the other seven.
pub const CORNER_ORIENTATIONS: u32 = 2_187;
/// The number of distinct corner indices.
pub const CORNER_STATES: usize = CORNER_PERMUTATIONS as usize * CORNER_ORIENTATIONS as usize;

/// The three facelets of each corner slot, U/D sticker first, then the other
/// two in clockwise order when looking at the corner from outside the cube.
/// Slots are ULB, URB, URF, ULF, DLF, DLB, DRB, DRF.
///
/// Keeping every triplet in the same rotational sense is what makes the
/// twists of all eight corners sum to a multiple of three.
pub const CORNER_FACELETS: [[u8; 3]; 8] = [
    [0, 38, 9],
    [2, 29, 36],
    [8, 20, 27],
    [6, 11, 18],
    [45, 24, 17],
    [51, 15, 44],
    [53, 42, 35],
    [47, 33, 26],
];

/// The set of colors of each corner piece as a bitmask over [`Color`]. A
/// corner piece is numbered by the slot it occupies when solved, so this is
/// derived from [`CORNER_FACELETS`] rather than written out by hand.
const CORNER_COLOR_MASKS: [u8; 8] = {
    let mut masks = [0; 8];
    let mut slot = 0;
    while slot < 8 {
        let mut i = 0;
        while i < 3 {
            masks[slot] |= color_bit(SOLVED_FACELETS[CORNER_FACELETS[slot][i] as usize]);
            i += 1;
        }
        slot += 1;
    }
    masks
};

const fn color_bit(color: Color) -> u8 {
    1 << color as u8
}

impl CubeState {
    fn corner_colors(&self, slot: usize) -> [Color; 3] {
        CORNER_FACELETS[slot].map(|facelet| self.facelets[usize::from(facelet)])
    }

    /// Which corner piece occupies `slot`, identified by its set of colors.
    /// A color set that matches no corner piece, only possible for hand-made
    /// states, reads as piece 0.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is not in `0..8`.
    #[must_use]
    pub fn corner_identity(&self, slot: usize) -> u8 {
        let mask = self
            .corner_colors(slot)
            .into_iter()
            .fold(0, |mask, color| mask | color_bit(color));
        CORNER_COLOR_MASKS
            .iter()
            .position(|&piece_mask| piece_mask == mask)
            .and_then(|piece| u8::try_from(piece).ok())
            .unwrap_or(0)
    }

    /// The twist of the corner in `slot`: 0 if its U/D colored sticker is on
    /// the slot's first facelet, 1 if on the second, 2 otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is not in `0..8`.
    #[must_use]
    pub fn corner_orientation(&self, slot: usize) -> u8 {
        let [first, second, _] = self.corner_colors(slot);
        if first.is_primary() {
            0
        } else if second.is_primary() {
            1
        } else {
            2
        }
    }

    /// A dense index in `0..CORNER_STATES` for the corner permutation and
    /// orientation: the Lehmer code of the corner identities times 3^7, plus
    /// the first seven twists read as a base 3 number.
    #[must_use]
    pub fn corner_index(&self) -> u32 {
        let identities: [u8; 8] = std::array::from_fn(|slot| self.corner_identity(slot));

        // The last element of a Lehmer code is always zero, so it is skipped
        let permutation_rank: u32 = (0..7)
            .map(|i| {
                let lt_after_count: u32 = identities[i + 1..]
                    .iter()
                    .map(|&identity| u32::from(identity < identities[i]))
                    .sum();
                lt_after_count * FACT_UNTIL_7[7 - i]
            })
            .sum();

        let orientation_code = (0..7).fold(0, |code, slot| {
            code * 3 + u32::from(self.corner_orientation(slot))
        });

        permutation_rank * CORNER_ORIENTATIONS + orientation_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{Move, MoveSequence};

    fn apply_moves(moves: &str) -> CubeState {
        let mut state = CubeState::solved();
        moves
            .parse::<MoveSequence>()
            .unwrap()
            .apply_to(&mut state);
        state
    }

    #[test]
    fn test_corner_states_count() {
        assert_eq!(CORNER_STATES, 88_179_840);
    }

    #[test]
    fn test_solved_corners() {
        let solved = CubeState::solved();
        for slot in 0..8 {
            assert_eq!(usize::from(solved.corner_identity(slot)), slot);
            assert_eq!(solved.corner_orientation(slot), 0);
        }
        assert_eq!(solved.corner_index(), 0);
    }

    #[test]
    fn test_corner_color_masks() {
        let white_green_orange =
            color_bit(Color::White) | color_bit(Color::Green) | color_bit(Color::Orange);
        assert_eq!(CORNER_COLOR_MASKS[0], white_green_orange);
        let yellow_red_blue =
            color_bit(Color::Yellow) | color_bit(Color::Red) | color_bit(Color::Blue);
        assert_eq!(CORNER_COLOR_MASKS[7], yellow_red_blue);
        // All distinct
        for i in 0..8 {
            for j in i + 1..8 {
                assert_ne!(CORNER_COLOR_MASKS[i], CORNER_COLOR_MASKS[j]);
            }
        }
    }

    #[test]
    fn test_corner_index() {
        for (moves, expected_index, expected_identities, expected_orientations) in [
            ("U", 33_067_440, [3, 0, 1, 2, 4, 5, 6, 7], [0; 8]),
            ("D", 19_683, [0, 1, 2, 3, 5, 6, 7, 4], [0; 8]),
            ("D2", 34_992, [0, 1, 2, 3, 6, 7, 4, 5], [0; 8]),
            (
                "R",
                2_957_392,
                [0, 2, 7, 3, 4, 5, 1, 6],
                [0, 2, 1, 0, 0, 0, 1, 2],
            ),
            (
                "F'",
                1_318_968,
                [0, 1, 7, 2, 3, 5, 6, 4],
                [0, 0, 2, 1, 2, 0, 0, 1],
            ),
            (
                "L",
                56_950_278,
                [5, 1, 2, 0, 3, 4, 6, 7],
                [1, 0, 0, 2, 1, 2, 0, 0],
            ),
            ("B2", 74_668_554, [6, 5, 2, 3, 4, 1, 0, 7], [0; 8]),
        ] {
            let state = apply_moves(moves);
            assert_eq!(state.corner_index(), expected_index, "{moves}");
            let identities: [u8; 8] = std::array::from_fn(|slot| state.corner_identity(slot));
            let orientations: [u8; 8] = std::array::from_fn(|slot| state.corner_orientation(slot));
            assert_eq!(identities, expected_identities, "{moves}");
            assert_eq!(orientations, expected_orientations, "{moves}");
        }

        assert_eq!(apply_moves("R U R' U'").corner_index(), 12_407_175);
        assert_eq!(apply_moves("R F").corner_index(), 1_920_871);
    }

    #[test]
    fn test_single_moves_have_distinct_indices() {
        let mut indices: Vec<u32> = Move::ALL
            .into_iter()
            .map(|move_| CubeState::solved().with_move(move_).corner_index())
            .collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), 18);
        assert!(!indices.contains(&0));
    }

    #[test]
    fn test_random_corner_invariants() {
        for _ in 0..500 {
            let mut state = CubeState::solved();
            MoveSequence::random(fastrand::usize(1..40)).apply_to(&mut state);

            let mut identities: Vec<u8> = (0..8).map(|slot| state.corner_identity(slot)).collect();
            identities.sort_unstable();
            assert_eq!(identities, (0..8).collect::<Vec<u8>>());

            let twist_sum: u32 = (0..8)
                .map(|slot| u32::from(state.corner_orientation(slot)))
                .sum();
            assert_eq!(twist_sum % 3, 0);

            assert!((state.corner_index() as usize) < CORNER_STATES);
        }
    }

    #[test]
    fn test_edges_do_not_affect_index() {
        // Swapping two edge stickers produces an unreachable state but the
        // corners are untouched
        let mut state = CubeState::solved();
        state.facelets.swap(1, 19);
        assert!(!state.is_solved());
        assert_eq!(state.corner_index(), 0);

        // A U permutation cycles three edges and leaves every corner home
        let u_perm = apply_moves("R2 U R U R' U' R' U' R' U R'");
        assert!(!u_perm.is_solved());
        assert_eq!(u_perm.corner_index(), 0);
    }

    #[test]
    fn test_unrecognized_corner_reads_as_zero() {
        let state = CubeState::from_facelets_lossy(&"W".repeat(54));
        for slot in 0..8 {
            assert_eq!(state.corner_identity(slot), 0);
            assert_eq!(state.corner_orientation(slot), 0);
        }
        assert!((state.corner_index() as usize) < CORNER_STATES);
    }
}
