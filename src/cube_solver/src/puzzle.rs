//! The facelet-level 3x3 cube model. A state is 54 stickers laid out face by
//! face in the order U, L, F, R, B, D, each face in row-major order as seen on
//! the standard unfolded net:
//!
//! ```text
//!           U
//!        L  F  R  B
//!           D
//! ```
//!
//! The top row of U touches B, and the top row of D touches F.

use itertools::Itertools;
use std::{fmt, str::FromStr};
use thiserror::Error;

pub mod corners;

pub const FACELET_COUNT: usize = 54;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Color {
    White,
    Green,
    Red,
    Blue,
    Orange,
    Yellow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Face {
    Up,
    Left,
    Front,
    Right,
    Back,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Turn {
    Clockwise,
    CounterClockwise,
    Half,
}

/// One of the 18 face turns. The enumeration order of [`Move::ALL`] is
/// significant to the solver: faces in [`Face::ALL`] order, and for each face
/// the clockwise, counter-clockwise and half turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    face: Face,
    turn: Turn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubeState {
    facelets: [Color; FACELET_COUNT],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MoveSequence(Vec<Move>);

/// Renders a [`CubeState`] as the unfolded net. See [`CubeState::net`].
pub struct Net<'a>(&'a CubeState);

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid move {0:?}, expected a face letter (U L F R B D) optionally followed by ' or 2")]
pub struct ParseMoveError(pub String);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseCubeError {
    #[error("Expected 54 facelets but got {0}")]
    InvalidLength(usize),
    #[error("Invalid color {found:?} at facelet {index}, expected one of W G R B O Y")]
    InvalidColor { index: usize, found: char },
    #[error("Expected 9 facelets of color {color} but got {count}")]
    WrongColorCount { color: Color, count: usize },
}

/// The four strips of three facelets that a clockwise quarter turn of each
/// face cycles. Each strip moves into the position of the next one, and the
/// last one wraps around to the first.
const ADJACENT_STRIPS: [[[u8; 3]; 4]; 6] = [
    // U: F -> L -> B -> R
    [[18, 19, 20], [9, 10, 11], [36, 37, 38], [27, 28, 29]],
    // L: U -> F -> D -> B
    [[0, 3, 6], [18, 21, 24], [45, 48, 51], [44, 41, 38]],
    // F: U -> R -> D -> L
    [[6, 7, 8], [27, 30, 33], [47, 46, 45], [17, 14, 11]],
    // R: U -> B -> D -> F
    [[8, 5, 2], [36, 39, 42], [53, 50, 47], [26, 23, 20]],
    // B: U -> L -> D -> R
    [[2, 1, 0], [9, 12, 15], [51, 52, 53], [35, 32, 29]],
    // D: F -> R -> B -> L
    [[24, 25, 26], [33, 34, 35], [42, 43, 44], [15, 16, 17]],
];

/// The corner and edge stickers of the turned face itself, relative to the
/// face, in clockwise order.
const FACE_CYCLES: [[u8; 4]; 2] = [[0, 2, 8, 6], [1, 5, 7, 3]];

/// `QUARTER_TURNS[face][dst]` is the facelet whose sticker lands on `dst`
/// after a clockwise quarter turn of `face`.
// Facelet indices are below 54
#[allow(clippy::cast_possible_truncation)]
const QUARTER_TURNS: [[u8; FACELET_COUNT]; 6] = {
    let mut tables = [[0; FACELET_COUNT]; 6];
    let mut face = 0;
    while face < 6 {
        let mut i = 0;
        while i < FACELET_COUNT {
            tables[face][i] = i as u8;
            i += 1;
        }

        let offset = face * 9;
        let mut c = 0;
        while c < FACE_CYCLES.len() {
            let mut k = 0;
            while k < 4 {
                let src = offset + FACE_CYCLES[c][k] as usize;
                let dst = offset + FACE_CYCLES[c][(k + 1) % 4] as usize;
                tables[face][dst] = src as u8;
                k += 1;
            }
            c += 1;
        }

        let strips = ADJACENT_STRIPS[face];
        let mut k = 0;
        while k < 4 {
            let mut j = 0;
            while j < 3 {
                tables[face][strips[(k + 1) % 4][j] as usize] = strips[k][j];
                j += 1;
            }
            k += 1;
        }
        face += 1;
    }
    tables
};

const SOLVED_FACELETS: [Color; FACELET_COUNT] = {
    let mut facelets = [Color::White; FACELET_COUNT];
    let mut i = 0;
    while i < FACELET_COUNT {
        facelets[i] = Color::ALL[i / 9];
        i += 1;
    }
    facelets
};

impl Color {
    pub const ALL: [Color; 6] = [
        Color::White,
        Color::Green,
        Color::Red,
        Color::Blue,
        Color::Orange,
        Color::Yellow,
    ];

    /// Parse a one-letter color code.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'W' => Some(Color::White),
            'G' => Some(Color::Green),
            'R' => Some(Color::Red),
            'B' => Some(Color::Blue),
            'O' => Some(Color::Orange),
            'Y' => Some(Color::Yellow),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Color::White => 'W',
            Color::Green => 'G',
            Color::Red => 'R',
            Color::Blue => 'B',
            Color::Orange => 'O',
            Color::Yellow => 'Y',
        }
    }

    /// Whether the color belongs to the U/D axis. Corner twist is measured by
    /// where this sticker sits.
    #[must_use]
    pub const fn is_primary(self) -> bool {
        matches!(self, Color::White | Color::Yellow)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Up,
        Face::Left,
        Face::Front,
        Face::Right,
        Face::Back,
        Face::Down,
    ];

    /// The color of this face's center, and of all of its stickers when
    /// solved.
    #[must_use]
    pub const fn color(self) -> Color {
        Color::ALL[self as usize]
    }

    #[must_use]
    pub const fn opposite(self) -> Face {
        match self {
            Face::Up => Face::Down,
            Face::Left => Face::Right,
            Face::Front => Face::Back,
            Face::Right => Face::Left,
            Face::Back => Face::Front,
            Face::Down => Face::Up,
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Face::Up => 'U',
            Face::Left => 'L',
            Face::Front => 'F',
            Face::Right => 'R',
            Face::Back => 'B',
            Face::Down => 'D',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        Face::ALL.into_iter().find(|face| face.as_char() == c)
    }
}

impl Turn {
    pub const ALL: [Turn; 3] = [Turn::Clockwise, Turn::CounterClockwise, Turn::Half];

    /// The number of clockwise quarter turns this turn is made of.
    #[must_use]
    pub const fn quarter_turns(self) -> usize {
        match self {
            Turn::Clockwise => 1,
            Turn::CounterClockwise => 3,
            Turn::Half => 2,
        }
    }

    #[must_use]
    pub const fn inverse(self) -> Turn {
        match self {
            Turn::Clockwise => Turn::CounterClockwise,
            Turn::CounterClockwise => Turn::Clockwise,
            Turn::Half => Turn::Half,
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            Turn::Clockwise => "",
            Turn::CounterClockwise => "'",
            Turn::Half => "2",
        }
    }
}

impl Move {
    pub const ALL: [Move; 18] = {
        let mut moves = [Move::new(Face::Up, Turn::Clockwise); 18];
        let mut i = 0;
        while i < moves.len() {
            moves[i] = Move::new(Face::ALL[i / 3], Turn::ALL[i % 3]);
            i += 1;
        }
        moves
    };

    #[must_use]
    pub const fn new(face: Face, turn: Turn) -> Self {
        Self { face, turn }
    }

    #[must_use]
    pub const fn face(self) -> Face {
        self.face
    }

    #[must_use]
    pub const fn turn(self) -> Turn {
        self.turn
    }

    /// The position of this move in [`Move::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.face as usize * 3 + self.turn as usize
    }

    #[must_use]
    pub const fn inverse(self) -> Move {
        Move::new(self.face, self.turn.inverse())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.face.as_char(), self.turn.suffix())
    }
}

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let face = chars
            .next()
            .and_then(Face::from_char)
            .ok_or_else(|| ParseMoveError(s.to_owned()))?;
        let turn = match chars.as_str() {
            "" => Turn::Clockwise,
            "'" => Turn::CounterClockwise,
            "2" => Turn::Half,
            _ => return Err(ParseMoveError(s.to_owned())),
        };
        Ok(Move::new(face, turn))
    }
}

impl CubeState {
    #[must_use]
    pub const fn solved() -> Self {
        Self {
            facelets: SOLVED_FACELETS,
        }
    }

    /// Build a state from a 54 character color string without validation.
    /// Unrecognized characters become white, and an input shorter than 54
    /// characters is ignored entirely, leaving the cube solved. Characters
    /// past the 54th are ignored.
    #[must_use]
    pub fn from_facelets_lossy(input: &str) -> Self {
        let mut state = Self::solved();
        if input.chars().count() >= FACELET_COUNT {
            for (facelet, c) in state.facelets.iter_mut().zip(input.chars()) {
                *facelet = Color::from_char(c).unwrap_or(Color::White);
            }
        }
        state
    }

    #[must_use]
    pub fn facelets(&self) -> &[Color; FACELET_COUNT] {
        &self.facelets
    }

    /// The sticker color at `row` and `col` of `face`, both in `0..3`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of range.
    #[must_use]
    pub fn facelet(&self, face: Face, row: usize, col: usize) -> Color {
        assert!(row < 3 && col < 3, "row and col must be in 0..3");
        self.facelets[face as usize * 9 + row * 3 + col]
    }

    fn apply_quarter_turn(&mut self, face: Face) {
        let before = self.facelets;
        for (facelet, &src) in self.facelets.iter_mut().zip(&QUARTER_TURNS[face as usize]) {
            *facelet = before[usize::from(src)];
        }
    }

    /// Apply a move in place. Counter-clockwise and half turns are repeated
    /// clockwise quarter turns.
    pub fn apply_move(&mut self, move_: Move) {
        for _ in 0..move_.turn.quarter_turns() {
            self.apply_quarter_turn(move_.face);
        }
    }

    pub fn apply_moves<'a>(&mut self, moves: impl IntoIterator<Item = &'a Move>) {
        for &move_ in moves {
            self.apply_move(move_);
        }
    }

    /// A copy of this state with `move_` applied.
    #[must_use]
    pub fn with_move(mut self, move_: Move) -> Self {
        self.apply_move(move_);
        self
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.facelets == SOLVED_FACELETS
    }

    /// Display adapter that prints the state as an unfolded net.
    #[must_use]
    pub fn net(&self) -> Net<'_> {
        Net(self)
    }
}

impl Default for CubeState {
    fn default() -> Self {
        Self::solved()
    }
}

impl fmt::Display for CubeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for color in &self.facelets {
            write!(f, "{color}")?;
        }
        Ok(())
    }
}

impl FromStr for CubeState {
    type Err = ParseCubeError;

    /// Strictly parse a 54 character color string. Every character must be a
    /// color code and every color must appear exactly nine times.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count = s.chars().count();
        if count != FACELET_COUNT {
            return Err(ParseCubeError::InvalidLength(count));
        }
        let mut state = Self::solved();
        for (index, (facelet, found)) in state.facelets.iter_mut().zip(s.chars()).enumerate() {
            *facelet = Color::from_char(found).ok_or(ParseCubeError::InvalidColor { index, found })?;
        }
        for color in Color::ALL {
            let count = state.facelets.iter().filter(|&&c| c == color).count();
            if count != 9 {
                return Err(ParseCubeError::WrongColorCount { color, count });
            }
        }
        Ok(state)
    }
}

impl fmt::Display for Net<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = |face: Face, r: usize| (0..3).map(|c| self.0.facelet(face, r, c)).join(" ");
        for r in 0..3 {
            writeln!(f, "{:7}{}", "", row(Face::Up, r))?;
        }
        for r in 0..3 {
            writeln!(
                f,
                "{}",
                [Face::Left, Face::Front, Face::Right, Face::Back]
                    .into_iter()
                    .map(|face| row(face, r))
                    .join("  ")
            )?;
        }
        for r in 0..3 {
            writeln!(f, "{:7}{}", "", row(Face::Down, r))?;
        }
        Ok(())
    }
}

impl MoveSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A random sequence of `len` moves that never turns the same face twice
    /// in a row.
    #[must_use]
    pub fn random(len: usize) -> Self {
        let mut moves: Vec<Move> = Vec::with_capacity(len);
        while moves.len() < len {
            let candidate = Move::ALL[fastrand::usize(..Move::ALL.len())];
            if moves
                .last()
                .is_some_and(|last| last.face() == candidate.face())
            {
                continue;
            }
            moves.push(candidate);
        }
        Self(moves)
    }

    /// The sequence that undoes this one: reversed, with every move inverted.
    #[must_use]
    pub fn inverse(&self) -> Self {
        self.0.iter().rev().map(|move_| move_.inverse()).collect()
    }

    pub fn apply_to(&self, state: &mut CubeState) {
        state.apply_moves(&self.0);
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Move] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.0.iter()
    }
}

impl From<Vec<Move>> for MoveSequence {
    fn from(moves: Vec<Move>) -> Self {
        Self(moves)
    }
}

impl FromIterator<Move> for MoveSequence {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a MoveSequence {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for MoveSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" "))
    }
}

impl FromStr for MoveSequence {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace().map(str::parse).collect()
    }
}
