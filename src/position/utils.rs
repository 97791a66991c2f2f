use std::iter::FromIterator;
use std::ops::{Index, IndexMut};
use std::{fmt, ops};

use arrayvec::ArrayVec;
use board_game_traits::Color;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::position::utils::Direction::*;
use crate::position::Piece::{BlackCap, BlackFlat, BlackWall, WhiteCap, WhiteFlat, WhiteWall};
use crate::position::Role::{Cap, Flat, Wall};
use crate::position::Square;

/// Maximum number of stones in a single stack, limited by the width of the stack encoding
pub const STACK_CAPACITY: u8 = 64;

/// One of the 3 piece roles in Tak. The same as piece, but without different variants for each color.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Role {
    Flat = 0,
    Wall = 1,
    Cap = 2,
}

impl Role {
    pub fn disc(self) -> usize {
        self as u16 as usize
    }

    pub fn is_road_piece(self) -> bool {
        self != Wall
    }
}

/// One of the 6 game pieces in Tak. Each piece has one variant for each color.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Piece {
    WhiteFlat = 0,
    BlackFlat = 1,
    WhiteWall = 2,
    BlackWall = 3,
    WhiteCap = 4,
    BlackCap = 5,
}

impl Piece {
    pub fn from_role_color(role: Role, color: Color) -> Self {
        match (role, color) {
            (Flat, Color::White) => WhiteFlat,
            (Wall, Color::White) => WhiteWall,
            (Cap, Color::White) => WhiteCap,
            (Flat, Color::Black) => BlackFlat,
            (Wall, Color::Black) => BlackWall,
            (Cap, Color::Black) => BlackCap,
        }
    }

    pub fn role(self) -> Role {
        match self {
            WhiteFlat | BlackFlat => Flat,
            WhiteWall | BlackWall => Wall,
            WhiteCap | BlackCap => Cap,
        }
    }

    pub fn color(self) -> Color {
        match self {
            WhiteFlat | WhiteWall | WhiteCap => Color::White,
            BlackFlat | BlackWall | BlackCap => Color::Black,
        }
    }

    pub fn is_road_piece(self) -> bool {
        self.role().is_road_piece()
    }
}

impl ops::Not for Piece {
    type Output = Self;

    fn not(self) -> Self::Output {
        Piece::from_role_color(self.role(), !self.color())
    }
}

/// The contents of a square on the board, consisting of zero or more pieces.
///
/// Every layer is stored as a single bit in `bitboard`, where bit 0 is the bottom of the stack,
/// and a set bit is a black stone. Only the top stone can be anything but a flat,
/// so its role is stored separately.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Hash)]
pub struct Stack {
    pub(crate) top_stone: Option<Piece>,
    pub(crate) bitboard: u64,
    pub(crate) height: u8,
}

impl Stack {
    /// Get a piece by index. 0 is the bottom of the stack
    pub fn get(&self, i: u8) -> Option<Piece> {
        if i >= self.height {
            None
        } else if i == self.height - 1 {
            self.top_stone
        } else {
            Some(Piece::from_role_color(Flat, self.layer_color(i)))
        }
    }

    pub fn top_stone(&self) -> Option<Piece> {
        self.top_stone
    }

    fn layer_color(&self, i: u8) -> Color {
        if self.bitboard & (1 << i) != 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    /// Push a new piece to the top of the stack
    ///
    /// Any piece already on the stack will be flattened, including capstones
    pub fn push(&mut self, piece: Piece) {
        debug_assert!(self.height < STACK_CAPACITY, "Stack overflow: {:?}", self);
        if piece.color() == Color::Black {
            self.bitboard |= 1 << self.height;
        }
        self.top_stone = Some(piece);
        self.height += 1;
    }

    /// Remove the top piece from the stack
    ///
    /// Will not un-flatten a previously flattened stone
    pub fn pop(&mut self) -> Option<Piece> {
        let old_piece = self.top_stone?;
        self.height -= 1;
        self.bitboard &= !(1 << self.height);
        self.top_stone = if self.height > 0 {
            Some(Piece::from_role_color(
                Flat,
                self.layer_color(self.height - 1),
            ))
        } else {
            None
        };
        Some(old_piece)
    }

    /// Number of stones of the given color in the stack, including the top stone
    pub fn count_color(&self, color: Color) -> u8 {
        let black_stones = self.raw().count_ones() as u8;
        match color {
            Color::White => self.height - black_stones,
            Color::Black => black_stones,
        }
    }

    /// The packed stone colors, with no bits set above the stack's height
    pub fn raw(&self) -> u64 {
        if self.height >= 64 {
            self.bitboard
        } else {
            self.bitboard & ((1 << self.height) - 1)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    pub fn len(&self) -> u8 {
        self.height
    }
}

/// An iterator over the pieces in a stack, from the bottom up
pub struct StackIterator {
    stack: Stack,
    next: u8,
}

impl Iterator for StackIterator {
    type Item = Piece;

    fn next(&mut self) -> Option<Self::Item> {
        let piece = self.stack.get(self.next)?;
        self.next += 1;
        Some(piece)
    }
}

impl IntoIterator for Stack {
    type Item = Piece;
    type IntoIter = StackIterator;

    fn into_iter(self) -> Self::IntoIter {
        StackIterator {
            stack: self,
            next: 0,
        }
    }
}

/// One of the four cardinal directions on the board
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const fn all() -> [Direction; 4] {
        [North, East, South, West]
    }

    pub(crate) fn parse(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(North),
            '<' => Some(West),
            '>' => Some(East),
            '-' => Some(South),
            _ => None,
        }
    }

    pub(crate) fn symbol(self) -> char {
        match self {
            North => '+',
            West => '<',
            East => '>',
            South => '-',
        }
    }
}

/// One or more `Movement`s, storing how many pieces are carried into each square of a spread
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StackMovement {
    // The upper 4 bits is the number of squares moved
    // The remaining 28 bits are the number of pieces taken, 4 bits per number
    data: u32,
}

impl StackMovement {
    pub fn new() -> Self {
        StackMovement { data: 0 }
    }

    /// Build a spread from the number of stones dropped on each square
    pub fn from_drops(drops: &[u8]) -> Self {
        let mut pieces_held: u8 = drops.iter().sum();
        let mut movement = StackMovement::new();
        for drop in drops {
            movement.push(Movement {
                pieces_to_take: pieces_held,
            });
            pieces_held -= drop;
        }
        movement
    }

    pub fn get(self, index: u8) -> Movement {
        assert!((index as usize) < self.len());
        Movement {
            pieces_to_take: ((self.data >> (index * 4)) & 0b1111) as u8,
        }
    }

    pub fn push(&mut self, movement: Movement) {
        let length = self.len() as u32;
        debug_assert!(
            length < 7,
            "Stack movement cannot grow any more: {:#b}",
            self.data
        );
        debug_assert!(movement.pieces_to_take < 16);
        self.data |= (movement.pieces_to_take as u32) << (length * 4);
        self.data &= (1_u32 << 28) - 1;
        self.data |= (length + 1) << 28;
    }

    pub fn len(self) -> usize {
        (self.data >> 28) as usize
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Total number of pieces picked up from the origin square
    pub fn pieces_taken(self) -> u8 {
        if self.is_empty() {
            0
        } else {
            self.get(0).pieces_to_take
        }
    }

    /// The number of pieces dropped on each square, in order
    pub fn drops(self) -> ArrayVec<u8, 8> {
        let takes: ArrayVec<u8, 8> = self
            .into_iter()
            .map(|movement| movement.pieces_to_take)
            .collect();
        takes
            .iter()
            .enumerate()
            .map(|(i, take)| take.saturating_sub(takes.get(i + 1).copied().unwrap_or(0)))
            .collect()
    }
}

impl fmt::Debug for StackMovement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.into_iter()).finish()
    }
}

impl FromIterator<Movement> for StackMovement {
    fn from_iter<T: IntoIterator<Item = Movement>>(iter: T) -> Self {
        let mut result = StackMovement::new();
        for movement in iter {
            result.push(movement)
        }
        result
    }
}

impl IntoIterator for StackMovement {
    type Item = Movement;
    type IntoIter = StackMovementIterator;

    fn into_iter(self) -> Self::IntoIter {
        StackMovementIterator {
            num_left: self.len() as u8,
            movements: self.data,
        }
    }
}

pub struct StackMovementIterator {
    num_left: u8,
    movements: u32,
}

impl Iterator for StackMovementIterator {
    type Item = Movement;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_left == 0 {
            None
        } else {
            self.num_left -= 1;
            let result = self.movements & 0b1111;
            self.movements >>= 4;
            Some(Movement {
                pieces_to_take: result as u8,
            })
        }
    }
}

/// Moving a stack of pieces consists of one or more `Movement`s
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Movement {
    pub pieces_to_take: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AbstractBoard<T, const S: usize> {
    raw: [[T; S]; S],
}

impl<T: Default + Copy, const S: usize> Default for AbstractBoard<T, S> {
    fn default() -> Self {
        AbstractBoard {
            raw: [[T::default(); S]; S],
        }
    }
}

impl<T, const S: usize> AbstractBoard<T, S> {
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.raw.iter().flatten()
    }
}

impl<T, const S: usize> Index<Square<S>> for AbstractBoard<T, S> {
    type Output = T;

    fn index(&self, square: Square<S>) -> &Self::Output {
        &self.raw[square.rank() as usize][square.file() as usize]
    }
}

impl<T, const S: usize> IndexMut<Square<S>> for AbstractBoard<T, S> {
    fn index_mut(&mut self, square: Square<S>) -> &mut Self::Output {
        &mut self.raw[square.rank() as usize][square.file() as usize]
    }
}
