use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Direction::{self, *};

/// A location on the board. Can be used to index a `Board`.
///
/// Squares are numbered rank by rank, starting with `a1` as 0, `b1` as 1 and so on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Square<const S: usize> {
    inner: u8,
}

impl<const S: usize> Square<S> {
    pub const fn from_u8(inner: u8) -> Self {
        assert!((inner as usize) < S * S);
        Square { inner }
    }

    /// Returns `None` if the coordinates are outside the board
    pub const fn try_from_file_rank(file: u8, rank: u8) -> Option<Self> {
        if file < S as u8 && rank < S as u8 {
            Some(Square {
                inner: rank * S as u8 + file,
            })
        } else {
            None
        }
    }

    pub const fn from_file_rank(file: u8, rank: u8) -> Self {
        assert!(file < S as u8 && rank < S as u8);
        Square::from_u8(rank * S as u8 + file)
    }

    pub const fn into_inner(self) -> u8 {
        self.inner
    }

    pub const fn file(self) -> u8 {
        self.inner % S as u8
    }

    pub const fn rank(self) -> u8 {
        self.inner / S as u8
    }

    pub const fn go_direction(self, direction: Direction) -> Option<Self> {
        self.jump_direction(direction, 1)
    }

    pub const fn jump_direction(self, direction: Direction, len: u8) -> Option<Self> {
        let file = self.file();
        let rank = self.rank();
        match direction {
            North => {
                if rank as usize + len as usize >= S {
                    None
                } else {
                    Some(Square::from_file_rank(file, rank + len))
                }
            }
            South => {
                if rank < len {
                    None
                } else {
                    Some(Square::from_file_rank(file, rank - len))
                }
            }
            East => {
                if file as usize + len as usize >= S {
                    None
                } else {
                    Some(Square::from_file_rank(file + len, rank))
                }
            }
            West => {
                if file < len {
                    None
                } else {
                    Some(Square::from_file_rank(file - len, rank))
                }
            }
        }
    }

    /// The direction leading from `self` to an orthogonally adjacent `other`
    pub fn direction_to(self, other: Square<S>) -> Option<Direction> {
        Direction::all()
            .into_iter()
            .find(|direction| self.go_direction(*direction) == Some(other))
    }

    pub fn neighbors(self) -> impl Iterator<Item = Square<S>> {
        Direction::all()
            .into_iter()
            .filter_map(move |direction| self.go_direction(direction))
    }

    pub fn parse_square(input: &str) -> Result<Square<S>, pgn_traits::Error> {
        let mut chars = input.chars();
        let (Some(file_char), Some(rank_char), None) = (chars.next(), chars.next(), chars.next())
        else {
            return Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse square \"{}\"",
                input
            )));
        };
        let file = (file_char as u32).wrapping_sub('a' as u32);
        let rank = (rank_char as u32).wrapping_sub('1' as u32);
        if file >= S as u32 || rank >= S as u32 {
            Err(pgn_traits::Error::new_parse_error(format!(
                "Couldn't parse square \"{}\" at size {}",
                input, S
            )))
        } else {
            Ok(Square::from_file_rank(file as u8, rank as u8))
        }
    }
}

impl<const S: usize> fmt::Display for Square<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", (self.file() + b'a') as char)?;
        write!(f, "{}", self.rank() + 1)
    }
}

/// Iterates over all board squares.
pub fn squares_iterator<const S: usize>() -> impl Iterator<Item = Square<S>> {
    (0..(S * S) as u8).map(Square::from_u8)
}
