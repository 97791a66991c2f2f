use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::position::utils::Role::{Cap, Flat, Wall};
use crate::position::utils::{Direction, Role, StackMovement};
use crate::position::Square;

/// A single ply: either a placement from the reserves, or a spread of a stack.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Move<const S: usize> {
    Place(Role, Square<S>),
    Spread(Square<S>, Direction, StackMovement),
}

impl<const S: usize> Move<S> {
    pub fn origin_square(&self) -> Square<S> {
        match self {
            Move::Place(_, square) => *square,
            Move::Spread(square, _, _) => *square,
        }
    }

    /// Parse a move in standard Tak notation, such as `a1`, `Cc3` or `3b2>21`
    pub fn from_string(input: &str) -> Result<Self, pgn_traits::Error> {
        if input.len() < 2 {
            return Err(pgn_traits::Error::new(
                pgn_traits::ErrorKind::ParseError,
                "Input move too short.",
            ));
        }
        if !input.is_ascii() {
            return Err(pgn_traits::Error::new(
                pgn_traits::ErrorKind::ParseError,
                "Input move contained non-ascii characters.",
            ));
        }
        let bytes = input.as_bytes();
        match bytes[0] {
            b'a'..=b'h' if input.len() == 2 => Ok(Move::Place(Flat, Square::parse_square(input)?)),
            b'F' if input.len() == 3 => Ok(Move::Place(Flat, Square::parse_square(&input[1..])?)),
            b'C' if input.len() == 3 => Ok(Move::Place(Cap, Square::parse_square(&input[1..])?)),
            b'S' if input.len() == 3 => Ok(Move::Place(Wall, Square::parse_square(&input[1..])?)),
            b'a'..=b'h' if input.len() == 3 => {
                let square = Square::parse_square(&input[0..2])?;
                let direction = parse_direction(input, bytes[2])?;
                Ok(Move::Spread(square, direction, StackMovement::from_drops(&[1])))
            }
            b'1'..=b'8' if input.len() > 3 => {
                let pieces_taken = bytes[0] - b'0';
                if pieces_taken as usize > S {
                    return Err(pgn_traits::Error::new_parse_error(format!(
                        "{} carries too many stones for {}s",
                        input, S
                    )));
                }
                let square = Square::parse_square(&input[1..3])?;
                let direction = parse_direction(input, bytes[3])?;

                let mut drops: Vec<u8> = input[4..]
                    .chars()
                    .map(|ch| ch.to_digit(10).map(|i| i as u8))
                    .collect::<Option<Vec<u8>>>()
                    .ok_or_else(|| {
                        pgn_traits::Error::new_parse_error(format!(
                            "Couldn't parse move \"{}\": found non-integer when expecting number of pieces to drop",
                            input
                        ))
                    })?;
                if drops.is_empty() {
                    drops.push(pieces_taken);
                }
                if drops.len() >= S
                    || drops.contains(&0)
                    || drops.iter().map(|drop| *drop as u32).sum::<u32>() != pieces_taken as u32
                {
                    return Err(pgn_traits::Error::new_parse_error(format!(
                        "Couldn't parse move \"{}\": bad drop counts",
                        input
                    )));
                }
                Ok(Move::Spread(square, direction, StackMovement::from_drops(&drops)))
            }
            first_char => Err(pgn_traits::Error::new(
                pgn_traits::ErrorKind::ParseError,
                format!(
                    "Couldn't parse move \"{}\". Moves cannot start with {} and have length {}.",
                    input,
                    first_char as char,
                    input.len()
                ),
            )),
        }
    }
}

fn parse_direction(input: &str, ch: u8) -> Result<Direction, pgn_traits::Error> {
    Direction::parse(ch as char).ok_or_else(|| {
        pgn_traits::Error::new_parse_error(format!(
            "Couldn't parse move \"{}\": bad direction '{}'",
            input, ch as char
        ))
    })
}

impl<const S: usize> fmt::Display for Move<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Place(role, square) => match role {
                Cap => write!(f, "C{}", square),
                Flat => write!(f, "{}", square),
                Wall => write!(f, "S{}", square),
            },
            Move::Spread(square, direction, stack_movement) => {
                let pieces_held = stack_movement.pieces_taken();
                if pieces_held == 1 {
                    write!(f, "{}", square)?;
                } else {
                    write!(f, "{}{}", pieces_held, square)?;
                }
                write!(f, "{}", direction.symbol())?;
                // Omit number of pieces dropped, if all stones are dropped immediately
                if stack_movement.len() > 1 {
                    for drop in stack_movement.drops() {
                        write!(f, "{}", drop)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl<const S: usize> FromStr for Move<S> {
    type Err = pgn_traits::Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Move::from_string(input)
    }
}

/// The counterpart of `Move`. When applied to a `Position`, it fully reverses the accompanying `Move`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ReverseMove<const S: usize> {
    Place(Square<S>),
    /// Origin square, direction and spread of the move being reversed,
    /// and whether it flattened a wall on its last square
    Spread(Square<S>, Direction, StackMovement, bool),
}
