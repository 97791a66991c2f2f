use board_game_traits::Color;
use thiserror::Error;

use crate::position::Role;

/// An action that breaks the rules of Tak, or that does not fit the game's current state.
/// No state is changed when one of these is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidMove {
    #[error("the game is already over")]
    GameOver,
    #[error("it is {0:?}'s turn")]
    NotYourTurn(Color),
    #[error("no {0:?} stones left in reserve")]
    NoReserve(Role),
    #[error("square is already occupied")]
    Occupied,
    #[error("only flats may be placed during the first two plies")]
    OpeningRequiresFlat,
    #[error("stacks cannot be moved during the first two plies")]
    NoSpreadsInOpening,
    #[error("square is empty")]
    EmptySquare,
    #[error("the stack is not controlled by the player to move")]
    NotYourStack,
    #[error("cannot carry {taken} stones, the limit is {limit}")]
    CarryLimit { taken: u8, limit: u8 },
    #[error("every drop must leave at least one stone")]
    EmptyDrop,
    #[error("a spread must continue in a straight line to an adjacent square")]
    BadDirection,
    #[error("the spread runs off the board")]
    OffBoard,
    #[error("the spread is blocked by a wall or capstone")]
    Blocked,
    #[error("the stack would exceed the maximum height")]
    StackTooTall,
    #[error("a stone or stack is already in hand")]
    HandOccupied,
    #[error("nothing is in hand")]
    EmptyHand,
    #[error("the drawn stone is a {drawn:?}, not a {placed:?}")]
    DrawnStoneMismatch { drawn: Role, placed: Role },
    #[error("an unfinished move must be completed or aborted first")]
    MoveInProgress,
    #[error("there is no move to undo")]
    NothingToUndo,
    #[error("there is no move to redo")]
    NothingToRedo,
}

/// The two sides of the move protocol disagree about what is pending
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolDesync {
    #[error("a move is already pending")]
    AlreadyInitiated,
    #[error("no move is pending")]
    NothingPending,
    #[error("the completed action does not match the pending one")]
    Mismatch,
    #[error("immediate actions are not allowed while a move is pending")]
    MovePending,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    InvalidMove(#[from] InvalidMove),
    #[error(transparent)]
    ProtocolDesync(#[from] ProtocolDesync),
}
