//! Tak game sessions for two remote players: board representation, rule enforcement with
//! undo/redo, a two-phase protocol for agreeing on each move, and a minimax AI.

pub mod error;
pub mod evaluation;
pub mod game;
pub mod position;
pub mod protocol;
pub mod search;

mod tests;
