//! Static evaluation of positions, used at the leaves of the search.

use board_game_traits::{Color, GameResult};

use crate::position::Position;

pub use value_eval::{ValueEvaluator, ValueWeights};

mod value_eval;

/// Score of a won position. Only terminal positions reach this score.
pub const WIN_SCORE: i32 = i32::MAX - 1;
/// Score of a lost position. Only terminal positions reach this score.
pub const LOSS_SCORE: i32 = i32::MIN + 1;
pub const DRAW_SCORE: i32 = 0;

/// Scores a position from the perspective of one player. Larger is better for `player`.
///
/// Evaluators are plugged into the search as a type parameter, so they need to be `Sync`
/// to be shared between search threads.
pub trait Evaluator: Sync {
    fn evaluate<const S: usize>(&self, position: &Position<S>, player: Color) -> i32;
}

/// Keeps a static score strictly between the scores of decided games
pub fn clamp_score(score: i32) -> i32 {
    score.clamp(LOSS_SCORE + 1, WIN_SCORE - 1)
}

/// Score of a finished game, from `player`'s perspective
pub fn terminal_score(result: GameResult, player: Color) -> i32 {
    match (result, player) {
        (GameResult::Draw, _) => DRAW_SCORE,
        (GameResult::WhiteWin, Color::White) | (GameResult::BlackWin, Color::Black) => WIN_SCORE,
        (GameResult::WhiteWin, Color::Black) | (GameResult::BlackWin, Color::White) => LOSS_SCORE,
    }
}

/// The score the search assigns to a position with no further lookahead
pub fn leaf_score<E: Evaluator, const S: usize>(
    evaluator: &E,
    position: &Position<S>,
    player: Color,
) -> i32 {
    match position.game_result() {
        Some(result) => terminal_score(result, player),
        None => clamp_score(evaluator.evaluate(position, player)),
    }
}
