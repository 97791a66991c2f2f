use board_game_traits::Color;

use crate::evaluation::Evaluator;
use crate::position::bitboard::BitBoard;
use crate::position::{squares_iterator, Extent, Position, Role, Square};

/// Weights of the hand-written evaluation features, in centi-flats
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ValueWeights {
    pub flat: i32,
    pub wall: i32,
    pub cap: i32,
    /// Per step closer to the center, for road pieces
    pub center: i32,
    /// Own stones under the top stone, within the carry limit
    pub shallow_support: i32,
    /// Opponent stones under the top stone, within the carry limit
    pub shallow_captive: i32,
    /// Any stone below the carry limit
    pub deep_stone: i32,
    /// Multiplied by the square of the longest span of a connected road group
    pub group_span: i32,
    /// Per unplaced stone, weighted more heavily as the board fills up
    pub reserve: i32,
    pub side_to_move: i32,
}

impl Default for ValueWeights {
    fn default() -> Self {
        ValueWeights {
            flat: 100,
            wall: 45,
            cap: 80,
            center: 6,
            shallow_support: 20,
            shallow_captive: -5,
            deep_stone: 3,
            group_span: 12,
            reserve: -2,
            side_to_move: 40,
        }
    }
}

/// A static evaluator using material, stack composition and road progress
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ValueEvaluator {
    pub weights: ValueWeights,
}

impl ValueEvaluator {
    pub fn new(weights: ValueWeights) -> Self {
        ValueEvaluator { weights }
    }

    fn color_score<const S: usize>(&self, position: &Position<S>, color: Color) -> i32 {
        let weights = &self.weights;
        let board = position.board();
        let mut score = 0;

        for square in squares_iterator::<S>() {
            let Some(top_stone) = board.top_stone(square) else {
                continue;
            };
            if top_stone.color() != color {
                continue;
            }
            score += match top_stone.role() {
                Role::Flat => weights.flat,
                Role::Wall => weights.wall,
                Role::Cap => weights.cap,
            };
            if top_stone.is_road_piece() {
                score += weights.center * centrality::<S>(square);
            }

            let stack = board[square];
            let height = stack.len() as usize;
            for (i, piece) in stack.into_iter().enumerate().take(height - 1) {
                // Top stone has depth 1
                let depth = height - i;
                score += if depth > S + 1 {
                    weights.deep_stone
                } else if piece.color() == color {
                    weights.shallow_support
                } else {
                    weights.shallow_captive
                };
            }
        }

        score += weights.group_span * longest_group_span::<S>(board.road_pieces(color)).pow(2);

        let unplaced = position.stones_left(color) as i32 + position.caps_left(color) as i32;
        let empty_squares = (S * S) as i32 - board.occupied().count() as i32;
        score += weights.reserve * unplaced * (S * S) as i32 / (empty_squares + 1);

        score
    }
}

impl Evaluator for ValueEvaluator {
    fn evaluate<const S: usize>(&self, position: &Position<S>, player: Color) -> i32 {
        let tempo = if position.side_to_move() == player {
            self.weights.side_to_move
        } else {
            -self.weights.side_to_move
        };
        self.color_score(position, player) - self.color_score(position, !player) + tempo
    }
}

/// Number of steps from the edge, towards the center
fn centrality<const S: usize>(square: Square<S>) -> i32 {
    let edge_distance = |i: u8| i.min(S as u8 - 1 - i) as i32;
    edge_distance(square.file()) + edge_distance(square.rank())
}

/// The largest width or height of any orthogonally connected group in the set
fn longest_group_span<const S: usize>(road_pieces: BitBoard) -> i32 {
    let mut remaining = road_pieces;
    let mut longest = 0;
    while let Some(seed) = remaining.into_iter().next() {
        let group = road_pieces.flood_fill::<S>(BitBoard::empty().set(seed));
        remaining = remaining & !group;
        if let Some(extent) = Extent::of_squares::<S>(group) {
            longest = longest.max(extent.width().max(extent.height()) as i32);
        }
    }
    longest
}
