//! Tak rules at the ply level: legal move generation, move validation,
//! applying and reversing moves, and deciding the result.

use std::fmt;

use arrayvec::ArrayVec;
use board_game_traits::{Color, GameResult};

pub use bitboard::BitBoard;
pub use board::Board;
pub use mv::{Move, ReverseMove};
pub use outcome::{Extent, GameOutcome, WinType};
pub use square::{squares_iterator, Square};
pub use utils::{
    AbstractBoard, Direction, Movement, Piece, Role, Stack, StackMovement, STACK_CAPACITY,
};

use crate::error::InvalidMove;
use utils::Role::{Cap, Flat, Wall};

pub mod bitboard;
pub mod board;
mod mv;
mod outcome;
mod square;
pub mod utils;

pub const MIN_BOARD_SIZE: usize = 3;
pub const MAX_BOARD_SIZE: usize = 8;

pub const fn starting_stones<const S: usize>() -> u8 {
    match S {
        3 => 10,
        4 => 15,
        5 => 21,
        6 => 30,
        7 => 40,
        8 => 50,
        _ => 0,
    }
}

pub const fn starting_capstones<const S: usize>() -> u8 {
    match S {
        3 => 0,
        4 => 0,
        5 => 1,
        6 => 1,
        7 => 2,
        8 => 2,
        _ => 0,
    }
}

/// Complete position of a game of Tak: the board, the reserves and the side to move.
#[derive(Clone, PartialEq, Eq)]
pub struct Position<const S: usize> {
    board: Board<S>,
    to_move: Color,
    white_stones_left: u8,
    black_stones_left: u8,
    white_caps_left: u8,
    black_caps_left: u8,
    half_moves_played: usize,
}

impl<const S: usize> Default for Position<S> {
    fn default() -> Self {
        Self::start_position()
    }
}

impl<const S: usize> Position<S> {
    pub fn start_position() -> Self {
        debug_assert!((MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&S));
        Position {
            board: Board::default(),
            to_move: Color::White,
            white_stones_left: starting_stones::<S>(),
            black_stones_left: starting_stones::<S>(),
            white_caps_left: starting_capstones::<S>(),
            black_caps_left: starting_capstones::<S>(),
            half_moves_played: 0,
        }
    }

    pub fn board(&self) -> &Board<S> {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.to_move
    }

    pub fn half_moves_played(&self) -> usize {
        self.half_moves_played
    }

    /// During the first two plies, each player places a flat of the opponent's color
    pub fn is_opening(&self) -> bool {
        self.half_moves_played < 2
    }

    /// The color of any stone placed this ply
    pub fn color_to_place(&self) -> Color {
        if self.is_opening() {
            !self.to_move
        } else {
            self.to_move
        }
    }

    pub fn stones_left(&self, color: Color) -> u8 {
        match color {
            Color::White => self.white_stones_left,
            Color::Black => self.black_stones_left,
        }
    }

    pub fn caps_left(&self, color: Color) -> u8 {
        match color {
            Color::White => self.white_caps_left,
            Color::Black => self.black_caps_left,
        }
    }

    /// Number of stones of this role still available to the given color
    pub fn reserve_left(&self, color: Color, role: Role) -> u8 {
        match role {
            Flat | Wall => self.stones_left(color),
            Cap => self.caps_left(color),
        }
    }

    fn reserve_mut(&mut self, color: Color, role: Role) -> &mut u8 {
        match (color, role) {
            (Color::White, Flat | Wall) => &mut self.white_stones_left,
            (Color::White, Cap) => &mut self.white_caps_left,
            (Color::Black, Flat | Wall) => &mut self.black_stones_left,
            (Color::Black, Cap) => &mut self.black_caps_left,
        }
    }

    /// Number of stones on the board plus the reserves of both players. Never changes during a game.
    pub fn total_stones(&self) -> usize {
        self.board.stone_count()
            + [Color::White, Color::Black]
                .iter()
                .map(|color| (self.stones_left(*color) + self.caps_left(*color)) as usize)
                .sum::<usize>()
    }

    /// The maximum number of stones that can be picked up from a stack
    pub fn carry_limit(&self, square: Square<S>) -> u8 {
        self.board.height(square).min(S as u8)
    }

    /// Checks whether placing a stone from the reserves is legal
    pub fn check_place(&self, role: Role, square: Square<S>) -> Result<(), InvalidMove> {
        if self.game_result().is_some() {
            return Err(InvalidMove::GameOver);
        }
        if self.is_opening() && role != Flat {
            return Err(InvalidMove::OpeningRequiresFlat);
        }
        if self.reserve_left(self.color_to_place(), role) == 0 {
            return Err(InvalidMove::NoReserve(role));
        }
        if self.board.height(square) > 0 {
            return Err(InvalidMove::Occupied);
        }
        Ok(())
    }

    /// Checks whether the side to move may pick up `count` stones from the square
    pub fn check_grab(&self, square: Square<S>, count: u8) -> Result<(), InvalidMove> {
        if self.game_result().is_some() {
            return Err(InvalidMove::GameOver);
        }
        if self.is_opening() {
            return Err(InvalidMove::NoSpreadsInOpening);
        }
        match self.board.top_color(square) {
            None => return Err(InvalidMove::EmptySquare),
            Some(color) if color != self.to_move => return Err(InvalidMove::NotYourStack),
            Some(_) => (),
        }
        let limit = self.carry_limit(square);
        if count == 0 || count > limit {
            return Err(InvalidMove::CarryLimit {
                taken: count,
                limit,
            });
        }
        Ok(())
    }

    /// Checks whether `dropped` of the `arriving` stones carried onto `square` may be left there.
    /// `top_role` is the role of the carried stack's top stone.
    pub(crate) fn check_drop_target(
        &self,
        square: Square<S>,
        arriving: u8,
        dropped: u8,
        top_role: Role,
    ) -> Result<(), InvalidMove> {
        let is_last_drop = arriving == dropped;
        match self.board.top_role(square) {
            Some(Cap) => return Err(InvalidMove::Blocked),
            Some(Wall) if !(is_last_drop && arriving == 1 && top_role == Cap) => {
                return Err(InvalidMove::Blocked)
            }
            _ => (),
        }
        if self.board.height(square) as u16 + dropped as u16 > STACK_CAPACITY as u16 {
            return Err(InvalidMove::StackTooTall);
        }
        Ok(())
    }

    /// Fully validates a move for the side to move, without changing anything
    pub fn check_move(&self, mv: &Move<S>) -> Result<(), InvalidMove> {
        match mv {
            Move::Place(role, square) => self.check_place(*role, *square),
            Move::Spread(origin, direction, stack_movement) => {
                if stack_movement.is_empty() || stack_movement.len() >= S {
                    return Err(InvalidMove::OffBoard);
                }
                self.check_grab(*origin, stack_movement.pieces_taken())?;
                let top_role = self.board.top_role(*origin).ok_or(InvalidMove::EmptySquare)?;

                let drops = stack_movement.drops();
                let mut square = *origin;
                for (i, drop) in drops.iter().enumerate() {
                    if *drop == 0 {
                        return Err(InvalidMove::EmptyDrop);
                    }
                    square = square
                        .go_direction(*direction)
                        .ok_or(InvalidMove::OffBoard)?;
                    let arriving = stack_movement.get(i as u8).pieces_to_take;
                    self.check_drop_target(square, arriving, *drop, top_role)?;
                }
                Ok(())
            }
        }
    }

    /// Adds all legal moves to the provided vector.
    ///
    /// Suicide moves are legal, and are generated like any other move.
    /// This includes moves that complete a road for the opponent without creating an own road.
    pub fn generate_moves(&self, moves: &mut Vec<Move<S>>) {
        if self.is_opening() {
            for square in squares_iterator::<S>() {
                if self.board.height(square) == 0 {
                    moves.push(Move::Place(Flat, square));
                }
            }
            return;
        }

        let color = self.to_move;
        for square in squares_iterator::<S>() {
            if self.board.height(square) > 0 {
                continue;
            }
            if self.stones_left(color) > 0 {
                moves.push(Move::Place(Flat, square));
                moves.push(Move::Place(Wall, square));
            }
            if self.caps_left(color) > 0 {
                moves.push(Move::Place(Cap, square));
            }
        }

        for square in squares_iterator::<S>() {
            let Some(top_stone) = self.board.top_stone(square) else {
                continue;
            };
            if top_stone.color() != color {
                continue;
            }
            for direction in Direction::all() {
                for pieces_taken in 1..=self.carry_limit(square) {
                    self.generate_spreads(
                        square,
                        direction,
                        square,
                        pieces_taken,
                        top_stone.role(),
                        StackMovement::new(),
                        moves,
                    );
                }
            }
        }
    }

    /// Generates every spread that continues from `square` while carrying `pieces_held` stones
    #[allow(clippy::too_many_arguments)]
    fn generate_spreads(
        &self,
        origin: Square<S>,
        direction: Direction,
        square: Square<S>,
        pieces_held: u8,
        top_role: Role,
        partial: StackMovement,
        moves: &mut Vec<Move<S>>,
    ) {
        let Some(next) = square.go_direction(direction) else {
            return;
        };
        let height = self.board.height(next) as u16;
        let mut movement = partial;
        movement.push(Movement {
            pieces_to_take: pieces_held,
        });
        match self.board.top_role(next) {
            Some(Cap) => (),
            Some(Wall) => {
                if top_role == Cap && pieces_held == 1 && height < STACK_CAPACITY as u16 {
                    moves.push(Move::Spread(origin, direction, movement));
                }
            }
            _ => {
                if height + pieces_held as u16 <= STACK_CAPACITY as u16 {
                    moves.push(Move::Spread(origin, direction, movement));
                }
                for dropped in 1..pieces_held {
                    if height + dropped as u16 <= STACK_CAPACITY as u16 {
                        self.generate_spreads(
                            origin,
                            direction,
                            next,
                            pieces_held - dropped,
                            top_role,
                            movement,
                            moves,
                        );
                    }
                }
            }
        }
    }

    /// Applies a legal move. The move must have been validated by `check_move`, or generated by `generate_moves`.
    pub fn do_move(&mut self, mv: Move<S>) -> ReverseMove<S> {
        let reverse_move = match mv {
            Move::Place(role, square) => {
                debug_assert_eq!(self.board.height(square), 0);
                let color = self.color_to_place();
                let reserve = self.reserve_mut(color, role);
                debug_assert!(*reserve > 0);
                *reserve = reserve.saturating_sub(1);
                self.board.place(square, role, color);
                ReverseMove::Place(square)
            }
            Move::Spread(origin, direction, stack_movement) => {
                let mut carried: ArrayVec<Piece, { MAX_BOARD_SIZE }> = ArrayVec::new();
                for _ in 0..stack_movement.pieces_taken() {
                    if let Some(piece) = self.board.remove(origin) {
                        carried.push(piece);
                    }
                }
                // Bottom stone first
                carried.reverse();

                let mut carried = carried.into_iter();
                let mut square = origin;
                let mut flattens_wall = false;
                for drop in stack_movement.drops() {
                    let Some(next) = square.go_direction(direction) else {
                        break;
                    };
                    square = next;
                    if self.board.top_role(square) == Some(Wall) {
                        flattens_wall = true;
                    }
                    for piece in carried.by_ref().take(drop as usize) {
                        self.board.place(square, piece.role(), piece.color());
                    }
                }
                ReverseMove::Spread(origin, direction, stack_movement, flattens_wall)
            }
        };

        debug_assert_eq!(
            self.total_stones(),
            2 * (starting_stones::<S>() + starting_capstones::<S>()) as usize,
            "Wrong number of stones on board:\n{:?}",
            self
        );

        self.half_moves_played += 1;
        self.to_move = !self.to_move;
        reverse_move
    }

    pub fn reverse_move(&mut self, reverse_move: ReverseMove<S>) {
        match reverse_move {
            ReverseMove::Place(square) => {
                if let Some(piece) = self.board.remove(square) {
                    *self.reserve_mut(piece.color(), piece.role()) += 1;
                }
            }
            ReverseMove::Spread(origin, direction, stack_movement, flattens_wall) => {
                let drops = stack_movement.drops();
                let squares: ArrayVec<Square<S>, { MAX_BOARD_SIZE }> = (1..=drops.len() as u8)
                    .filter_map(|len| origin.jump_direction(direction, len))
                    .collect();

                // Collected top stone first
                let mut carried: ArrayVec<Piece, { MAX_BOARD_SIZE }> = ArrayVec::new();
                for (square, drop) in squares.iter().zip(drops.iter()).rev() {
                    for _ in 0..*drop {
                        if let Some(piece) = self.board.remove(*square) {
                            carried.push(piece);
                        }
                    }
                }
                if flattens_wall {
                    if let Some(last) = squares.last() {
                        if let Some(flattened) = self.board.remove(*last) {
                            self.board.place(*last, Wall, flattened.color());
                        }
                    }
                }
                for piece in carried.into_iter().rev() {
                    self.board.place(origin, piece.role(), piece.color());
                }
            }
        }
        self.half_moves_played -= 1;
        self.to_move = !self.to_move;
    }

    /// The result and how it came about, or `None` if the game is still in progress
    fn decided(&self) -> Option<(GameResult, WinType)> {
        // The player who just moved wins if both colors have a road
        let last_mover = !self.to_move;
        for color in [last_mover, self.to_move] {
            if self.board.has_road(color) {
                return Some((GameResult::win_by(color), WinType::Road));
            }
        }

        let reserves_exhausted = [Color::White, Color::Black]
            .iter()
            .any(|color| self.stones_left(*color) == 0 && self.caps_left(*color) == 0);

        if reserves_exhausted || self.board.is_full() {
            let white_flats = self.board.flat_count(Color::White);
            let black_flats = self.board.flat_count(Color::Black);
            return Some(match white_flats.cmp(&black_flats) {
                std::cmp::Ordering::Greater => (GameResult::WhiteWin, WinType::Flat),
                std::cmp::Ordering::Less => (GameResult::BlackWin, WinType::Flat),
                std::cmp::Ordering::Equal => (GameResult::Draw, WinType::Draw),
            });
        }
        None
    }

    pub fn game_result(&self) -> Option<GameResult> {
        self.decided().map(|(result, _)| result)
    }

    pub fn outcome(&self) -> GameOutcome {
        let (win_type, winner) = match self.decided() {
            None => (WinType::None, None),
            Some((GameResult::WhiteWin, win_type)) => (win_type, Some(Color::White)),
            Some((GameResult::BlackWin, win_type)) => (win_type, Some(Color::Black)),
            Some((GameResult::Draw, win_type)) => (win_type, None),
        };
        self.outcome_with_winner(win_type, winner)
    }

    /// Builds an outcome, filling in the extents and the score for `winner`
    pub(crate) fn outcome_with_winner(
        &self,
        win_type: WinType,
        winner: Option<Color>,
    ) -> GameOutcome {
        let score = match winner {
            Some(color) => {
                (S * S) as u32 + self.stones_left(color) as u32 + self.caps_left(color) as u32
            }
            None => 0,
        };
        GameOutcome {
            win_type,
            winner,
            extents: [
                Extent::of_squares::<S>(self.board.road_pieces(Color::White)),
                Extent::of_squares::<S>(self.board.road_pieces(Color::Black)),
            ],
            score,
        }
    }

    /// Counts the leaf nodes of the move tree, to the given depth.
    /// Move generation continues past finished games.
    pub fn perft(&mut self, depth: u16) -> u64 {
        if depth == 0 {
            return 1;
        }
        let mut moves = vec![];
        self.generate_moves(&mut moves);
        if depth == 1 {
            return moves.len() as u64;
        }
        moves
            .into_iter()
            .map(|mv| {
                let reverse_move = self.do_move(mv);
                let num_moves = self.perft(depth - 1);
                self.reverse_move(reverse_move);
                num_moves
            })
            .sum()
    }
}

/// Helper for declaring the winner of a decided game
trait WinBy {
    fn win_by(color: Color) -> Self;
}

impl WinBy for GameResult {
    fn win_by(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWin,
            Color::Black => GameResult::BlackWin,
        }
    }
}

impl<const S: usize> fmt::Debug for Position<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.board)?;
        writeln!(
            f,
            "Stones left: {}/{}.",
            self.white_stones_left, self.black_stones_left
        )?;
        writeln!(
            f,
            "Capstones left: {}/{}.",
            self.white_caps_left, self.black_caps_left
        )?;
        writeln!(f, "{:?} to move.", self.to_move)
    }
}
