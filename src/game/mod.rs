//! A game session: the position plus move history, built up from the granular actions a player
//! performs with their hands (drawing a stone, placing it, grabbing a stack and dropping it
//! square by square). Every mutator validates first, and changes nothing if validation fails.

use board_game_traits::Color;
use log::{debug, info};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use history::MoveHistory;

use crate::error::InvalidMove;
use crate::position::{
    Direction, GameOutcome, Move, Movement, Position, Role, Square, StackMovement, WinType,
};

mod history;

/// One step of building a move
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Action<const S: usize> {
    /// Take a stone of the given role from the reserve, to be placed afterwards
    DrawStone(Role),
    /// Put a drawn stone back in the reserve
    ReturnStone,
    PlaceStone(Square<S>, Role),
    /// Pick up the given number of stones from the top of a stack
    GrabStack(Square<S>, u8),
    /// Drop the given number of carried stones on the next square of a spread
    DropStack(Square<S>, u8),
}

/// A stack picked up, but not yet fully dropped
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Carry<const S: usize> {
    pub origin: Square<S>,
    /// The last square stones were dropped on, or the origin
    pub last: Square<S>,
    /// Decided by the first drop
    pub direction: Option<Direction>,
    pub held: u8,
    pub top_role: Role,
    movement: StackMovement,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Hand<const S: usize> {
    #[default]
    Empty,
    Drawn(Role),
    Carrying(Carry<S>),
}

#[derive(Clone, Debug, Default)]
pub struct Game<const S: usize> {
    position: Position<S>,
    history: MoveHistory<S>,
    hand: Hand<S>,
    resigned: Option<Color>,
}

impl<const S: usize> Game<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replays a game from its moves
    pub fn from_moves<I: IntoIterator<Item = Move<S>>>(moves: I) -> Result<Self, InvalidMove> {
        let mut game = Game::new();
        for mv in moves {
            game.play_move(game.side_to_move(), mv)?;
        }
        Ok(game)
    }

    pub fn position(&self) -> &Position<S> {
        &self.position
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    pub fn hand(&self) -> &Hand<S> {
        &self.hand
    }

    pub fn history(&self) -> &MoveHistory<S> {
        &self.history
    }

    /// The moves played so far, not including undone moves
    pub fn moves(&self) -> Vec<Move<S>> {
        self.history.moves().cloned().collect()
    }

    pub fn outcome(&self) -> GameOutcome {
        match self.resigned {
            Some(loser) => self
                .position
                .outcome_with_winner(WinType::Resignation, Some(!loser)),
            None => self.position.outcome(),
        }
    }

    pub fn is_over(&self) -> bool {
        self.resigned.is_some() || self.position.game_result().is_some()
    }

    fn check_actor(&self, player: Color) -> Result<(), InvalidMove> {
        if self.is_over() {
            Err(InvalidMove::GameOver)
        } else if player != self.side_to_move() {
            Err(InvalidMove::NotYourTurn(self.side_to_move()))
        } else {
            Ok(())
        }
    }

    fn logged<T>(&self, player: Color, result: Result<T, InvalidMove>) -> Result<T, InvalidMove> {
        if let Err(err) = &result {
            debug!("Rejected action by {:?}: {}", player, err);
        }
        result
    }

    /// Commits a complete ply
    fn commit(&mut self, mv: Move<S>) {
        debug!("{:?} plays {}", self.side_to_move(), mv);
        let reverse_move = self.position.do_move(mv.clone());
        self.history.push(mv, reverse_move);
        self.hand = Hand::Empty;
        let outcome = self.position.outcome();
        if outcome.is_over() {
            info!(
                "Game over after {} plies: {:?}, winner {:?}",
                self.history.len(),
                outcome.win_type,
                outcome.winner
            );
        }
    }

    pub fn can_play_move(&self, player: Color, mv: &Move<S>) -> bool {
        self.check_play_move(player, mv).is_ok()
    }

    pub fn check_play_move(&self, player: Color, mv: &Move<S>) -> Result<(), InvalidMove> {
        self.check_actor(player)?;
        if self.hand != Hand::Empty {
            return Err(InvalidMove::MoveInProgress);
        }
        self.position.check_move(mv)
    }

    /// Plays a whole ply at once
    pub fn play_move(&mut self, player: Color, mv: Move<S>) -> Result<(), InvalidMove> {
        let result = self.check_play_move(player, &mv);
        self.logged(player, result)?;
        self.commit(mv);
        Ok(())
    }

    pub fn can_draw_stone(&self, player: Color, role: Role) -> bool {
        self.check_draw_stone(player, role).is_ok()
    }

    fn check_draw_stone(&self, player: Color, role: Role) -> Result<(), InvalidMove> {
        self.check_actor(player)?;
        if self.hand != Hand::Empty {
            return Err(InvalidMove::HandOccupied);
        }
        if self.position.is_opening() && role != Role::Flat {
            return Err(InvalidMove::OpeningRequiresFlat);
        }
        if self
            .position
            .reserve_left(self.position.color_to_place(), role)
            == 0
        {
            return Err(InvalidMove::NoReserve(role));
        }
        Ok(())
    }

    pub fn draw_stone(&mut self, player: Color, role: Role) -> Result<(), InvalidMove> {
        let result = self.check_draw_stone(player, role);
        self.logged(player, result)?;
        self.hand = Hand::Drawn(role);
        Ok(())
    }

    pub fn can_return_stone(&self, player: Color) -> bool {
        self.check_return_stone(player).is_ok()
    }

    fn check_return_stone(&self, player: Color) -> Result<(), InvalidMove> {
        self.check_actor(player)?;
        match self.hand {
            Hand::Drawn(_) => Ok(()),
            _ => Err(InvalidMove::EmptyHand),
        }
    }

    pub fn return_stone(&mut self, player: Color) -> Result<(), InvalidMove> {
        let result = self.check_return_stone(player);
        self.logged(player, result)?;
        self.hand = Hand::Empty;
        Ok(())
    }

    pub fn can_place_stone(&self, player: Color, square: Square<S>, role: Role) -> bool {
        self.check_place_stone(player, square, role).is_ok()
    }

    fn check_place_stone(
        &self,
        player: Color,
        square: Square<S>,
        role: Role,
    ) -> Result<(), InvalidMove> {
        self.check_actor(player)?;
        match self.hand {
            Hand::Carrying(_) => return Err(InvalidMove::HandOccupied),
            Hand::Drawn(drawn) if drawn != role => {
                return Err(InvalidMove::DrawnStoneMismatch {
                    drawn,
                    placed: role,
                })
            }
            _ => (),
        }
        self.position.check_place(role, square)
    }

    /// Places a stone, either one drawn earlier or straight from the reserve
    pub fn place_stone(
        &mut self,
        player: Color,
        square: Square<S>,
        role: Role,
    ) -> Result<(), InvalidMove> {
        let result = self.check_place_stone(player, square, role);
        self.logged(player, result)?;
        self.commit(Move::Place(role, square));
        Ok(())
    }

    pub fn can_grab_stack(&self, player: Color, square: Square<S>, count: u8) -> bool {
        self.check_grab_stack(player, square, count).is_ok()
    }

    fn check_grab_stack(
        &self,
        player: Color,
        square: Square<S>,
        count: u8,
    ) -> Result<Role, InvalidMove> {
        self.check_actor(player)?;
        if self.hand != Hand::Empty {
            return Err(InvalidMove::HandOccupied);
        }
        self.position.check_grab(square, count)?;
        self.position
            .board()
            .top_role(square)
            .ok_or(InvalidMove::EmptySquare)
    }

    pub fn grab_stack(
        &mut self,
        player: Color,
        square: Square<S>,
        count: u8,
    ) -> Result<(), InvalidMove> {
        let result = self.check_grab_stack(player, square, count);
        let top_role = self.logged(player, result)?;
        self.hand = Hand::Carrying(Carry {
            origin: square,
            last: square,
            direction: None,
            held: count,
            top_role,
            movement: StackMovement::new(),
        });
        Ok(())
    }

    pub fn can_drop_stack(&self, player: Color, square: Square<S>, count: u8) -> bool {
        self.check_drop_stack(player, square, count).is_ok()
    }

    /// Validates a drop, returning the carry as it would be afterwards
    fn check_drop_stack(
        &self,
        player: Color,
        square: Square<S>,
        count: u8,
    ) -> Result<Carry<S>, InvalidMove> {
        self.check_actor(player)?;
        let Hand::Carrying(carry) = self.hand else {
            return Err(InvalidMove::EmptyHand);
        };
        let direction = carry
            .last
            .direction_to(square)
            .ok_or(InvalidMove::BadDirection)?;
        if carry.direction.is_some_and(|previous| previous != direction) {
            return Err(InvalidMove::BadDirection);
        }
        if count == 0 {
            return Err(InvalidMove::EmptyDrop);
        }
        if count > carry.held {
            return Err(InvalidMove::CarryLimit {
                taken: count,
                limit: carry.held,
            });
        }
        self.position
            .check_drop_target(square, carry.held, count, carry.top_role)?;

        let held = carry.held - count;
        if held > 0 && square.go_direction(direction).is_none() {
            return Err(InvalidMove::OffBoard);
        }
        let mut movement = carry.movement;
        movement.push(Movement {
            pieces_to_take: carry.held,
        });
        let next = Carry {
            last: square,
            direction: Some(direction),
            held,
            movement,
            ..carry
        };
        if held == 0 {
            self.position
                .check_move(&Move::Spread(carry.origin, direction, movement))?;
        }
        Ok(next)
    }

    /// Drops stones from the carried stack. Dropping the last stone completes the ply.
    pub fn drop_stack(
        &mut self,
        player: Color,
        square: Square<S>,
        count: u8,
    ) -> Result<(), InvalidMove> {
        let result = self.check_drop_stack(player, square, count);
        let carry = self.logged(player, result)?;
        match (carry.held, carry.direction) {
            (0, Some(direction)) => {
                self.commit(Move::Spread(carry.origin, direction, carry.movement))
            }
            _ => self.hand = Hand::Carrying(carry),
        }
        Ok(())
    }

    pub fn can_abort_move(&self, player: Color) -> bool {
        self.check_abort_move(player).is_ok()
    }

    fn check_abort_move(&self, player: Color) -> Result<(), InvalidMove> {
        self.check_actor(player)?;
        if self.hand == Hand::Empty {
            return Err(InvalidMove::EmptyHand);
        }
        Ok(())
    }

    /// Puts back whatever is in hand. The board was never changed by an unfinished move.
    pub fn abort_move(&mut self, player: Color) -> Result<(), InvalidMove> {
        let result = self.check_abort_move(player);
        self.logged(player, result)?;
        self.hand = Hand::Empty;
        Ok(())
    }

    pub fn can_undo_move(&self) -> bool {
        self.check_undo_move().is_ok()
    }

    pub(crate) fn check_undo_move(&self) -> Result<(), InvalidMove> {
        if self.resigned.is_some() {
            return Err(InvalidMove::GameOver);
        }
        if self.hand != Hand::Empty {
            return Err(InvalidMove::MoveInProgress);
        }
        if !self.history.can_undo() {
            return Err(InvalidMove::NothingToUndo);
        }
        Ok(())
    }

    pub fn undo_move(&mut self) -> Result<(), InvalidMove> {
        self.check_undo_move()?;
        let reverse_move = self.history.undo().ok_or(InvalidMove::NothingToUndo)?;
        self.position.reverse_move(reverse_move);
        debug!("Took back a move, {:?} to move", self.side_to_move());
        Ok(())
    }

    pub fn can_redo_move(&self) -> bool {
        self.check_redo_move().is_ok()
    }

    pub(crate) fn check_redo_move(&self) -> Result<&Move<S>, InvalidMove> {
        if self.is_over() {
            return Err(InvalidMove::GameOver);
        }
        if self.hand != Hand::Empty {
            return Err(InvalidMove::MoveInProgress);
        }
        let mv = self.history.next_redo().ok_or(InvalidMove::NothingToRedo)?;
        self.position.check_move(mv)?;
        Ok(mv)
    }

    pub fn redo_move(&mut self) -> Result<(), InvalidMove> {
        let mv = self.check_redo_move()?.clone();
        debug!("{:?} replays {}", self.side_to_move(), mv);
        let reverse_move = self.position.do_move(mv);
        self.history.redo(reverse_move);
        Ok(())
    }

    /// Ends the game, with the opponent of `player` as the winner
    pub fn resign(&mut self, player: Color) -> Result<(), InvalidMove> {
        if self.is_over() {
            return Err(InvalidMove::GameOver);
        }
        info!("{:?} resigns", player);
        self.resigned = Some(player);
        self.hand = Hand::Empty;
        Ok(())
    }

    pub fn can_do_action(&self, player: Color, action: Action<S>) -> bool {
        match action {
            Action::DrawStone(role) => self.can_draw_stone(player, role),
            Action::ReturnStone => self.can_return_stone(player),
            Action::PlaceStone(square, role) => self.can_place_stone(player, square, role),
            Action::GrabStack(square, count) => self.can_grab_stack(player, square, count),
            Action::DropStack(square, count) => self.can_drop_stack(player, square, count),
        }
    }

    pub fn do_action(&mut self, player: Color, action: Action<S>) -> Result<(), InvalidMove> {
        match action {
            Action::DrawStone(role) => self.draw_stone(player, role),
            Action::ReturnStone => self.return_stone(player),
            Action::PlaceStone(square, role) => self.place_stone(player, square, role),
            Action::GrabStack(square, count) => self.grab_stack(player, square, count),
            Action::DropStack(square, count) => self.drop_stack(player, square, count),
        }
    }
}
