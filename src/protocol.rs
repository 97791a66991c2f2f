//! Two-phase move protocol, keeping two participants' copies of a game in sync.
//!
//! A move is first initiated, which only records it as pending. It is then either completed,
//! which applies it to the game, or aborted, which discards it. At most one move is pending at
//! any time. How long a move may stay pending is up to the caller: the duration is only recorded.

use std::time::Duration;

use board_game_traits::Color;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GameError, InvalidMove, ProtocolDesync};
use crate::game::{Action, Game};
use crate::position::{Move, Role, Square};

/// The payload of a two-phase move
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProtocolAction<const S: usize> {
    Move(Move<S>),
    Undo,
    Redo,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PendingMove<const S: usize> {
    pub player: Color,
    pub action: ProtocolAction<S>,
    pub initiated_at: DateTime<Utc>,
    pub duration: Duration,
}

impl<const S: usize> PendingMove<S> {
    /// When the advisory duration runs out
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        chrono::Duration::from_std(self.duration)
            .ok()
            .and_then(|duration| self.initiated_at.checked_add_signed(duration))
    }
}

#[derive(Clone, Debug, Default)]
pub struct MoveProtocol<const S: usize> {
    game: Game<S>,
    pending: Option<PendingMove<S>>,
}

impl<const S: usize> MoveProtocol<S> {
    pub fn new(game: Game<S>) -> Self {
        MoveProtocol {
            game,
            pending: None,
        }
    }

    pub fn game(&self) -> &Game<S> {
        &self.game
    }

    pub fn into_game(self) -> Game<S> {
        self.game
    }

    pub fn pending(&self) -> Option<&PendingMove<S>> {
        self.pending.as_ref()
    }

    fn check_action(&self, player: Color, action: &ProtocolAction<S>) -> Result<(), InvalidMove> {
        match action {
            ProtocolAction::Move(mv) => self.game.check_play_move(player, mv),
            ProtocolAction::Undo => self.game.check_undo_move(),
            ProtocolAction::Redo => self.game.check_redo_move().map(|_| ()),
        }
    }

    pub fn can_initiate(&self, player: Color, action: &ProtocolAction<S>) -> bool {
        self.pending.is_none() && self.check_action(player, action).is_ok()
    }

    /// Records a move as pending, without applying it
    pub fn initiate(
        &mut self,
        player: Color,
        action: ProtocolAction<S>,
        duration: Duration,
    ) -> Result<&PendingMove<S>, GameError> {
        if let Some(pending) = &self.pending {
            warn!(
                "{:?} initiated {:?} while {:?} from {:?} is pending",
                player, action, pending.action, pending.player
            );
            return Err(ProtocolDesync::AlreadyInitiated.into());
        }
        self.check_action(player, &action)?;
        debug!("{:?} initiated {:?}", player, action);
        Ok(&*self.pending.insert(PendingMove {
            player,
            action,
            initiated_at: Utc::now(),
            duration,
        }))
    }

    /// Applies the pending move. The player and action must match what was initiated.
    pub fn complete(&mut self, player: Color, action: &ProtocolAction<S>) -> Result<(), GameError> {
        let pending = self.pending.as_ref().ok_or(ProtocolDesync::NothingPending)?;
        if pending.player != player || pending.action != *action {
            warn!(
                "{:?} completed {:?}, but {:?} from {:?} is pending",
                player, action, pending.action, pending.player
            );
            return Err(ProtocolDesync::Mismatch.into());
        }
        self.check_action(player, action)?;
        match action {
            ProtocolAction::Move(mv) => self.game.play_move(player, mv.clone())?,
            ProtocolAction::Undo => self.game.undo_move()?,
            ProtocolAction::Redo => self.game.redo_move()?,
        }
        debug!("{:?} completed {:?}", player, action);
        self.pending = None;
        Ok(())
    }

    /// Discards the pending move, leaving the game untouched
    pub fn abort(&mut self) -> Result<PendingMove<S>, GameError> {
        let pending = self.pending.take().ok_or(ProtocolDesync::NothingPending)?;
        info!("Aborted {:?} from {:?}", pending.action, pending.player);
        Ok(pending)
    }

    fn check_not_pending(&self) -> Result<(), ProtocolDesync> {
        match self.pending {
            Some(_) => Err(ProtocolDesync::MovePending),
            None => Ok(()),
        }
    }

    pub fn can_undo_move(&self) -> bool {
        self.pending.is_none() && self.game.can_undo_move()
    }

    pub fn can_redo_move(&self) -> bool {
        self.pending.is_none() && self.game.can_redo_move()
    }

    pub fn can_do_action(&self, player: Color, action: Action<S>) -> bool {
        self.pending.is_none() && self.game.can_do_action(player, action)
    }

    /// Performs an immediate action, outside of the two-phase protocol
    pub fn do_action(&mut self, player: Color, action: Action<S>) -> Result<(), GameError> {
        self.check_not_pending()?;
        Ok(self.game.do_action(player, action)?)
    }

    pub fn can_draw_stone(&self, player: Color, role: Role) -> bool {
        self.can_do_action(player, Action::DrawStone(role))
    }

    pub fn draw_stone(&mut self, player: Color, role: Role) -> Result<(), GameError> {
        self.do_action(player, Action::DrawStone(role))
    }

    pub fn can_return_stone(&self, player: Color) -> bool {
        self.can_do_action(player, Action::ReturnStone)
    }

    pub fn return_stone(&mut self, player: Color) -> Result<(), GameError> {
        self.do_action(player, Action::ReturnStone)
    }

    pub fn can_place_stone(&self, player: Color, square: Square<S>, role: Role) -> bool {
        self.can_do_action(player, Action::PlaceStone(square, role))
    }

    pub fn place_stone(
        &mut self,
        player: Color,
        square: Square<S>,
        role: Role,
    ) -> Result<(), GameError> {
        self.do_action(player, Action::PlaceStone(square, role))
    }

    pub fn can_grab_stack(&self, player: Color, square: Square<S>, count: u8) -> bool {
        self.can_do_action(player, Action::GrabStack(square, count))
    }

    pub fn grab_stack(&mut self, player: Color, square: Square<S>, count: u8) -> Result<(), GameError> {
        self.do_action(player, Action::GrabStack(square, count))
    }

    pub fn can_drop_stack(&self, player: Color, square: Square<S>, count: u8) -> bool {
        self.can_do_action(player, Action::DropStack(square, count))
    }

    pub fn drop_stack(&mut self, player: Color, square: Square<S>, count: u8) -> Result<(), GameError> {
        self.do_action(player, Action::DropStack(square, count))
    }

    pub fn can_abort_move(&self, player: Color) -> bool {
        self.pending.is_none() && self.game.can_abort_move(player)
    }

    pub fn abort_move(&mut self, player: Color) -> Result<(), GameError> {
        self.check_not_pending()?;
        Ok(self.game.abort_move(player)?)
    }

    /// Resigning is always possible, and discards any pending move
    pub fn resign(&mut self, player: Color) -> Result<(), GameError> {
        self.game.resign(player)?;
        if let Some(pending) = self.pending.take() {
            info!("Discarded {:?} from {:?} after resignation", pending.action, pending.player);
        }
        Ok(())
    }
}
