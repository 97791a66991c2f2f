use crate::position::{Move, ReverseMove};

#[derive(Clone, PartialEq, Eq, Debug)]
struct HistoryEntry<const S: usize> {
    mv: Move<S>,
    reverse_move: ReverseMove<S>,
}

/// Committed moves of a game, with a cursor separating played moves from undone ones
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct MoveHistory<const S: usize> {
    entries: Vec<HistoryEntry<S>>,
    cursor: usize,
}

impl<const S: usize> MoveHistory<S> {
    pub fn new() -> Self {
        MoveHistory {
            entries: vec![],
            cursor: 0,
        }
    }

    /// Records a newly played move. Any undone moves are discarded.
    pub fn push(&mut self, mv: Move<S>, reverse_move: ReverseMove<S>) {
        self.entries.truncate(self.cursor);
        self.entries.push(HistoryEntry { mv, reverse_move });
        self.cursor += 1;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Steps the cursor back, returning what is needed to take back the last move
    pub fn undo(&mut self) -> Option<ReverseMove<S>> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].reverse_move.clone())
    }

    /// The next undone move, if any
    pub fn next_redo(&self) -> Option<&Move<S>> {
        self.entries.get(self.cursor).map(|entry| &entry.mv)
    }

    /// Steps the cursor forward over a replayed move
    pub fn redo(&mut self, reverse_move: ReverseMove<S>) {
        debug_assert!(self.can_redo());
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            entry.reverse_move = reverse_move;
            self.cursor += 1;
        }
    }

    /// The moves leading to the current position
    pub fn moves(&self) -> impl Iterator<Item = &Move<S>> + '_ {
        self.entries[..self.cursor].iter().map(|entry| &entry.mv)
    }

    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Number of undone moves that can still be redone
    pub fn redo_len(&self) -> usize {
        self.entries.len() - self.cursor
    }
}
