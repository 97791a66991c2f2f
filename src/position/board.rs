//! The stone layer of a Tak position: per-square packed stacks, plus per-color square sets
//! that make road and control queries cheap.

use std::cell::Cell;
use std::fmt;
use std::ops::Index;

use board_game_traits::Color;

use crate::position::bitboard::BitBoard;
use crate::position::utils::{AbstractBoard, Piece, Role, Stack};
use crate::position::Square;

/// Square sets for every top stone of one color
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Hash)]
pub(crate) struct ColorSets {
    pub flats: BitBoard,
    pub walls: BitBoard,
    pub caps: BitBoard,
}

impl ColorSets {
    pub fn road_pieces(&self) -> BitBoard {
        self.flats | self.caps
    }

    pub fn all(&self) -> BitBoard {
        self.flats | self.walls | self.caps
    }

    fn for_role(&mut self, role: Role) -> &mut BitBoard {
        match role {
            Role::Flat => &mut self.flats,
            Role::Wall => &mut self.walls,
            Role::Cap => &mut self.caps,
        }
    }
}

#[derive(Clone)]
pub struct Board<const S: usize> {
    cells: AbstractBoard<Stack, S>,
    sets: [ColorSets; 2],
    // Lazily computed road status for each color. `None` means it must be recomputed
    road_cache: [Cell<Option<bool>>; 2],
}

impl<const S: usize> Default for Board<S> {
    fn default() -> Self {
        Board {
            cells: AbstractBoard::default(),
            sets: [ColorSets::default(); 2],
            road_cache: [Cell::new(Some(false)), Cell::new(Some(false))],
        }
    }
}

impl<const S: usize> PartialEq for Board<S> {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl<const S: usize> Eq for Board<S> {}

impl<const S: usize> Index<Square<S>> for Board<S> {
    type Output = Stack;

    fn index(&self, square: Square<S>) -> &Self::Output {
        &self.cells[square]
    }
}

impl<const S: usize> Board<S> {
    /// Put a stone on top of the square, flattening whatever was on top before
    pub fn place(&mut self, square: Square<S>, role: Role, color: Color) {
        let old_top = self.cells[square].top_stone();
        self.cells[square].push(Piece::from_role_color(role, color));
        self.update_top(square, old_top);
    }

    /// Remove and return the top stone of the square.
    ///
    /// The stone below becomes the new top, as a flat.
    pub fn remove(&mut self, square: Square<S>) -> Option<Piece> {
        let old_top = self.cells[square].top_stone();
        let piece = self.cells[square].pop()?;
        self.update_top(square, old_top);
        Some(piece)
    }

    fn update_top(&mut self, square: Square<S>, old_top: Option<Piece>) {
        let old_road = [self.road_pieces(Color::White), self.road_pieces(Color::Black)];
        if let Some(piece) = old_top {
            let set = self.sets[piece.color().disc()].for_role(piece.role());
            *set = set.clear_square(square);
        }
        if let Some(piece) = self.cells[square].top_stone() {
            let set = self.sets[piece.color().disc()].for_role(piece.role());
            *set = set.set_square(square);
        }
        for color in [Color::White, Color::Black] {
            let old = old_road[color.disc()];
            let new = self.road_pieces(color);
            if old == new {
                continue;
            }
            let cache = &self.road_cache[color.disc()];
            // A road can only disappear if a road piece was removed
            let only_grew = old & new == old;
            if !(only_grew && cache.get() == Some(true)) {
                cache.set(None);
            }
        }
    }

    pub fn height(&self, square: Square<S>) -> u8 {
        self.cells[square].len()
    }

    pub fn top_stone(&self, square: Square<S>) -> Option<Piece> {
        self.cells[square].top_stone()
    }

    pub fn top_color(&self, square: Square<S>) -> Option<Color> {
        self.top_stone(square).map(Piece::color)
    }

    pub fn top_role(&self, square: Square<S>) -> Option<Role> {
        self.top_stone(square).map(Piece::role)
    }

    /// The packed stack colors for the square, and the stack's height
    pub fn raw_stack(&self, square: Square<S>) -> (u64, u8) {
        let stack = &self.cells[square];
        (stack.raw(), stack.len())
    }

    /// Number of squares whose top stone is of the given color
    pub fn control(&self, color: Color) -> u8 {
        self.sets[color.disc()].all().count()
    }

    /// Number of squares topped by a flat of the given color
    pub fn flat_count(&self, color: Color) -> u8 {
        self.sets[color.disc()].flats.count()
    }

    pub fn road_pieces(&self, color: Color) -> BitBoard {
        self.sets[color.disc()].road_pieces()
    }

    pub fn occupied(&self) -> BitBoard {
        self.sets[0].all() | self.sets[1].all()
    }

    pub fn is_full(&self) -> bool {
        self.occupied() == BitBoard::full::<S>()
    }

    pub fn has_road(&self, color: Color) -> bool {
        let cache = &self.road_cache[color.disc()];
        if let Some(has_road) = cache.get() {
            return has_road;
        }
        let has_road = self.road_pieces(color).has_road::<S>();
        cache.set(Some(has_road));
        has_road
    }

    /// Total number of stones on the board
    pub fn stone_count(&self) -> usize {
        self.cells.iter().map(|stack| stack.len() as usize).sum()
    }
}

impl<const S: usize> fmt::Debug for Board<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..S as u8).rev() {
            for file in 0..S as u8 {
                let stack = &self.cells[Square::from_file_rank(file, rank)];
                if stack.is_empty() {
                    write!(f, "[.]")?;
                    continue;
                }
                write!(f, "[")?;
                for piece in *stack {
                    let ch = match piece {
                        Piece::WhiteFlat => 'w',
                        Piece::WhiteWall => 'W',
                        Piece::WhiteCap => 'C',
                        Piece::BlackFlat => 'b',
                        Piece::BlackWall => 'B',
                        Piece::BlackCap => 'c',
                    };
                    write!(f, "{}", ch)?;
                }
                write!(f, "]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
