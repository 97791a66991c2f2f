use std::{fmt, ops};

use crate::position::Square;

/// A set of squares, one bit per square. Square `i` is bit `i`.
#[derive(PartialEq, Eq, Clone, Copy, Hash, Default)]
pub struct BitBoard {
    pub board: u64,
}

impl ops::BitOr for BitBoard {
    type Output = BitBoard;
    #[inline]
    fn bitor(self, rhs: BitBoard) -> BitBoard {
        BitBoard::from_u64(self.board | rhs.board)
    }
}

impl ops::BitOrAssign for BitBoard {
    #[inline]
    fn bitor_assign(&mut self, rhs: BitBoard) {
        self.board |= rhs.board
    }
}

impl ops::BitAnd for BitBoard {
    type Output = BitBoard;
    #[inline]
    fn bitand(self, rhs: BitBoard) -> BitBoard {
        BitBoard::from_u64(self.board & rhs.board)
    }
}

impl ops::BitAndAssign for BitBoard {
    #[inline]
    fn bitand_assign(&mut self, rhs: BitBoard) {
        self.board &= rhs.board
    }
}

impl ops::Not for BitBoard {
    type Output = BitBoard;
    #[inline]
    fn not(self) -> BitBoard {
        BitBoard::from_u64(!self.board)
    }
}

impl BitBoard {
    #[inline]
    pub const fn empty() -> Self {
        BitBoard { board: 0 }
    }

    /// Every square of an `S`x`S` board
    #[inline]
    pub const fn full<const S: usize>() -> Self {
        BitBoard {
            board: u64::MAX >> (64 - S * S),
        }
    }

    #[inline]
    pub const fn from_u64(n: u64) -> Self {
        BitBoard { board: n }
    }

    #[inline]
    pub fn get(self, i: u8) -> bool {
        debug_assert!(i < 64);
        self.board & (1 << i) != 0
    }

    #[inline]
    pub fn get_square<const S: usize>(self, square: Square<S>) -> bool {
        self.get(square.into_inner())
    }

    // Sets the square to true
    #[inline]
    pub fn set(self, i: u8) -> Self {
        debug_assert!(i < 64);
        BitBoard::from_u64(self.board | 1 << i)
    }

    #[inline]
    pub fn set_square<const S: usize>(self, square: Square<S>) -> Self {
        self.set(square.into_inner())
    }

    // Sets the square to false
    #[inline]
    pub fn clear(self, i: u8) -> Self {
        debug_assert!(i < 64);
        BitBoard::from_u64(self.board & !(1 << i))
    }

    #[inline]
    pub fn clear_square<const S: usize>(self, square: Square<S>) -> Self {
        self.clear(square.into_inner())
    }

    /// The squares on rank `i`
    #[inline]
    pub fn rank<const S: usize>(i: u8) -> Self {
        debug_assert!(i < S as u8);
        let mask = (1 << S) - 1;
        BitBoard::from_u64(mask << (i as u64 * S as u64))
    }

    /// The squares on file `i`
    #[inline]
    pub fn file<const S: usize>(i: u8) -> Self {
        debug_assert!(i < S as u8);
        #[allow(clippy::unusual_byte_groupings)]
        let mask = match S {
            1 => 0b1,
            2 => 0b0101,
            3 => 0b1_001_001,
            4 => 0b1_0001_0001_0001,
            5 => 0b1_00001_00001_00001_00001,
            6 => 0b1_000001_000001_000001_000001_000001,
            7 => 0b1_0000001_0000001_0000001_0000001_0000001_0000001,
            8 => 0b1_00000001_00000001_00000001_00000001_00000001_00000001_00000001,
            _ => 0,
        };
        BitBoard::from_u64(mask << i as u64)
    }

    /// All squares orthogonally adjacent to a square in the set, clipped to the board
    #[inline]
    pub fn adjacent<const S: usize>(self) -> Self {
        let not_west_edge = !Self::file::<S>(0);
        let not_east_edge = !Self::file::<S>(S as u8 - 1);
        let north = self.board << S;
        let south = self.board >> S;
        let east = (self & not_east_edge).board << 1;
        let west = (self & not_west_edge).board >> 1;
        BitBoard::from_u64(north | south | east | west) & Self::full::<S>()
    }

    /// Grows `seed` through `self` until it covers the whole connected area reachable from it
    pub fn flood_fill<const S: usize>(self, seed: BitBoard) -> Self {
        let mut component = seed & self;
        loop {
            let grown = (component | component.adjacent::<S>()) & self;
            if grown == component {
                return component;
            }
            component = grown;
        }
    }

    /// Whether the set contains an orthogonally connected path between two opposite edges
    pub fn has_road<const S: usize>(self) -> bool {
        let north = Self::rank::<S>(S as u8 - 1);
        let south = Self::rank::<S>(0);
        let west = Self::file::<S>(0);
        let east = Self::file::<S>(S as u8 - 1);

        !(self.flood_fill::<S>(south) & north).is_empty()
            || !(self.flood_fill::<S>(west) & east).is_empty()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.board == 0
    }

    #[inline]
    pub fn count(self) -> u8 {
        self.board.count_ones() as u8
    }
}

impl IntoIterator for BitBoard {
    type Item = u8;
    type IntoIter = BitBoardIter;

    fn into_iter(self) -> Self::IntoIter {
        BitBoardIter { board: self }
    }
}

/// Iterates over the indices of the set squares, lowest first
pub struct BitBoardIter {
    board: BitBoard,
}

impl Iterator for BitBoardIter {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        if self.board.is_empty() {
            None
        } else {
            let i = self.board.board.trailing_zeros() as u8;
            self.board = self.board.clear(i);
            Some(i)
        }
    }
}

impl fmt::Debug for BitBoard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for n in (0..8).rev() {
            writeln!(f, "{:08b}", ((self.board >> (n * 8)) as u8).reverse_bits())?;
        }
        Ok(())
    }
}
