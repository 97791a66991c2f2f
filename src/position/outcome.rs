use board_game_traits::{Color, GameResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::position::bitboard::BitBoard;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WinType {
    /// The game is still in progress
    None,
    Road,
    Flat,
    Resignation,
    Draw,
}

/// Bounding box of the squares topped by one color's road pieces, inclusive
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Extent {
    pub min_file: u8,
    pub max_file: u8,
    pub min_rank: u8,
    pub max_rank: u8,
}

impl Extent {
    pub fn of_squares<const S: usize>(squares: BitBoard) -> Option<Self> {
        squares.into_iter().fold(None, |extent, i| {
            let (file, rank) = (i % S as u8, i / S as u8);
            Some(match extent {
                None => Extent {
                    min_file: file,
                    max_file: file,
                    min_rank: rank,
                    max_rank: rank,
                },
                Some(Extent {
                    min_file,
                    max_file,
                    min_rank,
                    max_rank,
                }) => Extent {
                    min_file: min_file.min(file),
                    max_file: max_file.max(file),
                    min_rank: min_rank.min(rank),
                    max_rank: max_rank.max(rank),
                },
            })
        })
    }

    pub fn width(&self) -> u8 {
        self.max_file - self.min_file + 1
    }

    pub fn height(&self) -> u8 {
        self.max_rank - self.min_rank + 1
    }
}

/// A summary of how a game stands, or how it ended
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GameOutcome {
    pub win_type: WinType,
    #[cfg_attr(feature = "serde", serde(with = "color_option"))]
    pub winner: Option<Color>,
    /// Indexed by `Color::disc()`
    pub extents: [Option<Extent>; 2],
    pub score: u32,
}

impl GameOutcome {
    pub fn is_over(&self) -> bool {
        self.win_type != WinType::None
    }

    pub fn game_result(&self) -> Option<GameResult> {
        match (self.win_type, self.winner) {
            (WinType::None, _) => None,
            (WinType::Draw, _) => Some(GameResult::Draw),
            (_, Some(Color::White)) => Some(GameResult::WhiteWin),
            (_, Some(Color::Black)) => Some(GameResult::BlackWin),
            (_, None) => Some(GameResult::Draw),
        }
    }

    pub fn extent(&self, color: Color) -> Option<Extent> {
        self.extents[color.disc()]
    }
}

#[cfg(feature = "serde")]
mod color_option {
    use board_game_traits::Color;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<Ser: Serializer>(
        color: &Option<Color>,
        serializer: Ser,
    ) -> Result<Ser::Ok, Ser::Error> {
        color
            .map(|color| color == Color::White)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Color>, D::Error> {
        let is_white: Option<bool> = Option::deserialize(deserializer)?;
        Ok(is_white.map(|is_white| if is_white { Color::White } else { Color::Black }))
    }
}
