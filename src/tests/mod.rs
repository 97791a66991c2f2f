#[cfg(test)]
mod game_tests;
#[cfg(test)]
mod position_tests;

#[cfg(test)]
use crate::position::{Move, Position};
#[cfg(test)]
use rand::seq::SliceRandom;
#[cfg(test)]
use rand::Rng;

#[cfg(test)]
fn do_moves_and_check_validity<const S: usize>(position: &mut Position<S>, move_strings: &[&str]) {
    let mut moves = vec![];
    for move_string in move_strings.iter() {
        let mv = Move::from_string(move_string).unwrap();
        position.generate_moves(&mut moves);
        assert!(
            moves.contains(&mv),
            "Move {} was not among legal moves: {:?}\n{:?}",
            mv,
            moves,
            position
        );
        assert_eq!(position.check_move(&mv), Ok(()));
        position.do_move(mv);
        moves.clear();
    }
}

#[cfg(test)]
fn position_from_moves<const S: usize>(move_strings: &[&str]) -> Position<S> {
    let mut position = Position::start_position();
    do_moves_and_check_validity(&mut position, move_strings);
    position
}

#[cfg(test)]
fn parse_moves<const S: usize>(move_strings: &[&str]) -> Vec<Move<S>> {
    move_strings
        .iter()
        .map(|move_string| Move::from_string(move_string).unwrap())
        .collect()
}

/// Plays random legal moves until the game ends, or `max_plies` have been played
#[cfg(test)]
fn random_game<const S: usize, R: Rng>(rng: &mut R, max_plies: usize) -> Vec<Move<S>> {
    let mut position = <Position<S>>::start_position();
    let mut played = vec![];
    let mut moves = vec![];
    while played.len() < max_plies && position.game_result().is_none() {
        moves.clear();
        position.generate_moves(&mut moves);
        let mv = moves.choose(rng).unwrap().clone();
        position.do_move(mv.clone());
        played.push(mv);
    }
    played
}
