use board_game_traits::{Color, GameResult};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::InvalidMove;
use crate::position::{
    starting_capstones, starting_stones, Extent, Move, Piece, Position, Role, Square, WinType,
};
use crate::tests::{position_from_moves, random_game};

fn sq<const S: usize>(input: &str) -> Square<S> {
    Square::parse_square(input).unwrap()
}

fn mv<const S: usize>(input: &str) -> Move<S> {
    Move::from_string(input).unwrap()
}

#[test]
fn reserves_test() {
    assert_eq!((starting_stones::<3>(), starting_capstones::<3>()), (10, 0));
    assert_eq!((starting_stones::<4>(), starting_capstones::<4>()), (15, 0));
    assert_eq!((starting_stones::<5>(), starting_capstones::<5>()), (21, 1));
    assert_eq!((starting_stones::<6>(), starting_capstones::<6>()), (30, 1));
    assert_eq!((starting_stones::<7>(), starting_capstones::<7>()), (40, 2));
    assert_eq!((starting_stones::<8>(), starting_capstones::<8>()), (50, 2));
}

#[test]
fn first_moves_place_opponent_stones_test() {
    let mut position = <Position<5>>::start_position();
    assert_eq!(position.side_to_move(), Color::White);
    assert_eq!(position.color_to_place(), Color::Black);

    position.do_move(mv("a1"));
    assert_eq!(position.board().top_stone(sq("a1")), Some(Piece::BlackFlat));
    assert_eq!(position.stones_left(Color::Black), 20);
    assert_eq!(position.stones_left(Color::White), 21);
    assert_eq!(position.side_to_move(), Color::Black);
    assert_eq!(position.color_to_place(), Color::White);

    position.do_move(mv("e5"));
    assert_eq!(position.board().top_stone(sq("e5")), Some(Piece::WhiteFlat));
    assert_eq!(position.side_to_move(), Color::White);
    assert_eq!(position.color_to_place(), Color::White);

    position.do_move(mv("c3"));
    assert_eq!(position.board().top_stone(sq("c3")), Some(Piece::WhiteFlat));
}

#[test]
fn opening_restrictions_test() {
    let position = <Position<5>>::start_position();
    assert_eq!(
        position.check_move(&mv("Sa1")),
        Err(InvalidMove::OpeningRequiresFlat)
    );
    assert_eq!(
        position.check_move(&mv("Ca1")),
        Err(InvalidMove::OpeningRequiresFlat)
    );

    let position = position_from_moves::<5>(&["a1"]);
    assert_eq!(
        position.check_move(&mv("a1")),
        Err(InvalidMove::Occupied)
    );
    // Black may not move the black stone White placed
    assert_eq!(
        position.check_move(&mv("a1+")),
        Err(InvalidMove::NoSpreadsInOpening)
    );
}

#[test]
fn no_capstones_on_small_boards_test() {
    let position = position_from_moves::<4>(&["a1", "d4"]);
    assert_eq!(
        position.check_move(&mv("Cb2")),
        Err(InvalidMove::NoReserve(Role::Cap))
    );
}

#[test]
fn only_own_stacks_can_move_test() {
    let position = position_from_moves::<5>(&["a1", "e5", "c3"]);
    assert_eq!(position.side_to_move(), Color::Black);
    assert_eq!(position.check_move(&mv("c3+")), Err(InvalidMove::NotYourStack));
    assert_eq!(position.check_move(&mv("b3+")), Err(InvalidMove::EmptySquare));
    assert_eq!(position.check_move(&mv("a1+")), Ok(()));
    assert_eq!(position.check_move(&mv("a1-")), Err(InvalidMove::OffBoard));
}

#[test]
fn capstone_flattens_wall_test() {
    let mut position = position_from_moves::<5>(&["a1", "e5", "Cc3", "Sd3"]);
    let before = position.clone();
    assert_eq!(position.board().top_role(sq("d3")), Some(Role::Wall));

    let reverse_move = position.do_move(mv("c3>"));
    assert_eq!(position.board().top_stone(sq("d3")), Some(Piece::WhiteCap));
    assert_eq!(position.board().height(sq("d3")), 2);
    assert_eq!(position.board()[sq("d3")].get(0), Some(Piece::BlackFlat));
    assert_eq!(position.board().height(sq("c3")), 0);

    position.reverse_move(reverse_move);
    assert_eq!(position, before);
    assert_eq!(position.board().top_stone(sq("d3")), Some(Piece::BlackWall));
    assert_eq!(position.board().top_stone(sq("c3")), Some(Piece::WhiteCap));
}

#[test]
fn only_lone_capstone_flattens_test() {
    let position = position_from_moves::<5>(&[
        "a1", "e5", "c3", "Sd3", "Cc2", "a2", "1c2+", "b5", "d2", "a3",
    ]);
    assert_eq!(position.board().height(sq("c3")), 2);
    assert_eq!(position.board().top_stone(sq("c3")), Some(Piece::WhiteCap));

    // Two stones onto the wall
    assert_eq!(position.check_move(&mv("2c3>")), Err(InvalidMove::Blocked));
    // The flat is dropped on the wall first
    assert_eq!(position.check_move(&mv("2c3>11")), Err(InvalidMove::Blocked));
    // A flat onto the wall
    assert_eq!(position.check_move(&mv("d2+")), Err(InvalidMove::Blocked));
    // A lone capstone, leaving its support behind
    assert_eq!(position.check_move(&mv("c3>")), Ok(()));
}

#[test]
fn capstone_blocks_test() {
    let position = position_from_moves::<5>(&["a1", "e5", "Cc3", "d3", "a5"]);
    // Black's flat cannot be spread onto the capstone
    assert_eq!(position.check_move(&mv("d3<")), Err(InvalidMove::Blocked));
    let position = position_from_moves::<5>(&["a1", "e5", "Cc3", "Cd3"]);
    assert_eq!(position.check_move(&mv("c3>")), Err(InvalidMove::Blocked));
}

#[test]
fn road_win_test() {
    let mut position = position_from_moves::<5>(&[
        "e5", "a1", "b1", "e4", "c1", "e3", "d1",
    ]);
    assert_eq!(position.game_result(), None);
    position.do_move(mv("d4"));
    assert_eq!(position.game_result(), None);
    position.do_move(mv("e1"));
    assert_eq!(position.game_result(), Some(GameResult::WhiteWin));

    let outcome = position.outcome();
    assert_eq!(outcome.win_type, WinType::Road);
    assert_eq!(outcome.winner, Some(Color::White));
    // Four flats placed by White, one placed for White by Black, and the unused capstone
    assert_eq!(outcome.score, 25 + (21 - 5) + 1);
    assert_eq!(
        outcome.extent(Color::White),
        Some(Extent {
            min_file: 0,
            max_file: 4,
            min_rank: 0,
            max_rank: 0
        })
    );
}

#[test]
fn double_road_goes_to_mover_test() {
    // White uncovers Black's road on the top rank, while completing its own on the middle rank
    let mut position = position_from_moves::<3>(&[
        "a3", "a2", "b2", "b3", "1b2+", "c3", "c2", "c1",
    ]);
    assert_eq!(position.game_result(), None);
    assert_eq!(position.side_to_move(), Color::White);

    position.do_move(mv("b3-"));
    assert!(position.board().has_road(Color::White));
    assert!(position.board().has_road(Color::Black));
    assert_eq!(position.game_result(), Some(GameResult::WhiteWin));
    assert_eq!(position.outcome().win_type, WinType::Road);
}

#[test]
fn flat_win_on_full_board_test() {
    let mut position = position_from_moves::<3>(&["b1", "a1", "c1", "a2", "b2", "c2", "a3", "b3"]);
    assert_eq!(position.game_result(), None);
    position.do_move(mv("c3"));

    assert!(position.board().is_full());
    assert_eq!(position.game_result(), Some(GameResult::WhiteWin));
    let outcome = position.outcome();
    assert_eq!(outcome.win_type, WinType::Flat);
    assert_eq!(outcome.winner, Some(Color::White));
    assert_eq!(outcome.score, 9 + 10 - 5);
}

#[test]
fn walls_do_not_count_for_flat_win_test() {
    let mut position = position_from_moves::<3>(&["b1", "a1", "c1", "a2", "b2", "c2", "a3", "b3"]);
    position.do_move(mv("Sc3"));
    assert_eq!(position.game_result(), Some(GameResult::Draw));
    let outcome = position.outcome();
    assert_eq!(outcome.win_type, WinType::Draw);
    assert_eq!(outcome.winner, None);
    assert_eq!(outcome.score, 0);
}

#[test]
fn game_ends_when_reserves_run_out_test() {
    // Each player keeps moving new stones onto a single stack, never filling the board
    let mut move_strings = vec!["a1", "c3"];
    for _ in 0..8 {
        move_strings.extend(["c2", "a2", "c2+", "a2-"]);
    }
    let mut position = position_from_moves::<3>(&move_strings);
    assert_eq!(position.game_result(), None);
    assert_eq!(position.stones_left(Color::White), 1);
    assert_eq!(position.stones_left(Color::Black), 1);
    assert_eq!(position.board().height(sq("c3")), 9);

    position.do_move(mv("c2"));
    assert!(!position.board().is_full());
    assert_eq!(position.stones_left(Color::White), 0);
    assert_eq!(position.game_result(), Some(GameResult::WhiteWin));

    let outcome = position.outcome();
    assert_eq!(outcome.win_type, WinType::Flat);
    assert_eq!(outcome.score, 9);
}

#[test]
fn finished_games_are_consistent_test() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..200 {
        let moves = random_game::<4, _>(&mut rng, 400);
        let mut position = <Position<4>>::start_position();
        for mv in moves {
            assert_eq!(position.game_result(), None);
            assert!(!position.outcome().is_over());
            position.do_move(mv);
        }
        let Some(result) = position.game_result() else {
            continue;
        };
        let outcome = position.outcome();
        assert_eq!(outcome.game_result(), Some(result));
        assert!(outcome.is_over());
        match outcome.win_type {
            WinType::Road => assert!(
                position.board().has_road(Color::White) || position.board().has_road(Color::Black)
            ),
            WinType::Flat | WinType::Draw => assert!(
                position.board().is_full()
                    || position.stones_left(Color::White) == 0
                    || position.stones_left(Color::Black) == 0
            ),
            win_type => panic!("Unexpected win type {:?}", win_type),
        }
        if outcome.win_type == WinType::Draw {
            assert_eq!(outcome.score, 0);
        } else {
            assert!(outcome.score >= 16);
        }
    }
}
