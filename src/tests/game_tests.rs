use board_game_traits::Color;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::InvalidMove;
use crate::game::{Action, Game, Hand};
use crate::position::{Direction, Move, Piece, Position, Role, Square, WinType};
use crate::tests::{parse_moves, position_from_moves, random_game};

fn sq(input: &str) -> Square<5> {
    Square::parse_square(input).unwrap()
}

fn game_from_moves<const S: usize>(move_strings: &[&str]) -> Game<S> {
    Game::from_moves(parse_moves::<S>(move_strings)).unwrap()
}

/// White to move, with a white two-stone stack on d3 and a black flat on c3
const STACK_ON_D3: [&str; 8] = ["a1", "e5", "d3", "c3", "d4", "a2", "d4-", "b5"];

#[test]
fn draw_and_place_stone_test() {
    let mut game = <Game<5>>::new();
    assert_eq!(
        game.draw_stone(Color::Black, Role::Flat),
        Err(InvalidMove::NotYourTurn(Color::White))
    );
    assert_eq!(
        game.draw_stone(Color::White, Role::Wall),
        Err(InvalidMove::OpeningRequiresFlat)
    );

    game.draw_stone(Color::White, Role::Flat).unwrap();
    assert_eq!(game.hand(), &Hand::Drawn(Role::Flat));
    assert_eq!(
        game.draw_stone(Color::White, Role::Flat),
        Err(InvalidMove::HandOccupied)
    );
    assert!(!game.can_grab_stack(Color::White, sq("a1"), 1));

    game.place_stone(Color::White, sq("a1"), Role::Flat).unwrap();
    assert_eq!(game.hand(), &Hand::Empty);
    assert_eq!(
        game.position().board().top_stone(sq("a1")),
        Some(Piece::BlackFlat)
    );
    assert_eq!(game.side_to_move(), Color::Black);
    assert_eq!(game.moves(), parse_moves::<5>(&["a1"]));
}

#[test]
fn drawn_stone_must_match_test() {
    let mut game = game_from_moves::<5>(&["a1", "e5"]);
    game.draw_stone(Color::White, Role::Cap).unwrap();
    assert!(!game.can_place_stone(Color::White, sq("c3"), Role::Flat));
    assert_eq!(
        game.place_stone(Color::White, sq("c3"), Role::Flat),
        Err(InvalidMove::DrawnStoneMismatch {
            drawn: Role::Cap,
            placed: Role::Flat
        })
    );
    assert_eq!(game.hand(), &Hand::Drawn(Role::Cap));
    assert_eq!(game.position().board().height(sq("c3")), 0);

    game.place_stone(Color::White, sq("c3"), Role::Cap).unwrap();
    assert_eq!(
        game.position().board().top_stone(sq("c3")),
        Some(Piece::WhiteCap)
    );
    assert_eq!(game.position().caps_left(Color::White), 0);
    assert_eq!(
        game.draw_stone(Color::Black, Role::Cap),
        Ok(()),
        "Black still has a capstone"
    );
    game.return_stone(Color::Black).unwrap();
    game.place_stone(Color::Black, sq("c4"), Role::Flat).unwrap();
    assert_eq!(
        game.draw_stone(Color::White, Role::Cap),
        Err(InvalidMove::NoReserve(Role::Cap))
    );
}

#[test]
fn return_stone_test() {
    let mut game = <Game<5>>::new();
    assert_eq!(game.return_stone(Color::White), Err(InvalidMove::EmptyHand));
    game.draw_stone(Color::White, Role::Flat).unwrap();
    game.return_stone(Color::White).unwrap();
    assert_eq!(game.hand(), &Hand::Empty);
    assert_eq!(game.position(), &Position::start_position());
    assert!(game.history().is_empty());
}

#[test]
fn slide_stack_square_by_square_test() {
    let mut game = game_from_moves::<5>(&STACK_ON_D3);
    let before = game.position().clone();

    game.grab_stack(Color::White, sq("d3"), 2).unwrap();
    // Nothing changes on the board until the last stone is dropped
    assert_eq!(game.position(), &before);
    match game.hand() {
        Hand::Carrying(carry) => {
            assert_eq!(carry.origin, sq("d3"));
            assert_eq!(carry.held, 2);
            assert_eq!(carry.direction, None);
        }
        hand => panic!("Expected to carry a stack, got {:?}", hand),
    }

    // Not adjacent
    assert_eq!(
        game.drop_stack(Color::White, sq("b3"), 1),
        Err(InvalidMove::BadDirection)
    );
    assert_eq!(
        game.drop_stack(Color::White, sq("c3"), 3),
        Err(InvalidMove::CarryLimit { taken: 3, limit: 2 })
    );
    assert_eq!(
        game.drop_stack(Color::White, sq("c3"), 0),
        Err(InvalidMove::EmptyDrop)
    );

    game.drop_stack(Color::White, sq("c3"), 1).unwrap();
    assert_eq!(game.position(), &before);
    match game.hand() {
        Hand::Carrying(carry) => {
            assert_eq!(carry.last, sq("c3"));
            assert_eq!(carry.held, 1);
            assert_eq!(carry.direction, Some(Direction::West));
        }
        hand => panic!("Expected to carry a stack, got {:?}", hand),
    }

    // The spread must continue in a straight line
    for square in ["d3", "c4", "c2"] {
        assert!(!game.can_drop_stack(Color::White, sq(square), 1));
        assert_eq!(
            game.drop_stack(Color::White, sq(square), 1),
            Err(InvalidMove::BadDirection)
        );
    }
    assert_eq!(
        game.place_stone(Color::White, sq("a5"), Role::Flat),
        Err(InvalidMove::HandOccupied)
    );

    game.drop_stack(Color::White, sq("b3"), 1).unwrap();
    assert_eq!(game.hand(), &Hand::Empty);
    assert_eq!(game.side_to_move(), Color::Black);
    assert_eq!(
        game.moves().last(),
        Some(&Move::from_string("2d3<11").unwrap())
    );

    let mut expected = STACK_ON_D3.to_vec();
    expected.push("2d3<11");
    assert_eq!(game.position(), &position_from_moves::<5>(&expected));
}

#[test]
fn drop_whole_stack_test() {
    let mut game = game_from_moves::<5>(&STACK_ON_D3);
    game.grab_stack(Color::White, sq("d3"), 2).unwrap();
    // One stone would be left hanging off the board
    assert_eq!(
        game.drop_stack(Color::White, sq("e3"), 1),
        Err(InvalidMove::OffBoard)
    );
    game.drop_stack(Color::White, sq("e3"), 2).unwrap();
    assert_eq!(game.moves().last(), Some(&Move::from_string("2d3>").unwrap()));
    assert_eq!(game.position().board().height(sq("e3")), 2);
    assert_eq!(game.position().board().height(sq("d3")), 0);
}

#[test]
fn grab_stack_rejections_test() {
    let mut game = game_from_moves::<5>(&STACK_ON_D3);
    assert_eq!(
        game.grab_stack(Color::White, sq("c3"), 1),
        Err(InvalidMove::NotYourStack)
    );
    assert_eq!(
        game.grab_stack(Color::White, sq("c4"), 1),
        Err(InvalidMove::EmptySquare)
    );
    assert_eq!(
        game.grab_stack(Color::White, sq("d3"), 3),
        Err(InvalidMove::CarryLimit { taken: 3, limit: 2 })
    );
    assert_eq!(
        game.grab_stack(Color::Black, sq("c3"), 1),
        Err(InvalidMove::NotYourTurn(Color::White))
    );
    assert_eq!(game.hand(), &Hand::Empty);
}

#[test]
fn blocked_drop_changes_nothing_test() {
    let mut game = game_from_moves::<5>(&["a1", "e5", "d3", "Sc3", "d4", "a2", "d4-", "b5"]);
    let before = game.position().clone();
    game.grab_stack(Color::White, sq("d3"), 2).unwrap();
    assert_eq!(
        game.drop_stack(Color::White, sq("c3"), 1),
        Err(InvalidMove::Blocked)
    );
    assert_eq!(
        game.drop_stack(Color::White, sq("c3"), 2),
        Err(InvalidMove::Blocked)
    );
    assert!(matches!(game.hand(), Hand::Carrying(carry) if carry.held == 2 && carry.direction.is_none()));

    game.abort_move(Color::White).unwrap();
    assert_eq!(game.hand(), &Hand::Empty);
    assert_eq!(game.position(), &before);
    assert_eq!(game.abort_move(Color::White), Err(InvalidMove::EmptyHand));
}

#[test]
fn undo_and_redo_test() {
    let mut game = game_from_moves::<5>(&["a1", "e5", "c3"]);
    assert_eq!(game.side_to_move(), Color::Black);

    game.undo_move().unwrap();
    assert_eq!(game.position(), &position_from_moves::<5>(&["a1", "e5"]));
    assert_eq!(game.moves(), parse_moves::<5>(&["a1", "e5"]));
    assert_eq!(game.history().redo_len(), 1);
    assert!(game.can_redo_move());

    game.redo_move().unwrap();
    assert_eq!(game.position(), &position_from_moves::<5>(&["a1", "e5", "c3"]));
    assert_eq!(game.redo_move(), Err(InvalidMove::NothingToRedo));

    game.undo_move().unwrap();
    game.undo_move().unwrap();
    assert_eq!(game.side_to_move(), Color::Black);
    assert_eq!(game.history().redo_len(), 2);

    // A new move discards the undone ones
    game.play_move(Color::Black, Move::from_string("d4").unwrap())
        .unwrap();
    assert_eq!(game.history().redo_len(), 0);
    assert!(!game.can_redo_move());
    assert_eq!(game.moves(), parse_moves::<5>(&["a1", "d4"]));

    game.undo_move().unwrap();
    game.undo_move().unwrap();
    assert_eq!(game.position(), &Position::start_position());
    assert_eq!(game.undo_move(), Err(InvalidMove::NothingToUndo));
}

#[test]
fn undo_with_stone_in_hand_test() {
    let mut game = game_from_moves::<5>(&["a1", "e5"]);
    game.draw_stone(Color::White, Role::Flat).unwrap();
    assert!(!game.can_undo_move());
    assert_eq!(game.undo_move(), Err(InvalidMove::MoveInProgress));
    assert_eq!(
        game.play_move(Color::White, Move::from_string("c3").unwrap()),
        Err(InvalidMove::MoveInProgress)
    );
    game.return_stone(Color::White).unwrap();
    assert!(game.can_undo_move());
}

#[test]
fn undo_spread_restores_stacks_test() {
    let mut game = game_from_moves::<5>(&["a1", "e5", "Cc3", "Sd3"]);
    let before = game.position().clone();
    game.grab_stack(Color::White, sq("c3"), 1).unwrap();
    game.drop_stack(Color::White, sq("d3"), 1).unwrap();
    assert_eq!(
        game.position().board().top_stone(sq("d3")),
        Some(Piece::WhiteCap)
    );
    game.undo_move().unwrap();
    assert_eq!(game.position(), &before);
    game.redo_move().unwrap();
    assert_eq!(
        game.position().board().top_stone(sq("d3")),
        Some(Piece::WhiteCap)
    );
}

#[test]
fn wrong_player_test() {
    let mut game = <Game<5>>::new();
    let mv = Move::from_string("a1").unwrap();
    assert!(!game.can_play_move(Color::Black, &mv));
    assert_eq!(
        game.play_move(Color::Black, mv.clone()),
        Err(InvalidMove::NotYourTurn(Color::White))
    );
    assert!(game.can_play_move(Color::White, &mv));
    assert!(!game.can_do_action(Color::Black, Action::PlaceStone(sq("a1"), Role::Flat)));
    game.do_action(Color::White, Action::PlaceStone(sq("a1"), Role::Flat))
        .unwrap();
    assert_eq!(game.moves(), vec![mv]);
}

#[test]
fn resign_test() {
    let mut game = game_from_moves::<5>(&["a1", "e5", "c3"]);
    game.draw_stone(Color::Black, Role::Flat).unwrap();
    game.resign(Color::Black).unwrap();
    assert!(game.is_over());
    assert_eq!(game.hand(), &Hand::Empty);

    let outcome = game.outcome();
    assert_eq!(outcome.win_type, WinType::Resignation);
    assert_eq!(outcome.winner, Some(Color::White));
    // Two white flats on the board, and the capstone in reserve
    assert_eq!(outcome.score, 25 + 19 + 1);

    assert_eq!(
        game.play_move(Color::Black, Move::from_string("d4").unwrap()),
        Err(InvalidMove::GameOver)
    );
    assert_eq!(game.undo_move(), Err(InvalidMove::GameOver));
    assert_eq!(game.resign(Color::White), Err(InvalidMove::GameOver));
}

#[test]
fn finished_game_rejects_moves_until_undone_test() {
    let mut game = game_from_moves::<3>(&["b1", "a1", "c1", "a2", "b2", "c2", "a3", "b3", "c3"]);
    assert!(game.is_over());
    assert_eq!(game.outcome().win_type, WinType::Flat);
    assert_eq!(
        game.draw_stone(Color::Black, Role::Flat),
        Err(InvalidMove::GameOver)
    );

    game.undo_move().unwrap();
    assert!(!game.is_over());
    assert_eq!(game.outcome().win_type, WinType::None);
    let wall = Move::from_string("Sc3").unwrap();
    game.play_move(Color::White, wall).unwrap();
    assert_eq!(game.outcome().win_type, WinType::Draw);
}

#[test]
fn replayed_games_match_positions_test() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..50 {
        let moves = random_game::<5, _>(&mut rng, 120);
        let game = Game::from_moves(moves.clone()).unwrap();
        assert_eq!(game.moves(), moves);

        let mut position = <Position<5>>::start_position();
        for mv in moves {
            position.do_move(mv);
        }
        assert_eq!(game.position(), &position);
        assert_eq!(game.outcome(), position.outcome());
        assert_eq!(game.is_over(), position.game_result().is_some());
    }
}

#[test]
fn replaying_illegal_moves_fails_test() {
    let result = Game::<5>::from_moves(parse_moves::<5>(&["a1", "a1"]));
    assert_eq!(result.err(), Some(InvalidMove::Occupied));
    let result = Game::<5>::from_moves(parse_moves::<5>(&["Sa1"]));
    assert_eq!(result.err(), Some(InvalidMove::OpeningRequiresFlat));
}
