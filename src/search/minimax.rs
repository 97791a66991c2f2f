use std::time::Instant;

use board_game_traits::Color;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::evaluation::{leaf_score, Evaluator};
use crate::position::{Move, Position, Role};

use super::CancellationToken;

/// Puts the most promising kinds of moves first, optionally shuffling moves of the same kind
pub(super) fn order_moves<const S: usize>(
    moves: &mut [Move<S>],
    randomize: bool,
    rng: &mut SmallRng,
) {
    if randomize {
        moves.shuffle(rng);
    }
    moves.sort_by_key(|mv| match mv {
        Move::Place(Role::Flat, _) => 0,
        Move::Place(Role::Cap, _) => 1,
        Move::Spread(..) => 2,
        Move::Place(Role::Wall, _) => 3,
    });
}

/// State of a single search iteration on one thread
pub(super) struct Searcher<'a, E> {
    evaluator: &'a E,
    cancellation: &'a CancellationToken,
    deadline: Option<Instant>,
    stopped: bool,
    randomize: bool,
    pub nodes: u64,
}

impl<'a, E: Evaluator> Searcher<'a, E> {
    pub fn new(
        evaluator: &'a E,
        cancellation: &'a CancellationToken,
        deadline: Option<Instant>,
    ) -> Self {
        Searcher {
            evaluator,
            cancellation,
            deadline,
            stopped: false,
            randomize: false,
            nodes: 0,
        }
    }

    pub fn randomize(mut self, randomize: bool) -> Self {
        self.randomize = randomize;
        self
    }

    fn should_stop(&mut self) -> bool {
        if !self.stopped {
            self.stopped = self.cancellation.is_cancelled()
                || self
                    .deadline
                    .is_some_and(|deadline| Instant::now() >= deadline);
        }
        self.stopped
    }

    /// Searches every root move to the given depth.
    /// Returns the index and score of the best one, or `None` if the search was stopped.
    pub fn search_root<const S: usize>(
        &mut self,
        position: &Position<S>,
        moves: &[Move<S>],
        depth: u16,
        rng: &mut SmallRng,
    ) -> Option<(usize, i32)> {
        let player = position.side_to_move();
        let mut position = position.clone();
        let mut best: Option<(usize, i32)> = None;
        let mut alpha = i32::MIN;

        for (i, mv) in moves.iter().enumerate() {
            if self.should_stop() {
                return None;
            }
            let reverse_move = position.do_move(mv.clone());
            let score = self.alpha_beta(&mut position, depth - 1, alpha, i32::MAX, player, rng);
            position.reverse_move(reverse_move);
            let score = score?;

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((i, score));
                alpha = alpha.max(score);
            }
        }
        best
    }

    /// Like `search_root`, but searches the root moves in parallel.
    /// Each root move gets its own copy of the position and its own random generator.
    pub fn search_root_parallel<const S: usize>(
        &mut self,
        pool: &rayon::ThreadPool,
        position: &Position<S>,
        moves: &[Move<S>],
        depth: u16,
        rng: &mut SmallRng,
    ) -> Option<(usize, i32)> {
        let player = position.side_to_move();
        let jobs: Vec<(usize, Position<S>, u64)> = moves
            .iter()
            .enumerate()
            .map(|(i, mv)| {
                let mut child = position.clone();
                child.do_move(mv.clone());
                (i, child, rng.gen())
            })
            .collect();

        let evaluator = self.evaluator;
        let cancellation = self.cancellation;
        let deadline = self.deadline;
        let randomize = self.randomize;

        let results: Vec<(usize, Option<i32>, u64)> = pool.install(|| {
            jobs.into_par_iter()
                .map(|(i, mut child, seed)| {
                    let mut worker =
                        Searcher::new(evaluator, cancellation, deadline).randomize(randomize);
                    let mut rng = SmallRng::seed_from_u64(seed);
                    let score = if worker.should_stop() {
                        None
                    } else {
                        worker.alpha_beta(&mut child, depth - 1, i32::MIN, i32::MAX, player, &mut rng)
                    };
                    (i, score, worker.nodes)
                })
                .collect()
        });

        self.nodes += results.iter().map(|(_, _, nodes)| nodes).sum::<u64>();

        let mut best: Option<(usize, i32)> = None;
        for (i, score, _) in results {
            let score = score?;
            // Ties go to the earliest root move
            let is_better = match best {
                None => true,
                Some((best_index, best_score)) => {
                    score > best_score || (score == best_score && i < best_index)
                }
            };
            if is_better {
                best = Some((i, score));
            }
        }
        best
    }

    /// Minimax with alpha-beta pruning, scoring from `player`'s perspective.
    /// Returns `None` if the search was stopped.
    fn alpha_beta<const S: usize>(
        &mut self,
        position: &mut Position<S>,
        depth: u16,
        mut alpha: i32,
        mut beta: i32,
        player: Color,
        rng: &mut SmallRng,
    ) -> Option<i32> {
        self.nodes += 1;
        if depth == 0 || position.game_result().is_some() {
            return Some(leaf_score(self.evaluator, position, player));
        }

        let mut moves = vec![];
        position.generate_moves(&mut moves);
        if moves.is_empty() {
            return Some(leaf_score(self.evaluator, position, player));
        }
        order_moves(&mut moves, self.randomize, rng);

        let maximizing = position.side_to_move() == player;
        let mut best = if maximizing { i32::MIN } else { i32::MAX };

        for mv in moves {
            if self.should_stop() {
                return None;
            }
            let reverse_move = position.do_move(mv);
            let score = self.alpha_beta(position, depth - 1, alpha, beta, player, rng);
            position.reverse_move(reverse_move);
            let score = score?;

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if alpha >= beta {
                break;
            }
        }
        Some(best)
    }
}
