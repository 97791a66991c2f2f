//! A Tak AI, based on depth-limited minimax search with alpha-beta pruning.
//!
//! The search deepens iteratively, and can be stopped at any time through a `CancellationToken`
//! or a time budget. It then returns the best move from the deepest completed iteration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::evaluation::{Evaluator, LOSS_SCORE, WIN_SCORE};
use crate::position::{Move, Position};

mod minimax;

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchSettings {
    depth: u16,
    time_budget: Option<Duration>,
    seed: u64,
    randomize: bool,
    parallel: bool,
    core_fraction: f32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            depth: 3,
            time_budget: None,
            seed: 0,
            randomize: false,
            parallel: false,
            core_fraction: 1.0,
        }
    }
}

impl SearchSettings {
    /// Maximum search depth, in plies. Must be at least 1
    pub fn depth(mut self, depth: u16) -> Self {
        self.depth = depth.max(1);
        self
    }

    /// Stop searching after this long, and return the best move found so far
    pub fn time_budget(mut self, time_budget: Duration) -> Self {
        self.time_budget = Some(time_budget);
        self
    }

    /// Seed for the move ordering randomization. 0 seeds from system entropy
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Shuffle moves of similar kinds before searching them
    pub fn randomize(mut self, randomize: bool) -> Self {
        self.randomize = randomize;
        self
    }

    /// Search the root moves on a thread pool. With randomized ordering, only legality of the chosen move is guaranteed
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Fraction of the available cores to use for a parallel search
    pub fn core_fraction(mut self, core_fraction: f32) -> Self {
        self.core_fraction = core_fraction.clamp(0.0, 1.0);
        self
    }

    pub fn max_depth(&self) -> u16 {
        self.depth
    }

    pub fn max_time(&self) -> Option<Duration> {
        self.time_budget
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Number of threads in the pool for a parallel search
    pub fn worker_threads(&self) -> usize {
        let available = std::thread::available_parallelism()
            .map(|cores| cores.get())
            .unwrap_or(1);
        ((available as f32 * self.core_fraction).floor() as usize).max(1)
    }

    fn rng(&self) -> SmallRng {
        if self.seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(self.seed)
        }
    }
}

/// A handle for stopping a running search from another thread.
/// Clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// The result of a search
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SearchInfo<const S: usize> {
    pub best_move: Move<S>,
    /// Score of the best move, from the perspective of the side to move.
    /// `None` if no iteration completed.
    pub score: Option<i32>,
    /// Depth of the deepest completed iteration
    pub depth: u16,
    pub nodes: u64,
}

#[derive(Clone, Debug)]
pub struct MinimaxEngine<E> {
    evaluator: E,
    settings: SearchSettings,
}

impl<E: Evaluator> MinimaxEngine<E> {
    pub fn new(evaluator: E, settings: SearchSettings) -> Self {
        MinimaxEngine {
            evaluator,
            settings,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Picks a move for the side to move. Returns `None` only if there are no legal moves,
    /// i.e. when the game is over.
    pub fn choose_next_move<const S: usize>(
        &self,
        position: &Position<S>,
        cancellation: &CancellationToken,
    ) -> Option<Move<S>> {
        self.search(position, cancellation)
            .map(|search_info| search_info.best_move)
    }

    pub fn search<const S: usize>(
        &self,
        position: &Position<S>,
        cancellation: &CancellationToken,
    ) -> Option<SearchInfo<S>> {
        if position.game_result().is_some() {
            return None;
        }
        let start_time = Instant::now();
        let deadline = self
            .settings
            .time_budget
            .and_then(|budget| start_time.checked_add(budget));
        let mut rng = self.settings.rng();

        let mut root_moves = vec![];
        position.generate_moves(&mut root_moves);
        minimax::order_moves(&mut root_moves, self.settings.randomize, &mut rng);

        let pool = if self.settings.parallel {
            let num_threads = self.settings.worker_threads();
            match rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()
            {
                Ok(pool) => Some(pool),
                Err(err) => {
                    warn!("Couldn't start {} search threads, searching serially: {}", num_threads, err);
                    None
                }
            }
        } else {
            None
        };

        let mut search_info = SearchInfo {
            best_move: root_moves.first()?.clone(),
            score: None,
            depth: 0,
            nodes: 0,
        };

        for depth in 1..=self.settings.depth {
            let mut searcher = minimax::Searcher::new(&self.evaluator, cancellation, deadline)
                .randomize(self.settings.randomize);
            let result = match &pool {
                Some(pool) => searcher.search_root_parallel(pool, position, &root_moves, depth, &mut rng),
                None => searcher.search_root(position, &root_moves, depth, &mut rng),
            };
            search_info.nodes += searcher.nodes;

            let Some((best_index, score)) = result else {
                info!(
                    "Search stopped during depth {} after {:.2}s, playing {}",
                    depth,
                    start_time.elapsed().as_secs_f32(),
                    search_info.best_move
                );
                break;
            };

            // Search the best move first on the next iteration
            let best_move = root_moves.remove(best_index);
            root_moves.insert(0, best_move.clone());

            debug!(
                "Depth {}: {} with score {}, {} nodes in {:.2}s",
                depth,
                best_move,
                score,
                search_info.nodes,
                start_time.elapsed().as_secs_f32()
            );
            search_info.best_move = best_move;
            search_info.score = Some(score);
            search_info.depth = depth;

            if score == WIN_SCORE || score == LOSS_SCORE {
                break;
            }
        }
        Some(search_info)
    }
}
