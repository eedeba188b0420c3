//! The MCTS driver: iterations, root advancement and whole-game play.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, trace, warn};

use super::config::MctsConfig;
use super::policy::{RolloutPolicy, UniformRandom};
use super::tree::SearchTree;
use crate::error::SearchError;
use crate::GameState;

/// Statistics of one call to [`MCTS::search`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchStats {
    pub iterations: u32,
    pub root_visits: u32,
    pub tree_size: usize,
    pub elapsed: Duration,
    pub deadline_hit: bool,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome<M> {
    /// The committed action, or `None` when the root has nothing to decide.
    pub best: Option<M>,
    pub stats: SearchStats,
}

/// Result of [`MCTS::run_game`].
#[derive(Debug, Clone)]
pub struct GameSummary<M> {
    pub actions: Vec<M>,
    pub rounds: u32,
    pub terminal: bool,
    pub reward: f64,
}

/// The main MCTS engine.
///
/// The engine owns its tree and keeps it across moves. A committed action is played on the
/// live state with fresh randomness; when that reproduces the chosen child's sampled state the
/// child becomes the new root and its statistics carry over, otherwise the tree restarts.
pub struct MCTS<S: GameState, P: RolloutPolicy<S> = UniformRandom> {
    tree: SearchTree<S>,
    config: MctsConfig,
    policy: P,
    /// The rayon thread pool for parallel search. `None` when searching on one thread.
    pool: Option<ThreadPool>,
}

impl<S: GameState> MCTS<S, UniformRandom> {
    /// Creates an engine with uniform-random rollouts.
    pub fn new(root: S, config: MctsConfig) -> Result<Self, SearchError> {
        Self::with_policy(root, config, UniformRandom)
    }
}

impl<S: GameState, P: RolloutPolicy<S>> MCTS<S, P> {
    /// Creates an engine rooted at `root`.
    ///
    /// # Arguments
    /// * `root` - The state the first search starts from.
    /// * `config` - Iteration budget, exploration constant and threading.
    /// * `policy` - The rollout policy.
    pub fn with_policy(root: S, config: MctsConfig, policy: P) -> Result<Self, SearchError> {
        let pool = if config.num_threads > 1 {
            Some(ThreadPoolBuilder::new().num_threads(config.num_threads).build()?)
        } else {
            None
        };
        Ok(MCTS {
            tree: SearchTree::new(root),
            config,
            policy,
            pool,
        })
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn tree(&self) -> &SearchTree<S> {
        &self.tree
    }

    /// The state at the current root.
    pub fn root_state(&self) -> &S {
        self.tree.root_node().state()
    }

    /// Discards the tree and starts over from `state`.
    pub fn reset(&mut self, state: S) {
        self.tree = SearchTree::new(state);
    }

    /// Returns statistics for the children of the root node.
    /// The stats are a map from a move to a tuple of (total reward, visits).
    pub fn get_root_children_stats(&self) -> HashMap<S::Move, (f64, u32)> {
        let root = self.tree.root_node();
        root.children()
            .iter()
            .filter_map(|&c| {
                let node = self.tree.get(c);
                node.action()
                    .map(|mv| (mv.clone(), (node.total_reward(), node.visits())))
            })
            .collect()
    }

    /// Runs the configured number of iterations from the current root and picks the root
    /// child with the highest average reward.
    ///
    /// With one thread every random draw comes from `rng`, so a fixed seed replays the
    /// same search. With a pool, `rng` only seeds one generator per iteration.
    pub fn search<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SearchOutcome<S::Move> {
        let start = Instant::now();
        let deadline = self.config.time_limit.map(|limit| start + limit);
        let iterations = self.config.iterations;
        let completed = AtomicU32::new(0);
        let deadline_hit = AtomicBool::new(false);

        if !self.tree.root_node().is_terminal() {
            let tree = Mutex::new(&mut self.tree);
            let worker = Worker {
                tree: &tree,
                policy: &self.policy,
                config: &self.config,
                deadline,
            };
            match &self.pool {
                Some(pool) => {
                    let base_seed: u64 = rng.random();
                    // Run simulations in parallel within the custom thread pool.
                    pool.install(|| {
                        (0..iterations).into_par_iter().for_each(|i| {
                            if expired(deadline) {
                                deadline_hit.store(true, Ordering::Relaxed);
                                return;
                            }
                            let mut local = Xoshiro256PlusPlus::seed_from_u64(
                                base_seed ^ u64::from(i).wrapping_mul(0x9E37_79B9_7F4A_7C15),
                            );
                            worker.iterate(&mut local);
                            completed.fetch_add(1, Ordering::Relaxed);
                        });
                    });
                }
                None => {
                    for _ in 0..iterations {
                        if expired(deadline) {
                            deadline_hit.store(true, Ordering::Relaxed);
                            break;
                        }
                        worker.iterate(rng);
                        completed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }

        let best = self
            .tree
            .best_child()
            .and_then(|c| self.tree.get(c).action().cloned());
        let stats = SearchStats {
            iterations: completed.into_inner(),
            root_visits: self.tree.root_node().visits(),
            tree_size: self.tree.len(),
            elapsed: start.elapsed(),
            deadline_hit: deadline_hit.into_inner(),
        };
        debug!(
            iterations = stats.iterations,
            root_visits = stats.root_visits,
            tree_size = stats.tree_size,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            best = ?best,
            "search finished"
        );
        SearchOutcome { best, stats }
    }

    /// Advances the root of the tree to the node corresponding to the given move.
    /// This preserves the search tree between moves.
    pub fn advance_root(&mut self, mv: &S::Move) -> Result<(), SearchError> {
        let child = self.tree.child_with_action(self.tree.root(), mv)?;
        self.tree.reroot(child);
        Ok(())
    }

    /// Searches from the root and commits the chosen action to a copy of the root state.
    /// Returns `None` and leaves the root untouched if no action could be chosen.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<S::Move> {
        let mut live = self.root_state().clone();
        self.commit(&mut live, rng)
    }

    /// Searches, then applies the chosen action to `live` once with fresh draws from `rng`.
    ///
    /// The sampled child only becomes the new root when `live` ended up in exactly the state
    /// the search sampled for it; otherwise the tree restarts from `live`. `live` is expected
    /// to equal the current root state.
    pub fn commit<R: Rng + ?Sized>(&mut self, live: &mut S, rng: &mut R) -> Option<S::Move> {
        let mv = self.search(rng).best?;
        live.make_move(&mv, rng);
        self.follow(&mv, live);
        Some(mv)
    }

    /// Moves the root to the child reached by `mv` if its state matches `live`, and starts a
    /// fresh tree at `live` otherwise.
    fn follow(&mut self, mv: &S::Move, live: &S) {
        match self.tree.child_with_action(self.tree.root(), mv) {
            Ok(child) if self.tree.get(child).state() == live => self.tree.reroot(child),
            Ok(_) => {
                trace!(mv = ?mv, "live outcome differs from sampled child, restarting tree");
                self.reset(live.clone());
            }
            Err(err) => {
                warn!(error = %err, "committed action has no child, restarting tree");
                self.reset(live.clone());
            }
        }
    }

    /// Plays from the current root until the game ends, `max_actions` actions have been
    /// committed, or the root reaches `max_rounds` rounds.
    pub fn run_game<R: Rng + ?Sized>(
        &mut self,
        max_actions: usize,
        max_rounds: u32,
        rng: &mut R,
    ) -> GameSummary<S::Move> {
        let mut actions = Vec::new();
        while actions.len() < max_actions
            && !self.root_state().is_terminal()
            && self.root_state().rounds() < max_rounds
        {
            match self.step(rng) {
                Some(mv) => {
                    info!(
                        action = actions.len() + 1,
                        round = self.root_state().rounds(),
                        mv = ?mv,
                        reward = self.root_state().reward(),
                        "committed"
                    );
                    actions.push(mv);
                }
                None => break,
            }
        }
        let root = self.root_state();
        GameSummary {
            actions,
            rounds: root.rounds(),
            terminal: root.is_terminal(),
            reward: root.reward(),
        }
    }
}

/// Runs a fresh search from `state` and returns the action it would commit, or `None` when
/// `state` has nothing to decide. Seeded from the config, so equal inputs give equal answers
/// on one thread.
pub fn choose_action<S: GameState>(
    state: &S,
    config: &MctsConfig,
) -> Result<Option<S::Move>, SearchError> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
    let mut engine = MCTS::new(state.clone(), config.clone())?;
    Ok(engine.search(&mut rng).best)
}

/// Plays `state` forward with `policy` until it is terminal, the depth cap is reached, the
/// deadline passes, or nothing is legal, then scores it.
pub fn rollout<S, P, R>(
    state: &mut S,
    policy: &P,
    max_depth: Option<u32>,
    deadline: Option<Instant>,
    rng: &mut R,
) -> f64
where
    S: GameState,
    P: RolloutPolicy<S>,
    R: Rng + ?Sized,
{
    let mut depth = 0;
    while !state.is_terminal() {
        if max_depth.is_some_and(|cap| depth >= cap) || expired(deadline) {
            break;
        }
        let legal = state.get_possible_moves();
        if legal.is_empty() {
            break;
        }
        let mv = policy.choose(state, &legal, rng);
        state.make_move(&mv, rng);
        depth += 1;
    }
    state.reward()
}

fn expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

/// Everything one iteration needs. Shared by reference across pool workers.
struct Worker<'a, 't, S: GameState, P> {
    tree: &'a Mutex<&'t mut SearchTree<S>>,
    policy: &'a P,
    config: &'a MctsConfig,
    deadline: Option<Instant>,
}

impl<S: GameState, P: RolloutPolicy<S>> Worker<'_, '_, S, P> {
    /// One selection, expansion, rollout and backpropagation. The tree lock is released
    /// while the rollout runs on its own clone of the leaf state.
    fn iterate<R: Rng + ?Sized>(&self, rng: &mut R) {
        let virtual_loss = self.config.virtual_loss;
        let (leaf, mut state) = {
            let mut tree = self.tree.lock();
            let selected = tree.select(self.config.exploration);
            let leaf = tree.expand(selected, rng);
            if virtual_loss > 0 {
                tree.add_virtual_visits(leaf, virtual_loss);
            }
            (leaf, tree.get(leaf).state().clone())
        };

        let reward = rollout(
            &mut state,
            self.policy,
            self.config.max_rollout_depth,
            self.deadline,
            rng,
        );

        self.tree.lock().backpropagate(leaf, reward, virtual_loss);
        trace!(leaf = leaf.index(), reward, "iteration");
    }
}
