//! # Monopoly MCTS
//!
//! A Monte Carlo Tree Search agent for Monopoly together with the rules engine it
//! simulates against.
//!
//! The crate is split the same way the search sees the world:
//! - [`GameState`] is the seam between the generic search and a concrete game.
//! - [`search`] holds the arena search tree, the UCB1 engine and rollout policies.
//! - [`monopoly`] holds the board, cards, players, turn resolution, debt raising,
//!   legal-action enumeration and the opponent strategies.
//!
//! ## Usage
//! ```rust,ignore
//! use mcts::monopoly::{MonopolyState, StrategyKind};
//! use mcts::search::{MctsConfig, MCTS};
//! use rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256PlusPlus;
//!
//! let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
//! let state = MonopolyState::standard(&[StrategyKind::Base, StrategyKind::Random], &mut rng)?;
//! let mut engine = MCTS::new(state, MctsConfig::default().with_iterations(500))?;
//! let summary = engine.run_game(200, 100, &mut rng);
//! println!("reward {:.3} after {} actions", summary.reward, summary.actions.len());
//! ```

use rand::Rng;

pub mod error;
pub mod monopoly;
pub mod search;

pub use error::{BoardError, GameError, SearchError};
pub use search::{choose_action, GameSummary, MctsConfig, SearchOutcome, SearchStats, MCTS};

/// A snapshot the search can explore. Must be cloneable to be used in the MCTS.
/// `Send` and `Sync` are required for parallel processing.
///
/// Clones must be fully independent: a rollout mutates its own clone and must never be
/// able to observe or corrupt the node it was spawned from. Equality lets the engine keep a
/// searched subtree when a live move lands on the state that was already sampled for it.
pub trait GameState: Clone + PartialEq + Send + Sync {
    /// The type of a move in the game.
    type Move: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync;

    /// Returns all legal moves for the controlled player, in a stable order.
    ///
    /// Takes `&mut self` because a decision point with nothing legal is itself a state
    /// change: the controlled player is marked as eliminated.
    fn get_possible_moves(&mut self) -> Vec<Self::Move>;
    /// Applies a move to the state, modifying it. Chance events draw from `rng`.
    fn make_move<R: Rng + ?Sized>(&mut self, mv: &Self::Move, rng: &mut R);
    /// Returns true if the game is over from the controlled player's point of view.
    fn is_terminal(&self) -> bool;
    /// Payoff for the controlled player. Also evaluated on depth-capped rollouts.
    fn reward(&self) -> f64;
    /// Completed rounds, used by round-capped game drivers.
    fn rounds(&self) -> u32 {
        0
    }
}
