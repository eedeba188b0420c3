//! Monte Carlo Tree Search over any [`GameState`](crate::GameState).
//!
//! Each iteration selects a node by UCB1, expands one untried action, plays a rollout from
//! a private clone of the new node's state, and backpropagates the reward to the root. The
//! committed action is the root child with the best average reward.
//!
//! Searches can run on a rayon pool. The arena sits behind one `parking_lot::Mutex` that
//! is held for selection, expansion and backpropagation but not for rollouts, and virtual
//! visits keep concurrent workers off the same path.

mod config;
mod engine;
mod node;
mod policy;
mod tree;

pub use config::MctsConfig;
pub use engine::{choose_action, rollout, GameSummary, SearchOutcome, SearchStats, MCTS};
pub use node::{Node, NodeId};
pub use policy::{RolloutPolicy, UniformRandom};
pub use tree::SearchTree;
