//! Rollout policies.
//!
//! A rollout policy picks the next action during simulation. It is the only piece of the
//! search that may know anything about the game, and swapping it never touches selection,
//! expansion or backpropagation.

use rand::Rng;

use crate::GameState;

pub trait RolloutPolicy<S: GameState>: Send + Sync {
    /// Picks one of `legal`, which is never empty.
    fn choose<R: Rng + ?Sized>(&self, state: &S, legal: &[S::Move], rng: &mut R) -> S::Move;
}

/// Picks uniformly among the legal actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformRandom;

impl<S: GameState> RolloutPolicy<S> for UniformRandom {
    fn choose<R: Rng + ?Sized>(&self, _state: &S, legal: &[S::Move], rng: &mut R) -> S::Move {
        legal[rng.random_range(0..legal.len())].clone()
    }
}
