//! Strategy-only games, where every seat including the controlled one follows its strategy.
//! Used as a baseline against the search.

use rand::Rng;
use tracing::info;

use super::player::PlayerId;
use super::state::MonopolyState;
use super::turn::take_turn;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    pub rounds: u32,
    pub survivors: Vec<PlayerId>,
    /// Final wealth per seat.
    pub wealth: Vec<i64>,
    /// The controlled seat's reward at the end.
    pub reward: f64,
}

/// Plays rounds of strategy-driven turns until one player is left or `max_rounds` rounds
/// have been played. Expects a state on which nobody has rolled yet.
pub fn play_game<R: Rng + ?Sized>(
    state: &mut MonopolyState,
    max_rounds: u32,
    rng: &mut R,
) -> SimulationOutcome {
    let seats: Vec<PlayerId> = state.players().iter().map(|p| p.id).collect();
    while state.rounds() < max_rounds && state.active_players().count() > 1 {
        state.rounds += 1;
        for &seat in &seats {
            if state.active_players().count() <= 1 {
                break;
            }
            take_turn(state, seat, rng);
        }
    }

    let outcome = SimulationOutcome {
        rounds: state.rounds(),
        survivors: state.active_players().collect(),
        wealth: seats.iter().map(|&p| state.wealth(p)).collect(),
        reward: state.reward(),
    };
    info!(
        rounds = outcome.rounds,
        survivors = outcome.survivors.len(),
        reward = outcome.reward,
        "strategy game finished"
    );
    outcome
}
