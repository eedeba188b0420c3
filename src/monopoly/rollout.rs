use rand::Rng;

use super::actions::Action;
use super::state::MonopolyState;
use crate::search::RolloutPolicy;

/// A fixed preference ordering over actions, used as a cheap stand-in for a learned
/// estimator: buy, then develop, then recover mortgages, then get out of jail, then end the
/// turn. Spending that would leave less than `reserve` in cash is treated like liquidating.
/// Ties are broken uniformly.
#[derive(Debug, Clone, Copy)]
pub struct Greedy {
    pub reserve: i64,
}

impl Default for Greedy {
    fn default() -> Self {
        Self { reserve: 200 }
    }
}

impl Greedy {
    fn score(&self, state: &MonopolyState, action: Action) -> u8 {
        let affordable = state.agent_player().cash - state.cost_of(action) >= self.reserve;
        match action {
            Action::Purchase(_) if affordable => 6,
            Action::BuyHotel(_) if affordable => 5,
            Action::BuyHouse(_) if affordable => 4,
            Action::Unmortgage(_) if affordable => 3,
            Action::UseJailCard => 2,
            Action::PayJailFine if affordable => 2,
            Action::EndTurn => 1,
            _ => 0,
        }
    }
}

impl RolloutPolicy<MonopolyState> for Greedy {
    fn choose<R: Rng + ?Sized>(&self, state: &MonopolyState, legal: &[Action], rng: &mut R) -> Action {
        let best = legal
            .iter()
            .map(|&a| self.score(state, a))
            .max()
            .unwrap_or(0);
        let top: Vec<Action> = legal
            .iter()
            .copied()
            .filter(|&a| self.score(state, a) == best)
            .collect();
        top[rng.random_range(0..top.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monopoly::board::Board;
    use crate::monopoly::player::Recipient;
    use crate::monopoly::strategy::StrategyKind;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use std::sync::Arc;

    fn fresh_state() -> MonopolyState {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        MonopolyState::new(
            Arc::new(Board::standard().unwrap()),
            StrategyKind::Base,
            &[StrategyKind::Base],
            &mut rng,
        )
        .unwrap()
    }

    #[test]
    fn test_prefers_purchase_over_end_turn() {
        let mut state = fresh_state();
        let agent = state.agent();
        state.player_mut(agent).position = 39;
        let legal = state.legal_actions();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        assert_eq!(Greedy::default().choose(&state, &legal, &mut rng), Action::Purchase(39));
    }

    #[test]
    fn test_keeps_reserve() {
        let mut state = fresh_state();
        let agent = state.agent();
        state.player_mut(agent).position = 39;
        state.player_mut(agent).cash = 500;
        let legal = state.legal_actions();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        assert_eq!(Greedy::default().choose(&state, &legal, &mut rng), Action::EndTurn);
    }

    #[test]
    fn test_liquidates_when_in_debt() {
        let mut state = fresh_state();
        let agent = state.agent();
        state.grant_property(agent, 5);
        state.player_mut(agent).debts.insert(Recipient::Bank, 3000);
        let legal = state.legal_actions();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        assert_eq!(Greedy::default().choose(&state, &legal, &mut rng), Action::Mortgage(5));
    }
}
