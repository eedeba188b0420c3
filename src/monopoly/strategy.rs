//! Decision policies for players that are not controlled by the search.
//!
//! A strategy only answers yes/no questions; the turn engine owns legality, ordering and
//! the money movements. Debt raising is fixed behaviour and is not a strategy decision.

use std::str::FromStr;

use monopoly_data::ColourGroup;
use rand::Rng;

use super::board::Space;
use super::player::PlayerId;
use super::state::MonopolyState;

/// Ways out of jail before the forced release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JailExit {
    UseCard,
    PayFine,
}

pub trait Strategy {
    /// Whether to buy the unowned property at `position`. Only asked when affordable.
    fn should_buy<R: Rng + ?Sized>(
        &self,
        state: &MonopolyState,
        player: PlayerId,
        position: usize,
        rng: &mut R,
    ) -> bool;

    /// Whether to leave jail early, and how.
    fn leave_jail<R: Rng + ?Sized>(
        &self,
        state: &MonopolyState,
        player: PlayerId,
        rng: &mut R,
    ) -> Option<JailExit>;

    /// Whether to lift the mortgage on `position`. Only asked when affordable.
    fn should_unmortgage<R: Rng + ?Sized>(
        &self,
        state: &MonopolyState,
        player: PlayerId,
        position: usize,
        rng: &mut R,
    ) -> bool;

    /// Whether to add one level of development to `position`. Only asked when legal.
    fn should_build<R: Rng + ?Sized>(
        &self,
        state: &MonopolyState,
        player: PlayerId,
        position: usize,
        rng: &mut R,
    ) -> bool;
}

/// Buys streets while collecting groups, always buys stations and utilities, and spends on
/// development whenever it can.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseStrategy;

/// Takes every legal decision with probability one half.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomStrategy;

/// Streets owned before the base strategy stops starting new groups.
const OPEN_GROUP_LIMIT: usize = 3;

impl BaseStrategy {
    fn wants_street(state: &MonopolyState, player: PlayerId, group: ColourGroup) -> bool {
        let owned = &state.player(player).properties;
        let streets_owned = owned
            .iter()
            .filter(|&&p| state.board().street(p).is_some())
            .count();
        let owns_group_member = state
            .board()
            .group_members(group)
            .iter()
            .any(|p| owned.contains(p));
        owns_group_member || streets_owned < OPEN_GROUP_LIMIT
    }
}

impl Strategy for BaseStrategy {
    fn should_buy<R: Rng + ?Sized>(
        &self,
        state: &MonopolyState,
        player: PlayerId,
        position: usize,
        _rng: &mut R,
    ) -> bool {
        match state.board().space(position) {
            Space::Street(street) => Self::wants_street(state, player, street.group),
            Space::Station(_) | Space::Utility(_) => true,
            _ => false,
        }
    }

    fn leave_jail<R: Rng + ?Sized>(
        &self,
        state: &MonopolyState,
        player: PlayerId,
        _rng: &mut R,
    ) -> Option<JailExit> {
        let p = state.player(player);
        if p.jail_cards > 0 {
            Some(JailExit::UseCard)
        } else if p.cash >= state.board().jail_fine() {
            Some(JailExit::PayFine)
        } else {
            None
        }
    }

    fn should_unmortgage<R: Rng + ?Sized>(
        &self,
        _state: &MonopolyState,
        _player: PlayerId,
        _position: usize,
        _rng: &mut R,
    ) -> bool {
        true
    }

    fn should_build<R: Rng + ?Sized>(
        &self,
        _state: &MonopolyState,
        _player: PlayerId,
        _position: usize,
        _rng: &mut R,
    ) -> bool {
        true
    }
}

impl Strategy for RandomStrategy {
    fn should_buy<R: Rng + ?Sized>(
        &self,
        _state: &MonopolyState,
        _player: PlayerId,
        _position: usize,
        rng: &mut R,
    ) -> bool {
        rng.random_bool(0.5)
    }

    fn leave_jail<R: Rng + ?Sized>(
        &self,
        state: &MonopolyState,
        player: PlayerId,
        rng: &mut R,
    ) -> Option<JailExit> {
        let p = state.player(player);
        if p.jail_cards > 0 && rng.random_bool(0.5) {
            Some(JailExit::UseCard)
        } else if p.cash >= state.board().jail_fine() && rng.random_bool(0.5) {
            Some(JailExit::PayFine)
        } else {
            None
        }
    }

    fn should_unmortgage<R: Rng + ?Sized>(
        &self,
        _state: &MonopolyState,
        _player: PlayerId,
        _position: usize,
        rng: &mut R,
    ) -> bool {
        rng.random_bool(0.5)
    }

    fn should_build<R: Rng + ?Sized>(
        &self,
        _state: &MonopolyState,
        _player: PlayerId,
        _position: usize,
        rng: &mut R,
    ) -> bool {
        rng.random_bool(0.5)
    }
}

/// Strategy carried by each player. A closed enum keeps game states `Clone + Send + Sync`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrategyKind {
    #[default]
    Base,
    Random,
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Base => "base",
            StrategyKind::Random => "random",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(StrategyKind::Base),
            "random" => Ok(StrategyKind::Random),
            other => Err(format!("unknown strategy '{other}', expected 'base' or 'random'")),
        }
    }
}

impl Strategy for StrategyKind {
    fn should_buy<R: Rng + ?Sized>(
        &self,
        state: &MonopolyState,
        player: PlayerId,
        position: usize,
        rng: &mut R,
    ) -> bool {
        match self {
            StrategyKind::Base => BaseStrategy.should_buy(state, player, position, rng),
            StrategyKind::Random => RandomStrategy.should_buy(state, player, position, rng),
        }
    }

    fn leave_jail<R: Rng + ?Sized>(
        &self,
        state: &MonopolyState,
        player: PlayerId,
        rng: &mut R,
    ) -> Option<JailExit> {
        match self {
            StrategyKind::Base => BaseStrategy.leave_jail(state, player, rng),
            StrategyKind::Random => RandomStrategy.leave_jail(state, player, rng),
        }
    }

    fn should_unmortgage<R: Rng + ?Sized>(
        &self,
        state: &MonopolyState,
        player: PlayerId,
        position: usize,
        rng: &mut R,
    ) -> bool {
        match self {
            StrategyKind::Base => BaseStrategy.should_unmortgage(state, player, position, rng),
            StrategyKind::Random => RandomStrategy.should_unmortgage(state, player, position, rng),
        }
    }

    fn should_build<R: Rng + ?Sized>(
        &self,
        state: &MonopolyState,
        player: PlayerId,
        position: usize,
        rng: &mut R,
    ) -> bool {
        match self {
            StrategyKind::Base => BaseStrategy.should_build(state, player, position, rng),
            StrategyKind::Random => RandomStrategy.should_build(state, player, position, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monopoly::board::Board;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use std::sync::Arc;

    fn fresh_state() -> MonopolyState {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        MonopolyState::new(
            Arc::new(Board::standard().unwrap()),
            StrategyKind::Base,
            &[StrategyKind::Base],
            &mut rng,
        )
        .unwrap()
    }

    #[test]
    fn test_base_buys_first_streets_then_only_group_members() {
        let mut state = fresh_state();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let me = PlayerId(1);
        assert!(BaseStrategy.should_buy(&state, me, 1, &mut rng));

        for position in [6, 11, 16] {
            state.grant_property(me, position);
        }
        // Three streets from three groups: only group members are still attractive.
        assert!(!BaseStrategy.should_buy(&state, me, 21, &mut rng));
        assert!(BaseStrategy.should_buy(&state, me, 18, &mut rng));
        assert!(BaseStrategy.should_buy(&state, me, 5, &mut rng));
        assert!(BaseStrategy.should_buy(&state, me, 12, &mut rng));
    }

    #[test]
    fn test_base_leaves_jail_by_card_first() {
        let mut state = fresh_state();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let me = PlayerId(1);
        assert_eq!(BaseStrategy.leave_jail(&state, me, &mut rng), Some(JailExit::PayFine));
        state.player_mut(me).jail_cards = 1;
        assert_eq!(BaseStrategy.leave_jail(&state, me, &mut rng), Some(JailExit::UseCard));
        state.player_mut(me).jail_cards = 0;
        state.player_mut(me).cash = 10;
        assert_eq!(BaseStrategy.leave_jail(&state, me, &mut rng), None);
    }

    #[test]
    fn test_strategy_kind_parses() {
        assert_eq!("Base".parse::<StrategyKind>(), Ok(StrategyKind::Base));
        assert_eq!("random".parse::<StrategyKind>(), Ok(StrategyKind::Random));
        assert!("greedy".parse::<StrategyKind>().is_err());
    }
}
