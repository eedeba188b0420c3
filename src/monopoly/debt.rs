//! Automatic fund raising for a player facing a payment it cannot cover.
//!
//! Buildings go first: colour groups are visited from the largest combined development down,
//! and inside a group the most developed street is stripped first. Selling a hotel clears the
//! street in one step for half the house price. If cash is still short, undeveloped
//! properties, stations and utilities are mortgaged from the lowest mortgage value up.

use monopoly_data::ColourGroup;
use tracing::debug;

use super::player::PlayerId;
use super::state::MonopolyState;

/// Raises cash for `player` until it holds at least `amount`, or nothing sellable is left.
/// Returns whether the player can now pay.
pub fn raise_funds(state: &mut MonopolyState, player: PlayerId, amount: i64) -> bool {
    let shortfall = amount - state.player(player).cash;
    if shortfall <= 0 {
        return true;
    }
    let from_buildings = sell_buildings(state, player, shortfall);
    let still_short = amount - state.player(player).cash;
    let from_mortgages = if still_short > 0 {
        mortgage_properties(state, player, still_short)
    } else {
        0
    };
    debug!(
        %player, amount, from_buildings, from_mortgages,
        cash = state.player(player).cash,
        "raised funds"
    );
    state.player(player).cash >= amount
}

fn sell_buildings(state: &mut MonopolyState, player: PlayerId, needed: i64) -> i64 {
    let mut groups: Vec<(ColourGroup, u32)> = ColourGroup::ALL
        .iter()
        .map(|&group| {
            let combined = state
                .board()
                .group_members(group)
                .iter()
                .filter(|&&p| state.property(p).owner == Some(player))
                .map(|&p| u32::from(state.property(p).development))
                .sum();
            (group, combined)
        })
        .filter(|&(_, combined)| combined > 0)
        .collect();
    groups.sort_by(|a, b| b.1.cmp(&a.1));

    let mut raised = 0;
    for (group, _) in groups {
        let members: Vec<usize> = state
            .board()
            .group_members(group)
            .iter()
            .copied()
            .filter(|&p| state.property(p).owner == Some(player))
            .collect();
        while raised < needed {
            let Some(target) = most_developed(state, &members) else {
                break;
            };
            let house_price = state.board().street(target).map_or(0, |s| s.house_price);
            let property = state.property_mut(target);
            if property.has_hotel() {
                property.development = 0;
            } else {
                property.development -= 1;
            }
            let value = house_price / 2;
            state.collect_from_bank(player, value);
            raised += value;
        }
        if raised >= needed {
            break;
        }
    }
    raised
}

/// First street among `members` with the highest non-zero development.
fn most_developed(state: &MonopolyState, members: &[usize]) -> Option<usize> {
    members
        .iter()
        .copied()
        .filter(|&p| state.property(p).development > 0)
        .fold(None, |best: Option<usize>, p| match best {
            Some(b) if state.property(b).development >= state.property(p).development => Some(b),
            _ => Some(p),
        })
}

fn mortgage_properties(state: &mut MonopolyState, player: PlayerId, needed: i64) -> i64 {
    let mut candidates: Vec<(i64, usize)> = state
        .player(player)
        .properties
        .iter()
        .copied()
        .filter(|&p| {
            let property = state.property(p);
            !property.mortgaged && property.development == 0
        })
        .map(|p| (state.board().mortgage_value(p), p))
        .collect();
    candidates.sort();

    let mut raised = 0;
    for (value, position) in candidates {
        if raised >= needed {
            break;
        }
        state.property_mut(position).mortgaged = true;
        state.collect_from_bank(player, value);
        raised += value;
    }
    raised
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monopoly::board::Board;
    use crate::monopoly::strategy::StrategyKind;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use std::sync::Arc;

    fn fresh_state() -> MonopolyState {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        MonopolyState::new(
            Arc::new(Board::standard().unwrap()),
            StrategyKind::Base,
            &[StrategyKind::Base],
            &mut rng,
        )
        .unwrap()
    }

    #[test]
    fn test_mortgages_cheapest_first_until_covered() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.player_mut(me).cash = 40;
        for position in [39, 5, 1] {
            state.grant_property(me, position);
        }
        assert!(raise_funds(&mut state, me, 120));
        // Old Kent Road (30) then King's Cross (100); Mayfair is untouched.
        assert!(state.property(1).mortgaged);
        assert!(state.property(5).mortgaged);
        assert!(!state.property(39).mortgaged);
        assert_eq!(state.player(me).cash, 170);
    }

    #[test]
    fn test_sells_from_most_developed_group_first() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.player_mut(me).cash = 0;
        for position in [1, 3, 37, 39] {
            state.grant_property(me, position);
        }
        state.property_mut(1).development = 1;
        state.property_mut(3).development = 1;
        state.property_mut(37).development = 2;
        state.property_mut(39).development = 3;

        // One dark-blue house covers it: sold from Mayfair, the most developed street.
        assert!(raise_funds(&mut state, me, 90));
        assert_eq!(state.property(39).development, 2);
        assert_eq!(state.property(37).development, 2);
        assert_eq!(state.property(1).development, 1);
        assert_eq!(state.player(me).cash, 100);
    }

    #[test]
    fn test_hotel_sale_clears_street() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.player_mut(me).cash = 0;
        state.grant_property(me, 37);
        state.grant_property(me, 39);
        state.property_mut(37).development = 4;
        state.property_mut(39).development = 5;
        assert!(raise_funds(&mut state, me, 100));
        assert_eq!(state.property(39).development, 0);
        assert_eq!(state.property(37).development, 4);
    }

    #[test]
    fn test_reports_failure_when_nothing_left() {
        let mut state = fresh_state();
        let me = PlayerId(1);
        state.player_mut(me).cash = 10;
        state.grant_property(me, 1);
        assert!(!raise_funds(&mut state, me, 500));
        assert!(state.property(1).mortgaged);
        assert_eq!(state.player(me).cash, 40);
    }
}
