//! Discretionary actions of the controlled player and their legality.
//!
//! Enumeration order is stable: solvency actions first (mortgage, sell hotel, sell house),
//! then jail exits, unmortgaging, building, purchase, and finally ending the turn.

use std::fmt;

use rand::Rng;
use tracing::debug;

use super::player::Recipient;
use super::state::MonopolyState;
use super::turn::{self, MAX_JAIL_TURNS};
use crate::error::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Mortgage(usize),
    SellHotel(usize),
    SellHouse(usize),
    UseJailCard,
    PayJailFine,
    Unmortgage(usize),
    BuyHotel(usize),
    BuyHouse(usize),
    Purchase(usize),
    EndTurn,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Mortgage(p) => write!(f, "mortgage {p}"),
            Action::SellHotel(p) => write!(f, "sell hotel {p}"),
            Action::SellHouse(p) => write!(f, "sell house {p}"),
            Action::UseJailCard => write!(f, "use jail card"),
            Action::PayJailFine => write!(f, "pay jail fine"),
            Action::Unmortgage(p) => write!(f, "unmortgage {p}"),
            Action::BuyHotel(p) => write!(f, "buy hotel {p}"),
            Action::BuyHouse(p) => write!(f, "buy house {p}"),
            Action::Purchase(p) => write!(f, "purchase {p}"),
            Action::EndTurn => write!(f, "end turn"),
        }
    }
}

/// Legal actions for the controlled player, without side effects. Empty when the player is
/// bankrupt or has nothing it may do.
pub fn enumerate(state: &MonopolyState) -> Vec<Action> {
    let agent = state.agent_player();
    if agent.bankrupt {
        return Vec::new();
    }
    let board = state.board();
    let mut actions = Vec::new();

    for &position in &agent.properties {
        let property = state.property(position);
        if !property.mortgaged && property.development == 0 {
            actions.push(Action::Mortgage(position));
        }
    }
    for &position in &agent.properties {
        if state.property(position).has_hotel() {
            actions.push(Action::SellHotel(position));
        }
    }
    for &position in &agent.properties {
        let property = state.property(position);
        if !property.has_hotel() && state.can_remove_level(position) {
            actions.push(Action::SellHouse(position));
        }
    }

    if !agent.debts.is_empty() {
        return actions;
    }

    if agent.is_jailed() {
        if agent.jail_cards > 0 {
            actions.push(Action::UseJailCard);
        }
        if agent.cash >= board.jail_fine() {
            actions.push(Action::PayJailFine);
        }
        if agent.jailed_turns() >= MAX_JAIL_TURNS {
            return actions;
        }
    }

    for &position in &agent.properties {
        if state.property(position).mortgaged && agent.cash >= board.unmortgage_price(position) {
            actions.push(Action::Unmortgage(position));
        }
    }
    for &position in &agent.properties {
        let Some(street) = board.street(position) else {
            continue;
        };
        let property = state.property(position);
        if property.development == 4
            && agent.cash >= street.house_price
            && state.can_add_level(agent.id, position)
        {
            actions.push(Action::BuyHotel(position));
        }
    }
    for &position in &agent.properties {
        let Some(street) = board.street(position) else {
            continue;
        };
        let property = state.property(position);
        if property.development < 4
            && agent.cash >= street.house_price
            && state.can_add_level(agent.id, position)
        {
            actions.push(Action::BuyHouse(position));
        }
    }

    if let Some(price) = board.space(agent.position).price() {
        if state.property(agent.position).owner.is_none() && agent.cash >= price {
            actions.push(Action::Purchase(agent.position));
        }
    }

    actions.push(Action::EndTurn);
    actions
}

impl MonopolyState {
    /// Legal actions for the controlled player. If nothing at all is legal the player is
    /// insolvent with no way out and is marked bankrupt here.
    pub fn legal_actions(&mut self) -> Vec<Action> {
        let actions = enumerate(self);
        if actions.is_empty() && !self.is_terminal() {
            let agent = self.agent;
            let unpaid = self
                .player(agent)
                .debts
                .iter()
                .next()
                .map(|(&r, &a)| (r, a));
            let owed = self.player(agent).total_debt();
            debug!(player = %agent, owed, "no legal action left");
            self.declare_bankrupt(agent, unpaid);
        }
        actions
    }

    /// Cash the controlled player spends on `action`, or receives if negative.
    pub fn cost_of(&self, action: Action) -> i64 {
        let board = self.board();
        let house_price = |p: usize| board.street(p).map_or(0, |s| s.house_price);
        match action {
            Action::Mortgage(p) => -board.mortgage_value(p),
            Action::SellHotel(p) | Action::SellHouse(p) => -house_price(p) / 2,
            Action::PayJailFine => board.jail_fine(),
            Action::Unmortgage(p) => board.unmortgage_price(p),
            Action::BuyHotel(p) | Action::BuyHouse(p) => house_price(p),
            Action::Purchase(p) => board.space(p).price().unwrap_or(0),
            Action::UseJailCard | Action::EndTurn => 0,
        }
    }

    /// Applies an action of the controlled player, then pays whatever ledger entries have
    /// become affordable. Rejects actions that are not currently legal.
    pub fn apply<R: Rng + ?Sized>(&mut self, action: Action, rng: &mut R) -> Result<(), GameError> {
        if !enumerate(self).contains(&action) {
            return Err(GameError::IllegalAction(action));
        }
        let agent = self.agent;
        let forced_jail_turn = self.player(agent).jailed_turns() >= MAX_JAIL_TURNS;
        debug!(player = %agent, %action, "applying action");

        match action {
            Action::Mortgage(position) => {
                self.property_mut(position).mortgaged = true;
                let value = self.board().mortgage_value(position);
                self.collect_from_bank(agent, value);
            }
            Action::Unmortgage(position) => {
                let cost = self.board().unmortgage_price(position);
                self.transfer(agent, Recipient::Bank, cost);
                self.property_mut(position).mortgaged = false;
            }
            Action::SellHotel(position) | Action::SellHouse(position) => {
                let value = self.cost_of(action).abs();
                self.property_mut(position).development -= 1;
                self.collect_from_bank(agent, value);
            }
            Action::BuyHotel(position) | Action::BuyHouse(position) => {
                let cost = self.cost_of(action);
                self.transfer(agent, Recipient::Bank, cost);
                self.property_mut(position).development += 1;
            }
            Action::UseJailCard => {
                self.player_mut(agent).jail_cards -= 1;
                self.release_from_jail(agent);
                if forced_jail_turn {
                    turn::finish_forced_release(self, rng);
                }
            }
            Action::PayJailFine => {
                let fine = self.board().jail_fine();
                self.transfer(agent, Recipient::Bank, fine);
                self.release_from_jail(agent);
                if forced_jail_turn {
                    turn::finish_forced_release(self, rng);
                }
            }
            Action::Purchase(position) => {
                let price = self.cost_of(action);
                self.transfer(agent, Recipient::Bank, price);
                self.grant_property(agent, position);
            }
            Action::EndTurn => {
                turn::end_agent_turn(self, rng);
                return Ok(());
            }
        }

        turn::pay_ledger(self, agent);
        Ok(())
    }
}
