//! The full snapshot of one game instant.
//!
//! `MonopolyState` is what the search clones at every expansion and rollout, so everything
//! mutable lives in plain owned collections and the immutable board is shared through an
//! `Arc`. A clone never aliases mutable data with its source.
//!
//! Money only moves through [`MonopolyState::transfer`] and
//! [`MonopolyState::collect_from_bank`], which keep the treasury in step: the sum of all
//! player cash plus the bank balance is conserved, except when a bankruptcy writes off the
//! remaining cash of the bankrupt player.

use std::sync::Arc;

use monopoly_data::{ColourGroup, TaxKind, STARTING_CASH};
use rand::Rng;
use tracing::warn;

use super::board::{Board, Space, HOTEL_LEVEL};
use super::cards::{CardDeck, DeckKind, CHANCE_CARDS, COMMUNITY_CHEST_CARDS};
use super::player::{JailStatus, Player, PlayerId, Recipient};
use super::strategy::StrategyKind;
use super::turn;
use crate::error::GameError;

/// Mutable state of one ownable space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertyState {
    pub owner: Option<PlayerId>,
    pub mortgaged: bool,
    /// 0 to 4 houses, or [`HOTEL_LEVEL`] for a hotel. Always 0 for stations and utilities.
    pub development: u8,
}

impl PropertyState {
    pub fn has_hotel(&self) -> bool {
        self.development == HOTEL_LEVEL
    }

    pub fn houses(&self) -> u8 {
        if self.has_hotel() {
            0
        } else {
            self.development
        }
    }
}

/// Two six-sided dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
    pub first: u8,
    pub second: u8,
}

impl DiceRoll {
    pub fn new(first: u8, second: u8) -> Self {
        Self { first, second }
    }

    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            first: rng.random_range(1..=6),
            second: rng.random_range(1..=6),
        }
    }

    pub fn total(&self) -> usize {
        usize::from(self.first) + usize::from(self.second)
    }

    pub fn is_double(&self) -> bool {
        self.first == self.second
    }
}

/// Money held outside the players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Treasury {
    /// Net balance of the bank. Starts at zero and goes negative as it pays out.
    pub bank: i64,
    /// Cash destroyed by bankruptcies.
    pub written_off: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonopolyState {
    pub(crate) board: Arc<Board>,
    pub(crate) properties: Vec<PropertyState>,
    pub(crate) players: Vec<Player>,
    pub(crate) agent: PlayerId,
    pub(crate) chance: CardDeck,
    pub(crate) community_chest: CardDeck,
    pub(crate) treasury: Treasury,
    pub(crate) rounds: u32,
    /// The agent rolled a double on its last turn and rolls again after ending it.
    pub(crate) extra_turn_pending: bool,
    pub(crate) last_roll: Option<DiceRoll>,
}

impl MonopolyState {
    /// Sets up a game before anyone has rolled. The controlled player sits in seat 0 and
    /// each opponent strategy takes the following seats in order.
    pub fn new<R: Rng + ?Sized>(
        board: Arc<Board>,
        agent_strategy: StrategyKind,
        opponents: &[StrategyKind],
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if opponents.is_empty() {
            return Err(GameError::NoOpponents);
        }
        let players = std::iter::once(agent_strategy)
            .chain(opponents.iter().copied())
            .enumerate()
            .map(|(seat, strategy)| Player::new(PlayerId(seat), STARTING_CASH, strategy))
            .collect();
        let properties = vec![PropertyState::default(); board.len()];
        let chance = CardDeck::shuffled(&CHANCE_CARDS, rng);
        let community_chest = CardDeck::shuffled(&COMMUNITY_CHEST_CARDS, rng);

        Ok(Self {
            board,
            properties,
            players,
            agent: PlayerId(0),
            chance,
            community_chest,
            treasury: Treasury::default(),
            rounds: 0,
            extra_turn_pending: false,
            last_roll: None,
        })
    }

    /// A standard game with the agent's opening roll already resolved, so the state is at
    /// the agent's first decision point.
    pub fn standard<R: Rng + ?Sized>(opponents: &[StrategyKind], rng: &mut R) -> Result<Self, GameError> {
        let board = Arc::new(Board::standard()?);
        let mut state = Self::new(board, StrategyKind::Base, opponents, rng)?;
        state.begin(rng);
        Ok(state)
    }

    /// Rolls and resolves the agent's first turn.
    pub fn begin<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        turn::agent_turn(self, rng);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn shared_board(&self) -> Arc<Board> {
        Arc::clone(&self.board)
    }

    pub fn agent(&self) -> PlayerId {
        self.agent
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.0]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.0]
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn agent_player(&self) -> &Player {
        self.player(self.agent)
    }

    pub fn opponents(&self) -> impl Iterator<Item = &Player> + '_ {
        let agent = self.agent;
        self.players.iter().filter(move |p| p.id != agent)
    }

    pub fn active_players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().filter(|p| p.is_active()).map(|p| p.id)
    }

    pub fn property(&self, position: usize) -> &PropertyState {
        &self.properties[position]
    }

    pub fn property_mut(&mut self, position: usize) -> &mut PropertyState {
        &mut self.properties[position]
    }

    pub fn treasury(&self) -> Treasury {
        self.treasury
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn last_roll(&self) -> Option<DiceRoll> {
        self.last_roll
    }

    pub fn extra_turn_pending(&self) -> bool {
        self.extra_turn_pending
    }

    pub fn deck(&self, kind: DeckKind) -> &CardDeck {
        match kind {
            DeckKind::Chance => &self.chance,
            DeckKind::CommunityChest => &self.community_chest,
        }
    }

    /// Replaces a deck, for replaying a known card order.
    pub fn set_deck(&mut self, kind: DeckKind, deck: CardDeck) {
        match kind {
            DeckKind::Chance => self.chance = deck,
            DeckKind::CommunityChest => self.community_chest = deck,
        }
    }

    pub(crate) fn draw(&mut self, kind: DeckKind) -> Option<super::cards::CardEffect> {
        match kind {
            DeckKind::Chance => self.chance.draw(),
            DeckKind::CommunityChest => self.community_chest.draw(),
        }
    }

    /// Gives `position` to `player`, taking it from any previous owner.
    pub fn grant_property(&mut self, player: PlayerId, position: usize) {
        if let Some(previous) = self.properties[position].owner {
            self.players[previous.0].properties.remove(&position);
        }
        self.properties[position].owner = Some(player);
        self.players[player.0].properties.insert(position);
    }

    /// True once the agent is bankrupt or every opponent is.
    pub fn is_terminal(&self) -> bool {
        self.agent_player().bankrupt || self.opponents().all(|p| p.bankrupt)
    }

    /// Zero for a bankrupt agent, otherwise the agent's wealth over the mean opponent wealth.
    pub fn reward(&self) -> f64 {
        if self.agent_player().bankrupt {
            return 0.0;
        }
        let opponents: Vec<i64> = self.opponents().map(|p| self.wealth(p.id)).collect();
        let mean = opponents.iter().sum::<i64>() as f64 / opponents.len().max(1) as f64;
        self.wealth(self.agent) as f64 / mean.max(1.0)
    }

    /// Cash, plus properties at face price (mortgage value if mortgaged), plus development
    /// at the house price per level.
    pub fn wealth(&self, player: PlayerId) -> i64 {
        let p = self.player(player);
        let holdings: i64 = p
            .properties
            .iter()
            .map(|&position| {
                let property = &self.properties[position];
                let space = self.board.space(position);
                let price = space.price().unwrap_or(0);
                let face = if property.mortgaged {
                    super::board::mortgage_value(price)
                } else {
                    price
                };
                let development = space
                    .as_street()
                    .map_or(0, |s| i64::from(property.development) * s.house_price);
                face + development
            })
            .sum();
        p.cash + holdings
    }

    pub fn owns_whole_group(&self, player: PlayerId, group: ColourGroup) -> bool {
        self.board
            .group_members(group)
            .iter()
            .all(|&p| self.properties[p].owner == Some(player))
    }

    pub fn stations_owned(&self, player: PlayerId) -> usize {
        self.board
            .stations()
            .iter()
            .filter(|&&p| self.properties[p].owner == Some(player))
            .count()
    }

    pub fn utilities_owned(&self, player: PlayerId) -> usize {
        self.board
            .utilities()
            .iter()
            .filter(|&&p| self.properties[p].owner == Some(player))
            .count()
    }

    /// Houses and hotels owned by `player`.
    pub fn buildings(&self, player: PlayerId) -> (i64, i64) {
        self.player(player)
            .properties
            .iter()
            .map(|&p| &self.properties[p])
            .fold((0, 0), |(houses, hotels), prop| {
                if prop.has_hotel() {
                    (houses, hotels + 1)
                } else {
                    (houses + i64::from(prop.development), hotels)
                }
            })
    }

    /// Rent owed for landing on `position` with `dice_total` on the dice. Zero when the
    /// property is unowned, mortgaged, or its owner is bankrupt.
    pub fn rent_for(&self, position: usize, dice_total: usize) -> i64 {
        let property = &self.properties[position];
        let Some(owner) = property.owner else {
            return 0;
        };
        if property.mortgaged || self.player(owner).bankrupt {
            return 0;
        }
        match self.board.space(position) {
            Space::Street(street) => {
                let level = usize::from(property.development);
                if level == 0 && self.owns_whole_group(owner, street.group) {
                    street.rents[0] * 2
                } else {
                    street.rents[level]
                }
            }
            Space::Station(station) => {
                let held = self.stations_owned(owner).clamp(1, station.rents.len());
                station.rents[held - 1]
            }
            Space::Utility(utility) => {
                let held = self.utilities_owned(owner).clamp(1, utility.multipliers.len());
                utility.multipliers[held - 1] * dice_total as i64
            }
            _ => 0,
        }
    }

    /// Tax owed by `player` on the tax space at `position`.
    pub fn tax_due(&self, player: PlayerId, position: usize) -> i64 {
        match self.board.space(position) {
            Space::Tax(tax) => match tax.kind {
                TaxKind::Income => tax.amount.min(self.wealth(player) / 10),
                TaxKind::Flat => tax.amount,
            },
            _ => 0,
        }
    }

    /// Whether one more level can go on the street at `position` for `player`: the whole
    /// group is owned, nothing is mortgaged at the target, and after the build no group
    /// member lags more than one level behind.
    pub fn can_add_level(&self, player: PlayerId, position: usize) -> bool {
        let Some(street) = self.board.street(position) else {
            return false;
        };
        let property = &self.properties[position];
        if property.owner != Some(player)
            || property.mortgaged
            || property.development >= HOTEL_LEVEL
            || !self.owns_whole_group(player, street.group)
        {
            return false;
        }
        let after = property.development + 1;
        self.board
            .group_members(street.group)
            .iter()
            .filter(|&&p| p != position)
            .all(|&p| after <= self.properties[p].development + 1)
    }

    /// Whether one level can come off the street at `position` while no group member ends
    /// up more than one level above it.
    pub fn can_remove_level(&self, position: usize) -> bool {
        let Some(street) = self.board.street(position) else {
            return false;
        };
        let development = self.properties[position].development;
        if development == 0 {
            return false;
        }
        let after = development - 1;
        self.board
            .group_members(street.group)
            .iter()
            .filter(|&&p| p != position)
            .all(|&p| self.properties[p].development <= after + 1)
    }

    /// Cash of every player plus the bank balance.
    pub fn money_supply(&self) -> i64 {
        self.players.iter().map(|p| p.cash).sum::<i64>() + self.treasury.bank
    }

    /// Moves `amount` from `from` to `to`. The caller has checked affordability.
    pub fn transfer(&mut self, from: PlayerId, to: Recipient, amount: i64) {
        self.players[from.0].cash -= amount;
        match to {
            Recipient::Bank => self.treasury.bank += amount,
            Recipient::Player(id) => self.players[id.0].cash += amount,
        }
    }

    pub fn collect_from_bank(&mut self, player: PlayerId, amount: i64) {
        self.treasury.bank -= amount;
        self.players[player.0].cash += amount;
    }

    /// Marks `player` bankrupt and writes off whatever cash it still holds. The unpaid
    /// obligation, if any, is abandoned.
    pub fn declare_bankrupt(&mut self, player: PlayerId, unpaid: Option<(Recipient, i64)>) {
        let p = &mut self.players[player.0];
        if p.bankrupt {
            return;
        }
        let residual = p.cash;
        p.bankrupt = true;
        p.cash = 0;
        p.debts.clear();
        p.jail = JailStatus::Free;
        self.treasury.written_off += residual;
        match unpaid {
            Some((creditor, amount)) => warn!(
                %player, %creditor, amount, written_off = residual,
                "player bankrupt, obligation abandoned"
            ),
            None => warn!(%player, written_off = residual, "player bankrupt"),
        }
    }

    /// Moves `player` forward, crediting Go income if the move wraps past Go.
    pub fn move_forward(&mut self, player: PlayerId, steps: usize) -> usize {
        let from = self.players[player.0].position;
        let to = self.board.advance(from, steps);
        self.move_to(player, to, true);
        to
    }

    /// Puts `player` on `target`. Go income is credited only when `collect_go` is set and
    /// the move wraps past Go.
    pub fn move_to(&mut self, player: PlayerId, target: usize, collect_go: bool) {
        let from = self.players[player.0].position;
        self.players[player.0].position = target;
        if collect_go && from > target {
            let income = self.board.go_income();
            self.collect_from_bank(player, income);
        }
    }

    /// Jails `player` without any Go income and clears its doubles streak.
    pub fn send_to_jail(&mut self, player: PlayerId) {
        let jail = self.board.jail_position();
        let p = &mut self.players[player.0];
        p.position = jail;
        p.jail = JailStatus::Jailed { turns: 0 };
        p.consecutive_doubles = 0;
        if player == self.agent {
            self.extra_turn_pending = false;
        }
    }

    pub fn release_from_jail(&mut self, player: PlayerId) {
        self.players[player.0].jail = JailStatus::Free;
    }
}

impl crate::GameState for MonopolyState {
    type Move = super::Action;

    fn get_possible_moves(&mut self) -> Vec<Self::Move> {
        self.legal_actions()
    }

    fn make_move<R: Rng + ?Sized>(&mut self, mv: &Self::Move, rng: &mut R) {
        if let Err(err) = self.apply(*mv, rng) {
            warn!(error = %err, "rejected move");
        }
    }

    fn is_terminal(&self) -> bool {
        MonopolyState::is_terminal(self)
    }

    fn reward(&self) -> f64 {
        MonopolyState::reward(self)
    }

    fn rounds(&self) -> u32 {
        self.rounds
    }
}
