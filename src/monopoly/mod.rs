//! # Monopoly rules engine
//!
//! The game as seen by one controlled player (the "agent", seat 0) playing against
//! strategy-driven opponents.
//!
//! ## Turn model
//! The agent only ever acts through [`Action`]s at a decision point that follows its own
//! roll. Ending the turn runs every opponent's full turn and then the agent's next roll, so
//! one [`MonopolyState::apply`] of [`Action::EndTurn`] can cover a whole round.
//!
//! ## Money
//! Every payment is either a player-to-player transfer or goes through the bank, and the
//! bank's balance is tracked, so total money is conserved except for the cash written off
//! when a player goes bankrupt.

pub mod actions;
pub mod board;
pub mod cards;
pub mod debt;
pub mod player;
pub mod rollout;
pub mod simulation;
pub mod state;
pub mod strategy;
pub mod turn;

pub use actions::{enumerate, Action};
pub use board::{Board, Space, HOTEL_LEVEL};
pub use cards::{CardDeck, CardEffect, DeckKind, CHANCE_CARDS, COMMUNITY_CHEST_CARDS};
pub use debt::raise_funds;
pub use player::{JailStatus, Player, PlayerId, Recipient};
pub use rollout::Greedy;
pub use simulation::{play_game, SimulationOutcome};
pub use state::{DiceRoll, MonopolyState, PropertyState, Treasury};
pub use strategy::{BaseStrategy, JailExit, RandomStrategy, Strategy, StrategyKind};
pub use turn::{agent_turn, take_turn};
