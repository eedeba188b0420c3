use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::strategy::StrategyKind;

/// Seat index of a player in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(pub usize);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Creditor of an obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Recipient {
    Bank,
    Player(PlayerId),
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recipient::Bank => write!(f, "bank"),
            Recipient::Player(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JailStatus {
    #[default]
    Free,
    /// `turns` counts the jailed turns started so far.
    Jailed { turns: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub position: usize,
    pub cash: i64,
    /// Board positions of owned properties.
    pub properties: BTreeSet<usize>,
    pub jail: JailStatus,
    pub consecutive_doubles: u8,
    pub jail_cards: u8,
    pub bankrupt: bool,
    /// Deferred obligations, keyed by creditor.
    pub debts: BTreeMap<Recipient, i64>,
    pub strategy: StrategyKind,
}

impl Player {
    pub fn new(id: PlayerId, cash: i64, strategy: StrategyKind) -> Self {
        Self {
            id,
            position: 0,
            cash,
            properties: BTreeSet::new(),
            jail: JailStatus::Free,
            consecutive_doubles: 0,
            jail_cards: 0,
            bankrupt: false,
            debts: BTreeMap::new(),
            strategy,
        }
    }

    pub fn is_jailed(&self) -> bool {
        matches!(self.jail, JailStatus::Jailed { .. })
    }

    pub fn jailed_turns(&self) -> u8 {
        match self.jail {
            JailStatus::Jailed { turns } => turns,
            JailStatus::Free => 0,
        }
    }

    pub fn total_debt(&self) -> i64 {
        self.debts.values().sum()
    }

    pub fn is_active(&self) -> bool {
        !self.bankrupt
    }
}
