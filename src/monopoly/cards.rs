//! Chance and Community Chest decks.
//!
//! A deck is shuffled once when it is created and then replayed round-robin for the rest of
//! the game: drawing advances a pointer modulo the deck size and never reshuffles.

use rand::seq::SliceRandom;
use rand::Rng;

/// Everything a card can do. Every card in both decks is one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardEffect {
    AdvanceToGo,
    /// Move to a fixed position, collecting Go income if the move wraps.
    AdvanceTo { position: usize },
    /// Move to the next station and pay double rent if it is owned.
    AdvanceToNearestStation,
    /// Move to the next utility and pay ten times the dice if it is owned.
    AdvanceToNearestUtility,
    MoveBack { spaces: usize },
    GoToJail,
    Collect { amount: i64 },
    Pay { amount: i64 },
    Repairs { per_house: i64, per_hotel: i64 },
    PayEachPlayer { amount: i64 },
    CollectFromEachPlayer { amount: i64 },
    GetOutOfJailFree,
}

pub const CHANCE_CARDS: [CardEffect; 16] = [
    CardEffect::AdvanceToGo,
    CardEffect::AdvanceTo { position: 24 },
    CardEffect::AdvanceTo { position: 39 },
    CardEffect::AdvanceTo { position: 11 },
    CardEffect::AdvanceToNearestStation,
    CardEffect::AdvanceToNearestStation,
    CardEffect::AdvanceToNearestUtility,
    CardEffect::Collect { amount: 50 },
    CardEffect::GetOutOfJailFree,
    CardEffect::MoveBack { spaces: 3 },
    CardEffect::GoToJail,
    CardEffect::Repairs { per_house: 25, per_hotel: 100 },
    CardEffect::Pay { amount: 15 },
    CardEffect::AdvanceTo { position: 5 },
    CardEffect::PayEachPlayer { amount: 50 },
    CardEffect::Collect { amount: 150 },
];

pub const COMMUNITY_CHEST_CARDS: [CardEffect; 16] = [
    CardEffect::AdvanceToGo,
    CardEffect::Collect { amount: 200 },
    CardEffect::Pay { amount: 50 },
    CardEffect::Collect { amount: 50 },
    CardEffect::GetOutOfJailFree,
    CardEffect::GoToJail,
    CardEffect::Collect { amount: 100 },
    CardEffect::Collect { amount: 20 },
    CardEffect::CollectFromEachPlayer { amount: 10 },
    CardEffect::Collect { amount: 100 },
    CardEffect::Pay { amount: 100 },
    CardEffect::Pay { amount: 50 },
    CardEffect::Collect { amount: 25 },
    CardEffect::Repairs { per_house: 40, per_hotel: 115 },
    CardEffect::Collect { amount: 10 },
    CardEffect::Collect { amount: 100 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeckKind {
    Chance,
    CommunityChest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDeck {
    cards: Vec<CardEffect>,
    next: usize,
}

impl CardDeck {
    /// A deck holding `cards` in a random permutation.
    pub fn shuffled<R: Rng + ?Sized>(cards: &[CardEffect], rng: &mut R) -> Self {
        let mut cards = cards.to_vec();
        cards.shuffle(rng);
        Self { cards, next: 0 }
    }

    /// A deck that replays `cards` in exactly the given order.
    pub fn in_order(cards: &[CardEffect]) -> Self {
        Self {
            cards: cards.to_vec(),
            next: 0,
        }
    }

    /// Draws the next card, wrapping to the first after the last. An empty deck draws nothing.
    pub fn draw(&mut self) -> Option<CardEffect> {
        let card = *self.cards.get(self.next)?;
        self.next = (self.next + 1) % self.cards.len();
        Some(card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[CardEffect] {
        &self.cards
    }
}
