/// a full 52-card deck with a cursor over the next undealt card.
/// the order is fixed at shuffle time and persisted with the game,
/// so a crashed process resumes dealing from the same sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
    next: usize,
}

impl Deck {
    /// a fresh, shuffled deck. Fisher-Yates via rand.
    pub fn shuffled() -> Deck {
        let mut cards = (0..52).map(Card::from).collect::<Vec<Card>>();
        let mut rng = rand::rng();
        cards.shuffle(&mut rng);
        Deck { cards, next: 0 }
    }

    /// deal the next card, advancing the cursor
    pub fn draw(&mut self) -> Option<Card> {
        let card = self.cards.get(self.next).copied();
        self.next += card.is_some() as usize;
        card
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::shuffled()
    }
}

use super::card::Card;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde::Serialize;
