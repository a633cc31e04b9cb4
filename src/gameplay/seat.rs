use crate::Chips;
use crate::Position;
use crate::cards::card::Card;

/// one chair at one game. fixed for the game's duration; stacks
/// carry across hands, everything else resets per hand or street.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub model: String,
    pub position: Position,
    pub stack: Chips,
    pub hole: Vec<Card>,
    /// chips committed this street
    pub stake: Chips,
    /// chips committed this hand, across streets
    pub spent: Chips,
    pub folded: bool,
    pub all_in: bool,
    pub acted: bool,
}

impl Seat {
    pub fn new(model: String, position: Position, stack: Chips) -> Self {
        Self {
            model,
            position,
            stack,
            hole: Vec::new(),
            stake: 0,
            spent: 0,
            folded: false,
            all_in: false,
            acted: false,
        }
    }

    /// still contesting the pot
    pub fn live(&self) -> bool {
        !self.folded
    }
    /// may still be asked for a decision
    pub fn can_act(&self) -> bool {
        !self.folded && !self.all_in
    }

    /// move chips from the stack into this street's stake.
    /// a commitment of the whole stack is an all-in.
    pub fn commit(&mut self, amount: Chips) {
        assert!(amount <= self.stack, "over-commit at seat {}", self.position);
        self.stack -= amount;
        self.stake += amount;
        self.spent += amount;
        self.all_in = self.stack == 0 && self.spent > 0;
    }

    pub fn reset_for_street(&mut self) {
        self.stake = 0;
        self.acted = self.all_in;
    }

    /// busted seats sit the hand out as folded
    pub fn reset_for_hand(&mut self) {
        self.hole.clear();
        self.stake = 0;
        self.spent = 0;
        self.all_in = false;
        self.acted = false;
        self.folded = self.stack == 0;
    }
}

use serde::Deserialize;
use serde::Serialize;
