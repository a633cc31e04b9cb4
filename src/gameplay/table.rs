use super::action::Action;
use super::phase::Phase;
use crate::Chips;
use crate::Position;
use crate::cards::card::Card;
use crate::cards::deck::Deck;

/// the shared, mutating half of the game document: board, betting
/// state, and the monotonic ply counter that linearizes actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub phase: Phase,
    pub pot: Chips,
    pub board: Vec<Card>,
    /// burned before flop, turn, river; audit only
    pub burned: Vec<Card>,
    pub dealer: Position,
    /// seat on turn, while a betting round is open
    pub actor: Option<Position>,
    /// highest street stake; the amount to match
    pub stake: Chips,
    /// total a raise must reach
    pub min_raise: Chips,
    /// last full-raise increment
    pub last_raise: Chips,
    pub aggressor: Option<Position>,
    /// increments exactly once per applied decision or timeout.
    /// callbacks tagged with an older value are stale and dropped.
    pub ply: u64,
    pub deck: Deck,
    /// per-hand action trace, moved into the hand summary at the end
    pub actions: Vec<(Position, Action)>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            phase: Phase::Preflop,
            pot: 0,
            board: Vec::with_capacity(5),
            burned: Vec::with_capacity(3),
            dealer: 0,
            actor: None,
            stake: 0,
            min_raise: 0,
            last_raise: 0,
            aggressor: None,
            ply: 0,
            deck: Deck::shuffled(),
            actions: Vec::new(),
        }
    }
}

use serde::Deserialize;
use serde::Serialize;
