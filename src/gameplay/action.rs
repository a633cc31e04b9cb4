use crate::Chips;

/// an applied, already-validated action as it lands in the log,
/// the hand trace, and the persisted history. Raise and Shove carry
/// the street total; Call and Blind carry the chips moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "amount", rename_all = "snake_case")]
pub enum Action {
    Blind(Chips),
    Fold,
    Check,
    Call(Chips),
    Raise(Chips),
    Shove(Chips),
}

impl Action {
    /// chips put in voluntarily, i.e. VPIP
    pub fn is_voluntary(&self) -> bool {
        matches!(self, Action::Call(_) | Action::Raise(_) | Action::Shove(_))
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Action::Blind(amount) => write!(f, "BLIND {}", amount),
            Action::Fold => write!(f, "FOLD"),
            Action::Check => write!(f, "CHECK"),
            Action::Call(amount) => write!(f, "CALL  {}", amount),
            Action::Raise(total) => write!(f, "RAISE {}", total),
            Action::Shove(total) => write!(f, "SHOVE {}", total),
        }
    }
}

/// what a model proposes, before validation against the legal set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proposal {
    Fold,
    Check,
    Call,
    Raise(Chips),
    Shove,
}

impl Display for Proposal {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Proposal::Fold => write!(f, "FOLD"),
            Proposal::Check => write!(f, "CHECK"),
            Proposal::Call => write!(f, "CALL"),
            Proposal::Raise(total) => write!(f, "RAISE ${}", total),
            Proposal::Shove => write!(f, "ALL-IN"),
        }
    }
}

/// the legal-action summary for the seat on turn, computed inside
/// the transaction that arms the turn and shipped to the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legal {
    pub can_check: bool,
    pub can_call: bool,
    pub can_raise: bool,
    pub call_amount: Chips,
    pub min_raise_total: Chips,
    pub max_raise_total: Chips,
}

use serde::Deserialize;
use serde::Serialize;
use std::fmt::{Display, Formatter, Result};
