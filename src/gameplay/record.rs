use super::action::Action;
use super::phase::Phase;
use crate::Chips;
use crate::Position;
use crate::cards::card::Card;

/// one line of the bounded in-game log. the discriminator tag is
/// mandatory; each variant carries only the fields it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEntry {
    Action {
        hand: u32,
        seat: Position,
        #[serde(flatten)]
        action: Action,
        at: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        reasoning: Option<String>,
    },
    Phase {
        hand: u32,
        phase: Phase,
        at: i64,
    },
    System {
        hand: u32,
        content: String,
        at: i64,
    },
}

impl LogEntry {
    /// legacy rows predate the tag: rows carrying an action field are
    /// action records, anything else is a system line.
    pub fn upgrade(row: &mut serde_json::Value) {
        if let Some(object) = row.as_object_mut() {
            if !object.contains_key("kind") {
                let kind = if object.contains_key("action") {
                    "action"
                } else {
                    "system"
                };
                object.insert("kind".into(), serde_json::Value::String(kind.into()));
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinCondition {
    Showdown,
    AllFolded,
}

/// the durable summary of one completed hand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandSummary {
    pub hand: u32,
    pub pot: Chips,
    pub board: Vec<Card>,
    pub winners: Vec<String>,
    pub condition: WinCondition,
    pub actions: Vec<(Position, Action)>,
}

/// final per-seat accounting persisted on the game at settlement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatResult {
    pub model: String,
    pub stack: Chips,
    pub profit: i64,
}

use serde::Deserialize;
use serde::Serialize;
