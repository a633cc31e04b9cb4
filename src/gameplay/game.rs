use super::record::HandSummary;
use super::record::LogEntry;
use super::record::SeatResult;
use super::seat::Seat;
use super::stats::SeatStats;
use super::table::Table;
use crate::ACTION_LOG_CAP;
use crate::Chips;
use crate::Position;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Waiting,
    Active,
    Completed,
    Cancelled,
}

impl Status {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Status::Waiting => "waiting",
            Status::Active => "active",
            Status::Completed => "completed",
            Status::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Config {
    pub buy_in: Chips,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub max_hands: u32,
    pub turn_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buy_in: crate::DEFAULT_BUY_IN,
            small_blind: crate::DEFAULT_S_BLIND,
            big_blind: crate::DEFAULT_B_BLIND,
            max_hands: crate::DEFAULT_MAX_HANDS,
            turn_timeout_ms: crate::DEFAULT_TURN_TIMEOUT_MS,
        }
    }
}

/// The persisted game document, the single source of truth for one
/// table. Every mutation is a read-validate-write cycle against the
/// store; the table's ply counter drops stale callbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub status: Status,
    pub config: Config,
    pub seats: Vec<Seat>,
    pub table: Table,
    pub stats: BTreeMap<String, SeatStats>,
    /// most recent entries only, capped
    pub log: Vec<LogEntry>,
    pub hands: Vec<HandSummary>,
    /// seat a decision is currently awaited from
    pub thinking: Option<Position>,
    pub current_hand: u32,
    pub ai_cost: f64,
    pub tokens_spent: u64,
    pub is_dev: bool,
    pub created_at: i64,
    pub completed_at: Option<i64>,
    pub results: Vec<SeatResult>,
}

impl Game {
    pub fn create(config: Config, models: &[String], is_dev: bool) -> Self {
        Self {
            id: Uuid::now_v7(),
            status: Status::Waiting,
            seats: models
                .iter()
                .enumerate()
                .map(|(i, m)| Seat::new(m.clone(), i, config.buy_in))
                .collect(),
            table: Table::default(),
            stats: models
                .iter()
                .map(|m| (m.clone(), SeatStats::default()))
                .collect(),
            log: Vec::new(),
            hands: Vec::new(),
            thinking: None,
            current_hand: 0,
            ai_cost: 0.0,
            tokens_spent: 0,
            is_dev,
            created_at: crate::now_ms(),
            completed_at: None,
            results: Vec::new(),
            config,
        }
    }

    pub fn seat(&self, position: Position) -> &Seat {
        &self.seats[position]
    }
    pub fn seat_mut(&mut self, position: Position) -> &mut Seat {
        &mut self.seats[position]
    }
    pub fn stat_mut(&mut self, position: Position) -> &mut SeatStats {
        let model = self.seats[position].model.clone();
        self.stats.entry(model).or_default()
    }

    /// seats still holding or owed chips this hand
    pub fn n_funded(&self) -> usize {
        self.seats.iter().filter(|s| s.stack > 0).count()
    }
    /// seats contesting the current pot
    pub fn n_live(&self) -> usize {
        self.seats.iter().filter(|s| s.live()).count()
    }
    /// seats that can still be asked for a decision
    pub fn n_bettable(&self) -> usize {
        self.seats.iter().filter(|s| s.can_act()).count()
    }

    /// next seat clockwise from `from` with chips behind, skipping
    /// busted seats
    pub fn next_funded(&self, from: Position) -> Position {
        let n = self.seats.len();
        (1..=n)
            .map(|i| (from + i) % n)
            .find(|&p| self.seats[p].stack > 0 || self.seats[p].spent > 0)
            .expect("at least one funded seat")
    }

    pub fn log_push(&mut self, entry: LogEntry) {
        self.log.push(entry);
        if self.log.len() > ACTION_LOG_CAP {
            let excess = self.log.len() - ACTION_LOG_CAP;
            self.log.drain(..excess);
        }
    }

    /// chip conservation: stacks plus hand commitments are constant
    /// for the duration of a hand
    pub fn circulating(&self) -> Chips {
        self.seats.iter().map(|s| s.stack + s.spent).sum()
    }
}

use serde::Deserialize;
use serde::Serialize;
