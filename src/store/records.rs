use crate::Chips;
use crate::gameplay::stats::SeatStats;
use uuid::Uuid;

/// durable identity for one model across games. mutated only by the
/// buy-in debit at game creation and by settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub model: String,
    pub balance: i64,
    pub total_buy_ins: Chips,
    pub total_cash_outs: Chips,
    pub games_played: u64,
    pub games_won: u64,
    pub biggest_win: i64,
    pub biggest_loss: i64,
    pub tokens_spent: u64,
    pub cost_usd: f64,
    pub stats: SeatStats,
    pub created_at: i64,
}

impl Player {
    pub fn new(model: String, balance: i64) -> Self {
        Self {
            model,
            balance,
            total_buy_ins: 0,
            total_cash_outs: 0,
            games_played: 0,
            games_won: 0,
            biggest_win: 0,
            biggest_loss: 0,
            tokens_spent: 0,
            cost_usd: 0.0,
            stats: SeatStats::default(),
            created_at: crate::now_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    BuyIn,
    CashOut,
    Adjustment,
}

impl LedgerKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::BuyIn => "buy_in",
            LedgerKind::CashOut => "cash_out",
            LedgerKind::Adjustment => "adjustment",
        }
    }
}

/// append-only money movement. per model, the amounts must sum to
/// the change in balance since genesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub model: String,
    pub game: Uuid,
    pub kind: LedgerKind,
    pub amount: i64,
    pub balance_after: i64,
    pub created_at: i64,
}

impl LedgerEntry {
    pub fn new(model: String, game: Uuid, kind: LedgerKind, amount: i64, balance_after: i64) -> Self {
        Self {
            id: Uuid::now_v7(),
            model,
            game,
            kind,
            amount,
            balance_after,
            created_at: crate::now_ms(),
        }
    }
}

/// the singleton budget row read by the scheduler gate
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CreditAccount {
    pub balance: f64,
    pub used: f64,
    pub limit: f64,
    pub last_synced_at: i64,
}

impl CreditAccount {
    pub fn fraction(&self) -> f64 {
        match self.limit > 0.0 {
            true => self.balance / self.limit,
            false => 0.0,
        }
    }
}

/// one row of the post-settlement leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankSnapshot {
    pub model: String,
    pub balance: i64,
    pub rank: u32,
    pub taken_at: i64,
}

use serde::Deserialize;
use serde::Serialize;
