use crate::Chips;

/// running in-game counters for one model, merged into its durable
/// record at settlement. the preflop counters are the usual VPIP/PFR
/// telemetry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeatStats {
    pub hands_dealt: u64,
    /// hands with at least one voluntary commitment (VPIP)
    pub hands_played: u64,
    pub preflop_raises: u64,
    pub preflop_calls: u64,
    pub preflop_folds: u64,
    pub folds: u64,
    pub checks: u64,
    pub calls: u64,
    pub raises: u64,
    pub shoves: u64,
    pub chips_committed: Chips,
    pub showdowns_seen: u64,
    pub showdowns_won: u64,
    pub timeouts: u64,
    pub invalid_actions: u64,
    pub tokens: u64,
    pub cost: f64,
}

impl SeatStats {
    pub fn merge(&mut self, other: &SeatStats) {
        self.hands_dealt += other.hands_dealt;
        self.hands_played += other.hands_played;
        self.preflop_raises += other.preflop_raises;
        self.preflop_calls += other.preflop_calls;
        self.preflop_folds += other.preflop_folds;
        self.folds += other.folds;
        self.checks += other.checks;
        self.calls += other.calls;
        self.raises += other.raises;
        self.shoves += other.shoves;
        self.chips_committed += other.chips_committed;
        self.showdowns_seen += other.showdowns_seen;
        self.showdowns_won += other.showdowns_won;
        self.timeouts += other.timeouts;
        self.invalid_actions += other.invalid_actions;
        self.tokens += other.tokens;
        self.cost += other.cost;
    }
}

use serde::Deserialize;
use serde::Serialize;
