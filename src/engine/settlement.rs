use super::dispatcher::Engine;
use super::job::Job;
use crate::gameplay::game::Status;
use crate::gameplay::record::SeatResult;
use crate::store::LedgerEntry;
use crate::store::LedgerKind;
use crate::store::Player;
use crate::store::RankSnapshot;
use crate::store::Versioned;
use anyhow::Result;
use uuid::Uuid;

impl Engine {
    /// Fold a completed game into the durable player records: cash
    /// every stack out, merge the in-game stats, append the ledger
    /// rows, and persist the per-seat results — one store
    /// transaction, guarded by the game revision so a duplicate
    /// settle is a no-op. Afterwards the leaderboard snapshot and a
    /// credit re-sync go out as separate best-effort jobs.
    pub(super) async fn settle(&self, id: Uuid) -> Result<()> {
        let Some(Versioned { rev, doc: mut game }) = self.store().game(id).await? else {
            return Ok(());
        };
        if game.status != Status::Completed || !game.results.is_empty() {
            return Ok(());
        }
        let top = game.seats.iter().map(|s| s.stack).max().unwrap_or(0);
        let mut players = Vec::new();
        let mut entries = Vec::new();
        for seat in game.seats.clone() {
            let mut player = match self.store().player(&seat.model).await? {
                Some(player) => player,
                None => Player::new(seat.model.clone(), 0),
            };
            let profit = seat.stack as i64 - game.config.buy_in as i64;
            player.balance += seat.stack as i64;
            player.total_cash_outs += seat.stack;
            player.games_played += 1;
            player.games_won += (top > 0 && seat.stack == top) as u64;
            player.biggest_win = player.biggest_win.max(profit);
            player.biggest_loss = player.biggest_loss.min(profit);
            if let Some(stats) = game.stats.get(&seat.model) {
                player.stats.merge(stats);
                player.tokens_spent += stats.tokens;
                player.cost_usd += stats.cost;
            }
            entries.push(LedgerEntry::new(
                seat.model.clone(),
                id,
                LedgerKind::CashOut,
                seat.stack as i64,
                player.balance,
            ));
            players.push(player);
            game.results.push(SeatResult {
                model: seat.model.clone(),
                stack: seat.stack,
                profit,
            });
        }
        if self.store().settle(id, rev, &game, &players, &entries).await? {
            log::info!("[engine {}] settled {} seats", id, players.len());
            self.after(0, Job::Snapshot);
            self.after(0, Job::SyncCredits);
        }
        Ok(())
    }

    /// rank every player by balance and persist one snapshot row each
    pub(super) async fn snapshot(&self) -> Result<()> {
        let players = self.store().players_by_balance().await?;
        let taken_at = crate::now_ms();
        let rows = players
            .iter()
            .enumerate()
            .map(|(i, p)| RankSnapshot {
                model: p.model.clone(),
                balance: p.balance,
                rank: i as u32 + 1,
                taken_at,
            })
            .collect::<Vec<RankSnapshot>>();
        self.store().insert_snapshots(&rows).await
    }
}
