use super::CreditAccount;
use super::LedgerEntry;
use super::Player;
use super::RankSnapshot;
use super::Store;
use super::Versioned;
use crate::gameplay::game::Game;
use crate::gameplay::game::Status;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// In-process store with the same optimistic semantics as the real
/// one. Backs tests and --dev runs; nothing survives the process.
#[derive(Default)]
pub struct Memory {
    games: Mutex<HashMap<Uuid, (i64, Game)>>,
    players: Mutex<HashMap<String, Player>>,
    ledger: Mutex<Vec<LedgerEntry>>,
    credits: Mutex<Option<CreditAccount>>,
    snapshots: Mutex<Vec<RankSnapshot>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }
    /// test visibility into the ledger
    pub fn ledger_entries(&self) -> Vec<LedgerEntry> {
        self.ledger.lock().unwrap().clone()
    }
    pub fn snapshot_rows(&self) -> Vec<RankSnapshot> {
        self.snapshots.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Store for Memory {
    async fn insert_game(&self, game: &Game) -> Result<()> {
        self.games
            .lock()
            .unwrap()
            .insert(game.id, (0, game.clone()));
        Ok(())
    }

    async fn game(&self, id: Uuid) -> Result<Option<Versioned<Game>>> {
        Ok(self.games.lock().unwrap().get(&id).map(|(rev, doc)| {
            Versioned {
                rev: *rev,
                doc: doc.clone(),
            }
        }))
    }

    async fn update_game(&self, id: Uuid, rev: i64, game: &Game) -> Result<bool> {
        let mut games = self.games.lock().unwrap();
        match games.get_mut(&id) {
            Some(slot) if slot.0 == rev => {
                *slot = (rev + 1, game.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn games_by_status(&self, status: Status) -> Result<Vec<Game>> {
        Ok(self
            .games
            .lock()
            .unwrap()
            .values()
            .filter(|(_, g)| g.status == status)
            .map(|(_, g)| g.clone())
            .collect())
    }

    async fn live_count(&self) -> Result<usize> {
        Ok(self
            .games
            .lock()
            .unwrap()
            .values()
            .filter(|(_, g)| !g.is_dev)
            .filter(|(_, g)| matches!(g.status, Status::Active | Status::Waiting))
            .count())
    }

    async fn player(&self, model: &str) -> Result<Option<Player>> {
        Ok(self.players.lock().unwrap().get(model).cloned())
    }

    async fn upsert_player(&self, player: &Player) -> Result<()> {
        self.players
            .lock()
            .unwrap()
            .insert(player.model.clone(), player.clone());
        Ok(())
    }

    async fn players_by_balance(&self) -> Result<Vec<Player>> {
        let mut players = self
            .players
            .lock()
            .unwrap()
            .values()
            .cloned()
            .collect::<Vec<Player>>();
        players.sort_by(|a, b| b.balance.cmp(&a.balance));
        Ok(players)
    }

    async fn append_ledger(&self, entry: &LedgerEntry) -> Result<()> {
        self.ledger.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn debit(&self, player: &Player, entry: &LedgerEntry) -> Result<()> {
        self.players
            .lock()
            .unwrap()
            .insert(player.model.clone(), player.clone());
        self.ledger.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn settle(
        &self,
        id: Uuid,
        rev: i64,
        game: &Game,
        players: &[Player],
        entries: &[LedgerEntry],
    ) -> Result<bool> {
        let mut games = self.games.lock().unwrap();
        match games.get_mut(&id) {
            Some(slot) if slot.0 == rev => {
                *slot = (rev + 1, game.clone());
            }
            _ => return Ok(false),
        }
        let mut table = self.players.lock().unwrap();
        for player in players.iter() {
            table.insert(player.model.clone(), player.clone());
        }
        self.ledger.lock().unwrap().extend(entries.iter().cloned());
        Ok(true)
    }

    async fn credits(&self) -> Result<Option<CreditAccount>> {
        Ok(*self.credits.lock().unwrap())
    }

    async fn put_credits(&self, account: &CreditAccount) -> Result<()> {
        *self.credits.lock().unwrap() = Some(*account);
        Ok(())
    }

    async fn insert_snapshots(&self, rows: &[RankSnapshot]) -> Result<()> {
        self.snapshots.lock().unwrap().extend(rows.iter().cloned());
        Ok(())
    }
}
