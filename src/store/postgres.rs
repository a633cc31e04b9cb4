use super::CreditAccount;
use super::LedgerEntry;
use super::Player;
use super::RankSnapshot;
use super::Store;
use super::Versioned;
use crate::gameplay::game::Game;
use crate::gameplay::game::Status;
use crate::gameplay::record::LogEntry;
use anyhow::Context;
use anyhow::Result;
use tokio_postgres::Client;
use uuid::Uuid;

pub const GAMES: &str = "games";
pub const PLAYERS: &str = "players";
pub const TRANSACTIONS: &str = "transactions";
pub const CREDITS: &str = "credits";
pub const SNAPSHOTS: &str = "rank_snapshots";

/// PostgreSQL store. The game lives in one row as a serialized
/// document next to a physical revision column; conditional writes
/// on the revision give the engine its optimistic lock. The session
/// is mutexed so multi-statement settlements run in a real
/// transaction without interleaving.
pub struct Postgres {
    client: tokio::sync::Mutex<Client>,
}

impl Postgres {
    pub fn new(client: Client) -> Self {
        Self {
            client: tokio::sync::Mutex::new(client),
        }
    }

    pub async fn migrate(&self) -> Result<()> {
        log::info!("ensuring schema");
        const DDL: &str = const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            GAMES,
            " (
                id          TEXT PRIMARY KEY,
                status      TEXT NOT NULL,
                is_dev      BOOLEAN NOT NULL,
                created_at  BIGINT NOT NULL,
                ply         BIGINT NOT NULL,
                rev         BIGINT NOT NULL,
                state       TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_",
            GAMES,
            "_status ON ",
            GAMES,
            " (status);
            CREATE INDEX IF NOT EXISTS idx_",
            GAMES,
            "_created ON ",
            GAMES,
            " (created_at);
            CREATE INDEX IF NOT EXISTS idx_",
            GAMES,
            "_dev ON ",
            GAMES,
            " (is_dev);
            CREATE TABLE IF NOT EXISTS ",
            PLAYERS,
            " (
                model       TEXT PRIMARY KEY,
                balance     BIGINT NOT NULL,
                state       TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_",
            PLAYERS,
            "_balance ON ",
            PLAYERS,
            " (balance);
            CREATE TABLE IF NOT EXISTS ",
            TRANSACTIONS,
            " (
                id            TEXT PRIMARY KEY,
                model         TEXT NOT NULL,
                game          TEXT NOT NULL,
                kind          TEXT NOT NULL,
                amount        BIGINT NOT NULL,
                balance_after BIGINT NOT NULL,
                created_at    BIGINT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_",
            TRANSACTIONS,
            "_model ON ",
            TRANSACTIONS,
            " (model);
            CREATE INDEX IF NOT EXISTS idx_",
            TRANSACTIONS,
            "_game ON ",
            TRANSACTIONS,
            " (game);
            CREATE TABLE IF NOT EXISTS ",
            CREDITS,
            " (
                id             SMALLINT PRIMARY KEY,
                balance        DOUBLE PRECISION NOT NULL,
                used           DOUBLE PRECISION NOT NULL,
                lim            DOUBLE PRECISION NOT NULL,
                last_synced_at BIGINT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS ",
            SNAPSHOTS,
            " (
                model    TEXT NOT NULL,
                balance  BIGINT NOT NULL,
                rank     INTEGER NOT NULL,
                taken_at BIGINT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_",
            SNAPSHOTS,
            "_model ON ",
            SNAPSHOTS,
            " (model);
            CREATE INDEX IF NOT EXISTS idx_",
            SNAPSHOTS,
            "_taken ON ",
            SNAPSHOTS,
            " (taken_at);"
        );
        self.client.lock().await.batch_execute(DDL).await?;
        Ok(())
    }
}

fn encode<T: serde::Serialize>(doc: &T) -> Result<String> {
    serde_json::to_string(doc).context("encode document")
}

fn decode_game(text: &str) -> Result<Game> {
    let mut doc: serde_json::Value = serde_json::from_str(text)?;
    if let Some(rows) = doc.get_mut("log").and_then(|l| l.as_array_mut()) {
        for row in rows.iter_mut() {
            LogEntry::upgrade(row);
        }
    }
    serde_json::from_value(doc).context("decode game document")
}

fn decode_player(text: &str) -> Result<Player> {
    serde_json::from_str(text).context("decode player document")
}

#[async_trait::async_trait]
impl Store for Postgres {
    async fn insert_game(&self, game: &Game) -> Result<()> {
        const SQL: &str = const_format::concatcp!(
            "INSERT INTO ",
            GAMES,
            " (id, status, is_dev, created_at, ply, rev, state)
              VALUES ($1, $2, $3, $4, $5, 0, $6)"
        );
        self.client
            .lock()
            .await
            .execute(
                SQL,
                &[
                    &game.id.to_string(),
                    &game.status.as_str(),
                    &game.is_dev,
                    &game.created_at,
                    &(game.table.ply as i64),
                    &encode(game)?,
                ],
            )
            .await?;
        Ok(())
    }

    async fn game(&self, id: Uuid) -> Result<Option<Versioned<Game>>> {
        const SQL: &str = const_format::concatcp!(
            "SELECT rev, state FROM ",
            GAMES,
            " WHERE id = $1"
        );
        let row = self
            .client
            .lock()
            .await
            .query_opt(SQL, &[&id.to_string()])
            .await?;
        match row {
            Some(row) => Ok(Some(Versioned {
                rev: row.get::<_, i64>(0),
                doc: decode_game(row.get::<_, &str>(1))?,
            })),
            None => Ok(None),
        }
    }

    async fn update_game(&self, id: Uuid, rev: i64, game: &Game) -> Result<bool> {
        const SQL: &str = const_format::concatcp!(
            "UPDATE ",
            GAMES,
            " SET state = $3, status = $4, ply = $5, rev = rev + 1
              WHERE id = $1 AND rev = $2"
        );
        let n = self
            .client
            .lock()
            .await
            .execute(
                SQL,
                &[
                    &id.to_string(),
                    &rev,
                    &encode(game)?,
                    &game.status.as_str(),
                    &(game.table.ply as i64),
                ],
            )
            .await?;
        Ok(n == 1)
    }

    async fn games_by_status(&self, status: Status) -> Result<Vec<Game>> {
        const SQL: &str = const_format::concatcp!(
            "SELECT state FROM ",
            GAMES,
            " WHERE status = $1 ORDER BY created_at"
        );
        let rows = self
            .client
            .lock()
            .await
            .query(SQL, &[&status.as_str()])
            .await?;
        rows.iter()
            .map(|row| decode_game(row.get::<_, &str>(0)))
            .collect()
    }

    async fn live_count(&self) -> Result<usize> {
        const SQL: &str = const_format::concatcp!(
            "SELECT COUNT(*) FROM ",
            GAMES,
            " WHERE status IN ('waiting', 'active') AND NOT is_dev"
        );
        let row = self.client.lock().await.query_one(SQL, &[]).await?;
        Ok(row.get::<_, i64>(0) as usize)
    }

    async fn player(&self, model: &str) -> Result<Option<Player>> {
        const SQL: &str = const_format::concatcp!(
            "SELECT state FROM ",
            PLAYERS,
            " WHERE model = $1"
        );
        let row = self.client.lock().await.query_opt(SQL, &[&model]).await?;
        row.map(|row| decode_player(row.get::<_, &str>(0))).transpose()
    }

    async fn upsert_player(&self, player: &Player) -> Result<()> {
        const SQL: &str = const_format::concatcp!(
            "INSERT INTO ",
            PLAYERS,
            " (model, balance, state) VALUES ($1, $2, $3)
              ON CONFLICT (model) DO UPDATE
              SET balance = EXCLUDED.balance, state = EXCLUDED.state"
        );
        self.client
            .lock()
            .await
            .execute(SQL, &[&player.model, &player.balance, &encode(player)?])
            .await?;
        Ok(())
    }

    async fn players_by_balance(&self) -> Result<Vec<Player>> {
        const SQL: &str = const_format::concatcp!(
            "SELECT state FROM ",
            PLAYERS,
            " ORDER BY balance DESC"
        );
        let rows = self.client.lock().await.query(SQL, &[]).await?;
        rows.iter()
            .map(|row| decode_player(row.get::<_, &str>(0)))
            .collect()
    }

    async fn append_ledger(&self, entry: &LedgerEntry) -> Result<()> {
        const SQL: &str = const_format::concatcp!(
            "INSERT INTO ",
            TRANSACTIONS,
            " (id, model, game, kind, amount, balance_after, created_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7)"
        );
        self.client
            .lock()
            .await
            .execute(
                SQL,
                &[
                    &entry.id.to_string(),
                    &entry.model,
                    &entry.game.to_string(),
                    &entry.kind.as_str(),
                    &entry.amount,
                    &entry.balance_after,
                    &entry.created_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn debit(&self, player: &Player, entry: &LedgerEntry) -> Result<()> {
        const UPSERT: &str = const_format::concatcp!(
            "INSERT INTO ",
            PLAYERS,
            " (model, balance, state) VALUES ($1, $2, $3)
              ON CONFLICT (model) DO UPDATE
              SET balance = EXCLUDED.balance, state = EXCLUDED.state"
        );
        const LEDGER: &str = const_format::concatcp!(
            "INSERT INTO ",
            TRANSACTIONS,
            " (id, model, game, kind, amount, balance_after, created_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7)"
        );
        let mut guard = self.client.lock().await;
        let tx = guard.transaction().await?;
        tx.execute(UPSERT, &[&player.model, &player.balance, &encode(player)?])
            .await?;
        tx.execute(
            LEDGER,
            &[
                &entry.id.to_string(),
                &entry.model,
                &entry.game.to_string(),
                &entry.kind.as_str(),
                &entry.amount,
                &entry.balance_after,
                &entry.created_at,
            ],
        )
        .await?;
        tx.commit().await?;
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
        const UPDATE: &str = const_format::concatcp!(
            "UPDATE ",
            GAMES,
            " SET state = $3, status = $4, ply = $5, rev = rev + 1
              WHERE id = $1 AND rev = $2"
        );
        const UPSERT: &str = const_format::concatcp!(
            "INSERT INTO ",
            PLAYERS,
            " (model, balance, state) VALUES ($1, $2, $3)
              ON CONFLICT (model) DO UPDATE
              SET balance = EXCLUDED.balance, state = EXCLUDED.state"
        );
        const LEDGER: &str = const_format::concatcp!(
            "INSERT INTO ",
            TRANSACTIONS,
            " (id, model, game, kind, amount, balance_after, created_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7)"
        );
        let mut guard = self.client.lock().await;
        let tx = guard.transaction().await?;
        let n = tx
            .execute(
                UPDATE,
                &[
                    &id.to_string(),
                    &rev,
                    &encode(game)?,
                    &game.status.as_str(),
                    &(game.table.ply as i64),
                ],
            )
            .await?;
        if n != 1 {
            tx.rollback().await?;
            return Ok(false);
        }
        for player in players.iter() {
            tx.execute(UPSERT, &[&player.model, &player.balance, &encode(player)?])
                .await?;
        }
        for entry in entries.iter() {
            tx.execute(
                LEDGER,
                &[
                    &entry.id.to_string(),
                    &entry.model,
                    &entry.game.to_string(),
                    &entry.kind.as_str(),
                    &entry.amount,
                    &entry.balance_after,
                    &entry.created_at,
                ],
            )
            .await?;
        }
        tx.commit().await?;
        Ok(true)
    }

    async fn credits(&self) -> Result<Option<CreditAccount>> {
        const SQL: &str = const_format::concatcp!(
            "SELECT balance, used, lim, last_synced_at FROM ",
            CREDITS,
            " WHERE id = 1"
        );
        let row = self.client.lock().await.query_opt(SQL, &[]).await?;
        Ok(row.map(|row| CreditAccount {
            balance: row.get(0),
            used: row.get(1),
            limit: row.get(2),
            last_synced_at: row.get(3),
        }))
    }

    async fn put_credits(&self, account: &CreditAccount) -> Result<()> {
        const SQL: &str = const_format::concatcp!(
            "INSERT INTO ",
            CREDITS,
            " (id, balance, used, lim, last_synced_at) VALUES (1, $1, $2, $3, $4)
              ON CONFLICT (id) DO UPDATE
              SET balance = EXCLUDED.balance, used = EXCLUDED.used,
                  lim = EXCLUDED.lim, last_synced_at = EXCLUDED.last_synced_at"
        );
        self.client
            .lock()
            .await
            .execute(
                SQL,
                &[
                    &account.balance,
                    &account.used,
                    &account.limit,
                    &account.last_synced_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn insert_snapshots(&self, rows: &[RankSnapshot]) -> Result<()> {
        const SQL: &str = const_format::concatcp!(
            "INSERT INTO ",
            SNAPSHOTS,
            " (model, balance, rank, taken_at) VALUES ($1, $2, $3, $4)"
        );
        let guard = self.client.lock().await;
        for row in rows.iter() {
            guard
                .execute(
                    SQL,
                    &[&row.model, &row.balance, &(row.rank as i32), &row.taken_at],
                )
                .await?;
        }
        Ok(())
    }
}
