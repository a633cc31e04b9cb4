use super::dispatcher::Engine;
use super::job::Job;
use crate::MAX_CONCURRENT;
use crate::MIN_CREDIT_FRACTION;
use crate::gameplay::game::Config;
use crate::gameplay::game::Game;
use crate::gameplay::game::Status;
use crate::players::roster::Roster;
use crate::store::LedgerEntry;
use crate::store::LedgerKind;
use anyhow::Result;
use uuid::Uuid;

/// what one creation attempt decided, and why
#[derive(Debug, Clone)]
pub struct Outcome {
    pub created: bool,
    pub reason: Option<String>,
    pub game: Option<Uuid>,
}

impl Outcome {
    fn skipped(reason: impl Into<String>) -> Self {
        Self {
            created: false,
            reason: Some(reason.into()),
            game: None,
        }
    }
}

/// Autonomous game creation. A periodic tick checks the concurrency
/// ceiling and the credit budget, then seats the fixed roster in a
/// fresh game, debiting every buy-in against the durable balances.
/// The force entrypoint skips the gates but never the debits.
#[derive(Clone)]
pub struct Autopilot {
    engine: Engine,
    roster: Roster,
    config: Config,
}

impl Autopilot {
    pub fn new(engine: Engine, roster: Roster, config: Config) -> Self {
        Self {
            engine,
            roster,
            config,
        }
    }

    /// spawn the periodic tick
    pub fn run(self) {
        tokio::spawn(async move {
            let cadence = std::time::Duration::from_secs(crate::CREATE_CADENCE_SECS);
            let mut interval = tokio::time::interval(cadence);
            loop {
                interval.tick().await;
                match self.tick().await {
                    Ok(outcome) if outcome.created => {}
                    Ok(outcome) => log::info!(
                        "[autopilot] skipped: {}",
                        outcome.reason.as_deref().unwrap_or("unknown")
                    ),
                    Err(e) => log::warn!("[autopilot] tick failed: {}", e),
                }
            }
        });
    }

    /// the gated path: concurrency ceiling, credit budget, then
    /// creation. a skipped tick leaves the store untouched.
    pub async fn tick(&self) -> Result<Outcome> {
        let live = self.engine.store().live_count().await?;
        if live >= MAX_CONCURRENT {
            return Ok(Outcome::skipped(format!(
                "Concurrent game limit reached ({}/{})",
                live, MAX_CONCURRENT
            )));
        }
        match self.engine.store().credits().await? {
            Some(account) if account.fraction() >= MIN_CREDIT_FRACTION => {}
            Some(_) => return Ok(Outcome::skipped("Credits below 10%")),
            None => return Ok(Outcome::skipped("Credit account not synced")),
        }
        self.create(false).await
    }

    /// manual entrypoint: no concurrency or credit gate, but the
    /// roster must exist and every buy-in must clear
    pub async fn force(&self, dev: bool) -> Result<Outcome> {
        self.create(dev).await
    }

    async fn create(&self, dev: bool) -> Result<Outcome> {
        let store = self.engine.store();
        let mut players = Vec::new();
        for id in self.roster.ids() {
            match store.player(&id).await? {
                Some(player) => players.push(player),
                None => return Ok(Outcome::skipped(format!("Missing roster player {}", id))),
            }
        }
        let buy_in = self.config.buy_in as i64;
        if let Some(poor) = players.iter().find(|p| p.balance < buy_in) {
            return Ok(Outcome::skipped(format!(
                "{} cannot cover the buy-in",
                poor.model
            )));
        }
        let mut game = Game::create(self.config, &self.roster.ids(), dev);
        store.insert_game(&game).await?;
        for player in players.iter_mut() {
            player.balance -= buy_in;
            player.total_buy_ins += self.config.buy_in;
            let entry = LedgerEntry::new(
                player.model.clone(),
                game.id,
                LedgerKind::BuyIn,
                -buy_in,
                player.balance,
            );
            store.debit(player, &entry).await?;
        }
        game.status = Status::Active;
        store.update_game(game.id, 0, &game).await?;
        self.engine.after(0, Job::StartHand { game: game.id, hand: 1 });
        log::info!("[autopilot] created game {}", game.id);
        Ok(Outcome {
            created: true,
            reason: None,
            game: Some(game.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::dispatcher::Engine;
    use crate::players::ModelClient;
    use crate::players::Reply;
    use crate::players::roster::ModelSpec;
    use crate::store::CreditAccount;
    use crate::store::Memory;
    use crate::store::Player;
    use crate::store::Store;
    use std::sync::Arc;

    struct Null;

    #[async_trait::async_trait]
    impl ModelClient for Null {
        async fn decide(&self, _: &str, _: &str) -> anyhow::Result<Reply> {
            anyhow::bail!("no models in this test")
        }
    }

    fn roster(n: usize) -> Roster {
        Roster {
            models: (0..n)
                .map(|i| ModelSpec {
                    id: format!("model-{}", i),
                    endpoint: "http://localhost:0".into(),
                })
                .collect(),
        }
    }

    fn rig() -> (Autopilot, Arc<Memory>) {
        let store = Arc::new(Memory::new());
        let (engine, _rx) = Engine::new(store.clone(), Arc::new(Null), None);
        let pilot = Autopilot::new(engine, roster(2), Config::default());
        (pilot, store)
    }

    async fn seed_players(store: &Memory, balance: i64) {
        for i in 0..2 {
            let player = Player::new(format!("model-{}", i), balance);
            store.upsert_player(&player).await.unwrap();
        }
    }

    fn credits(balance: f64) -> CreditAccount {
        CreditAccount {
            balance,
            used: 20.0 - balance,
            limit: 20.0,
            last_synced_at: 0,
        }
    }

    #[tokio::test]
    async fn low_credits_abort_the_tick() {
        let (pilot, store) = rig();
        seed_players(&store, 5000).await;
        store.put_credits(&credits(1.5)).await.unwrap(); // 7.5%
        let outcome = pilot.tick().await.unwrap();
        assert!(!outcome.created);
        assert_eq!(outcome.reason.as_deref(), Some("Credits below 10%"));
        assert!(store.ledger_entries().is_empty());
        assert_eq!(store.live_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrency_ceiling_aborts_the_tick() {
        let (pilot, store) = rig();
        seed_players(&store, 5000).await;
        store.put_credits(&credits(20.0)).await.unwrap();
        for _ in 0..crate::MAX_CONCURRENT {
            let mut game = Game::create(Config::default(), &roster(2).ids(), false);
            game.status = Status::Active;
            store.insert_game(&game).await.unwrap();
        }
        let outcome = pilot.tick().await.unwrap();
        assert!(!outcome.created);
        assert!(outcome.reason.unwrap().starts_with("Concurrent game limit"));
        assert!(store.ledger_entries().is_empty());
    }

    #[tokio::test]
    async fn missing_roster_player_aborts_creation() {
        let (pilot, store) = rig();
        let player = Player::new("model-0".into(), 5000);
        store.upsert_player(&player).await.unwrap();
        store.put_credits(&credits(20.0)).await.unwrap();
        let outcome = pilot.tick().await.unwrap();
        assert!(!outcome.created);
        assert_eq!(
            outcome.reason.as_deref(),
            Some("Missing roster player model-1")
        );
        assert_eq!(store.live_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn short_balance_aborts_creation() {
        let (pilot, store) = rig();
        seed_players(&store, 500).await; // buy-in is 1000
        store.put_credits(&credits(20.0)).await.unwrap();
        let outcome = pilot.tick().await.unwrap();
        assert!(!outcome.created);
        assert!(outcome.reason.unwrap().contains("cannot cover the buy-in"));
    }

    #[tokio::test]
    async fn force_skips_gates_but_still_debits() {
        let (pilot, store) = rig();
        seed_players(&store, 1500).await;
        store.put_credits(&credits(0.5)).await.unwrap(); // would fail the gate
        let outcome = pilot.force(true).await.unwrap();
        assert!(outcome.created);
        let ledger = store.ledger_entries();
        assert_eq!(ledger.len(), 2);
        for entry in ledger.iter() {
            assert_eq!(entry.kind, LedgerKind::BuyIn);
            assert_eq!(entry.amount, -1000);
            assert_eq!(entry.balance_after, 500);
        }
        let game = store
            .game(outcome.game.unwrap())
            .await
            .unwrap()
            .unwrap()
            .doc;
        assert_eq!(game.status, Status::Active);
        assert_eq!(game.seats.len(), 2);
        assert_eq!(game.seats[0].stack, 1000);
    }

    #[tokio::test]
    async fn tick_creates_when_all_gates_pass() {
        let (pilot, store) = rig();
        seed_players(&store, 5000).await;
        store.put_credits(&credits(20.0)).await.unwrap();
        let outcome = pilot.tick().await.unwrap();
        assert!(outcome.created, "unexpected skip: {:?}", outcome.reason);
        assert_eq!(store.live_count().await.unwrap(), 1);
    }
}
