use super::job::Job;
use crate::INTER_HAND_DELAY_MS;
use crate::Position;
use crate::gameplay::action::Action;
use crate::gameplay::action::Legal;
use crate::gameplay::action::Proposal;
use crate::gameplay::game::Game;
use crate::gameplay::game::Status;
use crate::gameplay::phase::Phase;
use crate::gameplay::record::LogEntry;
use crate::players::ModelClient;
use crate::players::Reply;
use crate::players::parse;
use crate::players::prompt;
use crate::store::Store;
use crate::store::Versioned;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use uuid::Uuid;

/// a write that lost the optimistic race re-reads and re-decides
/// this many times before giving up and leaving recovery to pick
/// the game up
const RETRIES: usize = 3;

/// The turn dispatcher. Owns no game state: every handler is a
/// read-validate-write cycle against the store, keyed on the game's
/// ply counter, with follow-ups enqueued only after the write lands.
/// Decision and timeout race on the same ply; exactly one wins.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn Store>,
    models: Arc<dyn ModelClient>,
    credits: Option<super::credits::CreditsProvider>,
    jobs: UnboundedSender<(u64, Job)>,
}

impl Engine {
    pub fn new(
        store: Arc<dyn Store>,
        models: Arc<dyn ModelClient>,
        credits: Option<super::credits::CreditsProvider>,
    ) -> (Self, UnboundedReceiver<(u64, Job)>) {
        let (tx, rx) = unbounded_channel();
        let engine = Self {
            inner: Arc::new(Inner {
                store,
                models,
                credits,
                jobs: tx,
            }),
        };
        (engine, rx)
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.inner.store
    }

    /// durable-intent enqueue. the process is the scheduler: jobs
    /// live in memory and are reconstructed by recovery after a
    /// crash, with the persisted document as the source of truth.
    pub fn after(&self, delay_ms: u64, job: Job) {
        let _ = self.inner.jobs.send((delay_ms, job));
    }

    /// drain the queue forever, firing each job after its delay.
    /// duplicate or reordered firings are harmless: handlers are
    /// idempotent under the ply guard.
    pub fn pump(&self, mut rx: UnboundedReceiver<(u64, Job)>) {
        let engine = self.clone();
        tokio::spawn(async move {
            while let Some((delay, job)) = rx.recv().await {
                let engine = engine.clone();
                tokio::spawn(async move {
                    if delay > 0 {
                        tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
                    }
                    if let Err(e) = engine.execute(job).await {
                        log::error!("[engine] job failed: {}", e);
                    }
                });
            }
        });
    }

    pub async fn execute(&self, job: Job) -> Result<()> {
        match job {
            Job::StartHand { game, hand } => self.start_hand(game, hand).await,
            Job::Turn { game, ply } => self.schedule_turn(game, ply).await,
            Job::Request {
                game,
                ply,
                seat,
                legal,
            } => self.request_decision(game, ply, seat, legal).await,
            Job::Timeout { game, ply } => self.handle_timeout(game, ply).await,
            Job::Street { game, ply, target } => self.advance(game, ply, target).await,
            Job::Settle { game } => self.settle(game).await,
            Job::Snapshot => self.snapshot().await,
            Job::SyncCredits => self.sync_credits().await,
        }
    }

    /// scan every non-terminal game and recompute its continuation
    /// from the document alone. in-memory jobs die with the process;
    /// this is what makes a crashed game resume where it left off.
    pub async fn recover(&self) -> Result<()> {
        for status in [Status::Waiting, Status::Active, Status::Completed] {
            for game in self.inner.store.games_by_status(status).await? {
                if let Some(job) = continuation(&game) {
                    log::info!("[engine {}] resuming: {:?}", game.id, job);
                    self.after(0, job);
                }
            }
        }
        Ok(())
    }

    /// read-validate-write with bounded retry on optimistic losses.
    /// the closure returns None to drop a stale callback, or the
    /// follow-ups to enqueue once the write commits.
    async fn transact<F>(&self, id: Uuid, mut mutate: F) -> Result<()>
    where
        F: FnMut(&mut Game) -> Option<Vec<(u64, Job)>>,
    {
        for _ in 0..RETRIES {
            let Some(Versioned { rev, mut doc }) = self.inner.store.game(id).await? else {
                return Ok(());
            };
            match mutate(&mut doc) {
                None => return Ok(()),
                Some(jobs) => {
                    if self.inner.store.update_game(id, rev, &doc).await? {
                        for (delay, job) in jobs {
                            self.after(delay, job);
                        }
                        return Ok(());
                    }
                }
            }
        }
        log::warn!("[engine {}] write contention, leaving to recovery", id);
        Ok(())
    }

    /// start hand `hand`, or complete the game when the table is
    /// down to one stack or the hand budget is spent
    async fn start_hand(&self, id: Uuid, hand: u32) -> Result<()> {
        self.transact(id, |game| {
            if game.status != Status::Active {
                return None;
            }
            if game.current_hand != hand.checked_sub(1)? {
                return None;
            }
            if game.over() {
                game.status = Status::Completed;
                game.completed_at = Some(crate::now_ms());
                game.log_push(LogEntry::System {
                    hand: game.current_hand,
                    content: "game over".into(),
                    at: crate::now_ms(),
                });
                return Some(vec![(0, Job::Settle { game: id })]);
            }
            game.begin_hand();
            game.post_blinds();
            game.deal_holes();
            let ply = game.table.ply;
            match game.table.actor {
                Some(_) => Some(vec![(0, Job::Turn { game: id, ply })]),
                None => Some(vec![(
                    0,
                    Job::Street {
                        game: id,
                        ply,
                        target: game.next_target(),
                    },
                )]),
            }
        })
        .await
    }

    /// arm the on-turn seat: mark it thinking, compute its legal
    /// set, and fan out the decision request and the deadline. a
    /// duplicate delivery is an idempotent re-arm.
    async fn schedule_turn(&self, id: Uuid, ply: u64) -> Result<()> {
        self.transact(id, |game| {
            if game.status != Status::Active || game.table.ply != ply {
                return None;
            }
            let actor = game.table.actor?;
            if !game.seat(actor).can_act() {
                return None;
            }
            game.thinking = Some(actor);
            let legal = game.legal(actor);
            Some(vec![
                (
                    0,
                    Job::Request {
                        game: id,
                        ply,
                        seat: actor,
                        legal,
                    },
                ),
                (game.config.turn_timeout_ms, Job::Timeout { game: id, ply }),
            ])
        })
        .await
    }

    /// the only handler that leaves the store alone: render the
    /// context, call the model, and hand the parsed proposal to the
    /// apply path. on any failure the armed timeout collects the seat.
    async fn request_decision(&self, id: Uuid, ply: u64, seat: Position, legal: Legal) -> Result<()> {
        let Some(Versioned { doc: game, .. }) = self.inner.store.game(id).await? else {
            return Ok(());
        };
        if game.status != Status::Active || game.table.ply != ply || game.thinking != Some(seat) {
            return Ok(());
        }
        let model = game.seat(seat).model.clone();
        let rendered = prompt::render(&game, seat, &legal);
        match self.inner.models.decide(&model, &rendered).await {
            Ok(reply) => {
                log::debug!(
                    "[engine {}] {} replied in {}ms ({} tokens)",
                    id,
                    model,
                    reply.latency_ms,
                    reply.tokens
                );
                let proposal = parse::parse(&reply.text);
                self.apply_decision(id, ply, proposal, reply).await
            }
            Err(e) => {
                log::warn!("[engine {}] model call failed for {}: {}", id, model, e);
                Ok(())
            }
        }
    }

    /// apply a parsed decision to the armed turn. stale unless the
    /// ply still matches and a seat is still thinking. an illegal or
    /// unparseable proposal coerces to a fold and is counted.
    pub async fn apply_decision(
        &self,
        id: Uuid,
        ply: u64,
        proposal: Option<Proposal>,
        reply: Reply,
    ) -> Result<()> {
        self.transact(id, |game| {
            if game.status != Status::Active || game.table.ply != ply {
                return None;
            }
            let pos = game.thinking?;
            let action = match proposal.and_then(|p| game.propose(pos, p)) {
                Some(action) => action,
                None => {
                    game.stat_mut(pos).invalid_actions += 1;
                    Action::Fold
                }
            };
            game.apply(pos, action, Some(reply.text.clone()));
            game.ai_cost += reply.cost;
            game.tokens_spent += reply.tokens;
            let stat = game.stat_mut(pos);
            stat.tokens += reply.tokens;
            stat.cost += reply.cost;
            game.table.ply += 1;
            game.thinking = None;
            Some(route_after_action(id, game, pos))
        })
        .await
    }

    /// deadline fired: if the decision never landed, the seat folds.
    /// losing the race against the decision is the normal case and a
    /// silent no-op.
    async fn handle_timeout(&self, id: Uuid, ply: u64) -> Result<()> {
        self.transact(id, |game| {
            if game.status != Status::Active || game.table.ply != ply {
                return None;
            }
            let pos = game.thinking?;
            game.apply(pos, Action::Fold, Some("timeout".into()));
            game.stat_mut(pos).timeouts += 1;
            game.table.ply += 1;
            game.thinking = None;
            Some(route_after_action(id, game, pos))
        })
        .await
    }

    /// deal into `target`, or run the showdown. the phase guard
    /// makes duplicate deliveries no-ops; an evaluation failure is a
    /// structural bug that cancels the game.
    async fn advance(&self, id: Uuid, ply: u64, target: Phase) -> Result<()> {
        self.transact(id, |game| {
            if game.status != Status::Active || game.table.ply != ply {
                return None;
            }
            if game.table.phase != target.prev() {
                return None;
            }
            if target == Phase::Showdown {
                return match game.showdown() {
                    Ok(()) => Some(vec![(
                        INTER_HAND_DELAY_MS,
                        Job::StartHand {
                            game: id,
                            hand: game.current_hand + 1,
                        },
                    )]),
                    Err(e) => {
                        log::error!("[engine {}] hand crashed: {}", id, e);
                        game.status = Status::Cancelled;
                        game.completed_at = Some(crate::now_ms());
                        game.log_push(LogEntry::System {
                            hand: game.current_hand,
                            content: format!("hand crashed: {}", e),
                            at: crate::now_ms(),
                        });
                        Some(vec![])
                    }
                };
            }
            game.advance_street(target);
            match game.table.actor {
                Some(_) => Some(vec![(0, Job::Turn { game: id, ply })]),
                None => Some(vec![(
                    0,
                    Job::Street {
                        game: id,
                        ply,
                        target: game.next_target(),
                    },
                )]),
            }
        })
        .await
    }

    /// manual cancellation. terminal: every later callback for the
    /// game drops on the status guard.
    pub async fn cancel(&self, id: Uuid) -> Result<bool> {
        let mut cancelled = false;
        self.transact(id, |game| {
            if !matches!(game.status, Status::Waiting | Status::Active) {
                return None;
            }
            game.status = Status::Cancelled;
            game.completed_at = Some(crate::now_ms());
            game.thinking = None;
            game.log_push(LogEntry::System {
                hand: game.current_hand,
                content: "game cancelled".into(),
                at: crate::now_ms(),
            });
            cancelled = true;
            Some(vec![])
        })
        .await?;
        Ok(cancelled)
    }

    async fn sync_credits(&self) -> Result<()> {
        let Some(provider) = &self.inner.credits else {
            return Ok(());
        };
        match provider.fetch().await {
            Ok(account) => self.inner.store.put_credits(&account).await,
            Err(e) => {
                log::warn!("[engine] credit sync failed: {}", e);
                Ok(())
            }
        }
    }
}

/// after an applied action: fold-wins end the hand, a closed round
/// advances the street, otherwise the next seat is put on turn
fn route_after_action(id: Uuid, game: &mut Game, pos: Position) -> Vec<(u64, Job)> {
    if game.n_live() == 1 {
        game.fold_win();
        return vec![(
            INTER_HAND_DELAY_MS,
            Job::StartHand {
                game: id,
                hand: game.current_hand + 1,
            },
        )];
    }
    let ply = game.table.ply;
    match game.seat_to_act_from(pos) {
        Some(next) => {
            game.table.actor = Some(next);
            vec![(0, Job::Turn { game: id, ply })]
        }
        None => {
            game.table.actor = None;
            vec![(
                0,
                Job::Street {
                    game: id,
                    ply,
                    target: game.next_target(),
                },
            )]
        }
    }
}

/// recompute a game's next step from its resting document. this is
/// total over every state a committed transaction can leave behind.
pub fn continuation(game: &Game) -> Option<Job> {
    let id = game.id;
    match game.status {
        Status::Waiting => Some(Job::StartHand {
            game: id,
            hand: game.current_hand + 1,
        }),
        Status::Active => {
            if game.thinking.is_some() {
                return Some(Job::Turn {
                    game: id,
                    ply: game.table.ply,
                });
            }
            if game.table.phase == Phase::Showdown || game.current_hand == 0 {
                return Some(Job::StartHand {
                    game: id,
                    hand: game.current_hand + 1,
                });
            }
            match game.table.actor {
                Some(_) => Some(Job::Turn {
                    game: id,
                    ply: game.table.ply,
                }),
                None => Some(Job::Street {
                    game: id,
                    ply: game.table.ply,
                    target: game.next_target(),
                }),
            }
        }
        Status::Completed if game.results.is_empty() => Some(Job::Settle { game: id }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::game::Config;
    use crate::store::Memory;
    use crate::store::Player;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// canned replies, one per model invocation
    struct Scripted(Mutex<VecDeque<&'static str>>);

    #[async_trait::async_trait]
    impl ModelClient for Scripted {
        async fn decide(&self, _: &str, _: &str) -> Result<Reply> {
            let text = self
                .0
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))?;
            Ok(Reply {
                text: text.into(),
                tokens: 7,
                cost: 0.01,
                latency_ms: 5,
            })
        }
    }

    fn rig(replies: &[&'static str]) -> (Engine, UnboundedReceiver<(u64, Job)>, Arc<Memory>) {
        let store = Arc::new(Memory::new());
        let client = Arc::new(Scripted(Mutex::new(replies.iter().copied().collect())));
        let (engine, rx) = Engine::new(store.clone(), client, None);
        (engine, rx, store)
    }

    fn models(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("model-{}", i)).collect()
    }

    async fn seed_game(store: &Memory, n: usize, config: Config) -> Game {
        let mut game = Game::create(config, &models(n), true);
        game.status = Status::Active;
        game.begin_hand();
        game.post_blinds();
        game.deal_holes();
        store.insert_game(&game).await.unwrap();
        game
    }

    fn late() -> Reply {
        Reply {
            text: "CALL".into(),
            tokens: 0,
            cost: 0.0,
            latency_ms: 0,
        }
    }

    #[tokio::test]
    async fn timeout_folds_and_late_decision_is_dropped() {
        let (engine, _rx, store) = rig(&[]);
        let game = seed_game(&store, 2, Config::default()).await;
        let ply = game.table.ply;
        let actor = game.table.actor.unwrap();
        engine.execute(Job::Turn { game: game.id, ply }).await.unwrap();
        // the deadline fires with no decision in sight
        engine
            .execute(Job::Timeout { game: game.id, ply })
            .await
            .unwrap();
        let after = store.game(game.id).await.unwrap().unwrap().doc;
        assert!(after.seat(actor).folded);
        assert_eq!(after.table.ply, ply + 1);
        assert_eq!(after.thinking, None);
        assert_eq!(after.stats[&after.seat(actor).model].timeouts, 1);
        assert_eq!(after.hands.len(), 1); // heads-up fold ends the hand
        // a decision arriving after the deadline is silently dropped
        engine
            .apply_decision(game.id, ply, Some(Proposal::Call), late())
            .await
            .unwrap();
        let finally = store.game(game.id).await.unwrap().unwrap().doc;
        assert_eq!(finally.table.ply, ply + 1);
        assert_eq!(finally.hands.len(), 1);
        // and so is a replay of the timeout itself
        engine
            .execute(Job::Timeout { game: game.id, ply })
            .await
            .unwrap();
        let replayed = store.game(game.id).await.unwrap().unwrap().doc;
        assert_eq!(replayed.table.ply, ply + 1);
    }

    #[tokio::test]
    async fn duplicate_turn_arm_applies_one_decision() {
        let (engine, mut rx, store) = rig(&["thinking...\nCALL"]);
        let game = seed_game(&store, 2, Config::default()).await;
        let ply = game.table.ply;
        engine.execute(Job::Turn { game: game.id, ply }).await.unwrap();
        engine.execute(Job::Turn { game: game.id, ply }).await.unwrap();
        let armed = store.game(game.id).await.unwrap().unwrap().doc;
        assert_eq!(armed.table.ply, ply);
        assert!(armed.thinking.is_some());
        // both arms fanned out a request and a timeout
        let mut requests = Vec::new();
        let mut timeouts = Vec::new();
        while let Ok((_, job)) = rx.try_recv() {
            match job {
                Job::Request { .. } => requests.push(job),
                Job::Timeout { .. } => timeouts.push(job),
                other => panic!("unexpected job {:?}", other),
            }
        }
        assert_eq!(requests.len(), 2);
        assert_eq!(timeouts.len(), 2);
        for job in requests {
            engine.execute(job).await.unwrap();
        }
        for job in timeouts {
            engine.execute(job).await.unwrap();
        }
        let after = store.game(game.id).await.unwrap().unwrap().doc;
        // exactly one decision landed; the duplicates were stale
        assert_eq!(after.table.ply, ply + 1);
        let calls = after
            .log
            .iter()
            .filter(|e| matches!(e, LogEntry::Action { action: Action::Call(_), .. }))
            .count();
        let folds = after
            .log
            .iter()
            .filter(|e| matches!(e, LogEntry::Action { action: Action::Fold, .. }))
            .count();
        assert_eq!(calls, 1);
        assert_eq!(folds, 0);
    }

    #[tokio::test]
    async fn unparseable_reply_coerces_to_fold() {
        let (engine, mut rx, store) = rig(&["i would like to phone a friend"]);
        let game = seed_game(&store, 2, Config::default()).await;
        let ply = game.table.ply;
        let actor = game.table.actor.unwrap();
        engine.execute(Job::Turn { game: game.id, ply }).await.unwrap();
        while let Ok((_, job)) = rx.try_recv() {
            if matches!(job, Job::Request { .. }) {
                engine.execute(job).await.unwrap();
            }
        }
        let after = store.game(game.id).await.unwrap().unwrap().doc;
        assert!(after.seat(actor).folded);
        assert_eq!(after.stats[&after.seat(actor).model].invalid_actions, 1);
        assert_eq!(after.table.ply, ply + 1);
    }

    #[tokio::test]
    async fn illegal_check_coerces_to_fold() {
        // facing the big blind, CHECK is not in the legal set
        let (engine, mut rx, store) = rig(&["CHECK"]);
        let game = seed_game(&store, 2, Config::default()).await;
        let ply = game.table.ply;
        let actor = game.table.actor.unwrap();
        engine.execute(Job::Turn { game: game.id, ply }).await.unwrap();
        while let Ok((_, job)) = rx.try_recv() {
            if matches!(job, Job::Request { .. }) {
                engine.execute(job).await.unwrap();
            }
        }
        let after = store.game(game.id).await.unwrap().unwrap().doc;
        assert!(after.seat(actor).folded);
        assert_eq!(after.stats[&after.seat(actor).model].invalid_actions, 1);
    }

    #[tokio::test]
    async fn full_game_settles_to_the_ledger() {
        let (engine, mut rx, store) = rig(&["ALL-IN", "priced in, calling.\nCALL"]);
        for i in 0..2 {
            let player = Player::new(format!("model-{}", i), 1500);
            store.upsert_player(&player).await.unwrap();
        }
        let config = Config {
            max_hands: 1,
            ..Config::default()
        };
        let roster = crate::players::roster::Roster {
            models: (0..2)
                .map(|i| crate::players::roster::ModelSpec {
                    id: format!("model-{}", i),
                    endpoint: "http://localhost:0".into(),
                })
                .collect(),
        };
        let pilot = super::super::autopilot::Autopilot::new(engine.clone(), roster, config);
        let outcome = pilot.force(true).await.unwrap();
        assert!(outcome.created);
        let id = outcome.game.unwrap();
        // buy-ins debited up front
        assert_eq!(store.ledger_entries().len(), 2);
        for player in store.players_by_balance().await.unwrap() {
            assert_eq!(player.balance, 500);
        }
        // drive the hand to completion: shove, call, runout, settle
        while let Ok((_, job)) = rx.try_recv() {
            engine.execute(job).await.unwrap();
        }
        let game = store.game(id).await.unwrap().unwrap().doc;
        assert_eq!(game.status, Status::Completed);
        assert_eq!(game.results.len(), 2);
        assert!(game.completed_at.is_some());
        let players = store.players_by_balance().await.unwrap();
        let total: i64 = players.iter().map(|p| p.balance).sum();
        assert_eq!(total, 3000); // chips conserved through buy-in and cash-out
        let ledger = store.ledger_entries();
        assert_eq!(ledger.len(), 4); // two buy-ins, two cash-outs
        let net: i64 = ledger.iter().map(|e| e.amount).sum();
        assert_eq!(net, 0);
        assert_eq!(store.snapshot_rows().len(), 2);
        assert_eq!(store.snapshot_rows()[0].rank, 1);
    }

    #[tokio::test]
    async fn recovery_rearms_a_thinking_turn() {
        let (engine, mut rx, store) = rig(&[]);
        let mut game = seed_game(&store, 2, Config::default()).await;
        // simulate a crash after the arm transaction committed
        game.thinking = game.table.actor;
        let rev = store.game(game.id).await.unwrap().unwrap().rev;
        store.update_game(game.id, rev, &game).await.unwrap();
        engine.recover().await.unwrap();
        let (_, job) = rx.try_recv().expect("a continuation");
        match job {
            Job::Turn { game: id, ply } => {
                assert_eq!(id, game.id);
                assert_eq!(ply, game.table.ply);
            }
            other => panic!("expected a turn re-arm, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn recovery_settles_a_completed_unsettled_game() {
        let (engine, mut rx, store) = rig(&[]);
        let mut game = seed_game(&store, 2, Config::default()).await;
        game.status = Status::Completed;
        game.completed_at = Some(crate::now_ms());
        let rev = store.game(game.id).await.unwrap().unwrap().rev;
        store.update_game(game.id, rev, &game).await.unwrap();
        engine.recover().await.unwrap();
        let (_, job) = rx.try_recv().expect("a continuation");
        assert!(matches!(job, Job::Settle { .. }));
    }
}
