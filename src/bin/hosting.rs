//! hosting server binary
//!
//! Runs the tournament engine end to end: crash recovery, the
//! autonomous game scheduler, and the HTTP surface.

use clap::Parser;
use modelpoker::engine::Autopilot;
use modelpoker::engine::CreditsProvider;
use modelpoker::engine::Engine;
use modelpoker::engine::Job;
use modelpoker::gameplay::Config;
use modelpoker::hosting::Server;
use modelpoker::players::Remote;
use modelpoker::players::Roster;
use modelpoker::store::Memory;
use modelpoker::store::Player;
use modelpoker::store::Postgres;
use modelpoker::store::Store;
use std::sync::Arc;

#[derive(Parser)]
#[command(about = "no-limit hold'em engine for remote LLM players")]
struct Args {
    /// bind address for the HTTP server
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,
    /// path to the roster file
    #[arg(long, default_value = "roster.json")]
    roster: std::path::PathBuf,
    /// run against the in-memory store instead of Postgres
    #[arg(long)]
    dev: bool,
    /// create any missing roster players with this starting balance
    #[arg(long)]
    seed: Option<i64>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    modelpoker::init();
    let roster = Roster::load(&args.roster).expect("roster file");
    let store: Arc<dyn Store> = match args.dev {
        true => Arc::new(Memory::new()),
        false => {
            let postgres = Postgres::new(modelpoker::db().await);
            postgres.migrate().await.expect("schema migration");
            Arc::new(postgres)
        }
    };
    if let Some(balance) = args.seed {
        for id in roster.ids() {
            if store.player(&id).await.expect("player lookup").is_none() {
                log::info!("seeding {} with {}", id, balance);
                let player = Player::new(id, balance);
                store.upsert_player(&player).await.expect("player seed");
            }
        }
    }
    let credits = std::env::var("CREDITS_URL").ok().map(CreditsProvider::new);
    let models = Arc::new(Remote::new(roster.clone()));
    let (engine, jobs) = Engine::new(store, models, credits);
    engine.pump(jobs);
    engine.recover().await.expect("recovery scan");
    engine.after(0, Job::SyncCredits);
    let pilot = Autopilot::new(engine.clone(), roster, Config::default());
    pilot.clone().run();
    Server::run(&args.bind, engine, pilot).await.expect("server");
}
