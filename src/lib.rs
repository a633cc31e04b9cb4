pub mod cards;
pub mod engine;
pub mod evaluation;
pub mod gameplay;
pub mod hosting;
pub mod players;
pub mod store;

/// dimensional analysis types
pub type Chips = u64;
pub type Position = usize;

// table parameters
pub const DEFAULT_BUY_IN: Chips = 1000;
pub const DEFAULT_S_BLIND: Chips = 10;
pub const DEFAULT_B_BLIND: Chips = 20;
pub const DEFAULT_MAX_HANDS: u32 = 100;
pub const DEFAULT_TURN_TIMEOUT_MS: u64 = 90_000;
pub const INTER_HAND_DELAY_MS: u64 = 2_000;
pub const ACTION_LOG_CAP: usize = 30;

// autonomous scheduler parameters
pub const MAX_CONCURRENT: usize = 2;
pub const MIN_CREDIT_FRACTION: f64 = 0.10;
pub const CREDIT_LIMIT: f64 = 20.0;
pub const CREATE_CADENCE_SECS: u64 = 2 * 60 * 60;

// rate limit parameters
pub const RATE_IP_PER_MIN: usize = 10;
pub const RATE_GAME_PER_10_MIN: usize = 50;
pub const RATE_GLOBAL_PER_HOUR: usize = 500;

/// trait for random generation, mainly (strictly?) for testing
pub trait Arbitrary {
    fn random() -> Self;
}

/// milliseconds since the unix epoch
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_millis() as i64
}

/// install logging (terminal + one file per engine run) and shut
/// down cleanly on ctrl-c
pub fn init() {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.unwrap();
        log::warn!("shutting down");
        std::process::exit(0);
    });
    let dir = std::path::Path::new("engine-logs");
    std::fs::create_dir_all(dir).expect("create log directory");
    let path = dir.join(format!("engine-{}.log", now_ms() / 1000));
    let config = simplelog::ConfigBuilder::new()
        .set_thread_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Error)
        .build();
    simplelog::CombinedLogger::init(vec![
        simplelog::TermLogger::new(
            log::LevelFilter::Info,
            config.clone(),
            simplelog::TerminalMode::Stderr,
            simplelog::ColorChoice::Auto,
        ),
        simplelog::WriteLogger::new(
            log::LevelFilter::Debug,
            config,
            std::fs::File::create(&path).expect("create log file"),
        ),
    ])
    .expect("install logger");
    log::info!("logging to {}", path.display());
}

/// open the backing postgres connection from DB_URL
pub async fn db() -> tokio_postgres::Client {
    let url = std::env::var("DB_URL").expect("DB_URL must be set");
    log::info!("opening postgres connection");
    let (client, connection) = tokio_postgres::connect(&url, tokio_postgres::tls::NoTls)
        .await
        .expect("postgres connection");
    tokio::spawn(connection);
    client
}
