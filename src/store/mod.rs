pub mod memory;
pub mod postgres;
pub mod records;

pub use memory::Memory;
pub use postgres::Postgres;
pub use records::CreditAccount;
pub use records::LedgerEntry;
pub use records::LedgerKind;
pub use records::Player;
pub use records::RankSnapshot;

use crate::gameplay::game::Game;
use crate::gameplay::game::Status;
use anyhow::Result;
use uuid::Uuid;

/// a game document plus the physical revision it was read at.
/// writes carry the revision back and lose if anything else wrote
/// in between.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub rev: i64,
    pub doc: T,
}

/// The persistence seam. The engine only ever does read-validate-write
/// cycles: read a versioned document, decide, and write back under the
/// revision read. A false return from the conditional writes means the
/// optimistic race was lost and the caller re-reads or drops out.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn insert_game(&self, game: &Game) -> Result<()>;
    async fn game(&self, id: Uuid) -> Result<Option<Versioned<Game>>>;
    /// conditional write; false when the revision moved underneath us
    async fn update_game(&self, id: Uuid, rev: i64, game: &Game) -> Result<bool>;
    async fn games_by_status(&self, status: Status) -> Result<Vec<Game>>;
    /// active or waiting games, dev tables excluded
    async fn live_count(&self) -> Result<usize>;

    async fn player(&self, model: &str) -> Result<Option<Player>>;
    async fn upsert_player(&self, player: &Player) -> Result<()>;
    async fn players_by_balance(&self) -> Result<Vec<Player>>;

    async fn append_ledger(&self, entry: &LedgerEntry) -> Result<()>;
    /// buy-in debit: the player write and its ledger row land together
    async fn debit(&self, player: &Player, entry: &LedgerEntry) -> Result<()>;
    /// full settlement of a finished game: every player update, every
    /// cash-out ledger row, and the final game document in one
    /// transaction, guarded by the game revision
    async fn settle(
        &self,
        id: Uuid,
        rev: i64,
        game: &Game,
        players: &[Player],
        entries: &[LedgerEntry],
    ) -> Result<bool>;

    async fn credits(&self) -> Result<Option<CreditAccount>>;
    async fn put_credits(&self, account: &CreditAccount) -> Result<()>;
    async fn insert_snapshots(&self, rows: &[RankSnapshot]) -> Result<()>;
}
