use crate::Position;
use crate::gameplay::action::Legal;
use crate::gameplay::phase::Phase;
use uuid::Uuid;

/// Follow-up work the engine enqueues against itself. Delivery is
/// at-least-once and unordered across games, so every job carries
/// enough context to detect that it is stale: handlers re-read the
/// game and no-op unless the tagged ply (and phase, for street
/// advances) still matches.
#[derive(Debug, Clone)]
pub enum Job {
    /// begin hand number `hand`, or complete the game
    StartHand { game: Uuid, hand: u32 },
    /// arm the on-turn seat: mark it thinking, then fan out a
    /// decision request and a deadline
    Turn { game: Uuid, ply: u64 },
    /// invoke the remote model for an armed turn
    Request {
        game: Uuid,
        ply: u64,
        seat: Position,
        legal: Legal,
    },
    /// force-fold the armed turn if it is still outstanding
    Timeout { game: Uuid, ply: u64 },
    /// deal the next street, or run the showdown
    Street { game: Uuid, ply: u64, target: Phase },
    /// settle a completed game into the durable player records
    Settle { game: Uuid },
    /// leaderboard snapshot, enqueued after settlement
    Snapshot,
    /// best-effort refresh of the credit account
    SyncCredits,
}
