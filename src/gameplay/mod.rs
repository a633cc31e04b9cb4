pub mod action;
pub mod betting;
pub mod game;
pub mod hand;
pub mod phase;
pub mod pot;
pub mod record;
pub mod seat;
pub mod stats;
pub mod table;

pub use action::Action;
pub use action::Legal;
pub use action::Proposal;
pub use game::Config;
pub use game::Game;
pub use game::Status;
pub use phase::Phase;
pub use record::HandSummary;
pub use record::LogEntry;
pub use record::SeatResult;
pub use record::WinCondition;
pub use seat::Seat;
pub use stats::SeatStats;
pub use table::Table;
