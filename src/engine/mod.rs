pub mod autopilot;
pub mod credits;
pub mod dispatcher;
pub mod job;
pub mod settlement;

pub use autopilot::Autopilot;
pub use autopilot::Outcome;
pub use credits::CreditsProvider;
pub use dispatcher::Engine;
pub use job::Job;
