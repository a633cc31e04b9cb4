pub mod ratelimit;
pub mod server;
pub mod view;

pub use ratelimit::Limits;
pub use server::Server;
pub use view::GameView;
