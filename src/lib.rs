pub mod config;
pub mod error;
pub mod pool;
pub mod server;
pub mod strategies;

pub use config::{ClientConfig, ServerConfig};
pub use error::Error;
pub use pool::{ServerPool, StaticServerPool};
pub use server::{Backend, Server};
pub use strategies::round_robin::{CyclicCursor, RoundRobinRule, Selection, MAX_ATTEMPTS};
pub use strategies::strategy::ServerSelectionStrategy;
