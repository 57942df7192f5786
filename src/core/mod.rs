pub mod backend;
pub mod clock;
pub mod config;
pub mod constants;
pub mod ids;
pub mod image;
pub mod message;
pub mod session;
pub mod transcript;

pub use backend::{BackendError, HttpBackend, PlantBackend};
pub use session::{ChatSession, Exchange, ExchangeStatus, SessionError};
