//! Tollgate replay application.
//!
//! Wires the risk engine to a contract store, a paper order router and a
//! JSON Lines event feed.

pub mod app;
pub mod config;
pub mod error;
pub mod feed;
pub mod router;

pub use app::{Application, ReplaySummary};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use feed::FeedEvent;
pub use router::PaperRouter;
