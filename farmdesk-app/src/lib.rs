//! farmdesk: a single-user farm ledger.
//!
//! [`FarmApp`] opens the durable store, gates access behind a PIN, and
//! runs best-effort replication of the ledger to a spreadsheet endpoint
//! while a session is active.

mod app;
pub mod auth;
mod config;
mod error;

pub use app::FarmApp;
pub use auth::{AuthError, AuthGate};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
