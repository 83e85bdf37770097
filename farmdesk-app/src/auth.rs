//! The PIN gate in front of the dashboard.
//!
//! This is a convenience lock, not a security boundary: the PIN is a
//! shared constant compared in memory.

use farmdesk_storage::{SessionFlag, StorageError};
use thiserror::Error;
use tracing::{info, warn};

/// Access code used when none is configured.
pub const DEFAULT_PIN: &str = "999000";

pub const PIN_LENGTH: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("PIN must be 6 digits.")]
    MalformedPin,

    #[error("Invalid PIN. Access denied.")]
    InvalidPin,

    #[error("failed to record session: {0}")]
    Storage(#[from] StorageError),
}

/// Checks PINs and keeps the persisted session flag.
pub struct AuthGate {
    pin: String,
    session: SessionFlag,
}

impl AuthGate {
    pub fn new(pin: impl Into<String>, session: SessionFlag) -> Self {
        Self {
            pin: pin.into(),
            session,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_set()
    }

    /// Accepts exactly six digits matching the configured PIN, then
    /// persists the session.
    pub fn login(&self, pin: &str) -> Result<(), AuthError> {
        if pin.len() != PIN_LENGTH || !pin.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AuthError::MalformedPin);
        }
        if pin != self.pin {
            warn!("login rejected");
            return Err(AuthError::InvalidPin);
        }
        self.session.set()?;
        info!("logged in");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        self.session.clear()?;
        info!("logged out");
        Ok(())
    }
}
