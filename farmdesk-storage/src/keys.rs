//! Durable storage keys outside the four record collections.
//!
//! Collection keys come from [`farmdesk_types::Record::COLLECTION`].

/// The singleton sync configuration.
pub const SYNC_CONFIG: &str = "syncConfig";

/// Session flag written on successful login.
pub const IS_LOGGED_IN: &str = "isLoggedIn";

/// Key holding the last raw value of `collection` that could not be read
/// in full, kept so the next write cannot destroy it.
pub fn unreadable(collection: &str) -> String {
    format!("{collection}.unreadable")
}
