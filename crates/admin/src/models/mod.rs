//! Request-scoped models for the admin API.

use marigold_core::Email;
use serde::{Deserialize, Serialize};

/// Session storage keys.
pub mod session_keys {
    /// Key under which the current user's identity is stored.
    pub const CURRENT_USER: &str = "current_user";
}

/// An authenticated caller whose email passed the admin allow-list.
///
/// Only ever constructed by the `RequireAdmin` extractor - holding one is
/// proof the capability check ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub email: Email,
}
