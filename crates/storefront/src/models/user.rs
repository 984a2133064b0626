//! The authenticated customer attached to a session.
//!
//! Session issuance itself is the identity provider's job; by the time a
//! request reaches a handler here, the session either carries a verified
//! `{email}` or it does not.

use marigold_core::Email;
use serde::{Deserialize, Serialize};

/// Session storage keys.
pub mod session_keys {
    /// Key under which the current customer is stored.
    pub const CURRENT_USER: &str = "current_user";
}

/// The customer making the current request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Verified email, as supplied by the identity provider.
    pub email: Email,
}
