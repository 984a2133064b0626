//! Admin authorization extractor.
//!
//! Admin authority is a single centralized capability check: the session's
//! verified email must be on the configured allow-list. Every admin handler
//! takes [`RequireAdmin`], so the check runs before any handler body - an
//! unauthorized call performs no reads and no writes.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use marigold_core::Email;

use crate::models::{AdminIdentity, session_keys};
use crate::state::AppState;

/// Extractor that requires an allow-listed admin.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.email)
/// }
/// ```
pub struct RequireAdmin(pub AdminIdentity);

/// Rejection for missing or non-admin sessions. Always a bare 401: whether
/// the email exists at all is none of the caller's business.
pub struct AdminRejection;

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

/// Session payload written by the identity provider's callback.
#[derive(serde::Deserialize)]
struct SessionUser {
    email: Email,
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts.extensions.get::<Session>().ok_or(AdminRejection)?;

        let user: SessionUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or(AdminRejection)?;

        if !state.config().is_admin(&user.email) {
            tracing::warn!(email = %user.email, "non-admin attempted admin route");
            return Err(AdminRejection);
        }

        Ok(Self(AdminIdentity { email: user.email }))
    }
}
